use std::collections::{BTreeSet, HashMap};
use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

use anyhow::{Context, Result};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use super::document::{encode_graph, export_graph, import_graph, parse_graph};
use super::graph::{DEFAULT_TEAM_NAME, Graph};

const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

fn has_extension(name: &str, extensions: &[&str]) -> bool {
    Path::new(name)
        .extension()
        .and_then(|extension| extension.to_str())
        .is_some_and(|extension| {
            extensions
                .iter()
                .any(|candidate| extension.eq_ignore_ascii_case(candidate))
        })
}

pub fn is_archive(path: &Path) -> bool {
    path.to_str().is_some_and(|path| has_extension(path, &["zip"]))
}

/// Opens a graph document or archive, picked by file extension.
pub fn open_graph(path: &Path, image_dir: &Path) -> Result<Graph> {
    if is_archive(path) {
        import_archive(path, image_dir)
    } else {
        import_graph(path)
    }
}

/// Saves a graph document or archive, picked by file extension.
pub fn save_graph(graph: &Graph, path: &Path, image_dir: &Path) -> Result<()> {
    if is_archive(path) {
        export_archive(graph, path, image_dir)
    } else {
        export_graph(graph, path)
    }
}

/// Bare file name of an archive entry or image reference, if it has one.
fn plain_file_name(name: &str) -> Option<&str> {
    let file_name = Path::new(name).file_name()?.to_str()?;
    (file_name == name).then_some(file_name)
}

/// Team name made safe for use as a file name prefix.
fn file_prefix(team_name: &str) -> String {
    let team_name = team_name.trim();
    let team_name = if team_name.is_empty() {
        DEFAULT_TEAM_NAME
    } else {
        team_name
    };
    team_name
        .chars()
        .map(|c| {
            if c.is_control() || matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|') {
                '_'
            } else {
                c
            }
        })
        .collect()
}

fn entry_options() -> SimpleFileOptions {
    SimpleFileOptions::default().compression_method(CompressionMethod::Deflated)
}

/// Reads `<stem>.json` from the archive, or its only top-level JSON entry
/// when the archive was renamed after export.
fn document_entry(path: &Path, names: &[String]) -> Result<String> {
    let expected = path
        .file_stem()
        .map(|stem| format!("{}.json", stem.to_string_lossy()));
    if let Some(expected) = expected
        && names.contains(&expected)
    {
        return Ok(expected);
    }

    let mut documents = names
        .iter()
        .filter(|name| plain_file_name(name).is_some() && has_extension(name, &["json"]));
    match (documents.next(), documents.next()) {
        (Some(name), None) => Ok(name.clone()),
        (None, _) => anyhow::bail!("archive {} holds no graph document", path.display()),
        (Some(_), Some(_)) => anyhow::bail!(
            "archive {} holds several graph documents and none named after it",
            path.display()
        ),
    }
}

/// Imports a `.zip` holding a graph document plus the images its nodes
/// refer to. Images land in `image_dir`; one whose name is already taken
/// there is stored as `<team name>_<name>` and the nodes are repointed.
/// Nothing is written unless the document is valid.
pub fn import_archive(path: &Path, image_dir: &Path) -> Result<Graph> {
    let file =
        File::open(path).with_context(|| format!("failed to open archive {}", path.display()))?;
    let mut archive = ZipArchive::new(file)
        .with_context(|| format!("failed to read archive {}", path.display()))?;
    let names = archive.file_names().map(str::to_owned).collect::<Vec<_>>();

    let document_name = document_entry(path, &names)?;
    let mut raw = String::new();
    archive
        .by_name(&document_name)
        .with_context(|| format!("failed to open {document_name} in {}", path.display()))?
        .read_to_string(&mut raw)
        .with_context(|| format!("failed to read {document_name} in {}", path.display()))?;
    let mut graph = parse_graph(&raw, &path.join(&document_name))?;

    fs::create_dir_all(image_dir)
        .with_context(|| format!("failed to create image directory {}", image_dir.display()))?;
    let prefix = file_prefix(&graph.team_name);
    let mut renamed = HashMap::new();
    let mut extracted = 0;
    for name in &names {
        let Some(file_name) = plain_file_name(name) else {
            continue;
        };
        if !has_extension(file_name, &IMAGE_EXTENSIONS) {
            continue;
        }

        let mut bytes = Vec::new();
        archive
            .by_name(name)
            .with_context(|| format!("failed to open {name} in {}", path.display()))?
            .read_to_end(&mut bytes)
            .with_context(|| format!("failed to read {name} in {}", path.display()))?;

        let mut target = image_dir.join(file_name);
        if target.exists() {
            let replacement = format!("{prefix}_{file_name}");
            target = image_dir.join(&replacement);
            tracing::debug!(image = file_name, renamed = %replacement, "image name already taken");
            renamed.insert(file_name.to_owned(), replacement);
        }
        fs::write(&target, bytes)
            .with_context(|| format!("failed to write image {}", target.display()))?;
        extracted += 1;
    }

    for node in graph.nodes_mut() {
        if let Some(replacement) = renamed.get(&node.image_name) {
            node.image_name = replacement.clone();
        }
    }

    tracing::info!(
        path = %path.display(),
        nodes = graph.len(),
        edges = graph.edge_count(),
        images = extracted,
        renamed = renamed.len(),
        "imported graph archive"
    );
    Ok(graph)
}

/// Writes `<stem>.json` plus every image a node refers to that exists in
/// `image_dir`. Missing images are left out.
pub fn export_archive(graph: &Graph, path: &Path, image_dir: &Path) -> Result<()> {
    let json = encode_graph(graph)?;
    let stem = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "graph".to_owned());

    let file = File::create(path)
        .with_context(|| format!("failed to create archive {}", path.display()))?;
    let mut writer = ZipWriter::new(file);
    writer
        .start_file(format!("{stem}.json"), entry_options())
        .with_context(|| format!("failed to start graph document in {}", path.display()))?;
    writer
        .write_all(json.as_bytes())
        .with_context(|| format!("failed to write graph document into {}", path.display()))?;

    let referenced = graph
        .nodes()
        .iter()
        .filter_map(|node| plain_file_name(&node.image_name))
        .collect::<BTreeSet<_>>();
    let mut bundled = 0;
    for name in referenced {
        let source = image_dir.join(name);
        if !source.is_file() {
            tracing::debug!(image = name, "referenced image not found, skipping");
            continue;
        }

        let bytes = fs::read(&source)
            .with_context(|| format!("failed to read image {}", source.display()))?;
        writer
            .start_file(name, entry_options())
            .with_context(|| format!("failed to start {name} in {}", path.display()))?;
        writer
            .write_all(&bytes)
            .with_context(|| format!("failed to add {name} to {}", path.display()))?;
        bundled += 1;
    }
    writer
        .finish()
        .with_context(|| format!("failed to finish archive {}", path.display()))?;

    tracing::info!(
        path = %path.display(),
        nodes = graph.len(),
        edges = graph.edge_count(),
        images = bundled,
        "exported graph archive"
    );
    Ok(())
}
