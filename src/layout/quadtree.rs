use eframe::egui::{Vec2, vec2};

const ROOT: usize = 0;
const MIN_HALF_EXTENT: f32 = 1.0e-3;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QuadBounds {
    pub center: Vec2,
    pub half_extent: f32,
}

impl QuadBounds {
    /// Smallest padded square covering every finite point.
    fn from_points(points: impl Iterator<Item = Vec2>) -> Option<Self> {
        let mut min = vec2(f32::INFINITY, f32::INFINITY);
        let mut max = vec2(f32::NEG_INFINITY, f32::NEG_INFINITY);

        for point in points {
            min = min.min(point);
            max = max.max(point);
        }

        if !min.x.is_finite() || !min.y.is_finite() || !max.x.is_finite() || !max.y.is_finite() {
            return None;
        }

        let center = (min + max) * 0.5;
        let span = (max.x - min.x).max(max.y - min.y).max(1.0);
        let half_extent = (span * 0.5) + 1.0;

        Some(Self {
            center,
            half_extent,
        })
    }

    pub fn contains(self, point: Vec2) -> bool {
        let min = self.min();
        let max = self.max();
        point.x >= min.x && point.x <= max.x && point.y >= min.y && point.y <= max.y
    }

    pub fn min(self) -> Vec2 {
        self.center - vec2(self.half_extent, self.half_extent)
    }

    pub fn max(self) -> Vec2 {
        self.center + vec2(self.half_extent, self.half_extent)
    }

    pub fn side_length(self) -> f32 {
        self.half_extent * 2.0
    }

    fn child(self, quadrant: usize) -> Self {
        let quarter = self.half_extent * 0.5;
        let offset = match quadrant {
            0 => vec2(-quarter, -quarter),
            1 => vec2(quarter, -quarter),
            2 => vec2(-quarter, quarter),
            _ => vec2(quarter, quarter),
        };

        Self {
            center: self.center + offset,
            half_extent: quarter,
        }
    }

    fn quadrant_for(self, point: Vec2) -> usize {
        let right = point.x >= self.center.x;
        let lower = point.y >= self.center.y;
        match (right, lower) {
            (false, false) => 0,
            (true, false) => 1,
            (false, true) => 2,
            (true, true) => 3,
        }
    }

    /// Below this size child centers stop being representable apart from
    /// the parent's, so further splitting would never separate points.
    fn can_split(self) -> bool {
        let magnitude = self.center.x.abs().max(self.center.y.abs());
        let precision_floor = magnitude * f32::EPSILON * 16.0;
        self.half_extent > MIN_HALF_EXTENT.max(precision_floor)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(super) enum CellKind {
    Empty,
    /// Indices of the bodies in this region: one, unless the depth limit
    /// forced several close points to share it.
    Leaf(Vec<usize>),
    Internal([usize; 4]),
}

#[derive(Clone, Debug)]
pub(super) struct Cell {
    pub(super) bounds: QuadBounds,
    pub(super) depth: usize,
    pub(super) mass: f32,
    pub(super) center_of_mass: Vec2,
    pub(super) kind: CellKind,
}

impl Cell {
    fn empty(bounds: QuadBounds, depth: usize) -> Self {
        Self {
            bounds,
            depth,
            mass: 0.0,
            center_of_mass: bounds.center,
            kind: CellKind::Empty,
        }
    }
}

/// Region outline exposed for the decomposition overlay.
#[derive(Clone, Copy, Debug)]
pub struct Region {
    pub bounds: QuadBounds,
    pub depth: usize,
    pub is_leaf: bool,
}

enum InsertStep {
    Place,
    Descend(usize),
    Merge,
    Split(usize),
}

/// Quadtree over one tick's node positions, stored as a flat arena where
/// children always sit after their parent.
#[derive(Clone, Debug, Default)]
pub struct SpatialTree {
    cells: Vec<Cell>,
}

impl SpatialTree {
    pub fn build(positions: &[Vec2], masses: &[f32], max_depth: usize) -> Self {
        let finite = |point: &Vec2| point.x.is_finite() && point.y.is_finite();
        let Some(bounds) = QuadBounds::from_points(positions.iter().copied().filter(finite)) else {
            return Self::default();
        };

        let mut tree = Self {
            cells: vec![Cell::empty(bounds, 0)],
        };
        for (index, position) in positions.iter().enumerate() {
            if finite(position) {
                tree.insert(index, positions, max_depth);
            }
        }
        tree.accumulate_mass(positions, masses);
        tree
    }

    fn insert(&mut self, body: usize, positions: &[Vec2], max_depth: usize) {
        let point = positions[body];
        let mut cell = ROOT;

        loop {
            let step = {
                let current = &self.cells[cell];
                match &current.kind {
                    CellKind::Empty => InsertStep::Place,
                    CellKind::Internal(children) => {
                        InsertStep::Descend(children[current.bounds.quadrant_for(point)])
                    }
                    CellKind::Leaf(bodies) => match bodies.first() {
                        Some(&resident)
                            if current.depth < max_depth && current.bounds.can_split() =>
                        {
                            InsertStep::Split(resident)
                        }
                        _ => InsertStep::Merge,
                    },
                }
            };

            match step {
                InsertStep::Place => {
                    self.cells[cell].kind = CellKind::Leaf(vec![body]);
                    return;
                }
                InsertStep::Merge => {
                    if let CellKind::Leaf(bodies) = &mut self.cells[cell].kind {
                        bodies.push(body);
                    }
                    return;
                }
                InsertStep::Descend(child) => cell = child,
                InsertStep::Split(resident) => {
                    let children = self.subdivide(cell);
                    let quadrant = self.cells[cell].bounds.quadrant_for(positions[resident]);
                    self.cells[children[quadrant]].kind = CellKind::Leaf(vec![resident]);
                }
            }
        }
    }

    fn subdivide(&mut self, cell: usize) -> [usize; 4] {
        let bounds = self.cells[cell].bounds;
        let depth = self.cells[cell].depth + 1;
        let first = self.cells.len();
        for quadrant in 0..4 {
            self.cells.push(Cell::empty(bounds.child(quadrant), depth));
        }

        let children = [first, first + 1, first + 2, first + 3];
        self.cells[cell].kind = CellKind::Internal(children);
        children
    }

    fn accumulate_mass(&mut self, positions: &[Vec2], masses: &[f32]) {
        let mass_of = |body: usize| masses.get(body).copied().unwrap_or(1.0);

        for index in (0..self.cells.len()).rev() {
            let mut mass = 0.0;
            let mut weighted = Vec2::ZERO;
            match &self.cells[index].kind {
                CellKind::Empty => {}
                CellKind::Leaf(bodies) => {
                    for &body in bodies {
                        mass += mass_of(body);
                        weighted += positions[body] * mass_of(body);
                    }
                }
                CellKind::Internal(children) => {
                    for &child in children {
                        let child = &self.cells[child];
                        mass += child.mass;
                        weighted += child.center_of_mass * child.mass;
                    }
                }
            }

            let cell = &mut self.cells[index];
            cell.mass = mass;
            if mass > 0.0 {
                cell.center_of_mass = weighted / mass;
            }
        }
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[cfg(test)]
    pub(super) fn root(&self) -> Option<&Cell> {
        self.cells.first()
    }

    pub(super) fn cell(&self, index: usize) -> &Cell {
        &self.cells[index]
    }

    pub(super) fn root_index(&self) -> Option<usize> {
        (!self.cells.is_empty()).then_some(ROOT)
    }

    #[cfg(test)]
    pub fn total_mass(&self) -> f32 {
        self.root().map_or(0.0, |root| root.mass)
    }

    /// Outlines of every non-empty region, parents before children.
    pub fn regions(&self) -> impl Iterator<Item = Region> + '_ {
        self.cells
            .iter()
            .filter(|cell| cell.kind != CellKind::Empty)
            .map(|cell| Region {
                bounds: cell.bounds,
                depth: cell.depth,
                is_leaf: matches!(cell.kind, CellKind::Leaf(_)),
            })
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;

    fn scattered(count: usize, seed: u64) -> (Vec<Vec2>, Vec<f32>) {
        let mut rng = StdRng::seed_from_u64(seed);
        let positions = (0..count)
            .map(|_| vec2(rng.gen_range(-500.0..500.0), rng.gen_range(-300.0..300.0)))
            .collect();
        let masses = (0..count).map(|_| rng.gen_range(0.5..3.0)).collect();
        (positions, masses)
    }

    fn leaf_bodies(tree: &SpatialTree, cell: usize, out: &mut Vec<usize>) {
        match &tree.cell(cell).kind {
            CellKind::Empty => {}
            CellKind::Leaf(bodies) => out.extend(bodies),
            CellKind::Internal(children) => {
                for &child in children {
                    leaf_bodies(tree, child, out);
                }
            }
        }
    }

    #[test]
    fn empty_input_builds_empty_tree() {
        let tree = SpatialTree::build(&[], &[], 24);
        assert!(tree.is_empty());
        assert_eq!(tree.total_mass(), 0.0);
        assert_eq!(tree.regions().count(), 0);
    }

    #[test]
    fn single_body_is_a_root_leaf() {
        let tree = SpatialTree::build(&[vec2(3.0, 4.0)], &[2.0], 24);
        let root = tree.root().unwrap();
        assert_eq!(root.kind, CellKind::Leaf(vec![0]));
        assert_eq!(root.mass, 2.0);
        assert_eq!(root.center_of_mass, vec2(3.0, 4.0));
    }

    #[test]
    fn mass_is_conserved_at_every_level() {
        let (positions, masses) = scattered(200, 11);
        let tree = SpatialTree::build(&positions, &masses, 24);

        let total = masses.iter().sum::<f32>();
        assert!((tree.total_mass() - total).abs() < 1e-3);

        for cell in &tree.cells {
            if let CellKind::Internal(children) = &cell.kind {
                let child_mass = children
                    .iter()
                    .map(|&child| tree.cell(child).mass)
                    .sum::<f32>();
                assert!((cell.mass - child_mass).abs() < 1e-3);
            }
        }
    }

    #[test]
    fn centroids_match_weighted_leaf_positions() {
        let (positions, masses) = scattered(120, 5);
        let tree = SpatialTree::build(&positions, &masses, 24);

        for index in 0..tree.cells.len() {
            let mut bodies = Vec::new();
            leaf_bodies(&tree, index, &mut bodies);
            if bodies.is_empty() {
                continue;
            }

            let mass = bodies.iter().map(|&body| masses[body]).sum::<f32>();
            let weighted = bodies
                .iter()
                .fold(Vec2::ZERO, |sum, &body| sum + positions[body] * masses[body]);
            let expected = weighted / mass;
            let actual = tree.cell(index).center_of_mass;
            assert!(
                (actual - expected).length() < 1e-2,
                "cell {index}: {actual:?} vs {expected:?}"
            );
        }
    }

    #[test]
    fn every_body_lands_in_exactly_one_containing_leaf() {
        let (positions, masses) = scattered(150, 9);
        let tree = SpatialTree::build(&positions, &masses, 24);

        let mut seen = vec![0usize; positions.len()];
        for cell in &tree.cells {
            if let CellKind::Leaf(bodies) = &cell.kind {
                assert_eq!(bodies.len(), 1, "scattered points never share a leaf");
                for &body in bodies {
                    assert!(cell.bounds.contains(positions[body]));
                    seen[body] += 1;
                }
            }
        }
        assert!(seen.iter().all(|&count| count == 1));
    }

    #[test]
    fn coincident_points_merge_at_depth_limit() {
        let positions = vec![vec2(10.0, 10.0); 6];
        let masses = vec![1.0; 6];
        let tree = SpatialTree::build(&positions, &masses, 8);

        assert_eq!(tree.total_mass(), 6.0);
        let merged = tree
            .cells
            .iter()
            .find_map(|cell| match &cell.kind {
                CellKind::Leaf(bodies) => Some(bodies.len()),
                _ => None,
            })
            .unwrap();
        assert_eq!(merged, 6);
        assert!(tree.cells.iter().all(|cell| cell.depth <= 8));
    }

    #[test]
    fn near_coincident_points_far_from_origin_terminate() {
        let base = vec2(5_000.0, 5_000.0);
        let positions = vec![base, base + vec2(1.0e-4, 0.0), base + vec2(0.0, 1.0e-4)];
        let tree = SpatialTree::build(&positions, &[1.0; 3], 64);

        assert_eq!(tree.total_mass(), 3.0);
        assert!(tree.cells.len() < 4 * 64 + 1);
    }

    #[test]
    fn non_finite_positions_are_skipped() {
        let positions = vec![vec2(0.0, 0.0), vec2(f32::NAN, 1.0), vec2(4.0, 4.0)];
        let tree = SpatialTree::build(&positions, &[1.0; 3], 24);
        assert_eq!(tree.total_mass(), 2.0);
    }

    #[test]
    fn regions_report_leaves_and_depths() {
        let positions = vec![vec2(-10.0, -10.0), vec2(10.0, 10.0)];
        let tree = SpatialTree::build(&positions, &[1.0, 1.0], 24);

        let regions = tree.regions().collect::<Vec<_>>();
        assert_eq!(regions.len(), 3);
        assert!(!regions[0].is_leaf);
        assert_eq!(regions[0].depth, 0);
        assert!(regions[1..].iter().all(|region| region.is_leaf && region.depth == 1));
    }
}
