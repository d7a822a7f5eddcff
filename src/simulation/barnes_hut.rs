//! # Barnes–Hut Quadtree (2D)
//!
//! Approximates the pairwise gravitational sum in `O(N log N)` by treating a
//! distant group of bodies as a single pseudo-body at its center of mass.
//!
//! - Space is recursively split into 4 quadrants, each a node of the tree.
//! - A leaf holds one body, or several when they sit closer together than
//!   `MAX_DEPTH` subdivisions can separate (coincident bodies).
//! - Every node stores its total mass, center of mass (COM) and square
//!   bounding box.
//!
//! A node is used as a pseudo-body when `size / distance < theta`, otherwise
//! its children are visited. `theta = 0` reproduces the direct sum.

use crate::simulation::forces::GravityLaw;
use crate::simulation::states::{Body, NVec2};

/// Deeper than this, bodies share a leaf instead of splitting further
const MAX_DEPTH: usize = 48;

/// A single quadtree node
///
/// `bodies` is only non-empty on leaves. Internal nodes delegate to
/// `children`, indices into [`BarnesHutTree::nodes`].
pub struct BarnesHutNode {
    pub mass: f64,
    pub com: NVec2,
    pub bbox_min: NVec2,
    pub bbox_max: NVec2,
    pub children: [Option<usize>; 4],
    pub bodies: Vec<usize>,
}

impl BarnesHutNode {
    fn empty(bbox_min: NVec2, bbox_max: NVec2) -> Self {
        Self {
            mass: 0.0,
            com: NVec2::zeros(),
            bbox_min,
            bbox_max,
            children: [None; 4],
            bodies: Vec::new(),
        }
    }

    fn is_leaf(&self) -> bool {
        self.children.iter().all(|c| c.is_none())
    }

    fn contains(&self, p: &NVec2) -> bool {
        p.x >= self.bbox_min.x && p.x <= self.bbox_max.x && p.y >= self.bbox_min.y && p.y <= self.bbox_max.y
    }
}

/// A quadtree built over one snapshot of body positions
pub struct BarnesHutTree {
    pub nodes: Vec<BarnesHutNode>,
    pub root: usize,
}

impl BarnesHutTree {
    /// Build the tree: square root box around all bodies, insert each body,
    /// then fill in masses and centers of mass bottom-up
    pub fn build(bodies: &[Body]) -> Self {
        let (bbox_min, bbox_max) = compute_global_bbox(bodies);

        let mut tree = BarnesHutTree {
            nodes: vec![BarnesHutNode::empty(bbox_min, bbox_max)],
            root: 0,
        };

        for i in 0..bodies.len() {
            tree.insert_body(tree.root, i, bodies, 0);
        }

        tree.compute_mass_and_com(bodies, tree.root);

        tree
    }

    /// Approximate acceleration on `bodies[i]` from every other body
    pub fn acceleration_on(&self, i: usize, bodies: &[Body], law: &GravityLaw, theta: f64) -> NVec2 {
        let mut acc = NVec2::zeros();
        self.traverse_node(self.root, i, bodies[i].x, bodies, law, theta, &mut acc);
        acc
    }

    pub fn total_mass(&self) -> f64 {
        self.nodes[self.root].mass
    }

    pub fn center_of_mass(&self) -> NVec2 {
        self.nodes[self.root].com
    }

    // helpers ==============================================================================

    /// Place `body_idx` in the subtree rooted at `node_idx`
    ///
    /// - empty leaf: store the body
    /// - occupied leaf: subdivide, push the resident body down, then descend
    /// - internal node: descend into the quadrant containing the body
    fn insert_body(&mut self, node_idx: usize, body_idx: usize, bodies: &[Body], depth: usize) {
        let bbox_min = self.nodes[node_idx].bbox_min;
        let bbox_max = self.nodes[node_idx].bbox_max;

        if self.nodes[node_idx].is_leaf() {
            if self.nodes[node_idx].bodies.is_empty() || depth >= MAX_DEPTH {
                self.nodes[node_idx].bodies.push(body_idx);
                return;
            }

            let residents = std::mem::take(&mut self.nodes[node_idx].bodies);
            self.subdivide(node_idx, bbox_min, bbox_max);
            for resident in residents {
                self.insert_body(node_idx, resident, bodies, depth);
            }
        }

        let quadrant = child_index_for_point(&bodies[body_idx].x, &bbox_min, &bbox_max);
        if let Some(child) = self.nodes[node_idx].children[quadrant] {
            self.insert_body(child, body_idx, bodies, depth + 1);
        }
    }

    /// Split a node into 4 empty children covering its box
    fn subdivide(&mut self, node_idx: usize, bbox_min: NVec2, bbox_max: NVec2) {
        for quadrant in 0..4 {
            let (cmin, cmax) = child_bbox(&bbox_min, &bbox_max, quadrant);
            let new_idx = self.nodes.len();
            self.nodes.push(BarnesHutNode::empty(cmin, cmax));
            self.nodes[node_idx].children[quadrant] = Some(new_idx);
        }
    }

    /// Post-order pass writing total mass and COM into every node
    fn compute_mass_and_com(&mut self, bodies: &[Body], node_idx: usize) {
        let mut mass = 0.0;
        let mut weighted = NVec2::zeros();

        for &bidx in &self.nodes[node_idx].bodies {
            let b = &bodies[bidx];
            mass += b.m;
            weighted += b.x * b.m;
        }

        let children = self.nodes[node_idx].children;
        for child in children.iter().flatten() {
            self.compute_mass_and_com(bodies, *child);
            let cn = &self.nodes[*child];
            if cn.mass > 0.0 {
                mass += cn.mass;
                weighted += cn.com * cn.mass;
            }
        }

        let node = &mut self.nodes[node_idx];
        node.mass = mass;
        node.com = if mass > 0.0 { weighted / mass } else { NVec2::zeros() };
    }

    #[allow(clippy::too_many_arguments)]
    fn traverse_node(&self, node_idx: usize, body_idx: usize, pos_i: NVec2, bodies: &[Body], law: &GravityLaw, theta: f64, acc: &mut NVec2) {
        let node = &self.nodes[node_idx];

        if node.mass == 0.0 {
            return;
        }

        // leaf: exact interaction with each resident except ourselves
        if node.is_leaf() {
            for &bidx in &node.bodies {
                if bidx != body_idx {
                    let b = &bodies[bidx];
                    *acc += law.acceleration_toward(pos_i, b.x, b.m);
                }
            }
            return;
        }

        let size = (node.bbox_max.x - node.bbox_min.x).max(node.bbox_max.y - node.bbox_min.y);
        let dist = (node.com - pos_i).norm();

        // a node holding the body itself is always opened so it never pulls on itself
        if dist > 0.0 && size / dist < theta && !node.contains(&pos_i) {
            *acc += law.acceleration_toward(pos_i, node.com, node.mass);
        } else {
            for child in node.children.iter().flatten() {
                self.traverse_node(*child, body_idx, pos_i, bodies, law, theta, acc);
            }
        }
    }
}

// helpers ===========================================================================

/// Smallest square box around every body, so a node's size is one number
fn compute_global_bbox(bodies: &[Body]) -> (NVec2, NVec2) {
    if bodies.is_empty() {
        return (NVec2::zeros(), NVec2::zeros());
    }

    let mut min = NVec2::new(f64::INFINITY, f64::INFINITY);
    let mut max = NVec2::new(f64::NEG_INFINITY, f64::NEG_INFINITY);
    for b in bodies {
        min = min.inf(&b.x);
        max = max.sup(&b.x);
    }

    let center = (min + max) * 0.5;
    let extent = (max - min) * 0.5;
    let half = extent.x.max(extent.y);
    let half = NVec2::new(half, half);

    (center - half, center + half)
}

/// Quadrant of `p`: bit 0 set for the right half, bit 1 for the upper half
fn child_index_for_point(p: &NVec2, bbox_min: &NVec2, bbox_max: &NVec2) -> usize {
    let center = (bbox_min + bbox_max) * 0.5;
    let mut idx = 0;

    if p.x >= center.x { idx |= 1; }
    if p.y >= center.y { idx |= 2; }

    idx
}

/// Box of quadrant `quadrant` inside `[parent_min, parent_max]`, same bit
/// layout as [`child_index_for_point`]
fn child_bbox(parent_min: &NVec2, parent_max: &NVec2, quadrant: usize) -> (NVec2, NVec2) {
    let center = (parent_min + parent_max) * 0.5;

    let mut min = *parent_min;
    let mut max = *parent_max;

    if (quadrant & 1) == 0 {
        max.x = center.x;
    } else {
        min.x = center.x;
    }

    if (quadrant & 2) == 0 {
        max.y = center.y;
    } else {
        min.y = center.y;
    }

    (min, max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::simulation::params::UnitSystem;

    fn grid(n: usize) -> Vec<Body> {
        (0..n)
            .map(|i| {
                let f = i as f64;
                Body::new(NVec2::new((f * 0.37).sin() * 5.0, (f * 0.13).cos() * 5.0), 1.0 + (i % 3) as f64, 0.01)
            })
            .collect()
    }

    #[test]
    fn root_aggregates_all_mass() {
        let bodies = grid(50);
        let tree = BarnesHutTree::build(&bodies);
        let total: f64 = bodies.iter().map(|b| b.m).sum();
        let com = bodies.iter().fold(NVec2::zeros(), |c, b| c + b.x * b.m) / total;
        assert!((tree.total_mass() - total).abs() < 1e-9);
        assert!((tree.center_of_mass() - com).norm() < 1e-9);
    }

    #[test]
    fn coincident_bodies_share_a_leaf() {
        let bodies = vec![
            Body::new(NVec2::new(1.0, 1.0), 1.0, 0.1),
            Body::new(NVec2::new(1.0, 1.0), 2.0, 0.1),
            Body::new(NVec2::new(-1.0, 0.0), 3.0, 0.1),
        ];
        let tree = BarnesHutTree::build(&bodies);
        assert_eq!(tree.total_mass(), 6.0);

        let law = GravityLaw::new(UnitSystem::toy(1.0), 1e-3);
        let a = tree.acceleration_on(0, &bodies, &law, 0.5);
        assert!(a.x.is_finite() && a.y.is_finite());
    }

    #[test]
    fn wide_opening_angle_never_includes_self() {
        // root COM sits between the two bodies, well inside theta = 3
        let bodies = vec![
            Body::new(NVec2::new(0.0, 0.0), 1.0, 0.01),
            Body::new(NVec2::new(1.0, 1.0), 9.0, 0.01),
        ];
        let tree = BarnesHutTree::build(&bodies);
        let law = GravityLaw::new(UnitSystem::toy(1.0), 1e-3);

        for theta in [0.7, 1.5, 3.0, 100.0] {
            for i in 0..bodies.len() {
                let approx = tree.acceleration_on(i, &bodies, &law, theta);
                let exact = law.acceleration_from(i, &bodies);
                assert!((approx - exact).norm() <= 1e-12 * exact.norm(), "theta {theta}, body {i}");
            }
        }
    }

    #[test]
    fn quadrant_bits() {
        let min = NVec2::new(0.0, 0.0);
        let max = NVec2::new(2.0, 2.0);
        assert_eq!(child_index_for_point(&NVec2::new(0.5, 0.5), &min, &max), 0);
        assert_eq!(child_index_for_point(&NVec2::new(1.5, 0.5), &min, &max), 1);
        assert_eq!(child_index_for_point(&NVec2::new(0.5, 1.5), &min, &max), 2);
        assert_eq!(child_index_for_point(&NVec2::new(1.5, 1.5), &min, &max), 3);
        assert_eq!(child_bbox(&min, &max, 3), (NVec2::new(1.0, 1.0), max));
    }
}
