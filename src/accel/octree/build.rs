//! Octree construction: top-down split, then a bottom-up emptiness pass
//!
//! # Algorithm
//!
//! 1. Root bounds = union of every primitive's approximate AABB
//! 2. Split while `depth < max_depth` and the node holds too many primitives
//! 3. Each child receives every primitive whose AABB intersects it
//! 4. Bottom-up: mark empty subtrees and cache their `min_distance`

use std::time::Instant;

use super::{child_bounds, Octree, OctreeConfig, OctreeNode};
use crate::types::{compute_bounds, Aabb, Primitive};

impl Octree {
    /// Build an octree over a primitive list
    ///
    /// Degenerate or unbounded scene bounds (e.g. an infinite repetition)
    /// produce a single root leaf holding every primitive.
    pub fn build(primitives: &[Primitive], config: &OctreeConfig) -> Octree {
        let start = Instant::now();
        let primitive_bounds: Vec<Aabb> = primitives.iter().map(Primitive::approximate_aabb).collect();
        let bounds = compute_bounds(&primitive_bounds);
        let all: Vec<usize> = (0..primitives.len()).collect();

        let mut root = if bounds.is_degenerate() {
            if !primitives.is_empty() {
                tracing::warn!(
                    min = ?bounds.min,
                    max = ?bounds.max,
                    "degenerate scene bounds, octree collapses to a single leaf"
                );
            }
            leaf(bounds, all, 0)
        } else {
            build_node(bounds, all, 0, &primitive_bounds, config)
        };

        let (node_count, leaf_count) = finalize(&mut root, &primitive_bounds);

        tracing::debug!(
            primitives = primitives.len(),
            nodes = node_count,
            leaves = leaf_count,
            elapsed_us = start.elapsed().as_micros() as u64,
            "octree built"
        );

        Octree {
            root,
            primitive_bounds,
            config: *config,
            node_count,
            leaf_count,
        }
    }
}

fn leaf(bounds: Aabb, primitives: Vec<usize>, depth: u32) -> OctreeNode {
    OctreeNode {
        bounds,
        primitives,
        children: None,
        is_empty: false,
        min_distance: 0.0,
        depth,
    }
}

fn build_node(
    bounds: Aabb,
    primitives: Vec<usize>,
    depth: u32,
    primitive_bounds: &[Aabb],
    config: &OctreeConfig,
) -> OctreeNode {
    if depth >= config.max_depth || primitives.len() <= config.max_primitives_per_node {
        return leaf(bounds, primitives, depth);
    }

    let children: [OctreeNode; 8] = std::array::from_fn(|octant| {
        let cb = child_bounds(&bounds, octant);
        let inside: Vec<usize> = primitives
            .iter()
            .copied()
            .filter(|&i| primitive_bounds[i].intersects(&cb))
            .collect();
        if inside.is_empty() {
            leaf(cb, inside, depth + 1)
        } else {
            build_node(cb, inside, depth + 1, primitive_bounds, config)
        }
    });

    OctreeNode {
        bounds,
        primitives: Vec::new(),
        children: Some(Box::new(children)),
        is_empty: false,
        min_distance: 0.0,
        depth,
    }
}

/// Bottom-up emptiness pass; returns (node count, leaf count)
fn finalize(node: &mut OctreeNode, primitive_bounds: &[Aabb]) -> (usize, usize) {
    let (nodes, leaves) = match node.children.as_deref_mut() {
        None => {
            node.is_empty = node.primitives.is_empty();
            (1, 1)
        }
        Some(children) => {
            let mut nodes = 1;
            let mut leaves = 0;
            let mut all_empty = true;
            for child in children.iter_mut() {
                let (n, l) = finalize(child, primitive_bounds);
                nodes += n;
                leaves += l;
                all_empty &= child.is_empty;
            }
            node.is_empty = all_empty;
            (nodes, leaves)
        }
    };

    node.min_distance = if node.is_empty {
        primitive_bounds
            .iter()
            .map(|b| node.bounds.distance_to_box(b))
            .fold(f32::INFINITY, f32::min)
    } else {
        0.0
    };

    (nodes, leaves)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn spheres(centers: &[Vec3], radius: f32) -> Vec<Primitive> {
        centers
            .iter()
            .map(|&c| Primitive::sphere(radius).translate(c))
            .collect()
    }

    fn walk<'a>(node: &'a OctreeNode, out: &mut Vec<&'a OctreeNode>) {
        out.push(node);
        if let Some(children) = &node.children {
            for c in children.iter() {
                walk(c, out);
            }
        }
    }

    #[test]
    fn test_few_primitives_single_leaf() {
        let prims = spheres(&[Vec3::ZERO, Vec3::X * 2.0], 0.5);
        let tree = Octree::build(&prims, &OctreeConfig::default());
        assert!(tree.root().is_leaf());
        assert_eq!(tree.root().primitives, vec![0, 1]);
        assert_eq!(tree.node_count(), 1);
    }

    #[test]
    fn test_split_and_duplicate_assignment() {
        let centers: Vec<Vec3> = (0..6).map(|i| Vec3::new(i as f32 * 2.0 - 5.0, 0.0, 0.0)).collect();
        let prims = spheres(&centers, 0.4);
        let tree = Octree::build(&prims, &OctreeConfig::default());
        assert!(!tree.root().is_leaf());

        let mut nodes = Vec::new();
        walk(tree.root(), &mut nodes);
        // every primitive reachable from some leaf whose bounds touch its AABB
        for (i, b) in tree.primitive_bounds().iter().enumerate() {
            assert!(nodes
                .iter()
                .filter(|n| n.is_leaf())
                .any(|n| n.primitives.contains(&i) && n.bounds.intersects(b)));
        }
        assert_eq!(nodes.len(), tree.node_count());
    }

    #[test]
    fn test_empty_nodes_cache_min_distance() {
        let centers: Vec<Vec3> = (0..5)
            .map(|i| Vec3::new(i as f32 * 0.1, i as f32 * 0.1, 0.0))
            .chain(std::iter::once(Vec3::new(4.0, 4.0, 4.0)))
            .collect();
        let prims = spheres(&centers, 0.1);
        let tree = Octree::build(&prims, &OctreeConfig::default());

        let mut nodes = Vec::new();
        walk(tree.root(), &mut nodes);
        let empties: Vec<_> = nodes.iter().filter(|n| n.is_empty).collect();
        assert!(!empties.is_empty());
        for node in empties {
            assert!(node.primitives.is_empty());
            let expected = tree
                .primitive_bounds()
                .iter()
                .map(|b| node.bounds.distance_to_box(b))
                .fold(f32::INFINITY, f32::min);
            assert_eq!(node.min_distance, expected);
        }
        for node in nodes.iter().filter(|n| !n.is_empty) {
            assert_eq!(node.min_distance, 0.0);
        }
    }

    #[test]
    fn test_depth_limit() {
        let prims = spheres(&[Vec3::ZERO; 10], 0.5);
        let config = OctreeConfig {
            max_depth: 2,
            ..Default::default()
        };
        let tree = Octree::build(&prims, &config);
        let mut nodes = Vec::new();
        walk(tree.root(), &mut nodes);
        assert!(nodes.iter().all(|n| n.depth <= 2));
    }

    #[test]
    fn test_unbounded_primitive_collapses_to_leaf() {
        let prims = vec![
            Primitive::sphere(0.2).repeat(Vec3::ONE),
            Primitive::sphere(1.0),
        ];
        let tree = Octree::build(&prims, &OctreeConfig::default());
        assert!(tree.root().is_leaf());
        assert_eq!(tree.root().primitives.len(), 2);
        assert!(!tree.root().is_empty);
    }

    #[test]
    fn test_empty_scene() {
        let tree = Octree::build(&[], &OctreeConfig::default());
        assert!(tree.root().is_leaf());
        assert!(tree.root().is_empty);
        assert!(tree.root().min_distance.is_infinite());
    }
}
