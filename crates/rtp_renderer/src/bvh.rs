//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! The tree is an arena: the BVH owns every primitive in one `Vec` and every
//! interior node in another, and children are referred to by index.

use crate::{HitRecord, Hittable, HittableList};
use rand::{Rng, RngCore};
use rtp_math::{Aabb, Interval, Ray};
use thiserror::Error;

/// Errors that can occur while building a BVH.
#[derive(Debug, Error, PartialEq)]
pub enum BuildError {
    #[error("cannot build a BVH over an empty object list")]
    Empty,

    #[error("object {index} has no bounding box")]
    MissingBoundingBox { index: usize },
}

/// Handle to a BVH child: an interior node or a primitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRef {
    Node(u32),
    Object(u32),
}

/// Interior node. With a single primitive both children alias it.
#[derive(Debug, Clone)]
struct BvhNode {
    left: NodeRef,
    right: NodeRef,
    bbox: Aabb,
}

/// BVH over a finalized set of hittables.
pub struct Bvh {
    objects: Vec<Box<dyn Hittable>>,
    nodes: Vec<BvhNode>,
    root: u32,
}

impl Bvh {
    /// Build a BVH from a scene list over the shutter interval `[time0, time1]`.
    ///
    /// The split axis is drawn per node from `rng`, so a seeded generator
    /// gives a reproducible tree.
    pub fn new(
        list: HittableList,
        time0: f32,
        time1: f32,
        rng: &mut dyn RngCore,
    ) -> Result<Self, BuildError> {
        Self::from_objects(list.into_objects(), time0, time1, rng)
    }

    pub fn from_objects(
        objects: Vec<Box<dyn Hittable>>,
        time0: f32,
        time1: f32,
        rng: &mut dyn RngCore,
    ) -> Result<Self, BuildError> {
        if objects.is_empty() {
            return Err(BuildError::Empty);
        }

        let boxes = objects
            .iter()
            .enumerate()
            .map(|(index, object)| {
                object.bounding_box(time0, time1).ok_or_else(|| {
                    log::warn!("BVH: object {} has no bounding box", index);
                    BuildError::MissingBoundingBox { index }
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let mut order: Vec<u32> = (0..objects.len() as u32).collect();
        let mut nodes = Vec::with_capacity(objects.len());
        let root = build_node(&mut nodes, &boxes, &mut order, rng);

        let bvh = Self {
            objects,
            nodes,
            root,
        };

        log::info!(
            "Built BVH: {} objects, {} nodes, depth {}",
            bvh.objects.len(),
            bvh.nodes.len(),
            bvh.depth()
        );

        Ok(bvh)
    }

    /// Number of primitives.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Root handle and its children, for inspection.
    pub fn root(&self) -> NodeRef {
        NodeRef::Node(self.root)
    }

    pub fn children(&self, node: u32) -> (NodeRef, NodeRef) {
        let node = &self.nodes[node as usize];
        (node.left, node.right)
    }

    /// Longest root-to-primitive path, counting interior nodes.
    pub fn depth(&self) -> usize {
        self.depth_of(NodeRef::Node(self.root))
    }

    fn depth_of(&self, node: NodeRef) -> usize {
        match node {
            NodeRef::Object(_) => 0,
            NodeRef::Node(i) => {
                let node = &self.nodes[i as usize];
                1 + self.depth_of(node.left).max(self.depth_of(node.right))
            }
        }
    }

    fn hit_ref<'a>(&'a self, node: NodeRef, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'a>> {
        match node {
            NodeRef::Object(i) => self.objects[i as usize].hit(ray, ray_t),
            NodeRef::Node(i) => self.hit_node(i, ray, ray_t),
        }
    }

    fn hit_node<'a>(&'a self, index: u32, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'a>> {
        let node = &self.nodes[index as usize];
        if !node.bbox.hit(ray, ray_t) {
            return None;
        }

        let left = self.hit_ref(node.left, ray, ray_t);
        if node.left == node.right {
            return left;
        }

        // Only look for something closer on the right
        let right_t = left.as_ref().map_or(ray_t, |rec| ray_t.with_max(rec.t));
        let right = self.hit_ref(node.right, ray, right_t);

        right.or(left)
    }
}

/// Recursively build the subtree over `order`, returning the new node's index.
///
/// Children are pushed before their parent.
fn build_node(
    nodes: &mut Vec<BvhNode>,
    boxes: &[Aabb],
    order: &mut [u32],
    rng: &mut dyn RngCore,
) -> u32 {
    let axis: usize = rng.gen_range(0..3);
    let key = |i: u32| boxes[i as usize].axis_min(axis);

    let (left, right) = match order.len() {
        1 => (NodeRef::Object(order[0]), NodeRef::Object(order[0])),
        2 => {
            let (a, b) = (order[0], order[1]);
            if key(a) < key(b) {
                (NodeRef::Object(a), NodeRef::Object(b))
            } else {
                (NodeRef::Object(b), NodeRef::Object(a))
            }
        }
        n => {
            order.sort_by(|&a, &b| key(a).total_cmp(&key(b)));
            let (lo, hi) = order.split_at_mut(n / 2);
            let left = build_node(nodes, boxes, lo, rng);
            let right = build_node(nodes, boxes, hi, rng);
            (NodeRef::Node(left), NodeRef::Node(right))
        }
    };

    let bbox = Aabb::surrounding(&child_box(nodes, boxes, left), &child_box(nodes, boxes, right));
    nodes.push(BvhNode { left, right, bbox });
    (nodes.len() - 1) as u32
}

#[inline]
fn child_box(nodes: &[BvhNode], boxes: &[Aabb], child: NodeRef) -> Aabb {
    match child {
        NodeRef::Node(i) => nodes[i as usize].bbox,
        NodeRef::Object(i) => boxes[i as usize],
    }
}

impl Hittable for Bvh {
    fn hit<'a>(&'a self, ray: &Ray, ray_t: Interval) -> Option<HitRecord<'a>> {
        self.hit_node(self.root, ray, ray_t)
    }

    fn bounding_box(&self, _time0: f32, _time1: f32) -> Option<Aabb> {
        Some(self.nodes[self.root as usize].bbox)
    }
}
