//! Bounding Volume Hierarchy (BVH) acceleration structure.
//!
//! A strictly binary tree built by recursive longest-axis partitioning:
//! each node takes the union box of its range, sorts the range by each
//! child's minimum bound on the union's longest axis, and splits at the
//! midpoint. A single-object range places that object on both sides,
//! which keeps traversal branch-free.

use crate::hittable::{HitRecord, Hittable, HittableList};
use prism_math::{Aabb, Interval, Ray};
use rand::RngCore;
use std::cmp::Ordering;
use std::sync::Arc;

pub struct BvhNode {
    left: Arc<dyn Hittable>,
    right: Arc<dyn Hittable>,
    bbox: Aabb,
}

impl BvhNode {
    /// Build a BVH over a list of objects.
    pub fn new(mut objects: Vec<Arc<dyn Hittable>>) -> Self {
        if objects.is_empty() {
            // Nothing to accelerate; both children are an empty list
            // whose box rejects every ray.
            let empty: Arc<dyn Hittable> = Arc::new(HittableList::new());
            return Self {
                left: empty.clone(),
                right: empty,
                bbox: Aabb::EMPTY,
            };
        }
        let end = objects.len();
        Self::build(&mut objects, 0, end)
    }

    /// Build a BVH from a composed scene list.
    pub fn from_list(list: HittableList) -> Self {
        Self::new(list.into_objects())
    }

    fn build(objects: &mut [Arc<dyn Hittable>], start: usize, end: usize) -> Self {
        let mut bbox = Aabb::EMPTY;
        for object in &objects[start..end] {
            bbox = Aabb::surrounding(&bbox, &object.bounding_box());
        }

        let axis = bbox.longest_axis();
        let span = end - start;

        let (left, right) = match span {
            1 => (objects[start].clone(), objects[start].clone()),
            2 => (objects[start].clone(), objects[start + 1].clone()),
            _ => {
                objects[start..end].sort_by(|a, b| Self::box_compare(a, b, axis));

                let mid = start + span / 2;
                let left: Arc<dyn Hittable> = Arc::new(Self::build(objects, start, mid));
                let right: Arc<dyn Hittable> = Arc::new(Self::build(objects, mid, end));
                (left, right)
            }
        };

        Self { left, right, bbox }
    }

    fn box_compare(a: &Arc<dyn Hittable>, b: &Arc<dyn Hittable>, axis: usize) -> Ordering {
        let a_min = a.bounding_box().axis_interval(axis).min;
        let b_min = b.bounding_box().axis_interval(axis).min;
        a_min.partial_cmp(&b_min).unwrap_or(Ordering::Equal)
    }
}

impl Hittable for BvhNode {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rec: &mut HitRecord<'a>,
        rng: &mut dyn RngCore,
    ) -> bool {
        if !self.bbox.hit(ray, ray_t) {
            return false;
        }

        let hit_left = self.left.hit(ray, ray_t, rec, rng);
        // The right subtree only needs to beat the best hit so far.
        let right_max = if hit_left { rec.t } else { ray_t.max };
        let hit_right = self
            .right
            .hit(ray, Interval::new(ray_t.min, right_max), rec, rng);

        hit_left || hit_right
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}
