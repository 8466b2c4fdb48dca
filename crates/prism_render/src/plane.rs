//! Infinite plane primitive.

use crate::hittable::{HitRecord, Hittable};
use crate::material::Material;
use prism_math::{Aabb, Interval, Point3, Ray, Vec3};
use rand::RngCore;
use std::sync::Arc;

/// An unbounded plane through `point` with the given normal.
///
/// The bounding box degenerates to the anchor point (padded to minimum
/// thickness), so a plane is effectively invisible to the BVH's spatial
/// pruning; scenes keep planes in the linear list they came in with.
pub struct Plane {
    point: Point3,
    normal: Vec3,
    material: Arc<dyn Material>,
    bbox: Aabb,
}

impl Plane {
    pub fn new(point: Point3, normal: Vec3, material: Arc<dyn Material>) -> Self {
        Self {
            point,
            normal: normal.normalize(),
            material,
            bbox: Aabb::from_points(point, point),
        }
    }
}

impl Hittable for Plane {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rec: &mut HitRecord<'a>,
        _rng: &mut dyn RngCore,
    ) -> bool {
        let denom = self.normal.dot(ray.direction());

        // Parallel to the plane
        if denom.abs() < 1e-8 {
            return false;
        }

        let t = self.normal.dot(self.point - ray.origin()) / denom;
        if !ray_t.contains(t) {
            return false;
        }

        rec.t = t;
        rec.p = ray.at(t);
        rec.u = 0.0;
        rec.v = 0.0;
        rec.material = self.material.as_ref();
        rec.set_face_normal(ray, self.normal);

        true
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}
