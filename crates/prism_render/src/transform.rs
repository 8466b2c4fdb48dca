//! Affine decorators: translation and per-axis rotation.
//!
//! Both wrap a single child and work by transforming the ray into the
//! child's frame, forwarding, and transforming the hit back out.

use crate::hittable::{HitRecord, Hittable};
use prism_math::{Aabb, Interval, Point3, Ray, Vec3};
use rand::RngCore;
use std::sync::Arc;

/// Moves a child by a fixed offset.
pub struct Translate {
    object: Arc<dyn Hittable>,
    offset: Vec3,
    bbox: Aabb,
}

impl Translate {
    pub fn new(object: Arc<dyn Hittable>, offset: Vec3) -> Self {
        let bbox = object.bounding_box().translate(offset);
        Self {
            object,
            offset,
            bbox,
        }
    }
}

impl Hittable for Translate {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rec: &mut HitRecord<'a>,
        rng: &mut dyn RngCore,
    ) -> bool {
        // Move the ray into the child's frame instead of moving the child.
        let offset_ray = Ray::new(ray.origin() - self.offset, ray.direction(), ray.time());

        if !self.object.hit(&offset_ray, ray_t, rec, rng) {
            return false;
        }

        rec.p += self.offset;
        true
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}

/// Rotation axis selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

/// Rotate a point by +theta about the given axis.
///
/// Negating `sin_theta` gives the inverse rotation, so one function
/// serves both directions.
fn rotate_by(axis: Axis, cos_theta: f64, sin_theta: f64, v: Vec3) -> Vec3 {
    match axis {
        Axis::X => Vec3::new(
            v.x,
            cos_theta * v.y + sin_theta * v.z,
            -sin_theta * v.y + cos_theta * v.z,
        ),
        Axis::Y => Vec3::new(
            cos_theta * v.x + sin_theta * v.z,
            v.y,
            -sin_theta * v.x + cos_theta * v.z,
        ),
        Axis::Z => Vec3::new(
            cos_theta * v.x + sin_theta * v.y,
            -sin_theta * v.x + cos_theta * v.y,
            v.z,
        ),
    }
}

/// Rotates a child about one world axis.
///
/// Incoming rays are rotated by -theta into the child's frame; hit
/// points and normals are rotated by +theta back out. The bounding box
/// is the axis-aligned envelope of the child's eight rotated corners,
/// computed once at construction.
pub struct Rotate {
    object: Arc<dyn Hittable>,
    axis: Axis,
    sin_theta: f64,
    cos_theta: f64,
    bbox: Aabb,
}

impl Rotate {
    pub fn new(object: Arc<dyn Hittable>, axis: Axis, angle_degrees: f64) -> Self {
        let radians = angle_degrees.to_radians();
        let sin_theta = radians.sin();
        let cos_theta = radians.cos();

        let child_box = object.bounding_box();
        let mut min = Point3::splat(f64::INFINITY);
        let mut max = Point3::splat(f64::NEG_INFINITY);

        for i in 0..2 {
            for j in 0..2 {
                for k in 0..2 {
                    let corner = Point3::new(
                        if i == 0 { child_box.x.min } else { child_box.x.max },
                        if j == 0 { child_box.y.min } else { child_box.y.max },
                        if k == 0 { child_box.z.min } else { child_box.z.max },
                    );
                    let rotated = rotate_by(axis, cos_theta, sin_theta, corner);
                    min = min.min(rotated);
                    max = max.max(rotated);
                }
            }
        }

        Self {
            object,
            axis,
            sin_theta,
            cos_theta,
            bbox: Aabb::from_points(min, max),
        }
    }
}

impl Hittable for Rotate {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rec: &mut HitRecord<'a>,
        rng: &mut dyn RngCore,
    ) -> bool {
        // World to object space: rotate by -theta.
        let origin = rotate_by(self.axis, self.cos_theta, -self.sin_theta, ray.origin());
        let direction = rotate_by(self.axis, self.cos_theta, -self.sin_theta, ray.direction());
        let rotated = Ray::new(origin, direction, ray.time());

        if !self.object.hit(&rotated, ray_t, rec, rng) {
            return false;
        }

        // Object back to world space: rotate by +theta.
        rec.p = rotate_by(self.axis, self.cos_theta, self.sin_theta, rec.p);
        rec.normal = rotate_by(self.axis, self.cos_theta, self.sin_theta, rec.normal);

        true
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}
