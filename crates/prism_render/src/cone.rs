//! Finite cone primitive, axis-aligned along y.

use crate::hittable::{HitRecord, Hittable};
use crate::material::Material;
use prism_math::{Aabb, Interval, Point3, Ray, Vec3};
use rand::RngCore;
use std::sync::Arc;

/// A cone with its apex at `center`, widening along +y to `radius` at
/// height `height`, closed by a top cap disk.
pub struct Cone {
    center: Point3,
    radius: f64,
    height: f64,
    material: Arc<dyn Material>,
    bbox: Aabb,
}

impl Cone {
    pub fn new(center: Point3, radius: f64, height: f64, material: Arc<dyn Material>) -> Self {
        let extent = Vec3::new(radius, 0.0, radius);
        let bbox = Aabb::from_points(
            center - extent,
            center + extent + Vec3::new(0.0, height, 0.0),
        );

        Self {
            center,
            radius,
            height,
            material,
            bbox,
        }
    }

    /// Intersection with the top cap disk at `center.y + height`.
    fn hit_cap(&self, ray: &Ray, window: Interval) -> Option<f64> {
        let dy = ray.direction().y;
        if dy.abs() < 1e-8 {
            return None;
        }

        let t = (self.center.y + self.height - ray.origin().y) / dy;
        if !window.surrounds(t) {
            return None;
        }

        let p = ray.at(t);
        let dx = p.x - self.center.x;
        let dz = p.z - self.center.z;
        (dx * dx + dz * dz <= self.radius * self.radius).then_some(t)
    }

    /// Intersection with the slanted surface: the cylinder quadratic
    /// with the y term scaled by (r/h)^2.
    fn hit_side(&self, ray: &Ray, window: Interval) -> Option<(f64, Vec3)> {
        let oc = ray.origin() - self.center;
        let dir = ray.direction();
        let k = (self.radius * self.radius) / (self.height * self.height);

        let a = dir.x * dir.x + dir.z * dir.z - k * dir.y * dir.y;
        if a.abs() < 1e-12 {
            return None;
        }
        let b = 2.0 * (dir.x * oc.x + dir.z * oc.z - k * dir.y * oc.y);
        let c = oc.x * oc.x + oc.z * oc.z - k * oc.y * oc.y;

        let discriminant = b * b - 4.0 * a * c;
        if discriminant < 0.0 {
            return None;
        }
        let sqrtd = discriminant.sqrt();

        let mut root = (-b - sqrtd) / (2.0 * a);
        if !window.surrounds(root) {
            root = (-b + sqrtd) / (2.0 * a);
            if !window.surrounds(root) {
                return None;
            }
        }

        // The quadratic describes a double cone; keep the body only.
        let y = ray.origin().y + root * dir.y;
        if y < self.center.y || y > self.center.y + self.height {
            return None;
        }

        let p = ray.at(root);
        let mut outward = p - self.center;
        outward.y = 0.0;
        if outward.length_squared() < 1e-24 {
            // Apex graze: any radial direction serves.
            outward = Vec3::X;
        }
        Some((root, outward.normalize()))
    }
}

impl Hittable for Cone {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rec: &mut HitRecord<'a>,
        _rng: &mut dyn RngCore,
    ) -> bool {
        let mut closest: Option<(f64, Vec3)> = None;
        let mut window = ray_t;

        if let Some(t) = self.hit_cap(ray, window) {
            window.max = t;
            closest = Some((t, Vec3::Y));
        }

        if let Some((t, outward)) = self.hit_side(ray, window) {
            closest = Some((t, outward));
        }

        let Some((t, outward)) = closest else {
            return false;
        };

        rec.t = t;
        rec.p = ray.at(t);
        rec.u = 0.0;
        rec.v = 0.0;
        rec.material = self.material.as_ref();
        rec.set_face_normal(ray, outward);

        true
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}
