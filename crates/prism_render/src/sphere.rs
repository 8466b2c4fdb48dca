//! Sphere primitive, stationary or moving.

use crate::hittable::{HitRecord, Hittable};
use crate::material::Material;
use prism_math::{Aabb, Interval, Point3, Ray, Vec3};
use rand::RngCore;
use std::f64::consts::PI;
use std::sync::Arc;

/// A sphere, optionally sweeping between two centers over the ray-time
/// interval [0, 1] for motion blur.
pub struct Sphere {
    center: Point3,
    center_vec: Vec3,
    radius: f64,
    material: Arc<dyn Material>,
    is_moving: bool,
    bbox: Aabb,
}

impl Sphere {
    /// Create a stationary sphere.
    pub fn stationary(center: Point3, radius: f64, material: Arc<dyn Material>) -> Self {
        let radius = radius.max(0.0);
        let rvec = Vec3::splat(radius);
        let bbox = Aabb::from_points(center - rvec, center + rvec);

        Self {
            center,
            center_vec: Vec3::ZERO,
            radius,
            material,
            is_moving: false,
            bbox,
        }
    }

    /// Create a sphere moving from `one` (time 0) to `two` (time 1).
    pub fn moving(one: Point3, two: Point3, radius: f64, material: Arc<dyn Material>) -> Self {
        let radius = radius.max(0.0);
        let rvec = Vec3::splat(radius);
        let box0 = Aabb::from_points(one - rvec, one + rvec);
        let box1 = Aabb::from_points(two - rvec, two + rvec);

        Self {
            center: one,
            center_vec: two - one,
            radius,
            material,
            is_moving: true,
            bbox: Aabb::surrounding(&box0, &box1),
        }
    }

    fn center_at(&self, time: f64) -> Point3 {
        self.center + time * self.center_vec
    }

    /// Spherical UV for a point on the unit sphere about the origin.
    ///
    /// theta measures down from +Y, phi around the Y axis from -X.
    fn sphere_uv(p: Vec3) -> (f64, f64) {
        let theta = (-p.y).acos();
        let phi = (-p.z).atan2(p.x) + PI;

        (phi / (2.0 * PI), theta / PI)
    }
}

impl Hittable for Sphere {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rec: &mut HitRecord<'a>,
        _rng: &mut dyn RngCore,
    ) -> bool {
        let center = if self.is_moving {
            self.center_at(ray.time())
        } else {
            self.center
        };

        let oc = center - ray.origin();
        let a = ray.direction().length_squared();
        let h = ray.direction().dot(oc);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = h * h - a * c;
        if discriminant < 0.0 {
            return false;
        }

        let sqrtd = discriminant.sqrt();

        // Find the nearest root in the acceptable range
        let mut root = (h - sqrtd) / a;
        if !ray_t.surrounds(root) {
            root = (h + sqrtd) / a;
            if !ray_t.surrounds(root) {
                return false;
            }
        }

        rec.t = root;
        rec.p = ray.at(rec.t);
        let outward_normal = (rec.p - center) / self.radius;
        rec.set_face_normal(ray, outward_normal);
        (rec.u, rec.v) = Self::sphere_uv(outward_normal);
        rec.material = self.material.as_ref();

        true
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }
}
