//! Constant-density participating medium (smoke, fog).

use crate::hittable::{HitRecord, Hittable};
use crate::material::{Color, Isotropic, Material};
use crate::sampling::gen_f64;
use crate::texture::Texture;
use prism_math::{Aabb, Interval, Ray, Vec3};
use rand::RngCore;
use std::sync::Arc;

/// An isotropic medium filling a boundary volume.
///
/// Rays entering the boundary scatter after an exponentially
/// distributed free path; rays whose sampled path exceeds the chord
/// through the volume pass straight through.
pub struct ConstantMedium {
    boundary: Arc<dyn Hittable>,
    neg_inv_density: f64,
    phase_function: Arc<dyn Material>,
}

impl ConstantMedium {
    pub fn new(boundary: Arc<dyn Hittable>, density: f64, texture: Arc<dyn Texture>) -> Self {
        Self {
            boundary,
            neg_inv_density: -1.0 / density,
            phase_function: Arc::new(Isotropic::new(texture)),
        }
    }

    pub fn from_color(boundary: Arc<dyn Hittable>, density: f64, albedo: Color) -> Self {
        Self {
            boundary,
            neg_inv_density: -1.0 / density,
            phase_function: Arc::new(Isotropic::from_color(albedo)),
        }
    }
}

impl Hittable for ConstantMedium {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rec: &mut HitRecord<'a>,
        rng: &mut dyn RngCore,
    ) -> bool {
        // Entry and exit hits over an unbounded interval; the second
        // search restarts just past the first so concave shells and
        // rays starting inside the volume both resolve.
        let mut rec1 = HitRecord::default();
        let mut rec2 = HitRecord::default();

        if !self.boundary.hit(ray, Interval::UNIVERSE, &mut rec1, rng) {
            return false;
        }
        if !self.boundary.hit(
            ray,
            Interval::new(rec1.t + 0.0001, f64::INFINITY),
            &mut rec2,
            rng,
        ) {
            return false;
        }

        let mut t1 = rec1.t.max(ray_t.min);
        let t2 = rec2.t.min(ray_t.max);

        if t1 >= t2 {
            return false;
        }
        if t1 < 0.0 {
            t1 = 0.0;
        }

        let length = ray.direction().length();
        let distance_inside = (t2 - t1) * length;
        let hit_distance = self.neg_inv_density * gen_f64(rng).ln();

        if hit_distance > distance_inside {
            return false;
        }

        rec.t = t1 + hit_distance / length;
        rec.p = ray.at(rec.t);
        rec.normal = Vec3::X; // arbitrary
        rec.front_face = true; // also arbitrary
        rec.u = 0.0;
        rec.v = 0.0;
        rec.material = self.phase_function.as_ref();

        true
    }

    fn bounding_box(&self) -> Aabb {
        self.boundary.bounding_box()
    }
}
