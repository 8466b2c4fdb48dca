//! Material trait and the five surface/volume materials.

use crate::hittable::HitRecord;
use crate::sampling::{gen_f64, random_unit_vector};
use crate::texture::{SolidColor, Texture};
use prism_math::{near_zero, Point3, Ray, Vec3};
use rand::RngCore;
use std::sync::Arc;

/// Color type alias (linear RGB, components in [0, inf))
pub type Color = Vec3;

/// Trait for materials that describe how light interacts with surfaces.
pub trait Material: Send + Sync {
    /// Scatter an incoming ray.
    ///
    /// Returns Some((attenuation, scattered_ray)) if the ray scatters,
    /// or None if the ray is absorbed.
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<(Color, Ray)>;

    /// Light emitted at the given surface parameters and point.
    ///
    /// Most materials emit nothing.
    fn emitted(&self, _u: f64, _v: f64, _p: Point3) -> Color {
        Color::ZERO
    }
}

/// Lambertian (diffuse) material, attenuated by a texture.
pub struct Lambertian {
    texture: Arc<dyn Texture>,
}

impl Lambertian {
    /// Create a Lambertian material over an arbitrary texture.
    pub fn new(texture: Arc<dyn Texture>) -> Self {
        Self { texture }
    }

    /// Create a Lambertian material with a uniform albedo.
    pub fn from_color(albedo: Color) -> Self {
        Self::new(Arc::new(SolidColor::new(albedo)))
    }
}

impl Material for Lambertian {
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<(Color, Ray)> {
        let mut scatter_direction = rec.normal + random_unit_vector(rng);

        // Catch degenerate scatter direction
        if near_zero(scatter_direction) {
            scatter_direction = rec.normal;
        }

        let scattered = Ray::new(rec.p, scatter_direction, ray_in.time());
        let attenuation = self.texture.value(rec.u, rec.v, rec.p);
        Some((attenuation, scattered))
    }
}

/// Metal (specular) material.
pub struct Metal {
    albedo: Color,
    fuzz: f64,
}

impl Metal {
    /// Create a new Metal material.
    ///
    /// - `albedo`: the color of the metal
    /// - `fuzz`: roughness, clamped to [0, 1]; 0 is a perfect mirror
    pub fn new(albedo: Color, fuzz: f64) -> Self {
        Self {
            albedo,
            fuzz: fuzz.clamp(0.0, 1.0),
        }
    }
}

impl Material for Metal {
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<(Color, Ray)> {
        let reflected = reflect(ray_in.direction().normalize(), rec.normal);
        let scattered_dir = reflected + self.fuzz * random_unit_vector(rng);

        // Fuzz can push the direction below the horizon; absorb there.
        if scattered_dir.dot(rec.normal) > 0.0 {
            let scattered = Ray::new(rec.p, scattered_dir, ray_in.time());
            Some((self.albedo, scattered))
        } else {
            None
        }
    }
}

/// Dielectric (glass) material with Schlick reflectance.
pub struct Dielectric {
    refraction_index: f64,
    albedo: Color,
}

impl Dielectric {
    /// Clear dielectric (white attenuation).
    ///
    /// `refraction_index`: 1.0 = air, 1.5 = glass, 2.4 = diamond.
    pub fn new(refraction_index: f64) -> Self {
        Self::with_albedo(refraction_index, Color::ONE)
    }

    /// Tinted dielectric.
    pub fn with_albedo(refraction_index: f64, albedo: Color) -> Self {
        Self {
            refraction_index,
            albedo,
        }
    }

    /// Schlick's approximation for reflectance.
    fn reflectance(cosine: f64, refraction_index: f64) -> f64 {
        let r0 = ((1.0 - refraction_index) / (1.0 + refraction_index)).powi(2);
        r0 + (1.0 - r0) * (1.0 - cosine).powi(5)
    }
}

impl Material for Dielectric {
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<(Color, Ray)> {
        let ri = if rec.front_face {
            1.0 / self.refraction_index
        } else {
            self.refraction_index
        };

        let unit_direction = ray_in.direction().normalize();
        let cos_theta = (-unit_direction).dot(rec.normal).min(1.0);
        let sin_theta = (1.0 - cos_theta * cos_theta).sqrt();

        let cannot_refract = ri * sin_theta > 1.0;
        let direction =
            if cannot_refract || Self::reflectance(cos_theta, ri) > gen_f64(rng) {
                reflect(unit_direction, rec.normal)
            } else {
                refract(unit_direction, rec.normal, ri)
            };

        let scattered = Ray::new(rec.p, direction, ray_in.time());
        Some((self.albedo, scattered))
    }
}

/// Isotropic phase function: scatters uniformly over the sphere.
///
/// This is the material a constant-density medium hands back on a
/// scattering event; attenuation comes from the texture at the hit,
/// exactly as with Lambertian.
pub struct Isotropic {
    texture: Arc<dyn Texture>,
}

impl Isotropic {
    pub fn new(texture: Arc<dyn Texture>) -> Self {
        Self { texture }
    }

    pub fn from_color(albedo: Color) -> Self {
        Self::new(Arc::new(SolidColor::new(albedo)))
    }
}

impl Material for Isotropic {
    fn scatter(
        &self,
        ray_in: &Ray,
        rec: &HitRecord,
        rng: &mut dyn RngCore,
    ) -> Option<(Color, Ray)> {
        let scattered = Ray::new(rec.p, random_unit_vector(rng), ray_in.time());
        let attenuation = self.texture.value(rec.u, rec.v, rec.p);
        Some((attenuation, scattered))
    }
}

/// Diffuse light emitter. Never scatters.
pub struct DiffuseLight {
    texture: Arc<dyn Texture>,
}

impl DiffuseLight {
    pub fn new(texture: Arc<dyn Texture>) -> Self {
        Self { texture }
    }

    pub fn from_color(emit: Color) -> Self {
        Self::new(Arc::new(SolidColor::new(emit)))
    }
}

impl Material for DiffuseLight {
    fn scatter(
        &self,
        _ray_in: &Ray,
        _rec: &HitRecord,
        _rng: &mut dyn RngCore,
    ) -> Option<(Color, Ray)> {
        None
    }

    fn emitted(&self, u: f64, v: f64, p: Point3) -> Color {
        self.texture.value(u, v, p)
    }
}

/// Reflect a vector about a normal.
#[inline]
fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Refract a unit vector through a surface with relative index
/// `etai_over_etat`.
#[inline]
fn refract(uv: Vec3, n: Vec3, etai_over_etat: f64) -> Vec3 {
    let cos_theta = (-uv).dot(n).min(1.0);
    let r_out_perp = etai_over_etat * (uv + cos_theta * n);
    let r_out_parallel = -(1.0 - r_out_perp.length_squared()).abs().sqrt() * n;
    r_out_perp + r_out_parallel
}

#[cfg(test)]
mod tests {
    use super::*;
    use prism_math::Interval;
    use rand::rngs::mock::StepRng;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn record_at(normal: Vec3, front_face: bool) -> HitRecord<'static> {
        HitRecord {
            p: Point3::ZERO,
            normal,
            front_face,
            ..HitRecord::default()
        }
    }

    #[test]
    fn test_lambertian_always_scatters() {
        let mat = Lambertian::from_color(Color::new(0.5, 0.2, 0.1));
        let rec = record_at(Vec3::Y, true);
        let ray = Ray::new_simple(Point3::new(0.0, 1.0, 0.0), Vec3::new(0.0, -1.0, 0.0));
        let mut rng = SmallRng::seed_from_u64(1);

        for _ in 0..50 {
            let (attenuation, scattered) = mat
                .scatter(&ray, &rec, &mut rng)
                .expect("lambertian never absorbs");
            assert_eq!(attenuation, Color::new(0.5, 0.2, 0.1));
            // Scatter direction stays in the hemisphere around the normal.
            assert!(scattered.direction().dot(rec.normal) > 0.0);
        }
    }

    #[test]
    fn test_metal_mirror_reflection() {
        let mat = Metal::new(Color::ONE, 0.0);
        let rec = record_at(Vec3::Y, true);
        let incoming = Ray::new_simple(
            Point3::new(-1.0, 1.0, 0.0),
            Vec3::new(1.0, -1.0, 0.0),
        );
        let mut rng = SmallRng::seed_from_u64(1);

        let (_, scattered) = mat.scatter(&incoming, &rec, &mut rng).expect("reflects");
        let d = scattered.direction().normalize();
        let expected = Vec3::new(1.0, 1.0, 0.0).normalize();
        assert!((d - expected).length() < 1e-12);
    }

    #[test]
    fn test_metal_fuzz_clamped() {
        // A fuzz of 10 would scatter everywhere; construction clamps it.
        let mat = Metal::new(Color::ONE, 10.0);
        let rec = record_at(Vec3::Y, true);
        let incoming = Ray::new_simple(Point3::new(0.0, 1.0, 0.0), Vec3::new(0.0, -1.0, 0.0));
        let mut rng = SmallRng::seed_from_u64(1);

        // With fuzz clamped to 1, every scattered ray that survives
        // stays above the surface; below-horizon samples are absorbed.
        for _ in 0..100 {
            if let Some((_, scattered)) = mat.scatter(&incoming, &rec, &mut rng) {
                assert!(scattered.direction().dot(rec.normal) > 0.0);
            }
        }
    }

    #[test]
    fn test_schlick_reflectance_bounds() {
        for ior in [0.5, 1.0, 1.5, 2.4, 10.0] {
            for i in 0..=100 {
                let cos = i as f64 / 100.0;
                let r = Dielectric::reflectance(cos, ior);
                assert!((0.0..=1.0).contains(&r), "r={r} cos={cos} ior={ior}");
            }
            // At normal incidence Schlick reduces to r0 exactly.
            let r0 = ((1.0 - ior) / (1.0 + ior)).powi(2);
            assert!((Dielectric::reflectance(1.0, ior) - r0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_schlick_rises_toward_grazing() {
        // Reflectance grows monotonically as cos(theta) drops to zero.
        let mut previous = Dielectric::reflectance(1.0, 1.5);
        for i in (0..100).rev() {
            let r = Dielectric::reflectance(i as f64 / 100.0, 1.5);
            assert!(r >= previous);
            previous = r;
        }
    }

    #[test]
    fn test_dielectric_total_internal_reflection() {
        // Ray inside glass (back face, ri = 1.5) at a grazing angle:
        // eta * sin(theta) > 1, so the ray must reflect even when the
        // RNG draws ~1.0 (which otherwise always refracts).
        let mat = Dielectric::new(1.5);
        let rec = record_at(Vec3::Y, false);
        let incoming = Ray::new_simple(
            Point3::ZERO,
            Vec3::new(1.0, -0.2, 0.0).normalize(),
        );
        let mut rng = StepRng::new(u64::MAX, 0);

        let (_, scattered) = mat.scatter(&incoming, &rec, &mut rng).expect("always scatters");
        // A reflected ray flips the sign of the normal component.
        assert!(scattered.direction().y > 0.0);
    }

    #[test]
    fn test_dielectric_refracts_head_on() {
        let mat = Dielectric::new(1.5);
        let rec = record_at(Vec3::Y, true);
        let incoming = Ray::new_simple(Point3::new(0.0, 1.0, 0.0), Vec3::new(0.0, -1.0, 0.0));
        // RNG near 1.0 defeats the Schlick lottery, forcing refraction.
        let mut rng = StepRng::new(u64::MAX, 0);

        let (attenuation, scattered) = mat.scatter(&incoming, &rec, &mut rng).expect("scatters");
        assert_eq!(attenuation, Color::ONE);
        // Head-on refraction continues straight through.
        assert!((scattered.direction().normalize() - Vec3::new(0.0, -1.0, 0.0)).length() < 1e-12);
    }

    #[test]
    fn test_diffuse_light_emits_and_never_scatters() {
        let mat = DiffuseLight::from_color(Color::new(15.0, 15.0, 15.0));
        let rec = record_at(Vec3::Y, true);
        let ray = Ray::new_simple(Point3::ZERO, Vec3::new(0.0, -1.0, 0.0));
        let mut rng = SmallRng::seed_from_u64(1);

        assert!(mat.scatter(&ray, &rec, &mut rng).is_none());
        assert_eq!(
            mat.emitted(0.5, 0.5, Point3::ZERO),
            Color::new(15.0, 15.0, 15.0)
        );
        // Emission above 1.0 is legal; values only clamp at output.
        assert!(Interval::new(0.0, 1.0).clamp(mat.emitted(0.0, 0.0, Point3::ZERO).x) <= 1.0);
    }

    #[test]
    fn test_isotropic_scatters_uniformly() {
        let mat = Isotropic::from_color(Color::new(0.2, 0.4, 0.9));
        let rec = record_at(Vec3::X, true);
        let ray = Ray::new_simple(Point3::ZERO, Vec3::Z);
        let mut rng = SmallRng::seed_from_u64(9);

        let mut saw_backward = false;
        for _ in 0..200 {
            let (attenuation, scattered) = mat.scatter(&ray, &rec, &mut rng).expect("scatters");
            assert_eq!(attenuation, Color::new(0.2, 0.4, 0.9));
            assert!((scattered.direction().length() - 1.0).abs() < 1e-12);
            if scattered.direction().z < 0.0 {
                saw_backward = true;
            }
        }
        // The phase function is uniform over the sphere, so backward
        // scattering must occur.
        assert!(saw_backward);
    }
}
