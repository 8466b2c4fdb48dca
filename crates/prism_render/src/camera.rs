//! Thin-lens camera with defocus blur and motion-blur ray times.

use crate::material::Color;
use crate::sampling::{gen_f64, random_in_unit_disk};
use prism_math::{Point3, Ray, Vec3};
use rand::RngCore;

/// Camera parameters plus the derived viewport geometry.
///
/// Callers set the public fields (or use the builder methods), then
/// `initialize` once before generating rays.
#[derive(Clone)]
pub struct Camera {
    // Image settings
    pub aspect_ratio: f64,
    pub image_width: u32,
    pub samples_per_pixel: u32,
    pub max_depth: u32,

    /// Radiance for rays that escape the scene.
    pub background: Color,

    // Camera positioning
    look_from: Point3,
    look_at: Point3,
    vup: Vec3,

    // Lens settings
    vfov: f64,          // Vertical field of view in degrees
    defocus_angle: f64, // Variation angle of rays through each pixel
    focus_dist: f64,    // Distance from camera to plane of perfect focus

    // Cached computed values (set by initialize())
    image_height: u32,
    center: Point3,
    pixel00_loc: Point3,
    pixel_delta_u: Vec3,
    pixel_delta_v: Vec3,
    u: Vec3,
    v: Vec3,
    w: Vec3,
    defocus_disk_u: Vec3,
    defocus_disk_v: Vec3,
    pixel_sample_scale: f64,
}

impl Camera {
    /// Create a camera with default settings.
    pub fn new() -> Self {
        Self {
            aspect_ratio: 1.0,
            image_width: 100,
            samples_per_pixel: 10,
            max_depth: 10,
            background: Color::ZERO,
            look_from: Point3::ZERO,
            look_at: Point3::new(0.0, 0.0, -1.0),
            vup: Vec3::Y,
            vfov: 90.0,
            defocus_angle: 0.0,
            focus_dist: 10.0,
            // Cached values (filled in by initialize())
            image_height: 0,
            center: Point3::ZERO,
            pixel00_loc: Point3::ZERO,
            pixel_delta_u: Vec3::ZERO,
            pixel_delta_v: Vec3::ZERO,
            u: Vec3::X,
            v: Vec3::Y,
            w: Vec3::Z,
            defocus_disk_u: Vec3::ZERO,
            defocus_disk_v: Vec3::ZERO,
            pixel_sample_scale: 0.1,
        }
    }

    /// Set image shape.
    pub fn with_image(mut self, aspect_ratio: f64, image_width: u32) -> Self {
        self.aspect_ratio = aspect_ratio;
        self.image_width = image_width;
        self
    }

    /// Set quality settings.
    pub fn with_quality(mut self, samples_per_pixel: u32, max_depth: u32) -> Self {
        self.samples_per_pixel = samples_per_pixel;
        self.max_depth = max_depth;
        self
    }

    /// Set camera position.
    pub fn with_position(mut self, look_from: Point3, look_at: Point3, vup: Vec3) -> Self {
        self.look_from = look_from;
        self.look_at = look_at;
        self.vup = vup;
        self
    }

    /// Set lens settings.
    pub fn with_lens(mut self, vfov: f64, defocus_angle: f64, focus_dist: f64) -> Self {
        self.vfov = vfov;
        self.defocus_angle = defocus_angle;
        self.focus_dist = focus_dist;
        self
    }

    /// Set background color.
    pub fn with_background(mut self, color: Color) -> Self {
        self.background = color;
        self
    }

    /// Derive the viewport geometry. Must be called (again) after any
    /// parameter change and before generating rays.
    pub fn initialize(&mut self) {
        self.image_height = ((self.image_width as f64 / self.aspect_ratio) as u32).max(1);
        self.pixel_sample_scale = 1.0 / self.samples_per_pixel as f64;
        self.center = self.look_from;

        // Viewport dimensions at the focus plane
        let theta = self.vfov.to_radians();
        let h = (theta / 2.0).tan();
        let viewport_height = 2.0 * h * self.focus_dist;
        let viewport_width =
            viewport_height * (self.image_width as f64 / self.image_height as f64);

        // Orthonormal camera basis
        self.w = (self.look_from - self.look_at).normalize();
        self.u = self.vup.cross(self.w).normalize();
        self.v = self.w.cross(self.u);

        // Viewport edge vectors; v runs down so row 0 is the top row.
        let viewport_u = viewport_width * self.u;
        let viewport_v = -viewport_height * self.v;

        self.pixel_delta_u = viewport_u / self.image_width as f64;
        self.pixel_delta_v = viewport_v / self.image_height as f64;

        let viewport_upper_left =
            self.center - self.focus_dist * self.w - viewport_u / 2.0 - viewport_v / 2.0;
        self.pixel00_loc = viewport_upper_left + 0.5 * (self.pixel_delta_u + self.pixel_delta_v);

        let defocus_radius = self.focus_dist * (self.defocus_angle / 2.0).to_radians().tan();
        self.defocus_disk_u = self.u * defocus_radius;
        self.defocus_disk_v = self.v * defocus_radius;
    }

    /// Image height derived from width and aspect ratio (valid after
    /// `initialize`).
    pub fn image_height(&self) -> u32 {
        self.image_height
    }

    /// Get the samples scale factor (1 / samples_per_pixel).
    pub fn pixel_sample_scale(&self) -> f64 {
        self.pixel_sample_scale
    }

    /// Generate a ray through pixel (i, j), jittered within the pixel
    /// and across the defocus disk, with a random time in [0, 1).
    pub fn get_ray(&self, i: u32, j: u32, rng: &mut dyn RngCore) -> Ray {
        let offset = sample_square(rng);

        let pixel_sample = self.pixel00_loc
            + (i as f64 + offset.x) * self.pixel_delta_u
            + (j as f64 + offset.y) * self.pixel_delta_v;

        let ray_origin = if self.defocus_angle <= 0.0 {
            self.center
        } else {
            self.defocus_disk_sample(rng)
        };

        let ray_direction = pixel_sample - ray_origin;
        let ray_time = gen_f64(rng);

        Ray::new(ray_origin, ray_direction, ray_time)
    }

    /// Sample a point on the defocus disk.
    fn defocus_disk_sample(&self, rng: &mut dyn RngCore) -> Point3 {
        let p = random_in_unit_disk(rng);
        self.center + p.x * self.defocus_disk_u + p.y * self.defocus_disk_v
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

/// Sample a random point in the unit square [-0.5, 0.5] x [-0.5, 0.5].
fn sample_square(rng: &mut dyn RngCore) -> Vec3 {
    Vec3::new(gen_f64(rng) - 0.5, gen_f64(rng) - 0.5, 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_camera_defaults() {
        let mut camera = Camera::new();
        camera.initialize();

        assert_eq!(camera.image_width, 100);
        assert_eq!(camera.image_height(), 100);
        assert_eq!(camera.samples_per_pixel, 10);
        assert_eq!(camera.max_depth, 10);
        assert!((camera.pixel_sample_scale() - 0.1).abs() < 1e-12);
    }

    #[test]
    fn test_image_height_floor_and_minimum() {
        let mut camera = Camera::new().with_image(16.0 / 9.0, 400);
        camera.initialize();
        assert_eq!(camera.image_height(), 225);

        // An extreme aspect ratio still produces at least one row.
        let mut skinny = Camera::new().with_image(1000.0, 10);
        skinny.initialize();
        assert_eq!(skinny.image_height(), 1);
    }

    #[test]
    fn test_camera_basis() {
        let mut camera = Camera::new()
            .with_position(Point3::ZERO, Point3::new(0.0, 0.0, -1.0), Vec3::Y)
            .with_lens(90.0, 0.0, 1.0);
        camera.initialize();

        assert!((camera.w - Vec3::Z).length() < 1e-12);
        assert!((camera.u - Vec3::X).length() < 1e-12);
        assert!((camera.v - Vec3::Y).length() < 1e-12);
    }

    #[test]
    fn test_center_ray_points_at_target() {
        let mut camera = Camera::new()
            .with_image(1.0, 101)
            .with_position(Point3::ZERO, Point3::new(0.0, 0.0, -1.0), Vec3::Y)
            .with_lens(90.0, 0.0, 1.0);
        camera.initialize();

        let mut rng = SmallRng::seed_from_u64(5);
        let ray = camera.get_ray(50, 50, &mut rng);

        assert_eq!(ray.origin(), Point3::ZERO);
        // Center pixel looks down -z; jitter keeps it within a pixel.
        let d = ray.direction();
        assert!(d.z < 0.0);
        assert!(d.x.abs() < 0.05 && d.y.abs() < 0.05);
        // Ray time is the motion-blur parameter.
        assert!((0.0..1.0).contains(&ray.time()));
    }

    #[test]
    fn test_defocus_origin_spreads_on_disk() {
        let mut camera = Camera::new()
            .with_position(Point3::ZERO, Point3::new(0.0, 0.0, -1.0), Vec3::Y)
            .with_lens(90.0, 10.0, 5.0);
        camera.initialize();

        let mut rng = SmallRng::seed_from_u64(5);
        let radius = 5.0 * (5.0_f64).to_radians().tan();
        let mut saw_offset = false;
        for _ in 0..50 {
            let ray = camera.get_ray(50, 50, &mut rng);
            let offset = ray.origin() - Point3::ZERO;
            assert!(offset.length() <= radius + 1e-9);
            if offset.length() > 1e-6 {
                saw_offset = true;
            }
        }
        assert!(saw_offset);
    }
}
