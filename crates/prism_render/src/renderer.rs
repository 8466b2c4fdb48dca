//! Core path tracing renderer.
//!
//! The recursive Monte Carlo estimator plus the parallel bucket driver:
//! emission + attenuated scattered radiance per bounce, multi-sample
//! pixel integration, deterministic per-bucket RNG streams.

use crate::bucket::{generate_buckets, render_bucket, BucketResult, DEFAULT_BUCKET_SIZE};
use crate::hittable::{HitRecord, Hittable};
use crate::material::Color;
use crate::Camera;
use prism_math::{Interval, Ray};
use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};
use rayon::prelude::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

/// Compute the radiance carried back along a ray.
///
/// Recursion: emission at the hit, plus the scattered ray's radiance
/// attenuated componentwise, until the ray escapes (background), is
/// absorbed (emission only), or the depth budget runs out (black).
pub fn ray_color(
    ray: &Ray,
    world: &dyn Hittable,
    depth: u32,
    background: Color,
    rng: &mut dyn RngCore,
) -> Color {
    if depth == 0 {
        return Color::ZERO;
    }

    let mut rec = HitRecord::default();

    // Starting at 0.001 avoids shadow acne from self-intersection.
    if !world.hit(ray, Interval::new(0.001, f64::INFINITY), &mut rec, rng) {
        return background;
    }

    let emission = rec.material.emitted(rec.u, rec.v, rec.p);

    match rec.material.scatter(ray, &rec, rng) {
        Some((attenuation, scattered)) => {
            emission + attenuation * ray_color(&scattered, world, depth - 1, background, rng)
        }
        None => emission,
    }
}

/// Render a single pixel: average `samples_per_pixel` jittered rays.
pub fn render_pixel(
    camera: &Camera,
    world: &dyn Hittable,
    x: u32,
    y: u32,
    rng: &mut dyn RngCore,
) -> Color {
    let mut pixel_color = Color::ZERO;

    for _ in 0..camera.samples_per_pixel {
        let ray = camera.get_ray(x, y, rng);
        pixel_color += ray_color(&ray, world, camera.max_depth, camera.background, rng);
    }

    pixel_color * camera.pixel_sample_scale()
}

/// Apply gamma correction (gamma = 2.0).
#[inline]
pub fn linear_to_gamma(linear: f64) -> f64 {
    if linear > 0.0 {
        linear.sqrt()
    } else {
        0.0
    }
}

/// Render output in linear space, row-major, rows top to bottom.
pub struct ImageBuffer {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<Color>,
}

impl ImageBuffer {
    /// Create a new image buffer filled with black.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Color::ZERO; (width * height) as usize],
        }
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Color {
        self.pixels[(y * self.width + x) as usize]
    }

    /// Set the pixel at (x, y).
    pub fn set(&mut self, x: u32, y: u32, color: Color) {
        self.pixels[(y * self.width + x) as usize] = color;
    }
}

/// Derive one bucket's RNG seed from the base seed and its corner
/// pixel, so the image is reproducible whatever the thread schedule.
fn bucket_seed(base: u64, x: u32, y: u32) -> u64 {
    base.wrapping_add((((y as u64) << 32) | x as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15))
}

/// Render the whole image, buckets in parallel.
///
/// The camera must be initialized. After setup the world, materials,
/// and camera are all immutable, so workers share them by reference;
/// the per-bucket `SmallRng` is each worker's only mutable state.
pub fn render(camera: &Camera, world: &dyn Hittable, seed: u64) -> ImageBuffer {
    let width = camera.image_width;
    let height = camera.image_height();

    let buckets = generate_buckets(width, height, DEFAULT_BUCKET_SIZE);
    let total = buckets.len();
    let completed = AtomicUsize::new(0);
    let start = Instant::now();

    let results: Vec<BucketResult> = buckets
        .par_iter()
        .map(|bucket| {
            let mut rng = SmallRng::seed_from_u64(bucket_seed(seed, bucket.x, bucket.y));
            let pixels = render_bucket(bucket, camera, world, &mut rng);

            let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
            log::debug!(
                "bucket {done}/{total} ({}%, {:.1}s)",
                done * 100 / total,
                start.elapsed().as_secs_f64()
            );

            BucketResult::new(*bucket, pixels)
        })
        .collect();

    let mut image = ImageBuffer::new(width, height);
    for result in &results {
        let bucket = result.bucket;
        for local_y in 0..bucket.height {
            for local_x in 0..bucket.width {
                let color = result.pixels[(local_y * bucket.width + local_x) as usize];
                image.set(bucket.x + local_x, bucket.y + local_y, color);
            }
        }
    }

    log::info!(
        "rendered {width}x{height} at {} spp in {:.2}s",
        camera.samples_per_pixel,
        start.elapsed().as_secs_f64()
    );

    image
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bvh::BvhNode;
    use crate::hittable::HittableList;
    use crate::material::{DiffuseLight, Lambertian, Material, Metal};
    use crate::quad::{make_box, Quad};
    use crate::sphere::Sphere;
    use crate::transform::{Axis, Rotate, Translate};
    use prism_math::{Point3, Vec3};
    use rand::rngs::SmallRng;
    use std::sync::Arc;

    #[test]
    fn test_empty_world_black_background() {
        let mut camera = Camera::new().with_image(1.0, 4).with_quality(1, 1);
        camera.initialize();

        let world = HittableList::new();
        let image = render(&camera, &world, 0);

        assert_eq!(image.width, 4);
        assert_eq!(image.height, 4);
        for y in 0..4 {
            for x in 0..4 {
                assert_eq!(image.get(x, y), Color::ZERO);
            }
        }
    }

    #[test]
    fn test_single_sphere_center_brighter_than_corners() {
        // White background, white Lambertian sphere: corners see the
        // background directly; center rays bounce at least once, and
        // any second hit runs out of depth and terminates black, so
        // the silhouette can only be as bright or darker.
        let mut camera = Camera::new()
            .with_image(1.0, 21)
            .with_quality(4, 2)
            .with_position(Point3::new(0.0, 0.0, 3.0), Point3::ZERO, Vec3::Y)
            .with_lens(60.0, 0.0, 3.0)
            .with_background(Color::ONE);
        camera.initialize();

        let mut world = HittableList::new();
        world.add(Arc::new(Sphere::stationary(
            Point3::ZERO,
            1.0,
            Arc::new(Lambertian::from_color(Color::ONE)),
        )));

        let image = render(&camera, &world, 7);

        let center = image.get(10, 10);
        let corner = image.get(0, 0);
        // Corners see pure background.
        assert!((corner - Color::ONE).length() < 1e-9);
        // The sphere attenuates at least one bounce, so the center is
        // not brighter than the corners and differs from background.
        assert!(center.x <= corner.x + 1e-9);
    }

    #[test]
    fn test_depth_zero_is_black() {
        let mut rng = SmallRng::seed_from_u64(0);
        let world = HittableList::new();
        let ray = Ray::new_simple(Point3::ZERO, Vec3::Z);
        assert_eq!(
            ray_color(&ray, &world, 0, Color::ONE, &mut rng),
            Color::ZERO
        );
    }

    #[test]
    fn test_emissive_quad_dominates_scene() {
        // A small Cornell-flavored scene: red and green walls, a
        // bright overhead light, a rotated metal box. The light stripe
        // must saturate and the red wall side must outweigh the green
        // on the left of the frame.
        let mut world = HittableList::new();

        let red: Arc<dyn Material> =
            Arc::new(Lambertian::from_color(Color::new(0.65, 0.05, 0.05)));
        let green: Arc<dyn Material> =
            Arc::new(Lambertian::from_color(Color::new(0.12, 0.45, 0.15)));
        let white: Arc<dyn Material> = Arc::new(Lambertian::from_color(Color::splat(0.73)));
        let light: Arc<dyn Material> = Arc::new(DiffuseLight::from_color(Color::splat(15.0)));
        let metal: Arc<dyn Material> = Arc::new(Metal::new(Color::splat(0.8), 0.0));

        // The camera looks along +z, so the x = 555 wall lands on the
        // left of the frame; make it the red one.
        world.add(Arc::new(Quad::new(
            Point3::new(555.0, 0.0, 0.0),
            Vec3::new(0.0, 555.0, 0.0),
            Vec3::new(0.0, 0.0, 555.0),
            red,
        )));
        world.add(Arc::new(Quad::new(
            Point3::ZERO,
            Vec3::new(0.0, 555.0, 0.0),
            Vec3::new(0.0, 0.0, 555.0),
            green,
        )));
        world.add(Arc::new(Quad::new(
            Point3::new(343.0, 554.0, 332.0),
            Vec3::new(-130.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, -105.0),
            light,
        )));
        world.add(Arc::new(Quad::new(
            Point3::ZERO,
            Vec3::new(555.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, 555.0),
            white.clone(),
        )));
        world.add(Arc::new(Quad::new(
            Point3::new(555.0, 555.0, 555.0),
            Vec3::new(-555.0, 0.0, 0.0),
            Vec3::new(0.0, 0.0, -555.0),
            white.clone(),
        )));
        world.add(Arc::new(Quad::new(
            Point3::new(0.0, 0.0, 555.0),
            Vec3::new(555.0, 0.0, 0.0),
            Vec3::new(0.0, 555.0, 0.0),
            white,
        )));

        let tall_box: Arc<dyn Hittable> = Arc::new(make_box(
            Point3::ZERO,
            Point3::new(165.0, 330.0, 165.0),
            metal,
        ));
        world.add(Arc::new(Translate::new(
            Arc::new(Rotate::new(tall_box, Axis::Y, 15.0)),
            Vec3::new(265.0, 0.0, 295.0),
        )));

        let bvh = BvhNode::from_list(world);

        let mut camera = Camera::new()
            .with_image(1.0, 32)
            .with_quality(16, 8)
            .with_position(
                Point3::new(278.0, 278.0, -800.0),
                Point3::new(278.0, 278.0, 0.0),
                Vec3::Y,
            )
            .with_lens(40.0, 0.0, 10.0);
        camera.initialize();

        let image = render(&camera, &bvh, 42);

        // Mean red vs green over the left third of the image.
        let mut red_sum = 0.0;
        let mut green_sum = 0.0;
        for y in 0..image.height {
            for x in 0..image.width / 3 {
                let c = image.get(x, y);
                red_sum += c.x;
                green_sum += c.y;
            }
        }
        assert!(
            red_sum > green_sum,
            "left stripe should skew red: {red_sum} vs {green_sum}"
        );

        // Somewhere the light (or its mirror image) saturates.
        let mut saturated = false;
        for y in 0..image.height {
            for x in 0..image.width {
                let c = image.get(x, y);
                if c.x > 0.9 || c.y > 0.9 || c.z > 0.9 {
                    saturated = true;
                }
            }
        }
        assert!(saturated, "no saturated highlight found");
    }

    #[test]
    fn test_moving_sphere_smears_along_x() {
        // A sphere sweeping one unit along +x blurs its silhouette
        // wider in x than in y.
        let mut world = HittableList::new();
        world.add(Arc::new(Sphere::moving(
            Point3::ZERO,
            Point3::new(1.0, 0.0, 0.0),
            0.5,
            Arc::new(Lambertian::from_color(Color::splat(0.5))),
        )));

        let mut camera = Camera::new()
            .with_image(1.0, 64)
            .with_quality(16, 2)
            .with_position(Point3::new(0.5, 0.0, 6.0), Point3::new(0.5, 0.0, 0.0), Vec3::Y)
            .with_lens(30.0, 0.0, 6.0)
            .with_background(Color::ONE);
        camera.initialize();

        let image = render(&camera, &world, 11);

        // A pixel is "covered" when it is visibly darker than the
        // white background.
        let covered = |c: Color| c.x < 0.9;

        let mut min_x = i64::MAX;
        let mut max_x = i64::MIN;
        let mut min_y = i64::MAX;
        let mut max_y = i64::MIN;
        for y in 0..64 {
            for x in 0..64 {
                if covered(image.get(x, y)) {
                    min_x = min_x.min(x as i64);
                    max_x = max_x.max(x as i64);
                    min_y = min_y.min(y as i64);
                    max_y = max_y.max(y as i64);
                }
            }
        }
        assert!(min_x <= max_x, "silhouette missing");
        let width = max_x - min_x;
        let height = max_y - min_y;
        assert!(
            width >= height + 1,
            "expected x-smear: width {width}, height {height}"
        );
    }
}
