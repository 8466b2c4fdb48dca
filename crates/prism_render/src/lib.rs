//! prism render core - CPU path tracing.
//!
//! A Monte Carlo path tracer: recursive radiance estimation over a
//! BVH-accelerated scene of polymorphic hittables, with thin-lens
//! defocus, motion blur, and deterministic per-bucket sampling.

mod bucket;
mod bvh;
mod camera;
mod cone;
mod cylinder;
mod hittable;
mod material;
mod medium;
mod perlin;
mod plane;
mod ppm;
mod quad;
mod renderer;
mod sampling;
mod sphere;
mod texture;
mod transform;

pub use bucket::{generate_buckets, render_bucket, Bucket, BucketResult, DEFAULT_BUCKET_SIZE};
pub use bvh::BvhNode;
pub use camera::Camera;
pub use cone::Cone;
pub use cylinder::Cylinder;
pub use hittable::{HitRecord, Hittable, HittableList};
pub use material::{Color, Dielectric, DiffuseLight, Isotropic, Lambertian, Material, Metal};
pub use medium::ConstantMedium;
pub use perlin::Perlin;
pub use plane::Plane;
pub use ppm::{write_ppm, PpmError, PpmImage};
pub use quad::{make_box, Quad};
pub use renderer::{linear_to_gamma, ray_color, render, render_pixel, ImageBuffer};
pub use sampling::{gen_f64, gen_range, random_in_unit_disk, random_unit_vector, random_vec3};
pub use sphere::Sphere;
pub use texture::{Checker, ImageTexture, NoiseTexture, SolidColor, Texture};
pub use transform::{Axis, Rotate, Translate};

/// Re-export the math types the public API is expressed in.
pub use prism_math::{Aabb, Interval, Point3, Ray, Vec3};
