// Re-export glam for convenience
pub use glam::DVec3;

/// 3-component double-precision vector, used uniformly for positions,
/// directions, and linear RGB.
pub type Vec3 = DVec3;

/// A position in world space.
pub type Point3 = DVec3;

mod aabb;
mod interval;
mod ray;

pub use aabb::Aabb;
pub use interval::Interval;
pub use ray::Ray;

/// True when every component of `v` is below 1e-8 in magnitude.
///
/// Scatter directions this small would produce degenerate rays (zero
/// direction, NaN normals downstream), so materials fall back to the
/// surface normal instead.
#[inline]
pub fn near_zero(v: Vec3) -> bool {
    const EPS: f64 = 1e-8;
    v.x.abs() < EPS && v.y.abs() < EPS && v.z.abs() < EPS
}
