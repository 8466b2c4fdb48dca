//! Finite cylinder primitive, axis-aligned along y.

use crate::hittable::{HitRecord, Hittable};
use crate::material::Material;
use prism_math::{Aabb, Interval, Point3, Ray, Vec3};
use rand::RngCore;
use std::sync::Arc;

/// A capped cylinder standing on `center`, extending `height` along +y.
pub struct Cylinder {
    center: Point3,
    radius: f64,
    height: f64,
    material: Arc<dyn Material>,
    bbox: Aabb,
}

impl Cylinder {
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

    /// Intersection with the cap disk at `y_cap`, if inside the window.
    fn hit_cap(&self, ray: &Ray, window: Interval, y_cap: f64) -> Option<f64> {
        let dy = ray.direction().y;
        if dy.abs() < 1e-8 {
            return None;
        }

        let t = (y_cap - ray.origin().y) / dy;
        if !window.surrounds(t) {
            return None;
        }

        let p = ray.at(t);
        let dx = p.x - self.center.x;
        let dz = p.z - self.center.z;
        (dx * dx + dz * dz <= self.radius * self.radius).then_some(t)
    }

    /// Intersection with the lateral surface: a 2-D quadratic in the
    /// xz plane, with the accepted root's y clamped to the body.
    fn hit_side(&self, ray: &Ray, window: Interval) -> Option<(f64, Vec3)> {
        let oc = ray.origin() - self.center;
        let dir = ray.direction();

        let a = dir.x * dir.x + dir.z * dir.z;
        if a.abs() < 1e-12 {
            return None;
        }
        let b = 2.0 * (dir.x * oc.x + dir.z * oc.z);
        let c = oc.x * oc.x + oc.z * oc.z - self.radius * self.radius;

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

        let y = ray.origin().y + root * dir.y;
        if y < self.center.y || y > self.center.y + self.height {
            return None;
        }

        let p = ray.at(root);
        let mut outward = p - self.center;
        outward.y = 0.0;
        Some((root, outward.normalize()))
    }
}

impl Hittable for Cylinder {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        ray_t: Interval,
        rec: &mut HitRecord<'a>,
        _rng: &mut dyn RngCore,
    ) -> bool {
        let mut closest: Option<(f64, Vec3)> = None;
        let mut window = ray_t;

        // End caps first, then the lateral surface, always keeping the
        // nearest accepted candidate.
        for (y_cap, outward) in [
            (self.center.y, -Vec3::Y),
            (self.center.y + self.height, Vec3::Y),
        ] {
            if let Some(t) = self.hit_cap(ray, window, y_cap) {
                window.max = t;
                closest = Some((t, outward));
            }
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::{Color, Lambertian};
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn gray() -> Arc<dyn Material> {
        Arc::new(Lambertian::from_color(Color::splat(0.5)))
    }

    fn full_range() -> Interval {
        Interval::new(0.001, f64::INFINITY)
    }

    #[test]
    fn test_cylinder_side_hit() {
        let cylinder = Cylinder::new(Point3::new(0.0, -1.0, 0.0), 1.0, 2.0, gray());
        let ray = Ray::new_simple(Point3::new(5.0, 0.0, 0.0), Vec3::new(-1.0, 0.0, 0.0));
        let mut rec = HitRecord::default();
        let mut rng = SmallRng::seed_from_u64(0);

        assert!(cylinder.hit(&ray, full_range(), &mut rec, &mut rng));
        assert!((rec.t - 4.0).abs() < 1e-9);
        assert!((rec.normal - Vec3::X).length() < 1e-9);
        assert!(rec.front_face);
    }

    #[test]
    fn test_cylinder_side_normal_has_no_y() {
        let cylinder = Cylinder::new(Point3::new(0.0, -1.0, 0.0), 1.0, 2.0, gray());
        let ray = Ray::new_simple(
            Point3::new(5.0, 0.9, 0.0),
            Vec3::new(-1.0, 0.0, 0.0),
        );
        let mut rec = HitRecord::default();
        let mut rng = SmallRng::seed_from_u64(0);

        assert!(cylinder.hit(&ray, full_range(), &mut rec, &mut rng));
        assert_eq!(rec.normal.y, 0.0);
        assert!((rec.normal.length() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_cylinder_top_cap_hit() {
        let cylinder = Cylinder::new(Point3::new(0.0, 0.0, 0.0), 1.0, 2.0, gray());
        let ray = Ray::new_simple(Point3::new(0.3, 10.0, 0.3), Vec3::new(0.0, -1.0, 0.0));
        let mut rec = HitRecord::default();
        let mut rng = SmallRng::seed_from_u64(0);

        assert!(cylinder.hit(&ray, full_range(), &mut rec, &mut rng));
        assert!((rec.t - 8.0).abs() < 1e-9);
        assert!((rec.normal - Vec3::Y).length() < 1e-9);
    }

    #[test]
    fn test_cylinder_bottom_cap_hit() {
        let cylinder = Cylinder::new(Point3::new(0.0, 0.0, 0.0), 1.0, 2.0, gray());
        let ray = Ray::new_simple(Point3::new(0.0, -5.0, 0.0), Vec3::new(0.0, 1.0, 0.0));
        let mut rec = HitRecord::default();
        let mut rng = SmallRng::seed_from_u64(0);

        assert!(cylinder.hit(&ray, full_range(), &mut rec, &mut rng));
        assert!((rec.t - 5.0).abs() < 1e-9);
        // Outward normal points down; the record flips it against the ray.
        assert!((rec.normal - -Vec3::Y).length() < 1e-9);
        assert!(rec.front_face);
    }

    #[test]
    fn test_cylinder_miss_above_body() {
        let cylinder = Cylinder::new(Point3::new(0.0, 0.0, 0.0), 1.0, 2.0, gray());
        let ray = Ray::new_simple(Point3::new(5.0, 3.0, 0.0), Vec3::new(-1.0, 0.0, 0.0));
        let mut rec = HitRecord::default();
        let mut rng = SmallRng::seed_from_u64(0);

        assert!(!cylinder.hit(&ray, full_range(), &mut rec, &mut rng));
    }

    #[test]
    fn test_cylinder_bbox() {
        let cylinder = Cylinder::new(Point3::new(1.0, 0.0, -1.0), 2.0, 3.0, gray());
        let bbox = cylinder.bounding_box();
        assert!(bbox.x.min <= -1.0 && bbox.x.max >= 3.0);
        assert!(bbox.y.min <= 0.0 && bbox.y.max >= 3.0);
        assert!(bbox.z.min <= -3.0 && bbox.z.max >= 1.0);
    }
}
