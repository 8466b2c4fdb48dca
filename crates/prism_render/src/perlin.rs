//! Lattice gradient noise with permutation tables.

use crate::sampling::random_vec3;
use prism_math::{Point3, Vec3};
use rand::{Rng, RngCore};

const POINT_COUNT: usize = 256;

/// Perlin noise generator.
///
/// Owns 256 random gradient vectors and three independent permutation
/// tables (a few KiB total). Tables are fixed at construction, so a
/// generator can be shared immutably between render workers.
pub struct Perlin {
    rand_vec: [Vec3; POINT_COUNT],
    perm_x: [usize; POINT_COUNT],
    perm_y: [usize; POINT_COUNT],
    perm_z: [usize; POINT_COUNT],
}

impl Perlin {
    pub fn new(rng: &mut dyn RngCore) -> Self {
        let mut rand_vec = [Vec3::ZERO; POINT_COUNT];
        for v in rand_vec.iter_mut() {
            *v = random_vec3(rng, -1.0, 1.0);
        }

        Self {
            rand_vec,
            perm_x: Self::generate_perm(rng),
            perm_y: Self::generate_perm(rng),
            perm_z: Self::generate_perm(rng),
        }
    }

    /// Smoothed gradient noise in roughly [-1, 1].
    pub fn noise(&self, p: Point3) -> f64 {
        let u = p.x - p.x.floor();
        let v = p.y - p.y.floor();
        let w = p.z - p.z.floor();

        let i = p.x.floor() as i64;
        let j = p.y.floor() as i64;
        let k = p.z.floor() as i64;

        let mut c = [[[Vec3::ZERO; 2]; 2]; 2];
        for (di, plane) in c.iter_mut().enumerate() {
            for (dj, row) in plane.iter_mut().enumerate() {
                for (dk, cell) in row.iter_mut().enumerate() {
                    let ix = self.perm_x[((i + di as i64) & 255) as usize];
                    let iy = self.perm_y[((j + dj as i64) & 255) as usize];
                    let iz = self.perm_z[((k + dk as i64) & 255) as usize];
                    *cell = self.rand_vec[ix ^ iy ^ iz];
                }
            }
        }

        Self::interpolate(&c, u, v, w)
    }

    /// Sum of `depth` noise octaves at doubling frequency and halving
    /// amplitude, absolute-valued.
    pub fn turbulence(&self, p: Point3, depth: u32) -> f64 {
        let mut accum = 0.0;
        let mut temp_p = p;
        let mut weight = 1.0;

        for _ in 0..depth {
            accum += weight * self.noise(temp_p);
            weight *= 0.5;
            temp_p *= 2.0;
        }

        accum.abs()
    }

    fn generate_perm(rng: &mut dyn RngCore) -> [usize; POINT_COUNT] {
        let mut perm = [0usize; POINT_COUNT];
        for (i, slot) in perm.iter_mut().enumerate() {
            *slot = i;
        }
        // Fisher-Yates
        for i in (1..POINT_COUNT).rev() {
            let target = rng.gen_range(0..=i);
            perm.swap(i, target);
        }
        perm
    }

    /// Trilinear interpolation of gradient dot products with
    /// smoothstep weighting.
    fn interpolate(c: &[[[Vec3; 2]; 2]; 2], u: f64, v: f64, w: f64) -> f64 {
        let uu = u * u * (3.0 - 2.0 * u);
        let vv = v * v * (3.0 - 2.0 * v);
        let ww = w * w * (3.0 - 2.0 * w);
        let mut accum = 0.0;

        for (i, plane) in c.iter().enumerate() {
            for (j, row) in plane.iter().enumerate() {
                for (k, cell) in row.iter().enumerate() {
                    let (fi, fj, fk) = (i as f64, j as f64, k as f64);
                    let weight_v = Vec3::new(u - fi, v - fj, w - fk);
                    accum += (fi * uu + (1.0 - fi) * (1.0 - uu))
                        * (fj * vv + (1.0 - fj) * (1.0 - vv))
                        * (fk * ww + (1.0 - fk) * (1.0 - ww))
                        * cell.dot(weight_v);
                }
            }
        }

        accum
    }
}
