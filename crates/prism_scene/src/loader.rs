//! Reference resolution and scene construction.

use crate::error::{SceneError, SceneResult};
use crate::schema::{
    CameraConfig, EffectDecl, EffectKind, MaterialDecl, MaterialKind, SceneFile, ShapeDecl,
    ShapeKind, TextureDecl, TextureKind,
};
use prism_math::{Point3, Vec3};
use prism_render::{
    Axis, BvhNode, Camera, Checker, Color, Cone, ConstantMedium, Cylinder, Dielectric,
    DiffuseLight, Hittable, HittableList, ImageTexture, Isotropic, Lambertian, Material, Metal,
    NoiseTexture, Plane, Quad, Rotate, SolidColor, Sphere, Texture, Translate,
};
use rand::rngs::SmallRng;
use rand::SeedableRng;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// The loader's product: a world root and a camera, ready to render.
pub struct LoadedScene {
    pub world: Arc<dyn Hittable>,
    pub camera: Camera,
}

/// Load a scene description and everything it imports.
///
/// `seed` drives procedural texture construction (Perlin tables), so
/// the same (scene, seed) pair always builds an identical world.
pub fn load_scene(path: impl AsRef<Path>, seed: u64) -> SceneResult<LoadedScene> {
    let mut loader = Loader::new(seed);
    loader.load_file(path.as_ref())?;
    loader.finish()
}

struct Loader {
    textures: HashMap<String, Arc<dyn Texture>>,
    materials: HashMap<String, Arc<dyn Material>>,
    objects: Vec<Arc<dyn Hittable>>,
    slots: HashMap<String, usize>,
    declared: HashSet<String>,
    camera: Option<CameraConfig>,
    import_chain: Vec<PathBuf>,
    base_dir: PathBuf,
    rng: SmallRng,
}

impl Loader {
    fn new(seed: u64) -> Self {
        Self {
            textures: HashMap::new(),
            materials: HashMap::new(),
            objects: Vec::new(),
            slots: HashMap::new(),
            declared: HashSet::new(),
            camera: None,
            import_chain: Vec::new(),
            base_dir: PathBuf::new(),
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    fn load_file(&mut self, path: &Path) -> SceneResult<()> {
        let canonical = path
            .canonicalize()
            .map_err(|err| SceneError::File(format!("cannot open `{}`: {err}", path.display())))?;

        if self.import_chain.contains(&canonical) {
            return Err(SceneError::Cyclic(format!(
                "import cycle through `{}`",
                path.display()
            )));
        }

        let text = std::fs::read_to_string(&canonical)
            .map_err(|err| SceneError::File(format!("cannot read `{}`: {err}", path.display())))?;
        let file: SceneFile = toml::from_str(&text)
            .map_err(|err| SceneError::Parse(format!("{}: {err}", path.display())))?;

        self.import_chain.push(canonical.clone());
        log::debug!("loading scene file {}", path.display());

        // Imports resolve depth-first, relative to the importing file,
        // so their entities are referenceable below.
        let parent = canonical.parent().unwrap_or(Path::new(".")).to_path_buf();
        for import in &file.imports {
            self.load_file(&parent.join(import))?;
        }
        self.base_dir = parent;

        for texture in file.textures {
            self.add_texture(texture)?;
        }
        for material in file.materials {
            self.add_material(material)?;
        }
        for shape in file.shapes {
            self.add_shape(shape)?;
        }
        for effect in file.effects {
            self.add_effect(effect)?;
        }

        if let Some(camera) = file.camera {
            if self.camera.is_some() {
                return Err(SceneError::Cyclic("camera already declared".into()));
            }
            self.camera = Some(camera);
        }

        self.import_chain.pop();
        Ok(())
    }

    fn finish(self) -> SceneResult<LoadedScene> {
        let camera = build_camera(self.camera.unwrap_or_default())?;

        let world: Arc<dyn Hittable> = if self.objects.is_empty() {
            Arc::new(HittableList::new())
        } else {
            log::info!("building BVH over {} objects", self.objects.len());
            Arc::new(BvhNode::new(self.objects))
        };

        Ok(LoadedScene { world, camera })
    }

    /// Every entity id lives in one namespace; redeclaring is an error.
    fn declare(&mut self, id: &str) -> SceneResult<()> {
        if !self.declared.insert(id.to_string()) {
            return Err(SceneError::Cyclic(format!("id `{id}` already declared")));
        }
        Ok(())
    }

    fn texture(&self, id: &str) -> SceneResult<Arc<dyn Texture>> {
        self.textures
            .get(id)
            .cloned()
            .ok_or_else(|| SceneError::Missing(id.to_string()))
    }

    fn material(&self, id: &str) -> SceneResult<Arc<dyn Material>> {
        self.materials
            .get(id)
            .cloned()
            .ok_or_else(|| SceneError::Missing(id.to_string()))
    }

    fn add_texture(&mut self, decl: TextureDecl) -> SceneResult<()> {
        self.declare(&decl.id)?;

        let texture: Arc<dyn Texture> = match decl.kind {
            TextureKind::Solid { color } => Arc::new(SolidColor::new(to_color(color))),
            TextureKind::Noise { scale } => {
                ensure_positive("noise scale", scale)?;
                Arc::new(NoiseTexture::new(scale, &mut self.rng))
            }
            TextureKind::Image { path } => {
                let full = self.base_dir.join(&path);
                validate_image_path(&full)?;
                Arc::new(ImageTexture::open(&full))
            }
            TextureKind::Checker {
                scale,
                color_even,
                color_odd,
                texture_even,
                texture_odd,
            } => {
                ensure_positive("checker scale", scale)?;
                match (color_even, color_odd, texture_even, texture_odd) {
                    (Some(even), Some(odd), None, None) => {
                        Arc::new(Checker::from_colors(scale, to_color(even), to_color(odd)))
                    }
                    (None, None, Some(even), Some(odd)) => {
                        let even = self.texture(&even)?;
                        let odd = self.texture(&odd)?;
                        Arc::new(Checker::new(scale, even, odd))
                    }
                    _ => {
                        return Err(SceneError::Parse(format!(
                            "checker `{}` needs color_even/color_odd or texture_even/texture_odd",
                            decl.id
                        )))
                    }
                }
            }
        };

        self.textures.insert(decl.id, texture);
        Ok(())
    }

    fn add_material(&mut self, decl: MaterialDecl) -> SceneResult<()> {
        self.declare(&decl.id)?;

        let material: Arc<dyn Material> = match decl.kind {
            MaterialKind::Lambertian { color, texture } => match (color, texture) {
                (Some(color), None) => Arc::new(Lambertian::from_color(to_color(color))),
                (None, Some(texture)) => Arc::new(Lambertian::new(self.texture(&texture)?)),
                _ => return Err(one_of_error("lambertian", &decl.id)),
            },
            MaterialKind::Metal { color, fuzz } => {
                if !(0.0..=1.0).contains(&fuzz) {
                    return Err(SceneError::Range(format!(
                        "metal `{}` fuzz {fuzz} not in [0, 1]",
                        decl.id
                    )));
                }
                Arc::new(Metal::new(to_color(color), fuzz))
            }
            MaterialKind::Dielectric {
                refraction_index,
                color,
            } => {
                ensure_positive("refraction_index", refraction_index)?;
                match color {
                    Some(color) => {
                        Arc::new(Dielectric::with_albedo(refraction_index, to_color(color)))
                    }
                    None => Arc::new(Dielectric::new(refraction_index)),
                }
            }
            MaterialKind::DiffuseLight { color, texture } => match (color, texture) {
                (Some(color), None) => Arc::new(DiffuseLight::from_color(to_color(color))),
                (None, Some(texture)) => Arc::new(DiffuseLight::new(self.texture(&texture)?)),
                _ => return Err(one_of_error("diffuse_light", &decl.id)),
            },
            MaterialKind::Isotropic { color, texture } => match (color, texture) {
                (Some(color), None) => Arc::new(Isotropic::from_color(to_color(color))),
                (None, Some(texture)) => Arc::new(Isotropic::new(self.texture(&texture)?)),
                _ => return Err(one_of_error("isotropic", &decl.id)),
            },
        };

        self.materials.insert(decl.id, material);
        Ok(())
    }

    fn add_shape(&mut self, decl: ShapeDecl) -> SceneResult<()> {
        self.declare(&decl.id)?;

        let object: Arc<dyn Hittable> = match decl.kind {
            ShapeKind::Sphere {
                center,
                center_one,
                center_two,
                radius,
                material,
            } => {
                ensure_positive("sphere radius", radius)?;
                let material = self.material(&material)?;
                match (center, center_one, center_two) {
                    (Some(center), None, None) => {
                        Arc::new(Sphere::stationary(to_point(center), radius, material))
                    }
                    (None, Some(one), Some(two)) => {
                        Arc::new(Sphere::moving(to_point(one), to_point(two), radius, material))
                    }
                    _ => {
                        return Err(SceneError::Parse(format!(
                            "sphere `{}` needs center or center_one/center_two",
                            decl.id
                        )))
                    }
                }
            }
            ShapeKind::Quad { q, u, v, material } => {
                let material = self.material(&material)?;
                Arc::new(Quad::new(to_point(q), to_vec(u), to_vec(v), material))
            }
            ShapeKind::Plane {
                point,
                normal,
                material,
            } => {
                let normal = to_vec(normal);
                if normal.length_squared() == 0.0 {
                    return Err(SceneError::Range(format!(
                        "plane `{}` normal must be non-zero",
                        decl.id
                    )));
                }
                let material = self.material(&material)?;
                Arc::new(Plane::new(to_point(point), normal, material))
            }
            ShapeKind::Cylinder {
                center,
                radius,
                height,
                material,
            } => {
                ensure_positive("cylinder radius", radius)?;
                ensure_positive("cylinder height", height)?;
                let material = self.material(&material)?;
                Arc::new(Cylinder::new(to_point(center), radius, height, material))
            }
            ShapeKind::Cone {
                center,
                radius,
                height,
                material,
            } => {
                ensure_positive("cone radius", radius)?;
                ensure_positive("cone height", height)?;
                let material = self.material(&material)?;
                Arc::new(Cone::new(to_point(center), radius, height, material))
            }
        };

        let slot = self.objects.len();
        self.objects.push(object);
        self.slots.insert(decl.id, slot);
        Ok(())
    }

    /// Effects replace their target in the scene list; the effect's id
    /// aliases the wrapped slot so effects chain.
    fn add_effect(&mut self, decl: EffectDecl) -> SceneResult<()> {
        self.declare(&decl.id)?;

        let target = match &decl.kind {
            EffectKind::Translate { target, .. }
            | EffectKind::RotateX { target, .. }
            | EffectKind::RotateY { target, .. }
            | EffectKind::RotateZ { target, .. }
            | EffectKind::Rotate { target, .. }
            | EffectKind::Smoke { target, .. } => target.clone(),
        };
        let slot = *self
            .slots
            .get(&target)
            .ok_or_else(|| SceneError::Missing(target.clone()))?;
        let child = self.objects[slot].clone();

        let wrapped: Arc<dyn Hittable> = match decl.kind {
            EffectKind::Translate { offset, .. } => {
                Arc::new(Translate::new(child, to_vec(offset)))
            }
            EffectKind::RotateX { angle, .. } => Arc::new(Rotate::new(child, Axis::X, angle)),
            EffectKind::RotateY { angle, .. } | EffectKind::Rotate { angle, .. } => {
                Arc::new(Rotate::new(child, Axis::Y, angle))
            }
            EffectKind::RotateZ { angle, .. } => Arc::new(Rotate::new(child, Axis::Z, angle)),
            EffectKind::Smoke {
                density,
                color,
                texture,
                ..
            } => {
                ensure_positive("smoke density", density)?;
                match (color, texture) {
                    (Some(color), None) => {
                        Arc::new(ConstantMedium::from_color(child, density, to_color(color)))
                    }
                    (None, Some(texture)) => {
                        Arc::new(ConstantMedium::new(child, density, self.texture(&texture)?))
                    }
                    _ => return Err(one_of_error("smoke", &decl.id)),
                }
            }
        };

        self.objects[slot] = wrapped;
        self.slots.insert(decl.id, slot);
        Ok(())
    }
}

fn build_camera(config: CameraConfig) -> SceneResult<Camera> {
    if config.aspect_ratio <= 0.0 {
        return Err(SceneError::Range(format!(
            "aspect_ratio {} must be positive",
            config.aspect_ratio
        )));
    }
    if config.image_width == 0 {
        return Err(SceneError::Range("image_width must be at least 1".into()));
    }
    if config.samples_per_pixel == 0 {
        return Err(SceneError::Range(
            "samples_per_pixel must be at least 1".into(),
        ));
    }
    if config.max_depth == 0 {
        return Err(SceneError::Range("max_depth must be at least 1".into()));
    }
    ensure_positive("focus_distance", config.focus_distance)?;

    Ok(Camera::new()
        .with_image(config.aspect_ratio, config.image_width)
        .with_quality(config.samples_per_pixel, config.max_depth)
        .with_background(to_color(config.background_color))
        .with_position(
            to_point(config.look_from),
            to_point(config.look_at),
            to_vec(config.v_up),
        )
        .with_lens(config.v_fov, config.defocus_angle, config.focus_distance))
}

/// Image files are checked up front so a typo fails the load instead
/// of silently rendering cyan.
fn validate_image_path(path: &Path) -> SceneResult<()> {
    if !path.exists() {
        return Err(SceneError::File(format!(
            "image `{}` not found",
            path.display()
        )));
    }
    if path.extension().and_then(|e| e.to_str()) != Some("ppm") {
        return Err(SceneError::File(format!(
            "image `{}` is not a PPM file",
            path.display()
        )));
    }
    let len = std::fs::metadata(path)
        .map_err(|err| SceneError::File(format!("cannot stat `{}`: {err}", path.display())))?
        .len();
    if len == 0 {
        return Err(SceneError::File(format!(
            "image `{}` is empty",
            path.display()
        )));
    }
    Ok(())
}

fn ensure_positive(name: &str, value: f64) -> SceneResult<()> {
    if value > 0.0 {
        Ok(())
    } else {
        Err(SceneError::Range(format!("{name} {value} must be positive")))
    }
}

fn one_of_error(kind: &str, id: &str) -> SceneError {
    SceneError::Parse(format!("{kind} `{id}` needs color or texture (exactly one)"))
}

fn to_color(rgb: [f64; 3]) -> Color {
    Color::new(rgb[0], rgb[1], rgb[2])
}

fn to_point(xyz: [f64; 3]) -> Point3 {
    Point3::new(xyz[0], xyz[1], xyz[2])
}

fn to_vec(xyz: [f64; 3]) -> Vec3 {
    Vec3::new(xyz[0], xyz[1], xyz[2])
}
