//! Serde schema for the TOML scene format.
//!
//! Entity variants are internally tagged (`type = "..."`); alternative
//! parameterisations (color vs. texture, stationary vs. moving) are
//! optional fields validated by the loader, which keeps the schema
//! close to the written form.

use serde::Deserialize;

/// One parsed scene file, before reference resolution.
#[derive(Debug, Deserialize)]
pub struct SceneFile {
    pub camera: Option<CameraConfig>,
    #[serde(default)]
    pub imports: Vec<String>,
    #[serde(default)]
    pub textures: Vec<TextureDecl>,
    #[serde(default)]
    pub materials: Vec<MaterialDecl>,
    #[serde(default)]
    pub shapes: Vec<ShapeDecl>,
    #[serde(default)]
    pub effects: Vec<EffectDecl>,
}

/// Camera block; every field falls back to the renderer defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct CameraConfig {
    pub aspect_ratio: f64,
    pub image_width: u32,
    pub samples_per_pixel: u32,
    pub max_depth: u32,
    pub background_color: [f64; 3],
    pub v_fov: f64,
    pub look_from: [f64; 3],
    pub look_at: [f64; 3],
    pub v_up: [f64; 3],
    pub defocus_angle: f64,
    pub focus_distance: f64,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            aspect_ratio: 1.0,
            image_width: 100,
            samples_per_pixel: 10,
            max_depth: 10,
            background_color: [0.0, 0.0, 0.0],
            v_fov: 90.0,
            look_from: [0.0, 0.0, 0.0],
            look_at: [0.0, 0.0, -1.0],
            v_up: [0.0, 1.0, 0.0],
            defocus_angle: 0.0,
            focus_distance: 10.0,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct TextureDecl {
    pub id: String,
    #[serde(flatten)]
    pub kind: TextureKind,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TextureKind {
    Solid {
        color: [f64; 3],
    },
    Noise {
        scale: f64,
    },
    Image {
        path: String,
    },
    Checker {
        scale: f64,
        color_even: Option<[f64; 3]>,
        color_odd: Option<[f64; 3]>,
        texture_even: Option<String>,
        texture_odd: Option<String>,
    },
}

#[derive(Debug, Deserialize)]
pub struct MaterialDecl {
    pub id: String,
    #[serde(flatten)]
    pub kind: MaterialKind,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MaterialKind {
    Lambertian {
        color: Option<[f64; 3]>,
        texture: Option<String>,
    },
    Metal {
        color: [f64; 3],
        fuzz: f64,
    },
    Dielectric {
        refraction_index: f64,
        color: Option<[f64; 3]>,
    },
    DiffuseLight {
        color: Option<[f64; 3]>,
        texture: Option<String>,
    },
    Isotropic {
        color: Option<[f64; 3]>,
        texture: Option<String>,
    },
}

#[derive(Debug, Deserialize)]
pub struct ShapeDecl {
    pub id: String,
    #[serde(flatten)]
    pub kind: ShapeKind,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ShapeKind {
    Sphere {
        center: Option<[f64; 3]>,
        center_one: Option<[f64; 3]>,
        center_two: Option<[f64; 3]>,
        radius: f64,
        material: String,
    },
    Quad {
        q: [f64; 3],
        u: [f64; 3],
        v: [f64; 3],
        material: String,
    },
    Plane {
        point: [f64; 3],
        normal: [f64; 3],
        material: String,
    },
    Cylinder {
        center: [f64; 3],
        radius: f64,
        height: f64,
        material: String,
    },
    Cone {
        center: [f64; 3],
        radius: f64,
        height: f64,
        material: String,
    },
}

#[derive(Debug, Deserialize)]
pub struct EffectDecl {
    pub id: String,
    #[serde(flatten)]
    pub kind: EffectKind,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EffectKind {
    Translate {
        target: String,
        offset: [f64; 3],
    },
    RotateX {
        target: String,
        angle: f64,
    },
    RotateY {
        target: String,
        angle: f64,
    },
    RotateZ {
        target: String,
        angle: f64,
    },
    /// Bare `rotate` spins about the y axis.
    Rotate {
        target: String,
        angle: f64,
    },
    Smoke {
        target: String,
        density: f64,
        color: Option<[f64; 3]>,
        texture: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_defaults_fill_missing_fields() {
        let file: SceneFile = toml::from_str(
            r#"
            [camera]
            image_width = 640
            "#,
        )
        .expect("parses");

        let camera = file.camera.expect("camera present");
        assert_eq!(camera.image_width, 640);
        assert_eq!(camera.samples_per_pixel, 10);
        assert_eq!(camera.v_fov, 90.0);
        assert_eq!(camera.look_at, [0.0, 0.0, -1.0]);
    }

    #[test]
    fn test_tagged_entity_parsing() {
        let file: SceneFile = toml::from_str(
            r#"
            [[textures]]
            id = "tex"
            type = "checker"
            scale = 0.5
            color_even = [1.0, 1.0, 1.0]
            color_odd = [0.0, 0.0, 0.0]

            [[materials]]
            id = "glass"
            type = "dielectric"
            refraction_index = 1.5

            [[shapes]]
            id = "ball"
            type = "sphere"
            center = [0.0, 1.0, 0.0]
            radius = 1.0
            material = "glass"

            [[effects]]
            id = "moved"
            type = "translate"
            target = "ball"
            offset = [0.0, 2.0, 0.0]
            "#,
        )
        .expect("parses");

        assert!(matches!(
            file.textures[0].kind,
            TextureKind::Checker { scale, .. } if scale == 0.5
        ));
        assert!(matches!(
            file.materials[0].kind,
            MaterialKind::Dielectric { refraction_index, color: None } if refraction_index == 1.5
        ));
        assert!(matches!(file.shapes[0].kind, ShapeKind::Sphere { .. }));
        assert!(matches!(file.effects[0].kind, EffectKind::Translate { .. }));
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let result: Result<SceneFile, _> = toml::from_str(
            r#"
            [[shapes]]
            id = "what"
            type = "torus"
            material = "none"
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_camera_field_is_rejected() {
        let result: Result<SceneFile, _> = toml::from_str(
            r#"
            [camera]
            image_widht = 100
            "#,
        );
        assert!(result.is_err());
    }
}
