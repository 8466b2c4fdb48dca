//! Declarative scene loading for prism.
//!
//! A scene is a TOML document of id-carrying entities: textures,
//! materials, shapes, and effects, plus a camera block and optional
//! imports of further files. The loader resolves references, applies
//! effects by replacing their targets, and hands the renderer a
//! BVH-wrapped world plus a populated camera. A scene either loads in
//! full or the first error aborts the load.

mod error;
mod loader;
mod schema;

pub use error::{SceneError, SceneResult};
pub use loader::{load_scene, LoadedScene};
pub use schema::{
    CameraConfig, EffectDecl, EffectKind, MaterialDecl, MaterialKind, SceneFile, ShapeDecl,
    ShapeKind, TextureDecl, TextureKind,
};
