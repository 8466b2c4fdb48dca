//! Loader error taxonomy.

use thiserror::Error;

/// Everything that can go wrong while loading a scene.
///
/// Five kinds, mirroring how scenes actually fail: the text does not
/// parse, a reference points nowhere, a file is unusable, a name or
/// import repeats, or a number is outside its domain. Nothing is
/// retried; the CLI prints one line and exits.
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("parse error: {0}")]
    Parse(String),

    #[error("missing reference `{0}`")]
    Missing(String),

    #[error("file error: {0}")]
    File(String),

    #[error("cyclic declaration: {0}")]
    Cyclic(String),

    #[error("value out of range: {0}")]
    Range(String),
}

pub type SceneResult<T> = Result<T, SceneError>;
