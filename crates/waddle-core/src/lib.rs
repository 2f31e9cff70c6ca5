//! Errors, override merging, and motion file resolution for the waddle
//! parameter-composition layer.

pub mod error;
pub mod merge;
pub mod motion;

pub mod prelude {
    pub use crate::error::{
        ConfigError, FatalConfigError, MissingMotionFileError, SchemaError, SchemaMismatchError,
    };
    pub use crate::merge::{Overlay, merge, patch_from_toml, take};
    pub use crate::motion::{MotionFileSet, MotionSource};
}
