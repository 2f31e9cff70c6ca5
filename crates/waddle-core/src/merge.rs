//! Override composition for configuration records.
//!
//! A variant is the base schema plus exactly one override document. Every
//! section struct has a sibling patch type whose fields are all `Option`;
//! [`merge`] applies the patch to the base, present fields winning wholesale.
//! Merge granularity is per-field, never per-key: a patched map field (joint
//! name → value) replaces the base map entirely.
//!
//! Override documents deserialized from TOML use `deny_unknown_fields`, so a
//! patch that references a field absent from the base schema fails with a
//! [`SchemaError`] instead of being silently ignored.

use serde::de::DeserializeOwned;

use crate::error::SchemaError;

/// A configuration record that can absorb a partial override.
pub trait Overlay {
    /// The partial-override sibling type (all fields optional).
    type Patch;

    /// Apply `patch` in place. Present patch fields replace base fields.
    fn overlay(&mut self, patch: Self::Patch);
}

/// Merge an override into a base record, consuming both.
///
/// This is the single composition step of the hierarchy: applied once per
/// variant at bootstrap, after which the result is frozen.
#[must_use]
pub fn merge<T: Overlay>(mut base: T, patch: T::Patch) -> T {
    base.overlay(patch);
    base
}

/// Parse an override document from TOML.
///
/// Patch types reject unknown fields, so this is where typo protection for
/// file-based overrides lives.
pub fn patch_from_toml<P: DeserializeOwned>(doc: &str) -> Result<P, SchemaError> {
    Ok(toml::from_str(doc)?)
}

/// Replace the base field when the patch carries a value.
///
/// Shorthand used by `Overlay` impls; keeps field lists readable.
pub fn take<T>(base: &mut T, patch: Option<T>) {
    if let Some(value) = patch {
        *base = value;
    }
}
