//! Infrastructure layer: file system access, caching and settings.
//!
//! **Dependency rule**: this layer may depend on `cfgstore_core`, but MUST
//! NOT import the `application` layer.

pub mod cache;
pub mod file_backend;
pub mod settings;
