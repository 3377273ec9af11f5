//! Domain entities for cfgstore.
//!
//! This module contains the pure data model with no infrastructure
//! dependencies: no file access, no caching, no text formatting.
//!
//! # Why keep the model separate from the codec? (for beginners)
//!
//! The same document is produced by several sources (a parsed PHP file, a
//! JSON file, a cache hit, a caller building one by hand) and consumed by
//! several sinks (the serializer, `get`/`set` on the store).  Keeping the
//! model free of formatting concerns means each of those pieces depends on
//! the model, but the model depends on none of them.

/// Ordered configuration document, the core domain concept.
///
/// See [`document::ConfigDocument`] for the main type.
pub mod document;
