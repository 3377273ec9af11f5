//! # cfgstore-core
//!
//! Shared library for cfgstore containing the configuration document model
//! and the source-form codec that turns documents into PHP array files and
//! back.
//!
//! This crate performs no I/O: it never touches the file system, a cache, or
//! the clock except for reading the current year for the file header.
//!
//! # Architecture overview (for beginners)
//!
//! A configuration file on disk looks like this:
//!
//! ```text
//! <?php
//! /** ...attribution header... */
//!
//! return [
//!     // database settings
//!     'db' => [
//!         'host' => 'localhost',
//!         'port' => 5432
//!     ]
//! ];
//! ```
//!
//! The crate is split in two:
//!
//! - **`domain`** – The in-memory shape of that data: an ordered
//!   [`ConfigDocument`] of [`Key`] → [`ConfigValue`] entries.  Lists are just
//!   documents whose keys happen to be `0, 1, 2, …`.
//!
//! - **`codec`** – Converts between the two forms.  The
//!   [`Serializer`](codec::render::Serializer) writes aligned, commented,
//!   deterministic text; [`parse_document`] reads it (and the hand-written
//!   variants people commonly produce) back into a document.

pub mod codec;
pub mod domain;

// Re-export the most-used types at the crate root so callers can write
// `cfgstore_core::ConfigDocument` instead of the full module path.
pub use codec::layout::{LayoutCalculator, DEFAULT_TAB_WIDTH};
pub use codec::parse::{parse_document, ParseError, MAX_DEPTH};
pub use codec::render::{Comments, Serializer};
pub use codec::value::{format_key, format_value, FormatError};
pub use domain::document::{ConfigDocument, ConfigValue, Key};
