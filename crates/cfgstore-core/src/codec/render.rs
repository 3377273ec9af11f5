//! Document serializer: renders a [`ConfigDocument`] as a PHP config file.
//!
//! Output layout:
//!
//! ```text
//! <?php
//! /**
//! * Arikaim
//! * ...attribution header, copyright ends with the current year...
//! */
//!
//! return [
//! 	// database settings
//! 	'db' => [
//! 		'host' => 'localhost',
//! 		'user' => 'app',
//! 		'pass' => 'secret'
//! 	],
//! 	'servers' => [
//! 		'alpha',
//! 		'beta'
//! 	]
//! ];
//! ```
//!
//! - One tab of indentation per nesting level.
//! - Scalar entries are aligned with [`LayoutCalculator`].
//! - List levels (see [`ConfigDocument::is_list`]) omit their keys.
//! - Top-level entries with a registered comment get a `// …` line above.
//!
//! Rendering is all-or-nothing: the first unsupported value aborts the whole
//! call and no text is returned.

use chrono::Datelike;
use indexmap::IndexMap;

use crate::codec::layout::{indent, LayoutCalculator};
use crate::codec::value::{format_key, format_value, FormatError};
use crate::domain::document::{ConfigDocument, ConfigValue, Key};

/// Returns the fixed attribution banner placed at the top of every file.
pub fn file_header(year: i32) -> String {
    let mut code = String::from("<?php \n/**\n");
    code.push_str("* Arikaim\n");
    code.push_str("* @link        http://www.arikaim.com\n");
    code.push_str(&format!(
        "* @copyright   Copyright (c) 2017-{year} Konstantin Atanasov <info@arikaim.com>\n"
    ));
    code.push_str("* @license     http://www.arikaim.com/license\n");
    code.push_str("*/\n\n");
    code
}

/// One-line comments attached to top-level keys at render time.
///
/// Comments are not part of the document: they are regenerated on every save
/// from whatever is registered here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Comments {
    by_key: IndexMap<String, String>,
}

impl Comments {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `comment` for the top-level `key`, replacing any previous
    /// one.  Line breaks are folded into spaces so the comment stays on one
    /// line, and `?>` is written as `? >` since it closes PHP mode even
    /// inside a line comment.
    pub fn set(&mut self, key: impl Into<String>, comment: &str) {
        let one_line = comment.replace(['\r', '\n'], " ").replace("?>", "? >");
        self.by_key.insert(key.into(), one_line);
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.by_key.get(key).map(String::as_str)
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.by_key.shift_remove(key)
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}

/// Renders documents as formatted, commented source text.
#[derive(Debug, Clone, Default)]
pub struct Serializer {
    layout: LayoutCalculator,
    comments: Comments,
}

impl Serializer {
    /// Creates a serializer with the default tab unit and no comments.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tab_width(mut self, tab_width: usize) -> Self {
        self.layout = LayoutCalculator::new(tab_width);
        self
    }

    pub fn with_comments(mut self, comments: Comments) -> Self {
        self.comments = comments;
        self
    }

    pub fn comments(&self) -> &Comments {
        &self.comments
    }

    pub fn comments_mut(&mut self) -> &mut Comments {
        &mut self.comments
    }

    /// Renders the complete file, stamping the header with the current year.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::UnsupportedValueType`] if any value in the tree
    /// has no literal form.
    pub fn render(&self, document: &ConfigDocument) -> Result<String, FormatError> {
        self.render_for_year(document, chrono::Local::now().year())
    }

    /// Renders the complete file with an explicit copyright year.
    ///
    /// # Errors
    ///
    /// See [`render`](Self::render).
    pub fn render_for_year(
        &self,
        document: &ConfigDocument,
        year: i32,
    ) -> Result<String, FormatError> {
        let body = self.render_body(document)?;
        let mut code = file_header(year);
        code.push_str(&body);
        Ok(code)
    }

    /// Renders only the `return [...];` statement, without the header.
    ///
    /// # Errors
    ///
    /// See [`render`](Self::render).
    pub fn render_body(&self, document: &ConfigDocument) -> Result<String, FormatError> {
        let mut out = String::from("return ");
        if document.is_empty() {
            out.push_str("[]");
        } else {
            out.push_str("[\n");
            self.render_entries(document, 0, &mut out)?;
            out.push_str("\n]");
        }
        out.push_str(";\n");
        Ok(out)
    }

    /// Writes the entries of `document`, each on its own line(s) indented
    /// for `depth + 1`, separated by `",\n"`.
    fn render_entries(
        &self,
        document: &ConfigDocument,
        depth: usize,
        out: &mut String,
    ) -> Result<(), FormatError> {
        let is_list = document.is_list();
        let level = self.layout.level(document.keys());
        let line_indent = indent(depth + 1);

        for (i, (key, value)) in document.iter().enumerate() {
            if i > 0 {
                out.push_str(",\n");
            }
            if depth == 0 {
                self.render_comment(key, &line_indent, out);
            }
            out.push_str(&line_indent);

            match value {
                ConfigValue::Document(child) => {
                    if !is_list {
                        out.push_str(&format_key(key));
                        out.push_str(" => ");
                    }
                    self.render_block(child, depth + 1, out)?;
                }
                scalar => {
                    if !is_list {
                        out.push_str(&format_key(key));
                        out.push_str(&level.padding(key));
                        out.push_str("=> ");
                    }
                    out.push_str(&format_value(scalar)?);
                }
            }
        }
        Ok(())
    }

    /// Writes a bracketed block whose entries sit at `depth + 1` and whose
    /// closing bracket lines up with the line that opened it.
    fn render_block(
        &self,
        document: &ConfigDocument,
        depth: usize,
        out: &mut String,
    ) -> Result<(), FormatError> {
        if document.is_empty() {
            out.push_str("[]");
            return Ok(());
        }
        out.push_str("[\n");
        self.render_entries(document, depth, out)?;
        out.push('\n');
        out.push_str(&indent(depth));
        out.push(']');
        Ok(())
    }

    fn render_comment(&self, key: &Key, line_indent: &str, out: &mut String) {
        let Some(comment) = key.as_str().and_then(|k| self.comments.get(k)) else {
            return;
        };
        out.push_str(line_indent);
        out.push_str("// ");
        out.push_str(comment);
        out.push('\n');
    }
}
