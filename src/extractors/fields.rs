// src/extractors/fields.rs
//! Flat `**Field**: value` lookups.
//!
//! Generated reviews mostly carry their scalar facts (release year, runtime,
//! ratings) as bullet lines rather than as sections of their own. The lookups
//! here try an ordered chain of line shapes and scopes and stop at the first
//! non-empty value.

use crate::extractors::section::normalize;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::sync::RwLock;

// Compiled line patterns, keyed by (bold required, field name).
static LINE_REGEX_CACHE: Lazy<RwLock<HashMap<(bool, String), Regex>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// One attempt at finding a field's value in a text.
pub trait FieldStrategy: Send + Sync {
    fn name(&self) -> &'static str;
    fn find(&self, text: &str, field: &str) -> Option<String>;
}

/// Matches `Field: value` lines, with or without a bullet.
///
/// The strict shape needs the name in bold (`**Field**: v`, `- **Field:** v`)
/// and is safe to run over a whole document. The loose shape also accepts a
/// plain `- Field: v` and is meant for an already isolated section.
#[derive(Debug, Clone, Copy)]
pub struct LineFieldStrategy {
    require_bold: bool,
}

impl LineFieldStrategy {
    pub fn strict() -> Self {
        Self { require_bold: true }
    }

    pub fn loose() -> Self {
        Self { require_bold: false }
    }

    fn line_regex(&self, field: &str) -> Option<Regex> {
        let key = (self.require_bold, field.trim().to_string());
        let cached = LINE_REGEX_CACHE
            .read()
            .ok()
            .and_then(|cache| cache.get(&key).cloned());
        if cached.is_some() {
            return cached;
        }

        let name = regex::escape(&key.1);
        // Accepts "Writer", "Writers" and "Writer(s)" for a field named "Writer".
        let pattern = if self.require_bold {
            format!(r"(?im)^[ \t]*(?:[-*][ \t]+)?\*\*{name}(?:s|\(s\))?(?:\*\*:|:\*\*)(.*)$")
        } else {
            format!(r"(?im)^[ \t]*(?:[-*][ \t]+)?(?:\*\*)?{name}(?:s|\(s\))?(?:\*\*)?:(?:\*\*)?(.*)$")
        };
        let re = Regex::new(&pattern).ok()?;
        if let Ok(mut cache) = LINE_REGEX_CACHE.write() {
            cache.insert(key, re.clone());
        }
        Some(re)
    }
}

impl FieldStrategy for LineFieldStrategy {
    fn name(&self) -> &'static str {
        if self.require_bold {
            "strict-line"
        } else {
            "loose-line"
        }
    }

    fn find(&self, text: &str, field: &str) -> Option<String> {
        if field.trim().is_empty() {
            return None;
        }
        let re = self.line_regex(field)?;
        let found = re
            .captures_iter(text)
            .filter_map(|caps| caps.get(1))
            .map(|m| normalize(m.as_str()))
            .find(|value| !value.is_empty());
        found
    }
}

/// Re-scans one field inside the text following a subsection header.
#[derive(Debug, Clone)]
pub struct ScopedFieldStrategy {
    field: String,
    scope_header: String,
    inner: LineFieldStrategy,
}

impl ScopedFieldStrategy {
    pub fn new(field: impl Into<String>, scope_header: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            scope_header: scope_header.into(),
            inner: LineFieldStrategy::loose(),
        }
    }
}

impl FieldStrategy for ScopedFieldStrategy {
    fn name(&self) -> &'static str {
        "scoped-line"
    }

    fn find(&self, text: &str, field: &str) -> Option<String> {
        if !self.field.eq_ignore_ascii_case(field.trim()) {
            return None;
        }
        let (_, scoped) = text.split_once(self.scope_header.as_str())?;
        self.inner.find(scoped, field)
    }
}

/// Fields only reliably found under a known subsection header.
const SCOPED_FIELDS: &[(&str, &str)] = &[
    ("Genre", "**General Information:**"),
    ("Release Year", "**General Information:**"),
    ("Runtime", "**General Information:**"),
    ("IMDb Rating", "**General Information:**"),
    ("MPAA Rating", "**General Information:**"),
    ("Director", "**Director and Crew:**"),
    ("Writer", "**Director and Crew:**"),
];

pub struct FieldExtractor {
    strategies: Vec<Box<dyn FieldStrategy>>,
}

impl FieldExtractor {
    /// Strict whole-text lookup, then the scoped lookups for the fields in
    /// [`SCOPED_FIELDS`].
    pub fn new() -> Self {
        let mut strategies: Vec<Box<dyn FieldStrategy>> = vec![Box::new(LineFieldStrategy::strict())];
        for (field, header) in SCOPED_FIELDS {
            strategies.push(Box::new(ScopedFieldStrategy::new(*field, *header)));
        }
        Self::with_strategies(strategies)
    }

    pub fn with_strategies(strategies: Vec<Box<dyn FieldStrategy>>) -> Self {
        Self { strategies }
    }

    /// First non-empty value any strategy finds. `None` is a normal outcome.
    pub fn extract_field(&self, text: &str, field: &str) -> Option<String> {
        for strategy in &self.strategies {
            if let Some(value) = strategy.find(text, field) {
                tracing::trace!("Field '{}' found via {}", field, strategy.name());
                return Some(value);
            }
        }
        tracing::debug!("Field not found: {}", field);
        None
    }
}

impl Default for FieldExtractor {
    fn default() -> Self {
        Self::new()
    }
}
