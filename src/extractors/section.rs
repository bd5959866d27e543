// src/extractors/section.rs

// --- Imports ---
use crate::extractors::cast::{parse_cast_block, CastList};
use crate::extractors::fields::{FieldStrategy, LineFieldStrategy};
use crate::utils::error::SpecError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::HashSet;

// --- Constants ---
/// Escaped dash sequence the generator leaves behind when its output has been
/// JSON-encoded once too often.
pub const ESCAPED_EN_DASH: &str = "\\u2013";
pub const EN_DASH: &str = "\u{2013}";

// Leading bullet markers on list lines: "-", "*", "•", "1.", "2)"
static LIST_BULLET_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[-*\u{2022}]|\d+[.)])\s+").expect("Failed to compile LIST_BULLET_RE")
});

/// Trims, turns every line break into a single space and unescapes the en-dash.
/// Applying it to its own output returns the same string.
pub fn normalize(raw: &str) -> String {
    raw.trim()
        .replace("\r\n", " ")
        .replace('\n', " ")
        .replace(ESCAPED_EN_DASH, EN_DASH)
}

/// Removes one layer of wrapping quotes (straight or curly).
fn unquote(text: &str) -> String {
    let pairs = [('"', '"'), ('\u{201c}', '\u{201d}')];
    for (open, close) in pairs {
        if let Some(inner) = text.strip_prefix(open).and_then(|t| t.strip_suffix(close)) {
            return inner.trim().to_string();
        }
    }
    text.to_string()
}

/// Splits a bullet list body into normalized items. Lines without a bullet
/// marker are kept as items of their own.
pub fn parse_list_items(raw: &str) -> Vec<String> {
    raw.lines()
        .map(|line| LIST_BULLET_RE.replace(line.trim(), ""))
        .map(|line| normalize(&line))
        .filter(|item| !item.is_empty())
        .collect()
}

// --- Boundaries ---

/// Where a section starts or stops.
#[derive(Debug, Clone)]
pub enum Boundary {
    /// A literal token, e.g. `**Plot Summary:**`.
    Marker(String),
    /// A regular expression, compiled with dot-matches-newline.
    Pattern(Regex),
    /// Only meaningful as an end boundary.
    EndOfText,
}

impl Boundary {
    pub fn marker(token: impl Into<String>) -> Self {
        Boundary::Marker(token.into())
    }

    pub fn pattern(pattern: &str) -> Result<Self, SpecError> {
        Regex::new(&format!("(?s){}", pattern))
            .map(Boundary::Pattern)
            .map_err(|e| SpecError::InvalidPattern {
                pattern: pattern.to_string(),
                reason: e.to_string(),
            })
    }

    /// Bold header accepting both `**Name:**` and `**Name**:`.
    pub fn bold_header(name: &str) -> Self {
        let pattern = format!(r"\*\*{}(?::\*\*|\*\*:)", regex::escape(name));
        // An escaped name always compiles; keep a literal as the fallback anyway.
        Boundary::pattern(&pattern).unwrap_or_else(|_| Boundary::Marker(format!("**{}:**", name)))
    }

    /// Byte range of the first occurrence at or after `from`.
    pub fn find(&self, text: &str, from: usize) -> Option<(usize, usize)> {
        let rest = text.get(from..)?;
        match self {
            Boundary::Marker(token) => rest
                .find(token.as_str())
                .map(|i| (from + i, from + i + token.len())),
            Boundary::Pattern(re) => re.find_at(text, from).map(|m| (m.start(), m.end())),
            Boundary::EndOfText => Some((text.len(), text.len())),
        }
    }

    fn is_empty_marker(&self) -> bool {
        matches!(self, Boundary::Marker(token) if token.is_empty())
    }
}

// --- Section table ---

/// Shape of the value a section resolves to.
#[derive(Debug, Clone, PartialEq)]
pub enum SectionKind {
    Text,
    QuotedText,
    List,
    Cast,
    /// Key/value lines looked up inside the section body.
    Fields(Vec<String>),
}

#[derive(Debug, Clone)]
pub struct SectionRule {
    pub name: String,
    pub start: Boundary,
    pub end: Boundary,
    pub kind: SectionKind,
    pub fallback: Option<Regex>,
}

impl SectionRule {
    pub fn new(name: impl Into<String>, start: Boundary, end: Boundary) -> Self {
        Self {
            name: name.into(),
            start,
            end,
            kind: SectionKind::Text,
            fallback: None,
        }
    }

    pub fn kind(mut self, kind: SectionKind) -> Self {
        self.kind = kind;
        self
    }

    /// Whole-text pattern tried when the boundaries do not match. Capture
    /// group 1 is used when present.
    pub fn with_fallback(mut self, pattern: &str) -> Result<Self, SpecError> {
        let re = Regex::new(pattern).map_err(|e| SpecError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        self.fallback = Some(re);
        Ok(self)
    }
}

/// Ordered, validated list of section rules.
#[derive(Debug, Clone)]
pub struct SectionSpec {
    rules: Vec<SectionRule>,
}

impl SectionSpec {
    pub fn new(rules: Vec<SectionRule>) -> Result<Self, SpecError> {
        if rules.is_empty() {
            return Err(SpecError::EmptySpec);
        }
        let mut seen = HashSet::new();
        for rule in &rules {
            if !seen.insert(rule.name.as_str()) {
                return Err(SpecError::DuplicateSection(rule.name.clone()));
            }
            if matches!(rule.start, Boundary::EndOfText) {
                return Err(SpecError::StartAtEndOfText(rule.name.clone()));
            }
            if rule.start.is_empty_marker() || rule.end.is_empty_marker() {
                return Err(SpecError::EmptyMarker(rule.name.clone()));
            }
        }
        Ok(Self { rules })
    }

    /// Builds a spec from bold headers in document order: each section ends
    /// where the next one's header begins, the last one at end of text.
    pub fn from_headers(headers: &[(&str, SectionKind)]) -> Result<Self, SpecError> {
        let mut rules = Vec::with_capacity(headers.len());
        for (i, (name, kind)) in headers.iter().enumerate() {
            if name.trim().is_empty() {
                return Err(SpecError::EmptyMarker(name.to_string()));
            }
            let end = match headers.get(i + 1) {
                Some((next, _)) => Boundary::bold_header(next),
                None => Boundary::EndOfText,
            };
            rules.push(SectionRule::new(*name, Boundary::bold_header(name), end).kind(kind.clone()));
        }
        Self::new(rules)
    }

    pub fn rules(&self) -> &[SectionRule] {
        &self.rules
    }

    pub fn rule(&self, name: &str) -> Option<&SectionRule> {
        self.rules.iter().find(|r| r.name == name)
    }

    /// Replaces the rule with the same name. Unknown names are ignored.
    pub fn replace_rule(mut self, rule: SectionRule) -> Self {
        if let Some(slot) = self.rules.iter_mut().find(|r| r.name == rule.name) {
            *slot = rule;
        }
        self
    }
}

// --- Output record ---

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldMap {
    entries: Vec<(String, String)>,
}

impl FieldMap {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn push(&mut self, name: &str, value: String) {
        self.entries.push((name.to_string(), value));
    }
}

impl Serialize for FieldMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum SectionValue {
    Text(String),
    List(Vec<String>),
    Cast(CastList),
    Fields(FieldMap),
}

impl SectionValue {
    /// Typed empty value used when a section cannot be located.
    pub fn empty(kind: &SectionKind) -> Self {
        match kind {
            SectionKind::Text | SectionKind::QuotedText => SectionValue::Text(String::new()),
            SectionKind::List => SectionValue::List(Vec::new()),
            SectionKind::Cast => SectionValue::Cast(CastList::default()),
            SectionKind::Fields(names) => {
                let mut fields = FieldMap::default();
                for name in names {
                    fields.push(name, String::new());
                }
                SectionValue::Fields(fields)
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            SectionValue::Text(s) => s.is_empty(),
            SectionValue::List(items) => items.is_empty(),
            SectionValue::Cast(cast) => cast.is_empty(),
            SectionValue::Fields(fields) => fields.iter().all(|(_, v)| v.is_empty()),
        }
    }
}

/// Section name to value, in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedRecord {
    entries: Vec<(String, SectionValue)>,
}

impl ParsedRecord {
    pub fn get(&self, name: &str) -> Option<&SectionValue> {
        self.entries.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// Text value of a section, `""` when absent or not text.
    pub fn text(&self, name: &str) -> &str {
        match self.get(name) {
            Some(SectionValue::Text(s)) => s,
            _ => "",
        }
    }

    pub fn list(&self, name: &str) -> &[String] {
        match self.get(name) {
            Some(SectionValue::List(items)) => items,
            _ => &[],
        }
    }

    pub fn cast(&self, name: &str) -> Option<&CastList> {
        match self.get(name) {
            Some(SectionValue::Cast(cast)) => Some(cast),
            _ => None,
        }
    }

    pub fn fields(&self, name: &str) -> Option<&FieldMap> {
        match self.get(name) {
            Some(SectionValue::Fields(fields)) => Some(fields),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &SectionValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for ParsedRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

// --- Diagnostics ---

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct SkippedLine {
    pub section: String,
    pub line: String,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct RecoveredSection {
    pub section: String,
    pub strategy: &'static str,
}

/// What the extractor had to default, skip or recover for one text.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
pub struct ExtractionReport {
    pub defaulted_sections: Vec<String>,
    pub recovered_sections: Vec<RecoveredSection>,
    pub skipped_lines: Vec<SkippedLine>,
}

impl ExtractionReport {
    pub fn is_clean(&self) -> bool {
        self.defaulted_sections.is_empty()
            && self.recovered_sections.is_empty()
            && self.skipped_lines.is_empty()
    }
}

// --- Span strategies ---

/// One way of locating the raw body of a section.
pub trait SpanStrategy: Send + Sync {
    fn name(&self) -> &'static str;
    fn locate<'t>(&self, text: &'t str, rule: &SectionRule, spec: &SectionSpec) -> Option<&'t str>;
}

/// Start boundary, then the declared end boundary after it.
pub struct DeclaredBoundaryStrategy;

impl SpanStrategy for DeclaredBoundaryStrategy {
    fn name(&self) -> &'static str {
        "declared-boundary"
    }

    fn locate<'t>(&self, text: &'t str, rule: &SectionRule, _spec: &SectionSpec) -> Option<&'t str> {
        let (_, body_start) = rule.start.find(text, 0)?;
        let (body_end, _) = rule.end.find(text, body_start)?;
        Some(&text[body_start..body_end])
    }
}

/// Start boundary, then whichever other declared header comes first.
/// Covers a missing or reordered neighbour section.
pub struct NextHeaderStrategy;

impl SpanStrategy for NextHeaderStrategy {
    fn name(&self) -> &'static str {
        "next-header"
    }

    fn locate<'t>(&self, text: &'t str, rule: &SectionRule, spec: &SectionSpec) -> Option<&'t str> {
        let (_, body_start) = rule.start.find(text, 0)?;
        let body_end = spec
            .rules()
            .iter()
            .filter(|other| other.name != rule.name)
            .filter_map(|other| other.start.find(text, body_start))
            .map(|(start, _)| start)
            .min()
            .unwrap_or(text.len());
        Some(&text[body_start..body_end])
    }
}

/// The rule's own whole-text fallback pattern.
pub struct FallbackPatternStrategy;

impl SpanStrategy for FallbackPatternStrategy {
    fn name(&self) -> &'static str {
        "fallback-pattern"
    }

    fn locate<'t>(&self, text: &'t str, rule: &SectionRule, _spec: &SectionSpec) -> Option<&'t str> {
        let caps = rule.fallback.as_ref()?.captures(text)?;
        caps.get(1).or_else(|| caps.get(0)).map(|m| m.as_str())
    }
}

pub fn default_strategies() -> Vec<Box<dyn SpanStrategy>> {
    vec![
        Box::new(DeclaredBoundaryStrategy),
        Box::new(NextHeaderStrategy),
        Box::new(FallbackPatternStrategy),
    ]
}

// --- Extractor ---

pub struct SectionExtractor {
    spec: SectionSpec,
    strategies: Vec<Box<dyn SpanStrategy>>,
}

impl SectionExtractor {
    pub fn new(spec: SectionSpec) -> Self {
        Self::with_strategies(spec, default_strategies())
    }

    pub fn with_strategies(spec: SectionSpec, strategies: Vec<Box<dyn SpanStrategy>>) -> Self {
        Self { spec, strategies }
    }

    pub fn spec(&self) -> &SectionSpec {
        &self.spec
    }

    /// Raw (un-normalized) body of one section and the strategy that found it.
    pub fn locate<'t>(&self, text: &'t str, rule: &SectionRule) -> Option<(&'static str, &'t str)> {
        self.strategies
            .iter()
            .find_map(|s| s.locate(text, rule, &self.spec).map(|body| (s.name(), body)))
    }

    /// Raw body of the named section, if declared and found.
    pub fn locate_section<'t>(&self, text: &'t str, name: &str) -> Option<&'t str> {
        let rule = self.spec.rule(name)?;
        self.locate(text, rule).map(|(_, body)| body)
    }

    pub fn extract(&self, text: &str) -> ParsedRecord {
        self.extract_with_report(text).0
    }

    pub fn extract_with_report(&self, text: &str) -> (ParsedRecord, ExtractionReport) {
        let mut record = ParsedRecord::default();
        let mut report = ExtractionReport::default();

        for rule in self.spec.rules() {
            let value = match self.locate(text, rule) {
                Some((strategy, body)) => {
                    if strategy != "declared-boundary" {
                        tracing::debug!("Section '{}' recovered via {}", rule.name, strategy);
                        report.recovered_sections.push(RecoveredSection {
                            section: rule.name.clone(),
                            strategy,
                        });
                    }
                    resolve(rule, body, &mut report)
                }
                None => {
                    tracing::debug!("Section not found, using empty default: {}", rule.name);
                    report.defaulted_sections.push(rule.name.clone());
                    SectionValue::empty(&rule.kind)
                }
            };
            record.entries.push((rule.name.clone(), value));
        }

        (record, report)
    }
}

/// Convenience wrapper with the default strategy chain.
pub fn extract(text: &str, spec: &SectionSpec) -> ParsedRecord {
    SectionExtractor::new(spec.clone()).extract(text)
}

/// Turns an isolated body into the value its kind asks for.
fn resolve(rule: &SectionRule, body: &str, report: &mut ExtractionReport) -> SectionValue {
    match &rule.kind {
        SectionKind::Text => SectionValue::Text(normalize(body)),
        SectionKind::QuotedText => SectionValue::Text(unquote(&normalize(body))),
        SectionKind::List => SectionValue::List(parse_list_items(body)),
        SectionKind::Cast => {
            let block = parse_cast_block(body);
            for line in block.skipped {
                tracing::debug!("Skipping malformed cast line in '{}': {}", rule.name, line);
                report.skipped_lines.push(SkippedLine {
                    section: rule.name.clone(),
                    line,
                });
            }
            SectionValue::Cast(block.cast)
        }
        SectionKind::Fields(names) => {
            let lookup = LineFieldStrategy::loose();
            let mut fields = FieldMap::default();
            for name in names {
                let value = lookup.find(body, name).unwrap_or_default();
                fields.push(name, value);
            }
            SectionValue::Fields(fields)
        }
    }
}

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    fn two_section_spec() -> SectionSpec {
        SectionSpec::new(vec![
            SectionRule::new(
                "Plot Summary",
                Boundary::marker("**Plot Summary:**"),
                Boundary::marker("**Taglines:**"),
            ),
            SectionRule::new("Taglines", Boundary::marker("**Taglines:**"), Boundary::EndOfText)
                .kind(SectionKind::List),
        ])
        .unwrap()
    }

    #[test]
    fn test_plot_summary_example() {
        let text = "**Plot Summary:**\nA hero rises.\n\n**Taglines:**\n- \"Fly.\"";
        let record = extract(text, &two_section_spec());
        assert_eq!(record.text("Plot Summary"), "A hero rises.");
        assert_eq!(record.list("Taglines"), &["\"Fly.\"".to_string()]);
    }

    #[test]
    fn test_normalize_collapses_newlines_and_unescapes_dash() {
        let raw = "  Inception (2010) \\u2013 A\nMind-Bending\r\nThriller \n";
        assert_eq!(normalize(raw), "Inception (2010) \u{2013} A Mind-Bending Thriller");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let samples = [
            "  plain text  ",
            "line one\nline two\n\nline three",
            "Title \\u2013 Subtitle",
            "\\\\u2013 double escaped",
            "",
        ];
        for raw in samples {
            let once = normalize(raw);
            assert_eq!(normalize(&once), once, "not idempotent for {:?}", raw);
        }
    }

    #[test]
    fn test_body_spans_multiple_lines() {
        let spec = SectionSpec::new(vec![SectionRule::new(
            "Conclusion",
            Boundary::marker("**Conclusion:**"),
            Boundary::marker("**Overall Rating:**"),
        )])
        .unwrap();
        let text = "**Conclusion:**\nFirst line.\nSecond line.\n**Overall Rating:** 9/10";
        assert_eq!(extract(text, &spec).text("Conclusion"), "First line. Second line.");
    }

    #[test]
    fn test_last_section_runs_to_end_of_text() {
        let spec = SectionSpec::from_headers(&[
            ("Meta Title", SectionKind::Text),
            ("Meta Description", SectionKind::Text),
        ])
        .unwrap();
        let text = "**Meta Title:**\nShort title\n\n**Meta Description:**\n  The rest of the text.\n\n";
        let record = extract(text, &spec);
        assert_eq!(record.text("Meta Title"), "Short title");
        assert_eq!(record.text("Meta Description"), "The rest of the text.");
    }

    #[test]
    fn test_missing_sections_default_without_cross_contamination() {
        let spec = SectionSpec::from_headers(&[
            ("Plot Summary", SectionKind::Text),
            ("Taglines", SectionKind::List),
            ("Criticism", SectionKind::Text),
            ("Conclusion", SectionKind::Text),
        ])
        .unwrap();
        let text = "**Plot Summary:**\nA hero rises.\n\n**Criticism:**\nToo long.\n";
        let (record, report) = SectionExtractor::new(spec).extract_with_report(text);

        assert_eq!(record.text("Plot Summary"), "A hero rises.");
        assert_eq!(record.text("Criticism"), "Too long.");
        assert!(record.list("Taglines").is_empty());
        assert_eq!(record.text("Conclusion"), "");
        assert_eq!(report.defaulted_sections, vec!["Taglines", "Conclusion"]);
        assert_eq!(report.recovered_sections.len(), 2);
        assert_eq!(record.len(), 4);
    }

    #[test]
    fn test_empty_and_unstructured_input_never_fails() {
        let spec = two_section_spec();
        for text in ["", "no headers at all", "**Plot Summary:**"] {
            let record = extract(text, &spec);
            assert_eq!(record.len(), 2);
            assert!(record.list("Taglines").is_empty());
        }
        assert_eq!(extract("**Plot Summary:**", &spec).text("Plot Summary"), "");
    }

    #[test]
    fn test_bold_header_accepts_both_colon_placements() {
        let spec = SectionSpec::from_headers(&[
            ("Criticism", SectionKind::Text),
            ("Conclusion", SectionKind::Text),
        ])
        .unwrap();
        let text = "**Criticism**: Uneven pacing.\n**Conclusion:** Worth it.";
        let record = extract(text, &spec);
        assert_eq!(record.text("Criticism"), "Uneven pacing.");
        assert_eq!(record.text("Conclusion"), "Worth it.");
    }

    #[test]
    fn test_quoted_text_and_fallback_pattern() {
        let title = SectionRule::new("Title", Boundary::bold_header("Title"), Boundary::bold_header("Plot"))
            .kind(SectionKind::QuotedText)
            .with_fallback(r#"\A\s*"([^"\n]+)""#)
            .unwrap();
        let spec = SectionSpec::new(vec![
            title,
            SectionRule::new("Plot", Boundary::bold_header("Plot"), Boundary::EndOfText),
        ])
        .unwrap();

        let with_header = "**Title:**\n\"Heat (1995) \\u2013 A Crime Epic\"\n\n**Plot:**\nCops and robbers.";
        assert_eq!(extract(with_header, &spec).text("Title"), "Heat (1995) \u{2013} A Crime Epic");

        let (record, report) = SectionExtractor::new(spec.clone())
            .extract_with_report("\"Heat (1995)\"\n\n**Plot:**\nCops and robbers.");
        assert_eq!(record.text("Title"), "Heat (1995)");
        assert_eq!(report.recovered_sections[0].strategy, "fallback-pattern");

        // The fallback only looks at the start of the text.
        let quoted_later = "**Plot:**\nHe said \"go\".";
        assert_eq!(extract(quoted_later, &spec).text("Title"), "");
    }

    #[test]
    fn test_fields_kind_reads_lines_inside_section_only() {
        let spec = SectionSpec::from_headers(&[
            (
                "General Information",
                SectionKind::Fields(vec!["Release Year".into(), "Genre".into(), "Language".into()]),
            ),
            ("Director and Crew", SectionKind::Text),
        ])
        .unwrap();
        let text = "**General Information:**\n- **Release Year:** 2022\n- Genre: Drama, Thriller\n\n\
                    **Director and Crew:**\n- Language: should not leak\n";
        let record = extract(text, &spec);
        let fields = record.fields("General Information").unwrap();
        assert_eq!(fields.get("Release Year"), Some("2022"));
        assert_eq!(fields.get("Genre"), Some("Drama, Thriller"));
        assert_eq!(fields.get("Language"), Some(""));
    }

    #[test]
    fn test_absent_fields_section_keeps_every_key() {
        let spec = SectionSpec::from_headers(&[(
            "Director and Crew",
            SectionKind::Fields(vec!["Director".into(), "Writer".into()]),
        )])
        .unwrap();
        let json = serde_json::to_value(extract("nothing here", &spec)).unwrap();
        assert_eq!(json, serde_json::json!({"Director and Crew": {"Director": "", "Writer": ""}}));
    }

    #[test]
    fn test_record_serializes_in_declaration_order() {
        let spec = SectionSpec::from_headers(&[
            ("Zeta", SectionKind::Text),
            ("Alpha", SectionKind::List),
        ])
        .unwrap();
        let json = serde_json::to_string(&extract("**Zeta:** z\n**Alpha:**\n- a\n- b", &spec)).unwrap();
        assert_eq!(json, r#"{"Zeta":"z","Alpha":["a","b"]}"#);
    }

    #[test]
    fn test_list_items_strip_bullets_and_numbers() {
        let items = parse_list_items("\n- first\n* second\n3. third\n\u{2022} fourth\nplain\n\n");
        assert_eq!(items, vec!["first", "second", "third", "fourth", "plain"]);
    }

    #[test]
    fn test_spec_misuse_is_rejected() {
        assert!(matches!(SectionSpec::new(vec![]), Err(SpecError::EmptySpec)));
        assert!(matches!(
            SectionSpec::new(vec![SectionRule::new("A", Boundary::EndOfText, Boundary::EndOfText)]),
            Err(SpecError::StartAtEndOfText(_))
        ));
        assert!(matches!(
            SectionSpec::new(vec![SectionRule::new("A", Boundary::marker(""), Boundary::EndOfText)]),
            Err(SpecError::EmptyMarker(_))
        ));
        assert!(matches!(
            SectionSpec::new(vec![
                SectionRule::new("A", Boundary::marker("a"), Boundary::EndOfText),
                SectionRule::new("A", Boundary::marker("b"), Boundary::EndOfText),
            ]),
            Err(SpecError::DuplicateSection(_))
        ));
        assert!(matches!(Boundary::pattern("(unclosed"), Err(SpecError::InvalidPattern { .. })));
    }

    #[test]
    fn test_pattern_boundary_matches_across_lines() {
        let spec = SectionSpec::new(vec![SectionRule::new(
            "Body",
            Boundary::pattern(r"BEGIN\s*:").unwrap(),
            Boundary::pattern(r"\nEND").unwrap(),
        )])
        .unwrap();
        assert_eq!(extract("BEGIN\n:\nx\ny\nEND", &spec).text("Body"), "x y");
    }

    #[test]
    fn test_find_offset_inside_a_character() {
        let text = "\u{e9}**Plot Summary:** x";
        for boundary in [Boundary::marker("**Plot Summary:**"), Boundary::bold_header("Plot Summary")] {
            assert_eq!(boundary.find(text, 1), None);
            assert_eq!(boundary.find(text, text.len() + 1), None);
            assert_eq!(boundary.find(text, 2), Some((2, 19)));
        }
    }

    #[test]
    fn test_report_is_clean_only_without_diagnostics() {
        let extractor = SectionExtractor::new(two_section_spec());
        let (_, report) = extractor.extract_with_report("**Plot Summary:**\nA.\n**Taglines:**\n- B.");
        assert!(report.is_clean());

        let (_, report) = extractor.extract_with_report("**Taglines:**\n- B.");
        assert_eq!(report.defaulted_sections, vec!["Plot Summary"]);
        assert!(!report.is_clean());
    }
}
