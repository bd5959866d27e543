// src/extractors/cast.rs
use crate::extractors::section::normalize;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

const CAST_DELIMITER: &str = " as ";

// "Lead Actors:", "**Lead Actors:**", "Lead Actors and Characters:"
static LEAD_HEADER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)Lead\s+Actors(?:\s+and\s+Characters)?(?:\*\*)?\s*:(?:\*\*)?")
        .expect("Failed to compile LEAD_HEADER_RE")
});

static SUPPORTING_HEADER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)Supporting\s+Cast(?:\*\*)?\s*:(?:\*\*)?")
        .expect("Failed to compile SUPPORTING_HEADER_RE")
});

static LINE_BULLET_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[-*\u{2022}]\s*)+").expect("Failed to compile LINE_BULLET_RE")
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CastEntry {
    pub actor_name: String,
    pub role_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CastList {
    #[serde(rename = "Lead Actors")]
    pub lead: Vec<CastEntry>,
    #[serde(rename = "Supporting Cast")]
    pub supporting: Vec<CastEntry>,
}

impl CastList {
    pub fn is_empty(&self) -> bool {
        self.lead.is_empty() && self.supporting.is_empty()
    }

    /// Actor names, lead first.
    pub fn actors(&self) -> impl Iterator<Item = &str> {
        self.lead
            .iter()
            .chain(self.supporting.iter())
            .map(|entry| entry.actor_name.as_str())
    }
}

/// Parsed cast plus the non-blank lines that had no " as " delimiter.
#[derive(Debug, Clone, Default)]
pub struct CastBlock {
    pub cast: CastList,
    pub skipped: Vec<String>,
}

/// Splits an isolated cast body into lead and supporting entries.
///
/// The lead group is the text between the lead sub-header and a later
/// supporting sub-header; without both it is empty. The supporting group runs
/// from its sub-header to the end of the body (or to a later lead sub-header).
pub fn parse_cast_block(body: &str) -> CastBlock {
    let lead_header = LEAD_HEADER_RE.find(body).map(|m| (m.start(), m.end()));
    let supporting_header = SUPPORTING_HEADER_RE.find(body).map(|m| (m.start(), m.end()));

    let lead_span = match (lead_header, supporting_header) {
        (Some((_, start)), Some((end, _))) if end >= start => &body[start..end],
        _ => "",
    };
    let supporting_span = span_after(body, supporting_header, lead_header);

    let (lead, mut skipped) = parse_cast_lines(lead_span);
    let (supporting, skipped_supporting) = parse_cast_lines(supporting_span);
    skipped.extend(skipped_supporting);

    CastBlock {
        cast: CastList { lead, supporting },
        skipped,
    }
}

/// Text after `header`, up to `other` when that comes later, else to the end.
fn span_after(body: &str, header: Option<(usize, usize)>, other: Option<(usize, usize)>) -> &str {
    let Some((_, start)) = header else {
        return "";
    };
    let end = match other {
        Some((other_start, _)) if other_start >= start => other_start,
        _ => body.len(),
    };
    &body[start..end]
}

/// One entry per line holding " as ", split at its first occurrence.
/// Returns the entries and the skipped non-blank lines, both in input order.
pub fn parse_cast_lines(span: &str) -> (Vec<CastEntry>, Vec<String>) {
    let mut entries = Vec::new();
    let mut skipped = Vec::new();

    for line in span.lines() {
        let cleaned = clean_line(line);
        if cleaned.is_empty() {
            continue;
        }
        match cleaned.split_once(CAST_DELIMITER) {
            Some((actor, role)) if !actor.trim().is_empty() && !role.trim().is_empty() => {
                entries.push(CastEntry {
                    actor_name: normalize(actor),
                    role_name: normalize(role),
                });
            }
            _ => skipped.push(line.trim().to_string()),
        }
    }

    (entries, skipped)
}

/// Drops bullet markers and bold markers around a cast line.
fn clean_line(line: &str) -> String {
    let unbolded = line.replace("**", "");
    LINE_BULLET_RE.replace(unbolded.trim(), "").trim().to_string()
}
