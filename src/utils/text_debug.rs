// src/utils/text_debug.rs
use crate::extractors::section::{Boundary, SectionSpec};
use std::collections::BTreeMap;

/// Wraps every matched range in `[[label]]...[[/]]`. Ranges sharing the same
/// span are merged into one marker; ranges overlapping an earlier one are dropped.
pub fn annotate(text: &str, highlights: &[(usize, usize, String)]) -> String {
    let mut merged: BTreeMap<(usize, usize), Vec<&str>> = BTreeMap::new();
    for (start, end, label) in highlights {
        if start <= end && *end <= text.len() && text.is_char_boundary(*start) && text.is_char_boundary(*end) {
            merged.entry((*start, *end)).or_default().push(label);
        }
    }

    let mut annotated = String::with_capacity(text.len() + merged.len() * 16);
    let mut last_pos = 0;
    for ((start, end), labels) in merged {
        if start < last_pos {
            continue;
        }
        annotated.push_str(&text[last_pos..start]);
        annotated.push_str(&format!("[[{}]]", labels.join(" | ")));
        annotated.push_str(&text[start..end]);
        annotated.push_str("[[/]]");
        last_pos = end;
    }
    annotated.push_str(&text[last_pos..]);
    annotated
}

/// Annotated copy of `text` showing where each section's start and declared
/// end boundaries matched. Sections with no marker at all are listed at the top.
pub fn annotate_sections(text: &str, spec: &SectionSpec) -> String {
    let mut highlights = Vec::new();
    let mut unmatched = Vec::new();

    for rule in spec.rules() {
        match rule.start.find(text, 0) {
            Some((start, body_start)) => {
                highlights.push((start, body_start, format!("start:{}", rule.name)));
                if !matches!(rule.end, Boundary::EndOfText) {
                    match rule.end.find(text, body_start) {
                        Some((end, end_stop)) => highlights.push((end, end_stop, format!("end:{}", rule.name))),
                        None => unmatched.push(format!("end:{}", rule.name)),
                    }
                }
            }
            None => unmatched.push(format!("start:{}", rule.name)),
        }
    }

    let mut out = String::new();
    if !unmatched.is_empty() {
        out.push_str(&format!("[[unmatched: {}]]\n\n", unmatched.join(", ")));
    }
    out.push_str(&annotate(text, &highlights));
    out
}
