// src/extractors/review.rs
use crate::extractors::cast::{parse_cast_block, parse_cast_lines};
use crate::extractors::fields::FieldExtractor;
use crate::extractors::section::{
    normalize, Boundary, ExtractionReport, ParsedRecord, SectionExtractor, SectionKind, SectionRule,
    SectionSpec,
};
use crate::generation::models::RawReview;
use crate::utils::error::SpecError;
use serde::{Deserialize, Serialize};

pub const GENERAL_INFORMATION_FIELDS: &[&str] = &[
    "Release Year",
    "Genre",
    "Runtime",
    "IMDb Rating",
    "MPAA Rating",
    "Language",
    "Country of Origin",
    "Filming Locations",
    "Box Office Information",
];

pub const CREW_FIELDS: &[&str] = &["Director", "Writer", "Producers"];

/// Title line without a `**Title:**` header: a quoted string opening the text.
const TITLE_FALLBACK: &str = r#"\A\s*"([^"\n]+)""#;

fn owned(names: &[&str]) -> Vec<String> {
    names.iter().map(|n| n.to_string()).collect()
}

/// The movie review layout, headers in the order the primer asks for them.
pub fn review_spec() -> Result<SectionSpec, SpecError> {
    let headers = [
        ("Title", SectionKind::QuotedText),
        ("General Information", SectionKind::Fields(owned(GENERAL_INFORMATION_FIELDS))),
        ("Director and Crew", SectionKind::Fields(owned(CREW_FIELDS))),
        ("Main Cast", SectionKind::Cast),
        ("Plot Summary", SectionKind::Text),
        ("Taglines", SectionKind::List),
        ("Themes & Symbolism", SectionKind::Text),
        ("Character Development", SectionKind::Text),
        ("Directorial Vision", SectionKind::Text),
        ("Soundtrack & Music", SectionKind::Text),
        ("Production Design", SectionKind::Text),
        ("Pacing and Structure", SectionKind::Text),
        ("Cultural, Social, or Historical Context", SectionKind::Text),
        ("Audience Reception & Critical Acclaim", SectionKind::Text),
        ("Trivia and Fun Facts", SectionKind::List),
        ("Quotes & Dialogue", SectionKind::List),
        ("Legacy and Impact", SectionKind::Text),
        ("Criticism", SectionKind::Text),
        ("Conclusion", SectionKind::Text),
        ("Who Should Watch", SectionKind::Text),
        ("Overall Rating", SectionKind::Text),
        ("Meta Title", SectionKind::Text),
        ("Meta Description", SectionKind::Text),
    ];
    let spec = SectionSpec::from_headers(&headers)?;

    let title = SectionRule::new(
        "Title",
        Boundary::bold_header("Title"),
        Boundary::bold_header("General Information"),
    )
    .kind(SectionKind::QuotedText)
    .with_fallback(TITLE_FALLBACK)?;
    Ok(spec.replace_rule(title))
}

/// Flat per-movie summary, one level deep.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MovieSummary {
    pub movie_name: String,
    pub release_year: Option<String>,
    pub rating: Option<String>,
    pub runtime: Option<String>,
    pub imdb_rating: Option<String>,
    pub genre: Option<String>,
    pub plot_summary: Option<String>,
    pub director: Option<String>,
    pub writers: Vec<String>,
    pub stars: Vec<String>,
}

impl MovieSummary {
    pub fn build(movie_name: &str, text: &str, sections: &SectionExtractor, fields: &FieldExtractor) -> Self {
        let plot_summary = sections
            .locate_section(text, "Plot Summary")
            .map(normalize)
            .filter(|plot| !plot.is_empty());

        let writers = fields
            .extract_field(text, "Writer")
            .map(|w| {
                w.split(',')
                    .map(str::trim)
                    .filter(|w| !w.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();

        Self {
            movie_name: movie_name.to_string(),
            release_year: fields.extract_field(text, "Release Year"),
            rating: fields.extract_field(text, "MPAA Rating"),
            runtime: fields.extract_field(text, "Runtime"),
            imdb_rating: fields.extract_field(text, "IMDb Rating"),
            genre: fields.extract_field(text, "Genre"),
            plot_summary,
            director: fields.extract_field(text, "Director"),
            writers,
            stars: stars(text, sections),
        }
    }
}

/// Actor names from the cast block; without lead/supporting sub-headers every
/// "Name as Role" line of the section counts.
fn stars(text: &str, sections: &SectionExtractor) -> Vec<String> {
    let Some(body) = sections.locate_section(text, "Main Cast") else {
        return Vec::new();
    };
    let block = parse_cast_block(body);
    if !block.cast.is_empty() {
        return block.cast.actors().map(String::from).collect();
    }
    let (entries, _) = parse_cast_lines(body);
    entries.into_iter().map(|e| e.actor_name).collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct ParsedReview {
    pub movie_name: String,
    pub review: ParsedRecord,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReviewReport {
    pub movie_name: String,
    #[serde(flatten)]
    pub report: ExtractionReport,
}

/// Everything extracted from one generated review.
#[derive(Debug, Clone)]
pub struct ReviewExtraction {
    pub parsed: ParsedReview,
    pub summary: MovieSummary,
    pub report: ReviewReport,
}

/// Holds the compiled review layout; cheap to share across tasks.
pub struct ReviewParser {
    sections: SectionExtractor,
    fields: FieldExtractor,
}

impl ReviewParser {
    pub fn new() -> Result<Self, SpecError> {
        Ok(Self::with_spec(review_spec()?))
    }

    pub fn with_spec(spec: SectionSpec) -> Self {
        Self {
            sections: SectionExtractor::new(spec),
            fields: FieldExtractor::new(),
        }
    }

    pub fn spec(&self) -> &SectionSpec {
        self.sections.spec()
    }

    pub fn parse(&self, raw: &RawReview) -> ReviewExtraction {
        let (record, report) = self.sections.extract_with_report(&raw.review);
        if !report.is_clean() {
            tracing::debug!(
                "Review for '{}': missing [{}], {} recovered section(s), {} skipped cast line(s)",
                raw.movie_name,
                report.defaulted_sections.join(", "),
                report.recovered_sections.len(),
                report.skipped_lines.len()
            );
        }
        let summary = MovieSummary::build(&raw.movie_name, &raw.review, &self.sections, &self.fields);

        ReviewExtraction {
            parsed: ParsedReview {
                movie_name: raw.movie_name.clone(),
                review: record,
            },
            summary,
            report: ReviewReport {
                movie_name: raw.movie_name.clone(),
                report,
            },
        }
    }
}
