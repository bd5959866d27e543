// src/extractors/mod.rs
pub mod cast;
pub mod fields;
pub mod review;
pub mod section;

// Re-export key extraction types for convenience
#[allow(unused_imports)]
pub use section::{
    extract,
    normalize,
    Boundary,
    ExtractionReport,
    ParsedRecord,
    SectionExtractor,
    SectionKind,
    SectionRule,
    SectionSpec,
    SectionValue,
    SpanStrategy,
};
pub use review::{ReviewExtraction, ReviewParser};
