// src/main.rs
mod extractors;
mod generation;
mod storage;
mod utils;

use clap::{Parser, Subcommand, ValueEnum};
use extractors::{ReviewExtraction, ReviewParser};
use generation::dispatch::{clean_items, dispatch, ItemOutcome};
use generation::models::{
    DEFAULT_BASE_URL, DEFAULT_MAX_TOKENS, DEFAULT_MODEL, DEFAULT_PRIMER_MAX_TOKENS, DEFAULT_TEMPERATURE,
    DEFAULT_TIMEOUT_SECS,
};
use generation::{ChatClient, GenerationConfig, PromptSet, RawReview};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use storage::{ExtractionMetadata, StorageManager};
use tokio::sync::mpsc;
use utils::AppError;

/// Generate structured movie reviews and parse them into JSON records
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Output directory for raw and parsed reviews
    #[arg(short, long, default_value = "./output", global = true)]
    output_dir: String,

    /// Debug mode - save annotated review texts and per-review extraction reports
    #[arg(short, long, global = true)]
    debug: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a review for every line of an input file, then parse them
    Generate(GenerateArgs),
    /// Parse previously generated reviews (JSON array or a single text file)
    Extract(ExtractArgs),
}

#[derive(clap::Args, Debug)]
struct GenerateArgs {
    /// Text file with one movie name per line
    #[arg(short, long)]
    input: PathBuf,

    /// File (inside the output directory) that raw reviews are appended to
    #[arg(long, default_value = "movie_reviews.json")]
    output_file: String,

    /// Maximum number of generation requests in flight
    #[arg(short, long, default_value_t = 8)]
    concurrency: usize,

    /// API key for the generation service
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Base URL of an OpenAI-compatible API
    #[arg(long, env = "OPENAI_BASE_URL", default_value = DEFAULT_BASE_URL)]
    base_url: String,

    #[arg(long, default_value = DEFAULT_MODEL)]
    model: String,

    #[arg(long, default_value_t = DEFAULT_MAX_TOKENS)]
    max_tokens: u32,

    #[arg(long, default_value_t = DEFAULT_TEMPERATURE)]
    temperature: f32,

    /// Per-request timeout in seconds
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,

    /// Replace the built-in reviewer role prompt
    #[arg(long)]
    role_prompt_file: Option<PathBuf>,

    /// Replace the built-in primer; `{movie_name}` is substituted per item
    #[arg(long)]
    primer_file: Option<PathBuf>,

    /// Do not send the warm-up primer request before the batch
    #[arg(long)]
    skip_primer: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Both)]
    format: OutputFormat,
}

#[derive(clap::Args, Debug)]
struct ExtractArgs {
    /// Reviews to parse: `.json` array of {movie_name, review} or a plain text review
    #[arg(short, long)]
    input: PathBuf,

    #[arg(long, value_enum, default_value_t = OutputFormat::Both)]
    format: OutputFormat,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Full section-by-section records
    Nested,
    /// Flat one-level summaries
    Summary,
    Both,
}

/// Totals for one batch, carried into the metadata file.
struct Batch<'a> {
    source: &'a str,
    total_items: usize,
    generation_failures: usize,
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // 1. Load .env before parsing so env-backed flags see its values
    let env_file = std::env::current_dir().ok().and_then(|dir| load_env_file(&dir));

    // 2. Parse CLI Arguments
    let args = Args::parse();

    // 3. Setup Logging (reads RUST_LOG env var)
    utils::logging::setup_logging(args.debug);
    if let Some(path) = &env_file {
        tracing::debug!("Loaded environment from {}", path.display());
    }

    // 4. Initialize storage and the review parser
    let storage = StorageManager::new(&args.output_dir)?;
    let parser = ReviewParser::new()?;
    tracing::debug!("Review layout has {} sections", parser.spec().rules().len());

    match &args.command {
        Command::Generate(generate) => run_generate(generate, &storage, &parser, args.debug).await,
        Command::Extract(extract) => run_extract(extract, &storage, &parser, args.debug),
    }
}

async fn run_generate(
    args: &GenerateArgs,
    storage: &StorageManager,
    parser: &ReviewParser,
    debug: bool,
) -> Result<(), AppError> {
    let config = GenerationConfig {
        api_key: args.api_key.clone(),
        base_url: args.base_url.clone(),
        model: args.model.clone(),
        max_tokens: args.max_tokens,
        primer_max_tokens: DEFAULT_PRIMER_MAX_TOKENS,
        temperature: args.temperature,
        timeout: Duration::from_secs(args.timeout_secs),
    };
    let prompts = PromptSet::load(args.role_prompt_file.as_deref(), args.primer_file.as_deref())?;
    let client = ChatClient::new(config, prompts)?;

    let items = clean_items(storage::load_items(&args.input)?);
    if items.is_empty() {
        return Err(AppError::Config(format!("No items found in {}", args.input.display())));
    }

    if args.skip_primer {
        tracing::debug!("Skipping primer request");
    } else {
        client.send_primer().await?;
    }

    tracing::info!(
        "Generating {} reviews with {} (at most {} at a time)",
        items.len(),
        args.model,
        args.concurrency
    );

    // A single writer task owns the raw reviews file; generation tasks send to it.
    let (tx, mut rx) = mpsc::channel::<RawReview>(args.concurrency.max(1) * 2);
    let writer_storage = StorageManager::new(storage.base_dir())?;
    let raw_file = args.output_file.clone();
    let writer = tokio::spawn(async move {
        let mut saved = 0usize;
        while let Some(review) = rx.recv().await {
            match writer_storage.append_review(&raw_file, &review) {
                Ok(_) => saved += 1,
                Err(e) => tracing::error!("Error saving review for {}: {}", review.movie_name, e),
            }
        }
        saved
    });

    let outcomes = dispatch(Arc::new(client), items, args.concurrency, Some(tx)).await;
    let saved = writer
        .await
        .map_err(|e| AppError::Processing(format!("Review writer failed: {}", e)))?;
    tracing::info!("Appended {} raw reviews to {}", saved, args.output_file);

    let failures = outcomes.iter().filter(|o| o.result.is_err()).count();
    let reviews: Vec<RawReview> = outcomes.iter().filter_map(ItemOutcome::review).collect();
    if reviews.is_empty() {
        return Err(AppError::Processing(format!(
            "Failed to generate any of {} reviews",
            outcomes.len()
        )));
    }

    let batch = Batch {
        source: &args.output_file,
        total_items: outcomes.len(),
        generation_failures: failures,
    };
    write_extractions(storage, parser, &reviews, &batch, args.format, debug)
}

fn run_extract(
    args: &ExtractArgs,
    storage: &StorageManager,
    parser: &ReviewParser,
    debug: bool,
) -> Result<(), AppError> {
    tracing::info!("Loading reviews from {}", args.input.display());
    let reviews = storage::load_reviews(&args.input)?;
    if reviews.is_empty() {
        return Err(AppError::Config(format!("No reviews found in {}", args.input.display())));
    }

    let source = args
        .input
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("reviews.json");
    let batch = Batch {
        source,
        total_items: reviews.len(),
        generation_failures: 0,
    };
    write_extractions(storage, parser, &reviews, &batch, args.format, debug)
}

/// Parses every review and writes the requested outputs plus metadata.
fn write_extractions(
    storage: &StorageManager,
    parser: &ReviewParser,
    reviews: &[RawReview],
    batch: &Batch<'_>,
    format: OutputFormat,
    debug: bool,
) -> Result<(), AppError> {
    let stem = Path::new(batch.source)
        .file_stem()
        .and_then(|stem| stem.to_str())
        .unwrap_or("reviews");

    let extractions: Vec<ReviewExtraction> = reviews.iter().map(|review| parser.parse(review)).collect();

    if format != OutputFormat::Summary {
        let parsed: Vec<_> = extractions.iter().map(|e| &e.parsed).collect();
        storage.save_json(&format!("{}_parsed.json", stem), &parsed)?;
    }
    if format != OutputFormat::Nested {
        let summaries: Vec<_> = extractions.iter().map(|e| &e.summary).collect();
        storage.save_json(&format!("{}_summary.json", stem), &summaries)?;
    }

    if debug {
        for review in reviews {
            let annotated = utils::text_debug::annotate_sections(&review.review, parser.spec());
            let file_name = format!("debug/{}_annotated.txt", file_safe(&review.movie_name));
            if let Err(e) = storage.save_text(&file_name, &annotated) {
                tracing::warn!("Failed to save annotated text for {}: {}", review.movie_name, e);
            }
        }
        let reports: Vec<_> = extractions.iter().map(|e| &e.report).collect();
        storage.save_json(&format!("debug/{}_report.json", stem), &reports)?;
    }

    let with_missing = extractions
        .iter()
        .filter(|e| !e.report.report.defaulted_sections.is_empty())
        .count();
    let skipped_lines = extractions.iter().map(|e| e.report.report.skipped_lines.len()).sum();
    let metadata = ExtractionMetadata {
        source: batch.source.to_string(),
        total_items: batch.total_items,
        generation_failures: batch.generation_failures,
        parsed_reviews: extractions.len(),
        reviews_with_missing_sections: with_missing,
        skipped_cast_lines: skipped_lines,
        extraction_timestamp: storage::timestamp(),
    };
    storage.save_metadata(&format!("{}_meta.json", stem), &metadata)?;

    tracing::info!(
        "Processing finished. Parsed: {}, Generation failures: {}, Reviews with missing sections: {}",
        extractions.len(),
        batch.generation_failures,
        with_missing
    );
    Ok(())
}

/// Loads `dir/.env`, or `dir/../.env` when the first is missing. Variables
/// already present in the environment keep their values.
fn load_env_file(dir: &Path) -> Option<PathBuf> {
    [dir.join(".env"), dir.join("..").join(".env")]
        .into_iter()
        .find(|path| dotenvy::from_path(path).is_ok())
}

/// Movie names as file names: anything but letters and digits becomes `_`.
fn file_safe(name: &str) -> String {
    let safe: String = name
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect();
    if safe.is_empty() {
        "untitled".to_string()
    } else {
        safe
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_safe_names() {
        assert_eq!(file_safe("Black Panther: Wakanda Forever"), "Black_Panther__Wakanda_Forever");
        assert_eq!(file_safe(""), "untitled");
    }

    #[test]
    fn test_env_file_found_in_parent_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("run");
        std::fs::create_dir(&nested).unwrap();
        std::fs::write(dir.path().join(".env"), "REVIEW_EXTRACTOR_ENV_CHECK=from-parent\n").unwrap();

        let loaded = load_env_file(&nested).unwrap();
        assert_eq!(loaded, nested.join("..").join(".env"));
        assert_eq!(std::env::var("REVIEW_EXTRACTOR_ENV_CHECK").unwrap(), "from-parent");

        let empty = tempfile::tempdir().unwrap();
        let leaf = empty.path().join("leaf");
        std::fs::create_dir(&leaf).unwrap();
        assert!(load_env_file(&leaf).is_none());
    }

    #[test]
    fn test_cli_parses_subcommands() {
        let args = Args::try_parse_from([
            "review_extractor",
            "--debug",
            "extract",
            "--input",
            "output/movie_reviews.json",
            "--format",
            "summary",
        ])
        .unwrap();
        assert!(args.debug);
        assert!(matches!(args.command, Command::Extract(ref e) if e.format == OutputFormat::Summary));

        let args = Args::try_parse_from(["review_extractor", "generate", "-i", "movies.txt", "-c", "3"]).unwrap();
        match args.command {
            Command::Generate(g) => {
                assert_eq!(g.concurrency, 3);
                assert_eq!(g.max_tokens, DEFAULT_MAX_TOKENS);
                assert_eq!(g.format, OutputFormat::Both);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_extract_writes_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("reviews.json");
        let reviews = vec![RawReview {
            movie_name: "Heat".to_string(),
            review: "**Title:**\n\"Heat (1995)\"\n\n**Main Cast:**\nLead Actors:\nAl Pacino as Vincent Hanna\n\
                     Supporting Cast:\nVal Kilmer as Chris\n\n**Plot Summary:**\nCops and robbers.\n"
                .to_string(),
        }];
        std::fs::write(&input, serde_json::to_string(&reviews).unwrap()).unwrap();

        let out = dir.path().join("out");
        let storage = StorageManager::new(&out).unwrap();
        let parser = ReviewParser::new().unwrap();
        let args = ExtractArgs {
            input,
            format: OutputFormat::Both,
        };
        run_extract(&args, &storage, &parser, true).unwrap();

        let parsed: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(out.join("reviews_parsed.json")).unwrap()).unwrap();
        assert_eq!(parsed[0]["review"]["Title"], "Heat (1995)");
        assert_eq!(parsed[0]["review"]["Main Cast"]["Supporting Cast"][0]["actor_name"], "Val Kilmer");
        assert_eq!(parsed[0]["review"]["Taglines"], serde_json::json!([]));

        let summary: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(out.join("reviews_summary.json")).unwrap()).unwrap();
        assert_eq!(summary[0]["stars"], serde_json::json!(["Al Pacino", "Val Kilmer"]));

        assert!(out.join("reviews_meta.json").exists());
        assert!(out.join("debug/Heat_annotated.txt").exists());
        assert!(out.join("debug/reviews_report.json").exists());
    }
}
