// src/storage/mod.rs
use crate::generation::models::RawReview;
use crate::utils::error::StorageError;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Counts written next to each batch of parsed reviews.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionMetadata {
    pub source: String,
    pub total_items: usize,
    pub generation_failures: usize,
    pub parsed_reviews: usize,
    pub reviews_with_missing_sections: usize,
    pub skipped_cast_lines: usize,
    pub extraction_timestamp: String,
}

pub struct StorageManager {
    base_dir: PathBuf,
}

impl StorageManager {
    /// Creates a new StorageManager with the specified base directory
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self, StorageError> {
        let base_path = base_dir.as_ref().to_path_buf();

        // Create the base directory if it doesn't exist
        if !base_path.exists() {
            fs::create_dir_all(&base_path).map_err(StorageError::IoError)?;
        }

        Ok(Self { base_dir: base_path })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn target(&self, file_name: &str) -> Result<PathBuf, StorageError> {
        let path = self.base_dir.join(file_name);
        if let Some(parent) = path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent).map_err(StorageError::IoError)?;
            }
        }
        Ok(path)
    }

    /// Writes any serializable value as pretty JSON.
    pub fn save_json<T: Serialize + ?Sized>(&self, file_name: &str, value: &T) -> Result<PathBuf, StorageError> {
        let file_path = self.target(file_name)?;
        let json = serde_json::to_string_pretty(value)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;
        fs::write(&file_path, json).map_err(StorageError::IoError)?;

        tracing::info!("Saved {}", file_path.display());
        Ok(file_path)
    }

    pub fn save_text(&self, file_name: &str, text: &str) -> Result<PathBuf, StorageError> {
        let file_path = self.target(file_name)?;
        fs::write(&file_path, text).map_err(StorageError::IoError)?;
        tracing::debug!("Saved {}", file_path.display());
        Ok(file_path)
    }

    /// Loads the JSON array in `file_name` (if any), appends one review and
    /// writes it back. Callers must not run two appends on the same file at once.
    pub fn append_review(&self, file_name: &str, review: &RawReview) -> Result<PathBuf, StorageError> {
        let file_path = self.target(file_name)?;
        let mut reviews: Vec<RawReview> = match fs::read_to_string(&file_path) {
            Ok(existing) if !existing.trim().is_empty() => serde_json::from_str(&existing)
                .map_err(|e| StorageError::SerializationError(format!("{}: {}", file_path.display(), e)))?,
            Ok(_) => Vec::new(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(StorageError::IoError(e)),
        };
        reviews.push(review.clone());

        let json = serde_json::to_string_pretty(&reviews)
            .map_err(|e| StorageError::SerializationError(e.to_string()))?;
        fs::write(&file_path, json).map_err(StorageError::IoError)?;

        tracing::debug!("Appended review for {} to {}", review.movie_name, file_path.display());
        Ok(file_path)
    }

    pub fn save_metadata(&self, file_name: &str, metadata: &ExtractionMetadata) -> Result<PathBuf, StorageError> {
        self.save_json(file_name, metadata)
    }
}

/// Current time in RFC 3339, for metadata files.
pub fn timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Reads one item name per line.
pub fn load_items<P: AsRef<Path>>(path: P) -> Result<Vec<String>, StorageError> {
    let text = fs::read_to_string(path.as_ref()).map_err(StorageError::IoError)?;
    Ok(text.lines().map(String::from).collect())
}

/// Reads generated reviews: a JSON array of `{movie_name, review}` objects,
/// or any other file as a single review named after the file stem.
pub fn load_reviews<P: AsRef<Path>>(path: P) -> Result<Vec<RawReview>, StorageError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(StorageError::IoError)?;

    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        return serde_json::from_str(&text)
            .map_err(|e| StorageError::SerializationError(format!("{}: {}", path.display(), e)));
    }

    let movie_name = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .ok_or_else(|| StorageError::UnsupportedInput(path.display().to_string()))?;
    Ok(vec![RawReview {
        movie_name: movie_name.to_string(),
        review: text,
    }])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn review(name: &str) -> RawReview {
        RawReview {
            movie_name: name.to_string(),
            review: format!("**Title:**\n\"{}\"", name),
        }
    }

    #[test]
    fn test_append_review_accumulates() {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageManager::new(dir.path().join("output")).unwrap();

        storage.append_review("movie_reviews.json", &review("Heat")).unwrap();
        let path = storage.append_review("movie_reviews.json", &review("Ran")).unwrap();

        let loaded = load_reviews(&path).unwrap();
        assert_eq!(loaded, vec![review("Heat"), review("Ran")]);
    }

    #[test]
    fn test_append_review_rejects_corrupt_file() {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageManager::new(dir.path()).unwrap();
        storage.save_text("movie_reviews.json", "{not json").unwrap();
        assert!(matches!(
            storage.append_review("movie_reviews.json", &review("Heat")),
            Err(StorageError::SerializationError(_))
        ));
    }

    #[test]
    fn test_plain_text_review_uses_file_stem() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Heat.txt");
        fs::write(&path, "**Plot Summary:**\nCops and robbers.").unwrap();

        let loaded = load_reviews(&path).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].movie_name, "Heat");
    }

    #[test]
    fn test_save_json_creates_nested_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageManager::new(dir.path()).unwrap();
        let path = storage.save_json("debug/report.json", &vec!["a", "b"]).unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "[\n  \"a\",\n  \"b\"\n]");
    }

    #[test]
    fn test_metadata_has_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageManager::new(dir.path()).unwrap();
        let metadata = ExtractionMetadata {
            source: "movie_reviews.json".to_string(),
            total_items: 3,
            generation_failures: 1,
            parsed_reviews: 2,
            reviews_with_missing_sections: 1,
            skipped_cast_lines: 0,
            extraction_timestamp: timestamp(),
        };
        let path = storage.save_metadata("movie_reviews_meta.json", &metadata).unwrap();
        let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(json["parsed_reviews"], 2);
        assert!(chrono::DateTime::parse_from_rfc3339(json["extraction_timestamp"].as_str().unwrap()).is_ok());
    }

    #[test]
    fn test_load_items_keeps_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("movies.txt");
        fs::write(&path, "Heat\n\nRan\n").unwrap();
        assert_eq!(load_items(&path).unwrap(), vec!["Heat", "", "Ran"]);
    }
}
