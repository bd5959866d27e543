// src/generation/prompts.rs
use std::path::Path;

/// Placeholder the primer template carries for the item being reviewed.
pub const ITEM_PLACEHOLDER: &str = "{movie_name}";

const DEFAULT_ROLE_PROMPT: &str = "\
Assume the role of an expert movie reviewer with years of experience and a proven track record.
You have reviewed thousands of movies across genres and eras. Your reviews are structured, detailed, and SEO-optimized.
You are skilled at analyzing film elements, including direction, performances, cinematography, themes, and sound design.
Your reviews provide insightful critique while being engaging and accessible to a wide audience.";

const DEFAULT_PRIMER: &str = "\
Your task is to write a comprehensive, SEO-ready, and structured movie review for the movie {movie_name}.
Format every section header in bold followed by a colon on its own line, for example **Plot Summary:**, and write the sections in this order:

1. Title: an engaging, SEO-friendly title in double quotes that includes the film's name, key genre, and perhaps notable performances.
2. General Information: one bullet each for Release Year, Genre, Runtime, IMDb Rating, MPAA Rating, Language, Country of Origin, Filming Locations, Box Office Information.
3. Director and Crew: one bullet each for Director, Writer, Producers.
4. Main Cast: a \"Lead Actors:\" list and a \"Supporting Cast:\" list, one \"Actor as Character\" line per performer.
5. Plot Summary: a brief, spoiler-free synopsis followed by an analysis of the storyline.
6. Taglines: memorable taglines, one bullet each.
7. Themes & Symbolism: the core themes and how symbolic elements reflect them.
8. Character Development: main character arcs, supporting characters, psychological insights.
9. Directorial Vision: directorial style, cinematography, use of space.
10. Soundtrack & Music: original score, soundtrack and songs, sound design.
11. Production Design: set design, costume and makeup, special effects.
12. Pacing and Structure: pacing, narrative structure, editing.
13. Cultural, Social, or Historical Context: context, impact at time of release, influence on future works.
14. Audience Reception & Critical Acclaim: critical consensus, audience reception, awards and nominations, viewer feedback.
15. Trivia and Fun Facts: behind-the-scenes facts, alternate versions, easter eggs, one bullet each.
16. Quotes & Dialogue: memorable quotes, one bullet each.
17. Legacy and Impact: cultural legacy, references, future adaptations.
18. Criticism: weaknesses and room for improvement.
19. Conclusion: final thoughts with a balanced view of strengths and weaknesses.
20. Who Should Watch: the audience that would enjoy this film.
21. Overall Rating: a score (e.g. 1-10) and the rationale behind it.
22. Meta Title: a short, SEO-optimized title for the review page (max 60 characters).
23. Meta Description: a concise meta description for SEO purposes (max 160 characters).

Keep a professional yet approachable tone that appeals to both casual viewers and film enthusiasts.";

/// System prompt plus the per-item primer template.
#[derive(Debug, Clone)]
pub struct PromptSet {
    role_prompt: String,
    primer_template: String,
}

impl Default for PromptSet {
    fn default() -> Self {
        Self::new(DEFAULT_ROLE_PROMPT, DEFAULT_PRIMER)
    }
}

impl PromptSet {
    pub fn new(role_prompt: impl Into<String>, primer_template: impl Into<String>) -> Self {
        Self {
            role_prompt: role_prompt.into(),
            primer_template: primer_template.into(),
        }
    }

    /// Defaults, with either prompt replaced by a file's contents.
    pub fn load(role_prompt_file: Option<&Path>, primer_file: Option<&Path>) -> std::io::Result<Self> {
        let mut prompts = Self::default();
        if let Some(path) = role_prompt_file {
            prompts.role_prompt = std::fs::read_to_string(path)?.trim().to_string();
            tracing::info!("Loaded role prompt from {}", path.display());
        }
        if let Some(path) = primer_file {
            prompts.primer_template = std::fs::read_to_string(path)?.trim().to_string();
            tracing::info!("Loaded primer template from {}", path.display());
            if !prompts.primer_template.contains(ITEM_PLACEHOLDER) {
                tracing::warn!("Primer template has no {} placeholder; every item gets the same prompt", ITEM_PLACEHOLDER);
            }
        }
        Ok(prompts)
    }

    pub fn role_prompt(&self) -> &str {
        &self.role_prompt
    }

    pub fn primer_template(&self) -> &str {
        &self.primer_template
    }

    pub fn render_primer(&self, item: &str) -> String {
        self.primer_template.replace(ITEM_PLACEHOLDER, item.trim())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractors::review::review_spec;

    #[test]
    fn test_render_substitutes_item() {
        let prompts = PromptSet::new("role", "Review {movie_name} now. ({movie_name})");
        assert_eq!(prompts.render_primer("  Heat "), "Review Heat now. (Heat)");
    }

    #[test]
    fn test_default_primer_names_every_review_section() {
        let prompts = PromptSet::default();
        assert!(prompts.primer_template().contains(ITEM_PLACEHOLDER));
        for rule in review_spec().unwrap().rules() {
            assert!(
                prompts.primer_template().contains(&format!("{}:", rule.name)),
                "primer does not ask for {}",
                rule.name
            );
        }
    }

    #[test]
    fn test_load_overrides_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let primer = dir.path().join("primer.txt");
        std::fs::write(&primer, "Describe {movie_name}.\n").unwrap();

        let prompts = PromptSet::load(None, Some(&primer)).unwrap();
        assert_eq!(prompts.render_primer("Alien"), "Describe Alien.");
        assert_eq!(prompts.role_prompt(), PromptSet::default().role_prompt());
        assert!(PromptSet::load(Some(&dir.path().join("missing.txt")), None).is_err());
    }
}
