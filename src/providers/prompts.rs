/*!
 * Prompt templates for the LLM-backed capabilities.
 *
 * Every template asks for a single JSON object so responses can be parsed
 * without free-text heuristics. `{source_language}` and `{target_language}`
 * placeholders are replaced with language names at render time.
 */

use super::{ClassificationRequest, CompletionRequest};

/// Key of the JSON array expected from each prompt
pub const TRANSLATIONS_KEY: &str = "translations";
pub const SCENES_KEY: &str = "scenes";
pub const VOCABULARY_KEY: &str = "vocabulary";
pub const QUESTIONS_KEY: &str = "questions";

const TRANSLATOR_SYSTEM: &str = r#"You are a literary translator working from {source_language} into {target_language}.
Translate each numbered sentence on its own, keeping the order and the numbering.
Return ONLY a JSON object of the form {"translations": ["...", "..."]} with exactly one string per input sentence."#;

const CLASSIFIER_SYSTEM: &str = r#"You are segmenting a {source_language} novel into concise scenes.
You receive numbered sentences (1-based) in {target_language} translation with the {source_language} original.
Return ONLY a JSON object with an array named "scenes". Each scene must have fields:
- title: short descriptive title
- summary: one or two sentences in {target_language} summarizing the scene
- start_sentence_index: number of the first sentence of the scene
- end_sentence_index: number of the last sentence of the scene
- continues_from_previous: true if the scene began before this chunk
- continues_to_next: true if the scene continues in the next chunk
Scenes must not overlap, must preserve sentence order and must cover every sentence."#;

const VOCABULARY_SYSTEM: &str = r#"You are building a vocabulary list for advanced {source_language} learners.
Given the original {source_language} scene text and its {target_language} translation, identify key vocabulary terms.
Return ONLY a JSON object with an array named "vocabulary". Each item must have:
- term: the {source_language} word or expression
- part_of_speech: optional abbreviated part of speech (e.g. "n.", "v.", "adj.")
- definition: short {target_language} definition
- example_sentence: the {source_language} sentence using the term
Focus on non-trivial, scene-specific vocabulary."#;

const QUESTIONS_SYSTEM: &str = r#"You are a {source_language} language instructor creating reading comprehension questions.
Given the {source_language} scene, write exactly four multiple choice questions in {source_language} that test understanding of the passage.
Return ONLY a JSON object with an array named "questions". Each question must contain:
- prompt: the question text
- options: an array of exactly four objects, each with "text" and a boolean "is_correct"
Exactly one option per question is correct."#;

/// Renders prompts for one language pair
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    source_language: String,
    target_language: String,
    temperature: f32,
}

fn numbered(sentences: &[String]) -> String {
    sentences
        .iter()
        .enumerate()
        .map(|(i, sentence)| format!("{}. {}", i + 1, sentence))
        .collect::<Vec<_>>()
        .join("\n")
}

impl PromptBuilder {
    /// Create a builder for the given language names
    pub fn new(source_language: &str, target_language: &str, temperature: f32) -> Self {
        Self {
            source_language: source_language.to_string(),
            target_language: target_language.to_string(),
            temperature,
        }
    }

    fn render(&self, template: &str) -> String {
        template
            .replace("{source_language}", &self.source_language)
            .replace("{target_language}", &self.target_language)
    }

    fn request(&self, template: &str, prompt: String) -> CompletionRequest {
        CompletionRequest::new(self.render(template), prompt).temperature(self.temperature)
    }

    /// Prompt translating a batch of sentences
    pub fn translation(&self, sentences: &[String]) -> CompletionRequest {
        self.request(
            TRANSLATOR_SYSTEM,
            format!("Sentences ({}):\n{}", sentences.len(), numbered(sentences)),
        )
    }

    /// Prompt classifying scene boundaries in one chunk
    pub fn classification(&self, request: &ClassificationRequest) -> CompletionRequest {
        let mut prompt = format!(
            "You are analysing chunk {} of {}.\n",
            request.chunk_index + 1,
            request.total_chunks
        );
        if let Some(summary) = &request.previous_summary {
            prompt.push_str(&format!("Summary of the previous scene: {}\n", summary));
        }

        // Fall back to the original where a translation is missing
        let shown: Vec<String> = request
            .source_sentences
            .iter()
            .enumerate()
            .map(|(i, source)| match request.translated_sentences.get(i) {
                Some(translated) if !translated.is_empty() => format!("{} [{}]", translated, source),
                _ => source.clone(),
            })
            .collect();
        prompt.push_str(&format!("Sentences ({}):\n{}", shown.len(), numbered(&shown)));

        self.request(CLASSIFIER_SYSTEM, prompt)
    }

    /// Prompt extracting vocabulary from a scene segment
    pub fn vocabulary(&self, scene_text: &str, translated_sentences: &[String]) -> CompletionRequest {
        self.request(
            VOCABULARY_SYSTEM,
            format!(
                "Scene:\n{}\n\nTranslation:\n{}",
                scene_text,
                translated_sentences.join(" ")
            ),
        )
    }

    /// Prompt generating comprehension questions for a scene segment
    pub fn questions(&self, scene_text: &str) -> CompletionRequest {
        self.request(QUESTIONS_SYSTEM, format!("Scene:\n{}", scene_text))
    }
}
