/*!
 * Ingestion pipeline.
 *
 * Drives one document from raw text to finalized scenes with exercises:
 * heading stripping, sentence slicing, batched translation, chunking,
 * sequential scene classification threaded through the reconciler,
 * continuation merging, title synthesis and per-segment exercise generation.
 *
 * Capabilities are awaited one call at a time. Each classification request
 * carries the summary produced by the previous chunk, so chunks cannot be
 * classified out of order.
 */

use log::{debug, info};
use serde::Serialize;
use std::sync::Arc;

use super::exercises::{ExerciseCollector, Question, VocabularyItem};
use crate::app_config::SegmentationConfig;
use crate::errors::IngestError;
use crate::providers::{ClassificationRequest, ExerciseGenerator, SceneClassifier, Translator};
use crate::segmentation::{
    chunk_sentence_pairs, merge_candidates, rebalance, single_chunk, FinalScene, ReconcileState,
    ReconciledScene, SceneReconciler, SceneSentence,
};
use crate::text::{build_sentence_slices, strip_headings, SentenceSlice, TitleSynthesizer};
use crate::translation::TranslationBatcher;

/// A finalized scene with its validated exercises
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenePackage {
    pub scene: FinalScene,
    pub vocabulary: Vec<VocabularyItem>,
    pub questions: Vec<Question>,
}

/// Result of one ingestion
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IngestionOutput {
    /// Scenes in document order
    pub scenes: Vec<ScenePackage>,
    /// Sentence units sliced from the cleaned text
    pub sentence_count: usize,
    /// Classifier calls made
    pub chunk_count: usize,
    /// Scene proposals discarded by the reconciler
    pub rejected_proposals: usize,
    /// Vocabulary items and questions discarded during validation
    pub discarded_exercises: usize,
}

/// Splits documents into scenes using the configured capabilities
#[derive(Clone)]
pub struct IngestionPipeline {
    translator: Arc<dyn Translator>,
    classifier: Arc<dyn SceneClassifier>,
    exercises: Arc<dyn ExerciseGenerator>,
    config: SegmentationConfig,
}

impl std::fmt::Debug for IngestionPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IngestionPipeline")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl IngestionPipeline {
    /// Create a pipeline over the given capabilities
    pub fn new(
        translator: Arc<dyn Translator>,
        classifier: Arc<dyn SceneClassifier>,
        exercises: Arc<dyn ExerciseGenerator>,
        config: SegmentationConfig,
    ) -> Self {
        Self {
            translator,
            classifier,
            exercises,
            config,
        }
    }

    /// Segmentation budgets in use
    pub fn config(&self) -> &SegmentationConfig {
        &self.config
    }

    /// Ingest `text` without progress reporting
    pub async fn ingest(&self, text: &str) -> Result<IngestionOutput, IngestError> {
        self.ingest_with_progress(text, &|_, _| {}).await
    }

    /// Ingest `text`, reporting `(chunks_processed, chunks_total)` to `progress`.
    ///
    /// `progress` is called with `(0, total)` before the first classifier call
    /// and once after every chunk. It runs inline and must not block.
    pub async fn ingest_with_progress(
        &self,
        text: &str,
        progress: &(dyn Fn(usize, usize) + Sync),
    ) -> Result<IngestionOutput, IngestError> {
        let (cleaned, headings) = strip_headings(text);
        let slices = build_sentence_slices(&cleaned, self.config.max_sentence_chars);
        if slices.is_empty() {
            info!("No sentences found, nothing to segment");
            return Ok(IngestionOutput::default());
        }
        info!(
            "Sliced {} sentences, removed {} headings",
            slices.len(),
            headings.len()
        );

        let source: Vec<String> = slices.iter().map(|slice| slice.text.clone()).collect();
        let batcher = TranslationBatcher::new(
            self.config.translation_batch_chars,
            self.config.translation_batch_items,
        );
        let translated = batcher
            .translate_all(self.translator.as_ref(), &source)
            .await
            .map_err(IngestError::Translation)?;
        info!("Translated {} sentences", translated.len());

        let mut chunks = chunk_sentence_pairs(&source, &translated, &self.config.chunking_options());
        if chunks.is_empty() {
            chunks.push(single_chunk(&source, &translated));
        }
        let total = chunks.len();
        info!("Classifying scene boundaries over {} chunks", total);

        let reconciler = SceneReconciler::new(&cleaned, &slices);
        let mut state = ReconcileState::default();
        let mut rejected_proposals = 0;
        progress(0, total);

        for chunk in &chunks {
            let request = ClassificationRequest {
                source_sentences: chunk.source_sentences.clone(),
                translated_sentences: chunk.translated_sentences.clone(),
                chunk_index: chunk.index,
                total_chunks: total,
                previous_summary: state.previous_summary.clone(),
            };
            let proposals = self
                .classifier
                .classify_scene_boundaries(&request)
                .await
                .map_err(|source| IngestError::Classification {
                    chunk_index: chunk.index,
                    source,
                })?;

            let outcome = reconciler.reconcile_chunk(state, chunk, &proposals);
            rejected_proposals += outcome.rejections.len();
            state = outcome.state;
            progress((chunk.index + 1).min(total), total);
        }

        let merged = merge_candidates(state.candidates, &cleaned, &slices);
        info!(
            "Reconciled {} scenes ({} proposals rejected)",
            merged.len(),
            rejected_proposals
        );

        let titles = TitleSynthesizer::new(&headings, &slices);
        let finals: Vec<FinalScene> = merged
            .into_iter()
            .enumerate()
            .map(|(position, scene)| finalize_scene(position + 1, scene, &slices, &translated, &titles))
            .collect();

        let mut scenes = Vec::with_capacity(finals.len());
        let mut discarded_exercises = 0;
        for scene in finals {
            let (package, discarded) = self.attach_exercises(scene).await?;
            discarded_exercises += discarded;
            scenes.push(package);
        }
        info!(
            "Generated exercises for {} scenes ({} items discarded)",
            scenes.len(),
            discarded_exercises
        );

        Ok(IngestionOutput {
            scenes,
            sentence_count: slices.len(),
            chunk_count: total,
            rejected_proposals,
            discarded_exercises,
        })
    }

    async fn attach_exercises(&self, scene: FinalScene) -> Result<(ScenePackage, usize), IngestError> {
        let pairs: Vec<(String, String)> = scene
            .sentences
            .iter()
            .map(|sentence| (sentence.original_text.clone(), sentence.translated_text.clone()))
            .collect();
        let segments = rebalance(&pairs, self.config.max_prompt_chars);
        debug!("Scene {}: {} prompt segments", scene.index, segments.len());

        let scene_index = scene.index;
        let to_ingest_error = |source| IngestError::Exercise { scene_index, source };
        let mut collector = ExerciseCollector::new(self.config.max_questions_per_scene);

        for segment in &segments {
            let text = segment.source_text();
            let vocabulary = self
                .exercises
                .extract_vocabulary(&text, &segment.translations)
                .await
                .map_err(to_ingest_error)?;
            collector.add_vocabulary(&vocabulary);

            if !collector.questions_full() {
                let questions = self
                    .exercises
                    .generate_questions(&text)
                    .await
                    .map_err(to_ingest_error)?;
                collector.add_questions(&questions);
            }
        }

        let discarded = collector.rejections().len();
        for rejection in collector.rejections() {
            debug!("Scene {}: discarded exercise item: {}", scene_index, rejection);
        }
        let (vocabulary, questions) = collector.finish();

        Ok((
            ScenePackage {
                scene,
                vocabulary,
                questions,
            },
            discarded,
        ))
    }
}

fn finalize_scene(
    number: usize,
    scene: ReconciledScene,
    slices: &[SentenceSlice],
    translated: &[String],
    titles: &TitleSynthesizer,
) -> FinalScene {
    let sentences: Vec<SceneSentence> = (scene.sentence_start..=scene.sentence_end)
        .enumerate()
        .map(|(position, global)| SceneSentence {
            index: position + 1,
            original_text: slices[global].text.clone(),
            translated_text: translated.get(global).cloned().unwrap_or_default(),
        })
        .collect();

    let first_sentence = sentences.first().map_or("", |s| s.original_text.as_str());
    let title = titles.title_for(scene.title.as_deref(), scene.sentence_start, first_sentence, number);

    FinalScene {
        index: number,
        title,
        summary: scene.summary,
        content: scene.content,
        sentence_start: scene.sentence_start,
        sentence_end: scene.sentence_end,
        sentences,
    }
}
