/*!
 * Tests for batched sentence translation
 */

use novelscene::errors::ProviderError;
use novelscene::providers::mock::{EchoTranslator, FailingCapability};
use novelscene::translation::{plan_batches, TranslationBatcher};

fn sentences(count: usize, length: usize) -> Vec<String> {
    (0..count)
        .map(|i| {
            let head = format!("S{}-", i);
            format!("{}{}", head, "a".repeat(length - head.len()))
        })
        .collect()
}

/// Test that 80 sentences of 400 chars never exceed a 1000 char batch
#[tokio::test]
async fn test_translateAll_eightyLongSentences_shouldStayUnderCharBudget() {
    let input = sentences(80, 400);
    let translator = EchoTranslator::new();
    let batcher = TranslationBatcher::new(1000, 100);

    let translated = batcher.translate_all(&translator, &input).await.unwrap();

    assert_eq!(translated.len(), 80);
    assert_eq!(translated[17], EchoTranslator::translation_of(&input[17]));
    let batches = translator.batches();
    assert_eq!(batches.len(), 40);
    for batch in &batches {
        let summed: usize = batch.iter().map(|s| s.chars().count()).sum();
        assert!(summed <= 1000);
    }
}

/// Test that the item budget closes batches
#[test]
fn test_planBatches_shouldRespectItemBudget() {
    let input = sentences(250, 10);

    let batches = plan_batches(&input, 100_000, 100);

    assert_eq!(batches, vec![0..100, 100..200, 200..250]);
}

/// Test that a sentence longer than the budget is sent alone
#[test]
fn test_planBatches_oversizedSentence_shouldFormOwnBatch() {
    let mut input = sentences(4, 300);
    input.insert(2, "b".repeat(1500));

    let batches = plan_batches(&input, 1000, 100);

    assert_eq!(batches, vec![0..2, 2..3, 3..5]);
}

/// Test that short answers are padded so the output stays aligned
#[tokio::test]
async fn test_translateAll_shortAnswers_shouldPadWithEmptyStrings() {
    let input = sentences(6, 20);
    let translator = EchoTranslator::dropping_last(1);
    let batcher = TranslationBatcher::new(45, 10);

    let translated = batcher.translate_all(&translator, &input).await.unwrap();

    assert_eq!(translated.len(), 6);
    assert_eq!(translator.batches().len(), 3);
    for (index, translation) in translated.iter().enumerate() {
        if index % 2 == 1 {
            assert!(translation.is_empty());
        } else {
            assert_eq!(translation, &EchoTranslator::translation_of(&input[index]));
        }
    }
}

#[tokio::test]
async fn test_translateAll_translatorFailure_shouldAbort() {
    let batcher = TranslationBatcher::new(1000, 100);

    let result = batcher.translate_all(&FailingCapability, &sentences(3, 20)).await;

    assert!(matches!(result, Err(ProviderError::ApiError { status_code: 503, .. })));
}

#[tokio::test]
async fn test_translateAll_emptyInput_shouldNotCallTranslator() {
    let translator = EchoTranslator::new();

    let translated = TranslationBatcher::new(1000, 100)
        .translate_all(&translator, &[])
        .await
        .unwrap();

    assert!(translated.is_empty());
    assert!(translator.batches().is_empty());
}
