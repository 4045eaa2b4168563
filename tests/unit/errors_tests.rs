/*!
 * Tests for error types and their retry classification
 */

use novelscene::errors::{AppError, IngestError, ProviderError};

#[test]
fn test_providerError_isRetryable_requestFailure_shouldRetry() {
    assert!(ProviderError::RequestFailed("timeout".to_string()).is_retryable());
    assert!(ProviderError::RateLimitExceeded("slow down".to_string()).is_retryable());
    assert!(!ProviderError::ApiError { status_code: 404, message: String::new() }.is_retryable());
}

/// Test that ingestion errors name the failing chunk or scene
#[test]
fn test_ingestError_display_shouldLocateFailure() {
    let classification = IngestError::Classification {
        chunk_index: 3,
        source: ProviderError::ConnectionError("timeout".to_string()),
    };
    assert_eq!(
        classification.to_string(),
        "Scene classification failed on chunk 3: Connection error: timeout"
    );

    let exercise = IngestError::Exercise {
        scene_index: 2,
        source: ProviderError::ParseError("no json".to_string()),
    };
    assert!(exercise.to_string().contains("scene 2"));
}

#[test]
fn test_appError_from_shouldWrapLayers() {
    let error: AppError = IngestError::Translation(ProviderError::RequestFailed("down".to_string())).into();
    assert!(matches!(error, AppError::Ingest(IngestError::Translation(_))));
    assert!(error.to_string().starts_with("Ingestion error: Translation failed"));

    let error: AppError = std::io::Error::new(std::io::ErrorKind::NotFound, "missing").into();
    assert!(error.to_string().contains("missing"));
}
