/*!
 * Tests of the ingest workflow: files, controller and database
 */

use anyhow::Result;
use std::path::Path;

use novelscene::app_config::Config;
use novelscene::app_controller::{Controller, IngestOptions, IngestOutcome};
use novelscene::database::Repository;
use novelscene::pipeline::IngestionPipeline;

use crate::common::mock_providers::RoutingProvider;
use crate::common::{self, SHORT_NOVEL};

fn controller_at(db_path: &Path) -> Result<Controller> {
    let mut config = Config::default();
    config.database_path = Some(db_path.to_path_buf());
    Controller::with_config(config)
}

fn routing_pipeline(controller: &Controller) -> Result<IngestionPipeline> {
    controller.pipeline_for(RoutingProvider::new())
}

fn stored_id(outcome: &IngestOutcome) -> String {
    match outcome {
        IngestOutcome::Stored { book_id, .. } => book_id.clone(),
        other => panic!("expected a stored book, got {:?}", other),
    }
}

/// Test that an ingested file lands in the database with all its children
#[tokio::test]
async fn test_run_singleFile_shouldStoreBookScenesAndExercises() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "le_petit-village.txt", SHORT_NOVEL)?;
    let controller = controller_at(&temp_dir.path().join("books.db"))?;
    let pipeline = routing_pipeline(&controller)?;
    let repository = controller.open_repository(None)?;

    let outcomes = controller
        .run(&input, &pipeline, Some(&repository), &IngestOptions::default())
        .await?;

    assert_eq!(outcomes.len(), 1);
    assert!(matches!(outcomes[0], IngestOutcome::Stored { scene_count: 1, .. }));
    let book_id = stored_id(&outcomes[0]);

    let book = repository.get_book(&book_id).await?.expect("book should be stored");
    assert_eq!(book.title, "le petit village");
    assert_eq!(book.original_language, "fr");
    assert_eq!(book.target_language, "en");

    let scenes = repository.load_scenes(&book_id).await?;
    assert_eq!(scenes.len(), 1);
    assert_eq!(scenes[0].title, "Chapter I");
    assert_eq!(scenes[0].sentences.len(), 6);
    assert_eq!(scenes[0].sentences[5].translated_text, "EN: Les marchands criaient leurs prix.");
    assert_eq!(scenes[0].vocabulary.len(), 2);
    assert_eq!(scenes[0].questions.len(), 4);
    assert!(scenes[0].questions.iter().all(|q| q.correct_option().is_some()));

    let stats = repository.connection().stats()?;
    assert_eq!((stats.book_count, stats.scene_count, stats.sentence_count), (1, 1, 6));
    Ok(())
}

/// Test that the same text is skipped unless forced
#[tokio::test]
async fn test_run_sameTextTwice_shouldSkipUnlessForced() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "roman.txt", SHORT_NOVEL)?;
    let copy = common::create_test_file(temp_dir.path(), "copie.txt", SHORT_NOVEL)?;
    let controller = controller_at(&temp_dir.path().join("books.db"))?;
    let pipeline = routing_pipeline(&controller)?;
    let repository = controller.open_repository(None)?;
    let options = IngestOptions {
        title: Some("Le Roman".to_string()),
        ..IngestOptions::default()
    };

    let first = controller.run(&input, &pipeline, Some(&repository), &options).await?;
    let book_id = stored_id(&first[0]);

    let second = controller.run(&copy, &pipeline, Some(&repository), &options).await?;
    assert_eq!(second, vec![IngestOutcome::Skipped { book_id: book_id.clone() }]);

    let forced = IngestOptions {
        force: true,
        ..options.clone()
    };
    let third = controller.run(&copy, &pipeline, Some(&repository), &forced).await?;
    assert_ne!(stored_id(&third[0]), book_id);

    let books = controller.list_books(&repository).await?;
    assert_eq!(books.len(), 2);
    assert!(books.iter().all(|summary| summary.book.title == "Le Roman" && summary.scene_count == 1));
    Ok(())
}

/// Test that a dry run never writes to the database
#[tokio::test]
async fn test_run_dryRun_shouldNotStoreAnything() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "roman.txt", SHORT_NOVEL)?;
    let controller = controller_at(&temp_dir.path().join("books.db"))?;
    let pipeline = routing_pipeline(&controller)?;
    let repository = Repository::new_in_memory()?;
    let options = IngestOptions {
        dry_run: true,
        ..IngestOptions::default()
    };

    let outcomes = controller.run(&input, &pipeline, Some(&repository), &options).await?;

    assert_eq!(outcomes, vec![IngestOutcome::DryRun { scene_count: 1 }]);
    assert!(repository.list_books().await?.is_empty());
    Ok(())
}

/// Test that a directory run ingests every text file, titled by file name
#[tokio::test]
async fn test_run_directory_shouldIngestEveryTextFile() -> Result<()> {
    common::init_test_logging();
    let temp_dir = common::create_temp_dir()?;
    let books_dir = temp_dir.path().join("books");
    std::fs::create_dir(&books_dir)?;
    common::create_test_file(&books_dir, "premier_tome.txt", SHORT_NOVEL)?;
    common::create_test_file(&books_dir, "second_tome.TXT", &common::paragraphs(12))?;
    common::create_test_file(&books_dir, "notes.md", "# pas un roman")?;
    let controller = controller_at(&temp_dir.path().join("books.db"))?;
    let pipeline = routing_pipeline(&controller)?;
    let repository = controller.open_repository(None)?;
    let options = IngestOptions {
        title: Some("Ignored".to_string()),
        ..IngestOptions::default()
    };

    let outcomes = controller.run(&books_dir, &pipeline, Some(&repository), &options).await?;

    assert_eq!(outcomes.len(), 2);
    let mut titles: Vec<String> = controller
        .list_books(&repository)
        .await?
        .into_iter()
        .map(|summary| summary.book.title)
        .collect();
    titles.sort();
    assert_eq!(titles, vec!["premier tome", "second tome"]);
    Ok(())
}

#[tokio::test]
async fn test_run_missingOrEmptyInput_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let controller = controller_at(&temp_dir.path().join("books.db"))?;
    let pipeline = routing_pipeline(&controller)?;
    let options = IngestOptions::default();

    assert!(controller
        .run(&temp_dir.path().join("absent.txt"), &pipeline, None, &options)
        .await
        .is_err());

    let empty_dir = temp_dir.path().join("empty");
    std::fs::create_dir(&empty_dir)?;
    assert!(controller.run(&empty_dir, &pipeline, None, &options).await.is_err());
    Ok(())
}

/// Test that deleting a book removes its scenes
#[tokio::test]
async fn test_deleteBook_shouldCascadeToScenes() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = common::create_test_file(temp_dir.path(), "roman.txt", SHORT_NOVEL)?;
    let controller = controller_at(&temp_dir.path().join("books.db"))?;
    let pipeline = routing_pipeline(&controller)?;
    let repository = controller.open_repository(None)?;

    let outcomes = controller
        .run(&input, &pipeline, Some(&repository), &IngestOptions::default())
        .await?;
    let book_id = stored_id(&outcomes[0]);

    assert!(repository.delete_book(&book_id).await?);
    assert!(repository.load_scenes(&book_id).await?.is_empty());
    let stats = repository.connection().stats()?;
    assert_eq!((stats.book_count, stats.scene_count, stats.question_count), (0, 0, 0));
    assert!(!repository.delete_book(&book_id).await?);
    Ok(())
}
