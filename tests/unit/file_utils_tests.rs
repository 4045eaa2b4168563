/*!
 * Tests for file utilities and plain-text extraction
 */

use anyhow::Result;
use tokio_test;

use novelscene::file_utils::{content_hash, FileManager, PlainTextExtractor, TEXT_EXTENSION};
use novelscene::providers::TextExtractor;

use crate::common;

/// Test that extraction normalizes line endings and tolerates invalid UTF-8
#[test]
fn test_plainTextExtractor_shouldNormalizeRawBytes() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = temp_dir.path().join("roman.txt");
    std::fs::write(&path, b"Il pleut.\r\n\r\nIl vente\xff.\x0c\rFin.")?;

    let text = tokio_test::block_on(PlainTextExtractor.extract_text(&path))?;

    assert_eq!(text, "Il pleut.\n\nIl vente\u{fffd}.\nFin.");
    assert!(tokio_test::block_on(PlainTextExtractor.extract_text(&temp_dir.path().join("absent.txt"))).is_err());
    Ok(())
}

#[test]
fn test_findFiles_shouldReturnSortedTextFiles() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let nested = temp_dir.path().join("tome2");
    FileManager::ensure_dir(&nested)?;
    common::create_test_file(temp_dir.path(), "b.txt", "B.")?;
    common::create_test_file(temp_dir.path(), "a.TXT", "A.")?;
    common::create_test_file(&nested, "c.txt", "C.")?;
    common::create_test_file(temp_dir.path(), "d.epub", "D.")?;

    let files = FileManager::find_files(temp_dir.path(), TEXT_EXTENSION)?;

    let names: Vec<String> = files
        .iter()
        .map(|f| f.strip_prefix(temp_dir.path()).unwrap().to_string_lossy().replace('\\', "/"))
        .collect();
    assert_eq!(names, vec!["a.TXT", "b.txt", "tome2/c.txt"]);
    Ok(())
}

#[test]
fn test_contentHash_shouldIdentifyIdenticalTexts() {
    assert_eq!(content_hash("Il pleut."), content_hash("Il pleut."));
    assert_ne!(content_hash("Il pleut."), content_hash("Il pleut !"));
    assert_eq!(content_hash("").len(), 64);
}

#[test]
fn test_titleFromPath_shouldHumanizeFileStem() {
    assert_eq!(FileManager::title_from_path("/books/les_miserables-tome_1.txt"), "les miserables tome 1");
    assert_eq!(FileManager::title_from_path("/books/___.txt"), "Untitled");
}
