/*!
 * Tests for language utility functions
 */

use novelscene::language_utils::{get_language_name, language_codes_match, normalize_code, resolve_language};

/// Test language name lookup for the common novel languages
#[test]
fn test_getLanguageName_shouldReturnEnglishNames() {
    assert_eq!(get_language_name("fr").unwrap(), "French");
    assert_eq!(get_language_name("de").unwrap(), "German");
    assert_eq!(get_language_name("spa").unwrap(), "Spanish");
    assert_eq!(get_language_name("chi").unwrap(), "Chinese");
}

#[test]
fn test_resolveLanguage_invalidCodes_shouldFail() {
    assert!(resolve_language("").is_err());
    assert!(resolve_language("f").is_err());
    assert!(resolve_language("fren").is_err());
    assert!(resolve_language("x1y").is_err());
}

/// Test that stored codes collapse to the two-letter form
#[test]
fn test_normalizeCode_shouldCollapseEquivalentCodes() {
    for code in ["fr", "fra", "fre", " FR "] {
        assert_eq!(normalize_code(code).unwrap(), "fr");
    }
    assert!(normalize_code("zz").is_err());
}

#[test]
fn test_languageCodesMatch_shouldBeSymmetric() {
    assert!(language_codes_match("fre", "fr"));
    assert!(language_codes_match("fr", "fre"));
    assert!(!language_codes_match("de", "nl"));
}
