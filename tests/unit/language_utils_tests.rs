/*!
 * Tests for language detection and ISO code utilities
 */

use ezhuthu::language_utils::{Language, contains_tamil, detect_language, normalize_to_part1};

#[test]
fn test_detectLanguage_mixedScript_shouldPreferTamil() {
    assert_eq!(detect_language("Chapter 1: மழை"), Language::Tamil);
    assert_eq!(detect_language("Chapter 1: Rain"), Language::English);
}

#[test]
fn test_containsTamil_blockBoundaries() {
    assert!(contains_tamil("\u{0B80}"));
    assert!(contains_tamil("\u{0BFF}"));
    assert!(!contains_tamil("\u{0B7F}"));
    assert!(!contains_tamil("\u{0C00}"));
}

#[test]
fn test_language_names_shouldResolve() {
    assert_eq!(Language::English.english_name(), "English");
    assert_eq!(Language::Tamil.english_name(), "Tamil");
    assert_eq!(Language::Tamil.code(), "ta");
    assert_eq!(Language::Tamil.other(), Language::English);
    assert!(!Language::Tamil.native_name().is_empty());
}

#[test]
fn test_normalizeToPart1_shouldAcceptPart3() {
    assert_eq!(normalize_to_part1("tam").unwrap(), "ta");
    assert_eq!(normalize_to_part1("EN").unwrap(), "en");
    assert!(normalize_to_part1("xx").is_err());
}

#[test]
fn test_language_fromStr_unsupported_shouldFail() {
    assert!("fr".parse::<Language>().is_err());
    assert_eq!("Tamil".parse::<Language>().unwrap(), Language::Tamil);
}
