/*!
 * Tests for bilingual content records and display resolution
 */

use ezhuthu::content::{ContentRecord, ContentStatus, ContentUpdate, Slot, resolve_display};
use ezhuthu::document::codec::serialize;
use ezhuthu::language_utils::Language;

use crate::common::rich_document;

fn bilingual_record() -> ContentRecord {
    ContentRecord {
        id: "post-7".to_string(),
        title: "Monsoon diary".to_string(),
        document: serialize(&rich_document()),
        title_secondary: Some("பருவமழை நாட்குறிப்பு".to_string()),
        document_secondary: Some("பருவமழை தொடங்கியது".to_string()),
        status: ContentStatus::Published,
        updated_at: None,
    }
}

#[test]
fn test_resolveDisplay_bothLanguages_shouldUseMatchingSlots() {
    let record = bilingual_record();

    let english = resolve_display(&record, Language::English);
    assert!(english.is_available());
    assert_eq!(english.title, "Monsoon diary");
    assert_eq!(english.document, Some(rich_document()));

    let tamil = resolve_display(&record, Language::Tamil);
    assert!(tamil.is_available());
    assert_eq!(tamil.title, "பருவமழை நாட்குறிப்பு");
    // Legacy plain text in the Tamil slot still decodes
    assert_eq!(tamil.document.unwrap().blocks[0].text, "பருவமழை தொடங்கியது");
}

#[test]
fn test_resolveDisplay_titleOnlyTranslation_shouldShowContentPlaceholder() {
    let mut record = bilingual_record();
    record.document_secondary = None;

    let tamil = resolve_display(&record, Language::Tamil);
    assert!(tamil.title_available);
    assert!(!tamil.is_available());
    assert_eq!(tamil.content_placeholder, Some("உள்ளடக்கம் கிடைக்கவில்லை"));
    assert!(!record.has_secondary_document());
}

#[test]
fn test_resolveDisplay_blankEnglish_shouldUseEnglishPlaceholders() {
    let mut record = bilingual_record();
    record.title = " ".to_string();
    record.document = String::new();

    let english = resolve_display(&record, Language::English);
    assert_eq!(english.title, "Not available in English");
    assert_eq!(english.content_placeholder, Some("Content not available"));
    assert!(english.document.is_none());
}

#[test]
fn test_contentUpdate_apply_shouldTouchOnlyGivenFields() {
    let mut record = bilingual_record();
    let update = ContentUpdate::new()
        .with_title(Slot::Secondary, "மழை")
        .with_status(ContentStatus::Draft);
    record.apply(&update);

    assert_eq!(record.title, "Monsoon diary");
    assert_eq!(record.title_secondary.as_deref(), Some("மழை"));
    assert_eq!(record.document_secondary.as_deref(), Some("பருவமழை தொடங்கியது"));
    assert_eq!(record.status, ContentStatus::Draft);
    assert!(ContentUpdate::new().is_empty());
}

#[test]
fn test_slot_language_shouldPairEnglishWithPrimary() {
    assert_eq!(Slot::Primary.language(), Language::English);
    assert_eq!(Slot::from(Language::Tamil), Slot::Secondary);
    assert_eq!(Slot::Secondary.other(), Slot::Primary);
}

#[test]
fn test_contentStatus_transitions_shouldFollowWorkflow() {
    use ContentStatus::*;
    assert!(Draft.can_transition_to(PendingApproval));
    assert!(PendingApproval.can_transition_to(Rejected));
    assert!(Rejected.can_transition_to(Draft));
    assert!(!Draft.can_transition_to(Published));
    assert!(!Approved.can_transition_to(Rejected));
    assert_eq!("pending_approval".parse::<ContentStatus>().unwrap(), PendingApproval);
    assert_eq!(PendingApproval.to_string(), "pending_approval");
}
