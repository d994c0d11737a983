/*!
 * Editor controller tests against recording stores and scripted uploaders
 */

use bytes::Bytes;
use std::sync::Arc;
use std::sync::atomic::Ordering;

use ezhuthu::content::{ContentUpdate, Slot};
use ezhuthu::document::codec::deserialize;
use ezhuthu::document::model::{Block, BlockType, Dimension, Document, InlineStyle};
use ezhuthu::document::{ATOMIC_PLACEHOLDER, Selection};
use ezhuthu::editor::EditorController;
use ezhuthu::errors::{EditorError, StoreError, TranslationPart, UploadError};
use ezhuthu::language_utils::Language;
use ezhuthu::providers::MockTranslator;
use ezhuthu::store::ContentStore;
use ezhuthu::translation::ContentTranslator;

use crate::common::{
    FailingUploader, RecordingStore, StaticUploader, english_document, init_logging, rich_document, seed_record,
};

async fn open_primary(store: &Arc<RecordingStore>) -> (String, EditorController<RecordingStore, StaticUploader>) {
    let record = seed_record(store.as_ref(), "Monsoon diary", &rich_document()).await;
    let editor = EditorController::load(store.clone(), Arc::new(StaticUploader::default()), &record.id, Slot::Primary)
        .await
        .unwrap();
    (record.id, editor)
}

#[tokio::test]
async fn test_editor_formatThenSave_shouldStoreSerializedDocument() {
    init_logging();
    let store = Arc::new(RecordingStore::new());
    let (id, mut editor) = open_primary(&store).await;
    assert!(!editor.is_dirty());

    editor.apply_inline_style(Selection::new("li1", 0, "li1", 4), InlineStyle::Bold);
    editor.set_block_type(Selection::collapsed("mid", 0), BlockType::AlignJustify);
    assert!(editor.is_dirty());

    editor.save(None).await.unwrap();
    assert!(!editor.is_dirty());
    assert_eq!(store.update_count(), 1);

    let stored = store.get(&id).await.unwrap();
    let document = deserialize(&stored.document);
    assert_eq!(&document, editor.document());
    assert_eq!(document.block("mid").unwrap().block_type, BlockType::AlignJustify);
    assert_eq!(stored.title, "Monsoon diary");
}

#[tokio::test]
async fn test_editor_emptySecondarySlot_shouldLoadEmptyDocument() {
    let store = Arc::new(RecordingStore::new());
    let record = seed_record(store.as_ref(), "Monsoon diary", &rich_document()).await;

    let editor = EditorController::load(store.clone(), Arc::new(StaticUploader::default()), &record.id, Slot::Secondary)
        .await
        .unwrap();
    assert!(editor.document().is_empty());
    assert_eq!(editor.title(), "");
}

#[tokio::test]
async fn test_editor_unknownRecord_shouldFailToLoad() {
    let store = Arc::new(RecordingStore::new());
    let result = EditorController::load(store, Arc::new(StaticUploader::default()), "missing", Slot::Primary).await;
    assert!(matches!(result, Err(EditorError::Load(StoreError::NotFound(_)))));
}

#[tokio::test]
async fn test_editor_overlappingSaves_shouldNeverRunConcurrently() {
    let store = Arc::new(RecordingStore::with_delay(40));
    let (_, mut editor) = open_primary(&store).await;
    editor.set_title("Monsoon diary, revised");

    let (first, second) = tokio::join!(editor.save(None), editor.save_with_title());
    first.unwrap();
    second.unwrap();

    assert_eq!(store.update_count(), 2);
    assert_eq!(store.max_in_flight.load(Ordering::SeqCst), 1);
    assert!(!editor.is_dirty());
}

#[tokio::test]
async fn test_editor_rejectedSave_shouldKeepLiveDocument() {
    init_logging();
    let store = Arc::new(RecordingStore::new());
    let (id, mut editor) = open_primary(&store).await;
    let before = store.get(&id).await.unwrap();

    editor.adjust_list_depth(Selection::collapsed("li2", 0), 1);
    let edited = editor.document().clone();

    store.set_failing(true);
    let result = editor.save(None).await;
    assert!(matches!(result, Err(EditorError::Persist(StoreError::PersistFailed(_)))));
    assert_eq!(editor.document(), &edited);
    assert!(editor.is_dirty());
    assert_eq!(store.get(&id).await.unwrap(), before);

    // Retry after the store recovers
    store.set_failing(false);
    editor.save(None).await.unwrap();
    assert!(!editor.is_dirty());
    assert_eq!(deserialize(&store.get(&id).await.unwrap().document).block("li2").unwrap().depth, 2);
}

#[tokio::test]
async fn test_editor_insertImage_shouldAddAtomicBlockAfterSelection() {
    let store = Arc::new(RecordingStore::new());
    let (_, mut editor) = open_primary(&store).await;
    editor.select(Selection::collapsed("intro", 3));

    let url = editor
        .insert_image(Bytes::from_static(b"\x89PNG"), "image/png", Dimension::pixels(320), Dimension::Auto)
        .await
        .unwrap();
    assert_eq!(url, "https://cdn.example.com/img-0.png");

    let document = editor.document();
    let block = &document.blocks[1];
    assert_eq!(block.block_type, BlockType::Atomic);
    assert_eq!(block.text, ATOMIC_PLACEHOLDER);
    let image = document.entity(&block.entity_ranges[0].key).unwrap().image().unwrap();
    assert_eq!(image.src, url);
    assert_eq!(image.width, Dimension::pixels(320));
    assert!(document.is_well_formed());
    assert!(editor.is_dirty());
}

#[tokio::test]
async fn test_editor_failedUpload_shouldNotCreateEntity() {
    let store = Arc::new(RecordingStore::new());
    let record = seed_record(store.as_ref(), "Monsoon diary", &rich_document()).await;
    let mut editor = EditorController::load(store.clone(), Arc::new(FailingUploader), &record.id, Slot::Primary)
        .await
        .unwrap();
    let before = editor.document().clone();

    let result = editor
        .insert_image(Bytes::from_static(b"GIF89a"), "image/gif", Dimension::Auto, Dimension::Auto)
        .await;
    assert!(matches!(result, Err(EditorError::Upload(UploadError::UploadFailed(_)))));
    assert_eq!(editor.document(), &before);
    assert_eq!(editor.document().entity_map.len(), 1);
    assert!(!editor.is_dirty());
}

#[tokio::test]
async fn test_editor_nonImageUpload_shouldBeRefused() {
    let store = Arc::new(RecordingStore::new());
    let (_, mut editor) = open_primary(&store).await;

    let result = editor
        .insert_image(Bytes::from_static(b"%PDF"), "application/pdf", Dimension::Auto, Dimension::Auto)
        .await;
    assert!(matches!(result, Err(EditorError::Upload(UploadError::UnsupportedContentType(_)))));
    assert_eq!(editor.document(), &rich_document());
}

#[tokio::test]
async fn test_editor_translationFailure_shouldWriteNothing() {
    init_logging();
    let store = Arc::new(RecordingStore::new());
    let (id, editor) = open_primary(&store).await;
    let before = store.get(&id).await.unwrap();

    let translator = ContentTranslator::new(MockTranslator::fail_on_call(2));
    let result = editor.translate_to_other_slot(&translator).await;

    match result {
        Err(EditorError::Translation(e)) => assert_eq!(e.part(), TranslationPart::Body),
        other => panic!("expected translation error, got {:?}", other.map(|t| t.title)),
    }
    assert_eq!(store.update_count(), 0);
    assert_eq!(store.get(&id).await.unwrap(), before);
    assert_eq!(editor.document(), &rich_document());
}

#[tokio::test]
async fn test_editor_translationSuccess_shouldFillOtherSlotInOneUpdate() {
    let store = Arc::new(RecordingStore::new());
    let record = seed_record(store.as_ref(), "Monsoon diary", &english_document()).await;
    let editor = EditorController::load(store.clone(), Arc::new(StaticUploader::default()), &record.id, Slot::Primary)
        .await
        .unwrap();

    let translator = ContentTranslator::new(MockTranslator::working());
    let translated = editor.translate_to_other_slot(&translator).await.unwrap();

    assert_eq!(store.update_count(), 1);
    let update = store.updates.lock()[0].clone();
    assert!(update.title.is_none());
    assert!(update.document.is_none());

    let stored = store.get(&record.id).await.unwrap();
    assert_eq!(stored.title_secondary.as_deref(), Some("[ta] Monsoon diary"));
    assert_eq!(stored.document_secondary.as_deref(), Some(translated.serialized.as_str()));
    assert_eq!(stored.document, record.document);
    assert!(stored.has_secondary_document());
}

#[tokio::test]
async fn test_editor_tamilWordInPrimarySlot_shouldStillStoreTamilTranslation() {
    let store = Arc::new(RecordingStore::new());
    let mut document = Document::new();
    document
        .blocks
        .push(Block::new("greet", "At the temple we greet you with வணக்கம்", BlockType::Unstyled));
    let record = seed_record(store.as_ref(), "Chennai notes", &document).await;
    let editor = EditorController::load(store.clone(), Arc::new(StaticUploader::default()), &record.id, Slot::Primary)
        .await
        .unwrap();

    let mock = MockTranslator::working();
    let translated = editor
        .translate_to_other_slot(&ContentTranslator::new(mock.clone()))
        .await
        .unwrap();

    assert_eq!(translated.source, Language::English);
    assert_eq!(translated.target, Language::Tamil);
    assert!(mock.requests().iter().all(|r| r.source == Language::English && r.target == Language::Tamil));

    let stored = store.get(&record.id).await.unwrap();
    assert_eq!(stored.title_secondary.as_deref(), Some("[ta] Chennai notes"));
    assert_eq!(stored.title, "Chennai notes");
}

#[tokio::test]
async fn test_editor_secondarySlot_shouldTranslateIntoPrimary() {
    let store = Arc::new(RecordingStore::new());
    let record = seed_record(store.as_ref(), "Monsoon diary", &english_document()).await;
    store
        .update(
            &record.id,
            ContentUpdate::new()
                .with_title(Slot::Secondary, "பருவமழை")
                .with_document(Slot::Secondary, "மழை பெய்தது"),
        )
        .await
        .unwrap();
    let editor = EditorController::load(store.clone(), Arc::new(StaticUploader::default()), &record.id, Slot::Secondary)
        .await
        .unwrap();

    let translated = editor
        .translate_to_other_slot(&ContentTranslator::new(MockTranslator::working()))
        .await
        .unwrap();

    assert_eq!(translated.target, Language::English);
    let stored = store.get(&record.id).await.unwrap();
    assert_eq!(stored.title, "[en] பருவமழை");
    assert_eq!(deserialize(stored.document.as_str()).blocks[0].text, "[en] மழை பெய்தது");
}

#[tokio::test]
async fn test_editor_closeWithChanges_shouldSaveInBackground() {
    let store = Arc::new(RecordingStore::with_delay(10));
    let (id, mut editor) = open_primary(&store).await;
    editor.set_title("Closing title");

    let handle = editor.close().expect("dirty editor saves on close");
    handle.await.unwrap().unwrap();

    let stored = store.get(&id).await.unwrap();
    assert_eq!(stored.title, "Closing title");
}

#[tokio::test]
async fn test_editor_closeWithoutChanges_shouldNotSave() {
    let store = Arc::new(RecordingStore::new());
    let (_, editor) = open_primary(&store).await;
    assert!(editor.close().is_none());
    assert_eq!(store.update_count(), 0);
}
