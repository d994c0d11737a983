/*!
 * Editor controller: owns the live document of one language slot and
 * orders formatting, image uploads, translation and saves against it.
 *
 * Saves go through a gate so that a second save waits for the first to
 * finish. Every failure leaves the live document untouched; the caller can
 * show the error and retry without losing work.
 */

use bytes::Bytes;
use log::{debug, info, warn};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::assets::AssetUploader;
use crate::content::record::{ContentUpdate, Slot};
use crate::document::codec::{deserialize, serialize};
use crate::document::commands::Selection;
use crate::document::model::{BlockType, Dimension, Document, EntityType, ImageData, InlineStyle, Mutability};
use crate::errors::{EditorError, StoreError};
use crate::language_utils::detect_language;
use crate::providers::Translator;
use crate::store::ContentStore;
use crate::translation::{ContentTranslator, TranslatedContent};

/// What `save` writes, captured when the save is requested
struct SaveRequest {
    content_id: String,
    slot: Slot,
    title: Option<String>,
    serialized: String,
    revision: u64,
}

/// Editing session for one slot of one content record
pub struct EditorController<S, U>
where
    S: ContentStore + 'static,
    U: AssetUploader + 'static,
{
    store: Arc<S>,
    uploader: Arc<U>,
    content_id: String,
    slot: Slot,
    title: String,
    document: Document,
    selection: Option<Selection>,

    /// Bumped on every change to the live document or title
    revision: u64,
    /// Highest revision known to be stored
    saved_revision: Arc<AtomicU64>,
    save_gate: Arc<Mutex<()>>,
}

impl<S, U> EditorController<S, U>
where
    S: ContentStore + 'static,
    U: AssetUploader + 'static,
{
    /// Load `slot` of record `content_id`. A slot without a stored document
    /// starts as an empty document.
    pub async fn load(
        store: Arc<S>,
        uploader: Arc<U>,
        content_id: &str,
        slot: Slot,
    ) -> Result<Self, EditorError> {
        let record = store.get(content_id).await.map_err(EditorError::Load)?;

        let document = record
            .document_for(slot)
            .filter(|d| !d.trim().is_empty())
            .map(deserialize)
            .unwrap_or_default();
        let title = record.title_for(slot).unwrap_or_default().to_string();

        debug!(
            "Loaded {} slot of content {} ({} blocks)",
            slot,
            content_id,
            document.blocks.len()
        );

        Ok(Self {
            store,
            uploader,
            content_id: content_id.to_string(),
            slot,
            title,
            document,
            selection: None,
            revision: 0,
            saved_revision: Arc::new(AtomicU64::new(0)),
            save_gate: Arc::new(Mutex::new(())),
        })
    }

    pub fn content_id(&self) -> &str {
        &self.content_id
    }

    pub fn slot(&self) -> Slot {
        self.slot
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    /// True when the live document or title differs from the last save
    pub fn is_dirty(&self) -> bool {
        self.saved_revision.load(Ordering::SeqCst) < self.revision
    }

    pub fn select(&mut self, selection: Selection) {
        self.selection = Some(selection);
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        let title = title.into();
        if title != self.title {
            self.title = title;
            self.revision += 1;
        }
    }

    /// Replace the live document with the editor surface's current value
    pub fn replace_document(&mut self, document: Document) {
        self.commit(document);
    }

    pub fn apply_inline_style(&mut self, selection: Selection, style: InlineStyle) {
        let next = self.document.apply_inline_style(&selection, style);
        self.selection = Some(selection);
        self.commit(next);
    }

    pub fn set_block_type(&mut self, selection: Selection, block_type: BlockType) {
        let next = self.document.set_block_type(&selection, block_type);
        self.selection = Some(selection);
        self.commit(next);
    }

    pub fn adjust_list_depth(&mut self, selection: Selection, delta: i32) {
        let next = self.document.adjust_list_depth(&selection, delta);
        self.selection = Some(selection);
        self.commit(next);
    }

    fn commit(&mut self, next: Document) {
        if next != self.document {
            self.document = next;
            self.revision += 1;
        }
    }

    /// Save the live document (and optionally the title) to the slot.
    ///
    /// Waits for any save already in flight. On failure the live document
    /// is kept and the error is returned for the caller to present.
    pub async fn save(&self, title: Option<&str>) -> Result<(), EditorError> {
        let request = self.save_request(title.map(str::to_string));
        persist(
            self.store.clone(),
            self.save_gate.clone(),
            self.saved_revision.clone(),
            request,
        )
        .await
        .map_err(EditorError::Persist)
    }

    /// Save including the controller's current title
    pub async fn save_with_title(&self) -> Result<(), EditorError> {
        self.save(Some(self.title.as_str())).await
    }

    fn save_request(&self, title: Option<String>) -> SaveRequest {
        SaveRequest {
            content_id: self.content_id.clone(),
            slot: self.slot,
            title,
            serialized: serialize(&self.document),
            revision: self.revision,
        }
    }

    /// Upload an image and embed it after the current selection.
    ///
    /// Nothing is added to the document unless the upload succeeds.
    pub async fn insert_image(
        &mut self,
        data: Bytes,
        content_type: &str,
        width: Dimension,
        height: Dimension,
    ) -> Result<String, EditorError> {
        let asset = self.uploader.upload(data, content_type).await?;

        let image = ImageData::new(asset.public_url.clone(), width, height);
        let (with_entity, entity_key) =
            self.document
                .create_entity(EntityType::Image, Mutability::Immutable, image.to_data());

        let selection = self
            .selection
            .clone()
            .filter(|s| with_entity.block(&s.focus_key).is_some() && with_entity.block(&s.anchor_key).is_some())
            .or_else(|| Selection::end_of(&with_entity))
            .unwrap_or_else(|| Selection::collapsed("", 0));
        let next = with_entity.insert_atomic_block(&selection, &entity_key, None);

        info!("Inserted image {} into content {}", asset.public_url, self.content_id);
        self.commit(next);
        Ok(asset.public_url)
    }

    /// Translate the live slot and write the result to the other slot.
    ///
    /// The direction comes from the slots: the live slot's language is the
    /// source and the other slot's language the target, so the stored
    /// variant always matches its slot. The other slot's title and document
    /// are written together in one update, and only when both translations
    /// succeed. The live document is never modified.
    pub async fn translate_to_other_slot<T: Translator>(
        &self,
        translator: &ContentTranslator<T>,
    ) -> Result<TranslatedContent, EditorError> {
        let source = self.slot.language();
        let target = self.slot.other();

        let detected = detect_language(&format!("{}\n{}", self.title, self.document.plain_text()));
        if detected != source {
            warn!(
                "Content {} looks like {} but sits in the {} slot; translating {} -> {}",
                self.content_id,
                detected,
                self.slot,
                source,
                target.language()
            );
        }

        let translated = translator
            .translate_document_between(&self.title, &self.document, source, target.language())
            .await?;

        let update = ContentUpdate::new()
            .with_title(target, translated.title.clone())
            .with_document(target, translated.serialized.clone());
        self.store
            .update(&self.content_id, update)
            .await
            .map_err(EditorError::Persist)?;

        info!(
            "Stored {} translation of content {} in the {} slot",
            translated.target, self.content_id, target
        );
        Ok(translated)
    }

    /// Close the editor. Unsaved changes are saved in the background; the
    /// returned handle can be awaited or dropped.
    pub fn close(self) -> Option<JoinHandle<Result<(), StoreError>>> {
        if !self.is_dirty() {
            return None;
        }

        let request = self.save_request(Some(self.title.clone()));
        let store = self.store.clone();
        let gate = self.save_gate.clone();
        let saved = self.saved_revision.clone();

        debug!("Saving content {} in the background on close", self.content_id);
        Some(tokio::spawn(async move {
            let result = persist(store, gate, saved, request).await;
            if let Err(e) = &result {
                warn!("Background save on close failed: {}", e);
            }
            result
        }))
    }
}

async fn persist<S: ContentStore + ?Sized>(
    store: Arc<S>,
    gate: Arc<Mutex<()>>,
    saved_revision: Arc<AtomicU64>,
    request: SaveRequest,
) -> Result<(), StoreError> {
    let _guard = gate.lock().await;

    let mut update = ContentUpdate::new().with_document(request.slot, request.serialized);
    if let Some(title) = request.title {
        update = update.with_title(request.slot, title);
    }

    store.update(&request.content_id, update).await?;
    saved_revision.fetch_max(request.revision, Ordering::SeqCst);
    info!("Saved {} slot of content {}", request.slot, request.content_id);
    Ok(())
}
