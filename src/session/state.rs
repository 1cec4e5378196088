use crate::assets::decode::{ImageFile, decode_local_image};
use crate::assets::local::{LocalImageRef, LocalImageStore};
use crate::catalog::model::{Catalog, Template};
use crate::catalog::source::TemplateSource;
use crate::foundation::core::{CaptionPositions, CaptionSlot, CaptionText, Offset};
use crate::foundation::error::{MemeError, MemeResult};
use crate::foundation::random::{IndexSource, ThreadRngIndexSource};
use crate::render::compositor::Compositor;
use crate::session::export::{
    BaseLayer, ExportArtifact, ExportSlot, ExportTicket, PositionedCaption, RenderTree,
};

/// The image currently shown and eligible for export.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ActiveImage {
    /// A catalog template.
    Template {
        /// Position of the template in the catalog.
        index: usize,
        /// Its display URL.
        url: String,
    },
    /// A user-picked image owned by the session.
    Local(LocalImageRef),
}

impl ActiveImage {
    /// Display URL or local reference.
    pub fn url(&self) -> &str {
        match self {
            Self::Template { url, .. } => url,
            Self::Local(r) => r.url(),
        }
    }

    /// The local reference, if this image was picked by the user.
    pub fn local_ref(&self) -> Option<&LocalImageRef> {
        match self {
            Self::Local(r) => Some(r),
            Self::Template { .. } => None,
        }
    }
}

/// Where the catalog is in its one-shot lifecycle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CatalogStatus {
    /// Not loaded yet.
    Pending,
    /// Loaded; never changes again.
    Ready,
    /// Loading failed; the session stays without a catalog.
    Failed(String),
}

/// State of one meme-editing session.
///
/// Every method is a state transition. A method that returns an error leaves the session exactly
/// as it was. Once an active image has been chosen the session never goes back to having none.
pub struct Session {
    catalog: Catalog,
    catalog_status: CatalogStatus,
    active_image: Option<ActiveImage>,
    captions: CaptionText,
    positions: CaptionPositions,
    local_images: LocalImageStore,
    index_source: Box<dyn IndexSource>,
    export_slot: ExportSlot,
    next_export_id: u64,
    active_drags: u32,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("catalog_len", &self.catalog.len())
            .field("catalog_status", &self.catalog_status)
            .field("active_image", &self.active_image)
            .field("captions", &self.captions)
            .field("positions", &self.positions)
            .field("local_images", &self.local_images.live_count())
            .field("export_in_flight", &self.export_slot.get())
            .finish_non_exhaustive()
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Fresh session drawing template indices from the thread RNG.
    pub fn new() -> Self {
        Self::with_index_source(ThreadRngIndexSource)
    }

    /// Fresh session drawing template indices from `source`.
    pub fn with_index_source(source: impl IndexSource + 'static) -> Self {
        Self {
            catalog: Catalog::default(),
            catalog_status: CatalogStatus::Pending,
            active_image: None,
            captions: CaptionText::default(),
            positions: CaptionPositions::default(),
            local_images: LocalImageStore::new(),
            index_source: Box::new(source),
            export_slot: ExportSlot::default(),
            next_export_id: 0,
            active_drags: 0,
        }
    }

    /// Swap the randomness used for subsequent draws.
    pub fn replace_index_source(&mut self, source: impl IndexSource + 'static) {
        self.index_source = Box::new(source);
    }

    /// The loaded catalog (empty before loading).
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Catalog lifecycle state.
    pub fn catalog_status(&self) -> &CatalogStatus {
        &self.catalog_status
    }

    /// The active image, `None` until the catalog loads or an image is picked.
    pub fn active_image(&self) -> Option<&ActiveImage> {
        self.active_image.as_ref()
    }

    /// Both caption texts.
    pub fn caption_text(&self) -> &CaptionText {
        &self.captions
    }

    /// Both caption offsets.
    pub fn caption_positions(&self) -> &CaptionPositions {
        &self.positions
    }

    /// Store holding user-picked images.
    pub fn local_images(&self) -> &LocalImageStore {
        &self.local_images
    }

    /// `true` while an export ticket is outstanding.
    pub fn is_exporting(&self) -> bool {
        self.export_slot.get().is_some()
    }

    /// Number of drag gestures currently in progress.
    pub fn active_drags(&self) -> u32 {
        self.active_drags
    }

    /// Install the catalog and show a uniformly drawn template.
    ///
    /// The catalog is loaded once per session: a second call is rejected, and so is any call
    /// after a failed load.
    #[tracing::instrument(skip(self, templates), fields(count = templates.len()))]
    pub fn load_catalog(&mut self, templates: Vec<Template>) -> MemeResult<()> {
        self.ensure_catalog_pending()?;
        let catalog = Catalog::new(templates)?;
        let index = self.draw_index(catalog.len())?;
        let url = catalog
            .get(index)
            .map(|t| t.display_url().to_string())
            .ok_or(MemeError::EmptyCatalog)?;

        self.catalog = catalog;
        self.catalog_status = CatalogStatus::Ready;
        self.replace_active(ActiveImage::Template { index, url });
        Ok(())
    }

    /// Fetch from `source` and load the result.
    ///
    /// On failure the status becomes [`CatalogStatus::Failed`] and the error is returned so the
    /// caller can show it. There is no retry: once loaded or failed, the source is not queried
    /// again.
    pub fn load_from_source(&mut self, source: &dyn TemplateSource) -> MemeResult<()> {
        self.ensure_catalog_pending()?;
        let outcome = source
            .fetch_templates()
            .and_then(|templates| self.load_catalog(templates));
        if let Err(err) = &outcome {
            tracing::warn!(source = %source.describe(), error = %err, "catalog load failed");
            self.catalog_status = CatalogStatus::Failed(err.to_string());
        }
        outcome
    }

    /// Show a freshly drawn template. Captions and their offsets are kept.
    pub fn select_random_template(&mut self) -> MemeResult<()> {
        if self.catalog.is_empty() {
            return Err(MemeError::EmptyCatalog);
        }
        let index = self.draw_index(self.catalog.len())?;
        let url = self
            .catalog
            .get(index)
            .map(|t| t.display_url().to_string())
            .ok_or(MemeError::EmptyCatalog)?;
        tracing::debug!(index, %url, "selected template");
        self.replace_active(ActiveImage::Template { index, url });
        Ok(())
    }

    /// Show a user-picked image.
    ///
    /// The file is decoded before anything changes, so a rejected file keeps the previous image.
    /// A previously picked image is released before the new one is registered. Caption text and
    /// offsets are kept, as with [`Session::select_random_template`].
    pub fn set_active_image_from_local_file(&mut self, file: ImageFile) -> MemeResult<()> {
        let image = decode_local_image(&file)?;

        if let Some(old) = self.active_image.as_ref().and_then(ActiveImage::local_ref) {
            self.local_images.release(old);
        }
        let reference = self.local_images.register(&file.name, image);
        tracing::debug!(%reference, "picked local image");

        self.active_image = Some(ActiveImage::Local(reference));
        Ok(())
    }

    /// Replace one caption's text verbatim.
    pub fn set_caption_text(&mut self, slot: CaptionSlot, text: impl Into<String>) {
        self.captions.set(slot, text);
    }

    /// Clear both captions and move them back to their anchors.
    pub fn reset_captions(&mut self) {
        self.captions = CaptionText::default();
        self.positions = CaptionPositions::default();
    }

    /// Add a drag delta to a caption's offset. Bounds are the drag surface's concern.
    pub fn move_caption(&mut self, slot: CaptionSlot, delta: Offset) {
        *self.positions.get_mut(slot) += delta;
    }

    /// A drag gesture started on `slot`.
    pub fn begin_drag(&mut self, slot: CaptionSlot) {
        self.active_drags = self.active_drags.saturating_add(1);
        tracing::trace!(slot = slot.as_str(), active = self.active_drags, "drag start");
    }

    /// A drag gesture on `slot` ended.
    pub fn end_drag(&mut self, slot: CaptionSlot) {
        self.active_drags = self.active_drags.saturating_sub(1);
        tracing::trace!(slot = slot.as_str(), active = self.active_drags, "drag stop");
    }

    /// Snapshot the visible state and claim the single export slot.
    ///
    /// Fails with [`MemeError::ExportInProgress`] while another ticket is alive, and with
    /// [`MemeError::Composition`] when there is nothing to export yet. The slot is freed by
    /// [`Session::finish_export`] or by dropping the ticket.
    pub fn begin_export(&mut self) -> MemeResult<ExportTicket> {
        if self.export_slot.get().is_some() {
            return Err(MemeError::ExportInProgress);
        }
        let tree = self.render_tree()?;
        self.next_export_id += 1;
        Ok(ExportTicket::claim(&self.export_slot, self.next_export_id, tree))
    }

    /// Release the export slot held by `ticket` and pass `outcome` through.
    ///
    /// Failures are normalized to [`MemeError::Composition`]; the session is otherwise untouched
    /// so the user can retry.
    pub fn finish_export(
        &mut self,
        ticket: ExportTicket,
        outcome: MemeResult<ExportArtifact>,
    ) -> MemeResult<ExportArtifact> {
        if !ticket.holds(&self.export_slot) {
            tracing::warn!(ticket = ticket.id, "finished an export ticket that was not in flight");
        }
        drop(ticket);
        outcome.map_err(|err| match err {
            MemeError::Composition(_) => err,
            other => MemeError::composition(other.to_string()),
        })
    }

    /// Begin, compose and finish an export in one call.
    #[tracing::instrument(skip(self, compositor))]
    pub fn export(&mut self, compositor: &mut dyn Compositor) -> MemeResult<ExportArtifact> {
        let ticket = self.begin_export()?;
        let outcome = compositor.compose(ticket.tree());
        self.finish_export(ticket, outcome)
    }

    /// The current visual tree: base image plus non-empty positioned captions.
    pub fn render_tree(&self) -> MemeResult<RenderTree> {
        let active = self
            .active_image
            .as_ref()
            .ok_or_else(|| MemeError::composition("no image to export yet"))?;

        let base = match active {
            ActiveImage::Template { url, .. } => BaseLayer::Remote { url: url.clone() },
            ActiveImage::Local(reference) => {
                let image = self.local_images.resolve(reference).ok_or_else(|| {
                    MemeError::composition(format!("local image '{reference}' was released"))
                })?;
                BaseLayer::Local {
                    reference: reference.clone(),
                    image: image.clone(),
                }
            }
        };

        let captions = CaptionSlot::ALL
            .into_iter()
            .filter(|slot| !self.captions.get(*slot).is_empty())
            .map(|slot| PositionedCaption {
                slot,
                text: self.captions.get(slot).to_string(),
                offset: self.positions.get(slot),
            })
            .collect();

        Ok(RenderTree { base, captions })
    }

    fn ensure_catalog_pending(&self) -> MemeResult<()> {
        match &self.catalog_status {
            CatalogStatus::Pending => Ok(()),
            CatalogStatus::Ready => Err(MemeError::validation("catalog is already loaded")),
            CatalogStatus::Failed(_) => Err(MemeError::validation(
                "catalog failed to load earlier; this session has no templates",
            )),
        }
    }

    fn draw_index(&mut self, bound: usize) -> MemeResult<usize> {
        let index = self.index_source.next_index(bound);
        if index >= bound {
            return Err(MemeError::validation(format!(
                "index source returned {index} for a catalog of {bound}"
            )));
        }
        Ok(index)
    }

    fn replace_active(&mut self, next: ActiveImage) {
        if let Some(old) = self.active_image.take() {
            self.release_if_local(&old);
        }
        self.active_image = Some(next);
    }

    fn release_if_local(&mut self, image: &ActiveImage) {
        if let Some(r) = image.local_ref() {
            self.local_images.release(r);
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/state.rs"]
mod tests;
