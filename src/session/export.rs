use std::cell::Cell;
use std::path::{Path, PathBuf};
use std::rc::{Rc, Weak};

use anyhow::Context;

use crate::assets::decode::PreparedImage;
use crate::assets::local::LocalImageRef;
use crate::foundation::core::{CaptionSlot, Offset};
use crate::foundation::error::MemeResult;

/// File name offered for downloads when the caller does not pick one.
pub const DEFAULT_EXPORT_FILE_NAME: &str = "meme.jpeg";

/// Base image of a [`RenderTree`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BaseLayer {
    /// A catalog template, read through an [`crate::ImageFetcher`] at export time.
    Remote {
        /// Display URL of the template.
        url: String,
    },
    /// A user-picked image, already decoded.
    Local {
        /// Reference the session held when the snapshot was taken.
        reference: LocalImageRef,
        /// The decoded pixels.
        image: PreparedImage,
    },
}

impl BaseLayer {
    /// Display URL or local reference.
    pub fn url(&self) -> &str {
        match self {
            Self::Remote { url } => url,
            Self::Local { reference, .. } => reference.url(),
        }
    }
}

/// A caption that will be drawn: non-empty text and its accumulated offset.
#[derive(Clone, Debug, PartialEq)]
pub struct PositionedCaption {
    /// Which anchor the caption hangs from.
    pub slot: CaptionSlot,
    /// Text, verbatim.
    pub text: String,
    /// Offset from the anchor.
    pub offset: Offset,
}

/// Snapshot of everything visible: base image plus positioned captions.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderTree {
    /// Base image.
    pub base: BaseLayer,
    /// Captions in slot order; empty captions are omitted.
    pub captions: Vec<PositionedCaption>,
}

/// The session's single export slot: the id of the ticket holding it, if any.
pub(crate) type ExportSlot = Rc<Cell<Option<u64>>>;

/// Proof that an export was started; hand it back to [`crate::Session::finish_export`].
///
/// While a ticket is alive the session rejects further exports. Dropping a ticket, finished or
/// not, frees the slot.
#[derive(Debug)]
#[must_use = "the export slot stays claimed until the ticket is finished or dropped"]
pub struct ExportTicket {
    pub(crate) id: u64,
    pub(crate) tree: RenderTree,
    slot: Weak<Cell<Option<u64>>>,
}

impl ExportTicket {
    pub(crate) fn claim(slot: &ExportSlot, id: u64, tree: RenderTree) -> Self {
        slot.set(Some(id));
        Self {
            id,
            tree,
            slot: Rc::downgrade(slot),
        }
    }

    /// Whether this ticket currently holds `slot`.
    pub(crate) fn holds(&self, slot: &ExportSlot) -> bool {
        std::ptr::eq(self.slot.as_ptr(), Rc::as_ptr(slot)) && slot.get() == Some(self.id)
    }

    /// Ticket id, unique per session.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// The snapshot to hand to a [`crate::Compositor`].
    pub fn tree(&self) -> &RenderTree {
        &self.tree
    }
}

impl Drop for ExportTicket {
    fn drop(&mut self) {
        if let Some(slot) = self.slot.upgrade()
            && slot.get() == Some(self.id)
        {
            slot.set(None);
        }
    }
}

/// Encoded result of an export.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportArtifact {
    /// Encoded image bytes.
    pub bytes: Vec<u8>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// MIME type of `bytes`.
    pub mime: &'static str,
    /// Suggested download file name.
    pub file_name: String,
}

impl ExportArtifact {
    /// Write the artifact to `path`, creating parent directories.
    ///
    /// When `path` is an existing directory the artifact's `file_name` is appended. Returns the
    /// path actually written.
    pub fn save_to(&self, path: impl AsRef<Path>) -> MemeResult<PathBuf> {
        let path = path.as_ref();
        let target = if path.is_dir() {
            path.join(&self.file_name)
        } else {
            path.to_path_buf()
        };
        if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create output dir '{}'", parent.display()))?;
        }
        std::fs::write(&target, &self.bytes)
            .with_context(|| format!("write '{}'", target.display()))?;
        Ok(target)
    }
}
