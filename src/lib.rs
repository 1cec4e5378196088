//! Memeforge composes memes: a base image plus two draggable captions, exported as JPEG.
//!
//! The crate is organized around an explicit [`Session`] value whose methods are the only way
//! state changes. Everything that touches the outside world sits behind a trait so the session
//! stays deterministic and testable:
//!
//! - [`TemplateSource`] supplies the template catalog (HTTP or a JSON file on disk)
//! - [`IndexSource`] supplies random indices into the catalog
//! - [`ImageFetcher`] reads template pixels for export
//! - [`Compositor`] rasterizes a [`RenderTree`] into an [`ExportArtifact`]
//! - [`Notifier`] shows non-blocking messages to the user
//!
//! # Export flow
//!
//! 1. [`Session::begin_export`] snapshots the visible state into a [`RenderTree`] and claims the
//!    single export slot.
//! 2. A [`Compositor`] turns the tree into JPEG bytes.
//! 3. [`Session::finish_export`] releases the slot and hands the outcome back.
//!
//! [`Session::export`] runs all three steps in one call.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod assets;
mod catalog;
mod encode;
mod foundation;
mod render;
mod session;

/// Runtime configuration shared by the library and the `memeforge` binary.
pub mod config;
/// Adapter layer binding user-facing controls to [`Session`] operations.
pub mod studio;

pub use assets::decode::{ImageFile, PreparedImage, decode_image, decode_local_image};
pub use assets::fetch::{DefaultImageFetcher, ImageFetcher};
pub use assets::local::{LocalImageRef, LocalImageStore};
pub use catalog::model::{Catalog, Template};
pub use catalog::source::{
    DEFAULT_TEMPLATE_ENDPOINT, FileTemplateSource, HttpTemplateSource, TemplateSource,
    parse_catalog_json,
};
pub use config::StudioConfig;
pub use encode::jpeg::{DEFAULT_JPEG_QUALITY, encode_jpeg};
pub use foundation::core::{CaptionPositions, CaptionSlot, CaptionText, Offset};
pub use foundation::error::{ErrorKind, MemeError, MemeResult};
pub use foundation::random::{
    IndexSource, ScriptedIndexSource, SeededIndexSource, ThreadRngIndexSource,
};
pub use render::caption::{CaptionLayout, CaptionRenderer, CaptionStyle};
pub use render::compositor::{Compositor, CompositorOpts, RasterCompositor};
pub use render::frame::FrameRGBA;
pub use session::export::{
    BaseLayer, DEFAULT_EXPORT_FILE_NAME, ExportArtifact, ExportTicket, PositionedCaption, RenderTree,
};
pub use session::state::{ActiveImage, CatalogStatus, Session};
pub use studio::{
    CollectingNotifier, Flow, Notice, NoticeLevel, Notifier, StderrNotifier, Studio,
    StudioCommand, StudioHooks,
};
