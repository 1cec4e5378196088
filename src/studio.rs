use std::io::BufRead;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::assets::decode::ImageFile;
use crate::catalog::source::TemplateSource;
use crate::foundation::core::CaptionSlot;
use crate::foundation::error::{MemeError, MemeResult};
use crate::render::compositor::Compositor;
use crate::session::export::ExportArtifact;
use crate::session::state::{CatalogStatus, Session};

mod command;
mod notify;

pub use command::{HELP, StudioCommand};
pub use notify::{CollectingNotifier, Notice, NoticeLevel, Notifier, StderrNotifier};

type ExportHook = Box<dyn FnMut(&ExportArtifact, &Path)>;

/// Optional decorative callbacks.
#[derive(Default)]
pub struct StudioHooks {
    on_export_success: Option<ExportHook>,
}

impl StudioHooks {
    /// No hooks.
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `hook` after every successful export with the artifact and the path written.
    pub fn on_export_success(mut self, hook: impl FnMut(&ExportArtifact, &Path) + 'static) -> Self {
        self.on_export_success = Some(Box::new(hook));
        self
    }
}

impl std::fmt::Debug for StudioHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StudioHooks")
            .field("on_export_success", &self.on_export_success.is_some())
            .finish()
    }
}

/// Whether the command loop should keep going.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    /// Read the next command.
    Continue,
    /// Stop.
    Quit,
}

/// Binds user commands to [`Session`] operations and reports every outcome to a [`Notifier`].
///
/// No failure is swallowed: each one is logged and also delivered as an error notice.
pub struct Studio<C, N> {
    session: Session,
    compositor: C,
    notifier: N,
    hooks: StudioHooks,
    out_dir: PathBuf,
}

impl<C: Compositor, N: Notifier> Studio<C, N> {
    /// Wrap a session; exports without a path land in the current directory.
    pub fn new(session: Session, compositor: C, notifier: N) -> Self {
        Self {
            session,
            compositor,
            notifier,
            hooks: StudioHooks::default(),
            out_dir: PathBuf::from("."),
        }
    }

    /// Install decorative hooks.
    pub fn with_hooks(mut self, hooks: StudioHooks) -> Self {
        self.hooks = hooks;
        self
    }

    /// Directory for exports without an explicit path.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.out_dir = dir.into();
        self
    }

    /// The wrapped session.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The notifier.
    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Load the catalog from `source`. Returns `true` when templates are available.
    ///
    /// A failure is final for this session; the user is told that only local images remain.
    pub fn start(&mut self, source: &dyn TemplateSource) -> bool {
        match self.session.load_from_source(source) {
            Ok(()) => {
                let url = self
                    .session
                    .active_image()
                    .map(|a| a.url().to_string())
                    .unwrap_or_default();
                self.notifier.notify(Notice::info(format!(
                    "loaded {} templates; showing {url}",
                    self.session.catalog().len()
                )));
                true
            }
            Err(err) => {
                self.report(&err);
                self.notifier.notify(Notice::info(
                    "templates are unavailable for this session; use 'load <path>' for your own image",
                ));
                false
            }
        }
    }

    /// Run one command.
    pub fn dispatch(&mut self, cmd: StudioCommand) -> Flow {
        match cmd {
            StudioCommand::RandomTemplate => match self.session.select_random_template() {
                Ok(()) => self.notify_active("showing"),
                Err(err) => self.report(&err),
            },
            StudioCommand::LoadImage(path) => {
                let outcome = ImageFile::from_path(&path)
                    .map_err(|e| MemeError::unsupported_image(e.to_string()))
                    .and_then(|file| self.session.set_active_image_from_local_file(file));
                match outcome {
                    Ok(()) => self.notify_active("loaded"),
                    Err(err) => self.report(&err),
                }
            }
            StudioCommand::SetCaption { slot, text } => {
                self.session.set_caption_text(slot, text);
            }
            StudioCommand::Drag { slot, delta } => {
                self.session.begin_drag(slot);
                self.session.move_caption(slot, delta);
                self.session.end_drag(slot);
            }
            StudioCommand::Reset => {
                self.session.reset_captions();
                self.notifier.notify(Notice::info("captions cleared"));
            }
            StudioCommand::Export(path) => {
                if let Err(err) = self.export(path) {
                    self.report(&err);
                }
            }
            StudioCommand::Status => {
                let status = self.describe();
                self.notifier.notify(Notice::info(status));
            }
            StudioCommand::Help => self.notifier.notify(Notice::info(HELP)),
            StudioCommand::Quit => return Flow::Quit,
        }
        Flow::Continue
    }

    /// Read commands line by line until `quit` or end of input.
    pub fn run(&mut self, input: impl BufRead) -> MemeResult<()> {
        for line in input.lines() {
            let line = line.context("read command line")?;
            match StudioCommand::parse(&line) {
                Ok(Some(cmd)) => {
                    if self.dispatch(cmd) == Flow::Quit {
                        break;
                    }
                }
                Ok(None) => {}
                Err(err) => self.report(&err),
            }
        }
        Ok(())
    }

    fn export(&mut self, path: Option<PathBuf>) -> MemeResult<()> {
        let artifact = self.session.export(&mut self.compositor)?;
        let target = path.unwrap_or_else(|| self.out_dir.join(&artifact.file_name));
        let written = artifact
            .save_to(&target)
            .map_err(|e| MemeError::composition(format!("could not save meme: {e}")))?;

        self.notifier.notify(Notice::success(format!(
            "saved {}x{} meme to {}",
            artifact.width,
            artifact.height,
            written.display()
        )));
        if let Some(hook) = self.hooks.on_export_success.as_mut() {
            hook(&artifact, &written);
        }
        Ok(())
    }

    fn notify_active(&mut self, verb: &str) {
        if let Some(active) = self.session.active_image() {
            let msg = format!("{verb} {}", active.url());
            self.notifier.notify(Notice::info(msg));
        }
    }

    fn describe(&self) -> String {
        let s = &self.session;
        let catalog = match s.catalog_status() {
            CatalogStatus::Pending => "pending".to_string(),
            CatalogStatus::Ready => format!("{} templates", s.catalog().len()),
            CatalogStatus::Failed(e) => format!("unavailable ({e})"),
        };
        let image = s
            .active_image()
            .map(|a| a.url().to_string())
            .unwrap_or_else(|| "none".to_string());

        let mut out = format!("catalog: {catalog}\nimage: {image}");
        for slot in CaptionSlot::ALL {
            let o = s.caption_positions().get(slot);
            out.push_str(&format!(
                "\n{}: {:?} at ({}, {})",
                slot.as_str(),
                s.caption_text().get(slot),
                o.dx,
                o.dy
            ));
        }
        if !s.caption_text().is_blank() {
            out.push_str("\n'reset' clears the captions");
        }
        out
    }

    fn report(&mut self, err: &MemeError) {
        tracing::warn!(kind = ?err.kind(), error = %err, "studio action failed");
        self.notifier.notify(Notice::error(err));
    }
}
