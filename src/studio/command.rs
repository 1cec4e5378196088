use std::path::PathBuf;

use crate::foundation::core::{CaptionSlot, Offset};
use crate::foundation::error::{MemeError, MemeResult};

/// One user action, as typed into the studio prompt.
#[derive(Clone, Debug, PartialEq)]
pub enum StudioCommand {
    /// `random`: show another template.
    RandomTemplate,
    /// `load <path>`: use a local JPEG or PNG.
    LoadImage(PathBuf),
    /// `top <text>` / `bottom <text>`: replace a caption verbatim.
    SetCaption {
        /// Target caption.
        slot: CaptionSlot,
        /// New text; everything after the first space, unmodified.
        text: String,
    },
    /// `drag <top|bottom> <dx> <dy>`: move a caption.
    Drag {
        /// Target caption.
        slot: CaptionSlot,
        /// Movement in pixels.
        delta: Offset,
    },
    /// `reset`: clear both captions.
    Reset,
    /// `export [path]`: write the meme.
    Export(Option<PathBuf>),
    /// `status`: describe the session.
    Status,
    /// `help`: list commands.
    Help,
    /// `quit`: end the session.
    Quit,
}

/// Command reference printed by `help`.
pub const HELP: &str = "\
commands:
  random                      show another random template
  load <path>                 use a local .jpg/.jpeg/.png as the base image
  top <text>                  set the top caption (empty clears it)
  bottom <text>               set the bottom caption (empty clears it)
  drag <top|bottom> <dx> <dy> move a caption by a pixel delta
  reset                       clear both captions and their positions
  export [path]               write the meme as JPEG
  status                      show the current state
  help                        show this list
  quit                        leave";

impl StudioCommand {
    /// Parse one input line. Blank lines and `#` comments yield `None`.
    ///
    /// Caption text keeps its whitespace: only the line terminator and the single space after
    /// the keyword are removed.
    pub fn parse(line: &str) -> MemeResult<Option<Self>> {
        let line = line.trim_end_matches(['\n', '\r']);
        let body = line.trim_start();
        if body.trim().is_empty() || body.starts_with('#') {
            return Ok(None);
        }

        let (keyword, rest) = match body.split_once(' ') {
            Some((k, r)) => (k, r),
            None => (body, ""),
        };

        let cmd = match keyword.to_ascii_lowercase().as_str() {
            "random" | "change" => Self::RandomTemplate,
            "load" => {
                let path = rest.trim();
                if path.is_empty() {
                    return Err(MemeError::validation("load needs a file path"));
                }
                Self::LoadImage(PathBuf::from(path))
            }
            "top" | "bottom" => Self::SetCaption {
                slot: keyword.parse()?,
                text: rest.to_string(),
            },
            "drag" => {
                let parts: Vec<&str> = rest.split_whitespace().collect();
                let [slot, dx, dy] = parts.as_slice() else {
                    return Err(MemeError::validation("usage: drag <top|bottom> <dx> <dy>"));
                };
                Self::Drag {
                    slot: slot.parse()?,
                    delta: format!("{dx},{dy}").parse()?,
                }
            }
            "reset" => Self::Reset,
            "export" | "generate" => {
                let path = rest.trim();
                Self::Export((!path.is_empty()).then(|| PathBuf::from(path)))
            }
            "status" => Self::Status,
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            other => {
                return Err(MemeError::validation(format!(
                    "unknown command '{other}' (try 'help')"
                )));
            }
        };
        Ok(Some(cmd))
    }
}
