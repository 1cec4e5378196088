use std::ops::{Add, AddAssign};
use std::str::FromStr;

use crate::foundation::error::MemeError;

/// Which of the two overlay captions an operation targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptionSlot {
    /// Caption anchored to the top edge.
    Top,
    /// Caption anchored to the bottom edge.
    Bottom,
}

impl CaptionSlot {
    /// Both slots, top first.
    pub const ALL: [CaptionSlot; 2] = [CaptionSlot::Top, CaptionSlot::Bottom];

    /// Lowercase name used in commands and logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Top => "top",
            Self::Bottom => "bottom",
        }
    }
}

impl FromStr for CaptionSlot {
    type Err = MemeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "top" | "upper" => Ok(Self::Top),
            "bottom" | "lower" => Ok(Self::Bottom),
            other => Err(MemeError::validation(format!(
                "unknown caption '{other}' (expected 'top' or 'bottom')"
            ))),
        }
    }
}

/// Pixel offset relative to a caption's anchor inside the image container.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Offset {
    /// Horizontal offset, positive to the right.
    pub dx: f64,
    /// Vertical offset, positive downwards.
    pub dy: f64,
}

impl Offset {
    /// The anchor position itself.
    pub const ZERO: Offset = Offset { dx: 0.0, dy: 0.0 };

    /// Create an offset.
    pub const fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }
}

impl Add for Offset {
    type Output = Offset;

    fn add(self, rhs: Offset) -> Offset {
        Offset::new(self.dx + rhs.dx, self.dy + rhs.dy)
    }
}

impl AddAssign for Offset {
    fn add_assign(&mut self, rhs: Offset) {
        self.dx += rhs.dx;
        self.dy += rhs.dy;
    }
}

/// Parses `"dx,dy"`, e.g. `"12,-4.5"`.
impl FromStr for Offset {
    type Err = MemeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (dx, dy) = s
            .split_once(',')
            .ok_or_else(|| MemeError::validation(format!("offset '{s}' must be 'dx,dy'")))?;
        let parse = |v: &str| -> Result<f64, MemeError> {
            let v = v.trim();
            let n = v
                .parse::<f64>()
                .map_err(|_| MemeError::validation(format!("offset component '{v}' is not a number")))?;
            if !n.is_finite() {
                return Err(MemeError::validation("offset components must be finite"));
            }
            Ok(n)
        };
        Ok(Offset::new(parse(dx)?, parse(dy)?))
    }
}

/// Text of both captions. An empty string means the caption is not rendered.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CaptionText {
    /// Top caption text.
    pub top: String,
    /// Bottom caption text.
    pub bottom: String,
}

impl CaptionText {
    /// Text for `slot`.
    pub fn get(&self, slot: CaptionSlot) -> &str {
        match slot {
            CaptionSlot::Top => &self.top,
            CaptionSlot::Bottom => &self.bottom,
        }
    }

    /// Replace the text for `slot` verbatim.
    pub fn set(&mut self, slot: CaptionSlot, text: impl Into<String>) {
        match slot {
            CaptionSlot::Top => self.top = text.into(),
            CaptionSlot::Bottom => self.bottom = text.into(),
        }
    }

    /// `true` when neither caption would be rendered.
    pub fn is_blank(&self) -> bool {
        self.top.is_empty() && self.bottom.is_empty()
    }
}

/// Accumulated drag offsets of both captions.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CaptionPositions {
    /// Offset of the top caption.
    pub top: Offset,
    /// Offset of the bottom caption.
    pub bottom: Offset,
}

impl CaptionPositions {
    /// Offset for `slot`.
    pub fn get(&self, slot: CaptionSlot) -> Offset {
        match slot {
            CaptionSlot::Top => self.top,
            CaptionSlot::Bottom => self.bottom,
        }
    }

    /// Mutable offset for `slot`.
    pub fn get_mut(&mut self, slot: CaptionSlot) -> &mut Offset {
        match slot {
            CaptionSlot::Top => &mut self.top,
            CaptionSlot::Bottom => &mut self.bottom,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
