//! Section color palette and its display mapping.

use super::ParseValueError;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use tracing::warn;

/// Hex color shown for tasks without a resolvable section color.
pub const NEUTRAL_HEX: &str = "#6b7280";

/// Semantic color token of a section.
///
/// Stored rows use the `bg-<color>-500` token; bare color names are
/// accepted when parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum SectionColor {
    /// Blue, the default for new sections.
    #[default]
    Blue,
    /// Purple.
    Purple,
    /// Green.
    Green,
    /// Orange.
    Orange,
    /// Pink.
    Pink,
    /// Red.
    Red,
    /// Yellow.
    Yellow,
    /// Cyan.
    Cyan,
}

impl SectionColor {
    /// Every palette entry in picker order.
    pub const ALL: [Self; 8] = [
        Self::Blue,
        Self::Purple,
        Self::Green,
        Self::Orange,
        Self::Pink,
        Self::Red,
        Self::Yellow,
        Self::Cyan,
    ];

    /// Returns the bare color name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Blue => "blue",
            Self::Purple => "purple",
            Self::Green => "green",
            Self::Orange => "orange",
            Self::Pink => "pink",
            Self::Red => "red",
            Self::Yellow => "yellow",
            Self::Cyan => "cyan",
        }
    }

    /// Returns the canonical storage token.
    #[must_use]
    pub const fn as_token(self) -> &'static str {
        match self {
            Self::Blue => "bg-blue-500",
            Self::Purple => "bg-purple-500",
            Self::Green => "bg-green-500",
            Self::Orange => "bg-orange-500",
            Self::Pink => "bg-pink-500",
            Self::Red => "bg-red-500",
            Self::Yellow => "bg-yellow-500",
            Self::Cyan => "bg-cyan-500",
        }
    }

    /// Returns the display color as a hex string.
    #[must_use]
    pub const fn hex(self) -> &'static str {
        match self {
            Self::Blue => "#3b82f6",
            Self::Purple => "#a855f7",
            Self::Green => "#22c55e",
            Self::Orange => "#f97316",
            Self::Pink => "#ec4899",
            Self::Red => "#ef4444",
            Self::Yellow => "#eab308",
            Self::Cyan => "#06b6d4",
        }
    }

    /// Reads a stored color token, keeping rows whose token is outside the
    /// palette.
    ///
    /// Blank and unknown tokens yield `None`, so the section displays
    /// [`NEUTRAL_HEX`]. Unknown tokens are logged.
    #[must_use]
    pub fn from_stored(token: Option<&str>) -> Option<Self> {
        let stored = token.filter(|raw| !raw.trim().is_empty())?;
        Self::try_from(stored)
            .inspect_err(|err| warn!(error = %err, "section color outside the palette"))
            .ok()
    }
}

/// Deserializes a nullable color column with [`SectionColor::from_stored`].
pub(crate) fn deserialize_stored<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<SectionColor>, D::Error> {
    let token = Option::<String>::deserialize(deserializer)?;
    Ok(SectionColor::from_stored(token.as_deref()))
}

impl TryFrom<&str> for SectionColor {
    type Error = ParseValueError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        let name = normalized
            .strip_prefix("bg-")
            .and_then(|rest| rest.strip_suffix("-500"))
            .unwrap_or(&normalized);
        Self::ALL
            .into_iter()
            .find(|color| color.name() == name)
            .ok_or_else(|| ParseValueError::new("section color", value))
    }
}

impl TryFrom<String> for SectionColor {
    type Error = ParseValueError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_from(value.as_str())
    }
}

impl From<SectionColor> for String {
    fn from(color: SectionColor) -> Self {
        color.as_token().to_owned()
    }
}

impl fmt::Display for SectionColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_token())
    }
}
