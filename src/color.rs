use palette::Srgb;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Fixed cyclic colour palette
// ---------------------------------------------------------------------------

/// The seven line colours used by the indicator dashboard charts.
pub const DEFAULT_PALETTE: [&str; 7] = [
    "#8884d8", "#82ca9d", "#ffc658", "#ff7300", "#0088fe", "#00c49f", "#8dd1e1",
];

/// An ordered, non-empty list of validated hex colours.
///
/// Colours are handed out by position and wrap around: with `P` entries the
/// `(P + 1)`-th series reuses the first colour.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Palette(Vec<String>);

impl Palette {
    pub fn new(colors: Vec<String>) -> Result<Self, ConfigError> {
        if colors.is_empty() {
            return Err(ConfigError::EmptyPalette);
        }
        for c in &colors {
            parse_hex(c)?;
        }
        Ok(Palette(colors))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Colour for the series at `index`, cycling past the end.
    pub fn color_at(&self, index: usize) -> &str {
        &self.0[index % self.0.len()]
    }

    pub fn colors(&self) -> &[String] {
        &self.0
    }
}

impl Default for Palette {
    fn default() -> Self {
        Palette(DEFAULT_PALETTE.iter().map(|c| c.to_string()).collect())
    }
}

impl TryFrom<Vec<String>> for Palette {
    type Error = ConfigError;

    fn try_from(colors: Vec<String>) -> Result<Self, Self::Error> {
        Palette::new(colors)
    }
}

impl From<Palette> for Vec<String> {
    fn from(palette: Palette) -> Self {
        palette.0
    }
}

/// Parse `#rrggbb` (or `#rgb`) into an sRGB triple.
pub fn parse_hex(hex: &str) -> Result<Srgb<u8>, ConfigError> {
    hex.trim()
        .parse::<Srgb<u8>>()
        .map_err(|_| ConfigError::InvalidColor(hex.to_string()))
}
