//! Charts embedded into the rendered report.
//!
//! Every chart is produced in two encodings: a static PNG (drawn as SVG with
//! `plotters`, then rasterized with `resvg`) for quick viewing, and a `plotly`
//! figure description that the page renders interactively in the browser.

pub mod per_base_quality;

use resvg::tiny_skia;
use resvg::usvg;
use serde::Serialize;
use tracing::debug;

use crate::errors::Error;

/// Default width of the static chart image in pixels.
pub const DEFAULT_WIDTH: u32 = 600;

/// Default height of the static chart image in pixels.
pub const DEFAULT_HEIGHT: u32 = 360;

/// Dimensions of the static chart images.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChartSettings {
    /// Width in pixels.
    pub width: u32,

    /// Height in pixels.
    pub height: u32,
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
        }
    }
}

/// A chart rendered in both of its encodings.
#[derive(Clone, Debug, Serialize)]
pub struct RenderedChart {
    /// Title shown above the chart.
    pub title: String,

    /// Base64 encoded PNG image.
    pub image: String,

    /// JSON `plotly` figure (`{"data": [...], "layout": {...}}`).
    pub interactive: String,
}

/// Turns SVG documents into PNG images.
///
/// The system font database is loaded once when the rasterizer is created and
/// reused for every chart. Text in a font that cannot be found is skipped.
pub struct Rasterizer {
    options: usvg::Options<'static>,
}

impl Rasterizer {
    /// Creates a rasterizer backed by the fonts installed on this system.
    pub fn new() -> Self {
        let mut options = usvg::Options::default();
        options.fontdb_mut().load_system_fonts();
        debug!(
            "  [*] Loaded {} font face(s) for chart rasterization.",
            options.fontdb.len()
        );

        Self { options }
    }

    /// Rasterizes `svg` and encodes the result as PNG.
    pub fn to_png(&self, svg: &str) -> Result<Vec<u8>, Error> {
        let tree = usvg::Tree::from_str(svg, &self.options).map_err(Error::chart)?;
        let size = tree.size().to_int_size();

        let mut pixmap = tiny_skia::Pixmap::new(size.width(), size.height()).ok_or_else(|| {
            Error::ChartRender(format!(
                "cannot allocate a {}x{} image",
                size.width(),
                size.height()
            ))
        })?;

        resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());
        pixmap.encode_png().map_err(Error::chart)
    }
}

impl Default for Rasterizer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

    #[test]
    fn test_rasterize_simple_svg() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="40" height="20">
            <rect x="0" y="0" width="40" height="20" fill="white"/>
            <line x1="0" y1="10" x2="40" y2="10" stroke="black"/>
        </svg>"#;

        let png = Rasterizer::new().to_png(svg).unwrap();
        assert_eq!(png[..8], PNG_SIGNATURE);
    }

    #[test]
    fn test_rasterize_invalid_svg() {
        let err = Rasterizer::new().to_png("this is not svg").unwrap_err();
        assert!(matches!(err, Error::ChartRender(_)));
    }
}
