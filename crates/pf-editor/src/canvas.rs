//! Raster canvas backed by a `tiny-skia` pixmap.
//!
//! The canvas only knows how to clear itself, stroke a brush segment, and
//! copy its pixels in and out as [`Snapshot`]s. History bookkeeping lives in
//! [`crate::history`].

use crate::input::Point;
use pf_core::Color;
use std::fmt;
use tiny_skia::{LineCap, LineJoin, Paint, PathBuilder, Pixmap, Stroke, Transform};

/// Active brush: color plus stroke width in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BrushStyle {
    pub color: Color,
    pub width: f32,
}

impl Default for BrushStyle {
    fn default() -> Self {
        Self {
            color: Color::BLACK,
            width: 2.0,
        }
    }
}

/// Immutable full-frame capture of the canvas.
#[derive(Clone)]
pub struct Snapshot {
    pixmap: Pixmap,
}

impl Snapshot {
    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Premultiplied RGBA bytes, row-major.
    pub fn data(&self) -> &[u8] {
        self.pixmap.data()
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        read_pixel(&self.pixmap, x, y)
    }
}

impl PartialEq for Snapshot {
    fn eq(&self, other: &Self) -> bool {
        self.width() == other.width() && self.height() == other.height() && self.data() == other.data()
    }
}

impl fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Snapshot")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish_non_exhaustive()
    }
}

/// The pixel surface a user draws on.
pub struct RasterCanvas {
    pixmap: Pixmap,
    background: Color,
}

impl RasterCanvas {
    /// Create a canvas filled with `background`.
    pub fn new(width: u32, height: u32, background: Color) -> Result<Self, String> {
        let mut pixmap = Pixmap::new(width, height)
            .ok_or_else(|| format!("Invalid canvas size {width}x{height}"))?;
        pixmap.fill(to_skia(background));
        Ok(Self { pixmap, background })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn background(&self) -> Color {
        self.background
    }

    /// Repaint every pixel with the background color.
    pub fn clear(&mut self) {
        self.pixmap.fill(to_skia(self.background));
    }

    /// Stroke one straight segment with round caps and joins.
    /// Returns `false` if the segment produced no path.
    pub fn stroke_segment(&mut self, from: Point, to: Point, style: &BrushStyle) -> bool {
        let mut pb = PathBuilder::new();
        pb.move_to(from.x, from.y);
        pb.line_to(to.x, to.y);
        let Some(path) = pb.finish() else {
            return false;
        };

        let mut paint = Paint::default();
        paint.set_color(to_skia(style.color));
        paint.anti_alias = true;

        let stroke = Stroke {
            width: style.width,
            line_cap: LineCap::Round,
            line_join: LineJoin::Round,
            ..Stroke::default()
        };

        self.pixmap
            .stroke_path(&path, &paint, &stroke, Transform::identity(), None);
        true
    }

    pub fn capture(&self) -> Snapshot {
        Snapshot {
            pixmap: self.pixmap.clone(),
        }
    }

    /// Replace the canvas pixels with a snapshot.
    pub fn restore(&mut self, snapshot: &Snapshot) {
        if snapshot.width() == self.width() && snapshot.height() == self.height() {
            self.pixmap.data_mut().copy_from_slice(snapshot.data());
        } else {
            log::warn!(
                "restoring {}x{} snapshot onto {}x{} canvas",
                snapshot.width(),
                snapshot.height(),
                self.width(),
                self.height()
            );
            self.pixmap = snapshot.pixmap.clone();
        }
    }

    /// Whether the canvas currently shows exactly `snapshot`.
    pub fn matches(&self, snapshot: &Snapshot) -> bool {
        snapshot.width() == self.width()
            && snapshot.height() == self.height()
            && snapshot.data() == self.pixmap.data()
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        read_pixel(&self.pixmap, x, y)
    }

    /// Encode the current pixels as PNG.
    pub fn encode_png(&self) -> Result<Vec<u8>, String> {
        self.pixmap
            .encode_png()
            .map_err(|e| format!("Failed to encode PNG: {e}"))
    }
}

fn to_skia(c: Color) -> tiny_skia::Color {
    tiny_skia::Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn read_pixel(pixmap: &Pixmap, x: u32, y: u32) -> Option<Color> {
    let px = pixmap.pixel(x, y)?.demultiply();
    Some(Color::rgba(px.red(), px.green(), px.blue(), px.alpha()))
}
