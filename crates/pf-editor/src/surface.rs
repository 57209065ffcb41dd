//! Drawing surface: canvas + brush + snapshot history.
//!
//! All interaction from a front end goes through [`DrawingSurface`], either
//! as raw [`InputEvent`]s via [`DrawingSurface::handle_event`] or through the
//! explicit stroke/undo/redo/reset calls.

use crate::canvas::{BrushStyle, RasterCanvas};
use crate::history::History;
use crate::input::{InputEvent, Point};
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use crate::tools::{BrushTool, StrokeOp};
use pf_core::Color;
use pf_core::wire::PORTRAIT_FILENAME;
use std::path::{Path, PathBuf};

/// Brush widths accepted by [`DrawingSurface::set_brush_width`].
pub const MIN_BRUSH_WIDTH: f32 = 1.0;
pub const MAX_BRUSH_WIDTH: f32 = 50.0;

/// Quick-pick palette offered next to the color picker.
pub const SWATCHES: [Color; 5] = [
    Color::rgb(0x00, 0x00, 0x00),
    Color::rgb(0xff, 0x00, 0x00),
    Color::rgb(0x00, 0xff, 0x00),
    Color::rgb(0x00, 0x00, 0xff),
    Color::rgb(0xff, 0xff, 0xff),
];

/// Canvas dimensions, background, and optional history bound.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceConfig {
    pub width: u32,
    pub height: u32,
    pub background: Color,
    /// Oldest snapshots are dropped past this depth. `None` keeps all.
    pub max_history: Option<usize>,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            width: 500,
            height: 600,
            background: Color::rgb(0xf3, 0xf4, 0xf6),
            max_history: None,
        }
    }
}

/// Result of routing one input event through the surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventOutcome {
    /// The canvas pixels changed and need repainting.
    pub changed: bool,
    /// The host must suppress its default handling of this event.
    pub prevent_default: bool,
    /// The shortcut the event resolved to, if any.
    pub action: Option<ShortcutAction>,
}

pub struct DrawingSurface {
    canvas: RasterCanvas,
    history: History,
    brush: BrushTool,
    style: BrushStyle,
    max_history: Option<usize>,
}

impl DrawingSurface {
    /// Create an initialized surface (background filled, snapshot 0 taken).
    pub fn new(config: SurfaceConfig) -> Result<Self, String> {
        let canvas = RasterCanvas::new(config.width, config.height, config.background)?;
        let mut surface = Self {
            canvas,
            history: History::new(config.max_history),
            brush: BrushTool::new(),
            style: BrushStyle::default(),
            max_history: config.max_history,
        };
        surface.initialize();
        Ok(surface)
    }

    /// Fill with the background, drop all history, capture snapshot 0.
    pub fn initialize(&mut self) {
        self.brush = BrushTool::new();
        self.canvas.clear();
        self.history = History::new(self.max_history);
        self.history.push(self.canvas.capture());
        log::debug!(
            "surface initialized: {}x{}",
            self.canvas.width(),
            self.canvas.height()
        );
    }

    // ─── Strokes ─────────────────────────────────────────────────────────

    pub fn stroke_start(&mut self, point: Point) {
        self.apply_pointer(&InputEvent::pointer_down(point.x, point.y));
    }

    /// Extend the active stroke. Returns `true` if pixels changed.
    pub fn stroke_extend(&mut self, point: Point) -> bool {
        self.apply_pointer(&InputEvent::pointer_move(point.x, point.y))
    }

    /// Finish the active stroke. Returns `true` if a snapshot was captured.
    pub fn stroke_end(&mut self) -> bool {
        let Some(op) = self.brush.finish() else {
            return false;
        };
        self.apply_op(op);
        matches!(op, StrokeOp::End { moved: true })
    }

    pub fn is_drawing(&self) -> bool {
        self.brush.is_drawing()
    }

    // ─── History ─────────────────────────────────────────────────────────

    /// Step back one snapshot. No-op at the start of history.
    pub fn undo(&mut self) -> bool {
        self.stroke_end();
        match self.history.undo() {
            Some(snapshot) => {
                self.canvas.restore(snapshot);
                true
            }
            None => false,
        }
    }

    /// Step forward one snapshot. No-op at the end of history.
    pub fn redo(&mut self) -> bool {
        self.stroke_end();
        match self.history.redo() {
            Some(snapshot) => {
                self.canvas.restore(snapshot);
                true
            }
            None => false,
        }
    }

    /// Clear to the background and record that as an undoable step.
    pub fn reset(&mut self) {
        self.stroke_end();
        self.canvas.clear();
        self.history.push(self.canvas.capture());
        log::debug!("surface reset, history cursor {:?}", self.history.cursor());
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn canvas(&self) -> &RasterCanvas {
        &self.canvas
    }

    // ─── Brush settings ──────────────────────────────────────────────────

    pub fn style(&self) -> BrushStyle {
        self.style
    }

    pub fn set_color(&mut self, color: Color) {
        self.style.color = color;
    }

    /// Set the stroke color from a hex string. Returns `false` if unparseable.
    pub fn set_color_hex(&mut self, hex: &str) -> bool {
        match Color::from_hex(hex) {
            Some(color) => {
                self.style.color = color;
                true
            }
            None => false,
        }
    }

    /// Set the brush width, clamped to the supported range. Returns the
    /// width actually applied.
    pub fn set_brush_width(&mut self, width: f32) -> f32 {
        let width = if width.is_finite() {
            width.clamp(MIN_BRUSH_WIDTH, MAX_BRUSH_WIDTH)
        } else {
            BrushStyle::default().width
        };
        self.style.width = width;
        width
    }

    // ─── Export ──────────────────────────────────────────────────────────

    /// Current canvas as PNG bytes. Does not touch history.
    pub fn export_png(&self) -> Result<Vec<u8>, String> {
        self.canvas.encode_png()
    }

    /// Write the current canvas to `dir/character-portrait.png`.
    pub fn export_to(&self, dir: &Path) -> Result<PathBuf, String> {
        let png = self.export_png()?;
        let path = dir.join(PORTRAIT_FILENAME);
        std::fs::write(&path, png)
            .map_err(|e| format!("Failed to write {}: {}", path.display(), e))?;
        log::info!("exported portrait to {}", path.display());
        Ok(path)
    }

    // ─── Events ──────────────────────────────────────────────────────────

    /// Route one input event: pointer events drive the brush, keys resolve
    /// through the shortcut map.
    pub fn handle_event(&mut self, event: &InputEvent) -> EventOutcome {
        match event {
            InputEvent::Key { key, modifiers } => match ShortcutMap::resolve(key, *modifiers) {
                Some(action) => {
                    let changed = match action {
                        ShortcutAction::Undo => self.undo(),
                        ShortcutAction::Redo => self.redo(),
                    };
                    EventOutcome {
                        changed,
                        prevent_default: action.prevents_default(),
                        action: Some(action),
                    }
                }
                None => EventOutcome::default(),
            },
            _ => EventOutcome {
                changed: self.apply_pointer(event),
                ..EventOutcome::default()
            },
        }
    }

    fn apply_pointer(&mut self, event: &InputEvent) -> bool {
        let mut changed = false;
        for op in self.brush.handle(event) {
            changed |= self.apply_op(op);
        }
        changed
    }

    /// Apply one brush op. Returns `true` if pixels changed.
    fn apply_op(&mut self, op: StrokeOp) -> bool {
        match op {
            StrokeOp::Begin(p) => {
                log::trace!("stroke begin at ({}, {})", p.x, p.y);
                false
            }
            StrokeOp::Segment { from, to } => self.canvas.stroke_segment(from, to, &self.style),
            StrokeOp::End { moved: true } => {
                self.history.push(self.canvas.capture());
                log::trace!(
                    "stroke captured: {} snapshot(s), cursor {:?}",
                    self.history.len(),
                    self.history.cursor()
                );
                false
            }
            StrokeOp::End { moved: false } => {
                log::trace!("stroke without movement, nothing captured");
                false
            }
        }
    }
}
