//! Freehand brush tool.
//!
//! The brush is a two-state machine (`Idle → Drawing → Idle`) that turns
//! pointer events into [`StrokeOp`]s. It never touches pixels itself; the
//! [`crate::surface::DrawingSurface`] applies the ops to the canvas and
//! decides when to capture history.

use crate::input::{InputEvent, Point};
use smallvec::SmallVec;

/// Stroke lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrokeState {
    #[default]
    Idle,
    Drawing,
}

/// A drawing operation produced by the brush.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StrokeOp {
    /// Pointer went down; the path starts here. Paints nothing.
    Begin(Point),
    /// Paint one segment of the path.
    Segment { from: Point, to: Point },
    /// The stroke finished. `moved` is false for a press with no movement.
    End { moved: bool },
}

pub struct BrushTool {
    state: StrokeState,
    /// Points of the path in progress.
    path: SmallVec<[Point; 32]>,
}

impl Default for BrushTool {
    fn default() -> Self {
        Self::new()
    }
}

impl BrushTool {
    pub fn new() -> Self {
        Self {
            state: StrokeState::Idle,
            path: SmallVec::new(),
        }
    }

    pub fn state(&self) -> StrokeState {
        self.state
    }

    pub fn is_drawing(&self) -> bool {
        self.state == StrokeState::Drawing
    }

    /// Points accumulated by the current stroke (empty when idle).
    pub fn path(&self) -> &[Point] {
        &self.path
    }

    /// Handle an input event, returning zero or more ops.
    pub fn handle(&mut self, event: &InputEvent) -> Vec<StrokeOp> {
        match event {
            InputEvent::PointerDown { x, y } => {
                let mut ops = Vec::with_capacity(2);
                // A down without a matching up (pointer captured elsewhere)
                // closes the previous stroke first.
                if let Some(end) = self.finish() {
                    ops.push(end);
                }
                let p = Point::new(*x, *y);
                self.state = StrokeState::Drawing;
                self.path.push(p);
                ops.push(StrokeOp::Begin(p));
                ops
            }
            InputEvent::PointerMove { x, y } => {
                if !self.is_drawing() {
                    return vec![];
                }
                let to = Point::new(*x, *y);
                match self.path.last().copied() {
                    Some(from) if from != to => {
                        self.path.push(to);
                        vec![StrokeOp::Segment { from, to }]
                    }
                    _ => vec![],
                }
            }
            InputEvent::PointerUp { .. } | InputEvent::PointerLeave => {
                self.finish().into_iter().collect()
            }
            InputEvent::Key { .. } => vec![],
        }
    }

    /// Close the active stroke, if any.
    pub fn finish(&mut self) -> Option<StrokeOp> {
        if !self.is_drawing() {
            return None;
        }
        let moved = self.path.len() > 1;
        self.state = StrokeState::Idle;
        self.path.clear();
        Some(StrokeOp::End { moved })
    }
}
