pub mod canvas;
pub mod history;
pub mod input;
pub mod shortcuts;
pub mod surface;
pub mod tools;

pub use canvas::{BrushStyle, RasterCanvas, Snapshot};
pub use history::History;
pub use input::{InputEvent, Modifiers, Point};
pub use shortcuts::{ShortcutAction, ShortcutMap};
pub use surface::{DrawingSurface, EventOutcome, SWATCHES, SurfaceConfig};
