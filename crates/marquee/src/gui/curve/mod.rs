pub mod model;
pub mod path;
pub mod view;

pub use model::{
    Activation, Callback, DragPhase, Href, ItemSource, LoopOptions, LoopState, NavItem,
    TextMeasure, TextStyle,
};
pub use path::{CurvePath, Point, ViewFit};
pub use view::{CairoMeasure, PlacedGlyph, draw, layout};

// Logical drawing width, scaled to the widget.
pub const VIEWBOX_WIDTH: f64 = 1440.0;

pub const PATH_START: Point = Point::new(-100.0, 40.0);
pub const PATH_END: Point = Point::new(1540.0, 40.0);
pub const CONTROL_X: f64 = 500.0;
pub const ARC_SAMPLES: usize = 256;

pub const SEPARATOR: &str = " ꩜ ";
pub const SPLIT_GLYPHS: &[char] = &['✦', '✘', '꩜', '✶', '༄', '✧'];
pub const TRAILING_MARKER: char = '\u{00A0}';

pub const SAFETY_SPAN: f64 = 1800.0; // longest path the tiled text must cover
pub const EXTRA_CYCLES: usize = 2;
pub const HOVER_SLOWDOWN: f64 = 0.3;
pub const CLICK_SLOP: f64 = 4.0; // pointer travel (px) still treated as a click
