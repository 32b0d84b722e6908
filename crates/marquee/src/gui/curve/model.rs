use super::path::{CurvePath, Point, ViewFit};
use super::{
    EXTRA_CYCLES, HOVER_SLOWDOWN, SAFETY_SPAN, SEPARATOR, SPLIT_GLYPHS, TRAILING_MARKER,
    VIEWBOX_WIDTH,
};
use crate::config::{Config, Direction, StyleConfig};
use derive_more::{AsRef, Deref, Display, From, Into};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::rc::Rc;

#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct Href(String);

impl Href {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Action run when an item is clicked.
#[derive(Clone)]
pub struct Callback(Rc<dyn Fn()>);

impl Callback {
    pub fn new(f: impl Fn() + 'static) -> Self {
        Self(Rc::new(f))
    }

    pub fn call(&self) {
        (self.0)()
    }
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Callback(..)")
    }
}

#[derive(Debug, Clone)]
pub struct NavItem {
    pub label: String,
    pub href: Option<Href>,
    pub on_click: Option<Callback>,
}

impl NavItem {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            href: None,
            on_click: None,
        }
    }

    pub fn with_href(mut self, href: impl Into<String>) -> Self {
        self.href = Some(Href::new(href));
        self
    }

    pub fn with_action(mut self, f: impl Fn() + 'static) -> Self {
        self.on_click = Some(Callback::new(f));
        self
    }

    /// The callback wins over the href; an item with neither does nothing.
    pub fn activation(&self) -> Option<Activation> {
        self.on_click
            .clone()
            .map(Activation::Callback)
            .or_else(|| self.href.clone().map(Activation::Navigate))
    }
}

#[derive(Debug, Clone)]
pub enum Activation {
    Callback(Callback),
    Navigate(Href),
}

#[derive(Debug, Clone)]
pub enum ItemSource {
    Items(Vec<NavItem>),
    Text(String),
}

impl ItemSource {
    pub fn resolve(items: Option<Vec<NavItem>>, text: Option<String>) -> Self {
        match items {
            Some(items) => Self::Items(items),
            None => Self::Text(text.unwrap_or_default()),
        }
    }

    pub fn into_items(self) -> Vec<NavItem> {
        match self {
            Self::Items(items) => items,
            Self::Text(text) => parse_items(&text),
        }
    }
}

/// Splits decorative marquee text into plain items.
pub fn parse_items(text: &str) -> Vec<NavItem> {
    text.split(SPLIT_GLYPHS)
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(NavItem::new)
        .collect()
}

/// One cycle of loop text: labels joined and terminated by the separator,
/// with the trailing space swapped for a non-breaking one so measurement
/// never drops it.
pub fn assemble_text(items: &[NavItem]) -> String {
    let mut text = items
        .iter()
        .map(|item| item.label.as_str())
        .collect::<Vec<_>>()
        .join(SEPARATOR);
    text.push_str(SEPARATOR);

    let trimmed = text.trim_end().len();
    text.truncate(trimmed);
    text.push(TRAILING_MARKER);
    text
}

/// Wraps `value` into `(-spacing, 0]`.
pub fn wrap_offset(value: f64, spacing: f64) -> f64 {
    if !(spacing > 0.0) || !value.is_finite() {
        return 0.0;
    }
    let r = value.rem_euclid(spacing);
    if r == 0.0 { 0.0 } else { r - spacing }
}

/// Measures the advance of a string in the current text style.
pub trait TextMeasure {
    fn advance(&self, text: &str) -> f64;
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub family: String,
    pub size: f64,
    pub bold: bool,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self::from(&StyleConfig::default())
    }
}

impl From<&StyleConfig> for TextStyle {
    fn from(style: &StyleConfig) -> Self {
        Self {
            family: style.font_family.clone(),
            size: style.font_size,
            bold: style.bold,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopOptions {
    pub speed: f64,
    pub curve_amount: f64,
    pub direction: Direction,
    pub interactive: bool,
}

impl Default for LoopOptions {
    fn default() -> Self {
        Self {
            speed: 2.0,
            curve_amount: 400.0,
            direction: Direction::Left,
            interactive: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragPhase {
    #[default]
    Idle,
    Dragging {
        origin_x: f64,
        last_x: f64,
        velocity: f64,
    },
}

/// Runtime state of one loop widget. Built fresh per mount; mutated by the
/// frame tick and pointer handlers on the UI thread.
#[derive(Debug)]
pub struct LoopState {
    items: Vec<NavItem>,
    text: String,
    char_count: usize,
    style: TextStyle,
    path: CurvePath,
    options: LoopOptions,
    glyph_spacing: f64,
    offset: f64,
    direction: Direction,
    drag: DragPhase,
    hovered: bool,
}

impl LoopState {
    pub fn new(source: ItemSource, options: LoopOptions, style: TextStyle) -> Self {
        let items = source.into_items();
        let text = assemble_text(&items);

        Self {
            char_count: text.chars().count(),
            items,
            text,
            style,
            path: CurvePath::for_bend(options.curve_amount),
            options,
            glyph_spacing: 0.0,
            offset: 0.0,
            direction: options.direction,
            drag: DragPhase::Idle,
            hovered: false,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        let items = config.items.as_ref().map(|items| {
            items
                .iter()
                .map(|cfg| NavItem {
                    label: cfg.label.clone(),
                    href: cfg.href.clone(),
                    on_click: None,
                })
                .collect()
        });
        let options = LoopOptions {
            speed: config.speed,
            curve_amount: config.curve_amount,
            direction: config.direction,
            interactive: config.interactive,
        };

        Self::new(
            ItemSource::resolve(items, config.marquee_text.clone()),
            options,
            TextStyle::from(&config.style),
        )
    }

    /// Fresh state for a reloaded config. The pointer is still wherever it
    /// was, so hover carries over; measurement and offset start again.
    pub fn reloaded(&self, config: &Config) -> Self {
        let mut state = Self::from_config(config);
        state.hovered = self.hovered;
        state
    }

    pub fn items(&self) -> &[NavItem] {
        &self.items
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn style(&self) -> &TextStyle {
        &self.style
    }

    pub fn path(&self) -> &CurvePath {
        &self.path
    }

    pub fn options(&self) -> &LoopOptions {
        &self.options
    }

    pub fn glyph_spacing(&self) -> f64 {
        self.glyph_spacing
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn drag(&self) -> DragPhase {
        self.drag
    }

    pub fn is_ready(&self) -> bool {
        self.glyph_spacing > 0.0
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self.drag, DragPhase::Dragging { .. })
    }

    pub fn is_hovered(&self) -> bool {
        self.hovered
    }

    /// Records the measured cycle length. The first valid measurement parks
    /// the offset one cycle back, just before the wrap point.
    pub fn set_glyph_spacing(&mut self, spacing: f64) {
        if !(spacing > 0.0) || !spacing.is_finite() {
            self.glyph_spacing = 0.0;
            self.offset = 0.0;
            return;
        }
        if spacing != self.glyph_spacing {
            self.glyph_spacing = spacing;
            self.offset = -spacing;
        }
    }

    /// Measures the loop text unless already measured. Returns readiness.
    pub fn ensure_measured(&mut self, measure: &impl TextMeasure) -> bool {
        if !self.is_ready() {
            self.set_glyph_spacing(measure.advance(&self.text));
            if self.is_ready() {
                log::debug!("Loop text measured at {:.1} units", self.glyph_spacing);
            }
        }
        self.is_ready()
    }

    /// Copies of the cycle needed to cover the longest path plus margin.
    pub fn repeat_count(&self) -> usize {
        if !self.is_ready() {
            return 1;
        }
        (SAFETY_SPAN / self.glyph_spacing).ceil() as usize + EXTRA_CYCLES
    }

    pub fn tiled_chars(&self) -> impl Iterator<Item = char> + '_ {
        self.text
            .chars()
            .cycle()
            .take(self.repeat_count() * self.char_count)
    }

    /// Vertical span of the view box the text can reach: the curve padded by
    /// one font size either side.
    pub fn content_band(&self) -> (f64, f64) {
        let (top, bottom) = self.path.y_bounds();
        (top - self.style.size, bottom + self.style.size)
    }

    pub fn fit(&self, width: f64, height: f64) -> Option<ViewFit> {
        let (top, bottom) = self.content_band();
        ViewFit::new(top, bottom, width, height)
    }

    /// Widget height that shows the whole band at `width` edge to edge.
    pub fn preferred_height(&self, width: f64) -> f64 {
        let (top, bottom) = self.content_band();
        (bottom - top) * (width / VIEWBOX_WIDTH)
    }

    /// One frame of autonomous motion. Returns whether the offset moved.
    pub fn tick(&mut self) -> bool {
        if self.is_dragging() || !self.is_ready() {
            return false;
        }

        let mut delta = self.direction.sign() * self.options.speed;
        if self.hovered {
            delta *= HOVER_SLOWDOWN;
        }
        self.offset = wrap_offset(self.offset + delta, self.glyph_spacing);
        delta != 0.0
    }

    pub fn set_hovered(&mut self, hovered: bool) {
        self.hovered = hovered;
    }

    pub fn pointer_down(&mut self, x: f64) -> bool {
        if !self.options.interactive {
            return false;
        }
        self.drag = DragPhase::Dragging {
            origin_x: x,
            last_x: x,
            velocity: 0.0,
        };
        true
    }

    /// Scrubs the loop by the horizontal pointer movement since the last event.
    pub fn pointer_move(&mut self, x: f64) -> bool {
        let DragPhase::Dragging {
            origin_x, last_x, ..
        } = self.drag
        else {
            return false;
        };

        let dx = x - last_x;
        self.drag = DragPhase::Dragging {
            origin_x,
            last_x: x,
            velocity: dx,
        };
        if self.is_ready() {
            self.offset = wrap_offset(self.offset + dx, self.glyph_spacing);
        }
        true
    }

    /// Ends a drag, steering autonomous motion by the last movement (a zero
    /// or leftward sample means left). Returns where the drag started.
    pub fn pointer_up(&mut self) -> Option<f64> {
        let DragPhase::Dragging {
            origin_x, velocity, ..
        } = std::mem::take(&mut self.drag)
        else {
            return None;
        };

        self.direction = if velocity > 0.0 {
            Direction::Right
        } else {
            Direction::Left
        };
        Some(origin_x)
    }

    pub fn pointer_leave(&mut self) -> Option<f64> {
        self.hovered = false;
        self.pointer_up()
    }

    /// Ends a drag the system took away. It still steers like a release but
    /// leaves nothing to treat as a click.
    pub fn pointer_cancel(&mut self) {
        self.pointer_up();
    }

    /// Index of the character of one text cycle under view-box `x`.
    ///
    /// Proportional to string position rather than per-glyph advance along
    /// the curve, so it drifts slightly on strongly bent paths.
    pub fn char_index_at(&self, view_x: f64) -> Option<usize> {
        let spacing = self.glyph_spacing;
        if !(spacing > 0.0) || !view_x.is_finite() || self.char_count == 0 {
            return None;
        }

        let offset = self.offset.rem_euclid(spacing);
        let position = (view_x - offset).rem_euclid(spacing);
        let index = ((position / spacing) * self.char_count as f64).floor() as usize;
        Some(index % self.char_count)
    }

    /// Item whose label covers character `index` of one cycle. Separators
    /// belong to no item.
    pub fn item_at_char(&self, index: usize) -> Option<usize> {
        let separator = SEPARATOR.chars().count();
        let mut start = 0;
        for (i, item) in self.items.iter().enumerate() {
            let len = item.label.chars().count();
            if (start..start + len).contains(&index) {
                return Some(i);
            }
            start += len + separator;
        }
        None
    }

    /// Maps a click at widget point (`x`, `y`) in a `width` by `height`
    /// widget to an item index. Only clicks within one font size of the
    /// curve land on text. Clicks during a drag or on a passive loop hit
    /// nothing.
    pub fn hit_test(&self, x: f64, y: f64, width: f64, height: f64) -> Option<usize> {
        if self.is_dragging() || !self.options.interactive {
            return None;
        }

        let view = self.fit(width, height)?.to_view(Point::new(x, y));
        let curve_y = self.path.y_at_x(view.x)?;
        if !((view.y - curve_y).abs() <= self.style.size) {
            return None;
        }
        self.char_index_at(view.x)
            .and_then(|index| self.item_at_char(index))
    }

    pub fn activation_at(&self, x: f64, y: f64, width: f64, height: f64) -> Option<Activation> {
        self.hit_test(x, y, width, height)
            .and_then(|i| self.items[i].activation())
    }
}
