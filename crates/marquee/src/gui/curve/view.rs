use super::model::{LoopState, TextMeasure, TextStyle};
use super::path::Point;
use crate::gui::theme::ThemeColors;
use cairo::Context;
use std::collections::HashMap;

/// Toy-text measurement on a cairo context, in the context's user units.
pub struct CairoMeasure<'a> {
    cr: &'a Context,
}

impl<'a> CairoMeasure<'a> {
    pub fn new(cr: &'a Context, style: &TextStyle) -> Self {
        let weight = if style.bold {
            cairo::FontWeight::Bold
        } else {
            cairo::FontWeight::Normal
        };
        cr.select_font_face(&style.family, cairo::FontSlant::Normal, weight);
        cr.set_font_size(style.size);
        Self { cr }
    }
}

impl TextMeasure for CairoMeasure<'_> {
    fn advance(&self, text: &str) -> f64 {
        self.cr
            .text_extents(text)
            .map(|ext| ext.x_advance())
            .unwrap_or(0.0)
    }
}

/// A glyph positioned in view-box space: baseline midpoint on the curve,
/// rotated to the tangent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacedGlyph {
    pub ch: char,
    pub at: Point,
    pub angle: f64,
    pub advance: f64,
}

/// Walks the tiled loop text along the curve from the current offset.
/// Glyphs whose midpoint falls off either end of the path are skipped.
pub fn layout(state: &LoopState, measure: &impl TextMeasure) -> Vec<PlacedGlyph> {
    if !state.is_ready() {
        return Vec::new();
    }

    let path = state.path();
    let length = path.length();
    let mut advances: HashMap<char, f64> = HashMap::new();
    let mut buf = [0u8; 4];
    let mut cursor = state.offset();
    let mut glyphs = Vec::new();

    for ch in state.tiled_chars() {
        let advance = *advances
            .entry(ch)
            .or_insert_with(|| measure.advance(ch.encode_utf8(&mut buf)));
        let mid = cursor + advance / 2.0;
        if mid > length {
            break;
        }

        if let Some((at, angle)) = path.locate(mid) {
            glyphs.push(PlacedGlyph {
                ch,
                at,
                angle,
                advance,
            });
        }
        cursor += advance;
    }
    glyphs
}

/// Draws the loop into a `width` by `height` widget. Draws nothing until the
/// text has been measured.
pub fn draw(
    cr: &Context,
    state: &mut LoopState,
    width: f64,
    height: f64,
    colors: &ThemeColors,
) -> Result<(), cairo::Error> {
    let Some(fit) = state.fit(width, height) else {
        return Ok(());
    };

    let measure = CairoMeasure::new(cr, state.style());
    if !state.ensure_measured(&measure) {
        return Ok(());
    }

    cr.save()?;
    cr.translate(fit.origin.x, fit.origin.y);
    cr.scale(fit.scale, fit.scale);

    let (r, g, b, a) = colors.text.into_components();
    cr.set_source_rgba(r, g, b, a);

    let mut buf = [0u8; 4];
    for glyph in layout(state, &measure) {
        cr.save()?;
        cr.translate(glyph.at.x, glyph.at.y);
        cr.rotate(glyph.angle);
        cr.move_to(-glyph.advance / 2.0, 0.0);
        cr.show_text(glyph.ch.encode_utf8(&mut buf))?;
        cr.restore()?;
    }

    cr.restore()
}
