//! Text measurement and word wrapping.

use crate::commands::FontSpec;

/// Measures rendered text width.
pub trait TextMeasure {
    fn width(&self, text: &str, font: FontSpec) -> f64;
}

/// Width estimate from character count, for shells without a font system.
#[derive(Debug, Clone, Copy)]
pub struct ApproxTextMeasure {
    /// Average glyph advance as a fraction of the font size.
    pub advance: f64,
    /// Extra advance factor for bold text.
    pub bold_factor: f64,
}

impl Default for ApproxTextMeasure {
    fn default() -> Self {
        Self {
            advance: 0.55,
            bold_factor: 1.1,
        }
    }
}

impl TextMeasure for ApproxTextMeasure {
    fn width(&self, text: &str, font: FontSpec) -> f64 {
        let factor = if font.bold { self.bold_factor } else { 1.0 };
        text.chars().count() as f64 * font.size * self.advance * factor
    }
}

/// Greedy word wrap to `max_width`.
///
/// Explicit newlines always break. A line that fits is kept as is, otherwise
/// words are packed until the next one would overflow. A single word wider
/// than `max_width` gets a line of its own.
pub fn wrap_text(text: &str, max_width: f64, font: FontSpec, measure: &dyn TextMeasure) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        if measure.width(paragraph, font) <= max_width {
            lines.push(paragraph.to_string());
            continue;
        }
        let mut current = String::new();
        for word in paragraph.split(' ') {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };
            if measure.width(&candidate, font) <= max_width {
                current = candidate;
            } else {
                if !current.is_empty() {
                    lines.push(std::mem::take(&mut current));
                }
                current = word.to_string();
            }
        }
        if !current.is_empty() {
            lines.push(current);
        }
    }
    lines
}
