//! Table styles, passed as configuration and emitted as CSS scoped to one
//! grid instance.

use crate::color::Color;
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Visual options of a grid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleOptions {
    /// Header background color
    pub header_bg: Color,
    /// Header text color
    pub header_text: Color,
    /// Row background color
    pub row_bg: Color,
    /// Alternate row background color
    pub row_alt_bg: Color,
    /// Hovered row background color
    pub hover_bg: Color,
    /// Border color
    pub border_color: Color,
    /// Text color
    pub text_color: Color,
    /// Striped rows
    pub striped: bool,
    /// Show borders
    pub bordered: bool,
    /// Font size in pixels
    pub font_size: f32,
}

impl Default for StyleOptions {
    fn default() -> Self {
        Self::light()
    }
}

impl StyleOptions {
    /// Light preset.
    #[must_use]
    pub fn light() -> Self {
        Self {
            header_bg: Color::new(0.95, 0.95, 0.95, 1.0),
            header_text: Color::new(0.2, 0.2, 0.2, 1.0),
            row_bg: Color::WHITE,
            row_alt_bg: Color::new(0.98, 0.98, 0.98, 1.0),
            hover_bg: Color::new(0.9, 0.95, 1.0, 1.0),
            border_color: Color::new(0.85, 0.85, 0.85, 1.0),
            text_color: Color::BLACK,
            striped: true,
            bordered: true,
            font_size: 14.0,
        }
    }

    /// Dark preset.
    #[must_use]
    pub fn dark() -> Self {
        Self {
            header_bg: Color::new(0.14, 0.14, 0.14, 1.0),
            header_text: Color::WHITE,
            row_bg: Color::new(0.07, 0.07, 0.07, 1.0),
            row_alt_bg: Color::new(0.1, 0.1, 0.1, 1.0),
            hover_bg: Color::new(0.16, 0.22, 0.33, 1.0),
            border_color: Color::new(0.25, 0.25, 0.25, 1.0),
            text_color: Color::new(0.9, 0.9, 0.9, 1.0),
            striped: true,
            bordered: true,
            font_size: 14.0,
        }
    }

    /// CSS rules scoped to the element with id `scope`.
    #[must_use]
    pub fn to_css(&self, scope: &str) -> String {
        let t = format!("#{scope} .gl-table");
        let border = if self.bordered {
            format!("1px solid {}", self.border_color.to_css())
        } else {
            "none".to_string()
        };

        let mut css = String::new();
        let _ = writeln!(
            css,
            "{t} {{ border-collapse: collapse; width: 100%; font-size: {}px; color: {}; }}",
            self.font_size,
            self.text_color.to_css()
        );
        let _ = writeln!(
            css,
            "{t} th, {t} td {{ border: {border}; padding: 6px 8px; }}"
        );
        let _ = writeln!(
            css,
            "{t} th {{ background: {}; color: {}; text-align: left; white-space: nowrap; }}",
            self.header_bg.to_css(),
            self.header_text.to_css()
        );
        let _ = writeln!(css, "{t} th.gl-group {{ text-align: center; }}");
        let _ = writeln!(css, "{t} th.gl-sortable {{ cursor: pointer; }}");
        let _ = writeln!(
            css,
            "{t} tbody tr {{ background: {}; }}",
            self.row_bg.to_css()
        );
        if self.striped {
            let _ = writeln!(
                css,
                "{t} tbody tr:nth-child(even) {{ background: {}; }}",
                self.row_alt_bg.to_css()
            );
        }
        let _ = writeln!(
            css,
            "{t} tbody tr:hover {{ background: {}; }}",
            self.hover_bg.to_css()
        );
        let _ = writeln!(css, "{t} .gl-align-center {{ text-align: center; }}");
        let _ = writeln!(css, "{t} .gl-align-right {{ text-align: right; }}");
        let _ = writeln!(css, "{t} .gl-frozen {{ position: sticky; left: 0; z-index: 1; }}");
        let _ = writeln!(css, "{t} td.gl-frozen {{ background: inherit; }}");
        let _ = writeln!(css, "{t} .gl-empty td {{ text-align: center; font-style: italic; }}");
        let _ = writeln!(css, "{t} .gl-filtered .gl-filter-button {{ font-weight: bold; }}");
        let _ = writeln!(css, "{t} .gl-pager {{ display: flex; gap: 4px; align-items: center; }}");
        css
    }
}
