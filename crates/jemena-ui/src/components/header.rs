use crate::themes::Theme;
use ratatui::text::{Line, Span};

/// Decoration placed either side of the application title.
pub const BOLTS: &str = "⚡";

/// Width of the `=` rule under the title.
pub const SEPARATOR_WIDTH: usize = 60;

/// Chart window header rendering four lines:
///
/// 1. Application title with decorations (ALL CAPS).
/// 2. A 60-column `=` separator.
/// 3. Chart title and summary in `[ title | summary ]` format.
/// 4. An empty line.
pub struct Header<'a> {
    pub title: &'a str,
    /// One-line summary such as total usage and cost; omitted when empty.
    pub summary: &'a str,
    pub theme: &'a Theme,
}

impl<'a> Header<'a> {
    pub fn new(title: &'a str, summary: &'a str, theme: &'a Theme) -> Self {
        Self {
            title,
            summary,
            theme,
        }
    }

    /// Render the header as exactly four lines.
    pub fn to_lines(&self) -> Vec<Line<'a>> {
        let separator = "=".repeat(SEPARATOR_WIDTH);

        let mut info = vec![
            Span::styled("[ ", self.theme.label),
            Span::styled(self.title, self.theme.value),
        ];
        if !self.summary.is_empty() {
            info.push(Span::styled(" | ", self.theme.label));
            info.push(Span::styled(self.summary, self.theme.text));
        }
        info.push(Span::styled(" ]", self.theme.label));

        vec![
            Line::from(vec![
                Span::styled(BOLTS, self.theme.header_accent),
                Span::styled(" JEMENA ELECTRICITY OUTLOOK ", self.theme.header),
                Span::styled(BOLTS, self.theme.header_accent),
            ]),
            Line::from(Span::styled(separator, self.theme.separator)),
            Line::from(info),
            Line::from(""),
        ]
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
