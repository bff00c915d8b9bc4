use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
};
use unicode_width::UnicodeWidthStr;

use crate::tooltip::{format_title, TooltipContent, TooltipRow};

const NO_DATA_BODY: &str = "No data recorded";

/// Floating inspector for one day: date title, device subtitle, then the
/// four cycle/energy rows with legend swatches on the cycle rows. Sits next
/// to the anchored day column, clamped inside the chart area.
pub struct TooltipPanel {
    content: TooltipContent,
    anchor_x: u16,
}

impl TooltipPanel {
    pub fn new(content: TooltipContent, anchor_x: u16) -> Self {
        Self { content, anchor_x }
    }

    /// Panel for a selected day with no record behind it
    pub fn no_data(t: i64, device: &str, anchor_x: u16) -> Self {
        Self {
            content: TooltipContent {
                title: format_title(t),
                subtitle: device.to_string(),
                rows: Vec::new(),
            },
            anchor_x,
        }
    }

    fn inner_width(&self) -> usize {
        let c = &self.content;
        let mut w = c.title.width().max(c.subtitle.width());
        if c.rows.is_empty() {
            w = w.max(NO_DATA_BODY.width());
        }
        for row in &c.rows {
            w = w.max(2 + row.label.width() + 2 + row.value.width());
        }
        w
    }
}

impl Widget for TooltipPanel {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let inner_w = self.inner_width();
        let body_lines = self.content.rows.len().max(1) as u16;
        let w = inner_w as u16 + 2;
        let h = body_lines + 4;
        if w > area.width || h > area.height {
            return;
        }

        // Right of the anchor when there is room, otherwise to its left
        let x = if self.anchor_x + 1 + w <= area.right() {
            self.anchor_x + 1
        } else if self.anchor_x >= area.x + w + 1 {
            self.anchor_x - w - 1
        } else {
            area.right() - w
        };
        let y = if area.y + 1 + h <= area.bottom() {
            area.y + 1
        } else {
            area.y
        };
        let panel = Rect {
            x,
            y,
            width: w,
            height: h,
        };

        Clear.render(panel, buf);

        let mut lines = vec![
            Line::from(Span::styled(
                self.content.title.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                self.content.subtitle.clone(),
                Style::default().fg(Color::Gray),
            )),
        ];
        if self.content.rows.is_empty() {
            lines.push(Line::from(Span::styled(
                NO_DATA_BODY,
                Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC),
            )));
        } else {
            for row in &self.content.rows {
                lines.push(row_line(row, inner_w));
            }
        }

        Paragraph::new(Text::from(lines))
            .block(Block::default().borders(Borders::ALL))
            .render(panel, buf);
    }
}

/// Swatch, label, then the value right-aligned to the panel edge
fn row_line(row: &TooltipRow, inner_w: usize) -> Line<'static> {
    let swatch = match row.legend {
        Some(color) => Span::styled("■ ", Style::default().fg(color)),
        None => Span::raw("  "),
    };
    let pad = inner_w.saturating_sub(2 + row.label.width() + row.value.width());
    Line::from(vec![
        swatch,
        Span::raw(row.label.clone()),
        Span::raw(" ".repeat(pad)),
        Span::styled(
            row.value.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
    ])
}

const HELP_ROWS: &[(&str, &str)] = &[
    ("left/right, h/l", "select day"),
    ("p/n, [/]", "previous/next month"),
    ("t", "jump to today"),
    ("esc", "clear selection, then quit"),
    ("?", "toggle this help"),
    ("q, ctrl-c", "quit"),
];

/// Centered key binding reference, toggled with `?`
pub struct HelpPanel;

impl Widget for HelpPanel {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let key_w = HELP_ROWS.iter().map(|(k, _)| k.width()).max().unwrap_or(0);
        let desc_w = HELP_ROWS.iter().map(|(_, d)| d.width()).max().unwrap_or(0);
        let w = (key_w + 2 + desc_w) as u16 + 4;
        let h = HELP_ROWS.len() as u16 + 2;
        if w > area.width || h > area.height {
            return;
        }

        let panel = Rect {
            x: area.x + (area.width - w) / 2,
            y: area.y + (area.height - h) / 2,
            width: w,
            height: h,
        };

        Clear.render(panel, buf);

        let lines: Vec<Line> = HELP_ROWS
            .iter()
            .map(|(key, what)| {
                Line::from(vec![
                    Span::styled(
                        format!(" {key:<key_w$}"),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                    Span::raw("  "),
                    Span::raw(*what),
                ])
            })
            .collect();

        Paragraph::new(Text::from(lines))
            .block(Block::default().borders(Borders::ALL).title("Keys"))
            .render(panel, buf);
    }
}
