pub mod chart;
pub mod panel;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::dashboard::Dashboard;
use crate::series::Flow;
use crate::ui::chart::CyclesChart;

const HORIZONTAL_MARGIN: u16 = 2;
const VERTICAL_MARGIN: u16 = 1;

// Fits beside the legend on an 80-column terminal; the full binding list
// lives behind (?)
const KEY_HINTS: &str = "(←/→) day / (p/n) month / (t)oday / (?) help";

impl Widget for &Dashboard {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let bold = Style::default().add_modifier(Modifier::BOLD);
        let dim = Style::default().fg(Color::Gray);
        let italic = Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(1), // device + month heading
                Constraint::Length(1),
                // Min(0) so the fixed rows survive tiny terminals; the chart
                // takes the leftover and blanks itself below 4 rows
                Constraint::Min(0),
                Constraint::Length(1), // legend + key hints
            ])
            .split(area);

        let title = Line::from(vec![
            Span::styled(self.device_name.clone(), bold),
            Span::raw("  "),
            Span::styled(self.month_title(), dim.patch(bold)),
        ]);
        Paragraph::new(title).render(chunks[0], buf);

        CyclesChart::new(self).render(chunks[2], buf);

        let charging = self.dataset.style(Flow::Charging);
        let discharging = self.dataset.style(Flow::Discharging);
        let legend = Line::from(vec![
            Span::styled("█ ", Style::default().fg(charging.color)),
            Span::styled(charging.label.clone(), dim),
            Span::raw("   "),
            Span::styled("▒ ", Style::default().fg(discharging.color)),
            Span::styled(discharging.label.clone(), dim),
        ]);

        // Legend at its exact width; the hints clip first on narrow terminals
        let footer = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([
                Constraint::Length(legend.width() as u16),
                Constraint::Min(0),
            ])
            .split(chunks[3]);
        Paragraph::new(legend).render(footer[0], buf);
        Paragraph::new(Span::styled(KEY_HINTS, italic))
            .alignment(Alignment::Right)
            .render(footer[1], buf);
    }
}
