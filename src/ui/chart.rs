use chrono::Datelike;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::Widget,
};
use unicode_width::UnicodeWidthStr;

use crate::dashboard::Dashboard;
use crate::scale::LinearScale;
use crate::series::{Flow, FlowStyle};
use crate::tooltip::TooltipError;
use crate::ui::panel::TooltipPanel;
use crate::view::{days_in_month, local_date_of_ms};

/// Y axis unit caption, rendered above the tick labels
pub const UNIT_LABEL: &str = "No. of Cycles";

const GRID_COLOR: Color = Color::DarkGray;
const MARKER_COLOR: Color = Color::White;
const SELECTION_BG: Color = Color::DarkGray;

/// Monthly stacked bar chart: one column per calendar day, charging cycles
/// at the bottom, discharging cycles above with a one-cell stack margin.
/// Draws the selection highlight, the "today" marker line, and the
/// inspector panel for the selected day.
pub struct CyclesChart<'a> {
    dashboard: &'a Dashboard,
}

impl<'a> CyclesChart<'a> {
    pub fn new(dashboard: &'a Dashboard) -> Self {
        Self { dashboard }
    }
}

impl Widget for CyclesChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let dash = self.dashboard;
        if area.height < 4 {
            return;
        }

        let probe = LinearScale::new((0.0, dash.max_cycles), (0.0, 1.0));
        let tick_values = probe.ticks(dash.y_axis_ticks as u16);
        let gutter = tick_values
            .iter()
            .map(|v| tick_label(*v).width())
            .max()
            .unwrap_or(1) as u16
            + 1;
        if area.width <= gutter + 2 {
            return;
        }

        // [unit caption][plot rows][day labels]
        let plot = Rect {
            x: area.x + gutter,
            y: area.y + 1,
            width: area.width - gutter,
            height: area.height - 2,
        };
        let y_scale = LinearScale::new((0.0, dash.max_cycles), (0.0, (plot.height - 1) as f64));

        buf.set_stringn(
            area.x,
            area.y,
            UNIT_LABEL,
            area.width as usize,
            Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC),
        );

        for v in &tick_values {
            let offset = y_scale.project(*v).round() as u16;
            let row = plot.y + plot.height - 1 - offset;
            let label = tick_label(*v);
            let lx = plot.x.saturating_sub(1 + label.width() as u16);
            buf.set_string(lx, row, &label, Style::default().fg(Color::Gray));
            if *v > 0.0 {
                for x in plot.x..plot.right() {
                    if let Some(cell) = buf.cell_mut((x, row)) {
                        cell.set_symbol("─");
                        cell.set_style(Style::default().fg(GRID_COLOR));
                    }
                }
            }
        }

        let days = days_in_month(dash.displayed_month());
        let slots = SlotLayout::new(plot, days);
        let selected_day0 = dash.selected().map(|t| local_date_of_ms(t).day0());

        if let Some(day0) = selected_day0 {
            if slots.fits(day0) {
                let x0 = slots.x(day0);
                for y in plot.y..plot.bottom() {
                    for x in x0..x0 + slots.bar_w {
                        if let Some(cell) = buf.cell_mut((x, y)) {
                            cell.set_bg(SELECTION_BG);
                        }
                    }
                }
            }
        }

        let charging_style = dash.dataset.style(Flow::Charging).clone();
        let discharging_style = dash.dataset.style(Flow::Discharging).clone();
        for record in dash.visible_records() {
            let day0 = local_date_of_ms(record.t).day0();
            if !slots.fits(day0) {
                continue;
            }
            let x0 = slots.x(day0);
            let hc = bar_cells(&y_scale, record.charging.cycles).min(plot.height);
            let mut hd = bar_cells(&y_scale, record.discharging.cycles);
            let gap = u16::from(hc > 0 && hd > 0 && hc + hd < plot.height);
            hd = hd.min(plot.height - hc - gap);
            paint_segment(buf, plot, x0, slots.bar_w, 0, hc, &charging_style);
            paint_segment(buf, plot, x0, slots.bar_w, hc + gap, hd, &discharging_style);
        }

        if let Some(marker) = dash.view().marker {
            let day0 = local_date_of_ms(marker.t).day0();
            if slots.fits(day0) {
                let cx = slots.x(day0) + slots.bar_w / 2;
                let a = y_scale.project(marker.y0).round() as u16;
                let b = y_scale.project(marker.y1).round() as u16;
                let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
                for offset in lo..=hi {
                    let y = plot.y + plot.height - 1 - offset;
                    if let Some(cell) = buf.cell_mut((cx, y)) {
                        cell.set_symbol("│");
                        cell.set_style(Style::default().fg(MARKER_COLOR));
                    }
                }
            }
        }

        let label_y = area.y + area.height - 1;
        let step = ((slots.slot + 2) / slots.slot) as u32;
        for day0 in 0..days {
            let is_selected = selected_day0 == Some(day0);
            if day0 % step != 0 && !is_selected {
                continue;
            }
            if !slots.fits(day0) {
                continue;
            }
            let style = if is_selected {
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            buf.set_stringn(slots.x(day0), label_y, format!("{:02}", day0 + 1), 2, style);
        }

        if dash.visible_records().is_empty() {
            let msg = "No data recorded for this month";
            let y = plot.y + plot.height / 2;
            let x = plot.x + plot.width.saturating_sub(msg.width() as u16) / 2;
            buf.set_stringn(
                x,
                y,
                msg,
                plot.width as usize,
                Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC),
            );
        }

        if let Some(resolved) = dash.tooltip() {
            if let Some(day0) = selected_day0 {
                if slots.fits(day0) {
                    let anchor = slots.x(day0) + slots.bar_w;
                    let panel = match resolved {
                        Ok(content) => TooltipPanel::new(content, anchor),
                        Err(TooltipError::NoData { t }) => {
                            TooltipPanel::no_data(t, &dash.device_name, anchor)
                        }
                    };
                    panel.render(area, buf);
                }
            }
        }
    }
}

/// Uniform per-day column geometry: `bar_w` bar cells plus a one-cell
/// margin per slot, the whole strip centered in the plot
#[derive(Debug, Clone, Copy, PartialEq)]
struct SlotLayout {
    origin_x: u16,
    limit_x: u16,
    slot: u16,
    bar_w: u16,
}

impl SlotLayout {
    fn new(plot: Rect, days: u32) -> Self {
        let days = days.clamp(1, 31) as u16;
        let slot = (plot.width / days).max(1);
        let bar_w = slot.saturating_sub(1).max(1);
        let origin_x = plot.x + plot.width.saturating_sub(slot * days) / 2;
        Self {
            origin_x,
            limit_x: plot.x + plot.width,
            slot,
            bar_w,
        }
    }

    fn x(&self, day0: u32) -> u16 {
        self.origin_x + self.slot * day0 as u16
    }

    fn fits(&self, day0: u32) -> bool {
        self.x(day0) + self.bar_w <= self.limit_x
    }
}

/// Bar height in cells. Nonzero values always get at least one cell so a
/// light cycling day does not vanish from the chart.
fn bar_cells(scale: &LinearScale, v: f64) -> u16 {
    if v <= 0.0 {
        0
    } else {
        scale.project(v).round() as u16 + 1
    }
}

fn paint_segment(
    buf: &mut Buffer,
    plot: Rect,
    x0: u16,
    bar_w: u16,
    from: u16,
    cells: u16,
    style: &FlowStyle,
) {
    let symbol = if style.striped { "▒" } else { "█" };
    for i in from..from + cells {
        let y = plot.y + plot.height - 1 - i;
        for x in x0..x0 + bar_w {
            if let Some(cell) = buf.cell_mut((x, y)) {
                cell.set_symbol(symbol);
                cell.set_style(Style::default().fg(style.color));
            }
        }
    }
}

fn tick_label(val: f64) -> String {
    if (val - val.round()).abs() < f64::EPSILON {
        format!("{}", val.round())
    } else {
        format!("{val:.1}")
    }
}
