use chrono::NaiveDate;

use crate::config::Config;
use crate::series::{CycleDataset, DayRecord};
use crate::tooltip::{resolve_tooltip, TooltipContent, TooltipError};
use crate::view::{
    derive_view_state, first_of_month, local_midnight_ms, month_window, next_month, prev_month,
    ViewState,
};

/// Interactive state behind the monthly cycles screen: which month is on
/// display, which day is selected, and the view flags derived from them.
///
/// `today` is injected at construction and advanced through
/// [`Dashboard::on_day_rollover`], so none of the state here depends on the
/// wall clock directly.
#[derive(Debug, Clone)]
pub struct Dashboard {
    pub dataset: CycleDataset,
    pub device_name: String,
    pub max_cycles: f64,
    pub y_axis_ticks: usize,
    displayed_month: NaiveDate,
    today: NaiveDate,
    selected: Option<i64>,
    view: ViewState,
}

impl Dashboard {
    /// `month` is any date within the month to display first.
    pub fn new(dataset: CycleDataset, cfg: &Config, month: NaiveDate, today: NaiveDate) -> Self {
        let mut dash = Self {
            dataset,
            device_name: cfg.device_name.clone(),
            max_cycles: cfg.max_cycles,
            y_axis_ticks: cfg.y_axis_ticks,
            displayed_month: first_of_month(month),
            today,
            selected: None,
            view: ViewState::default(),
        };
        dash.refresh_view();
        dash
    }

    pub fn displayed_month(&self) -> NaiveDate {
        self.displayed_month
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn view(&self) -> ViewState {
        self.view
    }

    pub fn selected(&self) -> Option<i64> {
        self.selected
    }

    /// Half-open `[start, end)` timestamp window of the displayed month
    pub fn window(&self) -> (i64, i64) {
        month_window(self.displayed_month)
    }

    pub fn visible_records(&self) -> &[DayRecord] {
        let (start, end) = self.window();
        self.dataset.records_between(start, end)
    }

    pub fn selected_record(&self) -> Option<&DayRecord> {
        self.selected.and_then(|t| self.dataset.record_at(t))
    }

    /// Inspector payload for the selected day, if any day is selected
    pub fn tooltip(&self) -> Option<Result<TooltipContent, TooltipError>> {
        self.selected
            .map(|t| resolve_tooltip(&self.dataset, t, &self.device_name))
    }

    /// `September 2024` style heading for the displayed month
    pub fn month_title(&self) -> String {
        self.displayed_month.format("%B %Y").to_string()
    }

    pub fn next_month(&mut self) {
        self.displayed_month = next_month(self.displayed_month);
        self.selected = None;
        self.refresh_view();
    }

    pub fn prev_month(&mut self) {
        self.displayed_month = prev_month(self.displayed_month);
        self.selected = None;
        self.refresh_view();
    }

    /// Show today's month and select today's record if one exists
    pub fn jump_to_today(&mut self) {
        self.displayed_month = first_of_month(self.today);
        let midnight = local_midnight_ms(self.today);
        self.selected = self.dataset.record_at(midnight).map(|r| r.t);
        self.refresh_view();
    }

    /// Move selection to the next visible day, saturating at month end.
    /// With nothing selected, selects the first visible day.
    pub fn select_next_day(&mut self) {
        let next = {
            let visible = self.visible_records();
            if visible.is_empty() {
                return;
            }
            match self.position_of_selected(visible) {
                Some(i) if i + 1 < visible.len() => visible[i + 1].t,
                Some(i) => visible[i].t,
                None => visible[0].t,
            }
        };
        self.selected = Some(next);
    }

    /// Move selection to the previous visible day, saturating at month start.
    /// With nothing selected, selects the last visible day.
    pub fn select_prev_day(&mut self) {
        let prev = {
            let visible = self.visible_records();
            if visible.is_empty() {
                return;
            }
            match self.position_of_selected(visible) {
                Some(i) if i > 0 => visible[i - 1].t,
                Some(i) => visible[i].t,
                None => visible[visible.len() - 1].t,
            }
        };
        self.selected = Some(prev);
    }

    pub fn clear_selection(&mut self) -> bool {
        let had = self.selected.is_some();
        self.selected = None;
        had
    }

    /// Advance `today` when the local date changes under a running session.
    /// Returns true when the date moved and the view was re-derived.
    pub fn on_day_rollover(&mut self, now: NaiveDate) -> bool {
        if now == self.today {
            return false;
        }
        self.today = now;
        self.refresh_view();
        true
    }

    fn position_of_selected(&self, visible: &[DayRecord]) -> Option<usize> {
        let t = self.selected?;
        visible.iter().position(|r| r.t == t)
    }

    /// The day the month view is anchored on. In the current month that is
    /// today, so the marker tracks the actual date; other months key the
    /// view off their first day and get no marker anyway.
    fn view_day(&self) -> NaiveDate {
        if self.displayed_month == first_of_month(self.today) {
            self.today
        } else {
            self.displayed_month
        }
    }

    fn refresh_view(&mut self) {
        self.view = derive_view_state(self.view_day(), self.today, self.max_cycles);
    }
}
