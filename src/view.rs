use chrono::{Datelike, Local, LocalResult, NaiveDate, NaiveTime, TimeZone};

/// Vertical "today" overlay: a line from `(t, y0)` to `(t, y1)` in data
/// coordinates, where `t` is the local midnight of the displayed day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerLine {
    pub t: i64,
    pub y0: f64,
    pub y1: f64,
}

impl MarkerLine {
    pub fn endpoints(&self) -> [(i64, f64); 2] {
        [(self.t, self.y0), (self.t, self.y1)]
    }
}

/// Derived presentation state, recomputed only when the displayed day changes
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ViewState {
    pub show_today: bool,
    pub marker: Option<MarkerLine>,
}

/// Decide whether the "today" marker is shown and where.
///
/// The marker is shown iff `day`'s month-start equals `now`'s month-start,
/// and it is pinned to the start of `day`, spanning the full value domain
/// `0..max_cycles`. `now` is injected by the caller so the check never
/// reads the wall clock itself.
pub fn derive_view_state(day: NaiveDate, now: NaiveDate, max_cycles: f64) -> ViewState {
    if first_of_month(day) != first_of_month(now) {
        return ViewState::default();
    }
    ViewState {
        show_today: true,
        marker: Some(MarkerLine {
            t: local_midnight_ms(day),
            y0: 0.0,
            y1: max_cycles,
        }),
    }
}

pub fn first_of_month(d: NaiveDate) -> NaiveDate {
    d.with_day(1).unwrap_or(d)
}

pub fn next_month(d: NaiveDate) -> NaiveDate {
    let first = first_of_month(d);
    let (y, m) = if first.month() == 12 {
        (first.year() + 1, 1)
    } else {
        (first.year(), first.month() + 1)
    };
    NaiveDate::from_ymd_opt(y, m, 1).unwrap_or(first)
}

pub fn prev_month(d: NaiveDate) -> NaiveDate {
    let first = first_of_month(d);
    let (y, m) = if first.month() == 1 {
        (first.year() - 1, 12)
    } else {
        (first.year(), first.month() - 1)
    };
    NaiveDate::from_ymd_opt(y, m, 1).unwrap_or(first)
}

/// Half-open `[start, end)` window covering `day`'s month, in local epoch ms
pub fn month_window(day: NaiveDate) -> (i64, i64) {
    let first = first_of_month(day);
    (local_midnight_ms(first), local_midnight_ms(next_month(first)))
}

pub fn days_in_month(day: NaiveDate) -> u32 {
    let first = first_of_month(day);
    next_month(first).signed_duration_since(first).num_days() as u32
}

/// Local midnight of `date` as epoch milliseconds. A midnight repeated by a
/// DST fold resolves to the earlier instant; a midnight skipped by DST falls
/// back to the UTC reading of that date.
pub fn local_midnight_ms(date: NaiveDate) -> i64 {
    let naive = date.and_time(NaiveTime::MIN);
    match naive.and_local_timezone(Local) {
        LocalResult::Single(dt) => dt.timestamp_millis(),
        LocalResult::Ambiguous(dt, _) => dt.timestamp_millis(),
        LocalResult::None => naive.and_utc().timestamp_millis(),
    }
}

/// The local calendar date a timestamp falls on
pub fn local_date_of_ms(t: i64) -> NaiveDate {
    match Local.timestamp_millis_opt(t) {
        LocalResult::Single(dt) => dt.date_naive(),
        LocalResult::Ambiguous(dt, _) => dt.date_naive(),
        LocalResult::None => chrono::DateTime::from_timestamp_millis(t)
            .map(|dt| dt.date_naive())
            .unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn marker_shown_when_displayed_month_is_current() {
        let vs = derive_view_state(date(2024, 9, 15), date(2024, 9, 1), 2.0);
        assert!(vs.show_today);
        let marker = vs.marker.unwrap();
        assert_eq!(marker.t, local_midnight_ms(date(2024, 9, 15)));
        assert_eq!(
            marker.endpoints(),
            [(marker.t, 0.0), (marker.t, 2.0)]
        );
    }

    #[test]
    fn marker_on_first_day_of_current_month() {
        let vs = derive_view_state(date(2024, 9, 1), date(2024, 9, 1), 3.0);
        assert!(vs.show_today);
        let marker = vs.marker.unwrap();
        assert_eq!(marker.t, local_midnight_ms(date(2024, 9, 1)));
        assert_eq!(marker.y0, 0.0);
        assert_eq!(marker.y1, 3.0);
    }

    #[test]
    fn marker_hidden_for_other_months() {
        let vs = derive_view_state(date(2024, 8, 15), date(2024, 9, 20), 2.0);
        assert!(!vs.show_today);
        assert!(vs.marker.is_none());
    }

    #[test]
    fn marker_hidden_for_same_month_of_other_year() {
        let vs = derive_view_state(date(2023, 9, 15), date(2024, 9, 20), 2.0);
        assert!(!vs.show_today);
        assert!(vs.marker.is_none());
    }

    #[test]
    fn first_of_month_truncates() {
        assert_eq!(first_of_month(date(2024, 2, 29)), date(2024, 2, 1));
        assert_eq!(first_of_month(date(2024, 2, 1)), date(2024, 2, 1));
    }

    #[test]
    fn month_stepping_crosses_year_boundaries() {
        assert_eq!(next_month(date(2024, 12, 31)), date(2025, 1, 1));
        assert_eq!(prev_month(date(2024, 1, 15)), date(2023, 12, 1));
        assert_eq!(next_month(date(2024, 6, 1)), date(2024, 7, 1));
        assert_eq!(prev_month(date(2024, 6, 1)), date(2024, 5, 1));
    }

    #[test]
    fn days_in_month_handles_leap_years() {
        assert_eq!(days_in_month(date(2024, 2, 10)), 29);
        assert_eq!(days_in_month(date(2023, 2, 10)), 28);
        assert_eq!(days_in_month(date(2024, 9, 1)), 30);
        assert_eq!(days_in_month(date(2024, 1, 31)), 31);
    }

    #[test]
    fn month_window_ends_at_next_month_start() {
        let (start, end) = month_window(date(2024, 2, 15));
        assert_eq!(start, local_midnight_ms(date(2024, 2, 1)));
        assert_eq!(end, local_midnight_ms(date(2024, 3, 1)));
        assert!(end > start);
    }

    #[test]
    fn local_dates_round_trip_through_midnight() {
        let d = date(2024, 9, 15);
        assert_eq!(local_date_of_ms(local_midnight_ms(d)), d);
        // Any instant later the same day maps back to the same date
        assert_eq!(local_date_of_ms(local_midnight_ms(d) + 3_600_000), d);
    }
}
