use ratatui::style::Color;
use thiserror::Error;

use crate::series::{CycleDataset, DayRecord, Flow};
use crate::view::local_date_of_ms;

/// Fixed unit suffix for energy rows
pub const ENERGY_UNIT: &str = "MWH";

#[derive(Debug, Error, PartialEq)]
pub enum TooltipError {
    #[error("no data recorded for timestamp {t}")]
    NoData { t: i64 },
}

/// One labeled line of the inspector panel. `legend` carries the series
/// color when the row gets a swatch (cycle rows do, energy rows don't).
#[derive(Debug, Clone, PartialEq)]
pub struct TooltipRow {
    pub label: String,
    pub value: String,
    pub legend: Option<Color>,
}

/// The resolved payload: formatted date title, device subtitle, four rows
#[derive(Debug, Clone, PartialEq)]
pub struct TooltipContent {
    pub title: String,
    pub subtitle: String,
    pub rows: Vec<TooltipRow>,
}

/// Look up the record at exactly `t` and format the four display rows.
/// A timestamp with no record is an explicit [`TooltipError::NoData`],
/// never a lookup panic.
pub fn resolve_tooltip(
    dataset: &CycleDataset,
    t: i64,
    device: &str,
) -> Result<TooltipContent, TooltipError> {
    let record = dataset.record_at(t).ok_or(TooltipError::NoData { t })?;
    Ok(content_for(record, dataset, device))
}

fn content_for(record: &DayRecord, dataset: &CycleDataset, device: &str) -> TooltipContent {
    let (charging_share, discharging_share) =
        percentage_split(record.charging.cycles, record.discharging.cycles);

    let rows = vec![
        TooltipRow {
            label: format!("{} Cycles", Flow::Charging),
            value: cycles_with_share(record.charging.cycles, charging_share),
            legend: Some(dataset.style(Flow::Charging).color),
        },
        TooltipRow {
            label: format!("{} Energy", Flow::Charging),
            value: format_energy(record.charging.energy_mwh),
            legend: None,
        },
        TooltipRow {
            label: format!("{} Cycles", Flow::Discharging),
            value: cycles_with_share(record.discharging.cycles, discharging_share),
            legend: Some(dataset.style(Flow::Discharging).color),
        },
        TooltipRow {
            label: format!("{} Energy", Flow::Discharging),
            value: format_energy(record.discharging.energy_mwh),
            legend: None,
        },
    ];

    TooltipContent {
        title: format_title(record.t),
        subtitle: device.to_string(),
        rows,
    }
}

/// Percentage shares of the two flows. A non-positive total reports
/// `(0, 0)` instead of dividing by zero.
pub fn percentage_split(charging: f64, discharging: f64) -> (f64, f64) {
    let total = charging + discharging;
    if total <= 0.0 {
        return (0.0, 0.0);
    }
    (charging * 100.0 / total, discharging * 100.0 / total)
}

/// Cycle rows render as `"{cycles:.1} | {share:.0}%"`
pub fn cycles_with_share(cycles: f64, share: f64) -> String {
    format!("{cycles:.1} | {share:.0}%")
}

pub fn format_energy(mwh: f64) -> String {
    format!("{mwh:.2} {ENERGY_UNIT}")
}

/// Zero-padded day, full month name, year: `05 September 2024`
pub fn format_title(t: i64) -> String {
    local_date_of_ms(t).format("%d %B %Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::{CyclePoint, CycleSeries, GapPolicy, CHARGING_COLOR, DISCHARGING_COLOR};
    use crate::view::local_midnight_ms;
    use assert_matches::assert_matches;
    use chrono::NaiveDate;

    fn dataset_with(charging: f64, discharging: f64, t: i64) -> CycleDataset {
        CycleDataset::pair(
            CycleSeries::charging(vec![CyclePoint::new(t, charging, charging * 120.0)]),
            CycleSeries::discharging(vec![CyclePoint::new(t, discharging, discharging * 118.0)]),
            GapPolicy::Strict,
        )
        .unwrap()
    }

    fn day(y: i32, m: u32, d: u32) -> i64 {
        local_midnight_ms(NaiveDate::from_ymd_opt(y, m, d).unwrap())
    }

    #[test]
    fn resolves_matching_record() {
        let t = day(2024, 9, 5);
        let ds = dataset_with(3.0, 1.0, t);

        let tip = resolve_tooltip(&ds, t, "BESS-01").unwrap();
        assert_eq!(tip.title, "05 September 2024");
        assert_eq!(tip.subtitle, "BESS-01");
        assert_eq!(tip.rows.len(), 4);
        assert_eq!(tip.rows[0].label, "Charging Cycles");
        assert_eq!(tip.rows[0].value, "3.0 | 75%");
        assert_eq!(tip.rows[2].label, "Discharging Cycles");
        assert_eq!(tip.rows[2].value, "1.0 | 25%");
    }

    #[test]
    fn cycle_rows_carry_legend_swatches_energy_rows_do_not() {
        let t = day(2024, 9, 5);
        let ds = dataset_with(3.0, 1.0, t);

        let tip = resolve_tooltip(&ds, t, "BESS-01").unwrap();
        assert_eq!(tip.rows[0].legend, Some(CHARGING_COLOR));
        assert_eq!(tip.rows[1].legend, None);
        assert_eq!(tip.rows[2].legend, Some(DISCHARGING_COLOR));
        assert_eq!(tip.rows[3].legend, None);
    }

    #[test]
    fn energy_rows_use_two_decimals_and_unit() {
        let t = day(2024, 9, 5);
        let ds = dataset_with(3.0, 1.0, t);

        let tip = resolve_tooltip(&ds, t, "BESS-01").unwrap();
        assert_eq!(tip.rows[1].label, "Charging Energy");
        assert_eq!(tip.rows[1].value, "360.00 MWH");
        assert_eq!(tip.rows[3].value, "118.00 MWH");
    }

    #[test]
    fn unknown_timestamp_is_no_data_not_a_panic() {
        let t = day(2024, 9, 5);
        let ds = dataset_with(3.0, 1.0, t);

        let err = resolve_tooltip(&ds, t + 1, "BESS-01").unwrap_err();
        assert_matches!(err, TooltipError::NoData { .. });
        assert!(err.to_string().contains("no data"));
    }

    #[test]
    fn zero_total_reports_zero_percent() {
        let t = day(2024, 9, 5);
        let ds = dataset_with(0.0, 0.0, t);

        let tip = resolve_tooltip(&ds, t, "BESS-01").unwrap();
        assert_eq!(tip.rows[0].value, "0.0 | 0%");
        assert_eq!(tip.rows[2].value, "0.0 | 0%");
    }

    #[test]
    fn shares_sum_to_hundred_within_rounding() {
        for (c, d) in [(3.0, 1.0), (1.0, 2.0), (0.7, 0.3), (1.234, 5.678)] {
            let (cs, ds) = percentage_split(c, d);
            assert!((cs + ds - 100.0).abs() < 1e-9);
            let rounded: i64 = format!("{cs:.0}").parse::<i64>().unwrap()
                + format!("{ds:.0}").parse::<i64>().unwrap();
            assert!((99..=101).contains(&rounded), "rounded sum was {rounded}");
        }
    }

    #[test]
    fn cycle_value_formatting_rounds_to_one_decimal() {
        assert_eq!(cycles_with_share(1.25, 50.0), "1.2 | 50%");
        assert_eq!(cycles_with_share(0.96, 33.333), "1.0 | 33%");
    }

    #[test]
    fn title_is_zero_padded_day_full_month_year() {
        assert_eq!(format_title(day(2024, 9, 5)), "05 September 2024");
        assert_eq!(format_title(day(2024, 12, 25)), "25 December 2024");
    }
}
