use std::path::Path;

use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use thiserror::Error;

use crate::series::{CyclePoint, CycleSeries};
use crate::view::{days_in_month, first_of_month, local_midnight_ms};

/// Nameplate capacity used by the demo generator to turn cycles into MWh
const DEMO_CAPACITY_MWH: f64 = 120.0;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Read { path: String, source: csv::Error },
    #[error("row {row}: {source}")]
    Row { row: usize, source: csv::Error },
    #[error("row {row}: bad date {value:?} (expected YYYY-MM-DD)")]
    BadDate { row: usize, value: String },
}

/// Expected CSV shape, one row per day:
/// `date,charging_cycles,charging_energy_mwh,discharging_cycles,discharging_energy_mwh`
#[derive(Debug, Deserialize)]
struct CsvRow {
    date: String,
    charging_cycles: f64,
    charging_energy_mwh: f64,
    discharging_cycles: f64,
    discharging_energy_mwh: f64,
}

/// Read a daily-cycles CSV into the two conventional input series.
///
/// Rows are bucketed to local midnight of their `date` column. Ordering and
/// pairing are not checked here; `CycleDataset::pair` owns that validation.
pub fn load_csv(path: &Path) -> Result<(CycleSeries, CycleSeries), LoadError> {
    let mut reader = csv::Reader::from_path(path).map_err(|source| LoadError::Read {
        path: path.display().to_string(),
        source,
    })?;

    let mut charging = Vec::new();
    let mut discharging = Vec::new();
    for (i, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = i + 2; // 1-based, header on line 1
        let rec = result.map_err(|source| LoadError::Row { row, source })?;
        let date = NaiveDate::parse_from_str(&rec.date, "%Y-%m-%d").map_err(|_| {
            LoadError::BadDate {
                row,
                value: rec.date.clone(),
            }
        })?;
        let t = local_midnight_ms(date);
        charging.push(CyclePoint::new(t, rec.charging_cycles, rec.charging_energy_mwh));
        discharging.push(CyclePoint::new(
            t,
            rec.discharging_cycles,
            rec.discharging_energy_mwh,
        ));
    }

    Ok((
        CycleSeries::charging(charging),
        CycleSeries::discharging(discharging),
    ))
}

/// Generate one plausible month of cycling for demo/testing: a bit under one
/// full cycle per day each way, with the occasional idle day. A fixed `seed`
/// reproduces the same month exactly.
pub fn demo_month(month: NaiveDate, seed: Option<u64>) -> (CycleSeries, CycleSeries) {
    let mut rng = match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };

    let first = first_of_month(month);
    let days = days_in_month(first);
    let mut charging = Vec::with_capacity(days as usize);
    let mut discharging = Vec::with_capacity(days as usize);

    for offset in 0..days {
        let t = local_midnight_ms(first + Duration::days(offset as i64));
        let idle = rng.gen_ratio(1, 12);
        let (c, d) = if idle {
            (0.0, 0.0)
        } else {
            let c: f64 = rng.gen_range(0.4..1.6);
            let d = (c * rng.gen_range(0.75..1.05)).min(1.6);
            (c, d)
        };
        charging.push(CyclePoint::new(t, c, c * DEMO_CAPACITY_MWH));
        discharging.push(CyclePoint::new(
            t,
            d,
            d * DEMO_CAPACITY_MWH * rng.gen_range(0.92..0.99),
        ));
    }

    (
        CycleSeries::charging(charging),
        CycleSeries::discharging(discharging),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::{CycleDataset, GapPolicy};
    use crate::view::month_window;
    use assert_matches::assert_matches;
    use std::io::Write;

    fn write_csv(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn loads_well_formed_csv() {
        let file = write_csv(
            "date,charging_cycles,charging_energy_mwh,discharging_cycles,discharging_energy_mwh\n\
             2024-09-01,1.0,120.0,0.9,110.0\n\
             2024-09-02,0.8,96.0,1.1,130.0\n",
        );

        let (charging, discharging) = load_csv(file.path()).unwrap();
        assert_eq!(charging.points.len(), 2);
        assert_eq!(discharging.points.len(), 2);
        assert_eq!(charging.points[0].cycles, 1.0);
        assert_eq!(discharging.points[1].energy_mwh, 130.0);

        let date = NaiveDate::from_ymd_opt(2024, 9, 1).unwrap();
        assert_eq!(charging.points[0].t, local_midnight_ms(date));

        // The loaded pair passes strict validation as-is
        CycleDataset::pair(charging, discharging, GapPolicy::Strict).unwrap();
    }

    #[test]
    fn bad_date_reports_the_row() {
        let file = write_csv(
            "date,charging_cycles,charging_energy_mwh,discharging_cycles,discharging_energy_mwh\n\
             2024-09-01,1.0,120.0,0.9,110.0\n\
             01/09/2024,0.8,96.0,1.1,130.0\n",
        );

        let err = load_csv(file.path()).unwrap_err();
        assert_matches!(err, LoadError::BadDate { row: 3, .. });
        assert!(err.to_string().contains("01/09/2024"));
    }

    #[test]
    fn malformed_row_is_a_row_error() {
        let file = write_csv(
            "date,charging_cycles,charging_energy_mwh,discharging_cycles,discharging_energy_mwh\n\
             2024-09-01,not-a-number,120.0,0.9,110.0\n",
        );

        let err = load_csv(file.path()).unwrap_err();
        assert_matches!(err, LoadError::Row { row: 2, .. });
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = load_csv(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert_matches!(err, LoadError::Read { .. });
    }

    #[test]
    fn demo_month_covers_every_day_once() {
        let month = NaiveDate::from_ymd_opt(2024, 2, 1).unwrap();
        let (charging, discharging) = demo_month(month, Some(7));

        assert_eq!(charging.points.len(), 29); // 2024 is a leap year
        assert_eq!(discharging.points.len(), 29);

        let (start, end) = month_window(month);
        for p in &charging.points {
            assert!(p.t >= start && p.t < end);
        }

        // Strict pairing must always hold for generated data
        CycleDataset::pair(charging, discharging, GapPolicy::Strict).unwrap();
    }

    #[test]
    fn demo_month_values_stay_in_plant_limits() {
        let month = NaiveDate::from_ymd_opt(2024, 9, 1).unwrap();
        let (charging, discharging) = demo_month(month, Some(42));

        for p in charging.points.iter().chain(discharging.points.iter()) {
            assert!((0.0..=1.6).contains(&p.cycles), "cycles {}", p.cycles);
            assert!(p.energy_mwh >= 0.0);
            assert!(p.energy_mwh <= 1.6 * DEMO_CAPACITY_MWH);
        }
    }

    #[test]
    fn demo_month_is_deterministic_for_a_seed() {
        let month = NaiveDate::from_ymd_opt(2024, 9, 1).unwrap();
        let (a_charging, a_discharging) = demo_month(month, Some(99));
        let (b_charging, b_discharging) = demo_month(month, Some(99));

        assert_eq!(a_charging.points, b_charging.points);
        assert_eq!(a_discharging.points, b_discharging.points);
    }
}
