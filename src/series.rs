use itertools::{EitherOrBoth, Itertools};
use ratatui::style::Color;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Legend color for the charging series
pub const CHARGING_COLOR: Color = Color::Rgb(0x53, 0xFF, 0x4D);
/// Legend color for the discharging series
pub const DISCHARGING_COLOR: Color = Color::Rgb(0x56, 0xCC, 0xF2);

/// One of the two stacked flow directions
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Flow {
    Charging,
    Discharging,
}

/// A single day-bucketed sample: timestamp (ms since epoch), cycle count,
/// energy throughput in MWh
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CyclePoint {
    pub t: i64,
    pub cycles: f64,
    pub energy_mwh: f64,
}

impl CyclePoint {
    pub fn new(t: i64, cycles: f64, energy_mwh: f64) -> Self {
        Self {
            t,
            cycles,
            energy_mwh,
        }
    }
}

impl From<(i64, f64, f64)> for CyclePoint {
    fn from(v: (i64, f64, f64)) -> Self {
        CyclePoint {
            t: v.0,
            cycles: v.1,
            energy_mwh: v.2,
        }
    }
}

/// The value part of a [`CyclePoint`], once pairing has keyed it by timestamp
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FlowSample {
    pub cycles: f64,
    pub energy_mwh: f64,
}

impl From<CyclePoint> for FlowSample {
    fn from(p: CyclePoint) -> Self {
        FlowSample {
            cycles: p.cycles,
            energy_mwh: p.energy_mwh,
        }
    }
}

/// Presentation metadata carried by a series into the paired dataset
#[derive(Debug, Clone, PartialEq)]
pub struct FlowStyle {
    pub label: String,
    pub color: Color,
    pub striped: bool,
}

/// Caller-supplied input: one flow direction's ordered samples plus how to
/// draw them. Points must be strictly ascending in `t`, one per day.
#[derive(Debug, Clone)]
pub struct CycleSeries {
    pub label: String,
    pub color: Color,
    pub striped: bool,
    pub points: Vec<CyclePoint>,
}

impl CycleSeries {
    /// Conventional charging series: solid green bars
    pub fn charging(points: Vec<CyclePoint>) -> Self {
        Self {
            label: Flow::Charging.to_string(),
            color: CHARGING_COLOR,
            striped: false,
            points,
        }
    }

    /// Conventional discharging series: striped blue bars
    pub fn discharging(points: Vec<CyclePoint>) -> Self {
        Self {
            label: Flow::Discharging.to_string(),
            color: DISCHARGING_COLOR,
            striped: true,
            points,
        }
    }

    fn style(&self) -> FlowStyle {
        FlowStyle {
            label: self.label.clone(),
            color: self.color,
            striped: self.striped,
        }
    }

    /// Strictly-ascending timestamp check, reported against `flow`
    fn check_order(&self, flow: Flow) -> Result<(), DatasetError> {
        for (index, pair) in self.points.windows(2).enumerate() {
            if pair[1].t == pair[0].t {
                return Err(DatasetError::DuplicateTimestamp { flow, t: pair[0].t });
            }
            if pair[1].t < pair[0].t {
                return Err(DatasetError::OutOfOrder {
                    flow,
                    index: index + 1,
                });
            }
        }
        Ok(())
    }
}

/// Resolution for a timestamp present in only one of the two input series
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    clap::ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum GapPolicy {
    /// Reject the dataset with a descriptive error
    #[default]
    Strict,
    /// Treat the absent side as zero cycles / zero energy
    ZeroFill,
}

/// Validation and pairing failures, raised before anything is rendered
#[derive(Debug, Error, PartialEq)]
pub enum DatasetError {
    #[error("both input series are empty")]
    Empty,
    #[error("charging and discharging series differ in length ({charging} vs {discharging})")]
    LengthMismatch { charging: usize, discharging: usize },
    #[error("{flow} series is not ascending at index {index}")]
    OutOfOrder { flow: Flow, index: usize },
    #[error("{flow} series repeats timestamp {t}")]
    DuplicateTimestamp { flow: Flow, t: i64 },
    #[error("no {missing} sample paired with timestamp {t}")]
    Unpaired { missing: Flow, t: i64 },
}

/// One paired day: both flows keyed by the same timestamp
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DayRecord {
    pub t: i64,
    pub charging: FlowSample,
    pub discharging: FlowSample,
}

impl DayRecord {
    pub fn total_cycles(&self) -> f64 {
        self.charging.cycles + self.discharging.cycles
    }
}

/// The validated, timestamp-keyed dataset the chart and the inspector read.
///
/// Replaces the two index-aligned arrays of the caller contract: after
/// [`CycleDataset::pair`] succeeds there is no positional lookup anywhere,
/// only lookup by timestamp.
#[derive(Debug, Clone)]
pub struct CycleDataset {
    records: Vec<DayRecord>,
    charging_style: FlowStyle,
    discharging_style: FlowStyle,
}

impl CycleDataset {
    /// Merge the two caller-supplied series into one record per timestamp.
    ///
    /// Both series must be strictly ascending. Under [`GapPolicy::Strict`]
    /// the series must also be the same length with position-aligned
    /// timestamps; under [`GapPolicy::ZeroFill`] a timestamp missing on one
    /// side gets a zero sample for that side.
    pub fn pair(
        charging: CycleSeries,
        discharging: CycleSeries,
        policy: GapPolicy,
    ) -> Result<Self, DatasetError> {
        if charging.points.is_empty() && discharging.points.is_empty() {
            return Err(DatasetError::Empty);
        }
        charging.check_order(Flow::Charging)?;
        discharging.check_order(Flow::Discharging)?;
        if policy == GapPolicy::Strict && charging.points.len() != discharging.points.len() {
            return Err(DatasetError::LengthMismatch {
                charging: charging.points.len(),
                discharging: discharging.points.len(),
            });
        }

        let mut records = Vec::with_capacity(charging.points.len().max(discharging.points.len()));
        for merged in charging
            .points
            .iter()
            .merge_join_by(discharging.points.iter(), |c, d| c.t.cmp(&d.t))
        {
            match merged {
                EitherOrBoth::Both(c, d) => records.push(DayRecord {
                    t: c.t,
                    charging: (*c).into(),
                    discharging: (*d).into(),
                }),
                EitherOrBoth::Left(c) => match policy {
                    GapPolicy::Strict => {
                        return Err(DatasetError::Unpaired {
                            missing: Flow::Discharging,
                            t: c.t,
                        })
                    }
                    GapPolicy::ZeroFill => records.push(DayRecord {
                        t: c.t,
                        charging: (*c).into(),
                        discharging: FlowSample::default(),
                    }),
                },
                EitherOrBoth::Right(d) => match policy {
                    GapPolicy::Strict => {
                        return Err(DatasetError::Unpaired {
                            missing: Flow::Charging,
                            t: d.t,
                        })
                    }
                    GapPolicy::ZeroFill => records.push(DayRecord {
                        t: d.t,
                        charging: FlowSample::default(),
                        discharging: (*d).into(),
                    }),
                },
            }
        }

        Ok(Self {
            records,
            charging_style: charging.style(),
            discharging_style: discharging.style(),
        })
    }

    pub fn records(&self) -> &[DayRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Exact-timestamp lookup
    pub fn record_at(&self, t: i64) -> Option<&DayRecord> {
        self.records
            .binary_search_by_key(&t, |r| r.t)
            .ok()
            .map(|i| &self.records[i])
    }

    /// Records with `start <= t < end`
    pub fn records_between(&self, start: i64, end: i64) -> &[DayRecord] {
        let lo = self.records.partition_point(|r| r.t < start);
        let hi = self.records.partition_point(|r| r.t < end);
        &self.records[lo..hi]
    }

    pub fn style(&self, flow: Flow) -> &FlowStyle {
        match flow {
            Flow::Charging => &self.charging_style,
            Flow::Discharging => &self.discharging_style,
        }
    }
}
