/// Linear domain-to-range projection, d3-scale style, mapping cycle counts
/// to chart rows.
///
/// The domain is `(low, high)`. Projection clamps to the range instead of
/// extrapolating, so a value above `high` lands on the range edge rather
/// than overdrawing the plot. A degenerate domain (`high <= low`) projects
/// everything to the range start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    d0: f64,
    d1: f64,
    r0: f64,
    r1: f64,
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self {
            d0: domain.0,
            d1: domain.1,
            r0: range.0,
            r1: range.1,
        }
    }

    pub fn project(&self, v: f64) -> f64 {
        if self.d1 <= self.d0 {
            return self.r0;
        }
        let frac = ((v - self.d0) / (self.d1 - self.d0)).clamp(0.0, 1.0);
        self.r0 + frac * (self.r1 - self.r0)
    }

    /// `count + 1` evenly spaced domain values, both endpoints included.
    /// `count` is the number of intervals, matching the chart's grid lines.
    pub fn ticks(&self, count: u16) -> Vec<f64> {
        let count = count.max(1) as usize;
        let step = (self.d1 - self.d0) / count as f64;
        (0..=count).map(|i| self.d0 + step * i as f64).collect()
    }
}
