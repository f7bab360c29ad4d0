//! Return distributions: fixed buckets, summary statistics, quantile bands.

use super::AnalyticsError;
use serde::{Deserialize, Serialize};

/// Default bucket edges, in percent.
pub const STANDARD_BOUNDARIES: [f64; 13] = [
    -3.0, -2.0, -1.5, -1.0, -0.75, -0.5, 0.0, 0.5, 0.75, 1.0, 1.5, 2.0, 3.0,
];

/// One interval of a [`BucketScheme`]. `None` bounds are open-ended tails.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    pub label: String,
    pub lower: Option<f64>,
    pub upper: Option<f64>,
    pub lower_closed: bool,
    pub upper_closed: bool,
}

impl Bucket {
    pub fn contains(&self, r: f64) -> bool {
        let above = match self.lower {
            None => true,
            Some(lo) if self.lower_closed => r >= lo,
            Some(lo) => r > lo,
        };
        let below = match self.upper {
            None => true,
            Some(hi) if self.upper_closed => r <= hi,
            Some(hi) => r < hi,
        };
        above && below
    }
}

/// Ordered partition of the real line.
///
/// Below zero every bucket is `[lo, hi)`. The bucket starting at zero is
/// closed on both ends, `[0, first positive edge]`, and every bucket above it
/// is `(lo, hi]`. Each real number therefore lands in exactly one bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct BucketScheme {
    boundaries: Vec<f64>,
    zero_index: usize,
    buckets: Vec<Bucket>,
}

impl BucketScheme {
    /// Edges must be finite, strictly ascending, include `0.0`, and have at
    /// least one edge above zero.
    pub fn new(boundaries: Vec<f64>) -> Result<Self, AnalyticsError> {
        if boundaries.iter().any(|b| !b.is_finite()) {
            return Err(AnalyticsError::InvalidBuckets("non-finite edge".into()));
        }
        if boundaries.windows(2).any(|w| w[0] >= w[1]) {
            return Err(AnalyticsError::InvalidBuckets(
                "edges must be strictly ascending".into(),
            ));
        }
        let zero_index = boundaries
            .iter()
            .position(|b| *b == 0.0)
            .ok_or_else(|| AnalyticsError::InvalidBuckets("edges must include 0".into()))?;
        if zero_index + 1 >= boundaries.len() {
            return Err(AnalyticsError::InvalidBuckets(
                "need at least one edge above 0".into(),
            ));
        }
        let buckets = build_buckets(&boundaries, zero_index);
        Ok(Self {
            boundaries,
            zero_index,
            buckets,
        })
    }

    pub fn standard() -> Self {
        let boundaries = STANDARD_BOUNDARIES.to_vec();
        let zero_index = 6;
        let buckets = build_buckets(&boundaries, zero_index);
        Self {
            boundaries,
            zero_index,
            buckets,
        }
    }

    pub fn buckets(&self) -> &[Bucket] {
        &self.buckets
    }

    /// Bucket index for `r`; `None` for NaN or infinities.
    pub fn index_of(&self, r: f64) -> Option<usize> {
        if !r.is_finite() {
            return None;
        }
        if r < 0.0 {
            Some(self.boundaries.iter().take_while(|b| **b <= r).count())
        } else {
            let above = self.boundaries.iter().take_while(|b| **b < r).count();
            Some(above.max(self.zero_index + 1))
        }
    }
}

impl Default for BucketScheme {
    fn default() -> Self {
        Self::standard()
    }
}

fn build_buckets(boundaries: &[f64], zero_index: usize) -> Vec<Bucket> {
    let mut buckets = Vec::with_capacity(boundaries.len() + 1);
    buckets.push(Bucket {
        label: format!("< {:.2}%", boundaries[0]),
        lower: None,
        upper: Some(boundaries[0]),
        lower_closed: false,
        upper_closed: false,
    });
    for (i, w) in boundaries.windows(2).enumerate() {
        let (lo, hi) = (w[0], w[1]);
        let negative_side = i < zero_index;
        buckets.push(Bucket {
            label: format!("{lo:.2}% to {hi:.2}%"),
            lower: Some(lo),
            upper: Some(hi),
            lower_closed: negative_side || i == zero_index,
            upper_closed: !negative_side,
        });
    }
    let last = boundaries[boundaries.len() - 1];
    buckets.push(Bucket {
        label: format!("> {last:.2}%"),
        lower: Some(last),
        upper: None,
        lower_closed: false,
        upper_closed: false,
    });
    buckets
}

/// Count (and share) of observations in one bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketCount {
    pub label: String,
    pub count: usize,
    /// Share of `Histogram::total`, in percent; missing when total is zero.
    pub percent: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Histogram {
    pub buckets: Vec<BucketCount>,
    /// Finite observations counted.
    pub total: usize,
    /// Non-finite observations left out.
    pub excluded: usize,
}

/// Assigns returns to the buckets of a [`BucketScheme`].
#[derive(Debug, Clone, Default)]
pub struct DistributionBinner {
    scheme: BucketScheme,
}

impl DistributionBinner {
    pub fn new(scheme: BucketScheme) -> Self {
        Self { scheme }
    }

    pub fn scheme(&self) -> &BucketScheme {
        &self.scheme
    }

    pub fn bucket(&self, returns: &[f64]) -> Histogram {
        let mut counts = vec![0usize; self.scheme.buckets.len()];
        let mut excluded = 0;
        for r in returns {
            match self.scheme.index_of(*r) {
                Some(i) => counts[i] += 1,
                None => excluded += 1,
            }
        }
        let total: usize = counts.iter().sum();
        let buckets = self
            .scheme
            .buckets
            .iter()
            .zip(counts)
            .map(|(b, count)| BucketCount {
                label: b.label.clone(),
                count,
                percent: (total > 0).then(|| count as f64 / total as f64 * 100.0),
            })
            .collect();
        Histogram {
            buckets,
            total,
            excluded,
        }
    }
}

/// Location and spread of a set of returns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionSummary {
    pub count: usize,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    /// Sample standard deviation (n - 1 denominator).
    pub std_dev: Option<f64>,
    pub p12_5: Option<f64>,
    pub p25: Option<f64>,
    pub p75: Option<f64>,
    pub p87_5: Option<f64>,
}

impl DistributionSummary {
    pub fn from_returns(returns: &[f64]) -> Self {
        let mut sorted: Vec<f64> = returns.iter().copied().filter(|r| r.is_finite()).collect();
        sorted.sort_by(f64::total_cmp);
        let n = sorted.len();

        let mean = crate::domain::series::mean(&sorted);
        let std_dev = match mean {
            Some(m) if n > 1 => {
                let ss: f64 = sorted.iter().map(|r| (r - m).powi(2)).sum();
                Some((ss / (n - 1) as f64).sqrt())
            }
            _ => None,
        };

        Self {
            count: n,
            mean,
            median: quantile(&sorted, 0.5),
            std_dev,
            p12_5: quantile(&sorted, 0.125),
            p25: quantile(&sorted, 0.25),
            p75: quantile(&sorted, 0.75),
            p87_5: quantile(&sorted, 0.875),
        }
    }
}

/// Linear-interpolated quantile of an ascending slice.
pub fn quantile(sorted: &[f64], q: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64))
}

/// Where a return sits relative to the central quantile ranges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Band {
    /// Within `[p25, p75]`.
    Inner50,
    /// Within `[p12.5, p25)` or `(p75, p87.5]`.
    Inner75,
    Tail,
}

impl Band {
    pub fn classify(r: f64, summary: &DistributionSummary) -> Option<Band> {
        let (p12, p25, p75, p87) = (summary.p12_5?, summary.p25?, summary.p75?, summary.p87_5?);
        if r >= p25 && r <= p75 {
            Some(Band::Inner50)
        } else if (r >= p12 && r < p25) || (r > p75 && r <= p87) {
            Some(Band::Inner75)
        } else {
            Some(Band::Tail)
        }
    }
}

/// How many returns fall in each [`Band`] of a summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BandCounts {
    pub inner50: usize,
    pub inner75: usize,
    pub tail: usize,
}

impl BandCounts {
    /// Non-finite values are skipped, as are all values when the summary
    /// has no quantiles.
    pub fn tally(returns: &[f64], summary: &DistributionSummary) -> Self {
        let mut counts = BandCounts::default();
        for &r in returns.iter().filter(|r| r.is_finite()) {
            match Band::classify(r, summary) {
                Some(Band::Inner50) => counts.inner50 += 1,
                Some(Band::Inner75) => counts.inner75 += 1,
                Some(Band::Tail) => counts.tail += 1,
                None => {}
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.inner50 + self.inner75 + self.tail
    }
}
