//! Binned daily return distribution and summary, per lookback range.

use super::ReportContext;
use cyclelab_core::analytics::distribution::{
    BandCounts, DistributionBinner, DistributionSummary, Histogram,
};
use cyclelab_core::analytics::{AnalyticsError, LookbackRange, ReturnCalculator};
use cyclelab_core::domain::series::valid_values;
use rayon::prelude::*;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct DistributionRange {
    pub range: LookbackRange,
    pub histogram: Histogram,
    pub summary: DistributionSummary,
    pub bands: BandCounts,
}

#[derive(Debug, Clone, Serialize)]
pub struct DistributionReport {
    pub column: String,
    pub ranges: Vec<DistributionRange>,
}

pub fn build(ctx: &ReportContext<'_>) -> Result<DistributionReport, AnalyticsError> {
    let prices = ctx.prices(ctx.target())?;
    let returns = ReturnCalculator::daily_return(&prices);
    let binner = DistributionBinner::default();

    let mut years_back = ctx.config.lookback_years.clone();
    years_back.extend(&ctx.config.distribution_extra_years);

    let ranges = ctx
        .ranges_with(&prices, &years_back)
        .into_par_iter()
        .map(|range| {
            let values = valid_values(&range.slice(&returns));
            let summary = DistributionSummary::from_returns(&values);
            DistributionRange {
                histogram: binner.bucket(&values),
                bands: BandCounts::tally(&values, &summary),
                summary,
                range,
            }
        })
        .collect();

    Ok(DistributionReport {
        column: ctx.target().to_string(),
        ranges,
    })
}
