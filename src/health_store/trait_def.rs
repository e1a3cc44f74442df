//! HealthStatsStore trait definition.

use super::models::*;
use crate::overview::ApproximateOverview;
use anyhow::Result;

/// Read-only analytical queries over the WHO statistics database.
///
/// Every method is a pure function of its filter and the store contents.
/// Filter values that match nothing produce empty results, only execution
/// failures produce errors.
pub trait HealthStatsStore: Send + Sync {
    /// Distinct legal values of every filterable dimension.
    fn list_filter_options(&self) -> Result<FilterOptions>;

    /// Countries at or above [`HIGH_COVERAGE_THRESHOLD`] for an antigen and
    /// year, plus the number of such countries per region.
    fn high_coverage(&self, filter: &HighCoverageFilter) -> Result<HighCoverageReport>;

    /// Cases per 100k for the countries of one economic phase, and total
    /// cases of every phase for the same infection type and year.
    fn infection_by_phase(&self, filter: &InfectionByPhaseFilter)
        -> Result<InfectionByPhaseReport>;

    /// Countries with the largest increase of doses per 100 population
    /// between two years.
    ///
    /// Best effort: a failing query is logged and yields an empty list.
    /// Unlike the other reports this never surfaces an error, callers
    /// cannot tell "no improvement" from "query failed".
    fn top_improvement(&self, filter: &ImprovementFilter) -> Vec<ImprovementRow>;

    /// The pooled global infection rate and the countries exceeding it.
    fn above_global_average(&self, filter: &AboveAverageFilter) -> Result<AboveAverageReport>;

    fn dataset_counts(&self) -> Result<DatasetCounts>;

    /// Sampled totals for a landing page. See [`crate::overview`].
    fn approximate_overview(&self, sample_rows: usize) -> Result<ApproximateOverview>;
}
