//! Filter and result types of the analytical queries.
//!
//! Results serialize in camelCase, the shape the dashboard frontend reads.

use serde::{Deserialize, Serialize};

/// Coverage percentage a country must reach to count as meeting the target.
pub const HIGH_COVERAGE_THRESHOLD: f64 = 90.0;

/// Number of rows returned by the improvement ranking when no limit is given.
pub const DEFAULT_IMPROVEMENT_LIMIT: u32 = 10;

// =============================================================================
// Filter Options
// =============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AntigenOption {
    pub id: String,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CountryOption {
    pub id: String,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EconomicPhaseOption {
    pub id: i64,
    pub phase: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InfectionTypeOption {
    pub id: String,
    pub description: String,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    /// Distinct vaccination years, newest first.
    pub years: Vec<i64>,
    pub antigens: Vec<AntigenOption>,
    /// Distinct region labels, alphabetical.
    pub regions: Vec<String>,
    /// Countries sorted by name.
    pub countries: Vec<CountryOption>,
    pub economic_phases: Vec<EconomicPhaseOption>,
    pub infection_types: Vec<InfectionTypeOption>,
}

// =============================================================================
// High Coverage
// =============================================================================

#[derive(Clone, Debug, PartialEq)]
pub struct HighCoverageFilter {
    pub year: i64,
    pub antigen_id: String,
    pub country_id: Option<String>,
    /// Region label, regions have no separate id.
    pub region: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighCoverageRow {
    pub antigen: String,
    pub year: i64,
    pub country_name: String,
    pub region: String,
    pub percentage: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionCoverageSummary {
    pub antigen: String,
    pub year: i64,
    pub region: String,
    pub countries_meeting_target: i64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighCoverageReport {
    pub rows: Vec<HighCoverageRow>,
    pub region_summary: Vec<RegionCoverageSummary>,
}

// =============================================================================
// Infection By Economic Phase
// =============================================================================

#[derive(Clone, Debug, PartialEq)]
pub struct InfectionByPhaseFilter {
    pub economic_phase_id: i64,
    pub infection_type_id: String,
    pub year: i64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerCapitaInfectionRow {
    pub disease: String,
    pub country_name: String,
    pub economic_phase: String,
    pub year: i64,
    pub cases_per_100k: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseInfectionTotal {
    pub disease: String,
    pub economic_phase: String,
    pub year: i64,
    pub total_cases: i64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfectionByPhaseReport {
    /// Countries of the requested phase only.
    pub per_capita: Vec<PerCapitaInfectionRow>,
    /// Every phase, grouped. Not narrowed by the requested phase.
    pub by_phase: Vec<PhaseInfectionTotal>,
}

// =============================================================================
// Vaccination Improvement
// =============================================================================

#[derive(Clone, Debug, PartialEq)]
pub struct ImprovementFilter {
    pub start_year: i64,
    pub end_year: i64,
    pub antigen_id: String,
    pub limit: u32,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImprovementRow {
    pub country_name: String,
    pub rate_increase: f64,
}

// =============================================================================
// Above Global Average
// =============================================================================

#[derive(Clone, Debug, PartialEq)]
pub struct AboveAverageFilter {
    pub year: i64,
    pub infection_type_id: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AboveAverageRow {
    pub country_name: String,
    pub infection: String,
    pub infection_rate: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AboveAverageReport {
    pub global_average: f64,
    pub countries: Vec<AboveAverageRow>,
}

// =============================================================================
// Dataset Counts
// =============================================================================

/// Row counts per table, used for metrics and startup logging.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatasetCounts {
    pub countries: usize,
    pub antigens: usize,
    pub infection_types: usize,
    pub vaccination_rows: usize,
    pub infection_rows: usize,
    pub population_rows: usize,
}
