//! Approximate landing-page totals.
//!
//! Doses and cases are summed over a sample of the first rows of each fact
//! table and scaled up by the sampled share. Counts and the year range are
//! exact. The result is labelled approximate and is not meant for analysis.

use anyhow::{Context, Result};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};

pub const DEFAULT_SAMPLE_ROWS: usize = 1000;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproximateOverview {
    pub approximate: bool,
    pub sample_rows: usize,
    pub estimated_total_doses: i64,
    pub estimated_total_cases: i64,
    pub countries_count: usize,
    pub diseases_count: usize,
    pub first_year: Option<i64>,
    pub last_year: Option<i64>,
}

struct Sample {
    sum: i64,
    sampled: usize,
    total: usize,
}

/// Scales a sampled sum to the whole table.
fn extrapolate(sample: &Sample) -> i64 {
    if sample.sampled == 0 {
        return 0;
    }
    (sample.sum as f64 * sample.total as f64 / sample.sampled as f64).round() as i64
}

// `table` and `column` are compile-time names, never caller input.
fn sample_column(
    conn: &Connection,
    table: &str,
    column: &str,
    sample_rows: usize,
) -> Result<Sample> {
    let (sum, sampled): (i64, i64) = conn
        .query_row(
            &format!(
                "SELECT COALESCE(SUM(CAST({column} AS INTEGER)), 0), COUNT(*)
                 FROM (SELECT {column} FROM {table} ORDER BY ROWID LIMIT ?1)"
            ),
            params![sample_rows as i64],
            |r| Ok((r.get(0)?, r.get(1)?)),
        )
        .with_context(|| format!("Failed to sample {}.{}", table, column))?;
    let total: i64 = conn
        .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))
        .with_context(|| format!("Failed to count rows of {}", table))?;

    Ok(Sample {
        sum,
        sampled: sampled as usize,
        total: total as usize,
    })
}

pub fn build_overview(conn: &Connection, sample_rows: usize) -> Result<ApproximateOverview> {
    let doses = sample_column(conn, "Vaccination", "doses", sample_rows)?;
    let cases = sample_column(conn, "InfectionData", "cases", sample_rows)?;

    let countries_count: i64 =
        conn.query_row("SELECT COUNT(*) FROM Country", [], |r| r.get(0))?;
    let diseases_count: i64 =
        conn.query_row("SELECT COUNT(*) FROM Infection_Type", [], |r| r.get(0))?;
    let (first_year, last_year): (Option<i64>, Option<i64>) = conn
        .query_row("SELECT MIN(year), MAX(year) FROM Vaccination", [], |r| {
            Ok((r.get(0)?, r.get(1)?))
        })
        .context("Failed to read vaccination year range")?;

    Ok(ApproximateOverview {
        approximate: true,
        sample_rows,
        estimated_total_doses: extrapolate(&doses),
        estimated_total_cases: extrapolate(&cases),
        countries_count: countries_count as usize,
        diseases_count: diseases_count as usize,
        first_year,
        last_year,
    })
}
