//! SQLite-backed implementation of the analytical query service.
//!
//! The database is opened read-only; the store never writes to it.

use super::errors::StoreOpenError;
use super::models::*;
use super::predicates::Predicates;
use super::schema::validate_health_schema;
use super::trait_def::HealthStatsStore;
use crate::overview::{build_overview, ApproximateOverview};
use anyhow::{anyhow, Context, Result};
use rusqlite::{params, params_from_iter, Connection};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tracing::{debug, error, info};

/// Read-only handle over the WHO statistics database.
///
/// Holds a small round-robin pool of connections so concurrent requests do
/// not serialize on a single SQLite handle.
#[derive(Clone)]
pub struct SqliteHealthStore {
    read_pool: Vec<Arc<Mutex<Connection>>>,
    read_index: Arc<AtomicUsize>,
    db_path: PathBuf,
}

fn open_read_conn(db_path: &Path) -> rusqlite::Result<Connection> {
    Connection::open_with_flags(
        db_path,
        rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY
            | rusqlite::OpenFlags::SQLITE_OPEN_URI
            | rusqlite::OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
}

fn count_rows(conn: &Connection, table: &str) -> Result<usize> {
    let count: i64 = conn
        .query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |r| r.get(0))
        .with_context(|| format!("Failed to count rows of {}", table))?;
    Ok(count as usize)
}

impl SqliteHealthStore {
    /// Opens the statistics database at `db_path` with `read_pool_size`
    /// read-only connections.
    pub fn open<P: AsRef<Path>>(db_path: P, read_pool_size: usize) -> Result<Self, StoreOpenError> {
        let db_path = db_path.as_ref();
        if !db_path.exists() {
            return Err(StoreOpenError::NotFound(db_path.to_path_buf()));
        }
        if read_pool_size == 0 {
            return Err(StoreOpenError::EmptyReadPool);
        }

        let first_conn = open_read_conn(db_path)?;

        #[cfg(not(feature = "no_checks"))]
        validate_health_schema(&first_conn).map_err(StoreOpenError::Schema)?;

        match Self::dataset_counts_inner(&first_conn) {
            Ok(counts) => info!(
                "Opened statistics database: {} countries, {} antigens, {} infection types, {} vaccination rows, {} infection rows",
                counts.countries,
                counts.antigens,
                counts.infection_types,
                counts.vaccination_rows,
                counts.infection_rows
            ),
            Err(err) => debug!("Could not count statistics rows: {:#}", err),
        }

        let mut read_pool = Vec::with_capacity(read_pool_size);
        read_pool.push(Arc::new(Mutex::new(first_conn)));
        for _ in 1..read_pool_size {
            read_pool.push(Arc::new(Mutex::new(open_read_conn(db_path)?)));
        }

        Ok(SqliteHealthStore {
            read_pool,
            read_index: Arc::new(AtomicUsize::new(0)),
            db_path: db_path.to_path_buf(),
        })
    }

    /// Closes every pooled connection this handle owns exclusively.
    ///
    /// Connections still shared with clones of the handle are released when
    /// the last clone is dropped.
    pub fn close(self) -> Result<()> {
        let db_path = self.db_path;
        for read_conn in self.read_pool {
            match Arc::try_unwrap(read_conn) {
                Ok(mutex) => {
                    let conn = mutex
                        .into_inner()
                        .map_err(|_| anyhow!("statistics read connection poisoned"))?;
                    conn.close()
                        .map_err(|(_, err)| err)
                        .with_context(|| format!("Failed to close {:?}", db_path))?;
                }
                Err(_) => debug!("Read connection still shared, released on last drop"),
            }
        }
        info!("Closed statistics database {:?}", db_path);
        Ok(())
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    fn with_read_conn<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let index = self.read_index.fetch_add(1, Ordering::SeqCst) % self.read_pool.len();
        let conn = self.read_pool[index]
            .lock()
            .map_err(|_| anyhow!("statistics read connection poisoned"))?;
        f(&conn)
    }

    // =========================================================================
    // Query Implementations
    // =========================================================================

    fn filter_options_inner(conn: &Connection) -> Result<FilterOptions> {
        let years = conn
            .prepare_cached("SELECT DISTINCT year FROM Vaccination ORDER BY year DESC")?
            .query_map([], |r| r.get(0))?
            .collect::<Result<Vec<i64>, _>>()?;

        let antigens = conn
            .prepare_cached("SELECT DISTINCT AntigenID, name FROM Antigen ORDER BY AntigenID")?
            .query_map([], |r| {
                Ok(AntigenOption {
                    id: r.get(0)?,
                    name: r.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let regions = conn
            .prepare_cached(
                "SELECT DISTINCT region FROM Country WHERE region IS NOT NULL ORDER BY region",
            )?
            .query_map([], |r| r.get(0))?
            .collect::<Result<Vec<String>, _>>()?;

        let countries = conn
            .prepare_cached("SELECT DISTINCT CountryID, name FROM Country ORDER BY name")?
            .query_map([], |r| {
                Ok(CountryOption {
                    id: r.get(0)?,
                    name: r.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let economic_phases = conn
            .prepare_cached("SELECT ROWID, phase FROM Economy ORDER BY ROWID")?
            .query_map([], |r| {
                Ok(EconomicPhaseOption {
                    id: r.get(0)?,
                    phase: r.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let infection_types = conn
            .prepare_cached("SELECT id, description FROM Infection_Type ORDER BY id")?
            .query_map([], |r| {
                Ok(InfectionTypeOption {
                    id: r.get(0)?,
                    description: r.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(FilterOptions {
            years,
            antigens,
            regions,
            countries,
            economic_phases,
            infection_types,
        })
    }

    fn high_coverage_predicates(filter: &HighCoverageFilter) -> Predicates {
        // Bulk loads may store coverage as text. Numbers and digit-led text
        // are compared by value; blanks and other text never qualify.
        Predicates::new()
            .require(
                "(typeof(V.coverage) IN ('integer', 'real') OR trim(V.coverage) GLOB '[0-9]*')
                 AND CAST(V.coverage AS REAL) >= ?",
                HIGH_COVERAGE_THRESHOLD,
            )
            .require("V.year = ?", filter.year)
            .require("V.antigen = ?", filter.antigen_id.clone())
            .optional("C.CountryID = ?", filter.country_id.clone())
            .optional("C.region = ?", filter.region.clone())
    }

    fn high_coverage_inner(
        conn: &Connection,
        filter: &HighCoverageFilter,
    ) -> Result<HighCoverageReport> {
        let predicates = Self::high_coverage_predicates(filter);

        let rows_sql = format!(
            "SELECT V.antigen, V.year, C.name, C.region, CAST(V.coverage AS REAL) AS percentage
             FROM Vaccination V
             JOIN Country C ON V.country = C.CountryID{}
             ORDER BY C.region, percentage DESC, C.name",
            predicates.where_sql()
        );
        let rows = conn
            .prepare_cached(&rows_sql)?
            .query_map(params_from_iter(predicates.params()), |r| {
                Ok(HighCoverageRow {
                    antigen: r.get(0)?,
                    year: r.get(1)?,
                    country_name: r.get(2)?,
                    region: r.get::<_, Option<String>>(3)?.unwrap_or_default(),
                    percentage: r.get(4)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to query high coverage countries")?;

        let summary_sql = format!(
            "SELECT V.antigen, V.year, C.region, COUNT(V.country)
             FROM Vaccination V
             JOIN Country C ON V.country = C.CountryID{}
             GROUP BY C.region
             ORDER BY C.region",
            predicates.where_sql()
        );
        let region_summary = conn
            .prepare_cached(&summary_sql)?
            .query_map(params_from_iter(predicates.params()), |r| {
                Ok(RegionCoverageSummary {
                    antigen: r.get(0)?,
                    year: r.get(1)?,
                    region: r.get::<_, Option<String>>(2)?.unwrap_or_default(),
                    countries_meeting_target: r.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to query region coverage summary")?;

        Ok(HighCoverageReport {
            rows,
            region_summary,
        })
    }

    fn infection_by_phase_inner(
        conn: &Connection,
        filter: &InfectionByPhaseFilter,
    ) -> Result<InfectionByPhaseReport> {
        let mut per_capita_stmt = conn.prepare_cached(
            "SELECT IT.description, C.name, E.phase, ID.year,
                    CASE
                        WHEN CP.population IS NULL OR CP.population = 0 THEN 0.0
                        ELSE CAST(ID.cases AS REAL) * 100000.0 / CP.population
                    END AS cases_per_100k
             FROM InfectionData ID
             JOIN Country C ON ID.country = C.CountryID
             JOIN Economy E ON C.economy = E.ROWID
             JOIN Infection_Type IT ON ID.inf_type = IT.id
             LEFT JOIN CountryPopulation CP ON ID.country = CP.country AND ID.year = CP.year
             WHERE E.ROWID = ?1 AND IT.id = ?2 AND ID.year = ?3
             ORDER BY cases_per_100k DESC, C.name",
        )?;
        let per_capita = per_capita_stmt
            .query_map(
                params![filter.economic_phase_id, filter.infection_type_id, filter.year],
                |r| {
                    Ok(PerCapitaInfectionRow {
                        disease: r.get(0)?,
                        country_name: r.get(1)?,
                        economic_phase: r.get(2)?,
                        year: r.get(3)?,
                        cases_per_100k: r.get::<_, Option<f64>>(4)?.unwrap_or(0.0),
                    })
                },
            )?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to query per capita infections")?;

        // Grouped over every phase: the requested phase narrows the per
        // capita list only.
        let mut by_phase_stmt = conn.prepare_cached(
            "SELECT IT.description, E.phase, ID.year,
                    CAST(COALESCE(SUM(ID.cases), 0) AS INTEGER) AS total_cases
             FROM InfectionData ID
             JOIN Country C ON ID.country = C.CountryID
             JOIN Economy E ON C.economy = E.ROWID
             JOIN Infection_Type IT ON ID.inf_type = IT.id
             WHERE IT.id = ?1 AND ID.year = ?2
             GROUP BY E.phase
             ORDER BY E.phase",
        )?;
        let by_phase = by_phase_stmt
            .query_map(params![filter.infection_type_id, filter.year], |r| {
                Ok(PhaseInfectionTotal {
                    disease: r.get(0)?,
                    economic_phase: r.get(1)?,
                    year: r.get(2)?,
                    total_cases: r.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to query infections by economic phase")?;

        Ok(InfectionByPhaseReport {
            per_capita,
            by_phase,
        })
    }

    fn top_improvement_inner(
        conn: &Connection,
        filter: &ImprovementFilter,
    ) -> Result<Vec<ImprovementRow>> {
        let mut stmt = conn.prepare_cached(
            "WITH StartYearRates AS (
                SELECT V.country,
                       CAST(V.doses AS REAL) * 100.0 / CP.population AS start_rate
                FROM Vaccination V
                JOIN CountryPopulation CP ON V.country = CP.country AND V.year = CP.year
                WHERE V.year = ?1 AND V.antigen = ?2 AND CP.population > 0
             ),
             EndYearRates AS (
                SELECT V.country,
                       CAST(V.doses AS REAL) * 100.0 / CP.population AS end_rate
                FROM Vaccination V
                JOIN CountryPopulation CP ON V.country = CP.country AND V.year = CP.year
                WHERE V.year = ?3 AND V.antigen = ?2 AND CP.population > 0
             )
             SELECT C.name, EYR.end_rate - SYR.start_rate AS rate_increase
             FROM StartYearRates SYR
             JOIN EndYearRates EYR ON SYR.country = EYR.country
             JOIN Country C ON SYR.country = C.CountryID
             WHERE EYR.end_rate - SYR.start_rate > 0
             ORDER BY rate_increase DESC, C.name
             LIMIT ?4",
        )?;
        let rows = stmt
            .query_map(
                params![
                    filter.start_year,
                    filter.antigen_id,
                    filter.end_year,
                    filter.limit as i64
                ],
                |r| {
                    Ok(ImprovementRow {
                        country_name: r.get(0)?,
                        rate_increase: r.get(1)?,
                    })
                },
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn above_global_average_inner(
        conn: &Connection,
        filter: &AboveAverageFilter,
    ) -> Result<AboveAverageReport> {
        // The pooled average must be complete before any country is compared
        // against it.
        let global_average: Option<f64> = conn
            .query_row(
                "SELECT SUM(CAST(ID.cases AS REAL)) * 100000.0 / SUM(CAST(CP.population AS REAL))
                 FROM InfectionData ID
                 JOIN CountryPopulation CP ON ID.country = CP.country AND ID.year = CP.year
                 WHERE ID.year = ?1 AND ID.inf_type = ?2",
                params![filter.year, filter.infection_type_id],
                |r| r.get(0),
            )
            .context("Failed to compute global infection average")?;
        let global_average = global_average.unwrap_or(0.0);

        let mut stmt = conn.prepare_cached(
            "SELECT C.name, IT.description,
                    CAST(ID.cases AS REAL) * 100000.0 / CP.population AS infection_rate
             FROM InfectionData ID
             JOIN Country C ON ID.country = C.CountryID
             JOIN Infection_Type IT ON ID.inf_type = IT.id
             JOIN CountryPopulation CP ON ID.country = CP.country AND ID.year = CP.year
             WHERE ID.year = ?1
               AND ID.inf_type = ?2
               AND CP.population > 0
               AND CAST(ID.cases AS REAL) * 100000.0 / CP.population > ?3
             ORDER BY infection_rate DESC, C.name",
        )?;
        let countries = stmt
            .query_map(
                params![filter.year, filter.infection_type_id, global_average],
                |r| {
                    Ok(AboveAverageRow {
                        country_name: r.get(0)?,
                        infection: r.get(1)?,
                        infection_rate: r.get(2)?,
                    })
                },
            )?
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to query countries above global average")?;

        Ok(AboveAverageReport {
            global_average,
            countries,
        })
    }

    fn dataset_counts_inner(conn: &Connection) -> Result<DatasetCounts> {
        Ok(DatasetCounts {
            countries: count_rows(conn, "Country")?,
            antigens: count_rows(conn, "Antigen")?,
            infection_types: count_rows(conn, "Infection_Type")?,
            vaccination_rows: count_rows(conn, "Vaccination")?,
            infection_rows: count_rows(conn, "InfectionData")?,
            population_rows: count_rows(conn, "CountryPopulation")?,
        })
    }
}

impl HealthStatsStore for SqliteHealthStore {
    fn list_filter_options(&self) -> Result<FilterOptions> {
        self.with_read_conn(Self::filter_options_inner)
    }

    fn high_coverage(&self, filter: &HighCoverageFilter) -> Result<HighCoverageReport> {
        self.with_read_conn(|conn| Self::high_coverage_inner(conn, filter))
    }

    fn infection_by_phase(
        &self,
        filter: &InfectionByPhaseFilter,
    ) -> Result<InfectionByPhaseReport> {
        self.with_read_conn(|conn| Self::infection_by_phase_inner(conn, filter))
    }

    fn top_improvement(&self, filter: &ImprovementFilter) -> Vec<ImprovementRow> {
        match self.with_read_conn(|conn| Self::top_improvement_inner(conn, filter)) {
            Ok(rows) => rows,
            Err(err) => {
                error!("Error fetching vaccination improvement: {:#}", err);
                Vec::new()
            }
        }
    }

    fn above_global_average(&self, filter: &AboveAverageFilter) -> Result<AboveAverageReport> {
        self.with_read_conn(|conn| Self::above_global_average_inner(conn, filter))
    }

    fn dataset_counts(&self) -> Result<DatasetCounts> {
        self.with_read_conn(Self::dataset_counts_inner)
    }

    fn approximate_overview(&self, sample_rows: usize) -> Result<ApproximateOverview> {
        self.with_read_conn(|conn| build_overview(conn, sample_rows))
    }
}
