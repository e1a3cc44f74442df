//! Test fixture creation for the statistics database
//!
//! Uses direct SQL inserts: the server only ever opens the database
//! read-only.

use super::constants::*;
use anyhow::Result;
use rusqlite::{params, Connection};
use std::path::PathBuf;
use tempfile::TempDir;
use who_stats_server::health_store::create_health_schema;

/// Creates a temporary statistics database with 3 countries in 2 economic
/// phases, 2 antigens and 1 infection type.
/// Returns (temp_dir, db_path)
pub fn create_test_database() -> Result<(TempDir, PathBuf)> {
    let dir = TempDir::new()?;
    let db_path = dir.path().join("who.db");
    let conn = Connection::open(&db_path)?;
    create_health_schema(&conn)?;

    conn.execute(
        "INSERT INTO Economy (ROWID, phase) VALUES (?1, 'Developing'), (?2, 'Advanced')",
        params![PHASE_DEVELOPING, PHASE_ADVANCED],
    )?;

    for (id, name, region, economy) in [
        (ITALY_ID, ITALY_NAME, "Europe", PHASE_ADVANCED),
        (FRANCE_ID, FRANCE_NAME, "Europe", PHASE_ADVANCED),
        (NIGERIA_ID, NIGERIA_NAME, "Africa", PHASE_DEVELOPING),
    ] {
        conn.execute(
            "INSERT INTO Country (CountryID, name, region, economy) VALUES (?1, ?2, ?3, ?4)",
            params![id, name, region, economy],
        )?;
    }

    conn.execute(
        "INSERT INTO Antigen (AntigenID, name) VALUES (?1, 'DTP-containing vaccine, 3rd dose'), (?2, 'Measles-containing vaccine, 2nd dose')",
        params![DTPCV3, MCV2],
    )?;
    conn.execute(
        "INSERT INTO Infection_Type (id, description) VALUES (?1, 'Measles')",
        params![MEASLES],
    )?;

    for (country, year, population) in [
        (ITALY_ID, YEAR_2000, 50_000_000),
        (ITALY_ID, YEAR_2024, 60_000_000),
        (FRANCE_ID, YEAR_2000, 60_000_000),
        (FRANCE_ID, YEAR_2024, 60_000_000),
        (NIGERIA_ID, YEAR_2024, 200_000_000),
    ] {
        conn.execute(
            "INSERT INTO CountryPopulation (country, year, population) VALUES (?1, ?2, ?3)",
            params![country, year, population],
        )?;
    }

    for (country, year, antigen, doses, coverage) in [
        (ITALY_ID, YEAR_2024, DTPCV3, 1_000_000, 95.0),
        (FRANCE_ID, YEAR_2024, DTPCV3, 1_000_000, 85.0),
        (NIGERIA_ID, YEAR_2024, DTPCV3, 1_000_000, 91.0),
        (ITALY_ID, YEAR_2000, MCV2, 25_000_000, 70.0),
        (ITALY_ID, YEAR_2024, MCV2, 48_000_000, 90.0),
        (FRANCE_ID, YEAR_2000, MCV2, 30_000_000, 80.0),
        (FRANCE_ID, YEAR_2024, MCV2, 27_000_000, 75.0),
    ] {
        conn.execute(
            "INSERT INTO Vaccination (country, year, antigen, doses, target_num, coverage)
             VALUES (?1, ?2, ?3, ?4, ?4, ?5)",
            params![country, year, antigen, doses, coverage],
        )?;
    }

    for (country, cases) in [(ITALY_ID, 600), (FRANCE_ID, 300), (NIGERIA_ID, 20_000)] {
        conn.execute(
            "INSERT INTO InfectionData (country, year, inf_type, cases) VALUES (?1, ?2, ?3, ?4)",
            params![country, YEAR_2024, MEASLES, cases],
        )?;
    }

    conn.close().map_err(|(_, err)| err)?;
    Ok((dir, db_path))
}
