//! Small statistics dataset shared by the unit tests.

use super::schema::create_health_schema;
use super::store::SqliteHealthStore;
use rusqlite::{params, Connection};
use std::path::PathBuf;
use tempfile::TempDir;

pub const PHASE_DEVELOPING: i64 = 1;
pub const PHASE_EMERGING: i64 = 2;
pub const PHASE_ADVANCED: i64 = 4;

/// (CountryID, name, region, economy)
pub const COUNTRIES: &[(&str, &str, &str, i64)] = &[
    ("ITA", "Italy", "Europe", PHASE_ADVANCED),
    ("FRA", "France", "Europe", PHASE_ADVANCED),
    ("DEU", "Germany", "Europe", PHASE_ADVANCED),
    ("SMR", "San Marino", "Europe", PHASE_ADVANCED),
    ("MCO", "Monaco", "Europe", PHASE_ADVANCED),
    ("USA", "United States", "Americas", PHASE_ADVANCED),
    ("BRA", "Brazil", "Americas", PHASE_EMERGING),
    ("NGA", "Nigeria", "Africa", PHASE_DEVELOPING),
    ("KEN", "Kenya", "Africa", PHASE_DEVELOPING),
];

/// (country, year, population). Monaco has none, Kenya none for 2000.
pub const POPULATION: &[(&str, i64, i64)] = &[
    ("ITA", 2000, 57_000_000),
    ("FRA", 2000, 60_000_000),
    ("BRA", 2000, 175_000_000),
    ("USA", 2000, 280_000_000),
    ("NGA", 2000, 0),
    ("ITA", 2024, 59_000_000),
    ("FRA", 2024, 68_000_000),
    ("DEU", 2024, 84_000_000),
    ("SMR", 2024, 0),
    ("USA", 2024, 335_000_000),
    ("BRA", 2024, 216_000_000),
    ("NGA", 2024, 220_000_000),
    ("KEN", 2024, 55_000_000),
];

/// (country, cases, population) of the 2024 measles rows that have a
/// population row.
pub const MEASLES_2024_WITH_POPULATION: &[(&str, i64, i64)] = &[
    ("ITA", 1000, 59_000_000),
    ("FRA", 3400, 68_000_000),
    ("DEU", 500, 84_000_000),
    ("SMR", 5, 0),
    ("USA", 67, 335_000_000),
    ("BRA", 4320, 216_000_000),
    ("NGA", 44000, 220_000_000),
    ("KEN", 1100, 55_000_000),
];

fn seed_lookups(conn: &Connection) {
    for (rowid, phase) in [
        (PHASE_DEVELOPING, "Developing"),
        (PHASE_EMERGING, "Emerging"),
        (PHASE_ADVANCED, "Advanced"),
    ] {
        conn.execute(
            "INSERT INTO Economy (ROWID, phase) VALUES (?1, ?2)",
            params![rowid, phase],
        )
        .unwrap();
    }
    for (id, name, region, economy) in COUNTRIES {
        conn.execute(
            "INSERT INTO Country (CountryID, name, region, economy) VALUES (?1, ?2, ?3, ?4)",
            params![id, name, region, economy],
        )
        .unwrap();
    }
    for (id, name) in [("DTPCV3", "DTP-containing vaccine, 3rd dose"), ("MCV2", "Measles-containing vaccine, 2nd dose")] {
        conn.execute(
            "INSERT INTO Antigen (AntigenID, name) VALUES (?1, ?2)",
            params![id, name],
        )
        .unwrap();
    }
    for (id, description) in [("MEA", "Measles"), ("POL", "Polio")] {
        conn.execute(
            "INSERT INTO Infection_Type (id, description) VALUES (?1, ?2)",
            params![id, description],
        )
        .unwrap();
    }
    for (country, year, population) in POPULATION {
        conn.execute(
            "INSERT INTO CountryPopulation (country, year, population) VALUES (?1, ?2, ?3)",
            params![country, year, population],
        )
        .unwrap();
    }
}

fn insert_vaccination(
    conn: &Connection,
    country: &str,
    year: i64,
    antigen: &str,
    doses: Option<i64>,
    coverage: rusqlite::types::Value,
) {
    conn.execute(
        "INSERT INTO Vaccination (country, year, antigen, doses, target_num, coverage)
         VALUES (?1, ?2, ?3, ?4, ?4, ?5)",
        params![country, year, antigen, doses, coverage],
    )
    .unwrap();
}

fn seed_facts(conn: &Connection) {
    use rusqlite::types::Value;

    for (country, coverage) in [
        ("ITA", Value::Real(95.0)),
        ("FRA", Value::Real(92.5)),
        ("DEU", Value::Real(89.9)),
        ("BRA", Value::Integer(90)),
        ("USA", Value::Real(97.0)),
        ("NGA", Value::Null),
        ("KEN", Value::Text(String::new())),
    ] {
        insert_vaccination(conn, country, 2024, "DTPCV3", Some(1000), coverage);
    }
    insert_vaccination(conn, "ITA", 2023, "DTPCV3", Some(1000), Value::Real(91.0));

    for (country, year, doses) in [
        ("ITA", 2000, 28_500_000),
        ("ITA", 2024, 53_100_000),
        ("FRA", 2000, 30_000_000),
        ("FRA", 2024, 54_400_000),
        ("BRA", 2000, 35_000_000),
        ("BRA", 2024, 43_200_000),
        ("USA", 2000, 84_000_000),
        ("USA", 2024, 67_000_000),
        ("NGA", 2000, 1000),
        ("NGA", 2024, 22_000_000),
        ("KEN", 2000, 100),
        ("KEN", 2024, 5_500_000),
    ] {
        insert_vaccination(conn, country, year, "MCV2", Some(doses), Value::Real(80.0));
    }

    for (country, cases, _) in MEASLES_2024_WITH_POPULATION {
        conn.execute(
            "INSERT INTO InfectionData (country, year, inf_type, cases) VALUES (?1, 2024, 'MEA', ?2)",
            params![country, cases],
        )
        .unwrap();
    }
    conn.execute(
        "INSERT INTO InfectionData (country, year, inf_type, cases) VALUES ('MCO', 2024, 'MEA', 2)",
        [],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO InfectionData (country, year, inf_type, cases) VALUES ('ITA', 2024, 'POL', 3)",
        [],
    )
    .unwrap();
}

pub fn seed_fixture(conn: &Connection) {
    create_health_schema(conn).unwrap();
    seed_lookups(conn);
    seed_facts(conn);
}

pub fn create_fixture_db() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("who.db");
    let conn = Connection::open(&db_path).unwrap();
    seed_fixture(&conn);
    conn.close().unwrap();
    (temp_dir, db_path)
}

pub fn create_empty_db() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("who.db");
    let conn = Connection::open(&db_path).unwrap();
    create_health_schema(&conn).unwrap();
    conn.close().unwrap();
    (temp_dir, db_path)
}

pub fn create_fixture_store() -> (TempDir, SqliteHealthStore) {
    let (temp_dir, db_path) = create_fixture_db();
    let store = SqliteHealthStore::open(&db_path, 2).unwrap();
    (temp_dir, store)
}
