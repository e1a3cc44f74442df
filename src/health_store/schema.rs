//! SQLite schema of the WHO statistics database.
//!
//! Table and column names follow the bulk-loaded `who.db` file, including
//! its mixed naming (`CountryID`, `Infection_Type`, `inf_type`), so existing
//! databases open unchanged. Economies are keyed by their implicit ROWID.

use crate::sqlite_column;
use crate::sqlite_persistence::{SqlType, Table};

const ECONOMY_TABLE: Table = Table {
    name: "Economy",
    columns: &[sqlite_column!("phase", &SqlType::Text, non_null = true)],
    unique_constraints: &[],
    rowid_is_key: true,
};

const COUNTRY_TABLE: Table = Table {
    name: "Country",
    columns: &[
        sqlite_column!("CountryID", &SqlType::Text, is_primary_key = true),
        sqlite_column!("name", &SqlType::Text, non_null = true),
        sqlite_column!("region", &SqlType::Text),
        sqlite_column!(
            "economy",
            &SqlType::Integer,
            references = Some(("Economy", "ROWID"))
        ),
    ],
    unique_constraints: &[],
    rowid_is_key: false,
};

const ANTIGEN_TABLE: Table = Table {
    name: "Antigen",
    columns: &[
        sqlite_column!("AntigenID", &SqlType::Text, is_primary_key = true),
        sqlite_column!("name", &SqlType::Text, non_null = true),
    ],
    unique_constraints: &[],
    rowid_is_key: false,
};

const INFECTION_TYPE_TABLE: Table = Table {
    name: "Infection_Type",
    columns: &[
        sqlite_column!("id", &SqlType::Text, is_primary_key = true),
        sqlite_column!("description", &SqlType::Text, non_null = true),
    ],
    unique_constraints: &[],
    rowid_is_key: false,
};

const COUNTRY_POPULATION_TABLE: Table = Table {
    name: "CountryPopulation",
    columns: &[
        sqlite_column!(
            "country",
            &SqlType::Text,
            non_null = true,
            references = Some(("Country", "CountryID"))
        ),
        sqlite_column!("year", &SqlType::Integer, non_null = true),
        sqlite_column!("population", &SqlType::Integer),
    ],
    unique_constraints: &[&["country", "year"]],
    rowid_is_key: false,
};

const VACCINATION_TABLE: Table = Table {
    name: "Vaccination",
    columns: &[
        sqlite_column!(
            "country",
            &SqlType::Text,
            non_null = true,
            references = Some(("Country", "CountryID"))
        ),
        sqlite_column!("year", &SqlType::Integer, non_null = true),
        sqlite_column!(
            "antigen",
            &SqlType::Text,
            non_null = true,
            references = Some(("Antigen", "AntigenID"))
        ),
        sqlite_column!("doses", &SqlType::Integer),
        sqlite_column!("target_num", &SqlType::Integer),
        sqlite_column!("coverage", &SqlType::Real), // percentage, may be missing
    ],
    unique_constraints: &[&["country", "year", "antigen"]],
    rowid_is_key: false,
};

const INFECTION_DATA_TABLE: Table = Table {
    name: "InfectionData",
    columns: &[
        sqlite_column!(
            "country",
            &SqlType::Text,
            non_null = true,
            references = Some(("Country", "CountryID"))
        ),
        sqlite_column!("year", &SqlType::Integer, non_null = true),
        sqlite_column!(
            "inf_type",
            &SqlType::Text,
            non_null = true,
            references = Some(("Infection_Type", "id"))
        ),
        sqlite_column!("cases", &SqlType::Integer),
    ],
    unique_constraints: &[&["country", "year", "inf_type"]],
    rowid_is_key: false,
};

/// All tables of the statistics database, in load order: lookups first,
/// then the tables referencing them.
pub const HEALTH_TABLES: &[Table] = &[
    ANTIGEN_TABLE,
    ECONOMY_TABLE,
    COUNTRY_TABLE,
    COUNTRY_POPULATION_TABLE,
    INFECTION_TYPE_TABLE,
    INFECTION_DATA_TABLE,
    VACCINATION_TABLE,
];

pub fn create_health_schema(conn: &rusqlite::Connection) -> anyhow::Result<()> {
    for table in HEALTH_TABLES {
        table.create(conn)?;
    }
    Ok(())
}

pub fn validate_health_schema(conn: &rusqlite::Connection) -> anyhow::Result<()> {
    for table in HEALTH_TABLES {
        table.validate(conn)?;
    }
    Ok(())
}
