use anyhow::{bail, Result};
use rusqlite::{params, Connection};

#[macro_export]
macro_rules! sqlite_column {
    ($name:expr, $sql_type:expr $(, $field:ident = $value:expr)*) => {
        {
            #[allow(unused_mut)]
            let mut column = $crate::sqlite_persistence::Column {
                name: $name,
                sql_type: $sql_type,
                is_primary_key: false,
                non_null: false,
                references: None,
            };
            $(
                column.$field = $value;
            )*
            column
        }
    };
}

#[derive(Debug, PartialEq, Eq)]
pub enum SqlType {
    Text,
    Integer,
    Real,
}

impl SqlType {
    fn as_sql(&self) -> &'static str {
        match self {
            SqlType::Text => "TEXT",
            SqlType::Integer => "INTEGER",
            SqlType::Real => "REAL",
        }
    }
}

pub struct Column {
    pub name: &'static str,
    pub sql_type: &'static SqlType,
    pub is_primary_key: bool,
    pub non_null: bool,
    /// (table, column) referenced by this column.
    pub references: Option<(&'static str, &'static str)>,
}

/// Static description of one table of a read-mostly dataset.
///
/// The statistics database is produced by an external bulk load, so column
/// types in an existing file are not trusted: `validate` only checks that
/// every declared column is present.
pub struct Table {
    pub name: &'static str,
    pub columns: &'static [Column],
    pub unique_constraints: &'static [&'static [&'static str]],
    /// Other tables reference this one through its implicit ROWID, so copies
    /// of the table must carry the ROWID along.
    pub rowid_is_key: bool,
}

impl Table {
    pub fn create(&self, conn: &Connection) -> Result<()> {
        let mut create_sql = format!("CREATE TABLE {} (", self.name);
        for (column_index, column) in self.columns.iter().enumerate() {
            if column_index > 0 {
                create_sql.push_str(", ");
            }
            create_sql.push_str(&format!("{} {}", column.name, column.sql_type.as_sql()));
            if column.is_primary_key {
                create_sql.push_str(" PRIMARY KEY");
            }
            if column.non_null {
                create_sql.push_str(" NOT NULL");
            }
            if let Some((foreign_table, foreign_column)) = column.references {
                create_sql.push_str(&format!(" REFERENCES {}({})", foreign_table, foreign_column));
            }
        }
        for unique_constraint in self.unique_constraints {
            create_sql.push_str(&format!(", UNIQUE ({})", unique_constraint.join(", ")));
        }
        create_sql.push_str(");");
        conn.execute(&create_sql, params![])?;
        Ok(())
    }

    pub fn validate(&self, conn: &Connection) -> Result<()> {
        let mut stmt = conn.prepare(&format!("PRAGMA table_info({});", self.name))?;
        let actual_columns: Vec<String> = stmt
            .query_map(params![], |row| row.get::<_, String>(1))?
            .collect::<Result<_, _>>()?;

        if actual_columns.is_empty() {
            bail!("Table {} is missing", self.name);
        }

        for expected in self.columns {
            if !actual_columns
                .iter()
                .any(|actual| actual.eq_ignore_ascii_case(expected.name))
            {
                bail!(
                    "Table {} is missing column {}. Found columns: {}",
                    self.name,
                    expected.name,
                    actual_columns.join(", ")
                );
            }
        }
        Ok(())
    }

    pub fn column_names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.name).collect()
    }
}
