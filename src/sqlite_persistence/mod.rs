mod table;

pub use table::{Column, SqlType, Table};
