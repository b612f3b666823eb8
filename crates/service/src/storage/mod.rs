pub mod csv_table;

pub use csv_table::{fmt_float, CsvTable, Row};
