pub mod csv_export;

pub use csv_export::{REPORT_HEADERS, write_unmatched_report};
