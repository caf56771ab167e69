pub mod connection;
pub mod executor;
pub mod report;

pub use connection::make_pool;
pub use executor::{ExecutionReport, copy_csv_into, execute_plan};
pub use report::{fetch_rk_mappings, fetch_unmatched_names, fetch_unmatched_suggestions};
