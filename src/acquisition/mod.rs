//! Telemetry acquisition module
//!
//! Loads the fleet CSV export and selects per-fan date windows for analysis.

mod csv_table;
mod window;

pub use csv_table::FleetTable;
pub use window::DateRange;
