//! Row types for the board tables.
//!
//! Rows carry storage-only columns (`namespace`, history column names) and
//! convert into the domain types in `boardtrack-core`.

pub mod board;
pub mod board_history;
