//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that accept
//! `&PgPool` as the first argument. Every board query is scoped to one
//! collection namespace.

pub mod board_history_repo;
pub mod board_repo;

pub use board_history_repo::BoardHistoryRepo;
pub use board_repo::BoardRepo;
