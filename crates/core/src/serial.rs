//! Serial number generation.
//!
//! Format: `SN-{YY}{MM}{DD}-{NNN}-{AAA}` where `NNN` is the board name's
//! leading three digits (`000` when it has none) and `AAA` is the
//! autonumber, unique within a `(board_name, creation_date)` batch.
//!
//! Allocation reads the highest existing autonumber for the batch key and
//! continues from there. The read and the subsequent inserts are not atomic:
//! two sessions creating the same batch key at once can allocate the same
//! numbers.

use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;

use crate::error::StoreError;
use crate::store::RecordStore;

/// Used when the board name does not start with three digits.
pub const DEFAULT_BOARD_NUMBER: &str = "000";

static BOARD_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{3}").expect("valid board number pattern"));

static AUTONUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"-(\d+)$").expect("valid autonumber pattern"));

/// Leading three-digit run of `board_name`, or [`DEFAULT_BOARD_NUMBER`].
pub fn board_number(board_name: &str) -> &str {
    BOARD_NUMBER
        .find(board_name)
        .map_or(DEFAULT_BOARD_NUMBER, |m| m.as_str())
}

/// Trailing autonumber of a serial, if it has one.
pub fn autonumber(serial: &str) -> Option<u64> {
    AUTONUMBER
        .captures(serial)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// First free autonumber after every serial in `existing`; 1 for an empty batch.
///
/// Suffixes too long for a `u64` are not autonumbers and are skipped.
pub fn next_autonumber<'a, I: IntoIterator<Item = &'a str>>(existing: I) -> u64 {
    existing
        .into_iter()
        .filter_map(autonumber)
        .max()
        .map_or(1, |max| max.saturating_add(1))
}

/// Build one serial number.
pub fn format_serial(board_name: &str, date: NaiveDate, autonumber: u64) -> String {
    format!(
        "SN-{:02}{:02}{:02}-{}-{:03}",
        date.year().rem_euclid(100),
        date.month(),
        date.day(),
        board_number(board_name),
        autonumber
    )
}

/// `quantity` consecutive serials starting at autonumber `start`.
pub fn generate(board_name: &str, date: NaiveDate, start: u64, quantity: u32) -> Vec<String> {
    (0..u64::from(quantity))
        .map(|i| format_serial(board_name, date, start.saturating_add(i)))
        .collect()
}

/// Query the batch key and allocate `quantity` serials continuing from the
/// highest existing autonumber.
pub async fn allocate<S: RecordStore + ?Sized>(
    store: &S,
    board_name: &str,
    date: NaiveDate,
    creation_date: &str,
    quantity: u32,
) -> Result<Vec<String>, StoreError> {
    let existing = store.list_batch(board_name, creation_date).await?;
    let start = next_autonumber(existing.iter().map(|b| b.serial_number.as_str()));
    tracing::debug!(board_name, creation_date, start, quantity, "Allocating serial numbers");
    Ok(generate(board_name, date, start, quantity))
}
