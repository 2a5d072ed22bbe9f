/// Store-assigned record identifiers (PostgreSQL BIGSERIAL in the durable store).
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
