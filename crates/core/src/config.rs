use crate::editor::AuditPolicy;

/// Collection namespace used when none is configured.
pub const DEFAULT_NAMESPACE: &str = "default-board-tracker";

/// Settings shared by every tracker session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerConfig {
    /// Partition of the record store this deployment reads and writes.
    pub namespace: String,
    pub audit_policy: AuditPolicy,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            audit_policy: AuditPolicy::default(),
        }
    }
}
