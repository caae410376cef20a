use serde::Serialize;
use std::collections::BTreeMap;

/// Ambient diagnostics captured by the caller at the point the event was
/// created.
///
/// The renderer only reads the snapshot and never keeps it past a single
/// render call. MDC entries emit in map iteration order, which is stable
/// for the duration of the call; the NDC stack is ordered oldest first.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DiagnosticsSnapshot {
    pub mdc: BTreeMap<String, String>,
    pub ndc: Vec<String>,
}

impl DiagnosticsSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// NDC messages joined with a single space, oldest first.
    pub fn ndc_joined(&self) -> String {
        self.ndc.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ndc_joins_oldest_first() {
        let mut snapshot = DiagnosticsSnapshot::new();
        snapshot.ndc.push("request".to_string());
        snapshot.ndc.push("retry".to_string());
        assert_eq!(snapshot.ndc_joined(), "request retry");
    }

    #[test]
    fn empty_ndc_joins_to_empty_string() {
        assert_eq!(DiagnosticsSnapshot::new().ndc_joined(), "");
    }
}
