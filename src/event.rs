use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct LogEvent {
    pub logger: String,
    pub level: String,
    pub timestamp: DateTime<Utc>,
    pub message: String,
    pub sequence_id: u64,
    pub call_site: Option<CallSiteFrame>,
}

/// Call-site descriptor captured by the host pipeline, pointing at the
/// first frame outside the logging framework.
///
/// `method` is always known once a frame was captured at all; every other
/// field may be independently absent (unresolvable declaring type, no
/// debug symbols, no assembly metadata).
#[derive(Debug, Clone, Serialize)]
pub struct CallSiteFrame {
    pub class_name: Option<String>,
    pub method: String,
    pub file: Option<String>,
    pub line: Option<u32>,
    pub assembly: Option<String>,
}

/// Stack-capture detail a layout requires from the host pipeline.
///
/// Query this before dispatching an event so frame capture can be skipped
/// entirely when the layout would not use it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StackDetail {
    None,
    WithoutSource,
    Max,
}
