use crate::diagnostics::DiagnosticsSnapshot;
use crate::event::{CallSiteFrame, LogEvent, StackDetail};
use crate::layout::Log4JXmlEventLayout;
use chrono::Utc;
use std::collections::BTreeMap;
use std::io::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

/// `tracing_subscriber` layer that renders every event through a
/// [`Log4JXmlEventLayout`] and writes one fragment per line to the
/// supplied writer.
///
/// Event fields other than `message` become the MDC snapshot; the span
/// scope, root first, becomes the NDC stack. A call-site frame is built
/// from static metadata only when the layout's declared [`StackDetail`]
/// asks for one. Render or write failures drop the single event and are
/// reported on stderr; they never reach the host application.
pub struct Log4JXmlLayer {
    layout: Log4JXmlEventLayout,
    writer: Mutex<Box<dyn Write + Send>>,
    sequence: AtomicU64,
}

impl Log4JXmlLayer {
    pub fn new(layout: Log4JXmlEventLayout, writer: Box<dyn Write + Send>) -> Self {
        Self {
            layout,
            writer: Mutex::new(writer),
            sequence: AtomicU64::new(0),
        }
    }

    /// Writes fragments to standard output.
    pub fn stdout(layout: Log4JXmlEventLayout) -> Self {
        Self::new(layout, Box::new(std::io::stdout()))
    }
}

impl<S> Layer<S> for Log4JXmlLayer
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fn on_event(&self, event: &Event, ctx: Context<'_, S>) {
        let meta = event.metadata();

        let mut fields = BTreeMap::new();
        let mut message: Option<String> = None;
        let mut visitor = FieldVisitor {
            fields: &mut fields,
            message: &mut message,
        };
        event.record(&mut visitor);

        let detail = self.layout.stack_detail();
        let call_site = if detail == StackDetail::None {
            None
        } else {
            Some(CallSiteFrame {
                class_name: meta.module_path().map(|path| path.to_string()),
                method: meta.name().to_string(),
                file: if detail == StackDetail::Max {
                    meta.file().map(|file| file.to_string())
                } else {
                    None
                },
                line: if detail == StackDetail::Max { meta.line() } else { None },
                assembly: None,
            })
        };

        let mut ndc = Vec::new();
        if let Some(scope) = ctx.event_scope(event) {
            for span in scope.from_root() {
                ndc.push(span.name().to_string());
            }
        }

        let log_event = LogEvent {
            logger: meta.target().to_string(),
            level: meta.level().to_string(),
            timestamp: Utc::now(),
            message: message.unwrap_or_default(),
            sequence_id: self.sequence.fetch_add(1, Ordering::Relaxed),
            call_site,
        };
        let diagnostics = DiagnosticsSnapshot { mdc: fields, ndc };

        let mut fragment = String::new();
        if let Err(e) = self.layout.render(&log_event, &diagnostics, &mut fragment) {
            eprintln!("failed to render log4j fragment: {}", e);
            return;
        }
        fragment.push('\n');

        match self.writer.lock() {
            Ok(mut writer) => {
                if let Err(e) = writer.write_all(fragment.as_bytes()) {
                    eprintln!("failed to write log4j fragment: {}", e);
                }
            }
            Err(_) => eprintln!("log4j fragment writer poisoned, dropping event"),
        }
    }
}

use tracing::field::{Field, Visit};

struct FieldVisitor<'a> {
    fields: &'a mut BTreeMap<String, String>,
    message: &'a mut Option<String>,
}

impl Visit for FieldVisitor<'_> {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            *self.message = Some(value.to_string());
        } else {
            self.fields.insert(field.name().to_string(), value.to_string());
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.fields.insert(field.name().to_string(), value.to_string());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.fields.insert(field.name().to_string(), value.to_string());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.fields.insert(field.name().to_string(), value.to_string());
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            *self.message = Some(format!("{:?}", value));
        } else {
            self.fields.insert(field.name().to_string(), format!("{:?}", value));
        }
    }
}
