use crate::event::LogEvent;
use std::sync::Arc;

/// Sub-layout producing one property value from the current event.
///
/// Implementations must not fail for a well-formed event; a value that
/// cannot be computed should degrade to an empty string rather than
/// abort the render call.
pub trait ValueLayout: Send + Sync {
    fn render(&self, event: &LogEvent) -> String;
}

/// Fixed-text layout; renders the same value for every event.
pub struct Literal(pub String);

impl ValueLayout for Literal {
    fn render(&self, _event: &LogEvent) -> String {
        self.0.clone()
    }
}

impl<F> ValueLayout for F
where
    F: Fn(&LogEvent) -> String + Send + Sync,
{
    fn render(&self, event: &LogEvent) -> String {
        self(event)
    }
}

/// A named viewer parameter, rendered into the properties section on every
/// call in configuration order.
#[derive(Clone)]
pub struct ParameterInfo {
    pub name: String,
    pub layout: Arc<dyn ValueLayout>,
}

impl ParameterInfo {
    pub fn new(name: impl Into<String>, layout: impl ValueLayout + 'static) -> Self {
        ParameterInfo {
            name: name.into(),
            layout: Arc::new(layout),
        }
    }

    /// Parameter with a fixed text value.
    pub fn literal(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, Literal(value.into()))
    }
}
