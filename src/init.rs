use crate::layer::Log4JXmlLayer;
use crate::layout::Log4JXmlEventLayout;
use std::io::Write;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

/// Install a global `tracing` subscriber that renders every event as a
/// log4j XML fragment written to `writer`.
///
/// **Parameters**
/// - `layout`: configured [`Log4JXmlEventLayout`] shared by all events.
/// - `writer`: destination for the rendered fragments, one per line.
/// - `mirror_stdout`: when `true`, a human-readable `fmt` layer is
///   attached alongside the XML layer so events also show on the console.
pub fn init_tracing_with_writer(
    layout: Log4JXmlEventLayout,
    writer: Box<dyn Write + Send>,
    mirror_stdout: bool,
) {
    let layer = Log4JXmlLayer::new(layout, writer);

    if mirror_stdout {
        let fmt_layer = tracing_subscriber::fmt::layer();
        let subscriber = Registry::default().with(layer).with(fmt_layer);
        tracing::subscriber::set_global_default(subscriber).expect("set global subscriber");
    } else {
        let subscriber = Registry::default().with(layer);
        tracing::subscriber::set_global_default(subscriber).expect("set global subscriber");
    }
}

/// Render fragments to standard output with the given layout.
///
/// Equivalent to calling [`init_tracing_with_writer`] with a stdout
/// writer and no console mirror.
pub fn init_tracing(layout: Log4JXmlEventLayout) {
    init_tracing_with_writer(layout, Box::new(std::io::stdout()), false);
}
