use log4j_xml_event::init::init_tracing;
use log4j_xml_event::layout::{LayoutConfig, Log4JXmlEventLayout};
use tracing::{error, info, info_span};

fn main() {
    let config = LayoutConfig {
        include_mdc: true,
        include_ndc: true,
        ..Default::default()
    };
    init_tracing(Log4JXmlEventLayout::new(config));

    let span = info_span!("startup");
    let _guard = span.enter();

    info!(version = "0.1.0", "service listening");
    error!(code = 503, "upstream unavailable");
}
