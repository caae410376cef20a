use chrono::Utc;
use log4j_xml_event::diagnostics::DiagnosticsSnapshot;
use log4j_xml_event::event::{CallSiteFrame, LogEvent};
use log4j_xml_event::layout::{LayoutConfig, Log4JXmlEventLayout};
use log4j_xml_event::param::ParameterInfo;

fn main() {
    let config = LayoutConfig {
        include_mdc: true,
        include_ndc: true,
        include_call_site: true,
        include_source_info: true,
        indent_xml: true,
        ..Default::default()
    };
    let layout = Log4JXmlEventLayout::with_parameters(
        config,
        vec![ParameterInfo::literal("environment", "production")],
    );

    let event = LogEvent {
        logger: "orders.checkout".to_string(),
        level: "Warn".to_string(),
        timestamp: Utc::now(),
        message: "payment provider slow (>500ms)".to_string(),
        sequence_id: 1,
        call_site: Some(CallSiteFrame {
            class_name: Some("orders::checkout::Processor".to_string()),
            method: "charge".to_string(),
            file: Some("src/checkout.rs".to_string()),
            line: Some(120),
            assembly: None,
        }),
    };

    let mut diagnostics = DiagnosticsSnapshot::new();
    diagnostics
        .mdc
        .insert("request_id".to_string(), "b2fd-11".to_string());
    diagnostics.ndc.push("checkout".to_string());
    diagnostics.ndc.push("charge".to_string());

    match layout.render_to_string(&event, &diagnostics) {
        Ok(fragment) => println!("{}", fragment),
        Err(e) => eprintln!("render failed: {}", e),
    }
}
