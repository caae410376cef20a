use crate::diagnostics::DiagnosticsSnapshot;
use crate::event::{LogEvent, StackDetail};
use crate::host;
use crate::param::ParameterInfo;
use crate::timestamp::to_log4j_millis;
use crate::xml::{FragmentError, FragmentWriter};

/// Options controlling which sections of the fragment are emitted.
///
/// **Fields**
/// - `include_nlog_data`: emit the `nlog:eventSequenceNumber` and
///   `nlog:locationInfo` extension elements.
/// - `indent_xml`: pretty-print the fragment; cosmetic only.
/// - `app_info`: value of the fixed `log4japp` property.
/// - `include_call_site`: emit `class`/`method` location attributes.
/// - `include_source_info`: emit `file`/`line` location attributes
///   (implies stack capture at full detail).
/// - `include_mdc`: emit the snapshot's mapped context as properties.
/// - `include_ndc`: emit the snapshot's nested context as an `NDC` element.
/// - `machine_name`: value of the fixed `log4jmachinename` property.
///
/// Fixed at construction time and shared read-only across concurrent
/// render calls.
#[derive(Clone, Debug)]
pub struct LayoutConfig {
    pub include_nlog_data: bool,
    pub indent_xml: bool,
    pub app_info: String,
    pub include_call_site: bool,
    pub include_source_info: bool,
    pub include_mdc: bool,
    pub include_ndc: bool,
    pub machine_name: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            include_nlog_data: true,
            indent_xml: false,
            app_info: host::default_app_info(),
            include_call_site: false,
            include_source_info: false,
            include_mdc: false,
            include_ndc: false,
            machine_name: host::machine_name().to_string(),
        }
    }
}

impl LayoutConfig {
    /// Default configuration with `app_info` and `machine_name` taken from
    /// the environment when the corresponding variables are set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.app_info = crate::env::env_or(crate::env::LOG4J_XML_APP_INFO_ENV, &config.app_info);
        config.machine_name =
            crate::env::env_or(crate::env::LOG4J_XML_MACHINE_NAME_ENV, &config.machine_name);
        config
    }
}

/// Error type returned when rendering an event.
#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    #[error("log event is missing required field `{0}`")]
    MissingField(&'static str),

    #[error(transparent)]
    Write(#[from] FragmentError),
}

/// Log4j-compatible XML event layout.
///
/// One instance is built from configuration and shared across threads;
/// every render call writes into a buffer private to that call, so
/// concurrent calls never interleave.
pub struct Log4JXmlEventLayout {
    config: LayoutConfig,
    parameters: Vec<ParameterInfo>,
}

impl Log4JXmlEventLayout {
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            config,
            parameters: Vec::new(),
        }
    }

    pub fn with_parameters(config: LayoutConfig, parameters: Vec<ParameterInfo>) -> Self {
        Self { config, parameters }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Stack-capture detail this layout needs. The host pipeline reads this
    /// before deciding whether to capture a frame at all.
    pub fn stack_detail(&self) -> StackDetail {
        if self.config.include_source_info {
            StackDetail::Max
        } else if self.config.include_call_site {
            StackDetail::WithoutSource
        } else {
            StackDetail::None
        }
    }

    /// Renders `event` as one XML fragment and appends it to `out`.
    ///
    /// **Parameters**
    /// - `event`: fully formed log event; `logger` and `level` must be
    ///   non-empty.
    /// - `diagnostics`: MDC/NDC snapshot captured by the caller, valid for
    ///   this call only.
    ///
    /// **Returns**
    /// - `Ok(())` with the fragment appended to `out`.
    /// - `Err(RenderError::MissingField)` on a caller contract violation;
    ///   nothing is appended.
    ///
    /// Missing optional data (absent frame, absent declaring type, empty
    /// diagnostics) is not an error; the corresponding attribute or
    /// element is simply omitted.
    pub fn render(
        &self,
        event: &LogEvent,
        diagnostics: &DiagnosticsSnapshot,
        out: &mut String,
    ) -> Result<(), RenderError> {
        if event.logger.is_empty() {
            return Err(RenderError::MissingField("logger"));
        }
        if event.level.is_empty() {
            return Err(RenderError::MissingField("level"));
        }

        let mut xml = FragmentWriter::new(self.config.indent_xml);

        let level = event.level.to_uppercase();
        let timestamp = to_log4j_millis(event.timestamp).to_string();
        let thread = current_thread_name();
        xml.start_element(
            "log4j:event",
            &[
                ("logger", event.logger.as_str()),
                ("level", level.as_str()),
                ("timestamp", timestamp.as_str()),
                ("thread", thread.as_str()),
            ],
        )?;

        xml.text_element("log4j:message", &event.message)?;

        if self.config.include_ndc {
            xml.text_element("log4j:NDC", &diagnostics.ndc_joined())?;
        }

        if self.config.include_call_site || self.config.include_source_info {
            if let Some(frame) = &event.call_site {
                let line = frame.line.map(|l| l.to_string());
                let mut attrs: Vec<(&str, &str)> = Vec::new();
                if let Some(class_name) = &frame.class_name {
                    attrs.push(("class", class_name.as_str()));
                }
                attrs.push(("method", frame.method.as_str()));
                if self.config.include_source_info {
                    if let Some(file) = &frame.file {
                        attrs.push(("file", file.as_str()));
                    }
                    if let Some(line) = line.as_deref() {
                        attrs.push(("line", line));
                    }
                }
                xml.empty_element("log4j:locationInfo", &attrs)?;

                if self.config.include_nlog_data {
                    xml.text_element("nlog:eventSequenceNumber", &event.sequence_id.to_string())?;
                    let mut nlog_attrs: Vec<(&str, &str)> = Vec::new();
                    if let Some(assembly) = &frame.assembly {
                        nlog_attrs.push(("assembly", assembly.as_str()));
                    }
                    xml.empty_element("nlog:locationInfo", &nlog_attrs)?;
                }
            }
        }

        xml.start_element("log4j:properties", &[])?;
        if self.config.include_mdc {
            for (name, value) in &diagnostics.mdc {
                xml.empty_element("log4j:data", &[("name", name.as_str()), ("value", value.as_str())])?;
            }
        }
        for parameter in &self.parameters {
            let value = parameter.layout.render(event);
            xml.empty_element(
                "log4j:data",
                &[("name", parameter.name.as_str()), ("value", value.as_str())],
            )?;
        }
        xml.empty_element(
            "log4j:data",
            &[("name", "log4japp"), ("value", self.config.app_info.as_str())],
        )?;
        xml.empty_element(
            "log4j:data",
            &[("name", "log4jmachinename"), ("value", self.config.machine_name.as_str())],
        )?;
        xml.end_element("log4j:properties")?;

        xml.end_element("log4j:event")?;

        out.push_str(&xml.into_string());
        Ok(())
    }

    /// Convenience wrapper returning the fragment as a fresh `String`.
    pub fn render_to_string(
        &self,
        event: &LogEvent,
        diagnostics: &DiagnosticsSnapshot,
    ) -> Result<String, RenderError> {
        let mut out = String::new();
        self.render(event, diagnostics, &mut out)?;
        Ok(out)
    }
}

/// Identifier for the rendering thread: its name when set, otherwise the
/// numeric part of the runtime thread id.
pub(crate) fn current_thread_name() -> String {
    let current = std::thread::current();
    match current.name() {
        Some(name) => name.to_string(),
        None => {
            let id = format!("{:?}", current.id());
            id.trim_start_matches("ThreadId(")
                .trim_end_matches(')')
                .to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::CallSiteFrame;
    use chrono::{TimeZone, Utc};

    fn quiet_config() -> LayoutConfig {
        LayoutConfig {
            include_nlog_data: false,
            indent_xml: false,
            app_info: "svc(42)".to_string(),
            include_call_site: false,
            include_source_info: false,
            include_mdc: false,
            include_ndc: false,
            machine_name: "host1".to_string(),
        }
    }

    fn boom_event() -> LogEvent {
        LogEvent {
            logger: "App.Service".to_string(),
            level: "Error".to_string(),
            timestamp: Utc.timestamp_opt(1, 0).unwrap(),
            message: "boom".to_string(),
            sequence_id: 7,
            call_site: None,
        }
    }

    fn frame() -> CallSiteFrame {
        CallSiteFrame {
            class_name: Some("App.Service.Worker".to_string()),
            method: "run(ctx)".to_string(),
            file: Some("worker.rs".to_string()),
            line: Some(120),
            assembly: Some("app-service 1.0.0".to_string()),
        }
    }

    #[test]
    fn minimal_fragment_matches_reference_output() {
        let layout = Log4JXmlEventLayout::new(quiet_config());
        let fragment = layout
            .render_to_string(&boom_event(), &DiagnosticsSnapshot::new())
            .unwrap();
        let expected = format!(
            "<log4j:event logger=\"App.Service\" level=\"ERROR\" timestamp=\"1000\" thread=\"{}\">\
             <log4j:message>boom</log4j:message>\
             <log4j:properties>\
             <log4j:data name=\"log4japp\" value=\"svc(42)\"/>\
             <log4j:data name=\"log4jmachinename\" value=\"host1\"/>\
             </log4j:properties>\
             </log4j:event>",
            current_thread_name()
        );
        assert_eq!(fragment, expected);
    }

    #[test]
    fn render_appends_to_the_caller_buffer() {
        let layout = Log4JXmlEventLayout::new(quiet_config());
        let mut out = String::from("prefix|");
        layout
            .render(&boom_event(), &DiagnosticsSnapshot::new(), &mut out)
            .unwrap();
        assert!(out.starts_with("prefix|<log4j:event "));
    }

    #[test]
    fn level_is_upper_cased() {
        let layout = Log4JXmlEventLayout::new(quiet_config());
        let mut event = boom_event();
        event.level = "warn".to_string();
        let fragment = layout
            .render_to_string(&event, &DiagnosticsSnapshot::new())
            .unwrap();
        assert!(fragment.contains("level=\"WARN\""));
    }

    #[test]
    fn empty_logger_fails_fast() {
        let layout = Log4JXmlEventLayout::new(quiet_config());
        let mut event = boom_event();
        event.logger = String::new();
        let err = layout
            .render_to_string(&event, &DiagnosticsSnapshot::new())
            .unwrap_err();
        assert!(matches!(err, RenderError::MissingField("logger")));
    }

    #[test]
    fn empty_level_fails_fast() {
        let layout = Log4JXmlEventLayout::new(quiet_config());
        let mut event = boom_event();
        event.level = String::new();
        let err = layout
            .render_to_string(&event, &DiagnosticsSnapshot::new())
            .unwrap_err();
        assert!(matches!(err, RenderError::MissingField("level")));
    }

    #[test]
    fn property_order_is_mdc_parameters_then_fixed_entries() {
        let mut config = quiet_config();
        config.include_mdc = true;
        let layout = Log4JXmlEventLayout::with_parameters(
            config,
            vec![ParameterInfo::literal("p", "x")],
        );

        let mut diagnostics = DiagnosticsSnapshot::new();
        diagnostics.mdc.insert("a".to_string(), "1".to_string());
        diagnostics.mdc.insert("b".to_string(), "2".to_string());

        let fragment = layout.render_to_string(&boom_event(), &diagnostics).unwrap();
        let pos = |needle: &str| fragment.find(needle).expect(needle);
        assert!(pos("name=\"a\"") < pos("name=\"b\""));
        assert!(pos("name=\"b\"") < pos("name=\"p\""));
        assert!(pos("name=\"p\"") < pos("name=\"log4japp\""));
        assert!(pos("name=\"log4japp\"") < pos("name=\"log4jmachinename\""));
    }

    #[test]
    fn ndc_is_joined_with_single_spaces() {
        let mut config = quiet_config();
        config.include_ndc = true;
        let layout = Log4JXmlEventLayout::new(config);
        let mut diagnostics = DiagnosticsSnapshot::new();
        diagnostics.ndc.push("request".to_string());
        diagnostics.ndc.push("retry".to_string());
        let fragment = layout.render_to_string(&boom_event(), &diagnostics).unwrap();
        assert!(fragment.contains("<log4j:NDC>request retry</log4j:NDC>"));
    }

    #[test]
    fn ndc_element_is_present_even_when_stack_is_empty() {
        let mut config = quiet_config();
        config.include_ndc = true;
        let layout = Log4JXmlEventLayout::new(config);
        let fragment = layout
            .render_to_string(&boom_event(), &DiagnosticsSnapshot::new())
            .unwrap();
        assert!(fragment.contains("<log4j:NDC/>"));
    }

    #[test]
    fn ndc_is_absent_when_disabled() {
        let layout = Log4JXmlEventLayout::new(quiet_config());
        let mut diagnostics = DiagnosticsSnapshot::new();
        diagnostics.ndc.push("ignored".to_string());
        let fragment = layout.render_to_string(&boom_event(), &diagnostics).unwrap();
        assert!(!fragment.contains("NDC"));
    }

    #[test]
    fn call_site_without_source_info_has_no_file_or_line() {
        let mut config = quiet_config();
        config.include_call_site = true;
        let layout = Log4JXmlEventLayout::new(config);
        let mut event = boom_event();
        event.call_site = Some(frame());
        let fragment = layout
            .render_to_string(&event, &DiagnosticsSnapshot::new())
            .unwrap();
        assert!(fragment.contains(
            "<log4j:locationInfo class=\"App.Service.Worker\" method=\"run(ctx)\"/>"
        ));
        assert!(!fragment.contains("file="));
        assert!(!fragment.contains("line="));
    }

    #[test]
    fn source_info_adds_file_and_line() {
        let mut config = quiet_config();
        config.include_source_info = true;
        let layout = Log4JXmlEventLayout::new(config);
        let mut event = boom_event();
        event.call_site = Some(frame());
        let fragment = layout
            .render_to_string(&event, &DiagnosticsSnapshot::new())
            .unwrap();
        assert!(fragment.contains("file=\"worker.rs\""));
        assert!(fragment.contains("line=\"120\""));
    }

    #[test]
    fn missing_debug_symbols_omit_file_and_line() {
        let mut config = quiet_config();
        config.include_source_info = true;
        let layout = Log4JXmlEventLayout::new(config);
        let mut event = boom_event();
        let mut stripped = frame();
        stripped.file = None;
        stripped.line = None;
        event.call_site = Some(stripped);
        let fragment = layout
            .render_to_string(&event, &DiagnosticsSnapshot::new())
            .unwrap();
        assert!(fragment.contains("method=\"run(ctx)\""));
        assert!(!fragment.contains("file="));
        assert!(!fragment.contains("line="));
    }

    #[test]
    fn unresolvable_declaring_type_omits_class() {
        let mut config = quiet_config();
        config.include_call_site = true;
        let layout = Log4JXmlEventLayout::new(config);
        let mut event = boom_event();
        let mut anonymous = frame();
        anonymous.class_name = None;
        event.call_site = Some(anonymous);
        let fragment = layout
            .render_to_string(&event, &DiagnosticsSnapshot::new())
            .unwrap();
        assert!(fragment.contains("<log4j:locationInfo method=\"run(ctx)\"/>"));
        assert!(!fragment.contains("class="));
    }

    #[test]
    fn absent_frame_omits_the_whole_location_block() {
        let mut config = quiet_config();
        config.include_call_site = true;
        config.include_nlog_data = true;
        let layout = Log4JXmlEventLayout::new(config);
        let fragment = layout
            .render_to_string(&boom_event(), &DiagnosticsSnapshot::new())
            .unwrap();
        assert!(!fragment.contains("locationInfo"));
        assert!(!fragment.contains("eventSequenceNumber"));
    }

    #[test]
    fn nlog_extensions_require_the_flag() {
        let mut config = quiet_config();
        config.include_call_site = true;
        let layout = Log4JXmlEventLayout::new(config);
        let mut event = boom_event();
        event.call_site = Some(frame());
        let fragment = layout
            .render_to_string(&event, &DiagnosticsSnapshot::new())
            .unwrap();
        assert!(!fragment.contains("nlog:"));
    }

    #[test]
    fn nlog_extensions_carry_sequence_and_assembly() {
        let mut config = quiet_config();
        config.include_call_site = true;
        config.include_nlog_data = true;
        let layout = Log4JXmlEventLayout::new(config);
        let mut event = boom_event();
        event.call_site = Some(frame());
        let fragment = layout
            .render_to_string(&event, &DiagnosticsSnapshot::new())
            .unwrap();
        assert!(fragment.contains("<nlog:eventSequenceNumber>7</nlog:eventSequenceNumber>"));
        assert!(fragment.contains("<nlog:locationInfo assembly=\"app-service 1.0.0\"/>"));
    }

    #[test]
    fn nlog_location_element_survives_missing_assembly() {
        let mut config = quiet_config();
        config.include_call_site = true;
        config.include_nlog_data = true;
        let layout = Log4JXmlEventLayout::new(config);
        let mut event = boom_event();
        let mut no_assembly = frame();
        no_assembly.assembly = None;
        event.call_site = Some(no_assembly);
        let fragment = layout
            .render_to_string(&event, &DiagnosticsSnapshot::new())
            .unwrap();
        assert!(fragment.contains("<nlog:locationInfo/>"));
    }

    #[test]
    fn illegal_characters_degrade_to_replacement() {
        let layout = Log4JXmlEventLayout::new(quiet_config());
        let mut event = boom_event();
        event.message = "bad\u{0}byte".to_string();
        let fragment = layout
            .render_to_string(&event, &DiagnosticsSnapshot::new())
            .unwrap();
        assert!(fragment.contains("bad\u{FFFD}byte"));
        assert!(!fragment.contains('\u{0}'));
    }

    #[test]
    fn indentation_is_cosmetic_only() {
        let mut config = quiet_config();
        config.indent_xml = true;
        let indented = Log4JXmlEventLayout::new(config)
            .render_to_string(&boom_event(), &DiagnosticsSnapshot::new())
            .unwrap();
        let compact = Log4JXmlEventLayout::new(quiet_config())
            .render_to_string(&boom_event(), &DiagnosticsSnapshot::new())
            .unwrap();
        assert!(indented.contains('\n'));
        let stripped: String = indented
            .lines()
            .map(|line| line.trim_start())
            .collect::<Vec<_>>()
            .concat();
        assert_eq!(stripped, compact);
    }

    #[test]
    fn stack_detail_reports_what_the_config_needs() {
        let layout = Log4JXmlEventLayout::new(quiet_config());
        assert_eq!(layout.stack_detail(), StackDetail::None);

        let mut call_site = quiet_config();
        call_site.include_call_site = true;
        assert_eq!(
            Log4JXmlEventLayout::new(call_site).stack_detail(),
            StackDetail::WithoutSource
        );

        let mut source = quiet_config();
        source.include_source_info = true;
        assert_eq!(
            Log4JXmlEventLayout::new(source).stack_detail(),
            StackDetail::Max
        );
    }

    #[test]
    fn from_env_overrides_app_info_and_machine_name() {
        std::env::set_var(crate::env::LOG4J_XML_APP_INFO_ENV, "env-app(9)");
        std::env::set_var(crate::env::LOG4J_XML_MACHINE_NAME_ENV, "env-host");
        let config = LayoutConfig::from_env();
        std::env::remove_var(crate::env::LOG4J_XML_APP_INFO_ENV);
        std::env::remove_var(crate::env::LOG4J_XML_MACHINE_NAME_ENV);
        assert_eq!(config.app_info, "env-app(9)");
        assert_eq!(config.machine_name, "env-host");
    }
}
