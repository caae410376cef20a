/// Environment variable names used by this crate for convenient
/// configuration of the layout from host processes.
///
/// These are purely helpers; the layout types remain decoupled from
/// environment access unless built through `LayoutConfig::from_env`.

/// Overrides the `log4japp` property value.
pub const LOG4J_XML_APP_INFO_ENV: &str = "LOG4J_XML_APP_INFO";

/// Overrides the `log4jmachinename` property value.
pub const LOG4J_XML_MACHINE_NAME_ENV: &str = "LOG4J_XML_MACHINE_NAME";

/// Read an environment variable or fall back to a provided default.
pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
