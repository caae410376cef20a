use std::sync::OnceLock;

static MACHINE_NAME: OnceLock<String> = OnceLock::new();

/// Substituted when the host name cannot be resolved on this platform.
pub const MACHINE_NAME_FALLBACK: &str = "unknown-host";

/// Resolved host name, cached for the lifetime of the process.
pub fn machine_name() -> &'static str {
    MACHINE_NAME.get_or_init(|| {
        hostname::get()
            .ok()
            .and_then(|name| name.into_string().ok())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| MACHINE_NAME_FALLBACK.to_string())
    })
}

/// Default `log4japp` identifier: `"{executable}({pid})"`.
pub fn default_app_info() -> String {
    let exe = std::env::current_exe()
        .ok()
        .and_then(|path| path.file_stem().map(|stem| stem.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "rust-application".to_string());
    format!("{}({})", exe, std::process::id())
}
