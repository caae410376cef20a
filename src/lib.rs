pub mod event;
pub mod diagnostics;
pub mod param;
pub mod timestamp;
pub mod xml;
pub mod layout;
pub mod host;
pub mod env;

#[cfg(feature = "tracing-layer")]
pub mod layer;

#[cfg(feature = "tracing-layer")]
pub mod init;
