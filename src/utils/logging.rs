//! Structured Logging with Sensitive Data Redaction
//!
//! Log entries are emitted as `tracing` events. Field values are redacted by
//! key before they leave the entry:
//! - Private keys and secrets are fully redacted
//! - Signer, spender, token and contract addresses are partially redacted
//! - Hashes are shortened

use std::fmt;
use tracing_subscriber::EnvFilter;

/// Log levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warn => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
        }
    }
}

/// Structured log entry
#[derive(Debug)]
pub struct LogEntry {
    pub level: LogLevel,
    pub module: &'static str,
    pub message: String,
    pub fields: Vec<(&'static str, String)>,
}

impl LogEntry {
    pub fn new(level: LogLevel, module: &'static str, message: impl Into<String>) -> Self {
        Self {
            level,
            module,
            message: message.into(),
            fields: Vec::new(),
        }
    }

    /// Add a field to the log entry (auto-redacts sensitive data)
    pub fn field(mut self, key: &'static str, value: impl fmt::Display) -> Self {
        let value_str = value.to_string();
        let redacted = redact_if_sensitive(key, &value_str);
        self.fields.push((key, redacted));
        self
    }

    fn render_fields(&self) -> String {
        self.fields
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Emit the entry as a tracing event
    pub fn log(self) {
        let fields = self.render_fields();
        let module = self.module;
        let message = self.message.as_str();

        match self.level {
            LogLevel::Debug => tracing::debug!(module, fields = %fields, "{}", message),
            LogLevel::Info => tracing::info!(module, fields = %fields, "{}", message),
            LogLevel::Warn => tracing::warn!(module, fields = %fields, "{}", message),
            LogLevel::Error => tracing::error!(module, fields = %fields, "{}", message),
        }
    }
}

/// Install a fmt subscriber filtered by `filter` (e.g. `"permit2_signer=debug"`).
///
/// `RUST_LOG` takes precedence when set. Returns `false` if a global
/// subscriber was already installed.
pub fn init_tracing(filter: &str) -> bool {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .try_init()
        .is_ok()
}

/// Redact a value if the key suggests it's sensitive
fn redact_if_sensitive(key: &str, value: &str) -> String {
    let key_lower = key.to_lowercase();

    // Keys that should always be fully redacted
    let fully_redacted_keys = [
        "private_key", "privatekey", "secret", "seed", "mnemonic",
        "password", "passphrase", "private", "key_hex", "signing_key",
    ];

    for sensitive_key in &fully_redacted_keys {
        if key_lower.contains(sensitive_key) {
            return redact_value(value);
        }
    }

    // Keys that should be partially redacted (addresses)
    let address_keys = ["address", "signer", "spender", "token", "contract", "owner"];
    for addr_key in &address_keys {
        if key_lower.contains(addr_key) {
            return redact_address(value);
        }
    }

    let hash_keys = ["digest", "hash", "signature"];
    for hash_key in &hash_keys {
        if key_lower.contains(hash_key) {
            return redact_hash(value);
        }
    }

    value.to_string()
}

/// Fully redact a sensitive value
fn redact_value(value: &str) -> String {
    if value.is_empty() {
        return "[EMPTY]".to_string();
    }

    let len = value.len();
    if len <= 4 {
        "[REDACTED]".to_string()
    } else {
        format!("[REDACTED:{}chars]", len)
    }
}

/// Partially redact an address (show `0x` + first 6 and last 4 hex chars)
fn redact_address(address: &str) -> String {
    let trimmed = address.trim();

    if trimmed.is_empty() {
        return "[EMPTY]".to_string();
    }

    let prefix_len = if trimmed.starts_with("0x") { 8 } else { 6 };
    let suffix_len = 4;

    if trimmed.len() <= prefix_len + suffix_len + 3 || !trimmed.is_ascii() {
        return redact_value(trimmed);
    }

    let prefix = &trimmed[..prefix_len];
    let suffix = &trimmed[trimmed.len() - suffix_len..];

    format!("{}...{}", prefix, suffix)
}

/// Partially redact a hash (show first 10 and last 6 chars)
fn redact_hash(hash: &str) -> String {
    let trimmed = hash.trim();

    if trimmed.is_empty() {
        return "[EMPTY]".to_string();
    }

    if trimmed.len() <= 20 || !trimmed.is_ascii() {
        return trimmed.to_string(); // Short hashes shown fully
    }

    let prefix_len = if trimmed.starts_with("0x") { 12 } else { 10 };
    let suffix_len = 6;

    let prefix = &trimmed[..prefix_len];
    let suffix = &trimmed[trimmed.len() - suffix_len..];

    format!("{}...{}", prefix, suffix)
}

/// Convenience macro for debug logging
#[macro_export]
macro_rules! log_debug {
    ($module:expr, $msg:expr) => {
        $crate::utils::logging::LogEntry::new(
            $crate::utils::logging::LogLevel::Debug,
            $module,
            $msg
        ).log()
    };
    ($module:expr, $msg:expr, $($key:ident = $value:expr),* $(,)?) => {
        $crate::utils::logging::LogEntry::new(
            $crate::utils::logging::LogLevel::Debug,
            $module,
            $msg
        )
        $(.field(stringify!($key), &$value))*
        .log()
    };
}

/// Convenience macro for info logging
#[macro_export]
macro_rules! log_info {
    ($module:expr, $msg:expr) => {
        $crate::utils::logging::LogEntry::new(
            $crate::utils::logging::LogLevel::Info,
            $module,
            $msg
        ).log()
    };
    ($module:expr, $msg:expr, $($key:ident = $value:expr),* $(,)?) => {
        $crate::utils::logging::LogEntry::new(
            $crate::utils::logging::LogLevel::Info,
            $module,
            $msg
        )
        $(.field(stringify!($key), &$value))*
        .log()
    };
}

/// Convenience macro for warning logging
#[macro_export]
macro_rules! log_warn {
    ($module:expr, $msg:expr) => {
        $crate::utils::logging::LogEntry::new(
            $crate::utils::logging::LogLevel::Warn,
            $module,
            $msg
        ).log()
    };
    ($module:expr, $msg:expr, $($key:ident = $value:expr),* $(,)?) => {
        $crate::utils::logging::LogEntry::new(
            $crate::utils::logging::LogLevel::Warn,
            $module,
            $msg
        )
        $(.field(stringify!($key), &$value))*
        .log()
    };
}

/// Convenience macro for error logging
#[macro_export]
macro_rules! log_error {
    ($module:expr, $msg:expr) => {
        $crate::utils::logging::LogEntry::new(
            $crate::utils::logging::LogLevel::Error,
            $module,
            $msg
        ).log()
    };
    ($module:expr, $msg:expr, $($key:ident = $value:expr),* $(,)?) => {
        $crate::utils::logging::LogEntry::new(
            $crate::utils::logging::LogLevel::Error,
            $module,
            $msg
        )
        $(.field(stringify!($key), &$value))*
        .log()
    };
}
