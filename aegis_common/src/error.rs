//! Supervisor-wide error taxonomy.
//!
//! Mirrors the five-category taxonomy of the error handling design:
//! configuration errors are logged and absorbed by the loader (never
//! surfaced as `Err` to callers outside `config`), setup and telemetry
//! errors are recoverable up to a bound, and invariant violations are fatal.
//! Nothing inside a tick throws across the tick boundary — recoverable
//! conditions resolve locally or via the "unknown" robustness sentinel.

/// Error type for supervisor configuration, setup, telemetry, and invariant
/// failures.
#[derive(Debug)]
pub enum SupervisorError {
    /// Configuration file I/O failure (file missing, unreadable).
    Io(std::io::Error),
    /// A configuration line could not be parsed as `NAME VALUE`.
    ConfigParse(String),
    /// Configuration values failed semantic validation (e.g. min >= max).
    Configuration(String),
    /// Setup never completed (telemetry never healthy, arming kept failing)
    /// after the bounded retry budget was exhausted.
    Setup(String),
    /// Telemetry has been missing for more consecutive ticks than tolerated.
    TelemetryTransient { consecutive_misses: u32 },
    /// A logic invariant was violated (signal length mismatch after
    /// synthesis, an expected-nonempty candidate list came back empty, an
    /// empty intersection). Fatal — abort with diagnostic.
    InvariantViolation(String),
}

impl std::fmt::Display for SupervisorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::ConfigParse(line) => write!(f, "could not parse config line: {line}"),
            Self::Configuration(msg) => write!(f, "configuration error: {msg}"),
            Self::Setup(msg) => write!(f, "setup error: {msg}"),
            Self::TelemetryTransient { consecutive_misses } => write!(
                f,
                "telemetry transient error: {consecutive_misses} consecutive missing frames"
            ),
            Self::InvariantViolation(msg) => write!(f, "invariant violation: {msg}"),
        }
    }
}

impl std::error::Error for SupervisorError {}

impl From<std::io::Error> for SupervisorError {
    fn from(e: std::io::Error) -> Self {
        SupervisorError::Io(e)
    }
}

impl SupervisorError {
    /// True for errors the tick driver should treat as fatal (land and exit
    /// non-zero), as opposed to logged-and-continue conditions.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SupervisorError::Setup(_) | SupervisorError::InvariantViolation(_)
        )
    }
}
