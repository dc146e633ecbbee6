use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// Result type used by the engine crate.
pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors produced at the fallible edges of the engine: configuration files,
/// scenario files and the worker bridge.
///
/// Playback operations themselves never fail; out-of-range requests are
/// clamped or ignored instead.
#[derive(Debug)]
pub enum EngineError {
    InvalidConfig {
        reason: String,
    },
    Io {
        context: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
    Serialization {
        path: PathBuf,
        source: serde_json::Error,
    },
    BridgeDisconnected,
}

impl Display for EngineError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidConfig { reason } => write!(f, "invalid sync config: {reason}"),
            Self::Io {
                context,
                path,
                source,
            } => write!(f, "{context}: {} ({source})", path.display()),
            Self::Serialization { path, source } => {
                write!(f, "deserialization failed at {} ({source})", path.display())
            }
            Self::BridgeDisconnected => write!(f, "engine bridge is disconnected"),
        }
    }
}

impl std::error::Error for EngineError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Serialization { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Reads and deserializes one JSON file.
pub fn read_json_file<T>(context: &'static str, path: &std::path::Path) -> Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let raw = std::fs::read_to_string(path).map_err(|source| EngineError::Io {
        context,
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| EngineError::Serialization {
        path: path.to_path_buf(),
        source,
    })
}
