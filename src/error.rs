use std::path::PathBuf;
use thiserror::Error;

/// Name every surfaced error is tagged with.
pub const PLUGIN_NAME: &str = "moltres-link";

/// Fatal errors surfaced to the host pipeline.
#[derive(Debug, Error)]
pub enum LinkError {
    /// Item content was a live stream instead of a buffer
    #[error("{plugin}: Streaming not supported")]
    StreamingUnsupported { plugin: &'static str },

    /// A dependency names a module that no descriptor declared
    #[error("{plugin}: Cannot find module {kind}:{name}")]
    ModuleNotFound {
        plugin: &'static str,
        kind: String,
        name: String,
    },

    /// A module depends on itself, directly or through others
    #[error("{plugin}: Cyclic dependency: {}", .chain.join(" -> "))]
    CyclicDependency {
        plugin: &'static str,
        chain: Vec<String>,
    },

    /// Anything else, wrapped with the file it happened on if known
    #[error("{plugin}: {}{source:#}", .file.as_ref().map(|p| format!("{}: ", p.display())).unwrap_or_default())]
    Plugin {
        plugin: &'static str,
        file: Option<PathBuf>,
        #[source]
        source: anyhow::Error,
    },
}

impl LinkError {
    pub fn streaming_unsupported() -> Self {
        Self::StreamingUnsupported {
            plugin: PLUGIN_NAME,
        }
    }

    pub fn module_not_found(kind: &str, name: &str) -> Self {
        Self::ModuleNotFound {
            plugin: PLUGIN_NAME,
            kind: kind.to_string(),
            name: name.to_string(),
        }
    }

    pub fn cyclic(chain: Vec<String>) -> Self {
        Self::CyclicDependency {
            plugin: PLUGIN_NAME,
            chain,
        }
    }

    pub fn plugin(file: Option<PathBuf>, source: impl Into<anyhow::Error>) -> Self {
        Self::Plugin {
            plugin: PLUGIN_NAME,
            file,
            source: source.into(),
        }
    }

    pub fn plugin_name(&self) -> &'static str {
        match self {
            Self::StreamingUnsupported { plugin }
            | Self::ModuleNotFound { plugin, .. }
            | Self::CyclicDependency { plugin, .. }
            | Self::Plugin { plugin, .. } => plugin,
        }
    }
}
