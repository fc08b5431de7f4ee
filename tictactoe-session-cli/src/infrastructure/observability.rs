use crate::infrastructure::error::{CliError, Result};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Logging configuration
///
/// Logs go to stderr so they never interleave with the board on stdout.
#[derive(Debug, Clone)]
pub struct LogConfig {
    pub default_level: tracing::Level,
    pub show_targets: bool,
    pub show_thread_ids: bool,
    pub show_logs: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            default_level: tracing::Level::INFO,
            show_targets: true,
            show_thread_ids: false,
            show_logs: true,
        }
    }
}

impl LogConfig {
    /// Development configuration (verbose, human-readable)
    pub fn dev() -> Self {
        Self {
            default_level: tracing::Level::DEBUG,
            show_thread_ids: true,
            ..Default::default()
        }
    }

    /// Only warnings and errors; used while a game is being played
    pub fn quiet() -> Self {
        Self {
            default_level: tracing::Level::WARN,
            show_targets: false,
            ..Default::default()
        }
    }

    pub fn with_level(mut self, level: tracing::Level) -> Self {
        self.default_level = level;
        self
    }

    pub fn without_logs(mut self) -> Self {
        self.show_logs = false;
        self
    }

    /// Directives used when `RUST_LOG` is not set
    pub fn directives(&self) -> String {
        let level = self.default_level.to_string().to_lowercase();
        format!(
            "tictactoe_cli={level},tictactoe_session_cli={level},tictactoe_session_core={level},tictactoe_session_p2p={level},matchbox_socket=warn"
        )
    }

    pub fn init(self) -> Result<()> {
        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(self.directives()));

        let result = if self.show_logs {
            let fmt_layer = fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(self.show_targets)
                .with_thread_ids(self.show_thread_ids);

            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt_layer)
                .try_init()
        } else {
            tracing_subscriber::registry().with(env_filter).try_init()
        };

        result.map_err(|e| CliError::Logging(e.to_string()))
    }
}
