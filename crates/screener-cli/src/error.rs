use screener_core::ToggleError;
use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] screener_core::ValidationError),

    #[error(transparent)]
    Config(#[from] screener_core::ConfigError),

    #[error(transparent)]
    Toggle(#[from] ToggleError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::Toggle(ToggleError::UnknownTicker { .. }) => 2,
            Self::Toggle(_) => 6,
            Self::Serialization(_) => 4,
            Self::Config(_) => 7,
            Self::Io(_) => 10,
        }
    }
}
