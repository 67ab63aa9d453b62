use thiserror::Error;

/// Invocation mistakes. These are reported together with the usage text.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("No data file specified with -d|--data and no data file found in first argument")]
    MissingData,

    #[error("Can't read template from stdin, already reading JSON from stdin")]
    StdinConflict,

    #[error("Can't name an output file in directory '{0}' for a template read from stdin")]
    StdinToDirectory(String),
}
