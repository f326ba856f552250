use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Accelerator configuration is missing a field or holds an out-of-range value
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
  #[error("missing accelerator field `{0}`")]
  Missing(&'static str),

  #[error("accelerator field `{field}` must be {expected}, got {value}")]
  OutOfRange {
    field: &'static str,
    expected: &'static str,
    value: f64,
  },

  #[error("invalid accelerator config: {0}")]
  Invalid(String),
}

impl From<config::ConfigError> for ConfigError {
  fn from(e: config::ConfigError) -> Self {
    ConfigError::Invalid(e.to_string())
  }
}

/// Layer dimensions that cannot describe a real tensor operation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
  #[error("layer `{layer}`: dimension `{dim}` must be {expected}, got {value}")]
  NonPositive {
    layer: String,
    dim: &'static str,
    expected: &'static str,
    value: i128,
  },

  #[error("layer `{layer}`: output {axis} extent is {extent}, must be at least 1")]
  EmptyOutput {
    layer: String,
    axis: &'static str,
    extent: i128,
  },

  #[error("layer `{layer}`: dimension `{dim}` is missing or not an integer")]
  InvalidDimension { layer: String, dim: &'static str },

  #[error("layer `{layer}`: work quantities overflow u64")]
  Overflow { layer: String },
}

/// A model description names a layer kind with no cost model
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported layer type `{kind}` (layer `{layer}`)")]
pub struct UnsupportedOperationError {
  pub kind: String,
  pub layer: String,
}

#[derive(Debug, Error)]
pub enum Error {
  #[error(transparent)]
  Config(#[from] ConfigError),

  #[error(transparent)]
  Shape(#[from] ShapeError),

  #[error(transparent)]
  Unsupported(#[from] UnsupportedOperationError),

  #[error("invalid model description: {0}")]
  Model(String),

  #[error("cannot access {path:?}: {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

impl From<serde_json::Error> for Error {
  fn from(e: serde_json::Error) -> Self {
    Error::Model(e.to_string())
  }
}

pub type Result<T> = std::result::Result<T, Error>;
