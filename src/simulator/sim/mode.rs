use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
  /// Layers estimated one after another on the calling thread
  #[default]
  Serial,
  /// Layers spread across the rayon thread pool
  Parallel,
}

#[derive(Debug, Clone, Default)]
pub struct SimConfig {
  pub run_mode: RunMode,
  pub quiet: bool,
  pub csv_out: Option<PathBuf>,
  pub json_out: Option<PathBuf>,
}
