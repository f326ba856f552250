use super::config::config::{load_accelerator, AcceleratorOverrides};
use super::sim::mode::{RunMode, SimConfig};
use super::utils::report::{write_csv, write_json};
use crate::arch::AcceleratorDescriptor;
use crate::error::Result;
use crate::estimator::{estimate_model, estimate_model_parallel, ModelEstimate};
use crate::model::{load_model, Layer};
use std::path::Path;

/// Estimate a layer list on one accelerator, in order, on the calling thread.
pub fn run_analytical(layers: &[Layer], accel: &AcceleratorDescriptor) -> ModelEstimate {
  estimate_model(layers, accel)
}

/// One estimation run: an accelerator, the layers to cost, and how to run them
pub struct Simulator {
  config: SimConfig,
  accel: AcceleratorDescriptor,
  layers: Vec<Layer>,
}

impl Simulator {
  pub fn new(config: SimConfig, accel: AcceleratorDescriptor, layers: Vec<Layer>) -> Self {
    Self { config, accel, layers }
  }

  /// Load the accelerator config and model description from disk
  pub fn from_paths(
    config: SimConfig,
    accel_path: &Path,
    model_path: &Path,
    overrides: &AcceleratorOverrides,
  ) -> Result<Self> {
    let accel = load_accelerator(accel_path, overrides)?;
    let layers = load_model(model_path)?;
    Ok(Self::new(config, accel, layers))
  }

  pub fn config(&self) -> &SimConfig {
    &self.config
  }

  pub fn accelerator(&self) -> &AcceleratorDescriptor {
    &self.accel
  }

  pub fn layers(&self) -> &[Layer] {
    &self.layers
  }

  pub fn run(&self) -> ModelEstimate {
    match self.config.run_mode {
      RunMode::Serial => estimate_model(&self.layers, &self.accel),
      RunMode::Parallel => estimate_model_parallel(&self.layers, &self.accel),
    }
  }

  /// Run, then write whichever exports the config asks for
  pub fn run_and_export(&self) -> Result<ModelEstimate> {
    let estimate = self.run();
    if let Some(path) = &self.config.csv_out {
      write_csv(&estimate, path)?;
    }
    if let Some(path) = &self.config.json_out {
      write_json(&estimate, path)?;
    }
    Ok(estimate)
  }
}
