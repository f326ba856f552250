use serde::Serialize;
use std::fmt;

/// Which side of the roofline limits a layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Bottleneck {
  ComputeBound,
  MemoryBound,
}

impl fmt::Display for Bottleneck {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(match self {
      Bottleneck::ComputeBound => "compute",
      Bottleneck::MemoryBound => "memory",
    })
  }
}

/// Cost of one layer on one accelerator
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerEstimate {
  pub name: String,
  pub macs: u64,
  pub flops: u64,
  pub bytes_dram: u64,
  pub t_compute_s: f64,
  pub t_memory_s: f64,
  /// `max(t_compute_s, t_memory_s)`
  pub t_layer_s: f64,
  #[serde(rename = "energy_pJ")]
  pub energy_pj: f64,
}

impl LayerEstimate {
  pub fn bottleneck(&self) -> Bottleneck {
    if self.t_memory_s > self.t_compute_s {
      Bottleneck::MemoryBound
    } else {
      Bottleneck::ComputeBound
    }
  }

  /// MACs per byte of DRAM traffic
  pub fn arithmetic_intensity(&self) -> f64 {
    if self.bytes_dram == 0 {
      return 0.0;
    }
    self.macs as f64 / self.bytes_dram as f64
  }
}

/// Per-layer estimates in model order. Totals are derived on every call.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ModelEstimate {
  layers: Vec<LayerEstimate>,
}

impl ModelEstimate {
  pub fn new(layers: Vec<LayerEstimate>) -> Self {
    Self { layers }
  }

  pub fn layers(&self) -> &[LayerEstimate] {
    &self.layers
  }

  pub fn len(&self) -> usize {
    self.layers.len()
  }

  pub fn is_empty(&self) -> bool {
    self.layers.is_empty()
  }

  /// Strict sum of layer times; layers never overlap each other
  pub fn total_latency_s(&self) -> f64 {
    self.layers.iter().map(|l| l.t_layer_s).sum()
  }

  pub fn total_energy_pj(&self) -> f64 {
    self.layers.iter().map(|l| l.energy_pj).sum()
  }

  /// Each layer fits in u64, the model-wide sum may not
  pub fn total_macs(&self) -> u128 {
    self.layers.iter().map(|l| u128::from(l.macs)).sum()
  }

  pub fn total_flops(&self) -> u128 {
    self.layers.iter().map(|l| u128::from(l.flops)).sum()
  }

  pub fn total_bytes_dram(&self) -> u128 {
    self.layers.iter().map(|l| u128::from(l.bytes_dram)).sum()
  }
}

impl From<Vec<LayerEstimate>> for ModelEstimate {
  fn from(layers: Vec<LayerEstimate>) -> Self {
    Self::new(layers)
  }
}

impl<'a> IntoIterator for &'a ModelEstimate {
  type Item = &'a LayerEstimate;
  type IntoIter = std::slice::Iter<'a, LayerEstimate>;

  fn into_iter(self) -> Self::IntoIter {
    self.layers.iter()
  }
}
