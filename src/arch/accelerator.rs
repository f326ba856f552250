// Abstract accelerator: a PE grid fed by a single flat DRAM channel

use crate::error::ConfigError;

/// Raw hardware parameters, before validation
#[derive(Debug, Clone, PartialEq)]
pub struct AcceleratorParams {
  /// Free-form label
  pub name: String,
  pub pe_rows: u64,
  pub pe_cols: u64,
  pub macs_per_pe_per_cycle: u64,
  pub frequency_ghz: f64,
  /// Sustained DRAM bandwidth, bytes per second
  pub dram_bw_bps: f64,
  /// Energy per MAC, picojoules
  pub e_mac_pj: f64,
  /// Energy per DRAM byte, picojoules
  pub e_dram_pj_per_b: f64,
}

impl Default for AcceleratorParams {
  fn default() -> Self {
    Self {
      name: "GenericSim".to_string(),
      pe_rows: 16,
      pe_cols: 16,
      macs_per_pe_per_cycle: 1,
      frequency_ghz: 1.0,
      dram_bw_bps: 1e9,
      e_mac_pj: 1.0,
      e_dram_pj_per_b: 0.1,
    }
  }
}

/// Validated, immutable accelerator description.
///
/// `macs_per_cycle` and `cycles_per_second` are derived once at construction.
#[derive(Debug, Clone, PartialEq)]
pub struct AcceleratorDescriptor {
  params: AcceleratorParams,
  macs_per_cycle: u64,
  cycles_per_second: f64,
}

impl AcceleratorDescriptor {
  pub fn new(params: AcceleratorParams) -> Result<Self, ConfigError> {
    positive_int("pe_rows", params.pe_rows)?;
    positive_int("pe_cols", params.pe_cols)?;
    positive_int("macs_per_pe_per_cycle", params.macs_per_pe_per_cycle)?;
    positive_real("frequency_GHz", params.frequency_ghz)?;
    positive_real("dram_bw_Bps", params.dram_bw_bps)?;
    non_negative_real("e_mac_pJ", params.e_mac_pj)?;
    non_negative_real("e_dram_pJ_per_B", params.e_dram_pj_per_b)?;

    let macs_per_cycle = params
      .pe_rows
      .checked_mul(params.pe_cols)
      .and_then(|v| v.checked_mul(params.macs_per_pe_per_cycle))
      .ok_or_else(|| ConfigError::Invalid("pe_rows * pe_cols * macs_per_pe_per_cycle overflows u64".to_string()))?;

    let cycles_per_second = params.frequency_ghz * 1e9;
    positive_real("frequency_GHz", cycles_per_second)?;

    Ok(Self {
      params,
      macs_per_cycle,
      cycles_per_second,
    })
  }

  pub fn name(&self) -> &str {
    &self.params.name
  }

  pub fn params(&self) -> &AcceleratorParams {
    &self.params
  }

  pub fn pe_rows(&self) -> u64 {
    self.params.pe_rows
  }

  pub fn pe_cols(&self) -> u64 {
    self.params.pe_cols
  }

  pub fn macs_per_pe_per_cycle(&self) -> u64 {
    self.params.macs_per_pe_per_cycle
  }

  pub fn frequency_ghz(&self) -> f64 {
    self.params.frequency_ghz
  }

  pub fn dram_bw_bps(&self) -> f64 {
    self.params.dram_bw_bps
  }

  pub fn e_mac_pj(&self) -> f64 {
    self.params.e_mac_pj
  }

  pub fn e_dram_pj_per_b(&self) -> f64 {
    self.params.e_dram_pj_per_b
  }

  /// Aggregate MAC throughput of the whole PE grid
  pub fn macs_per_cycle(&self) -> u64 {
    self.macs_per_cycle
  }

  pub fn cycles_per_second(&self) -> f64 {
    self.cycles_per_second
  }

  pub fn peak_macs_per_second(&self) -> f64 {
    self.macs_per_cycle as f64 * self.cycles_per_second
  }

  /// MACs per DRAM byte at which compute and memory time are equal
  pub fn ridge_point_macs_per_byte(&self) -> f64 {
    self.peak_macs_per_second() / self.params.dram_bw_bps
  }
}

fn positive_int(field: &'static str, value: u64) -> Result<(), ConfigError> {
  if value == 0 {
    return Err(ConfigError::OutOfRange {
      field,
      expected: "a positive integer",
      value: 0.0,
    });
  }
  Ok(())
}

fn positive_real(field: &'static str, value: f64) -> Result<(), ConfigError> {
  if !value.is_finite() || value <= 0.0 {
    return Err(ConfigError::OutOfRange {
      field,
      expected: "finite and > 0",
      value,
    });
  }
  Ok(())
}

fn non_negative_real(field: &'static str, value: f64) -> Result<(), ConfigError> {
  if !value.is_finite() || value < 0.0 {
    return Err(ConfigError::OutOfRange {
      field,
      expected: "finite and >= 0",
      value,
    });
  }
  Ok(())
}
