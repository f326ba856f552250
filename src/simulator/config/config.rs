use crate::arch::{AcceleratorDescriptor, AcceleratorParams};
use crate::error::ConfigError;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment prefix for overrides, e.g. `ACCEL_SIM_DRAM__BW_BPS=2e9`
pub const ENV_PREFIX: &str = "ACCEL_SIM";

const DEFAULT_NAME: &str = "GenericSim";
const DEFAULT_FREQUENCY_GHZ: f64 = 1.0;
const DEFAULT_MAC_PER_CYCLE: i64 = 1;

/// PE array section
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct PeArraySection {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub rows: Option<i64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub cols: Option<i64>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub mac_per_cycle: Option<i64>,
}

/// DRAM section
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct DramSection {
  #[serde(rename = "bw_Bps", alias = "bw_bps", default, skip_serializing_if = "Option::is_none")]
  pub bw_bps: Option<f64>,
}

/// Energy section
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct EnergySection {
  #[serde(rename = "e_mac_pJ", alias = "e_mac_pj", default, skip_serializing_if = "Option::is_none")]
  pub e_mac_pj: Option<f64>,
  #[serde(
    rename = "e_dram_pJ_per_B",
    alias = "e_dram_pj_per_b",
    default,
    skip_serializing_if = "Option::is_none"
  )]
  pub e_dram_pj_per_b: Option<f64>,
}

/// Accelerator config file layout (YAML or TOML)
///
/// ```yaml
/// name: edge-npu
/// frequency_GHz: 1.0
/// pe_array: { rows: 16, cols: 16, mac_per_cycle: 1 }
/// dram: { bw_Bps: 1.0e9 }
/// energy: { e_mac_pJ: 1.0, e_dram_pJ_per_B: 0.1 }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct AcceleratorFile {
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub name: Option<String>,
  #[serde(rename = "frequency_GHz", alias = "frequency_ghz", default, skip_serializing_if = "Option::is_none")]
  pub frequency_ghz: Option<f64>,
  #[serde(default)]
  pub pe_array: PeArraySection,
  #[serde(default)]
  pub dram: DramSection,
  #[serde(default)]
  pub energy: EnergySection,
}

impl AcceleratorFile {
  /// Fill defaults, reject missing required fields and build raw parameters
  pub fn into_params(self) -> Result<AcceleratorParams, ConfigError> {
    let pe_rows = count("pe_array.rows", required("pe_array.rows", self.pe_array.rows)?)?;
    let pe_cols = count("pe_array.cols", required("pe_array.cols", self.pe_array.cols)?)?;
    let macs_per_pe_per_cycle = count(
      "pe_array.mac_per_cycle",
      self.pe_array.mac_per_cycle.unwrap_or(DEFAULT_MAC_PER_CYCLE),
    )?;

    Ok(AcceleratorParams {
      name: self.name.unwrap_or_else(|| DEFAULT_NAME.to_string()),
      pe_rows,
      pe_cols,
      macs_per_pe_per_cycle,
      frequency_ghz: self.frequency_ghz.unwrap_or(DEFAULT_FREQUENCY_GHZ),
      dram_bw_bps: required("dram.bw_Bps", self.dram.bw_bps)?,
      e_mac_pj: required("energy.e_mac_pJ", self.energy.e_mac_pj)?,
      e_dram_pj_per_b: required("energy.e_dram_pJ_per_B", self.energy.e_dram_pj_per_b)?,
    })
  }
}

impl From<&AcceleratorDescriptor> for AcceleratorFile {
  fn from(accel: &AcceleratorDescriptor) -> Self {
    Self {
      name: Some(accel.name().to_string()),
      frequency_ghz: Some(accel.frequency_ghz()),
      pe_array: PeArraySection {
        rows: i64::try_from(accel.pe_rows()).ok(),
        cols: i64::try_from(accel.pe_cols()).ok(),
        mac_per_cycle: i64::try_from(accel.macs_per_pe_per_cycle()).ok(),
      },
      dram: DramSection {
        bw_bps: Some(accel.dram_bw_bps()),
      },
      energy: EnergySection {
        e_mac_pj: Some(accel.e_mac_pj()),
        e_dram_pj_per_b: Some(accel.e_dram_pj_per_b()),
      },
    }
  }
}

fn required<T>(field: &'static str, value: Option<T>) -> Result<T, ConfigError> {
  value.ok_or(ConfigError::Missing(field))
}

fn count(field: &'static str, value: i64) -> Result<u64, ConfigError> {
  match u64::try_from(value) {
    Ok(v) if v > 0 => Ok(v),
    _ => Err(ConfigError::OutOfRange {
      field,
      expected: "a positive integer",
      value: value as f64,
    }),
  }
}

/// Values given on the command line; they win over file and environment
#[derive(Debug, Clone, Default)]
pub struct AcceleratorOverrides {
  pub name: Option<String>,
  pub frequency_ghz: Option<f64>,
  pub dram_bw_bps: Option<f64>,
}

pub fn apply_cli_overrides(file: &mut AcceleratorFile, overrides: &AcceleratorOverrides) {
  if let Some(name) = &overrides.name {
    file.name = Some(name.clone());
  }
  if let Some(freq) = overrides.frequency_ghz {
    file.frequency_ghz = Some(freq);
  }
  if let Some(bw) = overrides.dram_bw_bps {
    file.dram.bw_bps = Some(bw);
  }
}

/// Read a config file, format taken from its extension, with environment overrides layered on top
pub fn load_config_file(path: &Path) -> Result<AcceleratorFile, ConfigError> {
  let settings = Config::builder()
    .add_source(File::from(path))
    .add_source(
      Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true),
    )
    .build()?;

  Ok(settings.try_deserialize::<AcceleratorFile>()?)
}

/// Parse config text directly, without environment layering
pub fn parse_config_str(content: &str, format: FileFormat) -> Result<AcceleratorFile, ConfigError> {
  let settings = Config::builder().add_source(File::from_str(content, format)).build()?;

  Ok(settings.try_deserialize::<AcceleratorFile>()?)
}

/// Load and validate
///
/// 1. read the file, layering `ACCEL_SIM_*` environment variables
/// 2. apply CLI overrides
/// 3. fill defaults and check required fields
/// 4. validate ranges and derive throughput constants
pub fn load_accelerator(path: &Path, overrides: &AcceleratorOverrides) -> Result<AcceleratorDescriptor, ConfigError> {
  let mut file = load_config_file(path)?;
  apply_cli_overrides(&mut file, overrides);
  let accel = AcceleratorDescriptor::new(file.into_params()?)?;

  log::info!(
    "Loaded accelerator `{}` from {:?}: {}x{} PEs, {} MACs/cycle, {} GHz, {:e} B/s",
    accel.name(),
    path,
    accel.pe_rows(),
    accel.pe_cols(),
    accel.macs_per_cycle(),
    accel.frequency_ghz(),
    accel.dram_bw_bps()
  );

  Ok(accel)
}

/// Resolved descriptor in the config file layout, as TOML
pub fn to_toml(accel: &AcceleratorDescriptor) -> Result<String, ConfigError> {
  toml::to_string_pretty(&AcceleratorFile::from(accel)).map_err(|e| ConfigError::Invalid(e.to_string()))
}

#[cfg(test)]
mod tests {
  use super::*;

  const YAML: &str = r#"
name: edge-npu
frequency_GHz: 0.8
pe_array:
  rows: 32
  cols: 16
  mac_per_cycle: 2
dram:
  bw_Bps: 2.5e10
energy:
  e_mac_pJ: 0.5
  e_dram_pJ_per_B: 20.0
"#;

  fn descriptor(content: &str, format: FileFormat) -> Result<AcceleratorDescriptor, ConfigError> {
    AcceleratorDescriptor::new(parse_config_str(content, format)?.into_params()?)
  }

  #[test]
  fn test_yaml_config() {
    let accel = descriptor(YAML, FileFormat::Yaml).unwrap();
    assert_eq!(accel.name(), "edge-npu");
    assert_eq!(accel.macs_per_cycle(), 32 * 16 * 2);
    assert_eq!(accel.cycles_per_second(), 0.8e9);
    assert_eq!(accel.dram_bw_bps(), 2.5e10);
    assert_eq!(accel.e_dram_pj_per_b(), 20.0);
  }

  #[test]
  fn test_toml_defaults() {
    let toml = r#"
[pe_array]
rows = 8
cols = 8

[dram]
bw_Bps = 1e9

[energy]
e_mac_pJ = 1.0
e_dram_pJ_per_B = 0.0
"#;
    let accel = descriptor(toml, FileFormat::Toml).unwrap();
    assert_eq!(accel.name(), "GenericSim");
    assert_eq!(accel.frequency_ghz(), 1.0);
    assert_eq!(accel.macs_per_pe_per_cycle(), 1);
    assert_eq!(accel.macs_per_cycle(), 64);
  }

  #[test]
  fn test_missing_field() {
    let yaml = "pe_array: { rows: 4, cols: 4 }\nenergy: { e_mac_pJ: 1.0, e_dram_pJ_per_B: 1.0 }\n";
    assert_eq!(descriptor(yaml, FileFormat::Yaml).unwrap_err(), ConfigError::Missing("dram.bw_Bps"));
  }

  #[test]
  fn test_non_numeric_field() {
    let yaml = YAML.replace("bw_Bps: 2.5e10", "bw_Bps: fast");
    assert!(matches!(descriptor(&yaml, FileFormat::Yaml), Err(ConfigError::Invalid(_))));
  }

  #[test]
  fn test_out_of_range() {
    let yaml = YAML.replace("rows: 32", "rows: -2");
    assert!(matches!(
      descriptor(&yaml, FileFormat::Yaml),
      Err(ConfigError::OutOfRange { field: "pe_array.rows", .. })
    ));

    let yaml = YAML.replace("bw_Bps: 2.5e10", "bw_Bps: 0.0");
    assert!(matches!(
      descriptor(&yaml, FileFormat::Yaml),
      Err(ConfigError::OutOfRange { field: "dram_bw_Bps", .. })
    ));
  }

  #[test]
  fn test_cli_overrides() {
    let mut file = parse_config_str(YAML, FileFormat::Yaml).unwrap();
    apply_cli_overrides(
      &mut file,
      &AcceleratorOverrides {
        name: Some("fast-dram".to_string()),
        frequency_ghz: None,
        dram_bw_bps: Some(1e11),
      },
    );
    let accel = AcceleratorDescriptor::new(file.into_params().unwrap()).unwrap();
    assert_eq!(accel.name(), "fast-dram");
    assert_eq!(accel.frequency_ghz(), 0.8);
    assert_eq!(accel.dram_bw_bps(), 1e11);
  }

  #[test]
  fn test_toml_echo_reloads() {
    let accel = descriptor(YAML, FileFormat::Yaml).unwrap();
    let echoed = to_toml(&accel).unwrap();
    assert!(echoed.contains("frequency_GHz"));
    let reloaded = descriptor(&echoed, FileFormat::Toml).unwrap();
    assert_eq!(reloaded, accel);
  }
}
