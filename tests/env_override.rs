use accel_sim::simulator::config::config::{load_accelerator, AcceleratorOverrides};
use std::env;
use std::fs;

// Environment is process-global; keep every env-dependent check in this one test.
#[test]
fn test_env_layering() {
  let dir = env::temp_dir().join(format!("accel-sim-env-{}", std::process::id()));
  fs::create_dir_all(&dir).unwrap();
  let path = dir.join("accel.yaml");
  fs::write(
    &path,
    "name: env-test\npe_array:\n  rows: 4\n  cols: 4\ndram:\n  bw_bps: 1.0e9\nenergy:\n  e_mac_pj: 1.0\n  e_dram_pj_per_b: 0.5\n",
  )
  .unwrap();

  env::set_var("ACCEL_SIM_DRAM__BW_BPS", "4e9");
  let accel = load_accelerator(&path, &AcceleratorOverrides::default()).unwrap();
  assert_eq!(accel.dram_bw_bps(), 4e9);
  assert_eq!(accel.name(), "env-test");

  // command line beats environment
  let overrides = AcceleratorOverrides {
    dram_bw_bps: Some(8e9),
    ..AcceleratorOverrides::default()
  };
  let accel = load_accelerator(&path, &overrides).unwrap();
  assert_eq!(accel.dram_bw_bps(), 8e9);

  env::remove_var("ACCEL_SIM_DRAM__BW_BPS");
  let accel = load_accelerator(&path, &AcceleratorOverrides::default()).unwrap();
  assert_eq!(accel.dram_bw_bps(), 1e9);

  fs::remove_dir_all(&dir).unwrap();
}
