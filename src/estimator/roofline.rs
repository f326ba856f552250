use super::estimate::{LayerEstimate, ModelEstimate};
use crate::arch::AcceleratorDescriptor;
use crate::model::{Layer, Workload};
use rayon::prelude::*;

/// Roofline cost of one layer.
///
/// Compute and DRAM transfer are assumed to overlap completely, so the layer
/// takes the larger of the two times. Energy is additive since both happen
/// regardless of overlap.
pub fn estimate_layer(layer: &Layer, accel: &AcceleratorDescriptor) -> LayerEstimate {
  let macs = layer.macs();
  let flops = layer.flops();

  // descriptor guarantees macs_per_cycle >= 1
  let cycles = macs.div_ceil(accel.macs_per_cycle());
  let t_compute_s = cycles as f64 / accel.cycles_per_second();

  let bytes_dram = layer.bytes_moved();
  let t_memory_s = bytes_dram as f64 / accel.dram_bw_bps();

  let t_layer_s = t_compute_s.max(t_memory_s);

  let energy_pj = macs as f64 * accel.e_mac_pj() + bytes_dram as f64 * accel.e_dram_pj_per_b();

  log::debug!(
    "{}: macs={} bytes={} t_compute={:e}s t_memory={:e}s energy={}pJ",
    layer.name(),
    macs,
    bytes_dram,
    t_compute_s,
    t_memory_s,
    energy_pj
  );

  LayerEstimate {
    name: layer.name().to_string(),
    macs,
    flops,
    bytes_dram,
    t_compute_s,
    t_memory_s,
    t_layer_s,
    energy_pj,
  }
}

/// Estimate every layer in order and collect the results.
pub fn estimate_model(layers: &[Layer], accel: &AcceleratorDescriptor) -> ModelEstimate {
  let estimate: ModelEstimate = layers
    .iter()
    .map(|layer| estimate_layer(layer, accel))
    .collect::<Vec<_>>()
    .into();
  log_totals(&estimate, accel);
  estimate
}

/// Same as [`estimate_model`], with layers spread over the rayon pool.
/// Output order still follows `layers`.
pub fn estimate_model_parallel(layers: &[Layer], accel: &AcceleratorDescriptor) -> ModelEstimate {
  let estimate: ModelEstimate = layers
    .par_iter()
    .map(|layer| estimate_layer(layer, accel))
    .collect::<Vec<_>>()
    .into();
  log_totals(&estimate, accel);
  estimate
}

fn log_totals(estimate: &ModelEstimate, accel: &AcceleratorDescriptor) {
  log::info!(
    "Estimated {} layer(s) on {}: latency={:e}s energy={}pJ",
    estimate.len(),
    accel.name(),
    estimate.total_latency_s(),
    estimate.total_energy_pj()
  );
}
