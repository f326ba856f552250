use crate::arch::AcceleratorDescriptor;
use crate::error::{Error, Result};
use crate::estimator::ModelEstimate;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

const CSV_HEADER: &str = "layer,macs,flops,bytes_dram,t_compute_s,t_memory_s,t_layer_s,energy_pJ";

pub fn humanize_time(s: f64) -> String {
  if s < 1e-6 {
    format!("{:.2} ns", s * 1e9)
  } else if s < 1e-3 {
    format!("{:.2} µs", s * 1e6)
  } else if s < 1.0 {
    format!("{:.2} ms", s * 1e3)
  } else {
    format!("{:.3} s", s)
  }
}

pub fn humanize_energy(pj: f64) -> String {
  if pj < 1e3 {
    format!("{:.2} pJ", pj)
  } else if pj < 1e6 {
    format!("{:.2} nJ", pj / 1e3)
  } else if pj < 1e9 {
    format!("{:.2} µJ", pj / 1e6)
  } else if pj < 1e12 {
    format!("{:.2} mJ", pj / 1e9)
  } else {
    format!("{:.2} J", pj / 1e12)
  }
}

/// 1234567 -> "1,234,567"
pub fn group_thousands(value: u64) -> String {
  let digits = value.to_string();
  let mut out = String::with_capacity(digits.len() + digits.len() / 3);
  for (i, ch) in digits.chars().enumerate() {
    if i > 0 && (digits.len() - i) % 3 == 0 {
      out.push(',');
    }
    out.push(ch);
  }
  out
}

/// Text report: accelerator roofline summary, one row per layer, then totals
pub fn render_report(est: &ModelEstimate, accel: &AcceleratorDescriptor) -> String {
  let mut out = String::new();
  let _ = writeln!(
    out,
    "Accelerator: {} ({} MACs/cycle @ {} GHz), peak {:.3e} MACs/s, ridge point {:.2} MACs/B",
    accel.name(),
    group_thousands(accel.macs_per_cycle()),
    accel.frequency_ghz(),
    accel.peak_macs_per_second(),
    accel.ridge_point_macs_per_byte()
  );
  let _ = writeln!(
    out,
    "Layer, MACs, Bytes(DRAM), Intensity(MACs/B), ComputeTime, MemoryTime, LayerTime, Energy, Bound"
  );
  for l in est {
    let _ = writeln!(
      out,
      "{}, {}, {}, {:.2}, {}, {}, {}, {}, {}",
      l.name,
      group_thousands(l.macs),
      group_thousands(l.bytes_dram),
      l.arithmetic_intensity(),
      humanize_time(l.t_compute_s),
      humanize_time(l.t_memory_s),
      humanize_time(l.t_layer_s),
      humanize_energy(l.energy_pj),
      l.bottleneck()
    );
  }
  let _ = writeln!(out, "\nTOTAL Latency: {}", humanize_time(est.total_latency_s()));
  let _ = writeln!(out, "TOTAL Energy: {}", humanize_energy(est.total_energy_pj()));
  out
}

pub fn print_report(est: &ModelEstimate, accel: &AcceleratorDescriptor) {
  print!("{}", render_report(est, accel));
}

fn csv_field(field: &str) -> String {
  if field.contains(|c: char| matches!(c, ',' | '"' | '\n' | '\r')) {
    format!("\"{}\"", field.replace('"', "\"\""))
  } else {
    field.to_string()
  }
}

/// Per-layer rows followed by a TOTAL row
pub fn render_csv(est: &ModelEstimate) -> String {
  let mut out = String::new();
  let _ = writeln!(out, "{}", CSV_HEADER);
  for l in est {
    let _ = writeln!(
      out,
      "{},{},{},{},{},{},{},{}",
      csv_field(&l.name),
      l.macs,
      l.flops,
      l.bytes_dram,
      l.t_compute_s,
      l.t_memory_s,
      l.t_layer_s,
      l.energy_pj
    );
  }
  // compute and memory time have no meaningful total
  let _ = writeln!(
    out,
    "TOTAL,{},{},{},,,{},{}",
    est.total_macs(),
    est.total_flops(),
    est.total_bytes_dram(),
    est.total_latency_s(),
    est.total_energy_pj()
  );
  out
}

fn write_file(path: &Path, content: &str) -> Result<()> {
  fs::write(path, content).map_err(|source| Error::Io {
    path: path.to_path_buf(),
    source,
  })
}

pub fn write_csv(est: &ModelEstimate, path: &Path) -> Result<()> {
  write_file(path, &render_csv(est))?;
  log::info!("Saved CSV: {:?}", path);
  Ok(())
}

pub fn write_json(est: &ModelEstimate, path: &Path) -> Result<()> {
  let json = serde_json::to_string_pretty(est)?;
  write_file(path, &json)?;
  log::info!("Saved JSON: {:?}", path);
  Ok(())
}
