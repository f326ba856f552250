use super::conv2d::Conv2d;
use super::matmul::MatMul;
use crate::error::ShapeError;

/// Work quantities every layer kind must report.
///
/// Counts assume inputs, weights and outputs cross the DRAM boundary
/// exactly once per evaluation.
pub trait Workload {
  /// Element width in bytes for every tensor of the layer
  fn dtype_bytes(&self) -> u64;

  /// Multiply-accumulate count
  fn macs(&self) -> u64;

  /// Arithmetic operations, one multiply and one add per MAC
  fn flops(&self) -> u64 {
    2 * self.macs()
  }

  /// Bytes read from and written to DRAM
  fn bytes_moved(&self) -> u64;
}

/// One operation of a model, closed over the supported kinds
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Layer {
  Conv2d(Conv2d),
  MatMul(MatMul),
}

impl Layer {
  pub fn name(&self) -> &str {
    match self {
      Layer::Conv2d(conv) => conv.name(),
      Layer::MatMul(mm) => mm.name(),
    }
  }

  pub fn kind(&self) -> &'static str {
    match self {
      Layer::Conv2d(_) => "conv2d",
      Layer::MatMul(_) => "matmul",
    }
  }
}

impl Workload for Layer {
  fn dtype_bytes(&self) -> u64 {
    match self {
      Layer::Conv2d(conv) => conv.dtype_bytes(),
      Layer::MatMul(mm) => mm.dtype_bytes(),
    }
  }

  fn macs(&self) -> u64 {
    match self {
      Layer::Conv2d(conv) => conv.macs(),
      Layer::MatMul(mm) => mm.macs(),
    }
  }

  fn flops(&self) -> u64 {
    match self {
      Layer::Conv2d(conv) => conv.flops(),
      Layer::MatMul(mm) => mm.flops(),
    }
  }

  fn bytes_moved(&self) -> u64 {
    match self {
      Layer::Conv2d(conv) => conv.bytes_moved(),
      Layer::MatMul(mm) => mm.bytes_moved(),
    }
  }
}

impl From<Conv2d> for Layer {
  fn from(conv: Conv2d) -> Self {
    Layer::Conv2d(conv)
  }
}

impl From<MatMul> for Layer {
  fn from(mm: MatMul) -> Self {
    Layer::MatMul(mm)
  }
}

pub(crate) fn require_positive(layer: &str, dim: &'static str, value: u64) -> Result<u64, ShapeError> {
  if value == 0 {
    return Err(ShapeError::NonPositive {
      layer: layer.to_string(),
      dim,
      expected: "at least 1",
      value: 0,
    });
  }
  Ok(value)
}

/// Product of tensor extents, rejecting anything that does not fit in u64
pub(crate) fn checked_product(layer: &str, factors: &[u64]) -> Result<u64, ShapeError> {
  factors
    .iter()
    .try_fold(1u64, |acc, &f| acc.checked_mul(f))
    .ok_or_else(|| ShapeError::Overflow {
      layer: layer.to_string(),
    })
}

pub(crate) fn checked_sum(layer: &str, terms: &[u64]) -> Result<u64, ShapeError> {
  terms
    .iter()
    .try_fold(0u64, |acc, &t| acc.checked_add(t))
    .ok_or_else(|| ShapeError::Overflow {
      layer: layer.to_string(),
    })
}
