use super::layer::{checked_product, checked_sum, require_positive, Workload};
use crate::error::ShapeError;

/// `[M x K] x [K x N] = [M x N]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatMulShape {
  pub m: u64,
  pub k: u64,
  pub n: u64,
  pub dtype_bytes: u64,
}

impl Default for MatMulShape {
  fn default() -> Self {
    Self {
      m: 1,
      k: 1,
      n: 1,
      dtype_bytes: 2,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatMul {
  name: String,
  shape: MatMulShape,
  macs: u64,
  bytes_moved: u64,
}

impl MatMul {
  pub fn new(name: impl Into<String>, shape: MatMulShape) -> Result<Self, ShapeError> {
    let name = name.into();

    require_positive(&name, "M", shape.m)?;
    require_positive(&name, "K", shape.k)?;
    require_positive(&name, "N", shape.n)?;
    require_positive(&name, "dtype_bytes", shape.dtype_bytes)?;

    let macs = checked_product(&name, &[shape.m, shape.k, shape.n])?;
    checked_product(&name, &[macs, 2])?;

    let a = checked_product(&name, &[shape.m, shape.k, shape.dtype_bytes])?;
    let b = checked_product(&name, &[shape.k, shape.n, shape.dtype_bytes])?;
    let c = checked_product(&name, &[shape.m, shape.n, shape.dtype_bytes])?;
    let bytes_moved = checked_sum(&name, &[a, b, c])?;

    Ok(Self {
      name,
      shape,
      macs,
      bytes_moved,
    })
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn shape(&self) -> &MatMulShape {
    &self.shape
  }
}

impl Workload for MatMul {
  fn dtype_bytes(&self) -> u64 {
    self.shape.dtype_bytes
  }

  fn macs(&self) -> u64 {
    self.macs
  }

  fn bytes_moved(&self) -> u64 {
    self.bytes_moved
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use proptest::prelude::*;

  #[test]
  fn test_square_fp16() {
    let mm = MatMul::new("gemm", MatMulShape { m: 64, k: 64, n: 64, dtype_bytes: 2 }).unwrap();
    assert_eq!(mm.macs(), 262_144);
    assert_eq!(mm.flops(), 524_288);
    assert_eq!(mm.bytes_moved(), 24_576);
  }

  #[test]
  fn test_rectangular() {
    let mm = MatMul::new("proj", MatMulShape { m: 128, k: 768, n: 3072, dtype_bytes: 1 }).unwrap();
    assert_eq!(mm.macs(), 128 * 768 * 3072);
    assert_eq!(mm.bytes_moved(), 128 * 768 + 768 * 3072 + 128 * 3072);
  }

  #[test]
  fn test_zero_dimension() {
    let err = MatMul::new("empty", MatMulShape { k: 0, ..MatMulShape::default() }).unwrap_err();
    assert!(matches!(err, ShapeError::NonPositive { dim: "K", .. }));
  }

  #[test]
  fn test_overflow_is_rejected() {
    let shape = MatMulShape {
      m: u64::MAX / 2,
      k: 4,
      n: 1,
      dtype_bytes: 1,
    };
    assert!(matches!(MatMul::new("huge", shape), Err(ShapeError::Overflow { .. })));
  }

  proptest! {
    #[test]
    fn prop_matmul_formulas(
      m in 1u64..4096,
      k in 1u64..4096,
      n in 1u64..4096,
      dtype_bytes in 1u64..9,
    ) {
      let mm = MatMul::new("p", MatMulShape { m, k, n, dtype_bytes }).unwrap();
      prop_assert_eq!(mm.macs(), m * k * n);
      prop_assert_eq!(mm.flops(), 2 * mm.macs());
      prop_assert_eq!(mm.bytes_moved(), (m * k + k * n + m * n) * dtype_bytes);
    }
  }
}
