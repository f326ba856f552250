use super::layer::{checked_product, checked_sum, require_positive, Workload};
use crate::error::ShapeError;

/// Declared parameters of a 2-D convolution, NCHW input and KCRS weights
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conv2dShape {
  /// Batch
  pub n: u64,
  /// Input channels
  pub c: u64,
  pub h: u64,
  pub w: u64,
  /// Output channels
  pub k: u64,
  /// Kernel height
  pub r: u64,
  /// Kernel width
  pub s: u64,
  pub stride: u64,
  pub padding: u64,
  pub dilation: u64,
  pub dtype_bytes: u64,
}

impl Default for Conv2dShape {
  fn default() -> Self {
    Self {
      n: 1,
      c: 1,
      h: 1,
      w: 1,
      k: 1,
      r: 1,
      s: 1,
      stride: 1,
      padding: 0,
      dilation: 1,
      dtype_bytes: 2,
    }
  }
}

/// Validated convolution with its output extents and work quantities resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conv2d {
  name: String,
  shape: Conv2dShape,
  h_out: u64,
  w_out: u64,
  macs: u64,
  bytes_moved: u64,
}

/// `floor((in + 2*padding - dilation*(kernel-1) - 1) / stride) + 1`
///
/// `None` when the dilated kernel span does not fit in i128 or `stride` is zero.
pub fn output_extent(in_extent: u64, kernel: u64, stride: u64, padding: u64, dilation: u64) -> Option<i128> {
  let span = (dilation as i128).checked_mul(kernel as i128 - 1)?;
  let numer = (in_extent as i128 + 2 * padding as i128).checked_sub(span)? - 1;
  Some(numer.checked_div_euclid(stride as i128)? + 1)
}

impl Conv2d {
  pub fn new(name: impl Into<String>, shape: Conv2dShape) -> Result<Self, ShapeError> {
    let name = name.into();

    for (dim, value) in [
      ("N", shape.n),
      ("C", shape.c),
      ("H", shape.h),
      ("W", shape.w),
      ("K", shape.k),
      ("R", shape.r),
      ("S", shape.s),
      ("stride", shape.stride),
      ("dilation", shape.dilation),
      ("dtype_bytes", shape.dtype_bytes),
    ] {
      require_positive(&name, dim, value)?;
    }

    let h_out = Self::resolve_extent(&name, "height", shape.h, shape.r, &shape)?;
    let w_out = Self::resolve_extent(&name, "width", shape.w, shape.s, &shape)?;

    let macs = checked_product(&name, &[shape.n, shape.k, h_out, w_out, shape.c, shape.r, shape.s])?;
    // flops must stay representable too
    checked_product(&name, &[macs, 2])?;

    let b_in = checked_product(&name, &[shape.n, shape.c, shape.h, shape.w, shape.dtype_bytes])?;
    let b_w = checked_product(&name, &[shape.k, shape.c, shape.r, shape.s, shape.dtype_bytes])?;
    let b_out = checked_product(&name, &[shape.n, shape.k, h_out, w_out, shape.dtype_bytes])?;
    let bytes_moved = checked_sum(&name, &[b_in, b_w, b_out])?;

    Ok(Self {
      name,
      shape,
      h_out,
      w_out,
      macs,
      bytes_moved,
    })
  }

  fn resolve_extent(
    name: &str,
    axis: &'static str,
    in_extent: u64,
    kernel: u64,
    shape: &Conv2dShape,
  ) -> Result<u64, ShapeError> {
    let extent = output_extent(in_extent, kernel, shape.stride, shape.padding, shape.dilation).ok_or_else(|| {
      ShapeError::Overflow {
        layer: name.to_string(),
      }
    })?;
    if extent < 1 {
      return Err(ShapeError::EmptyOutput {
        layer: name.to_string(),
        axis,
        extent,
      });
    }
    u64::try_from(extent).map_err(|_| ShapeError::Overflow {
      layer: name.to_string(),
    })
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  pub fn shape(&self) -> &Conv2dShape {
    &self.shape
  }

  /// Output tensor shape as (N, K, H_out, W_out)
  pub fn output_dims(&self) -> (u64, u64, u64, u64) {
    (self.shape.n, self.shape.k, self.h_out, self.w_out)
  }
}

impl Workload for Conv2d {
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

  fn resnet_stem() -> Conv2dShape {
    Conv2dShape {
      n: 1,
      c: 3,
      h: 224,
      w: 224,
      k: 64,
      r: 7,
      s: 7,
      stride: 2,
      padding: 3,
      ..Conv2dShape::default()
    }
  }

  #[test]
  fn test_output_dims_strided_padded() {
    let conv = Conv2d::new("conv1", resnet_stem()).unwrap();
    assert_eq!(conv.output_dims(), (1, 64, 112, 112));
  }

  #[test]
  fn test_output_dims_dilated() {
    // effective kernel 5 with dilation 2 on a 3x3 kernel
    let shape = Conv2dShape {
      h: 10,
      w: 12,
      r: 3,
      s: 3,
      dilation: 2,
      ..Conv2dShape::default()
    };
    let conv = Conv2d::new("dilated", shape).unwrap();
    assert_eq!(conv.output_dims(), (1, 1, 6, 8));
  }

  #[test]
  fn test_work_quantities() {
    let conv = Conv2d::new("conv1", resnet_stem()).unwrap();
    let macs = 64 * 112 * 112 * 3 * 7 * 7;
    assert_eq!(conv.macs(), macs);
    assert_eq!(conv.flops(), 2 * macs);

    let bytes = (3 * 224 * 224 + 64 * 3 * 7 * 7 + 64 * 112 * 112) * 2;
    assert_eq!(conv.bytes_moved(), bytes);
  }

  #[test]
  fn test_kernel_larger_than_input() {
    let shape = Conv2dShape {
      h: 3,
      w: 8,
      r: 5,
      s: 1,
      ..Conv2dShape::default()
    };
    match Conv2d::new("too_small", shape) {
      Err(ShapeError::EmptyOutput { axis, extent, .. }) => {
        assert_eq!(axis, "height");
        assert_eq!(extent, -1);
      },
      other => panic!("expected EmptyOutput, got {:?}", other),
    }
  }

  #[test]
  fn test_zero_extent_is_rejected() {
    // 4 - 4 - 1 = -1, floor(-1 / 1) + 1 = 0
    let shape = Conv2dShape {
      h: 4,
      r: 5,
      ..Conv2dShape::default()
    };
    assert!(matches!(
      Conv2d::new("edge", shape),
      Err(ShapeError::EmptyOutput { extent: 0, .. })
    ));
  }

  #[test]
  fn test_non_positive_dims() {
    for shape in [
      Conv2dShape { c: 0, ..Conv2dShape::default() },
      Conv2dShape { stride: 0, ..Conv2dShape::default() },
      Conv2dShape { dilation: 0, ..Conv2dShape::default() },
      Conv2dShape { dtype_bytes: 0, ..Conv2dShape::default() },
    ] {
      assert!(matches!(
        Conv2d::new("bad", shape),
        Err(ShapeError::NonPositive { .. })
      ));
    }
  }

  #[test]
  fn test_output_extent_floor_division() {
    // (5 + 0 - 2 - 1) / 2 + 1 = 2
    assert_eq!(output_extent(5, 3, 2, 0, 1), Some(2));
    // (6 + 0 - 2 - 1) / 2 + 1 = 2, remainder dropped
    assert_eq!(output_extent(6, 3, 2, 0, 1), Some(2));
    // negative numerator floors toward negative infinity
    assert_eq!(output_extent(1, 4, 2, 0, 1), Some(-1));
    assert_eq!(output_extent(5, 3, 0, 0, 1), None);
  }

  #[test]
  fn test_huge_dilated_kernel_is_overflow() {
    assert_eq!(output_extent(1, u64::MAX, 1, 0, u64::MAX), None);

    let shape = Conv2dShape {
      dilation: u64::MAX,
      r: u64::MAX,
      ..Conv2dShape::default()
    };
    assert!(matches!(
      Conv2d::new("huge", shape),
      Err(ShapeError::Overflow { .. })
    ));
  }

  proptest! {
    #[test]
    fn prop_unit_stride_extent(h in 1u64..512, w in 1u64..512, r in 1u64..16, s in 1u64..16) {
      prop_assume!(r <= h && s <= w);
      let shape = Conv2dShape { h, w, r, s, ..Conv2dShape::default() };
      let conv = Conv2d::new("p", shape).unwrap();
      prop_assert_eq!(conv.output_dims(), (1, 1, h - r + 1, w - s + 1));
    }

    #[test]
    fn prop_oversized_kernel_rejected(h in 1u64..64, extra in 1u64..8) {
      let shape = Conv2dShape { h, w: h, r: h + extra, s: 1, ..Conv2dShape::default() };
      let is_empty_output = matches!(Conv2d::new("p", shape), Err(ShapeError::EmptyOutput { .. }));
      prop_assert!(is_empty_output);
    }
  }
}
