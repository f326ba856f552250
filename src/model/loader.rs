//! Model description loader
//!
//! A description is a JSON document listing operations in evaluation order:
//!
//! ```json
//! { "dtype_bytes": 2,
//!   "ops": [ { "type": "conv2d", "name": "conv1", "C": 3, "H": 224, "W": 224, "K": 64, "R": 7, "S": 7 },
//!            { "type": "gemm", "M": 1, "K": 512, "N": 1000 } ] }
//! ```

use super::conv2d::{Conv2d, Conv2dShape};
use super::layer::Layer;
use super::matmul::{MatMul, MatMulShape};
use crate::error::{Error, Result, ShapeError, UnsupportedOperationError};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

const DEFAULT_DTYPE_BYTES: i64 = 2;

#[derive(Debug, Deserialize)]
struct ModelDescription {
  #[serde(default)]
  dtype_bytes: Option<i64>,
  ops: Vec<Map<String, Value>>,
}

/// Dimension lookup for one operation entry
struct OpDims<'a> {
  layer: &'a str,
  op: &'a Map<String, Value>,
}

impl OpDims<'_> {
  fn required(&self, key: &'static str) -> std::result::Result<u64, ShapeError> {
    match self.op.get(key) {
      Some(value) => self.to_extent(key, value),
      None => Err(self.invalid(key)),
    }
  }

  fn optional(&self, key: &'static str, default: i64) -> std::result::Result<u64, ShapeError> {
    match self.op.get(key) {
      Some(value) => self.to_extent(key, value),
      None => self.check_sign(key, default),
    }
  }

  fn to_extent(&self, key: &'static str, value: &Value) -> std::result::Result<u64, ShapeError> {
    let raw = value.as_i64().ok_or_else(|| self.invalid(key))?;
    self.check_sign(key, raw)
  }

  fn check_sign(&self, key: &'static str, raw: i64) -> std::result::Result<u64, ShapeError> {
    u64::try_from(raw).map_err(|_| ShapeError::NonPositive {
      layer: self.layer.to_string(),
      dim: key,
      expected: "non-negative",
      value: raw as i128,
    })
  }

  fn invalid(&self, key: &'static str) -> ShapeError {
    ShapeError::InvalidDimension {
      layer: self.layer.to_string(),
      dim: key,
    }
  }
}

/// Build one layer from an operation entry.
pub fn layer_from_op(op: &Map<String, Value>, default_dtype_bytes: i64) -> Result<Layer> {
  let kind = op
    .get("type")
    .and_then(Value::as_str)
    .ok_or_else(|| Error::Model("operation without a `type` string".to_string()))?;
  let kind_lc = kind.to_lowercase();
  let name = op
    .get("name")
    .and_then(Value::as_str)
    .map(str::to_string)
    .unwrap_or_else(|| kind_lc.clone());

  let dims = OpDims { layer: &name, op };
  let dtype_bytes = dims.optional("dtype_bytes", default_dtype_bytes)?;

  let layer = match kind_lc.as_str() {
    "conv2d" => {
      let shape = Conv2dShape {
        n: dims.optional("N", 1)?,
        c: dims.required("C")?,
        h: dims.required("H")?,
        w: dims.required("W")?,
        k: dims.required("K")?,
        r: dims.required("R")?,
        s: dims.required("S")?,
        stride: dims.optional("stride", 1)?,
        padding: dims.optional("padding", 0)?,
        dilation: dims.optional("dilation", 1)?,
        dtype_bytes,
      };
      Layer::from(Conv2d::new(name, shape)?)
    },
    "matmul" | "gemm" => {
      // `N` wins over the older `Nn` spelling
      let n = if op.contains_key("N") {
        dims.required("N")?
      } else {
        dims.optional("Nn", 1)?
      };
      let shape = MatMulShape {
        m: dims.required("M")?,
        k: dims.required("K")?,
        n,
        dtype_bytes,
      };
      Layer::from(MatMul::new(name, shape)?)
    },
    _ => {
      return Err(
        UnsupportedOperationError {
          kind: kind.to_string(),
          layer: name,
        }
        .into(),
      )
    },
  };

  Ok(layer)
}

/// Parse a JSON model description into layers, preserving operation order.
pub fn parse_model(json: &str) -> Result<Vec<Layer>> {
  let desc: ModelDescription = serde_json::from_str(json)?;
  let default_dtype_bytes = desc.dtype_bytes.unwrap_or(DEFAULT_DTYPE_BYTES);

  desc
    .ops
    .iter()
    .map(|op| layer_from_op(op, default_dtype_bytes))
    .collect()
}

/// Read and parse a JSON model description from disk.
pub fn load_model(path: &Path) -> Result<Vec<Layer>> {
  let content = fs::read_to_string(path).map_err(|source| Error::Io {
    path: path.to_path_buf(),
    source,
  })?;
  let layers = parse_model(&content)?;
  log::info!("Loaded {} layer(s) from {:?}", layers.len(), path);
  Ok(layers)
}
