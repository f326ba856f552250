//! Analytical latency and energy estimation for neural-network layers on a
//! parameterised accelerator, using a roofline (compute vs. DRAM) model.

pub mod arch;
pub mod error;
pub mod estimator;
pub mod model;
pub mod simulator;

pub use arch::{AcceleratorDescriptor, AcceleratorParams};
pub use error::{ConfigError, Error, Result, ShapeError, UnsupportedOperationError};
pub use estimator::{estimate_layer, estimate_model, estimate_model_parallel, Bottleneck, LayerEstimate, ModelEstimate};
pub use model::{Conv2d, Conv2dShape, Layer, MatMul, MatMulShape, Workload};
pub use simulator::sim::mode::{RunMode, SimConfig};
pub use simulator::Simulator;
