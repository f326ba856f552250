pub mod estimate;
pub mod roofline;

pub use estimate::{Bottleneck, LayerEstimate, ModelEstimate};
pub use roofline::{estimate_layer, estimate_model, estimate_model_parallel};
