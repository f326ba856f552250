pub mod conv2d;
pub mod layer;
pub mod loader;
pub mod matmul;

pub use conv2d::{Conv2d, Conv2dShape};
pub use layer::{Layer, Workload};
pub use loader::{load_model, parse_model};
pub use matmul::{MatMul, MatMulShape};
