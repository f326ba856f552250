pub mod mode;

pub use mode::{RunMode, SimConfig};
