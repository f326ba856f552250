pub mod accelerator;

pub use accelerator::{AcceleratorDescriptor, AcceleratorParams};
