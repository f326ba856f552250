pub mod config;

pub use config::{load_accelerator, AcceleratorFile, AcceleratorOverrides};
