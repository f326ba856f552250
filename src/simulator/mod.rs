pub mod config;
pub mod sim;
pub mod simulator;
pub mod utils;

pub use simulator::{run_analytical, Simulator};
pub use utils::log::init_log;
