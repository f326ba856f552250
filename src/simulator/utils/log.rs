use env_logger::{Builder, Env};
use std::io::Write;

/// Initialise the global logger once; later calls are ignored.
///
/// `RUST_LOG` wins when set, otherwise `info` (or `warn` when quiet).
pub fn init_log(quiet: bool) {
  let default_filter = if quiet { "warn" } else { "info" };

  let _ = Builder::from_env(Env::default().default_filter_or(default_filter))
    .format(|buf, record| writeln!(buf, "\x1b[34m[{}]\x1b[0m {}", record.level(), record.args()))
    .try_init();
}
