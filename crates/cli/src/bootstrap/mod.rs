mod config;
mod logging;
mod panic;

pub use config::load_config;
pub use logging::init_logging;
pub use panic::install_panic_hook;
