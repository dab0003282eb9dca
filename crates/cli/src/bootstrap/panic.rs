use std::backtrace::Backtrace;
use tracing::error;

/// Routes panic reports through tracing with a captured backtrace, so a
/// query that panics is logged like every other event before the
/// dispatcher contains it.
pub fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        let detail = if let Some(s) = info.payload().downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_string()
        };
        let location = info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()))
            .unwrap_or_default();

        error!(
            panic = %detail,
            location = %location,
            backtrace = %Backtrace::force_capture(),
            "Panic"
        );
    }));
}
