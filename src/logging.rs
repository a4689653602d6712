//! Diagnostic output.
//!
//! Logs go to stderr; stdout only ever carries the JSON result.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is not set: nothing, a summary of each phase,
/// or every raw chunk exchanged with the device.
pub fn default_directive(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "off",
        1 => "jbdread=info",
        _ => "jbdread=trace",
    }
}

pub fn init(verbosity: u8) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(verbosity)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directive() {
        assert_eq!(default_directive(0), "off");
        assert_eq!(default_directive(1), "jbdread=info");
        assert_eq!(default_directive(2), "jbdread=trace");
        assert_eq!(default_directive(5), "jbdread=trace");
    }
}
