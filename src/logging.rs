use std::sync::Once;

static TRACING_INIT: Once = Once::new();

/// Install the global fmt subscriber. `RUST_LOG` adds to the default
/// `recurria=info` directive. Later calls do nothing.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter = match "recurria=info".parse() {
            Ok(directive) => EnvFilter::from_default_env().add_directive(directive),
            Err(_) => EnvFilter::from_default_env(),
        };

        // Logs go to stderr so command output stays clean
        fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    });
}
