use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_FILTER: &str = "debt_engine_core=warn,debt_engine=warn";
const VERBOSE_FILTER: &str = "debt_engine_core=debug,debt_engine=debug";

/// Install the stderr subscriber. `RUST_LOG` wins over `--verbose`.
pub fn init_tracing(verbose: bool) {
    let fallback = if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
