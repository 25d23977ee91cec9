use tracing_subscriber::EnvFilter;

/// Installs a stderr subscriber that also receives `log` records.
///
/// `RUST_LOG` overrides the default filter.
pub fn setup_logger(verbose: bool) {
    let mut filter = if verbose { "debug" } else { "info" }.to_string();
    for target in ["reqwest::connect", "hyper_util", "rustls"] {
        filter.push_str(&format!(",{target}=info"));
    }

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init();
}
