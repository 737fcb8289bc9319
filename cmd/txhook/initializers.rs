use tracing_subscriber::{EnvFilter, Registry, filter::Directive, fmt, layer::SubscriberExt};

use crate::cli::Options;

/// Installs the global subscriber. `RUST_LOG` directives take precedence over `--log.level`.
pub fn init_tracing(opts: &Options) -> eyre::Result<()> {
    let log_filter = EnvFilter::builder()
        .with_default_directive(Directive::from(opts.log_level))
        .from_env_lossy();

    let subscriber = Registry::default()
        .with(log_filter)
        .with(fmt::layer().with_writer(std::io::stderr));

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
