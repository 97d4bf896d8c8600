use clap::Args;
use thiserror::Error;
use tracing_subscriber::{EnvFilter, Layer, filter::ParseError, layer::SubscriberExt};

#[derive(Debug, Error)]
pub enum TracerError {
    #[error("Invalid log filter: {0}")]
    Filter(#[from] ParseError),
    #[error("Global tracing subscriber already set: {0}")]
    AlreadySet(#[from] tracing::subscriber::SetGlobalDefaultError),
}

#[derive(Debug, Clone, Args)]
pub struct TracerOptions {
    /// Log filter directives used when `RUST_LOG` is not set.
    #[clap(long, default_value = "info")]
    pub log_filter: String,

    /// Disable ANSI colour codes in the log output.
    #[clap(long)]
    pub no_ansi: bool,
}

impl Default for TracerOptions {
    fn default() -> Self {
        Self {
            log_filter: "info".to_owned(),
            no_ansi: false,
        }
    }
}

/// This object initialises the stdout tracer, given a TracerOptions struct.
pub struct TracerEngine {
    service_name: String,
}

impl TracerEngine {
    /// Initialises the stdout tracer for the crate
    /// #Arguments
    /// * `options` - The caller-specified instance of TracerOptions.
    /// * `service_name` - The name of the binary the tracer serves.
    /// * `module_name` - The name of the current module.
    /// #Returns
    /// An instance of TracerEngine
    pub fn new(
        options: TracerOptions,
        service_name: &str,
        module_name: &str,
    ) -> Result<Self, TracerError> {
        let stdout_tracer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stdout)
            .with_ansi(!options.no_ansi);

        // `RUST_LOG` takes precedence over the configured filter
        let log_filter = match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => EnvFilter::try_new(&options.log_filter)?,
        };

        let subscriber = tracing_subscriber::Registry::default()
            .with(stdout_tracer.with_filter(log_filter));

        tracing::subscriber::set_global_default(subscriber)?;
        tracing::trace!("Tracing enabled for module {module_name}");

        Ok(Self {
            service_name: service_name.to_owned(),
        })
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_use_info_level() {
        let options = TracerOptions::default();
        assert_eq!(options.log_filter, "info");
        assert!(!options.no_ansi);
    }
}
