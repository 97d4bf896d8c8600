mod tracer_engine;

pub use tracer_engine::{TracerEngine, TracerError, TracerOptions};

/// Should be called at the start of each component.
/// Expands to a `Result<TracerEngine, TracerError>`; the engine must be kept
/// alive for the lifetime of the component.
#[macro_export]
macro_rules! init_tracer {
    ($options:expr) => {{
        let tracer = $crate::TracerEngine::new($options, env!("CARGO_BIN_NAME"), module_path!());
        // Logged from the caller's module.
        if let Ok(tracer) = &tracer {
            tracing::debug!("Tracer initialised for {}", tracer.service_name());
        }
        tracer
    }};
}
