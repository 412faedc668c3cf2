//! Global tracing setup. Call once at startup; repeat calls are ignored.
use tracing::Level;

#[cfg(not(target_arch = "wasm32"))]
pub fn init(default_level: Level) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level.to_string().to_lowercase()));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(target_arch = "wasm32")]
pub fn init(default_level: Level) {
    tracing_wasm::set_as_global_default_with_config(
        tracing_wasm::WASMLayerConfigBuilder::new()
            .set_max_level(default_level)
            .build(),
    );
}
