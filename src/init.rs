use crate::layer::RedisLayer;
use crate::provider::SinkProvider;
use std::sync::Arc;
use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::Registry;

/// Options for installing [`RedisLayer`] as the global subscriber.
///
/// **Fields**
/// - `enable_stdout`: if `true`, a `tracing_subscriber::fmt::Layer` is
///   stacked on top so events are also printed to the console.
#[derive(Clone, Debug)]
pub struct LayerConfig {
    pub enable_stdout: bool,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self { enable_stdout: true }
    }
}

/// Install a global `tracing` subscriber that forwards events to `provider`.
///
/// **Parameters**
/// - `provider`: connected [`SinkProvider`]; shared so the caller can keep a
///   handle for explicit teardown at shutdown.
/// - `config`: [`LayerConfig`] controlling the extra console output.
///
/// **Returns**
/// - `Err(..)` if a global subscriber was already installed.
pub fn init_tracing_with_config(
    provider: Arc<SinkProvider>,
    config: LayerConfig,
) -> Result<(), SetGlobalDefaultError> {
    let layer = RedisLayer::new(provider);

    // The two subscriber shapes have different types, so each branch
    // installs its own.
    if config.enable_stdout {
        let fmt_layer = tracing_subscriber::fmt::layer();
        let subscriber = Registry::default().with(layer).with(fmt_layer);
        tracing::subscriber::set_global_default(subscriber)
    } else {
        let subscriber = Registry::default().with(layer);
        tracing::subscriber::set_global_default(subscriber)
    }
}

/// Equivalent to [`init_tracing_with_config`] with [`LayerConfig::default`].
pub fn init_tracing(provider: Arc<SinkProvider>) -> Result<(), SetGlobalDefaultError> {
    init_tracing_with_config(provider, LayerConfig::default())
}
