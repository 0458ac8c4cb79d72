use std::sync::Arc;
use tracing::{error, info, warn};

use tracing_redis_sink::env::{env_or, LOG_SINK_REDIS_CONNECTION_ENV, LOG_SINK_REDIS_LIST_KEY_ENV};
use tracing_redis_sink::init::init_tracing;
use tracing_redis_sink::{Level, SinkProvider};

#[derive(thiserror::Error, Debug)]
#[error("upstream returned 503")]
struct UpstreamError;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let provider = SinkProvider::builder()
        .descriptor(env_or(LOG_SINK_REDIS_CONNECTION_ENV, "localhost:6379"))
        .list_key(env_or(LOG_SINK_REDIS_LIST_KEY_ENV, "logs"))
        .minimum_level(Level::Information)
        .build()?;
    let provider = Arc::new(provider);

    init_tracing(Arc::clone(&provider))?;

    info!(target: "checkout", order_id = 1234, "order placed");
    warn!(target: "checkout", retries = 3, "payment gateway slow");
    let err = UpstreamError;
    error!(
        target: "checkout",
        event_id = 500,
        event_name = "UpstreamFailed",
        error = &err as &(dyn std::error::Error + 'static),
        "could not reach payment gateway"
    );

    provider.teardown();
    Ok(())
}
