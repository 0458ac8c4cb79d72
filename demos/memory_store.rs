use serde_json::json;
use std::sync::Arc;

use tracing_redis_sink::{EventId, Exception, Level, LogState, MemoryConnectionFactory, SinkProvider};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let factory = MemoryConnectionFactory::new();
    let provider = SinkProvider::builder()
        .descriptor("localhost:6379")
        .list_key("logs")
        .minimum_level(Level::Debug)
        .connection_factory(Arc::new(factory.clone()))
        .build()?;

    let emitter = provider.get_or_create_emitter("Demo")?;
    let state = LogState::pairs([
        ("{OriginalFormat}", json!("user {userId} logged in")),
        ("userId", json!(42)),
    ]);
    let formatter = |_: Option<&LogState>, _: Option<&Exception>| "user 42 logged in".to_string();
    emitter.log(Level::Information, EventId::new(1), Some(&state), None, Some(&formatter))?;

    let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "socket timed out");
    let exception = Exception::new(&io);
    let formatter = |_: Option<&LogState>, _: Option<&Exception>| "sync failed".to_string();
    emitter.log(Level::Error, EventId::named(2, "SyncFailed"), None, Some(&exception), Some(&formatter))?;

    // Below the threshold: nothing is pushed.
    let formatter = |_: Option<&LogState>, _: Option<&Exception>| "noise".to_string();
    emitter.log(Level::Trace, EventId::default(), None, None, Some(&formatter))?;

    for payload in factory.list("logs") {
        println!("{}", String::from_utf8_lossy(&payload));
    }

    provider.teardown();
    Ok(())
}
