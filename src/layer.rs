use crate::emitter::EventId;
use crate::exception::Exception;
use crate::level::Level;
use crate::provider::SinkProvider;
use crate::state::LogState;
use serde_json::Value;
use std::error::Error;
use std::sync::Arc;
use tracing::field::{Field, Visit};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::registry::LookupSpan;

/// Field carrying the numeric event id.
pub const EVENT_ID_FIELD: &str = "event_id";
/// Field carrying the event name.
pub const EVENT_NAME_FIELD: &str = "event_name";

const OWN_TARGET: &str = env!("CARGO_CRATE_NAME");

fn is_own_target(target: &str) -> bool {
    target == OWN_TARGET
        || target
            .strip_prefix(OWN_TARGET)
            .is_some_and(|rest| rest.starts_with("::"))
}

/// `tracing_subscriber` layer that turns events into records on a Redis
/// list through a [`SinkProvider`].
///
/// The event target is used as the category. Everything runs inline on the
/// thread that emitted the event; a store failure only loses that record.
///
/// Errors recorded on events reach the layer type-erased, so their
/// `exception` field carries the message and cause chain but no type name.
/// Call [`Emitter::log`](crate::emitter::Emitter::log) with
/// [`Exception::new`] directly when the type name matters.
pub struct RedisLayer {
    provider: Arc<SinkProvider>,
}

impl RedisLayer {
    /// Wrap `provider`. Keep a clone of the `Arc` to tear it down at shutdown.
    pub fn new(provider: Arc<SinkProvider>) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &Arc<SinkProvider> {
        &self.provider
    }
}

impl<S> Layer<S> for RedisLayer
where
    S: Subscriber + for<'span> LookupSpan<'span>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();
        // The provider's own diagnostics must not loop back into the store.
        if is_own_target(meta.target()) {
            return;
        }

        let level = Level::from(*meta.level());
        let Ok(emitter) = self.provider.get_or_create_emitter(meta.target()) else {
            return;
        };
        if !emitter.is_enabled(level) {
            return;
        }

        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);

        let message = visitor.message.take().unwrap_or_default();
        let state = (!visitor.fields.is_empty()).then(|| LogState::Pairs(std::mem::take(&mut visitor.fields)));
        let event_id = EventId {
            id: visitor.event_id.unwrap_or(0),
            name: visitor.event_name.take(),
        };
        let formatter = move |_: Option<&LogState>, _: Option<&Exception>| message.clone();

        let _ = emitter.log(
            level,
            event_id,
            state.as_ref(),
            visitor.exception.as_ref(),
            Some(&formatter),
        );
    }
}

/// Collects the fields of one event.
#[derive(Default)]
pub struct FieldVisitor {
    pub fields: Vec<(String, Value)>,
    pub message: Option<String>,
    pub event_id: Option<i32>,
    pub event_name: Option<String>,
    pub exception: Option<Exception>,
}

impl FieldVisitor {
    fn push(&mut self, field: &Field, value: Value) {
        self.fields.push((field.name().to_string(), value));
    }

    fn record_id(&mut self, field: &Field, value: Value, id: Option<i32>) {
        match id {
            Some(id) if field.name() == EVENT_ID_FIELD => self.event_id = Some(id),
            _ => self.push(field, value),
        }
    }
}

impl Visit for FieldVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "message" => self.message = Some(value.to_string()),
            EVENT_NAME_FIELD => self.event_name = Some(value.to_string()),
            _ => self.push(field, Value::String(value.to_string())),
        }
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.record_id(field, Value::from(value), i32::try_from(value).ok());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.record_id(field, Value::from(value), i32::try_from(value).ok());
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.push(field, Value::from(value));
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.push(field, Value::from(value));
    }

    fn record_error(&mut self, field: &Field, value: &(dyn Error + 'static)) {
        if self.exception.is_none() {
            self.exception = Some(Exception::from_dyn(value));
        } else {
            self.push(field, Value::String(value.to_string()));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let rendered = format!("{:?}", value);
        match field.name() {
            "message" => self.message = Some(rendered),
            EVENT_NAME_FIELD => self.event_name = Some(rendered),
            _ => self.push(field, Value::String(rendered)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryConnectionFactory;
    use serde_json::json;
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::Registry;

    fn provider(factory: &MemoryConnectionFactory, minimum: Level) -> Arc<SinkProvider> {
        Arc::new(
            SinkProvider::builder()
                .descriptor("memory")
                .list_key("logs")
                .minimum_level(minimum)
                .connection_factory(Arc::new(factory.clone()))
                .build()
                .unwrap(),
        )
    }

    #[derive(thiserror::Error, Debug)]
    #[error("payment declined")]
    struct Declined;

    #[test]
    fn forwards_events_with_fields() {
        let factory = MemoryConnectionFactory::new();
        let subscriber = Registry::default().with(RedisLayer::new(provider(&factory, Level::Information)));

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(target: "billing", user_id = 42, plan = "pro", "user upgraded");
            tracing::debug!(target: "billing", "filtered out");
        });

        let records = factory.records("logs");
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record["category"], json!("billing"));
        assert_eq!(record["level"], json!("Information"));
        assert_eq!(record["message"], json!("user upgraded"));
        assert_eq!(record["state"], json!({"user_id": 42, "plan": "pro"}));
    }

    #[test]
    fn event_fields_and_errors_are_lifted() {
        let factory = MemoryConnectionFactory::new();
        let subscriber = Registry::default().with(RedisLayer::new(provider(&factory, Level::Trace)));

        tracing::subscriber::with_default(subscriber, || {
            let err = Declined;
            tracing::error!(
                target: "billing",
                event_id = 7,
                event_name = "Boom",
                error = &err as &(dyn Error + 'static),
                "charge failed"
            );
        });

        let record = &factory.records("logs")[0];
        assert_eq!(record["eventId"], json!(7));
        assert_eq!(record["eventName"], json!("Boom"));
        assert_eq!(record["level"], json!("Error"));
        assert!(record["exception"].as_str().unwrap().contains("payment declined"));
        assert!(record.get("state").is_none());
    }

    #[test]
    fn only_this_crate_targets_are_skipped() {
        assert!(is_own_target(OWN_TARGET));
        assert!(is_own_target(&format!("{}::provider", OWN_TARGET)));
        assert!(!is_own_target(&format!("{}_ext", OWN_TARGET)));
        assert!(!is_own_target("app"));

        let factory = MemoryConnectionFactory::new();
        let subscriber = Registry::default().with(RedisLayer::new(provider(&factory, Level::Trace)));
        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(target: "tracing_redis_sink_ext", "neighbour crate");
            tracing::info!(target: "tracing_redis_sink::provider", "own diagnostics");
        });

        let records = factory.records("logs");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["category"], json!("tracing_redis_sink_ext"));
    }

    #[test]
    fn torn_down_provider_makes_layer_inert() {
        let factory = MemoryConnectionFactory::new();
        let provider = provider(&factory, Level::Trace);
        let subscriber = Registry::default().with(RedisLayer::new(Arc::clone(&provider)));

        provider.teardown();
        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!(target: "app", "after teardown");
        });

        assert_eq!(factory.push_count(), 0);
    }
}
