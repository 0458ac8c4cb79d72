use crate::error::SinkError;
use crate::exception::Exception;
use crate::level::Level;
use crate::provider::Outlet;
use crate::record::LogRecord;
use crate::state::{capture_state, LogState};
use chrono::Utc;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// Turns the call's state and error into the record message.
pub type Formatter<'a> = dyn Fn(Option<&LogState>, Option<&Exception>) -> String + 'a;

/// Identifier of a logged event. An `id` of zero means "no id".
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct EventId {
    pub id: i32,
    pub name: Option<String>,
}

impl EventId {
    /// Event with an id and no name.
    pub fn new(id: i32) -> Self {
        EventId { id, name: None }
    }

    pub fn named(id: i32, name: impl Into<String>) -> Self {
        EventId {
            id,
            name: Some(name.into()),
        }
    }
}

impl From<i32> for EventId {
    fn from(id: i32) -> Self {
        EventId::new(id)
    }
}

/// Handle returned by [`Emitter::begin_scope`]. Dropping it does nothing;
/// records are never enriched with scope data.
#[derive(Debug, Clone, Copy, Default)]
pub struct Scope;

/// Per-category logger created by a [`SinkProvider`].
///
/// [`SinkProvider`]: crate::provider::SinkProvider
pub struct Emitter {
    outlet: Arc<Outlet>,
    category: String,
}

impl Emitter {
    pub(crate) fn new(outlet: Arc<Outlet>, category: String) -> Self {
        Emitter { outlet, category }
    }

    /// Category stamped on every record from this emitter.
    pub fn category(&self) -> &str {
        &self.category
    }

    /// `None` is always disabled; anything else must reach the provider's
    /// minimum level.
    pub fn is_enabled(&self, level: Level) -> bool {
        level != Level::None && level >= self.outlet.minimum_level()
    }

    /// Open a scope for `_state`.
    ///
    /// **Returns**
    /// - A [`Scope`] whose drop does nothing; scope state never reaches
    ///   records.
    pub fn begin_scope<S>(&self, _state: S) -> Scope {
        Scope
    }

    /// Build a record for one logging call and push it to the store.
    ///
    /// Returns `Ok(())` when the level is disabled, when the formatter
    /// produced nothing and no error is attached, and whenever the store
    /// write fails. The only error is [`SinkError::MissingFormatter`] for an
    /// enabled call made without a formatter.
    pub fn log(
        &self,
        level: Level,
        event_id: EventId,
        state: Option<&LogState>,
        exception: Option<&Exception>,
        formatter: Option<&Formatter<'_>>,
    ) -> Result<(), SinkError> {
        if !self.is_enabled(level) {
            return Ok(());
        }

        let formatter = formatter.ok_or(SinkError::MissingFormatter)?;
        let message = formatter(state, exception);

        if message.is_empty() && exception.is_none() {
            return Ok(());
        }

        let record = LogRecord {
            timestamp: Utc::now(),
            level: level.as_str().to_string(),
            category: self.category.clone(),
            event_id: (event_id.id != 0).then_some(event_id.id),
            event_name: event_id.name,
            message: (!message.is_empty()).then_some(message),
            exception: exception.map(ToString::to_string),
            state: capture_state(state),
        };

        self.forward(&record);
        Ok(())
    }

    // Logging must never fail the caller: serialization errors, store errors
    // and panics inside the store client all end here. Whatever the process
    // panic hook prints for a caught panic is up to the host.
    fn forward(&self, record: &LogRecord) {
        let Ok(payload) = record.to_json() else {
            return;
        };
        let _ = panic::catch_unwind(AssertUnwindSafe(|| self.outlet.write(&payload)));
    }
}

impl std::fmt::Debug for Emitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Emitter")
            .field("category", &self.category)
            .field("minimum_level", &self.outlet.minimum_level())
            .finish()
    }
}
