use crate::connection::{ConnectionFactory, RedisConnectionFactory, StoreConnection};
use crate::emitter::Emitter;
use crate::error::{SinkError, StoreError};
use crate::level::Level;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Write side shared between a provider and the emitters it created.
pub(crate) struct Outlet {
    list_key: String,
    minimum_level: Level,
    connection: Box<dyn StoreConnection>,
    disposed: AtomicBool,
}

impl Outlet {
    pub(crate) fn minimum_level(&self) -> Level {
        self.minimum_level
    }

    /// Push one payload onto the destination list, or do nothing once
    /// the provider is torn down.
    pub(crate) fn write(&self, payload: &[u8]) -> Result<(), StoreError> {
        if self.disposed.load(Ordering::Acquire) {
            return Ok(());
        }
        self.connection.right_push(&self.list_key, payload)
    }
}

/// Owns the store connection and hands out one [`Emitter`] per category.
///
/// Dropping the provider tears it down. Emitters that outlive it keep
/// working as silent no-ops.
pub struct SinkProvider {
    outlet: Arc<Outlet>,
    emitters: DashMap<String, Arc<Emitter>>,
}

impl SinkProvider {
    /// Connect to Redis with the default threshold (everything enabled).
    pub fn new(descriptor: impl Into<String>, list_key: impl Into<String>) -> Result<Self, SinkError> {
        Self::builder().descriptor(descriptor).list_key(list_key).build()
    }

    /// Start a [`SinkProviderBuilder`] with no descriptor, no list key and
    /// the allow-all threshold.
    pub fn builder() -> SinkProviderBuilder {
        SinkProviderBuilder::default()
    }

    /// Destination list key.
    pub fn list_key(&self) -> &str {
        &self.outlet.list_key
    }

    pub fn minimum_level(&self) -> Level {
        self.outlet.minimum_level
    }

    /// `true` once [`teardown`](Self::teardown) has run.
    pub fn is_disposed(&self) -> bool {
        self.outlet.disposed.load(Ordering::Acquire)
    }

    /// Return the emitter for `category`, creating it on first use.
    ///
    /// Concurrent first calls for the same name all observe the same
    /// instance. Fails with [`SinkError::Disposed`] after teardown.
    pub fn get_or_create_emitter(&self, category: &str) -> Result<Arc<Emitter>, SinkError> {
        if self.is_disposed() {
            return Err(SinkError::Disposed);
        }

        if let Some(existing) = self.emitters.get(category) {
            return Ok(Arc::clone(existing.value()));
        }

        let emitter = self
            .emitters
            .entry(category.to_string())
            .or_insert_with(|| Arc::new(Emitter::new(Arc::clone(&self.outlet), category.to_string())));
        Ok(Arc::clone(emitter.value()))
    }

    /// Append `payload` to the destination list.
    ///
    /// A no-op after teardown. Store errors are returned to the caller;
    /// emitters discard them.
    pub fn write(&self, payload: &[u8]) -> Result<(), StoreError> {
        self.outlet.write(payload)
    }

    /// Release the connection and forget every emitter. Idempotent.
    pub fn teardown(&self) {
        if self.outlet.disposed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.emitters.clear();
        self.outlet.connection.close();
        tracing::debug!(list_key = %self.outlet.list_key, "log sink provider torn down");
    }
}

impl Drop for SinkProvider {
    fn drop(&mut self) {
        self.teardown();
    }
}

/// Builder for [`SinkProvider`].
///
/// Descriptor and list key are required; a value that was never set and a
/// whitespace-only value are reported as different errors.
#[derive(Default)]
pub struct SinkProviderBuilder {
    descriptor: Option<String>,
    list_key: Option<String>,
    minimum_level: Level,
    factory: Option<Arc<dyn ConnectionFactory>>,
}

impl SinkProviderBuilder {
    /// Set the connection descriptor, e.g. `localhost:6379` or a
    /// `redis://` URL. Required.
    pub fn descriptor(mut self, descriptor: impl Into<String>) -> Self {
        self.descriptor = Some(descriptor.into());
        self
    }

    /// Set the list every record is pushed onto. Required.
    pub fn list_key(mut self, list_key: impl Into<String>) -> Self {
        self.list_key = Some(list_key.into());
        self
    }

    /// Set the lowest level that produces records.
    ///
    /// **Parameters**
    /// - `level`: threshold; defaults to [`Level::Trace`] (everything).
    ///   [`Level::None`] disables every record.
    pub fn minimum_level(mut self, level: Level) -> Self {
        self.minimum_level = level;
        self
    }

    /// Replace the Redis factory, typically with a test double.
    pub fn connection_factory(mut self, factory: Arc<dyn ConnectionFactory>) -> Self {
        self.factory = Some(factory);
        self
    }

    pub(crate) fn maybe_descriptor(mut self, descriptor: Option<String>) -> Self {
        self.descriptor = descriptor;
        self
    }

    pub(crate) fn maybe_list_key(mut self, list_key: Option<String>) -> Self {
        self.list_key = list_key;
        self
    }

    /// Validate the settings and open the single store connection.
    ///
    /// **Returns**
    /// - `Ok(provider)` holding one open connection.
    /// - `Err(SinkError::Missing*)` / `Err(SinkError::Blank*)` for an unset or
    ///   whitespace-only descriptor or list key.
    /// - `Err(SinkError::Connect(..))` if the factory could not connect.
    pub fn build(self) -> Result<SinkProvider, SinkError> {
        let descriptor = require(self.descriptor, SinkError::MissingDescriptor, SinkError::BlankDescriptor)?;
        let list_key = require(self.list_key, SinkError::MissingListKey, SinkError::BlankListKey)?;

        let factory = self
            .factory
            .unwrap_or_else(|| Arc::new(RedisConnectionFactory) as Arc<dyn ConnectionFactory>);
        let connection = factory.connect(&descriptor).map_err(SinkError::Connect)?;

        tracing::debug!(
            list_key = %list_key,
            minimum_level = %self.minimum_level,
            "log sink provider connected"
        );

        Ok(SinkProvider {
            outlet: Arc::new(Outlet {
                list_key,
                minimum_level: self.minimum_level,
                connection,
                disposed: AtomicBool::new(false),
            }),
            emitters: DashMap::new(),
        })
    }
}

fn require(value: Option<String>, missing: SinkError, blank: SinkError) -> Result<String, SinkError> {
    match value {
        None => Err(missing),
        Some(v) if v.trim().is_empty() => Err(blank),
        Some(v) => Ok(v),
    }
}
