use crate::descriptor::to_connection_url;
use crate::error::StoreError;
use std::sync::Mutex;

/// Handle to the remote list store, owned by a single [`SinkProvider`].
///
/// [`SinkProvider`]: crate::provider::SinkProvider
pub trait StoreConnection: Send + Sync {
    /// Append `payload` to the right end of the list stored at `key`.
    ///
    /// Called inline on the logging thread. The provider discards any
    /// error returned here.
    fn right_push(&self, key: &str, payload: &[u8]) -> Result<(), StoreError>;

    /// Release the underlying connection. The provider calls this exactly
    /// once, at teardown.
    fn close(&self) {}
}

/// Produces store connections from a connection descriptor.
///
/// This is the only injection point of the sink: the provider never knows
/// whether it talks to Redis or to a test double.
pub trait ConnectionFactory: Send + Sync {
    fn connect(&self, descriptor: &str) -> Result<Box<dyn StoreConnection>, StoreError>;
}

/// Production factory backed by the blocking `redis` client.
#[derive(Debug, Clone, Copy, Default)]
pub struct RedisConnectionFactory;

impl ConnectionFactory for RedisConnectionFactory {
    fn connect(&self, descriptor: &str) -> Result<Box<dyn StoreConnection>, StoreError> {
        let connection = open_client(descriptor)?.get_connection()?;
        Ok(Box::new(RedisConnection {
            inner: Mutex::new(Some(connection)),
        }))
    }
}

/// Build a client for `descriptor` without connecting yet.
fn open_client(descriptor: &str) -> Result<redis::Client, StoreError> {
    let url = to_connection_url(descriptor)?;
    Ok(redis::Client::open(url.as_str())?)
}

/// A single blocking Redis connection.
///
/// `redis::Connection` needs exclusive access per command, so pushes are
/// serialized behind a mutex.
pub struct RedisConnection {
    inner: Mutex<Option<redis::Connection>>,
}

impl StoreConnection for RedisConnection {
    fn right_push(&self, key: &str, payload: &[u8]) -> Result<(), StoreError> {
        // A panic in an earlier push must not disable the sink for good.
        let mut guard = self
            .inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let connection = guard.as_mut().ok_or(StoreError::Closed)?;
        redis::cmd("RPUSH")
            .arg(key)
            .arg(payload)
            .query::<()>(connection)?;
        Ok(())
    }

    fn close(&self) {
        let taken = match self.inner.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        drop(taken);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn tls_descriptors_build_a_client() {
        assert!(open_client("localhost:6380,ssl=true").is_ok());
        assert!(open_client("rediss://localhost:6380/0").is_ok());
    }

    #[test]
    fn plain_descriptor_builds_a_client() {
        assert!(open_client("localhost:6379,defaultDatabase=1").is_ok());
        assert!(matches!(
            open_client("password=only"),
            Err(StoreError::InvalidDescriptor(_))
        ));
    }

    #[test]
    fn poisoned_lock_does_not_block_later_pushes() {
        let conn = Arc::new(RedisConnection {
            inner: Mutex::new(None),
        });

        let holder = Arc::clone(&conn);
        let crashed = thread::spawn(move || {
            let _guard = holder.inner.lock().unwrap();
            panic!("client panicked mid-command");
        })
        .join();
        assert!(crashed.is_err());
        assert!(conn.inner.is_poisoned());

        // The push reaches the connection slot instead of failing on the lock.
        assert!(matches!(conn.right_push("logs", b"x"), Err(StoreError::Closed)));
        conn.close();
    }
}
