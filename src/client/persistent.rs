use crate::{client::Error, record::Key};
use async_trait::async_trait;

/// Durable store backing a [`NameResolver`] when live resolution fails.
///
/// Every successful live resolution is written to the store. When live
/// resolution fails, the store is read with the failure: it either answers
/// with a previously written key or hands the error back, which is then
/// returned to the caller unchanged.
///
/// [`NameResolver`]: crate::NameResolver
#[async_trait]
pub trait PersistentCache: Send + Sync {
    /// Recovers from `err`, the failure to resolve `name`.
    async fn read(&self, name: &str, err: Error) -> Result<Key, Error>;

    /// Records that `name` resolved to `key`, valid for `ttl` seconds.
    async fn write(&self, name: &str, key: &Key, ttl: u64);
}

#[async_trait]
impl<P: PersistentCache + ?Sized> PersistentCache for std::sync::Arc<P> {
    async fn read(&self, name: &str, err: Error) -> Result<Key, Error> {
        (**self).read(name, err).await
    }

    async fn write(&self, name: &str, key: &Key, ttl: u64) {
        (**self).write(name, key, ttl).await
    }
}
