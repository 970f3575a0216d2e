//! Access-point coordinate lookup.
//!
//! Backends implement [`CoordinateResolver::lookup`] and may fail. Callers use
//! [`CoordinateResolver::resolve`], which normalizes the key and folds every
//! backend failure into a miss so one unreachable store never fails a request.

use crate::error::Result;
use crate::model::access_point::AccessPointRecord;
use tracing::warn;

pub mod memory;
pub mod sqlite;

pub use memory::MemoryResolver;
pub use sqlite::SqliteResolver;

pub trait CoordinateResolver: Send + Sync {
    /// Look up an already-normalized (uppercase) MAC key
    fn lookup(&self, key: &str) -> Result<Option<AccessPointRecord>>;

    /// Resolve a MAC to its known location; `None` on a miss or store failure
    fn resolve(&self, mac: &str) -> Option<AccessPointRecord> {
        let key = crate::model::access_point::MacAddress::normalize(mac);
        match self.lookup(&key) {
            Ok(found) => found,
            Err(e) => {
                warn!(mac = %key, error = %e, "Reference lookup failed, treating as unknown");
                None
            }
        }
    }
}
