use super::CoordinateResolver;
use crate::error::Result;
use crate::model::access_point::{AccessPointRecord, MacAddress};
use dashmap::DashMap;
use std::sync::Arc;

/// Thread-safe in-memory reference store
#[derive(Clone, Default)]
pub struct MemoryResolver {
    records: Arc<DashMap<String, AccessPointRecord>>, // Key: uppercase MAC
}

impl MemoryResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an access point
    pub fn insert(&self, mac: &str, record: AccessPointRecord) {
        self.records.insert(MacAddress::normalize(mac), record);
    }

    pub fn remove(&self, mac: &str) -> bool {
        self.records.remove(&MacAddress::normalize(mac)).is_some()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<(String, AccessPointRecord)> for MemoryResolver {
    fn from_iter<I: IntoIterator<Item = (String, AccessPointRecord)>>(iter: I) -> Self {
        let resolver = Self::new();
        for (mac, record) in iter {
            resolver.insert(&mac, record);
        }
        resolver
    }
}

impl CoordinateResolver for MemoryResolver {
    fn lookup(&self, key: &str) -> Result<Option<AccessPointRecord>> {
        Ok(self.records.get(key).map(|r| r.value().clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_resolver() {
        let resolver = MemoryResolver::new();
        resolver.insert(
            "aa:bb:cc:dd:ee:ff",
            AccessPointRecord {
                lat: 48.85,
                lon: 2.35,
                label: "TestAP".to_string(),
            },
        );
        assert_eq!(resolver.len(), 1);

        let found = resolver.resolve("AA:BB:CC:DD:EE:FF").unwrap();
        assert_eq!(found.label, "TestAP");
        assert!(resolver.resolve("aa:bb:cc:dd:ee:ff").is_some());
        assert!(resolver.resolve("00:00:00:00:00:00").is_none());

        assert!(resolver.remove("AA:BB:CC:DD:EE:FF"));
        assert!(resolver.is_empty());
    }
}
