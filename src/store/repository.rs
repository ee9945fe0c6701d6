//! Persistence seam for requests and leads.

use dashmap::DashMap;

/// A record addressable by a string id.
pub trait Record: Clone + Send + Sync + 'static {
    fn id(&self) -> &str;
}

/// Keyed storage for one record type.
///
/// Object-safe so stores can hold `Arc<dyn Repository<T>>` and swap the
/// in-memory map for a real backend.
pub trait Repository<T: Record>: Send + Sync {
    fn list(&self) -> Vec<T>;

    fn get(&self, id: &str) -> Option<T>;

    fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Insert or replace.
    fn put(&self, record: T);

    fn delete(&self, id: &str) -> Option<T>;

    /// Mutate a record in place while holding its entry exclusively.
    ///
    /// Returns the record after mutation, or `None` if absent.
    fn modify(&self, id: &str, f: &mut dyn FnMut(&mut T)) -> Option<T>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// DashMap-backed repository.
pub struct InMemoryRepository<T: Record> {
    records: DashMap<String, T>,
}

impl<T: Record> InMemoryRepository<T> {
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
        }
    }
}

impl<T: Record> Default for InMemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Record> Repository<T> for InMemoryRepository<T> {
    fn list(&self) -> Vec<T> {
        self.records.iter().map(|entry| entry.value().clone()).collect()
    }

    fn get(&self, id: &str) -> Option<T> {
        self.records.get(id).map(|entry| entry.value().clone())
    }

    fn contains(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }

    fn put(&self, record: T) {
        self.records.insert(record.id().to_string(), record);
    }

    fn delete(&self, id: &str) -> Option<T> {
        self.records.remove(id).map(|(_, record)| record)
    }

    fn modify(&self, id: &str, f: &mut dyn FnMut(&mut T)) -> Option<T> {
        let mut entry = self.records.get_mut(id)?;
        f(entry.value_mut());
        Some(entry.value().clone())
    }

    fn len(&self) -> usize {
        self.records.len()
    }
}
