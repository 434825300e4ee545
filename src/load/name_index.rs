//! Maps vendor and customer names to the rows created for them during a load.

use std::collections::HashMap;

/// Resolves names to stored IDs, creating each entity the first time its
/// name is seen.
///
/// Names are matched exactly, so "Acme" and "ACME" are different entities.
/// Entries created since the last [NameIndex::commit] can be dropped with
/// [NameIndex::rollback] when the rows they refer to are rolled back.
#[derive(Debug)]
pub struct NameIndex<Id> {
    ids: HashMap<String, Id>,
    pending: Vec<String>,
}

impl<Id: Copy> Default for NameIndex<Id> {
    fn default() -> Self {
        Self {
            ids: HashMap::new(),
            pending: Vec::new(),
        }
    }
}

impl<Id: Copy> NameIndex<Id> {
    /// An empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the ID stored for `name`, or call `create` to make one.
    ///
    /// `create` is called at most once per name. If it fails, nothing is
    /// recorded and the error is returned.
    pub fn resolve_with<E>(
        &mut self,
        name: &str,
        create: impl FnOnce(&str) -> Result<Id, E>,
    ) -> Result<Id, E> {
        if let Some(&id) = self.ids.get(name) {
            return Ok(id);
        }

        let id = create(name)?;
        self.ids.insert(name.to_owned(), id);
        self.pending.push(name.to_owned());

        Ok(id)
    }

    /// Keep every name added since the last commit.
    pub fn commit(&mut self) {
        self.pending.clear();
    }

    /// Forget every name added since the last commit.
    pub fn rollback(&mut self) {
        for name in std::mem::take(&mut self.pending) {
            self.ids.remove(&name);
        }
    }

    /// The number of names in the index.
    pub fn len(&self) -> usize {
        self.ids.len()
    }
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;

    use super::NameIndex;

    /// Hands out increasing IDs and counts how often it was called.
    struct Counter {
        calls: i64,
    }

    impl Counter {
        fn create(&mut self, _name: &str) -> Result<i64, Infallible> {
            self.calls += 1;
            Ok(self.calls)
        }
    }

    #[test]
    fn same_name_resolves_to_same_id() {
        let mut index = NameIndex::new();
        let mut counter = Counter { calls: 0 };

        let first = index.resolve_with("Acme", |name| counter.create(name)).unwrap();
        let second = index.resolve_with("Acme", |name| counter.create(name)).unwrap();

        assert_eq!(first, second);
        assert_eq!(counter.calls, 1);
    }

    #[test]
    fn different_names_resolve_to_different_ids() {
        let mut index = NameIndex::new();
        let mut counter = Counter { calls: 0 };

        let acme = index.resolve_with("Acme", |name| counter.create(name)).unwrap();
        let globex = index.resolve_with("Globex", |name| counter.create(name)).unwrap();

        assert_ne!(acme, globex);
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn names_are_case_sensitive() {
        let mut index = NameIndex::new();
        let mut counter = Counter { calls: 0 };

        let lower = index.resolve_with("Acme", |name| counter.create(name)).unwrap();
        let upper = index.resolve_with("ACME", |name| counter.create(name)).unwrap();

        assert_ne!(lower, upper);
    }

    #[test]
    fn failed_creation_is_not_recorded() {
        let mut index = NameIndex::new();
        let mut counter = Counter { calls: 0 };

        let result: Result<i64, &str> = index.resolve_with("Acme", |_| Err("insert failed"));
        let id = index.resolve_with("Acme", |name| counter.create(name)).unwrap();

        assert_eq!(result, Err("insert failed"));
        assert_eq!(id, 1);
        assert_eq!(counter.calls, 1);
    }

    #[test]
    fn rollback_forgets_uncommitted_names() {
        let mut index = NameIndex::new();
        let mut counter = Counter { calls: 0 };

        index.resolve_with("Kept", |name| counter.create(name)).unwrap();
        index.commit();
        index.resolve_with("Dropped", |name| counter.create(name)).unwrap();
        index.rollback();

        let kept = index.resolve_with("Kept", |name| counter.create(name)).unwrap();
        let dropped = index.resolve_with("Dropped", |name| counter.create(name)).unwrap();

        assert_eq!(kept, 1);
        assert_eq!(dropped, 3);
        assert_eq!(index.len(), 2);
    }
}
