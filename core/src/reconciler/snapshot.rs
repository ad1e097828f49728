use indexmap::{map, IndexMap};

/// The authoritative key → entity mapping as of the last pass.
///
/// Two maps are kept and swapped every pass so that neither is reallocated in steady state.
/// Iteration order is the order in which keys were first written during the pass that produced
/// the snapshot; exits are dispatched in that order.
pub struct Snapshot<E> {
    current: IndexMap<String, E>,
    buffer: IndexMap<String, E>,
    seen: Vec<bool>,
}

/// Scratch lists filled by `Snapshot::diff` and consumed by the dispatch phases.
pub(crate) struct Diff<E> {
    /// Every present entity, in input order
    pub updates: Vec<(String, E)>,
    /// Indices into `updates` of entities whose key was not in the old snapshot
    pub entering: Vec<usize>,
    /// Entities of the old snapshot whose key did not appear in the input
    pub exiting: Vec<(String, E)>,
    /// Keys written more than once during this pass
    pub duplicates: Vec<String>,
    /// Absent slots in the input
    pub skipped: usize,
}

impl<E> Diff<E> {
    pub fn new() -> Self {
        Self {
            updates: Vec::new(),
            entering: Vec::new(),
            exiting: Vec::new(),
            duplicates: Vec::new(),
            skipped: 0,
        }
    }

    pub fn clear(&mut self) {
        self.updates.clear();
        self.entering.clear();
        self.exiting.clear();
        self.duplicates.clear();
        self.skipped = 0;
    }

    pub fn persisted(&self) -> usize {
        self.updates.len() - self.entering.len()
    }
}

impl<E> Snapshot<E> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            current: IndexMap::with_capacity(capacity),
            buffer: IndexMap::with_capacity(capacity),
            seen: Vec::with_capacity(capacity),
        }
    }

    pub fn get(&self, key: &str) -> Option<&E> {
        self.current.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.current.contains_key(key)
    }

    pub fn keys(&self) -> map::Keys<'_, String, E> {
        self.current.keys()
    }

    pub fn iter(&self) -> map::Iter<'_, String, E> {
        self.current.iter()
    }

    pub fn len(&self) -> usize {
        self.current.len()
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    /// Diffs `items` against the current snapshot, fills `diff`, and swaps the new snapshot in.
    ///
    /// A key counts as persisting only the first time it is met during the pass; any later
    /// occurrence of the same key is classified as entering again, and the last occurrence is
    /// what the new snapshot holds.
    pub(crate) fn diff<I>(&mut self, items: I, key_fn: &dyn Fn(&E) -> String, diff: &mut Diff<E>)
    where
        I: IntoIterator<Item = Option<E>>,
        E: Clone,
    {
        diff.clear();
        self.buffer.clear();
        self.seen.clear();
        self.seen.resize(self.current.len(), false);

        for item in items {
            let Some(entity) = item else {
                diff.skipped += 1;
                continue;
            };
            let key = key_fn(&entity);

            match self.current.get_index_of(&key) {
                Some(index) if !self.seen[index] => {
                    self.seen[index] = true;
                }
                _ => {
                    diff.entering.push(diff.updates.len());
                }
            }

            if self.buffer.insert(key.clone(), entity.clone()).is_some() {
                diff.duplicates.push(key.clone());
            }
            diff.updates.push((key, entity));
        }

        for (index, entry) in self.current.drain(..).enumerate() {
            if !self.seen[index] {
                diff.exiting.push(entry);
            }
        }

        std::mem::swap(&mut self.current, &mut self.buffer);
    }
}
