/// Shallow change detector for positional arguments.
///
/// Drivers use it to skip expensive `update` work when nothing they read has changed:
///
/// ```
/// use datasync_core::Memo;
///
/// let mut memo = Memo::new();
/// assert!(memo.update(&[1, 2]));
/// assert!(!memo.update(&[1, 2]));
/// assert!(memo.update(&[1, 3]));
/// ```
#[derive(Clone, Debug)]
pub struct Memo<T> {
    memory: Vec<T>,
}

impl<T> Default for Memo<T> {
    fn default() -> Self {
        Self { memory: Vec::new() }
    }
}

impl<T: PartialEq + Clone> Memo<T> {
    pub fn new() -> Self {
        Self { memory: Vec::new() }
    }

    /// A memo that already remembers `args`
    pub fn init(args: &[T]) -> Self {
        let mut memo = Self::new();
        if !args.is_empty() {
            memo.update(args);
        }
        memo
    }

    /// Stores `args` and returns true if they differ from the previous call, by length or by
    /// any position.
    pub fn update(&mut self, args: &[T]) -> bool {
        if self.memory.as_slice() == args {
            return false;
        }
        self.memory.clear();
        self.memory.extend_from_slice(args);
        true
    }

    pub fn clear(&mut self) {
        self.memory.clear();
    }

    pub fn last(&self) -> &[T] {
        &self.memory
    }
}
