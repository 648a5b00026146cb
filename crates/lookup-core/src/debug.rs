use std::fmt::Debug;

/// Debug formatter for slices that prints up to `limit` items followed by a `+N more...` marker
pub struct SliceDebug<'a, T> {
    items: &'a [T],
    limit: usize,
}

impl<'a, T> SliceDebug<'a, T> {
    pub const DEFAULT_LIMIT: usize = 3;

    pub fn new(items: &'a [T]) -> Self {
        Self::with_limit(items, Self::DEFAULT_LIMIT)
    }

    pub fn with_limit(items: &'a [T], limit: usize) -> Self {
        Self { items, limit }
    }
}

impl<'a, T: Debug> Debug for SliceDebug<'a, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut list = f.debug_list();
        list.entries(self.items.iter().take(self.limit));
        if self.items.len() > self.limit {
            list.entry(&format_args!("+{} more...", self.items.len() - self.limit));
        }
        list.finish()
    }
}
