//! FIFO of requests not yet handed to the transport.

use std::collections::VecDeque;

/// One queued request: the URL and the caller's correlation value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PendingRequest<C> {
    pub(crate) url: String,
    pub(crate) context: C,
}

/// Unbounded FIFO of pending requests. No deduplication: the same URL added
/// twice is fetched twice.
#[derive(Debug)]
pub(crate) struct PendingQueue<C> {
    items: VecDeque<PendingRequest<C>>,
}

impl<C> Default for PendingQueue<C> {
    fn default() -> Self {
        Self {
            items: VecDeque::new(),
        }
    }
}

impl<C> PendingQueue<C> {
    pub(crate) fn push(&mut self, url: String, context: C) {
        self.items.push_back(PendingRequest { url, context });
    }

    pub(crate) fn pop(&mut self) -> Option<PendingRequest<C>> {
        self.items.pop_front()
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.items.clear();
    }
}
