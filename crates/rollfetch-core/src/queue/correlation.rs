//! Handle → context map for requests currently in flight.
//!
//! Keyed by the token the session minted at dispatch. The URL is useless as a
//! key: after a redirect the transport reports a different one, and the same
//! URL may be queued more than once.

use std::collections::HashMap;

use crate::transport::HandleToken;

#[derive(Debug)]
pub(crate) struct CorrelationMap<C> {
    entries: HashMap<HandleToken, C>,
}

impl<C> Default for CorrelationMap<C> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<C> CorrelationMap<C> {
    /// Record a dispatched request. Returns false if the token was already
    /// present (the session minted a duplicate); the old entry is replaced.
    pub(crate) fn insert(&mut self, token: HandleToken, context: C) -> bool {
        self.entries.insert(token, context).is_none()
    }

    /// Read once and remove.
    pub(crate) fn take(&mut self, token: HandleToken) -> Option<C> {
        self.entries.remove(&token)
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}
