//! Monotonic tokens for discarding superseded generation requests.

use std::sync::atomic::{AtomicU64, Ordering};

/// Identifies one generation request. Later requests carry larger tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

impl RequestToken {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Issues request tokens and remembers the latest one.
///
/// A response is applied only if its token is still current when it arrives;
/// anything older was superseded by a newer request.
#[derive(Debug, Default)]
pub struct RequestTokens {
    latest: AtomicU64,
}

impl RequestTokens {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self) -> RequestToken {
        RequestToken(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        self.latest.load(Ordering::SeqCst) == token.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_increase_and_supersede() {
        let tokens = RequestTokens::new();
        let first = tokens.issue();
        assert!(tokens.is_current(first));

        let second = tokens.issue();
        assert!(second > first);
        assert!(!tokens.is_current(first));
        assert!(tokens.is_current(second));
    }

    #[test]
    fn tokens_from_threads_are_unique() {
        let tokens = std::sync::Arc::new(RequestTokens::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let tokens = tokens.clone();
                std::thread::spawn(move || (0..100).map(|_| tokens.issue().value()).collect::<Vec<_>>())
            })
            .collect();
        let mut all: Vec<u64> = handles.into_iter().flat_map(|h| h.join().unwrap()).collect();
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), 800);
    }
}
