//! Per-user conversational memory, bounded in both directions: the number of users
//! tracked (least recently used session is evicted) and the turns kept per user.

use lru::LruCache;
use std::collections::VecDeque;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    pub user: String,
    pub assistant: String,
}

#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<Mutex<LruCache<u64, VecDeque<Turn>>>>,
    max_turns: usize,
}

impl SessionStore {
    pub fn new(max_users: usize, max_turns: usize) -> Self {
        let cap = NonZeroUsize::new(max_users).unwrap_or(NonZeroUsize::MIN);
        Self {
            sessions: Arc::new(Mutex::new(LruCache::new(cap))),
            max_turns: max_turns.max(1),
        }
    }

    /// Prior turns for `user_id`, oldest first.
    pub fn history(&self, user_id: u64) -> Vec<Turn> {
        let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        sessions
            .get(&user_id)
            .map(|turns| turns.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn record(&self, user_id: u64, turn: Turn) {
        let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        let turns = sessions.get_or_insert_mut(user_id, VecDeque::new);
        turns.push_back(turn);
        while turns.len() > self.max_turns {
            turns.pop_front();
        }
    }

    pub fn clear(&self, user_id: u64) {
        let mut sessions = self.sessions.lock().unwrap_or_else(|e| e.into_inner());
        sessions.pop(&user_id);
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn(n: usize) -> Turn {
        Turn {
            user: format!("q{n}"),
            assistant: format!("a{n}"),
        }
    }

    #[test]
    fn keeps_only_the_latest_turns() {
        let store = SessionStore::new(10, 2);
        for n in 0..4 {
            store.record(1, turn(n));
        }
        assert_eq!(store.history(1), vec![turn(2), turn(3)]);
    }

    #[test]
    fn evicts_least_recently_used_user() {
        let store = SessionStore::new(2, 5);
        store.record(1, turn(1));
        store.record(2, turn(2));
        // Touch user 1 so user 2 becomes the eviction candidate.
        assert_eq!(store.history(1).len(), 1);
        store.record(3, turn(3));

        assert_eq!(store.len(), 2);
        assert!(store.history(2).is_empty());
        assert_eq!(store.history(1), vec![turn(1)]);
        assert_eq!(store.history(3), vec![turn(3)]);
    }

    #[test]
    fn clear_forgets_a_user() {
        let store = SessionStore::new(2, 2);
        store.record(5, turn(0));
        store.clear(5);
        assert!(store.is_empty());
    }
}
