use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Held while a status update for one job card is in flight; released on drop.
pub struct SubmissionGuard {
    locks: SubmissionLocks,
    key: (String, i64), // (session_id, job_card_id)
    acquired_at: Instant,
}

impl Drop for SubmissionGuard {
    fn drop(&mut self) {
        self.locks.release(&self.key, self.acquired_at);
        tracing::trace!(job_card_id = self.key.1, "Submission lock released");
    }
}

/// Rejects a second status submission for the same card from the same session
/// while the first is still waiting on the backend.
#[derive(Clone)]
pub struct SubmissionLocks {
    locks: Arc<Mutex<HashMap<(String, i64), Instant>>>,
    lock_timeout: Duration,
}

impl SubmissionLocks {
    /// Locks older than `lock_timeout` are treated as abandoned.
    pub fn new(lock_timeout: Duration) -> Self {
        Self {
            locks: Arc::new(Mutex::new(HashMap::new())),
            lock_timeout,
        }
    }

    pub fn try_acquire(&self, session_id: &str, job_card_id: i64) -> Option<SubmissionGuard> {
        let mut locks = self.locks.lock();
        let now = Instant::now();
        locks.retain(|_, locked_at| now.duration_since(*locked_at) < self.lock_timeout);

        let key = (session_id.to_string(), job_card_id);
        if locks.contains_key(&key) {
            tracing::debug!(job_card_id, "Status update already in flight");
            return None;
        }
        locks.insert(key.clone(), now);

        Some(SubmissionGuard {
            locks: self.clone(),
            key,
            acquired_at: now,
        })
    }

    /// A guard whose lock already expired and was re-taken must not free the newer one.
    fn release(&self, key: &(String, i64), acquired_at: Instant) {
        let mut locks = self.locks.lock();
        if locks.get(key) == Some(&acquired_at) {
            locks.remove(key);
        }
    }

    pub fn in_flight(&self) -> usize {
        self.locks.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_submission_blocked() {
        let locks = SubmissionLocks::new(Duration::from_secs(60));

        let first = locks.try_acquire("s1", 7);
        assert!(first.is_some());
        assert!(locks.try_acquire("s1", 7).is_none());

        // Other cards and other sessions are independent
        assert!(locks.try_acquire("s1", 8).is_some());
        assert!(locks.try_acquire("s2", 7).is_some());

        drop(first);
        assert!(locks.try_acquire("s1", 7).is_some());
    }

    #[test]
    fn test_guard_drop_releases() {
        let locks = SubmissionLocks::new(Duration::from_secs(60));
        {
            let _guard = locks.try_acquire("s1", 1);
            assert_eq!(locks.in_flight(), 1);
        }
        assert_eq!(locks.in_flight(), 0);
    }

    #[test]
    fn test_stale_lock_expires() {
        let locks = SubmissionLocks::new(Duration::ZERO);
        let _stale = locks.try_acquire("s1", 1);
        assert!(locks.try_acquire("s1", 1).is_some());
    }
}
