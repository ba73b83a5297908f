//! Keyed async mutexes serialising work on the same slot.

use std::{
  collections::HashMap,
  sync::{Arc, Mutex, PoisonError},
  time::Duration,
};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::{Error, Result};

/// (academic year, semester, section). Department is left out: loose
/// department equality is not transitive, so no per-department key can
/// put every pair of matching spellings under the same lock.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct SlotKey {
  pub academic_year: String,
  pub semester:      String,
  pub section:       String,
}

#[derive(Debug, Default)]
pub(crate) struct SlotLocks {
  locks: Mutex<HashMap<SlotKey, Arc<AsyncMutex<()>>>>,
}

impl SlotLocks {
  /// Wait up to `timeout` for exclusive access to `key`.
  pub async fn acquire(
    &self,
    key: SlotKey,
    timeout: Duration,
  ) -> Result<OwnedMutexGuard<()>> {
    let lock = {
      let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
      // Entries nobody holds or waits on.
      locks.retain(|_, lock| Arc::strong_count(lock) > 1);
      locks.entry(key).or_default().clone()
    };

    tokio::time::timeout(timeout, lock.lock_owned())
      .await
      .map_err(|_| {
        Error::Concurrency(format!("slot lock not acquired within {timeout:?}"))
      })
  }

  #[cfg(test)]
  pub fn len(&self) -> usize {
    self.locks.lock().unwrap_or_else(PoisonError::into_inner).len()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn key(section: &str) -> SlotKey {
    SlotKey {
      academic_year: "2025-2026".into(),
      semester:      "5".into(),
      section:       section.into(),
    }
  }

  #[tokio::test]
  async fn same_key_times_out_while_held() {
    let locks = SlotLocks::default();
    let _held = locks.acquire(key("B"), Duration::from_secs(1)).await.unwrap();

    let err = locks
      .acquire(key("B"), Duration::from_millis(20))
      .await
      .unwrap_err();
    assert!(matches!(err, Error::Concurrency(_)));
  }

  #[tokio::test]
  async fn different_keys_do_not_contend() {
    let locks = SlotLocks::default();
    let _b = locks.acquire(key("B"), Duration::from_secs(1)).await.unwrap();
    let _a = locks
      .acquire(key("A"), Duration::from_millis(20))
      .await
      .unwrap();
  }

  #[tokio::test]
  async fn released_entries_are_pruned() {
    let locks = SlotLocks::default();
    drop(locks.acquire(key("A"), Duration::from_secs(1)).await.unwrap());
    drop(locks.acquire(key("B"), Duration::from_secs(1)).await.unwrap());
    assert_eq!(locks.len(), 1);
  }
}
