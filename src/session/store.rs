//! The two-partition session store and its transitions.

use chrono::{Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::debug;
use uuid::Uuid;

use super::models::{
    correlation_lamports, AuthRequest, PendingSession, SessionStatus, VerifiedSession,
};

/// Typed failures of the pending-to-verified transition.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("session not found")]
    NotFound,
    #[error("session expired")]
    Expired,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Configured destination for the micro-payment. Presence is validated at
    /// startup; the store never sees an empty receiver.
    pub receiver_address: String,
    /// Base amount the correlation perturbation is layered onto.
    pub base_lamports: u64,
    pub session_ttl_seconds: i64,
}

#[derive(Default)]
struct Partitions {
    pending: HashMap<Uuid, AuthRequest>,
    verified: HashMap<Uuid, AuthRequest>,
}

/// Source of truth for authentication-request state.
///
/// One lock over both partitions: the store is small and contention is low.
/// Callers must not hold any view returned from here across ledger I/O and
/// expect it to still be current; the commit path re-checks under the lock.
pub struct SessionStore {
    config: SessionConfig,
    partitions: Mutex<Partitions>,
}

impl SessionStore {
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            partitions: Mutex::new(Partitions::default()),
        }
    }

    /// Mint a fresh pending request for the claimed wallet address.
    ///
    /// The expected amount is the configured base plus the creation
    /// timestamp's ms-mod-1000 perturbation.
    pub async fn create(&self, wallet_address: &str) -> PendingSession {
        let now = Utc::now();
        let request = AuthRequest {
            session_id: Uuid::new_v4(),
            wallet_address: wallet_address.to_string(),
            receiver_address: self.config.receiver_address.clone(),
            expected_lamports: correlation_lamports(
                self.config.base_lamports,
                now.timestamp_millis(),
            ),
            created_at: now,
            expires_at: now + Duration::seconds(self.config.session_ttl_seconds),
            signature: None,
            verified_at: None,
        };
        let view = PendingSession::from(&request);
        let mut partitions = self.partitions.lock().await;
        partitions.pending.insert(request.session_id, request);
        view
    }

    /// Look up the current state of a session.
    ///
    /// Pure read except for lazy expiry: a stale pending entry is deleted here
    /// and reported as `Expired` exactly once; later lookups see `NotFound`.
    pub async fn status(&self, session_id: Uuid) -> SessionStatus {
        let now = Utc::now();
        let mut partitions = self.partitions.lock().await;
        if let Some(request) = partitions.verified.get(&session_id) {
            return SessionStatus::Verified(verified_view(request));
        }
        match partitions.pending.get(&session_id) {
            Some(request) if !request.is_expired(now) => {
                SessionStatus::Pending(PendingSession::from(request))
            }
            Some(_) => {
                partitions.pending.remove(&session_id);
                SessionStatus::Expired
            }
            None => SessionStatus::NotFound,
        }
    }

    /// The single commit point: move a pending request to the verified
    /// partition and record the matched transaction signature.
    ///
    /// Atomic under the store lock, and idempotent: committing a session that
    /// a racing poll already verified returns the existing view without
    /// touching `verified_at` or the stored signature. The caller re-entering
    /// after ledger I/O is expected; the pending-and-unexpired check happens
    /// here, not at the call site.
    pub async fn commit_verified(
        &self,
        session_id: Uuid,
        signature: &str,
    ) -> Result<VerifiedSession, SessionError> {
        let now = Utc::now();
        let mut partitions = self.partitions.lock().await;
        if let Some(existing) = partitions.verified.get(&session_id) {
            return Ok(verified_view(existing));
        }
        let Some(mut request) = partitions.pending.remove(&session_id) else {
            return Err(SessionError::NotFound);
        };
        if request.is_expired(now) {
            // Stays deleted: the expiry window closed while the match was in
            // flight, the payment no longer authenticates this session.
            return Err(SessionError::Expired);
        }
        request.signature = Some(signature.to_string());
        request.verified_at = Some(now);
        let view = verified_view(&request);
        partitions.verified.insert(session_id, request);
        debug!(session_id = %session_id, "auth request verified");
        Ok(view)
    }

    /// Remove a session from both partitions. Idempotent, never fails.
    pub async fn invalidate(&self, session_id: Uuid) {
        let mut partitions = self.partitions.lock().await;
        partitions.pending.remove(&session_id);
        partitions.verified.remove(&session_id);
    }

    /// Delete all expired pending entries, returning how many were removed.
    ///
    /// Lazy expiry on the read paths already keeps answers correct; the sweep
    /// bounds memory growth from abandoned requests.
    pub async fn sweep(&self) -> usize {
        let now = Utc::now();
        let mut partitions = self.partitions.lock().await;
        let before = partitions.pending.len();
        partitions.pending.retain(|_, request| !request.is_expired(now));
        before - partitions.pending.len()
    }
}

fn verified_view(request: &AuthRequest) -> VerifiedSession {
    VerifiedSession {
        session_id: request.session_id,
        wallet_address: request.wallet_address.clone(),
        signature: request.signature.clone().unwrap_or_default(),
        verified_at: request.verified_at.unwrap_or(request.created_at),
    }
}

/// Spawn the periodic sweep task. Correctness never depends on it firing;
/// see [`SessionStore::sweep`].
pub fn spawn_sweeper(store: Arc<SessionStore>, every: std::time::Duration) {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            let removed = store.sweep().await;
            if removed > 0 {
                debug!(removed, "swept expired auth requests");
            }
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    const WALLET: &str = "9xQeWvG816bUx9EPjHmaT23yvVM2ZWbrrpZb9PusVFin";

    fn store(ttl_seconds: i64) -> SessionStore {
        SessionStore::new(SessionConfig {
            receiver_address: "Ge3jkza5KRfXvaq3GELNLh6V1pjjdEKNpEdGXJgjjKUR".to_string(),
            base_lamports: 10_000,
            session_ttl_seconds: ttl_seconds,
        })
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let store = store(300);
        assert_eq!(store.status(Uuid::new_v4()).await, SessionStatus::NotFound);
    }

    #[tokio::test]
    async fn create_yields_a_pending_session_with_fresh_id() {
        let store = store(300);
        let first = store.create(WALLET).await;
        let second = store.create(WALLET).await;
        assert_ne!(first.session_id, second.session_id);
        assert_eq!(first.wallet_address, WALLET);
        assert!(first.expected_lamports >= 10_000);
        assert!(first.expected_lamports < 11_000);
        assert!(first.expires_at > first.created_at);
        match store.status(first.session_id).await {
            SessionStatus::Pending(view) => assert_eq!(view, first),
            other => panic!("expected pending, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn stale_pending_session_expires_exactly_once() {
        let store = store(-1);
        let pending = store.create(WALLET).await;
        assert_eq!(
            store.status(pending.session_id).await,
            SessionStatus::Expired
        );
        assert_eq!(
            store.status(pending.session_id).await,
            SessionStatus::NotFound
        );
    }

    #[tokio::test]
    async fn commit_moves_the_session_to_verified() {
        let store = store(300);
        let pending = store.create(WALLET).await;
        let verified = store
            .commit_verified(pending.session_id, "sig-1")
            .await
            .expect("commit should succeed");
        assert_eq!(verified.session_id, pending.session_id);
        assert_eq!(verified.wallet_address, WALLET);
        assert_eq!(verified.signature, "sig-1");
        match store.status(pending.session_id).await {
            SessionStatus::Verified(view) => assert_eq!(view, verified),
            other => panic!("expected verified, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn repeated_commit_is_idempotent() {
        let store = store(300);
        let pending = store.create(WALLET).await;
        let first = store
            .commit_verified(pending.session_id, "sig-1")
            .await
            .expect("first commit");
        let second = store
            .commit_verified(pending.session_id, "sig-2")
            .await
            .expect("second commit");
        assert_eq!(second.signature, "sig-1");
        assert_eq!(second.verified_at, first.verified_at);
    }

    #[tokio::test]
    async fn commit_on_unknown_or_expired_session_fails() {
        let store = store(300);
        assert_eq!(
            store.commit_verified(Uuid::new_v4(), "sig").await,
            Err(SessionError::NotFound)
        );

        let expired_store = self::store(-1);
        let pending = expired_store.create(WALLET).await;
        assert_eq!(
            expired_store
                .commit_verified(pending.session_id, "sig")
                .await,
            Err(SessionError::Expired)
        );
        // the expired entry was deleted on this path too
        assert_eq!(
            expired_store.status(pending.session_id).await,
            SessionStatus::NotFound
        );
    }

    #[tokio::test]
    async fn invalidate_is_unconditional_and_idempotent() {
        let store = store(300);
        let pending = store.create(WALLET).await;
        let verified = store.create(WALLET).await;
        store
            .commit_verified(verified.session_id, "sig")
            .await
            .expect("commit");

        store.invalidate(pending.session_id).await;
        store.invalidate(verified.session_id).await;
        store.invalidate(Uuid::new_v4()).await;

        assert_eq!(
            store.status(pending.session_id).await,
            SessionStatus::NotFound
        );
        assert_eq!(
            store.status(verified.session_id).await,
            SessionStatus::NotFound
        );
    }

    #[tokio::test]
    async fn sweep_removes_only_expired_pending_entries() {
        let expired_store = store(-1);
        expired_store.create(WALLET).await;
        expired_store.create(WALLET).await;
        assert_eq!(expired_store.sweep().await, 2);
        assert_eq!(expired_store.sweep().await, 0);

        let live_store = store(300);
        live_store.create(WALLET).await;
        let verified = live_store.create(WALLET).await;
        live_store
            .commit_verified(verified.session_id, "sig")
            .await
            .expect("commit");
        // neither the live pending entry nor the verified one is touched
        assert_eq!(live_store.sweep().await, 0);
        assert!(matches!(
            live_store.status(verified.session_id).await,
            SessionStatus::Verified(_)
        ));
    }

    #[tokio::test]
    async fn racing_commits_produce_exactly_one_transition() {
        let store = Arc::new(store(300));
        let pending = store.create(WALLET).await;
        let id = pending.session_id;

        let a = {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.commit_verified(id, "sig-a").await })
        };
        let b = {
            let store = Arc::clone(&store);
            tokio::spawn(async move { store.commit_verified(id, "sig-b").await })
        };
        let first = a.await.expect("join").expect("commit a");
        let second = b.await.expect("join").expect("commit b");

        // both observers see the same single transition
        assert_eq!(first.signature, second.signature);
        assert_eq!(first.verified_at, second.verified_at);
    }
}
