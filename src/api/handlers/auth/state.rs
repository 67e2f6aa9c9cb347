//! Auth configuration and shared request-handler state.

use std::sync::Arc;

use crate::ledger::{LedgerMatcher, MatcherConfig};
use crate::session::{SessionConfig, SessionStore};

const DEFAULT_BASE_LAMPORTS: u64 = 10_000; // 0.00001 SOL
const DEFAULT_SESSION_TTL_SECONDS: i64 = 5 * 60;
const DEFAULT_FIND_TOLERANCE_LAMPORTS: u64 = 1;
const DEFAULT_SIGNATURE_TOLERANCE_LAMPORTS: u64 = 1_000;
const DEFAULT_SCAN_LIMIT: usize = 20;

#[derive(Clone, Debug)]
pub struct AuthConfig {
    receiver_address: String,
    base_lamports: u64,
    session_ttl_seconds: i64,
    find_tolerance_lamports: u64,
    signature_tolerance_lamports: u64,
    scan_limit: usize,
}

impl AuthConfig {
    #[must_use]
    pub fn new(receiver_address: String) -> Self {
        Self {
            receiver_address,
            base_lamports: DEFAULT_BASE_LAMPORTS,
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
            find_tolerance_lamports: DEFAULT_FIND_TOLERANCE_LAMPORTS,
            signature_tolerance_lamports: DEFAULT_SIGNATURE_TOLERANCE_LAMPORTS,
            scan_limit: DEFAULT_SCAN_LIMIT,
        }
    }

    #[must_use]
    pub fn with_base_lamports(mut self, lamports: u64) -> Self {
        self.base_lamports = lamports;
        self
    }

    #[must_use]
    pub fn with_session_ttl_seconds(mut self, seconds: i64) -> Self {
        self.session_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_find_tolerance_lamports(mut self, lamports: u64) -> Self {
        self.find_tolerance_lamports = lamports;
        self
    }

    #[must_use]
    pub fn with_signature_tolerance_lamports(mut self, lamports: u64) -> Self {
        self.signature_tolerance_lamports = lamports;
        self
    }

    #[must_use]
    pub fn with_scan_limit(mut self, limit: usize) -> Self {
        self.scan_limit = limit;
        self
    }

    #[must_use]
    pub fn receiver_address(&self) -> &str {
        &self.receiver_address
    }

    #[must_use]
    pub fn base_lamports(&self) -> u64 {
        self.base_lamports
    }

    #[must_use]
    pub fn session_ttl_seconds(&self) -> i64 {
        self.session_ttl_seconds
    }

    #[must_use]
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            receiver_address: self.receiver_address.clone(),
            base_lamports: self.base_lamports,
            session_ttl_seconds: self.session_ttl_seconds,
        }
    }

    #[must_use]
    pub fn matcher_config(&self) -> MatcherConfig {
        MatcherConfig {
            scan_limit: self.scan_limit,
            find_tolerance_lamports: self.find_tolerance_lamports,
            signature_tolerance_lamports: self.signature_tolerance_lamports,
        }
    }
}

pub struct AuthState {
    config: AuthConfig,
    store: Arc<SessionStore>,
    matcher: Arc<dyn LedgerMatcher>,
}

impl AuthState {
    #[must_use]
    pub fn new(config: AuthConfig, matcher: Arc<dyn LedgerMatcher>) -> Self {
        let store = Arc::new(SessionStore::new(config.session_config()));
        Self {
            config,
            store,
            matcher,
        }
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Clone a handle for background tasks like the expiry sweeper.
    #[must_use]
    pub fn store_handle(&self) -> Arc<SessionStore> {
        Arc::clone(&self.store)
    }

    pub(crate) fn matcher(&self) -> &dyn LedgerMatcher {
        self.matcher.as_ref()
    }
}
