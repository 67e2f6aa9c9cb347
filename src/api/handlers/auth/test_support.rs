//! Shared fixtures for the auth handler tests: a scripted matcher standing in
//! for the RPC-backed one, and body helpers.

use async_trait::async_trait;
use axum::response::Response;
use std::sync::Arc;

use super::state::{AuthConfig, AuthState};
use crate::ledger::{LedgerError, LedgerMatcher, PaymentMatch, VerificationOutcome};

pub(crate) const WALLET: &str = "9xQeWvG816bUx9EPjHmaT23yvVM2ZWbrrpZb9PusVFin";
pub(crate) const RECEIVER: &str = "Ge3jkza5KRfXvaq3GELNLh6V1pjjdEKNpEdGXJgjjKUR";
// any base58 string of signature length works for the handlers under test
pub(crate) const SIGNATURE: &str =
    "5j2Ns4AqHkWvD8uBx1gT3mYcVeRz6aFpLqXwK9dE7hUoPiGbCtSnJfM4yQ8rZvA1eW5xD2cT7kLmB9gNpRhVuYsJ";

pub(crate) enum MatcherScript {
    NoMatch,
    Match(PaymentMatch),
    Reject(String),
    Error,
}

pub(crate) struct ScriptedMatcher {
    script: MatcherScript,
}

#[async_trait]
impl LedgerMatcher for ScriptedMatcher {
    async fn find_match(
        &self,
        _expected_sender: &str,
        _receiver: &str,
        _expected_lamports: u64,
    ) -> Result<Option<PaymentMatch>, LedgerError> {
        match &self.script {
            MatcherScript::Match(payment) => Ok(Some(payment.clone())),
            MatcherScript::NoMatch | MatcherScript::Reject(_) => Ok(None),
            MatcherScript::Error => Err(LedgerError::Malformed("scripted failure".to_string())),
        }
    }

    async fn verify_signature(
        &self,
        signature: &str,
        _from_address: &str,
        _to_address: &str,
        _expected_lamports: u64,
    ) -> Result<VerificationOutcome, LedgerError> {
        match &self.script {
            MatcherScript::Match(payment) => Ok(VerificationOutcome::Confirmed(PaymentMatch {
                signature: signature.to_string(),
                ..payment.clone()
            })),
            MatcherScript::Reject(reason) => Ok(VerificationOutcome::Rejected {
                reason: reason.clone(),
            }),
            MatcherScript::NoMatch => Ok(VerificationOutcome::Rejected {
                reason: "transaction not found on the ledger".to_string(),
            }),
            MatcherScript::Error => Err(LedgerError::Malformed("scripted failure".to_string())),
        }
    }
}

pub(crate) fn payment(signature: &str, lamports: u64) -> PaymentMatch {
    PaymentMatch {
        signature: signature.to_string(),
        received_lamports: lamports,
        slot: 1234,
        block_time: Some(1_700_000_000),
    }
}

pub(crate) fn auth_state(script: MatcherScript) -> Arc<AuthState> {
    auth_state_with_ttl(script, 300)
}

pub(crate) fn auth_state_with_ttl(script: MatcherScript, ttl_seconds: i64) -> Arc<AuthState> {
    let config = AuthConfig::new(RECEIVER.to_string()).with_session_ttl_seconds(ttl_seconds);
    Arc::new(AuthState::new(config, Arc::new(ScriptedMatcher { script })))
}

pub(crate) async fn body_json(response: Response) -> anyhow::Result<serde_json::Value> {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&bytes)?)
}
