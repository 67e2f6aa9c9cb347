//! Evaluates ledger transactions against a session's matching criteria.

use async_trait::async_trait;
use tracing::trace;

use super::rpc::{LedgerError, RpcClient, TransactionDetail};

/// Metadata of an on-chain transfer accepted as the session's payment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentMatch {
    pub signature: String,
    pub received_lamports: u64,
    pub slot: u64,
    pub block_time: Option<i64>,
}

/// Outcome of checking a user-submitted transaction signature.
///
/// A rejection is an answer, not an error: the session stays pending and the
/// caller may retry with a different proof.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationOutcome {
    Confirmed(PaymentMatch),
    Rejected { reason: String },
}

/// How a scanned transaction failed to match. Only used for the rejection
/// reason and trace logging.
#[derive(Debug, Clone, PartialEq, Eq)]
enum TransferMismatch {
    FailedOnChain,
    MissingMeta,
    SenderMismatch,
    ReceiverNotInvolved,
    AmountOutOfTolerance { delta_lamports: i128 },
}

impl std::fmt::Display for TransferMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FailedOnChain => write!(f, "transaction failed on-chain"),
            Self::MissingMeta => write!(f, "transaction has no balance metadata"),
            Self::SenderMismatch => write!(f, "transaction was not signed by the claimed wallet"),
            Self::ReceiverNotInvolved => {
                write!(f, "receiver address is not a participant of the transaction")
            }
            Self::AmountOutOfTolerance { delta_lamports } => {
                write!(
                    f,
                    "transferred amount ({delta_lamports} lamports) does not match the expected amount"
                )
            }
        }
    }
}

/// Narrow contract the session flow consumes. Injectable so tests and
/// alternative ledger backends can stand in for the RPC implementation; the
/// matcher performs no state mutation.
#[async_trait]
pub trait LedgerMatcher: Send + Sync {
    /// Scan recent confirmed transactions addressed to `receiver` for a
    /// transfer from `expected_sender` of the expected amount.
    ///
    /// `Ok(None)` means no match in the window, never an error. Errors are
    /// genuine I/O failures the caller is expected to degrade on.
    async fn find_match(
        &self,
        expected_sender: &str,
        receiver: &str,
        expected_lamports: u64,
    ) -> Result<Option<PaymentMatch>, LedgerError>;

    /// Check one explicitly claimed transaction signature with the same
    /// balance-delta logic, under the wider tolerance.
    async fn verify_signature(
        &self,
        signature: &str,
        from_address: &str,
        to_address: &str,
        expected_lamports: u64,
    ) -> Result<VerificationOutcome, LedgerError>;
}

#[derive(Debug, Clone)]
pub struct MatcherConfig {
    /// How many of the receiver's most recent transactions one poll scans.
    pub scan_limit: usize,
    /// Tolerance for the scan path. The amount is the correlation key and
    /// concurrent sessions can sit one lamport apart, so this stays at exact
    /// match unless deliberately widened.
    pub find_tolerance_lamports: u64,
    /// Tolerance for user-submitted signatures, which already name one
    /// transaction and need no disambiguation.
    pub signature_tolerance_lamports: u64,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            scan_limit: 20,
            find_tolerance_lamports: 1,
            signature_tolerance_lamports: 1_000,
        }
    }
}

/// [`LedgerMatcher`] backed by the JSON-RPC client.
pub struct RpcMatcher {
    rpc: RpcClient,
    config: MatcherConfig,
}

impl RpcMatcher {
    #[must_use]
    pub fn new(rpc: RpcClient, config: MatcherConfig) -> Self {
        Self { rpc, config }
    }
}

#[async_trait]
impl LedgerMatcher for RpcMatcher {
    async fn find_match(
        &self,
        expected_sender: &str,
        receiver: &str,
        expected_lamports: u64,
    ) -> Result<Option<PaymentMatch>, LedgerError> {
        let signatures = self
            .rpc
            .signatures_for_address(receiver, self.config.scan_limit)
            .await?;
        for info in signatures {
            if info.err.is_some() {
                continue;
            }
            let Some(detail) = self.rpc.transaction(&info.signature).await? else {
                continue;
            };
            match evaluate_transfer(
                &detail,
                expected_sender,
                receiver,
                expected_lamports,
                self.config.find_tolerance_lamports,
            ) {
                Ok(received_lamports) => {
                    return Ok(Some(PaymentMatch {
                        signature: info.signature,
                        received_lamports,
                        slot: detail.slot,
                        block_time: detail.block_time.or(info.block_time),
                    }));
                }
                Err(mismatch) => {
                    trace!(signature = %info.signature, %mismatch, "scanned transaction skipped");
                }
            }
        }
        Ok(None)
    }

    async fn verify_signature(
        &self,
        signature: &str,
        from_address: &str,
        to_address: &str,
        expected_lamports: u64,
    ) -> Result<VerificationOutcome, LedgerError> {
        let Some(detail) = self.rpc.transaction(signature).await? else {
            return Ok(VerificationOutcome::Rejected {
                reason: "transaction not found on the ledger".to_string(),
            });
        };
        match evaluate_transfer(
            &detail,
            from_address,
            to_address,
            expected_lamports,
            self.config.signature_tolerance_lamports,
        ) {
            Ok(received_lamports) => Ok(VerificationOutcome::Confirmed(PaymentMatch {
                signature: signature.to_string(),
                received_lamports,
                slot: detail.slot,
                block_time: detail.block_time,
            })),
            Err(mismatch) => Ok(VerificationOutcome::Rejected {
                reason: mismatch.to_string(),
            }),
        }
    }
}

/// Core acceptance test for a single transaction: confirmed, first-signed by
/// the expected sender, crediting the receiver by the expected amount within
/// `tolerance_lamports` (strict `<` comparison).
fn evaluate_transfer(
    detail: &TransactionDetail,
    expected_sender: &str,
    receiver: &str,
    expected_lamports: u64,
    tolerance_lamports: u64,
) -> Result<u64, TransferMismatch> {
    let Some(meta) = detail.meta.as_ref() else {
        return Err(TransferMismatch::MissingMeta);
    };
    if meta.err.is_some() {
        return Err(TransferMismatch::FailedOnChain);
    }
    let keys = &detail.transaction.message.account_keys;
    if keys.first().map(String::as_str) != Some(expected_sender) {
        return Err(TransferMismatch::SenderMismatch);
    }
    let Some(receiver_index) = keys.iter().position(|key| key == receiver) else {
        return Err(TransferMismatch::ReceiverNotInvolved);
    };
    let (Some(pre), Some(post)) = (
        meta.pre_balances.get(receiver_index),
        meta.post_balances.get(receiver_index),
    ) else {
        return Err(TransferMismatch::MissingMeta);
    };
    let delta = i128::from(*post) - i128::from(*pre);
    if (delta - i128::from(expected_lamports)).unsigned_abs() < u128::from(tolerance_lamports) {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let received = delta.max(0) as u64;
        Ok(received)
    } else {
        Err(TransferMismatch::AmountOutOfTolerance {
            delta_lamports: delta,
        })
    }
}
