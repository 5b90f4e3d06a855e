//! Ledger RPC seam.
//!
//! The session only needs four things from the ledger; they are a trait so the
//! transport can be swapped (in tests, an in-memory ledger).

use std::future::Future;
use std::time::Duration;

use log::debug;
use solana_client::{client_error::ClientError, nonblocking::rpc_client::RpcClient};
use solana_sdk::{
    commitment_config::CommitmentConfig,
    hash::Hash,
    instruction::InstructionError,
    pubkey::Pubkey,
    signature::Signature,
    transaction::{TransactionError, VersionedTransaction},
};

use crate::constants::CONFIRMATION_POLL_MS;
use crate::error::{SdkError, SdkResult};

pub trait LedgerRpc {
    /// Raw account data, `None` when the account does not exist.
    fn get_account_data(
        &self,
        address: &Pubkey,
    ) -> impl Future<Output = SdkResult<Option<Vec<u8>>>> + Send;

    fn get_latest_blockhash(&self) -> impl Future<Output = SdkResult<Hash>> + Send;

    /// Every account owned by `program_id`, of any kind.
    fn get_program_accounts(
        &self,
        program_id: &Pubkey,
    ) -> impl Future<Output = SdkResult<Vec<(Pubkey, Vec<u8>)>>> + Send;

    /// Send a signed transaction and wait until it reaches `commitment`.
    /// Fails with [`SdkError::ExpiredBlockHash`] only when its blockhash lapses
    /// before the transaction is seen at all; once landed, it is waited on
    /// regardless of the blockhash. Never re-signs or resubmits.
    fn submit(
        &self,
        tx: &VersionedTransaction,
        commitment: CommitmentConfig,
    ) -> impl Future<Output = SdkResult<Signature>> + Send;
}

// ── Error classification ────────────────────────────────────────────────────

fn custom_code(err: &TransactionError) -> Option<u32> {
    match err {
        TransactionError::InstructionError(_, InstructionError::Custom(code)) => Some(*code),
        _ => None,
    }
}

/// Turn a ledger-side transaction error into the SDK taxonomy.
pub fn classify_transaction_error(err: &TransactionError) -> SdkError {
    match err {
        TransactionError::BlockhashNotFound => SdkError::ExpiredBlockHash,
        other => SdkError::SubmissionFailed {
            reason: other.to_string(),
            program_error: custom_code(other),
        },
    }
}

fn classify_send_error(err: ClientError) -> SdkError {
    match err.get_transaction_error() {
        Some(tx_err) => classify_transaction_error(&tx_err),
        None => SdkError::SubmissionFailed {
            reason: err.to_string(),
            program_error: None,
        },
    }
}

fn rpc_error(err: ClientError) -> SdkError {
    SdkError::Rpc(err.to_string())
}

// ── Solana RPC ──────────────────────────────────────────────────────────────

impl LedgerRpc for RpcClient {
    async fn get_account_data(&self, address: &Pubkey) -> SdkResult<Option<Vec<u8>>> {
        let response = self
            .get_account_with_commitment(address, self.commitment())
            .await
            .map_err(rpc_error)?;
        Ok(response.value.map(|account| account.data))
    }

    async fn get_latest_blockhash(&self) -> SdkResult<Hash> {
        RpcClient::get_latest_blockhash(self).await.map_err(rpc_error)
    }

    async fn get_program_accounts(&self, program_id: &Pubkey) -> SdkResult<Vec<(Pubkey, Vec<u8>)>> {
        let accounts = RpcClient::get_program_accounts(self, program_id)
            .await
            .map_err(rpc_error)?;
        Ok(accounts
            .into_iter()
            .map(|(address, account)| (address, account.data))
            .collect())
    }

    async fn submit(
        &self,
        tx: &VersionedTransaction,
        commitment: CommitmentConfig,
    ) -> SdkResult<Signature> {
        let signature = self.send_transaction(tx).await.map_err(classify_send_error)?;
        let blockhash = *tx.message.recent_blockhash();
        debug!("sent {}, waiting for {:?}", signature, commitment.commitment);

        await_confirmation(
            self,
            &signature,
            &blockhash,
            commitment,
            Duration::from_millis(CONFIRMATION_POLL_MS),
        )
        .await?;
        Ok(signature)
    }
}

// ── Confirmation ────────────────────────────────────────────────────────────

type SignatureStatus = Option<Result<(), TransactionError>>;

/// Status queries the confirmation wait is built on.
trait ConfirmationSource {
    fn signature_status(
        &self,
        signature: &Signature,
        commitment: CommitmentConfig,
    ) -> impl Future<Output = SdkResult<SignatureStatus>> + Send;

    fn blockhash_valid(&self, blockhash: &Hash) -> impl Future<Output = SdkResult<bool>> + Send;
}

impl ConfirmationSource for RpcClient {
    async fn signature_status(
        &self,
        signature: &Signature,
        commitment: CommitmentConfig,
    ) -> SdkResult<SignatureStatus> {
        self.get_signature_status_with_commitment(signature, commitment)
            .await
            .map_err(rpc_error)
    }

    async fn blockhash_valid(&self, blockhash: &Hash) -> SdkResult<bool> {
        self.is_blockhash_valid(blockhash, CommitmentConfig::processed())
            .await
            .map_err(rpc_error)
    }
}

/// Wait until `signature` reaches `commitment`.
///
/// Blockhash expiry only matters until the transaction is seen at processed.
/// After that it has landed, and the wait continues at the requested
/// commitment without consulting the blockhash again.
async fn await_confirmation<C: ConfirmationSource>(
    source: &C,
    signature: &Signature,
    blockhash: &Hash,
    commitment: CommitmentConfig,
    poll: Duration,
) -> SdkResult<()> {
    let mut landed = false;
    loop {
        if !landed {
            match source
                .signature_status(signature, CommitmentConfig::processed())
                .await?
            {
                Some(Ok(())) => {
                    debug!("{} landed, waiting for {:?}", signature, commitment.commitment);
                    landed = true;
                }
                Some(Err(e)) => return Err(classify_transaction_error(&e)),
                None => {
                    if !source.blockhash_valid(blockhash).await? {
                        return Err(SdkError::ExpiredBlockHash);
                    }
                }
            }
        }
        if landed {
            match source.signature_status(signature, commitment).await? {
                Some(Ok(())) => return Ok(()),
                Some(Err(e)) => return Err(classify_transaction_error(&e)),
                None => {}
            }
        }
        tokio::time::sleep(poll).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blockhash_not_found_is_expiry() {
        assert!(matches!(
            classify_transaction_error(&TransactionError::BlockhashNotFound),
            SdkError::ExpiredBlockHash
        ));
    }

    #[test]
    fn custom_program_error_keeps_code_and_reason() {
        let err = TransactionError::InstructionError(0, InstructionError::Custom(6005));
        match classify_transaction_error(&err) {
            SdkError::SubmissionFailed {
                reason,
                program_error,
            } => {
                assert_eq!(program_error, Some(6005));
                assert!(!reason.is_empty());
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    // ── Confirmation ────────────────────────────────────────────────────────

    use std::collections::VecDeque;
    use std::sync::Mutex;

    use solana_sdk::commitment_config::CommitmentLevel;

    /// Replays scripted answers; the last answer of each script repeats.
    struct ScriptedStatus {
        processed: Mutex<VecDeque<SignatureStatus>>,
        requested: Mutex<VecDeque<SignatureStatus>>,
        blockhash: Mutex<VecDeque<bool>>,
        blockhash_checks: Mutex<usize>,
    }

    impl ScriptedStatus {
        fn new(
            processed: Vec<SignatureStatus>,
            requested: Vec<SignatureStatus>,
            blockhash: Vec<bool>,
        ) -> Self {
            Self {
                processed: Mutex::new(processed.into()),
                requested: Mutex::new(requested.into()),
                blockhash: Mutex::new(blockhash.into()),
                blockhash_checks: Mutex::new(0),
            }
        }
    }

    fn next<T: Clone>(script: &Mutex<VecDeque<T>>) -> T {
        let mut script = script.lock().unwrap();
        if script.len() > 1 {
            script.pop_front().unwrap()
        } else {
            script.front().cloned().unwrap()
        }
    }

    impl ConfirmationSource for ScriptedStatus {
        async fn signature_status(
            &self,
            _signature: &Signature,
            commitment: CommitmentConfig,
        ) -> SdkResult<SignatureStatus> {
            Ok(match commitment.commitment {
                CommitmentLevel::Processed => next(&self.processed),
                _ => next(&self.requested),
            })
        }

        async fn blockhash_valid(&self, _blockhash: &Hash) -> SdkResult<bool> {
            *self.blockhash_checks.lock().unwrap() += 1;
            Ok(next(&self.blockhash))
        }
    }

    async fn wait(source: &ScriptedStatus, commitment: CommitmentConfig) -> SdkResult<()> {
        await_confirmation(
            source,
            &Signature::default(),
            &Hash::default(),
            commitment,
            Duration::ZERO,
        )
        .await
    }

    #[tokio::test]
    async fn landed_transaction_outlives_its_blockhash() {
        // Seen at processed on the second poll; finalized three polls later
        // while the blockhash has long expired.
        let source = ScriptedStatus::new(
            vec![None, Some(Ok(()))],
            vec![None, None, None, Some(Ok(()))],
            vec![true, false],
        );
        wait(&source, CommitmentConfig::finalized()).await.unwrap();
        assert_eq!(*source.blockhash_checks.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn unseen_transaction_expires_with_its_blockhash() {
        let source = ScriptedStatus::new(vec![None], vec![None], vec![true, true, false]);
        assert!(matches!(
            wait(&source, CommitmentConfig::confirmed()).await,
            Err(SdkError::ExpiredBlockHash)
        ));
        assert_eq!(*source.blockhash_checks.lock().unwrap(), 3);
    }

    #[tokio::test]
    async fn failed_execution_is_reported_at_processed() {
        let failure = TransactionError::InstructionError(0, InstructionError::Custom(6003));
        let source = ScriptedStatus::new(vec![Some(Err(failure))], vec![None], vec![true]);
        assert!(matches!(
            wait(&source, CommitmentConfig::finalized()).await,
            Err(SdkError::SubmissionFailed {
                program_error: Some(6003),
                ..
            })
        ));
    }
}
