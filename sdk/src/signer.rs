//! External wallet contract.
//!
//! The wallet receives `{unsignedTx, awaitCommitment, chainId}` and answers
//! either with the signed transaction or with a rejection. A user cancelling
//! is an ordinary outcome, distinct from the wallet failing.

use std::future::Future;

use serde::{Deserialize, Serialize};
use solana_sdk::{
    commitment_config::CommitmentLevel,
    signature::{Keypair, Signer},
};

use crate::error::SdkResult;
use crate::transaction::{from_base58, partial_sign, to_base58};

#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SignRequest {
    /// Base58 of the bincode-serialized unsigned transaction.
    pub unsigned_tx: String,
    pub await_commitment: CommitmentLevel,
    pub chain_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    UserCancelled,
    Other(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignerResponse {
    Signed { signed_tx: String },
    Rejected { reason: RejectReason },
}

/// Raw JSON reply of a wallet, `{ "success": bool, "signedTx"?: string, "reason"?: string }`.
#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct WalletReply {
    pub success: bool,
    #[serde(default)]
    pub signed_tx: Option<String>,
    #[serde(default)]
    pub reason: Option<String>,
}

impl From<WalletReply> for SignerResponse {
    fn from(reply: WalletReply) -> Self {
        match (reply.success, reply.signed_tx) {
            (true, Some(signed_tx)) => SignerResponse::Signed { signed_tx },
            (true, None) => SignerResponse::Rejected {
                reason: RejectReason::Other(
                    "wallet reported success without a transaction".to_string(),
                ),
            },
            (false, _) => {
                let reason = match reply.reason.as_deref() {
                    Some("user-cancelled") | Some("user_cancelled") | Some("cancelled") => {
                        RejectReason::UserCancelled
                    }
                    Some(other) => RejectReason::Other(other.to_string()),
                    None => RejectReason::Other("unknown".to_string()),
                };
                SignerResponse::Rejected { reason }
            }
        }
    }
}

/// Anything that can turn an unsigned transaction into a signed one.
pub trait WalletSigner {
    fn sign(&self, request: SignRequest) -> impl Future<Output = SdkResult<SignerResponse>> + Send;
}

/// Signs locally with a keypair held in process. Used by unattended services
/// such as the finalization keeper.
pub struct KeypairSigner {
    keypair: Keypair,
}

impl KeypairSigner {
    pub fn new(keypair: Keypair) -> Self {
        Self { keypair }
    }

    pub fn pubkey(&self) -> solana_sdk::pubkey::Pubkey {
        self.keypair.pubkey()
    }

    /// Adds this keypair's signature and keeps any co-signatures already on
    /// the transaction.
    fn sign_now(&self, request: &SignRequest) -> SdkResult<String> {
        let mut tx = from_base58(&request.unsigned_tx)?;
        partial_sign(&mut tx, &self.keypair)?;
        to_base58(&tx)
    }
}

impl WalletSigner for KeypairSigner {
    async fn sign(&self, request: SignRequest) -> SdkResult<SignerResponse> {
        Ok(SignerResponse::Signed {
            signed_tx: self.sign_now(&request)?,
        })
    }
}
