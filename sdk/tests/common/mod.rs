#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use canvote_sdk::{
    codec,
    error::{SdkError, SdkResult},
    pda::{find_proposal, find_singleton, find_user, find_user_vote},
    rpc::LedgerRpc,
    signer::{KeypairSigner, RejectReason, SignRequest, SignerResponse, WalletSigner},
    state::*,
    transaction, GovernanceProgram,
};
use solana_sdk::{
    commitment_config::CommitmentConfig,
    hash::Hash,
    pubkey::Pubkey,
    signature::{Keypair, Signature},
    transaction::VersionedTransaction,
};

// ── In-memory ledger ────────────────────────────────────────────────────────

pub struct MemoryLedger {
    accounts: Mutex<HashMap<Pubkey, Vec<u8>>>,
    blockhash: Hash,
    submitted: Mutex<Vec<VersionedTransaction>>,
    submit_failure: Mutex<Option<fn() -> SdkError>>,
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self {
            accounts: Mutex::new(HashMap::new()),
            blockhash: Hash::new_unique(),
            submitted: Mutex::new(Vec::new()),
            submit_failure: Mutex::new(None),
        }
    }

    pub fn put_raw(&self, address: Pubkey, data: Vec<u8>) {
        self.accounts.lock().unwrap().insert(address, data);
    }

    pub fn put(&self, program: &GovernanceProgram, address: Pubkey, record: Record) {
        let data = codec::encode(program.variant, &record).unwrap();
        self.put_raw(address, data);
    }

    pub fn put_proposal(&self, program: &GovernanceProgram, proposal: Proposal) -> Pubkey {
        let (address, _) = find_proposal(program, proposal.id).unwrap();
        self.put(program, address, Record::Proposal(proposal));
        address
    }

    pub fn put_governance(&self, program: &GovernanceProgram, account: GovernanceAccount) {
        let (address, _) = find_singleton(program).unwrap();
        self.put(program, address, Record::Governance(account));
    }

    pub fn put_user(&self, program: &GovernanceProgram, owner: &Pubkey, user: UserAccount) {
        let (address, _) = find_user(program, owner).unwrap();
        self.put(program, address, Record::User(user));
    }

    pub fn put_user_vote(
        &self,
        program: &GovernanceProgram,
        voter: &Pubkey,
        proposal: &Pubkey,
        ballot: UserVote,
    ) {
        let (address, _) = find_user_vote(program, voter, proposal).unwrap();
        self.put(program, address, Record::UserVote(ballot));
    }

    pub fn fail_submissions_with(&self, failure: fn() -> SdkError) {
        *self.submit_failure.lock().unwrap() = Some(failure);
    }

    pub fn submitted(&self) -> Vec<VersionedTransaction> {
        self.submitted.lock().unwrap().clone()
    }

    pub fn blockhash(&self) -> Hash {
        self.blockhash
    }
}

impl LedgerRpc for MemoryLedger {
    async fn get_account_data(&self, address: &Pubkey) -> SdkResult<Option<Vec<u8>>> {
        Ok(self.accounts.lock().unwrap().get(address).cloned())
    }

    async fn get_latest_blockhash(&self) -> SdkResult<Hash> {
        Ok(self.blockhash)
    }

    async fn get_program_accounts(
        &self,
        _program_id: &Pubkey,
    ) -> SdkResult<Vec<(Pubkey, Vec<u8>)>> {
        Ok(self
            .accounts
            .lock()
            .unwrap()
            .iter()
            .map(|(k, v)| (*k, v.clone()))
            .collect())
    }

    async fn submit(
        &self,
        tx: &VersionedTransaction,
        _commitment: CommitmentConfig,
    ) -> SdkResult<Signature> {
        if let Some(failure) = *self.submit_failure.lock().unwrap() {
            return Err(failure());
        }
        self.submitted.lock().unwrap().push(tx.clone());
        Ok(tx.signatures[0])
    }
}

// ── Wallets ─────────────────────────────────────────────────────────────────

/// Always answers like a user dismissing the prompt.
pub struct CancellingWallet;

impl WalletSigner for CancellingWallet {
    async fn sign(&self, _request: SignRequest) -> SdkResult<SignerResponse> {
        Ok(SignerResponse::Rejected {
            reason: RejectReason::UserCancelled,
        })
    }
}

pub struct RefusingWallet;

impl WalletSigner for RefusingWallet {
    async fn sign(&self, _request: SignRequest) -> SdkResult<SignerResponse> {
        Ok(SignerResponse::Rejected {
            reason: RejectReason::Other("account locked".to_string()),
        })
    }
}

/// Yields once before signing so concurrent calls interleave.
pub struct SlowWallet(pub KeypairSigner);

impl WalletSigner for SlowWallet {
    async fn sign(&self, request: SignRequest) -> SdkResult<SignerResponse> {
        tokio::task::yield_now().await;
        self.0.sign(request).await
    }
}

/// Signs the fee-payer slot on a fresh signature list, discarding whatever
/// co-signatures arrived with the request.
pub struct FreshSigningWallet(pub Keypair);

impl WalletSigner for FreshSigningWallet {
    async fn sign(&self, request: SignRequest) -> SdkResult<SignerResponse> {
        let mut tx = transaction::from_base58(&request.unsigned_tx)?;
        for sig in tx.signatures.iter_mut() {
            *sig = Signature::default();
        }
        transaction::partial_sign(&mut tx, &self.0)?;
        Ok(SignerResponse::Signed {
            signed_tx: transaction::to_base58(&tx)?,
        })
    }
}

// ── Fixtures ────────────────────────────────────────────────────────────────

pub fn proposal(id: u64, start_time: i64, end_time: i64) -> Proposal {
    Proposal {
        id,
        title: format!("Proposal {}", id),
        description: "Fund the community canvas".to_string(),
        creator: Pubkey::new_unique(),
        yes_votes: 0,
        no_votes: 0,
        status: ProposalStatus::Active,
        start_time,
        end_time,
    }
}

pub fn clock_100() -> i64 {
    100
}

pub fn clock_150() -> i64 {
    150
}

pub fn clock_250() -> i64 {
    250
}
