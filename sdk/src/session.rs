//! Governance session: reads, locally-checked mutations, and the
//! sign-and-submit path every mutation shares.
//!
//! One session is built per connected wallet and passed around by reference.
//! Each (action, target) pair can only be in flight once; a second attempt
//! fails straight away with [`SdkError::ActionInFlight`] instead of queueing.
//! Cached reads are advisory and are dropped after every confirmed mutation.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

use log::{debug, info};
use solana_sdk::{
    commitment_config::CommitmentConfig, instruction::Instruction, pubkey::Pubkey,
    signature::Signature, signer::Signer,
};

use crate::codec;
use crate::config::ClientConfig;
use crate::error::{DecodeError, SdkError, SdkResult};
use crate::instruction::{self, Intent};
use crate::lifecycle;
use crate::pda::{find_proposal, find_singleton, find_user, find_user_vote};
use crate::rpc::LedgerRpc;
use crate::signer::{RejectReason, SignRequest, SignerResponse, WalletSigner};
use crate::state::{
    AccountKind, GovernanceAccount, Proposal, Record, UserAccount, UserVote, VoteType,
};
use crate::transaction::{assemble, from_base58, missing_signers, partial_sign, to_base58};
use crate::variant::GovernanceProgram;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposalEntry {
    pub address: Pubkey,
    pub proposal: Proposal,
}

/// How a mutation ended when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Confirmed(Signature),
    /// The user dismissed the wallet prompt. Nothing was sent.
    SignerRejected,
}

impl ActionOutcome {
    pub fn signature(&self) -> Option<Signature> {
        match self {
            ActionOutcome::Confirmed(sig) => Some(*sig),
            ActionOutcome::SignerRejected => None,
        }
    }
}

#[derive(Default)]
struct SessionCache {
    proposals: Option<Vec<ProposalEntry>>,
    votes: HashMap<(Pubkey, Pubkey), Option<UserVote>>,
}

type InFlightKey = (&'static str, Pubkey);

/// Holds an (action, target) slot; released on drop, whatever the exit path.
struct InFlight<'a> {
    set: &'a Mutex<HashSet<InFlightKey>>,
    key: InFlightKey,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        lock(self.set).remove(&self.key);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Seconds since the Unix epoch, as the ledger clock reports them.
pub fn system_clock() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

pub struct GovernanceSession<R, S> {
    program: GovernanceProgram,
    rpc: R,
    signer: S,
    authority: Pubkey,
    commitment: CommitmentConfig,
    chain_id: String,
    clock: fn() -> i64,
    in_flight: Mutex<HashSet<InFlightKey>>,
    cache: Mutex<SessionCache>,
}

impl<R: LedgerRpc, S: WalletSigner> GovernanceSession<R, S> {
    /// `authority` is the wallet's address; it pays for and signs every
    /// transaction the session builds.
    pub fn new(
        program: GovernanceProgram,
        rpc: R,
        signer: S,
        authority: Pubkey,
        chain_id: impl Into<String>,
    ) -> Self {
        Self {
            program,
            rpc,
            signer,
            authority,
            commitment: CommitmentConfig::confirmed(),
            chain_id: chain_id.into(),
            clock: system_clock,
            in_flight: Mutex::new(HashSet::new()),
            cache: Mutex::new(SessionCache::default()),
        }
    }

    pub fn from_config(config: &ClientConfig, rpc: R, signer: S, authority: Pubkey) -> Self {
        Self::new(config.program, rpc, signer, authority, config.chain_id())
            .with_commitment(config.commitment)
    }

    pub fn with_commitment(mut self, commitment: CommitmentConfig) -> Self {
        self.commitment = commitment;
        self
    }

    pub fn with_clock(mut self, clock: fn() -> i64) -> Self {
        self.clock = clock;
        self
    }

    pub fn program(&self) -> &GovernanceProgram {
        &self.program
    }

    pub fn authority(&self) -> Pubkey {
        self.authority
    }

    pub fn rpc(&self) -> &R {
        &self.rpc
    }

    pub fn now(&self) -> i64 {
        (self.clock)()
    }

    // ── Reads ───────────────────────────────────────────────────────────────

    async fn account_data(&self, address: &Pubkey) -> SdkResult<Vec<u8>> {
        self.rpc
            .get_account_data(address)
            .await?
            .ok_or(SdkError::AccountNotFound(*address))
    }

    pub async fn fetch_governance(&self) -> SdkResult<GovernanceAccount> {
        let (address, _) = find_singleton(&self.program)?;
        let data = self.account_data(&address).await?;
        Ok(codec::decode_governance(self.program.variant, &data)?)
    }

    /// Every proposal the program owns, newest first. Accounts that fail to
    /// decode are left out rather than failing the listing.
    pub async fn fetch_proposals(&self) -> SdkResult<Vec<ProposalEntry>> {
        let accounts = self.rpc.get_program_accounts(&self.program.program_id).await?;
        let mut proposals: Vec<ProposalEntry> =
            codec::decode_all(self.program.variant, AccountKind::Proposal, accounts)
                .into_iter()
                .filter_map(|(address, record)| match record {
                    Record::Proposal(proposal) => Some(ProposalEntry { address, proposal }),
                    _ => None,
                })
                .collect();
        proposals.sort_by(|a, b| b.proposal.id.cmp(&a.proposal.id));

        lock(&self.cache).proposals = Some(proposals.clone());
        Ok(proposals)
    }

    /// Last listing fetched, unless a mutation has since been confirmed.
    pub fn cached_proposals(&self) -> Option<Vec<ProposalEntry>> {
        lock(&self.cache).proposals.clone()
    }

    pub async fn fetch_proposal(&self, proposal_id: u64) -> SdkResult<ProposalEntry> {
        let (address, _) = find_proposal(&self.program, proposal_id)?;
        let data = self.account_data(&address).await?;
        Ok(ProposalEntry {
            address,
            proposal: codec::decode_proposal(&data)?,
        })
    }

    /// `None` when `owner` has no user record yet.
    pub async fn fetch_user(&self, owner: &Pubkey) -> SdkResult<Option<UserAccount>> {
        let (address, _) = find_user(&self.program, owner)?;
        match self.rpc.get_account_data(&address).await? {
            Some(data) => Ok(Some(codec::decode_user(self.program.variant, &data)?)),
            None => Ok(None),
        }
    }

    /// `voter`'s ballot on the proposal at `proposal`, `None` before a first
    /// vote. Only the delegation program keeps ballots.
    pub async fn fetch_user_vote(
        &self,
        voter: &Pubkey,
        proposal: &Pubkey,
    ) -> SdkResult<Option<UserVote>> {
        let variant = self.program.variant;
        if !variant.has_user_votes() {
            return Err(DecodeError::UnsupportedKind {
                kind: AccountKind::UserVote,
                variant,
            }
            .into());
        }
        let (address, _) = find_user_vote(&self.program, voter, proposal)?;
        let ballot = match self.rpc.get_account_data(&address).await? {
            Some(data) => Some(codec::decode_user_vote(variant, &data)?),
            None => None,
        };

        lock(&self.cache).votes.insert((*voter, *proposal), ballot);
        Ok(ballot)
    }

    /// Outer `None`: never fetched, or invalidated since.
    pub fn cached_vote(&self, voter: &Pubkey, proposal: &Pubkey) -> Option<Option<UserVote>> {
        lock(&self.cache).votes.get(&(*voter, *proposal)).copied()
    }

    // ── Mutations ───────────────────────────────────────────────────────────

    pub async fn initialize(&self) -> SdkResult<ActionOutcome> {
        let (singleton, _) = find_singleton(&self.program)?;
        let _slot = self.begin("initialize", singleton)?;

        let ix = self.build(&Intent::Initialize {
            authority: self.authority,
        })?;
        self.submit("initialize", ix).await
    }

    /// Register `user_authority` with `initial_base_power`. The session
    /// authority signs as admin. When the voter is someone else, `co_signer`
    /// must hold the voter's key; it signs before the wallet is asked.
    pub async fn initialize_user(
        &self,
        user_authority: &Pubkey,
        initial_base_power: u64,
        co_signer: Option<&(dyn Signer + Sync)>,
    ) -> SdkResult<ActionOutcome> {
        let (user, _) = find_user(&self.program, user_authority)?;
        let _slot = self.begin("initializeUser", user)?;

        let ix = self.build(&Intent::InitializeUser {
            user_authority: *user_authority,
            admin: self.authority,
            initial_base_power,
        })?;

        let co_signers: Vec<&(dyn Signer + Sync)> = if *user_authority == self.authority {
            Vec::new()
        } else {
            match co_signer {
                Some(signer) if signer.pubkey() == *user_authority => vec![signer],
                _ => return Err(SdkError::MissingSignature(*user_authority)),
            }
        };
        self.submit_signed("initializeUser", ix, &co_signers).await
    }

    pub async fn create_proposal(
        &self,
        title: &str,
        description: &str,
        voting_period: i64,
    ) -> SdkResult<ActionOutcome> {
        lifecycle::check_voting_period(voting_period)?;
        let (singleton, _) = find_singleton(&self.program)?;
        let _slot = self.begin("createProposal", singleton)?;

        let governance = self.fetch_governance().await?;
        let ix = self.build(&Intent::CreateProposal {
            proposer: self.authority,
            proposal_index: governance.proposal_count(),
            title: title.to_string(),
            description: description.to_string(),
            voting_period,
        })?;
        self.submit("createProposal", ix).await
    }

    /// Vote on the proposal stored at `proposal_address`, whose id is
    /// `proposal_id`. `voting_power` is required by the quadratic program and
    /// must be omitted for the delegation one.
    pub async fn vote(
        &self,
        proposal_address: &Pubkey,
        proposal_id: u64,
        vote_type: VoteType,
        voting_power: Option<u64>,
    ) -> SdkResult<ActionOutcome> {
        let _slot = self.begin("vote", *proposal_address)?;

        let (expected, _) = find_proposal(&self.program, proposal_id)?;
        if expected != *proposal_address {
            return Err(SdkError::AddressMismatch {
                address: *proposal_address,
                expected,
            });
        }
        let ix = self.build(&Intent::Vote {
            voter: self.authority,
            proposal_id,
            vote_type,
            voting_power,
        })?;

        let data = self.account_data(proposal_address).await?;
        let proposal = codec::decode_proposal(&data)?;
        let ballot = if self.program.variant.has_user_votes() {
            self.fetch_user_vote(&self.authority, proposal_address).await?
        } else {
            None
        };
        lifecycle::check_vote(&proposal, ballot.as_ref(), self.now())?;

        self.submit("vote", ix).await
    }

    pub async fn delegate(&self, delegate_to: &Pubkey) -> SdkResult<ActionOutcome> {
        let (user, _) = find_user(&self.program, &self.authority)?;
        let _slot = self.begin("delegate", user)?;

        let record = self.fetch_user(&self.authority).await?;
        lifecycle::check_delegate(self.program.variant, record.as_ref())?;

        let ix = self.build(&Intent::Delegate {
            delegator: self.authority,
            delegate_to: *delegate_to,
        })?;
        self.submit("delegate", ix).await
    }

    pub async fn undelegate(&self) -> SdkResult<ActionOutcome> {
        let (user, _) = find_user(&self.program, &self.authority)?;
        let _slot = self.begin("undelegate", user)?;

        let record = self.fetch_user(&self.authority).await?;
        lifecycle::check_undelegate(record.as_ref())?;

        let ix = self.build(&Intent::Undelegate {
            authority: self.authority,
        })?;
        self.submit("undelegate", ix).await
    }

    pub async fn finalize(&self, proposal_id: u64) -> SdkResult<ActionOutcome> {
        let (address, _) = find_proposal(&self.program, proposal_id)?;
        let _slot = self.begin("finalize", address)?;

        let entry = self.fetch_proposal(proposal_id).await?;
        let outcome = lifecycle::check_finalize(&entry.proposal, self.now())?;
        debug!("finalizing proposal {} as {:?}", proposal_id, outcome);

        let ix = self.build(&Intent::FinalizeProposal {
            finalizer: self.authority,
            proposal_id,
        })?;
        self.submit("finalize", ix).await
    }

    // ── Internals ───────────────────────────────────────────────────────────

    fn begin(&self, action: &'static str, target: Pubkey) -> SdkResult<InFlight<'_>> {
        let key = (action, target);
        if !lock(&self.in_flight).insert(key) {
            return Err(SdkError::ActionInFlight { action, target });
        }
        Ok(InFlight {
            set: &self.in_flight,
            key,
        })
    }

    fn build(&self, intent: &Intent) -> SdkResult<Instruction> {
        instruction::encode(&self.program, intent)
    }

    fn invalidate(&self) {
        let mut cache = lock(&self.cache);
        cache.proposals = None;
        cache.votes.clear();
    }

    async fn submit(&self, action: &'static str, ix: Instruction) -> SdkResult<ActionOutcome> {
        self.submit_signed(action, ix, &[]).await
    }

    /// Shared mutation path. `co_signers` sign locally first; the wallet then
    /// signs for the session authority.
    async fn submit_signed(
        &self,
        action: &'static str,
        ix: Instruction,
        co_signers: &[&(dyn Signer + Sync)],
    ) -> SdkResult<ActionOutcome> {
        let blockhash = self.rpc.get_latest_blockhash().await?;
        let mut unsigned = assemble(&[ix], &self.authority, blockhash)?;
        for signer in co_signers {
            partial_sign(&mut unsigned, *signer)?;
        }

        let request = SignRequest {
            unsigned_tx: to_base58(&unsigned)?,
            await_commitment: self.commitment.commitment,
            chain_id: self.chain_id.clone(),
        };
        let signed_tx = match self.signer.sign(request).await? {
            SignerResponse::Signed { signed_tx } => signed_tx,
            SignerResponse::Rejected {
                reason: RejectReason::UserCancelled,
            } => {
                info!("{} cancelled in wallet", action);
                return Ok(ActionOutcome::SignerRejected);
            }
            SignerResponse::Rejected {
                reason: RejectReason::Other(reason),
            } => return Err(SdkError::SignerFailed(reason)),
        };

        let signed = from_base58(&signed_tx)?;
        if signed.message.serialize() != unsigned.message.serialize() {
            return Err(SdkError::SignerFailed(
                "wallet returned a different message than it was asked to sign".to_string(),
            ));
        }
        if let Some(missing) = missing_signers(&signed).first() {
            return Err(SdkError::MissingSignature(*missing));
        }

        let signature = self.rpc.submit(&signed, self.commitment).await?;
        self.invalidate();
        info!("{} confirmed: {}", action, signature);
        Ok(ActionOutcome::Confirmed(signature))
    }
}
