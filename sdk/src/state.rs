//! Typed account records owned by the governance programs.

use borsh::BorshSerialize;
use solana_program::pubkey::Pubkey;

use crate::constants::*;

// ---------------------------------------------------------------------------
// Enums (single tag byte equal to the declaration index)
// ---------------------------------------------------------------------------

#[derive(BorshSerialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ProposalStatus {
    Active = 0,
    Passed = 1,
    Rejected = 2,
}

impl ProposalStatus {
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(ProposalStatus::Active),
            1 => Some(ProposalStatus::Passed),
            2 => Some(ProposalStatus::Rejected),
            _ => None,
        }
    }
}

#[derive(BorshSerialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum VoteType {
    Yes = 0,
    No = 1,
}

impl VoteType {
    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(VoteType::Yes),
            1 => Some(VoteType::No),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Singleton
// ---------------------------------------------------------------------------

/// Singleton of the delegation program.
#[derive(BorshSerialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VotingState {
    pub proposal_count: u64, // 8
}

/// Singleton of the quadratic program.
#[derive(BorshSerialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Governance {
    pub admin: Pubkey,         // 32
    pub proposal_count: u64,   // 8
    pub total_base_power: u64, // 8
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GovernanceAccount {
    VotingState(VotingState),
    Governance(Governance),
}

impl GovernanceAccount {
    /// Index the next created proposal will receive.
    pub fn proposal_count(&self) -> u64 {
        match self {
            GovernanceAccount::VotingState(s) => s.proposal_count,
            GovernanceAccount::Governance(g) => g.proposal_count,
        }
    }

    pub fn admin(&self) -> Option<Pubkey> {
        match self {
            GovernanceAccount::VotingState(_) => None,
            GovernanceAccount::Governance(g) => Some(g.admin),
        }
    }

    pub fn total_base_power(&self) -> Option<u64> {
        match self {
            GovernanceAccount::VotingState(_) => None,
            GovernanceAccount::Governance(g) => Some(g.total_base_power),
        }
    }
}

// ---------------------------------------------------------------------------
// Proposal
// ---------------------------------------------------------------------------

#[derive(BorshSerialize, Debug, Clone, PartialEq, Eq)]
pub struct Proposal {
    pub id: u64,
    pub title: String,
    pub description: String,
    pub creator: Pubkey,
    pub yes_votes: u64,
    pub no_votes: u64,
    pub status: ProposalStatus,
    pub start_time: i64,
    pub end_time: i64,
}

impl Proposal {
    // 8 + 4 + 4 + 32 + 8 + 8 + 1 + 8 + 8, with both strings empty
    pub const MIN_SIZE: usize = 81;

    pub fn total_votes(&self) -> u64 {
        self.yes_votes.saturating_add(self.no_votes)
    }
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// Per-voter record of the delegation program.
#[derive(BorshSerialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DelegationUser {
    pub delegated_to: Option<Pubkey>,
}

/// Per-voter record of the quadratic program.
#[derive(BorshSerialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuadraticUser {
    pub base_power: u64,              // 8
    pub reputation: u8,               // 1
    pub last_vote_time: i64,          // 8
    pub delegated_to: Option<Pubkey>, // 1 + 32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAccount {
    Delegation(DelegationUser),
    Quadratic(QuadraticUser),
}

impl UserAccount {
    pub fn delegated_to(&self) -> Option<Pubkey> {
        match self {
            UserAccount::Delegation(u) => u.delegated_to,
            UserAccount::Quadratic(u) => u.delegated_to,
        }
    }

    pub fn base_power(&self) -> Option<u64> {
        match self {
            UserAccount::Delegation(_) => None,
            UserAccount::Quadratic(u) => Some(u.base_power),
        }
    }
}

// ---------------------------------------------------------------------------
// UserVote
// ---------------------------------------------------------------------------

/// One voter's ballot on one proposal. Never reset once `has_voted` is set.
#[derive(BorshSerialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UserVote {
    pub has_voted: bool,
    pub vote_type: Option<VoteType>,
}

// ---------------------------------------------------------------------------
// Kinds
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccountKind {
    /// `VotingState` or `Governance`, depending on the variant.
    Governance,
    Proposal,
    User,
    UserVote,
}

impl AccountKind {
    /// Discriminator of the kinds whose tag does not depend on the variant.
    pub fn fixed_discriminator(self) -> Option<[u8; 8]> {
        match self {
            AccountKind::Governance => None,
            AccountKind::Proposal => Some(PROPOSAL_DISCRIMINATOR),
            AccountKind::User => Some(USER_DISCRIMINATOR),
            AccountKind::UserVote => Some(USER_VOTE_DISCRIMINATOR),
        }
    }
}

/// Any decoded account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    Governance(GovernanceAccount),
    Proposal(Proposal),
    User(UserAccount),
    UserVote(UserVote),
}

impl Record {
    pub fn kind(&self) -> AccountKind {
        match self {
            Record::Governance(_) => AccountKind::Governance,
            Record::Proposal(_) => AccountKind::Proposal,
            Record::User(_) => AccountKind::User,
            Record::UserVote(_) => AccountKind::UserVote,
        }
    }
}
