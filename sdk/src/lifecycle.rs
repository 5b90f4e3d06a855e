//! Proposal lifecycle.
//!
//! Stored status moves Active -> Passed or Active -> Rejected exactly once.
//! `Upcoming` and `Ended` exist only for display: they are derived from the
//! wall clock and never written on-chain.

use crate::constants::CUSTOM_ERROR_BASE;
use crate::state::{Proposal, ProposalStatus, UserAccount, UserVote, VoteType};
use crate::variant::ProgramVariant;

/// Rule violations, checked locally before a transaction is built and mapped
/// back from the programs' custom error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LifecycleError {
    #[error("Proposal is not active")]
    ProposalNotActive,
    #[error("Voting period has not started yet")]
    VotingNotStarted,
    #[error("Voting period has ended")]
    VotingEnded,
    #[error("Voting period has not ended yet")]
    VotingNotEnded,
    #[error("Proposal has already been finalized")]
    AlreadyFinalized,
    #[error("User has already voted on this proposal")]
    AlreadyVoted,
    #[error("User has already delegated their voting power")]
    AlreadyDelegated,
    #[error("User has not delegated their voting power")]
    NotDelegated,
    #[error("Voting period must be positive")]
    InvalidVotingPeriod,
    #[error("Numerical overflow occurred")]
    Overflow,
}

/// What a client shows for a proposal at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DisplayStatus {
    Upcoming,
    Active,
    /// Window closed, stored status still Active: awaiting finalization.
    Ended,
    Passed,
    Rejected,
}

pub fn display_status(proposal: &Proposal, now: i64) -> DisplayStatus {
    match proposal.status {
        ProposalStatus::Passed => DisplayStatus::Passed,
        ProposalStatus::Rejected => DisplayStatus::Rejected,
        ProposalStatus::Active if now < proposal.start_time => DisplayStatus::Upcoming,
        ProposalStatus::Active if now >= proposal.end_time => DisplayStatus::Ended,
        ProposalStatus::Active => DisplayStatus::Active,
    }
}

/// Share of yes votes, 0.0 when nobody voted.
pub fn progress(yes_votes: u64, no_votes: u64) -> f64 {
    let total = yes_votes as f64 + no_votes as f64;
    if total == 0.0 {
        return 0.0;
    }
    yes_votes as f64 / total
}

/// Strict majority passes; a tie is rejected.
pub fn tally_outcome(yes_votes: u64, no_votes: u64) -> ProposalStatus {
    if yes_votes > no_votes {
        ProposalStatus::Passed
    } else {
        ProposalStatus::Rejected
    }
}

// ── Guards ──────────────────────────────────────────────────────────────────

/// A vote is accepted only on an Active proposal inside `[start, end)` from a
/// voter without a recorded ballot.
pub fn check_vote(
    proposal: &Proposal,
    ballot: Option<&UserVote>,
    now: i64,
) -> Result<(), LifecycleError> {
    if proposal.status != ProposalStatus::Active {
        return Err(LifecycleError::ProposalNotActive);
    }
    if now < proposal.start_time {
        return Err(LifecycleError::VotingNotStarted);
    }
    if now >= proposal.end_time {
        return Err(LifecycleError::VotingEnded);
    }
    if ballot.is_some_and(|b| b.has_voted) {
        return Err(LifecycleError::AlreadyVoted);
    }
    Ok(())
}

/// Returns the status finalization would store.
pub fn check_finalize(proposal: &Proposal, now: i64) -> Result<ProposalStatus, LifecycleError> {
    if proposal.status != ProposalStatus::Active {
        return Err(LifecycleError::AlreadyFinalized);
    }
    if now < proposal.end_time {
        return Err(LifecycleError::VotingNotEnded);
    }
    Ok(tally_outcome(proposal.yes_votes, proposal.no_votes))
}

pub fn check_voting_period(voting_period: i64) -> Result<(), LifecycleError> {
    if voting_period <= 0 {
        return Err(LifecycleError::InvalidVotingPeriod);
    }
    Ok(())
}

/// The quadratic program refuses to overwrite an existing delegation; the
/// delegation program re-points it.
pub fn check_delegate(
    variant: ProgramVariant,
    user: Option<&UserAccount>,
) -> Result<(), LifecycleError> {
    let delegated = user.and_then(UserAccount::delegated_to).is_some();
    if variant == ProgramVariant::LiquidQuadratic && delegated {
        return Err(LifecycleError::AlreadyDelegated);
    }
    Ok(())
}

pub fn check_undelegate(user: Option<&UserAccount>) -> Result<(), LifecycleError> {
    match user.and_then(UserAccount::delegated_to) {
        Some(_) => Ok(()),
        None => Err(LifecycleError::NotDelegated),
    }
}

// ── Local transitions ───────────────────────────────────────────────────────
// Mirror what the program does so a client can reason about pending state.

/// Record `vote_type` with `weight` on `proposal` and mark `ballot` used.
/// Nothing changes when the vote is rejected.
pub fn apply_vote(
    proposal: &mut Proposal,
    ballot: &mut UserVote,
    vote_type: VoteType,
    weight: u64,
    now: i64,
) -> Result<(), LifecycleError> {
    check_vote(proposal, Some(&*ballot), now)?;
    let tally = match vote_type {
        VoteType::Yes => &mut proposal.yes_votes,
        VoteType::No => &mut proposal.no_votes,
    };
    *tally = tally.checked_add(weight).ok_or(LifecycleError::Overflow)?;
    ballot.has_voted = true;
    ballot.vote_type = Some(vote_type);
    Ok(())
}

pub fn apply_finalize(proposal: &mut Proposal, now: i64) -> Result<ProposalStatus, LifecycleError> {
    let outcome = check_finalize(proposal, now)?;
    proposal.status = outcome;
    Ok(outcome)
}

// ── Program errors ──────────────────────────────────────────────────────────

/// Map a program's custom error code back to the rule it enforces.
pub fn from_program_error(variant: ProgramVariant, code: u32) -> Option<LifecycleError> {
    use LifecycleError::*;
    let table: [LifecycleError; 7] = match variant {
        ProgramVariant::VotingWithDelegation => [
            ProposalNotActive,
            VotingNotStarted,
            VotingEnded,
            VotingNotEnded,
            AlreadyFinalized,
            AlreadyVoted,
            NotDelegated,
        ],
        ProgramVariant::LiquidQuadratic => [
            Overflow,
            ProposalNotActive,
            VotingEnded,
            VotingNotEnded,
            AlreadyFinalized,
            AlreadyDelegated,
            NotDelegated,
        ],
    };
    let index = code.checked_sub(CUSTOM_ERROR_BASE)? as usize;
    table.get(index).copied()
}
