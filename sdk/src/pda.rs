//! Program-derived addresses.
//!
//! Derivation delegates to the runtime's own bump search
//! (`Pubkey::try_find_program_address`): seeds are hashed in order with a
//! trailing bump byte counting down from 255 and the first off-curve result is
//! taken, which is exactly what the programs check on-chain.

use solana_program::pubkey::Pubkey;

use crate::constants::*;
use crate::error::{SdkError, SdkResult};
use crate::variant::GovernanceProgram;

/// Derive `(address, bump)` for an ordered seed list under `program_id`.
pub fn derive(seeds: &[&[u8]], program_id: &Pubkey) -> SdkResult<(Pubkey, u8)> {
    Pubkey::try_find_program_address(seeds, program_id)
        .ok_or(SdkError::AddressDerivationExhausted)
}

// ── PDA Helpers ─────────────────────────────────────────────────────────────

/// `["voting_state"]` or `["governance"]`, depending on the variant.
pub fn find_singleton(program: &GovernanceProgram) -> SdkResult<(Pubkey, u8)> {
    derive(&[program.variant.singleton_seed()], &program.program_id)
}

/// `["proposal", index.to_le_bytes()]`
pub fn find_proposal(program: &GovernanceProgram, index: u64) -> SdkResult<(Pubkey, u8)> {
    derive(&[PROPOSAL_SEED, &index.to_le_bytes()], &program.program_id)
}

/// `["user", owner]`
pub fn find_user(program: &GovernanceProgram, owner: &Pubkey) -> SdkResult<(Pubkey, u8)> {
    derive(&[USER_SEED, owner.as_ref()], &program.program_id)
}

/// `["user_vote", voter, proposal]`
pub fn find_user_vote(
    program: &GovernanceProgram,
    voter: &Pubkey,
    proposal: &Pubkey,
) -> SdkResult<(Pubkey, u8)> {
    derive(
        &[USER_VOTE_SEED, voter.as_ref(), proposal.as_ref()],
        &program.program_id,
    )
}
