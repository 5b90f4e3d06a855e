//! Governance instruction builders for singleton setup, user registration,
//! proposals, voting, delegation and finalization.
//!
//! Payload: 8-byte instruction discriminator followed by the borsh-encoded
//! arguments. Account order is part of the program ABI; each builder documents
//! its list per variant. Building an instruction never touches the network.

use borsh::BorshSerialize;
use solana_program::{
    instruction::{AccountMeta, Instruction},
    pubkey::Pubkey,
    system_program,
};

use crate::constants::*;
use crate::error::{SdkError, SdkResult};
use crate::pda::{find_proposal, find_singleton, find_user, find_user_vote};
use crate::state::VoteType;
use crate::variant::{GovernanceProgram, ProgramVariant};

// ── Param Structs (exact Borsh match to program) ────────────────────────────

#[derive(BorshSerialize)]
struct CreateProposalArgs {
    title: String,
    description: String,
    voting_period: i64,
}

#[derive(BorshSerialize)]
struct InitializeUserArgs {
    initial_base_power: u64,
}

#[derive(BorshSerialize)]
struct DelegateArgs {
    delegate_to: Pubkey,
}

#[derive(BorshSerialize)]
struct VoteArgs {
    vote_type: VoteType,
}

#[derive(BorshSerialize)]
struct WeightedVoteArgs {
    vote_type: VoteType,
    voting_power: u64,
}

fn payload(discriminator: [u8; 8], args: &impl BorshSerialize) -> SdkResult<Vec<u8>> {
    let mut data = discriminator.to_vec();
    args.serialize(&mut data)?;
    Ok(data)
}

// ── Intents ─────────────────────────────────────────────────────────────────

/// A client-chosen mutation, before it is turned into bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Initialize {
        authority: Pubkey,
    },
    InitializeUser {
        user_authority: Pubkey,
        admin: Pubkey,
        initial_base_power: u64,
    },
    CreateProposal {
        proposer: Pubkey,
        /// Current `proposal_count` of the singleton; the new proposal's index.
        proposal_index: u64,
        title: String,
        description: String,
        voting_period: i64,
    },
    Vote {
        voter: Pubkey,
        proposal_id: u64,
        vote_type: VoteType,
        /// Required by the quadratic program, rejected by the delegation one.
        voting_power: Option<u64>,
    },
    Delegate {
        delegator: Pubkey,
        delegate_to: Pubkey,
    },
    Undelegate {
        authority: Pubkey,
    },
    FinalizeProposal {
        finalizer: Pubkey,
        proposal_id: u64,
    },
}

impl Intent {
    pub fn name(&self) -> &'static str {
        match self {
            Intent::Initialize { .. } => "initialize",
            Intent::InitializeUser { .. } => "initializeUser",
            Intent::CreateProposal { .. } => "createProposal",
            Intent::Vote { .. } => "vote",
            Intent::Delegate { .. } => "delegate",
            Intent::Undelegate { .. } => "undelegate",
            Intent::FinalizeProposal { .. } => "finalizeProposal",
        }
    }
}

/// Encode `intent` for `program`.
pub fn encode(program: &GovernanceProgram, intent: &Intent) -> SdkResult<Instruction> {
    match intent {
        Intent::Initialize { authority } => create_initialize_instruction(program, authority),
        Intent::InitializeUser {
            user_authority,
            admin,
            initial_base_power,
        } => {
            create_initialize_user_instruction(program, user_authority, admin, *initial_base_power)
        }
        Intent::CreateProposal {
            proposer,
            proposal_index,
            title,
            description,
            voting_period,
        } => create_create_proposal_instruction(
            program,
            proposer,
            *proposal_index,
            title,
            description,
            *voting_period,
        ),
        Intent::Vote {
            voter,
            proposal_id,
            vote_type,
            voting_power,
        } => create_vote_instruction(program, voter, *proposal_id, *vote_type, *voting_power),
        Intent::Delegate {
            delegator,
            delegate_to,
        } => create_delegate_instruction(program, delegator, delegate_to),
        Intent::Undelegate { authority } => create_undelegate_instruction(program, authority),
        Intent::FinalizeProposal {
            finalizer,
            proposal_id,
        } => create_finalize_proposal_instruction(program, finalizer, *proposal_id),
    }
}

// ── Instruction Builders ────────────────────────────────────────────────────

/// Create the singleton.
///
/// Accounts:
///   0. `[writable]` voting_state / governance PDA
///   1. `[signer, writable]` authority (becomes admin on the quadratic program)
///   2. `[]` system_program
pub fn create_initialize_instruction(
    program: &GovernanceProgram,
    authority: &Pubkey,
) -> SdkResult<Instruction> {
    let (singleton_pda, _) = find_singleton(program)?;

    Ok(Instruction {
        program_id: program.program_id,
        accounts: vec![
            AccountMeta::new(singleton_pda, false),
            AccountMeta::new(*authority, true),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
        data: IX_INITIALIZE.to_vec(),
    })
}

/// Register a voter with base power (quadratic program only, admin-signed).
///
/// Accounts:
///   0. `[writable]` user PDA (seeds: ["user", user_authority])
///   1. `[signer, writable]` user_authority
///   2. `[signer, writable]` admin
///   3. `[writable]` governance PDA
///   4. `[]` system_program
pub fn create_initialize_user_instruction(
    program: &GovernanceProgram,
    user_authority: &Pubkey,
    admin: &Pubkey,
    initial_base_power: u64,
) -> SdkResult<Instruction> {
    if program.variant != ProgramVariant::LiquidQuadratic {
        return Err(SdkError::UnsupportedInstruction {
            instruction: "initializeUser",
            variant: program.variant,
        });
    }
    let (user_pda, _) = find_user(program, user_authority)?;
    let (governance_pda, _) = find_singleton(program)?;

    let data = payload(IX_INITIALIZE_USER, &InitializeUserArgs { initial_base_power })?;

    Ok(Instruction {
        program_id: program.program_id,
        accounts: vec![
            AccountMeta::new(user_pda, false),
            AccountMeta::new(*user_authority, true),
            AccountMeta::new(*admin, true),
            AccountMeta::new(governance_pda, false),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
        data,
    })
}

/// Create a proposal at index `proposal_index`.
///
/// The index must be the singleton's current `proposal_count`; the program
/// rejects any other proposal address.
///
/// Accounts:
///   0. `[writable]` voting_state / governance PDA
///   1. `[writable]` proposal PDA (seeds: ["proposal", proposal_index_le])
///   2. `[signer, writable]` proposer (payer)
///   3. `[]` system_program
pub fn create_create_proposal_instruction(
    program: &GovernanceProgram,
    proposer: &Pubkey,
    proposal_index: u64,
    title: &str,
    description: &str,
    voting_period: i64,
) -> SdkResult<Instruction> {
    let (singleton_pda, _) = find_singleton(program)?;
    let (proposal_pda, _) = find_proposal(program, proposal_index)?;

    let args = CreateProposalArgs {
        title: title.to_string(),
        description: description.to_string(),
        voting_period,
    };
    let data = payload(IX_CREATE_PROPOSAL, &args)?;

    Ok(Instruction {
        program_id: program.program_id,
        accounts: vec![
            AccountMeta::new(singleton_pda, false),
            AccountMeta::new(proposal_pda, false),
            AccountMeta::new(*proposer, true),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
        data,
    })
}

/// Cast a vote.
///
/// Accounts (voting-with-delegation):
///   0. `[writable]` proposal PDA
///   1. `[writable]` user_vote PDA (seeds: ["user_vote", voter, proposal])
///   2. `[writable]` user PDA (seeds: ["user", voter])
///   3. `[signer, writable]` voter
///   4. `[]` system_program
///
/// Accounts (liquid-quadratic):
///   0. `[writable]` proposal PDA
///   1. `[writable]` user PDA (seeds: ["user", voter])
///   2. `[signer]` voter
pub fn create_vote_instruction(
    program: &GovernanceProgram,
    voter: &Pubkey,
    proposal_id: u64,
    vote_type: VoteType,
    voting_power: Option<u64>,
) -> SdkResult<Instruction> {
    let (proposal_pda, _) = find_proposal(program, proposal_id)?;
    let (user_pda, _) = find_user(program, voter)?;

    let (accounts, data) = match (program.variant, voting_power) {
        (ProgramVariant::VotingWithDelegation, None) => {
            let (user_vote_pda, _) = find_user_vote(program, voter, &proposal_pda)?;
            (
                vec![
                    AccountMeta::new(proposal_pda, false),
                    AccountMeta::new(user_vote_pda, false),
                    AccountMeta::new(user_pda, false),
                    AccountMeta::new(*voter, true),
                    AccountMeta::new_readonly(system_program::id(), false),
                ],
                payload(IX_VOTE, &VoteArgs { vote_type })?,
            )
        }
        (ProgramVariant::LiquidQuadratic, Some(voting_power)) => (
            vec![
                AccountMeta::new(proposal_pda, false),
                AccountMeta::new(user_pda, false),
                AccountMeta::new_readonly(*voter, true),
            ],
            payload(
                IX_VOTE,
                &WeightedVoteArgs {
                    vote_type,
                    voting_power,
                },
            )?,
        ),
        (variant @ ProgramVariant::VotingWithDelegation, Some(_)) => {
            return Err(SdkError::ArgumentMismatch {
                variant,
                detail: "votes are unweighted; voting_power must be omitted",
            })
        }
        (variant @ ProgramVariant::LiquidQuadratic, None) => {
            return Err(SdkError::ArgumentMismatch {
                variant,
                detail: "votes are weighted; voting_power is required",
            })
        }
    };

    Ok(Instruction {
        program_id: program.program_id,
        accounts,
        data,
    })
}

/// Delegate voting power to another address.
///
/// Accounts:
///   0. `[writable]` user PDA (seeds: ["user", delegator])
///   1. `[signer, writable]` delegator on voting-with-delegation (pays for the
///      user record), `[signer]` on liquid-quadratic
///   2. `[]` system_program (voting-with-delegation only)
pub fn create_delegate_instruction(
    program: &GovernanceProgram,
    delegator: &Pubkey,
    delegate_to: &Pubkey,
) -> SdkResult<Instruction> {
    let (user_pda, _) = find_user(program, delegator)?;
    let data = payload(
        IX_DELEGATE,
        &DelegateArgs {
            delegate_to: *delegate_to,
        },
    )?;

    let accounts = match program.variant {
        ProgramVariant::VotingWithDelegation => vec![
            AccountMeta::new(user_pda, false),
            AccountMeta::new(*delegator, true),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
        ProgramVariant::LiquidQuadratic => vec![
            AccountMeta::new(user_pda, false),
            AccountMeta::new_readonly(*delegator, true),
        ],
    };

    Ok(Instruction {
        program_id: program.program_id,
        accounts,
        data,
    })
}

/// Clear an existing delegation.
///
/// Accounts:
///   0. `[writable]` user PDA (seeds: ["user", authority])
///   1. `[signer]` authority
pub fn create_undelegate_instruction(
    program: &GovernanceProgram,
    authority: &Pubkey,
) -> SdkResult<Instruction> {
    let (user_pda, _) = find_user(program, authority)?;

    Ok(Instruction {
        program_id: program.program_id,
        accounts: vec![
            AccountMeta::new(user_pda, false),
            AccountMeta::new_readonly(*authority, true),
        ],
        data: IX_UNDELEGATE.to_vec(),
    })
}

/// Settle a proposal after its voting window closes.
///
/// Accounts:
///   0. `[writable]` proposal PDA
///   1. `[]` governance PDA (liquid-quadratic only)
///   1/2. `[signer]` finalizer
pub fn create_finalize_proposal_instruction(
    program: &GovernanceProgram,
    finalizer: &Pubkey,
    proposal_id: u64,
) -> SdkResult<Instruction> {
    let (proposal_pda, _) = find_proposal(program, proposal_id)?;

    let mut accounts = vec![AccountMeta::new(proposal_pda, false)];
    if program.variant == ProgramVariant::LiquidQuadratic {
        let (governance_pda, _) = find_singleton(program)?;
        accounts.push(AccountMeta::new_readonly(governance_pda, false));
    }
    accounts.push(AccountMeta::new_readonly(*finalizer, true));

    Ok(Instruction {
        program_id: program.program_id,
        accounts,
        data: IX_FINALIZE_PROPOSAL.to_vec(),
    })
}
