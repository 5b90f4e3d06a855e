//! Program events, emitted as `Program data: <base64>` transaction log lines.

use base64::Engine;
use log::debug;
use solana_program::pubkey::Pubkey;

use crate::codec::Reader;
use crate::constants::*;
use crate::error::DecodeError;
use crate::state::{ProposalStatus, VoteType};
use crate::variant::ProgramVariant;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteEvent {
    pub proposal_id: u64,
    pub voter: Pubkey,
    pub vote_type: VoteType,
    /// Quadratic program only: the weight applied and the weight requested.
    pub weight: Option<VoteWeight>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VoteWeight {
    pub voting_power: u64,
    pub original_voting_power: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProposalFinalizedEvent {
    pub proposal_id: u64,
    pub status: ProposalStatus,
    pub yes_votes: u64,
    pub no_votes: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GovernanceEvent {
    Vote(VoteEvent),
    ProposalFinalized(ProposalFinalizedEvent),
}

/// Decode one raw event payload (discriminator included).
pub fn decode_event(
    variant: ProgramVariant,
    bytes: &[u8],
) -> Result<GovernanceEvent, DecodeError> {
    let mut r = Reader::new(bytes);
    let head = r.take(8)?;
    let mut discriminator = [0u8; 8];
    discriminator.copy_from_slice(head);

    match discriminator {
        VOTE_EVENT_DISCRIMINATOR => {
            let proposal_id = r.read_u64()?;
            let voter = r.read_pubkey()?;
            let vote_type = r.read_vote_type()?;
            let weight = match variant {
                ProgramVariant::VotingWithDelegation => None,
                ProgramVariant::LiquidQuadratic => Some(VoteWeight {
                    voting_power: r.read_u64()?,
                    original_voting_power: r.read_u64()?,
                }),
            };
            Ok(GovernanceEvent::Vote(VoteEvent {
                proposal_id,
                voter,
                vote_type,
                weight,
            }))
        }
        PROPOSAL_FINALIZED_EVENT_DISCRIMINATOR => {
            Ok(GovernanceEvent::ProposalFinalized(ProposalFinalizedEvent {
                proposal_id: r.read_u64()?,
                status: r.read_proposal_status()?,
                yes_votes: r.read_u64()?,
                no_votes: r.read_u64()?,
            }))
        }
        found => Err(DecodeError::UnknownEvent { found }),
    }
}

/// Collect every governance event in a transaction's log lines, in order.
pub fn decode_events<S: AsRef<str>>(
    variant: ProgramVariant,
    logs: &[S],
) -> Vec<GovernanceEvent> {
    let engine = base64::engine::general_purpose::STANDARD;
    logs.iter()
        .filter_map(|line| line.as_ref().strip_prefix(PROGRAM_DATA_LOG_PREFIX))
        .filter_map(|encoded| match engine.decode(encoded.trim()) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                debug!("ignoring undecodable program data: {}", e);
                None
            }
        })
        .filter_map(|bytes| match decode_event(variant, &bytes) {
            Ok(event) => Some(event),
            Err(e) => {
                debug!("ignoring foreign program data: {}", e);
                None
            }
        })
        .collect()
}
