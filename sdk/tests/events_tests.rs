use base64::Engine;
use canvote_sdk::{
    constants::*,
    events::*,
    state::{ProposalStatus, VoteType},
    DecodeError, ProgramVariant,
};
use solana_program::pubkey::Pubkey;

fn log_line(payload: &[u8]) -> String {
    format!(
        "{}{}",
        PROGRAM_DATA_LOG_PREFIX,
        base64::engine::general_purpose::STANDARD.encode(payload)
    )
}

fn vote_payload(voter: &Pubkey, weights: Option<(u64, u64)>) -> Vec<u8> {
    let mut data = VOTE_EVENT_DISCRIMINATOR.to_vec();
    data.extend_from_slice(&8u64.to_le_bytes());
    data.extend_from_slice(voter.as_ref());
    data.push(1);
    if let Some((applied, requested)) = weights {
        data.extend_from_slice(&applied.to_le_bytes());
        data.extend_from_slice(&requested.to_le_bytes());
    }
    data
}

#[test]
fn test_events_are_read_from_program_logs() {
    let voter = Pubkey::new_unique();
    let mut finalized = PROPOSAL_FINALIZED_EVENT_DISCRIMINATOR.to_vec();
    finalized.extend_from_slice(&8u64.to_le_bytes());
    finalized.push(1);
    finalized.extend_from_slice(&30u64.to_le_bytes());
    finalized.extend_from_slice(&12u64.to_le_bytes());

    let logs = vec![
        "Program EAeyPzTziA1QbpobqkzKF3tSmUXT2WRkahgSkAns8mpz invoke [1]".to_string(),
        "Program log: Instruction: Vote".to_string(),
        log_line(&vote_payload(&voter, None)),
        "Program data: not-base64!".to_string(),
        log_line(&[0u8; 16]),
        log_line(&finalized),
    ];

    let events = decode_events(ProgramVariant::VotingWithDelegation, &logs[..]);
    assert_eq!(
        events,
        vec![
            GovernanceEvent::Vote(VoteEvent {
                proposal_id: 8,
                voter,
                vote_type: VoteType::No,
                weight: None,
            }),
            GovernanceEvent::ProposalFinalized(ProposalFinalizedEvent {
                proposal_id: 8,
                status: ProposalStatus::Passed,
                yes_votes: 30,
                no_votes: 12,
            }),
        ]
    );
}

#[test]
fn test_quadratic_vote_event_carries_weights() {
    let voter = Pubkey::new_unique();
    let event = decode_event(
        ProgramVariant::LiquidQuadratic,
        &vote_payload(&voter, Some((3, 9))),
    )
    .unwrap();

    let GovernanceEvent::Vote(vote) = event else {
        panic!("expected a vote event, got {:?}", event);
    };
    assert_eq!(
        vote.weight,
        Some(VoteWeight {
            voting_power: 3,
            original_voting_power: 9,
        })
    );
}

#[test]
fn test_quadratic_vote_event_without_weights_is_truncated() {
    let voter = Pubkey::new_unique();
    assert!(decode_event(ProgramVariant::LiquidQuadratic, &vote_payload(&voter, None)).is_err());
}

#[test]
fn test_unknown_event_is_named_as_such() {
    let mut payload = [0u8; 16];
    payload[..8].copy_from_slice(b"notevent");

    let err = decode_event(ProgramVariant::VotingWithDelegation, &payload).unwrap_err();
    assert_eq!(err, DecodeError::UnknownEvent { found: *b"notevent" });
    assert!(err.is_foreign_account());

    // A known discriminator with a bad body is a different failure.
    let voter = Pubkey::new_unique();
    let truncated = decode_event(ProgramVariant::LiquidQuadratic, &vote_payload(&voter, None));
    assert!(matches!(truncated, Err(DecodeError::TruncatedBuffer { .. })));
}
