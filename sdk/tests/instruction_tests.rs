use borsh::BorshSerialize;
use canvote_sdk::{
    constants::*,
    error::SdkError,
    instruction::*,
    pda::*,
    state::VoteType,
    GovernanceProgram, ProgramVariant,
};
use solana_program::{instruction::AccountMeta, pubkey::Pubkey, system_program};

fn delegation() -> GovernanceProgram {
    GovernanceProgram::new(ProgramVariant::VotingWithDelegation)
}

fn quadratic() -> GovernanceProgram {
    GovernanceProgram::new(ProgramVariant::LiquidQuadratic)
}

fn flags(accounts: &[AccountMeta]) -> Vec<(bool, bool)> {
    accounts.iter().map(|a| (a.is_signer, a.is_writable)).collect()
}

// ── Addresses ───────────────────────────────────────────────────────────────

#[test]
fn test_pdas_are_deterministic_and_variant_scoped() {
    let owner = Pubkey::new_unique();
    assert_eq!(
        find_user(&delegation(), &owner).unwrap(),
        find_user(&delegation(), &owner).unwrap()
    );
    assert_ne!(
        find_singleton(&delegation()).unwrap().0,
        find_singleton(&quadratic()).unwrap().0
    );
    assert_ne!(
        find_proposal(&delegation(), 0).unwrap().0,
        find_proposal(&delegation(), 1).unwrap().0
    );

    let (expected, bump) = Pubkey::find_program_address(
        &[PROPOSAL_SEED, &5u64.to_le_bytes()],
        &VOTING_WITH_DELEGATION_PROGRAM_ID,
    );
    assert_eq!(find_proposal(&delegation(), 5).unwrap(), (expected, bump));
}

#[test]
fn test_user_vote_seeds_use_proposal_address() {
    let voter = Pubkey::new_unique();
    let (proposal, _) = find_proposal(&delegation(), 2).unwrap();
    let (expected, _) = Pubkey::find_program_address(
        &[USER_VOTE_SEED, voter.as_ref(), proposal.as_ref()],
        &VOTING_WITH_DELEGATION_PROGRAM_ID,
    );
    assert_eq!(find_user_vote(&delegation(), &voter, &proposal).unwrap().0, expected);
}

#[test]
fn test_custom_program_id_moves_every_address() {
    let relocated = GovernanceProgram::with_program_id(
        ProgramVariant::VotingWithDelegation,
        Pubkey::new_unique(),
    );
    assert_ne!(
        find_singleton(&relocated).unwrap().0,
        find_singleton(&delegation()).unwrap().0
    );
    let ix = create_initialize_instruction(&relocated, &Pubkey::new_unique()).unwrap();
    assert_eq!(ix.program_id, relocated.program_id);
}

// ── Builders ────────────────────────────────────────────────────────────────

#[test]
fn test_create_proposal_payload_and_accounts() {
    let proposer = Pubkey::new_unique();
    let ix =
        create_create_proposal_instruction(&delegation(), &proposer, 3, "Hi", "", 3_600).unwrap();

    let mut expected = IX_CREATE_PROPOSAL.to_vec();
    expected.extend_from_slice(&2u32.to_le_bytes());
    expected.extend_from_slice(b"Hi");
    expected.extend_from_slice(&0u32.to_le_bytes());
    expected.extend_from_slice(&3_600i64.to_le_bytes());
    assert_eq!(ix.data, expected);

    let keys: Vec<Pubkey> = ix.accounts.iter().map(|a| a.pubkey).collect();
    assert_eq!(
        keys,
        vec![
            find_singleton(&delegation()).unwrap().0,
            find_proposal(&delegation(), 3).unwrap().0,
            proposer,
            system_program::id(),
        ]
    );
    assert_eq!(
        flags(&ix.accounts),
        vec![(false, true), (false, true), (true, true), (false, false)]
    );
}

#[test]
fn test_delegation_vote_layout() {
    let voter = Pubkey::new_unique();
    let ix = create_vote_instruction(&delegation(), &voter, 0, VoteType::No, None).unwrap();
    let (proposal, _) = find_proposal(&delegation(), 0).unwrap();

    assert_eq!(ix.data, [&IX_VOTE[..], &[1]].concat());
    assert_eq!(ix.accounts.len(), 5);
    assert_eq!(ix.accounts[0].pubkey, proposal);
    assert_eq!(ix.accounts[1].pubkey, find_user_vote(&delegation(), &voter, &proposal).unwrap().0);
    assert_eq!(ix.accounts[2].pubkey, find_user(&delegation(), &voter).unwrap().0);
    assert_eq!(ix.accounts[3].pubkey, voter);
    assert_eq!(
        flags(&ix.accounts),
        vec![(false, true), (false, true), (false, true), (true, true), (false, false)]
    );
}

#[test]
fn test_quadratic_vote_layout() {
    let voter = Pubkey::new_unique();
    let ix = create_vote_instruction(&quadratic(), &voter, 1, VoteType::Yes, Some(25)).unwrap();

    let mut expected = IX_VOTE.to_vec();
    expected.push(0);
    expected.extend_from_slice(&25u64.to_le_bytes());
    assert_eq!(ix.data, expected);
    assert_eq!(ix.program_id, LIQUID_QUADRATIC_PROGRAM_ID);
    assert_eq!(flags(&ix.accounts), vec![(false, true), (false, true), (true, false)]);
}

#[test]
fn test_vote_weight_must_match_variant() {
    let voter = Pubkey::new_unique();
    assert!(matches!(
        create_vote_instruction(&delegation(), &voter, 0, VoteType::Yes, Some(1)),
        Err(SdkError::ArgumentMismatch { variant: ProgramVariant::VotingWithDelegation, .. })
    ));
    assert!(matches!(
        create_vote_instruction(&quadratic(), &voter, 0, VoteType::Yes, None),
        Err(SdkError::ArgumentMismatch { variant: ProgramVariant::LiquidQuadratic, .. })
    ));
}

#[test]
fn test_initialize_user_only_on_quadratic() {
    let user = Pubkey::new_unique();
    let admin = Pubkey::new_unique();
    assert!(matches!(
        create_initialize_user_instruction(&delegation(), &user, &admin, 10),
        Err(SdkError::UnsupportedInstruction { instruction: "initializeUser", .. })
    ));

    let ix = create_initialize_user_instruction(&quadratic(), &user, &admin, 10).unwrap();
    assert_eq!(ix.data, [&IX_INITIALIZE_USER[..], &10u64.to_le_bytes()].concat());
    assert_eq!(ix.accounts[1].pubkey, user);
    assert_eq!(ix.accounts[2].pubkey, admin);
    assert!(ix.accounts[1].is_signer && ix.accounts[2].is_signer);
}

#[test]
fn test_delegate_payload_is_target_key() {
    let delegator = Pubkey::new_unique();
    let target = Pubkey::new_unique();

    let ix = create_delegate_instruction(&delegation(), &delegator, &target).unwrap();
    let mut expected = IX_DELEGATE.to_vec();
    target.serialize(&mut expected).unwrap();
    assert_eq!(ix.data, expected);
    assert_eq!(ix.accounts.len(), 3);

    let ix = create_delegate_instruction(&quadratic(), &delegator, &target).unwrap();
    assert_eq!(ix.accounts.len(), 2);
    assert_eq!(flags(&ix.accounts), vec![(false, true), (true, false)]);
}

#[test]
fn test_finalize_accounts_per_variant() {
    let finalizer = Pubkey::new_unique();

    let ix = create_finalize_proposal_instruction(&delegation(), &finalizer, 0).unwrap();
    assert_eq!(ix.data, IX_FINALIZE_PROPOSAL.to_vec());
    assert_eq!(ix.accounts.len(), 2);

    let ix = create_finalize_proposal_instruction(&quadratic(), &finalizer, 0).unwrap();
    assert_eq!(ix.accounts.len(), 3);
    assert_eq!(ix.accounts[1].pubkey, find_singleton(&quadratic()).unwrap().0);
    assert_eq!(ix.accounts[2].pubkey, finalizer);
}

#[test]
fn test_encode_dispatches_intents() {
    let authority = Pubkey::new_unique();
    let intent = Intent::Undelegate { authority };
    assert_eq!(intent.name(), "undelegate");
    assert_eq!(
        encode(&quadratic(), &intent).unwrap(),
        create_undelegate_instruction(&quadratic(), &authority).unwrap()
    );
}
