//! Governance program IDs, PDA seeds, discriminators, and cluster defaults.

use solana_program::pubkey::Pubkey;

// ── Program IDs ─────────────────────────────────────────────────────────────

/// Voting-with-delegation program: one-person-one-vote with delegation records.
pub const VOTING_WITH_DELEGATION_PROGRAM_ID: Pubkey =
    solana_program::pubkey!("EAeyPzTziA1QbpobqkzKF3tSmUXT2WRkahgSkAns8mpz");

/// Liquid quadratic governance program: admin-registered base power, weighted votes.
pub const LIQUID_QUADRATIC_PROGRAM_ID: Pubkey =
    solana_program::pubkey!("AEpEkRkBqLz8BwqENLG1eYU82JPqUWrRGNqRmQmpiMao");

// ── PDA Seeds ───────────────────────────────────────────────────────────────

/// Singleton state of the delegation program.
pub const VOTING_STATE_SEED: &[u8] = b"voting_state";
/// Singleton state of the quadratic program.
pub const GOVERNANCE_SEED: &[u8] = b"governance";
pub const PROPOSAL_SEED: &[u8] = b"proposal";
pub const USER_SEED: &[u8] = b"user";
pub const USER_VOTE_SEED: &[u8] = b"user_vote";

// ── Account Discriminators ──────────────────────────────────────────────────
// Assigned by the deployed programs. Never recompute these at runtime.

pub const PROPOSAL_DISCRIMINATOR: [u8; 8] = [26, 94, 189, 187, 116, 136, 53, 33];
pub const USER_DISCRIMINATOR: [u8; 8] = [159, 117, 95, 227, 239, 151, 58, 236];
pub const USER_VOTE_DISCRIMINATOR: [u8; 8] = [136, 163, 243, 202, 202, 124, 112, 53];
pub const VOTING_STATE_DISCRIMINATOR: [u8; 8] = [96, 6, 102, 202, 44, 29, 199, 133];
pub const GOVERNANCE_DISCRIMINATOR: [u8; 8] = [18, 143, 88, 13, 73, 217, 47, 49];

// ── Instruction Discriminators ──────────────────────────────────────────────

pub const IX_INITIALIZE: [u8; 8] = [175, 175, 109, 31, 13, 152, 155, 237];
pub const IX_INITIALIZE_USER: [u8; 8] = [111, 17, 185, 250, 60, 122, 38, 254];
pub const IX_CREATE_PROPOSAL: [u8; 8] = [132, 116, 68, 174, 216, 160, 198, 22];
pub const IX_VOTE: [u8; 8] = [227, 110, 155, 23, 136, 126, 172, 25];
pub const IX_DELEGATE: [u8; 8] = [90, 147, 75, 178, 85, 88, 4, 137];
pub const IX_UNDELEGATE: [u8; 8] = [131, 148, 180, 198, 91, 104, 42, 238];
pub const IX_FINALIZE_PROPOSAL: [u8; 8] = [23, 68, 51, 167, 109, 173, 187, 164];

// ── Event Discriminators ────────────────────────────────────────────────────

pub const VOTE_EVENT_DISCRIMINATOR: [u8; 8] = [195, 71, 250, 105, 120, 119, 234, 134];
pub const PROPOSAL_FINALIZED_EVENT_DISCRIMINATOR: [u8; 8] =
    [228, 151, 231, 28, 58, 215, 17, 130];

/// Prefix the runtime puts in front of base64 event payloads in transaction logs.
pub const PROGRAM_DATA_LOG_PREFIX: &str = "Program data: ";

// ── Program Error Codes ─────────────────────────────────────────────────────

/// First custom error code emitted by both programs.
pub const CUSTOM_ERROR_BASE: u32 = 6000;

// ── Cluster Defaults ────────────────────────────────────────────────────────

pub const DEVNET_RPC_URL: &str = "https://api.devnet.solana.com";
pub const MAINNET_RPC_URL: &str = "https://api.mainnet-beta.solana.com";

/// Wallet chain identifiers, as the canvas wallet expects them.
pub const DEVNET_CHAIN_ID: &str = "solana:103";
pub const MAINNET_CHAIN_ID: &str = "solana:101";

/// Default proposal-list refresh interval: 30 seconds.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 30_000;

/// How often a submitted signature is re-checked while waiting for commitment.
pub const CONFIRMATION_POLL_MS: u64 = 500;
