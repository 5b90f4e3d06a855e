//! CanVote SDK: client core for the on-chain governance programs.
//!
//! Covers both program variants (voting-with-delegation and
//! liquid-quadratic): PDA derivation, account decoding, instruction
//! building, proposal lifecycle rules, transaction assembly, and a session
//! that signs through an external wallet and submits over RPC.

pub mod constants;
pub mod error;
pub mod variant;

pub mod codec;
pub mod events;
pub mod instruction;
pub mod lifecycle;
pub mod pda;
pub mod state;
pub mod transaction;

pub mod config;
pub mod poller;
pub mod rpc;
pub mod session;
pub mod signer;

pub use error::{DecodeError, SdkError, SdkResult};
pub use session::{ActionOutcome, GovernanceSession, ProposalEntry};
pub use variant::{GovernanceProgram, ProgramVariant};
