//! Error taxonomy shared by the codec, the instruction builders and the session.

use solana_program::pubkey::Pubkey;

use crate::lifecycle::LifecycleError;
use crate::state::AccountKind;
use crate::variant::ProgramVariant;

/// Failure to interpret an account or event buffer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// The buffer belongs to a different account kind. Callers listing program
    /// accounts treat this as "not this record" and skip it.
    #[error("discriminator mismatch: expected {expected:?}, found {found:?}")]
    DiscriminatorMismatch { expected: [u8; 8], found: [u8; 8] },
    /// An event payload whose discriminator names no governance event.
    #[error("unknown event discriminator {found:?}")]
    UnknownEvent { found: [u8; 8] },
    #[error("truncated buffer: need {needed} bytes at offset {offset}, buffer is {len} bytes")]
    TruncatedBuffer {
        offset: usize,
        needed: usize,
        len: usize,
    },
    #[error("invalid {type_name} tag {tag} at offset {offset}")]
    InvalidEnumTag {
        type_name: &'static str,
        tag: u8,
        offset: usize,
    },
    #[error("string at offset {offset} is not valid UTF-8")]
    InvalidUtf8 { offset: usize },
    #[error("{kind:?} accounts do not exist in the {variant} program")]
    UnsupportedKind {
        kind: AccountKind,
        variant: ProgramVariant,
    },
}

impl DecodeError {
    /// Wrong-kind buffers are expected when scanning every account a program owns.
    pub fn is_foreign_account(&self) -> bool {
        matches!(
            self,
            DecodeError::DiscriminatorMismatch { .. } | DecodeError::UnknownEvent { .. }
        )
    }
}

/// Crate-level error returned by every fallible SDK operation.
#[derive(Debug, thiserror::Error)]
pub enum SdkError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
    #[error("no valid program address found for the given seeds")]
    AddressDerivationExhausted,
    #[error("account {address} is not the expected program address {expected}")]
    AddressMismatch { address: Pubkey, expected: Pubkey },
    #[error("{instruction} is not supported by the {variant} program")]
    UnsupportedInstruction {
        instruction: &'static str,
        variant: ProgramVariant,
    },
    #[error("argument mismatch for {variant} program: {detail}")]
    ArgumentMismatch {
        variant: ProgramVariant,
        detail: &'static str,
    },
    #[error("account {0} not found")]
    AccountNotFound(Pubkey),
    #[error("{action} already in flight for {target}")]
    ActionInFlight { action: &'static str, target: Pubkey },
    /// The transaction referenced a blockhash outside the validity window.
    /// Re-fetch a blockhash and rebuild.
    #[error("recent blockhash expired before the transaction landed")]
    ExpiredBlockHash,
    /// Network or program rejection, with the ledger's reason verbatim.
    #[error("transaction submission failed: {reason}")]
    SubmissionFailed {
        reason: String,
        /// Custom program error code, when the program itself refused.
        program_error: Option<u32>,
    },
    #[error("wallet refused to sign: {0}")]
    SignerFailed(String),
    /// A required signer has not signed; nothing was sent.
    #[error("transaction still needs a signature from {0}")]
    MissingSignature(Pubkey),
    #[error("rpc error: {0}")]
    Rpc(String),
    #[error("failed to compile transaction message: {0}")]
    Compile(String),
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<std::io::Error> for SdkError {
    fn from(e: std::io::Error) -> Self {
        SdkError::Serialization(e.to_string())
    }
}

impl From<bincode::Error> for SdkError {
    fn from(e: bincode::Error) -> Self {
        SdkError::Serialization(e.to_string())
    }
}

impl SdkError {
    /// Only an expired blockhash is worth rebuilding and resubmitting.
    pub fn is_retryable(&self) -> bool {
        matches!(self, SdkError::ExpiredBlockHash)
    }

    /// The lifecycle rule a program rejection corresponds to, if any.
    pub fn rejected_rule(&self, variant: ProgramVariant) -> Option<LifecycleError> {
        match self {
            SdkError::Lifecycle(rule) => Some(*rule),
            SdkError::SubmissionFailed {
                program_error: Some(code),
                ..
            } => crate::lifecycle::from_program_error(variant, *code),
            _ => None,
        }
    }
}

pub type SdkResult<T> = Result<T, SdkError>;
