//! Unsigned transaction assembly and wire encoding.
//!
//! Instructions are compiled into a v0 message in exactly the order given.
//! Later instructions may depend on state written by earlier ones, so nothing
//! is reordered or deduplicated. Signature slots are left zeroed for the
//! wallet to fill in.

use solana_sdk::{
    hash::Hash,
    instruction::Instruction,
    message::{v0, VersionedMessage},
    pubkey::Pubkey,
    signature::Signature,
    signer::Signer,
    transaction::VersionedTransaction,
};

use crate::error::{SdkError, SdkResult};

/// Build an unsigned transaction paid for by `fee_payer`.
///
/// `recent_blockhash` should be fetched immediately before calling; a stale
/// hash surfaces later as [`SdkError::ExpiredBlockHash`] and the caller must
/// rebuild with a fresh one.
pub fn assemble(
    instructions: &[Instruction],
    fee_payer: &Pubkey,
    recent_blockhash: Hash,
) -> SdkResult<VersionedTransaction> {
    let message = v0::Message::try_compile(fee_payer, instructions, &[], recent_blockhash)
        .map_err(|e| SdkError::Compile(e.to_string()))?;
    let signatures = vec![Signature::default(); message.header.num_required_signatures as usize];

    Ok(VersionedTransaction {
        signatures,
        message: VersionedMessage::V0(message),
    })
}

/// Fill `signer`'s slot, keeping every signature already present. Used when a
/// message needs more than one party, such as an admin registering a voter.
pub fn partial_sign(tx: &mut VersionedTransaction, signer: &dyn Signer) -> SdkResult<()> {
    let key = signer.pubkey();
    let required = tx.message.header().num_required_signatures as usize;
    let position = tx
        .message
        .static_account_keys()
        .iter()
        .take(required)
        .position(|k| *k == key)
        .ok_or_else(|| SdkError::SignerFailed(format!("{} is not a signer of this message", key)))?;

    let signature = signer
        .try_sign_message(&tx.message.serialize())
        .map_err(|e| SdkError::SignerFailed(e.to_string()))?;
    if tx.signatures.len() < required {
        tx.signatures.resize(required, Signature::default());
    }
    tx.signatures[position] = signature;
    Ok(())
}

/// Required signers whose slot is still empty.
pub fn missing_signers(tx: &VersionedTransaction) -> Vec<Pubkey> {
    let required = tx.message.header().num_required_signatures as usize;
    tx.message
        .static_account_keys()
        .iter()
        .take(required)
        .enumerate()
        .filter(|(i, _)| {
            tx.signatures
                .get(*i)
                .map_or(true, |sig| *sig == Signature::default())
        })
        .map(|(_, key)| *key)
        .collect()
}

pub fn serialize(tx: &VersionedTransaction) -> SdkResult<Vec<u8>> {
    Ok(bincode::serialize(tx)?)
}

pub fn deserialize(bytes: &[u8]) -> SdkResult<VersionedTransaction> {
    Ok(bincode::deserialize(bytes)?)
}

/// Base58 text form handed to the wallet.
pub fn to_base58(tx: &VersionedTransaction) -> SdkResult<String> {
    Ok(bs58::encode(serialize(tx)?).into_string())
}

pub fn from_base58(text: &str) -> SdkResult<VersionedTransaction> {
    let bytes = bs58::decode(text.trim())
        .into_vec()
        .map_err(|e| SdkError::Serialization(format!("invalid base58 transaction: {}", e)))?;
    deserialize(&bytes)
}

/// Assemble and return the unsigned base58 wire form in one step.
pub fn assemble_base58(
    instructions: &[Instruction],
    fee_payer: &Pubkey,
    recent_blockhash: Hash,
) -> SdkResult<String> {
    to_base58(&assemble(instructions, fee_payer, recent_blockhash)?)
}
