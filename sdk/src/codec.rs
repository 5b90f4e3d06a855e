//! Account codec.
//!
//! Layout of every account: 8-byte discriminator, then fields in declaration
//! order with no padding. Integers are little-endian, strings are a u32 length
//! followed by UTF-8 bytes, options are a 0/1 flag followed by the payload when
//! present, and enums are one tag byte. Decoding walks the buffer with an
//! explicit offset so every failure reports where it happened. Encoding goes
//! through borsh, which produces the same layout.

use borsh::BorshSerialize;
use log::{debug, warn};
use solana_program::pubkey::Pubkey;

use crate::constants::*;
use crate::error::{DecodeError, SdkError, SdkResult};
use crate::state::*;
use crate::variant::ProgramVariant;

// ── Reader ──────────────────────────────────────────────────────────────────

/// Left-to-right cursor over an account buffer.
pub struct Reader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn take(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        let end = self
            .offset
            .checked_add(n)
            .filter(|end| *end <= self.data.len())
            .ok_or(DecodeError::TruncatedBuffer {
                offset: self.offset,
                needed: n,
                len: self.data.len(),
            })?;
        let slice = &self.data[self.offset..end];
        self.offset = end;
        Ok(slice)
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    /// Consume the leading discriminator and check it against `expected`.
    pub fn expect_discriminator(&mut self, expected: [u8; 8]) -> Result<(), DecodeError> {
        let found = self.take_array::<8>()?;
        if found != expected {
            return Err(DecodeError::DiscriminatorMismatch { expected, found });
        }
        Ok(())
    }

    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.take_array::<1>()?[0])
    }

    pub fn read_u32(&mut self) -> Result<u32, DecodeError> {
        Ok(u32::from_le_bytes(self.take_array()?))
    }

    pub fn read_u64(&mut self) -> Result<u64, DecodeError> {
        Ok(u64::from_le_bytes(self.take_array()?))
    }

    pub fn read_i64(&mut self) -> Result<i64, DecodeError> {
        Ok(i64::from_le_bytes(self.take_array()?))
    }

    pub fn read_bool(&mut self) -> Result<bool, DecodeError> {
        let offset = self.offset;
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            tag => Err(DecodeError::InvalidEnumTag {
                type_name: "bool",
                tag,
                offset,
            }),
        }
    }

    pub fn read_pubkey(&mut self) -> Result<Pubkey, DecodeError> {
        Ok(Pubkey::new_from_array(self.take_array()?))
    }

    pub fn read_string(&mut self) -> Result<String, DecodeError> {
        let len = self.read_u32()? as usize;
        let offset = self.offset;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| DecodeError::InvalidUtf8 { offset })
    }

    pub fn read_option<T>(
        &mut self,
        read: impl FnOnce(&mut Self) -> Result<T, DecodeError>,
    ) -> Result<Option<T>, DecodeError> {
        let offset = self.offset;
        match self.read_u8()? {
            0 => Ok(None),
            1 => read(self).map(Some),
            tag => Err(DecodeError::InvalidEnumTag {
                type_name: "option",
                tag,
                offset,
            }),
        }
    }

    pub fn read_proposal_status(&mut self) -> Result<ProposalStatus, DecodeError> {
        let offset = self.offset;
        let tag = self.read_u8()?;
        ProposalStatus::from_tag(tag).ok_or(DecodeError::InvalidEnumTag {
            type_name: "ProposalStatus",
            tag,
            offset,
        })
    }

    pub fn read_vote_type(&mut self) -> Result<VoteType, DecodeError> {
        let offset = self.offset;
        let tag = self.read_u8()?;
        VoteType::from_tag(tag).ok_or(DecodeError::InvalidEnumTag {
            type_name: "VoteType",
            tag,
            offset,
        })
    }
}

// ── Decoders ────────────────────────────────────────────────────────────────

/// Decode `bytes` as an account of `kind` laid out for `variant`.
///
/// Bytes after the last field are ignored; accounts are allocated with room
/// for their longest strings.
pub fn decode(
    variant: ProgramVariant,
    kind: AccountKind,
    bytes: &[u8],
) -> Result<Record, DecodeError> {
    match kind {
        AccountKind::Governance => decode_governance(variant, bytes).map(Record::Governance),
        AccountKind::Proposal => decode_proposal(bytes).map(Record::Proposal),
        AccountKind::User => decode_user(variant, bytes).map(Record::User),
        AccountKind::UserVote => decode_user_vote(variant, bytes).map(Record::UserVote),
    }
}

pub fn decode_governance(
    variant: ProgramVariant,
    bytes: &[u8],
) -> Result<GovernanceAccount, DecodeError> {
    let mut r = Reader::new(bytes);
    r.expect_discriminator(variant.singleton_discriminator())?;
    match variant {
        ProgramVariant::VotingWithDelegation => Ok(GovernanceAccount::VotingState(VotingState {
            proposal_count: r.read_u64()?,
        })),
        ProgramVariant::LiquidQuadratic => Ok(GovernanceAccount::Governance(Governance {
            admin: r.read_pubkey()?,
            proposal_count: r.read_u64()?,
            total_base_power: r.read_u64()?,
        })),
    }
}

/// Proposals share one layout across both programs.
pub fn decode_proposal(bytes: &[u8]) -> Result<Proposal, DecodeError> {
    let mut r = Reader::new(bytes);
    r.expect_discriminator(PROPOSAL_DISCRIMINATOR)?;
    Ok(Proposal {
        id: r.read_u64()?,
        title: r.read_string()?,
        description: r.read_string()?,
        creator: r.read_pubkey()?,
        yes_votes: r.read_u64()?,
        no_votes: r.read_u64()?,
        status: r.read_proposal_status()?,
        start_time: r.read_i64()?,
        end_time: r.read_i64()?,
    })
}

pub fn decode_user(variant: ProgramVariant, bytes: &[u8]) -> Result<UserAccount, DecodeError> {
    let mut r = Reader::new(bytes);
    r.expect_discriminator(USER_DISCRIMINATOR)?;
    match variant {
        ProgramVariant::VotingWithDelegation => Ok(UserAccount::Delegation(DelegationUser {
            delegated_to: r.read_option(Reader::read_pubkey)?,
        })),
        ProgramVariant::LiquidQuadratic => Ok(UserAccount::Quadratic(QuadraticUser {
            base_power: r.read_u64()?,
            reputation: r.read_u8()?,
            last_vote_time: r.read_i64()?,
            delegated_to: r.read_option(Reader::read_pubkey)?,
        })),
    }
}

pub fn decode_user_vote(variant: ProgramVariant, bytes: &[u8]) -> Result<UserVote, DecodeError> {
    if !variant.has_user_votes() {
        return Err(DecodeError::UnsupportedKind {
            kind: AccountKind::UserVote,
            variant,
        });
    }
    let mut r = Reader::new(bytes);
    r.expect_discriminator(USER_VOTE_DISCRIMINATOR)?;
    Ok(UserVote {
        has_voted: r.read_bool()?,
        vote_type: r.read_option(Reader::read_vote_type)?,
    })
}

/// Decode every buffer that is an account of `kind`.
///
/// Accounts of other kinds are skipped quietly. Corrupt accounts are logged and
/// skipped. Neither aborts the rest of the batch.
pub fn decode_all<I>(
    variant: ProgramVariant,
    kind: AccountKind,
    accounts: I,
) -> Vec<(Pubkey, Record)>
where
    I: IntoIterator<Item = (Pubkey, Vec<u8>)>,
{
    accounts
        .into_iter()
        .filter_map(|(address, data)| match decode(variant, kind, &data) {
            Ok(record) => Some((address, record)),
            Err(e) if e.is_foreign_account() => {
                debug!("skipping {}: not a {:?} account", address, kind);
                None
            }
            Err(e) => {
                warn!("skipping corrupt {:?} account {}: {}", kind, address, e);
                None
            }
        })
        .collect()
}

// ── Encoders ────────────────────────────────────────────────────────────────

/// Serialize `record` with its discriminator, as the program would store it.
pub fn encode(variant: ProgramVariant, record: &Record) -> SdkResult<Vec<u8>> {
    let mut data = Vec::new();
    match (variant, record) {
        (
            ProgramVariant::VotingWithDelegation,
            Record::Governance(GovernanceAccount::VotingState(s)),
        ) => {
            data.extend_from_slice(&VOTING_STATE_DISCRIMINATOR);
            s.serialize(&mut data)?;
        }
        (ProgramVariant::LiquidQuadratic, Record::Governance(GovernanceAccount::Governance(g))) => {
            data.extend_from_slice(&GOVERNANCE_DISCRIMINATOR);
            g.serialize(&mut data)?;
        }
        (_, Record::Proposal(p)) => {
            data.extend_from_slice(&PROPOSAL_DISCRIMINATOR);
            p.serialize(&mut data)?;
        }
        (ProgramVariant::VotingWithDelegation, Record::User(UserAccount::Delegation(u))) => {
            data.extend_from_slice(&USER_DISCRIMINATOR);
            u.serialize(&mut data)?;
        }
        (ProgramVariant::LiquidQuadratic, Record::User(UserAccount::Quadratic(u))) => {
            data.extend_from_slice(&USER_DISCRIMINATOR);
            u.serialize(&mut data)?;
        }
        (ProgramVariant::VotingWithDelegation, Record::UserVote(v)) => {
            data.extend_from_slice(&USER_VOTE_DISCRIMINATOR);
            v.serialize(&mut data)?;
        }
        (variant, _) => {
            return Err(SdkError::ArgumentMismatch {
                variant,
                detail: "record layout belongs to the other program",
            })
        }
    }
    Ok(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reader_tracks_offset() {
        let mut r = Reader::new(&[1, 0, 0, 0, 0, 0, 0, 0, 9]);
        assert_eq!(r.read_u64().unwrap(), 1);
        assert_eq!(r.offset(), 8);
        assert_eq!(r.read_u8().unwrap(), 9);
        assert_eq!(
            r.read_u8(),
            Err(DecodeError::TruncatedBuffer {
                offset: 9,
                needed: 1,
                len: 9
            })
        );
    }

    #[test]
    fn oversized_string_length_is_truncation_not_panic() {
        let mut r = Reader::new(&[0xff, 0xff, 0xff, 0xff, b'a']);
        assert!(matches!(
            r.read_string(),
            Err(DecodeError::TruncatedBuffer { offset: 4, .. })
        ));
    }

    #[test]
    fn option_flag_must_be_zero_or_one() {
        let mut r = Reader::new(&[2]);
        assert!(matches!(
            r.read_option(Reader::read_pubkey),
            Err(DecodeError::InvalidEnumTag { type_name: "option", tag: 2, .. })
        ));
    }
}
