//! Instruction records and the staking program's payload encoding.
//!
//! Instruction data is one discriminant byte followed by the operation's
//! arguments in declared order, little-endian.

use bytes::{Buf, BufMut};
use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::codec::{ensure_len, get_timestamp, put_timestamp};
use crate::error::DecodeError;
use crate::time::UnixTimestamp;

/// One account reference in an instruction.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AccountMeta {
    pub pubkey: Address,
    pub is_signer: bool,
    pub is_writable: bool,
}

impl AccountMeta {
    /// A writable account.
    pub fn new(pubkey: Address, is_signer: bool) -> Self {
        Self {
            pubkey,
            is_signer,
            is_writable: true,
        }
    }

    pub fn new_readonly(pubkey: Address, is_signer: bool) -> Self {
        Self {
            pubkey,
            is_signer,
            is_writable: false,
        }
    }
}

/// A request addressed to a program, ready for an external submitter.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Instruction {
    pub program_id: Address,
    pub accounts: Vec<AccountMeta>,
    #[serde(with = "hex_bytes")]
    pub data: Vec<u8>,
}

impl Instruction {
    /// Decode this instruction's payload.
    pub fn decode_data(&self) -> Result<StakingInstruction, DecodeError> {
        StakingInstruction::unpack(&self.data)
    }

    pub fn signers(&self) -> impl Iterator<Item = &Address> {
        self.accounts
            .iter()
            .filter(|meta| meta.is_signer)
            .map(|meta| &meta.pubkey)
    }
}

mod hex_bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        hex::decode(&s).map_err(serde::de::Error::custom)
    }
}

/// Operations understood by the staking program.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum StakingInstruction {
    /// One-time program setup.
    Initialize {
        /// When rewards start accruing.
        start_time: UnixTimestamp,
        /// Seconds unstaked funds stay locked.
        unbonding_duration: u64,
    },
    RegisterCommunity,
    InitializeStake,
    /// Change a stake by `amount`. Negative unstakes, zero only harvests.
    Stake { amount: i64 },
    WithdrawUnbond,
    ClaimPrimary,
    ClaimSecondary,
}

impl StakingInstruction {
    pub const INITIALIZE: u8 = 0;
    pub const REGISTER_COMMUNITY: u8 = 1;
    pub const INITIALIZE_STAKE: u8 = 2;
    pub const STAKE: u8 = 3;
    pub const WITHDRAW_UNBOND: u8 = 4;
    pub const CLAIM_PRIMARY: u8 = 5;
    pub const CLAIM_SECONDARY: u8 = 6;

    pub fn discriminant(&self) -> u8 {
        match self {
            Self::Initialize { .. } => Self::INITIALIZE,
            Self::RegisterCommunity => Self::REGISTER_COMMUNITY,
            Self::InitializeStake => Self::INITIALIZE_STAKE,
            Self::Stake { .. } => Self::STAKE,
            Self::WithdrawUnbond => Self::WITHDRAW_UNBOND,
            Self::ClaimPrimary => Self::CLAIM_PRIMARY,
            Self::ClaimSecondary => Self::CLAIM_SECONDARY,
        }
    }

    /// Encoded payload length, discriminant included.
    pub fn packed_len(&self) -> usize {
        match self {
            Self::Initialize { .. } => 17,
            Self::Stake { .. } => 9,
            _ => 1,
        }
    }

    pub fn pack(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.packed_len());
        out.put_u8(self.discriminant());
        match *self {
            Self::Initialize {
                start_time,
                unbonding_duration,
            } => {
                put_timestamp(&mut out, start_time);
                out.put_u64_le(unbonding_duration);
            }
            Self::Stake { amount } => out.put_i64_le(amount),
            _ => {}
        }
        out
    }

    /// Decode a payload. The whole buffer must be consumed.
    pub fn unpack(data: &[u8]) -> Result<Self, DecodeError> {
        ensure_len(1, data.len())?;
        let mut buf = data;
        let tag = buf.get_u8();
        let ix = match tag {
            Self::INITIALIZE => {
                ensure_len(17, data.len())?;
                Self::Initialize {
                    start_time: get_timestamp(&mut buf),
                    unbonding_duration: buf.get_u64_le(),
                }
            }
            Self::REGISTER_COMMUNITY => Self::RegisterCommunity,
            Self::INITIALIZE_STAKE => Self::InitializeStake,
            Self::STAKE => {
                ensure_len(9, data.len())?;
                Self::Stake {
                    amount: buf.get_i64_le(),
                }
            }
            Self::WITHDRAW_UNBOND => Self::WithdrawUnbond,
            Self::CLAIM_PRIMARY => Self::ClaimPrimary,
            Self::CLAIM_SECONDARY => Self::ClaimSecondary,
            value => {
                return Err(DecodeError::InvalidEnum {
                    field: "instruction",
                    value,
                });
            }
        };
        if buf.has_remaining() {
            return Err(DecodeError::TrailingBytes {
                expected: ix.packed_len(),
                actual: data.len(),
            });
        }
        Ok(ix)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Initialize { .. } => "Initialize",
            Self::RegisterCommunity => "RegisterCommunity",
            Self::InitializeStake => "InitializeStake",
            Self::Stake { .. } => "Stake",
            Self::WithdrawUnbond => "WithdrawUnbond",
            Self::ClaimPrimary => "ClaimPrimary",
            Self::ClaimSecondary => "ClaimSecondary",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stake_payload() {
        let data = StakingInstruction::Stake { amount: 12345 }.pack();
        let mut expected = vec![3];
        expected.extend_from_slice(&12345i64.to_le_bytes());
        assert_eq!(data, expected);
    }

    #[test]
    fn negative_stake_is_twos_complement() {
        let data = StakingInstruction::Stake { amount: -1 }.pack();
        assert_eq!(&data[1..], &[0xff; 8]);
        assert_eq!(
            StakingInstruction::unpack(&data).unwrap(),
            StakingInstruction::Stake { amount: -1 }
        );
    }

    #[test]
    fn initialize_payload() {
        let ix = StakingInstruction::Initialize {
            start_time: UnixTimestamp(1_625_215_551),
            unbonding_duration: 60,
        };
        let data = ix.pack();
        assert_eq!(data.len(), 17);
        assert_eq!(data[0], 0);
        assert_eq!(&data[1..9], &1_625_215_551u64.to_le_bytes());
        assert_eq!(&data[9..], &60u64.to_le_bytes());
        assert_eq!(StakingInstruction::unpack(&data).unwrap(), ix);
    }

    #[test]
    fn unit_variants_are_one_byte() {
        for (ix, tag) in [
            (StakingInstruction::RegisterCommunity, 1),
            (StakingInstruction::InitializeStake, 2),
            (StakingInstruction::WithdrawUnbond, 4),
            (StakingInstruction::ClaimPrimary, 5),
            (StakingInstruction::ClaimSecondary, 6),
        ] {
            assert_eq!(ix.pack(), vec![tag]);
            assert_eq!(StakingInstruction::unpack(&[tag]).unwrap(), ix);
        }
    }

    #[test]
    fn unknown_discriminant() {
        assert_eq!(
            StakingInstruction::unpack(&[7]),
            Err(DecodeError::InvalidEnum { field: "instruction", value: 7 })
        );
    }

    #[test]
    fn empty_payload_is_truncated() {
        assert_eq!(
            StakingInstruction::unpack(&[]),
            Err(DecodeError::Truncated { expected: 1, actual: 0 })
        );
    }

    #[test]
    fn short_stake_is_truncated() {
        assert_eq!(
            StakingInstruction::unpack(&[3, 1, 2]),
            Err(DecodeError::Truncated { expected: 9, actual: 3 })
        );
    }

    #[test]
    fn trailing_bytes_rejected() {
        assert_eq!(
            StakingInstruction::unpack(&[4, 0]),
            Err(DecodeError::TrailingBytes { expected: 1, actual: 2 })
        );
    }

    #[test]
    fn instruction_json_uses_hex_data() {
        let ix = Instruction {
            program_id: Address([1u8; 32]),
            accounts: vec![AccountMeta::new(Address([2u8; 32]), true)],
            data: vec![3, 0xab],
        };
        let json = serde_json::to_value(&ix).unwrap();
        assert_eq!(json["data"], "03ab");
        let back: Instruction = serde_json::from_value(json).unwrap();
        assert_eq!(back, ix);
    }

    #[test]
    fn meta_constructors() {
        let a = Address([9u8; 32]);
        assert!(AccountMeta::new(a, false).is_writable);
        assert!(!AccountMeta::new_readonly(a, true).is_writable);
        assert!(AccountMeta::new_readonly(a, true).is_signer);
    }
}
