//! Account records stored by the staking program.
//!
//! All records are fixed-size. Field order below is the on-ledger byte order.

use bytes::{Buf, BufMut};
use serde::{Deserialize, Serialize};

use crate::address::Address;
use crate::codec::{get_address, get_timestamp, put_address, put_timestamp, AccountLayout};
use crate::error::DecodeError;
use crate::time::UnixTimestamp;

/// Global program state.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Settings {
    /// Mint of the staked and rewarded token.
    pub mint: Address,
    /// Seconds a withdrawal stays locked after unstaking.
    pub unbonding_duration: u64,
    /// Authority whose beneficiary account collects staking fees.
    pub fee_recipient: Address,
    /// When the emission rate next decays.
    pub next_emission_change: UnixTimestamp,
    /// Tokens emitted per year at the current rate.
    pub emission: u64,
    /// Sum of all beneficiaries' stake.
    pub total_staked: u64,
    /// Accumulated reward per staked token, scaled by [`crate::constants::PRECISION`].
    #[serde(with = "u128_string")]
    pub reward_per_share: u128,
    /// When `reward_per_share` was last brought up to date.
    pub last_reward: UnixTimestamp,
}

impl AccountLayout for Settings {
    const LEN: usize = 120;

    fn write(&self, buf: &mut impl BufMut) {
        put_address(buf, &self.mint);
        buf.put_u64_le(self.unbonding_duration);
        put_address(buf, &self.fee_recipient);
        put_timestamp(buf, self.next_emission_change);
        buf.put_u64_le(self.emission);
        buf.put_u64_le(self.total_staked);
        buf.put_u128_le(self.reward_per_share);
        put_timestamp(buf, self.last_reward);
    }

    fn read(buf: &mut impl Buf) -> Result<Self, DecodeError> {
        Ok(Self {
            mint: get_address(buf),
            unbonding_duration: buf.get_u64_le(),
            fee_recipient: get_address(buf),
            next_emission_change: get_timestamp(buf),
            emission: buf.get_u64_le(),
            total_staked: buf.get_u64_le(),
            reward_per_share: buf.get_u128_le(),
            last_reward: get_timestamp(buf),
        })
    }
}

/// A reward-earning participant, keyed by authority.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Beneficiary {
    pub authority: Address,
    pub staked: u64,
    pub reward_debt: u64,
    /// Rewards already settled but not yet claimed.
    pub holding: u64,
}

impl Beneficiary {
    /// An account that was never initialized has the zero authority.
    pub fn is_empty(&self) -> bool {
        self.authority.is_zero()
    }
}

impl AccountLayout for Beneficiary {
    const LEN: usize = 56;

    fn write(&self, buf: &mut impl BufMut) {
        put_address(buf, &self.authority);
        buf.put_u64_le(self.staked);
        buf.put_u64_le(self.reward_debt);
        buf.put_u64_le(self.holding);
    }

    fn read(buf: &mut impl Buf) -> Result<Self, DecodeError> {
        Ok(Self {
            authority: get_address(buf),
            staked: buf.get_u64_le(),
            reward_debt: buf.get_u64_le(),
            holding: buf.get_u64_le(),
        })
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Community {
    pub creation_date: UnixTimestamp,
    pub authority: Address,
    pub primary: Address,
    /// Zero when the community has no secondary beneficiary.
    pub secondary: Address,
}

impl Community {
    pub fn has_secondary(&self) -> bool {
        !self.secondary.is_zero()
    }
}

impl AccountLayout for Community {
    const LEN: usize = 104;

    fn write(&self, buf: &mut impl BufMut) {
        put_timestamp(buf, self.creation_date);
        put_address(buf, &self.authority);
        put_address(buf, &self.primary);
        put_address(buf, &self.secondary);
    }

    fn read(buf: &mut impl Buf) -> Result<Self, DecodeError> {
        Ok(Self {
            creation_date: get_timestamp(buf),
            authority: get_address(buf),
            primary: get_address(buf),
            secondary: get_address(buf),
        })
    }
}

/// What controls an endpoint.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum AuthorityKind {
    #[default]
    None = 0,
    /// Ownership follows whoever holds the NFT minted at the address.
    Nft = 1,
    /// A plain signing key.
    Basic = 2,
}

impl TryFrom<u8> for AuthorityKind {
    type Error = DecodeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::None),
            1 => Ok(Self::Nft),
            2 => Ok(Self::Basic),
            _ => Err(DecodeError::InvalidEnum {
                field: "authority kind",
                value,
            }),
        }
    }
}

/// Tagged authority. Always encoded as the tag byte plus 32 address bytes,
/// even for [`AuthorityKind::None`], so the enclosing record stays fixed-size.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Authority {
    pub kind: AuthorityKind,
    pub address: Address,
}

impl Authority {
    pub const NONE: Self = Self {
        kind: AuthorityKind::None,
        address: Address::ZERO,
    };

    pub fn nft(mint: Address) -> Self {
        Self {
            kind: AuthorityKind::Nft,
            address: mint,
        }
    }

    pub fn basic(key: Address) -> Self {
        Self {
            kind: AuthorityKind::Basic,
            address: key,
        }
    }
}

impl AccountLayout for Authority {
    const LEN: usize = 33;

    fn write(&self, buf: &mut impl BufMut) {
        buf.put_u8(self.kind as u8);
        put_address(buf, &self.address);
    }

    fn read(buf: &mut impl Buf) -> Result<Self, DecodeError> {
        let kind = AuthorityKind::try_from(buf.get_u8())?;
        Ok(Self {
            kind,
            address: get_address(buf),
        })
    }
}

/// Community record with a tagged owner and running stake total.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Endpoint {
    pub creation_date: UnixTimestamp,
    pub total_stake: u64,
    pub owner: Authority,
    pub primary: Address,
    pub secondary: Address,
}

impl Endpoint {
    pub fn has_secondary(&self) -> bool {
        !self.secondary.is_zero()
    }
}

impl AccountLayout for Endpoint {
    const LEN: usize = 113;

    fn write(&self, buf: &mut impl BufMut) {
        put_timestamp(buf, self.creation_date);
        buf.put_u64_le(self.total_stake);
        self.owner.write(buf);
        put_address(buf, &self.primary);
        put_address(buf, &self.secondary);
    }

    fn read(buf: &mut impl Buf) -> Result<Self, DecodeError> {
        Ok(Self {
            creation_date: get_timestamp(buf),
            total_stake: buf.get_u64_le(),
            owner: Authority::read(buf)?,
            primary: get_address(buf),
            secondary: get_address(buf),
        })
    }
}

/// One owner's stake in one community.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Stake {
    pub creation_date: UnixTimestamp,
    pub total_stake: u64,
    pub staker: Address,
    pub unbonding_end: UnixTimestamp,
    pub unbonding_amount: u64,
}

impl Stake {
    pub fn is_unbonding(&self) -> bool {
        self.unbonding_amount > 0
    }

    /// Whether an unbonding amount exists and its lock has expired at `now`.
    pub fn withdrawable_at(&self, now: UnixTimestamp) -> bool {
        self.is_unbonding() && now >= self.unbonding_end
    }
}

impl AccountLayout for Stake {
    const LEN: usize = 64;

    fn write(&self, buf: &mut impl BufMut) {
        put_timestamp(buf, self.creation_date);
        buf.put_u64_le(self.total_stake);
        put_address(buf, &self.staker);
        put_timestamp(buf, self.unbonding_end);
        buf.put_u64_le(self.unbonding_amount);
    }

    fn read(buf: &mut impl Buf) -> Result<Self, DecodeError> {
        Ok(Self {
            creation_date: get_timestamp(buf),
            total_stake: buf.get_u64_le(),
            staker: get_address(buf),
            unbonding_end: get_timestamp(buf),
            unbonding_amount: buf.get_u64_le(),
        })
    }
}

/// `u128` as a decimal string. JSON numbers lose precision past 2^53 and
/// `serde_json::Value` cannot hold anything past `u64::MAX`.
mod u128_string {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &u128, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u128, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
