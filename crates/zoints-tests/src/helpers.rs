//! Shared strategies and fixtures for integration tests.

use proptest::prelude::*;

use zoints_core::accounts::{
    Authority, AuthorityKind, Beneficiary, Community, Endpoint, Settings, Stake,
};
use zoints_core::address::Address;
use zoints_core::instruction::StakingInstruction;
use zoints_core::time::UnixTimestamp;

/// Devnet deployment of the staking program.
pub const PROGRAM_ID: &str = "A7PR2hfpVDsBqd83mD6WSEr9Z9CvDNJ9FehcvvLdvuC2";

/// Beneficiary captured from devnet.
pub const BENEFICIARY_HEX: &str = "119d83bab3558b28eeba2de8ec95ad033f382a128fe132ec76c0d42f7158fc9d\
    5f761b0000000000\
    91a6dc0400000000\
    0000000000000000";

/// Stake captured from devnet.
pub const STAKE_HEX: &str = "ced6106100000000\
    4c400f0000000000\
    119d83bab3558b28eeba2de8ec95ad033f382a128fe132ec76c0d42f7158fc9d\
    e2de106100000000\
    f401000000000000";

/// NFT-owned endpoint captured from devnet.
pub const ENDPOINT_HEX: &str = "f2af726100000000\
    c0d4010000000000\
    01\
    0616199c9f294a9e109258c9b25bb67d20944a310428b98d51f857c6a149913c\
    5f05c250296ca8cadcb3523cbcd06799d9366bd67cdf7b4a0eb0f500556122f1\
    92178a237c3d908a17360d2eb6466acdf1451150c45a28a5a9223365c9b177a9";

/// Staker authority shared by the beneficiary and stake fixtures.
pub const FIXTURE_STAKER: &str = "2BmEn6gnEDEPstnVW8Ek7gAmsVRhK5J9V1h6idSvcSrQ";

pub fn program_id() -> Address {
    Address::from_base58(PROGRAM_ID).expect("valid program id")
}

/// Address filled with one byte.
pub fn addr(seed: u8) -> Address {
    Address([seed; 32])
}

/// Decode a fixture, stripping the whitespace left by line continuations.
pub fn fixture_bytes(hex_str: &str) -> Vec<u8> {
    let compact: String = hex_str.chars().filter(|c| !c.is_whitespace()).collect();
    hex::decode(compact).expect("hex fixture")
}

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

pub fn arb_u64() -> impl Strategy<Value = u64> {
    prop_oneof![Just(0u64), Just(u64::MAX), any::<u64>()]
}

pub fn arb_u128() -> impl Strategy<Value = u128> {
    prop_oneof![Just(0u128), Just(u128::MAX), any::<u128>()]
}

pub fn arb_i64() -> impl Strategy<Value = i64> {
    prop_oneof![Just(0i64), Just(i64::MIN), Just(i64::MAX), Just(-1i64), any::<i64>()]
}

pub fn arb_address() -> impl Strategy<Value = Address> {
    prop_oneof![
        Just(Address::ZERO),
        Just(Address([0xff; 32])),
        any::<[u8; 32]>().prop_map(Address),
    ]
}

pub fn arb_timestamp() -> impl Strategy<Value = UnixTimestamp> {
    arb_u64().prop_map(UnixTimestamp)
}

pub fn arb_settings() -> impl Strategy<Value = Settings> {
    (
        arb_address(),
        arb_u64(),
        arb_address(),
        arb_timestamp(),
        arb_u64(),
        arb_u64(),
        arb_u128(),
        arb_timestamp(),
    )
        .prop_map(
            |(
                mint,
                unbonding_duration,
                fee_recipient,
                next_emission_change,
                emission,
                total_staked,
                reward_per_share,
                last_reward,
            )| Settings {
                mint,
                unbonding_duration,
                fee_recipient,
                next_emission_change,
                emission,
                total_staked,
                reward_per_share,
                last_reward,
            },
        )
}

pub fn arb_beneficiary() -> impl Strategy<Value = Beneficiary> {
    (arb_address(), arb_u64(), arb_u64(), arb_u64()).prop_map(
        |(authority, staked, reward_debt, holding)| Beneficiary {
            authority,
            staked,
            reward_debt,
            holding,
        },
    )
}

pub fn arb_community() -> impl Strategy<Value = Community> {
    (arb_timestamp(), arb_address(), arb_address(), arb_address()).prop_map(
        |(creation_date, authority, primary, secondary)| Community {
            creation_date,
            authority,
            primary,
            secondary,
        },
    )
}

pub fn arb_authority() -> impl Strategy<Value = Authority> {
    (
        prop_oneof![
            Just(AuthorityKind::None),
            Just(AuthorityKind::Nft),
            Just(AuthorityKind::Basic),
        ],
        arb_address(),
    )
        .prop_map(|(kind, address)| Authority { kind, address })
}

pub fn arb_endpoint() -> impl Strategy<Value = Endpoint> {
    (
        arb_timestamp(),
        arb_u64(),
        arb_authority(),
        arb_address(),
        arb_address(),
    )
        .prop_map(
            |(creation_date, total_stake, owner, primary, secondary)| Endpoint {
                creation_date,
                total_stake,
                owner,
                primary,
                secondary,
            },
        )
}

pub fn arb_stake() -> impl Strategy<Value = Stake> {
    (
        arb_timestamp(),
        arb_u64(),
        arb_address(),
        arb_timestamp(),
        arb_u64(),
    )
        .prop_map(
            |(creation_date, total_stake, staker, unbonding_end, unbonding_amount)| Stake {
                creation_date,
                total_stake,
                staker,
                unbonding_end,
                unbonding_amount,
            },
        )
}

pub fn arb_instruction() -> impl Strategy<Value = StakingInstruction> {
    prop_oneof![
        (arb_timestamp(), arb_u64()).prop_map(|(start_time, unbonding_duration)| {
            StakingInstruction::Initialize {
                start_time,
                unbonding_duration,
            }
        }),
        Just(StakingInstruction::RegisterCommunity),
        Just(StakingInstruction::InitializeStake),
        arb_i64().prop_map(|amount| StakingInstruction::Stake { amount }),
        Just(StakingInstruction::WithdrawUnbond),
        Just(StakingInstruction::ClaimPrimary),
        Just(StakingInstruction::ClaimSecondary),
    ]
}
