//! Program-derived address (PDA) derivation.
//!
//! A program-derived address is the SHA-256 digest of
//! `seed_0 || … || seed_n || bump || program_id || "ProgramDerivedAddress"`
//! that is *not* a valid Ed25519 point. Because no private key exists for an
//! off-curve value, only the owning program can authorize the account.
//!
//! [`find_program_address`] searches bumps from 255 down to 0 and returns the
//! first off-curve digest (the canonical bump). The result depends only on
//! the inputs, so it may be cached freely.

use sha2::{Digest, Sha256};

use crate::address::{bytes_are_curve_point, Address};
use crate::constants::{
    BENEFICIARY_SEED, MAX_SEEDS, MAX_SEED_LEN, PDA_MARKER, POOL_AUTHORITY_SEED, REWARD_POOL_SEED,
    SETTINGS_SEED, STAKE_POOL_SEED, STAKE_SEED,
};
use crate::error::DerivationError;

fn check_seeds(seeds: &[&[u8]], reserved: usize) -> Result<(), DerivationError> {
    let max = MAX_SEEDS - reserved;
    if seeds.len() > max {
        return Err(DerivationError::TooManySeeds {
            count: seeds.len(),
            max,
        });
    }
    for (index, seed) in seeds.iter().enumerate() {
        if seed.len() > MAX_SEED_LEN {
            return Err(DerivationError::MaxSeedLengthExceeded {
                index,
                len: seed.len(),
                max: MAX_SEED_LEN,
            });
        }
    }
    Ok(())
}

fn hash_candidate(seeds: &[&[u8]], bump: Option<u8>, program_id: &Address) -> [u8; 32] {
    let mut hasher = Sha256::new();
    for seed in seeds {
        hasher.update(seed);
    }
    if let Some(bump) = bump {
        hasher.update([bump]);
    }
    hasher.update(program_id.as_bytes());
    hasher.update(PDA_MARKER);
    hasher.finalize().into()
}

/// Derive an address from seeds exactly as given, with no bump search.
///
/// Fails with [`DerivationError::OnCurve`] if the digest is a curve point.
/// Callers that already know the bump pass it as the last seed.
pub fn create_program_address(
    seeds: &[&[u8]],
    program_id: &Address,
) -> Result<Address, DerivationError> {
    check_seeds(seeds, 0)?;
    let hash = hash_candidate(seeds, None, program_id);
    if bytes_are_curve_point(&hash) {
        return Err(DerivationError::OnCurve);
    }
    Ok(Address(hash))
}

/// Find the canonical program address and its bump seed.
pub fn find_program_address(
    seeds: &[&[u8]],
    program_id: &Address,
) -> Result<(Address, u8), DerivationError> {
    check_seeds(seeds, 1)?;
    for bump in (0..=u8::MAX).rev() {
        let hash = hash_candidate(seeds, Some(bump), program_id);
        if !bytes_are_curve_point(&hash) {
            return Ok((Address(hash), bump));
        }
    }
    Err(DerivationError::NoCanonicalAddress)
}

/// Global settings account.
pub fn settings_address(program_id: &Address) -> Result<(Address, u8), DerivationError> {
    find_program_address(&[SETTINGS_SEED], program_id)
}

/// Authority that signs transfers out of both pools.
pub fn pool_authority_address(program_id: &Address) -> Result<(Address, u8), DerivationError> {
    find_program_address(&[POOL_AUTHORITY_SEED], program_id)
}

/// Token account holding undistributed rewards.
pub fn reward_pool_address(program_id: &Address) -> Result<(Address, u8), DerivationError> {
    find_program_address(&[REWARD_POOL_SEED], program_id)
}

/// Token account holding staked funds.
pub fn stake_pool_address(program_id: &Address) -> Result<(Address, u8), DerivationError> {
    find_program_address(&[STAKE_POOL_SEED], program_id)
}

/// Stake account of `owner` in `community`.
pub fn stake_address(
    program_id: &Address,
    community: &Address,
    owner: &Address,
) -> Result<(Address, u8), DerivationError> {
    find_program_address(
        &[STAKE_SEED, community.as_bytes(), owner.as_bytes()],
        program_id,
    )
}

/// Beneficiary account of `authority`.
pub fn beneficiary_address(
    program_id: &Address,
    authority: &Address,
) -> Result<(Address, u8), DerivationError> {
    find_program_address(&[BENEFICIARY_SEED, authority.as_bytes()], program_id)
}
