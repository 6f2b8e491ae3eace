//! Numeric failure codes reported by the staking program.
//!
//! The remote runtime surfaces a program failure as text containing
//! `custom program error: 0x<hex>`. These helpers map that code to a name
//! for logs and display. They are never used for control flow.

use serde::Serialize;
use std::fmt;

const CUSTOM_ERROR_MARKER: &str = "custom program error: 0x";

macro_rules! program_error_codes {
    ($($name:ident),+ $(,)?) => {
        /// Failure reasons, numbered from zero in declaration order.
        #[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
        #[repr(u32)]
        pub enum ProgramErrorCode {
            $($name),+
        }

        impl ProgramErrorCode {
            pub const ALL: &'static [ProgramErrorCode] = &[$(ProgramErrorCode::$name),+];

            pub fn name(self) -> &'static str {
                match self {
                    $(ProgramErrorCode::$name => stringify!($name)),+
                }
            }
        }
    };
}

program_error_codes! {
    MissingAuthoritySignature,
    ProgramAlreadyInitialized,
    ProgramNotInitialized,
    InvalidSettingsAccount,
    InvalidRewardPoolAccount,
    InvalidPoolAuthorityAccount,
    InvalidStakePoolAccount,
    TokenNotSPLToken,
    CommunityAccountAlreadyExists,
    AuthorizedSignatureMissing,
    PrimaryAssociatedInvalidAccount,
    PrimaryAssociatedInvalidOwner,
    PrimaryAssociatedInvalidToken,
    SecondarySignatureMissing,
    SecondaryAssociatedInvalidOwner,
    SecondaryAssociatedInvalidToken,
    SecondaryAssociatedInvalidAccount,
    CommunityCreatorSignatureMissing,
    InvalidStakeAccount,
    InvalidCommunityAccount,
    MissingStakeSignature,
    AssociatedInvalidOwner,
    AssociatedInvalidToken,
    AssociatedInvalidAccount,
    StakerInvalidStakeAccount,
    StakerBalanceTooLow,
    StakerMinimumBalanceNotMet,
    StakerWithdrawingTooMuch,
    WithdrawNothingtowithdraw,
    WithdrawUnbondingTimeNotOverYet,
    NothingtoWithdraw,
}

impl ProgramErrorCode {
    pub fn from_code(code: u32) -> Option<Self> {
        Self::ALL.get(code as usize).copied()
    }

    pub fn code(self) -> u32 {
        self as u32
    }
}

impl fmt::Display for ProgramErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Pull the numeric code out of a failure message, if it has one.
pub fn extract_error_code(message: &str) -> Option<u32> {
    let (_, code, _) = locate_code(message)?;
    Some(code)
}

/// Byte range of the hex digits and their value.
fn locate_code(message: &str) -> Option<(usize, u32, usize)> {
    let start = message.find(CUSTOM_ERROR_MARKER)? + CUSTOM_ERROR_MARKER.len();
    let digits = message[start..]
        .bytes()
        .take_while(u8::is_ascii_hexdigit)
        .count();
    if digits == 0 {
        return None;
    }
    let end = start + digits;
    let code = u32::from_str_radix(&message[start..end], 16).ok()?;
    Some((start, code, end))
}

/// Rewrite the code fragment as `STAKING-ERROR 0x<hex>: <Name>`.
///
/// Messages without a code are returned unchanged. Unknown codes keep the
/// hex but are named `Unknown`.
pub fn describe_message(message: &str) -> String {
    let Some((start, code, end)) = locate_code(message) else {
        return message.to_string();
    };
    let marker_start = start - CUSTOM_ERROR_MARKER.len();
    let name = ProgramErrorCode::from_code(code).map_or("Unknown", ProgramErrorCode::name);
    format!(
        "{}STAKING-ERROR 0x{}: {}{}",
        &message[..marker_start],
        &message[start..end],
        name,
        &message[end..]
    )
}
