//! zoints-cli: offline inspection tool for the Zoints staking program.
//!
//! Derives program addresses, decodes captured account data, projects
//! rewards and builds unsigned instructions. Every command prints JSON on
//! stdout; logs go to stderr.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, info};

use zoints_client::{ClaimRole, ClientConfig, InstructionBuilder, LogFormat, StakeAccounts};
use zoints_core::accounts::{Beneficiary, Community, Endpoint, Settings, Stake};
use zoints_core::address::Address;
use zoints_core::codec::AccountLayout;
use zoints_core::instruction::StakingInstruction;
use zoints_core::pda;
use zoints_core::program_error::{describe_message, extract_error_code, ProgramErrorCode};
use zoints_core::time::{unix_seconds, UnixTimestamp};
use zoints_core::traits::RewardCalculator;
use zoints_reward::RewardEngine;

/// Zoints staking client.
#[derive(Parser)]
#[command(name = "zoints-cli")]
#[command(version, about = "Inspect and build requests for the Zoints staking program")]
struct Cli {
    /// Staking program id (base58). Overrides ZOINTS_PROGRAM_ID.
    #[arg(long, global = true)]
    program_id: Option<Address>,

    /// Log level (trace, debug, info, warn, error). Overrides ZOINTS_LOG_LEVEL.
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Log output format ("text" or "json"). Overrides ZOINTS_LOG_FORMAT.
    #[arg(long, global = true)]
    log_format: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Derive a program address.
    Address {
        #[command(subcommand)]
        kind: AddressKind,
    },
    /// Decode account data or an instruction payload.
    Decode(DecodeArgs),
    /// Project the reward accumulator and a beneficiary's harvest.
    Project(ProjectArgs),
    /// Build an unsigned instruction.
    Build {
        #[command(subcommand)]
        op: BuildOp,
    },
    /// Name a program error code, or the code inside a failure message.
    ExplainError {
        /// Decimal code, 0x-prefixed hex code, or a full error message.
        input: String,
    },
}

#[derive(Subcommand)]
enum AddressKind {
    Settings,
    PoolAuthority,
    RewardPool,
    StakePool,
    Stake {
        #[arg(long)]
        community: Address,
        #[arg(long)]
        owner: Address,
    },
    Beneficiary {
        #[arg(long)]
        authority: Address,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum RecordKind {
    Settings,
    Beneficiary,
    Community,
    Endpoint,
    Stake,
    Instruction,
}

/// Raw bytes given inline as hex or read from a file.
#[derive(Args)]
struct BytesInput {
    /// Hex-encoded bytes.
    #[arg(conflicts_with = "file")]
    hex: Option<String>,

    /// File containing raw bytes.
    #[arg(long)]
    file: Option<PathBuf>,
}

impl BytesInput {
    fn read(&self) -> Result<Vec<u8>> {
        match (&self.hex, &self.file) {
            (Some(h), None) => decode_hex(h),
            (None, Some(path)) => {
                std::fs::read(path).with_context(|| format!("reading {}", path.display()))
            }
            _ => bail!("provide either hex bytes or --file"),
        }
    }
}

#[derive(Args)]
struct DecodeArgs {
    #[arg(value_enum)]
    record: RecordKind,

    #[command(flatten)]
    input: BytesInput,

    /// Accept data longer than the record layout.
    #[arg(long)]
    prefix: bool,
}

#[derive(Args)]
struct ProjectArgs {
    /// Hex-encoded settings account.
    #[arg(long, conflicts_with = "settings_file")]
    settings: Option<String>,

    #[arg(long)]
    settings_file: Option<PathBuf>,

    /// Hex-encoded beneficiary account.
    #[arg(long, conflicts_with = "beneficiary_file")]
    beneficiary: Option<String>,

    #[arg(long)]
    beneficiary_file: Option<PathBuf>,

    /// Unix seconds or RFC 3339 time. Defaults to now.
    #[arg(long)]
    at: Option<String>,
}

#[derive(Subcommand)]
enum BuildOp {
    Initialize {
        #[arg(long)]
        funder: Address,
        #[arg(long)]
        mint: Address,
        #[arg(long)]
        fee_recipient: Address,
        /// Unix seconds or RFC 3339 time.
        #[arg(long)]
        start_time: String,
        #[arg(long)]
        unbonding_duration: u64,
    },
    RegisterCommunity {
        #[arg(long)]
        funder: Address,
        #[arg(long)]
        owner: Address,
        #[arg(long)]
        community: Address,
        #[arg(long)]
        primary: Address,
        #[arg(long)]
        secondary: Option<Address>,
    },
    InitializeStake {
        #[arg(long)]
        funder: Address,
        #[arg(long)]
        owner: Address,
        #[arg(long)]
        community: Address,
    },
    Stake {
        #[arg(long)]
        funder: Address,
        #[arg(long)]
        staker: Address,
        #[arg(long)]
        token_account: Address,
        #[arg(long)]
        community: Address,
        #[arg(long)]
        primary: Address,
        #[arg(long)]
        secondary: Option<Address>,
        #[arg(long)]
        fee_recipient: Address,
        /// Signed amount. Negative unstakes.
        #[arg(long, allow_hyphen_values = true)]
        amount: i64,
    },
    WithdrawUnbond {
        #[arg(long)]
        funder: Address,
        #[arg(long)]
        staker: Address,
        #[arg(long)]
        token_account: Address,
        #[arg(long)]
        community: Address,
    },
    Claim {
        #[arg(long, value_enum)]
        role: RoleArg,
        #[arg(long)]
        funder: Address,
        #[arg(long)]
        authority: Address,
        #[arg(long)]
        token_account: Address,
        #[arg(long)]
        community: Address,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum RoleArg {
    Primary,
    Secondary,
}

impl From<RoleArg> for ClaimRole {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Primary => ClaimRole::Primary,
            RoleArg::Secondary => ClaimRole::Secondary,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = resolve_config(&cli)?;

    init_logging(&config.log_level, config.log_format);
    debug!(program_id = ?config.program_id, "configuration loaded");

    let output = match cli.command {
        Commands::Address { kind } => derive_address(&config, kind)?,
        Commands::Decode(args) => decode(args)?,
        Commands::Project(args) => project(args)?,
        Commands::Build { op } => build(&config, op)?,
        Commands::ExplainError { input } => explain_error(&input)?,
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Environment first, then command-line overrides.
fn resolve_config(cli: &Cli) -> Result<ClientConfig> {
    let mut config = ClientConfig::from_env().context("loading configuration from environment")?;
    if let Some(id) = cli.program_id {
        config.program_id = Some(id);
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(format) = &cli.log_format {
        config.log_format = format.parse::<LogFormat>()?;
    }
    Ok(config)
}

fn init_logging(level_str: &str, format: LogFormat) {
    use tracing_subscriber::filter::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::prelude::*;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level_str));

    match format {
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        LogFormat::Text => tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_level(true)
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}

fn decode_hex(s: &str) -> Result<Vec<u8>> {
    let trimmed = s.trim();
    let digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    hex::decode(digits).context("invalid hex input")
}

fn parse_time(s: &str) -> Result<UnixTimestamp> {
    if let Ok(secs) = s.parse::<u64>() {
        return Ok(UnixTimestamp(secs));
    }
    let dt = chrono::DateTime::parse_from_rfc3339(s)
        .with_context(|| format!("expected unix seconds or RFC 3339 time, got {s:?}"))?;
    Ok(UnixTimestamp(unix_seconds(dt.with_timezone(&chrono::Utc))?))
}

fn to_json<T: Serialize>(value: &T) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}

fn derive_address(config: &ClientConfig, kind: AddressKind) -> Result<Value> {
    let program = config.require_program_id()?;
    let (address, bump) = match kind {
        AddressKind::Settings => pda::settings_address(&program)?,
        AddressKind::PoolAuthority => pda::pool_authority_address(&program)?,
        AddressKind::RewardPool => pda::reward_pool_address(&program)?,
        AddressKind::StakePool => pda::stake_pool_address(&program)?,
        AddressKind::Stake { community, owner } => pda::stake_address(&program, &community, &owner)?,
        AddressKind::Beneficiary { authority } => pda::beneficiary_address(&program, &authority)?,
    };
    info!(%address, bump, "derived address");
    Ok(json!({ "address": address, "bump": bump }))
}

fn decode_record<T: AccountLayout + Serialize>(data: &[u8], prefix: bool) -> Result<Value> {
    let record = if prefix {
        T::decode_prefix(data)?
    } else {
        T::decode(data)?
    };
    to_json(&record)
}

fn decode(args: DecodeArgs) -> Result<Value> {
    let data = args.input.read()?;
    debug!(len = data.len(), "decoding input");
    match args.record {
        RecordKind::Settings => decode_record::<Settings>(&data, args.prefix),
        RecordKind::Beneficiary => decode_record::<Beneficiary>(&data, args.prefix),
        RecordKind::Community => decode_record::<Community>(&data, args.prefix),
        RecordKind::Endpoint => decode_record::<Endpoint>(&data, args.prefix),
        RecordKind::Stake => decode_record::<Stake>(&data, args.prefix),
        RecordKind::Instruction => to_json(&StakingInstruction::unpack(&data)?),
    }
}

fn read_optional(hex: Option<&str>, file: Option<&PathBuf>) -> Result<Option<Vec<u8>>> {
    match (hex, file) {
        (Some(h), _) => decode_hex(h).map(Some),
        (None, Some(path)) => std::fs::read(path)
            .map(Some)
            .with_context(|| format!("reading {}", path.display())),
        (None, None) => Ok(None),
    }
}

fn project(args: ProjectArgs) -> Result<Value> {
    let settings_bytes = read_optional(args.settings.as_deref(), args.settings_file.as_ref())?
        .context("--settings or --settings-file is required")?;
    let settings = Settings::decode_prefix(&settings_bytes).context("decoding settings")?;
    let at = match args.at.as_deref() {
        Some(s) => parse_time(s)?,
        None => UnixTimestamp::now(),
    };

    let engine = RewardEngine::new();
    let schedule = engine.emission_schedule(&settings, at)?;
    let accumulator = engine.project_accumulator(&settings, at)?;
    info!(%at, accumulator, "projected accumulator");

    let mut output = json!({
        "at": at,
        "accumulator": accumulator.to_string(),
        "schedule": schedule,
    });

    let beneficiary = read_optional(args.beneficiary.as_deref(), args.beneficiary_file.as_ref())?;
    if let Some(bytes) = beneficiary {
        let beneficiary = Beneficiary::decode_prefix(&bytes).context("decoding beneficiary")?;
        let preview = engine.preview_harvest(&settings, &beneficiary, at)?;
        output["harvest"] = json!({
            "authority": beneficiary.authority,
            "harvestable": preview.harvestable.to_string(),
            "holding": preview.holding,
            "claimable": preview.claimable().to_string(),
        });
    }
    Ok(output)
}

fn build(config: &ClientConfig, op: BuildOp) -> Result<Value> {
    let builder = InstructionBuilder::new(config.require_program_id()?);
    let ix = match op {
        BuildOp::Initialize {
            funder,
            mint,
            fee_recipient,
            start_time,
            unbonding_duration,
        } => {
            let start = parse_time(&start_time)?;
            builder.initialize(&funder, &mint, &fee_recipient, start, unbonding_duration)?
        }
        BuildOp::RegisterCommunity {
            funder,
            owner,
            community,
            primary,
            secondary,
        } => builder.register_community(&funder, &owner, &community, &primary, secondary.as_ref()),
        BuildOp::InitializeStake {
            funder,
            owner,
            community,
        } => builder.initialize_stake(&funder, &owner, &community)?,
        BuildOp::Stake {
            funder,
            staker,
            token_account,
            community,
            primary,
            secondary,
            fee_recipient,
            amount,
        } => {
            let accounts = StakeAccounts {
                funder,
                staker,
                staker_token_account: token_account,
                community,
                primary,
                secondary: secondary.unwrap_or(Address::ZERO),
                fee_recipient,
            };
            builder.stake(&accounts, amount)?
        }
        BuildOp::WithdrawUnbond {
            funder,
            staker,
            token_account,
            community,
        } => builder.withdraw_unbond(&funder, &staker, &token_account, &community)?,
        BuildOp::Claim {
            role,
            funder,
            authority,
            token_account,
            community,
        } => builder.claim(role.into(), &funder, &authority, &token_account, &community)?,
    };
    info!(accounts = ix.accounts.len(), "built instruction");
    to_json(&ix)
}

fn explain_error(input: &str) -> Result<Value> {
    let trimmed = input.trim();
    let code = if let Some(hex) = trimmed.strip_prefix("0x") {
        Some(u32::from_str_radix(hex, 16).context("invalid hex error code")?)
    } else if let Ok(n) = trimmed.parse::<u32>() {
        Some(n)
    } else {
        extract_error_code(trimmed)
    };

    let Some(code) = code else {
        return Ok(json!({ "code": Value::Null, "name": Value::Null, "message": trimmed }));
    };
    let name = ProgramErrorCode::from_code(code).map(ProgramErrorCode::name);
    let message = if trimmed.contains("custom program error") {
        describe_message(trimmed)
    } else {
        format!("STAKING-ERROR {code:#x}: {}", name.unwrap_or("Unknown"))
    };
    Ok(json!({ "code": code, "name": name, "message": message }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_time_accepts_both_forms() {
        assert_eq!(parse_time("1625215551").unwrap(), UnixTimestamp(1_625_215_551));
        assert_eq!(
            parse_time("2021-07-02T08:45:51.900Z").unwrap(),
            UnixTimestamp(1_625_215_551)
        );
        assert!(parse_time("1969-12-31T23:59:59Z").is_err());
    }

    #[test]
    fn decode_hex_strips_prefix() {
        assert_eq!(decode_hex("0x03ab").unwrap(), vec![3, 0xab]);
        assert!(decode_hex("zz").is_err());
    }

    #[test]
    fn explain_hex_code() {
        let v = explain_error("0x0").unwrap();
        assert_eq!(v["code"], 0);
        assert_eq!(v["name"], "MissingAuthoritySignature");
        assert_eq!(v["message"], "STAKING-ERROR 0x0: MissingAuthoritySignature");
    }

    #[test]
    fn explain_message() {
        let v = explain_error("Error processing Instruction 1: custom program error: 0x1a").unwrap();
        assert_eq!(v["code"], 26);
        assert_eq!(v["name"], "StakerMinimumBalanceNotMet");
    }

    #[test]
    fn explain_without_code() {
        let v = explain_error("blockhash not found").unwrap();
        assert!(v["code"].is_null());
    }

    #[test]
    fn decode_instruction_payload() {
        let args = DecodeArgs {
            record: RecordKind::Instruction,
            input: BytesInput {
                hex: Some("033930000000000000".into()),
                file: None,
            },
            prefix: false,
        };
        let v = decode(args).unwrap();
        assert_eq!(v["op"], "stake");
        assert_eq!(v["amount"], 12345);
    }

    #[test]
    fn decode_record_from_file_with_slack() {
        let stake = Stake {
            creation_date: UnixTimestamp(1_628_493_518),
            total_stake: 999_500,
            ..Stake::default()
        };
        let mut bytes = stake.encode();
        bytes.extend_from_slice(&[0u8; 8]);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stake.bin");
        std::fs::write(&path, &bytes).unwrap();

        let args = |prefix| DecodeArgs {
            record: RecordKind::Stake,
            input: BytesInput {
                hex: None,
                file: Some(path.clone()),
            },
            prefix,
        };
        assert!(decode(args(false)).is_err());
        let v = decode(args(true)).unwrap();
        assert_eq!(v["total_stake"], 999_500);
    }

    #[test]
    fn decode_settings_with_wide_accumulator() {
        let settings = Settings {
            reward_per_share: u128::MAX,
            total_staked: 1_283_747,
            ..Settings::default()
        };
        let args = DecodeArgs {
            record: RecordKind::Settings,
            input: BytesInput {
                hex: Some(hex::encode(settings.encode())),
                file: None,
            },
            prefix: false,
        };
        let v = decode(args).unwrap();
        assert_eq!(v["reward_per_share"], u128::MAX.to_string());
        assert_eq!(v["total_staked"], 1_283_747);
    }

    #[test]
    fn project_without_settings_fails() {
        let args = ProjectArgs {
            settings: None,
            settings_file: None,
            beneficiary: None,
            beneficiary_file: None,
            at: Some("1635315080".into()),
        };
        assert!(project(args).is_err());
    }
}
