//! Passport CLI: keys, offline consents and scenario simulation.

mod scenario;

use anyhow::{bail, Context};
use clap::Parser;
use passport_crypto::{
    derive_address, generate_keypair, keypair_from_seed, sign_consent, Consent, ConsentKind,
};
use passport_engine::PassportConfig;
use passport_types::{Address, BlockNumber};
use passport_utils::LogFormat;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "passport", about = "Passport personhood ledger tools")]
struct Cli {
    /// Log level: "trace", "debug", "info", "warn", "error".
    /// Defaults to the config file's value.
    #[arg(long, env = "PASSPORT_LOG_LEVEL")]
    log_level: Option<String>,

    /// Log format: "human" or "json".
    #[arg(long, env = "PASSPORT_LOG_FORMAT")]
    log_format: Option<LogFormat>,

    /// Path to a TOML configuration file. CLI flags and env vars override it.
    #[arg(long, env = "PASSPORT_CONFIG")]
    config: Option<PathBuf>,

    /// Subcommand.
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    /// Generate a key pair and print its address.
    Keygen {
        /// 32-byte seed as hex; random when omitted.
        #[arg(long)]
        seed: Option<String>,
    },

    /// Sign an offline link or delegation consent.
    SignConsent {
        #[arg(long, value_enum)]
        kind: KindArg,
        /// Signer's 32-byte seed as hex.
        #[arg(long)]
        seed: String,
        /// The passport (link) or delegatee (delegation).
        #[arg(long)]
        counterparty: String,
        /// The signer's current consent nonce.
        #[arg(long, default_value_t = 0)]
        nonce: u64,
        /// Last block at which the consent is valid.
        #[arg(long)]
        deadline: u64,
    },

    /// Run a JSON scenario against an in-memory ledger.
    Simulate {
        /// Path to the scenario file.
        scenario: PathBuf,
    },

    /// Print the default configuration as TOML.
    DefaultConfig,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum KindArg {
    Link,
    Delegation,
}

impl From<KindArg> for ConsentKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Link => ConsentKind::LinkEntity,
            KindArg::Delegation => ConsentKind::Delegation,
        }
    }
}

pub(crate) fn parse_seed(hex_seed: &str) -> anyhow::Result<[u8; 32]> {
    let bytes = hex::decode(hex_seed.trim_start_matches("0x")).context("seed is not hex")?;
    let Ok(seed) = <[u8; 32]>::try_from(bytes.as_slice()) else {
        bail!("seed must be 32 bytes, got {}", bytes.len());
    };
    Ok(seed)
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<PassportConfig> {
    match path {
        Some(path) => PassportConfig::from_toml_file(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(PassportConfig::default()),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;

    let level = cli.log_level.clone().unwrap_or_else(|| config.log_level.clone());
    let format = match cli.log_format {
        Some(format) => format,
        None => config
            .log_format
            .parse::<LogFormat>()
            .map_err(anyhow::Error::msg)?,
    };
    passport_utils::init_tracing(&level, format);

    match cli.command {
        Command::Keygen { seed } => {
            let kp = match seed {
                Some(seed) => keypair_from_seed(&parse_seed(&seed)?),
                None => generate_keypair(),
            };
            println!("address:     {}", derive_address(&kp.public));
            println!("public key:  {}", hex::encode(kp.public.as_bytes()));
            println!("private key: {}", hex::encode(kp.private.0));
        }
        Command::SignConsent {
            kind,
            seed,
            counterparty,
            nonce,
            deadline,
        } => {
            let kp = keypair_from_seed(&parse_seed(&seed)?);
            let counterparty = Address::parse(&counterparty)?;
            let consent = Consent {
                kind: kind.into(),
                signer: derive_address(&kp.public),
                counterparty,
                nonce,
                deadline: BlockNumber::new(deadline),
            };
            let signature = sign_consent(&consent, &config.domain, &kp.private);
            tracing::debug!(signer = %consent.signer, kind = ?consent.kind, "consent signed");
            println!("signer:    {}", consent.signer);
            println!("signature: {}", signature.to_hex());
        }
        Command::Simulate { scenario } => {
            let text = std::fs::read_to_string(&scenario)
                .with_context(|| format!("failed to read scenario {}", scenario.display()))?;
            let scenario: scenario::Scenario =
                serde_json::from_str(&text).context("invalid scenario JSON")?;
            for line in scenario::run(&config, scenario)? {
                println!("{line}");
            }
        }
        Command::DefaultConfig => {
            print!("{}", PassportConfig::default().to_toml_string()?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn seeds_must_be_32_hex_bytes() {
        assert_eq!(parse_seed(&"ab".repeat(32)).unwrap(), [0xab; 32]);
        assert_eq!(parse_seed(&format!("0x{}", "01".repeat(32))).unwrap(), [1; 32]);
        assert!(parse_seed("abcd").is_err());
        assert!(parse_seed("not hex").is_err());
    }

    #[test]
    fn config_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "genesis_block = 7\n\n[params]\nsignals_threshold = 4").unwrap();
        let config = load_config(Some(&file.path().to_path_buf())).unwrap();
        assert_eq!(config.genesis_block, 7);
        assert_eq!(config.params.signals_threshold, 4);
        assert_eq!(load_config(None).unwrap().genesis_block, 0);
    }
}
