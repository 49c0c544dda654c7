use clap::{arg, error::ErrorKind, Arg, ArgMatches, Command};
use hdkeys_bip32::{DerivationPath, Prefix};
use std::{ffi::OsString, fmt, str::FromStr};
use zeroize::Zeroizing;

/// Network whose version prefixes are used to encode derived keys.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Network {
    #[default]
    Mainnet,
    Testnet,
}

impl Network {
    pub fn private_prefix(self) -> Prefix {
        match self {
            Network::Mainnet => Prefix::XPRV,
            Network::Testnet => Prefix::TPRV,
        }
    }

    pub fn public_prefix(self) -> Prefix {
        match self {
            Network::Mainnet => Prefix::XPUB,
            Network::Testnet => Prefix::TPUB,
        }
    }
}

impl FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mainnet" => Ok(Network::Mainnet),
            "testnet" => Ok(Network::Testnet),
            _ => Err(format!("unknown network `{s}` (expected `mainnet` or `testnet`)")),
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Network::Mainnet => f.write_str("mainnet"),
            Network::Testnet => f.write_str("testnet"),
        }
    }
}

pub enum Action {
    /// Derive the node at `path` below the root built from `seed`.
    Derive { seed: Zeroizing<Vec<u8>>, path: DerivationPath, public: bool },
    /// Decode a Base58 extended key and list its fields.
    Inspect { key: Zeroizing<String> },
    /// Print the extended public key matching an extended private key.
    Neuter { key: Zeroizing<String> },
}

pub struct Args {
    /// Filter expression from `--loglevel` or `HDKEYS_LOG_LEVEL`, if given.
    pub log_level: Option<String>,
    pub network: Network,
    pub action: Action,
}

pub fn cli() -> Command {
    Command::new("hdkeys")
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("log_level")
                .short('d')
                .long("loglevel")
                .env("HDKEYS_LOG_LEVEL")
                .value_name("LEVEL")
                .require_equals(true)
                .global(true)
                .help("Logging level {off, error, warn, info, debug, trace}, applied over RUST_LOG\n-- You may also specify <module>=<level>,<module2>=<level>,... to set the log level for individual modules."),
        )
        .arg(
            Arg::new("network")
                .long("network")
                .env("HDKEYS_NETWORK")
                .value_name("NETWORK")
                .default_value("mainnet")
                .global(true)
                .value_parser(clap::value_parser!(Network))
                .help("Network whose key prefixes are used {mainnet, testnet}"),
        )
        .subcommand(
            Command::new("derive")
                .about("Derive an extended key from a seed along a derivation path")
                .arg(Arg::new("seed").long("seed").value_name("HEX").required(true).help("Seed bytes in hex (at least 16 bytes)"))
                .arg(
                    Arg::new("path")
                        .long("path")
                        .value_name("PATH")
                        .default_value("m")
                        .value_parser(clap::value_parser!(DerivationPath))
                        .help("Derivation path, e.g. m/44'/0'/0'/0"),
                )
                .arg(arg!(--public "Only print the public half of the derived key"))
                .arg(arg!(--testnet "Use the test network prefixes (tprv/tpub)")),
        )
        .subcommand(Command::new("inspect").about("Decode an extended key and print its fields").arg(arg!(<KEY> "Base58 extended key")))
        .subcommand(
            Command::new("neuter")
                .about("Print the extended public key of an extended private key")
                .arg(arg!(<KEY> "Base58 extended private key")),
        )
}

pub fn parse_args() -> Args {
    match Args::parse(std::env::args_os()) {
        Ok(args) => args,
        Err(err) => err.exit(),
    }
}

impl Args {
    pub fn parse<I, T>(itr: I) -> Result<Args, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let m: ArgMatches = cli().try_get_matches_from(itr)?;

        let log_level = m.get_one::<String>("log_level").cloned();
        let mut network = m.get_one::<Network>("network").copied().unwrap_or_default();

        let action = match m.subcommand() {
            Some(("derive", sub)) => {
                if sub.get_flag("testnet") {
                    network = Network::Testnet;
                }
                Action::Derive {
                    seed: parse_seed(required::<String>(sub, "seed")?)?,
                    path: sub.get_one::<DerivationPath>("path").cloned().unwrap_or_default(),
                    public: sub.get_flag("public"),
                }
            }
            Some(("inspect", sub)) => Action::Inspect { key: Zeroizing::new(required::<String>(sub, "KEY")?.clone()) },
            Some(("neuter", sub)) => Action::Neuter { key: Zeroizing::new(required::<String>(sub, "KEY")?.clone()) },
            _ => return Err(clap::Error::raw(ErrorKind::MissingSubcommand, "a command is required\n")),
        };

        Ok(Args { log_level, network, action })
    }
}

fn required<'a, T: Clone + Send + Sync + 'static>(m: &'a ArgMatches, arg_id: &str) -> Result<&'a T, clap::Error> {
    m.get_one::<T>(arg_id)
        .ok_or_else(|| clap::Error::raw(ErrorKind::MissingRequiredArgument, format!("missing required argument `{arg_id}`\n")))
}

fn parse_seed(hex: &str) -> Result<Zeroizing<Vec<u8>>, clap::Error> {
    let hex = hex.strip_prefix("0x").unwrap_or(hex);
    if hex.len() % 2 != 0 {
        return Err(clap::Error::raw(ErrorKind::ValueValidation, "seed hex must have an even number of digits\n"));
    }

    let mut seed = Zeroizing::new(vec![0u8; hex.len() / 2]);
    faster_hex::hex_decode(hex.as_bytes(), &mut seed)
        .map_err(|err| clap::Error::raw(ErrorKind::ValueValidation, format!("failed parsing seed, reason: {err}\n")))?;
    Ok(seed)
}
