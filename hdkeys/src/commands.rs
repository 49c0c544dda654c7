use crate::args::{Action, Args, Network};
use crate::error::Error;
use crate::report::Report;
use crate::result::Result;
use faster_hex::hex_string;
use hdkeys_bip32::{DerivationPath, ExtendedKey, ExtendedKeyNode, Prefix};
use log::{debug, info};

pub fn run(args: &Args) -> Result<Report> {
    match &args.action {
        Action::Derive { seed, path, public } => derive(seed, path, *public, args.network),
        Action::Inspect { key } => inspect(key),
        Action::Neuter { key } => neuter(key),
    }
}

/// Derive the node at `path` from `seed`. With `public` only the public
/// half of the derived node is reported.
pub fn derive(seed: &[u8], path: &DerivationPath, public: bool, network: Network) -> Result<Report> {
    debug!("deriving {path} for {network}");

    let node = ExtendedKeyNode::from_seed(seed)?.derive_path_with(path, true)?;
    let node = if public { node.neuter() } else { node };

    info!("derived {path} at depth {}", node.depth());
    describe(&node, Some(network.private_prefix()), Some(network.public_prefix()))
}

pub fn inspect(key: &str) -> Result<Report> {
    let extended_key = key.trim().parse::<ExtendedKey>()?;
    let version = extended_key.version;
    let prefix = extended_key.prefix();
    let node = ExtendedKeyNode::from_extended_key(extended_key)?;

    let mut report = Report::new();
    match prefix {
        Some(prefix) => report.push("version", format!("{version:#010x} ({prefix})")),
        None => report.push("version", format!("{version:#010x} (unknown)")),
    };
    report.push("type", if node.has_private_key() { "private" } else { "public" });

    let private_prefix = prefix.filter(|prefix| prefix.is_private());
    let public_prefix = prefix.and_then(Prefix::public_counterpart);
    report.append(describe(&node, private_prefix, public_prefix)?);
    Ok(report)
}

pub fn neuter(key: &str) -> Result<Report> {
    let extended_key = key.trim().parse::<ExtendedKey>()?;
    let prefix = extended_key.prefix();
    let node = ExtendedKeyNode::from_extended_key(extended_key)?;

    if !node.has_private_key() {
        return Err(Error::custom("expected an extended private key"));
    }
    let public_prefix = prefix
        .and_then(Prefix::public_counterpart)
        .ok_or_else(|| Error::custom("no public prefix is known for this key's version"))?;

    let mut report = Report::new();
    report.push(public_prefix.as_str(), node.neuter().to_string(public_prefix)?.as_str());
    Ok(report)
}

fn describe(node: &ExtendedKeyNode, private_prefix: Option<Prefix>, public_prefix: Option<Prefix>) -> Result<Report> {
    let mut report = Report::new();

    report.push("path", node.path().map(DerivationPath::to_string).unwrap_or_else(|| "unknown".to_string()));
    if let Some(prefix) = private_prefix.filter(|_| node.has_private_key()) {
        report.push(prefix.as_str(), node.to_string(prefix)?.as_str());
    }
    if let Some(prefix) = public_prefix {
        report.push(prefix.as_str(), node.to_string(prefix)?.as_str());
    }
    if let Some(private_key) = node.private_key() {
        report.push("private key", hex_string(private_key.as_ref()));
    }
    report
        .push("public key", hex_string(&node.public_key()))
        .push("chain code", hex_string(node.chain_code()))
        .push("fingerprint", hex_string(&node.fingerprint()))
        .push("parent fingerprint", hex_string(&node.parent_fingerprint()))
        .push("depth", node.depth().to_string())
        .push("child number", format!("{} ({:#010x})", node.child_number(), node.child_number().0));

    Ok(report)
}
