//! Tree nodes carrying either a full or a public-only extended key.

use crate::{
    ChainCode, ChildNumber, DerivationPath, Depth, Error, ExtendedKey, ExtendedKeyAttrs, KeyFingerprint, Prefix, PrivateKey,
    PrivateKeyBytes, PublicKey, PublicKeyBytes, Result, XPrv, XPub,
};
use core::ops::Range;
use core::str::FromStr;
use rayon::prelude::*;
use zeroize::Zeroizing;

/// Key material of a node: fixed at construction.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum NodeKey {
    /// Full node: private and public key.
    WithPrivate(XPrv),
    /// Neutered node: public key only.
    PublicOnly(XPub),
}

/// One immutable position of a BIP32 key tree.
///
/// Every derivation returns a new node. Equality ignores [`path`](Self::path),
/// which is informational only.
#[derive(Clone, Debug)]
pub struct ExtendedKeyNode {
    key: NodeKey,
    path: Option<DerivationPath>,
}

impl ExtendedKeyNode {
    /// Build the root node (`m`) of the tree grown from `seed` (at least 16 bytes).
    pub fn from_seed<S: AsRef<[u8]>>(seed: S) -> Result<Self> {
        Ok(Self { key: NodeKey::WithPrivate(XPrv::new(seed)?), path: Some(DerivationPath::root()) })
    }

    /// Decode a node from its interchange representation.
    ///
    /// The path of a node deeper than the root cannot be recovered and is
    /// left empty.
    pub fn from_extended_key(extended_key: ExtendedKey) -> Result<Self> {
        let key = if extended_key.is_private() {
            NodeKey::WithPrivate(extended_key.try_into()?)
        } else {
            NodeKey::PublicOnly(extended_key.try_into()?)
        };
        Ok(key.into())
    }

    /// Decode a node from the 82-byte binary layout.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::from_extended_key(ExtendedKey::from_bytes(bytes)?)
    }

    pub fn key(&self) -> &NodeKey {
        &self.key
    }

    pub fn has_private_key(&self) -> bool {
        matches!(self.key, NodeKey::WithPrivate(_))
    }

    /// Full extended private key, if this node carries one.
    pub fn as_private(&self) -> Option<&XPrv> {
        match &self.key {
            NodeKey::WithPrivate(xprv) => Some(xprv),
            NodeKey::PublicOnly(_) => None,
        }
    }

    /// Extended public key of this node.
    pub fn as_public(&self) -> XPub {
        match &self.key {
            NodeKey::WithPrivate(xprv) => xprv.public_key(),
            NodeKey::PublicOnly(xpub) => xpub.clone(),
        }
    }

    /// SEC1-compressed public key.
    pub fn public_key(&self) -> PublicKeyBytes {
        match &self.key {
            NodeKey::WithPrivate(xprv) => PrivateKey::public_key(xprv.private_key()).to_bytes(),
            NodeKey::PublicOnly(xpub) => xpub.to_bytes(),
        }
    }

    /// Raw 32-byte big-endian private scalar, as consumed by signers.
    pub fn private_key(&self) -> Option<Zeroizing<PrivateKeyBytes>> {
        self.as_private().map(|xprv| Zeroizing::new(xprv.to_bytes()))
    }

    pub fn attrs(&self) -> &ExtendedKeyAttrs {
        key_attrs(&self.key)
    }

    pub fn chain_code(&self) -> &ChainCode {
        &self.attrs().chain_code
    }

    pub fn depth(&self) -> Depth {
        self.attrs().depth
    }

    pub fn parent_fingerprint(&self) -> KeyFingerprint {
        self.attrs().parent_fingerprint
    }

    /// Raw child number as stored in the binary layout.
    pub fn child_number(&self) -> ChildNumber {
        self.attrs().child_number
    }

    /// Child index without the hardened bit.
    pub fn index(&self) -> u32 {
        self.child_number().index()
    }

    pub fn is_hardened(&self) -> bool {
        self.child_number().is_hardened()
    }

    /// Derivation path from the root, when known.
    pub fn path(&self) -> Option<&DerivationPath> {
        self.path.as_ref()
    }

    /// `RIPEMD160(SHA256(public_key))[..4]`, the parent fingerprint of this
    /// node's children.
    pub fn fingerprint(&self) -> KeyFingerprint {
        match &self.key {
            NodeKey::WithPrivate(xprv) => xprv.fingerprint(),
            NodeKey::PublicOnly(xpub) => xpub.fingerprint(),
        }
    }

    /// Public-only sibling with the same attributes and path.
    pub fn neuter(&self) -> Self {
        Self { key: NodeKey::PublicOnly(self.as_public()), path: self.path.clone() }
    }

    /// Derive the child at `index`.
    ///
    /// `private` selects private-preserving derivation and requires a full
    /// node; otherwise the child is public-only and `hardened` must be unset.
    /// An `index` that already carries the hardened bit is hardened. The
    /// child's path records the requested index even when an invalid
    /// candidate forced the stored child number forward.
    pub fn derive_child(&self, index: u32, hardened: bool, private: bool) -> Result<Self> {
        let child_number = ChildNumber::new(index, hardened);

        let key = match (&self.key, private) {
            (NodeKey::WithPrivate(xprv), true) => NodeKey::WithPrivate(xprv.derive_child(child_number)?),
            (NodeKey::WithPrivate(xprv), false) => NodeKey::PublicOnly(xprv.public_key().derive_child(child_number)?),
            (NodeKey::PublicOnly(_), true) if child_number.is_hardened() => return Err(Error::HardenedPublicDerivation),
            (NodeKey::PublicOnly(_), true) => return Err(Error::PrivateKeyUnavailable),
            (NodeKey::PublicOnly(xpub), false) => NodeKey::PublicOnly(xpub.derive_child(child_number)?),
        };

        Ok(Self { key, path: self.path.as_ref().map(|path| path.child(child_number)) })
    }

    /// Derive the node at `path` (e.g. `m/44'/60'/0'/0`) below this one.
    pub fn derive_path(&self, path: &str, private: bool) -> Result<Self> {
        self.derive_path_with(&path.parse::<DerivationPath>()?, private)
    }

    /// Derive every step of `path`; any failing step fails the whole call.
    pub fn derive_path_with(&self, path: &DerivationPath, private: bool) -> Result<Self> {
        path.iter().try_fold(self.clone(), |node, child_number| {
            node.derive_child(child_number.index(), child_number.is_hardened(), private)
        })
    }

    /// Derive the siblings with indices in `indexes` in parallel.
    pub fn derive_range(&self, indexes: Range<u32>, hardened: bool, private: bool) -> Result<Vec<Self>> {
        indexes.into_par_iter().map(|index| self.derive_child(index, hardened, private)).collect()
    }

    /// Encode under `prefix`. A private prefix requires a full node.
    pub fn to_extended_key(&self, prefix: Prefix) -> Result<ExtendedKey> {
        if prefix.is_private() {
            let xprv = self.as_private().ok_or(Error::PrivateKeyUnavailable)?;
            Ok(xprv.to_extended_key(prefix))
        } else {
            Ok(self.as_public().to_extended_key(prefix))
        }
    }

    /// 82-byte binary layout under `prefix`.
    pub fn to_bytes(&self, prefix: Prefix) -> Result<Zeroizing<[u8; ExtendedKey::BYTE_SIZE]>> {
        Ok(self.to_extended_key(prefix)?.to_bytes())
    }

    /// Base58 text form under `prefix`.
    pub fn to_string(&self, prefix: Prefix) -> Result<Zeroizing<String>> {
        Ok(Zeroizing::new(self.to_extended_key(prefix)?.to_string()))
    }
}

fn key_attrs(key: &NodeKey) -> &ExtendedKeyAttrs {
    match key {
        NodeKey::WithPrivate(xprv) => xprv.attrs(),
        NodeKey::PublicOnly(xpub) => xpub.attrs(),
    }
}

impl From<NodeKey> for ExtendedKeyNode {
    fn from(key: NodeKey) -> Self {
        let path = (key_attrs(&key).depth == 0).then(DerivationPath::root);
        Self { key, path }
    }
}

impl From<XPrv> for ExtendedKeyNode {
    fn from(xprv: XPrv) -> Self {
        NodeKey::WithPrivate(xprv).into()
    }
}

impl From<XPub> for ExtendedKeyNode {
    fn from(xpub: XPub) -> Self {
        NodeKey::PublicOnly(xpub).into()
    }
}

impl PartialEq for ExtendedKeyNode {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for ExtendedKeyNode {}

impl FromStr for ExtendedKeyNode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_extended_key(ExtendedKey::from_str(s)?)
    }
}

#[cfg(test)]
mod tests {
    use super::ExtendedKeyNode;
    use crate::{ChildNumber, DerivationPath, Error, ExtendedKey, Prefix};
    use faster_hex::{hex_decode_fallback, hex_string};

    macro_rules! hex {
        ($str: literal) => {{
            let len = $str.as_bytes().len() / 2;
            let mut dst = vec![0; len];
            hex_decode_fallback($str.as_bytes(), &mut dst);
            dst
        }};
    }

    fn vector_1() -> ExtendedKeyNode {
        ExtendedKeyNode::from_seed(hex!("000102030405060708090a0b0c0d0e0f")).unwrap()
    }

    #[test]
    fn root_node() {
        let root = vector_1();
        assert!(root.has_private_key());
        assert_eq!(root.depth(), 0);
        assert_eq!(root.child_number(), ChildNumber(0));
        assert_eq!(root.parent_fingerprint(), [0; 4]);
        assert_eq!(root.path().unwrap().to_string(), "m");
        assert_eq!(hex_string(&root.fingerprint()), "3442193e");
    }

    #[test]
    fn bip32_test_vector_1_first_hardened_child() {
        let child = vector_1().derive_child(0, true, true).unwrap();

        assert_eq!(hex_string(child.chain_code()), "47fdacbd0f1097043b78c63c20c34ef4ed9a111d980047ad16282c7ae6236141");
        assert_eq!(
            hex_string(child.private_key().unwrap().as_ref()),
            "edb2e14f9ee77d26dd93b4ecede8d16ed408ce149b6cd80b0715a2d911a0afea"
        );
        assert_eq!(hex_string(&child.public_key()), "035a784662a4a20a65bf6aab9ae98a6c068a81c52e4b032c0fb5400c706cfccc56");
        assert_eq!(child.depth(), 1);
        assert_eq!(hex_string(&child.parent_fingerprint()), "3442193e");
        assert_eq!(child.child_number(), ChildNumber(0x8000_0000));
        assert_eq!(child.index(), 0);
        assert!(child.is_hardened());
        assert_eq!(child.path().unwrap().to_string(), "m/0'");
    }

    #[test]
    fn hardened_bit_in_index_means_hardened() {
        let root = vector_1();
        assert_eq!(root.derive_child(0x8000_0000, false, true).unwrap(), root.derive_child(0, true, true).unwrap());

        let child = root.derive_child(0x8000_0005, false, true).unwrap();
        assert_eq!(child.index(), 5);
        assert_eq!(child.path().unwrap().to_string(), "m/5'");
        assert_eq!(child.path().unwrap().iter().last(), Some(child.child_number()));
    }

    #[test]
    fn private_and_public_round_trip() {
        let node = vector_1().derive_path("m/0'/1/2'", true).unwrap();

        let xprv = node.to_bytes(Prefix::XPRV).unwrap();
        let decoded = ExtendedKeyNode::from_bytes(xprv.as_ref()).unwrap();
        assert_eq!(decoded, node);
        assert_eq!(decoded.to_bytes(Prefix::XPRV).unwrap(), xprv);
        assert_eq!(decoded.path(), None);

        let xpub = node.to_bytes(Prefix::XPUB).unwrap();
        let decoded = ExtendedKeyNode::from_bytes(xpub.as_ref()).unwrap();
        assert!(!decoded.has_private_key());
        assert_eq!(decoded, node.neuter());
        assert_eq!(decoded.to_bytes(Prefix::XPUB).unwrap(), xpub);

        let text = node.to_string(Prefix::XPRV).unwrap();
        assert_eq!(text.parse::<ExtendedKeyNode>().unwrap(), node);
    }

    #[test]
    fn root_keeps_its_path_after_decoding() {
        let text = vector_1().to_string(Prefix::TPUB).unwrap();
        assert!(text.starts_with("tpub"));
        let decoded = text.parse::<ExtendedKeyNode>().unwrap();
        assert_eq!(decoded.path(), Some(&DerivationPath::root()));
    }

    #[test]
    fn private_prefix_needs_private_key() {
        let neutered = vector_1().neuter();
        assert_eq!(neutered.to_string(Prefix::XPRV).unwrap_err(), Error::PrivateKeyUnavailable);
        assert_eq!(neutered.private_key(), None);
        assert!(neutered.as_private().is_none());
    }

    #[test]
    fn determinism() {
        for _ in 0..8 {
            let seed = rand::random::<[u8; 32]>();
            let a = ExtendedKeyNode::from_seed(seed).unwrap().derive_path("m/44'/0'/0'/0/5", true).unwrap();
            let b = ExtendedKeyNode::from_seed(seed).unwrap().derive_path("m/44'/0'/0'/0/5", true).unwrap();
            assert_eq!(a, b);
            assert_eq!(a.to_bytes(Prefix::XPRV).unwrap(), b.to_bytes(Prefix::XPRV).unwrap());
        }
    }

    #[test]
    fn hardened_from_public_always_fails() {
        let root = vector_1();
        let neutered = root.neuter();

        for index in [0, 1, 0x7fff_ffff] {
            assert_eq!(neutered.derive_child(index, true, false), Err(Error::HardenedPublicDerivation));
            assert_eq!(neutered.derive_child(index, true, true), Err(Error::HardenedPublicDerivation));
            assert_eq!(root.derive_child(index, true, false), Err(Error::HardenedPublicDerivation));
        }
        assert_eq!(neutered.derive_child(0x8000_0005, false, false), Err(Error::HardenedPublicDerivation));
        assert_eq!(neutered.derive_path("m/0/1'", false), Err(Error::HardenedPublicDerivation));
    }

    #[test]
    fn private_derivation_needs_private_key() {
        assert_eq!(vector_1().neuter().derive_child(0, false, true), Err(Error::PrivateKeyUnavailable));
    }

    #[test]
    fn public_private_consistency() {
        for _ in 0..4 {
            let node = ExtendedKeyNode::from_seed(rand::random::<[u8; 32]>()).unwrap();
            for index in [0, 1, 42, 0x7fff_ffff] {
                let private_child = node.derive_child(index, false, true).unwrap();
                let public_child = node.neuter().derive_child(index, false, false).unwrap();
                assert_eq!(private_child.public_key(), public_child.public_key());
                assert_eq!(private_child.chain_code(), public_child.chain_code());
                assert_eq!(private_child.neuter(), public_child);
                assert_eq!(node.derive_child(index, false, false).unwrap(), public_child);
            }
        }
    }

    #[test]
    fn depth_ceiling() {
        let mut node = vector_1().neuter();
        for _ in 0..255 {
            node = node.derive_child(0, false, false).unwrap();
        }
        assert_eq!(node.depth(), 255);
        assert_eq!(node.path().unwrap().len(), 255);
        assert_eq!(node.derive_child(0, false, false), Err(Error::DepthOverflow));

        let decoded = ExtendedKeyNode::from_bytes(node.to_bytes(Prefix::XPUB).unwrap().as_ref()).unwrap();
        assert_eq!(decoded.depth(), 255);
    }

    #[test]
    fn checksum_tamper() {
        let bytes = vector_1().to_bytes(Prefix::XPRV).unwrap();
        for offset in ExtendedKey::PAYLOAD_SIZE..ExtendedKey::BYTE_SIZE {
            let mut tampered = *bytes;
            tampered[offset] = tampered[offset].wrapping_add(1);
            assert_eq!(ExtendedKeyNode::from_bytes(&tampered), Err(Error::ChecksumMismatch));
        }
    }

    #[test]
    fn path_equivalence() {
        let root = vector_1();
        let one_shot = root.derive_path("m/44'/60'/0'/0", true).unwrap();
        let stepwise = root
            .derive_child(44, true, true)
            .and_then(|node| node.derive_child(60, true, true))
            .and_then(|node| node.derive_child(0, true, true))
            .and_then(|node| node.derive_child(0, false, true))
            .unwrap();

        assert_eq!(one_shot, stepwise);
        assert_eq!(one_shot.path(), stepwise.path());
        assert_eq!(one_shot.path().unwrap().to_string(), "m/44'/60'/0'/0");
        assert_eq!(root.derive_path("44h/60h/0h/0", true).unwrap(), one_shot);
    }

    #[test]
    fn invalid_path_aborts() {
        let root = vector_1();
        for path in ["m/x", "m//1", "m/2147483648", "m/0/"] {
            assert!(matches!(root.derive_path(path, true), Err(Error::InvalidPath(_))), "{path}");
        }
    }

    #[test]
    fn range_matches_single_steps() {
        let account = vector_1().derive_path("m/44'/0'/0'", true).unwrap();
        let external = account.derive_child(0, false, true).unwrap();

        let addresses = external.neuter().derive_range(0..10, false, false).unwrap();
        assert_eq!(addresses.len(), 10);
        for (index, address) in addresses.iter().enumerate() {
            assert_eq!(address, &external.derive_child(index as u32, false, false).unwrap());
            assert_eq!(address.path().unwrap().to_string(), format!("m/44'/0'/0'/0/{index}"));
        }

        assert_eq!(external.neuter().derive_range(0..3, true, false), Err(Error::HardenedPublicDerivation));
    }

    #[test]
    fn invalid_seed() {
        assert_eq!(ExtendedKeyNode::from_seed([0u8; 15]), Err(Error::InvalidSeed));
    }

    #[test]
    fn long_seed() {
        let node = ExtendedKeyNode::from_seed([7u8; 65]).unwrap();
        assert_eq!(node.depth(), 0);
        assert_ne!(node, ExtendedKeyNode::from_seed([7u8; 64]).unwrap());
    }
}
