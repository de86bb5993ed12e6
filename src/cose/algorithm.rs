//! Fixed COSE identifier tables: algorithms, key types and elliptic curves.
//!
//! See the IANA "COSE Algorithms" and "COSE Key Types" registries. Only the
//! subset needed to check credential signatures is listed.

use sha1::Sha1;
use sha2::{Digest, Sha256, Sha384, Sha512};

/// Algorithm assumed when a caller does not name one (ES256).
pub const DEFAULT_ALGORITHM: i64 = -7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HashAlgorithm {
    Sha1,
    Sha256,
    Sha384,
    Sha512,
}

impl HashAlgorithm {
    pub fn digest(self, data: &[u8]) -> Vec<u8> {
        match self {
            HashAlgorithm::Sha1 => Sha1::digest(data).to_vec(),
            HashAlgorithm::Sha256 => Sha256::digest(data).to_vec(),
            HashAlgorithm::Sha384 => Sha384::digest(data).to_vec(),
            HashAlgorithm::Sha512 => Sha512::digest(data).to_vec(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureScheme {
    Ecdsa,
    RsaPkcs1v15,
    RsaPss,
}

/// COSE `kty` values (label 1 in a COSE_Key).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyType {
    /// Octet key pair (Ed25519 / Ed448). Recognized but never decoded.
    Okp,
    Ec2,
    Rsa,
}

impl KeyType {
    pub fn from_cose(kty: i64) -> Option<Self> {
        match kty {
            1 => Some(KeyType::Okp),
            2 => Some(KeyType::Ec2),
            3 => Some(KeyType::Rsa),
            _ => None,
        }
    }
}

/// COSE `crv` values for EC2 keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EcCurve {
    P256,
    P384,
    P521,
}

impl EcCurve {
    pub fn from_cose(crv: i64) -> Option<Self> {
        match crv {
            1 => Some(EcCurve::P256),
            2 => Some(EcCurve::P384),
            3 => Some(EcCurve::P521),
            _ => None,
        }
    }

    pub fn cose_id(self) -> i64 {
        match self {
            EcCurve::P256 => 1,
            EcCurve::P384 => 2,
            EcCurve::P521 => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            EcCurve::P256 => "P-256",
            EcCurve::P384 => "P-384",
            EcCurve::P521 => "P-521",
        }
    }

    /// Length in bytes of one affine coordinate.
    pub fn coordinate_len(self) -> usize {
        match self {
            EcCurve::P256 => 32,
            EcCurve::P384 => 48,
            EcCurve::P521 => 66,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlgorithmDescriptor {
    pub id: i64,
    pub name: &'static str,
    pub scheme: SignatureScheme,
    pub hash: HashAlgorithm,
}

impl AlgorithmDescriptor {
    /// Key type a public key must have to be used with this algorithm.
    pub fn key_type(&self) -> KeyType {
        match self.scheme {
            SignatureScheme::Ecdsa => KeyType::Ec2,
            SignatureScheme::RsaPkcs1v15 | SignatureScheme::RsaPss => KeyType::Rsa,
        }
    }
}

const fn alg(
    id: i64,
    name: &'static str,
    scheme: SignatureScheme,
    hash: HashAlgorithm,
) -> AlgorithmDescriptor {
    AlgorithmDescriptor {
        id,
        name,
        scheme,
        hash,
    }
}

static ALGORITHMS: [AlgorithmDescriptor; 10] = [
    alg(-7, "ES256", SignatureScheme::Ecdsa, HashAlgorithm::Sha256),
    alg(-35, "ES384", SignatureScheme::Ecdsa, HashAlgorithm::Sha384),
    alg(-36, "ES512", SignatureScheme::Ecdsa, HashAlgorithm::Sha512),
    alg(-37, "PS256", SignatureScheme::RsaPss, HashAlgorithm::Sha256),
    alg(-38, "PS384", SignatureScheme::RsaPss, HashAlgorithm::Sha384),
    alg(-39, "PS512", SignatureScheme::RsaPss, HashAlgorithm::Sha512),
    alg(-257, "RS256", SignatureScheme::RsaPkcs1v15, HashAlgorithm::Sha256),
    alg(-258, "RS384", SignatureScheme::RsaPkcs1v15, HashAlgorithm::Sha384),
    alg(-259, "RS512", SignatureScheme::RsaPkcs1v15, HashAlgorithm::Sha512),
    // Legacy id still emitted by some TPM attestations.
    alg(-65535, "RS1", SignatureScheme::RsaPkcs1v15, HashAlgorithm::Sha1),
];

/// Look up a COSE algorithm id. `None` means unsupported.
pub fn describe(id: i64) -> Option<&'static AlgorithmDescriptor> {
    ALGORITHMS.iter().find(|a| a.id == id)
}
