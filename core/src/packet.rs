//! Packet payloads.
//!
//! Only the fields the editor actually reads or writes are modeled; this is
//! not a wire codec (see the crate's non-goals). Secret material is held in
//! [`zeroize::Zeroizing`] buffers so it is wiped on drop regardless of which
//! exit path a caller takes.

use crate::ids::{Fingerprint, KeyId};
use zeroize::Zeroizing;

/// Public-key algorithm identifiers the editor cares about for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublicKeyAlgorithm {
    Rsa,
    Dsa,
    Ecdsa,
    EdDsa,
    Ecdh,
}

/// Shared identifying fields for a primary key or subkey, public side.
#[derive(Debug, Clone)]
pub struct KeyMaterial {
    pub algo: PublicKeyAlgorithm,
    pub bits: u16,
    pub keyid: KeyId,
    pub fingerprint: Fingerprint,
    pub created: u64,
    pub expires: Option<u64>,
    pub local_id: LocalIdSlot,
}

/// The local-id field starts unset until the keyring store assigns one.
pub type LocalIdSlot = Option<crate::ids::LocalId>;

/// How a secret key's material is protected at rest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Protection {
    /// Not encrypted; usable as-is.
    None,
    /// Encrypted; the S2K parameters needed to derive the unlocking key.
    Protected {
        cipher: CipherAlgorithm,
        s2k: S2kParams,
    },
    /// A protection scheme this implementation does not support.
    Unsupported,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CipherAlgorithm {
    Aes128,
    Aes256,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S2kParams {
    pub digest: DigestAlgorithm,
    pub salt: [u8; 8],
    pub count: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DigestAlgorithm {
    Sha1,
    Sha256,
    Sha512,
}

/// Secret material, wiped on drop. `None` once the key has been "released".
#[derive(Debug, Clone)]
pub struct SecretMaterial {
    pub protection: Protection,
    /// Present only while unlocked; absent (and the protected bytes held
    /// elsewhere) while locked. Kept deliberately coarse since real key
    /// material handling is out of scope for this editor.
    pub unlocked: Option<Zeroizing<Vec<u8>>>,
}

#[derive(Debug, Clone)]
pub struct UserIdPacket {
    pub name: Vec<u8>,
}

/// Signature classes the editor distinguishes; other classes are folded
/// into `Other(raw)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigClass {
    CertGeneric,   // 0x10
    CertPersona,   // 0x11
    CertCasual,    // 0x12
    CertPositive,  // 0x13
    SubkeyBinding, // 0x18
    Other(u8),
}

impl SigClass {
    pub fn from_byte(b: u8) -> Self {
        match b {
            0x10 => SigClass::CertGeneric,
            0x11 => SigClass::CertPersona,
            0x12 => SigClass::CertCasual,
            0x13 => SigClass::CertPositive,
            0x18 => SigClass::SubkeyBinding,
            other => SigClass::Other(other),
        }
    }

    /// True for any of the four certification classes (0x10..0x13).
    pub fn is_certification(&self) -> bool {
        matches!(
            self,
            SigClass::CertGeneric | SigClass::CertPersona | SigClass::CertCasual | SigClass::CertPositive
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigCheckResult {
    Ok,
    Bad,
    NoKey,
    Other,
}

#[derive(Debug, Clone)]
pub struct SignaturePacket {
    pub signer: KeyId,
    pub created: u64,
    pub class: SigClass,
    /// Populated once this signature has been through the verification walk.
    pub checked: Option<SigCheckResult>,
}

/// The packet kinds the core recognizes.
#[derive(Debug, Clone)]
pub enum Packet {
    PublicKey(KeyMaterial),
    PublicSubkey(KeyMaterial),
    SecretKey(KeyMaterial, SecretMaterial),
    SecretSubkey(KeyMaterial, SecretMaterial),
    UserId(UserIdPacket),
    Signature(SignaturePacket),
}

impl Packet {
    pub fn as_user_id(&self) -> Option<&UserIdPacket> {
        match self {
            Packet::UserId(u) => Some(u),
            _ => None,
        }
    }

    pub fn as_signature(&self) -> Option<&SignaturePacket> {
        match self {
            Packet::Signature(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_signature_mut(&mut self) -> Option<&mut SignaturePacket> {
        match self {
            Packet::Signature(s) => Some(s),
            _ => None,
        }
    }

    pub fn key_material(&self) -> Option<&KeyMaterial> {
        match self {
            Packet::PublicKey(k) | Packet::PublicSubkey(k) => Some(k),
            Packet::SecretKey(k, _) | Packet::SecretSubkey(k, _) => Some(k),
            _ => None,
        }
    }

    pub fn key_material_mut(&mut self) -> Option<&mut KeyMaterial> {
        match self {
            Packet::PublicKey(k) | Packet::PublicSubkey(k) => Some(k),
            Packet::SecretKey(k, _) | Packet::SecretSubkey(k, _) => Some(k),
            _ => None,
        }
    }

    pub fn secret_material(&self) -> Option<&SecretMaterial> {
        match self {
            Packet::SecretKey(_, s) | Packet::SecretSubkey(_, s) => Some(s),
            _ => None,
        }
    }

    pub fn secret_material_mut(&mut self) -> Option<&mut SecretMaterial> {
        match self {
            Packet::SecretKey(_, s) | Packet::SecretSubkey(_, s) => Some(s),
            _ => None,
        }
    }

    pub fn is_primary(&self) -> bool {
        matches!(self, Packet::PublicKey(_) | Packet::SecretKey(_, _))
    }

    pub fn is_subkey(&self) -> bool {
        matches!(self, Packet::PublicSubkey(_) | Packet::SecretSubkey(_, _))
    }

    pub fn is_user_id(&self) -> bool {
        matches!(self, Packet::UserId(_))
    }

    pub fn is_signature(&self) -> bool {
        matches!(self, Packet::Signature(_))
    }
}
