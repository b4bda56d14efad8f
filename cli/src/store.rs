//! JSON-backed keyring store collaborator.
//!
//! Real OpenPGP binary packet encoding is out of scope (non-goal); this
//! adapter persists keyblocks as newline-delimited JSON documents the way
//! the teacher's sibling password-manager project (`t-rust-less`) persists
//! its vault entries with `serde_json`, one file per named identity under
//! the configured home directory. It provides no cross-process locking —
//! documented here rather than silently assumed, since this is explicitly a
//! single-operator local-use adapter.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use keyedit_core::collab::{KeyHandle, KeyringStore};
use keyedit_core::ids::{Fingerprint, KeyId, LocalId};
use keyedit_core::keyblock::Keyblock;
use keyedit_core::node::Node;
use keyedit_core::packet::{
    CipherAlgorithm, DigestAlgorithm, KeyMaterial, Packet, Protection, PublicKeyAlgorithm, S2kParams,
    SecretMaterial, SigClass, SignaturePacket, UserIdPacket,
};
use keyedit_core::store::NodeStore;
use keyedit_core::Result;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone)]
struct DtoKeyMaterial {
    algo: String,
    bits: u16,
    keyid: u64,
    fingerprint: Vec<u8>,
    created: u64,
    expires: Option<u64>,
    local_id: Option<u32>,
}

#[derive(Serialize, Deserialize, Clone)]
enum DtoProtection {
    None,
    Protected { cipher: String, digest: String, salt: [u8; 8], count: u32 },
    Unsupported,
}

#[derive(Serialize, Deserialize, Clone)]
enum DtoPacket {
    PublicKey(DtoKeyMaterial),
    PublicSubkey(DtoKeyMaterial),
    SecretKey(DtoKeyMaterial, DtoProtection),
    SecretSubkey(DtoKeyMaterial, DtoProtection),
    UserId(Vec<u8>),
    Signature { signer: u64, created: u64, class: u8 },
}

#[derive(Serialize, Deserialize)]
struct DtoKeyblock {
    packets: Vec<DtoPacket>,
}

fn algo_to_str(a: PublicKeyAlgorithm) -> &'static str {
    match a {
        PublicKeyAlgorithm::Rsa => "rsa",
        PublicKeyAlgorithm::Dsa => "dsa",
        PublicKeyAlgorithm::Ecdsa => "ecdsa",
        PublicKeyAlgorithm::EdDsa => "eddsa",
        PublicKeyAlgorithm::Ecdh => "ecdh",
    }
}

fn algo_from_str(s: &str) -> PublicKeyAlgorithm {
    match s {
        "rsa" => PublicKeyAlgorithm::Rsa,
        "dsa" => PublicKeyAlgorithm::Dsa,
        "ecdsa" => PublicKeyAlgorithm::Ecdsa,
        "ecdh" => PublicKeyAlgorithm::Ecdh,
        _ => PublicKeyAlgorithm::EdDsa,
    }
}

fn cipher_to_str(c: CipherAlgorithm) -> &'static str {
    match c {
        CipherAlgorithm::Aes128 => "aes128",
        CipherAlgorithm::Aes256 => "aes256",
    }
}

fn cipher_from_str(s: &str) -> CipherAlgorithm {
    match s {
        "aes128" => CipherAlgorithm::Aes128,
        _ => CipherAlgorithm::Aes256,
    }
}

fn digest_to_str(d: DigestAlgorithm) -> &'static str {
    match d {
        DigestAlgorithm::Sha1 => "sha1",
        DigestAlgorithm::Sha256 => "sha256",
        DigestAlgorithm::Sha512 => "sha512",
    }
}

fn digest_from_str(s: &str) -> DigestAlgorithm {
    match s {
        "sha1" => DigestAlgorithm::Sha1,
        "sha512" => DigestAlgorithm::Sha512,
        _ => DigestAlgorithm::Sha256,
    }
}

fn key_material_to_dto(k: &KeyMaterial) -> DtoKeyMaterial {
    DtoKeyMaterial {
        algo: algo_to_str(k.algo).to_string(),
        bits: k.bits,
        keyid: k.keyid.0,
        fingerprint: k.fingerprint.0.clone(),
        created: k.created,
        expires: k.expires,
        local_id: k.local_id.map(|l| l.0),
    }
}

fn key_material_from_dto(d: &DtoKeyMaterial) -> KeyMaterial {
    KeyMaterial {
        algo: algo_from_str(&d.algo),
        bits: d.bits,
        keyid: KeyId(d.keyid),
        fingerprint: Fingerprint(d.fingerprint.clone()),
        created: d.created,
        expires: d.expires,
        local_id: d.local_id.map(LocalId),
    }
}

fn protection_to_dto(p: &Protection) -> DtoProtection {
    match p {
        Protection::None => DtoProtection::None,
        Protection::Unsupported => DtoProtection::Unsupported,
        Protection::Protected { cipher, s2k } => DtoProtection::Protected {
            cipher: cipher_to_str(*cipher).to_string(),
            digest: digest_to_str(s2k.digest).to_string(),
            salt: s2k.salt,
            count: s2k.count,
        },
    }
}

fn protection_from_dto(d: &DtoProtection) -> Protection {
    match d {
        DtoProtection::None => Protection::None,
        DtoProtection::Unsupported => Protection::Unsupported,
        DtoProtection::Protected { cipher, digest, salt, count } => Protection::Protected {
            cipher: cipher_from_str(cipher),
            s2k: S2kParams { digest: digest_from_str(digest), salt: *salt, count: *count },
        },
    }
}

fn keyblock_to_dto(kb: &Keyblock) -> DtoKeyblock {
    let mut packets = Vec::new();
    for i in kb.store.walk() {
        let packet = &kb.node(i).unwrap().packet;
        let dto = match packet {
            Packet::PublicKey(k) => DtoPacket::PublicKey(key_material_to_dto(k)),
            Packet::PublicSubkey(k) => DtoPacket::PublicSubkey(key_material_to_dto(k)),
            Packet::SecretKey(k, sm) => DtoPacket::SecretKey(key_material_to_dto(k), protection_to_dto(&sm.protection)),
            Packet::SecretSubkey(k, sm) => {
                DtoPacket::SecretSubkey(key_material_to_dto(k), protection_to_dto(&sm.protection))
            }
            Packet::UserId(u) => DtoPacket::UserId(u.name.clone()),
            Packet::Signature(s) => DtoPacket::Signature {
                signer: s.signer.0,
                created: s.created,
                class: sig_class_to_byte(s.class),
            },
        };
        packets.push(dto);
    }
    DtoKeyblock { packets }
}

fn sig_class_to_byte(c: SigClass) -> u8 {
    match c {
        SigClass::CertGeneric => 0x10,
        SigClass::CertPersona => 0x11,
        SigClass::CertCasual => 0x12,
        SigClass::CertPositive => 0x13,
        SigClass::SubkeyBinding => 0x18,
        SigClass::Other(b) => b,
    }
}

fn dto_to_keyblock(dto: DtoKeyblock) -> Keyblock {
    let mut store = NodeStore::new();
    for p in dto.packets {
        let packet = match p {
            DtoPacket::PublicKey(k) => Packet::PublicKey(key_material_from_dto(&k)),
            DtoPacket::PublicSubkey(k) => Packet::PublicSubkey(key_material_from_dto(&k)),
            DtoPacket::SecretKey(k, prot) => Packet::SecretKey(
                key_material_from_dto(&k),
                SecretMaterial { protection: protection_from_dto(&prot), unlocked: None },
            ),
            DtoPacket::SecretSubkey(k, prot) => Packet::SecretSubkey(
                key_material_from_dto(&k),
                SecretMaterial { protection: protection_from_dto(&prot), unlocked: None },
            ),
            DtoPacket::UserId(name) => Packet::UserId(UserIdPacket { name }),
            DtoPacket::Signature { signer, created, class } => Packet::Signature(SignaturePacket {
                signer: KeyId(signer),
                created,
                class: SigClass::from_byte(class),
                checked: None,
            }),
        };
        store.append(Node::new(packet));
    }
    let mut kb = Keyblock::new(store);
    kb.merge_self_sigs();
    kb
}

pub struct JsonKeyringStore {
    home: PathBuf,
    next_handle: Mutex<u64>,
    handles: Mutex<HashMap<u64, PathBuf>>,
}

impl JsonKeyringStore {
    pub fn new(home: impl Into<PathBuf>) -> Result<Self> {
        let home = home.into();
        fs::create_dir_all(&home)?;
        Ok(JsonKeyringStore { home, next_handle: Mutex::new(1), handles: Mutex::new(HashMap::new()) })
    }

    fn path_for(&self, name: &str, secret: bool) -> PathBuf {
        let safe: String = name.chars().filter(|c| c.is_alphanumeric()).collect();
        let suffix = if secret { "secret" } else { "public" };
        self.home.join(format!("{}.{}.json", safe, suffix))
    }

    fn allocate_handle(&self, path: PathBuf) -> KeyHandle {
        let mut next = self.next_handle.lock().unwrap();
        let id = *next;
        *next += 1;
        self.handles.lock().unwrap().insert(id, path);
        KeyHandle(id)
    }

    fn resolve(&self, handle: KeyHandle) -> Option<PathBuf> {
        self.handles.lock().unwrap().get(&handle.0).cloned()
    }

    fn find(&self, name: &str, secret: bool) -> Result<Option<KeyHandle>> {
        let path = self.path_for(name, secret);
        if path.exists() {
            Ok(Some(self.allocate_handle(path)))
        } else {
            Ok(None)
        }
    }
}

impl KeyringStore for JsonKeyringStore {
    fn find_keyblock_by_name(&self, name: &str) -> Result<Option<KeyHandle>> {
        self.find(name, false)
    }

    fn find_secret_keyblock_by_name(&self, name: &str) -> Result<Option<KeyHandle>> {
        self.find(name, true)
    }

    fn read_keyblock(&self, handle: KeyHandle) -> Result<Keyblock> {
        let path = self.resolve(handle).ok_or_else(|| anyhow::anyhow!("stale keyring handle"))?;
        let text = fs::read_to_string(&path)?;
        let dto: DtoKeyblock = serde_json::from_str(&text)?;
        Ok(dto_to_keyblock(dto))
    }

    fn update_keyblock(&self, handle: KeyHandle, keyblock: &Keyblock) -> Result<()> {
        let path = self.resolve(handle).ok_or_else(|| anyhow::anyhow!("stale keyring handle"))?;
        let dto = keyblock_to_dto(keyblock);
        let text = serde_json::to_string_pretty(&dto)?;
        fs::write(&path, text)?;
        log::info!("wrote keyblock to {}", path.display());
        Ok(())
    }
}

impl JsonKeyringStore {
    /// Used by tests to seed a store without going through the menu loop.
    pub fn write_new(&self, name: &str, secret: bool, keyblock: &Keyblock) -> Result<KeyHandle> {
        let path = self.path_for(name, secret);
        let dto = keyblock_to_dto(keyblock);
        fs::write(&path, serde_json::to_string_pretty(&dto)?)?;
        Ok(self.allocate_handle(path))
    }
}

/// Stub owner-trust database. Real trust computation is a non-goal; this
/// tracks only whether the cached computation for a primary key has been
/// invalidated, and serves static preference bytes for the `pref` command.
pub struct TrustDb {
    invalidated: Mutex<HashMap<u64, bool>>,
}

impl TrustDb {
    pub fn new() -> Self {
        TrustDb { invalidated: Mutex::new(HashMap::new()) }
    }

    pub fn invalidate(&self, primary: KeyId) {
        self.invalidated.lock().unwrap().insert(primary.0, true);
    }

    pub fn is_invalidated(&self, primary: KeyId) -> bool {
        *self.invalidated.lock().unwrap().get(&primary.0).unwrap_or(&false)
    }

    pub fn pref_data(&self, _keyid: KeyId, _uid_name_hash: u64) -> Option<Vec<u8>> {
        None
    }
}

pub fn default_store(home: &Path) -> Result<JsonKeyringStore> {
    JsonKeyringStore::new(home)
}
