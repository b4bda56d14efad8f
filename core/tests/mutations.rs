//! End-to-end exercises of the mutation operations and the verification
//! walk against a deterministic in-memory mock of the crypto collaborator.
//! Mirrors the scenario-style tests this project runs at the CLI layer,
//! scoped here to what the core alone can assert.

use std::cell::RefCell;
use std::collections::HashSet;

use keyedit_core::collab::{CryptoBackend, Prompter, SigRequest};
use keyedit_core::config::EditorConfig;
use keyedit_core::ids::{Fingerprint, KeyId};
use keyedit_core::keyblock::Keyblock;
use keyedit_core::mutate::{add_uid, change_passphrase, delete_uid, sign_uids};
use keyedit_core::node::Node;
use keyedit_core::packet::{
    CipherAlgorithm, DigestAlgorithm, KeyMaterial, Packet, Protection, PublicKeyAlgorithm, S2kParams,
    SecretMaterial, SigCheckResult, SignaturePacket, UserIdPacket,
};
use keyedit_core::selection::select_uid;
use keyedit_core::store::NodeStore;
use keyedit_core::verify::check_all_keysigs;
use zeroize::Zeroizing;

const ALICE_KEYID: u64 = 0xA11CE;

fn key_material(keyid: u64) -> KeyMaterial {
    KeyMaterial {
        algo: PublicKeyAlgorithm::EdDsa,
        bits: 256,
        keyid: KeyId(keyid),
        fingerprint: Fingerprint(vec![0xAB; 20]),
        created: 1_700_000_000,
        expires: None,
        local_id: None,
    }
}

fn sig(signer: u64, class: keyedit_core::packet::SigClass) -> SignaturePacket {
    SignaturePacket { signer: KeyId(signer), created: 1_700_000_001, class, checked: None }
}

/// Public keyblock: primary + 3 uids, each with a self-sig.
fn sample_public() -> Keyblock {
    use keyedit_core::packet::SigClass;
    let mut store = NodeStore::new();
    store.append(Node::new(Packet::PublicKey(key_material(ALICE_KEYID))));
    for name in ["Alice <alice@example.org>", "Bob Alias", "Carol C."] {
        store.append(Node::new(Packet::UserId(UserIdPacket { name: name.as_bytes().to_vec() })));
        store.append(Node::new(Packet::Signature(sig(ALICE_KEYID, SigClass::CertPositive))));
    }
    Keyblock::new(store)
}

fn sample_secret() -> Keyblock {
    use keyedit_core::packet::SigClass;
    let mut store = NodeStore::new();
    let sm = SecretMaterial {
        protection: Protection::Protected {
            cipher: CipherAlgorithm::Aes256,
            s2k: S2kParams { digest: DigestAlgorithm::Sha256, salt: [1; 8], count: 65536 },
        },
        unlocked: None,
    };
    store.append(Node::new(Packet::SecretKey(key_material(ALICE_KEYID), sm.clone())));
    for name in ["Alice <alice@example.org>", "Bob Alias", "Carol C."] {
        store.append(Node::new(Packet::UserId(UserIdPacket { name: name.as_bytes().to_vec() })));
        store.append(Node::new(Packet::Signature(sig(ALICE_KEYID, SigClass::CertPositive))));
    }
    Keyblock::new(store)
}

/// Deterministic mock: self-sigs by the keyblock's own primary always
/// verify; everything else is looked up in a fixed table keyed by
/// (signer, class). Locked/unlocked state and the "correct" unlock
/// passphrase are tracked in a `RefCell` so `&self` methods can mutate it.
struct MockCrypto {
    correct_passphrase: Vec<u8>,
    unlocked: RefCell<HashSet<u64>>,
    known_signers: RefCell<HashSet<u64>>, // keyids with a resolvable display name
    next_sig_ok: RefCell<bool>,
}

impl MockCrypto {
    fn new() -> Self {
        let mut known = HashSet::new();
        known.insert(ALICE_KEYID);
        MockCrypto {
            correct_passphrase: b"hunter2".to_vec(),
            unlocked: RefCell::new(HashSet::new()),
            known_signers: RefCell::new(known),
            next_sig_ok: RefCell::new(true),
        }
    }
}

impl CryptoBackend for MockCrypto {
    fn check_key_signature(&self, kb: &Keyblock, sig_index: usize) -> keyedit_core::Result<SigCheckResult> {
        let node = kb.node(sig_index).unwrap();
        let s = node.packet.as_signature().unwrap();
        if Some(s.signer) == kb.primary_keyid() {
            return Ok(SigCheckResult::Ok);
        }
        if !self.known_signers.borrow().contains(&s.signer.0) {
            return Ok(SigCheckResult::NoKey);
        }
        Ok(if *self.next_sig_ok.borrow() { SigCheckResult::Ok } else { SigCheckResult::Bad })
    }

    fn make_keysig_packet(&self, _kb: &Keyblock, request: SigRequest) -> keyedit_core::Result<SignaturePacket> {
        use keyedit_core::packet::SigClass;
        let signer = match request {
            SigRequest::Certification { signer, .. } => signer,
            SigRequest::Binding { signer, .. } => signer,
        };
        Ok(SignaturePacket { signer, created: 1_700_000_002, class: SigClass::CertPositive, checked: None })
    }

    fn is_secret_key_protected(&self, kb: &Keyblock, node_index: usize) -> keyedit_core::Result<Protection> {
        Ok(kb.node(node_index).unwrap().packet.secret_material().unwrap().protection.clone())
    }

    fn check_secret_key(&self, kb: &mut Keyblock, node_index: usize, passphrase: &[u8]) -> keyedit_core::Result<()> {
        if passphrase != self.correct_passphrase.as_slice() {
            anyhow::bail!("wrong passphrase");
        }
        let keyid = kb.node(node_index).unwrap().packet.key_material().unwrap().keyid.0;
        self.unlocked.borrow_mut().insert(keyid);
        Ok(())
    }

    fn passphrase_to_dek(
        &self,
        passphrase: &[u8],
        _cipher: CipherAlgorithm,
        _digest: DigestAlgorithm,
    ) -> keyedit_core::Result<Option<Zeroizing<Vec<u8>>>> {
        Ok(Some(Zeroizing::new(passphrase.to_vec())))
    }

    fn protect_secret_key(
        &self,
        kb: &mut Keyblock,
        node_index: usize,
        dek: Option<&[u8]>,
        _cipher: CipherAlgorithm,
        _s2k_digest: DigestAlgorithm,
    ) -> keyedit_core::Result<()> {
        let node = kb.node_mut(node_index).unwrap();
        let sm = node.packet.secret_material_mut().unwrap();
        sm.protection = match dek {
            None => Protection::None,
            Some(_) => Protection::Protected {
                cipher: CipherAlgorithm::Aes256,
                s2k: S2kParams { digest: DigestAlgorithm::Sha256, salt: [2; 8], count: 65536 },
            },
        };
        Ok(())
    }

    fn get_user_id(&self, keyid: KeyId) -> keyedit_core::Result<Option<String>> {
        Ok(if self.known_signers.borrow().contains(&keyid.0) { Some(format!("signer-{}", keyid)) } else { None })
    }

    fn get_pref_data(&self, _keyid: KeyId, _uid_name_hash: u64) -> keyedit_core::Result<Option<Vec<u8>>> {
        Ok(None)
    }

    fn clear_trust_checked_flag(&self, _primary: KeyId) -> keyedit_core::Result<()> {
        Ok(())
    }
}

/// Scripted prompter: confirmations and passphrases are consumed in order.
struct ScriptedPrompter {
    confirms: Vec<bool>,
    passphrases: Vec<Vec<u8>>,
}

impl Prompter for ScriptedPrompter {
    fn read_line(&mut self, _prompt: &str) -> keyedit_core::Result<String> {
        Ok(String::new())
    }

    fn confirm(&mut self, _prompt: &str, default_no: bool) -> keyedit_core::Result<bool> {
        Ok(if self.confirms.is_empty() { !default_no } else { self.confirms.remove(0) })
    }

    fn read_passphrase(&mut self, _prompt: &str) -> keyedit_core::Result<Zeroizing<Vec<u8>>> {
        Ok(Zeroizing::new(self.passphrases.remove(0)))
    }

    fn print(&mut self, _text: &str) {}

    fn is_interactive(&self) -> bool {
        false
    }
}

#[test]
fn add_uid_appears_in_both_blocks_and_is_self_signed() {
    let mut public = sample_public();
    let mut secret = sample_secret();
    let crypto = MockCrypto::new();

    add_uid(&mut public, Some(&mut secret), &crypto, b"Dave D.".to_vec()).unwrap();

    assert_eq!(public.uid_indices().len(), 4);
    assert_eq!(secret.uid_indices().len(), 4);
    assert!(public.modified);
    assert!(secret.modified);

    let new_uid = *public.uid_indices().last().unwrap();
    assert_eq!(public.effective_self_sig(new_uid), public.signatures_under_uid(new_uid).first().copied());
}

#[test]
fn delete_uid_removes_from_both_blocks_by_name() {
    let mut public = sample_public();
    let mut secret = sample_secret();

    select_uid(&mut public, 2).unwrap(); // Bob Alias
    delete_uid(&mut public, Some(&mut secret)).unwrap();

    let public_names: Vec<_> = public
        .uid_indices()
        .iter()
        .map(|&i| String::from_utf8_lossy(&public.node(i).unwrap().packet.as_user_id().unwrap().name).into_owned())
        .collect();
    let secret_names: Vec<_> = secret
        .uid_indices()
        .iter()
        .map(|&i| String::from_utf8_lossy(&secret.node(i).unwrap().packet.as_user_id().unwrap().name).into_owned())
        .collect();

    assert_eq!(public_names, vec!["Alice <alice@example.org>", "Carol C."]);
    assert_eq!(secret_names, vec!["Alice <alice@example.org>", "Carol C."]);
}

#[test]
fn delete_uid_refuses_to_remove_the_last_one() {
    let mut store = NodeStore::new();
    store.append(Node::new(Packet::PublicKey(key_material(ALICE_KEYID))));
    store.append(Node::new(Packet::UserId(UserIdPacket { name: b"Only".to_vec() })));
    let mut public = Keyblock::new(store);
    select_uid(&mut public, 1).unwrap();

    let err = delete_uid(&mut public, None).unwrap_err();
    assert!(err.to_string().contains("last user id"));
}

#[test]
fn sign_uids_only_touches_selected_uid() {
    let mut public = sample_public();
    let crypto = MockCrypto::new();
    let mut prompter = ScriptedPrompter { confirms: vec![true], passphrases: vec![] };

    select_uid(&mut public, 1).unwrap();
    let signer = KeyId(0xF00D);
    let changed = sign_uids(&mut public, &crypto, &mut prompter, &[signer]).unwrap();
    assert!(changed);

    let uid_indices = public.uid_indices();
    let sigs_on_first = public.signatures_under_uid(uid_indices[0]).len();
    let sigs_on_second = public.signatures_under_uid(uid_indices[1]).len();
    assert_eq!(sigs_on_first, 2, "self-sig plus the new certification");
    assert_eq!(sigs_on_second, 1, "untouched, only the self-sig remains");
}

#[test]
fn sign_uids_is_idempotent_against_the_same_signer() {
    let mut public = sample_public();
    let crypto = MockCrypto::new();
    let signer = KeyId(0xF00D);

    let mut prompter = ScriptedPrompter { confirms: vec![true], passphrases: vec![] };
    sign_uids(&mut public, &crypto, &mut prompter, &[signer]).unwrap();
    let after_first: usize = public.uid_indices().iter().map(|&i| public.signatures_under_uid(i).len()).sum();

    let mut prompter2 = ScriptedPrompter { confirms: vec![true], passphrases: vec![] };
    sign_uids(&mut public, &crypto, &mut prompter2, &[signer]).unwrap();
    let after_second: usize = public.uid_indices().iter().map(|&i| public.signatures_under_uid(i).len()).sum();

    assert_eq!(after_first, after_second, "re-signing must not add a duplicate certification");
}

#[test]
fn change_passphrase_to_empty_unprotects_every_key() {
    let mut secret = sample_secret();
    let crypto = MockCrypto::new();
    let config = EditorConfig::configure().build();
    let mut prompter = ScriptedPrompter {
        confirms: vec![true], // "do you really want to do this?" for an empty passphrase
        passphrases: vec![b"hunter2".to_vec(), b"".to_vec()],
    };

    let changed = change_passphrase(&mut secret, &crypto, &mut prompter, &config).unwrap();
    assert!(changed);

    let primary = secret.primary_index().unwrap();
    assert_eq!(secret.node(primary).unwrap().packet.secret_material().unwrap().protection, Protection::None);
}

#[test]
fn change_passphrase_rejects_wrong_current_passphrase() {
    let mut secret = sample_secret();
    let crypto = MockCrypto::new();
    let config = EditorConfig::configure().build();
    let mut prompter = ScriptedPrompter { confirms: vec![], passphrases: vec![b"wrong".to_vec()] };

    assert!(change_passphrase(&mut secret, &crypto, &mut prompter, &config).is_err());
}

#[test]
fn check_all_keysigs_counts_missing_self_for_trailing_uid() {
    use keyedit_core::packet::SigClass;
    let mut store = NodeStore::new();
    store.append(Node::new(Packet::PublicKey(key_material(ALICE_KEYID))));
    store.append(Node::new(Packet::UserId(UserIdPacket { name: b"Alice".to_vec() })));
    store.append(Node::new(Packet::Signature(sig(ALICE_KEYID, SigClass::CertPositive))));
    store.append(Node::new(Packet::UserId(UserIdPacket { name: b"NoSelfSig".to_vec() })));
    store.append(Node::new(Packet::Signature(sig(0xDEAD, SigClass::CertGeneric))));
    let mut public = Keyblock::new(store);
    public.merge_self_sigs();

    let crypto = MockCrypto::new();
    let (summary, _events) = check_all_keysigs(&mut public, &crypto, false).unwrap();

    assert_eq!(summary.no_key, 1);
    assert_eq!(summary.missing_self, 1);
}
