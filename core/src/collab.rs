//! External collaborator interfaces (§6). The core depends only on these
//! traits; the `cli` crate supplies concrete implementations (a JSON-backed
//! keyring store, a deterministic demo crypto backend, and a TTY prompter).

use crate::error::Result;
use crate::ids::KeyId;
use crate::keyblock::Keyblock;
use crate::packet::{CipherAlgorithm, DigestAlgorithm, Protection, SigCheckResult, SignaturePacket};
use zeroize::Zeroizing;

/// Opaque handle a `KeyringStore` hands back to identify a located keyblock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyHandle(pub u64);

pub trait KeyringStore {
    fn find_keyblock_by_name(&self, name: &str) -> Result<Option<KeyHandle>>;
    fn find_secret_keyblock_by_name(&self, name: &str) -> Result<Option<KeyHandle>>;
    fn read_keyblock(&self, handle: KeyHandle) -> Result<Keyblock>;
    fn update_keyblock(&self, handle: KeyHandle, keyblock: &Keyblock) -> Result<()>;
}

/// What the signer is asking `make_keysig_packet` to produce.
pub enum SigRequest {
    /// Certify the user id at `uid_index` in `public` as the given signer.
    Certification { signer: KeyId, uid_index: usize },
    /// Bind the subkey at `subkey_index` to the primary.
    Binding { signer: KeyId, subkey_index: usize },
}

pub trait CryptoBackend {
    /// Verify one signature node, returning the check outcome. Does not
    /// mutate the node; the verification walk applies the result.
    fn check_key_signature(&self, kb: &Keyblock, sig_index: usize) -> Result<SigCheckResult>;

    fn make_keysig_packet(&self, kb: &Keyblock, request: SigRequest) -> Result<SignaturePacket>;

    fn is_secret_key_protected(&self, kb: &Keyblock, node_index: usize) -> Result<Protection>;

    /// Decrypt the secret key at `node_index` in place using `passphrase`.
    fn check_secret_key(&self, kb: &mut Keyblock, node_index: usize, passphrase: &[u8]) -> Result<()>;

    /// Derive a data-encryption key from a passphrase, or `None` to signal
    /// the caller should re-prompt (e.g. on confirmation mismatch).
    fn passphrase_to_dek(
        &self,
        passphrase: &[u8],
        cipher: CipherAlgorithm,
        digest: DigestAlgorithm,
    ) -> Result<Option<Zeroizing<Vec<u8>>>>;

    /// Re-encrypt the secret key at `node_index` under `dek`, or strip
    /// protection entirely when `dek` is `None`.
    fn protect_secret_key(
        &self,
        kb: &mut Keyblock,
        node_index: usize,
        dek: Option<&[u8]>,
        cipher: CipherAlgorithm,
        s2k_digest: DigestAlgorithm,
    ) -> Result<()>;

    fn get_user_id(&self, keyid: KeyId) -> Result<Option<String>>;

    fn get_pref_data(&self, keyid: KeyId, uid_name_hash: u64) -> Result<Option<Vec<u8>>>;

    fn clear_trust_checked_flag(&self, primary: KeyId) -> Result<()>;
}

pub trait Prompter {
    fn read_line(&mut self, prompt: &str) -> Result<String>;
    fn confirm(&mut self, prompt: &str, default_no: bool) -> Result<bool>;
    fn read_passphrase(&mut self, prompt: &str) -> Result<Zeroizing<Vec<u8>>>;
    fn print(&mut self, text: &str);
    fn is_interactive(&self) -> bool;
}
