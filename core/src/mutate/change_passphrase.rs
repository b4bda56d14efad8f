//! change-passphrase (§4.5.5).
//!
//! State machine: `Idle -> Unlocked -> Reprotected -> Idle`. Every captured
//! passphrase and derived key lives in a `Zeroizing` buffer so the wipe
//! obligation holds on every exit path, including an early `?`.

use zeroize::Zeroizing;

use crate::collab::{CryptoBackend, Prompter};
use crate::config::EditorConfig;
use crate::error::{Error, Result};
use crate::keyblock::Keyblock;
use crate::packet::Protection;

/// Re-encrypt every secret key in `secret` under a passphrase collected
/// interactively. Returns whether anything was re-protected.
pub fn change_passphrase(
    secret: &mut Keyblock,
    crypto: &dyn CryptoBackend,
    prompter: &mut dyn Prompter,
    config: &EditorConfig,
) -> Result<bool> {
    let primary_index = secret.primary_index().ok_or(Error::NoPrimarySecretKey)?;

    let old_passphrase = unlock_if_needed(secret, crypto, prompter, primary_index)?;

    let subkey_indices = secret.subkey_indices();
    if let Some(ref passphrase) = old_passphrase {
        for &subkey_index in &subkey_indices {
            crypto
                .check_secret_key(secret, subkey_index, passphrase)
                .map_err(|e| Error::UnlockFailed(e.to_string()))?;
        }
    }

    let dek = loop {
        let first = prompter.read_passphrase("enter the new passphrase")?;
        if first.is_empty() {
            if prompter.confirm("do you really want to do this?", true)? {
                break None;
            }
            continue;
        }
        let second = prompter.read_passphrase("repeat the passphrase")?;
        if first.as_slice() != second.as_slice() {
            prompter.print("passphrases did not match\n");
            continue;
        }
        match crypto.passphrase_to_dek(&first, config.cipher(), config.s2k_digest())? {
            Some(dek) => break Some(dek),
            None => continue,
        }
    };

    reprotect(secret, crypto, primary_index, &subkey_indices, dek, config)?;

    secret.modified = true;
    Ok(true)
}

fn unlock_if_needed(
    secret: &mut Keyblock,
    crypto: &dyn CryptoBackend,
    prompter: &mut dyn Prompter,
    primary_index: usize,
) -> Result<Option<Zeroizing<Vec<u8>>>> {
    match crypto.is_secret_key_protected(secret, primary_index)? {
        Protection::Unsupported => Err(Error::UnsupportedProtection.into()),
        Protection::None => Ok(None),
        Protection::Protected { .. } => {
            let passphrase = prompter.read_passphrase("enter the current passphrase")?;
            crypto
                .check_secret_key(secret, primary_index, &passphrase)
                .map_err(|e| Error::UnlockFailed(e.to_string()))?;
            Ok(Some(passphrase))
        }
    }
}

fn reprotect(
    secret: &mut Keyblock,
    crypto: &dyn CryptoBackend,
    primary_index: usize,
    subkey_indices: &[usize],
    dek: Option<Zeroizing<Vec<u8>>>,
    config: &EditorConfig,
) -> Result<()> {
    let dek_slice = dek.as_ref().map(|d| d.as_slice());
    crypto
        .protect_secret_key(secret, primary_index, dek_slice, config.cipher(), config.s2k_digest())
        .map_err(|e| Error::ProtectFailed(e.to_string()))?;
    for &subkey_index in subkey_indices {
        crypto
            .protect_secret_key(secret, subkey_index, dek_slice, config.cipher(), config.s2k_digest())
            .map_err(|e| Error::ProtectFailed(e.to_string()))?;
    }
    Ok(())
}
