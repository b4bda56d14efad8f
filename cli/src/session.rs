//! Editing session: owns the loaded keyblocks and the collaborators, and
//! implements each command named in the §6 command surface. `menu` drives
//! the read-eval loop against this.

use keyedit_core::collab::{CryptoBackend, KeyHandle, KeyringStore, Prompter};
use keyedit_core::keyblock::Keyblock;
use keyedit_core::mutate;
use keyedit_core::selection;
use keyedit_core::verify;
use keyedit_core::Result;

use crate::config::CliConfig;

pub struct Session<'a> {
    pub store: &'a dyn KeyringStore,
    pub crypto: &'a dyn CryptoBackend,
    pub config: &'a CliConfig,

    pub public: Keyblock,
    pub public_handle: KeyHandle,
    pub secret: Option<Keyblock>,
    pub secret_handle: Option<KeyHandle>,

    /// `toggle` flips which block `list`/`uid`/`key` act on; `true` means
    /// the secret block is active.
    pub secret_active: bool,
}

impl<'a> Session<'a> {
    pub fn open(
        store: &'a dyn KeyringStore,
        crypto: &'a dyn CryptoBackend,
        config: &'a CliConfig,
        name: &str,
    ) -> Result<Self> {
        let public_handle = store
            .find_keyblock_by_name(name)?
            .ok_or_else(|| keyedit_core::Error::KeyblockNotFound(name.to_string()))?;
        let mut public = store.read_keyblock(public_handle)?;
        public.merge_self_sigs();

        let (secret, secret_handle) = match store.find_secret_keyblock_by_name(name)? {
            Some(h) => {
                let mut kb = store.read_keyblock(h)?;
                kb.merge_self_sigs();
                (Some(kb), Some(h))
            }
            None => (None, None),
        };

        Ok(Session { store, crypto, config, public, public_handle, secret, secret_handle, secret_active: false })
    }

    pub fn has_secret(&self) -> bool {
        self.secret.is_some()
    }

    pub fn active_block(&self) -> &Keyblock {
        if self.secret_active {
            self.secret.as_ref().unwrap_or(&self.public)
        } else {
            &self.public
        }
    }

    pub fn toggle(&mut self) {
        if self.has_secret() {
            self.secret_active = !self.secret_active;
        }
    }

    pub fn select_uid(&mut self, index: usize) -> Result<()> {
        let active_is_secret = self.secret_active && self.secret.is_some();
        if active_is_secret {
            selection::select_uid(self.secret.as_mut().unwrap(), index)
        } else {
            selection::select_uid(&mut self.public, index)
        }
    }

    pub fn select_key(&mut self, index: usize) -> Result<()> {
        let active_is_secret = self.secret_active && self.secret.is_some();
        if active_is_secret {
            selection::select_key(self.secret.as_mut().unwrap(), index)
        } else {
            selection::select_key(&mut self.public, index)
        }
    }

    pub fn check(&mut self, prompter: &mut dyn Prompter) -> Result<()> {
        let only_selected = selection::count_selected_uids(&self.public) > 0;
        let (summary, events) = verify::check_all_keysigs(&mut self.public, self.crypto, only_selected)?;
        crate::menu::render_sig_events(&self.public, &events, prompter);
        if summary.any() {
            prompter.print(&format!(
                "summary: {} bad, {} no key, {} other errors, {} missing self-signature\n",
                summary.bad, summary.no_key, summary.other, summary.missing_self
            ));
        }
        Ok(())
    }

    pub fn adduid(&mut self, name: Vec<u8>) -> Result<()> {
        mutate::add_uid(&mut self.public, self.secret.as_mut(), self.crypto, name)
    }

    pub fn deluid(&mut self) -> Result<()> {
        mutate::delete_uid(&mut self.public, self.secret.as_mut())
    }

    pub fn delkey(&mut self) -> Result<()> {
        mutate::delete_subkey(&mut self.public, self.secret.as_mut())
    }

    pub fn sign(&mut self, prompter: &mut dyn Prompter, signers: &[keyedit_core::ids::KeyId]) -> Result<bool> {
        mutate::sign_uids(&mut self.public, self.crypto, prompter, signers)
    }

    pub fn passwd(&mut self, prompter: &mut dyn Prompter) -> Result<bool> {
        let secret = self.secret.as_mut().ok_or(keyedit_core::Error::NoSecretKeyblock)?;
        mutate::change_passphrase(secret, self.crypto, prompter, &self.config.editor)
    }

    pub fn save(&mut self) -> Result<()> {
        if self.public.modified {
            self.store.update_keyblock(self.public_handle, &self.public)?;
            self.public.modified = false;
        }
        if let (Some(secret), Some(handle)) = (self.secret.as_mut(), self.secret_handle) {
            if secret.modified {
                self.store.update_keyblock(handle, secret)?;
                secret.modified = false;
            }
        }
        Ok(())
    }

    pub fn any_modified(&self) -> bool {
        self.public.modified || self.secret.as_ref().map(|s| s.modified).unwrap_or(false)
    }

    pub fn release(&mut self) {
        self.public.release();
        if let Some(secret) = self.secret.as_mut() {
            secret.release();
        }
    }
}
