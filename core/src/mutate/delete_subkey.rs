//! delete-subkey (§4.5.3).

use crate::error::{Error, Result};
use crate::keyblock::Keyblock;

/// Delete every `SEL_KEY`-marked subkey (and its binding signatures) from
/// the public block, and the key-id-matching subkey from the secret block
/// if one is loaded.
pub fn delete_subkey(public: &mut Keyblock, secret: Option<&mut Keyblock>) -> Result<()> {
    let selected: Vec<usize> = public
        .subkey_indices()
        .into_iter()
        .filter(|&i| public.node(i).unwrap().flags.sel_key())
        .collect();

    if selected.is_empty() {
        return Err(Error::NothingSelected.into());
    }

    let mut deleted_keyids = Vec::with_capacity(selected.len());
    for subkey_index in selected {
        let keyid = public.node(subkey_index).unwrap().packet.key_material().unwrap().keyid;
        for sig_index in public.signatures_under_subkey(subkey_index) {
            public.store.delete(sig_index);
        }
        public.store.delete(subkey_index);
        deleted_keyids.push(keyid);
    }

    public.modified = true;
    public.commit();

    if let Some(secret_kb) = secret {
        for keyid in &deleted_keyids {
            if let Some(sec_subkey_index) = secret_kb
                .subkey_indices()
                .into_iter()
                .find(|&i| secret_kb.node(i).unwrap().packet.key_material().unwrap().keyid == *keyid)
            {
                for sig_index in secret_kb.signatures_under_subkey(sec_subkey_index) {
                    secret_kb.store.delete(sig_index);
                }
                secret_kb.store.delete(sec_subkey_index);
            }
        }
        secret_kb.modified = true;
        secret_kb.commit();
    }

    Ok(())
}
