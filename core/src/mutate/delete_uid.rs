//! delete-uid (§4.5.2).

use crate::error::{Error, Result};
use crate::keyblock::{matches_uid_name, Keyblock};
use crate::selection::count_uids;

/// Delete every `SEL_UID`-marked user id (and its certifications) from the
/// public block, and the name-matching user id from the secret block if one
/// is loaded. Refuses to leave zero user ids in the public block.
pub fn delete_uid(public: &mut Keyblock, secret: Option<&mut Keyblock>) -> Result<()> {
    let selected: Vec<usize> = public
        .uid_indices()
        .into_iter()
        .filter(|&i| public.node(i).unwrap().flags.sel_uid())
        .collect();

    if selected.is_empty() {
        return Err(Error::NothingSelected.into());
    }
    if selected.len() >= count_uids(public) {
        return Err(Error::LastUserId.into());
    }

    let mut deleted_names = Vec::with_capacity(selected.len());
    for uid_index in selected {
        let name = public.node(uid_index).unwrap().packet.as_user_id().unwrap().name.clone();
        for sig_index in public.signatures_under_uid(uid_index) {
            public.store.delete(sig_index);
        }
        public.store.delete(uid_index);
        deleted_names.push(name);
    }

    public.modified = true;
    public.commit();
    public.merge_self_sigs();

    if let Some(secret_kb) = secret {
        for name in &deleted_names {
            if let Some(sec_uid_index) = secret_kb
                .uid_indices()
                .into_iter()
                .find(|&i| matches_uid_name(&secret_kb.node(i).unwrap().packet, name))
            {
                for sig_index in secret_kb.signatures_under_uid(sec_uid_index) {
                    secret_kb.store.delete(sig_index);
                }
                secret_kb.store.delete(sec_uid_index);
            }
        }
        secret_kb.modified = true;
        secret_kb.commit();
        secret_kb.merge_self_sigs();
    }

    Ok(())
}
