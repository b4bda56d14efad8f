//! sign-uids (§4.5.4).

use crate::collab::{CryptoBackend, Prompter, SigRequest};
use crate::error::Result;
use crate::ids::KeyId;
use crate::keyblock::{Keyblock, SigKind};
use crate::node::Node;
use crate::packet::Packet;
use crate::selection::{clear_all_marks, first_marked_uid, mark_candidate_uids};

/// Certify the candidate user ids (selected, or all if none are selected)
/// with each signer in `signers`, prompting for confirmation per signer.
///
/// Returns whether any signature was produced; when it has, the caller's
/// trust cache for the primary should be invalidated (see module note in
/// DESIGN.md on when that happens relative to a mid-list failure).
pub fn sign_uids(
    public: &mut Keyblock,
    crypto: &dyn CryptoBackend,
    prompter: &mut dyn Prompter,
    signers: &[KeyId],
) -> Result<bool> {
    let mut any_signed = false;

    for &signer in signers {
        let marked = mark_candidate_uids(public);
        if marked == 0 {
            clear_all_marks(public);
            continue;
        }

        // Drop uids this signer has already certified.
        for uid_index in public.uid_indices() {
            if !public.node(uid_index).unwrap().flags.mark_a() {
                continue;
            }
            let already = public
                .signatures_under_uid(uid_index)
                .into_iter()
                .any(|sig_idx| matches!(public.classify_signature(sig_idx), SigKind::Certification(s) if s == signer));
            if already {
                public.node_mut(uid_index).unwrap().flags.set_mark_a(false);
                prompter.print(&format!("already signed by key {}\n", signer));
            }
        }

        if first_marked_uid(public).is_none() {
            prompter.print(&format!("nothing to sign with key {}\n", signer));
            continue;
        }

        let candidate_names: Vec<String> = public
            .uid_indices()
            .into_iter()
            .filter(|&i| public.node(i).unwrap().flags.mark_a())
            .map(|i| String::from_utf8_lossy(&public.node(i).unwrap().packet.as_user_id().unwrap().name).into_owned())
            .collect();
        prompter.print(&format!("about to sign these user ids with key {}:\n", signer));
        for name in &candidate_names {
            prompter.print(&format!("  {}\n", name));
        }
        if !prompter.confirm("really sign?", true)? {
            clear_all_marks(public);
            continue;
        }

        // Restart the scan after every insertion: the node sequence shifts
        // and later indices are no longer valid.
        while let Some(uid_index) = first_marked_uid(public) {
            public.node_mut(uid_index).unwrap().flags.set_mark_a(false);
            let sig = crypto.make_keysig_packet(public, SigRequest::Certification { signer, uid_index })?;
            public.store.insert_after(uid_index, Node::new(Packet::Signature(sig)));
            any_signed = true;
        }
    }

    if any_signed {
        public.modified = true;
        public.commit();
        public.merge_self_sigs();
        if let Some(primary) = public.primary_keyid() {
            crypto.clear_trust_checked_flag(primary)?;
        }
    }

    Ok(any_signed)
}
