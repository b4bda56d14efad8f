//! Operator selection over user ids and subkeys, plus the transient
//! `MARK_A` work-mark used by bulk operations.

use crate::error::{Error, Result};
use crate::keyblock::Keyblock;

/// `index == 0` clears selection on every uid; `index >= 1` toggles the
/// `index`-th (1-based, keyblock order) uid's selection.
pub fn select_uid(kb: &mut Keyblock, index: usize) -> Result<()> {
    let uids = kb.uid_indices();
    if index == 0 {
        for &i in &uids {
            kb.node_mut(i).unwrap().flags.set_sel_uid(false);
        }
        return Ok(());
    }
    match uids.get(index - 1) {
        Some(&node_idx) => {
            kb.node_mut(node_idx).unwrap().flags.toggle_sel_uid();
            Ok(())
        }
        None => Err(Error::NoSuchUserId(index).into()),
    }
}

/// Same shape as [`select_uid`] but over subkeys.
pub fn select_key(kb: &mut Keyblock, index: usize) -> Result<()> {
    let keys = kb.subkey_indices();
    if index == 0 {
        for &i in &keys {
            kb.node_mut(i).unwrap().flags.set_sel_key(false);
        }
        return Ok(());
    }
    match keys.get(index - 1) {
        Some(&node_idx) => {
            kb.node_mut(node_idx).unwrap().flags.toggle_sel_key();
            Ok(())
        }
        None => Err(Error::NoSuchSubkey(index).into()),
    }
}

pub fn count_uids(kb: &Keyblock) -> usize {
    kb.uid_indices().len()
}

pub fn count_subkeys(kb: &Keyblock) -> usize {
    kb.subkey_indices().len()
}

pub fn count_selected_uids(kb: &Keyblock) -> usize {
    kb.uid_indices()
        .iter()
        .filter(|&&i| kb.node(i).unwrap().flags.sel_uid())
        .count()
}

pub fn count_selected_subkeys(kb: &Keyblock) -> usize {
    kb.subkey_indices()
        .iter()
        .filter(|&&i| kb.node(i).unwrap().flags.sel_key())
        .count()
}

/// The "select-all-if-none-selected" idiom: set `MARK_A` on every uid if
/// nothing is currently selected, else only on the selected ones. Returns
/// the number of uids marked.
pub fn mark_candidate_uids(kb: &mut Keyblock) -> usize {
    let uids = kb.uid_indices();
    let select_all = count_selected_uids(kb) == 0;
    let mut marked = 0;
    for &i in &uids {
        let node = kb.node_mut(i).unwrap();
        let on = select_all || node.flags.sel_uid();
        node.flags.set_mark_a(on);
        if on {
            marked += 1;
        }
    }
    marked
}

pub fn clear_all_marks(kb: &mut Keyblock) {
    for i in kb.uid_indices() {
        kb.node_mut(i).unwrap().flags.set_mark_a(false);
    }
}

/// The first uid node index still carrying `MARK_A`, if any.
pub fn first_marked_uid(kb: &Keyblock) -> Option<usize> {
    kb.uid_indices().into_iter().find(|&i| kb.node(i).unwrap().flags.mark_a())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Node;
    use crate::packet::{Packet, PublicKeyAlgorithm, KeyMaterial, UserIdPacket};
    use crate::ids::{Fingerprint, KeyId};
    use crate::store::NodeStore;

    fn three_uid_keyblock() -> Keyblock {
        let mut store = NodeStore::new();
        store.append(Node::new(Packet::PublicKey(KeyMaterial {
            algo: PublicKeyAlgorithm::EdDsa,
            bits: 256,
            keyid: KeyId(1),
            fingerprint: Fingerprint(vec![0; 20]),
            created: 0,
            expires: None,
            local_id: None,
        })));
        for name in ["Alice", "Bob", "Carol"] {
            store.append(Node::new(Packet::UserId(UserIdPacket { name: name.as_bytes().to_vec() })));
        }
        Keyblock::new(store)
    }

    #[test]
    fn select_uid_toggle_and_clear() {
        let mut kb = three_uid_keyblock();
        select_uid(&mut kb, 2).unwrap();
        assert_eq!(count_selected_uids(&kb), 1);
        select_uid(&mut kb, 0).unwrap();
        assert_eq!(count_selected_uids(&kb), 0);
    }

    #[test]
    fn select_uid_out_of_range_is_no_change() {
        let mut kb = three_uid_keyblock();
        let err = select_uid(&mut kb, 99).unwrap_err();
        assert!(err.to_string().contains("no user id with index 99"));
        assert_eq!(count_selected_uids(&kb), 0);
    }

    #[test]
    fn mark_candidate_uids_selects_all_when_none_selected() {
        let mut kb = three_uid_keyblock();
        let marked = mark_candidate_uids(&mut kb);
        assert_eq!(marked, 3);
    }

    #[test]
    fn mark_candidate_uids_honors_selection() {
        let mut kb = three_uid_keyblock();
        select_uid(&mut kb, 1).unwrap();
        let marked = mark_candidate_uids(&mut kb);
        assert_eq!(marked, 1);
    }

    #[quickcheck_macros::quickcheck]
    fn toggling_a_uid_twice_is_identity(idx: u8) -> bool {
        let mut kb = three_uid_keyblock();
        let idx = 1 + (idx as usize % 3);
        let before = count_selected_uids(&kb);
        select_uid(&mut kb, idx).unwrap();
        select_uid(&mut kb, idx).unwrap();
        count_selected_uids(&kb) == before
    }

    #[quickcheck_macros::quickcheck]
    fn mark_candidate_uids_never_exceeds_uid_count(first: bool, second: bool, third: bool) -> bool {
        let mut kb = three_uid_keyblock();
        let uids = kb.uid_indices();
        for (&i, on) in uids.iter().zip([first, second, third]) {
            if on {
                kb.node_mut(i).unwrap().flags.toggle_sel_uid();
            }
        }
        mark_candidate_uids(&mut kb) <= count_uids(&kb)
    }
}
