//! Interpreting a node sequence as a structured key: uid groups, subkey
//! groups, self-signatures.

use std::collections::HashMap;

use crate::ids::KeyId;
use crate::node::Node;
use crate::packet::{Packet, SigClass};
use crate::store::NodeStore;

/// What a given position in the keyblock belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Owner {
    Primary,
    Uid(usize),
    Subkey(usize),
}

/// How a signature classifies relative to the primary key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SigKind {
    SelfSig,
    Certification(KeyId),
    Binding(KeyId),
    Other,
}

pub struct Keyblock {
    pub store: NodeStore,
    /// Set once a mutation has changed this block and not yet been saved.
    pub modified: bool,
    /// Maps a uid's node index to the node index of its currently effective
    /// self-signature, populated by `merge_self_sigs`. Side-table state: the
    /// uid's `UserId` packet payload itself is never touched.
    self_sig_cache: HashMap<usize, usize>,
}

impl Keyblock {
    pub fn new(store: NodeStore) -> Self {
        Keyblock {
            store,
            modified: false,
            self_sig_cache: HashMap::new(),
        }
    }

    pub fn primary_index(&self) -> Option<usize> {
        self.store.walk().find(|&i| self.store.get(i).unwrap().packet.is_primary())
    }

    pub fn primary_keyid(&self) -> Option<KeyId> {
        self.primary_index()
            .and_then(|i| self.store.get(i))
            .and_then(|n| n.packet.key_material())
            .map(|k| k.keyid)
    }

    /// The owner (uid/subkey/primary) that node `index` belongs to, found by
    /// scanning backward to the nearest uid or subkey boundary.
    pub fn owner_of(&self, index: usize) -> Owner {
        let mut uid_ord = 0usize;
        let mut subkey_ord = 0usize;
        let mut owner = Owner::Primary;
        for i in self.store.walk() {
            if i > index {
                break;
            }
            let packet = &self.store.get(i).unwrap().packet;
            if packet.is_user_id() {
                uid_ord += 1;
                owner = Owner::Uid(uid_ord);
            } else if packet.is_subkey() {
                subkey_ord += 1;
                owner = Owner::Subkey(subkey_ord);
            }
        }
        owner
    }

    pub fn is_self_signature(&self, sig_signer: KeyId, class: SigClass) -> bool {
        class.is_certification() && Some(sig_signer) == self.primary_keyid()
    }

    pub fn classify_signature(&self, index: usize) -> SigKind {
        let node = match self.store.get(index) {
            Some(n) => n,
            None => return SigKind::Other,
        };
        let sig = match node.packet.as_signature() {
            Some(s) => s,
            None => return SigKind::Other,
        };
        if self.is_self_signature(sig.signer, sig.class) {
            return SigKind::SelfSig;
        }
        match (sig.class, self.owner_of(index)) {
            (SigClass::SubkeyBinding, Owner::Subkey(_)) => SigKind::Binding(sig.signer),
            (c, Owner::Uid(_)) if c.is_certification() => SigKind::Certification(sig.signer),
            _ => SigKind::Other,
        }
    }

    /// Scan the block and cache, per uid node index, the index of its first
    /// verifying self-signature. Does not itself run verification; callers
    /// run `check_all_keysigs` first and pass the resulting flags are
    /// already reflected on the nodes before this is meaningful for
    /// display, but the cache here only needs classification, not the
    /// verification outcome, to identify *candidate* self-sigs.
    pub fn merge_self_sigs(&mut self) {
        self.self_sig_cache.clear();
        let mut current_uid: Option<usize> = None;
        for i in self.store.walk() {
            let packet = &self.store.get(i).unwrap().packet;
            if packet.is_user_id() {
                current_uid = Some(i);
            } else if packet.is_subkey() {
                current_uid = None;
            } else if packet.is_signature() {
                if let Some(uid_idx) = current_uid {
                    if matches!(self.classify_signature(i), SigKind::SelfSig) {
                        self.self_sig_cache.entry(uid_idx).or_insert(i);
                    }
                }
            }
        }
    }

    pub fn effective_self_sig(&self, uid_index: usize) -> Option<usize> {
        self.self_sig_cache.get(&uid_index).copied()
    }

    pub fn node(&self, index: usize) -> Option<&Node> {
        self.store.get(index)
    }

    pub fn node_mut(&mut self, index: usize) -> Option<&mut Node> {
        self.store.get_mut(index)
    }

    /// Live user-id node indices, in order.
    pub fn uid_indices(&self) -> Vec<usize> {
        self.store
            .walk()
            .filter(|&i| self.store.get(i).unwrap().packet.is_user_id())
            .collect()
    }

    /// Live subkey node indices, in order.
    pub fn subkey_indices(&self) -> Vec<usize> {
        self.store
            .walk()
            .filter(|&i| self.store.get(i).unwrap().packet.is_subkey())
            .collect()
    }

    /// Signature node indices belonging to the uid group starting at
    /// `uid_index` (i.e. up to but excluding the next uid or subkey node).
    pub fn signatures_under_uid(&self, uid_index: usize) -> Vec<usize> {
        let mut out = Vec::new();
        let mut started = false;
        for i in self.store.walk() {
            if i == uid_index {
                started = true;
                continue;
            }
            if !started {
                continue;
            }
            let packet = &self.store.get(i).unwrap().packet;
            if packet.is_user_id() || packet.is_subkey() {
                break;
            }
            if packet.is_signature() {
                out.push(i);
            }
        }
        out
    }

    /// Signature node indices belonging to the subkey group starting at
    /// `subkey_index`.
    pub fn signatures_under_subkey(&self, subkey_index: usize) -> Vec<usize> {
        let mut out = Vec::new();
        let mut started = false;
        for i in self.store.walk() {
            if i == subkey_index {
                started = true;
                continue;
            }
            if !started {
                continue;
            }
            let packet = &self.store.get(i).unwrap().packet;
            if packet.is_subkey() {
                break;
            }
            if packet.is_signature() {
                out.push(i);
            }
        }
        out
    }

    /// The node index after which a newly created user id (plus its
    /// self-signature) should be inserted: the last live node before the
    /// first subkey group, or the last live node in the block if there are
    /// no subkeys. `None` only for a completely empty store.
    pub fn uid_insertion_point(&self) -> Option<usize> {
        let mut last_before_subkeys = None;
        for i in self.store.walk() {
            if self.store.get(i).unwrap().packet.is_subkey() {
                break;
            }
            last_before_subkeys = Some(i);
        }
        last_before_subkeys
    }

    pub fn commit(&mut self) {
        self.store.commit();
    }

    pub fn release(&mut self) {
        self.store.release();
        self.self_sig_cache.clear();
    }
}

pub fn matches_uid_name(packet: &Packet, name: &[u8]) -> bool {
    packet.as_user_id().map(|u| u.name == name).unwrap_or(false)
}
