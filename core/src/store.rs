//! Ordered, mutable sequence of packet nodes with tombstone deletion.
//!
//! `commit` is the only operation that actually removes entries from the
//! backing `Vec`; `delete` just flips a flag so that iterators mid-walk
//! never observe a resized vector.

use crate::node::Node;
use crate::packet::Packet;

#[derive(Debug, Clone, Default)]
pub struct NodeStore {
    nodes: Vec<Node>,
}

impl NodeStore {
    pub fn new() -> Self {
        NodeStore { nodes: Vec::new() }
    }

    pub fn append(&mut self, node: Node) -> usize {
        self.nodes.push(node);
        self.nodes.len() - 1
    }

    /// Insert `node` immediately after `after`, shifting later indices up by
    /// one. Returns the new node's index.
    pub fn insert_after(&mut self, after: usize, node: Node) -> usize {
        let at = after + 1;
        self.nodes.insert(at, node);
        at
    }

    pub fn get(&self, index: usize) -> Option<&Node> {
        self.nodes.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut Node> {
        self.nodes.get_mut(index)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// First live node whose packet matches `pred`, if any.
    pub fn find_first<F: Fn(&Packet) -> bool>(&self, pred: F) -> Option<usize> {
        self.walk().find(|&i| pred(&self.nodes[i].packet))
    }

    /// Indices of all live nodes in order. Collected eagerly so callers can
    /// mutate the store (e.g. insert or delete) while iterating the result
    /// without fighting the borrow checker.
    pub fn walk(&self) -> impl Iterator<Item = usize> + '_ {
        self.nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| !n.flags.deleted())
            .map(|(i, _)| i)
    }

    pub fn delete(&mut self, index: usize) {
        if let Some(n) = self.nodes.get_mut(index) {
            n.flags.mark_deleted();
        }
    }

    /// Compact away deleted nodes. Idempotent; preserves relative order and
    /// all flags on surviving nodes.
    pub fn commit(&mut self) {
        self.nodes.retain(|n| !n.flags.deleted());
    }

    pub fn release(&mut self) {
        self.nodes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::{Packet, UserIdPacket};

    fn uid_node(name: &str) -> Node {
        Node::new(Packet::UserId(UserIdPacket { name: name.as_bytes().to_vec() }))
    }

    #[test]
    fn commit_is_idempotent() {
        let mut store = NodeStore::new();
        let a = store.append(uid_node("a"));
        store.append(uid_node("b"));
        store.delete(a);
        store.commit();
        let snapshot: Vec<_> = store.walk().map(|i| store.get(i).unwrap().packet.as_user_id().unwrap().name.clone()).collect();
        store.commit();
        let snapshot2: Vec<_> = store.walk().map(|i| store.get(i).unwrap().packet.as_user_id().unwrap().name.clone()).collect();
        assert_eq!(snapshot, snapshot2);
        assert_eq!(snapshot, vec![b"b".to_vec()]);
    }

    #[test]
    fn walk_skips_deleted_without_resizing() {
        let mut store = NodeStore::new();
        let a = store.append(uid_node("a"));
        let b = store.append(uid_node("b"));
        store.append(uid_node("c"));
        store.delete(b);
        let live: Vec<usize> = store.walk().collect();
        assert_eq!(live, vec![a, 2]);
        assert_eq!(store.len(), 3, "delete must not resize until commit");
    }

    #[test]
    fn delete_is_idempotent() {
        let mut store = NodeStore::new();
        let a = store.append(uid_node("a"));
        store.delete(a);
        store.delete(a);
        assert_eq!(store.walk().count(), 0);
    }

    #[test]
    fn insert_after_preserves_order() {
        let mut store = NodeStore::new();
        let a = store.append(uid_node("a"));
        store.append(uid_node("c"));
        store.insert_after(a, uid_node("b"));
        let names: Vec<String> = store
            .walk()
            .map(|i| String::from_utf8(store.get(i).unwrap().packet.as_user_id().unwrap().name.clone()).unwrap())
            .collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[quickcheck_macros::quickcheck]
    fn delete_then_commit_matches_expected_length(count: u8, raw_deletes: Vec<u8>) -> bool {
        let count = (count % 20) as usize;
        let mut store = NodeStore::new();
        for i in 0..count {
            store.append(uid_node(&i.to_string()));
        }

        let mut to_delete: Vec<usize> = raw_deletes
            .into_iter()
            .map(|d| d as usize)
            .filter(|&i| i < count)
            .collect();
        to_delete.sort_unstable();
        to_delete.dedup();

        for &i in &to_delete {
            store.delete(i);
        }
        let before_commit = store.walk().count();
        store.commit();

        store.walk().count() == before_commit && store.len() == count - to_delete.len()
    }
}
