//! A packet plus its flag bits.
//!
//! `BAD_SIG`/`NO_KEY`/`SIG_ERR` are mutually exclusive on a given node; the
//! setters below enforce that instead of leaving it to callers, the same way
//! the teacher's `KeyServerPreferences` keeps its bit accessors as the single
//! place that knows the encoding.

use crate::packet::Packet;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeFlags {
    bad_sig: bool,
    no_key: bool,
    sig_err: bool,
    mark_a: bool,
    sel_uid: bool,
    sel_key: bool,
    deleted: bool,
}

impl NodeFlags {
    pub fn bad_sig(&self) -> bool {
        self.bad_sig
    }
    pub fn no_key(&self) -> bool {
        self.no_key
    }
    pub fn sig_err(&self) -> bool {
        self.sig_err
    }
    pub fn mark_a(&self) -> bool {
        self.mark_a
    }
    pub fn sel_uid(&self) -> bool {
        self.sel_uid
    }
    pub fn sel_key(&self) -> bool {
        self.sel_key
    }
    pub fn deleted(&self) -> bool {
        self.deleted
    }

    fn clear_sig_error_bits(&mut self) {
        self.bad_sig = false;
        self.no_key = false;
        self.sig_err = false;
    }

    pub fn set_bad_sig(&mut self) {
        self.clear_sig_error_bits();
        self.bad_sig = true;
    }

    pub fn set_no_key(&mut self) {
        self.clear_sig_error_bits();
        self.no_key = true;
    }

    pub fn set_sig_err(&mut self) {
        self.clear_sig_error_bits();
        self.sig_err = true;
    }

    pub fn clear_sig_checks(&mut self) {
        self.clear_sig_error_bits();
    }

    pub fn set_mark_a(&mut self, on: bool) {
        self.mark_a = on;
    }

    pub fn set_sel_uid(&mut self, on: bool) {
        self.sel_uid = on;
    }

    pub fn toggle_sel_uid(&mut self) {
        self.sel_uid = !self.sel_uid;
    }

    pub fn set_sel_key(&mut self, on: bool) {
        self.sel_key = on;
    }

    pub fn toggle_sel_key(&mut self) {
        self.sel_key = !self.sel_key;
    }

    pub fn mark_deleted(&mut self) {
        self.deleted = true;
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub packet: Packet,
    pub flags: NodeFlags,
}

impl Node {
    pub fn new(packet: Packet) -> Self {
        Node {
            packet,
            flags: NodeFlags::default(),
        }
    }
}
