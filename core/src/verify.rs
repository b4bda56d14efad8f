//! Signature verification walk (§4.4). Returns structured events rather
//! than printing, so rendering stays a `cli`-crate concern.

use crate::collab::CryptoBackend;
use crate::error::Result;
use crate::keyblock::{Keyblock, SigKind};
use crate::packet::SigCheckResult;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SigSummary {
    pub bad: usize,
    pub no_key: usize,
    pub other: usize,
    pub missing_self: usize,
}

impl SigSummary {
    pub fn any(&self) -> bool {
        self.bad > 0 || self.no_key > 0 || self.other > 0 || self.missing_self > 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SigEvent {
    UserId { uid_index: usize },
    SelfSig { sig_index: usize, result: SigCheckResult },
    Certification { sig_index: usize, signer_display: CertDisplay, result: SigCheckResult },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CertDisplay {
    /// Signer's key unavailable; display omits the signer-id text.
    Unknown,
    Named(String),
}

/// Walk the keyblock, verify every certification under a visible uid, and
/// update node flags to reflect the outcome.
///
/// When `only_selected` is true, uid groups without `SEL_UID` are skipped
/// entirely (their signatures are neither checked nor counted).
pub fn check_all_keysigs(
    kb: &mut Keyblock,
    crypto: &dyn CryptoBackend,
    only_selected: bool,
) -> Result<(SigSummary, Vec<SigEvent>)> {
    let mut summary = SigSummary::default();
    let mut events = Vec::new();

    let indices: Vec<usize> = kb.store.walk().collect();
    let mut visible = false;
    let mut has_valid_self_sig = false;
    let mut any_uid_seen = false;

    for i in indices {
        let packet = kb.node(i).unwrap().packet.clone();
        if packet.is_user_id() {
            if any_uid_seen && visible && !has_valid_self_sig {
                summary.missing_self += 1;
            }
            any_uid_seen = true;
            visible = !only_selected || kb.node(i).unwrap().flags.sel_uid();
            has_valid_self_sig = false;
            if visible {
                events.push(SigEvent::UserId { uid_index: i });
            }
            continue;
        }
        if packet.is_subkey() {
            // Subkeys end uid visibility; binding-sig checks are out of
            // scope for this walk (it covers uid certifications per §4.4).
            if any_uid_seen && visible && !has_valid_self_sig {
                summary.missing_self += 1;
            }
            visible = false;
            continue;
        }
        if !visible || !packet.is_signature() {
            continue;
        }
        let sig = packet.as_signature().unwrap();
        if !sig.class.is_certification() {
            continue;
        }

        let result = crypto.check_key_signature(kb, i)?;
        {
            let node = kb.node_mut(i).unwrap();
            match result {
                SigCheckResult::Ok => node.flags.clear_sig_checks(),
                SigCheckResult::Bad => {
                    node.flags.set_bad_sig();
                    summary.bad += 1;
                }
                SigCheckResult::NoKey => {
                    node.flags.set_no_key();
                    summary.no_key += 1;
                }
                SigCheckResult::Other => {
                    node.flags.set_sig_err();
                    summary.other += 1;
                }
            }
            if let Some(sig_mut) = node.packet.as_signature_mut() {
                sig_mut.checked = Some(result);
            }
        }

        match kb.classify_signature(i) {
            SigKind::SelfSig => {
                if result == SigCheckResult::Ok {
                    has_valid_self_sig = true;
                }
                events.push(SigEvent::SelfSig { sig_index: i, result });
            }
            _ => {
                let display = match result {
                    SigCheckResult::NoKey => CertDisplay::Unknown,
                    _ => match crypto.get_user_id(sig.signer)? {
                        Some(name) => CertDisplay::Named(truncate40(&name)),
                        None => CertDisplay::Unknown,
                    },
                };
                events.push(SigEvent::Certification { sig_index: i, signer_display: display, result });
            }
        }
    }

    if any_uid_seen && visible && !has_valid_self_sig {
        summary.missing_self += 1;
    }

    Ok((summary, events))
}

fn truncate40(s: &str) -> String {
    if s.chars().count() <= 40 {
        s.to_string()
    } else {
        s.chars().take(40).collect()
    }
}
