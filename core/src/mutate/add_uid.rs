//! add-uid (§4.5.1).

use crate::collab::{CryptoBackend, SigRequest};
use crate::error::Result;
use crate::keyblock::Keyblock;
use crate::node::Node;
use crate::packet::{Packet, UserIdPacket};

/// Add a new user id, already-collected as raw name bytes by the caller's
/// menu handler, to both the public and (if present) secret keyblock.
///
/// On any failure nothing is inserted into either block: the self-signature
/// is produced before either insertion is attempted.
pub fn add_uid(
    public: &mut Keyblock,
    secret: Option<&mut Keyblock>,
    crypto: &dyn CryptoBackend,
    name: Vec<u8>,
) -> Result<()> {
    let signer = public.primary_keyid().ok_or(crate::error::Error::NoPrimarySecretKey)?;

    let uid_node = Node::new(Packet::UserId(UserIdPacket { name: name.clone() }));
    let insert_at = public.uid_insertion_point().unwrap_or_else(|| public.store.len() - 1);
    let uid_index = public.store.insert_after(insert_at, uid_node);

    let sig = crypto.make_keysig_packet(public, SigRequest::Certification { signer, uid_index })?;
    public.store.insert_after(uid_index, Node::new(Packet::Signature(sig.clone())));
    public.modified = true;

    if let Some(secret_kb) = secret {
        let sec_uid_node = Node::new(Packet::UserId(UserIdPacket { name }));
        let sec_insert_at = secret_kb.uid_insertion_point().unwrap_or_else(|| secret_kb.store.len() - 1);
        let sec_uid_index = secret_kb.store.insert_after(sec_insert_at, sec_uid_node);
        secret_kb.store.insert_after(sec_uid_index, Node::new(Packet::Signature(sig)));
        secret_kb.modified = true;
        secret_kb.merge_self_sigs();
    }

    public.merge_self_sigs();

    Ok(())
}
