//! The five mutation operations (§4.5). Each enforces the public/secret
//! pairing invariant described in §3 before returning.

pub mod add_uid;
pub mod change_passphrase;
pub mod delete_subkey;
pub mod delete_uid;
pub mod sign_uids;

pub use add_uid::add_uid;
pub use change_passphrase::change_passphrase;
pub use delete_subkey::delete_subkey;
pub use delete_uid::delete_uid;
pub use sign_uids::sign_uids;
