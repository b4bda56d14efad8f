//! Library half of the `keyedit` binary: the ambient stack around the
//! `keyedit-core` algorithms — configuration, the demo crypto/keyring
//! collaborators, the TTY prompter, and the menu dispatcher. Split out of
//! `main.rs` so integration tests can drive a session the same way the
//! binary's read-eval loop does, without shelling out to a subprocess.

pub mod config;
pub mod crypto;
pub mod menu;
pub mod session;
pub mod store;
pub mod tty;
