//! In-memory keyblock model and editing algorithms for an OpenPGP-style
//! interactive key editor.
//!
//! This crate is deliberately I/O-free: keyring access, cryptographic
//! primitives, and operator interaction are all external collaborators
//! (see [`collab`]) implemented by the `cli` crate. What lives here is the
//! node store, the keyblock semantics, selection/marking, the signature
//! verification walk, and the five mutation operations.

pub mod collab;
pub mod config;
pub mod error;
pub mod ids;
pub mod keyblock;
pub mod mutate;
pub mod node;
pub mod packet;
pub mod selection;
pub mod store;
pub mod verify;

pub use error::{Error, Result};
pub use keyblock::Keyblock;
