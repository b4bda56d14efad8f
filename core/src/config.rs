//! Editor-wide configuration: S2K and cipher defaults used when protecting
//! secret material. Built with the same builder pattern the teacher's
//! `sequoia_core::Context::configure()` uses, rather than a config file
//! format this project has no other use for.

use crate::packet::{CipherAlgorithm, DigestAlgorithm};

#[derive(Debug, Clone)]
pub struct EditorConfig {
    cipher: CipherAlgorithm,
    s2k_digest: DigestAlgorithm,
    s2k_count: u32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        EditorConfig {
            cipher: CipherAlgorithm::Aes256,
            s2k_digest: DigestAlgorithm::Sha256,
            s2k_count: 65536,
        }
    }
}

impl EditorConfig {
    pub fn configure() -> EditorConfigBuilder {
        EditorConfigBuilder(EditorConfig::default())
    }

    pub fn cipher(&self) -> CipherAlgorithm {
        self.cipher
    }

    pub fn s2k_digest(&self) -> DigestAlgorithm {
        self.s2k_digest
    }

    pub fn s2k_count(&self) -> u32 {
        self.s2k_count
    }
}

pub struct EditorConfigBuilder(EditorConfig);

impl EditorConfigBuilder {
    pub fn cipher(mut self, cipher: CipherAlgorithm) -> Self {
        self.0.cipher = cipher;
        self
    }

    pub fn s2k_digest(mut self, digest: DigestAlgorithm) -> Self {
        self.0.s2k_digest = digest;
        self
    }

    pub fn s2k_count(mut self, count: u32) -> Self {
        self.0.s2k_count = count;
        self
    }

    pub fn build(self) -> EditorConfig {
        self.0
    }
}
