//! CLI-level configuration: where the keyring store lives and which S2K /
//! cipher defaults the editor core should use. Wraps [`keyedit_core::config::EditorConfig`]
//! the way the teacher's `sequoia_core::Context` wraps its own policy knobs,
//! built once at startup from CLI flags and environment.

use std::path::PathBuf;

use keyedit_core::config::EditorConfig;
use keyedit_core::packet::{CipherAlgorithm, DigestAlgorithm};

pub struct CliConfig {
    pub home: PathBuf,
    pub editor: EditorConfig,
}

impl CliConfig {
    pub fn configure() -> CliConfigBuilder {
        CliConfigBuilder {
            home: default_home(),
            cipher: CipherAlgorithm::Aes256,
            digest: DigestAlgorithm::Sha256,
        }
    }
}

pub struct CliConfigBuilder {
    home: PathBuf,
    cipher: CipherAlgorithm,
    digest: DigestAlgorithm,
}

impl CliConfigBuilder {
    pub fn home(mut self, home: PathBuf) -> Self {
        self.home = home;
        self
    }

    pub fn build(self) -> CliConfig {
        CliConfig {
            home: self.home,
            editor: EditorConfig::configure().cipher(self.cipher).s2k_digest(self.digest).build(),
        }
    }
}

fn default_home() -> PathBuf {
    std::env::var_os("KEYEDIT_HOME")
        .map(PathBuf::from)
        .or_else(|| dirs_home().map(|h| h.join(".keyedit")))
        .unwrap_or_else(|| PathBuf::from(".keyedit"))
}

fn dirs_home() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}
