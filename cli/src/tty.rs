//! TTY prompt collaborator. Interactive by default; supports a scripted
//! canned-response mode for the scenario tests in `tests/`.

use std::io::{self, BufRead, Write};

use keyedit_core::collab::Prompter;
use keyedit_core::Result;
use zeroize::Zeroizing;

pub struct InteractiveTty {
    stdin: io::Stdin,
}

impl InteractiveTty {
    pub fn new() -> Self {
        InteractiveTty { stdin: io::stdin() }
    }
}

impl Prompter for InteractiveTty {
    fn read_line(&mut self, prompt: &str) -> Result<String> {
        print!("{}", prompt);
        io::stdout().flush().ok();
        let mut line = String::new();
        self.stdin.lock().read_line(&mut line)?;
        Ok(line.trim_end_matches(['\n', '\r']).to_string())
    }

    fn confirm(&mut self, prompt: &str, default_no: bool) -> Result<bool> {
        let suffix = if default_no { "(y/N)" } else { "(Y/n)" };
        let answer = self.read_line(&format!("{} {} ", prompt, suffix))?;
        Ok(match answer.trim().to_lowercase().as_str() {
            "" => !default_no,
            "y" | "yes" => true,
            _ => false,
        })
    }

    fn read_passphrase(&mut self, prompt: &str) -> Result<Zeroizing<Vec<u8>>> {
        let pass = rpassword::read_password_from_tty(Some(prompt))?;
        Ok(Zeroizing::new(pass.into_bytes()))
    }

    fn print(&mut self, text: &str) {
        print!("{}", text);
    }

    fn is_interactive(&self) -> bool {
        atty_stdin()
    }
}

#[cfg(unix)]
fn atty_stdin() -> bool {
    use std::os::unix::io::AsRawFd;
    unsafe { libc_isatty(io::stdin().as_raw_fd()) }
}

#[cfg(not(unix))]
fn atty_stdin() -> bool {
    true
}

#[cfg(unix)]
fn libc_isatty(fd: i32) -> bool {
    extern "C" {
        fn isatty(fd: i32) -> i32;
    }
    unsafe { isatty(fd) != 0 }
}

/// Scripted prompter for batch/test invocations: confirmations and
/// passphrases are consumed from fixed queues rather than read from a
/// terminal, matching `keyedit.c`'s batch-mode early rejection generalized
/// here to a per-prompt canned-response policy.
pub struct ScriptedTty {
    pub lines: Vec<String>,
    pub confirms: Vec<bool>,
    pub passphrases: Vec<Vec<u8>>,
    pub transcript: Vec<String>,
}

impl ScriptedTty {
    pub fn new() -> Self {
        ScriptedTty { lines: Vec::new(), confirms: Vec::new(), passphrases: Vec::new(), transcript: Vec::new() }
    }
}

impl Prompter for ScriptedTty {
    fn read_line(&mut self, _prompt: &str) -> Result<String> {
        if self.lines.is_empty() {
            return Ok(String::new());
        }
        Ok(self.lines.remove(0))
    }

    fn confirm(&mut self, _prompt: &str, default_no: bool) -> Result<bool> {
        Ok(if self.confirms.is_empty() { !default_no } else { self.confirms.remove(0) })
    }

    fn read_passphrase(&mut self, _prompt: &str) -> Result<Zeroizing<Vec<u8>>> {
        if self.passphrases.is_empty() {
            return Ok(Zeroizing::new(Vec::new()));
        }
        Ok(Zeroizing::new(self.passphrases.remove(0)))
    }

    fn print(&mut self, text: &str) {
        self.transcript.push(text.to_string());
    }

    fn is_interactive(&self) -> bool {
        false
    }
}
