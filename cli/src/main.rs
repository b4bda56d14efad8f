//! Command-line entry point for the interactive keyblock editor.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::rc::Rc;

use clap::Parser;
use keyedit_cli::config::CliConfig;
use keyedit_cli::crypto::DemoCrypto;
use keyedit_cli::menu;
use keyedit_cli::session::Session;
use keyedit_cli::store::{JsonKeyringStore, TrustDb};
use keyedit_cli::tty;
use keyedit_core::collab::KeyringStore;

#[derive(Parser)]
#[command(name = "keyedit", about = "Interactive editor for OpenPGP-style keyblocks")]
struct Cli {
    /// User id (or a substring of one) identifying the keyblock to edit.
    user_id: String,

    /// Override the keyring home directory (defaults to $KEYEDIT_HOME or ~/.keyedit).
    #[arg(long)]
    home: Option<PathBuf>,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let mut config_builder = CliConfig::configure();
    if let Some(home) = cli.home {
        config_builder = config_builder.home(home);
    }
    let config = config_builder.build();

    if let Err(e) = run(&cli.user_id, &config) {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(user_id: &str, config: &CliConfig) -> keyedit_core::Result<()> {
    let store = JsonKeyringStore::new(&config.home)?;
    let trust = Rc::new(TrustDb::new());
    let crypto = DemoCrypto::new(Rc::clone(&trust));

    let store_dyn: &dyn KeyringStore = &store;
    let mut session = Session::open(store_dyn, &crypto, config, user_id)?;

    let mut tty = tty::InteractiveTty::new();
    println!("editing key for \"{}\". type help for a list of commands.", user_id);

    loop {
        print!("command> ");
        io::stdout().flush().ok();
        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            break; // end of input behaves like `quit`
        }
        if !menu::dispatch(&mut session, &mut tty, trust.as_ref(), &line) {
            break;
        }
    }

    session.release();
    Ok(())
}
