// compose-demo: interactive compose state machine.
//
// Reads keysym names from stdin (whitespace separated, e.g.
// "dead_tilde space" or "Multi_key apostrophe e"), feeds them to a compose
// state, and prints the status and result after each one.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use libcompose_core::{
    CompileFlags, ComposeConfig, ComposeState, ComposeTable, Format, Keysym, StateFlags,
    Status,
};

#[derive(Parser)]
#[command(about = "Interactively feed keysym names to a compose state machine")]
struct Args {
    /// Compose file to compile. Without it, the locale search is used.
    #[arg(long)]
    file: Option<PathBuf>,

    /// Locale to resolve and build for. Empty means "from the environment".
    #[arg(long, default_value = "")]
    locale: String,

    /// Optional TOML config with locale and path overrides.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn status_name(status: Status) -> &'static str {
    match status {
        Status::Nothing => "nothing",
        Status::Composing => "composing",
        Status::Composed => "composed",
        Status::Cancelled => "cancelled",
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => ComposeConfig::load_toml(path)
            .map_err(|e| anyhow::anyhow!("failed to load config {}: {e}", path.display()))?,
        None => ComposeConfig::default(),
    };
    let env = config.environment();

    let locale = if args.locale.is_empty() {
        config.locale().to_string()
    } else {
        args.locale.clone()
    };

    let table = match &args.file {
        Some(path) => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("failed to open {}", path.display()))?;
            ComposeTable::from_reader_with_env(
                &env,
                file,
                &locale,
                Format::TextV1,
                CompileFlags::NONE,
            )?
        }
        None => ComposeTable::from_locale_with_env(&env, &locale, CompileFlags::NONE)?,
    };
    let table = table.share();

    println!("compose-demo: locale {}, {} sequences", table.locale(), table.sequences().count());
    println!("Type keysym names (e.g. dead_tilde space), \"reset\", or Ctrl-D to quit.");
    println!();

    let mut state = ComposeState::new(Arc::clone(&table), StateFlags::NONE)?;
    let stdin = io::stdin();

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }

        for word in line.split_whitespace() {
            if word == "reset" {
                state.reset();
                println!("  reset");
                continue;
            }

            let Some(keysym) = Keysym::from_name(word) else {
                println!("  {word}: unknown keysym name");
                continue;
            };

            state.feed(keysym);
            let status = state.status();
            if status == Status::Composed {
                let sym = state.one_sym();
                if sym == Keysym::NO_SYMBOL {
                    println!("  {word}: {} -> {:?}", status_name(status), state.utf8());
                } else {
                    println!(
                        "  {word}: {} -> {:?} {sym}",
                        status_name(status),
                        state.utf8()
                    );
                }
            } else {
                println!("  {word}: {}", status_name(status));
            }
        }
    }

    Ok(())
}
