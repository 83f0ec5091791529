// compose-inspect: compile a Compose file and dump the resulting table.
//
// Examples:
//   compose-inspect --file /usr/share/X11/locale/en_US.UTF-8/Compose
//   compose-inspect --locale en_US.UTF-8
//   compose-inspect --file my.Compose --stats-only

use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use libcompose_core::{CompileFlags, ComposeConfig, ComposeTable, Format, Keysym};

#[derive(Parser)]
#[command(about = "Compile a Compose file and dump its sequences")]
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

    /// Print only the table statistics, not the sequences.
    #[arg(long)]
    stats_only: bool,
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
            let file = File::open(path)
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

    let sequence_count = table.sequences().count();
    println!("locale:    {}", table.locale());
    println!("nodes:     {}", table.node_count());
    println!("utf8 blob: {} bytes", table.utf8_blob().len());
    println!("sequences: {sequence_count}");

    if args.stats_only {
        return Ok(());
    }

    println!();
    for entry in table.sequences() {
        let lhs: Vec<String> = entry
            .keysyms
            .iter()
            .map(|keysym| format!("<{keysym}>"))
            .collect();

        let mut rhs = String::new();
        if let Some(utf8) = entry.utf8 {
            rhs.push_str(&format!("{utf8:?}"));
        }
        if entry.keysym != Keysym::NO_SYMBOL {
            if !rhs.is_empty() {
                rhs.push(' ');
            }
            rhs.push_str(&entry.keysym.to_string());
        }

        println!("{} : {}", lhs.join(" "), rhs);
    }

    Ok(())
}
