use anyhow::{bail, Context, Result};
use clap::Parser;
use std::path::PathBuf;

use reel_sync::config;

#[derive(Debug, Parser)]
#[command(author, version, about = "Write an example config.yaml")]
struct Args {
    /// Where to write the file
    #[arg(default_value = "config.yaml")]
    path: PathBuf,

    /// Overwrite an existing file
    #[arg(long)]
    force: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    if args.path.exists() && !args.force {
        bail!(
            "{} already exists; pass --force to overwrite",
            args.path.display()
        );
    }
    if let Some(parent) = args.path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }
    std::fs::write(&args.path, config::example())
        .with_context(|| format!("failed to write {}", args.path.display()))?;
    println!("wrote {}", args.path.display());
    Ok(())
}
