use std::path::PathBuf;
use std::process;

use anyhow::Context;
use clap::Parser;
use clap::error::ErrorKind;

use exist_fs::{Config, ExistFs, Traced, fuse, logging};

#[derive(Parser)]
#[command(
    name = "exist-fs",
    version,
    about = "Mounts a file system where /exist/<p> exists with probability p"
)]
struct Cli {
    /// Mount point path
    mountpoint: PathBuf,
    /// Seed the random source for a reproducible run
    #[arg(long)]
    seed: Option<u64>,
    /// Log level (trace, debug, info, warn, error); `debug` traces every call
    #[arg(long, default_value = "warn")]
    log_level: String,
    /// Allow other users to access the mount
    #[arg(long)]
    allow_other: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };

    logging::init(&cli.log_level)?;

    let mut config = Config::default();
    if let Some(seed) = cli.seed {
        config = config.seed(seed);
    }
    let fs = Traced::new(ExistFs::new(config));

    fuse::mount(fs, &cli.mountpoint, cli.allow_other)
        .with_context(|| format!("failed to mount at {}", cli.mountpoint.display()))
}
