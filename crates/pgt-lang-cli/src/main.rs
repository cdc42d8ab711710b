//! `lang`: load a Lang file and print it.

mod args;
mod logging;
mod print;

use std::io::{self, Write};

use anyhow::{Context, Result};
use clap::Parser;

use args::Args;
use logging::{init_logging, LoggingConfig};
use pgt_lang::Loader;

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(LoggingConfig { env_filter: args.log_level.clone(), ..Default::default() });
    log::debug!("{args:?}");

    let mut out = io::stdout().lock();
    run(&args, &mut out)?;
    out.flush()?;
    Ok(())
}

fn run(args: &Args, out: &mut impl Write) -> Result<()> {
    let loader = Loader::new().encoding(&args.encoding);

    if args.raw {
        let raw = loader.load_file_raw(&args.input)?;
        if args.json {
            serde_json::to_writer_pretty(&mut *out, &raw)?;
            writeln!(out)?;
        } else {
            print::write_raw(out, &raw)?;
        }
        return Ok(());
    }

    let tree = loader.load_file(&args.input)?;
    log::info!("loaded {} ({} entries)", args.input.display(), tree.len());

    match &args.get {
        Some(path) => {
            let node = tree
                .get(path)
                .with_context(|| format!("'{path}' is not in {}", args.input.display()))?;
            if args.json {
                serde_json::to_writer_pretty(&mut *out, node)?;
                writeln!(out)?;
            } else {
                print::write_node(out, node)?;
            }
        }
        None if args.json => {
            serde_json::to_writer_pretty(&mut *out, &tree)?;
            writeln!(out)?;
        }
        None => print::write_tree(out, &tree)?,
    }
    Ok(())
}
