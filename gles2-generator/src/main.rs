use std::path::PathBuf;

use anyhow::anyhow;
use clap::Parser;

struct Logger;

impl log::Log for Logger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        eprintln!(
            "{level:<5} {file}:{line} > {text}",
            level = record.level(),
            file = record.file().unwrap_or_else(|| record.target()),
            line = record
                .line()
                .map_or_else(|| "??".to_string(), |line| line.to_string()),
            text = record.args(),
        );
    }

    fn flush(&self) {}
}

impl Logger {
    fn init(verbose: bool) -> anyhow::Result<()> {
        log::set_logger(&Logger).map_err(|err| anyhow!("could not set logger: {err}"))?;
        log::set_max_level(if verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        });
        Ok(())
    }
}

/// generates the GLES2 command buffer sources from a signature file.
#[derive(Debug, Parser)]
#[command(version)]
struct Args {
    /// signature file, e.g. gles2/gl-specs/gles2_cmd_buffer_functions.txt.
    #[arg(long)]
    input: PathBuf,
    /// directory the `*_generated.rs` files are written to.
    #[arg(long)]
    out_dir: PathBuf,
    #[arg(long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    Logger::init(args.verbose)?;
    gles2_generator::generate(&args.input, &args.out_dir)
}
