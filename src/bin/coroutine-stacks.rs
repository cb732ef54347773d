use std::io;
use std::path::PathBuf;

use clap::{ArgAction, Parser};
use coroutine_stacks::{batch, tree};
use env_logger::Env;
use is_terminal::IsTerminal;
use log::warn;

#[derive(Debug, Parser)]
#[clap(
    name = "coroutine-stacks",
    about,
    after_help = "\
[1] A dump lists one coroutine per header line, followed by its stack frames:
        \"coroutine#1\":StandaloneCoroutine{Active}@1b2c3d, state: SUSPENDED
            at kotlinx.coroutines.DelayKt.delay(Delay.kt:160)
            at com.example.MainKt$main$1.invokeSuspend(Main.kt:12)
    Coroutines that end in the same frames are grouped under one header."
)]
struct Opt {
    /// Directory to write one rendered tree per dump into (required if PATH is a directory)
    #[clap(short = 'o', long = "output-dir", value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Silence all log output
    #[clap(short = 'q', long = "quiet")]
    quiet: bool,

    /// Verbose logging mode (-v, -vv, -vvv)
    #[clap(short = 'v', long = "verbose", action = ArgAction::Count)]
    verbose: u8,

    /// Dump file or directory of dumps, or STDIN if not specified
    #[clap(value_name = "PATH")]
    infile: Option<PathBuf>,
}

fn main() -> io::Result<()> {
    let opt = Opt::parse();

    // Initialize logger
    if !opt.quiet {
        env_logger::Builder::from_env(Env::default().default_filter_or(match opt.verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        }))
        .format_timestamp(None)
        .init();
    }

    match opt.infile {
        Some(ref path) if path.is_dir() => {
            let out_dir = opt.output_dir.as_ref().ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("{} is a directory; pass --output-dir", path.display()),
                )
            })?;
            let summary = batch::from_dir(path, out_dir)?;
            if !summary.is_clean() {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!(
                        "{} of {} dumps were malformed",
                        summary.malformed.len(),
                        summary.malformed.len() + summary.written.len()
                    ),
                ));
            }
            Ok(())
        }
        infile => {
            if opt.output_dir.is_some() {
                warn!("--output-dir is only used when PATH is a directory");
            }
            if infile.is_none() && io::stdin().is_terminal() {
                warn!("Reading coroutine dump from terminal; end input with Ctrl-D");
            }
            tree::from_file(infile.as_ref(), io::stdout().lock())
        }
    }
}
