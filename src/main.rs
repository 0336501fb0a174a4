use std::path::{Path, PathBuf};

use clap::Parser;
use fight::{config::Config, run, run_file};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Environment variable holding the log filter, such as `fight=debug`.
const LOG_ENV: &str = "FIGHT_LOG";

/// fight runs scripts written in the fight language.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Treat the contents argument as the path of a script file.
    #[arg(short, long)]
    file: bool,

    /// Print the value of the last expression statement after the run.
    #[arg(short, long)]
    pipe_mode: bool,

    /// Extra directories searched for modules, after the script's directory
    /// and before those listed in `FIGHT_PATH`.
    #[arg(short = 'L', long = "lib-dir")]
    lib_dirs: Vec<PathBuf>,

    /// The script source, or its path with `--file`.
    contents: String,
}

fn init_tracing() {
    if std::env::var_os(LOG_ENV).is_none() {
        return;
    }
    tracing_subscriber::registry().with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                                  .with(EnvFilter::from_env(LOG_ENV))
                                  .init();
}

fn main() {
    init_tracing();
    let args = Args::parse();

    let mut config = Config::from_env().with_auto_print(args.pipe_mode);
    for (index, dir) in args.lib_dirs.into_iter().enumerate() {
        config.lib_dirs.insert(index, dir);
    }

    let outcome = if args.file {
        run_file(Path::new(&args.contents), &config)
    } else {
        run(&args.contents, &config)
    };

    if let Err(e) = outcome {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
