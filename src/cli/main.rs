use std::path::PathBuf;
use std::process;

use clap::Parser;

use heic2jpg::pipeline;

#[derive(Parser, Debug)]
#[command(
    name = "heic2jpg",
    version,
    about = "Convert HEIC photos to JPEG while preserving embedded EXIF metadata"
)]
struct Cli {
    /// HEIC files or directories to convert
    #[arg(value_name = "PATH", required = true)]
    paths: Vec<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    if let Err(e) = pipeline::run(&cli.paths) {
        log::error!("{:#}", anyhow::Error::new(e));
        process::exit(1);
    }
}
