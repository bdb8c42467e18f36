use diffstats::{cli, commands};
use std::process;
use tracing::error;

fn main() {
    let args = cli::parse_args();

    init_logging(&args);

    match commands::run(&args) {
        Ok(output) => println!("{}", output),
        Err(e) => {
            error!("{:#}", e);
            eprintln!("error: {:#}", e);
            process::exit(1);
        }
    }
}

fn init_logging(args: &cli::Args) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    // stdout carries the JSON output.
    fmt().with_env_filter(filter).with_target(true).with_writer(std::io::stderr).init();
}
