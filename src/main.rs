use clap::Parser;
use stockcast::cli::{Cli, init_logging, resolve_log_level, run};

fn main() -> std::process::ExitCode {
    let cli = Cli::parse();
    init_logging(resolve_log_level(&cli).as_deref());
    run(cli)
}
