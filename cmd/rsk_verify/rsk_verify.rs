use clap::Parser;
use rsk_verify::{cli::CLI, initializers::init_tracing};

fn main() -> eyre::Result<()> {
    let CLI { opts, command } = CLI::parse();
    init_tracing(&opts)?;
    command.run(&opts)
}
