use clap::Parser;

mod cli;
mod initializers;
mod replay;

fn main() -> eyre::Result<()> {
    let cli::CLI { opts, command } = cli::CLI::parse();

    initializers::init_tracing(&opts)?;

    command.run(&opts)
}
