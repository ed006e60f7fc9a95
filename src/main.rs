use clap::Parser;
use miette::Result;
use qrsmith::cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate(args) => qrsmith::cli::generate::run(args)?,
        Commands::Validate(args) => qrsmith::cli::validate::run(args)?,
        Commands::Completions(args) => qrsmith::cli::completions::run(args)?,
    }

    Ok(())
}
