pub mod completions;
pub mod generate;
pub mod validate;

use clap::{Parser, Subcommand};

/// qrsmith - styled QR code generator
#[derive(Parser, Debug)]
#[command(name = "qrsmith")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a styled QR code and export it as PNG, SVG, or PDF
    Generate(generate::GenerateArgs),

    /// Validate URLs and style configuration files without exporting
    Validate(validate::ValidateArgs),

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}
