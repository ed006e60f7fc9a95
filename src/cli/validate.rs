//! Validate command implementation.
//!
//! Checks URLs and config files without generating anything.

use std::fs;
use std::path::PathBuf;

use clap::Args;

use crate::error::{QrsmithError, Result};
use crate::output::Printer;
use crate::types::StyleConfig;
use crate::url::{format_url, is_valid_url};

/// Validate URLs and style configuration files without exporting
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// URLs to check
    pub urls: Vec<String>,

    /// Style configuration files (JSON or YAML) to check
    #[arg(long)]
    pub config: Vec<PathBuf>,
}

pub fn run(args: ValidateArgs) -> Result<()> {
    let printer = Printer::new();
    let mut failures = 0usize;

    for url in &args.urls {
        if is_valid_url(url) {
            printer.status("Valid", &format!("{} -> {}", url, format_url(url)));
        } else {
            printer.error("Invalid", url);
            failures += 1;
        }
    }

    for path in &args.config {
        match check_config(path) {
            Ok(warnings) => {
                printer.status("Valid", &path.display().to_string());
                for warning in warnings {
                    printer.warning("Warning", &warning);
                }
            }
            Err(err) => {
                printer.error("Invalid", &format!("{}: {}", path.display(), err));
                failures += 1;
            }
        }
    }

    if failures > 0 {
        return Err(QrsmithError::input(format!(
            "{} input(s) failed validation",
            failures
        )));
    }
    Ok(())
}

fn check_config(path: &PathBuf) -> Result<Vec<String>> {
    let source = fs::read_to_string(path).map_err(|e| QrsmithError::Io {
        path: path.clone(),
        message: format!("Failed to read config file: {}", e),
    })?;

    let config: StyleConfig = if path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
    {
        serde_json::from_str(&source).map_err(|e| QrsmithError::Parse {
            message: e.to_string(),
            help: None,
        })?
    } else {
        serde_yaml::from_str(&source).map_err(|e| QrsmithError::Parse {
            message: e.to_string(),
            help: None,
        })?
    };

    let mut warnings = config.validate()?;
    if !is_valid_url(&config.text) {
        return Err(QrsmithError::input(format!(
            "not a valid URL: {:?}",
            config.text
        )));
    }
    if config.text != format_url(&config.text) {
        warnings.push(format!(
            "text will be normalized to {}",
            format_url(&config.text)
        ));
    }
    Ok(warnings)
}
