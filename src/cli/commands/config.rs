//! Config command - show current configuration

use crate::cli::output::{colors, print_header};
use crate::cli::OutputFormat;
use crate::core::config::Config;
use crate::core::xdg::XdgDirs;
use clap::Args;

/// Arguments for the show-config command
#[derive(Args, Debug)]
pub struct ConfigArgs {
    /// Also show where configuration is read from
    #[arg(long, short = 'p')]
    pub paths: bool,
}

/// Execute the show-config command
///
/// Human output is the effective configuration as TOML, ready to be
/// saved as a config file. API keys are redacted in both formats.
pub fn execute(
    args: ConfigArgs,
    config: &Config,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = redacted(config);

    match format {
        OutputFormat::Human => {
            if args.paths {
                let xdg = XdgDirs::new();
                print_header("Configuration files:");
                println!(
                    "  {} {}",
                    colors::dim("xdg:"),
                    colors::file_path(&xdg.config_file().display().to_string())
                );
                println!("  {} ./ragchat.toml", colors::dim("local:"));
                println!();
            }
            print!("{}", toml::to_string_pretty(&config)?);
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

fn redacted(config: &Config) -> Config {
    let mut config = config.clone();
    if config.embedding.api_key.is_some() {
        config.embedding.api_key = Some("[REDACTED]".to_string());
    }
    config
}
