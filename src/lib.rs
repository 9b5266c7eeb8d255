pub mod config;
pub mod git;
pub mod load_config;
pub mod publish;
pub mod stage;
pub mod store;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::git::GitCli;
use crate::load_config::load_config;
use crate::publish::publish;

#[derive(Parser)]
#[clap(
    name = "gh-pages-push",
    version,
    about = "Publish autogenerated documentation trees to a gh-pages branch"
)]
pub struct Cli {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Stage, commit and push all configured sites
    Publish {
        /// Path to the YAML config file
        #[clap(long, default_value = "publish.yaml")]
        config: PathBuf,
        /// Path to the git repository to publish from
        #[clap(long, default_value = ".")]
        repo: PathBuf,
    },
}

/// Extracted CLI logic entrypoint for integration tests and main()
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Publish { config, repo } => {
            let config = load_config(config)?;
            let store = GitCli::discover(&repo)?;
            println!("Publish starting...");
            match publish(&config, &repo, &store) {
                Ok(report) => {
                    println!("Publish complete.\nReport:");
                    println!("{:#?}", report);
                    Ok(())
                }
                Err(e) => Err(e.into()),
            }
        }
    }
}
