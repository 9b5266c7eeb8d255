use clap::Parser;

use gh_pages_push::{run, Cli};

fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            eprintln!("[ERROR] Publish failed: {e:#}");
            std::process::exit(1);
        }
    }
}
