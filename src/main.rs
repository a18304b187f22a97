//! Starcheat Release - CI build and release pipeline for the starcheat macOS bundle.

use starcheat_release::cli;
use starcheat_release::cli::OutputManager;
use std::process;

#[tokio::main]
async fn main() {
    env_logger::init();

    match cli::run().await {
        Ok(exit_code) => {
            process::exit(exit_code);
        }
        Err(e) => {
            let output = OutputManager::new();

            let suggestions = e.recovery_suggestions();
            if !suggestions.is_empty() {
                output.println("\n💡 Recovery suggestions:");
                for suggestion in suggestions {
                    output.indent(&suggestion);
                }
            }

            // Fatal error stays the last line of the log.
            output.error(&format!("Fatal error: {e}"));
            process::exit(1);
        }
    }
}
