//! Command execution functions.
//!
//! Each command reports its own progress; this module turns errors into an
//! exit code and recovery suggestions.

mod plan;
mod publish;
mod wait;

use crate::cli::{Args, Command, RuntimeConfig};
use crate::error::Result;

use plan::execute_plan;
use publish::execute_publish;
use wait::execute_wait;

/// Execute the main command based on parsed arguments
pub async fn execute_command(args: Args) -> Result<i32> {
    if let Err(validation_error) = args.validate() {
        // Create output for validation errors (never quiet)
        let output = super::OutputManager::new(false, false);
        output.error(&format!("Invalid arguments: {}", validation_error));
        return Ok(2);
    }

    let config = RuntimeConfig::from(&args);

    let result = match &args.command {
        Command::Publish(publish) => execute_publish(publish, &config).await,
        Command::Plan(plan) => execute_plan(plan, &config).await,
        Command::Wait(wait) => execute_wait(wait, &config).await,
    };

    match result {
        Ok(exit_code) => Ok(exit_code),
        Err(e) => {
            config.error_println(&format!(
                "Command '{}' failed: {}",
                args.command.name(),
                e
            ));

            let suggestions = e.recovery_suggestions();
            if !suggestions.is_empty() && !config.is_quiet() {
                config.println("\n💡 Recovery suggestions:");
                for suggestion in suggestions {
                    config.println(&format!("  • {}", suggestion));
                }
            }

            Ok(1)
        }
    }
}
