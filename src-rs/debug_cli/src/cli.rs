use clap::Parser;

use crate::models::CLIConfig;

#[derive(Debug, Parser)]
#[command(name = "task-converter-cli", about = "Interactive client for the task converter")]
struct Args {
    /// Base URL of the task converter server.
    #[arg(long = "base", env = "TASK_CONVERTER_URL", default_value = "http://localhost:8080")]
    base_url: String,

    /// Print raw JSON replies.
    #[arg(long, env = "TASK_CONVERTER_DEBUG", default_value_t = false)]
    debug: bool,
}

pub fn parse_config() -> CLIConfig {
    let args = Args::parse();
    CLIConfig {
        base_url: args.base_url,
        debug: args.debug,
    }
}
