mod cli;

use anyhow::Result;

use taskdesk::config;

#[tokio::main]
async fn main() -> Result<()> {
    // Load config
    let config = config::load_config()?;
    config.logging.init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = match cli::parse_args(&args) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("error: {e}\n");
            cli::print_help();
            std::process::exit(2);
        }
    };

    tracing::debug!(
        command = args.first().map(String::as_str).unwrap_or("help"),
        "dispatching"
    );
    cli::run(command, &config).await
}
