//! parley CLI binary entry point.

use parley::cli::{Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse_args();
    parley::cli::init_tracing();

    let result = match cli.command {
        Commands::Serve(args) => parley::cli::serve::handle_serve(args).await,
        Commands::Chat(args) => parley::cli::chat::handle_chat(args).await,
        Commands::Complete(args) => parley::cli::chat::handle_complete(args).await,
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
