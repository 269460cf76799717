use clap::Parser;
use preftree::cli::commands::Cli;
use preftree::cli::{handlers, logging};

fn main() {
    let cli = Cli::parse();

    match cli.command {
        None => {
            // No subcommand → launch TUI (logs go to a file inside it)
            if let Err(e) = preftree::tui::run(cli.dir.as_deref(), cli.advanced) {
                eprintln!("error: {}", e);
                std::process::exit(1);
            }
        }
        Some(_) => {
            logging::init_stderr();
            if let Err(e) = handlers::dispatch(cli) {
                eprintln!("error: {}", e);
                std::process::exit(1);
            }
        }
    }
}
