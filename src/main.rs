use clap::Parser;
use debtplan::api::{Cli, Command, run_http_server, run_plan};
use simple_logger::SimpleLogger;
use std::io;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    if let Err(e) = SimpleLogger::new().with_level(cli.log_level).init() {
        eprintln!("Logger error: {e}");
    }

    match cli.command {
        Command::Serve(args) => {
            if let Err(e) = run_http_server(args.port).await {
                eprintln!("Server error: {e}");
                std::process::exit(1);
            }
        }
        Command::Plan(args) => {
            if let Err(e) = run_plan(&args, io::stdin().lock(), io::stdout().lock()) {
                eprintln!("{e}");
                std::process::exit(1);
            }
        }
    }
}
