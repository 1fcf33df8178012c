use std::env;

use clap::Parser;
use nestegg::api::{Cli, init_tracing, run_cli, run_http_server};

#[tokio::main]
async fn main() {
    let raw_args: Vec<String> = env::args().collect();
    if raw_args.get(1).map(|s| s.as_str()) == Some("serve") {
        let port = raw_args
            .get(2)
            .and_then(|s| s.parse::<u16>().ok())
            .unwrap_or(8080);
        init_tracing("info");
        if let Err(e) = run_http_server(port).await {
            eprintln!("Server error: {e}");
            std::process::exit(1);
        }
        return;
    }

    let cli = Cli::parse();
    init_tracing(&cli.log_level);
    // The engine is CPU-bound; keep it off the async workers.
    let outcome = tokio::task::spawn_blocking(move || run_cli(&cli)).await;
    match outcome {
        Ok(Ok(json)) => println!("{json}"),
        Ok(Err(e)) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("simulation task failed: {e}");
            std::process::exit(1);
        }
    }
}
