// src/main.rs

use efifo::errors::EX_OK;
use efifo::{cli, logging, run};

#[tokio::main]
async fn main() {
    let code = run_main().await;
    std::process::exit(code);
}

async fn run_main() -> i32 {
    let args = cli::parse();
    if let Err(err) = logging::init_logging(args.log_level) {
        eprintln!("efifo error: {err:?}");
        return 1;
    }

    match run(args).await {
        Ok(()) => EX_OK,
        Err(err) => {
            tracing::error!("{err}");
            err.exit_code()
        }
    }
}
