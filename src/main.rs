// src/main.rs

use gowatch::{cli, logging, run};

#[tokio::main]
async fn main() {
    if let Err(err) = run_main().await {
        eprintln!("gowatch error: {err:?}");
        std::process::exit(1);
    }
}

async fn run_main() -> anyhow::Result<()> {
    let args = cli::parse();
    if args.version {
        println!("{}", cli::version_string());
        return Ok(());
    }
    logging::init_logging(args.log_level)?;
    run(args).await?;
    Ok(())
}
