//! One-shot CLI: reads a process request (JSON) and prints the rule document.
//!
//! Usage: `pickit-generate request.json > filter.txt`
//! The run log goes to stderr.

use anyhow::{bail, Context};
use pickit_generator::{http_pipeline, ProcessRequest, Settings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let Some(path) = std::env::args().nth(1) else {
        bail!("usage: pickit-generate <request.json>");
    };
    let raw = std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
    let request: ProcessRequest =
        serde_json::from_str(&raw).with_context(|| format!("parsing {path}"))?;

    let settings = Settings::load_default()?;
    let pipeline = http_pipeline(&settings)?;
    let opts = request.resolve(pipeline.defaults())?;
    if opts.is_empty() {
        bail!("Please select at least one category");
    }

    match pipeline.run(&opts).await {
        Ok(out) => {
            for line in &out.logs {
                eprintln!("{line}");
            }
            println!("{}", out.result);
            Ok(())
        }
        Err(fail) => {
            for line in &fail.logs {
                eprintln!("{line}");
            }
            Err(fail.into())
        }
    }
}
