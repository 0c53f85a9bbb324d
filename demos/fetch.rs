//! Example downloading versions of a configured tool.
//!
//! ```sh
//! cargo run --example fetch -- code 1.49 1.50
//! ```
//!
//! The tool must be described in a `toolsrc.{yml,yaml,toml,json}` file in
//! the current directory, the home directory or next to the executable.

use color_eyre::eyre::{eyre, Result};
use toolstash::{ConfigResolver, ToolConfigRecord};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let tool = args
        .next()
        .ok_or_else(|| eyre!("usage: fetch <tool> [version...]"))?;
    let versions: Vec<String> = args.collect();

    let resolver = ConfigResolver::new();
    println!("Using {}", resolver.config_path(true).await?.display());
    let installer = resolver
        .get(&tool, &ToolConfigRecord::default(), true)
        .await?;

    // Without versions, report what is already there.
    if versions.is_empty() {
        for version in installer.downloaded().await? {
            println!("{tool} {version}: {}", installer.downloaded_file(&version)?.display());
        }
        return Ok(());
    }

    let mut failed = 0;
    for (version, result) in installer.download_many(&versions).await {
        match result {
            Ok(path) => println!("{tool} {version}: {}", path.display()),
            Err(e) => {
                failed += 1;
                eprintln!("{tool} {version}: {e}");
            }
        }
    }

    println!(
        "\nDownloaded {} of {} versions.",
        versions.len() - failed,
        versions.len()
    );
    Ok(())
}
