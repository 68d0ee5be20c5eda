use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;

use photo_chain::provider::ImageKind;
use photo_chain::{config, pipeline, server};

#[derive(Parser, Debug)]
#[command(
    name = "photo-chain",
    version,
    about = "Generate an image from a text prompt, falling back across Gemini, LoremFlickr and Picsum"
)]
struct Cli {
    /// Text prompt describing the image
    #[arg(value_name = "PROMPT")]
    prompt: Option<String>,

    /// Write the image bytes to this file (base64 results only)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Path to config file (default: config.json next to binary)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Initialize a default config.json and exit
    #[arg(long)]
    init: bool,

    /// Run the HTTP server instead of a one-shot generation
    #[arg(long)]
    serve: bool,

    /// Override the server port from config
    #[arg(long, value_name = "PORT")]
    port: Option<u16>,

    /// Output the result as JSON ({"photo": ...} or {"error": ...})
    #[arg(long)]
    json: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Handle --init
    if cli.init {
        let config = config::Config::default();
        let path = cli.config.as_deref();
        config.save(path)?;
        let save_path = match path {
            Some(p) => p.to_path_buf(),
            None => config::Config::config_path()?,
        };
        println!("Default config written to {}", save_path.display());
        return Ok(());
    }

    // Load config, keys from the environment fill the gaps
    let mut config = config::Config::load(cli.config.as_deref())?;
    config.apply_env();
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    // Build provider chain
    let chain = pipeline::build_provider_chain(&config);
    if chain.is_empty() {
        anyhow::bail!(
            "No image providers enabled. Run `photo-chain-cli --init` to create a config file."
        );
    }
    log::info!("Provider chain: {}", chain.provider_names().join(" → "));

    if cli.serve {
        return server::serve(&config, chain).await;
    }

    let Some(raw_prompt) = cli.prompt.filter(|p| !p.is_empty()) else {
        anyhow::bail!("Prompt is required. Use --help for usage.");
    };

    let generation = match pipeline::generate_image(&chain, &raw_prompt).await {
        Ok(generation) => generation,
        Err(error) => {
            if cli.json {
                println!("{}", serde_json::to_string_pretty(&error)?);
            }
            anyhow::bail!("{}", error.error);
        }
    };
    let is_url = generation.image.kind == ImageKind::Url;

    if let Some(ref path) = cli.output {
        match pipeline::decode_image(&generation.image)? {
            Some(bytes) => {
                std::fs::write(path, &bytes)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                log::info!("Wrote {} bytes to {}", bytes.len(), path.display());
            }
            None => log::warn!(
                "{} returned a URL; nothing written to {}",
                generation.provider,
                path.display()
            ),
        }
    }

    let response = pipeline::ImageResponse::from(generation.image);
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else if cli.output.is_none() || is_url {
        println!("{}", response.photo);
    }

    Ok(())
}
