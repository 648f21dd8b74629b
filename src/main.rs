use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use suara_gateway::api::ApiServer;
use suara_gateway::{Config, VoicePipeline};

/// Suara - voice-chat gateway (whisper.cpp STT, Gemini LLM, Coqui TTS)
#[derive(Parser)]
#[command(name = "suara", version, about)]
struct Cli {
    /// Address to bind
    #[arg(long, env = "SUARA_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(long, env = "SUARA_PORT")]
    port: Option<u16>,

    /// Path to a config file (default: ~/.config/suara/config.toml)
    #[arg(short, long, env = "SUARA_CONFIG")]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "info,suara_gateway=info",
        1 => "info,suara_gateway=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    tracing::info!(
        host = %config.server.host,
        port = config.server.port,
        stt_model = %config.stt.model.display(),
        llm_model = %config.llm.model,
        "starting suara gateway"
    );

    let pipeline = VoicePipeline::new(&config);
    let server = ApiServer::new(pipeline, config.server.host.clone(), config.server.port);

    server.run().await?;

    Ok(())
}
