use std::env;
use std::path::PathBuf;

use tiny_rasterizer::app;
use tiny_rasterizer::config::RenderConfig;
use tracing::warn;

/// Config file from `-c`, then the remaining flags on top of it.
fn parse_args() -> anyhow::Result<RenderConfig> {
    let args: Vec<String> = env::args().collect();

    let mut config = match args.iter().position(|arg| arg == "-c") {
        Some(i) if i + 1 < args.len() => RenderConfig::from_file(&args[i + 1])?,
        _ => RenderConfig::default(),
    };

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-c" if i + 1 < args.len() => {
                i += 2;
            }
            "-m" if i + 1 < args.len() => {
                config.model_path = PathBuf::from(&args[i + 1]);
                i += 2;
            }
            "-t" if i + 1 < args.len() => {
                config.texture_path = Some(PathBuf::from(&args[i + 1]));
                i += 2;
            }
            "-s" if i + 1 < args.len() => {
                config.shader = args[i + 1].parse()?;
                i += 2;
            }
            "-o" if i + 1 < args.len() => {
                config.output_path = Some(PathBuf::from(&args[i + 1]));
                i += 2;
            }
            "--depth" => {
                config.depth_view = true;
                i += 1;
            }
            "--fps" => {
                config.print_fps = true;
                i += 1;
            }
            other => {
                warn!(arg = other, "Ignoring unknown argument");
                i += 1;
            }
        }
    }
    return Ok(config);
}

#[show_image::main]
fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = parse_args()?;
    app::run(config)?;

    return Ok(());
}
