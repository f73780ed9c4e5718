//! Showcase binary: a monstera plant under a pointer-driven pixelation effect.

mod app;
mod ids;
mod monstera;

use std::path::PathBuf;

use clap::Parser;

use vitrine_engine::coords::Viewport;
use vitrine_engine::device::GpuInit;
use vitrine_engine::logging::{init_logging, LoggingConfig};
use vitrine_engine::window::{LogicalSize, Runtime, RuntimeConfig};

use app::Showcase;

#[derive(Debug, Parser)]
#[command(name = "vitrine", about = "Interactive pixelation showcase")]
struct Cli {
    /// Directory holding `models/`, `hdr/` and `textures/`.
    #[arg(long, default_value = "assets")]
    assets: PathBuf,

    /// Log filter in `env_logger` syntax; overrides RUST_LOG.
    #[arg(long)]
    log: Option<String>,

    #[arg(long, default_value_t = 1280.0)]
    width: f64,

    #[arg(long, default_value_t = 720.0)]
    height: f64,

    /// Present without waiting for vertical blank.
    #[arg(long)]
    no_vsync: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(LoggingConfig {
        env_filter: cli.log.clone(),
        ..Default::default()
    });

    let title = "vitrine";
    let app = Showcase::new(
        title,
        cli.assets,
        Viewport::new(cli.width as f32, cli.height as f32),
    );

    let config = RuntimeConfig {
        title: title.to_string(),
        initial_size: LogicalSize::new(cli.width, cli.height),
    };
    let gpu = GpuInit::from_env().with_vsync(!cli.no_vsync);
    Runtime::run(config, gpu, app)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_defaults() {
        let cli = Cli::parse_from(["vitrine"]);
        assert_eq!(cli.assets, PathBuf::from("assets"));
        assert_eq!(cli.log, None);
        assert_eq!((cli.width, cli.height), (1280.0, 720.0));
        assert!(!cli.no_vsync);
    }

    #[test]
    fn cli_overrides() {
        let cli = Cli::parse_from([
            "vitrine", "--assets", "/data", "--log", "debug", "--width", "640",
            "--no-vsync",
        ]);
        assert_eq!(cli.assets, PathBuf::from("/data"));
        assert_eq!(cli.log.as_deref(), Some("debug"));
        assert_eq!(cli.width, 640.0);
        assert!(cli.no_vsync);
    }
}
