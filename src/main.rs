mod app;
mod config;
mod engine;
mod model;
mod util;

use std::path::PathBuf;

use anyhow::{Result, anyhow};
use clap::Parser;
use log::info;

use crate::app::{LaunchSettings, TopicAtlasApp};
use crate::config::LayoutConfig;

#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// JSON payload exported from a fitted topic model.
    payload: PathBuf,

    /// Initial view as a fragment, e.g. `topic=3&lambda=0.6&term=bank`.
    #[arg(long)]
    state: Option<String>,

    /// JSON file overriding layout geometry and animation timings.
    #[arg(long)]
    layout: Option<PathBuf>,

    /// Bar transition duration in milliseconds.
    #[arg(long)]
    duration_ms: Option<u64>,

    /// Share of the map area covered by all topic circles.
    #[arg(long)]
    circle_proportion: Option<f64>,

    /// Same as `--circle-proportion` for circles conditioned on a term.
    #[arg(long)]
    term_proportion: Option<f64>,

    /// Log filter used when RUST_LOG is unset.
    #[arg(long, default_value = "info")]
    log_level: String,
}

impl Args {
    fn layout_config(&self) -> Result<LayoutConfig> {
        let mut config = match &self.layout {
            Some(path) => LayoutConfig::load(path)?,
            None => LayoutConfig::default(),
        };

        if let Some(duration_ms) = self.duration_ms {
            config.transition_ms = duration_ms;
        }
        if let Some(proportion) = self.circle_proportion {
            config.circle_proportion = proportion;
        }
        if let Some(proportion) = self.term_proportion {
            config.term_proportion = proportion;
        }

        Ok(config)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&args.log_level))
        .init();

    let layout = args.layout_config()?;
    info!(
        "layout {}x{}, transitions {} ms",
        layout.total_width(),
        layout.total_height(),
        layout.transition_ms
    );

    let settings = LaunchSettings {
        payload_path: args.payload,
        initial_fragment: args.state,
        layout,
    };
    let options = eframe::NativeOptions {
        viewport: eframe::egui::ViewportBuilder::default().with_inner_size([1500.0, 980.0]),
        ..Default::default()
    };

    eframe::run_native(
        "topic-atlas",
        options,
        Box::new(move |cc| Ok(Box::new(TopicAtlasApp::new(cc, settings)))),
    )
    .map_err(|error| anyhow!("failed to run the viewer: {error}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_overrides_layout_defaults() {
        let args = Args::try_parse_from([
            "topic-atlas",
            "model.json",
            "--duration-ms",
            "200",
            "--term-proportion",
            "0.5",
            "--state",
            "topic=2&lambda=0.5&term=",
        ])
        .expect("arguments parse");

        let config = args.layout_config().expect("default layout");
        assert_eq!(config.transition_ms, 200);
        assert_eq!(config.term_proportion, 0.5);
        assert_eq!(config.circle_proportion, 0.25);
        assert_eq!(args.state.as_deref(), Some("topic=2&lambda=0.5&term="));
        assert_eq!(args.log_level, "info");
    }
}
