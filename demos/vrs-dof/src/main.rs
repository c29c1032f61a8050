// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

// VRS + depth-of-field benchmark demo.
// Drives a simulated renderer frame by frame while a cooperative script runs
// the performance and quality procedures against it.

mod app;
mod procedures;
mod ui;

use std::path::PathBuf;

use anyhow::{Context, Result};
use baton_bench::{BenchConfig, SharedHost};
use baton_script::{CooperativeScript, ScriptConfig};
use clap::Parser;

use crate::app::DofApp;
use crate::procedures::Procedure;
use crate::ui::ConsoleUi;

#[derive(Debug, Parser)]
#[command(about = "Run scripted VRS/DoF benchmarks against a simulated renderer")]
struct Args {
    /// Benchmark configuration (RON). Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Procedures to run.
    #[arg(long, value_enum, default_value_t = Procedure::All)]
    procedure: Procedure,

    /// Press the panel's Stop button after this many frames.
    #[arg(long)]
    stop_after_frames: Option<u64>,

    /// Overrides the configured report root.
    #[arg(long)]
    report_dir: Option<PathBuf>,

    /// Run without writing any report.
    #[arg(long)]
    no_report: bool,

    /// Simulated frame rate of the host loop.
    #[arg(long, default_value_t = 60.0)]
    fps: f32,

    /// Hard limit on host frames, after which the script is stopped.
    #[arg(long, default_value_t = 100_000)]
    max_frames: u64,

    /// Width of the simulated framebuffer in pixels.
    #[arg(long, default_value_t = 320)]
    width: u32,

    /// Height of the simulated framebuffer in pixels.
    #[arg(long, default_value_t = 180)]
    height: u32,
}

fn load_config(args: &Args) -> Result<BenchConfig> {
    let mut config = match &args.config {
        Some(path) => BenchConfig::load(path)
            .with_context(|| format!("failed to load bench config '{}'", path.display()))?,
        None => BenchConfig::default(),
    };
    if let Some(dir) = &args.report_dir {
        config.report_root = dir.clone();
    }
    if args.no_report {
        config.write_report = false;
    }
    Ok(config)
}

fn main() -> Result<()> {
    use env_logger::{Builder, Env};

    Builder::from_env(Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = load_config(&args)?;
    let delta_time = 1.0 / args.fps.max(1.0);

    let host = SharedHost::new(DofApp::new(args.width, args.height));
    let mut script = CooperativeScript::new(ScriptConfig {
        thread_name: "vrs-dof-bench".to_string(),
        ..Default::default()
    });

    let script_host = host.clone();
    let procedure = args.procedure;
    script
        .start(move |s| procedures::run(procedure, s, script_host, config))
        .context("failed to start the benchmark script")?;

    let mut ui = ConsoleUi::new(args.stop_after_frames);
    while script.is_active() {
        host.with(|app| app.update(delta_time));
        script.tick(delta_time);

        ui.begin_frame();
        script.tick_ui(&mut ui);
        ui.end_frame();

        if host.with(|app| app.frame_index()) >= args.max_frames {
            log::warn!("Frame limit {} reached, stopping the script", args.max_frames);
            script.stop();
        }
    }

    let frames = host.with(|app| app.frame_index());
    log::info!(
        "Benchmark finished after {} frames (vrs mode back to {})",
        frames,
        host.with(|app| app.settings().vrs.mode)
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shipped_config_parses() {
        let config = BenchConfig::from_ron_str(include_str!("../bench.ron")).unwrap();
        assert_eq!(config.measure_frames, 240);
        assert!(config.save_captures);
    }

    #[test]
    fn test_cli_overrides_config() {
        let args = Args::try_parse_from([
            "vrs-dof",
            "--procedure",
            "quality",
            "--report-dir",
            "out",
            "--no-report",
        ])
        .unwrap();
        assert_eq!(args.procedure, Procedure::Quality);

        let config = load_config(&args).unwrap();
        assert_eq!(config.report_root, PathBuf::from("out"));
        assert!(!config.write_report);
    }

    #[test]
    fn test_every_flag_has_help() {
        use clap::CommandFactory;

        let command = Args::command();
        for arg in command.get_arguments() {
            if matches!(arg.get_id().as_str(), "help") {
                continue;
            }
            assert!(arg.get_help().is_some(), "--{} has no help", arg.get_id());
        }
    }

    #[test]
    fn test_missing_config_file_is_reported() {
        let args = Args::try_parse_from(["vrs-dof", "--config", "does/not/exist.ron"]).unwrap();
        let err = load_config(&args).unwrap_err();
        assert!(err.to_string().contains("does/not/exist.ron"));
    }
}
