mod cli;
mod gui;
mod progress;

use anyhow::Context;
use chunksplit_core::{plan_outputs, run_with_progress, Config};
use env_logger::Env;
use log::info;

use crate::cli::{build_cli, select_mode, BatchJob, Mode, USAGE_HINT};
use crate::progress::BarProgress;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let matches = build_cli().get_matches();

    match select_mode(&matches) {
        Mode::Interface(settings) => gui::launch(settings),
        Mode::Batch(job) => run_batch(&job),
        Mode::Usage => {
            println!("{USAGE_HINT}");
            Ok(())
        }
    }
}

fn run_batch(job: &BatchJob) -> anyhow::Result<()> {
    let config = Config::builder(&job.input, &job.output, job.settings.chunk_length)
        .bitrate(job.settings.bitrate_kbps)
        .build()
        .with_context(|| {
            format!(
                "failed to create configuration for '{}'",
                job.input.display()
            )
        })?;

    if job.dry_run {
        let plan = plan_outputs(&config)
            .with_context(|| format!("failed to plan chunks for '{}'", job.input.display()))?;

        if plan.is_empty() {
            println!("Dry run: no chunks would be generated.");
        } else {
            println!("Dry run: would generate {} chunk(s):", plan.len());
            for chunk in plan {
                println!("  {}", chunk.path.display());
            }
        }

        return Ok(());
    }

    let mut progress = BarProgress::new();
    let report = run_with_progress(config, &mut progress)
        .with_context(|| format!("failed to split '{}'", job.input.display()))?;

    info!(
        "wrote {} chunk(s) to '{}'",
        report.chunks.len(),
        job.output.display()
    );

    Ok(())
}
