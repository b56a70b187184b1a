use anyhow::{Context, Result};
use clap::Parser;

use sprout_engine::runtime::{self, DemoOptions};

mod cli;
use cli::{Args, Chapter};

fn main() -> Result<()> {
    let args = Args::parse();
    let chapter = args.chapter()?;
    let options = DemoOptions {
        ticks_per_second: args.ticks_per_second,
        verbose: args.verbose,
    };

    let report = match chapter {
        Chapter::One => runtime::run_chapter_one(options),
        Chapter::Three => runtime::run_chapter_three(options),
    };

    println!(
        "chapter {}: {} lines played, {} events",
        report.chapter,
        report.lines_played,
        report.events.len()
    );
    if let Some(scene) = report.pending_scene.as_deref() {
        println!("pending scene: {scene}");
    }

    if let Some(path) = args.event_log_json.as_deref() {
        runtime::write_event_log(path, &report)
            .with_context(|| format!("writing {}", path.display()))?;
        println!("event log written to {}", path.display());
    }

    Ok(())
}
