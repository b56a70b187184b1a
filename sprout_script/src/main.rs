use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use sprout_script::{demo, ChapterOneConfig, ChapterThreeConfig, SCRIPT_LEN};

/// Validates chapter configuration files and emits the built-in demos.
#[derive(Parser, Debug)]
#[command(about = "Check lesson script/config JSON files", version)]
struct Args {
    /// Chapter config JSON to validate ("one" or "three" layout per --chapter)
    #[arg(long)]
    check: Option<PathBuf>,

    /// Which chapter layout the checked file uses: one | three
    #[arg(long, default_value = "one")]
    chapter: String,

    /// Write the built-in chapter 1 demo config to this path
    #[arg(long)]
    emit_chapter_one: Option<PathBuf>,

    /// Write the built-in chapter 3 demo config to this path
    #[arg(long)]
    emit_chapter_three: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut did_work = false;

    if let Some(path) = args.check.as_deref() {
        match args.chapter.as_str() {
            "one" => {
                let config = ChapterOneConfig::load(path)
                    .with_context(|| format!("checking chapter 1 config {}", path.display()))?;
                println!(
                    "ok: {} lines, {} auto, {} seed pots, next scene '{}'",
                    SCRIPT_LEN,
                    config.first_auto_count,
                    config.required_seed_pots,
                    config.next_scene_name
                );
            }
            "three" => {
                let config = ChapterThreeConfig::load(path)
                    .with_context(|| format!("checking chapter 3 config {}", path.display()))?;
                println!(
                    "ok: {} lines, default delay {}s, pot counts {:?}",
                    SCRIPT_LEN, config.default_delay, config.pot_required_counts
                );
            }
            other => bail!("unknown chapter layout '{other}' (expected one|three)"),
        }
        did_work = true;
    }

    if let Some(path) = args.emit_chapter_one.as_deref() {
        let json = serde_json::to_string_pretty(&demo::chapter_one())
            .context("serializing chapter 1 demo config")?;
        fs::write(path, json)
            .with_context(|| format!("writing chapter 1 config to {}", path.display()))?;
        println!("wrote chapter 1 demo config to {}", path.display());
        did_work = true;
    }

    if let Some(path) = args.emit_chapter_three.as_deref() {
        let json = serde_json::to_string_pretty(&demo::chapter_three())
            .context("serializing chapter 3 demo config")?;
        fs::write(path, json)
            .with_context(|| format!("writing chapter 3 config to {}", path.display()))?;
        println!("wrote chapter 3 demo config to {}", path.display());
        did_work = true;
    }

    if !did_work {
        bail!("nothing to do: pass --check, --emit-chapter-one, or --emit-chapter-three");
    }
    Ok(())
}
