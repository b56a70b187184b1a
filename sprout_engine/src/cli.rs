use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;

#[derive(Parser, Debug)]
#[command(about = "Scripted playthroughs of the plant-growth lesson", version)]
pub struct Args {
    /// Chapter to run: one | three
    #[arg(long, default_value = "one")]
    pub chapter: String,

    /// Path to write the collected event log as JSON
    #[arg(long)]
    pub event_log_json: Option<PathBuf>,

    /// Simulation tick rate for the playthrough
    #[arg(long, default_value_t = 30)]
    pub ticks_per_second: u32,

    /// Echo every stage event to stderr as it happens
    #[arg(long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chapter {
    One,
    Three,
}

impl Args {
    pub fn chapter(&self) -> Result<Chapter> {
        match self.chapter.as_str() {
            "one" | "1" => Ok(Chapter::One),
            "three" | "3" => Ok(Chapter::Three),
            other => bail!("unknown chapter '{other}' (expected one|three)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chapter_parses_words_and_digits() {
        let args = Args::parse_from(["sprout_engine", "--chapter", "three"]);
        assert_eq!(args.chapter().expect("parses"), Chapter::Three);
        let args = Args::parse_from(["sprout_engine", "--chapter", "1"]);
        assert_eq!(args.chapter().expect("parses"), Chapter::One);
        let args = Args::parse_from(["sprout_engine", "--chapter", "two"]);
        assert!(args.chapter().is_err());
    }
}
