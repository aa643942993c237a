//! Completion statistics

use anyhow::Result;
use serde::Serialize;
use std::fmt;

use crate::cli::{GlobalArgs, StatsArgs};
use crate::glossary::Glossary;
use crate::utils::{is_japanese, percent};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Stats {
    pub total: usize,
    pub translated: usize,
    pub translated_pct: f64,
    pub japanese: usize,
    pub japanese_pct: f64,
}

impl Stats {
    pub fn compute(glossary: &Glossary) -> Self {
        let total = glossary.len();
        let translated = glossary.iter().filter(|(_, e)| e.is_translated()).count();
        let japanese = glossary.iter().filter(|(k, _)| is_japanese(k)).count();
        Self {
            total,
            translated,
            translated_pct: percent(translated, total),
            japanese,
            japanese_pct: percent(japanese, total),
        }
    }
}

impl fmt::Display for Stats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "total: {}", self.total)?;
        writeln!(
            f,
            "translated: {} ({:.1}%)",
            self.translated, self.translated_pct
        )?;
        write!(f, "jp: {} ({:.1}%)", self.japanese, self.japanese_pct)
    }
}

pub fn run(global: &GlobalArgs, args: StatsArgs) -> Result<()> {
    let glossary = Glossary::load(&global.db)?;
    if glossary.is_empty() {
        tracing::warn!("{} has no entries", global.db.display());
    }
    let stats = Stats::compute(&glossary);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!("{}", stats);
    }
    Ok(())
}
