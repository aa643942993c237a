//! Fill entries that need no translation with their own key

use anyhow::Result;
use colored::Colorize;

use crate::cli::GlobalArgs;
use crate::glossary::Glossary;
use crate::utils::is_japanese;

pub fn run(global: &GlobalArgs) -> Result<()> {
    let mut glossary = Glossary::load(&global.db)?;
    let filled = passthrough(&mut glossary);
    let out = global.out_path();
    glossary.save(out)?;

    println!(
        "{}",
        format!("[OK] Passed through {} entries -> {}", filled, out.display()).green()
    );
    Ok(())
}

/// Copy each untranslated, non-Japanese key into its value. Returns the count.
pub fn passthrough(glossary: &mut Glossary) -> usize {
    let keys: Vec<String> = glossary
        .iter()
        .filter(|(k, e)| !e.is_translated() && !is_japanese(k))
        .map(|(k, _)| k.to_string())
        .collect();

    keys.into_iter()
        .filter(|k| glossary.fill(k, k.clone()))
        .count()
}
