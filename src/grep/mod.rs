//! Regex search over glossary entries

use anyhow::{Context, Result};
use regex::Regex;

use crate::cli::{GlobalArgs, GrepArgs, SearchField};
use crate::glossary::Glossary;

pub fn run(global: &GlobalArgs, args: GrepArgs) -> Result<()> {
    let glossary = Glossary::load(&global.db)?;
    let re = Regex::new(&args.pattern)
        .with_context(|| format!("Invalid regex: {}", args.pattern))?;

    let matches = grep(&glossary, &re, args.field);
    tracing::debug!("{} of {} entries matched", matches.len(), glossary.len());
    println!("{}", matches.to_json()?);
    Ok(())
}

/// Entries whose chosen field matches `re`. Untranslated entries never match
/// a translation search.
pub fn grep(glossary: &Glossary, re: &Regex, field: SearchField) -> Glossary {
    glossary.filter(|key, entry| match field {
        SearchField::Original => re.is_match(key),
        SearchField::Translation => entry.text().is_some_and(|t| re.is_match(t)),
    })
}
