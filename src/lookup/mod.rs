//! Dictionary-style access: register new strings and look them up

use anyhow::Result;
use colored::Colorize;

use crate::cli::{AddArgs, GlobalArgs, LookupArgs};
use crate::glossary::{Entry, Glossary};

pub fn run_add(global: &GlobalArgs, args: AddArgs) -> Result<()> {
    let mut glossary = Glossary::load_or_default(&global.db)?;
    let added = args
        .texts
        .iter()
        .filter(|t| glossary.add_untranslated(t))
        .count();

    let out = global.out_path();
    glossary.save(out)?;
    println!(
        "{}",
        format!(
            "[OK] Added {} of {} entries -> {}",
            added,
            args.texts.len(),
            out.display()
        )
        .green()
    );
    Ok(())
}

pub fn run_lookup(global: &GlobalArgs, args: LookupArgs) -> Result<()> {
    let mut glossary = Glossary::load(&global.db)?;
    let (text, registered) = lookup(&mut glossary, &args.text);
    if registered {
        glossary.save(global.out_path())?;
        tracing::info!("Registered {:?} as untranslated", args.text);
    }
    println!("{}", text);
    Ok(())
}

/// Translation of `source`, or `source` itself when there is none yet.
/// Unknown strings are registered as untranslated; the flag reports that.
pub fn lookup(glossary: &mut Glossary, source: &str) -> (String, bool) {
    match glossary.get(source) {
        Some(Entry::Translated(t)) => (t.clone(), false),
        Some(Entry::Untranslated) => (source.to_string(), false),
        None => {
            glossary.add_untranslated(source);
            (source.to_string(), true)
        }
    }
}
