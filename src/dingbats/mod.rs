//! Restore marker symbols that machine translation strips from values
//!
//! Keys such as `"■ 設定 ■"` carry a leading and trailing marker. The
//! translation often comes back as just `"Settings"`, so the markers are
//! copied from the key onto the value.

use anyhow::{Context, Result};
use colored::Colorize;
use regex::Regex;

use crate::cli::GlobalArgs;
use crate::glossary::Glossary;

/// Geometric Shapes, Miscellaneous Symbols and Dingbats blocks.
const MARKER_CLASS: &str = r"[\x{25A0}-\x{25FF}\x{2600}-\x{27BF}]";

pub struct DingbatFixer {
    key_re: Regex,
    leading_re: Regex,
}

impl DingbatFixer {
    pub fn new() -> Result<Self> {
        let key_re = Regex::new(&format!(
            r"(?s)^({m}+\s*)(.*?)(\s*{m}+\s*)?$",
            m = MARKER_CLASS
        ))
        .context("Failed to compile marker pattern")?;
        let leading_re = Regex::new(&format!(r"^\s*{}", MARKER_CLASS))
            .context("Failed to compile marker pattern")?;
        Ok(Self { key_re, leading_re })
    }

    /// New value for `value` carrying the markers of `key`, or `None` when
    /// the key has no leading marker or the value already starts with one.
    /// Any marker counts, not only the key's own, and leading whitespace
    /// before it is ignored.
    pub fn rewrap(&self, key: &str, value: &str) -> Option<String> {
        let caps = self.key_re.captures(key)?;
        if self.leading_re.is_match(value) {
            return None;
        }
        let leading = caps.get(1).map_or("", |m| m.as_str());
        let trailing = caps.get(3).map_or("", |m| m.as_str());
        tracing::debug!("Rewrapping {:?}", key);
        Some(format!("{}{}{}", leading, value, trailing))
    }
}

pub fn run(global: &GlobalArgs) -> Result<()> {
    let mut glossary = Glossary::load(&global.db)?;
    let fixer = DingbatFixer::new()?;
    let fixed = fixup_dingbats(&mut glossary, &fixer);
    let out = global.out_path();
    glossary.save(out)?;

    println!(
        "{}",
        format!("[OK] Restored markers on {} entries -> {}", fixed, out.display()).green()
    );
    Ok(())
}

/// Wrap translated values in the markers of their key. Returns the count.
pub fn fixup_dingbats(glossary: &mut Glossary, fixer: &DingbatFixer) -> usize {
    glossary.rewrite_translated(|key, value| fixer.rewrap(key, value))
}
