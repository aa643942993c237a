//! Glossary store: an ordered map from source strings to translations

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;
use tempfile::NamedTempFile;

use crate::utils::is_japanese;

/// Value side of a glossary entry. Serialized as `null` or a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum Entry {
    Untranslated,
    Translated(String),
}

impl Entry {
    pub fn is_translated(&self) -> bool {
        matches!(self, Self::Translated(_))
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Translated(t) => Some(t),
            Self::Untranslated => None,
        }
    }
}

impl From<Option<String>> for Entry {
    fn from(value: Option<String>) -> Self {
        match value {
            Some(t) => Self::Translated(t),
            None => Self::Untranslated,
        }
    }
}

impl From<Entry> for Option<String> {
    fn from(entry: Entry) -> Self {
        match entry {
            Entry::Translated(t) => Some(t),
            Entry::Untranslated => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Glossary {
    entries: Vec<(String, Entry)>,
    index: HashMap<String, usize>,
}

/// Serialized as a JSON object in entry order.
impl Serialize for Glossary {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.entries.iter().map(|(k, e)| (k, e)))
    }
}

impl Glossary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read glossary file: {}", path.display()))?;
        Self::from_json(&content)
            .with_context(|| format!("Failed to parse glossary file: {}", path.display()))
    }

    /// Like [`Glossary::load`], but a missing file yields an empty glossary.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        match fs::metadata(path.as_ref()) {
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Self::new()),
            _ => Self::load(path),
        }
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let root: Value = serde_json::from_str(content).context("Invalid JSON")?;
        let Value::Object(map) = root else {
            anyhow::bail!("Glossary root must be a JSON object");
        };

        let mut glossary = Self::new();
        for (key, value) in map {
            let entry: Entry = serde_json::from_value(value).with_context(|| {
                format!("Invalid value for key {:?}: expected string or null", key)
            })?;
            glossary.insert(key, entry);
        }
        Ok(glossary)
    }

    pub fn to_json(&self) -> Result<String> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize glossary")?;
        Ok(json)
    }

    /// Write the whole glossary to `path`.
    ///
    /// The data goes to a temporary file next to `path` which is flushed and
    /// renamed over the destination. If anything fails before the rename the
    /// temporary file is removed and the previous contents stay intact. An
    /// existing destination keeps its permissions, and a symlink is written
    /// through to its target instead of being replaced.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let target = match fs::symlink_metadata(path) {
            Ok(meta) if meta.file_type().is_symlink() => fs::canonicalize(path)
                .with_context(|| format!("Failed to resolve symlink: {}", path.display()))?,
            _ => path.to_path_buf(),
        };
        let dir = match target.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };

        let mut json = self.to_json()?;
        json.push('\n');

        let mut tmp = NamedTempFile::new_in(dir)
            .with_context(|| format!("Failed to create temporary file in {}", dir.display()))?;
        tmp.write_all(json.as_bytes())
            .context("Failed to write glossary")?;
        tmp.as_file_mut()
            .sync_all()
            .context("Failed to flush glossary")?;
        if let Ok(meta) = fs::metadata(&target) {
            tmp.as_file()
                .set_permissions(meta.permissions())
                .context("Failed to copy glossary file permissions")?;
        }
        tmp.persist(&target)
            .with_context(|| format!("Failed to write glossary file: {}", path.display()))?;

        tracing::debug!("Wrote {} entries to {}", self.len(), target.display());
        Ok(())
    }

    /// Insert or replace an entry, keeping the original position of existing keys.
    fn insert(&mut self, key: String, entry: Entry) {
        match self.index.get(&key) {
            Some(&i) => self.entries[i].1 = entry,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, entry));
            }
        }
    }

    /// Register `key` as untranslated. Returns false if it already exists.
    pub fn add_untranslated(&mut self, key: &str) -> bool {
        if self.index.contains_key(key) {
            return false;
        }
        self.insert(key.to_string(), Entry::Untranslated);
        true
    }

    /// Set a translation only if the entry is still untranslated.
    /// Returns whether the value was written.
    pub fn fill(&mut self, key: &str, text: String) -> bool {
        match self.index.get(key) {
            Some(&i) if !self.entries[i].1.is_translated() => {
                self.entries[i].1 = Entry::Translated(text);
                true
            }
            _ => false,
        }
    }

    /// Rewrite existing translations. `f` receives the key and current
    /// translation and returns a replacement, or `None` to keep it.
    pub fn rewrite_translated<F>(&mut self, mut f: F) -> usize
    where
        F: FnMut(&str, &str) -> Option<String>,
    {
        let mut changed = 0;
        for (key, entry) in &mut self.entries {
            if let Entry::Translated(text) = entry {
                if let Some(new_text) = f(key.as_str(), text.as_str()) {
                    *text = new_text;
                    changed += 1;
                }
            }
        }
        changed
    }

    pub fn get(&self, key: &str) -> Option<&Entry> {
        self.index.get(key).map(|&i| &self.entries[i].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Entry)> {
        self.entries.iter().map(|(k, e)| (k.as_str(), e))
    }

    /// Untranslated keys containing Japanese text, in file order.
    pub fn candidates(&self) -> Vec<String> {
        self.iter()
            .filter(|(k, e)| !e.is_translated() && is_japanese(k))
            .map(|(k, _)| k.to_string())
            .collect()
    }

    /// Sub-glossary of the entries accepted by `pred`, order preserved.
    pub fn filter<F>(&self, mut pred: F) -> Self
    where
        F: FnMut(&str, &Entry) -> bool,
    {
        let mut out = Self::new();
        for (key, entry) in self.iter() {
            if pred(key, entry) {
                out.insert(key.to_string(), entry.clone());
            }
        }
        out
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"{
  "はい": "Yes",
  "いいえ": null,
  "OK": null,
  "■ 設定 ■": "■ Settings ■"
}"#;

    #[test]
    fn test_load_preserves_order() {
        let glossary = Glossary::from_json(SAMPLE).unwrap();
        let keys: Vec<&str> = glossary.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["はい", "いいえ", "OK", "■ 設定 ■"]);
        assert_eq!(
            glossary.get("はい"),
            Some(&Entry::Translated("Yes".to_string()))
        );
        assert_eq!(glossary.get("いいえ"), Some(&Entry::Untranslated));
    }

    #[test]
    fn test_rejects_bad_values() {
        let err = Glossary::from_json(r#"{"ok": null, "a": 1}"#).unwrap_err();
        assert!(format!("{:#}", err).contains(r#"key "a""#));
        assert!(Glossary::from_json(r#"{"a": ["x"]}"#).is_err());
        assert!(Glossary::from_json(r#"["a"]"#).is_err());
        assert!(Glossary::from_json("{not json").is_err());
    }

    #[test]
    fn test_round_trip_through_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("db.json");
        fs::write(&path, SAMPLE).unwrap();

        let glossary = Glossary::load(&path).unwrap();
        glossary.save(&path).unwrap();

        let reparsed = Glossary::load(&path).unwrap();
        assert_eq!(glossary, reparsed);

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("いいえ"), "non-ASCII should be written literally");
        assert!(raw.contains("\n  \"OK\": null"), "two-space indentation");
    }

    #[test]
    fn test_to_json_matches_entry_encoding() {
        let glossary = Glossary::from_json(SAMPLE).unwrap();
        let json = glossary.to_json().unwrap();
        assert_eq!(json, SAMPLE);
    }

    #[cfg(unix)]
    #[test]
    fn test_save_keeps_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("db.json");
        fs::write(&path, SAMPLE).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        Glossary::load(&path).unwrap().save(&path).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o644);
    }

    #[cfg(unix)]
    #[test]
    fn test_save_writes_through_symlink() {
        let dir = TempDir::new().unwrap();
        let real = dir.path().join("real.json");
        let link = dir.path().join("db.json");
        fs::write(&real, SAMPLE).unwrap();
        std::os::unix::fs::symlink(&real, &link).unwrap();

        let mut glossary = Glossary::load(&link).unwrap();
        glossary.fill("いいえ", "No".to_string());
        glossary.save(&link).unwrap();

        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        let on_disk = Glossary::load(&real).unwrap();
        assert_eq!(on_disk.get("いいえ").and_then(Entry::text), Some("No"));
    }

    #[test]
    fn test_fill_never_overwrites() {
        let mut glossary = Glossary::from_json(SAMPLE).unwrap();
        assert!(!glossary.fill("はい", "Sure".to_string()));
        assert!(glossary.fill("いいえ", "No".to_string()));
        assert!(!glossary.fill("missing", "x".to_string()));
        assert_eq!(glossary.get("はい").and_then(Entry::text), Some("Yes"));
        assert_eq!(glossary.get("いいえ").and_then(Entry::text), Some("No"));
        assert!(glossary.get("missing").is_none());
    }

    #[test]
    fn test_add_untranslated_keeps_existing() {
        let mut glossary = Glossary::from_json(SAMPLE).unwrap();
        assert!(!glossary.add_untranslated("はい"));
        assert!(glossary.add_untranslated("新しい"));
        assert_eq!(glossary.len(), 5);
        assert_eq!(glossary.iter().last().map(|(k, _)| k), Some("新しい"));
        assert_eq!(glossary.get("はい").and_then(Entry::text), Some("Yes"));
    }

    #[test]
    fn test_candidates() {
        let glossary = Glossary::from_json(SAMPLE).unwrap();
        assert_eq!(glossary.candidates(), vec!["いいえ".to_string()]);
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = TempDir::new().unwrap();
        let glossary = Glossary::load_or_default(dir.path().join("nope.json")).unwrap();
        assert!(glossary.is_empty());
        assert!(Glossary::load(dir.path().join("nope.json")).is_err());
    }

    #[test]
    fn test_entry_serde_as_nullable_string() {
        let json = serde_json::to_string(&vec![
            Entry::Untranslated,
            Entry::Translated("x".to_string()),
        ])
        .unwrap();
        assert_eq!(json, r#"[null,"x"]"#);
        let back: Vec<Entry> = serde_json::from_str(&json).unwrap();
        assert_eq!(back[1], Entry::Translated("x".to_string()));
    }
}
