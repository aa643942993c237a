pub mod deepl;

use anyhow::{Context, Result};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::thread;
use std::time::Duration;

use crate::cli::{DeeplArgs, GlobalArgs};
use crate::config::Config;
use crate::glossary::Glossary;
use crate::utils::truncate_display;
use deepl::{DeepLClient, DeepLError, MAX_TEXTS_PER_REQUEST, Translate, TranslateOptions};

pub const DEFAULT_BATCH_SIZE: usize = 20;
pub const DEFAULT_BATCH_DELAY_MS: u64 = 10;

#[derive(Debug, Clone)]
pub struct BatchSettings {
    pub batch_size: usize,
    pub delay: Duration,
}

#[derive(Debug, Default, PartialEq)]
pub struct BatchSummary {
    pub batches: usize,
    pub translated: usize,
}

pub fn run(global: &GlobalArgs, args: DeeplArgs) -> Result<()> {
    let cfg = Config::load_from(global.config.as_deref())?;
    let out = global.out_path();

    let mut glossary = Glossary::load(&global.db)?;
    let candidates = glossary.candidates();

    if candidates.is_empty() {
        println!("{}", "[DeepL] Nothing to translate".yellow());
        glossary.save(out)?;
        return Ok(());
    }

    let api_key = args
        .api_key
        .clone()
        .or_else(|| cfg.get_api_key())
        .ok_or(DeepLError::MissingApiKey)?;
    let api_base = args.api_base.clone().or_else(|| cfg.deepl.api_base.clone());

    let batch_size = args.batch_size.unwrap_or(cfg.deepl.batch_size);
    if batch_size == 0 || batch_size > MAX_TEXTS_PER_REQUEST {
        anyhow::bail!(
            "Batch size must be between 1 and {}, got {}",
            MAX_TEXTS_PER_REQUEST,
            batch_size
        );
    }
    let settings = BatchSettings {
        batch_size,
        delay: Duration::from_millis(args.delay_ms.unwrap_or(cfg.deepl.delay_ms)),
    };

    let options = TranslateOptions {
        source_lang: Some(
            args.source_lang
                .clone()
                .unwrap_or_else(|| cfg.deepl.source_lang.clone()),
        ),
        target_lang: args
            .target_lang
            .clone()
            .unwrap_or_else(|| cfg.deepl.target_lang.clone()),
        split_sentences: args.split_sentences.unwrap_or(cfg.deepl.split_sentences),
        preserve_formatting: true,
        formality: args.formality.unwrap_or(cfg.deepl.formality),
    };

    let client = DeepLClient::new(api_key, api_base)?;
    println!(
        "{}",
        format!(
            "[DeepL] {} candidate(s) via {}",
            candidates.len(),
            client.endpoint()
        )
        .cyan()
    );

    let summary = translate_pending(&mut glossary, &client, &options, &settings, out)?;

    println!(
        "{}",
        format!(
            "[OK] Translated {} entries in {} batch(es) -> {}",
            summary.translated,
            summary.batches,
            out.display()
        )
        .green()
    );

    Ok(())
}

/// Translate every untranslated Japanese entry, one batch at a time.
///
/// After each batch the whole glossary is written to `out`, so an aborted run
/// keeps every batch that finished. The first failing request ends the run.
pub fn translate_pending<T: Translate + ?Sized>(
    glossary: &mut Glossary,
    client: &T,
    options: &TranslateOptions,
    settings: &BatchSettings,
    out: &Path,
) -> Result<BatchSummary> {
    let candidates = glossary.candidates();
    let mut summary = BatchSummary::default();
    if candidates.is_empty() {
        return Ok(summary);
    }

    let total_batches = candidates.len().div_ceil(settings.batch_size);
    let pb = ProgressBar::new(total_batches as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} batches")?
            .progress_chars("=>-"),
    );

    for (i, batch) in candidates.chunks(settings.batch_size).enumerate() {
        let results = client
            .translate(batch, options)
            .with_context(|| format!("Batch {} of {} failed", i + 1, total_batches))?;

        for (source, result) in batch.iter().zip(results) {
            tracing::debug!(
                "{:?} detected as {}",
                source,
                result.detected_source_language
            );
            pb.suspend(|| {
                println!(
                    "  {} -> {}",
                    truncate_display(source, 60),
                    truncate_display(&result.text, 60)
                );
            });
            if glossary.fill(source, result.text) {
                summary.translated += 1;
            }
        }

        glossary.save(out)?;
        summary.batches += 1;
        tracing::info!("Checkpoint {}/{} written to {}", i + 1, total_batches, out.display());
        pb.inc(1);

        if i + 1 < total_batches && !settings.delay.is_zero() {
            thread::sleep(settings.delay);
        }
    }

    pb.finish_and_clear();
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glossary::Entry;
    use deepl::Translation;
    use std::cell::RefCell;
    use std::fs;
    use tempfile::TempDir;

    /// Prefixes each text with `en:`. The call numbered `fail_at` (0-based) fails.
    struct ScriptedTranslator {
        calls: RefCell<Vec<Vec<String>>>,
        fail_at: Option<usize>,
    }

    impl ScriptedTranslator {
        fn new(fail_at: Option<usize>) -> Self {
            Self {
                calls: RefCell::new(Vec::new()),
                fail_at,
            }
        }
    }

    impl Translate for ScriptedTranslator {
        fn translate(
            &self,
            texts: &[String],
            _options: &TranslateOptions,
        ) -> Result<Vec<Translation>, DeepLError> {
            let mut calls = self.calls.borrow_mut();
            if Some(calls.len()) == self.fail_at {
                return Err(DeepLError::CountMismatch {
                    expected: texts.len(),
                    actual: 0,
                });
            }
            calls.push(texts.to_vec());
            Ok(texts
                .iter()
                .map(|t| Translation {
                    text: format!("en:{}", t),
                    detected_source_language: "JA".to_string(),
                })
                .collect())
        }
    }

    fn settings(batch_size: usize) -> BatchSettings {
        BatchSettings {
            batch_size,
            delay: Duration::ZERO,
        }
    }

    fn numbered_glossary(n: usize) -> Glossary {
        let mut g = Glossary::new();
        for i in 0..n {
            g.add_untranslated(&format!("文{}", i));
        }
        g
    }

    #[test]
    fn test_only_candidates_are_sent() {
        let mut glossary = Glossary::from_json(
            r#"{"はい": "Yes (manual)", "いいえ": null, "OK": null, "■": null}"#,
        )
        .unwrap();
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out.json");
        let client = ScriptedTranslator::new(None);

        let summary = translate_pending(
            &mut glossary,
            &client,
            &TranslateOptions::default(),
            &settings(20),
            &out,
        )
        .unwrap();

        assert_eq!(summary, BatchSummary { batches: 1, translated: 1 });
        assert_eq!(*client.calls.borrow(), vec![vec!["いいえ".to_string()]]);
        assert_eq!(glossary.get("はい").and_then(Entry::text), Some("Yes (manual)"));
        assert_eq!(glossary.get("いいえ").and_then(Entry::text), Some("en:いいえ"));
        assert_eq!(glossary.get("OK"), Some(&Entry::Untranslated));
        assert_eq!(Glossary::load(&out).unwrap(), glossary);
    }

    #[test]
    fn test_batches_are_fixed_size() {
        let mut glossary = numbered_glossary(45);
        let dir = TempDir::new().unwrap();
        let client = ScriptedTranslator::new(None);

        let summary = translate_pending(
            &mut glossary,
            &client,
            &TranslateOptions::default(),
            &settings(20),
            &dir.path().join("out.json"),
        )
        .unwrap();

        let sizes: Vec<usize> = client.calls.borrow().iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![20, 20, 5]);
        assert_eq!(summary.batches, 3);
        assert_eq!(summary.translated, 45);
        assert!(glossary.candidates().is_empty());
    }

    #[test]
    fn test_checkpoint_survives_failure_and_resume() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out.json");
        let mut glossary = numbered_glossary(10);

        // Third request fails: two batches of three are committed.
        let failing = ScriptedTranslator::new(Some(2));
        let err = translate_pending(
            &mut glossary,
            &failing,
            &TranslateOptions::default(),
            &settings(3),
            &out,
        );
        assert!(err.is_err());

        let on_disk = Glossary::load(&out).unwrap();
        for (i, (key, entry)) in on_disk.iter().enumerate() {
            if i < 6 {
                assert_eq!(entry.text(), Some(format!("en:{}", key).as_str()));
            } else {
                assert_eq!(entry, &Entry::Untranslated, "{} should be pending", key);
            }
        }

        // Rerun from the checkpoint only asks for the remaining keys.
        let mut resumed = Glossary::load(&out).unwrap();
        let client = ScriptedTranslator::new(None);
        translate_pending(
            &mut resumed,
            &client,
            &TranslateOptions::default(),
            &settings(3),
            &out,
        )
        .unwrap();

        let requested: Vec<String> = client.calls.borrow().concat();
        let expected: Vec<String> = (6..10).map(|i| format!("文{}", i)).collect();
        assert_eq!(requested, expected);
        assert!(Glossary::load(&out).unwrap().candidates().is_empty());
    }

    #[test]
    fn test_failure_before_first_batch_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("out.json");
        let mut glossary = numbered_glossary(2);
        let failing = ScriptedTranslator::new(Some(0));

        assert!(
            translate_pending(
                &mut glossary,
                &failing,
                &TranslateOptions::default(),
                &settings(20),
                &out,
            )
            .is_err()
        );
        assert!(!out.exists());
        assert!(fs::read_dir(dir.path()).unwrap().next().is_none());
    }
}
