use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};

use crate::translate::deepl::{Formality, SplitSentences};

#[derive(Parser)]
#[command(name = "glossfill")]
#[command(author, version, about = "Fill, machine-translate and inspect a JSON translation glossary", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Glossary JSON file
    #[arg(required = true)]
    pub db: PathBuf,

    /// Output file (defaults to overwriting the input)
    #[arg(short, long)]
    pub out: Option<PathBuf>,

    /// Config file (defaults to the user config directory)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl GlobalArgs {
    pub fn out_path(&self) -> &Path {
        self.out.as_deref().unwrap_or(&self.db)
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Copy strings without Japanese text into their translation
    Passthrough,

    /// Translate remaining Japanese strings with DeepL
    Deepl(DeeplArgs),

    /// Show translation progress
    Stats(StatsArgs),

    /// Print entries whose original or translation matches a regex
    Grep(GrepArgs),

    /// Restore marker symbols dropped from translations
    #[command(name = "fixup_dingbats", alias = "fixup-dingbats")]
    FixupDingbats,

    /// Register strings as untranslated entries
    Add(AddArgs),

    /// Print the translation of a string, registering it if unknown
    Lookup(LookupArgs),
}

#[derive(Parser, Debug)]
pub struct DeeplArgs {
    /// API key (can also be set via config or DEEPL_API_KEY)
    #[arg(long)]
    pub api_key: Option<String>,

    /// API base URL (for custom endpoints)
    #[arg(long)]
    pub api_base: Option<String>,

    /// Source language hint [default: JA]
    #[arg(long)]
    pub source_lang: Option<String>,

    /// Target language [default: EN-US]
    #[arg(long)]
    pub target_lang: Option<String>,

    /// Formality of the translation [default: default]
    #[arg(long, value_enum)]
    pub formality: Option<Formality>,

    /// Sentence splitting mode [default: on]
    #[arg(long, value_enum)]
    pub split_sentences: Option<SplitSentences>,

    /// Texts per request, at most 50 [default: 20]
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Pause between requests in milliseconds [default: 10]
    #[arg(long)]
    pub delay_ms: Option<u64>,
}

#[derive(Parser, Debug)]
pub struct StatsArgs {
    /// Print as JSON
    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SearchField {
    #[default]
    Original,
    Translation,
}

#[derive(Parser, Debug)]
pub struct GrepArgs {
    /// Regular expression
    #[arg(required = true)]
    pub pattern: String,

    /// Which side of the entry to search
    #[arg(short, long, value_enum, default_value_t = SearchField::Original)]
    pub field: SearchField,
}

#[derive(Parser, Debug)]
pub struct AddArgs {
    /// Source strings to register
    #[arg(required = true)]
    pub texts: Vec<String>,
}

#[derive(Parser, Debug)]
pub struct LookupArgs {
    /// Source string
    #[arg(required = true)]
    pub text: String,
}
