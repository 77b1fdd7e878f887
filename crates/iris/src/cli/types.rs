//! CLI enum types shared by the subcommands: mode, detail level, analysis type.

use clap::ValueEnum;
use iris_core::{AnalysisKind, ImageDetail, Mode};

/// Analysis backends selectable on the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// Synthetic results, no network
    Mock,
    /// OpenAI Vision (chat completions)
    Openai,
    /// Google Cloud Vision
    Google,
    /// Local model placeholder
    Local,
}

impl From<ModeArg> for Mode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Mock => Mode::Mock,
            ModeArg::Openai => Mode::OpenAi,
            ModeArg::Google => Mode::Google,
            ModeArg::Local => Mode::Local,
        }
    }
}

/// Image detail level sent to OpenAI.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum DetailArg {
    Auto,
    Low,
    High,
}

impl From<DetailArg> for ImageDetail {
    fn from(arg: DetailArg) -> Self {
        match arg {
            DetailArg::Auto => ImageDetail::Auto,
            DetailArg::Low => ImageDetail::Low,
            DetailArg::High => ImageDetail::High,
        }
    }
}

/// Focus of the analysis; picks the default prompt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    General,
    Objects,
    Text,
    Colors,
    Sentiment,
}

impl From<KindArg> for AnalysisKind {
    fn from(arg: KindArg) -> Self {
        match arg {
            KindArg::General => AnalysisKind::General,
            KindArg::Objects => AnalysisKind::Objects,
            KindArg::Text => AnalysisKind::Text,
            KindArg::Colors => AnalysisKind::Colors,
            KindArg::Sentiment => AnalysisKind::Sentiment,
        }
    }
}

/// Providers that take an API key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum KeyProvider {
    Openai,
    Google,
}

impl KeyProvider {
    /// Config table holding this provider's key.
    pub fn section(&self) -> &'static str {
        match self {
            KeyProvider::Openai => "openai",
            KeyProvider::Google => "google",
        }
    }
}
