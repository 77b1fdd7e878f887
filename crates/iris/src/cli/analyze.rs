//! The `iris analyze` command: analyze one or more images with a shared analyzer.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Args;
use futures_util::stream::{self, StreamExt};
use iris_core::config::CacheUpdate;
use iris_core::{AnalysisOptions, AnalysisResult, Analyzer, Config, ConfigUpdate, Stats};
use serde::Serialize;

use super::types::{DetailArg, KindArg, ModeArg};

/// Arguments for the `analyze` command.
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Image files to analyze
    #[arg(required = true)]
    pub inputs: Vec<String>,

    /// Backend to use (overrides the config file)
    #[arg(short, long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Custom prompt (OpenAI)
    #[arg(long)]
    pub prompt: Option<String>,

    /// Completion token budget (OpenAI)
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// Image detail level (OpenAI)
    #[arg(long, value_enum)]
    pub detail: Option<DetailArg>,

    /// Focus of the analysis
    #[arg(long = "type", value_enum)]
    pub analysis_type: Option<KindArg>,

    /// Number of images analyzed concurrently
    #[arg(short, long, default_value = "4")]
    pub parallel: usize,

    /// Disable the result cache for this run
    #[arg(long)]
    pub no_cache: bool,

    /// Pretty-print each result
    #[arg(long)]
    pub pretty: bool,
}

impl AnalyzeArgs {
    fn options(&self) -> AnalysisOptions {
        AnalysisOptions {
            prompt: self.prompt.clone(),
            max_tokens: self.max_tokens,
            detail: self.detail.map(Into::into),
            analysis_type: self.analysis_type.map(Into::into),
        }
    }

    fn overrides(&self) -> ConfigUpdate {
        ConfigUpdate {
            mode: self.mode.map(Into::into),
            cache: self.no_cache.then(|| CacheUpdate {
                enabled: Some(false),
                ..Default::default()
            }),
            ..Default::default()
        }
    }
}

/// One output line: the input path plus its result.
#[derive(Serialize)]
struct Record<'a> {
    image: &'a str,
    #[serde(flatten)]
    result: &'a AnalysisResult,
}

/// Execute the analyze command.
pub async fn execute(args: AnalyzeArgs, config: Config) -> anyhow::Result<()> {
    let analyzer = Arc::new(Analyzer::new(config)?);
    let overrides = args.overrides();
    if !overrides.is_empty() {
        analyzer.update_config(&overrides)?;
    }

    let inputs = expand_inputs(&args.inputs);
    let options = Arc::new(args.options());
    let total = inputs.len();
    tracing::info!(
        "Analyzing {total} image(s) in {} mode",
        analyzer.config().mode
    );

    let progress = (total > 1).then(|| create_progress_bar(total as u64));
    let start_time = Instant::now();
    let mut unreadable = 0usize;

    let mut results = stream::iter(inputs)
        .map(|path| {
            let analyzer = analyzer.clone();
            let options = options.clone();
            async move {
                let result = analyzer.analyze_image(path.as_path(), &options).await;
                (path, result)
            }
        })
        .buffer_unordered(args.parallel.max(1));

    while let Some((path, result)) = results.next().await {
        let label = path.display().to_string();
        match result {
            Ok(result) => {
                if result.degraded {
                    tracing::warn!(
                        "{label}: {} backend failed, emitting mock result",
                        result.requested_mode
                    );
                }
                let line = render(&label, &result, args.pretty)?;
                match &progress {
                    Some(pb) => pb.suspend(|| println!("{line}")),
                    None => println!("{line}"),
                }
            }
            Err(e) => {
                unreadable += 1;
                tracing::error!("{e}");
            }
        }
        if let Some(pb) = &progress {
            pb.inc(1);
            pb.set_message(label);
        }
    }

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }
    print_summary(&analyzer.stats(), start_time.elapsed());

    if unreadable > 0 {
        anyhow::bail!("{unreadable} of {total} images could not be analyzed");
    }
    Ok(())
}

/// Expand `~` in each input path.
fn expand_inputs(inputs: &[String]) -> Vec<PathBuf> {
    inputs
        .iter()
        .map(|input| PathBuf::from(shellexpand::tilde(input).into_owned()))
        .collect()
}

fn render(image: &str, result: &AnalysisResult, pretty: bool) -> anyhow::Result<String> {
    let record = Record { image, result };
    let line = if pretty {
        serde_json::to_string_pretty(&record)?
    } else {
        serde_json::to_string(&record)?
    };
    Ok(line)
}

fn create_progress_bar(total: u64) -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressStyle};

    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("##-"),
    );
    pb.set_message("starting...");
    pb
}

/// Print the analyzer's statistics after a run.
fn print_summary(stats: &Stats, elapsed: Duration) {
    eprintln!();
    eprintln!("  ====================================");
    eprintln!("               Summary");
    eprintln!("  ====================================");
    eprintln!("    Requests:     {:>8}", stats.total_requests);
    eprintln!("    Succeeded:    {:>8}", stats.successful);
    if stats.failed > 0 {
        eprintln!("    Failed:       {:>8}", stats.failed);
    }
    if stats.cache_hits > 0 {
        eprintln!("    Cache hits:   {:>8}", stats.cache_hits);
    }
    eprintln!("  ------------------------------------");
    eprintln!("    Avg backend:  {:>6.1}ms", stats.average_response_time_ms);
    eprintln!("    Duration:     {:>7.1}s", elapsed.as_secs_f64());
    eprintln!("  ====================================");
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use iris_core::{AnalysisKind, ImageDetail, Mode};

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        args: AnalyzeArgs,
    }

    fn parse(argv: &[&str]) -> AnalyzeArgs {
        TestCli::parse_from(std::iter::once("iris").chain(argv.iter().copied())).args
    }

    #[test]
    fn test_options_from_flags() {
        let args = parse(&[
            "cat.jpg",
            "--prompt",
            "Count the cats",
            "--max-tokens",
            "120",
            "--detail",
            "low",
            "--type",
            "objects",
        ]);
        let options = args.options();
        assert_eq!(options.prompt.as_deref(), Some("Count the cats"));
        assert_eq!(options.max_tokens, Some(120));
        assert_eq!(options.detail, Some(ImageDetail::Low));
        assert_eq!(options.analysis_type, Some(AnalysisKind::Objects));
    }

    #[test]
    fn test_no_flags_means_no_overrides() {
        let args = parse(&["a.jpg", "b.jpg"]);
        assert_eq!(args.inputs, vec!["a.jpg", "b.jpg"]);
        assert!(args.overrides().is_empty());
        assert_eq!(args.options(), AnalysisOptions::default());
    }

    #[test]
    fn test_overrides_from_flags() {
        let args = parse(&["a.jpg", "--mode", "google", "--no-cache"]);
        let overrides = args.overrides();
        assert_eq!(overrides.mode, Some(Mode::Google));
        assert_eq!(overrides.cache.unwrap().enabled, Some(false));
    }

    #[test]
    fn test_expand_inputs_tilde() {
        let home = shellexpand::tilde("~").into_owned();
        let paths = expand_inputs(&["~/cat.jpg".to_string(), "./dog.png".to_string()]);
        assert_eq!(paths[0], PathBuf::from(home).join("cat.jpg"));
        assert_eq!(paths[1], PathBuf::from("./dog.png"));
    }

    #[tokio::test]
    async fn test_render_includes_image_and_result() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blob.bin");
        std::fs::write(&path, [1u8, 2, 3, 4]).unwrap();

        let analyzer = Analyzer::new(Config::default()).unwrap();
        let result = analyzer
            .analyze_image(path.as_path(), &AnalysisOptions::default())
            .await
            .unwrap();

        let line = render("blob.bin", &result, false).unwrap();
        assert!(!line.contains('\n'));
        let json: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(json["image"], "blob.bin");
        assert_eq!(json["mode"], "mock");
        assert_eq!(json["analysis"]["metadata"]["size_bytes"], 4);

        let pretty = render("blob.bin", &result, true).unwrap();
        assert!(pretty.contains('\n'));
    }
}
