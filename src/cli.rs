//! Command-line interface for inlining assets into files on disk.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Parser;

use dataurl_inliner::{
  DefaultFetcher, Document, DocumentContents, ExtensionList, HttpFetcher, InlineOptions, Inliner,
  RuleList, RuleSpec, TransformReport,
};

/// Inline small images and fonts referenced from HTML/CSS files as data URIs
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
  /// Files to rewrite
  #[arg(required = true, value_hint = clap::ValueHint::FilePath)]
  pub files: Vec<PathBuf>,

  /// Options file (default: dataurl.config.json in the current directory, if present)
  #[arg(short = 'C', long, value_hint = clap::ValueHint::FilePath)]
  pub config: Option<PathBuf>,

  /// Allow inlining http(s):// references
  #[arg(short, long)]
  pub remote: bool,

  /// Allowed extensions, comma separated (e.g. png,jpg,svg)
  #[arg(short, long)]
  pub extensions: Option<String>,

  /// Only inline references containing this text (repeatable, replaces the file's include list)
  #[arg(long)]
  pub include: Vec<String>,

  /// Only inline references matching this regular expression (repeatable, replaces the file's include list)
  #[arg(long)]
  pub include_pattern: Vec<String>,

  /// Never inline references containing this text (repeatable, replaces the file's exclude list)
  #[arg(long)]
  pub exclude: Vec<String>,

  /// Never inline references matching this regular expression (repeatable, replaces the file's exclude list)
  #[arg(long)]
  pub exclude_pattern: Vec<String>,

  /// Maximum asset size in bytes, 0 for no limit (default: 4096)
  #[arg(short, long)]
  pub limit: Option<u64>,

  /// Timeout in seconds for remote downloads
  #[arg(long)]
  pub timeout: Option<u64>,

  /// Write results into this directory instead of rewriting files in place
  #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
  pub out_dir: Option<PathBuf>,

  /// Log skipped references
  #[arg(short, long)]
  pub verbose: bool,
}

impl Cli {
  /// Load the options file and apply command-line overrides on top of it.
  pub fn options(&self) -> Result<InlineOptions> {
    let mut options = match &self.config {
      Some(path) => InlineOptions::from_path(path)?,
      None => {
        let cwd = std::env::current_dir().context("failed to resolve current directory")?;
        InlineOptions::discover(&cwd)?
      }
    };

    if self.remote {
      options.remote = true;
    }
    if let Some(extensions) = &self.extensions {
      options.extensions = Some(ExtensionList::One(extensions.clone()));
    }
    if let Some(limit) = self.limit {
      options.limit = Some(limit);
    }
    override_rules(&mut options.include, &self.include, &self.include_pattern);
    override_rules(&mut options.exclude, &self.exclude, &self.exclude_pattern);

    Ok(options)
  }

  fn fetcher(&self) -> DefaultFetcher {
    let mut http = HttpFetcher::default();
    if let Some(secs) = self.timeout {
      http = http.with_timeout(Duration::from_secs(secs));
    }
    DefaultFetcher::with_http(http)
  }

  fn destination(&self, source: &Path) -> Result<PathBuf> {
    let Some(out_dir) = &self.out_dir else {
      return Ok(source.to_path_buf());
    };
    let file_name = source
      .file_name()
      .with_context(|| format!("{} has no file name", source.display()))?;
    Ok(out_dir.join(file_name))
  }

  /// Output path for every input, in order. Two inputs may not share an output.
  fn destinations(&self) -> Result<Vec<PathBuf>> {
    let mut seen = HashSet::new();
    let mut targets = Vec::with_capacity(self.files.len());
    for source in &self.files {
      let target = self.destination(source)?;
      if !seen.insert(target.clone()) {
        bail!(
          "{} would overwrite another input's output at {}",
          source.display(),
          target.display()
        );
      }
      targets.push(target);
    }
    Ok(targets)
  }
}

fn override_rules(target: &mut Option<RuleList>, literals: &[String], patterns: &[String]) {
  let extra: Vec<RuleSpec> = literals
    .iter()
    .cloned()
    .map(RuleSpec::Literal)
    .chain(
      patterns
        .iter()
        .map(|pattern| RuleSpec::Pattern {
          pattern: pattern.clone(),
        }),
    )
    .collect();

  if extra.is_empty() {
    return;
  }

  *target = Some(RuleList::Many(extra));
}

/// Rewrite every requested file, printing a one-line summary for each.
pub async fn run(cli: &Cli) -> Result<()> {
  let rules = cli.options()?.compile()?;
  let inliner = Inliner::new(rules, cli.fetcher());
  let targets = cli.destinations()?;

  let mut documents = Vec::with_capacity(cli.files.len());
  for path in &cli.files {
    let bytes = tokio::fs::read(path)
      .await
      .with_context(|| format!("failed to read {}", path.display()))?;
    documents.push(Document::new(path.clone(), DocumentContents::Buffer(bytes)));
  }

  if let Some(out_dir) = &cli.out_dir {
    tokio::fs::create_dir_all(out_dir)
      .await
      .with_context(|| format!("failed to create {}", out_dir.display()))?;
  }

  for (result, target) in inliner.transform_all(documents).await.into_iter().zip(targets) {
    let (document, report) = result?;
    if let Some(bytes) = document.bytes() {
      tokio::fs::write(&target, bytes)
        .await
        .with_context(|| format!("failed to write {}", target.display()))?;
    }
    println!("{}: {}", document.path().display(), summary(&report));
  }

  Ok(())
}

fn summary(report: &TransformReport) -> String {
  if let Some(error) = &report.document_error {
    return format!("skipped ({error})");
  }
  format!(
    "{} inlined, {} oversized, {} rejected, {} failed",
    report.inlined,
    report.oversized,
    report.rejected,
    report.failures.len()
  )
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::tempdir;

  fn parse(args: &[&str]) -> Cli {
    Cli::parse_from(std::iter::once("dataurl-inline").chain(args.iter().copied()))
  }

  #[test]
  fn flags_override_config_file() {
    let temp = tempdir().unwrap();
    let config = temp.path().join("options.json");
    std::fs::write(&config, r#"{"limit": 100, "include": "assets"}"#).unwrap();

    let cli = parse(&[
      "-C",
      config.to_str().unwrap(),
      "--limit",
      "0",
      "--remote",
      "--include-pattern",
      r"\.svg$",
      "page.html",
    ]);
    let options = cli.options().unwrap();

    assert!(options.remote);
    assert_eq!(options.limit, Some(0));
    assert_eq!(
      options.include,
      Some(RuleList::Many(vec![RuleSpec::Pattern {
        pattern: r"\.svg$".into()
      }]))
    );
  }

  #[test]
  fn file_rules_survive_without_flags() {
    let temp = tempdir().unwrap();
    let config = temp.path().join("options.json");
    std::fs::write(&config, r#"{"exclude": "draft"}"#).unwrap();

    let cli = parse(&["-C", config.to_str().unwrap(), "page.html"]);
    let options = cli.options().unwrap();

    assert_eq!(
      options.exclude,
      Some(RuleList::One(RuleSpec::Literal("draft".into())))
    );
    assert_eq!(options.include, None);
  }

  #[tokio::test]
  async fn rejects_inputs_sharing_an_output_name() {
    let temp = tempdir().unwrap();
    for dir in ["a", "b"] {
      std::fs::create_dir_all(temp.path().join(dir)).unwrap();
      std::fs::write(temp.path().join(dir).join("index.html"), "<p></p>").unwrap();
    }
    let config = temp.path().join("options.json");
    std::fs::write(&config, "{}").unwrap();
    let dist = temp.path().join("dist");

    let first = temp.path().join("a/index.html");
    let second = temp.path().join("b/index.html");
    let cli = parse(&[
      "-C",
      config.to_str().unwrap(),
      "--out-dir",
      dist.to_str().unwrap(),
      first.to_str().unwrap(),
      second.to_str().unwrap(),
    ]);

    let error = run(&cli).await.unwrap_err();
    assert!(error.to_string().contains("would overwrite"));
    assert!(!dist.join("index.html").exists());
  }

  #[test]
  fn writes_into_out_dir_by_file_name() {
    let cli = parse(&["--out-dir", "dist", "src/page.html"]);
    assert_eq!(
      cli.destination(Path::new("src/page.html")).unwrap(),
      PathBuf::from("dist/page.html")
    );

    let cli = parse(&["src/page.html"]);
    assert_eq!(
      cli.destination(Path::new("src/page.html")).unwrap(),
      PathBuf::from("src/page.html")
    );
  }

  #[tokio::test]
  async fn rewrites_files_in_place() {
    let temp = tempdir().unwrap();
    std::fs::write(temp.path().join("dot.gif"), b"GIF89a").unwrap();
    let page = temp.path().join("page.css");
    std::fs::write(&page, "a { background: url(dot.gif) }").unwrap();

    let cli = parse(&["-C", "/nonexistent/ignored.json", page.to_str().unwrap()]);
    assert!(run(&cli).await.is_err());

    let config = temp.path().join("options.json");
    std::fs::write(&config, "{}").unwrap();
    let cli = parse(&["-C", config.to_str().unwrap(), page.to_str().unwrap()]);
    run(&cli).await.unwrap();

    let rewritten = std::fs::read_to_string(&page).unwrap();
    assert_eq!(rewritten, "a { background: url(data:image/gif;base64,R0lGODlh) }");
  }
}
