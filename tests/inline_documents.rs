use std::fs;

use dataurl_inliner::{Document, InlineOptions, InlineRules, Inliner};
use tempfile::tempdir;

#[tokio::test]
async fn inlines_small_local_assets_and_keeps_oversized_ones() {
  let dir = tempdir().unwrap();
  fs::write(dir.path().join("a.png"), b"0123456789").unwrap();
  fs::write(dir.path().join("b.jpg"), vec![7u8; 5000]).unwrap();
  let origin = dir.path().join("index.html");

  let rules = InlineRules::new()
    .with_extensions(["png", "jpg"])
    .with_limit(Some(4096));
  let inliner = Inliner::with_default_fetcher(rules);

  let output = inliner
    .transform(r#"<img src="a.png">background:url('b.jpg')"#, &origin)
    .await;

  assert_eq!(
    output,
    r#"<img src="data:image/png;base64,MDEyMzQ1Njc4OQ==">background:url('b.jpg')"#
  );
}

#[tokio::test]
async fn missing_assets_leave_the_document_intact() {
  let dir = tempdir().unwrap();
  fs::create_dir_all(dir.path().join("css")).unwrap();
  fs::write(dir.path().join("present.svg"), "<svg/>").unwrap();
  let origin = dir.path().join("css").join("site.css");

  let inliner = Inliner::with_default_fetcher(InlineRules::new());
  let css = "a{background:url(../missing.png)} b{background:url(\"../present.svg\")}";
  let result = inliner.transform_with_report(css, &origin).await;

  assert_eq!(
    result.content,
    "a{background:url(../missing.png)} b{background:url(\"data:image/svg+xml;base64,PHN2Zy8+\")}"
  );
  assert_eq!(result.report.inlined, 1);
  assert_eq!(result.report.failures.len(), 1);
  assert_eq!(result.report.failures[0].0, "../missing.png");
}

#[tokio::test]
async fn remote_references_are_untouched_unless_enabled() {
  let dir = tempdir().unwrap();
  let origin = dir.path().join("index.html");
  let html = r#"<img src="https://example.invalid/logo.png">"#;

  let inliner = Inliner::with_default_fetcher(InlineRules::new());
  let result = inliner.transform_with_report(html, &origin).await;

  assert_eq!(result.content, html);
  assert_eq!(result.report.rejected, 1);
}

#[tokio::test]
async fn options_file_drives_a_batch_of_documents() {
  let dir = tempdir().unwrap();
  fs::create_dir_all(dir.path().join("icons")).unwrap();
  fs::write(dir.path().join("icons/ok.gif"), b"GIF89a").unwrap();
  fs::write(dir.path().join("photo.gif"), b"GIF89a").unwrap();
  fs::write(
    dir.path().join("dataurl.config.json"),
    r#"{ "extensions": "gif", "include": { "pattern": "^icons/" } }"#,
  )
  .unwrap();

  let rules = InlineOptions::discover(dir.path())
    .unwrap()
    .compile()
    .unwrap();
  let inliner = Inliner::with_default_fetcher(rules);

  let results = inliner
    .transform_all([
      Document::from_text(dir.path().join("a.css"), "url(icons/ok.gif) url(photo.gif)"),
      Document::from_text(dir.path().join("b.html"), r#"<img src="icons/ok.gif">"#),
    ])
    .await;

  let texts: Vec<String> = results
    .into_iter()
    .map(|result| result.unwrap().0.text().unwrap().to_string())
    .collect();
  assert_eq!(texts, vec![
    "url(data:image/gif;base64,R0lGODlh) url(photo.gif)".to_string(),
    r#"<img src="data:image/gif;base64,R0lGODlh">"#.to_string(),
  ]);
}
