//! End-to-end tests: folder → template → HTML through the public API.
//!
//! Run with: cargo test --test album

use albummer::config::{AlbumConfig, MediaConfig};
use albummer::generate::{self, GenerateError};
use albummer::parse::Parser;
use albummer::synth::{self, SortOrder, SynthOptions};
use albummer::template::BlockKind;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

/// Create `names` in `dir` with mtimes one minute apart, in the given order.
fn dated_folder(root: &Path, dir: &str, names: &[&str]) -> PathBuf {
    let folder = root.join(dir);
    fs::create_dir_all(&folder).unwrap();
    let base = SystemTime::UNIX_EPOCH + Duration::from_secs(1_600_000_000);
    for (i, name) in names.iter().enumerate() {
        let path = folder.join(name);
        fs::write(&path, format!("bytes of {name}")).unwrap();
        fs::File::options()
            .write(true)
            .open(&path)
            .unwrap()
            .set_modified(base + Duration::from_secs(60 * i as u64))
            .unwrap();
    }
    folder
}

fn row_names(text: &str, base_dir: &Path) -> Vec<Vec<String>> {
    let doc = Parser::new(&MediaConfig::default())
        .with_base_dir(base_dir)
        .parse(text)
        .unwrap();
    doc.media_rows()
        .map(|row| row.items.iter().map(|i| i.name.clone()).collect())
        .collect()
}

#[test]
fn synthesized_template_parses_back_to_media_rows() {
    let tmp = TempDir::new().unwrap();
    // Video newest, images in mtime order a < b.
    let folder = dated_folder(tmp.path(), "trip", &["a.jpg", "b.jpg", "c.mp4"]);
    let template = tmp.path().join("trip.alb");
    let options = SynthOptions {
        columns: 2,
        order: SortOrder::from_token("asc"),
        stylesheet: None,
    };

    synth::make_template(&folder, &template, &options, &MediaConfig::default()).unwrap();

    let text = fs::read_to_string(&template).unwrap();
    assert!(text.ends_with("# trip\n\na.jpg   b.jpg\n\nc.mp4\n\n\n"));
    assert_eq!(
        row_names(&text, tmp.path()),
        vec![vec!["a.jpg", "b.jpg"], vec!["c.mp4"]]
    );
}

#[test]
fn video_between_images_gets_its_own_row() {
    let tmp = TempDir::new().unwrap();
    let folder = dated_folder(tmp.path(), "trip", &["a.jpg", "c.mp4", "b.jpg"]);
    fs::write(tmp.path().join("x.css"), "").unwrap();
    let template = tmp.path().join("trip.alb");
    let options = SynthOptions {
        columns: 2,
        order: SortOrder::Ascending,
        stylesheet: Some("x.css".into()),
    };

    synth::make_template(&folder, &template, &options, &MediaConfig::default()).unwrap();

    let text = fs::read_to_string(&template).unwrap();
    assert!(text.ends_with("# trip\n\na.jpg\n\nc.mp4\n\nb.jpg\n\n"));
    assert_eq!(
        row_names(&text, tmp.path()),
        vec![vec!["a.jpg"], vec!["c.mp4"], vec!["b.jpg"]]
    );
}

#[test]
fn make_template_then_generate_embeds_everything() {
    let tmp = TempDir::new().unwrap();
    let folder = dated_folder(tmp.path(), "trip", &["a.jpg", "b.png", "c.mp4"]);
    let template = tmp.path().join("trip.alb");

    synth::make_template(
        &folder,
        &template,
        &SynthOptions::default(),
        &MediaConfig::default(),
    )
    .unwrap();
    let result = generate::generate(&template, &AlbumConfig::default(), tmp.path(), None).unwrap();

    assert_eq!(result.output, tmp.path().join("trip.html"));
    let html = fs::read_to_string(&result.output).unwrap();
    assert!(html.contains("<style>"));
    assert!(html.contains(synth::DEFAULT_CSS.lines().next().unwrap()));
    assert!(html.contains("<h1>trip</h1>"));
    assert!(html.contains("data:image/jpeg;base64,"));
    assert!(html.contains("data:image/png;base64,"));
    assert!(html.contains("data:video/mp4;base64,"));
    assert!(html.contains(r#"<div class="filename">c.mp4</div>"#));
    assert_eq!(html.matches(r#"style="width:50%;""#).count(), 2);
    assert!(!html.contains(":folder"));
}

#[test]
fn last_stylesheet_wins() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("x.css"), "p { color: red }").unwrap();
    fs::write(tmp.path().join("y.css"), "p { color: blue }").unwrap();
    let template = tmp.path().join("album.alb");
    fs::write(&template, ":use x.css\n:use y.css\nHello\n").unwrap();

    let result = generate::generate(&template, &AlbumConfig::default(), tmp.path(), None).unwrap();

    let html = fs::read_to_string(result.output).unwrap();
    assert!(html.contains("<style>p { color: blue }</style>"));
    assert!(!html.contains("red"));
}

#[test]
fn second_folder_replaces_media_set() {
    let tmp = TempDir::new().unwrap();
    dated_folder(tmp.path(), "one", &["a.jpg"]);
    dated_folder(tmp.path(), "two", &["b.jpg"]);

    let doc = Parser::new(&MediaConfig::default())
        .with_base_dir(tmp.path())
        .parse(":folder one\na.jpg\n:folder two\na.jpg\nb.jpg\n")
        .unwrap();

    let kinds: Vec<&str> = doc
        .blocks
        .iter()
        .map(|b| match &b.kind {
            BlockKind::Directive(_) => "directive",
            BlockKind::MediaRow(_) => "media",
            BlockKind::Narrative(_) => "narrative",
        })
        .collect();
    assert_eq!(
        kinds,
        vec!["directive", "media", "directive", "narrative", "media"]
    );
    let last = doc.media_rows().last().unwrap();
    assert_eq!(last.folder, tmp.path().join("two"));
}

#[test]
fn malformed_use_reports_line_and_writes_nothing() {
    let tmp = TempDir::new().unwrap();
    let template = tmp.path().join("album.alb");
    fs::write(&template, ":show_filenames\n\n:use\n").unwrap();

    let err = generate::generate(&template, &AlbumConfig::default(), tmp.path(), None).unwrap_err();

    assert!(matches!(err, GenerateError::Parse(_)));
    assert_eq!(err.to_string(), "line 3: directive :use requires an argument");
    assert!(!tmp.path().join("album.html").exists());
}
