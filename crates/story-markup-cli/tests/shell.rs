use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use story_markup_cli::{
    find_config, read_story_lines, run, Manuscript, ShellError, ShellOptions, CONFIG_FILE_NAME,
    MAX_STORY_BYTES, MAX_STORY_LINES,
};
use tempfile::TempDir;

const INI: &str = "\
; shell test configuration
ItalicPrefix=>
IgnoreLinePrefix=//
EndOnPrefix=###

[Html]
Render=yes
TagSizeOpen=<p{0}>
TagSizeClose=</p>
TagBreak=<br>
NonBreakableSpace=&nbsp;
LeadTabVal=__
TagItalicOpen=<i>
TagItalicClose=</i>

[Plain]
Render=no
";

const STORY: &str = "Hello world.\r\n\r\n\tIndented.\n// hidden\n>Aside\n### end\nafter\n";

const EXPECTED_HTML: &str = "\n<p112>Hello world.</p><br>\n<p112>&nbsp;</p><br>\n<p165>__</p><p112>Indented.</p><br>\n<i>Aside</i><br>\n\n";

fn workspace() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join(CONFIG_FILE_NAME), INI).unwrap();
    fs::write(dir.path().join("tale.txt"), STORY).unwrap();
    dir
}

fn options(story: &Path) -> ShellOptions {
    ShellOptions {
        story: story.to_path_buf(),
        ..ShellOptions::default()
    }
}

#[test]
fn writes_one_file_per_render_section() {
    let dir = workspace();
    let rendered = run(&options(&dir.path().join("tale.txt"))).unwrap();

    assert_eq!(rendered.len(), 1);
    assert_eq!(rendered[0].section, "Html");
    let html = fs::read_to_string(dir.path().join("tale.Html")).unwrap();
    assert_eq!(html, EXPECTED_HTML);
    assert!(!dir.path().join("tale.Plain").exists());
    assert_eq!(rendered[0].stats.ended_at, Some(5));
}

#[test]
fn dry_run_leaves_directory_untouched() {
    let dir = workspace();
    let opts = ShellOptions {
        dry_run: true,
        ..options(&dir.path().join("tale.txt"))
    };
    let rendered = run(&opts).unwrap();
    assert_eq!(rendered[0].markup, EXPECTED_HTML);
    assert!(!dir.path().join("tale.Html").exists());
}

#[test]
fn config_is_found_in_a_parent_directory() {
    let dir = workspace();
    let nested = dir.path().join("drafts").join("v2");
    fs::create_dir_all(&nested).unwrap();
    fs::write(nested.join("draft.txt"), "Hello world.\n").unwrap();

    assert_eq!(
        find_config(&nested),
        Some(dir.path().join(CONFIG_FILE_NAME))
    );
    let manuscript = Manuscript::open(&options(&nested.join("draft.txt"))).unwrap();
    assert_eq!(
        manuscript.config_path,
        dir.path().canonicalize().unwrap().join(CONFIG_FILE_NAME)
    );
    run(&options(&nested.join("draft.txt"))).unwrap();
    assert!(nested.join("draft.Html").exists());
}

#[test]
fn missing_story_and_config_are_reported() {
    let dir = tempfile::tempdir().unwrap();
    let err = run(&options(&dir.path().join("nope.txt"))).unwrap_err();
    assert!(matches!(err, ShellError::StoryNotFound(_)));

    fs::write(dir.path().join("tale.txt"), STORY).unwrap();
    let opts = ShellOptions {
        config: Some(dir.path().join("other.ini")),
        ..options(&dir.path().join("tale.txt"))
    };
    let err = run(&opts).unwrap_err();
    assert!(matches!(err, ShellError::ConfigNotFound(_)));

    let err = run(&ShellOptions::default()).unwrap_err();
    assert!(matches!(err, ShellError::MissingStoryPath));
}

#[test]
fn oversized_story_is_rejected() {
    let dir = workspace();
    let big = dir.path().join("big.txt");
    fs::write(&big, "x".repeat(MAX_STORY_BYTES as usize + 1)).unwrap();
    let err = run(&options(&big)).unwrap_err();
    assert!(matches!(err, ShellError::StoryTooLarge { .. }));
}

#[test]
fn too_many_lines_is_rejected() {
    let dir = workspace();
    let long = dir.path().join("long.txt");
    fs::write(&long, "\n".repeat(MAX_STORY_LINES + 1)).unwrap();
    let err = read_story_lines(&long).unwrap_err();
    assert!(matches!(
        err,
        ShellError::TooManyLines { lines, .. } if lines == MAX_STORY_LINES + 1
    ));
}

#[test]
fn story_lines_drop_carriage_returns() {
    let dir = workspace();
    let lines = read_story_lines(&dir.path().join("tale.txt")).unwrap();
    assert_eq!(lines[0], "Hello world.");
    assert_eq!(lines[1], "");
    assert_eq!(lines.len(), 7);
}

#[test]
fn lone_carriage_returns_split_story_lines() {
    let dir = workspace();
    let story = dir.path().join("classic.txt");
    fs::write(&story, "Hello world.\r\r>Aside\r").unwrap();
    let lines = read_story_lines(&story).unwrap();
    assert_eq!(lines, vec!["Hello world.", "", ">Aside"]);

    let opts = ShellOptions {
        dry_run: true,
        ..options(&story)
    };
    let rendered = run(&opts).unwrap();
    assert_eq!(
        rendered[0].markup,
        "\n<p112>Hello world.</p><br>\n<p112>&nbsp;</p><br>\n<i>Aside</i><br>\n\n"
    );
}

#[test]
fn font_file_drives_measurement() {
    let dir = workspace();
    let font = PathBuf::from(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../story-markup-fontdue/tests/fixtures/DejaVuSansMono.ttf"
    ));
    let opts = ShellOptions {
        font_file: Some(font),
        dry_run: true,
        ..options(&dir.path().join("tale.txt"))
    };
    let rendered = run(&opts).unwrap();
    assert_eq!(rendered.len(), 1);
    assert_eq!(rendered[0].markup, EXPECTED_HTML);

    let missing = ShellOptions {
        font_file: Some(dir.path().join("absent.ttf")),
        ..opts
    };
    assert!(matches!(run(&missing).unwrap_err(), ShellError::Font(_)));
}

#[test]
fn section_filter_matches_case_insensitively() {
    let dir = workspace();
    let opts = ShellOptions {
        sections: vec!["html".to_string(), "Plain".to_string()],
        dry_run: true,
        ..options(&dir.path().join("tale.txt"))
    };
    let rendered = run(&opts).unwrap();
    let names: Vec<_> = rendered.iter().map(|r| r.section.as_str()).collect();
    assert_eq!(names, vec!["Html"]);
}

#[test]
fn binary_joins_story_words_and_writes_output() {
    let dir = workspace();
    fs::write(dir.path().join("my tale.txt"), STORY).unwrap();
    Command::cargo_bin("story-markup")
        .unwrap()
        .current_dir(dir.path())
        .args(["my", "tale.txt"])
        .assert()
        .success()
        .stdout(predicate::str::contains("rendered 1 section(s)"));
    let html = fs::read_to_string(dir.path().join("my tale.Html")).unwrap();
    assert_eq!(html, EXPECTED_HTML);
}

#[test]
fn binary_prints_markup_with_stdout_flag() {
    let dir = workspace();
    Command::cargo_bin("story-markup")
        .unwrap()
        .arg(dir.path().join("tale.txt"))
        .arg("--stdout")
        .assert()
        .success()
        .stdout(EXPECTED_HTML);
}

#[test]
fn binary_prints_config_as_json() {
    let dir = workspace();
    let output = Command::cargo_bin("story-markup")
        .unwrap()
        .arg(dir.path().join("tale.txt"))
        .arg("--print-config")
        .output()
        .unwrap();
    assert!(output.status.success());
    let report: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["render"]["wrap_after_characters"], 92);
    assert_eq!(report["render"]["font_family"], "Verdana");
    assert_eq!(report["sections"], serde_json::json!(["Html"]));
}

#[test]
fn binary_reports_errors_and_fails() {
    Command::cargo_bin("story-markup")
        .unwrap()
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "error: please specify a story file to process",
        ));
}
