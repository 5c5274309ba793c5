use std::fs;
use std::io::Cursor;
use std::path::Path;

use mazin_cli::commands::analyze_ops::{self, AnalyzeOptions};
use mazin_core::dict::builder;

const CHAR_DEF: &str = "\
DEFAULT 0 1 0
SPACE   0 1 0
KANJI   0 0 2
0x0020 SPACE
0x4E00..0x9FFF KANJI
";

const UNK_DEF: &str = "\
DEFAULT,1,1,5000,記号,一般
SPACE,1,1,0,記号,空白
KANJI,1,1,8000,名詞,一般
";

fn build_index(out: &Path) {
    let src = tempfile::tempdir().unwrap();
    fs::write(src.path().join("char.def"), CHAR_DEF).unwrap();
    fs::write(src.path().join("unk.def"), UNK_DEF).unwrap();
    fs::write(src.path().join("matrix.def"), "3 3\n1 2 -100\n").unwrap();
    fs::write(
        src.path().join("sys.csv"),
        "東京,1,1,3000,名詞,固有名詞\nは,2,2,500,助詞,係助詞\n",
    )
    .unwrap();
    builder::build_system_index(src.path(), out, false).unwrap();
}

fn run(opts: &AnalyzeOptions, sentences: &[String], stdin: &str) -> String {
    let mut out = Vec::new();
    analyze_ops::run(opts, sentences, Cursor::new(stdin), &mut out).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn analyze_arguments() {
    let dir = tempfile::tempdir().unwrap();
    build_index(dir.path());
    let opts = AnalyzeOptions {
        dicdir: Some(dir.path().to_path_buf()),
        ..Default::default()
    };
    let out = run(&opts, &["東京は".to_string()], "ignored\n");
    assert_eq!(out, "東京\t名詞,固有名詞\nは\t助詞,係助詞\nEOS\ntotalCost: 3400\n");
}

#[test]
fn analyze_stdin_as_json() {
    let dir = tempfile::tempdir().unwrap();
    build_index(dir.path());
    let opts = AnalyzeOptions {
        dicdir: Some(dir.path().to_path_buf()),
        json: true,
        ..Default::default()
    };
    let out = run(&opts, &[], "は\n東京\n");
    let lines: Vec<serde_json::Value> = out
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["sentence"], "は");
    assert_eq!(lines[0]["totalCost"], 500);
    assert_eq!(lines[1]["solutions"][0], "東京\t名詞,固有名詞\nEOS\n");
}

#[test]
fn missing_dictionary_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let opts = AnalyzeOptions {
        dicdir: Some(dir.path().join("none")),
        ..Default::default()
    };
    let mut out = Vec::new();
    assert!(analyze_ops::run(&opts, &[], Cursor::new(""), &mut out).is_err());
}
