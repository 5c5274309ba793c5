use crate::dict::compiler::{self, split_csv, CompileOptions};
use crate::dict::{DictError, DictType};

fn opts(dic_type: DictType) -> CompileOptions {
    CompileOptions {
        dic_type,
        lsize: 10,
        rsize: 10,
        wakati: false,
    }
}

#[test]
fn test_split_csv_keeps_feature_commas() {
    let fields = split_csv("東京,1,2,300,名詞,固有名詞,地域", 5);
    assert_eq!(fields, vec!["東京", "1", "2", "300", "名詞,固有名詞,地域"]);
}

#[test]
fn test_split_csv_quotes() {
    let fields = split_csv("\"a,b\",1,2,3,f", 5);
    assert_eq!(fields[0], "a,b");

    let fields = split_csv("\"\"\"\",1,2,3,f", 5);
    assert_eq!(fields[0], "\"");

    let fields = split_csv("x,1,2,3,\"quoted,feature\"", 5);
    assert_eq!(fields[4], "quoted,feature");
}

#[test]
fn test_split_csv_trailing_empty() {
    assert_eq!(split_csv("a,1,2,3,", 5), vec!["a", "1", "2", "3", ""]);
    assert_eq!(split_csv("a,1,2", 5).len(), 3);
}

#[test]
fn test_parse_line() {
    let entry = compiler::parse_line("東京,1,2,300,名詞,固有名詞", 1, &opts(DictType::System))
        .unwrap()
        .unwrap();
    assert_eq!(entry.surface, "東京");
    assert_eq!((entry.lc_attr, entry.rc_attr, entry.wcost), (1, 2, 300));
    assert_eq!(entry.feature, "名詞,固有名詞");
}

#[test]
fn test_parse_line_skips() {
    let o = opts(DictType::System);
    assert_eq!(compiler::parse_line("", 1, &o).unwrap(), None);
    assert_eq!(compiler::parse_line("# comment", 1, &o).unwrap(), None);
    assert_eq!(compiler::parse_line(",1,2,3,f", 1, &o).unwrap(), None);
}

#[test]
fn test_parse_line_errors() {
    let o = opts(DictType::System);
    assert!(matches!(
        compiler::parse_line("a,1,2", 1, &o),
        Err(DictError::Parse(_))
    ));
    assert!(matches!(
        compiler::parse_line("a,1,2,,f", 1, &o),
        Err(DictError::Parse(_))
    ));
    assert!(matches!(
        compiler::parse_line("a,x,2,3,f", 1, &o),
        Err(DictError::Parse(_))
    ));
}

#[test]
fn test_attr_range_depends_on_type() {
    let line = "a,11,2,3,f";
    assert!(compiler::parse_line(line, 1, &opts(DictType::System)).is_err());
    assert!(compiler::parse_line(line, 1, &opts(DictType::Unknown)).is_err());
    let entry = compiler::parse_line(line, 1, &opts(DictType::User))
        .unwrap()
        .unwrap();
    assert_eq!(entry.lc_attr, 11);
}

#[test]
fn test_wakati_drops_feature() {
    let mut o = opts(DictType::System);
    o.wakati = true;
    let entry = compiler::parse_line("a,1,2,3,名詞", 1, &o).unwrap().unwrap();
    assert_eq!(entry.feature, "");
}

#[test]
fn test_compile_lines() {
    let lines = ["b,1,1,10,B", "a,1,1,20,A1", "a,1,1,30,A2"];
    let dict = compiler::compile_lines(lines, "user.csv", &opts(DictType::User)).unwrap();
    assert_eq!(dict.dic_type(), DictType::User);
    let a = dict.exact_match("a");
    assert_eq!(a.len(), 2);
    assert_eq!(dict.feature(&a[0]), "A1");
    assert_eq!(dict.feature(&a[1]), "A2");
}

#[test]
fn test_compile_files() {
    let dir = tempfile::tempdir().unwrap();
    let first = dir.path().join("a.csv");
    let second = dir.path().join("b.csv");
    std::fs::write(&first, "x,1,1,10,X\n").unwrap();
    std::fs::write(&second, "y,1,1,10,Y\n# skipped\n").unwrap();

    let dict = compiler::compile_files(&[first, second], &opts(DictType::System)).unwrap();
    assert_eq!(dict.filename(), "a.csv");
    assert_eq!(dict.size(), 2);
}

#[test]
fn test_matrix_size() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("matrix.def");
    assert_eq!(compiler::matrix_size(&path).unwrap(), (1, 1));

    std::fs::write(&path, "3 4\n0 0 1\n").unwrap();
    assert_eq!(compiler::matrix_size(&path).unwrap(), (3, 4));

    std::fs::write(&path, "bogus\n").unwrap();
    assert!(compiler::matrix_size(&path).is_err());
}
