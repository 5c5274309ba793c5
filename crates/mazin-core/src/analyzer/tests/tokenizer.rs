use crate::analyzer::testutil::{dictionary, tokenizer, UNK_DEF};
use crate::analyzer::{AnalyzeError, Lattice, NodeKind, Tokenizer};
use crate::dict::{DictError, DictType, Dictionary, NON_TERMINAL_FEATURE};

const SYS_CSV: &str = "\
a,2,2,100,名詞,一般
東京都,3,3,2000,名詞,固有名詞
テスト,4,4,100,名詞,サ変
";

fn lengths(lattice: &Lattice, nodes: &[crate::analyzer::NodeId]) -> Vec<usize> {
    let mut lens: Vec<usize> = nodes.iter().map(|&id| lattice.node(id).length()).collect();
    lens.sort_unstable();
    lens
}

#[test]
fn test_dictionary_lookup() {
    let tok = tokenizer(SYS_CSV);
    let mut lattice = Lattice::new("ab", 1, None).unwrap();
    let nodes = tok.lookup(&mut lattice, 0, 0, false);
    assert_eq!(nodes.len(), 1);
    let node = lattice.node(nodes[0]);
    assert_eq!(node.kind, NodeKind::Normal);
    assert_eq!(node.surface, "a");
    assert_eq!(node.feature, "名詞,一般");
    assert_eq!((node.lc_attr, node.rc_attr, node.wcost), (2, 2, 100));
}

#[test]
fn test_unknown_group_and_span() {
    let tok = tokenizer(SYS_CSV);
    // ALPHA: span 1, grouped
    let mut lattice = Lattice::new("xyz!", 1, None).unwrap();
    let nodes = tok.lookup(&mut lattice, 0, 0, false);
    assert_eq!(lengths(&lattice, &nodes), vec![1, 3]);
    let whole = nodes
        .iter()
        .map(|&id| lattice.node(id))
        .find(|n| n.length() == 3)
        .unwrap();
    assert_eq!(whole.kind, NodeKind::Unknown);
    assert_eq!(whole.feature, "名詞,英字,xyz,xyz,xyz");
    assert_eq!(whole.wcost, 4000);
    assert_eq!((whole.lc_attr, whole.rc_attr), (2, 2));
}

#[test]
fn test_unknown_span_without_group() {
    let tok = tokenizer(SYS_CSV);
    // KANJI: span 2, not grouped
    let mut lattice = Lattice::new("漢字語", 1, None).unwrap();
    let nodes = tok.lookup(&mut lattice, 0, 0, false);
    assert_eq!(lengths(&lattice, &nodes), vec![1, 2]);
}

#[test]
fn test_unknown_falls_back_to_one_char() {
    let tok = tokenizer(SYS_CSV);
    // SYMBOL: span 0, not grouped
    let mut lattice = Lattice::new("!#", 1, None).unwrap();
    let nodes = tok.lookup(&mut lattice, 0, 0, false);
    assert_eq!(lengths(&lattice, &nodes), vec![1]);
    assert_eq!(lattice.node(nodes[0]).surface, "!");
}

#[test]
fn test_unknown_group_only() {
    let tok = tokenizer(SYS_CSV);
    // DEFAULT: span 0, grouped
    let mut lattice = Lattice::new("ÀÁ", 1, None).unwrap();
    let nodes = tok.lookup(&mut lattice, 0, 0, false);
    assert_eq!(lengths(&lattice, &nodes), vec![2]);
}

#[test]
fn test_invoke_adds_unknown_next_to_match() {
    let tok = tokenizer(SYS_CSV);
    let mut lattice = Lattice::new("テスト", 1, None).unwrap();
    let nodes = tok.lookup(&mut lattice, 0, 0, false);
    assert_eq!(nodes.len(), 2);
    // reversed: unknown candidates come first
    assert_eq!(lattice.node(nodes[0]).kind, NodeKind::Unknown);
    assert_eq!(lattice.node(nodes[1]).kind, NodeKind::Normal);
    assert_eq!(lattice.node(nodes[0]).wcost, 6000);
}

#[test]
fn test_leading_whitespace_is_skipped() {
    let tok = tokenizer(SYS_CSV);
    let mut lattice = Lattice::new(" \ta", 1, None).unwrap();
    let nodes = tok.lookup(&mut lattice, 0, 0, false);
    assert_eq!(nodes.len(), 1);
    let node = lattice.node(nodes[0]);
    assert_eq!((node.begin, node.start, node.end), (0, 2, 3));
    assert_eq!(node.surface, "a");
}

#[test]
fn test_only_whitespace_yields_nothing() {
    let tok = tokenizer(SYS_CSV);
    let mut lattice = Lattice::new("a \u{3000}", 1, None).unwrap();
    assert!(tok.lookup(&mut lattice, 1, 0, false).is_empty());
}

#[test]
fn test_non_terminal() {
    let tok = tokenizer(SYS_CSV);
    let mut lattice = Lattice::new("東京", 1, None).unwrap();
    let nodes = tok.lookup(&mut lattice, 0, 0, true);
    assert_eq!(nodes.len(), 1);
    let node = lattice.node(nodes[0]);
    assert_eq!(node.feature, NON_TERMINAL_FEATURE);
    assert_eq!(node.length(), 2);
    assert_eq!((node.lc_attr, node.wcost), (1285, 10000));

    // without the flag only unknown words remain
    let mut lattice = Lattice::new("東京", 1, None).unwrap();
    let nodes = tok.lookup(&mut lattice, 0, 0, false);
    assert!(nodes
        .iter()
        .all(|&id| lattice.node(id).kind == NodeKind::Unknown));
}

#[test]
fn test_user_dictionary_lookup_order() {
    let tok = tokenizer(SYS_CSV);
    tok.add_user_dictionary(dictionary("a,1,1,50,名詞,ユーザー", DictType::User))
        .unwrap();
    assert_eq!(tok.snapshot().len(), 2);

    let mut lattice = Lattice::new("a", 1, None).unwrap();
    let nodes = tok.lookup(&mut lattice, 0, 0, false);
    let features: Vec<&str> = nodes
        .iter()
        .map(|&id| lattice.node(id).feature.as_str())
        .collect();
    // system first, then reversed
    assert_eq!(features, vec!["名詞,ユーザー", "名詞,一般"]);

    tok.reset();
    assert_eq!(tok.snapshot().len(), 1);
    assert!(tok.snapshot().users().is_empty());
}

#[test]
fn test_add_user_dictionary_rejects_wrong_type() {
    let tok = tokenizer(SYS_CSV);
    let err = tok
        .add_user_dictionary(dictionary("b,1,1,50,名詞", DictType::System))
        .unwrap_err();
    assert!(matches!(
        err,
        AnalyzeError::Dict(DictError::WrongType { .. })
    ));
}

#[test]
fn test_add_user_dictionary_rejects_incompatible() {
    let tok = tokenizer(SYS_CSV);
    let entries = crate::dict::compiler::parse_lines(
        ["b,1,1,50,名詞"],
        &crate::dict::compiler::CompileOptions {
            dic_type: DictType::User,
            lsize: 9,
            rsize: 9,
            wakati: false,
        },
    )
    .unwrap();
    let user = Dictionary::build(entries, DictType::User, "user.csv", 9, 9).unwrap();
    assert!(matches!(
        tok.add_user_dictionary(user),
        Err(AnalyzeError::Dict(DictError::Incompatible(_)))
    ));
}

#[test]
fn test_new_requires_system_dictionary() {
    let err = Tokenizer::new(
        dictionary("a,1,1,1,x", DictType::User),
        dictionary(UNK_DEF, DictType::Unknown),
        crate::analyzer::testutil::char_property(),
        24,
    )
    .unwrap_err();
    assert!(matches!(err, AnalyzeError::Dict(DictError::WrongType { .. })));
}

#[test]
fn test_new_requires_unknown_entry_per_category() {
    let err = Tokenizer::new(
        dictionary("a,1,1,1,x", DictType::System),
        dictionary("DEFAULT,1,1,1,x\nSPACE,1,1,1,x", DictType::Unknown),
        crate::analyzer::testutil::char_property(),
        24,
    )
    .unwrap_err();
    assert!(matches!(
        err,
        AnalyzeError::Dict(DictError::MissingCategory(ref name)) if name == "SYMBOL"
    ));
}

#[test]
fn test_reload_skips_bad_files() {
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("good.dic");
    dictionary("b,1,1,50,名詞,ユーザー", DictType::User)
        .save(&good)
        .unwrap();
    let system_typed = dir.path().join("sys.dic");
    dictionary("c,1,1,50,名詞", DictType::System)
        .save(&system_typed)
        .unwrap();
    let malformed = dir.path().join("broken.dic");
    std::fs::write(&malformed, b"MZDC garbage").unwrap();
    let missing = dir.path().join("missing.dic");

    let tok = tokenizer(SYS_CSV);
    let list = format!(
        "{} , {},{}, {}",
        malformed.display(),
        good.display(),
        system_typed.display(),
        missing.display()
    );
    assert_eq!(tok.reload(&list), 1);
    let set = tok.snapshot();
    assert_eq!(set.users().len(), 1);
    assert_eq!(set.users()[0].exact_match("b").len(), 1);

    // reloading replaces rather than appends
    assert_eq!(tok.reload(&good.display().to_string()), 1);
    assert_eq!(tok.snapshot().users().len(), 1);
    assert_eq!(tok.reload(""), 0);
    assert!(tok.snapshot().users().is_empty());
}
