use std::fs;
use std::path::Path;

use mazin_core::dict::builder;
use mazin_core::dict::{CharProperty, ConnectionMatrix, Dictionary, Token};

use crate::CliError;

pub fn build(dicdir: &str, outdir: &str, wakati: bool) {
    let report = crate::die!(
        builder::build_system_index(Path::new(dicdir), Path::new(outdir), wakati),
        "Error building dictionary: {}"
    );
    eprintln!(
        "Wrote {outdir}: {} categories, {} unknown entries, {} system entries, matrix {}x{}",
        report.categories, report.unknown_tokens, report.system_tokens, report.lsize, report.rsize
    );
}

pub fn build_user(dicdir: &str, output_file: &str, sources: &[String]) {
    let dict = crate::die!(
        builder::build_user_dictionary(Path::new(dicdir), sources, Path::new(output_file)),
        "Error building user dictionary: {}"
    );
    eprintln!("Wrote {output_file} ({} entries)", dict.size());
}

/// One line per token: surface, attributes, cost and feature.
pub fn format_tokens(dict: &Dictionary, surface: &str, tokens: &[Token]) -> Vec<String> {
    tokens
        .iter()
        .map(|t| {
            format!(
                "{surface}\t{}\t{}\t{}\t{}",
                t.lc_attr,
                t.rc_attr,
                t.wcost,
                dict.feature(t)
            )
        })
        .collect()
}

pub fn lookup(dict_file: &str, surface: &str) {
    let dict = crate::die!(Dictionary::open(Path::new(dict_file)), "Error loading dictionary: {}");
    let lines = format_tokens(&dict, surface, dict.exact_match(surface));
    if lines.is_empty() {
        println!("No entries for \"{surface}\"");
        return;
    }
    for line in lines {
        println!("{line}");
    }
}

/// Every dictionary surface that is a prefix of `query`, shortest first.
pub fn prefix_lines(dict: &Dictionary, query: &str) -> Vec<String> {
    let chars: Vec<char> = query.chars().collect();
    let mut lines = Vec::new();
    for m in dict.common_prefix_search(chars.iter().copied(), false) {
        let surface: String = chars[..m.length].iter().collect();
        lines.extend(format_tokens(dict, &surface, m.tokens));
    }
    lines
}

pub fn prefix(dict_file: &str, query: &str) {
    let dict = crate::die!(Dictionary::open(Path::new(dict_file)), "Error loading dictionary: {}");
    let lines = prefix_lines(&dict, query);
    if lines.is_empty() {
        println!("No prefixes of \"{query}\"");
        return;
    }
    for line in lines {
        println!("{line}");
    }
}

/// Describe a dictionary, char property or matrix file, told apart by its
/// magic bytes.
pub fn describe(path: &Path) -> Result<String, CliError> {
    let data = fs::read(path)?;
    match data.get(..4) {
        Some(b"MZDC") => {
            let dict = Dictionary::from_bytes(&data)?;
            let info = dict.info();
            Ok(format!(
                "Dictionary: {}\n  type: {:?}\n  version: {}\n  entries: {}\n  attributes: {}x{}\n",
                info.filename, info.dic_type, info.version, info.size, info.lsize, info.rsize
            ))
        }
        Some(b"MZCP") => {
            let property = CharProperty::from_bytes(&data)?;
            let names: Vec<&str> = property.category_names().collect();
            Ok(format!(
                "Char property\n  categories ({}): {}\n",
                names.len(),
                names.join(" ")
            ))
        }
        Some(b"MZCX") => {
            let matrix = ConnectionMatrix::from_bytes(&data)?;
            Ok(format!(
                "Connection matrix\n  size: {}x{}\n",
                matrix.lsize(),
                matrix.rsize()
            ))
        }
        _ => Err(CliError::UnknownFormat(path.display().to_string())),
    }
}

pub fn info(file: &str) {
    print!("{}", crate::die!(describe(Path::new(file)), "Error: {}"));
}

pub fn conn_cost(matrix_file: &str, left: i16, right: i16) {
    let matrix = crate::die!(
        ConnectionMatrix::open(Path::new(matrix_file)),
        "Error loading connection matrix: {}"
    );
    println!("cost({left}, {right}) = {}", matrix.cost(left, right));
}

#[cfg(test)]
mod tests {
    use super::*;
    use mazin_core::dict::compiler::{compile_lines, CompileOptions};
    use mazin_core::dict::DictType;

    fn dictionary() -> Dictionary {
        let opts = CompileOptions {
            dic_type: DictType::System,
            lsize: 3,
            rsize: 3,
            wakati: false,
        };
        compile_lines(
            ["東,1,1,300,名詞,一般", "東京,1,2,100,名詞,固有名詞", "東京,2,2,200,名詞,地名"],
            "sys.csv",
            &opts,
        )
        .unwrap()
    }

    #[test]
    fn test_format_tokens() {
        let dict = dictionary();
        let lines = format_tokens(&dict, "東京", dict.exact_match("東京"));
        assert_eq!(
            lines,
            vec![
                "東京\t1\t2\t100\t名詞,固有名詞".to_string(),
                "東京\t2\t2\t200\t名詞,地名".to_string(),
            ]
        );
        assert!(format_tokens(&dict, "京", dict.exact_match("京")).is_empty());
    }

    #[test]
    fn test_prefix_lines() {
        let dict = dictionary();
        let lines = prefix_lines(&dict, "東京都");
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "東\t1\t1\t300\t名詞,一般");
    }

    #[test]
    fn test_describe_by_magic() {
        let dir = tempfile::tempdir().unwrap();

        let dic_path = dir.path().join("sys.dic");
        dictionary().save(&dic_path).unwrap();
        let text = describe(&dic_path).unwrap();
        assert!(text.starts_with("Dictionary: sys.csv"));
        assert!(text.contains("entries: 3"));
        assert!(text.contains("attributes: 3x3"));

        let matrix_path = dir.path().join("matrix.bin");
        ConnectionMatrix::from_text("2 4\n")
            .unwrap()
            .save(&matrix_path)
            .unwrap();
        assert_eq!(
            describe(&matrix_path).unwrap(),
            "Connection matrix\n  size: 2x4\n"
        );

        let other = dir.path().join("notes.txt");
        fs::write(&other, "hello").unwrap();
        assert!(matches!(describe(&other), Err(CliError::UnknownFormat(_))));
    }
}
