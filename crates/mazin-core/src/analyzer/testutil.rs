//! In-memory dictionaries for analyzer tests.

use std::sync::Arc;

use super::{Analyzer, Tokenizer};
use crate::dict::compiler::{compile_lines, CompileOptions};
use crate::dict::{CharProperty, ConnectionMatrix, DictType, Dictionary};
use crate::settings::Settings;

pub(crate) const ATTR_SIZE: u32 = 5;

pub(crate) const CHAR_DEF: &str = "\
DEFAULT  0 1 0
SPACE    0 1 0
SYMBOL   0 0 0
ALPHA    0 1 1
KANJI    0 0 2
KATAKANA 1 1 0

0x0009 SPACE
0x0020 SPACE
0x3000 SPACE
0x0021..0x002F SYMBOL
0x0061..0x007A ALPHA
0x30A1..0x30FF KATAKANA
0x4E00..0x9FFF KANJI
";

pub(crate) const UNK_DEF: &str = "\
DEFAULT,1,1,5000,記号,一般
SPACE,1,1,0,記号,空白
SYMBOL,1,1,3000,記号,一般
ALPHA,2,2,4000,名詞,英字
KANJI,3,3,8000,名詞,一般
KATAKANA,4,4,6000,名詞,外来語
";

/// A 5x5 matrix of zero costs.
pub(crate) const ZERO_MATRIX: &str = "5 5\n";

fn options(dic_type: DictType) -> CompileOptions {
    CompileOptions {
        dic_type,
        lsize: ATTR_SIZE,
        rsize: ATTR_SIZE,
        wakati: false,
    }
}

pub(crate) fn char_property() -> CharProperty {
    CharProperty::parse(CHAR_DEF, UNK_DEF).unwrap()
}

pub(crate) fn dictionary(csv: &str, dic_type: DictType) -> Dictionary {
    compile_lines(csv.lines(), "test.csv", &options(dic_type)).unwrap()
}

pub(crate) fn tokenizer(sys_csv: &str) -> Tokenizer {
    Tokenizer::new(
        dictionary(sys_csv, DictType::System),
        dictionary(UNK_DEF, DictType::Unknown),
        char_property(),
        24,
    )
    .unwrap()
}

pub(crate) fn analyzer_with(sys_csv: &str, matrix: &str, settings: Settings) -> Analyzer {
    let matrix = ConnectionMatrix::from_text(matrix).unwrap();
    Analyzer::new(tokenizer(sys_csv), Arc::new(matrix), settings)
}

pub(crate) fn analyzer(sys_csv: &str, matrix: &str) -> Analyzer {
    analyzer_with(sys_csv, matrix, Settings::default())
}
