mod compiler;

use std::fs;
use std::path::Path;

pub(super) const CHAR_DEF: &str = "\
# name invoke group length
DEFAULT  0 1 0
SPACE    0 1 0
KANJI    0 0 2
HIRAGANA 0 1 0
KATAKANA 1 1 0
NUMERIC  1 1 0

0x0020 SPACE
0x0030..0x0039 NUMERIC
0x3041..0x309F HIRAGANA
0x30A1..0x30FF KATAKANA
0x30FC KATAKANA HIRAGANA  # prolonged sound mark
0x4E00..0x9FFF KANJI
";

pub(super) const UNK_DEF: &str = "\
DEFAULT,1,1,5000,記号,一般,*,*
SPACE,2,2,0,記号,空白,*,*
KANJI,3,3,8000,名詞,一般,*,*
HIRAGANA,4,4,9000,名詞,一般,*,*
KATAKANA,5,5,6000,名詞,一般,*,*
NUMERIC,6,6,3000,名詞,数,*,*
";

pub(super) const MATRIX_DEF: &str = "\
8 8
0 0 0
1 0 100
4 4 -200
";

pub(super) const SYS_CSV: &str = "\
東京,3,3,3000,名詞,固有名詞,地域,*
東,3,3,4000,名詞,一般,*,*
京都,3,3,3500,名詞,固有名詞,地域,*
は,4,4,500,助詞,係助詞,*,*
";

pub(super) fn write_sources(dir: &Path) {
    fs::write(dir.join("char.def"), CHAR_DEF).unwrap();
    fs::write(dir.join("unk.def"), UNK_DEF).unwrap();
    fs::write(dir.join("matrix.def"), MATRIX_DEF).unwrap();
    fs::write(dir.join("sys.csv"), SYS_CSV).unwrap();
}
