//! Mixed-writing ("maze") cost adjustment.
//!
//! A MAZE entry spells a word partly in kana and partly in kanji. Such
//! entries get a word-cost penalty scaled by surface length, and when the
//! penalty is negative, adjacent MAZE nodes pay an extra connection cost.

const MAZE_TAG: &str = "MAZE";
/// Zero-based index of the feature field carrying the MAZE tag.
const MAZE_FIELD: usize = 4;
const PROPER_NOUN_PREFIX: &str = "名詞:固有名詞";
const NON_MAZE_MARKERS: [&str; 2] = [",非MAZE", ",非交"];
/// Added to entries marked non-MAZE when the penalty is negative.
pub const NON_MAZE_PENALTY: i32 = 1_000_000;

pub fn is_maze_feature(feature: &str) -> bool {
    feature.split(',').nth(MAZE_FIELD) == Some(MAZE_TAG)
}

/// Penalty multiplier for a MAZE entry with a surface of `length` chars.
pub fn maze_factor(penalty: i32, length: usize, proper_noun: bool) -> i32 {
    let base = if penalty > 0 {
        match length {
            0..=2 => 5,
            3 => 3,
            _ => 1,
        }
    } else {
        1
    };
    if proper_noun {
        base + 2
    } else {
        base
    }
}

/// Word-cost delta for a node; zero when `penalty` is zero.
pub fn maze_adjustment(feature: &str, is_maze: bool, length: usize, penalty: i32) -> i32 {
    if penalty == 0 {
        return 0;
    }
    if is_maze {
        let factor = maze_factor(penalty, length, feature.starts_with(PROPER_NOUN_PREFIX));
        penalty.saturating_mul(factor)
    } else if penalty < 0 && NON_MAZE_MARKERS.iter().any(|m| feature.contains(m)) {
        NON_MAZE_PENALTY
    } else {
        0
    }
}
