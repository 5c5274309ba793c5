use crate::analyzer::feature::{is_maze_feature, maze_adjustment, maze_factor, NON_MAZE_PENALTY};
use crate::analyzer::testutil::{analyzer, ZERO_MATRIX};

#[test]
fn test_maze_factor_table() {
    assert_eq!(maze_factor(5, 1, false), 5);
    assert_eq!(maze_factor(5, 2, false), 5);
    assert_eq!(maze_factor(5, 3, false), 3);
    assert_eq!(maze_factor(5, 4, false), 1);
    assert_eq!(maze_factor(5, 9, false), 1);
    assert_eq!(maze_factor(5, 2, true), 7);
    assert_eq!(maze_factor(5, 3, true), 5);
    assert_eq!(maze_factor(5, 4, true), 3);
    assert_eq!(maze_factor(-5, 2, false), 1);
    assert_eq!(maze_factor(-5, 2, true), 3);
}

#[test]
fn test_is_maze_feature() {
    assert!(is_maze_feature("名詞,一般,*,*,MAZE"));
    assert!(is_maze_feature("名詞,一般,*,*,MAZE,extra"));
    assert!(!is_maze_feature("名詞,一般,*,MAZE"));
    assert!(!is_maze_feature("名詞,一般,*,*,非MAZE"));
    assert!(!is_maze_feature(""));
}

#[test]
fn test_maze_adjustment() {
    let maze = "名詞,一般,*,*,MAZE";
    assert_eq!(maze_adjustment(maze, true, 2, 5), 25);
    assert_eq!(maze_adjustment(maze, true, 3, 5), 15);
    assert_eq!(maze_adjustment(maze, true, 2, 0), 0);
    assert_eq!(maze_adjustment(maze, true, 2, -5), -5);
    assert_eq!(maze_adjustment("名詞:固有名詞,*,*,*,MAZE", true, 2, 5), 35);

    let plain = "名詞,一般,非MAZE";
    assert_eq!(maze_adjustment(plain, false, 2, 5), 0);
    assert_eq!(maze_adjustment(plain, false, 2, -5), NON_MAZE_PENALTY);
    assert_eq!(maze_adjustment("動詞,非交", false, 1, -1), NON_MAZE_PENALTY);
    assert_eq!(maze_adjustment("名詞,一般", false, 2, -5), 0);
}

#[test]
fn test_maze_penalty_applied_to_nodes() {
    let an = analyzer(
        "漢字,1,1,100,名詞,一般,*,*,MAZE\n固有,1,1,100,名詞:固有名詞,*,*,*,MAZE\n",
        ZERO_MATRIX,
    );
    let lattice = an.build_lattice("漢字", 1, 5, 0, false).unwrap();
    let node = lattice.node(lattice.best_path()[0]);
    assert!(node.is_maze);
    assert_eq!(node.wcost, 125);

    let lattice = an.build_lattice("固有", 1, 5, 0, false).unwrap();
    assert_eq!(lattice.node(lattice.best_path()[0]).wcost, 135);
}

#[test]
fn test_zero_penalty_falls_back_to_settings() {
    let an = analyzer("漢字,1,1,100,名詞,一般,*,*,MAZE\n", ZERO_MATRIX);
    // default maze_penalty is 1000, factor 5 for two characters
    let result = an.analyze("漢字", 1, 0, 0, false).unwrap();
    assert_eq!(result.cost, 5100);
}

#[test]
fn test_negative_penalty_connection() {
    let an = analyzer(
        "漢,1,1,100,名詞,一般,*,*,MAZE\n字,1,1,100,名詞,一般,*,*,MAZE\n",
        ZERO_MATRIX,
    );
    // each word gets -1, the MAZE-MAZE link pays 500
    let result = an.analyze("漢字", 1, -1, 500, false).unwrap();
    assert_eq!(result.cost, 99 + 500 + 99);
}

#[test]
fn test_negative_penalty_demotes_non_maze() {
    let an = analyzer(
        "漢字,1,1,100,名詞,一般,非MAZE\n漢字,1,1,5000,名詞,一般,*,*,MAZE\n",
        ZERO_MATRIX,
    );
    let result = an.analyze("漢字", 1, -10, 0, false).unwrap();
    assert_eq!(result.cost, 4990);
    assert_eq!(result.solutions[0], "漢字\t名詞,一般,*,*,MAZE\nEOS\n");
}
