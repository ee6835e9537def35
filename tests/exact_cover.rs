//! Integration tests for the core exact-cover engine ([`dlx`], [`search`]):
//! the Wikipedia example, degenerate matrices, the cover/uncover identity,
//! and determinism across independent runs.

use dlx_exact_cover::{build_matrix, DlxError};

/// Routes `log` output through `env_logger` for this test binary so a
/// failing test can be re-run with `RUST_LOG=debug` for diagnostics.
fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn wikipedia_matrix() -> dlx_exact_cover::Matrix {
    // From original_source/exactcover.py's Wikipedia-example comment.
    let options = vec![
        vec![0, 3, 6],    // A
        vec![0, 3],       // B
        vec![3, 4, 6],    // C
        vec![2, 4, 5],    // D
        vec![1, 2, 5, 6], // E
        vec![1, 6],       // F
    ];
    build_matrix(&options, 7).unwrap()
}

#[test]
fn wikipedia_example_emits_expected_solution() {
    init_logging();
    let mut matrix = wikipedia_matrix();

    let mut solutions = Vec::new();
    matrix.solve_all(|s| solutions.push(s));

    assert_eq!(solutions.len(), 1);
    let mut solution = solutions[0].clone();
    solution.sort_unstable();
    assert_eq!(solution, vec![1, 3, 5]);
}

#[test]
fn empty_matrix_emits_the_empty_solution() {
    init_logging();
    let mut matrix = build_matrix(&[], 0).unwrap();

    let mut solutions = Vec::new();
    matrix.solve_all(|s| solutions.push(s));

    assert_eq!(solutions, vec![Vec::<usize>::new()]);
    assert_eq!(matrix.solve_first().unwrap(), Some(Vec::new()));
}

#[test]
fn isolated_constraint_is_unsatisfiable() {
    init_logging();
    let mut matrix = build_matrix(&[vec![0]], 2).unwrap();

    let mut solutions = Vec::new();
    matrix.solve_all(|s| solutions.push(s));
    assert!(solutions.is_empty());
    assert_eq!(matrix.solve_first().unwrap(), None);
}

#[test]
fn forced_chain_emits_exactly_one_solution() {
    init_logging();
    let mut matrix = build_matrix(&[vec![0], vec![1], vec![2]], 3).unwrap();

    let mut solutions = Vec::new();
    matrix.solve_all(|s| solutions.push(s));

    assert_eq!(solutions.len(), 1);
    let mut solution = solutions[0].clone();
    solution.sort_unstable();
    assert_eq!(solution, vec![0, 1, 2]);
}

#[test]
fn solve_all_is_deterministic_across_runs() {
    init_logging();
    let options = vec![
        vec![0, 3, 6],
        vec![0, 3],
        vec![3, 4, 6],
        vec![2, 4, 5],
        vec![1, 2, 5, 6],
        vec![1, 6],
    ];

    let mut first = build_matrix(&options, 7).unwrap();
    let mut second = build_matrix(&options, 7).unwrap();

    let mut a = Vec::new();
    first.solve_all(|s| a.push(s));
    let mut b = Vec::new();
    second.solve_all(|s| b.push(s));

    assert_eq!(a, b);
}

#[test]
fn solve_up_to_stops_at_the_limit() {
    init_logging();
    // Two independent 1-of-2 choices: 4 total solutions.
    let options = vec![vec![0], vec![0], vec![1], vec![1]];
    let mut matrix = build_matrix(&options, 2).unwrap();
    let solutions = matrix.solve_up_to(2);
    assert_eq!(solutions.len(), 2);
}

#[test]
fn cover_then_uncover_restores_live_counts() {
    init_logging();
    // solve_all explores every branch and uncovers on the way back out of
    // each one (unlike solve_first, which stops on the first success
    // without unwinding), so the matrix is bit-identical afterwards.
    let mut matrix = wikipedia_matrix();
    let before = matrix.live_counts();

    matrix.solve_all(|_| {});

    let after = matrix.live_counts();
    assert_eq!(before, after);
}

#[test]
fn solving_restores_the_header_ring() {
    init_logging();
    let mut matrix = wikipedia_matrix();
    let before = matrix.live_columns();

    matrix.solve_all(|_| {});

    let after = matrix.live_columns();
    assert_eq!(before, after);
}

#[test]
fn build_matrix_rejects_out_of_range_constraint() {
    init_logging();
    let err = build_matrix(&[vec![0, 5]], 3).unwrap_err();
    assert!(matches!(err, DlxError::InvalidInput(_)));
}

#[test]
fn build_matrix_rejects_duplicate_constraint_in_one_option() {
    init_logging();
    let err = build_matrix(&[vec![0, 1, 0]], 3).unwrap_err();
    assert!(matches!(err, DlxError::InvalidInput(_)));
}

#[test]
fn build_matrix_accepts_empty_option() {
    init_logging();
    let matrix = build_matrix(&[vec![], vec![0]], 1).unwrap();
    assert_eq!(matrix.num_options(), 2);
}
