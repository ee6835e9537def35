//! Property-based tests over randomly generated exact-cover instances:
//! structural invariants that must hold regardless of whether a given
//! instance happens to be satisfiable.

use proptest::collection::{hash_set, vec};
use proptest::prelude::*;

use dlx_exact_cover::{build_matrix, DlxError};

/// Routes `log` output through `env_logger` for this test binary so a
/// failing shrink case can be re-run with `RUST_LOG=debug` for diagnostics.
fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A random `(num_constraints, options)` pair where every option is a
/// well-formed (in-range, duplicate-free) subset of `0..num_constraints`.
fn arb_instance() -> impl Strategy<Value = (usize, Vec<Vec<usize>>)> {
    (1usize..6).prop_flat_map(|n| {
        let option = hash_set(0..n, 0..=4).prop_map(|set| {
            let mut v: Vec<usize> = set.into_iter().collect();
            v.sort_unstable();
            v
        });
        (Just(n), vec(option, 0..8))
    })
}

proptest! {
    #[test]
    fn build_matrix_accepts_well_formed_instances((n, options) in arb_instance()) {
        init_logging();
        let matrix = build_matrix(&options, n).unwrap();
        prop_assert_eq!(matrix.num_constraints(), n);
        prop_assert_eq!(matrix.num_options(), options.len());
    }

    /// Every option in every emitted solution, taken together, covers each
    /// constraint exactly once — the defining property of an exact cover,
    /// independent of how many solutions (if any) an instance admits.
    #[test]
    fn solutions_are_valid_exact_covers((n, options) in arb_instance()) {
        init_logging();
        let mut matrix = build_matrix(&options, n).unwrap();
        let mut solutions = Vec::new();
        matrix.solve_all(|s| solutions.push(s));

        for solution in &solutions {
            let mut covered = vec![0u32; n];
            for &opt in solution {
                for &c in &options[opt] {
                    covered[c] += 1;
                }
            }
            prop_assert!(covered.iter().all(|&count| count == 1));
        }
    }

    /// `solve_all` visits and uncovers every branch it opens (it has no
    /// early-success short circuit), so the matrix comes back bit-identical
    /// to a caller who only watches the live-count of each column.
    #[test]
    fn exhaustive_search_restores_live_counts((n, options) in arb_instance()) {
        init_logging();
        let mut matrix = build_matrix(&options, n).unwrap();
        let before = matrix.live_counts();

        matrix.solve_all(|_| {});

        let after = matrix.live_counts();
        prop_assert_eq!(before, after);
    }

    #[test]
    fn build_matrix_rejects_out_of_range_constraint_index(n in 1usize..6, offset in 0usize..8) {
        init_logging();
        let bad = n + offset;
        let err = build_matrix(&[vec![bad]], n).unwrap_err();
        prop_assert!(matches!(err, DlxError::InvalidInput(_)));
    }

    #[test]
    fn build_matrix_rejects_duplicate_index_within_one_option(n in 1usize..6, c in 0usize..6) {
        init_logging();
        prop_assume!(c < n);
        let err = build_matrix(&[vec![c, c]], n).unwrap_err();
        prop_assert!(matches!(err, DlxError::InvalidInput(_)));
    }
}
