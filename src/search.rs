//! The recursive branch-and-bound search engine: Algorithm X driven by
//! the column selector and cover/uncover primitive from [`crate::dlx`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use log::trace;

use crate::dlx::{ColumnChoice, Matrix, NodeId};
use crate::error::DlxError;

/// Optional cooperative cancellation for a solve: a deadline, an abort
/// flag, or both. Checked once at the top of every recursive call (never
/// inside the cover/uncover inner loops), so a tripped search always
/// unwinds through a clean, fully-uncovered matrix.
#[derive(Default, Clone)]
pub struct SolveOptions {
    deadline: Option<Instant>,
    abort: Option<Arc<AtomicBool>>,
}

impl SolveOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_abort_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.abort = Some(flag);
        self
    }

    fn tripped(&self) -> Option<DlxError> {
        if let Some(flag) = &self.abort {
            if flag.load(Ordering::Relaxed) {
                return Some(DlxError::Cancelled);
            }
        }
        if let Some(deadline) = self.deadline {
            if Instant::now() >= deadline {
                return Some(DlxError::DeadlineExceeded);
            }
        }
        None
    }
}

impl Matrix {
    /// Returns the first exact cover found, or `None` if the matrix is
    /// unsatisfiable. Unsatisfiability is an ordinary outcome, not an error
    /// — only cancellation produces an `Err`.
    pub fn solve_first(&mut self) -> Result<Option<Vec<usize>>, DlxError> {
        self.solve_first_with(&SolveOptions::default())
    }

    pub fn solve_first_with(
        &mut self,
        opts: &SolveOptions,
    ) -> Result<Option<Vec<usize>>, DlxError> {
        let mut partial = Vec::new();
        if self.search_first(&mut partial, opts)? {
            Ok(Some(partial))
        } else {
            Ok(None)
        }
    }

    fn search_first(
        &mut self,
        partial: &mut Vec<usize>,
        opts: &SolveOptions,
    ) -> Result<bool, DlxError> {
        if let Some(err) = opts.tripped() {
            return Err(err);
        }

        let c = match self.select_column() {
            ColumnChoice::Solved => return Ok(true),
            ColumnChoice::Dead => return Ok(false),
            ColumnChoice::Column(c) => c,
        };

        let mut rows = self.rows_in(c);
        while let Some(r) = rows.next_down(self) {
            partial.push(self.option_id_of(r) as usize);

            self.cover(c);
            let mut fwd = self.row_from(r);
            while let Some(j) = fwd.next_forward(self) {
                self.cover(self.column_of(j));
            }

            match self.search_first(partial, opts) {
                Ok(true) => {
                    // A complete solution was found with row `r` included;
                    // stop immediately without uncovering or popping, the
                    // matrix's covered state no longer matters.
                    return Ok(true);
                }
                Ok(false) => {
                    self.uncover_row(c, r);
                    partial.pop();
                }
                Err(e) => {
                    self.uncover_row(c, r);
                    partial.pop();
                    return Err(e);
                }
            }
        }

        Ok(false)
    }

    /// Invokes `sink` with a copy of the option-id set for every exact
    /// cover this matrix admits, in a deterministic order fixed by the
    /// column selector's tie-break and the row order within each column.
    /// Infallible: the default `SolveOptions` never trips.
    pub fn solve_all(&mut self, sink: impl FnMut(Vec<usize>)) {
        self.solve_all_with(&SolveOptions::default(), sink)
            .expect("solve_all is infallible: the default SolveOptions never trips");
    }

    pub fn solve_all_with(
        &mut self,
        opts: &SolveOptions,
        mut sink: impl FnMut(Vec<usize>),
    ) -> Result<(), DlxError> {
        let mut partial = Vec::new();
        self.search_all(&mut partial, opts, &mut sink)
    }

    fn search_all(
        &mut self,
        partial: &mut Vec<usize>,
        opts: &SolveOptions,
        sink: &mut dyn FnMut(Vec<usize>),
    ) -> Result<(), DlxError> {
        if let Some(err) = opts.tripped() {
            return Err(err);
        }

        let c = match self.select_column() {
            ColumnChoice::Solved => {
                sink(partial.clone());
                return Ok(());
            }
            ColumnChoice::Dead => return Ok(()),
            ColumnChoice::Column(c) => c,
        };

        let mut rows = self.rows_in(c);
        while let Some(r) = rows.next_down(self) {
            trace!("search_all: branching on row node {r}");
            partial.push(self.option_id_of(r) as usize);

            self.cover(c);
            let mut fwd = self.row_from(r);
            while let Some(j) = fwd.next_forward(self) {
                self.cover(self.column_of(j));
            }

            let result = self.search_all(partial, opts, sink);

            self.uncover_row(c, r);
            partial.pop();

            result?;
        }

        Ok(())
    }

    /// Enumerates at most `limit` exact covers, stopping the search as soon
    /// as that many have been collected. Sugar over [`Matrix::solve_all`]
    /// via an abort flag — introduces no new traversal logic.
    pub fn solve_up_to(&mut self, limit: usize) -> Vec<Vec<usize>> {
        let mut results = Vec::new();
        if limit == 0 {
            return results;
        }

        let stop = Arc::new(AtomicBool::new(false));
        let opts = SolveOptions::new().with_abort_flag(stop.clone());
        let _ = self.solve_all_with(&opts, |solution| {
            results.push(solution);
            if results.len() >= limit {
                stop.store(true, Ordering::Relaxed);
            }
        });

        results
    }

    /// Uncovers the other columns row `r` touched, walking backward from
    /// `r` so each column comes back in the exact reverse of the order
    /// `search_first`/`search_all` covered it in, then uncovers the branch
    /// column `c` itself.
    fn uncover_row(&mut self, c: NodeId, r: NodeId) {
        let mut bwd = self.row_from(r);
        while let Some(j) = bwd.next_backward(self) {
            self.uncover(self.column_of(j));
        }
        self.uncover(c);
    }
}
