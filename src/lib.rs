//! An exact-cover solver built on Knuth's dancing links (DLX), with a
//! Sudoku-to-exact-cover reduction on top.
//!
//! [`dlx`] owns the toroidal sparse matrix and the cover/uncover primitive;
//! [`search`] is the recursive branch-and-bound engine built on it;
//! [`sudoku`] is a thin collaborator that reduces a 9×9 grid to the matrix
//! `dlx` expects and decodes a solution back into digits. Nothing in `dlx`
//! or `search` knows Sudoku exists.

pub mod dlx;
pub mod error;
pub mod search;
pub mod sudoku;

pub use dlx::{build_matrix, Matrix, NodeId};
pub use error::DlxError;
pub use search::SolveOptions;
pub use sudoku::{sudoku_decode, sudoku_encode, Grid, Sudoku};
