//! The dancing-links sparse-matrix store and its cover/uncover primitive.
//!
//! Nodes live in a flat arena (`Vec<Node>`) and are addressed by `NodeId`
//! (`u32`) rather than by reference, so the toroidal four-way linked
//! structure never needs `Rc`/`RefCell` or unsafe pointer juggling. Index 0
//! is always the root sentinel; indices `1..=num_constraints` are the
//! column headers; everything after that is a body node belonging to some
//! option.

use std::collections::HashSet;

use log::{debug, warn};

use crate::error::DlxError;

/// Arena index of a node. `NULL` is never a valid node.
pub type NodeId = u32;

const NULL: NodeId = u32::MAX;
const ROOT: NodeId = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Prev,
    Next,
    Up,
    Down,
}

/// What a node represents: the root sentinel, a column header carrying the
/// live-count invariant, or a row/column intersection body node.
#[derive(Debug, Clone, Copy)]
enum Slot {
    Root,
    Header { live_count: u32 },
    Body { column: NodeId, option_id: u32 },
}

#[derive(Debug, Clone, Copy)]
struct Node {
    links: [NodeId; 4],
    slot: Slot,
}

impl Node {
    fn new(slot: Slot) -> Self {
        Self {
            links: [NULL; 4],
            slot,
        }
    }

    fn link(&self, dir: Direction) -> NodeId {
        self.links[dir as usize]
    }

    fn set_link(&mut self, dir: Direction, to: NodeId) {
        self.links[dir as usize] = to;
    }
}

/// A cursor over one of the circular linked lists, borrowing the matrix
/// only for the duration of a single `next` call. This is what lets
/// `cover`/`uncover` mutate the very structure being walked: the cursor
/// itself owns nothing but two indices.
struct Cursor {
    start: NodeId,
    current: NodeId,
}

impl Cursor {
    fn new(start: NodeId) -> Self {
        Self {
            start,
            current: start,
        }
    }

    fn next(&mut self, matrix: &Matrix, dir: Direction) -> Option<NodeId> {
        let next = matrix.node(self.current).link(dir);
        self.current = next;
        if next == self.start {
            None
        } else {
            Some(next)
        }
    }
}

/// A cursor handed to the search engine, hiding [`Direction`] behind the
/// two traversal senses it actually needs: `Down` for the rows in a
/// column, `Next`/`Prev` for the other cells in a row.
pub(crate) struct RowCursor(Cursor);

impl RowCursor {
    pub(crate) fn next_down(&mut self, matrix: &Matrix) -> Option<NodeId> {
        self.0.next(matrix, Direction::Down)
    }

    pub(crate) fn next_forward(&mut self, matrix: &Matrix) -> Option<NodeId> {
        self.0.next(matrix, Direction::Next)
    }

    pub(crate) fn next_backward(&mut self, matrix: &Matrix) -> Option<NodeId> {
        self.0.next(matrix, Direction::Prev)
    }
}

/// The toroidal sparse-matrix store plus the cover/uncover primitive and
/// column selector. Built once by [`build_matrix`], then mutated
/// exclusively by the single search that owns it.
#[derive(Debug)]
pub struct Matrix {
    nodes: Vec<Node>,
    num_constraints: usize,
    num_options: usize,
}

/// Outcome of choosing the next column to branch on. Exposed as a
/// three-way enum rather than an identity-vs-root comparison so the search
/// engine's recursive contract reads as a plain match.
pub(crate) enum ColumnChoice {
    /// `root.right == root`: every constraint is satisfied.
    Solved,
    /// The chosen column has zero live options; this branch cannot succeed.
    Dead,
    /// Branch on this column header.
    Column(NodeId),
}

/// Builds the toroidal structure from a compressed matrix: `options[i]` is
/// the list of constraint indices that option `i` sets (order doesn't
/// matter for correctness).
///
/// Fails with [`DlxError::InvalidInput`] if any constraint index is out of
/// range, if an option names the same constraint twice, or if the counts
/// don't fit a `u32` arena index.
pub fn build_matrix(options: &[Vec<usize>], num_constraints: usize) -> Result<Matrix, DlxError> {
    if u32::try_from(num_constraints).is_err() {
        return Err(DlxError::InvalidInput(format!(
            "num_constraints {num_constraints} exceeds the u32 arena's addressable range"
        )));
    }
    if u32::try_from(options.len()).is_err() {
        return Err(DlxError::InvalidInput(format!(
            "num_options {} exceeds the u32 arena's addressable range",
            options.len()
        )));
    }

    let total_entries: usize = options.iter().map(Vec::len).sum();
    let mut nodes = Vec::with_capacity(1 + num_constraints + total_entries);
    nodes.push(Node::new(Slot::Root));
    for _ in 0..num_constraints {
        nodes.push(Node::new(Slot::Header { live_count: 0 }));
    }
    link_header_ring(&mut nodes, num_constraints);

    let mut matrix = Matrix {
        nodes,
        num_constraints,
        num_options: options.len(),
    };

    for (option_id, constraints) in options.iter().enumerate() {
        if let Err(e) = matrix.append_option(option_id as u32, constraints) {
            warn!("build_matrix: rejecting option {option_id}: {e}");
            return Err(e);
        }
    }

    debug!(
        "build_matrix: {} options over {} constraints ({} nodes)",
        matrix.num_options,
        matrix.num_constraints,
        matrix.nodes.len()
    );

    Ok(matrix)
}

/// Links the root and the `num_constraints` freshly-allocated headers into
/// one closed horizontal ring, each header self-looped vertically.
fn link_header_ring(nodes: &mut [Node], num_constraints: usize) {
    for (idx, node) in nodes.iter_mut().enumerate() {
        let idx = idx as NodeId;
        node.set_link(Direction::Up, idx);
        node.set_link(Direction::Down, idx);
    }

    if num_constraints == 0 {
        nodes[ROOT as usize].set_link(Direction::Next, ROOT);
        nodes[ROOT as usize].set_link(Direction::Prev, ROOT);
        return;
    }

    let len = nodes.len();
    for idx in 0..len {
        let idx = idx as NodeId;
        let next = if idx as usize + 1 == len { ROOT } else { idx + 1 };
        let prev = if idx == ROOT { len as NodeId - 1 } else { idx - 1 };
        nodes[idx as usize].set_link(Direction::Next, next);
        nodes[idx as usize].set_link(Direction::Prev, prev);
    }
}

impl Matrix {
    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id as usize]
    }

    fn link(&self, id: NodeId, dir: Direction) -> NodeId {
        self.node(id).link(dir)
    }

    fn set_link(&mut self, id: NodeId, dir: Direction, to: NodeId) {
        self.nodes[id as usize].set_link(dir, to);
    }

    fn header_id(&self, constraint: usize) -> NodeId {
        1 + constraint as NodeId
    }

    fn live_count(&self, header: NodeId) -> u32 {
        match self.node(header).slot {
            Slot::Header { live_count } => live_count,
            _ => unreachable!("expected a column header"),
        }
    }

    fn live_count_mut(&mut self, header: NodeId) -> &mut u32 {
        match &mut self.nodes[header as usize].slot {
            Slot::Header { live_count } => live_count,
            _ => unreachable!("expected a column header"),
        }
    }

    pub(crate) fn column_of(&self, body: NodeId) -> NodeId {
        match self.node(body).slot {
            Slot::Body { column, .. } => column,
            _ => unreachable!("expected a body node"),
        }
    }

    pub(crate) fn option_id_of(&self, body: NodeId) -> u32 {
        match self.node(body).slot {
            Slot::Body { option_id, .. } => option_id,
            _ => unreachable!("expected a body node"),
        }
    }

    pub fn num_constraints(&self) -> usize {
        self.num_constraints
    }

    pub fn num_options(&self) -> usize {
        self.num_options
    }

    /// Appends one option's row, validating and linking it into every
    /// constraint column it touches.
    fn append_option(&mut self, option_id: u32, constraints: &[usize]) -> Result<(), DlxError> {
        let mut seen = HashSet::with_capacity(constraints.len());
        for &c in constraints {
            if c >= self.num_constraints {
                return Err(DlxError::InvalidInput(format!(
                    "option {option_id} references constraint {c}, but only {} constraints exist",
                    self.num_constraints
                )));
            }
            if !seen.insert(c) {
                return Err(DlxError::InvalidInput(format!(
                    "option {option_id} references constraint {c} more than once"
                )));
            }
        }

        let mut first: Option<NodeId> = None;
        let mut prev: Option<NodeId> = None;

        for &c in constraints {
            let header = self.header_id(c);
            let idx = self.nodes.len() as NodeId;
            self.nodes.push(Node::new(Slot::Body {
                column: header,
                option_id,
            }));

            self.append_to_column(header, idx);

            match prev {
                None => first = Some(idx),
                Some(p) => {
                    self.set_link(p, Direction::Next, idx);
                    self.set_link(idx, Direction::Prev, p);
                }
            }
            prev = Some(idx);
        }

        if let (Some(first), Some(last)) = (first, prev) {
            self.set_link(last, Direction::Next, first);
            self.set_link(first, Direction::Prev, last);
        }

        Ok(())
    }

    /// Appends `new_node` to the bottom of column `header`'s vertical list.
    fn append_to_column(&mut self, header: NodeId, new_node: NodeId) {
        let tail = self.link(header, Direction::Up);
        self.set_link(header, Direction::Up, new_node);
        self.set_link(tail, Direction::Down, new_node);
        self.set_link(new_node, Direction::Up, tail);
        self.set_link(new_node, Direction::Down, header);
        *self.live_count_mut(header) += 1;
    }

    fn unlink_lr(&mut self, n: NodeId) {
        let l = self.link(n, Direction::Prev);
        let r = self.link(n, Direction::Next);
        self.set_link(l, Direction::Next, r);
        self.set_link(r, Direction::Prev, l);
    }

    fn relink_lr(&mut self, n: NodeId) {
        let l = self.link(n, Direction::Prev);
        let r = self.link(n, Direction::Next);
        self.set_link(l, Direction::Next, n);
        self.set_link(r, Direction::Prev, n);
    }

    fn unlink_ud(&mut self, n: NodeId) {
        let u = self.link(n, Direction::Up);
        let d = self.link(n, Direction::Down);
        self.set_link(u, Direction::Down, d);
        self.set_link(d, Direction::Up, u);
    }

    fn relink_ud(&mut self, n: NodeId) {
        let u = self.link(n, Direction::Up);
        let d = self.link(n, Direction::Down);
        self.set_link(u, Direction::Down, n);
        self.set_link(d, Direction::Up, n);
    }

    /// Removes column `c` and every row intersecting it. `uncover` below is
    /// the exact mirror, walked in reverse.
    pub(crate) fn cover(&mut self, c: NodeId) {
        self.unlink_lr(c);

        let mut rows = Cursor::new(c);
        while let Some(r) = rows.next(self, Direction::Down) {
            let mut cols = Cursor::new(r);
            while let Some(j) = cols.next(self, Direction::Next) {
                self.unlink_ud(j);
                let col = self.column_of(j);
                *self.live_count_mut(col) -= 1;
            }
        }
    }

    /// The exact inverse of [`Matrix::cover`]: callers must uncover in the
    /// reverse order they covered, or the link state will not come back
    /// bit-identical.
    pub(crate) fn uncover(&mut self, c: NodeId) {
        let mut rows = Cursor::new(c);
        while let Some(r) = rows.next(self, Direction::Up) {
            let mut cols = Cursor::new(r);
            while let Some(j) = cols.next(self, Direction::Prev) {
                let col = self.column_of(j);
                *self.live_count_mut(col) += 1;
                self.relink_ud(j);
            }
        }

        self.relink_lr(c);
    }

    /// Chooses the next column to branch on: fewest live options, tie broken
    /// left-to-right, early-exiting on the first empty column.
    pub(crate) fn select_column(&self) -> ColumnChoice {
        if self.link(ROOT, Direction::Next) == ROOT {
            return ColumnChoice::Solved;
        }

        let mut best: Option<(NodeId, u32)> = None;
        let mut cursor = Cursor::new(ROOT);
        while let Some(c) = cursor.next(self, Direction::Next) {
            let count = self.live_count(c);
            if count == 0 {
                return ColumnChoice::Dead;
            }
            if best.map_or(true, |(_, best_count)| count < best_count) {
                best = Some((c, count));
            }
        }

        match best {
            Some((col, _)) => ColumnChoice::Column(col),
            None => ColumnChoice::Solved,
        }
    }

    /// A live cursor over the row nodes in column `c`'s vertical list, in
    /// `Down` order. Kept open across the search engine's recursive calls
    /// rather than collected eagerly: a chosen branch column's own vertical
    /// list is never touched by covering the *other* columns its rows
    /// touch, so the cursor stays valid for the whole loop without the
    /// hot path allocating anything.
    pub(crate) fn rows_in(&self, c: NodeId) -> RowCursor {
        RowCursor(Cursor::new(c))
    }

    /// A live cursor over the other body nodes in the row containing `r`,
    /// walked forward (`Next`, for covering) or backward (`Prev`, for the
    /// mirrored uncover) depending on which method is called. Starts just
    /// after/before `r` and wraps back to (but excludes) `r`.
    pub(crate) fn row_from(&self, r: NodeId) -> RowCursor {
        RowCursor(Cursor::new(r))
    }

    /// Introspection: the live-count of every constraint column, indexed
    /// `0..num_constraints`. A column's own count is unaffected by covering
    /// that same column (only its row-siblings' counts change), so this is
    /// stable across a matched `cover`/`uncover` pair on one column.
    pub fn live_counts(&self) -> Vec<u32> {
        (0..self.num_constraints)
            .map(|c| self.live_count(self.header_id(c)))
            .collect()
    }

    /// Introspection: the 0-based constraint indices currently linked into
    /// the header ring, in ring order. A column temporarily removed by
    /// `cover` is absent until the matching `uncover` restores it.
    pub fn live_columns(&self) -> Vec<usize> {
        let mut out = Vec::new();
        let mut cursor = Cursor::new(ROOT);
        while let Some(c) = cursor.next(self, Direction::Next) {
            out.push((c - 1) as usize);
        }
        out
    }
}
