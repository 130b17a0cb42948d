//! Fill-reducing column orderings
//!
//! The ordering selector follows the usual sparse direct solver convention:
//!
//! | [`Order`] | index | graph ordered |
//! |-----------|-------|---------------|
//! | `Natural` | 0 | none, columns keep their order |
//! | `Cholesky` | 1 | pattern of `A + A^T` (`A^T A` when `A` is not square) |
//! | `Lu` | 2 | pattern of `A^T A` with dense rows of `A` dropped |
//! | `Qr` | 3 | pattern of `A^T A` |
//!
//! The graph is ordered with a minimum degree heuristic on a quotient graph:
//! an eliminated node becomes an *element* holding its remaining neighbours,
//! so fill edges are never stored explicitly. Elements adjacent to the pivot are
//! absorbed into the new element, and the degree of every node touched by the
//! pivot is recomputed exactly. Candidates are kept in a binary heap keyed by
//! `(degree, node)`, which breaks ties by the lowest node index; stale heap
//! entries are skipped when popped.

use crate::error::QrError;
use crate::sparse::CscMatrix;
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Column ordering strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Order {
    /// Keep the natural column order
    Natural,
    /// Minimum degree on `A + A^T`, or on `A^T A` for a non-square matrix
    Cholesky,
    /// Minimum degree on `A^T A`, ignoring dense rows
    Lu,
    /// Minimum degree on `A^T A`
    #[default]
    Qr,
}

impl Order {
    /// All orderings, in index order
    pub const ALL: [Order; 4] = [Order::Natural, Order::Cholesky, Order::Lu, Order::Qr];

    /// Map the conventional integer selector (0..=3) to an ordering
    pub fn from_index(index: i32) -> Option<Self> {
        match index {
            0 => Some(Order::Natural),
            1 => Some(Order::Cholesky),
            2 => Some(Order::Lu),
            3 => Some(Order::Qr),
            _ => None,
        }
    }

    /// Integer selector of this ordering
    pub fn index(self) -> i32 {
        match self {
            Order::Natural => 0,
            Order::Cholesky => 1,
            Order::Lu => 2,
            Order::Qr => 3,
        }
    }
}

/// Compute the column permutation `q` for `order`
///
/// Returns `Ok(None)` for [`Order::Natural`]. Otherwise `q[k]` is the column of
/// `a` placed at position `k`.
pub fn column_ordering(order: Order, a: &CscMatrix) -> Result<Option<Vec<usize>>, QrError> {
    if !a.is_valid() {
        return Err(QrError::InvalidMatrix);
    }
    let adjacency = match order {
        Order::Natural => return Ok(None),
        Order::Cholesky if a.num_rows == a.num_cols => symmetric_pattern(a),
        Order::Cholesky => normal_pattern(a, None),
        Order::Lu => {
            let n = a.num_cols as f64;
            let dense = (10.0 * n.sqrt()).max(16.0).min(n - 2.0);
            normal_pattern(a, Some(dense))
        }
        Order::Qr => normal_pattern(a, None),
    };

    let edges: usize = adjacency.iter().map(Vec::len).sum();
    let q = MinimumDegree::new(adjacency).order();
    log::debug!(
        "{:?} ordering: {} columns, {} graph edges",
        order,
        a.num_cols,
        edges / 2
    );
    Ok(Some(q))
}

/// Off-diagonal pattern of `A + A^T`, one sorted neighbour list per node
fn symmetric_pattern(a: &CscMatrix) -> Vec<Vec<usize>> {
    let n = a.num_cols;
    let mut adj: Vec<Vec<usize>> = vec![Vec::new(); n];
    for j in 0..n {
        for &i in &a.row_indices[a.col_range(j)] {
            if i != j {
                adj[i].push(j);
                adj[j].push(i);
            }
        }
    }
    for list in &mut adj {
        list.sort_unstable();
        list.dedup();
    }
    adj
}

/// Off-diagonal pattern of `A^T A`
///
/// Columns are adjacent when they share a row. Rows with more than
/// `dense_limit` entries are skipped.
fn normal_pattern(a: &CscMatrix, dense_limit: Option<f64>) -> Vec<Vec<usize>> {
    let n = a.num_cols;
    let mut rows: Vec<Vec<usize>> = vec![Vec::new(); a.num_rows];
    for j in 0..n {
        for &i in &a.row_indices[a.col_range(j)] {
            rows[i].push(j);
        }
    }

    let mut adj: Vec<Vec<usize>> = vec![Vec::new(); n];
    for cols in &rows {
        if dense_limit.is_some_and(|limit| cols.len() as f64 > limit) {
            continue;
        }
        for &j1 in cols {
            for &j2 in cols {
                if j1 != j2 {
                    adj[j1].push(j2);
                }
            }
        }
    }
    for list in &mut adj {
        list.sort_unstable();
        list.dedup();
    }
    adj
}

/// Minimum degree elimination on a quotient graph
struct MinimumDegree {
    /// Variable neighbours of each live variable
    vars: Vec<Vec<usize>>,
    /// Elements adjacent to each live variable
    elements: Vec<Vec<usize>>,
    /// Variables covered by each element (indexed by the eliminated node)
    members: Vec<Vec<usize>>,
    eliminated: Vec<bool>,
    absorbed: Vec<bool>,
    degree: Vec<usize>,
    heap: BinaryHeap<Reverse<(usize, usize)>>,
    marker: Vec<usize>,
    mark: usize,
}

impl MinimumDegree {
    fn new(adjacency: Vec<Vec<usize>>) -> Self {
        let n = adjacency.len();
        let degree: Vec<usize> = adjacency.iter().map(Vec::len).collect();
        let heap = degree
            .iter()
            .enumerate()
            .map(|(node, &deg)| Reverse((deg, node)))
            .collect();
        Self {
            vars: adjacency,
            elements: vec![Vec::new(); n],
            members: vec![Vec::new(); n],
            eliminated: vec![false; n],
            absorbed: vec![false; n],
            degree,
            heap,
            marker: vec![0; n],
            mark: 0,
        }
    }

    fn order(mut self) -> Vec<usize> {
        let n = self.vars.len();
        let mut q = Vec::with_capacity(n);
        while let Some(p) = self.next_pivot() {
            q.push(p);
            self.eliminate(p);
        }
        debug_assert_eq!(q.len(), n);
        q
    }

    fn next_pivot(&mut self) -> Option<usize> {
        while let Some(Reverse((deg, node))) = self.heap.pop() {
            if !self.eliminated[node] && self.degree[node] == deg {
                return Some(node);
            }
        }
        None
    }

    fn next_mark(&mut self) -> usize {
        self.mark += 1;
        self.mark
    }

    fn eliminate(&mut self, p: usize) {
        self.eliminated[p] = true;

        // Reach of p: live variable neighbours plus members of adjacent elements
        let mark = self.next_mark();
        self.marker[p] = mark;
        let mut reach = Vec::new();
        let absorbed_elements = std::mem::take(&mut self.elements[p]);
        let direct = std::mem::take(&mut self.vars[p]);
        for &v in direct
            .iter()
            .chain(absorbed_elements.iter().flat_map(|&e| self.members[e].iter()))
        {
            if !self.eliminated[v] && self.marker[v] != mark {
                self.marker[v] = mark;
                reach.push(v);
            }
        }

        for &e in &absorbed_elements {
            self.absorbed[e] = true;
            self.members[e].clear();
        }

        // Every variable in the reach now sees p as an element; its direct edges
        // into the reach are implied by that element and can be dropped.
        for &v in &reach {
            let absorbed = &self.absorbed;
            self.elements[v].retain(|&e| !absorbed[e]);
            self.elements[v].push(p);

            let eliminated = &self.eliminated;
            let marker = &self.marker;
            self.vars[v].retain(|&w| !eliminated[w] && marker[w] != mark);
        }

        self.members[p] = reach;

        let reach = self.members[p].clone();
        for v in reach {
            self.update_degree(v);
        }
    }

    fn update_degree(&mut self, v: usize) {
        let mark = self.next_mark();
        self.marker[v] = mark;
        let mut degree = 0;

        for &w in &self.vars[v] {
            if !self.eliminated[w] && self.marker[w] != mark {
                self.marker[w] = mark;
                degree += 1;
            }
        }
        for &e in &self.elements[v] {
            for &w in &self.members[e] {
                if !self.eliminated[w] && self.marker[w] != mark {
                    self.marker[w] = mark;
                    degree += 1;
                }
            }
        }

        self.degree[v] = degree;
        self.heap.push(Reverse((degree, v)));
    }
}
