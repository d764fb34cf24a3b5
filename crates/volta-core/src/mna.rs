//! Modified Nodal Analysis (MNA) matrix structures.

use nalgebra::{DMatrix, DVector};

/// MNA system: Gx = b.
///
/// `G` is the conductance matrix extended with the voltage-source coupling
/// blocks, `x` the solution vector (node voltages then branch currents),
/// `b` the right-hand side (current injections then source voltages).
///
/// Node indices passed to the stamp methods are 0-based matrix rows;
/// `None` stands for the ground node, which has no row.
#[derive(Debug, Clone)]
pub struct MnaSystem {
    matrix: DMatrix<f64>,
    rhs: DVector<f64>,
    /// Number of independent node unknowns (ground excluded).
    pub num_nodes: usize,
    /// Number of branch-current unknowns (one per voltage source).
    pub num_vsources: usize,
}

impl MnaSystem {
    /// Create a zeroed system for `num_nodes` non-ground nodes and
    /// `num_vsources` voltage sources.
    pub fn new(num_nodes: usize, num_vsources: usize) -> Self {
        let size = num_nodes + num_vsources;
        Self {
            matrix: DMatrix::zeros(size, size),
            rhs: DVector::zeros(size),
            num_nodes,
            num_vsources,
        }
    }

    /// Total size of the system (node unknowns + branch currents).
    pub fn size(&self) -> usize {
        self.num_nodes + self.num_vsources
    }

    /// Reset the matrix and RHS to zeros.
    pub fn clear(&mut self) {
        self.matrix.fill(0.0);
        self.rhs.fill(0.0);
    }

    /// Add `value` at `(row, col)`.
    pub fn add_element(&mut self, row: usize, col: usize, value: f64) {
        self.matrix[(row, col)] += value;
    }

    /// Add `value` to the RHS at `row`.
    pub fn add_rhs(&mut self, row: usize, value: f64) {
        self.rhs[row] += value;
    }

    /// Stamp a conductance `g` between two nodes.
    ///
    /// The classic two-terminal stamp: `+g` on both diagonals, `-g` on the
    /// off-diagonals. A ground-connected terminal contributes only the other
    /// terminal's diagonal entry.
    pub fn stamp_conductance(&mut self, node_i: Option<usize>, node_j: Option<usize>, g: f64) {
        if let Some(i) = node_i {
            self.matrix[(i, i)] += g;
        }
        if let Some(j) = node_j {
            self.matrix[(j, j)] += g;
        }
        if let (Some(i), Some(j)) = (node_i, node_j) {
            self.matrix[(i, j)] -= g;
            self.matrix[(j, i)] -= g;
        }
    }

    /// Stamp an independent current source driving `current` amperes from
    /// `node_i` to `node_j` (out of `i`, into `j`).
    pub fn stamp_current_source(
        &mut self,
        node_i: Option<usize>,
        node_j: Option<usize>,
        current: f64,
    ) {
        if let Some(i) = node_i {
            self.rhs[i] -= current;
        }
        if let Some(j) = node_j {
            self.rhs[j] += current;
        }
    }

    /// Stamp an ideal voltage source of value `voltage` between `node_pos`
    /// and `node_neg`, using branch-current row `num_nodes + vsource_idx`.
    ///
    /// The solved branch current is positive when flowing from the positive
    /// terminal through the source to the negative terminal; a source
    /// delivering power into the circuit therefore reads negative.
    pub fn stamp_voltage_source(
        &mut self,
        node_pos: Option<usize>,
        node_neg: Option<usize>,
        vsource_idx: usize,
        voltage: f64,
    ) {
        let row = self.num_nodes + vsource_idx;

        if let Some(i) = node_pos {
            self.matrix[(i, row)] += 1.0;
            self.matrix[(row, i)] += 1.0;
        }
        if let Some(j) = node_neg {
            self.matrix[(j, row)] -= 1.0;
            self.matrix[(row, j)] -= 1.0;
        }

        self.rhs[row] = voltage;
    }

    /// The coefficient matrix.
    pub fn matrix(&self) -> &DMatrix<f64> {
        &self.matrix
    }

    /// The right-hand-side vector.
    pub fn rhs(&self) -> &DVector<f64> {
        &self.rhs
    }

    /// Mutable access to the RHS (used to patch swept source values).
    pub fn rhs_mut(&mut self) -> &mut DVector<f64> {
        &mut self.rhs
    }
}
