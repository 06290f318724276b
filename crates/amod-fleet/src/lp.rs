//! Dense two-phase simplex for the rebalancing program.
//!
//! Solves
//!
//! ```text
//! minimise    c·x
//! subject to  a_i·x  (<= | >= | =)  b_i     for every row i
//!             x >= 0
//! ```
//!
//! Phase 1 minimises the sum of artificial variables to find a feasible
//! basis; phase 2 minimises the real objective from there.  Pivots follow
//! Bland's rule (lowest-index entering column, lowest-index leaving basic
//! variable on ratio ties), so the method terminates on degenerate programs.
//!
//! The whole tableau is kept in memory.  Rebalancing programs have
//! `n * (n - 1)` columns and `3n` rows for `n` stations, which is small for
//! any realistic station count.

use thiserror::Error;

/// Entries with magnitude below this are treated as zero when pivoting.
const PIVOT_EPS: f64 = 1e-9;

/// Relative tolerance for reduced costs and phase-1 feasibility.
const OPT_EPS: f64 = 1e-9;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Relation {
    Le,
    Ge,
    Eq,
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LpError {
    #[error("linear program is infeasible")]
    Infeasible,

    #[error("linear program is unbounded")]
    Unbounded,

    #[error("variable {var} out of range for a program with {num_vars} variables")]
    VariableOutOfRange { var: usize, num_vars: usize },

    #[error("simplex did not converge within {0} pivots")]
    IterationLimit(usize),
}

pub type LpResult<T> = Result<T, LpError>;

// ── LinearProgram ─────────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
struct Row {
    coeffs:   Vec<(usize, f64)>,
    relation: Relation,
    rhs:      f64,
}

/// A minimisation problem over non-negative variables.
#[derive(Clone, Debug, Default)]
pub struct LinearProgram {
    cost: Vec<f64>,
    rows: Vec<Row>,
}

/// Optimal point and objective value.
#[derive(Clone, Debug, PartialEq)]
pub struct Solution {
    pub values:    Vec<f64>,
    pub objective: f64,
}

impl LinearProgram {
    /// A program over `num_vars` variables with zero cost and no rows.
    pub fn new(num_vars: usize) -> Self {
        Self { cost: vec![0.0; num_vars], rows: Vec::new() }
    }

    pub fn num_vars(&self) -> usize {
        self.cost.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.rows.len()
    }

    pub fn set_cost(&mut self, var: usize, cost: f64) -> LpResult<()> {
        self.check_var(var)?;
        self.cost[var] = cost;
        Ok(())
    }

    /// Add `Σ coeff * x[var]  relation  rhs`.  Repeated variables add up.
    pub fn add_constraint(
        &mut self,
        coeffs:   Vec<(usize, f64)>,
        relation: Relation,
        rhs:      f64,
    ) -> LpResult<()> {
        for &(var, _) in &coeffs {
            self.check_var(var)?;
        }
        self.rows.push(Row { coeffs, relation, rhs });
        Ok(())
    }

    fn check_var(&self, var: usize) -> LpResult<()> {
        if var >= self.cost.len() {
            return Err(LpError::VariableOutOfRange { var, num_vars: self.cost.len() });
        }
        Ok(())
    }

    /// Solve to optimality.
    ///
    /// # Errors
    ///
    /// [`LpError::Infeasible`] or [`LpError::Unbounded`] for programs without
    /// an optimum.
    pub fn solve(&self) -> LpResult<Solution> {
        let n = self.cost.len();
        let mut tableau = Tableau::build(n, &self.rows);
        let first_artificial = tableau.first_artificial;

        // ── Phase 1 ───────────────────────────────────────────────────────
        if first_artificial < tableau.width {
            let mut phase1 = vec![0.0; tableau.width];
            for c in &mut phase1[first_artificial..] {
                *c = 1.0;
            }
            tableau.optimise(&phase1, tableau.width)?;

            let scale = 1.0 + tableau.rhs.iter().fold(0.0_f64, |m, b| m.max(b.abs()));
            if tableau.objective(&phase1) > OPT_EPS * scale * 1e2 {
                return Err(LpError::Infeasible);
            }
            tableau.evict_artificials();
        }

        // ── Phase 2 ───────────────────────────────────────────────────────
        let mut phase2 = vec![0.0; tableau.width];
        phase2[..n].copy_from_slice(&self.cost);
        tableau.optimise(&phase2, first_artificial)?;

        let mut values = vec![0.0; n];
        for (r, &var) in tableau.basis.iter().enumerate() {
            if var < n {
                values[var] = tableau.rhs[r].max(0.0);
            }
        }
        let objective = values.iter().zip(&self.cost).map(|(x, c)| x * c).sum();
        Ok(Solution { values, objective })
    }
}

// ── Tableau ───────────────────────────────────────────────────────────────────

/// Column layout: structural variables, then one slack or surplus per
/// inequality row, then one artificial per `>=`/`=` row.
struct Tableau {
    a:                Vec<Vec<f64>>,
    rhs:              Vec<f64>,
    basis:            Vec<usize>,
    width:            usize,
    first_artificial: usize,
}

impl Tableau {
    fn build(n: usize, rows: &[Row]) -> Tableau {
        // Flip rows so every right-hand side is non-negative.
        let normalised: Vec<(Vec<f64>, Relation, f64)> = rows
            .iter()
            .map(|row| {
                let mut dense = vec![0.0; n];
                for &(var, c) in &row.coeffs {
                    dense[var] += c;
                }
                if row.rhs < 0.0 {
                    dense.iter_mut().for_each(|v| *v = -*v);
                    let flipped = match row.relation {
                        Relation::Le => Relation::Ge,
                        Relation::Ge => Relation::Le,
                        Relation::Eq => Relation::Eq,
                    };
                    (dense, flipped, -row.rhs)
                } else {
                    (dense, row.relation, row.rhs)
                }
            })
            .collect();

        let num_slack = normalised.iter().filter(|r| r.1 != Relation::Eq).count();
        let num_artificial = normalised.iter().filter(|r| r.1 != Relation::Le).count();
        let first_artificial = n + num_slack;
        let width = first_artificial + num_artificial;

        let m = normalised.len();
        let mut a = vec![vec![0.0; width]; m];
        let mut rhs = vec![0.0; m];
        let mut basis = vec![0; m];
        let mut slack = n;
        let mut artificial = first_artificial;
        for (r, (dense, relation, b)) in normalised.into_iter().enumerate() {
            a[r][..n].copy_from_slice(&dense);
            rhs[r] = b;
            match relation {
                Relation::Le => {
                    a[r][slack] = 1.0;
                    basis[r] = slack;
                    slack += 1;
                }
                Relation::Ge => {
                    a[r][slack] = -1.0;
                    slack += 1;
                    a[r][artificial] = 1.0;
                    basis[r] = artificial;
                    artificial += 1;
                }
                Relation::Eq => {
                    a[r][artificial] = 1.0;
                    basis[r] = artificial;
                    artificial += 1;
                }
            }
        }
        Tableau { a, rhs, basis, width, first_artificial }
    }

    fn objective(&self, cost: &[f64]) -> f64 {
        self.basis.iter().zip(&self.rhs).map(|(&v, b)| cost[v] * b).sum()
    }

    /// Pivot until no column below `allowed` has a negative reduced cost.
    fn optimise(&mut self, cost: &[f64], allowed: usize) -> LpResult<()> {
        let m = self.a.len();
        let limit = 50 * (m + self.width) + 1_000;
        for _ in 0..limit {
            let mut is_basic = vec![false; self.width];
            for &v in &self.basis {
                is_basic[v] = true;
            }
            let scale = 1.0 + self.basis.iter().fold(0.0_f64, |acc, &v| acc.max(cost[v].abs()));
            let tol = OPT_EPS * scale;

            let entering = (0..allowed).find(|&j| {
                if is_basic[j] {
                    return false;
                }
                let z: f64 = (0..m).map(|i| cost[self.basis[i]] * self.a[i][j]).sum();
                cost[j] - z < -tol
            });
            let Some(col) = entering else { return Ok(()) };

            let mut leaving: Option<(usize, f64)> = None;
            for i in 0..m {
                let coeff = self.a[i][col];
                if coeff <= PIVOT_EPS {
                    continue;
                }
                let ratio = self.rhs[i] / coeff;
                leaving = match leaving {
                    None => Some((i, ratio)),
                    Some((k, best)) => {
                        let tie = (ratio - best).abs() <= PIVOT_EPS * (1.0 + best.abs());
                        if (!tie && ratio < best) || (tie && self.basis[i] < self.basis[k]) {
                            Some((i, ratio))
                        } else {
                            Some((k, best))
                        }
                    }
                };
            }
            let Some((row, _)) = leaving else { return Err(LpError::Unbounded) };
            self.pivot(row, col);
        }
        Err(LpError::IterationLimit(limit))
    }

    fn pivot(&mut self, row: usize, col: usize) {
        let p = self.a[row][col];
        self.a[row].iter_mut().for_each(|v| *v /= p);
        self.rhs[row] /= p;

        let pivot_row = self.a[row].clone();
        let pivot_rhs = self.rhs[row];
        for i in 0..self.a.len() {
            if i == row {
                continue;
            }
            let f = self.a[i][col];
            if f == 0.0 {
                continue;
            }
            for (v, pv) in self.a[i].iter_mut().zip(&pivot_row) {
                *v -= f * pv;
            }
            self.rhs[i] -= f * pivot_rhs;
            if self.rhs[i] < 0.0 && self.rhs[i] > -PIVOT_EPS {
                self.rhs[i] = 0.0;
            }
        }
        self.basis[row] = col;
    }

    /// Swap zero-valued artificials out of the basis after phase 1.
    ///
    /// A row whose artificial cannot be replaced is redundant: every real
    /// column is zero in it, so later pivots never touch it.
    fn evict_artificials(&mut self) {
        for r in 0..self.a.len() {
            if self.basis[r] < self.first_artificial {
                continue;
            }
            if let Some(col) = (0..self.first_artificial).find(|&j| self.a[r][j].abs() > PIVOT_EPS) {
                self.pivot(r, col);
            }
        }
    }
}
