/*!
 * Distributed Algebra
 * Partitioned matrix operations with barrier-ordered results
 */

use super::matrix::Matrix;
use super::types::OpsError;
use super::vector::Vector;
use crate::partition::RankAssignment;

// Every operation follows the same shape: validate before any collective
// step (so all ranks fail symmetrically with no barrier entered), allocate
// the result collectively, write only this rank's partition range, then
// barrier so nobody reads a partially written result.
impl<'ctx> Matrix<'ctx> {
    /// Elementwise sum into a fresh shared matrix.
    pub fn add(&self, other: &Self) -> Result<Matrix<'ctx>, OpsError> {
        self.elementwise(other, "add", |a, b| a + b)
    }

    /// Elementwise difference into a fresh shared matrix.
    pub fn sub(&self, other: &Self) -> Result<Matrix<'ctx>, OpsError> {
        self.elementwise(other, "sub", |a, b| a - b)
    }

    fn elementwise(
        &self,
        other: &Self,
        op: &str,
        f: impl Fn(f64, f64) -> f64,
    ) -> Result<Matrix<'ctx>, OpsError> {
        self.check_same_shape(other, op)?;

        let result = Matrix::new(self.ctx, self.rows, self.cols)?;
        let assignment = self.row_assignment();
        for row in assignment.indices() {
            for col in 0..self.cols {
                let idx = self.index(row, col);
                result.data.set(idx, f(self.data.get(idx), other.data.get(idx)));
            }
        }
        self.ctx.synch();
        Ok(result)
    }

    /// Matrix product `self * other`, partitioned over rows of `self`.
    pub fn mul(&self, other: &Self) -> Result<Matrix<'ctx>, OpsError> {
        if self.cols != other.rows {
            return Err(OpsError::DimensionMismatch {
                op: "mul".to_string(),
                left_rows: self.rows,
                left_cols: self.cols,
                right_rows: other.rows,
                right_cols: other.cols,
            });
        }

        let result = Matrix::new(self.ctx, self.rows, other.cols)?;
        let assignment = self.row_assignment();
        for row in assignment.indices() {
            for col in 0..other.cols {
                let mut sum = 0.0;
                for k in 0..self.cols {
                    sum += self.get(row, k) * other.get(k, col);
                }
                result.set(row, col, sum);
            }
        }
        self.ctx.synch();
        Ok(result)
    }

    /// Multiply every element by `scalar`, partitioned by row.
    pub fn scalar_mul(&self, scalar: f64) -> Result<Matrix<'ctx>, OpsError> {
        let result = Matrix::new(self.ctx, self.rows, self.cols)?;
        let assignment = self.row_assignment();
        for row in assignment.indices() {
            for col in 0..self.cols {
                let idx = self.index(row, col);
                result.data.set(idx, self.data.get(idx) * scalar);
            }
        }
        self.ctx.synch();
        Ok(result)
    }

    /// Transpose into a fresh `cols` x `rows` shared matrix.
    ///
    /// Partitioned over source rows; each source row lands in one result
    /// column, so writes are disjoint and only the final barrier is needed.
    pub fn transpose(&self) -> Result<Matrix<'ctx>, OpsError> {
        let result = Matrix::new(self.ctx, self.cols, self.rows)?;
        let assignment = self.row_assignment();
        for row in assignment.indices() {
            for col in 0..self.cols {
                result.set(col, row, self.get(row, col));
            }
        }
        self.ctx.synch();
        Ok(result)
    }

    /// Group-reduced equality: true on every rank iff the matrices are
    /// elementwise identical.
    ///
    /// Each rank compares its row range, publishes its verdict into a shared
    /// per-rank scratch slot, barriers, and combines all verdicts. Every rank
    /// returns the same answer.
    pub fn eq_all(&self, other: &Self) -> Result<bool, OpsError> {
        self.check_same_shape(other, "eq")?;

        let participants = self.ctx.participant_count();
        let verdicts = Vector::new(self.ctx, participants as usize)?;

        let assignment = self.row_assignment();
        let mut local = true;
        'rows: for row in assignment.indices() {
            for col in 0..self.cols {
                let idx = self.index(row, col);
                if self.data.get(idx) != other.data.get(idx) {
                    local = false;
                    break 'rows;
                }
            }
        }

        verdicts.set(self.ctx.rank() as usize, if local { 1.0 } else { 0.0 });
        self.ctx.synch();

        let all = (0..participants).all(|r| verdicts.get(r as usize) != 0.0);
        Ok(all)
    }

    fn row_assignment(&self) -> RankAssignment {
        RankAssignment::compute(self.rows, self.ctx.participant_count(), self.ctx.rank())
    }
}
