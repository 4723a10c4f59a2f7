/*!
 * Inverse Pipeline
 * Redundant determinant, column-partitioned adjoint, shared inverse
 */

use super::dense;
use super::matrix::Matrix;
use super::types::OpsError;
use crate::partition::RankAssignment;
use log::debug;

impl<'ctx> Matrix<'ctx> {
    /// Determinant by cofactor expansion, computed locally on this rank.
    ///
    /// Not partitioned: every rank that calls this does the full O(n!)
    /// recursion over its own copy of the matrix. Acceptable only for the
    /// small orders this pipeline targets.
    pub fn determinant(&self) -> Result<f64, OpsError> {
        self.check_square("determinant")?;
        let local = self.to_local_vec();
        Ok(dense::determinant(&local, self.rows))
    }

    /// Inverse via `adj(A) / det(A)` into a fresh shared matrix.
    ///
    /// Every rank computes the determinant redundantly and fails with
    /// `SingularMatrix` symmetrically when it is zero. The adjoint is
    /// partitioned by column between two barriers; afterwards every rank
    /// redundantly divides the whole adjoint by the determinant into its own
    /// view of the shared result (all ranks write identical values), and a
    /// final barrier orders those writes before use.
    pub fn inverse(&self) -> Result<Matrix<'ctx>, OpsError> {
        self.check_square("inverse")?;
        let order = self.rows;

        let result = Matrix::new(self.ctx, order, order)?;
        let adjoint = Matrix::new(self.ctx, order, order)?;

        // Same bytes, same arithmetic, same verdict on every rank.
        let local = self.to_local_vec();
        let det = dense::determinant(&local, order);
        if det == 0.0 {
            return Err(OpsError::SingularMatrix);
        }
        debug!(
            "Rank {} inverting {}x{} matrix, determinant {}",
            self.ctx.rank(),
            order,
            order,
            det
        );

        self.ctx.synch();

        // adj(j, i) = cofactor(i, j); partitioning by source column j keeps
        // each rank's writes on disjoint adjoint rows.
        let columns =
            RankAssignment::compute(order, self.ctx.participant_count(), self.ctx.rank());
        for j in columns.indices() {
            for i in 0..order {
                adjoint.set(j, i, dense::cofactor(&local, order, i, j));
            }
        }

        self.ctx.synch();

        for idx in 0..order * order {
            result.data.set(idx, adjoint.data.get(idx) / det);
        }

        self.ctx.synch();
        Ok(result)
    }
}
