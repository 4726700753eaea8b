use agg_core::{Error, Loss, Probability, Result};

use crate::ep_curve::{EpCurve, EpType};

impl EpCurve {
    /// Tail conditional expectation curve of an OEP curve.
    ///
    /// For each stored probability `p` the result holds the expected loss
    /// given that the loss at `p` is exceeded.  The area under the curve is
    /// accumulated with the trapezoidal rule from the tail inward:
    ///
    /// ```text
    /// A_k   = A_{k-1} + ½ (L_{k-1} − L_k)(p_{k-1} + p_k)
    /// TCE_k = L_k + A_k / p_k
    /// ```
    ///
    /// # Errors
    /// Returns [`Error::InvalidArgument`] unless the curve is an OEP curve.
    pub fn tce(&self) -> Result<EpCurve> {
        if self.ep_type() != EpType::Oep {
            return Err(Error::InvalidArgument(format!(
                "tce requires an OEP curve, got {:?}",
                self.ep_type()
            )));
        }

        let mut points: Vec<(Probability, Loss)> = Vec::with_capacity(self.len());
        let mut area = 0.0;
        let mut previous: Option<(Probability, Loss)> = None;
        for (p, loss) in self.points() {
            if let Some((p0, l0)) = previous {
                area += 0.5 * (l0 - loss) * (p0 + p);
            }
            points.push((p, loss + area / p));
            previous = Some((p, loss));
        }
        EpCurve::new(points, EpType::TceOep)
    }
}
