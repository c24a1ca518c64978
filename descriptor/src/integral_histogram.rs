use hog_core::{Real, Tensor3};
use serde::{Deserialize, Serialize};

/// Summed-area table over per-pixel histograms.
///
/// For an image of (rows, cols) with `bins` orientation bins, the table has
/// shape (rows + 1, cols + 1, bins) with a zero border along the top row and
/// left column. Entry (i, j, :) holds the bin-wise sum over all pixels above
/// and left of (i, j), so the sum over any axis-aligned rectangle falls out
/// of four lookups via inclusion-exclusion. The two-dimensional case of the
/// general 2^N corner expansion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntegralHistogram<T> {
    histogram: Tensor3<T>,
}

impl<T: Real> Default for IntegralHistogram<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Real> IntegralHistogram<T> {
    pub fn new() -> Self {
        Self {
            histogram: Tensor3::empty(),
        }
    }

    /// Reallocates the table for an image of (rows, cols), zeroed.
    pub fn resize(&mut self, rows: usize, cols: usize, bins: usize) {
        self.histogram.resize(rows + 1, cols + 1, bins);
    }

    pub fn clear(&mut self) {
        self.histogram.resize(0, 0, 0);
    }

    pub fn is_empty(&self) -> bool {
        self.histogram.is_empty()
    }

    /// Orientation bin count.
    pub fn bins(&self) -> usize {
        self.histogram.dims().2
    }

    pub fn histogram(&self) -> &Tensor3<T> {
        &self.histogram
    }

    pub fn into_histogram(self) -> Tensor3<T> {
        self.histogram
    }

    /// Adopts a previously computed table without revalidating its contents.
    pub fn set_histogram(&mut self, histogram: Tensor3<T>) {
        self.histogram = histogram;
    }

    /// Runs the wavefront accumulation over the interior of the table.
    ///
    /// For each pixel (i, j) in row-major order the cell at (i + 1, j + 1)
    /// is first seeded with the prefix recurrence
    ///
    /// ```text
    /// H[i+1][j+1] = H[i][j+1] + H[i+1][j] - H[i][j]
    /// ```
    ///
    /// and `vote` is then handed the cell's bin slice to add the pixel's own
    /// contribution. The zero border makes the recurrence uniform; no edge
    /// cases inside the loop.
    pub fn scan<F>(&mut self, mut vote: F)
    where
        F: FnMut(&mut [T], usize, usize),
    {
        let (d0, d1, bins) = self.histogram.dims();
        if bins == 0 {
            return;
        }
        let data = self.histogram.as_mut_slice();
        let row_stride = d1 * bins;

        for i in 1..d0 {
            for j in 1..d1 {
                let cell = i * row_stride + j * bins;
                let up = cell - row_stride;
                let left = cell - bins;
                let diag = up - bins;

                for k in 0..bins {
                    data[cell + k] = data[up + k] + data[left + k] - data[diag + k];
                }

                vote(&mut data[cell..cell + bins], i - 1, j - 1);
            }
        }
    }

    /// Bin-wise sum over the half-open pixel rectangle
    /// rows [a0, b0) x cols [a1, b1), written into `out`.
    ///
    /// Callers guarantee a0 <= b0 <= rows and a1 <= b1 <= cols.
    pub fn intersect_into(&self, a0: usize, a1: usize, b0: usize, b1: usize, out: &mut [T]) {
        let h = &self.histogram;
        debug_assert_eq!(out.len(), h.dims().2);

        let bb = h.inner(b0, b1);
        let ab = h.inner(a0, b1);
        let ba = h.inner(b0, a1);
        let aa = h.inner(a0, a1);

        for (k, slot) in out.iter_mut().enumerate() {
            *slot = bb[k] - ab[k] - ba[k] + aa[k];
        }
    }

    /// Allocating variant of [`intersect_into`](Self::intersect_into).
    pub fn intersect(&self, a0: usize, a1: usize, b0: usize, b1: usize) -> Vec<T> {
        let mut out = vec![T::zero(); self.bins()];
        self.intersect_into(a0, a1, b0, b1, &mut out);
        out
    }
}
