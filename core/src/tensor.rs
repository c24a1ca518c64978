use serde::{Deserialize, Serialize};

/// Dense rank-2 array in row-major layout. Used for boolean pixel masks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tensor2<T> {
    dims: (usize, usize),
    data: Vec<T>,
}

impl<T: Clone + Copy + Default> Tensor2<T> {
    pub fn zeros(d0: usize, d1: usize) -> Self {
        Self {
            dims: (d0, d1),
            data: vec![T::default(); d0 * d1],
        }
    }
}

impl<T: Clone + Copy> Tensor2<T> {
    pub fn from_vec(data: Vec<T>, d0: usize, d1: usize) -> crate::Result<Self> {
        if data.len() != d0 * d1 {
            return Err(crate::Error::DimensionMismatch(format!(
                "Data size mismatch: got {}, expected {}",
                data.len(),
                d0 * d1
            )));
        }
        Ok(Self {
            dims: (d0, d1),
            data,
        })
    }

    pub fn dims(&self) -> (usize, usize) {
        self.dims
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn at(&self, i: usize, j: usize) -> T {
        debug_assert!(i < self.dims.0 && j < self.dims.1);
        self.data[i * self.dims.1 + j]
    }

    #[inline]
    pub fn at_mut(&mut self, i: usize, j: usize) -> &mut T {
        debug_assert!(i < self.dims.0 && j < self.dims.1);
        &mut self.data[i * self.dims.1 + j]
    }

    pub fn get(&self, i: usize, j: usize) -> Option<T> {
        (i < self.dims.0 && j < self.dims.1).then(|| self.at(i, j))
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }
}

/// Dense rank-3 array in row-major layout.
///
/// **Layout convention:** `hog-rs` stores rank-3 data as
/// (rows, cols, channels) with the last dimension varying fastest, so the
/// channels of one pixel are contiguous. Images, gradient fields, and the
/// integral histogram (rows+1, cols+1, bins) all share this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tensor3<T> {
    dims: (usize, usize, usize),
    data: Vec<T>,
}

impl<T: Clone + Copy + Default> Tensor3<T> {
    pub fn zeros(d0: usize, d1: usize, d2: usize) -> Self {
        Self {
            dims: (d0, d1, d2),
            data: vec![T::default(); d0 * d1 * d2],
        }
    }

    /// A zero-sized tensor; the canonical "no data" value.
    pub fn empty() -> Self {
        Self::zeros(0, 0, 0)
    }

    /// Drops existing contents and reallocates to a zeroed (d0, d1, d2).
    pub fn resize(&mut self, d0: usize, d1: usize, d2: usize) {
        self.dims = (d0, d1, d2);
        self.data.clear();
        self.data.resize(d0 * d1 * d2, T::default());
    }

    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }
}

impl<T: Clone + Copy> Tensor3<T> {
    pub fn from_vec(data: Vec<T>, d0: usize, d1: usize, d2: usize) -> crate::Result<Self> {
        if data.len() != d0 * d1 * d2 {
            return Err(crate::Error::DimensionMismatch(format!(
                "Data size mismatch: got {}, expected {}",
                data.len(),
                d0 * d1 * d2
            )));
        }
        Ok(Self {
            dims: (d0, d1, d2),
            data,
        })
    }

    pub fn dims(&self) -> (usize, usize, usize) {
        self.dims
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn index_of(&self, i: usize, j: usize, k: usize) -> usize {
        (i * self.dims.1 + j) * self.dims.2 + k
    }

    #[inline]
    pub fn at(&self, i: usize, j: usize, k: usize) -> T {
        debug_assert!(i < self.dims.0 && j < self.dims.1 && k < self.dims.2);
        self.data[self.index_of(i, j, k)]
    }

    #[inline]
    pub fn at_mut(&mut self, i: usize, j: usize, k: usize) -> &mut T {
        debug_assert!(i < self.dims.0 && j < self.dims.1 && k < self.dims.2);
        let idx = self.index_of(i, j, k);
        &mut self.data[idx]
    }

    pub fn get(&self, i: usize, j: usize, k: usize) -> Option<T> {
        (i < self.dims.0 && j < self.dims.1 && k < self.dims.2).then(|| self.at(i, j, k))
    }

    /// The contiguous innermost slice at (i, j), e.g. one pixel's channels
    /// or one histogram cell's bins.
    #[inline]
    pub fn inner(&self, i: usize, j: usize) -> &[T] {
        let start = self.index_of(i, j, 0);
        &self.data[start..start + self.dims.2]
    }

    #[inline]
    pub fn inner_mut(&mut self, i: usize, j: usize) -> &mut [T] {
        let start = self.index_of(i, j, 0);
        let bins = self.dims.2;
        &mut self.data[start..start + bins]
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }
}

/// Dense rank-5 array in row-major layout: the per-region HOG feature tensor
/// (block_row, block_col, cell_row, cell_col, bin). One block is a contiguous
/// run of cell_row * cell_col * bins elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tensor5<T> {
    dims: (usize, usize, usize, usize, usize),
    data: Vec<T>,
}

impl<T: Clone + Copy + Default> Tensor5<T> {
    pub fn zeros(d0: usize, d1: usize, d2: usize, d3: usize, d4: usize) -> Self {
        Self {
            dims: (d0, d1, d2, d3, d4),
            data: vec![T::default(); d0 * d1 * d2 * d3 * d4],
        }
    }

    pub fn empty() -> Self {
        Self::zeros(0, 0, 0, 0, 0)
    }
}

impl<T: Clone + Copy> Tensor5<T> {
    pub fn dims(&self) -> (usize, usize, usize, usize, usize) {
        self.dims
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn at(&self, b0: usize, b1: usize, c0: usize, c1: usize, k: usize) -> T {
        let (_, d1, d2, d3, d4) = self.dims;
        self.data[(((b0 * d1 + b1) * d2 + c0) * d3 + c1) * d4 + k]
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }
}

/// Dense rank-6 array: a stack of per-region feature tensors, one contiguous
/// rank-5 run per region index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tensor6<T> {
    dims: (usize, usize, usize, usize, usize, usize),
    data: Vec<T>,
}

impl<T: Clone + Copy + Default> Tensor6<T> {
    pub fn zeros(
        d0: usize,
        d1: usize,
        d2: usize,
        d3: usize,
        d4: usize,
        d5: usize,
    ) -> Self {
        Self {
            dims: (d0, d1, d2, d3, d4, d5),
            data: vec![T::default(); d0 * d1 * d2 * d3 * d4 * d5],
        }
    }
}

impl<T: Clone + Copy> Tensor6<T> {
    pub fn dims(&self) -> (usize, usize, usize, usize, usize, usize) {
        self.dims
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Length of one region's rank-5 slice.
    pub fn region_len(&self) -> usize {
        let (_, d1, d2, d3, d4, d5) = self.dims;
        d1 * d2 * d3 * d4 * d5
    }

    /// The contiguous rank-5 slice belonging to one region.
    pub fn region(&self, r: usize) -> &[T] {
        let len = self.region_len();
        &self.data[r * len..(r + 1) * len]
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }
}
