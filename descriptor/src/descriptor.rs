use hog_core::{Bounds, Error, Real, Result, Size2, Tensor2, Tensor3, Tensor5, Tensor6};
use hog_imgproc::{Binning, Gradient, Magnitude, Stencil};
use num_traits::{AsPrimitive, ToPrimitive};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::integral_histogram::IntegralHistogram;
use crate::normalize::{BlockNormKind, BlockNormalizer};

/// Full parameter set of a descriptor.
///
/// All sizes are in pixels; `block_size` must be a whole multiple of
/// `cell_size` in both dimensions. `clip_norm` and `epsilon` override the
/// normalizer defaults (0.2 and machine epsilon) when set.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HogConfig {
    pub cell_size: Size2,
    pub block_size: Size2,
    pub block_stride: Size2,
    pub num_bins: usize,
    pub stencil: Stencil,
    pub binning: Binning,
    pub magnitude: Magnitude,
    pub block_norm: BlockNormKind,
    pub clip_norm: Option<f64>,
    pub epsilon: Option<f64>,
}

impl Default for HogConfig {
    fn default() -> Self {
        Self {
            cell_size: Size2::new(8, 8),
            block_size: Size2::new(16, 16),
            block_stride: Size2::new(8, 8),
            num_bins: 9,
            stencil: Stencil::default(),
            binning: Binning::default(),
            magnitude: Magnitude::default(),
            block_norm: BlockNormKind::default(),
            clip_norm: None,
            epsilon: None,
        }
    }
}

impl HogConfig {
    pub fn validate(&self) -> Result<()> {
        for (name, size) in [
            ("cell size", self.cell_size),
            ("block size", self.block_size),
            ("block stride", self.block_stride),
        ] {
            if size.width == 0 || size.height == 0 {
                return Err(Error::InvalidParameter(format!(
                    "{name} must be positive in both dimensions, got {}x{}",
                    size.width, size.height
                )));
            }
        }
        if self.num_bins == 0 {
            return Err(Error::InvalidParameter(
                "number of orientation bins must be positive".into(),
            ));
        }
        if self.block_size.width % self.cell_size.width != 0
            || self.block_size.height % self.cell_size.height != 0
        {
            return Err(Error::InvalidParameter(format!(
                "block size {}x{} is not a multiple of cell size {}x{}",
                self.block_size.width,
                self.block_size.height,
                self.cell_size.width,
                self.cell_size.height
            )));
        }
        if let Some(clip) = self.clip_norm {
            // Rejects NaN as well.
            if !(clip > 0.0) {
                return Err(Error::InvalidParameter(format!(
                    "clip threshold must be positive, got {clip}"
                )));
            }
        }
        if let Some(epsilon) = self.epsilon {
            if !(epsilon >= 0.0) {
                return Err(Error::InvalidParameter(format!(
                    "epsilon must be non-negative, got {epsilon}"
                )));
            }
        }
        Ok(())
    }
}

/// Selects pixels to exclude from vote accumulation. A `true` entry (or
/// predicate result) removes the pixel.
pub enum Mask<'a> {
    Array(&'a Tensor2<bool>),
    Predicate(&'a (dyn Fn(usize, usize) -> bool + Sync)),
}

impl Mask<'_> {
    #[inline]
    fn excludes(&self, row: usize, col: usize) -> bool {
        match self {
            Mask::Array(mask) => mask.at(row, col),
            Mask::Predicate(pred) => pred(row, col),
        }
    }
}

/// Serializable snapshot of a computed descriptor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DescriptorState<T> {
    pub config: HogConfig,
    pub histogram: Tensor3<T>,
}

/// Block layout induced by a configuration over a region extent.
#[derive(Debug, Clone, Copy)]
struct BlockGrid {
    block_rows: usize,
    block_cols: usize,
    cell_rows: usize,
    cell_cols: usize,
}

/// HOG descriptor extractor over an integral orientation histogram.
///
/// [`compute`](Self::compute) accumulates the per-pixel votes once;
/// [`features_region`](Self::features_region) then evaluates any
/// axis-aligned sub-window in time independent of its area.
#[derive(Debug, Clone)]
pub struct IntegralHogDescriptor<T> {
    config: HogConfig,
    histogram: IntegralHistogram<T>,
}

impl<T: Real> IntegralHogDescriptor<T> {
    pub fn new(config: HogConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            histogram: IntegralHistogram::new(),
        })
    }

    pub fn config(&self) -> &HogConfig {
        &self.config
    }

    pub fn set_cell_size(&mut self, size: Size2) -> Result<()> {
        self.update(|c| c.cell_size = size, false)
    }

    pub fn set_block_size(&mut self, size: Size2) -> Result<()> {
        self.update(|c| c.block_size = size, false)
    }

    pub fn set_block_stride(&mut self, size: Size2) -> Result<()> {
        self.update(|c| c.block_stride = size, false)
    }

    /// Changing the bin count discards any previously computed histogram.
    pub fn set_num_bins(&mut self, bins: usize) -> Result<()> {
        self.update(|c| c.num_bins = bins, true)
    }

    /// Changing the stencil discards any previously computed histogram.
    pub fn set_stencil(&mut self, stencil: Stencil) -> Result<()> {
        self.update(|c| c.stencil = stencil, true)
    }

    /// Changing the binning mode discards any previously computed histogram.
    pub fn set_binning(&mut self, binning: Binning) -> Result<()> {
        self.update(|c| c.binning = binning, true)
    }

    /// Changing the vote profile discards any previously computed histogram.
    pub fn set_magnitude(&mut self, magnitude: Magnitude) -> Result<()> {
        self.update(|c| c.magnitude = magnitude, true)
    }

    pub fn set_block_norm(&mut self, kind: BlockNormKind) -> Result<()> {
        self.update(|c| c.block_norm = kind, false)
    }

    pub fn set_clip_norm(&mut self, clip: Option<f64>) -> Result<()> {
        self.update(|c| c.clip_norm = clip, false)
    }

    pub fn set_epsilon(&mut self, epsilon: Option<f64>) -> Result<()> {
        self.update(|c| c.epsilon = epsilon, false)
    }

    fn update(&mut self, mutate: impl FnOnce(&mut HogConfig), invalidates: bool) -> Result<()> {
        let mut next = self.config;
        mutate(&mut next);
        next.validate()?;
        self.config = next;
        if invalidates {
            self.histogram.clear();
        }
        Ok(())
    }

    /// Accumulates the integral histogram over a (rows, cols, channels)
    /// image. A zero-sized image resets the descriptor to the empty state.
    pub fn compute<P>(&mut self, image: &Tensor3<P>, mask: Option<Mask<'_>>) -> Result<()>
    where
        P: Copy + AsPrimitive<T>,
    {
        let (rows, cols, channels) = image.dims();
        if rows == 0 || cols == 0 || channels == 0 {
            self.histogram.clear();
            return Ok(());
        }
        self.check_mask(&mask, rows, cols)?;

        let (dx, dy) = Gradient::new(self.config.stencil).apply(image);
        self.accumulate(&dx, &dy, mask);
        Ok(())
    }

    /// Same as [`compute`](Self::compute), but over caller-supplied gradient
    /// fields instead of an image.
    pub fn compute_gradients(
        &mut self,
        dx: &Tensor3<T>,
        dy: &Tensor3<T>,
        mask: Option<Mask<'_>>,
    ) -> Result<()> {
        if dx.dims() != dy.dims() {
            return Err(Error::DimensionMismatch(format!(
                "gradient fields disagree: dx is {:?}, dy is {:?}",
                dx.dims(),
                dy.dims()
            )));
        }
        let (rows, cols, channels) = dx.dims();
        if rows == 0 || cols == 0 || channels == 0 {
            self.histogram.clear();
            return Ok(());
        }
        self.check_mask(&mask, rows, cols)?;

        self.accumulate(dx, dy, mask);
        Ok(())
    }

    fn check_mask(&self, mask: &Option<Mask<'_>>, rows: usize, cols: usize) -> Result<()> {
        if let Some(Mask::Array(m)) = mask {
            if m.dims() != (rows, cols) {
                return Err(Error::DimensionMismatch(format!(
                    "mask is {:?}, image is ({rows}, {cols})",
                    m.dims()
                )));
            }
        }
        Ok(())
    }

    fn accumulate(&mut self, dx: &Tensor3<T>, dy: &Tensor3<T>, mask: Option<Mask<'_>>) {
        let (rows, cols, channels) = dx.dims();
        let bins = self.config.num_bins;
        let binning = self.config.binning;
        let magnitude = self.config.magnitude;
        let scale = T::from_usize(bins - 1).expect("bin count fits in the scalar type");

        self.histogram.resize(rows, cols, bins);
        self.histogram.scan(|cell, i, j| {
            if let Some(m) = &mask {
                if m.excludes(i, j) {
                    return;
                }
            }

            let dxs = dx.inner(i, j);
            let dys = dy.inner(i, j);

            // The channel with the strongest response carries the vote;
            // ties keep the first channel.
            let mut best = 0;
            let mut best_mag = magnitude.vote(dxs[0], dys[0]);
            for k in 1..channels {
                let mag = magnitude.vote(dxs[k], dys[k]);
                if mag > best_mag {
                    best = k;
                    best_mag = mag;
                }
            }
            if best_mag == T::zero() {
                return;
            }

            // Linear interpolation between the two nearest bin centers.
            let center = binning.weight(dxs[best], dys[best]) * scale;
            let floor = center.floor();
            let alpha = center - floor;
            let lower = floor.to_usize().unwrap_or(0).min(bins - 1);
            let upper = (lower + 1).min(bins - 1);

            cell[lower] += (-alpha).mul_add(best_mag, best_mag);
            cell[upper] += alpha * best_mag;
        });
    }

    pub fn is_empty(&self) -> bool {
        self.histogram.is_empty()
    }

    /// The raw integral histogram of shape (rows + 1, cols + 1, bins).
    pub fn histogram(&self) -> &Tensor3<T> {
        self.histogram.histogram()
    }

    /// Adopts a previously computed integral histogram, e.g. one restored
    /// from [`DescriptorState`].
    pub fn set_histogram(&mut self, histogram: Tensor3<T>) -> Result<()> {
        if !histogram.is_empty() && histogram.dims().2 != self.config.num_bins {
            return Err(Error::DimensionMismatch(format!(
                "histogram has {} bins, configuration expects {}",
                histogram.dims().2,
                self.config.num_bins
            )));
        }
        self.histogram.set_histogram(histogram);
        Ok(())
    }

    pub fn state(&self) -> DescriptorState<T> {
        DescriptorState {
            config: self.config,
            histogram: self.histogram.histogram().clone(),
        }
    }

    pub fn from_state(state: DescriptorState<T>) -> Result<Self> {
        let mut descriptor = Self::new(state.config)?;
        descriptor.set_histogram(state.histogram)?;
        Ok(descriptor)
    }

    /// Feature tensor over the whole computed domain; empty before any
    /// successful [`compute`](Self::compute).
    pub fn features(&self) -> Result<Tensor5<T>> {
        if self.is_empty() {
            return Ok(Tensor5::empty());
        }
        let (d0, d1, _) = self.histogram().dims();
        self.features_region(Bounds::new(0, 0, (d1 - 1) as isize, (d0 - 1) as isize))
    }

    /// Feature tensor (block_row, block_col, cell_row, cell_col, bin) over
    /// one rectangular sub-window of the computed domain.
    ///
    /// A zero-area region, or a region smaller than one block, yields an
    /// empty tensor. Regions reaching outside the domain are an error.
    pub fn features_region(&self, bounds: Bounds) -> Result<Tensor5<T>> {
        let (x, y, width, height) = self.resolve_bounds(&bounds)?;
        let grid = self.grid(width, height);
        let bins = self.config.num_bins;

        let mut out = Tensor5::zeros(
            grid.block_rows,
            grid.block_cols,
            grid.cell_rows,
            grid.cell_cols,
            bins,
        );
        if !out.is_empty() {
            self.fill_region(x, y, grid, &self.normalizer(), out.as_mut_slice());
        }
        Ok(out)
    }

    /// Batched [`features_region`](Self::features_region): one stacked
    /// tensor, regions evaluated in parallel. All regions must decompose
    /// into the same block grid; their pixel extents may differ.
    pub fn features_regions(&self, regions: &[Bounds]) -> Result<Tensor6<T>> {
        let mut resolved = Vec::with_capacity(regions.len());
        let mut first_grid: Option<BlockGrid> = None;
        for (index, bounds) in regions.iter().enumerate() {
            let (x, y, width, height) = self
                .resolve_bounds(bounds)
                .map_err(|err| Error::InvalidBounds(format!("region {index}: {err}")))?;
            let grid = self.grid(width, height);
            match first_grid {
                None => first_grid = Some(grid),
                Some(g0) if (grid.block_rows, grid.block_cols) != (g0.block_rows, g0.block_cols) => {
                    return Err(Error::DimensionMismatch(format!(
                        "region {index} decomposes into {}x{} blocks, region 0 into {}x{}",
                        grid.block_rows, grid.block_cols, g0.block_rows, g0.block_cols
                    )));
                }
                Some(_) => {}
            }
            resolved.push((x, y));
        }

        let Some(grid) = first_grid else {
            return Ok(Tensor6::zeros(0, 0, 0, 0, 0, 0));
        };
        let bins = self.config.num_bins;

        let mut out = Tensor6::zeros(
            regions.len(),
            grid.block_rows,
            grid.block_cols,
            grid.cell_rows,
            grid.cell_cols,
            bins,
        );
        let region_len = out.region_len();
        if region_len == 0 {
            return Ok(out);
        }

        let normalizer = self.normalizer();
        out.as_mut_slice()
            .par_chunks_mut(region_len)
            .zip(resolved.par_iter())
            .for_each(|(slice, &(x, y))| {
                self.fill_region(x, y, grid, &normalizer, slice);
            });
        Ok(out)
    }

    /// Checks a region against the computed domain and converts it to
    /// unsigned pixel coordinates.
    fn resolve_bounds(&self, bounds: &Bounds) -> Result<(usize, usize, usize, usize)> {
        if bounds.x < 0 || bounds.y < 0 || bounds.width < 0 || bounds.height < 0 {
            return Err(Error::InvalidBounds(format!(
                "region {bounds:?} has a negative offset or extent"
            )));
        }
        let (x, y) = (bounds.x as usize, bounds.y as usize);
        let (width, height) = (bounds.width as usize, bounds.height as usize);

        let (d0, d1, _) = self.histogram().dims();
        let domain_rows = d0.saturating_sub(1);
        let domain_cols = d1.saturating_sub(1);
        if x + width > domain_cols || y + height > domain_rows {
            return Err(Error::InvalidBounds(format!(
                "region {bounds:?} exceeds the computed domain of {domain_cols}x{domain_rows}"
            )));
        }
        Ok((x, y, width, height))
    }

    fn grid(&self, width: usize, height: usize) -> BlockGrid {
        let block = self.config.block_size;
        let stride = self.config.block_stride;
        let cell = self.config.cell_size;

        let fit = |extent: usize, block: usize, stride: usize| {
            if extent < block {
                0
            } else {
                (extent - block) / stride + 1
            }
        };

        BlockGrid {
            block_rows: fit(height, block.height, stride.height),
            block_cols: fit(width, block.width, stride.width),
            cell_rows: block.height / cell.height,
            cell_cols: block.width / cell.width,
        }
    }

    fn normalizer(&self) -> BlockNormalizer<T> {
        BlockNormalizer::new(
            self.config.block_norm,
            self.config.clip_norm.and_then(T::from_f64),
            self.config.epsilon.and_then(T::from_f64),
        )
    }

    /// Fills one region's feature slice block by block, normalizing each
    /// block in place. `out` holds whole blocks contiguously in row-major
    /// block order.
    fn fill_region(
        &self,
        x: usize,
        y: usize,
        grid: BlockGrid,
        normalizer: &BlockNormalizer<T>,
        out: &mut [T],
    ) {
        let bins = self.config.num_bins;
        let cell = self.config.cell_size;
        let stride = self.config.block_stride;
        let block_len = grid.cell_rows * grid.cell_cols * bins;

        for (index, block) in out.chunks_exact_mut(block_len).enumerate() {
            let block_row = index / grid.block_cols;
            let block_col = index % grid.block_cols;
            let row0 = y + block_row * stride.height;
            let col0 = x + block_col * stride.width;

            for cell_row in 0..grid.cell_rows {
                for cell_col in 0..grid.cell_cols {
                    let a0 = row0 + cell_row * cell.height;
                    let a1 = col0 + cell_col * cell.width;
                    let slot = (cell_row * grid.cell_cols + cell_col) * bins;

                    self.histogram.intersect_into(
                        a0,
                        a1,
                        a0 + cell.height,
                        a1 + cell.width,
                        &mut block[slot..slot + bins],
                    );
                }
            }

            normalizer.normalize(block);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(HogConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_cell_size_rejected() {
        let config = HogConfig {
            cell_size: Size2::new(0, 8),
            ..HogConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn block_must_be_cell_multiple() {
        let config = HogConfig {
            cell_size: Size2::new(8, 8),
            block_size: Size2::new(12, 16),
            ..HogConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn negative_clip_rejected() {
        let config = HogConfig {
            clip_norm: Some(-0.1),
            ..HogConfig::default()
        };
        assert!(config.validate().is_err());

        let config = HogConfig {
            clip_norm: Some(f64::NAN),
            ..HogConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn setter_validation_keeps_old_config() {
        let mut d: IntegralHogDescriptor<f64> =
            IntegralHogDescriptor::new(HogConfig::default()).unwrap();
        assert!(d.set_num_bins(0).is_err());
        assert_eq!(d.config().num_bins, 9);
    }

    #[test]
    fn bin_count_change_discards_histogram() {
        let mut d: IntegralHogDescriptor<f64> =
            IntegralHogDescriptor::new(HogConfig::default()).unwrap();
        let image: Tensor3<f64> = Tensor3::zeros(32, 32, 1);
        d.compute(&image, None).unwrap();
        assert!(!d.is_empty());

        d.set_num_bins(12).unwrap();
        assert!(d.is_empty());
    }

    #[test]
    fn grid_counts() {
        let d: IntegralHogDescriptor<f32> =
            IntegralHogDescriptor::new(HogConfig::default()).unwrap();

        let grid = d.grid(64, 48);
        assert_eq!(grid.block_cols, 7);
        assert_eq!(grid.block_rows, 5);
        assert_eq!(grid.cell_rows, 2);
        assert_eq!(grid.cell_cols, 2);

        // Too small for a single block in either dimension.
        let grid = d.grid(15, 64);
        assert_eq!(grid.block_cols, 0);
    }

    #[test]
    fn empty_image_clears_state() {
        let mut d: IntegralHogDescriptor<f64> =
            IntegralHogDescriptor::new(HogConfig::default()).unwrap();
        d.compute(&Tensor3::<u8>::zeros(32, 32, 1), None).unwrap();
        assert!(!d.is_empty());

        d.compute(&Tensor3::<u8>::empty(), None).unwrap();
        assert!(d.is_empty());
        assert!(d.features().unwrap().is_empty());
    }

    #[test]
    fn mask_shape_mismatch() {
        let mut d: IntegralHogDescriptor<f64> =
            IntegralHogDescriptor::new(HogConfig::default()).unwrap();
        let image: Tensor3<u8> = Tensor3::zeros(16, 16, 1);
        let mask: Tensor2<bool> = Tensor2::zeros(8, 8);

        assert!(matches!(
            d.compute(&image, Some(Mask::Array(&mask))),
            Err(Error::DimensionMismatch(_))
        ));
    }

    #[test]
    fn gradient_shape_mismatch() {
        let mut d: IntegralHogDescriptor<f64> =
            IntegralHogDescriptor::new(HogConfig::default()).unwrap();
        let dx: Tensor3<f64> = Tensor3::zeros(16, 16, 1);
        let dy: Tensor3<f64> = Tensor3::zeros(16, 8, 1);

        assert!(d.compute_gradients(&dx, &dy, None).is_err());
    }
}
