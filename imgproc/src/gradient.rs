use hog_core::{Real, Tensor3};
use num_traits::AsPrimitive;
use serde::{Deserialize, Serialize};

/// Finite-difference stencil used for interior pixels.
///
/// Border pixels always use the matching one-sided difference (forward at the
/// lower border, backward at the upper border) regardless of this choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Stencil {
    /// f(x+1) - f(x)
    Forward,
    /// f(x) - f(x-1)
    Backward,
    /// (f(x+1) - f(x-1)) / 2
    Central,
    /// f(x+1) - f(x-1)
    #[default]
    TwoPoint,
}

#[derive(Debug, Clone, Copy)]
enum Axis {
    Rows,
    Cols,
}

/// Per-pixel first-derivative estimator over a multi-channel image.
///
/// Pixel values are widened to the output scalar `T` before any subtraction,
/// so narrow integer inputs cannot overflow or lose the sign of a
/// difference.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Gradient {
    pub interior: Stencil,
}

impl Gradient {
    pub fn new(interior: Stencil) -> Self {
        Self { interior }
    }

    /// Computes (dx, dy) over a (rows, cols, channels) image.
    ///
    /// A zero-sized image yields zero-sized outputs; an axis of extent 1
    /// yields zero derivatives along that axis.
    pub fn apply<P, T>(&self, image: &Tensor3<P>) -> (Tensor3<T>, Tensor3<T>)
    where
        P: Copy + AsPrimitive<T>,
        T: Real,
    {
        let (rows, cols, channels) = image.dims();

        let mut dx = Tensor3::zeros(rows, cols, channels);
        let mut dy = Tensor3::zeros(rows, cols, channels);

        for i in 0..rows {
            for j in 0..cols {
                for k in 0..channels {
                    *dx.at_mut(i, j, k) = self.derive(image, i, j, k, Axis::Cols);
                    *dy.at_mut(i, j, k) = self.derive(image, i, j, k, Axis::Rows);
                }
            }
        }

        (dx, dy)
    }

    fn derive<P, T>(&self, image: &Tensor3<P>, i: usize, j: usize, k: usize, axis: Axis) -> T
    where
        P: Copy + AsPrimitive<T>,
        T: Real,
    {
        let (rows, cols, _) = image.dims();
        let (pos, extent) = match axis {
            Axis::Rows => (i, rows),
            Axis::Cols => (j, cols),
        };

        if extent < 2 {
            return T::zero();
        }

        let at = |p: usize| -> T {
            match axis {
                Axis::Rows => image.at(p, j, k).as_(),
                Axis::Cols => image.at(i, p, k).as_(),
            }
        };

        if pos == 0 {
            // Lower border: forward difference.
            return at(pos + 1) - at(pos);
        }
        if pos >= extent - 1 {
            // Upper border: backward difference.
            return at(pos) - at(pos - 1);
        }

        match self.interior {
            Stencil::Forward => at(pos + 1) - at(pos),
            Stencil::Backward => at(pos) - at(pos - 1),
            Stencil::TwoPoint => at(pos + 1) - at(pos - 1),
            Stencil::Central => (at(pos + 1) - at(pos - 1)) / (T::one() + T::one()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp(rows: usize, cols: usize) -> Tensor3<f32> {
        let mut t = Tensor3::zeros(rows, cols, 1);
        for i in 0..rows {
            for j in 0..cols {
                *t.at_mut(i, j, 0) = j as f32;
            }
        }
        t
    }

    #[test]
    fn horizontal_ramp() {
        let image = ramp(3, 5);
        let (dx, dy): (Tensor3<f32>, Tensor3<f32>) = Gradient::default().apply(&image);

        for i in 0..3 {
            // Forward difference at the left border, backward at the right.
            assert_eq!(dx.at(i, 0, 0), 1.0);
            assert_eq!(dx.at(i, 4, 0), 1.0);
            // Two-point interior stencil spans two columns.
            for j in 1..4 {
                assert_eq!(dx.at(i, j, 0), 2.0);
            }
            for j in 0..5 {
                assert_eq!(dy.at(i, j, 0), 0.0);
            }
        }
    }

    #[test]
    fn central_halves_two_point() {
        let image = ramp(3, 5);
        let (dx, _): (Tensor3<f32>, Tensor3<f32>) =
            Gradient::new(Stencil::Central).apply(&image);

        assert_eq!(dx.at(1, 2, 0), 1.0);
        // Borders are unaffected by the interior choice.
        assert_eq!(dx.at(1, 0, 0), 1.0);
    }

    #[test]
    fn integer_input_keeps_sign() {
        // A decreasing u8 ramp must produce negative derivatives; the
        // subtraction has to happen after widening to float.
        let image = Tensor3::from_vec(vec![255u8, 128, 0], 1, 3, 1).unwrap();
        let (dx, _): (Tensor3<f64>, Tensor3<f64>) = Gradient::default().apply(&image);

        assert_eq!(dx.at(0, 0, 0), -127.0);
        assert_eq!(dx.at(0, 1, 0), -255.0);
        assert_eq!(dx.at(0, 2, 0), -128.0);
    }

    #[test]
    fn empty_image() {
        let image: Tensor3<f32> = Tensor3::empty();
        let (dx, dy): (Tensor3<f32>, Tensor3<f32>) = Gradient::default().apply(&image);

        assert!(dx.is_empty());
        assert!(dy.is_empty());
    }

    #[test]
    fn single_column_has_no_horizontal_derivative() {
        let image = Tensor3::from_vec(vec![1.0f32, 5.0, 9.0], 3, 1, 1).unwrap();
        let (dx, dy): (Tensor3<f32>, Tensor3<f32>) = Gradient::default().apply(&image);

        for i in 0..3 {
            assert_eq!(dx.at(i, 0, 0), 0.0);
        }
        assert_eq!(dy.at(0, 0, 0), 4.0);
        assert_eq!(dy.at(1, 0, 0), 8.0);
        assert_eq!(dy.at(2, 0, 0), 4.0);
    }

    #[test]
    fn per_channel_independence() {
        let mut image: Tensor3<f32> = Tensor3::zeros(1, 3, 2);
        for j in 0..3 {
            *image.at_mut(0, j, 0) = j as f32;
            *image.at_mut(0, j, 1) = -(j as f32);
        }

        let (dx, _): (Tensor3<f32>, Tensor3<f32>) = Gradient::default().apply(&image);

        assert_eq!(dx.at(0, 1, 0), 2.0);
        assert_eq!(dx.at(0, 1, 1), -2.0);
    }
}
