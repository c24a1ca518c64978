use serde::{Deserialize, Serialize};

/// Extent of a rectangular region in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Size2 {
    pub width: usize,
    pub height: usize,
}

impl Size2 {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }
}

/// An axis-aligned rectangle over the image domain.
///
/// `x`/`width` span columns, `y`/`height` span rows. Fields are signed so
/// that negative offsets or extents can be rejected with a diagnostic rather
/// than wrapping; validation happens at query time, not construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds {
    pub x: isize,
    pub y: isize,
    pub width: isize,
    pub height: isize,
}

impl Bounds {
    pub fn new(x: isize, y: isize, width: isize, height: isize) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn area(&self) -> isize {
        self.width * self.height
    }

    pub fn size(&self) -> (isize, isize) {
        (self.width, self.height)
    }
}

impl Default for Bounds {
    fn default() -> Self {
        Self::new(0, 0, 0, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn area() {
        assert_eq!(Bounds::new(2, 3, 4, 5).area(), 20);
        assert_eq!(Bounds::default().area(), 0);
    }

    #[test]
    fn size() {
        assert_eq!(Bounds::new(0, 0, 7, 9).size(), (7, 9));
    }
}
