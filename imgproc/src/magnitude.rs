use std::fmt;
use std::str::FromStr;

use hog_core::{Error, Real};
use serde::{Deserialize, Serialize};

/// Vote-weight profile applied to a (dx, dy) gradient pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Magnitude {
    /// sqrt(dx² + dy²)
    #[default]
    Identity,
    /// dx² + dy²; skips the root. Monotonic in the identity profile, so
    /// arg-max channel selection is unaffected.
    Square,
    /// sqrt(sqrt(dx² + dy²)); emphasizes weak gradients.
    Sqrt,
}

impl Magnitude {
    pub fn vote<T: Real>(&self, dx: T, dy: T) -> T {
        // Both operands of the sum are squares, so the argument of the
        // square root is never negative.
        let square = dx * dx + dy * dy;

        match self {
            Magnitude::Identity => square.sqrt(),
            Magnitude::Square => square,
            Magnitude::Sqrt => square.sqrt().sqrt(),
        }
    }
}

impl FromStr for Magnitude {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "identity" => Ok(Magnitude::Identity),
            "square" => Ok(Magnitude::Square),
            "sqrt" => Ok(Magnitude::Sqrt),
            other => Err(Error::InvalidParameter(format!(
                "unknown magnitude '{other}', expected one of: identity, square, sqrt"
            ))),
        }
    }
}

impl fmt::Display for Magnitude {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Magnitude::Identity => "identity",
            Magnitude::Square => "square",
            Magnitude::Sqrt => "sqrt",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_is_euclidean() {
        let v: f64 = Magnitude::Identity.vote(3.0, 4.0);
        assert!((v - 5.0).abs() < 1e-12);
    }

    #[test]
    fn square_skips_root() {
        let v: f64 = Magnitude::Square.vote(3.0, 4.0);
        assert!((v - 25.0).abs() < 1e-12);
    }

    #[test]
    fn sqrt_compresses() {
        let v: f64 = Magnitude::Sqrt.vote(3.0, 4.0);
        assert!((v - 5.0f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn zero_gradient_votes_zero() {
        for m in [Magnitude::Identity, Magnitude::Square, Magnitude::Sqrt] {
            assert_eq!(m.vote(0.0f32, 0.0), 0.0);
        }
    }

    #[test]
    fn mode_names_round_trip() {
        for m in [Magnitude::Identity, Magnitude::Square, Magnitude::Sqrt] {
            assert_eq!(m.to_string().parse::<Magnitude>().unwrap(), m);
        }
        assert!("foo".parse::<Magnitude>().is_err());
    }
}
