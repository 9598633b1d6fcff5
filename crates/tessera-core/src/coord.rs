//! Fixed-dimension integer grid coordinates.

use std::fmt;
use std::ops::{Add, Index, IndexMut, Sub};

/// A point on a `D`-dimensional integer lattice.
///
/// Axis `0` is the fastest-varying axis (the one streaks run along);
/// axis `D - 1` is the outermost axis, along which the grid is striped
/// across nodes. Negative and overflowing components are legal: they
/// address outer ghost cells under periodic topologies.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Coord<const D: usize>(pub [i32; D]);

impl<const D: usize> Coord<D> {
    /// The origin (all components zero).
    pub fn origin() -> Self {
        Self([0; D])
    }

    /// Build a coordinate from its components.
    pub fn new(components: [i32; D]) -> Self {
        Self(components)
    }

    /// The component along axis `0`.
    pub fn x(&self) -> i32 {
        self.0[0]
    }

    /// Product of all components, as used for cell counts of a box
    /// whose dimensions are this coordinate.
    ///
    /// Negative components count as zero.
    pub fn prod(&self) -> u64 {
        self.0.iter().map(|&c| c.max(0) as u64).product()
    }

    /// Return a copy with axis `axis` replaced by `value`.
    pub fn with(mut self, axis: usize, value: i32) -> Self {
        self.0[axis] = value;
        self
    }

    /// Components as a slice.
    pub fn as_slice(&self) -> &[i32] {
        &self.0
    }
}

impl<const D: usize> Default for Coord<D> {
    fn default() -> Self {
        Self::origin()
    }
}

impl<const D: usize> From<[i32; D]> for Coord<D> {
    fn from(components: [i32; D]) -> Self {
        Self(components)
    }
}

impl<const D: usize> Index<usize> for Coord<D> {
    type Output = i32;

    fn index(&self, axis: usize) -> &i32 {
        &self.0[axis]
    }
}

impl<const D: usize> IndexMut<usize> for Coord<D> {
    fn index_mut(&mut self, axis: usize) -> &mut i32 {
        &mut self.0[axis]
    }
}

impl<const D: usize> Add for Coord<D> {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self {
        for (a, b) in self.0.iter_mut().zip(rhs.0) {
            *a += b;
        }
        self
    }
}

impl<const D: usize> Sub for Coord<D> {
    type Output = Self;

    fn sub(mut self, rhs: Self) -> Self {
        for (a, b) in self.0.iter_mut().zip(rhs.0) {
            *a -= b;
        }
        self
    }
}

impl<const D: usize> fmt::Debug for Coord<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self}")
    }
}

impl<const D: usize> fmt::Display for Coord<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, c) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{c}")?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn display_formats_components() {
        assert_eq!(Coord([1, -2, 3]).to_string(), "(1, -2, 3)");
        assert_eq!(format!("{:?}", Coord([7])), "(7)");
    }

    #[test]
    fn prod_ignores_negative_extents() {
        assert_eq!(Coord([3, 4]).prod(), 12);
        assert_eq!(Coord([3, -4]).prod(), 0);
    }

    #[test]
    fn with_replaces_one_axis() {
        assert_eq!(Coord([1, 2, 3]).with(2, 9), Coord([1, 2, 9]));
    }

    proptest! {
        #[test]
        fn add_then_sub_is_identity(
            a in prop::array::uniform3(-1000i32..1000),
            b in prop::array::uniform3(-1000i32..1000),
        ) {
            let (a, b) = (Coord(a), Coord(b));
            prop_assert_eq!((a + b) - b, a);
        }
    }
}
