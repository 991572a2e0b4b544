use crate::{MorphError, SpatialAxis};
use ndarray::{Array3, ArrayView3, ArrayViewMut3};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Number of cells (or sub-grids) along each axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GridShape {
    pub nx: usize,
    pub ny: usize,
    pub nz: usize,
}

impl GridShape {
    #[must_use]
    pub const fn new(nx: usize, ny: usize, nz: usize) -> Self {
        Self { nx, ny, nz }
    }

    /// Total number of cells.
    ///
    /// Shapes read from files must go through [`GridShape::checked_volume`]
    /// first; [`crate::SubgridLayout::new`] does.
    #[must_use]
    pub const fn volume(&self) -> usize {
        self.nx * self.ny * self.nz
    }

    /// Total number of cells, or `None` if it does not fit in `usize`.
    #[must_use]
    pub const fn checked_volume(&self) -> Option<usize> {
        match self.nx.checked_mul(self.ny) {
            Some(area) => area.checked_mul(self.nz),
            None => None,
        }
    }

    /// Extent along the given axis.
    #[must_use]
    pub const fn extent(&self, axis: SpatialAxis) -> usize {
        match axis {
            SpatialAxis::X => self.nx,
            SpatialAxis::Y => self.ny,
            SpatialAxis::Z => self.nz,
        }
    }

    #[must_use]
    pub const fn as_tuple(&self) -> (usize, usize, usize) {
        (self.nx, self.ny, self.nz)
    }

    /// Returns an error naming the first axis with zero extent.
    pub fn ensure_non_empty(&self) -> Result<(), MorphError> {
        for axis in [SpatialAxis::X, SpatialAxis::Y, SpatialAxis::Z] {
            if self.extent(axis) == 0 {
                return Err(MorphError::ZeroDimension { axis });
            }
        }
        Ok(())
    }
}

impl From<[usize; 3]> for GridShape {
    fn from(dims: [usize; 3]) -> Self {
        Self::new(dims[0], dims[1], dims[2])
    }
}

impl std::fmt::Display for GridShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}x{}", self.nx, self.ny, self.nz)
    }
}

/// Dense 3D grid indexed by true spatial coordinates.
///
/// Storage is row-major over `(x, y, z)`: z varies fastest, x slowest.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid<T> {
    pub(crate) data: Array3<T>,
}

impl<T: Clone + Default> Grid<T> {
    /// Creates a new grid with the given shape, initialized with default values.
    #[must_use]
    pub fn new(shape: GridShape) -> Self {
        Self {
            data: Array3::default(shape.as_tuple()),
        }
    }
}

impl<T> Grid<T> {
    /// Wraps a row-major `(x, y, z)` buffer as a grid.
    ///
    /// # Errors
    /// Returns [`MorphError::BufferLength`] if `data` does not hold exactly
    /// `shape.volume()` elements.
    pub fn from_vec(shape: GridShape, data: Vec<T>) -> Result<Self, MorphError> {
        let expected = shape.checked_volume().ok_or(MorphError::GridTooLarge { shape })?;
        let actual = data.len();
        Array3::from_shape_vec(shape.as_tuple(), data)
            .map(|data| Self { data })
            .map_err(|_| MorphError::BufferLength { expected, actual })
    }

    #[must_use]
    pub fn shape(&self) -> GridShape {
        let (nx, ny, nz) = self.data.dim();
        GridShape::new(nx, ny, nz)
    }

    /// Returns an immutable reference to the element at the given coordinates,
    /// or None if the coordinates are out of bounds.
    #[must_use]
    pub fn get(&self, x: usize, y: usize, z: usize) -> Option<&T> {
        self.data.get((x, y, z))
    }

    /// Returns a mutable reference to the element at the given coordinates,
    /// or None if the coordinates are out of bounds.
    pub fn get_mut(&mut self, x: usize, y: usize, z: usize) -> Option<&mut T> {
        self.data.get_mut((x, y, z))
    }

    #[must_use]
    pub fn view(&self) -> ArrayView3<'_, T> {
        self.data.view()
    }

    pub fn view_mut(&mut self) -> ArrayViewMut3<'_, T> {
        self.data.view_mut()
    }

    /// Checks that `other` has the same shape as `self`.
    pub(crate) fn ensure_same_shape<U>(&self, other: &Grid<U>) -> Result<(), MorphError> {
        let (expected, found) = (self.shape(), other.shape());
        if expected == found {
            Ok(())
        } else {
            Err(MorphError::ShapeMismatch { expected, found })
        }
    }
}

impl<T> From<Array3<T>> for Grid<T> {
    fn from(data: Array3<T>) -> Self {
        Self { data }
    }
}

/// Type alias for grids of scalar field samples.
pub type ScalarGrid = Grid<f64>;
