//! Core library for reassembling sub-gridded simulation output.
//! Defines the dense grid, the sub-grid reassembler, derived physics fields
//! and the 2D projections that feed the renderer. Nothing in here touches the
//! filesystem.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Generic 3D grid structures and grid shapes.
pub mod grid;
/// Derived physical quantities computed from the primary simulation fields.
pub mod physics;
/// Projections, slices and fixed-resolution images.
pub mod projection;
/// Sub-grid layout and the block reassembler.
pub mod reassemble;

/// Generic 3D grid structure.
pub use crate::grid::Grid;
/// Shape of a grid or of a sub-grid partition.
pub use crate::grid::GridShape;
/// Grid of scalar samples (f64).
pub use crate::grid::ScalarGrid;
/// Primary and derived field collections.
pub use crate::physics::{DerivedField, DerivedGrids, PrimaryGrids};
/// 2D image produced from a grid.
pub use crate::projection::Image2D;
/// Reassembly entry points.
pub use crate::reassemble::{reassemble, split_into_blocks, SubgridLayout, SubgridRegion};

/// Errors raised while reshaping grids or deriving fields from them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MorphError {
    /// One of the requested dimensions is zero.
    #[error("Grid dimension along {axis} must be positive")]
    ZeroDimension { axis: SpatialAxis },
    /// A grid dimension is not a multiple of its sub-grid count.
    #[error("{cells} cells along {axis} cannot be split into {subgrids} equal sub-grids")]
    IndivisibleGrid {
        axis: SpatialAxis,
        cells: usize,
        subgrids: usize,
    },
    /// The cell count of a grid overflows `usize`.
    #[error("Grid {shape} has more cells than can be addressed")]
    GridTooLarge { shape: GridShape },
    /// The flat buffer does not hold exactly one sample per grid cell.
    #[error("Buffer holds {actual} samples, grid needs {expected}")]
    BufferLength { expected: usize, actual: usize },
    /// Two grids that must line up cell for cell have different shapes.
    #[error("Shape mismatch: expected {expected}, found {found}")]
    ShapeMismatch { expected: GridShape, found: GridShape },
    /// A plane index falls outside the grid.
    #[error("Index {index} is out of bounds for {axis} (extent {extent})")]
    IndexOutOfBounds {
        axis: SpatialAxis,
        index: usize,
        extent: usize,
    },
}

/// One of the three spatial axes of the simulation box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum SpatialAxis {
    X,
    /// The line of sight of the default projection.
    #[default]
    Y,
    Z,
}

impl SpatialAxis {
    /// Index of the axis in an `(x, y, z)` triple.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }

    /// The two remaining axes, in ascending order.
    #[must_use]
    pub const fn others(self) -> (Self, Self) {
        match self {
            Self::X => (Self::Y, Self::Z),
            Self::Y => (Self::X, Self::Z),
            Self::Z => (Self::X, Self::Y),
        }
    }
}

impl std::fmt::Display for SpatialAxis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::X => "x",
            Self::Y => "y",
            Self::Z => "z",
        };
        f.write_str(name)
    }
}
