//! Maps flat, block-ordered field buffers back onto the dense grid.
//!
//! Simulation snapshots store every field as a sequence of equally sized
//! sub-grid blocks. Blocks follow each other with X as the outer axis, Y as
//! the middle axis and Z as the inner axis; the samples inside one block are
//! row-major over `(x, y, z)`.

use crate::grid::{Grid, GridShape};
use crate::{MorphError, SpatialAxis};
use ndarray::{s, ArrayView3};

/// Represents one sub-grid block within the full grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubgridRegion {
    pub x_offset: usize,
    pub y_offset: usize,
    pub z_offset: usize,
    pub size: GridShape,
}

impl SubgridRegion {
    /// Exclusive end coordinates of the region.
    #[must_use]
    pub const fn end(&self) -> (usize, usize, usize) {
        (
            self.x_offset + self.size.nx,
            self.y_offset + self.size.ny,
            self.z_offset + self.size.nz,
        )
    }
}

/// Validated partition of a grid into equal sub-grid blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubgridLayout {
    grid: GridShape,
    subgrids: GridShape,
    chunk: GridShape,
}

impl SubgridLayout {
    /// Builds the layout for `grid` cells split into `subgrids` blocks per axis.
    ///
    /// # Errors
    /// * [`MorphError::ZeroDimension`] if any extent or block count is zero.
    /// * [`MorphError::GridTooLarge`] if the cell count overflows `usize`.
    /// * [`MorphError::IndivisibleGrid`] if a grid extent is not a multiple of
    ///   its block count. Nothing is truncated.
    pub fn new(grid: GridShape, subgrids: GridShape) -> Result<Self, MorphError> {
        grid.ensure_non_empty()?;
        subgrids.ensure_non_empty()?;
        // Block and chunk volumes are bounded by the grid volume.
        grid.checked_volume().ok_or(MorphError::GridTooLarge { shape: grid })?;

        for axis in [SpatialAxis::X, SpatialAxis::Y, SpatialAxis::Z] {
            let cells = grid.extent(axis);
            let count = subgrids.extent(axis);
            if cells % count != 0 {
                return Err(MorphError::IndivisibleGrid {
                    axis,
                    cells,
                    subgrids: count,
                });
            }
        }

        let chunk = GridShape::new(
            grid.nx / subgrids.nx,
            grid.ny / subgrids.ny,
            grid.nz / subgrids.nz,
        );
        Ok(Self {
            grid,
            subgrids,
            chunk,
        })
    }

    #[must_use]
    pub const fn grid(&self) -> GridShape {
        self.grid
    }

    #[must_use]
    pub const fn subgrids(&self) -> GridShape {
        self.subgrids
    }

    /// Cells per block along each axis.
    #[must_use]
    pub const fn chunk(&self) -> GridShape {
        self.chunk
    }

    #[must_use]
    pub const fn block_count(&self) -> usize {
        self.subgrids.volume()
    }

    /// Region covered by the `index`-th block of the buffer.
    ///
    /// Equivalent to an odometer over block offsets: z advances first, then
    /// y, then x.
    #[must_use]
    pub const fn region(&self, index: usize) -> SubgridRegion {
        let bx = index / (self.subgrids.ny * self.subgrids.nz);
        let by = (index / self.subgrids.nz) % self.subgrids.ny;
        let bz = index % self.subgrids.nz;
        SubgridRegion {
            x_offset: bx * self.chunk.nx,
            y_offset: by * self.chunk.ny,
            z_offset: bz * self.chunk.nz,
            size: self.chunk,
        }
    }

    /// All block regions in buffer order.
    pub fn regions(&self) -> impl Iterator<Item = SubgridRegion> + '_ {
        (0..self.block_count()).map(move |index| self.region(index))
    }
}

/// Reassembles a block-ordered buffer into a dense grid.
///
/// # Errors
/// Returns [`MorphError::BufferLength`] if `buffer` does not hold exactly one
/// sample per cell of `layout.grid()`.
pub fn reassemble<T: Clone + Default>(
    buffer: &[T],
    layout: &SubgridLayout,
) -> Result<Grid<T>, MorphError> {
    let expected = layout.grid.volume();
    if buffer.len() != expected {
        return Err(MorphError::BufferLength {
            expected,
            actual: buffer.len(),
        });
    }

    log::debug!(
        "Reassembling {} blocks of {} into a {} grid",
        layout.block_count(),
        layout.chunk,
        layout.grid
    );

    let mut grid = Grid::new(layout.grid);
    let chunk_volume = layout.chunk.volume();
    for (region, samples) in layout.regions().zip(buffer.chunks_exact(chunk_volume)) {
        let block = ArrayView3::from_shape(region.size.as_tuple(), samples).map_err(|_| {
            MorphError::BufferLength {
                expected: chunk_volume,
                actual: samples.len(),
            }
        })?;
        let (x_end, y_end, z_end) = region.end();
        grid.data
            .slice_mut(s![
                region.x_offset..x_end,
                region.y_offset..y_end,
                region.z_offset..z_end
            ])
            .assign(&block);
    }

    Ok(grid)
}

/// Flattens a dense grid into block order, the inverse of [`reassemble`].
///
/// # Errors
/// Returns [`MorphError::ShapeMismatch`] if the grid shape differs from the layout.
pub fn split_into_blocks<T: Clone>(
    grid: &Grid<T>,
    layout: &SubgridLayout,
) -> Result<Vec<T>, MorphError> {
    if grid.shape() != layout.grid {
        return Err(MorphError::ShapeMismatch {
            expected: layout.grid,
            found: grid.shape(),
        });
    }

    let mut buffer = Vec::with_capacity(layout.grid.volume());
    for region in layout.regions() {
        let (x_end, y_end, z_end) = region.end();
        let block = grid.data.slice(s![
            region.x_offset..x_end,
            region.y_offset..y_end,
            region.z_offset..z_end
        ]);
        buffer.extend(block.iter().cloned());
    }
    Ok(buffer)
}
