//! Collapses dense grids into 2D images.
//!
//! An image keeps the two axes that remain after removing the line of sight,
//! in ascending order. For the default Y line of sight the image is indexed
//! by `(x, z)`.

use crate::grid::Grid;
use crate::{MorphError, SpatialAxis};
use float_ord::FloatOrd;
use ndarray::{Array2, Axis, Zip};

/// 2D scalar map, indexed by `(column, row)`.
///
/// Columns run along the first remaining grid axis, rows along the second.
#[derive(Debug, Clone, PartialEq)]
pub struct Image2D {
    data: Array2<f64>,
}

impl Image2D {
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            data: Array2::zeros((width, height)),
        }
    }

    /// Builds an image from `f(column, row)`.
    #[must_use]
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> f64) -> Self {
        Self {
            data: Array2::from_shape_fn((width, height), |(column, row)| f(column, row)),
        }
    }

    #[must_use]
    pub fn width(&self) -> usize {
        self.data.dim().0
    }

    #[must_use]
    pub fn height(&self) -> usize {
        self.data.dim().1
    }

    #[must_use]
    pub fn get(&self, column: usize, row: usize) -> Option<f64> {
        self.data.get((column, row)).copied()
    }

    /// Iterates all pixels as `(column, row, value)`.
    pub fn pixels(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.data
            .indexed_iter()
            .map(|((column, row), &value)| (column, row, value))
    }

    /// Smallest and largest finite value, or `None` if no pixel is finite.
    #[must_use]
    pub fn finite_range(&self) -> Option<(f64, f64)> {
        let finite = || self.data.iter().copied().filter(|v| v.is_finite());
        let min = finite().min_by_key(|&v| FloatOrd(v))?;
        let max = finite().max_by_key(|&v| FloatOrd(v))?;
        Some((min, max))
    }

    /// Largest finite absolute value, 0 for an image without finite pixels.
    #[must_use]
    pub fn max_abs(&self) -> f64 {
        self.data
            .iter()
            .filter(|v| v.is_finite())
            .map(|v| FloatOrd(v.abs()))
            .max()
            .map_or(0.0, |FloatOrd(v)| v)
    }

    /// Nearest-neighbour resampling onto a `width` x `height` pixel buffer.
    ///
    /// Each output pixel takes the value of the source pixel under its centre.
    #[must_use]
    pub fn resample(&self, width: usize, height: usize) -> Self {
        if width == self.width() && height == self.height() {
            return self.clone();
        }
        let (src_w, src_h) = (self.width(), self.height());
        if src_w == 0 || src_h == 0 {
            return Self::new(width, height);
        }

        let source_index = |dst: usize, dst_len: usize, src_len: usize| {
            let centre = (dst as f64 + 0.5) * src_len as f64 / dst_len as f64;
            (centre.floor() as usize).min(src_len - 1)
        };
        let data = Array2::from_shape_fn((width, height), |(column, row)| {
            self.data[[
                source_index(column, width, src_w),
                source_index(row, height, src_h),
            ]]
        });
        Self { data }
    }
}

impl From<Array2<f64>> for Image2D {
    fn from(data: Array2<f64>) -> Self {
        Self { data }
    }
}

/// Column sums of `field` along the line of sight.
#[must_use]
pub fn project_sum(field: &Grid<f64>, line_of_sight: SpatialAxis) -> Image2D {
    Image2D::from(field.view().sum_axis(Axis(line_of_sight.index())))
}

/// Weighted mean of `field` along the line of sight: `sum(f * w) / sum(w)`.
///
/// Columns whose weights sum to zero come out as 0.
///
/// # Errors
/// Returns [`MorphError::ShapeMismatch`] if the grids differ in shape.
pub fn project_weighted(
    field: &Grid<f64>,
    weight: &Grid<f64>,
    line_of_sight: SpatialAxis,
) -> Result<Image2D, MorphError> {
    field.ensure_same_shape(weight)?;
    let axis = Axis(line_of_sight.index());

    let weighted_sum = (&field.view() * &weight.view()).sum_axis(axis);
    let weight_sum = weight.view().sum_axis(axis);
    let data = Zip::from(&weighted_sum)
        .and(&weight_sum)
        .map_collect(|&num, &den| if den == 0.0 { 0.0 } else { num / den });

    Ok(Image2D::from(data))
}

/// A single plane of `field` at `index` along `axis`.
///
/// # Errors
/// Returns [`MorphError::IndexOutOfBounds`] if `index` lies outside the grid.
pub fn slice(field: &Grid<f64>, axis: SpatialAxis, index: usize) -> Result<Image2D, MorphError> {
    let extent = field.shape().extent(axis);
    if index >= extent {
        return Err(MorphError::IndexOutOfBounds {
            axis,
            index,
            extent,
        });
    }
    Ok(Image2D::from(
        field.view().index_axis(Axis(axis.index()), index).to_owned(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridShape;

    fn grid_from_fn(shape: GridShape, f: impl Fn(usize, usize, usize) -> f64) -> Grid<f64> {
        let mut data = Vec::with_capacity(shape.volume());
        for x in 0..shape.nx {
            for y in 0..shape.ny {
                for z in 0..shape.nz {
                    data.push(f(x, y, z));
                }
            }
        }
        Grid::from_vec(shape, data).unwrap()
    }

    #[test]
    fn test_weighted_projection_of_constant_is_constant() {
        let shape = GridShape::new(3, 4, 5);
        let field = grid_from_fn(shape, |_, _, _| 7.0);
        let weight = grid_from_fn(shape, |x, y, z| (x + y + z + 1) as f64);

        let image = project_weighted(&field, &weight, SpatialAxis::Y).unwrap();

        assert_eq!((image.width(), image.height()), (3, 5));
        for (_, _, value) in image.pixels() {
            assert!((value - 7.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_weighted_projection_weights_cells() {
        let shape = GridShape::new(1, 2, 1);
        let field = grid_from_fn(shape, |_, y, _| if y == 0 { 1.0 } else { 4.0 });
        let weight = grid_from_fn(shape, |_, y, _| if y == 0 { 3.0 } else { 1.0 });

        let image = project_weighted(&field, &weight, SpatialAxis::Y).unwrap();
        // (1*3 + 4*1) / 4
        assert_eq!(image.get(0, 0), Some(1.75));
    }

    #[test]
    fn test_zero_weight_column_is_zero() {
        let shape = GridShape::new(2, 2, 1);
        let field = grid_from_fn(shape, |_, _, _| 5.0);
        let weight = grid_from_fn(shape, |x, _, _| if x == 0 { 0.0 } else { 1.0 });

        let image = project_weighted(&field, &weight, SpatialAxis::Y).unwrap();
        assert_eq!(image.get(0, 0), Some(0.0));
        assert_eq!(image.get(1, 0), Some(5.0));
    }

    #[test]
    fn test_project_sum_along_z() {
        let shape = GridShape::new(2, 1, 3);
        let field = grid_from_fn(shape, |x, _, z| (x * 10 + z) as f64);
        let image = project_sum(&field, SpatialAxis::Z);
        assert_eq!((image.width(), image.height()), (2, 1));
        assert_eq!(image.get(1, 0), Some(10.0 + 11.0 + 12.0));
    }

    #[test]
    fn test_slice_picks_plane() {
        let shape = GridShape::new(2, 3, 2);
        let field = grid_from_fn(shape, |x, y, z| (x * 100 + y * 10 + z) as f64);
        let image = slice(&field, SpatialAxis::Y, 2).unwrap();
        assert_eq!(image.get(1, 1), Some(121.0));
        assert!(matches!(
            slice(&field, SpatialAxis::Y, 3),
            Err(MorphError::IndexOutOfBounds { extent: 3, .. })
        ));
    }

    #[test]
    fn test_resample_nearest_neighbour() {
        let image = Image2D::from(
            Array2::from_shape_vec((2, 2), vec![1.0, 2.0, 3.0, 4.0]).unwrap(),
        );
        let up = image.resample(4, 2);
        assert_eq!((up.width(), up.height()), (4, 2));
        assert_eq!(up.get(0, 0), Some(1.0));
        assert_eq!(up.get(1, 1), Some(2.0));
        assert_eq!(up.get(2, 0), Some(3.0));
        assert_eq!(up.get(3, 1), Some(4.0));

        let down = up.resample(2, 2);
        assert_eq!(down, image);
    }

    #[test]
    fn test_finite_range_and_max_abs() {
        let image = Image2D::from(
            Array2::from_shape_vec((2, 2), vec![-3.0, f64::NAN, 2.0, f64::INFINITY]).unwrap(),
        );
        assert_eq!(image.finite_range(), Some((-3.0, 2.0)));
        assert_eq!(image.max_abs(), 3.0);

        let empty = Image2D::from(Array2::from_elem((1, 1), f64::NAN));
        assert_eq!(empty.finite_range(), None);
        assert_eq!(empty.max_abs(), 0.0);
    }
}
