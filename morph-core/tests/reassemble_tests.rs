// morph-core/tests/reassemble_tests.rs
use morph_core::{reassemble, split_into_blocks, Grid, GridShape, MorphError, SubgridLayout};
use proptest::prelude::*;

// Strategy: sub-grid counts and chunk sizes per axis, giving a divisible grid
fn layout_strategy() -> impl Strategy<Value = (GridShape, GridShape)> {
    ((1usize..4, 1usize..4, 1usize..4), (1usize..5, 1usize..5, 1usize..5)).prop_map(
        |((sx, sy, sz), (cx, cy, cz))| {
            (
                GridShape::new(sx * cx, sy * cy, sz * cz),
                GridShape::new(sx, sy, sz),
            )
        },
    )
}

proptest! {
    #[test]
    fn prop_split_then_reassemble_is_identity(
        (grid_shape, subgrids) in layout_strategy(),
        seed in any::<u64>(),
    ) {
        let layout = SubgridLayout::new(grid_shape, subgrids).unwrap();
        let data: Vec<f64> = (0..grid_shape.volume())
            .map(|i| (i as u64).wrapping_mul(seed | 1) as f64)
            .collect();
        let dense = Grid::from_vec(grid_shape, data).unwrap();

        let buffer = split_into_blocks(&dense, &layout).unwrap();
        prop_assert_eq!(buffer.len(), grid_shape.volume());

        let rebuilt = reassemble(&buffer, &layout).unwrap();
        prop_assert_eq!(rebuilt, dense);
    }

    #[test]
    fn prop_every_cell_is_covered_exactly_once((grid_shape, subgrids) in layout_strategy()) {
        let layout = SubgridLayout::new(grid_shape, subgrids).unwrap();
        let mut hits = Grid::<u32>::new(grid_shape);
        for region in layout.regions() {
            let (x_end, y_end, z_end) = region.end();
            for x in region.x_offset..x_end {
                for y in region.y_offset..y_end {
                    for z in region.z_offset..z_end {
                        *hits.get_mut(x, y, z).unwrap() += 1;
                    }
                }
            }
        }
        prop_assert!(hits.view().iter().all(|&count| count == 1));
    }

    #[test]
    fn prop_indivisible_extent_is_rejected(extra in 1usize..3, cells in 1usize..5) {
        // nx = 3 * cells + extra is never a multiple of 3
        let grid_shape = GridShape::new(3 * cells + extra, 2, 2);
        let err = SubgridLayout::new(grid_shape, GridShape::new(3, 1, 1)).unwrap_err();
        let is_indivisible = matches!(err, MorphError::IndivisibleGrid { .. });
        prop_assert!(is_indivisible);
    }
}

#[test]
fn test_block_values_land_in_their_region() {
    // 2x1x2 blocks of 1x2x1 cells; block k is filled with k
    let layout = SubgridLayout::new(GridShape::new(2, 2, 2), GridShape::new(2, 1, 2)).unwrap();
    let buffer = vec![0, 0, 1, 1, 2, 2, 3, 3];

    let grid = reassemble(&buffer, &layout).unwrap();

    assert_eq!(grid.get(0, 0, 0), Some(&0));
    assert_eq!(grid.get(0, 1, 0), Some(&0));
    assert_eq!(grid.get(0, 0, 1), Some(&1));
    assert_eq!(grid.get(1, 1, 0), Some(&2));
    assert_eq!(grid.get(1, 0, 1), Some(&3));
}
