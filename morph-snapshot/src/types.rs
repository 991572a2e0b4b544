use crate::LoadError;
use morph_core::physics::KPC;
use morph_core::{reassemble, GridShape, PrimaryGrids, SubgridLayout};

/// Metadata describing the simulation box of one snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotHeader {
    /// Edge lengths of the box in metres.
    pub box_size: [f64; 3],
    /// Number of cells along each axis.
    pub grid: GridShape,
    /// Number of sub-grid blocks along each axis.
    pub subgrids: GridShape,
}

impl SnapshotHeader {
    /// Edge length of one cell along x, in metres.
    #[must_use]
    pub fn pixel_size(&self) -> f64 {
        self.box_size[0] / self.grid.nx as f64
    }

    /// Box edge lengths in kiloparsec.
    #[must_use]
    pub fn box_size_kpc(&self) -> [f64; 3] {
        self.box_size.map(|edge| edge / KPC)
    }

    /// Validated sub-grid layout of the stored fields.
    pub fn layout(&self) -> Result<SubgridLayout, LoadError> {
        Ok(SubgridLayout::new(self.grid, self.subgrids)?)
    }
}

/// The primary gas fields of one snapshot, still in block order.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub header: SnapshotHeader,
    /// z component of the velocity, m/s.
    pub velocity_z: Vec<f64>,
    /// K.
    pub temperature: Vec<f64>,
    /// m^-3.
    pub number_density: Vec<f64>,
    pub neutral_fraction: Vec<f64>,
}

impl Snapshot {
    /// Checks the layout and that every field holds one sample per cell.
    pub fn validate(&self) -> Result<(), LoadError> {
        let expected = self.header.layout()?.grid().volume();
        for (name, field) in [
            ("Velocities", &self.velocity_z),
            ("Temperature", &self.temperature),
            ("NumberDensity", &self.number_density),
            ("NeutralFractionH", &self.neutral_fraction),
        ] {
            if field.len() != expected {
                return Err(LoadError::InvalidData(format!(
                    "Dataset '{name}' has {} samples, grid {} needs {expected}",
                    field.len(),
                    self.header.grid
                )));
            }
        }
        Ok(())
    }

    /// Reassembles every field onto the dense grid.
    pub fn assemble(&self) -> Result<PrimaryGrids, LoadError> {
        self.validate()?;
        let layout = self.header.layout()?;
        Ok(PrimaryGrids {
            velocity_z: reassemble(&self.velocity_z, &layout)?,
            temperature: reassemble(&self.temperature, &layout)?,
            number_density: reassemble(&self.number_density, &layout)?,
            neutral_fraction: reassemble(&self.neutral_fraction, &layout)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use morph_core::MorphError;

    fn header(grid: GridShape, subgrids: GridShape) -> SnapshotHeader {
        SnapshotHeader {
            box_size: [KPC, KPC, 6.0 * KPC],
            grid,
            subgrids,
        }
    }

    #[test]
    fn test_pixel_size_and_box_in_kpc() {
        let header = header(GridShape::new(128, 128, 768), GridShape::new(4, 4, 12));
        assert!((header.pixel_size() - KPC / 128.0).abs() < 1.0);
        let kpc = header.box_size_kpc();
        assert!((kpc[0] - 1.0).abs() < 1e-12);
        assert!((kpc[2] - 6.0).abs() < 1e-12);
    }

    #[test]
    fn test_assemble_places_blocks() {
        let grid = GridShape::new(2, 1, 2);
        let snapshot = Snapshot {
            header: header(grid, GridShape::new(2, 1, 1)),
            velocity_z: vec![1.0, 2.0, 3.0, 4.0],
            temperature: vec![1.0e4; 4],
            number_density: vec![1.0e6; 4],
            neutral_fraction: vec![0.5; 4],
        };

        let primary = snapshot.assemble().unwrap();
        assert_eq!(primary.velocity_z.get(0, 0, 1), Some(&2.0));
        assert_eq!(primary.velocity_z.get(1, 0, 0), Some(&3.0));
        assert_eq!(primary.shape().unwrap(), grid);
    }

    #[test]
    fn test_assemble_rejects_short_dataset() {
        let snapshot = Snapshot {
            header: header(GridShape::new(2, 2, 2), GridShape::new(1, 1, 1)),
            velocity_z: vec![0.0; 8],
            temperature: vec![0.0; 7],
            number_density: vec![0.0; 8],
            neutral_fraction: vec![0.0; 8],
        };
        match snapshot.assemble() {
            Err(LoadError::InvalidData(msg)) => assert!(msg.contains("Temperature")),
            other => panic!("Expected InvalidData, got {other:?}"),
        }
    }

    #[test]
    fn test_assemble_rejects_indivisible_layout() {
        let snapshot = Snapshot {
            header: header(GridShape::new(5, 4, 4), GridShape::new(2, 2, 2)),
            velocity_z: vec![0.0; 80],
            temperature: vec![0.0; 80],
            number_density: vec![0.0; 80],
            neutral_fraction: vec![0.0; 80],
        };
        assert!(matches!(snapshot.assemble(), Err(LoadError::Grid(_))));
    }

    #[test]
    fn test_validate_rejects_overflowing_header() {
        // e.g. "[10000000000, 10000000000, 10000000000]" on a 64-bit host
        let huge = usize::MAX / 2;
        let snapshot = Snapshot {
            header: header(GridShape::new(huge, 3, 1), GridShape::new(1, 1, 1)),
            velocity_z: Vec::new(),
            temperature: Vec::new(),
            number_density: Vec::new(),
            neutral_fraction: Vec::new(),
        };
        assert!(matches!(
            snapshot.validate(),
            Err(LoadError::Grid(MorphError::GridTooLarge { .. }))
        ));
    }
}
