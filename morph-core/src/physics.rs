//! Derived physical quantities.
//!
//! Inputs arrive in SI units straight from the snapshot. Outputs use the
//! units the plots are labelled in: km/s for velocities, cm^-3 for number
//! densities and cm^3/s for the recombination coefficient.

use crate::grid::{GridShape, ScalarGrid};
use crate::MorphError;
use ndarray::{s, Zip};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Parsec in metres.
pub const PC: f64 = 3.085_677_581_491_367e16;
/// Kiloparsec in metres.
pub const KPC: f64 = PC * 1.0e3;

/// m/s per km/s.
const METRES_PER_KM: f64 = 1.0e3;
/// cm^-3 per m^-3.
const CUBIC_CM_PER_CUBIC_M: f64 = 1.0e6;

/// Case B hydrogen recombination coefficient in cm^3/s.
///
/// `alpha(T) = 1.17e-13 * T^(-0.942 - 0.030 ln T)`
#[must_use]
pub fn recombination_coefficient(temperature: f64) -> f64 {
    1.17e-13 * temperature.powf(-0.942 - 0.030 * temperature.ln())
}

/// H-alpha emission of one cell.
///
/// `n_total` is in cm^-3, `pixel_size` is the cell edge in metres.
#[must_use]
pub fn h_alpha_emission(
    temperature: f64,
    n_total: f64,
    neutral_fraction: f64,
    pixel_size: f64,
) -> f64 {
    let n_ionized = (1.0 - neutral_fraction) * n_total;
    recombination_coefficient(temperature) * n_ionized * n_ionized / (4.0 * PI)
        * pixel_size.powi(3)
}

#[must_use]
pub fn velocity_to_km_per_s(velocity: f64) -> f64 {
    velocity / METRES_PER_KM
}

#[must_use]
pub fn number_density_to_cgs(number_density: f64) -> f64 {
    number_density / CUBIC_CM_PER_CUBIC_M
}

/// Negates the velocity of every cell below the mid-plane (z < nz / 2).
pub fn correct_velocity_sign(velocity: &mut ScalarGrid) {
    let half = velocity.shape().nz / 2;
    velocity
        .view_mut()
        .slice_mut(s![.., .., ..half])
        .mapv_inplace(|v| -v);
}

/// Reassembled fields as stored in the snapshot (SI units).
#[derive(Debug, Clone)]
pub struct PrimaryGrids {
    /// z component of the gas velocity, m/s.
    pub velocity_z: ScalarGrid,
    /// Gas temperature, K.
    pub temperature: ScalarGrid,
    /// Total hydrogen number density, m^-3.
    pub number_density: ScalarGrid,
    /// Neutral hydrogen fraction, dimensionless.
    pub neutral_fraction: ScalarGrid,
}

impl PrimaryGrids {
    /// Shape shared by every field.
    ///
    /// # Errors
    /// Returns [`MorphError::ShapeMismatch`] if the fields disagree.
    pub fn shape(&self) -> Result<GridShape, MorphError> {
        self.velocity_z.ensure_same_shape(&self.temperature)?;
        self.velocity_z.ensure_same_shape(&self.number_density)?;
        self.velocity_z.ensure_same_shape(&self.neutral_fraction)?;
        Ok(self.velocity_z.shape())
    }
}

/// Every field that can be put on a panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum DerivedField {
    VelocityZ,
    Temperature,
    NumberDensity,
    NeutralFraction,
    HAlpha,
    NeutralHydrogen,
    IonizedHydrogen,
}

impl DerivedField {
    pub const ALL: [Self; 7] = [
        Self::VelocityZ,
        Self::Temperature,
        Self::NumberDensity,
        Self::NeutralFraction,
        Self::HAlpha,
        Self::NeutralHydrogen,
        Self::IonizedHydrogen,
    ];

    /// Stable snake_case name, used in logs and the statistics file.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::VelocityZ => "velocity_z",
            Self::Temperature => "temperature",
            Self::NumberDensity => "number_density",
            Self::NeutralFraction => "neutral_fraction",
            Self::HAlpha => "h_alpha",
            Self::NeutralHydrogen => "neutral_hydrogen",
            Self::IonizedHydrogen => "ionized_hydrogen",
        }
    }
}

impl std::fmt::Display for DerivedField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Fields in plotting units, ready for projection.
#[derive(Debug, Clone)]
pub struct DerivedGrids {
    /// km/s, sign corrected below the mid-plane.
    pub velocity_z: ScalarGrid,
    /// K.
    pub temperature: ScalarGrid,
    /// cm^-3.
    pub number_density: ScalarGrid,
    pub neutral_fraction: ScalarGrid,
    pub h_alpha: ScalarGrid,
    /// cm^-3.
    pub neutral_hydrogen: ScalarGrid,
    /// cm^-3.
    pub ionized_hydrogen: ScalarGrid,
}

impl DerivedGrids {
    /// Converts the primary fields and computes the secondary ones.
    ///
    /// `pixel_size` is the cell edge length in metres.
    ///
    /// # Errors
    /// Returns [`MorphError::ShapeMismatch`] if the primary fields disagree in shape.
    pub fn from_primary(primary: PrimaryGrids, pixel_size: f64) -> Result<Self, MorphError> {
        let shape = primary.shape()?;
        let PrimaryGrids {
            mut velocity_z,
            temperature,
            mut number_density,
            neutral_fraction,
        } = primary;

        velocity_z.data.par_mapv_inplace(velocity_to_km_per_s);
        correct_velocity_sign(&mut velocity_z);
        number_density.data.par_mapv_inplace(number_density_to_cgs);

        let inputs = Zip::from(&temperature.data)
            .and(&number_density.data)
            .and(&neutral_fraction.data);
        let h_alpha = ScalarGrid::from(
            inputs
                .clone()
                .par_map_collect(|&t, &n, &nf| h_alpha_emission(t, n, nf, pixel_size)),
        );
        let neutral_hydrogen =
            ScalarGrid::from(inputs.clone().par_map_collect(|_, &n, &nf| n * nf));
        let ionized_hydrogen =
            ScalarGrid::from(inputs.par_map_collect(|_, &n, &nf| n * (1.0 - nf)));

        log::debug!("Derived fields computed for a {} grid", shape);

        Ok(Self {
            velocity_z,
            temperature,
            number_density,
            neutral_fraction,
            h_alpha,
            neutral_hydrogen,
            ionized_hydrogen,
        })
    }

    #[must_use]
    pub const fn field(&self, kind: DerivedField) -> &ScalarGrid {
        match kind {
            DerivedField::VelocityZ => &self.velocity_z,
            DerivedField::Temperature => &self.temperature,
            DerivedField::NumberDensity => &self.number_density,
            DerivedField::NeutralFraction => &self.neutral_fraction,
            DerivedField::HAlpha => &self.h_alpha,
            DerivedField::NeutralHydrogen => &self.neutral_hydrogen,
            DerivedField::IonizedHydrogen => &self.ionized_hydrogen,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    fn uniform(shape: GridShape, value: f64) -> ScalarGrid {
        ScalarGrid::from_vec(shape, vec![value; shape.volume()]).unwrap()
    }

    #[test]
    fn test_recombination_coefficient_at_ten_thousand_kelvin() {
        let alpha = recombination_coefficient(1.0e4);
        assert!((alpha / 1.5666e-18 - 1.0).abs() < 1e-3, "alpha = {alpha:e}");
        // Falls with temperature.
        assert!(recombination_coefficient(100.0) > alpha);
    }

    #[test]
    fn test_fully_neutral_gas_has_no_h_alpha() {
        assert!(h_alpha_emission(8000.0, 1.0, 1.0, 1.0e17).abs() < EPS);
    }

    #[test]
    fn test_h_alpha_scales_with_density_squared() {
        let single = h_alpha_emission(1.0e4, 1.0, 0.0, 1.0);
        let double = h_alpha_emission(1.0e4, 2.0, 0.0, 1.0);
        assert!((double / single - 4.0).abs() < 1e-9);
    }

    #[test]
    fn test_velocity_sign_flips_lower_half_only() {
        let shape = GridShape::new(1, 2, 5);
        let mut velocity = uniform(shape, 2.0);
        correct_velocity_sign(&mut velocity);
        for y in 0..2 {
            for z in 0..5 {
                let expected = if z < 2 { -2.0 } else { 2.0 };
                assert_eq!(velocity.get(0, y, z), Some(&expected), "cell (0,{y},{z})");
            }
        }
    }

    #[test]
    fn test_derived_grids_from_primary() {
        let shape = GridShape::new(2, 2, 2);
        let primary = PrimaryGrids {
            velocity_z: uniform(shape, 3000.0),
            temperature: uniform(shape, 1.0e4),
            number_density: uniform(shape, 2.0e6),
            neutral_fraction: uniform(shape, 0.25),
        };

        let derived = DerivedGrids::from_primary(primary, 1.0).unwrap();

        assert_eq!(derived.velocity_z.get(0, 0, 0), Some(&-3.0));
        assert_eq!(derived.velocity_z.get(0, 0, 1), Some(&3.0));
        assert_eq!(derived.number_density.get(1, 1, 1), Some(&2.0));
        assert!((derived.neutral_hydrogen.get(1, 0, 1).unwrap() - 0.5).abs() < EPS);
        assert!((derived.ionized_hydrogen.get(1, 0, 1).unwrap() - 1.5).abs() < EPS);

        let expected_h_alpha = recombination_coefficient(1.0e4) * 1.5 * 1.5 / (4.0 * PI);
        let h_alpha = *derived.field(DerivedField::HAlpha).get(0, 1, 0).unwrap();
        assert!((h_alpha - expected_h_alpha).abs() < 1e-25);
    }

    #[test]
    fn test_derived_grids_reject_mismatched_shapes() {
        let shape = GridShape::new(2, 2, 2);
        let primary = PrimaryGrids {
            velocity_z: uniform(shape, 0.0),
            temperature: uniform(GridShape::new(2, 2, 4), 1.0e4),
            number_density: uniform(shape, 1.0),
            neutral_fraction: uniform(shape, 0.5),
        };
        assert!(matches!(
            DerivedGrids::from_primary(primary, 1.0),
            Err(MorphError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_field_names_are_unique() {
        let mut names: Vec<_> = DerivedField::ALL.iter().map(|f| f.name()).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), DerivedField::ALL.len());
    }
}
