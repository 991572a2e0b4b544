//! Reader for the HDF5 snapshots written by the radiation hydrodynamics code.

use crate::formats::SnapshotFormat;
use crate::literal::parse_triple_literal;
use crate::{LoadError, Snapshot, SnapshotHeader};
use hdf5::types::{FixedAscii, FixedUnicode, TypeDescriptor, VarLenAscii, VarLenUnicode};
use hdf5::{Attribute, Group};
use std::path::Path;

const HEADER_GROUP: &str = "Header";
const PARAMETERS_GROUP: &str = "Parameters";
const GAS_GROUP: &str = "PartType0";

const BOX_SIZE_ATTR: &str = "BoxSize";
const GRID_CELLS_ATTR: &str = "DensityGrid:number of cells";
const SUBGRIDS_ATTR: &str = "DensitySubGridCreator:number of subgrids";

/// Longest fixed-length string attribute accepted.
const MAX_FIXED_STRING: usize = 1024;

const VELOCITIES: &str = "Velocities";
const TEMPERATURE: &str = "Temperature";
const NUMBER_DENSITY: &str = "NumberDensity";
const NEUTRAL_FRACTION: &str = "NeutralFractionH";

/// Reads `.hdf5` / `.h5` snapshots.
#[derive(Debug, Clone, Copy, Default)]
pub struct Hdf5Format;

impl Hdf5Format {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl SnapshotFormat for Hdf5Format {
    fn read(&self, path: &Path) -> Result<Snapshot, LoadError> {
        let file = hdf5::File::open(path)?;

        let header = read_header(&file)?;
        log::debug!(
            "{:?}: grid {}, subgrids {}, box {:?} m",
            path,
            header.grid,
            header.subgrids,
            header.box_size
        );

        let gas = open_group(&file, GAS_GROUP)?;
        let velocity_z = read_velocity_z(&gas)?;
        let temperature = read_dataset(&gas, TEMPERATURE)?;
        let number_density = read_dataset(&gas, NUMBER_DENSITY)?;
        let neutral_fraction = read_dataset(&gas, NEUTRAL_FRACTION)?;

        let snapshot = Snapshot {
            header,
            velocity_z,
            temperature,
            number_density,
            neutral_fraction,
        };
        snapshot.validate()?;
        Ok(snapshot)
    }

    fn format_name(&self) -> &'static str {
        "HDF5"
    }

    fn supported_extensions(&self) -> &'static [&'static str] {
        &["hdf5", "h5"]
    }
}

fn read_header(file: &hdf5::File) -> Result<SnapshotHeader, LoadError> {
    let header = open_group(file, HEADER_GROUP)?;
    let box_size = open_attr(&header, BOX_SIZE_ATTR)?.read_raw::<f64>()?;
    let box_size: [f64; 3] = box_size.as_slice().try_into().map_err(|_| {
        LoadError::InvalidData(format!(
            "{BOX_SIZE_ATTR} must hold 3 values, found {}",
            box_size.len()
        ))
    })?;

    let parameters = open_group(file, PARAMETERS_GROUP)?;
    let grid = parse_triple_literal(&read_string_attr(&parameters, GRID_CELLS_ATTR)?)?;
    let subgrids = parse_triple_literal(&read_string_attr(&parameters, SUBGRIDS_ATTR)?)?;

    Ok(SnapshotHeader {
        box_size,
        grid,
        subgrids,
    })
}

fn open_group(parent: &Group, name: &str) -> Result<Group, LoadError> {
    if !parent.link_exists(name) {
        return Err(LoadError::MissingItem {
            kind: "group",
            name: name.to_owned(),
        });
    }
    Ok(parent.group(name)?)
}

fn open_attr(group: &Group, name: &str) -> Result<Attribute, LoadError> {
    if !group.attr_names()?.iter().any(|attr| attr == name) {
        return Err(LoadError::MissingItem {
            kind: "attribute",
            name: name.to_owned(),
        });
    }
    Ok(group.attr(name)?)
}

/// String attributes are written either variable-length or fixed-length,
/// the latter NUL- or space-padded.
fn read_string_attr(group: &Group, name: &str) -> Result<String, LoadError> {
    let attr = open_attr(group, name)?;
    let values: Vec<String> = match attr.dtype()?.to_descriptor()? {
        TypeDescriptor::VarLenUnicode => attr
            .read_raw::<VarLenUnicode>()?
            .iter()
            .map(|v| v.as_str().to_owned())
            .collect(),
        TypeDescriptor::VarLenAscii => attr
            .read_raw::<VarLenAscii>()?
            .iter()
            .map(|v| v.as_str().to_owned())
            .collect(),
        TypeDescriptor::FixedAscii(len) if len <= MAX_FIXED_STRING => attr
            .read_raw::<FixedAscii<MAX_FIXED_STRING>>()?
            .iter()
            .map(|v| v.as_str().to_owned())
            .collect(),
        TypeDescriptor::FixedUnicode(len) if len <= MAX_FIXED_STRING => attr
            .read_raw::<FixedUnicode<MAX_FIXED_STRING>>()?
            .iter()
            .map(|v| v.as_str().to_owned())
            .collect(),
        other => {
            return Err(LoadError::InvalidData(format!(
                "Attribute '{name}' is not a supported string type ({other:?})"
            )))
        }
    };
    values
        .into_iter()
        .next()
        .map(|value| value.trim_end_matches('\0').trim().to_owned())
        .ok_or_else(|| LoadError::InvalidData(format!("Attribute '{name}' holds no value")))
}

fn read_dataset(group: &Group, name: &str) -> Result<Vec<f64>, LoadError> {
    if !group.link_exists(name) {
        return Err(LoadError::MissingItem {
            kind: "dataset",
            name: name.to_owned(),
        });
    }
    Ok(group.dataset(name)?.read_raw::<f64>()?)
}

/// Extracts the z column of the N x 3 velocity dataset.
fn read_velocity_z(group: &Group) -> Result<Vec<f64>, LoadError> {
    let shape = if group.link_exists(VELOCITIES) {
        group.dataset(VELOCITIES)?.shape()
    } else {
        Vec::new()
    };
    if shape.len() != 2 || shape[1] != 3 {
        if shape.is_empty() {
            return Err(LoadError::MissingItem {
                kind: "dataset",
                name: VELOCITIES.to_owned(),
            });
        }
        return Err(LoadError::InvalidData(format!(
            "{VELOCITIES} must have shape (N, 3), found {shape:?}"
        )));
    }
    let raw = read_dataset(group, VELOCITIES)?;
    Ok(raw.chunks_exact(3).map(|v| v[2]).collect())
}
