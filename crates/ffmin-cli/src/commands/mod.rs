pub mod energy;
pub mod minimize;
pub mod validate;

use crate::error::{CliError, Result};
use ffmin::core::io::bgf::{BgfFile, BgfMetadata};
use ffmin::core::io::traits::MolecularFile;
use ffmin::core::models::groups::AtomGroups;
use ffmin::core::models::molecule::Molecule;
use std::path::Path;
use tracing::info;

fn load_structure(path: &Path) -> Result<(Molecule, BgfMetadata)> {
    info!("Loading input structure from {:?}", path);
    let (molecule, metadata) = BgfFile::read_from_path(path).map_err(|e| CliError::FileParsing {
        path: path.to_path_buf(),
        source: e.into(),
    })?;
    info!(
        atoms = molecule.atom_count(),
        bonds = molecule.bonds().len(),
        "Structure loaded"
    );
    Ok((molecule, metadata))
}

fn load_groups(path: Option<&Path>) -> Result<AtomGroups> {
    let Some(path) = path else {
        return Ok(AtomGroups::new());
    };
    info!("Loading atom groups from {:?}", path);
    AtomGroups::load(path).map_err(|e| CliError::FileParsing {
        path: path.to_path_buf(),
        source: e.into(),
    })
}
