use phf::{Map, phf_map};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Per-type UFF constants, in the column order of the published table:
/// r1, theta0, x1, D1, zeta, Z1, Vi, Uj, Xi, hardness, radius.
static BUILTIN_UFF: Map<&'static str, [f64; 11]> = phf_map! {
    "H_" => [0.354, 180.0, 2.886, 0.044, 12.0, 0.712, 0.0, 0.0, 4.528, 6.9452, 0.371],
    "H_b" => [0.460, 83.5, 2.886, 0.044, 12.0, 0.712, 0.0, 0.0, 4.528, 6.9452, 0.371],
    "He4+4" => [0.849, 90.0, 2.362, 0.056, 15.24, 0.098, 0.0, 0.0, 9.66, 14.92, 1.3],
    "Li" => [1.336, 180.0, 2.451, 0.025, 12.0, 1.026, 0.0, 2.0, 3.006, 2.386, 1.557],
    "Be3+2" => [1.074, 109.47, 2.745, 0.085, 12.0, 1.565, 0.0, 2.0, 4.877, 4.443, 1.24],
    "B_3" => [0.838, 109.47, 4.083, 0.18, 12.052, 1.755, 0.0, 2.0, 5.11, 4.75, 0.822],
    "B_2" => [0.828, 120.0, 4.083, 0.18, 12.052, 1.755, 0.0, 2.0, 5.11, 4.75, 0.822],
    "C_3" => [0.757, 109.47, 3.851, 0.105, 12.73, 1.912, 2.119, 2.0, 5.343, 5.063, 0.759],
    "C_R" => [0.729, 120.0, 3.851, 0.105, 12.73, 1.912, 0.0, 2.0, 5.343, 5.063, 0.759],
    "C_2" => [0.732, 120.0, 3.851, 0.105, 12.73, 1.912, 0.0, 2.0, 5.343, 5.063, 0.759],
    "C_1" => [0.706, 180.0, 3.851, 0.105, 12.73, 1.912, 0.0, 2.0, 5.343, 5.063, 0.759],
    "N_3" => [0.700, 106.7, 3.66, 0.069, 13.407, 2.544, 0.45, 2.0, 6.899, 5.88, 0.715],
    "N_R" => [0.699, 120.0, 3.66, 0.069, 13.407, 2.544, 0.0, 2.0, 6.899, 5.88, 0.715],
    "N_2" => [0.685, 111.2, 3.66, 0.069, 13.407, 2.544, 0.0, 2.0, 6.899, 5.88, 0.715],
    "N_1" => [0.656, 180.0, 3.66, 0.069, 13.407, 2.544, 0.0, 2.0, 6.899, 5.88, 0.715],
    "O_3" => [0.658, 104.51, 3.5, 0.06, 14.085, 2.3, 0.018, 2.0, 8.741, 6.682, 0.669],
    "O_3_z" => [0.528, 146.0, 3.5, 0.06, 14.085, 2.3, 0.018, 2.0, 8.741, 6.682, 0.669],
    "O_R" => [0.680, 110.0, 3.5, 0.06, 14.085, 2.3, 0.0, 2.0, 8.741, 6.682, 0.669],
    "O_2" => [0.634, 120.0, 3.5, 0.06, 14.085, 2.3, 0.0, 2.0, 8.741, 6.682, 0.669],
    "O_1" => [0.639, 180.0, 3.5, 0.06, 14.085, 2.3, 0.0, 2.0, 8.741, 6.682, 0.669],
    "F_" => [0.668, 180.0, 3.364, 0.05, 14.762, 1.735, 0.0, 2.0, 10.874, 7.474, 0.706],
    "Ne4+4" => [0.920, 90.0, 3.243, 0.042, 15.44, 0.194, 0.0, 2.0, 11.04, 10.55, 1.768],
    "Na" => [1.539, 180.0, 2.983, 0.03, 12.0, 1.081, 0.0, 1.25, 2.843, 2.296, 2.085],
    "Mg3+2" => [1.421, 109.47, 3.021, 0.111, 12.0, 1.787, 0.0, 1.25, 3.951, 3.693, 1.5],
    "Al3" => [1.244, 109.47, 4.499, 0.505, 11.278, 1.792, 0.0, 1.25, 4.06, 3.59, 1.201],
    "Si3" => [1.117, 109.47, 4.295, 0.402, 12.175, 2.323, 1.225, 1.25, 4.168, 3.487, 1.176],
    "P_3+3" => [1.101, 93.8, 4.147, 0.305, 13.072, 2.863, 2.4, 1.25, 5.463, 4.0, 1.102],
    "P_3+5" => [1.056, 109.47, 4.147, 0.305, 13.072, 2.863, 2.4, 1.25, 5.463, 4.0, 1.102],
    "P_3+q" => [1.056, 109.47, 4.147, 0.305, 13.072, 2.863, 2.4, 1.25, 5.463, 4.0, 1.102],
    "S_3+2" => [1.064, 92.1, 4.035, 0.274, 13.969, 2.703, 0.484, 1.25, 6.928, 4.486, 1.047],
    "S_3+4" => [1.049, 103.2, 4.035, 0.274, 13.969, 2.703, 0.484, 1.25, 6.928, 4.486, 1.047],
    "S_3+6" => [1.027, 109.47, 4.035, 0.274, 13.969, 2.703, 0.484, 1.25, 6.928, 4.486, 1.047],
    "S_R" => [1.077, 92.2, 4.035, 0.274, 13.969, 2.703, 0.0, 1.25, 6.928, 4.486, 1.047],
    "S_2" => [0.854, 120.0, 4.035, 0.274, 13.969, 2.703, 0.0, 1.25, 6.928, 4.486, 1.047],
    "Cl" => [1.044, 180.0, 3.947, 0.227, 14.866, 2.348, 0.0, 1.25, 8.564, 4.946, 0.994],
    "Ar4+4" => [1.032, 90.0, 3.868, 0.185, 15.763, 0.3, 0.0, 1.25, 9.465, 6.355, 2.108],
    "K_" => [1.953, 180.0, 3.812, 0.035, 12.0, 1.165, 0.0, 0.7, 2.421, 1.92, 2.586],
    "Ca6+2" => [1.761, 90.0, 3.399, 0.238, 12.0, 2.141, 0.0, 0.7, 3.231, 2.88, 2.0],
    "Ga3+3" => [1.260, 109.47, 4.383, 0.415, 11.0, 2.999, 0.0, 0.7, 3.641, 3.868, 1.26],
    "Ge3" => [1.197, 109.47, 4.28, 0.379, 12.0, 2.912, 0.701, 0.7, 4.051, 3.9, 1.197],
    "As3+3" => [1.211, 92.1, 4.23, 0.309, 13.0, 3.076, 1.5, 0.7, 5.188, 4.5, 1.211],
    "Se3+2" => [1.190, 90.6, 4.205, 0.291, 14.0, 3.07, 0.335, 0.7, 6.428, 4.5, 1.19],
    "Br" => [1.192, 180.0, 4.189, 0.251, 15.0, 3.04, 0.0, 0.7, 7.79, 5.2, 1.192],
    "Sn3" => [1.398, 109.47, 4.392, 0.567, 12.0, 3.304, 0.199, 0.2, 3.987, 3.0, 1.398],
    "Sb3+3" => [1.407, 91.6, 4.42, 0.449, 13.0, 3.342, 1.1, 0.2, 4.899, 3.8, 1.407],
    "Te3+2" => [1.386, 90.25, 4.47, 0.398, 14.0, 3.37, 0.3, 0.2, 5.816, 4.2, 1.386],
    "I_" => [1.382, 180.0, 4.5, 0.339, 15.0, 2.65, 0.0, 0.2, 6.822, 4.6, 1.382],
    "Bi3+3" => [1.512, 90.0, 4.37, 0.518, 13.0, 3.728, 1.0, 0.1, 4.893, 3.5, 1.512],
    "Po3+2" => [1.50, 90.0, 4.709, 0.325, 14.0, 3.4, 0.3, 0.1, 4.883, 3.8, 1.50],
};

/// Constants of one UFF atom type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UffParam {
    /// Valence bond radius (Å).
    pub r1: f64,
    /// Natural valence angle (degrees).
    pub theta0: f64,
    /// Non-bonded distance (Å).
    pub x1: f64,
    /// Non-bonded well depth (kcal/mol).
    pub d1: f64,
    pub zeta: f64,
    /// Effective charge.
    pub z1: f64,
    /// sp3 torsional barrier.
    pub vi: f64,
    /// sp2 torsional barrier.
    pub uj: f64,
    /// GMP electronegativity.
    pub xi: f64,
    pub hardness: f64,
    pub radius: f64,
    /// Coordination class derived from the type label.
    pub coordination: u8,
}

impl UffParam {
    fn from_row(label: &str, row: &[f64; 11]) -> Self {
        Self {
            r1: row[0],
            theta0: row[1],
            x1: row[2],
            d1: row[3],
            zeta: row[4],
            z1: row[5],
            vi: row[6],
            uj: row[7],
            xi: row[8],
            hardness: row[9],
            radius: row[10],
            coordination: coordination_class(label),
        }
    }
}

/// Derives the coordination class from the third character of a UFF type label:
/// `1` linear, `2`/`R` trigonal, `3` tetrahedral, `4` square planar,
/// `5` trigonal bipyramidal, `6` octahedral, `7` pentagonal bipyramidal.
/// Labels without a recognized third character map to 1.
pub fn coordination_class(label: &str) -> u8 {
    match label.as_bytes().get(2) {
        Some(b'2') | Some(b'R') => 2,
        Some(b'3') => 3,
        Some(b'4') => 4,
        Some(b'5') => 5,
        Some(b'6') => 6,
        Some(b'7') => 7,
        _ => 1,
    }
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParameterError {
    #[error("No force field parameters for atom type '{atom_type}'")]
    MissingParameter { atom_type: String },
}

#[derive(Debug, Error)]
pub enum ParamLoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("CSV parsing error for '{path}': {source}")]
    Csv { path: String, source: csv::Error },
}

#[derive(Debug, Deserialize)]
struct ParamRecord {
    #[serde(rename = "type")]
    atom_type: String,
    r1: f64,
    theta0: f64,
    x1: f64,
    d1: f64,
    zeta: f64,
    z1: f64,
    vi: f64,
    uj: f64,
    xi: f64,
    hard: f64,
    radius: f64,
}

/// Lookup table from type label to [`UffParam`].
#[derive(Debug, Clone, Default)]
pub struct ParameterStore {
    params: HashMap<String, UffParam>,
}

impl ParameterStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The compiled-in UFF table.
    pub fn builtin() -> Self {
        let params = BUILTIN_UFF
            .entries()
            .map(|(label, row)| (label.to_string(), UffParam::from_row(label, row)))
            .collect();
        Self { params }
    }

    /// Loads a CSV table with the header
    /// `type,r1,theta0,x1,d1,zeta,z1,vi,uj,xi,hard,radius`.
    pub fn load(path: &Path) -> Result<Self, ParamLoadError> {
        let file = std::fs::File::open(path).map_err(|e| ParamLoadError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .comment(Some(b'#'))
            .from_reader(file);

        let mut store = Self::new();
        for result in reader.deserialize::<ParamRecord>() {
            let record = result.map_err(|e| ParamLoadError::Csv {
                path: path.to_string_lossy().to_string(),
                source: e,
            })?;
            let row = [
                record.r1,
                record.theta0,
                record.x1,
                record.d1,
                record.zeta,
                record.z1,
                record.vi,
                record.uj,
                record.xi,
                record.hard,
                record.radius,
            ];
            store.insert(&record.atom_type, UffParam::from_row(&record.atom_type, &row));
        }
        Ok(store)
    }

    pub fn insert(&mut self, label: &str, param: UffParam) {
        self.params.insert(label.to_string(), param);
    }

    pub fn get(&self, label: &str) -> Result<&UffParam, ParameterError> {
        self.params
            .get(label)
            .ok_or_else(|| ParameterError::MissingParameter {
                atom_type: label.to_string(),
            })
    }

    pub fn contains(&self, label: &str) -> bool {
        self.params.contains_key(label)
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}
