use crate::core::io::traits::MolecularFile;
use crate::core::models::atom::Atom;
use crate::core::models::molecule::{Molecule, MoleculeError};
use crate::core::models::topology::{Bond, BondOrder};
use nalgebra::Point3;
use phf::{Map, phf_map};
use std::collections::{BTreeMap, HashMap};
use std::io::{self, BufRead, Write};
use thiserror::Error;

static ELEMENT_SYMBOLS: Map<&'static str, u8> = phf_map! {
    "H" => 1, "He" => 2, "Li" => 3, "Be" => 4, "B" => 5, "C" => 6, "N" => 7, "O" => 8,
    "F" => 9, "Ne" => 10, "Na" => 11, "Mg" => 12, "Al" => 13, "Si" => 14, "P" => 15,
    "S" => 16, "Cl" => 17, "Ar" => 18, "K" => 19, "Ca" => 20, "Sc" => 21, "Ti" => 22,
    "V" => 23, "Cr" => 24, "Mn" => 25, "Fe" => 26, "Co" => 27, "Ni" => 28, "Cu" => 29,
    "Zn" => 30, "Ga" => 31, "Ge" => 32, "As" => 33, "Se" => 34, "Br" => 35, "Kr" => 36,
    "Rb" => 37, "Sr" => 38, "Y" => 39, "Zr" => 40, "Nb" => 41, "Mo" => 42, "Tc" => 43,
    "Ru" => 44, "Rh" => 45, "Pd" => 46, "Ag" => 47, "Cd" => 48, "In" => 49, "Sn" => 50,
    "Sb" => 51, "Te" => 52, "I" => 53, "Xe" => 54, "Cs" => 55, "Ba" => 56, "La" => 57,
    "Hf" => 72, "Ta" => 73, "W" => 74, "Re" => 75, "Os" => 76, "Ir" => 77, "Pt" => 78,
    "Au" => 79, "Hg" => 80, "Tl" => 81, "Pb" => 82, "Bi" => 83, "Po" => 84, "At" => 85,
    "Rn" => 86,
};

/// Atomic number encoded in the element prefix of a force field type label,
/// e.g. `C_R` → 6, `Cl` → 17, `Fe3+2` → 26.
pub fn element_from_type_label(label: &str) -> Option<u8> {
    let letters: String = label
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .take(2)
        .collect();
    let mut chars = letters.chars();
    let first = chars.next()?.to_ascii_uppercase();
    if let Some(second) = chars.next() {
        let symbol: String = [first, second.to_ascii_lowercase()].iter().collect();
        if let Some(&z) = ELEMENT_SYMBOLS.get(symbol.as_str()) {
            return Some(z);
        }
    }
    ELEMENT_SYMBOLS.get(first.to_string().as_str()).copied()
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct RawLine {
    pub content: String,
}

/// The per-atom record fields the molecular graph does not keep.
#[derive(Debug, Clone, PartialEq)]
pub struct BgfAtomIoData {
    pub serial: usize,
    pub hetero: bool,
    pub residue_name: String,
    pub chain_id: char,
    pub residue_id: isize,
    pub raw_suffix: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BgfMetadata {
    pub header_lines: BTreeMap<usize, RawLine>,
    /// Keyed by 0-based atom index.
    pub atom_io_data: HashMap<usize, BgfAtomIoData>,
    pub format_lines: Vec<String>,
}

#[derive(Debug, Error)]
pub enum BgfError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Parse error on line {line}: {kind}")]
    Parse {
        line: usize,
        kind: BgfParseErrorKind,
    },
    #[error("Inconsistent data: {0}")]
    Inconsistency(String),
    #[error("Missing required record: {0}")]
    MissingRecord(String),
    #[error("Invalid molecular graph: {0}")]
    Molecule(#[from] MoleculeError),
}

#[derive(Debug, Error)]
pub enum BgfParseErrorKind {
    #[error("Invalid integer format in columns {columns} (value: '{value}')")]
    InvalidInt { columns: String, value: String },
    #[error("Invalid float format in columns {columns} (value: '{value}')")]
    InvalidFloat { columns: String, value: String },
    #[error("Required field in columns {columns} is empty")]
    MissingRequiredField { columns: String },
    #[error("Line is too short for ATOM/HETATM record (must be at least 80 chars)")]
    LineTooShort,
    #[error("CONECT line requires at least two atoms")]
    InvalidConectFormat,
    #[error("Invalid bond order '{value}'")]
    InvalidBondOrder { value: String },
    #[error("Cannot derive an element from force field type '{label}'")]
    UnknownElement { label: String },
}

fn slice_and_trim(line: &str, start: usize, end: usize) -> &str {
    line.get(start..end).unwrap_or("").trim()
}

fn parse_int<T: std::str::FromStr>(
    value: &str,
    line: usize,
    columns: &str,
) -> Result<T, BgfError> {
    value.parse().map_err(|_| BgfError::Parse {
        line,
        kind: BgfParseErrorKind::InvalidInt {
            columns: columns.into(),
            value: value.into(),
        },
    })
}

fn parse_float(value: &str, line: usize, columns: &str) -> Result<f64, BgfError> {
    value.parse().map_err(|_| BgfError::Parse {
        line,
        kind: BgfParseErrorKind::InvalidFloat {
            columns: columns.into(),
            value: value.into(),
        },
    })
}

fn required<'a>(value: &'a str, line: usize, columns: &str) -> Result<&'a str, BgfError> {
    if value.is_empty() {
        Err(BgfError::Parse {
            line,
            kind: BgfParseErrorKind::MissingRequiredField {
                columns: columns.into(),
            },
        })
    } else {
        Ok(value)
    }
}

fn order_label(order: BondOrder) -> &'static str {
    match order {
        BondOrder::Single => "1",
        BondOrder::Double => "2",
        BondOrder::Triple => "3",
        BondOrder::Aromatic => "ar",
    }
}

/// Biograf (BGF) reader and writer.
///
/// ATOM/HETATM records follow the fixed-column layout
/// `(a6,1x,i5,1x,a5,1x,a3,1x,a1,1x,a5,3f10.5,1x,a5,i3,i2,1x,f8.5)`. The element
/// of each atom is derived from its force field type label. `CONECT` lines list a
/// center serial followed by its partners; an `ORDER` line for the same center
/// gives the order of each listed partner in turn, with `ar` marking an aromatic
/// bond. Bonds without an order are single.
pub struct BgfFile;

impl MolecularFile for BgfFile {
    type Metadata = BgfMetadata;
    type Error = BgfError;

    fn read_from(reader: &mut impl BufRead) -> Result<(Molecule, Self::Metadata), Self::Error> {
        let mut molecule = Molecule::new();
        let mut metadata = BgfMetadata::default();
        let mut serial_to_index: HashMap<usize, usize> = HashMap::new();

        let mut conect: Vec<(usize, Vec<usize>)> = Vec::new();
        let mut orders: HashMap<usize, Vec<(usize, String)>> = HashMap::new();

        for (line_num, line_res) in reader.lines().enumerate() {
            let line = line_res?;
            let line_num = line_num + 1;

            let record_type = slice_and_trim(&line, 0, 6);
            if record_type.is_empty() {
                if !line.trim().is_empty() {
                    metadata
                        .header_lines
                        .insert(line_num, RawLine { content: line });
                }
                continue;
            }

            match record_type {
                "ATOM" | "HETATM" => {
                    if line.len() < 80 {
                        return Err(BgfError::Parse {
                            line: line_num,
                            kind: BgfParseErrorKind::LineTooShort,
                        });
                    }

                    let serial: usize =
                        parse_int(slice_and_trim(&line, 7, 12), line_num, "8-12")?;
                    let name = required(slice_and_trim(&line, 13, 18), line_num, "14-18")?;
                    let residue_name = slice_and_trim(&line, 19, 22);
                    let chain_id = slice_and_trim(&line, 23, 24).chars().next().unwrap_or('A');
                    let res_id_str = slice_and_trim(&line, 25, 30);
                    let residue_id: isize = if res_id_str.is_empty() {
                        0
                    } else {
                        parse_int(res_id_str, line_num, "26-30")?
                    };
                    let x = parse_float(slice_and_trim(&line, 30, 40), line_num, "31-40")?;
                    let y = parse_float(slice_and_trim(&line, 40, 50), line_num, "41-50")?;
                    let z = parse_float(slice_and_trim(&line, 50, 60), line_num, "51-60")?;
                    let ff_type = required(slice_and_trim(&line, 61, 66), line_num, "62-66")?;
                    let charge = parse_float(slice_and_trim(&line, 72, 80), line_num, "73-80")?;

                    let atomic_number =
                        element_from_type_label(ff_type).ok_or_else(|| BgfError::Parse {
                            line: line_num,
                            kind: BgfParseErrorKind::UnknownElement {
                                label: ff_type.into(),
                            },
                        })?;

                    if serial_to_index.contains_key(&serial) {
                        return Err(BgfError::Inconsistency(format!(
                            "Duplicate atom serial: {}",
                            serial
                        )));
                    }

                    let atom = Atom::new(molecule.atom_count(), atomic_number, ff_type)
                        .with_name(name)
                        .with_charge(charge);
                    let index = molecule.add_atom(atom, Point3::new(x, y, z));
                    serial_to_index.insert(serial, index);
                    metadata.atom_io_data.insert(
                        index,
                        BgfAtomIoData {
                            serial,
                            hetero: record_type == "HETATM",
                            residue_name: residue_name.to_string(),
                            chain_id,
                            residue_id,
                            raw_suffix: line.get(80..).unwrap_or("").to_string(),
                        },
                    );
                }
                "CONECT" | "ORDER" => {
                    let parts: Vec<&str> = line.split_whitespace().skip(1).collect();
                    if parts.len() < 2 {
                        if record_type == "CONECT" && parts.len() == 1 {
                            continue;
                        }
                        return Err(BgfError::Parse {
                            line: line_num,
                            kind: BgfParseErrorKind::InvalidConectFormat,
                        });
                    }
                    let center: usize = parse_int(parts[0], line_num, "CONECT")?;
                    if record_type == "CONECT" {
                        let partners = parts[1..]
                            .iter()
                            .map(|p| parse_int(p, line_num, "CONECT"))
                            .collect::<Result<Vec<usize>, _>>()?;
                        conect.push((center, partners));
                    } else {
                        let entry = orders.entry(center).or_default();
                        entry.extend(parts[1..].iter().map(|o| (line_num, o.to_string())));
                    }
                }
                "FORMAT" => metadata.format_lines.push(line.clone()),
                "END" => break,
                _ => {
                    metadata
                        .header_lines
                        .insert(line_num, RawLine { content: line.clone() });
                }
            }
        }

        if serial_to_index.is_empty() {
            return Err(BgfError::MissingRecord("ATOM/HETATM records".into()));
        }

        let resolve = |serial: usize| {
            serial_to_index.get(&serial).copied().ok_or_else(|| {
                BgfError::Inconsistency(format!("CONECT references unknown atom serial {}", serial))
            })
        };

        let mut bond_orders: BTreeMap<(usize, usize), BondOrder> = BTreeMap::new();
        for (center, partners) in conect {
            let a = resolve(center)?;
            let center_orders = orders.get(&center);
            for (slot, partner) in partners.into_iter().enumerate() {
                let b = resolve(partner)?;
                let order = match center_orders.and_then(|o| o.get(slot)) {
                    Some((line, value)) => value.parse::<BondOrder>().map_err(|_| BgfError::Parse {
                        line: *line,
                        kind: BgfParseErrorKind::InvalidBondOrder {
                            value: value.clone(),
                        },
                    })?,
                    None => BondOrder::Single,
                };
                let key = (a.min(b), a.max(b));
                bond_orders
                    .entry(key)
                    .and_modify(|existing| {
                        if *existing == BondOrder::Single {
                            *existing = order;
                        }
                    })
                    .or_insert(order);
            }
        }

        for ((a, b), order) in bond_orders {
            molecule.add_bond(Bond::new(a, b, order))?;
        }

        Ok((molecule, metadata))
    }

    fn write_to(
        molecule: &Molecule,
        metadata: &Self::Metadata,
        writer: &mut impl Write,
    ) -> Result<(), Self::Error> {
        for line in metadata.header_lines.values() {
            writeln!(writer, "{}", line.content)?;
        }
        for line in &metadata.format_lines {
            writeln!(writer, "{}", line)?;
        }

        let positions = molecule.positions();
        let mut serials = Vec::with_capacity(molecule.atom_count());
        for atom in molecule.atoms() {
            let io = metadata.atom_io_data.get(&atom.index);
            let serial = io.map_or(atom.index + 1, |d| d.serial);
            serials.push(serial);
            let position = positions.get(atom.index).ok_or_else(|| {
                BgfError::Inconsistency(format!("No position for atom index {}", atom.index))
            })?;

            let line = format!(
                "{:<6} {:>5} {:<5} {:>3} {:1} {:>5}{:>10.5}{:>10.5}{:>10.5} {:<5}{:>3}{:>2} {:>8.5}",
                if io.is_some_and(|d| d.hetero) { "HETATM" } else { "ATOM" },
                serial,
                atom.name,
                io.map_or("RES", |d| d.residue_name.as_str()),
                io.map_or('A', |d| d.chain_id),
                io.map_or(1, |d| d.residue_id),
                position.x,
                position.y,
                position.z,
                atom.force_field_type,
                molecule.neighbors(atom.index).len(),
                0,
                atom.partial_charge
            );
            let suffix = io.map_or("", |d| d.raw_suffix.as_str());
            writeln!(writer, "{}{}", line, suffix)?;
        }

        if !molecule.bonds().is_empty() {
            if !metadata.format_lines.iter().any(|l| l.contains("CONECT")) {
                writeln!(writer, "FORMAT CONECT (a6,12i6)")?;
            }
            for atom in molecule.atoms() {
                let neighbors = molecule.neighbors(atom.index);
                if neighbors.is_empty() {
                    continue;
                }
                write!(writer, "CONECT{:>6}", serials[atom.index])?;
                for &partner in neighbors {
                    write!(writer, "{:>6}", serials[partner])?;
                }
                writeln!(writer)?;

                let partner_orders: Vec<BondOrder> = neighbors
                    .iter()
                    .map(|&partner| {
                        molecule
                            .bond_between(atom.index, partner)
                            .map_or(BondOrder::Single, |bond| bond.order)
                    })
                    .collect();
                if partner_orders.iter().any(|o| *o != BondOrder::Single) {
                    write!(writer, "ORDER {:>6}", serials[atom.index])?;
                    for order in partner_orders {
                        write!(writer, "{:>6}", order_label(order))?;
                    }
                    writeln!(writer)?;
                }
            }
        }

        writeln!(writer, "END")?;
        Ok(())
    }

    fn write_molecule_to(molecule: &Molecule, writer: &mut impl Write) -> Result<(), Self::Error> {
        let mut header_lines = BTreeMap::new();
        header_lines.insert(
            1,
            RawLine {
                content: "BIOGRF 200".to_string(),
            },
        );
        header_lines.insert(
            2,
            RawLine {
                content: "REMARK Generated by ffmin".to_string(),
            },
        );
        header_lines.insert(
            3,
            RawLine {
                content: "FORCEFIELD UFF".to_string(),
            },
        );
        let default_metadata = BgfMetadata {
            header_lines,
            format_lines: vec![
                "FORMAT ATOM   (a6,1x,i5,1x,a5,1x,a3,1x,a1,1x,a5,3f10.5,1x,a5,i3,i2,1x,f8.5)"
                    .to_string(),
            ],
            ..Default::default()
        };
        Self::write_to(molecule, &default_metadata, writer)
    }
}
