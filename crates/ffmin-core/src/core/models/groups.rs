use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct GroupsFile {
    #[serde(default)]
    intra: Vec<Vec<usize>>,
    #[serde(default)]
    inter: Vec<Vec<usize>>,
    #[serde(default)]
    inter_pairs: Vec<(Vec<usize>, Vec<usize>)>,
}

#[derive(Debug, Error)]
pub enum GroupsLoadError {
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
}

/// Atom-group restrictions applied while building interaction lists.
///
/// Intra-groups restrict bonded terms: a bond, angle, torsion or out-of-plane record
/// is kept only when all of its atoms belong to one intra-group. Inter-groups and
/// inter-group pairs restrict the non-bonded pairs: a pair is kept when both atoms
/// belong to one inter-group, or when one atom lies in each side of a pair.
///
/// When no group of any kind is defined nothing is filtered. As soon as one group
/// is defined every list is filtered, so defining only inter-groups removes all
/// bonded records.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AtomGroups {
    intra: Vec<HashSet<usize>>,
    inter: Vec<HashSet<usize>>,
    inter_pairs: Vec<(HashSet<usize>, HashSet<usize>)>,
}

impl AtomGroups {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_intra_group<I: IntoIterator<Item = usize>>(&mut self, atoms: I) -> &mut Self {
        self.intra.push(atoms.into_iter().collect());
        self
    }

    pub fn add_inter_group<I: IntoIterator<Item = usize>>(&mut self, atoms: I) -> &mut Self {
        self.inter.push(atoms.into_iter().collect());
        self
    }

    pub fn add_inter_group_pair<I, J>(&mut self, first: I, second: J) -> &mut Self
    where
        I: IntoIterator<Item = usize>,
        J: IntoIterator<Item = usize>,
    {
        self.inter_pairs
            .push((first.into_iter().collect(), second.into_iter().collect()));
        self
    }

    /// Reads groups from a TOML file with optional `intra`, `inter` and
    /// `inter-pairs` keys holding 0-based atom indices.
    pub fn load(path: &Path) -> Result<Self, GroupsLoadError> {
        let content = std::fs::read_to_string(path).map_err(|e| GroupsLoadError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        let file: GroupsFile = toml::from_str(&content).map_err(|e| GroupsLoadError::Toml {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;

        let mut groups = Self::new();
        for group in file.intra {
            groups.add_intra_group(group);
        }
        for group in file.inter {
            groups.add_inter_group(group);
        }
        for (first, second) in file.inter_pairs {
            groups.add_inter_group_pair(first, second);
        }
        Ok(groups)
    }

    pub fn max_index(&self) -> Option<usize> {
        self.intra
            .iter()
            .chain(self.inter.iter())
            .chain(self.inter_pairs.iter().flat_map(|(a, b)| [a, b]))
            .flat_map(|group| group.iter().copied())
            .max()
    }

    pub fn clear(&mut self) {
        self.intra.clear();
        self.inter.clear();
        self.inter_pairs.clear();
    }

    pub fn has_groups(&self) -> bool {
        !self.intra.is_empty() || !self.inter.is_empty() || !self.inter_pairs.is_empty()
    }

    /// Whether a bonded record spanning `atoms` survives the intra-group filter.
    pub fn allows_bonded(&self, atoms: &[usize]) -> bool {
        if !self.has_groups() {
            return true;
        }
        self.intra
            .iter()
            .any(|group| atoms.iter().all(|atom| group.contains(atom)))
    }

    /// Whether the non-bonded pair `(a, b)` survives the inter-group filters.
    pub fn allows_pair(&self, a: usize, b: usize) -> bool {
        if !self.has_groups() {
            return true;
        }
        self.inter
            .iter()
            .any(|group| group.contains(&a) && group.contains(&b))
            || self.inter_pairs.iter().any(|(first, second)| {
                (first.contains(&a) && second.contains(&b))
                    || (first.contains(&b) && second.contains(&a))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_groups_allow_everything() {
        let groups = AtomGroups::new();
        assert!(!groups.has_groups());
        assert!(groups.allows_bonded(&[0, 1, 2, 3]));
        assert!(groups.allows_pair(0, 7));
    }

    #[test]
    fn intra_group_requires_all_atoms_in_one_group() {
        let mut groups = AtomGroups::new();
        groups.add_intra_group([0, 1, 2]).add_intra_group([2, 3]);
        assert!(groups.allows_bonded(&[0, 1, 2]));
        assert!(groups.allows_bonded(&[2, 3]));
        assert!(!groups.allows_bonded(&[1, 2, 3]));
    }

    #[test]
    fn inter_group_and_pairs_select_non_bonded_pairs() {
        let mut groups = AtomGroups::new();
        groups
            .add_inter_group([0, 1])
            .add_inter_group_pair([2], [3, 4]);
        assert!(groups.allows_pair(0, 1));
        assert!(groups.allows_pair(2, 4));
        assert!(groups.allows_pair(4, 2));
        assert!(!groups.allows_pair(3, 4));
        assert!(!groups.allows_pair(0, 2));
    }

    #[test]
    fn defining_only_inter_groups_rejects_bonded_records() {
        let mut groups = AtomGroups::new();
        groups.add_inter_group([0, 1]);
        assert!(!groups.allows_bonded(&[0, 1]));
    }

    #[test]
    fn load_reads_all_group_kinds() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("groups.toml");
        std::fs::write(
            &path,
            "intra = [[0, 1, 2]]\ninter = [[3, 4]]\ninter-pairs = [[[0], [5, 6]]]\n",
        )
        .unwrap();

        let groups = AtomGroups::load(&path).unwrap();
        assert!(groups.allows_bonded(&[0, 2]));
        assert!(groups.allows_pair(3, 4));
        assert!(groups.allows_pair(6, 0));
        assert_eq!(groups.max_index(), Some(6));
    }

    #[test]
    fn load_rejects_unknown_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("groups.toml");
        std::fs::write(&path, "extra = [[1]]\n").unwrap();
        assert!(matches!(
            AtomGroups::load(&path),
            Err(GroupsLoadError::Toml { .. })
        ));
    }

    #[test]
    fn clear_removes_all_groups() {
        let mut groups = AtomGroups::new();
        groups.add_intra_group([0]).add_inter_group([1]);
        groups.clear();
        assert!(!groups.has_groups());
    }
}
