use super::interactions::{ElectrostaticInteraction, InteractionLists};
use super::params::ParameterStore;
use super::setup::{self, SetupError};
use super::terms::{self, TermContext, TermKind};
use super::trace::Tracer;
use crate::core::models::groups::AtomGroups;
use crate::core::models::molecule::Molecule;
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// The capability a force field offers to the energy function: build interaction
/// lists for a topology, and evaluate one term over those lists.
pub trait ForceField: Send + fmt::Debug {
    fn name(&self) -> &str;

    fn setup(
        &self,
        molecule: &Molecule,
        params: &ParameterStore,
        groups: &AtomGroups,
        tracer: &mut Tracer,
    ) -> Result<InteractionLists, SetupError>;

    fn setup_electrostatics(
        &self,
        molecule: &Molecule,
        params: &ParameterStore,
        groups: &AtomGroups,
        tracer: &mut Tracer,
    ) -> Vec<ElectrostaticInteraction>;

    fn evaluate(&self, kind: TermKind, lists: &InteractionLists, ctx: &mut TermContext<'_>)
    -> f64;
}

/// Universal Force Field (Rappé et al., 1992) with energies in kJ/mol.
#[derive(Debug, Clone, Copy, Default)]
pub struct UffForceField;

impl ForceField for UffForceField {
    fn name(&self) -> &str {
        "UFF"
    }

    fn setup(
        &self,
        molecule: &Molecule,
        params: &ParameterStore,
        groups: &AtomGroups,
        tracer: &mut Tracer,
    ) -> Result<InteractionLists, SetupError> {
        setup::build_interactions(molecule, params, groups, tracer)
    }

    fn setup_electrostatics(
        &self,
        molecule: &Molecule,
        params: &ParameterStore,
        groups: &AtomGroups,
        tracer: &mut Tracer,
    ) -> Vec<ElectrostaticInteraction> {
        setup::build_electrostatics(molecule, params, groups, tracer)
    }

    fn evaluate(
        &self,
        kind: TermKind,
        lists: &InteractionLists,
        ctx: &mut TermContext<'_>,
    ) -> f64 {
        terms::evaluate(kind, lists, ctx)
    }
}

pub type ForceFieldConstructor = fn() -> Box<dyn ForceField>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Unknown force field '{name}' (available: {available})")]
    UnknownForceField { name: String, available: String },
}

/// Maps force field names to constructors. Names are matched case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct ForceFieldRegistry {
    constructors: BTreeMap<String, ForceFieldConstructor>,
}

impl ForceFieldRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every force field shipped with the library.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("UFF", || Box::new(UffForceField));
        registry
    }

    pub fn register(&mut self, name: &str, constructor: ForceFieldConstructor) {
        self.constructors.insert(name.to_uppercase(), constructor);
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.constructors.keys().map(String::as_str)
    }

    pub fn create(&self, name: &str) -> Result<Box<dyn ForceField>, RegistryError> {
        self.constructors
            .get(&name.to_uppercase())
            .map(|constructor| constructor())
            .ok_or_else(|| RegistryError::UnknownForceField {
                name: name.to_string(),
                available: self.names().collect::<Vec<_>>().join(", "),
            })
    }
}
