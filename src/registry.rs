//! Cut executor
//!
//! The governance core hands approved change sets to a `CutExecutor`.
//! `FacetRegistry` is the in-memory implementation used by the service:
//! a selector → facet binding table that applies a change set all-or-nothing.

use crate::error::ExecutorError;
use crate::identity::{Address, Selector};
use crate::proposal::{ChangeSet, FacetCut, FacetCutAction, InitCall};
use std::collections::BTreeMap;
use tracing::{debug, info};

/// Applies an approved change set to the managed registry
pub trait CutExecutor: Send + Sync {
    /// Called exactly once per proposal that reaches the threshold. An error
    /// must leave the registry untouched.
    fn apply_registry_change(&mut self, change_set: &ChangeSet) -> Result<(), ExecutorError>;
}

impl<T: CutExecutor + ?Sized> CutExecutor for Box<T> {
    fn apply_registry_change(&mut self, change_set: &ChangeSet) -> Result<(), ExecutorError> {
        (**self).apply_registry_change(change_set)
    }
}

/// In-memory selector routing table
#[derive(Debug, Clone, Default)]
pub struct FacetRegistry {
    bindings: BTreeMap<Selector, Address>,
    initializations: Vec<InitCall>,
    applied_cuts: u64,
}

impl FacetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Facet currently serving `selector`
    pub fn facet_address(&self, selector: &Selector) -> Option<Address> {
        self.bindings.get(selector).copied()
    }

    /// Selectors bound to `facet`, in selector order
    pub fn facet_selectors(&self, facet: &Address) -> Vec<Selector> {
        self.bindings
            .iter()
            .filter(|(_, bound)| *bound == facet)
            .map(|(selector, _)| *selector)
            .collect()
    }

    pub fn selector_count(&self) -> usize {
        self.bindings.len()
    }

    /// Initialization calls performed so far, oldest first
    pub fn initializations(&self) -> &[InitCall] {
        &self.initializations
    }

    /// Number of change sets applied successfully
    pub fn applied_cuts(&self) -> u64 {
        self.applied_cuts
    }

    fn apply_cut(bindings: &mut BTreeMap<Selector, Address>, cut: &FacetCut) -> Result<(), ExecutorError> {
        if cut.function_selectors.is_empty() {
            return Err(ExecutorError::EmptySelectors {
                facet: cut.facet_address,
            });
        }

        match cut.action {
            FacetCutAction::Add => {
                if cut.facet_address.is_zero() {
                    return Err(ExecutorError::NullFacet);
                }
                for selector in &cut.function_selectors {
                    if bindings.contains_key(selector) {
                        return Err(ExecutorError::SelectorExists(*selector));
                    }
                    bindings.insert(*selector, cut.facet_address);
                }
            }
            FacetCutAction::Replace => {
                if cut.facet_address.is_zero() {
                    return Err(ExecutorError::NullFacet);
                }
                for selector in &cut.function_selectors {
                    match bindings.get(selector) {
                        None => return Err(ExecutorError::SelectorMissing(*selector)),
                        Some(current) if *current == cut.facet_address => {
                            return Err(ExecutorError::ReplaceWithSameFacet {
                                selector: *selector,
                                facet: cut.facet_address,
                            });
                        }
                        Some(_) => {
                            bindings.insert(*selector, cut.facet_address);
                        }
                    }
                }
            }
            FacetCutAction::Remove => {
                if !cut.facet_address.is_zero() {
                    return Err(ExecutorError::RemoveFacetNotNull(cut.facet_address));
                }
                for selector in &cut.function_selectors {
                    if bindings.remove(selector).is_none() {
                        return Err(ExecutorError::SelectorMissing(*selector));
                    }
                }
            }
        }
        Ok(())
    }
}

impl CutExecutor for FacetRegistry {
    fn apply_registry_change(&mut self, change_set: &ChangeSet) -> Result<(), ExecutorError> {
        // Work on a copy so a failing cut leaves the live table untouched
        let mut bindings = self.bindings.clone();
        for cut in &change_set.cuts {
            Self::apply_cut(&mut bindings, cut)?;
            debug!("Applied cut: {}", cut.description());
        }

        if let Some(init) = &change_set.init {
            if init.target.is_zero() {
                if !init.calldata.is_empty() {
                    return Err(ExecutorError::InitCalldataWithoutTarget);
                }
            } else {
                self.initializations.push(init.clone());
            }
        }

        self.bindings = bindings;
        self.applied_cuts += 1;
        info!(
            "Registry updated: {} cut(s), {} selector(s) now bound",
            change_set.cuts.len(),
            self.bindings.len()
        );
        Ok(())
    }
}
