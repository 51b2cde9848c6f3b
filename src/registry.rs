// src/registry.rs

//! In-memory registry of live process handles, keyed by reference.
//!
//! References come from a counter that only moves forward, so a reference
//! is never handed out twice in one supervisor session, even after its
//! handle has been removed.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use crate::process::{ProcessHandle, SupervisedProcess};
use crate::types::Reference;

/// Issues `<prefix><n>` references with `n` starting at 1.
#[derive(Debug, Clone)]
pub struct ReferenceGenerator {
    prefix: String,
    issued: u64,
}

impl ReferenceGenerator {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            issued: 0,
        }
    }

    /// Next reference together with its sequence number.
    pub fn next_reference(&mut self) -> (Reference, u64) {
        self.issued += 1;
        (format!("{}{}", self.prefix, self.issued), self.issued)
    }
}

pub struct Registry<P> {
    handles: HashMap<Reference, ProcessHandle<P>>,
    references: ReferenceGenerator,
}

impl<P: SupervisedProcess> Registry<P> {
    pub fn new(reference_prefix: &str) -> Self {
        Self {
            handles: HashMap::new(),
            references: ReferenceGenerator::new(reference_prefix),
        }
    }

    /// Wrap a freshly launched process in a handle under a new reference.
    pub fn register(&mut self, process: P) -> Reference {
        let (reference, sequence) = self.references.next_reference();
        let handle = ProcessHandle::new(reference.clone(), sequence, process);
        self.handles.insert(reference.clone(), handle);
        reference
    }

    /// Insert a handle under its own reference. An occupied slot is left
    /// untouched and the handle is given back.
    pub fn insert(&mut self, handle: ProcessHandle<P>) -> Result<(), ProcessHandle<P>> {
        match self.handles.entry(handle.reference().to_string()) {
            Entry::Occupied(_) => Err(handle),
            Entry::Vacant(slot) => {
                slot.insert(handle);
                Ok(())
            }
        }
    }

    pub fn lookup(&self, reference: &str) -> Option<&ProcessHandle<P>> {
        self.handles.get(reference)
    }

    pub fn lookup_mut(&mut self, reference: &str) -> Option<&mut ProcessHandle<P>> {
        self.handles.get_mut(reference)
    }

    /// Take ownership of a handle out of the registry. The caller is then
    /// responsible for tearing it down.
    pub fn remove(&mut self, reference: &str) -> Option<ProcessHandle<P>> {
        self.handles.remove(reference)
    }

    pub fn contains(&self, reference: &str) -> bool {
        self.handles.contains_key(reference)
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Remove every handle, in creation order.
    pub fn drain(&mut self) -> Vec<ProcessHandle<P>> {
        let mut handles: Vec<_> = self.handles.drain().map(|(_, h)| h).collect();
        handles.sort_by_key(|h| h.sequence());
        handles
    }
}
