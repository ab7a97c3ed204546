//! Chain resolution: from a target request back to its root.
//!
//! Every mold names at most one previous request, so a chain is a singly
//! linked walk, not a graph traversal. The walk tracks visited names and
//! fails on the first repeat, which also catches a mold naming itself.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::error::{Error, Result};
use crate::model::RequestMold;

/// Name index over a mold universe.
///
/// Read-only: resolving clones the molds it returns and never touches the
/// universe itself.
pub struct ChainResolver<'a> {
    by_name: HashMap<String, &'a RequestMold>,
}

impl<'a> ChainResolver<'a> {
    /// Indexes the universe by [`RequestMold::name`]. On duplicate names the
    /// first mold wins.
    pub fn new(universe: &'a [RequestMold]) -> Self {
        let mut by_name = HashMap::with_capacity(universe.len());
        for mold in universe {
            by_name.entry(mold.name()).or_insert(mold);
        }
        Self { by_name }
    }

    pub fn get(&self, name: &str) -> Option<&'a RequestMold> {
        self.by_name.get(name).copied()
    }

    /// Ordered chain for `target`, root first and target last.
    pub fn resolve(&self, target: &str) -> Result<Vec<RequestMold>> {
        let mut current = self.get(target).ok_or_else(|| Error::RequestNotFound {
            name: target.to_string(),
        })?;

        let mut visited = HashSet::from([target.to_string()]);
        let mut chain = vec![current.clone()];

        loop {
            let previous = current.previous_request();
            if previous.is_empty() {
                break;
            }
            if !visited.insert(previous.clone()) {
                return Err(Error::CyclicChain { name: previous });
            }
            let found = self
                .get(&previous)
                .ok_or_else(|| Error::PreviousRequestNotFound {
                    name: previous.clone(),
                    referenced_by: current.name(),
                })?;
            chain.push(found.clone());
            current = found;
        }

        chain.reverse();
        debug!(
            target: "chain",
            request = target,
            links = chain.len(),
            "resolved request chain"
        );
        Ok(chain)
    }
}

/// Resolves the chain ending in `target`.
///
/// The target itself must be part of `universe` (matched by name).
pub fn resolve_request_chain(
    target: &RequestMold,
    universe: &[RequestMold],
) -> Result<Vec<RequestMold>> {
    ChainResolver::new(universe).resolve(&target.name())
}

/// Resolves the chain ending in the mold named `name`.
pub fn resolve_request_chain_by_name(
    name: &str,
    universe: &[RequestMold],
) -> Result<Vec<RequestMold>> {
    ChainResolver::new(universe).resolve(name)
}
