// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use serde::{Deserialize, Serialize};

/// The ordered list of context names known to the host.
///
/// This is the analogue of a scene build list: the position of a name in
/// the catalog is the *catalog index* that index-based
/// [`ContextConstraint`](super::ContextConstraint)s match against. The
/// catalog is host configuration, not a registration — it round-trips
/// through serde so a host can load it from a config asset, and it
/// survives [`reset_all`](crate::Registry::reset_all).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContextCatalog {
    names: Vec<String>,
}

impl ContextCatalog {
    /// Builds a catalog from an ordered list of names. Duplicates are
    /// dropped with a warning; the first occurrence keeps its index.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut catalog = Self { names: Vec::new() };
        for name in names {
            let name = name.into();
            if catalog.names.contains(&name) {
                log::warn!("duplicate context `{name}` dropped from catalog");
                continue;
            }
            catalog.names.push(name);
        }
        catalog
    }

    /// Catalog position of `name`, if present. Lookup takes the first
    /// match, which also covers catalogs deserialized with duplicates.
    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Whether `name` appears in the catalog.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    /// The cataloged names, in order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Number of cataloged contexts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
