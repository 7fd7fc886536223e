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

use std::fmt;

/// Restricts construction of an implementation to specific contexts.
///
/// A constraint carries a set of allowed context names and/or a set of
/// allowed catalog indices; it is satisfied when *either* set matches the
/// context that is current at construction time. An unsatisfied constraint
/// is not an error — resolution yields no instance (`Ok(None)`) and the
/// caller branches.
///
/// Constraints come from annotations and are static by nature; both sets
/// are `'static` slices so the derive can emit them in a const context.
/// They apply to [`Scoped`](crate::Lifetime::Scoped) and
/// [`Transient`](crate::Lifetime::Transient) bindings, never to
/// singletons.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct ContextConstraint {
    names: &'static [&'static str],
    indices: &'static [usize],
}

impl ContextConstraint {
    /// A constraint over both allowed names and allowed catalog indices.
    #[must_use]
    pub const fn new(names: &'static [&'static str], indices: &'static [usize]) -> Self {
        Self { names, indices }
    }

    /// A constraint over allowed context names only.
    #[must_use]
    pub const fn allow_names(names: &'static [&'static str]) -> Self {
        Self { names, indices: &[] }
    }

    /// A constraint over allowed catalog indices only.
    #[must_use]
    pub const fn allow_indices(indices: &'static [usize]) -> Self {
        Self { names: &[], indices }
    }

    /// Evaluates the constraint against the current context.
    ///
    /// `index` is the current context's catalog position; contexts absent
    /// from the catalog have none, so an index-only constraint never
    /// matches them.
    #[must_use]
    pub fn allows(&self, name: &str, index: Option<usize>) -> bool {
        if self.names.iter().any(|allowed| *allowed == name) {
            return true;
        }
        match index {
            Some(index) => self.indices.contains(&index),
            None => false,
        }
    }
}

impl fmt::Debug for ContextConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextConstraint")
            .field("names", &self.names)
            .field("indices", &self.indices)
            .finish()
    }
}
