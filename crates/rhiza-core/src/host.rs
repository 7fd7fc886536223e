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

//! Boundary traits toward the host runtime.
//!
//! The host's component lifecycle and scene graph are out of scope; the
//! container only consumes these two seams. Both are installed on the
//! [`Registry`](crate::Registry) at bootstrap and faked in tests.

use crate::binding::{ErasedInstance, ServiceKey};
use crate::error::DiResult;
use crate::registry::Registry;

/// The host's view of its live component graph.
///
/// A binding marked host-managed never runs a factory. The construction
/// engine first asks the host for an already-existing component of the
/// implementation type — host components are never double-constructed —
/// and only if none exists asks the host to create one, attach it, and
/// inject into it. Mutability of the component is the host's problem; it
/// owns the object graph.
pub trait ComponentHost: Send + Sync {
    /// Finds an existing component of the keyed type, injects into it, and
    /// returns it erased under its own type. `Ok(None)` when the host has
    /// no such component yet.
    fn inject_existing(
        &self,
        component: ServiceKey,
        registry: &Registry,
    ) -> DiResult<Option<ErasedInstance>>;

    /// Creates a fresh host object with the keyed component attached,
    /// injects into it, and returns it erased under its own type.
    fn create_and_inject(
        &self,
        component: ServiceKey,
        registry: &Registry,
    ) -> DiResult<ErasedInstance>;
}

/// Where the current context name comes from when nobody told us.
///
/// The context manager caches the current context name set by
/// [`enter_context`](crate::Registry::enter_context); when the cache is
/// empty, the getter lazily refreshes it from this source. Hosts that
/// drive `enter_context`/`exit_context` reliably never need to install
/// one.
pub trait ContextSource: Send + Sync {
    /// Name of the context the host currently considers active, if any.
    fn active_context(&self) -> Option<String>;
}
