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

//! The compile-time injection contracts.
//!
//! Where a reflection-based container discovers injection points at
//! runtime, this container knows them at compile time: [`Construct`] is
//! the type's one constructor, [`Injectable`] its member wiring. Both are
//! normally generated by `#[derive(Injectable)]` from `rhiza-macros`, but
//! hand-written impls are first-class — that is also how method injection
//! is expressed (resolve the arguments, call the method, inside
//! [`Injectable::inject`]).

use std::sync::Arc;

use crate::error::{DiError, DiResult};
use crate::registry::Registry;

/// A type the container can build from scratch.
///
/// The generated impl resolves every `#[inject]` field (by declared type,
/// or by identifier when the marker carries `name = "..."`) and fills the
/// remaining fields with their `Default` values.
pub trait Construct: Sized {
    /// Builds the value, resolving dependencies through `registry`.
    fn construct(registry: &Registry) -> DiResult<Self>;
}

/// A type whose members can be (re-)wired against a registry.
///
/// Member injection is idempotent at the member level: running it again
/// simply re-resolves and re-assigns. The container does not guard against
/// redundant re-injection — a host component that gets lifecycle
/// notifications keeps its own "already injected" flag and calls
/// [`Registry::inject_into`] when it decides wiring is due.
pub trait Injectable {
    /// Resolves and assigns every injection point on `self`.
    fn inject(&mut self, registry: &Registry) -> DiResult<()>;
}

/// Unwraps a resolution for a mandatory injection point.
///
/// `Ok(None)` from the registry means a context constraint gated the
/// dependency; a non-`Option` field cannot absorb that, so it becomes an
/// [`UnregisteredService`](DiError::UnregisteredService) for the gated
/// type. Used by generated code; exported for hand-written impls too.
pub fn require<T: ?Sized + 'static>(resolved: Option<Arc<T>>) -> DiResult<Arc<T>> {
    resolved.ok_or_else(|| DiError::UnregisteredService {
        service: std::any::type_name::<T>().to_string(),
    })
}
