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

//! Error types for registration and resolution failures.
//!
//! Every error here is a deterministic function of registry state: retrying
//! a failed resolution without changing the registrations reproduces the
//! same failure, so nothing in this crate retries anything.
//!
//! Note that a context constraint that is not satisfied is *not* an error.
//! It is the `Ok(None)` arm of the resolution methods on
//! [`Registry`](crate::Registry), and callers are expected to branch on it.

/// Convenience alias used throughout the container.
pub type DiResult<T> = Result<T, DiError>;

/// A registration or resolution failure.
///
/// Construction-path errors propagate unmodified through every recursive
/// resolution frame: no wrapping, no partially built instance is ever
/// cached or returned.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiError {
    /// Resolution was requested for a service identity with no registration.
    #[error("no registration for service `{service}`")]
    UnregisteredService {
        /// Type name of the requested service identity.
        service: String,
    },

    /// Resolution by string identifier found no match.
    #[error("no registration under identifier `{identifier}`")]
    UnregisteredIdentifier {
        /// The identifier that was looked up.
        identifier: String,
    },

    /// The binding carries no usable construction path: it has no factory,
    /// or it is host-managed and no component host is installed.
    #[error("`{implementation}` has no usable construction path")]
    NoSuitableConstructor {
        /// Type name of the implementation that could not be built.
        implementation: String,
    },

    /// Construction re-entered a service already being constructed on this
    /// thread. The chain lists every frame from the outermost request to
    /// the repeated one.
    #[error("circular dependency: {chain}")]
    CircularDependency {
        /// Human-readable `A -> B -> A` construction chain.
        chain: String,
    },

    /// The stored instance could not be downcast to the type the caller
    /// declared. Only reachable through identifier lookups or a hand-rolled
    /// binding whose factory produces a different type than its service key.
    #[error("instance registered for `{service}` is not a `{expected}`")]
    TypeMismatch {
        /// The service key or identifier the lookup went through.
        service: String,
        /// Type name the caller expected.
        expected: &'static str,
    },
}
