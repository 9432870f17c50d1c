// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Opaque, globally-unique string identifiers.
//!
//! Unlike a fixed-prefix nanoid, job IDs here are composite
//! (`<workflow_id>_<client_supplied_id>`) and therefore unbounded in
//! length, so identifiers are backed by `String` rather than an inline
//! fixed-capacity buffer.

use std::fmt;

/// Generates opaque unique ID suffixes.
///
/// Abstracted so scheduler/engine tests can substitute a deterministic
/// generator instead of real randomness.
pub trait IdGen: Send + Sync {
    fn next(&self) -> String;
}

/// Production ID generator backed by UUID v4.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIdGen;

impl IdGen for UuidIdGen {
    fn next(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// Deterministic ID generator for tests: returns `prefix-0`, `prefix-1`, ...
#[cfg(any(test, feature = "test-support"))]
pub struct SequentialIdGen {
    prefix: &'static str,
    counter: std::sync::atomic::AtomicU64,
}

#[cfg(any(test, feature = "test-support"))]
impl SequentialIdGen {
    pub fn new(prefix: &'static str) -> Self {
        Self { prefix, counter: std::sync::atomic::AtomicU64::new(0) }
    }
}

#[cfg(any(test, feature = "test-support"))]
impl IdGen for SequentialIdGen {
    fn next(&self) -> String {
        let n = self.counter.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        format!("{}-{}", self.prefix, n)
    }
}

/// Define a newtype wrapper around an opaque `String` identifier.
///
/// Generates `Display`, `From<String>`/`From<&str>`, `AsRef<str>`,
/// `Borrow<str>`, and `Deref<Target = str>` so the ID behaves like a
/// string everywhere it's compared or hashed, while still being a
/// distinct type at the API boundary.
macro_rules! define_id {
    ($(#[$meta:meta])* pub struct $name:ident;) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn as_str(&self) -> &str {
                &self.0
            }

            pub fn into_string(self) -> String {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl From<&String> for $name {
            fn from(s: &String) -> Self {
                Self(s.clone())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl std::ops::Deref for $name {
            type Target = str;

            fn deref(&self) -> &str {
                &self.0
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }
    };
}

define_id! {
    /// Opaque tenant identifier (the `X-User-ID` value).
    pub struct TenantId;
}

define_id! {
    /// Globally-unique workflow identifier, assigned at submission.
    pub struct WorkflowId;
}

define_id! {
    /// Globally-unique job identifier.
    ///
    /// After [`crate::workflow::Workflow`] submission this is always either
    /// `<workflow_id>_<client_supplied_id>` or a fresh random ID — callers
    /// must treat it as opaque and never re-derive the workflow prefix from
    /// it directly.
    pub struct JobId;
}

define_id! {
    /// Client-supplied branch label. Non-empty by construction (validated
    /// at submission, see [`crate::error::ServiceError::InvalidArgument`]).
    pub struct Branch;
}

#[cfg(test)]
#[path = "ids_tests.rs"]
mod tests;
