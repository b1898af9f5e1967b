//! Type-level description of a service: method descriptors, the closed set of
//! method names, and the projections a client uses to type its calls.
//!
//! Nothing in this module has runtime behaviour beyond name lookups, so a crate
//! that only declares a service (see [`method!`](crate::method) and
//! [`service!`](crate::service)) can be shared with clients without pulling in
//! any server code.

use serde::{de::DeserializeOwned, Serialize};
use std::{fmt, hash::Hash, str::FromStr};
use thiserror::Error;

/// A single callable method, identified by a marker type.
///
/// The marker carries no data. `Input` and `Output` are what a call sends and
/// receives after decoding.
pub trait Method: Send + Sync + 'static {
    const NAME: &'static str;
    type Input: Serialize + DeserializeOwned + Send + 'static;
    type Output: Serialize + DeserializeOwned + Send + 'static;
}

/// Input type of method `M`.
pub type InputOf<M> = <M as Method>::Input;

/// Output type of method `M`.
pub type OutputOf<M> = <M as Method>::Output;

/// A named, closed set of [`Method`]s.
pub trait Service: Send + Sync + 'static {
    const NAME: &'static str;

    /// Enumeration of every method name the service declares.
    type MethodName: MethodName;
}

/// Implemented by a [`Service`] for every method it declares.
///
/// Bounds of the form `S: Provides<M>` are what reject calls to undeclared
/// methods at compile time.
pub trait Provides<M: Method>: Service {
    const METHOD: Self::MethodName;
}

/// The closed enumeration of a service's method names, generated by
/// [`service!`](crate::service).
pub trait MethodName:
    Copy + Eq + Hash + fmt::Debug + fmt::Display + FromStr<Err = UnknownMethodName> + Send + Sync + 'static
{
    const ALL: &'static [Self];

    fn as_str(self) -> &'static str;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Unrecognized method name {0}")]
pub struct UnknownMethodName(pub String);

impl UnknownMethodName {
    pub fn new(name: &str) -> Self {
        Self(name.to_owned())
    }
}

/// Looks `name` up among `N::ALL`. Used by the `FromStr` impl that
/// [`service!`](crate::service) generates.
pub fn parse_method_name<N: MethodName>(name: &str) -> Result<N, UnknownMethodName> {
    N::ALL
        .iter()
        .copied()
        .find(|candidate| candidate.as_str() == name)
        .ok_or_else(|| UnknownMethodName::new(name))
}

/// `true` when every name is non-empty and no two names are equal.
///
/// Evaluated in a const context by [`service!`](crate::service).
pub const fn names_are_valid(names: &[&str]) -> bool {
    let mut i = 0;
    while i < names.len() {
        if names[i].is_empty() {
            return false;
        }
        let mut j = i + 1;
        while j < names.len() {
            if str_eq(names[i], names[j]) {
                return false;
            }
            j += 1;
        }
        i += 1;
    }
    true
}

const fn str_eq(a: &str, b: &str) -> bool {
    let (a, b) = (a.as_bytes(), b.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    let mut i = 0;
    while i < a.len() {
        if a[i] != b[i] {
            return false;
        }
        i += 1;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_validation() {
        assert!(names_are_valid(&["add", "subtract"]));
        assert!(names_are_valid(&[]));
        assert!(!names_are_valid(&["add", ""]));
        assert!(!names_are_valid(&["add", "subtract", "add"]));
        assert!(names_are_valid(&["add", "adds"]));
    }
}
