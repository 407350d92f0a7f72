// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

//! Read-only header values that can be shared between threads, e.g. the
//! headers of a cached response.

use std::{
    fmt::{self, Display},
    ops::Deref,
    sync::Arc,
};

/// A read-only copy of a header value.
///
/// The value is deep-copied when it is frozen, so later changes to the
/// original aren't observable through the frozen copy. Mutation isn't
/// possible, use [`Frozen::to_mutable`] to get a mutable copy back.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct Frozen<T> {
    value: Arc<T>,
}

impl<T> Frozen<T> {
    pub fn new(value: T) -> Self {
        Self { value: Arc::new(value) }
    }
}

impl<T: Clone> Frozen<T> {
    /// Returns a mutable deep copy of the value.
    #[must_use]
    pub fn to_mutable(&self) -> T {
        T::clone(&self.value)
    }
}

impl<T> Clone for Frozen<T> {
    fn clone(&self) -> Self {
        Self { value: Arc::clone(&self.value) }
    }
}

impl<T> Deref for Frozen<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T> From<T> for Frozen<T> {
    fn from(value: T) -> Self {
        Self::new(value)
    }
}

impl<T: Display> Display for Frozen<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&*self.value, f)
    }
}

/// Creates read-only copies of header values.
pub trait CopyAsReadOnly: Clone {
    #[must_use]
    fn copy_as_read_only(&self) -> Frozen<Self> {
        Frozen::new(self.clone())
    }
}

impl<T: crate::HeaderValueParser + Clone> CopyAsReadOnly for T {}
