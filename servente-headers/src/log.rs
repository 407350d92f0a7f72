// Copyright (C) 2023 Tristan Gerritsen <tristan@thewoosh.org>
// All Rights Reserved.

//! Diagnostics are only compiled in with the `debugging` feature, in which
//! case they are forwarded to the `log` crate.

#![allow(unused)]

macro_rules! trace {
    ($($tt:tt)*) => {
        #[cfg(feature = "debugging")]
        ::log::trace!($($tt)*);
    };
}

macro_rules! debug {
    ($($tt:tt)*) => {
        #[cfg(feature = "debugging")]
        ::log::debug!($($tt)*);
    };
}

pub(crate) use {trace, debug};
