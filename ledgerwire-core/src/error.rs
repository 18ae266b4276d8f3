// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Error kinds surfaced by serialization and deserialization.
//!
//! Error constructors sit on the cold path of every buffer read and type
//! check, so they are all `#[cold]` and `#[track_caller]`. Do not remove
//! those attributes without measuring the hot paths.

use std::borrow::Cow;

use thiserror::Error;

/// Set `LEDGERWIRE_PANIC_ON_ERROR=1` at compile time to panic where an error is created.
pub const PANIC_ON_ERROR: bool = option_env!("LEDGERWIRE_PANIC_ON_ERROR").is_some();

/// Check if `LEDGERWIRE_PANIC_ON_ERROR` was set at compile time.
#[inline(always)]
pub const fn should_panic_on_error() -> bool {
    PANIC_ON_ERROR
}

/// Error type for ledgerwire serialization and deserialization.
///
/// # Always use the static constructors
///
/// Do not build variants with enum syntax. Use [`Error::missing_context`],
/// [`Error::unregistered_token`], [`Error::type_mismatch`],
/// [`Error::wire_format`], [`Error::cyclic_schema`] or
/// [`Error::not_allowed`] instead, so that every error passes through the
/// `LEDGERWIRE_PANIC_ON_ERROR` hook.
///
/// ```rust
/// use ledgerwire_core::error::Error;
///
/// let err = Error::type_mismatch("int[p]", "int[]");
/// assert!(matches!(err, Error::TypeMismatch { .. }));
/// ```
///
/// ## Debugging
///
/// ```bash
/// RUST_BACKTRACE=1 LEDGERWIRE_PANIC_ON_ERROR=1 cargo test
/// ```
///
/// With the flag set, any constructor panics at its call site, which gives a
/// stack trace pointing at the exact read or check that failed.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// A tokenizable singleton was written or read through a context with no
    /// token registry attached.
    ///
    /// Do not construct this variant directly; use [`Error::missing_context`] instead.
    #[error("Missing token context: {0}")]
    MissingContext(Cow<'static, str>),

    /// A token is unknown to the attached registry on read, or an instance is
    /// unknown to it on write.
    ///
    /// Do not construct this variant directly; use [`Error::unregistered_token`] instead.
    #[error("Unregistered token: {0}")]
    UnregisteredToken(Cow<'static, str>),

    /// The decoded shape does not match the shape the caller asked for.
    ///
    /// Do not construct this variant directly; use [`Error::type_mismatch`] instead.
    #[error("Type mismatch: expected {expected}, found {actual}")]
    TypeMismatch {
        expected: Cow<'static, str>,
        actual: Cow<'static, str>,
    },

    /// Bad header, truncated or malformed payload, or a payload that is
    /// inconsistent with the schemas carried next to it.
    ///
    /// Do not construct this variant directly; use [`Error::wire_format`] instead.
    #[error("Wire format error: {0}")]
    WireFormat(Cow<'static, str>),

    /// A set of composite schemas depends on itself with no local type to anchor it.
    ///
    /// Do not construct this variant directly; use [`Error::cyclic_schema`] instead.
    #[error("Cyclic schema: {0}")]
    CyclicSchema(Cow<'static, str>),

    /// Rejected by the allow-list of a context, or a conflicting registration.
    ///
    /// Do not construct this variant directly; use [`Error::not_allowed`] instead.
    #[error("{0}")]
    NotAllowed(Cow<'static, str>),
}

impl Error {
    /// Creates a new [`Error::MissingContext`].
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn missing_context<S: Into<Cow<'static, str>>>(s: S) -> Self {
        let err = Error::MissingContext(s.into());
        if PANIC_ON_ERROR {
            panic!("LEDGERWIRE_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    /// Creates a new [`Error::UnregisteredToken`].
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn unregistered_token<S: Into<Cow<'static, str>>>(s: S) -> Self {
        let err = Error::UnregisteredToken(s.into());
        if PANIC_ON_ERROR {
            panic!("LEDGERWIRE_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    /// Creates a new [`Error::TypeMismatch`] from the expected and the actual shape.
    ///
    /// ```
    /// use ledgerwire_core::error::Error;
    ///
    /// let err = Error::type_mismatch("int", format!("{}", "string"));
    /// assert_eq!(err.to_string(), "Type mismatch: expected int, found string");
    /// ```
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn type_mismatch<E, A>(expected: E, actual: A) -> Self
    where
        E: Into<Cow<'static, str>>,
        A: Into<Cow<'static, str>>,
    {
        let err = Error::TypeMismatch {
            expected: expected.into(),
            actual: actual.into(),
        };
        if PANIC_ON_ERROR {
            panic!("LEDGERWIRE_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    /// Creates a new [`Error::WireFormat`].
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn wire_format<S: Into<Cow<'static, str>>>(s: S) -> Self {
        let err = Error::WireFormat(s.into());
        if PANIC_ON_ERROR {
            panic!("LEDGERWIRE_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    /// Creates a [`Error::WireFormat`] for a read past the end of the input.
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn buffer_out_of_bound(offset: usize, length: usize, capacity: usize) -> Self {
        Error::wire_format(format!(
            "buffer out of bound: {} + {} > {}",
            offset, length, capacity
        ))
    }

    /// Creates a new [`Error::CyclicSchema`].
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn cyclic_schema<S: Into<Cow<'static, str>>>(s: S) -> Self {
        let err = Error::CyclicSchema(s.into());
        if PANIC_ON_ERROR {
            panic!("LEDGERWIRE_PANIC_ON_ERROR: {}", err);
        }
        err
    }

    /// Creates a new [`Error::NotAllowed`].
    #[inline(always)]
    #[cold]
    #[track_caller]
    pub fn not_allowed<S: Into<Cow<'static, str>>>(s: S) -> Self {
        let err = Error::NotAllowed(s.into());
        if PANIC_ON_ERROR {
            panic!("LEDGERWIRE_PANIC_ON_ERROR: {}", err);
        }
        err
    }
}

/// Ensures a condition holds; otherwise returns early with an [`enum@Error`].
///
/// A literal or format string produces an [`Error::WireFormat`]; any other
/// expression is returned as the error itself.
///
/// # Examples
/// ```
/// use ledgerwire_core::ensure;
/// use ledgerwire_core::error::Error;
///
/// fn check_len(len: usize) -> Result<(), Error> {
///     ensure!(len < 16, "length {} too large", len);
///     ensure!(len > 0, Error::type_mismatch("non-empty", "empty"));
///     Ok(())
/// }
/// assert!(check_len(3).is_ok());
/// assert!(check_len(0).is_err());
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $msg:literal) => {
        if !$cond {
            return Err($crate::error::Error::wire_format($msg));
        }
    };
    ($cond:expr, $err:expr) => {
        if !$cond {
            return Err($err);
        }
    };
    ($cond:expr, $fmt:expr, $($arg:tt)*) => {
        if !$cond {
            return Err($crate::error::Error::wire_format(format!($fmt, $($arg)*)));
        }
    };
}

/// Returns early with an [`Error::WireFormat`].
///
/// # Examples
/// ```
/// use ledgerwire_core::bail;
/// use ledgerwire_core::error::Error;
///
/// fn fail_fast(tag: u8) -> Result<(), Error> {
///     bail!("unknown tag {}", tag);
/// }
/// assert!(fail_fast(7).is_err());
/// ```
#[macro_export]
macro_rules! bail {
    ($err:expr) => {
        return Err($crate::error::Error::wire_format($err))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::error::Error::wire_format(format!($fmt, $($arg)*)))
    };
}

/// Returns early with an [`Error::NotAllowed`].
///
/// # Examples
/// ```
/// use ledgerwire_core::not_allowed;
/// use ledgerwire_core::error::Error;
///
/// fn check_type(name: &str) -> Result<(), Error> {
///     not_allowed!("type {} is not allowed", name);
/// }
/// assert!(check_type("com.acme.Secret").is_err());
/// ```
#[macro_export]
macro_rules! not_allowed {
    ($err:expr) => {
        return Err($crate::error::Error::not_allowed($err))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::error::Error::not_allowed(format!($fmt, $($arg)*)))
    };
}
