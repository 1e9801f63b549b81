// We follow the approach of defining a single opaque Error type in the public
// crate that wraps a private ErrorKind. The internal crate keeps returning
// `&'static str` (it can't allocate), and we wrap those strings here.
//
// The jiff crate has a whole discussion about error types. It merits further
// review!

/// The error type for every fallible operation in this crate.
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
}

/// The underlying internal error type
#[non_exhaustive]
#[derive(Debug)]
enum ErrorKind {
    /// A user callback failed. The wrapped error is propagated verbatim
    Callback(CallbackError),
    /// A malformed configuration value was read from the environment
    Config(ConfigError),
    /// A numeric domain error was detected inside one of the likelihood
    /// callbacks provided by this crate (e.g. a negative count)
    Domain(DomainError),
    /// An error that occurs when the start of an index range exceeds its end
    IndexRange(IndexRangeError),
    /// An error that occurs when an integer lies outside of the acceptable
    /// range of values
    IntegerRange(IntegerRangeError),
    /// An error that occurs within `parlik_nostd_internal`
    InternalLegacyAdHoc(InternalLegacyAdHocError),
    /// An error that occurs when 2 sequences that must line up don't
    LengthMismatch(LengthMismatchError),
    /// An error that occurs while constructing a thread pool
    ThreadPool(ThreadPoolError),
}

// define constructor methods for Error
impl Error {
    /// Wrap an arbitrary error raised by a user callback.
    ///
    /// The error is handed back to the caller of the reduction (or map)
    /// unmodified, and is accessible through [`std::error::Error::source`].
    pub fn callback<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Error {
            kind: ErrorKind::Callback(CallbackError(Box::new(err))),
        }
    }

    /// produce an error describing a numeric domain violation
    ///
    /// Callbacks written by users may also use this.
    pub fn domain(what: impl Into<String>) -> Self {
        Error {
            kind: ErrorKind::Domain(DomainError { what: what.into() }),
        }
    }

    /// produce an error indicating that a configuration value is malformed
    pub(crate) fn config(variable: &'static str, value: String, what: &'static str) -> Self {
        Error {
            kind: ErrorKind::Config(ConfigError {
                variable,
                value,
                what,
            }),
        }
    }

    /// produce an error indicating that `start > end`
    pub(crate) fn index_range(start: usize, end: usize) -> Self {
        Error {
            kind: ErrorKind::IndexRange(IndexRangeError { start, end }),
        }
    }

    /// produce an error indicating that an integer lies outside the acceptable
    /// range of values
    pub(crate) fn integer_range(
        description: &'static str,
        actual: u64,
        min_val: u64,
        max_val: u64,
    ) -> Self {
        Error {
            kind: ErrorKind::IntegerRange(IntegerRangeError {
                description,
                actual,
                min_val,
                max_val,
            }),
        }
    }

    /// wraps a legacy internal error string
    pub(crate) fn internal_legacy_adhoc(message: &'static str) -> Self {
        Error {
            kind: ErrorKind::InternalLegacyAdHoc(InternalLegacyAdHocError(message)),
        }
    }

    /// produce an error indicating that 2 sequences have different lengths
    pub(crate) fn length_mismatch(
        description: &'static str,
        expected: usize,
        actual: usize,
    ) -> Self {
        Error {
            kind: ErrorKind::LengthMismatch(LengthMismatchError {
                description,
                expected,
                actual,
            }),
        }
    }

    /// produce an error indicating that a thread pool couldn't be built
    #[allow(dead_code)] // unused without the "threads" feature
    pub(crate) fn thread_pool(what: String) -> Self {
        Error {
            kind: ErrorKind::ThreadPool(ThreadPoolError { what }),
        }
    }
}

// define methods for classifying an Error
impl Error {
    /// Whether the error was raised by a user callback via [`Error::callback`]
    pub fn is_callback(&self) -> bool {
        matches!(self.kind, ErrorKind::Callback(_))
    }

    /// Whether the error describes a numeric domain violation
    pub fn is_domain(&self) -> bool {
        matches!(self.kind, ErrorKind::Domain(_))
    }

    /// Whether the error describes a bad range, index, or length.
    ///
    /// The reduce/map entry points check their own arguments before any work
    /// is dispatched. The callbacks in [`crate::poisson`] also raise these
    /// errors (from inside a leaf) when handed an observation index or group
    /// id that their data doesn't cover.
    pub fn is_invalid_input(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::IndexRange(_)
                | ErrorKind::IntegerRange(_)
                | ErrorKind::LengthMismatch(_)
                | ErrorKind::InternalLegacyAdHoc(_)
        )
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self.kind {
            ErrorKind::Callback(ref err) => Some(err.0.as_ref()),
            _ => None,
        }
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        self.kind.fmt(f)
    }
}

impl core::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        match *self {
            ErrorKind::Callback(ref err) => err.fmt(f),
            ErrorKind::Config(ref err) => err.fmt(f),
            ErrorKind::Domain(ref err) => err.fmt(f),
            ErrorKind::IndexRange(ref err) => err.fmt(f),
            ErrorKind::IntegerRange(ref err) => err.fmt(f),
            ErrorKind::InternalLegacyAdHoc(ref msg) => msg.fmt(f),
            ErrorKind::LengthMismatch(ref err) => err.fmt(f),
            ErrorKind::ThreadPool(ref err) => err.fmt(f),
        }
    }
}

/// Wraps the error reported by a user callback
#[derive(Debug)]
struct CallbackError(Box<dyn std::error::Error + Send + Sync>);

impl core::fmt::Display for CallbackError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "callback failed: {}", self.0)
    }
}

/// An error that occurs when a configuration value is malformed
#[derive(Clone, Debug)]
struct ConfigError {
    variable: &'static str,
    value: String,
    what: &'static str,
}

impl std::error::Error for ConfigError {}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        let ConfigError {
            variable,
            value,
            what,
        } = self;
        write!(f, "{variable} has a value of \"{value}\": {what}")
    }
}

/// A numeric domain violation
#[derive(Clone, Debug)]
struct DomainError {
    what: String,
}

impl std::error::Error for DomainError {}

impl core::fmt::Display for DomainError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "domain error: {}", self.what)
    }
}

/// An error that occurs when the start of an index range exceeds its end
#[derive(Clone, Debug)]
struct IndexRangeError {
    start: usize,
    end: usize,
}

impl std::error::Error for IndexRangeError {}

impl core::fmt::Display for IndexRangeError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "the index range [{}, {}] is invalid: start must not exceed end",
            self.start, self.end
        )
    }
}

/// An error that occurs when an integer lies outside of the acceptable
/// range of values
#[derive(Clone, Debug)]
struct IntegerRangeError {
    description: &'static str,
    actual: u64,
    min_val: u64,
    max_val: u64,
}

impl std::error::Error for IntegerRangeError {}

impl core::fmt::Display for IntegerRangeError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "{} has a value of {}. The value should be no less than {} and \
             not exceed {}",
            self.description, self.actual, self.min_val, self.max_val
        )
    }
}

/// A temporary type that wraps the string errors from
/// `parlik_nostd_internal`.
#[derive(Clone)]
struct InternalLegacyAdHocError(&'static str);

impl std::error::Error for InternalLegacyAdHocError {}

impl core::fmt::Display for InternalLegacyAdHocError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl core::fmt::Debug for InternalLegacyAdHocError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        core::fmt::Debug::fmt(&self.0, f)
    }
}

/// An error that occurs when 2 sequences that must line up don't
#[derive(Clone, Debug)]
struct LengthMismatchError {
    description: &'static str,
    expected: usize,
    actual: usize,
}

impl std::error::Error for LengthMismatchError {}

impl core::fmt::Display for LengthMismatchError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(
            f,
            "{} has a length of {}. It should have a length of {}",
            self.description, self.actual, self.expected
        )
    }
}

/// An error that occurs while constructing a thread pool
#[derive(Clone, Debug)]
struct ThreadPoolError {
    what: String,
}

impl std::error::Error for ThreadPoolError {}

impl core::fmt::Display for ThreadPoolError {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        write!(f, "unable to build the thread pool: {}", self.what)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[derive(Debug)]
    struct Boom;

    impl core::fmt::Display for Boom {
        fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
            write!(f, "boom")
        }
    }

    impl std::error::Error for Boom {}

    #[test]
    fn callback_source_is_preserved() {
        let err = Error::callback(Boom);
        assert!(err.is_callback());
        assert!(!err.is_invalid_input());
        assert_eq!(err.to_string(), "callback failed: boom");
        let source = err.source().unwrap();
        assert!(source.downcast_ref::<Boom>().is_some());
    }

    #[test]
    fn classification() {
        assert!(Error::index_range(4, 3).is_invalid_input());
        assert!(Error::integer_range("grainsize", 0, 1, 7).is_invalid_input());
        assert!(Error::length_mismatch("gidx", 4, 3).is_invalid_input());
        assert!(Error::domain("negative count").is_domain());
        assert!(!Error::domain("negative count").is_invalid_input());
    }

    #[test]
    fn messages() {
        assert_eq!(
            Error::index_range(4, 3).to_string(),
            "the index range [4, 3] is invalid: start must not exceed end"
        );
        assert_eq!(
            Error::length_mismatch("gidx", 4, 3).to_string(),
            "gidx has a length of 3. It should have a length of 4"
        );
    }
}
