//! Runtime configuration: which backend executes the work, and with how many
//! threads.
//!
//! These parameters don't have a meaningful impact on the output (results
//! are mathematically consistent, and for a fixed grain size even bitwise
//! identical), but they impact performance. That's why they are kept apart
//! from the arguments of the reduce/map calls.

use std::num::NonZeroUsize;

use parlik_nostd_internal::{Executor, GrainSize, IndexRange, Scalar};
use tracing::debug;

use crate::{Error, SerialExecutor};
#[cfg(feature = "threads")]
use crate::ThreadPoolExecutor;

/// The environment variable holding the backend name (`serial`/`threads`)
pub const BACKEND_ENV_VAR: &str = "PARLIK_BACKEND";
/// The environment variable holding the number of worker threads
pub const NUM_THREADS_ENV_VAR: &str = "PARLIK_NUM_THREADS";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Backend {
    /// everything runs on the calling thread
    Serial,
    /// work runs on a rayon thread pool (requires the `threads` feature)
    Threads,
}

impl Backend {
    fn parse(value: &str) -> Result<Backend, Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "serial" => Ok(Backend::Serial),
            "threads" => Ok(Backend::Threads),
            _ => Err(Error::config(
                BACKEND_ENV_VAR,
                value.to_string(),
                "expected \"serial\" or \"threads\"",
            )),
        }
    }
}

impl Default for Backend {
    fn default() -> Self {
        if cfg!(feature = "threads") {
            Backend::Threads
        } else {
            Backend::Serial
        }
    }
}

/// Describes how to execute reductions and maps.
///
/// Build it with [`RuntimeSpecBuilder`], then call
/// [`RuntimeSpec::build_executor`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RuntimeSpec {
    backend: Backend,
    // None means that we use rayon's global pool
    num_threads: Option<NonZeroUsize>,
    thread_name_prefix: Option<String>,
}

impl RuntimeSpec {
    pub fn backend(&self) -> Backend {
        self.backend
    }

    pub fn num_threads(&self) -> Option<NonZeroUsize> {
        self.num_threads
    }

    /// Construct the executor described by `self`.
    ///
    /// A dedicated thread pool is only built when the number of threads or a
    /// thread-name prefix was specified. Otherwise, rayon's global pool is
    /// used.
    pub fn build_executor(&self) -> Result<RuntimeExecutor, Error> {
        debug!(
            backend = ?self.backend,
            num_threads = self.num_threads.map(NonZeroUsize::get),
            "building executor"
        );
        match self.backend {
            Backend::Serial => Ok(RuntimeExecutor::Serial(SerialExecutor)),
            #[cfg(feature = "threads")]
            Backend::Threads => {
                if self.num_threads.is_none() && self.thread_name_prefix.is_none() {
                    return Ok(RuntimeExecutor::Threads(ThreadPoolExecutor::global()));
                }
                // rayon picks the thread count when it isn't specified
                let mut builder = rayon::ThreadPoolBuilder::new();
                if let Some(num_threads) = self.num_threads {
                    builder = builder.num_threads(num_threads.get());
                }
                if let Some(prefix) = self.thread_name_prefix.clone() {
                    builder = builder.thread_name(move |i| format!("{prefix}-{i}"));
                }
                Ok(RuntimeExecutor::Threads(ThreadPoolExecutor::with_builder(
                    builder,
                )?))
            }
            #[cfg(not(feature = "threads"))]
            Backend::Threads => Err(Error::config(
                BACKEND_ENV_VAR,
                String::from("threads"),
                "this build doesn't include the \"threads\" feature",
            )),
        }
    }
}

/// Builds a [`RuntimeSpec`]
#[derive(Clone, Debug, Default)]
pub struct RuntimeSpecBuilder {
    spec: RuntimeSpec,
}

impl RuntimeSpecBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from the values stored in the [`BACKEND_ENV_VAR`] and
    /// [`NUM_THREADS_ENV_VAR`] environment variables (unset variables keep
    /// their default values).
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Like [`RuntimeSpecBuilder::from_env`], but `lookup` provides the
    /// variables
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, Error> {
        let mut builder = Self::new();
        if let Some(value) = lookup(BACKEND_ENV_VAR) {
            builder = builder.backend(Backend::parse(&value)?);
        }
        if let Some(value) = lookup(NUM_THREADS_ENV_VAR) {
            let num_threads = value
                .trim()
                .parse::<usize>()
                .ok()
                .and_then(NonZeroUsize::new)
                .ok_or_else(|| {
                    Error::config(
                        NUM_THREADS_ENV_VAR,
                        value.clone(),
                        "expected a positive integer",
                    )
                })?;
            builder.spec.num_threads = Some(num_threads);
        }
        Ok(builder)
    }

    pub fn backend(mut self, backend: Backend) -> Self {
        self.spec.backend = backend;
        self
    }

    /// the number of worker threads (only used by [`Backend::Threads`])
    pub fn num_threads(mut self, num_threads: usize) -> Result<Self, Error> {
        let num_threads = NonZeroUsize::new(num_threads)
            .ok_or_else(|| Error::integer_range("num_threads", 0, 1, u64::MAX))?;
        self.spec.num_threads = Some(num_threads);
        Ok(self)
    }

    /// worker threads get named `"{prefix}-{i}"` (only used by
    /// [`Backend::Threads`], which then builds a dedicated pool)
    pub fn thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.spec.thread_name_prefix = Some(prefix.into());
        self
    }

    pub fn build(self) -> RuntimeSpec {
        self.spec
    }
}

/// The executor produced by [`RuntimeSpec::build_executor`].
///
/// [`Executor`] has generic methods (so it can't be used as a trait object).
/// This enum provides the runtime polymorphism instead.
pub enum RuntimeExecutor {
    Serial(SerialExecutor),
    #[cfg(feature = "threads")]
    Threads(ThreadPoolExecutor),
}

impl Executor for RuntimeExecutor {
    fn backend_name(&self) -> &'static str {
        match self {
            RuntimeExecutor::Serial(executor) => executor.backend_name(),
            #[cfg(feature = "threads")]
            RuntimeExecutor::Threads(executor) => executor.backend_name(),
        }
    }

    fn drive_reduce<S, E, F>(
        &self,
        range: IndexRange,
        grain: GrainSize,
        zero: S,
        partial_fn: &F,
    ) -> Result<S, E>
    where
        S: Scalar,
        E: Send,
        F: Fn(IndexRange) -> Result<S, E> + Sync,
    {
        match self {
            RuntimeExecutor::Serial(executor) => {
                executor.drive_reduce(range, grain, zero, partial_fn)
            }
            #[cfg(feature = "threads")]
            RuntimeExecutor::Threads(executor) => {
                executor.drive_reduce(range, grain, zero, partial_fn)
            }
        }
    }

    fn drive_map<T, S, E, F>(&self, items: &[T], out: &mut [S], item_fn: &F) -> Result<(), E>
    where
        T: Sync,
        S: Send,
        E: Send,
        F: Fn(&T) -> Result<S, E> + Sync,
    {
        match self {
            RuntimeExecutor::Serial(executor) => executor.drive_map(items, out, item_fn),
            #[cfg(feature = "threads")]
            RuntimeExecutor::Threads(executor) => executor.drive_map(items, out, item_fn),
        }
    }
}
