//! Handle-based compatibility surface for procedural callers.
//!
//! Older model code drives storage through integer handles and status
//! codes: open a handle, set rank and field counts, set string values,
//! write, flush, close. [`LegacySink`] maps those calls onto a
//! [`DataSink`]. Every entry point returns [`STATUS_OK`] or the result of
//! [`handle_error`].

use std::error::Error;

use indexmap::IndexMap;
use isobar_core::Environment;

use crate::error::SinkError;
use crate::sink::DataSink;

/// Status code of a successful legacy call.
pub const STATUS_OK: i32 = 0;

/// Status code of a failed legacy call.
pub const STATUS_ERROR: i32 = -2;

/// Report a failed legacy call and return its status code.
///
/// Aborts the process instead when `ISOBAR_ABORT_ON_ERROR` is set.
pub fn handle_error(err: &(dyn Error + 'static)) -> i32 {
    handle_error_with(Environment::get(), err)
}

/// [`handle_error`] against explicit environment flags.
pub fn handle_error_with(env: &Environment, err: &(dyn Error + 'static)) -> i32 {
    tracing::error!(error = err, "legacy sink call failed");
    if env.abort_on_error {
        tracing::error!("ISOBAR_ABORT_ON_ERROR is set, aborting");
        std::process::abort();
    }
    STATUS_ERROR
}

/// State attached to one open legacy handle.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HandleState {
    /// Name given at open.
    pub name: String,
    /// Open mode (`r`, `w` or `a`).
    pub mode: String,
    /// Rank of the writing process, once set.
    pub rank: Option<i32>,
    /// Field counts (all ranks, this rank), once set.
    pub field_count: Option<(i32, i32)>,
    /// String values set on the handle, in order.
    pub values: IndexMap<String, String>,
    /// Messages written through the handle.
    pub writes: u64,
}

/// Integer-handle adapter over a [`DataSink`].
pub struct LegacySink {
    sink: Box<dyn DataSink>,
    handles: IndexMap<i32, HandleState>,
    next_handle: i32,
    env: Environment,
}

impl LegacySink {
    /// Adapt `sink`, reading abort behaviour from the process environment.
    pub fn new(sink: Box<dyn DataSink>) -> Self {
        Self::with_environment(sink, *Environment::get())
    }

    /// Adapt `sink` with explicit environment flags.
    pub fn with_environment(sink: Box<dyn DataSink>, env: Environment) -> Self {
        Self {
            sink,
            handles: IndexMap::new(),
            next_handle: 1,
            env,
        }
    }

    /// State of an open handle.
    pub fn handle(&self, handle: i32) -> Option<&HandleState> {
        self.handles.get(&handle)
    }

    /// Open a handle named `name`; the new handle is stored in `handle`.
    pub fn open(&mut self, name: &str, handle: &mut i32, mode: &str) -> i32 {
        if !matches!(mode, "r" | "w" | "a") {
            return self.fail(SinkError::InvalidMode {
                mode: mode.to_string(),
            });
        }
        let id = self.next_handle;
        self.next_handle += 1;
        self.handles.insert(
            id,
            HandleState {
                name: name.to_string(),
                mode: mode.to_string(),
                ..HandleState::default()
            },
        );
        tracing::debug!(handle = id, name, mode, "opened legacy handle");
        *handle = id;
        STATUS_OK
    }

    /// Flush and release a handle.
    pub fn close(&mut self, handle: i32) -> i32 {
        if self.handles.shift_remove(&handle).is_none() {
            return self.fail(SinkError::UnknownHandle { handle });
        }
        let result = self.sink.flush();
        self.status(result)
    }

    /// Record the rank writing through `handle`.
    pub fn set_rank(&mut self, handle: i32, rank: i32) -> i32 {
        self.update(handle, |state| state.rank = Some(rank))
    }

    /// Record how many fields all ranks and this rank will write.
    pub fn set_field_count(&mut self, handle: i32, all_ranks: i32, this_rank: i32) -> i32 {
        self.update(handle, |state| state.field_count = Some((all_ranks, this_rank)))
    }

    /// Set a named string value on `handle`.
    pub fn set_value(&mut self, handle: i32, name: &str, value: &str) -> i32 {
        self.update(handle, |state| {
            state.values.insert(name.to_string(), value.to_string());
        })
    }

    /// Flush the underlying sink.
    pub fn flush(&mut self, handle: i32) -> i32 {
        if !self.handles.contains_key(&handle) {
            return self.fail(SinkError::UnknownHandle { handle });
        }
        let result = self.sink.flush();
        self.status(result)
    }

    /// Write one encoded message through `handle`.
    pub fn write(&mut self, handle: i32, bytes: &[u8]) -> i32 {
        match self.handles.get_mut(&handle) {
            Some(state) => state.writes += 1,
            None => return self.fail(SinkError::UnknownHandle { handle }),
        }
        let result = self.sink.write(bytes);
        self.status(result)
    }

    fn update(&mut self, handle: i32, f: impl FnOnce(&mut HandleState)) -> i32 {
        match self.handles.get_mut(&handle) {
            Some(state) => {
                f(state);
                STATUS_OK
            }
            None => self.fail(SinkError::UnknownHandle { handle }),
        }
    }

    fn status(&self, result: Result<(), SinkError>) -> i32 {
        match result {
            Ok(()) => STATUS_OK,
            Err(err) => self.fail(err),
        }
    }

    fn fail(&self, err: SinkError) -> i32 {
        handle_error_with(&self.env, &err)
    }
}

impl std::fmt::Debug for LegacySink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LegacySink")
            .field("handles", &self.handles)
            .finish_non_exhaustive()
    }
}
