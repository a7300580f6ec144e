use tracing::warn;

use crate::analysis::Session;
use crate::engine::Engine;
use crate::host::{self, Debugger};

/// Handler invoked with the session context and the hit address when the
/// breakpoint backing a pending action fires.
pub type Callback<D, E> = Box<dyn FnMut(&mut Session<D, E>, u64)>;

/// A deferred action bound to a breakpoint address. Created once at setup and
/// consumed the first time its address is hit.
pub struct PendingAction<D: Debugger, E: Engine> {
    address: u64,
    ignore_breakpoint: bool,
    callback: Callback<D, E>,
}

impl<D: Debugger, E: Engine> PendingAction<D, E> {
    pub fn address(&self) -> u64 {
        self.address
    }

    /// Whether a breakpoint already existed at this address when the action was
    /// registered. If so, the stop belongs to the user and execution is not
    /// silently resumed after the action runs.
    pub fn ignores_breakpoint(&self) -> bool {
        self.ignore_breakpoint
    }
}

/// The shared sequence of pending actions. Insertion order carries no meaning;
/// dispatch looks actions up by address.
pub struct PendingActions<D: Debugger, E: Engine> {
    actions: Vec<PendingAction<D, E>>,
}

impl<D: Debugger, E: Engine> Default for PendingActions<D, E> {
    fn default() -> Self {
        Self {
            actions: Vec::new(),
        }
    }
}

impl<D: Debugger, E: Engine> PendingActions<D, E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    pub fn actions(&self) -> impl Iterator<Item = &PendingAction<D, E>> {
        self.actions.iter()
    }

    /// Register `callback` to run when `address` is hit.
    ///
    /// If no action covers `address` yet, the host decides the flag: a breakpoint
    /// already present there belongs to the user (`ignore_breakpoint = true`),
    /// otherwise a software breakpoint is installed and the stop will be resumed
    /// transparently. A later registration at a covered address inherits the
    /// first action's flag, so the registry never holds conflicting flags for one
    /// address.
    pub fn register(
        &mut self,
        debugger: &mut D,
        address: u64,
        callback: Callback<D, E>,
    ) -> host::Result<()> {
        let ignore_breakpoint = match self.actions.iter().find(|action| action.address == address) {
            Some(existing) => existing.ignore_breakpoint,
            None => {
                let preexisting = debugger.has_breakpoint(address);
                if !preexisting {
                    debugger.add_breakpoint(address)?;
                }
                preexisting
            }
        };

        self.actions.push(PendingAction {
            address,
            ignore_breakpoint,
            callback,
        });

        Ok(())
    }

    /// Host breakpoint event entry point. Removes every action registered at
    /// `address`, invokes each callback exactly once, and resumes the target
    /// transparently when the stop exists only for instrumentation. Returns the
    /// number of actions run.
    pub fn dispatch(&mut self, session: &mut Session<D, E>, address: u64) -> usize {
        let mut hits = Vec::new();
        let mut index = 0;
        while index < self.actions.len() {
            if self.actions[index].address == address {
                hits.push(self.actions.swap_remove(index));
            } else {
                index += 1;
            }
        }

        let count = hits.len();
        let mut resume = false;
        for mut action in hits {
            (action.callback)(session, address);
            resume |= !action.ignore_breakpoint;
        }

        if resume {
            if let Err(err) = session.debugger.resume() {
                warn!(
                    address = format!("{address:#x}"),
                    error = %err,
                    "failed to resume after instrumentation breakpoint"
                );
            }
        }

        count
    }
}
