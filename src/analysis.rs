use crate::annotate::{self, DecodedInstruction};
use crate::config::Config;
use crate::engine::Engine;
use crate::host::{self, Debugger};
use crate::registry::PendingActions;
use crate::seeder;
use crate::trigger::Trigger;

/// The process-wide analysis state, owned explicitly and passed to each component
/// rather than living in globals. Everything here is mutated only from the host's
/// single control thread.
pub struct Session<D: Debugger, E: Engine> {
    pub debugger: D,
    pub engine: E,
    pub config: Config,
    pub trigger: Trigger,
}

impl<D: Debugger, E: Engine> Session<D, E> {
    pub fn new(debugger: D, engine: E, config: Config) -> Self {
        Self {
            debugger,
            engine,
            config,
            trigger: Trigger::new(),
        }
    }
}

/// Facade tying the owned [Session] to the pending-action registry and exposing
/// the entry points the host wires its events to.
pub struct Analysis<D: Debugger, E: Engine> {
    session: Session<D, E>,
    pending: PendingActions<D, E>,
}

impl<D: Debugger, E: Engine + 'static> Analysis<D, E> {
    pub fn new(debugger: D, engine: E, config: Config) -> Self {
        Self {
            session: Session::new(debugger, engine, config),
            pending: PendingActions::new(),
        }
    }

    pub fn session(&self) -> &Session<D, E> {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session<D, E> {
        &mut self.session
    }

    pub fn pending(&self) -> &PendingActions<D, E> {
        &self.pending
    }

    /// Hook the entry function and defer argument seeding to its breakpoint.
    /// Returns whether a hook was installed. See
    /// [seeder::install_argument_seeding].
    pub fn install_argument_seeding(&mut self) -> host::Result<bool>
    where
        D: 'static,
        E: 'static,
    {
        seeder::install_argument_seeding(&mut self.session, &mut self.pending)
    }

    /// Host breakpoint event: run any deferred actions registered at `address`.
    /// Returns the number of actions run.
    pub fn on_breakpoint(&mut self, address: u64) -> usize {
        self.pending.dispatch(&mut self.session, address)
    }

    /// Host per-instruction event: annotate the controlled reads of one executed
    /// instruction. Returns the comment written, if any.
    pub fn on_instruction(
        &mut self,
        instruction: &DecodedInstruction,
        address: u64,
    ) -> host::Result<Option<String>> {
        annotate::annotate_controlled_reads(&mut self.session, instruction, address)
    }

    /// Whether anything has been marked yet. Downstream instrumentation polls
    /// this before paying the engine's per-instruction overhead.
    pub fn is_armed(&self) -> bool {
        self.session.trigger.is_armed()
    }
}
