use tracing::{debug, info, trace, warn};

use crate::analysis::Session;
use crate::engine::{self, Engine, MemoryRange, TaintTarget};
use crate::host::{self, ArgLocation, Debugger};
use crate::registry::{Callback, PendingActions};

/// Entry symbols probed when hooking the target, in order.
const ENTRY_SYMBOLS: [&str; 2] = ["main", "_main"];

/// Width of the `argc` cell on ABIs that pass the first argument in memory.
const ARGC_CELL_SIZE: usize = 4;

/// Result returned by the seeding callback
pub type Result<T> = std::result::Result<T, Error>;

/// Possible seeding errors
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Error from the debugger host while locating or reading arguments.
    #[error(transparent)]
    Host(#[from] host::Error),

    /// Error from the analysis engine while marking state.
    #[error(transparent)]
    Engine(#[from] engine::Error),
}

/// Locate the canonical entry function through the host's symbol resolution,
/// trying the primary name first and the alternate spelling second.
pub fn find_entry<D: Debugger>(debugger: &D) -> Option<u64> {
    ENTRY_SYMBOLS
        .iter()
        .find_map(|name| debugger.resolve_symbol(name))
}

/// Hook the entry function so the program arguments are seeded when execution
/// reaches it. Does nothing unless [Config::mark_argv] is set. Returns whether a
/// hook was installed; an unresolved entry symbol is reported and treated as "no
/// hook", leaving the host process untouched.
///
/// [Config::mark_argv]: crate::config::Config::mark_argv
pub fn install_argument_seeding<D: Debugger + 'static, E: Engine + 'static>(
    session: &mut Session<D, E>,
    pending: &mut PendingActions<D, E>,
) -> host::Result<bool> {
    if !session.config.mark_argv {
        return Ok(false);
    }

    let Some(entry) = find_entry(&session.debugger) else {
        warn!("entry function not found, program arguments will not be marked");
        return Ok(false);
    };
    debug!(address = format!("{entry:#x}"), "entry function found");

    let callback: Callback<D, E> = Box::new(|session, address| {
        if let Err(err) = seed_program_arguments(session, address) {
            warn!(error = %err, "argument seeding failed");
        }
    });
    pending.register(&mut session.debugger, entry, callback)?;

    Ok(true)
}

/// Breakpoint callback at the entry function: discover `argc`/`argv`, mark every
/// argument byte in the engine, and arm the trigger once anything is marked.
///
/// A failed read of an `argv` slot ends the iteration outright: the remaining
/// slot addresses are derived from the same sequential layout and are unreliable
/// once one read fails. Arguments already processed stay marked.
pub fn seed_program_arguments<D: Debugger, E: Engine + 'static>(
    session: &mut Session<D, E>,
    _address: u64,
) -> Result<()> {
    // The target has only just started running; force the host to re-enumerate
    // its segments before the reads below.
    session.debugger.invalidate_memory_maps();

    let argc = session.debugger.argument_value(0)?;
    let argv = session.debugger.argument_value(1)?;
    debug!(argc, argv = format!("{argv:#x}"), "located program arguments");

    let marker = session.config.mode.marker::<E>();

    if session.config.mark_argc {
        if let Err(err) = mark_argc(session, argc) {
            warn!(error = %err, "failed to locate the argc slot");
        }
    }

    let width = session.debugger.register_width() as u64;
    let start = if session.config.skip_program_path { 1 } else { 0 };
    for index in start..argc {
        let slot = argv + index * width;
        let string_base = match session.debugger.read_pointer(slot) {
            Ok(pointer) => pointer,
            Err(err) => {
                warn!(
                    address = format!("{slot:#x}"),
                    error = %err,
                    "failed to read argv entry, stopping argument iteration"
                );
                break;
            }
        };

        let marked = seed_argument_bytes(session, index, string_base);
        if marked > 1 {
            session.trigger.fire();
            debug!(bytes = marked, "argv[{index}] {}", marker.participle());
        }
    }

    Ok(())
}

/// Mark `argc` itself: the 4-byte memory cell on ABIs where the first argument
/// arrives in memory, or the register holding it elsewhere, with the concrete
/// count preserved as the seed value.
fn mark_argc<D: Debugger, E: Engine + 'static>(session: &mut Session<D, E>, argc: u64) -> Result<()> {
    let marker = session.config.mode.marker::<E>();

    let target = match session.debugger.argument_location(0)? {
        ArgLocation::Memory(address) => {
            info!(
                address = format!("{address:#x}"),
                "{} argc at memory",
                marker.gerund()
            );
            TaintTarget::Memory(MemoryRange::new(address, ARGC_CELL_SIZE))
        }
        ArgLocation::Register(register) => {
            info!(register = %register, "{} argc in register", marker.gerund());
            TaintTarget::Register(register)
        }
    };

    match marker.mark(&mut session.engine, &target, argc, "argc") {
        Ok(()) => {
            debug!("argc {}", marker.participle());
            session.trigger.fire();
        }
        Err(err) => warn!(error = %err, "failed to mark argc"),
    }

    Ok(())
}

/// Mark the bytes of one argument string, stopping at the null terminator unless
/// the configuration says to include it. Returns the number of bytes marked.
fn seed_argument_bytes<D: Debugger, E: Engine + 'static>(
    session: &mut Session<D, E>,
    index: u64,
    base: u64,
) -> usize {
    let marker = session.config.mode.marker::<E>();

    let mut offset: u64 = 0;
    loop {
        let address = base + offset;
        let byte = match session.debugger.read_byte(address) {
            Ok(byte) => byte,
            Err(err) => {
                warn!(
                    address = format!("{address:#x}"),
                    error = %err,
                    "failed to read argument byte"
                );
                break;
            }
        };

        if byte == 0 && !session.config.mark_terminator {
            break;
        }

        trace!("{} argv[{index}][{offset}]: {byte:#04x}", marker.gerund());
        let target = TaintTarget::Memory(MemoryRange::byte(address));
        let label = format!("argv[{index}][{offset}]");
        if let Err(err) = marker.mark(&mut session.engine, &target, u64::from(byte), &label) {
            warn!(error = %err, "failed to mark argument byte");
            break;
        }

        offset += 1;
        if byte == 0 {
            break;
        }
    }

    offset as usize
}
