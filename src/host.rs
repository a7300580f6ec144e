use crate::engine::Register;

/// Result returned by host APIs
pub type Result<T> = std::result::Result<T, Error>;

/// Possible host errors. All of these are recoverable: the pipeline reacts by
/// skipping the affected piece of instrumentation, never by unwinding into the
/// host process.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A read of target memory failed. Typical causes are an unmapped address or
    /// a target that is not currently stopped.
    #[error("failed to read {size} byte(s) at {address:#x}")]
    MemoryRead { address: u64, size: usize },

    /// The calling-convention accessor could not produce the requested argument.
    #[error("calling-convention argument {index} is unavailable")]
    ArgumentUnavailable { index: usize },

    /// A software breakpoint could not be installed.
    #[error("failed to install breakpoint at {address:#x}")]
    BreakpointInstall { address: u64 },

    /// The target could not be transparently resumed.
    #[error("failed to resume the target process")]
    Resume,

    /// The annotation facility rejected the comment.
    #[error("failed to set comment at {address:#x}")]
    Comment { address: u64 },

    /// An internal host error outside the categories above.
    #[error("internal host error: {0}")]
    InternalError(String),
}

/// Where the calling convention places an argument at the current stop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgLocation {
    /// The argument arrives in a register (register-argument ABIs).
    Register(Register),

    /// The argument arrives in memory at the given address (stack-argument ABIs).
    Memory(u64),
}

/// Interface to the debugger that hosts the analysis. See the crate tests for a
/// scripted implementation; the embedding plugin provides the real one.
///
/// All reads return an explicit [Result]. In particular a failed pointer-sized
/// read is an [Error::MemoryRead], never an in-band sentinel value, so the full
/// 64-bit address range remains usable.
pub trait Debugger {
    /// Resolve a function name to its address, if the host knows the symbol.
    fn resolve_symbol(&self, name: &str) -> Option<u64>;

    /// Whether a breakpoint (of any origin) currently exists at `address`.
    fn has_breakpoint(&self, address: u64) -> bool;

    /// Install a software breakpoint at `address`.
    fn add_breakpoint(&mut self, address: u64) -> Result<()>;

    /// Resume the stopped target without surfacing the stop to the user.
    fn resume(&mut self) -> Result<()>;

    /// Drop any cached view of the target's memory map so the next read sees the
    /// segments of the running process. Hosts that enumerate mappings lazily may
    /// otherwise serve stale layout for a freshly-started target.
    fn invalidate_memory_maps(&mut self);

    /// Read the `index`th calling-convention argument as a machine word.
    fn argument_value(&self, index: usize) -> Result<u64>;

    /// Where the `index`th calling-convention argument lives at the current stop.
    fn argument_location(&self, index: usize) -> Result<ArgLocation>;

    /// Read a pointer-sized value from target memory.
    fn read_pointer(&self, address: u64) -> Result<u64>;

    /// Read a single byte from target memory.
    fn read_byte(&self, address: u64) -> Result<u8>;

    /// Width in bytes of a machine word on the target.
    fn register_width(&self) -> usize;

    /// Attach `text` as the comment at `address`, replacing any previous comment.
    fn set_comment(&mut self, address: u64, text: &str) -> Result<()>;
}
