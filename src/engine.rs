use std::fmt;

/// Result returned by engine APIs
pub type Result<T> = std::result::Result<T, Error>;

/// Possible engine errors
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The engine rejected a marking request.
    #[error("failed to mark {target}: {reason}")]
    MarkRejected { target: TaintTarget, reason: String },

    /// An internal engine error outside the categories above.
    #[error("internal engine error: {0}")]
    InternalError(String),
}

/// A named machine register with its width in bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Register {
    pub name: String,
    pub size: usize,
}

impl Register {
    pub fn new(name: impl Into<String>, size: usize) -> Self {
        Self {
            name: name.into(),
            size,
        }
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A contiguous range of target memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MemoryRange {
    pub address: u64,
    pub size: usize,
}

impl MemoryRange {
    pub fn new(address: u64, size: usize) -> Self {
        Self { address, size }
    }

    /// A single-byte range, the granularity argument seeding works at.
    pub fn byte(address: u64) -> Self {
        Self::new(address, 1)
    }
}

impl fmt::Display for MemoryRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{address:#x}+{size}",
            address = self.address,
            size = self.size
        )
    }
}

/// Something the engine can mark or query: a register or a memory range.
/// Constructed transiently per byte or access, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaintTarget {
    Register(Register),
    Memory(MemoryRange),
}

impl fmt::Display for TaintTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Register(register) => write!(f, "register {register}"),
            Self::Memory(range) => write!(f, "memory {range}"),
        }
    }
}

/// Identifier the engine assigns to a symbolic expression. Queries that return no
/// id mean the location has never been symbolized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SymbolicId(pub u64);

impl fmt::Display for SymbolicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which engine operation every seeding and query step uses. Process-wide and
/// read-only once analysis starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnalysisMode {
    #[default]
    Taint,
    Symbolic,
}

impl AnalysisMode {
    /// The marking capability for this mode.
    pub fn marker<E: Engine + ?Sized>(self) -> &'static dyn Marker<E> {
        match self {
            Self::Taint => &TaintMarker,
            Self::Symbolic => &SymbolicMarker,
        }
    }
}

/// Interface to the external taint/symbolic engine. The engine owns propagation;
/// this crate only seeds state and queries it.
pub trait Engine {
    /// Taint a memory range, preserving its concrete shadow value.
    fn taint_memory(&mut self, range: &MemoryRange, value: u64) -> Result<()>;

    /// Taint a register, preserving its concrete shadow value.
    fn taint_register(&mut self, register: &Register, value: u64) -> Result<()>;

    /// Convert a memory range into a named symbolic variable seeded with its
    /// concrete value.
    fn symbolize_memory(&mut self, range: &MemoryRange, value: u64, label: &str) -> Result<()>;

    /// Convert a register into a named symbolic variable seeded with its concrete
    /// value.
    fn symbolize_register(&mut self, register: &Register, value: u64, label: &str) -> Result<()>;

    /// Whether any byte of the range is tainted.
    fn is_memory_tainted(&self, range: &MemoryRange) -> bool;

    /// Whether the register is tainted.
    fn is_register_tainted(&self, register: &Register) -> bool;

    /// The symbolic expression id for the memory cell at `address`, if one has
    /// been assigned.
    fn symbolic_memory_id(&self, address: u64) -> Option<SymbolicId>;

    /// The symbolic expression id for the register, if one has been assigned.
    fn symbolic_register_id(&self, register: &Register) -> Option<SymbolicId>;

    /// Whether the expression behind `id` is symbolized rather than concrete.
    /// Unknown ids must be reported as `false`, never as an error.
    fn is_symbolized(&self, id: SymbolicId) -> bool;
}

/// Mode-independent marking and query capability. The seeder and the annotator
/// only ever talk to a marker; the [AnalysisMode] branching lives in the two
/// implementations below and nowhere else.
pub trait Marker<E: Engine + ?Sized> {
    /// Mark `target` as controlled, seeding the engine with the concrete `value`
    /// currently held there. `label` names the mark for engines that track
    /// variables by name.
    fn mark(&self, engine: &mut E, target: &TaintTarget, value: u64, label: &str) -> Result<()>;

    /// Whether `target` is currently controlled.
    fn is_controlled(&self, engine: &E, target: &TaintTarget) -> bool;

    /// "Tainted" or "Symbolized", for user-facing annotations.
    fn participle(&self) -> &'static str;

    /// "Tainting" or "Symbolizing", for log messages.
    fn gerund(&self) -> &'static str;
}

/// Marking capability for [AnalysisMode::Taint].
pub struct TaintMarker;

impl<E: Engine + ?Sized> Marker<E> for TaintMarker {
    fn mark(&self, engine: &mut E, target: &TaintTarget, value: u64, _label: &str) -> Result<()> {
        match target {
            TaintTarget::Memory(range) => engine.taint_memory(range, value),
            TaintTarget::Register(register) => engine.taint_register(register, value),
        }
    }

    fn is_controlled(&self, engine: &E, target: &TaintTarget) -> bool {
        match target {
            TaintTarget::Memory(range) => engine.is_memory_tainted(range),
            TaintTarget::Register(register) => engine.is_register_tainted(register),
        }
    }

    fn participle(&self) -> &'static str {
        "Tainted"
    }

    fn gerund(&self) -> &'static str {
        "Tainting"
    }
}

/// Marking capability for [AnalysisMode::Symbolic].
pub struct SymbolicMarker;

impl<E: Engine + ?Sized> Marker<E> for SymbolicMarker {
    fn mark(&self, engine: &mut E, target: &TaintTarget, value: u64, label: &str) -> Result<()> {
        match target {
            TaintTarget::Memory(range) => engine.symbolize_memory(range, value, label),
            TaintTarget::Register(register) => engine.symbolize_register(register, value, label),
        }
    }

    fn is_controlled(&self, engine: &E, target: &TaintTarget) -> bool {
        let id = match target {
            TaintTarget::Memory(range) => engine.symbolic_memory_id(range.address),
            TaintTarget::Register(register) => engine.symbolic_register_id(register),
        };

        // An unset id means "not symbolized", never an error.
        id.map(|id| engine.is_symbolized(id)).unwrap_or(false)
    }

    fn participle(&self) -> &'static str {
        "Symbolized"
    }

    fn gerund(&self) -> &'static str {
        "Symbolizing"
    }
}
