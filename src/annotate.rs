use crate::analysis::Session;
use crate::engine::{Engine, MemoryRange, Register, TaintTarget};
use crate::host::{self, Debugger};

/// One executed instruction as decoded by the host's stepping machinery, reduced
/// to the accesses the annotator inspects. Memory accesses carry the resolved
/// runtime address; decoded operands may not, which is why annotation queries go
/// by access and not by operand.
#[derive(Debug, Clone, Default)]
pub struct DecodedInstruction {
    /// Registers the instruction reads, in enumeration order.
    pub read_registers: Vec<Register>,

    /// Memory load accesses performed by the instruction.
    pub load_accesses: Vec<MemoryRange>,
}

impl DecodedInstruction {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Inspect one executed instruction and attach a comment at its address naming
/// the read registers and loaded memory cells that are currently controlled.
/// Returns the comment written, or `None` when nothing was controlled. In that
/// case no comment is written and any prior comment at the address is left
/// untouched. Re-annotating the same address overwrites: the latest state wins.
pub fn annotate_controlled_reads<D: Debugger, E: Engine + 'static>(
    session: &mut Session<D, E>,
    instruction: &DecodedInstruction,
    address: u64,
) -> host::Result<Option<String>> {
    let marker = session.config.mode.marker::<E>();

    let mut registers = String::new();
    for register in &instruction.read_registers {
        let target = TaintTarget::Register(register.clone());
        if marker.is_controlled(&session.engine, &target) {
            registers.push_str(&register.name);
            registers.push(' ');
        }
    }

    let mut memory = String::new();
    for access in &instruction.load_accesses {
        let target = TaintTarget::Memory(*access);
        if marker.is_controlled(&session.engine, &target) {
            memory.push_str(&format!("{address:#x} ", address = access.address));
        }
    }

    let mut comment = String::new();
    if !registers.is_empty() {
        comment.push_str(&format!("{} regs: {registers}", marker.participle()));
    }
    if !memory.is_empty() {
        comment.push_str(&format!("{} memory: {memory}", marker.participle()));
    }

    if comment.is_empty() {
        return Ok(None);
    }

    session.debugger.set_comment(address, &comment)?;
    Ok(Some(comment))
}
