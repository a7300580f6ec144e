//! Scripted debugger host and recording engine backing the behavior tests.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::engine::{self, Engine, MemoryRange, Register, SymbolicId, TaintTarget};
use crate::host::{self, ArgLocation, Debugger};

/// Scripted stand-in for the debugger host. Reads are served from an explicit
/// byte map, so a missing byte behaves like an unmapped address.
pub struct ScriptedDebugger {
    pointer_width: usize,
    symbols: HashMap<&'static str, u64>,
    preexisting_breakpoints: HashSet<u64>,
    installed_breakpoints: Vec<u64>,
    memory: BTreeMap<u64, u8>,
    arguments: HashMap<usize, (u64, ArgLocation)>,
    comments: HashMap<u64, String>,
    resume_count: usize,
    invalidation_count: usize,
}

impl Default for ScriptedDebugger {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedDebugger {
    pub fn new() -> Self {
        Self {
            pointer_width: 8,
            symbols: HashMap::new(),
            preexisting_breakpoints: HashSet::new(),
            installed_breakpoints: Vec::new(),
            memory: BTreeMap::new(),
            arguments: HashMap::new(),
            comments: HashMap::new(),
            resume_count: 0,
            invalidation_count: 0,
        }
    }

    pub fn define_symbol(&mut self, name: &'static str, address: u64) {
        self.symbols.insert(name, address);
    }

    /// A breakpoint the user had already placed before setup ran.
    pub fn place_user_breakpoint(&mut self, address: u64) {
        self.preexisting_breakpoints.insert(address);
    }

    pub fn set_argument(&mut self, index: usize, value: u64, location: ArgLocation) {
        self.arguments.insert(index, (value, location));
    }

    pub fn write_bytes(&mut self, address: u64, bytes: &[u8]) {
        for (offset, byte) in bytes.iter().enumerate() {
            self.memory.insert(address + offset as u64, *byte);
        }
    }

    pub fn write_pointer(&mut self, address: u64, value: u64) {
        let bytes = value.to_le_bytes();
        self.write_bytes(address, &bytes[..self.pointer_width]);
    }

    pub fn write_cstring(&mut self, address: u64, text: &str) {
        self.write_bytes(address, text.as_bytes());
        self.memory.insert(address + text.len() as u64, 0);
    }

    pub fn installed_breakpoints(&self) -> &[u64] {
        &self.installed_breakpoints
    }

    pub fn comment_at(&self, address: u64) -> Option<&str> {
        self.comments.get(&address).map(String::as_str)
    }

    pub fn resume_count(&self) -> usize {
        self.resume_count
    }

    pub fn invalidation_count(&self) -> usize {
        self.invalidation_count
    }
}

impl Debugger for ScriptedDebugger {
    fn resolve_symbol(&self, name: &str) -> Option<u64> {
        self.symbols.get(name).copied()
    }

    fn has_breakpoint(&self, address: u64) -> bool {
        self.preexisting_breakpoints.contains(&address)
            || self.installed_breakpoints.contains(&address)
    }

    fn add_breakpoint(&mut self, address: u64) -> host::Result<()> {
        self.installed_breakpoints.push(address);
        Ok(())
    }

    fn resume(&mut self) -> host::Result<()> {
        self.resume_count += 1;
        Ok(())
    }

    fn invalidate_memory_maps(&mut self) {
        self.invalidation_count += 1;
    }

    fn argument_value(&self, index: usize) -> host::Result<u64> {
        self.arguments
            .get(&index)
            .map(|(value, _)| *value)
            .ok_or(host::Error::ArgumentUnavailable { index })
    }

    fn argument_location(&self, index: usize) -> host::Result<ArgLocation> {
        self.arguments
            .get(&index)
            .map(|(_, location)| location.clone())
            .ok_or(host::Error::ArgumentUnavailable { index })
    }

    fn read_pointer(&self, address: u64) -> host::Result<u64> {
        let mut bytes = [0u8; 8];
        for (offset, byte) in bytes.iter_mut().take(self.pointer_width).enumerate() {
            *byte = self
                .memory
                .get(&(address + offset as u64))
                .copied()
                .ok_or(host::Error::MemoryRead {
                    address,
                    size: self.pointer_width,
                })?;
        }
        Ok(u64::from_le_bytes(bytes))
    }

    fn read_byte(&self, address: u64) -> host::Result<u8> {
        self.memory
            .get(&address)
            .copied()
            .ok_or(host::Error::MemoryRead { address, size: 1 })
    }

    fn register_width(&self) -> usize {
        self.pointer_width
    }

    fn set_comment(&mut self, address: u64, text: &str) -> host::Result<()> {
        self.comments.insert(address, text.to_string());
        Ok(())
    }
}

/// Recording stand-in for the taint/symbolic engine. Marks are recorded in call
/// order; queries answer from the recorded state.
#[derive(Default)]
pub struct RecordingEngine {
    /// Taint marks in the order they were made.
    pub taints: Vec<(TaintTarget, u64)>,

    /// Symbolic conversions in the order they were made, with their labels.
    pub symbolized: Vec<(TaintTarget, u64, String)>,

    tainted_bytes: HashSet<u64>,
    tainted_registers: HashSet<String>,
    memory_ids: HashMap<u64, SymbolicId>,
    register_ids: HashMap<String, SymbolicId>,
    symbolized_ids: HashSet<SymbolicId>,
    next_id: u64,
    reject_marks: bool,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// An engine that refuses every marking request.
    pub fn rejecting_marks() -> Self {
        Self {
            reject_marks: true,
            ..Self::default()
        }
    }

    pub fn is_byte_tainted(&self, address: u64) -> bool {
        self.tainted_bytes.contains(&address)
    }

    pub fn tainted_byte_count(&self) -> usize {
        self.tainted_bytes.len()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.symbolized
            .iter()
            .map(|(_, _, label)| label.as_str())
            .collect()
    }

    /// Assign a symbolic expression to a register without going through a mark,
    /// controlling whether the expression counts as symbolized or concrete.
    pub fn preset_register_expression(&mut self, register: &Register, symbolized: bool) {
        let id = self.fresh_id();
        self.register_ids.insert(register.name.clone(), id);
        if symbolized {
            self.symbolized_ids.insert(id);
        }
    }

    fn fresh_id(&mut self) -> SymbolicId {
        self.next_id += 1;
        SymbolicId(self.next_id)
    }

    fn reject(&self, target: TaintTarget) -> engine::Result<()> {
        if self.reject_marks {
            Err(engine::Error::MarkRejected {
                target,
                reason: "scripted rejection".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

impl Engine for RecordingEngine {
    fn taint_memory(&mut self, range: &MemoryRange, value: u64) -> engine::Result<()> {
        self.reject(TaintTarget::Memory(*range))?;
        for offset in 0..range.size {
            self.tainted_bytes.insert(range.address + offset as u64);
        }
        self.taints.push((TaintTarget::Memory(*range), value));
        Ok(())
    }

    fn taint_register(&mut self, register: &Register, value: u64) -> engine::Result<()> {
        self.reject(TaintTarget::Register(register.clone()))?;
        self.tainted_registers.insert(register.name.clone());
        self.taints
            .push((TaintTarget::Register(register.clone()), value));
        Ok(())
    }

    fn symbolize_memory(
        &mut self,
        range: &MemoryRange,
        value: u64,
        label: &str,
    ) -> engine::Result<()> {
        self.reject(TaintTarget::Memory(*range))?;
        let id = self.fresh_id();
        for offset in 0..range.size {
            self.memory_ids.insert(range.address + offset as u64, id);
        }
        self.symbolized_ids.insert(id);
        self.symbolized
            .push((TaintTarget::Memory(*range), value, label.to_string()));
        Ok(())
    }

    fn symbolize_register(
        &mut self,
        register: &Register,
        value: u64,
        label: &str,
    ) -> engine::Result<()> {
        self.reject(TaintTarget::Register(register.clone()))?;
        let id = self.fresh_id();
        self.register_ids.insert(register.name.clone(), id);
        self.symbolized_ids.insert(id);
        self.symbolized
            .push((TaintTarget::Register(register.clone()), value, label.to_string()));
        Ok(())
    }

    fn is_memory_tainted(&self, range: &MemoryRange) -> bool {
        (0..range.size).any(|offset| self.tainted_bytes.contains(&(range.address + offset as u64)))
    }

    fn is_register_tainted(&self, register: &Register) -> bool {
        self.tainted_registers.contains(&register.name)
    }

    fn symbolic_memory_id(&self, address: u64) -> Option<SymbolicId> {
        self.memory_ids.get(&address).copied()
    }

    fn symbolic_register_id(&self, register: &Register) -> Option<SymbolicId> {
        self.register_ids.get(&register.name).copied()
    }

    fn is_symbolized(&self, id: SymbolicId) -> bool {
        self.symbolized_ids.contains(&id)
    }
}
