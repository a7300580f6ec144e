use crate::engine::AnalysisMode;

/// Process-wide behavior switches. The embedding plugin populates this once; the
/// pipeline only ever reads it.
#[derive(Debug, Clone)]
pub struct Config {
    /// Whether marks are taint or named symbolic variables.
    pub mode: AnalysisMode,

    /// Hook the entry function and mark the argument strings.
    pub mark_argv: bool,

    /// Also mark the `argc` cell or register itself.
    pub mark_argc: bool,

    /// Start seeding at `argv[1]` instead of the program path.
    pub skip_program_path: bool,

    /// Mark the null terminator in addition to the string bytes.
    pub mark_terminator: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mode: AnalysisMode::default(),
            mark_argv: true,
            mark_argc: false,
            skip_program_path: false,
            mark_terminator: false,
        }
    }
}
