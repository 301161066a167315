//! Engine descriptors
//!
//! The interpreter does not load or drive any engine itself; the outer
//! layer hands it a descriptor saying which engine is active and,
//! optionally, a hook that runs generated code live.

use anyhow::Result;

/// Hook that feeds a generated code string to a live engine.
pub type ExecHook = Box<dyn FnMut(&str) -> Result<()>>;

/// Which engine generated code targets, plus an optional execution hook.
pub struct EngineDescriptor {
    pub name: String,
    pub exec: Option<ExecHook>,
}

impl EngineDescriptor {
    /// Descriptor for code generation only, with no live execution.
    pub fn named(name: impl Into<String>) -> Self {
        Self { name: name.into(), exec: None }
    }

    pub fn with_exec(name: impl Into<String>, hook: ExecHook) -> Self {
        Self { name: name.into(), exec: Some(hook) }
    }
}

impl std::fmt::Debug for EngineDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineDescriptor")
            .field("name", &self.name)
            .field("exec", &self.exec.is_some())
            .finish()
    }
}
