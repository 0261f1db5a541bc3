//! Instruction id to action mapping.

use std::collections::HashMap;
use std::fmt;
use std::thread;
use std::time::Duration;

use super::instruction::{NavIns, NavInsId};
use super::types::{NavError, NavResult};
use crate::backend::Backend;

/// Action run for an instruction, receiving the backend and the instruction
/// arguments
pub type Callback<B> = Box<dyn Fn(&mut B, &NavIns) -> NavResult<()>>;

/// Default bound of the wait instructions when no timeout argument is given
pub const DEFAULT_WAIT_TIMEOUT: Duration = Duration::from_secs(10);

/// Callbacks of one navigator, keyed by instruction id
pub struct CallbackRegistry<B> {
    callbacks: HashMap<NavInsId, Callback<B>>,
}

impl<B> Default for CallbackRegistry<B> {
    fn default() -> Self {
        Self {
            callbacks: HashMap::new(),
        }
    }
}

impl<B> CallbackRegistry<B> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback, replacing any previous one
    pub fn insert(&mut self, id: NavInsId, callback: Callback<B>) {
        self.callbacks.insert(id, callback);
    }

    /// Register a callback, refusing to shadow an existing one unless
    /// `override_existing` is set
    pub fn register(&mut self, id: NavInsId, callback: Callback<B>, override_existing: bool) -> NavResult<()> {
        if !override_existing && self.callbacks.contains_key(&id) {
            return Err(NavError::CallbackExists(id));
        }
        self.insert(id, callback);
        Ok(())
    }

    pub fn get(&self, id: NavInsId) -> Option<&Callback<B>> {
        self.callbacks.get(&id)
    }

    pub fn contains(&self, id: NavInsId) -> bool {
        self.callbacks.contains_key(&id)
    }

    /// Registered ids, sorted
    pub fn ids(&self) -> Vec<NavInsId> {
        let mut ids: Vec<NavInsId> = self.callbacks.keys().copied().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }
}

impl<B> fmt::Debug for CallbackRegistry<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.ids()).finish()
    }
}

/// Wait primitives shared by every device family
pub(crate) fn register_waits<B: Backend + 'static>(registry: &mut CallbackRegistry<B>) {
    registry.insert(
        NavInsId::Wait,
        Box::new(|_backend: &mut B, ins: &NavIns| {
            let delay = ins
                .secs_param(0, "delay")?
                .ok_or_else(|| NavError::InvalidArgument {
                    id: ins.id,
                    reason: "missing 'delay'".to_string(),
                })?;
            thread::sleep(delay);
            Ok(())
        }),
    );
    registry.insert(
        NavInsId::WaitForScreenChange,
        Box::new(|backend: &mut B, ins: &NavIns| {
            let timeout = ins.secs_param(0, "timeout")?.unwrap_or(DEFAULT_WAIT_TIMEOUT);
            backend.wait_for_screen_change(timeout)?;
            Ok(())
        }),
    );
    registry.insert(
        NavInsId::WaitForHomeScreen,
        Box::new(|backend: &mut B, ins: &NavIns| {
            let timeout = ins.secs_param(0, "timeout")?.unwrap_or(DEFAULT_WAIT_TIMEOUT);
            backend.wait_for_home_screen(timeout)?;
            Ok(())
        }),
    );
    registry.insert(
        NavInsId::WaitForTextOnScreen,
        Box::new(|backend: &mut B, ins: &NavIns| {
            let text = ins.required_str(0, "text")?;
            let timeout = ins.secs_param(1, "timeout")?.unwrap_or(DEFAULT_WAIT_TIMEOUT);
            backend.wait_for_text_on_screen(text, timeout)?;
            Ok(())
        }),
    );
    registry.insert(
        NavInsId::WaitForTextNotOnScreen,
        Box::new(|backend: &mut B, ins: &NavIns| {
            let text = ins.required_str(0, "text")?;
            let timeout = ins.secs_param(1, "timeout")?.unwrap_or(DEFAULT_WAIT_TIMEOUT);
            backend.wait_for_text_not_on_screen(text, timeout)?;
            Ok(())
        }),
    );
}
