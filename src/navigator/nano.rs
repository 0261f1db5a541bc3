//! Callback table of button devices.

use super::callbacks::{CallbackRegistry, register_waits};
use super::instruction::{NavIns, NavInsId};
use crate::backend::Backend;

/// Callbacks for NanoS, NanoSP and NanoX
pub fn callbacks<B: Backend + 'static>() -> CallbackRegistry<B> {
    let mut registry = CallbackRegistry::new();
    register_waits(&mut registry);
    registry.insert(
        NavInsId::RightClick,
        Box::new(|backend: &mut B, _: &NavIns| Ok(backend.right_click()?)),
    );
    registry.insert(
        NavInsId::LeftClick,
        Box::new(|backend: &mut B, _: &NavIns| Ok(backend.left_click()?)),
    );
    registry.insert(
        NavInsId::BothClick,
        Box::new(|backend: &mut B, _: &NavIns| Ok(backend.both_click()?)),
    );
    registry
}
