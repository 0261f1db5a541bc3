pub mod app;
pub mod emulator;
pub mod framebuffer;
pub mod interface;
pub mod physical;
pub mod stub;
pub mod types;

pub use app::{AppModel, AutoTransition, CommandModel, ScreenModel, TouchRegion};
pub use emulator::EmulatorBackend;
pub use framebuffer::Framebuffer;
pub use interface::{Backend, screen_matches};
pub use physical::PhysicalBackend;
pub use stub::{StubBackend, StubCall};
pub use types::{BackendError, BackendResult, Crop, ScreenContent, SwipeDirection};
