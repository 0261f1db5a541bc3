//! Backend for a physical device held by an operator.
//!
//! Screenshots cannot be taken, so comparisons trivially succeed and waits
//! return at once. Each input is logged as an instruction for the operator;
//! the flow then blocks on the next APDU response until they perform it.

use std::path::Path;
use std::time::Duration;

use super::interface::Backend;
use super::types::{BackendResult, Crop, ScreenContent, SwipeDirection};
use crate::device::Device;

#[derive(Debug, Clone)]
pub struct PhysicalBackend {
    device: Device,
    instructions: Vec<String>,
}

impl PhysicalBackend {
    pub fn new(device: Device) -> Self {
        Self {
            device,
            instructions: Vec::new(),
        }
    }

    pub fn device(&self) -> Device {
        self.device
    }

    /// Actions requested from the operator so far
    pub fn instructions(&self) -> &[String] {
        &self.instructions
    }

    fn ask(&mut self, action: String) {
        tracing::info!(device = %self.device, "operator action required: {}", action);
        self.instructions.push(action);
    }
}

impl Backend for PhysicalBackend {
    fn supports_snapshots(&self) -> bool {
        false
    }

    fn right_click(&mut self) -> BackendResult<()> {
        self.ask("press the right button".to_string());
        Ok(())
    }

    fn left_click(&mut self) -> BackendResult<()> {
        self.ask("press the left button".to_string());
        Ok(())
    }

    fn both_click(&mut self) -> BackendResult<()> {
        self.ask("press both buttons".to_string());
        Ok(())
    }

    fn finger_touch(&mut self, x: u32, y: u32, delay: Duration) -> BackendResult<()> {
        self.ask(format!("touch ({}, {}) for {} ms", x, y, delay.as_millis()));
        Ok(())
    }

    fn finger_swipe(
        &mut self,
        x: u32,
        y: u32,
        direction: SwipeDirection,
        _delay: Duration,
    ) -> BackendResult<()> {
        let direction = match direction {
            SwipeDirection::Left => "left",
            SwipeDirection::Right => "right",
        };
        self.ask(format!("swipe {} from ({}, {})", direction, x, y));
        Ok(())
    }

    fn compare_screen_with_snapshot(
        &mut self,
        _golden_snap_path: &Path,
        _crop: Option<Crop>,
        _tmp_snap_path: Option<&Path>,
        _golden_run: bool,
    ) -> BackendResult<bool> {
        Ok(true)
    }

    fn compare_screen_with_text(&mut self, _pattern: &str) -> BackendResult<bool> {
        Ok(true)
    }

    fn wait_for_screen_change(&mut self, _timeout: Duration) -> BackendResult<ScreenContent> {
        Ok(ScreenContent::default())
    }

    fn get_current_screen_content(&mut self) -> BackendResult<ScreenContent> {
        Ok(ScreenContent::default())
    }

    fn wait_for_home_screen(&mut self, _timeout: Duration) -> BackendResult<()> {
        Ok(())
    }

    fn wait_for_text_on_screen(&mut self, _text: &str, _timeout: Duration) -> BackendResult<()> {
        Ok(())
    }

    fn wait_for_text_not_on_screen(&mut self, _text: &str, _timeout: Duration) -> BackendResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_physical_backend_records_operator_actions() {
        let mut backend = PhysicalBackend::new(Device::Flex);
        assert!(!backend.supports_snapshots());

        backend.finger_touch(240, 300, Duration::from_millis(100)).unwrap();
        backend
            .finger_swipe(240, 300, SwipeDirection::Left, Duration::ZERO)
            .unwrap();
        assert_eq!(
            backend.instructions(),
            &["touch (240, 300) for 100 ms", "swipe left from (240, 300)"]
        );
    }

    #[test]
    fn test_physical_backend_never_blocks() {
        let mut backend = PhysicalBackend::new(Device::NanoX);
        assert!(backend.compare_screen_with_text("^Approve$").unwrap());
        backend.wait_for_screen_change(Duration::from_secs(60)).unwrap();
        backend.wait_for_text_on_screen("Ready", Duration::from_secs(60)).unwrap();
    }
}
