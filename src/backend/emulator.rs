//! In-process screen emulator.
//!
//! Runs an [`AppModel`] as a state machine: inputs follow the transitions of
//! the current screen, timed transitions fire when the emulator is polled,
//! and APDU commands open prompt screens whose outcome is decided by the
//! screens the user navigates to. Each screen is rendered to a framebuffer
//! so golden snapshots can be compared and recorded.

use std::fs;
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use super::app::{AppModel, CommandModel};
use super::framebuffer::Framebuffer;
use super::interface::Backend;
use super::types::{BackendError, BackendResult, Crop, ScreenContent, SwipeDirection};
use crate::apdu::{self, PendingExchange, RaisePolicy, Rapdu, SW_DENY, SW_OK, Transport};
use crate::device::Device;

/// Status word answered to commands the application does not know
pub const SW_INS_NOT_SUPPORTED: u16 = 0x6D00;

/// Default interval between two screen reads while waiting
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Command waiting for the user to approve or reject its prompt
#[derive(Debug)]
struct PromptedCommand {
    id: u64,
    command: CommandModel,
    response: Option<Rapdu>,
}

/// Screen emulator backend
#[derive(Debug)]
pub struct EmulatorBackend {
    device: Device,
    model: AppModel,
    current: usize,
    entered_at: Instant,
    last_observed: Option<ScreenContent>,
    poll_interval: Duration,
    raise_policy: RaisePolicy,
    prompted: Option<PromptedCommand>,
    ready_response: Option<Rapdu>,
    next_exchange_id: u64,
    inputs: usize,
}

impl EmulatorBackend {
    /// Launch `model` on `device`
    pub fn new(device: Device, model: AppModel) -> BackendResult<Self> {
        model.validate()?;
        let current = model
            .screen_index(model.start_screen())
            .ok_or_else(|| BackendError::Model("start screen is missing".to_string()))?;
        tracing::debug!(app = %model.name, device = %device, "emulator started");
        Ok(Self {
            device,
            model,
            current,
            entered_at: Instant::now(),
            last_observed: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
            raise_policy: RaisePolicy::default(),
            prompted: None,
            ready_response: None,
            next_exchange_id: 0,
            inputs: 0,
        })
    }

    pub fn from_file(device: Device, path: &Path) -> BackendResult<Self> {
        Self::new(device, AppModel::from_file(path)?)
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_raise_policy(mut self, policy: RaisePolicy) -> Self {
        self.raise_policy = policy;
        self
    }

    pub fn device(&self) -> Device {
        self.device
    }

    /// Id of the displayed screen
    pub fn current_screen(&mut self) -> &str {
        self.tick();
        &self.model.screens[self.current].id
    }

    /// Number of input actions received so far
    pub fn input_count(&self) -> usize {
        self.inputs
    }

    /// Render the displayed screen
    pub fn render(&mut self) -> Framebuffer {
        self.tick();
        Framebuffer::render_lines(self.device, &self.model.screens[self.current].lines)
    }

    fn content(&self) -> ScreenContent {
        ScreenContent::new(self.model.screens[self.current].lines.clone())
    }

    /// Read the screen and remember it as the last observed one
    fn observe(&mut self) -> ScreenContent {
        self.tick();
        let content = self.content();
        self.last_observed = Some(content.clone());
        content
    }

    /// Fire due timed transitions
    fn tick(&mut self) {
        // A cycle of zero-delay transitions would never settle
        for _ in 0..=self.model.screens.len() {
            let Some(auto) = self.model.screens[self.current].auto.clone() else {
                return;
            };
            let due = self.entered_at + Duration::from_millis(auto.after_ms);
            if Instant::now() < due {
                return;
            }
            self.enter(&auto.to, due);
        }
    }

    fn enter(&mut self, id: &str, at: Instant) {
        let Some(index) = self.model.screen_index(id) else {
            return;
        };
        tracing::trace!(from = %self.model.screens[self.current].id, to = %id, "screen transition");
        self.current = index;
        self.entered_at = at;
        self.resolve_prompt(id);
    }

    fn resolve_prompt(&mut self, id: &str) {
        let Some(prompted) = self.prompted.as_mut() else {
            return;
        };
        if prompted.response.is_some() {
            return;
        }
        if prompted.command.approve_on.iter().any(|s| s == id) {
            let data = prompted.command.response_bytes().unwrap_or_default();
            prompted.response = Some(Rapdu::new(SW_OK, data));
        } else if prompted.command.reject_on.iter().any(|s| s == id) {
            prompted.response = Some(Rapdu::new(SW_DENY, Vec::new()));
        }
    }

    /// Follow an input transition of the current screen, if it has one
    fn follow(&mut self, target: Option<String>) {
        self.inputs += 1;
        if let Some(target) = target {
            self.enter(&target, Instant::now());
        }
    }

    fn require_buttons(&self, action: &str) -> BackendResult<()> {
        if self.device.is_nano() {
            Ok(())
        } else {
            Err(BackendError::Unsupported(format!("{} on {}", action, self.device)))
        }
    }

    fn require_touch(&self, action: &str) -> BackendResult<()> {
        if self.device.is_touchable() {
            Ok(())
        } else {
            Err(BackendError::Unsupported(format!("{} on {}", action, self.device)))
        }
    }
}

impl Backend for EmulatorBackend {
    fn supports_snapshots(&self) -> bool {
        true
    }

    fn right_click(&mut self) -> BackendResult<()> {
        self.require_buttons("right click")?;
        self.tick();
        let target = self.model.screens[self.current].right.clone();
        self.follow(target);
        Ok(())
    }

    fn left_click(&mut self) -> BackendResult<()> {
        self.require_buttons("left click")?;
        self.tick();
        let target = self.model.screens[self.current].left.clone();
        self.follow(target);
        Ok(())
    }

    fn both_click(&mut self) -> BackendResult<()> {
        self.require_buttons("both click")?;
        self.tick();
        let target = self.model.screens[self.current].both.clone();
        self.follow(target);
        Ok(())
    }

    fn finger_touch(&mut self, x: u32, y: u32, delay: Duration) -> BackendResult<()> {
        self.require_touch("finger touch")?;
        self.tick();
        let held_ms = delay.as_millis() as u64;
        let target = self.model.screens[self.current]
            .touch
            .iter()
            .find(|region| region.contains(x, y) && held_ms >= region.min_delay_ms)
            .map(|region| region.to.clone());
        self.follow(target);
        Ok(())
    }

    fn finger_swipe(
        &mut self,
        _x: u32,
        _y: u32,
        direction: SwipeDirection,
        _delay: Duration,
    ) -> BackendResult<()> {
        self.require_touch("finger swipe")?;
        self.tick();
        let screen = &self.model.screens[self.current];
        let target = match direction {
            SwipeDirection::Left => screen.swipe_left.clone(),
            SwipeDirection::Right => screen.swipe_right.clone(),
        };
        self.follow(target);
        Ok(())
    }

    fn compare_screen_with_snapshot(
        &mut self,
        golden_snap_path: &Path,
        crop: Option<Crop>,
        tmp_snap_path: Option<&Path>,
        golden_run: bool,
    ) -> BackendResult<bool> {
        self.observe();
        let frame = self.render();

        if let Some(tmp) = tmp_snap_path {
            fs::write(tmp, frame.to_png()?)?;
        }

        if golden_run {
            fs::write(golden_snap_path, frame.to_png()?)?;
            tracing::debug!(golden = %golden_snap_path.display(), "recorded golden snapshot");
            return Ok(true);
        }

        if !golden_snap_path.is_file() {
            return Err(BackendError::GoldenMissing(golden_snap_path.to_path_buf()));
        }
        let golden = Framebuffer::from_image(image::open(golden_snap_path)?.to_rgb8());
        let matched = frame.matches(&golden, crop);
        tracing::trace!(golden = %golden_snap_path.display(), matched, "compared screen with snapshot");
        Ok(matched)
    }

    fn wait_for_screen_change(&mut self, timeout: Duration) -> BackendResult<ScreenContent> {
        let deadline = Instant::now() + timeout;
        loop {
            self.tick();
            let content = self.content();
            if self.last_observed.as_ref() != Some(&content) {
                self.last_observed = Some(content.clone());
                return Ok(content);
            }
            if Instant::now() >= deadline {
                return Err(BackendError::ScreenChangeTimeout);
            }
            thread::sleep(self.poll_interval);
        }
    }

    fn get_current_screen_content(&mut self) -> BackendResult<ScreenContent> {
        Ok(self.observe())
    }

    fn wait_for_home_screen(&mut self, timeout: Duration) -> BackendResult<()> {
        let deadline = Instant::now() + timeout;
        loop {
            self.tick();
            if self.model.screens[self.current].id == self.model.home {
                self.observe();
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(BackendError::HomeScreenTimeout);
            }
            thread::sleep(self.poll_interval);
        }
    }
}

impl Transport for EmulatorBackend {
    fn raise_policy(&self) -> RaisePolicy {
        self.raise_policy
    }

    fn set_raise_policy(&mut self, policy: RaisePolicy) {
        self.raise_policy = policy;
    }

    fn send_raw(&mut self, apdu: &[u8]) -> BackendResult<()> {
        apdu::log_command(apdu);
        if apdu.len() < 2 {
            return Err(BackendError::Unsupported(format!(
                "APDU of {} bytes has no header",
                apdu.len()
            )));
        }
        self.tick();

        let command = self
            .model
            .commands
            .iter()
            .find(|command| command.cla == apdu[0] && command.ins == apdu[1])
            .cloned();
        let Some(command) = command else {
            self.ready_response = Some(Rapdu::new(SW_INS_NOT_SUPPORTED, Vec::new()));
            return Ok(());
        };

        match command.prompt.clone() {
            Some(prompt) => {
                self.next_exchange_id += 1;
                self.prompted = Some(PromptedCommand {
                    id: self.next_exchange_id,
                    command,
                    response: None,
                });
                self.enter(&prompt, Instant::now());
            }
            None => {
                self.ready_response = Some(Rapdu::new(SW_OK, command.response_bytes()?));
            }
        }
        Ok(())
    }

    fn receive(&mut self) -> BackendResult<Rapdu> {
        self.tick();
        if let Some(rapdu) = self.ready_response.take() {
            return apdu::finish_response(self.raise_policy, rapdu);
        }
        match self.prompted.take() {
            Some(PromptedCommand {
                response: Some(rapdu),
                ..
            }) => apdu::finish_response(self.raise_policy, rapdu),
            Some(prompted) => {
                self.prompted = Some(prompted);
                Err(BackendError::ExchangeNotReady)
            }
            None => Err(BackendError::NoPendingExchange),
        }
    }

    fn exchange_async_raw(&mut self, apdu: &[u8]) -> BackendResult<PendingExchange> {
        self.send_raw(apdu)?;
        let id = match &self.prompted {
            Some(prompted) if self.ready_response.is_none() => prompted.id,
            _ => {
                // Answered without a prompt: give it its own token
                self.next_exchange_id += 1;
                self.next_exchange_id
            }
        };
        Ok(PendingExchange::new(id, apdu.to_vec()))
    }

    fn complete_exchange(&mut self, pending: PendingExchange) -> BackendResult<Rapdu> {
        self.tick();
        let prompted_id = self.prompted.as_ref().map(|prompted| prompted.id);
        if prompted_id != Some(pending.id()) {
            return match self.ready_response.take() {
                Some(rapdu) => apdu::finish_response(self.raise_policy, rapdu),
                None => Err(BackendError::NoPendingExchange),
            };
        }
        self.receive()
    }
}
