//! Front-end bridge assembly
//!
//! Builds the key mapping, the configured input strategy, the frame
//! presenter and the diagnostic frame requester, and attaches them all to
//! one boundary.

use rb_core::config::InputStrategy;
use rb_core::{Boundary, Config, Joypad, RequestId, Result};
use rb_frame::{FramePresenter, FrameRequester, PixelBuffer, PresenterStats, SurfaceFactory};
use rb_input::{attach_input_bridge, InputBridge, KeyMapping};
use std::sync::Arc;
use std::time::Duration;

/// Snapshot of bridge counters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BridgeStats {
    pub strategy: InputStrategy,
    pub joypad: Joypad,
    pub frames: PresenterStats,
    pub keys_observed: usize,
    pub presentation_enabled: bool,
    pub last_round_trip: Option<Duration>,
}

/// Everything the front end needs on its side of the boundary
pub struct FrontendBridge {
    joypad: Joypad,
    mapping: Arc<KeyMapping>,
    input: Arc<dyn InputBridge>,
    presenter: Arc<FramePresenter>,
    requester: Arc<FrameRequester>,
}

impl FrontendBridge {
    /// Create and attach the bridge
    pub fn new(config: &Config, boundary: Arc<dyn Boundary>, surface: SurfaceFactory) -> Result<Self> {
        config.validate()?;

        let mapping = Arc::new(KeyMapping::from_config(&config.input.keyboard_mapping)?);
        let joypad = config.input.joypad;

        let input = attach_input_bridge(
            config.input.strategy,
            Arc::clone(&mapping),
            joypad,
            Arc::clone(&boundary),
        );

        let presenter =
            FramePresenter::new(config.display.width, config.display.height, surface)?;
        presenter.attach(boundary.as_ref());

        let requester = FrameRequester::new(
            Arc::clone(&presenter),
            boundary,
            Duration::from_millis(config.bridge.pull_timeout_ms),
            config.debug.trace_timing,
        );

        tracing::info!(
            width = config.display.width,
            height = config.display.height,
            strategy = ?config.input.strategy,
            "front-end bridge ready"
        );

        Ok(Self {
            joypad,
            mapping,
            input,
            presenter,
            requester,
        })
    }

    /// Forward a host key-down
    pub fn key_down(&self, key: &str) {
        self.input.observe_key(key, true);
    }

    /// Forward a host key-up
    pub fn key_up(&self, key: &str) {
        self.input.observe_key(key, false);
    }

    /// Issue a one-shot diagnostic frame request
    pub fn request_frame(&self) -> Result<RequestId> {
        Ok(self.requester.request_frame()?)
    }

    /// Abandon the outstanding frame request
    pub fn cancel_frame_request(&self) -> bool {
        self.requester.cancel()
    }

    /// Copy of the most recent frame
    pub fn frame(&self) -> PixelBuffer {
        self.presenter.snapshot()
    }

    pub fn input(&self) -> &Arc<dyn InputBridge> {
        &self.input
    }

    pub fn mapping(&self) -> &KeyMapping {
        &self.mapping
    }

    pub fn presenter(&self) -> &Arc<FramePresenter> {
        &self.presenter
    }

    pub fn stats(&self) -> BridgeStats {
        BridgeStats {
            strategy: self.input.strategy(),
            joypad: self.joypad,
            frames: self.presenter.stats(),
            keys_observed: self.input.pressed_keys().observed(),
            presentation_enabled: self.presenter.presentation_enabled(),
            last_round_trip: self.requester.last_round_trip(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rb_core::{BridgeError, EventBus, LogicalButton};
    use rb_frame::MemorySurface;

    fn small_config() -> Config {
        let mut config = Config::default();
        config.display.width = 4;
        config.display.height = 4;
        config
    }

    #[test]
    fn test_bridge_creation() {
        let bus = EventBus::new();
        let config = small_config();
        let surface = MemorySurface::new(4, 4);
        let bridge = FrontendBridge::new(&config, Arc::new(bus.clone()), surface.factory()).unwrap();

        let stats = bridge.stats();
        assert_eq!(stats.strategy, InputStrategy::Push);
        assert_eq!(stats.joypad, Joypad::Primary);
        assert!(stats.presentation_enabled);
        assert_eq!(stats.keys_observed, 0);
        assert_eq!(bridge.mapping().key(LogicalButton::B), "k");
    }

    #[test]
    fn test_invalid_mapping_rejected() {
        let mut config = small_config();
        config.input.keyboard_mapping.start = "w".to_string();

        let result = FrontendBridge::new(
            &config,
            Arc::new(EventBus::new()),
            MemorySurface::new(4, 4).factory(),
        );
        assert!(matches!(result, Err(BridgeError::Mapping(_))));
    }

    #[test]
    fn test_invalid_display_rejected() {
        let mut config = small_config();
        config.display.smoothing = true;

        let result = FrontendBridge::new(
            &config,
            Arc::new(EventBus::new()),
            MemorySurface::new(4, 4).factory(),
        );
        assert!(matches!(result, Err(BridgeError::Config(_))));
    }

    #[test]
    fn test_oversized_display_rejected_without_allocating() {
        let mut config = small_config();
        config.display.width = 1 << 20;
        config.display.height = 1 << 20;

        let surface = MemorySurface::new(4, 4);
        let result = FrontendBridge::new(&config, Arc::new(EventBus::new()), surface.factory());
        assert!(matches!(result, Err(BridgeError::Config(_))));
        assert!(surface.smoothing());
    }

    #[test]
    fn test_request_in_flight_surfaces_as_bridge_error() {
        let bus = EventBus::new();
        let config = small_config();
        let bridge =
            FrontendBridge::new(&config, Arc::new(bus.clone()), MemorySurface::new(4, 4).factory())
                .unwrap();

        bridge.request_frame().unwrap();
        assert!(matches!(bridge.request_frame(), Err(BridgeError::RequestInFlight(_))));
        assert!(bridge.cancel_frame_request());
    }
}
