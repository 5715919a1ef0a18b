//! GPIO input adapter

use embassy_rp::gpio::Input;
use glance_hal::InputPin;

/// `embassy-rp` input implementing [`InputPin`]
pub struct RpInput<'d> {
    input: Input<'d>,
}

impl<'d> RpInput<'d> {
    pub fn new(input: Input<'d>) -> Self {
        Self { input }
    }

    /// Wait for any level change
    pub async fn wait_for_any_edge(&mut self) {
        self.input.wait_for_any_edge().await
    }
}

impl InputPin for RpInput<'_> {
    fn is_high(&self) -> bool {
        self.input.is_high()
    }
}
