//! GPIO pin abstractions

/// Digital input pin
pub trait InputPin {
    /// Check if the pin reads high (logic 1)
    fn is_high(&self) -> bool;

    /// Check if the pin reads low (logic 0)
    fn is_low(&self) -> bool {
        !self.is_high()
    }
}

/// Input pin whose active level is configurable
///
/// Buttons wired to ground with a pull-up read low when pressed; this
/// wrapper hides that so callers only ask whether the input is active.
pub struct ActiveLevel<P> {
    pin: P,
    active_low: bool,
}

impl<P: InputPin> ActiveLevel<P> {
    /// Wrap a pin that is active when high
    pub fn active_high(pin: P) -> Self {
        Self {
            pin,
            active_low: false,
        }
    }

    /// Wrap a pin that is active when low
    pub fn active_low(pin: P) -> Self {
        Self {
            pin,
            active_low: true,
        }
    }

    /// Check if the input is in its active state
    pub fn is_active(&self) -> bool {
        self.pin.is_high() != self.active_low
    }

    /// Access the wrapped pin
    pub fn inner_mut(&mut self) -> &mut P {
        &mut self.pin
    }
}
