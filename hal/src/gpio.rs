//! GPIO (General Purpose Input/Output) adaptation layer
//!
//! [`Gpio`] turns a [`PinConfig`] into vendor initialization calls, forwards
//! pin writes and reads, and routes edge interrupts to per-pin callbacks via a
//! [`PinCallbacks`] table.

use core::ops::Not;

use crate::callbacks::{PinCallback, PinCallbacks};
use crate::error::{HalError, HalResult};
use crate::interrupt::{ExtiLine, EXTI_PRIORITY};
use crate::vendor::{GpioVendor, PinInit, Speed};

/// Number of pin positions per port
pub const MAX_PINS: usize = 16;

/// GPIO pin modes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinMode {
    /// Input (floating unless a pull is configured)
    Input,
    /// Output (push-pull)
    OutputPushPull,
    /// Output (open-drain)
    OutputOpenDrain,
    /// Analog
    Analog,
    /// Input raising an interrupt on the rising edge
    InterruptRising,
    /// Input raising an interrupt on the falling edge
    InterruptFalling,
    /// Input raising an interrupt on both edges
    InterruptRisingFalling,
}

impl PinMode {
    /// Check if this mode arms an edge interrupt
    pub const fn is_interrupt(self) -> bool {
        matches!(
            self,
            Self::InterruptRising | Self::InterruptFalling | Self::InterruptRisingFalling
        )
    }
}

/// Internal pull resistor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Pull {
    #[default]
    None,
    Up,
    Down,
}

/// Logical pin state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinState {
    #[default]
    Reset = 0,
    Set = 1,
}

impl PinState {
    pub const fn is_set(self) -> bool {
        matches!(self, Self::Set)
    }
}

impl Not for PinState {
    type Output = Self;

    fn not(self) -> Self {
        match self {
            Self::Reset => Self::Set,
            Self::Set => Self::Reset,
        }
    }
}

impl From<bool> for PinState {
    fn from(high: bool) -> Self {
        if high {
            Self::Set
        } else {
            Self::Reset
        }
    }
}

impl From<PinState> for bool {
    fn from(state: PinState) -> Self {
        state.is_set()
    }
}

impl From<embedded_hal::digital::PinState> for PinState {
    fn from(state: embedded_hal::digital::PinState) -> Self {
        match state {
            embedded_hal::digital::PinState::Low => Self::Reset,
            embedded_hal::digital::PinState::High => Self::Set,
        }
    }
}

/// Pin configuration
///
/// `P` is the vendor port identifier. The adaptation layer reads it once during
/// [`Gpio::init`] and keeps nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinConfig<P> {
    pub port: P,
    /// Pin position within the port, `0..MAX_PINS`
    pub pin: u8,
    pub mode: PinMode,
    pub pull: Pull,
}

impl<P> PinConfig<P> {
    pub const fn new(port: P, pin: u8, mode: PinMode, pull: Pull) -> Self {
        Self {
            port,
            pin,
            mode,
            pull,
        }
    }
}

/// Single-bit mask selecting `pin`, `None` when out of range
pub const fn pin_mask(pin: u8) -> Option<u16> {
    if (pin as usize) < MAX_PINS {
        Some(1 << pin)
    } else {
        None
    }
}

/// GPIO adaptation over a vendor driver
pub struct Gpio<V> {
    vendor: V,
    callbacks: &'static PinCallbacks,
}

impl<V: GpioVendor> Gpio<V> {
    /// Bind `vendor` to the callback table its edge entry point dispatches into
    pub const fn new(vendor: V, callbacks: &'static PinCallbacks) -> Self {
        Self { vendor, callbacks }
    }

    /// Configure a pin
    ///
    /// Drive speed is always [`Speed::Low`]. Interrupt modes additionally
    /// enable the pin's external interrupt line at [`EXTI_PRIORITY`].
    pub fn init(&self, config: &PinConfig<V::Port>) -> HalResult<()> {
        let Some(mask) = pin_mask(config.pin) else {
            log::warn!("gpio init: pin {} out of range", config.pin);
            return Err(HalError::InvalidParameter);
        };

        self.vendor.enable_clock(config.port);
        self.vendor.init(
            config.port,
            &PinInit {
                mask,
                mode: config.mode,
                pull: config.pull,
                speed: Speed::Low,
            },
        );

        if config.mode.is_interrupt() {
            if let Some(line) = ExtiLine::for_pin(config.pin) {
                self.vendor.enable_irq(line, EXTI_PRIORITY);
            }
        }

        log::debug!("gpio init: pin {} as {:?}/{:?}", config.pin, config.mode, config.pull);
        Ok(())
    }

    /// Return a pin to its reset configuration
    ///
    /// The pin's callback slot is left as is.
    pub fn deinit(&self, port: V::Port, pin: u8) -> HalResult<()> {
        let mask = checked_mask(pin)?;
        self.vendor.deinit(port, mask);
        Ok(())
    }

    /// Drive a pin high
    pub fn set(&self, port: V::Port, pin: u8) -> HalResult<()> {
        self.write(port, pin, PinState::Set)
    }

    /// Drive a pin low
    pub fn reset(&self, port: V::Port, pin: u8) -> HalResult<()> {
        self.write(port, pin, PinState::Reset)
    }

    /// Drive a pin to `state`
    pub fn write(&self, port: V::Port, pin: u8, state: PinState) -> HalResult<()> {
        let mask = checked_mask(pin)?;
        self.vendor.write(port, mask, state);
        Ok(())
    }

    /// Invert a pin's output
    pub fn toggle(&self, port: V::Port, pin: u8) -> HalResult<()> {
        let mask = checked_mask(pin)?;
        self.vendor.toggle(port, mask);
        Ok(())
    }

    /// Read a pin's level
    pub fn read(&self, port: V::Port, pin: u8) -> HalResult<PinState> {
        let mask = checked_mask(pin)?;
        Ok(self.vendor.read(port, mask))
    }

    /// Register (or clear with `None`) the edge callback of a pin position
    ///
    /// The table is indexed by pin number only: pin 13 of every port shares a
    /// slot, as they share an interrupt line.
    pub fn register_callback(&self, pin: u8, callback: Option<PinCallback>) -> HalResult<()> {
        self.callbacks.register(pin, callback).inspect_err(|_| {
            log::warn!("gpio callback: pin {} out of range, ignored", pin);
        })
    }

    /// Edge entry point for the vendor's interrupt callback
    pub fn dispatch_on_edge(&self, mask: u16) {
        self.callbacks.dispatch(mask);
    }

    /// View a single pin through the `embedded-hal` digital traits
    pub fn pin(&self, port: V::Port, pin: u8) -> HalResult<Pin<'_, V>> {
        checked_mask(pin)?;
        Ok(Pin {
            gpio: self,
            port,
            pin,
        })
    }
}

fn checked_mask(pin: u8) -> HalResult<u16> {
    pin_mask(pin).ok_or(HalError::InvalidParameter)
}

/// One pin of a [`Gpio`], usable wherever `embedded-hal` pins are expected
pub struct Pin<'a, V: GpioVendor> {
    gpio: &'a Gpio<V>,
    port: V::Port,
    pin: u8,
}

impl<V: GpioVendor> embedded_hal::digital::ErrorType for Pin<'_, V> {
    type Error = HalError;
}

impl<V: GpioVendor> embedded_hal::digital::OutputPin for Pin<'_, V> {
    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.gpio.reset(self.port, self.pin)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.gpio.set(self.port, self.pin)
    }
}

impl<V: GpioVendor> embedded_hal::digital::StatefulOutputPin for Pin<'_, V> {
    fn is_set_high(&mut self) -> Result<bool, Self::Error> {
        self.gpio.read(self.port, self.pin).map(PinState::is_set)
    }

    fn is_set_low(&mut self) -> Result<bool, Self::Error> {
        self.is_set_high().map(|high| !high)
    }

    fn toggle(&mut self) -> Result<(), Self::Error> {
        self.gpio.toggle(self.port, self.pin)
    }
}

impl<V: GpioVendor> embedded_hal::digital::InputPin for Pin<'_, V> {
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        self.gpio.read(self.port, self.pin).map(PinState::is_set)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.is_high().map(|high| !high)
    }
}
