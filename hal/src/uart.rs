//! UART (Universal Asynchronous Receiver/Transmitter) adaptation layer
//!
//! [`Uart`] initializes ports through the vendor driver, forwards polling and
//! interrupt-driven transfers, and keeps the [`UartRegistry`] that routes the
//! vendor's global completion entry points back to per-port callbacks.

use crate::error::{HalError, HalResult};
use crate::registry::{UartCallback, UartEvent, UartRegistry};
use crate::vendor::{Direction, FlowControl, Oversampling, PortInit, UartVendor};

/// UART data bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum WordLength {
    #[default]
    Bits8,
    Bits9,
}

/// UART stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopBits {
    #[default]
    One,
    Two,
}

/// UART parity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parity {
    #[default]
    None,
    Even,
    Odd,
}

/// Default baud rate of [`UartConfig::builder`]
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// UART configuration
///
/// `H` is the vendor's port handle and `I` its hardware instance selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UartConfig<H, I> {
    pub handle: H,
    pub instance: I,
    pub baud_rate: u32,
    pub word_length: WordLength,
    pub stop_bits: StopBits,
    pub parity: Parity,
}

impl<H, I> UartConfig<H, I> {
    /// Start a configuration at 115200 baud, 8 data bits, 1 stop bit, no parity
    pub fn builder(handle: H, instance: I) -> UartConfigBuilder<H, I> {
        UartConfigBuilder {
            config: UartConfig {
                handle,
                instance,
                baud_rate: DEFAULT_BAUD_RATE,
                word_length: WordLength::default(),
                stop_bits: StopBits::default(),
                parity: Parity::default(),
            },
        }
    }

    /// Vendor initialization record with the fixed fields filled in
    ///
    /// Flow control is always off, the port always runs full duplex and the
    /// receiver always oversamples by 16.
    pub fn port_init(&self) -> PortInit {
        PortInit {
            baud_rate: self.baud_rate,
            word_length: self.word_length,
            stop_bits: self.stop_bits,
            parity: self.parity,
            flow_control: FlowControl::None,
            direction: Direction::TxRx,
            oversampling: Oversampling::X16,
        }
    }
}

/// Builder for ergonomic UART configuration construction.
#[derive(Debug, Clone)]
pub struct UartConfigBuilder<H, I> {
    config: UartConfig<H, I>,
}

impl<H, I> UartConfigBuilder<H, I> {
    /// Sets the baud rate.
    pub fn baud_rate(mut self, baud_rate: u32) -> Self {
        self.config.baud_rate = baud_rate;
        self
    }

    /// Sets the number of data bits.
    pub fn word_length(mut self, word_length: WordLength) -> Self {
        self.config.word_length = word_length;
        self
    }

    /// Sets the number of stop bits.
    pub fn stop_bits(mut self, stop_bits: StopBits) -> Self {
        self.config.stop_bits = stop_bits;
        self
    }

    /// Sets the parity mode.
    pub fn parity(mut self, parity: Parity) -> Self {
        self.config.parity = parity;
        self
    }

    /// Builds the final configuration.
    pub fn build(self) -> UartConfig<H, I> {
        self.config
    }
}

/// UART adaptation over a vendor driver
pub struct Uart<V: UartVendor> {
    vendor: V,
    registry: &'static UartRegistry<V::Handle>,
}

impl<V: UartVendor> Uart<V> {
    /// Bind `vendor` to the registry its completion entry points dispatch into
    pub const fn new(vendor: V, registry: &'static UartRegistry<V::Handle>) -> Self {
        Self { vendor, registry }
    }

    /// Initialize a port and register its handle
    ///
    /// Fails without touching the hardware when the baud rate is zero, when
    /// the handle is already live (`Busy`; deinitialize it first) or when
    /// every registry slot is taken by other handles. A vendor failure leaves
    /// the registry unchanged.
    pub fn init(&self, config: &UartConfig<V::Handle, V::Instance>) -> HalResult<()> {
        if config.baud_rate == 0 {
            log::warn!("uart init: zero baud rate");
            return Err(HalError::InvalidParameter);
        }

        if self.registry.contains(config.handle) {
            log::warn!("uart init: handle already live, deinit first");
            return Err(HalError::Busy);
        }

        if !self.registry.has_slot_for(config.handle) {
            log::warn!("uart init: handle registry full");
            return Err(HalError::RegistryFull);
        }

        self.vendor
            .init(config.handle, config.instance, &config.port_init())
            .inspect_err(|e| log::warn!("uart init: vendor failed: {}", e))?;

        self.registry.attach(config.handle)?;
        log::debug!(
            "uart init: {} baud {:?} {:?} {:?}",
            config.baud_rate,
            config.word_length,
            config.stop_bits,
            config.parity
        );
        Ok(())
    }

    /// Shut a port down
    ///
    /// On success the handle's callbacks are dropped; whether its registry
    /// slot becomes free depends on the registry's
    /// [`Retention`](crate::registry::Retention).
    pub fn deinit(&self, handle: V::Handle) -> HalResult<()> {
        self.vendor.deinit(handle)?;
        if self.registry.release(handle).is_err() {
            log::debug!("uart deinit: handle was not registered");
        }
        Ok(())
    }

    /// Blocking transmit; never call from interrupt context
    pub fn transmit_polling(
        &self,
        handle: V::Handle,
        data: &[u8],
        timeout_ms: u32,
    ) -> HalResult<()> {
        self.vendor.transmit(handle, data, timeout_ms)
    }

    /// Blocking receive filling all of `buffer`; never call from interrupt context
    pub fn receive_polling(
        &self,
        handle: V::Handle,
        buffer: &mut [u8],
        timeout_ms: u32,
    ) -> HalResult<()> {
        self.vendor.receive(handle, buffer, timeout_ms)
    }

    /// Start an interrupt-driven transmit
    ///
    /// Completion is reported through the TX-complete callback.
    pub fn transmit_it(&self, handle: V::Handle, data: &'static [u8]) -> HalResult<()> {
        self.vendor.transmit_it(handle, data)
    }

    /// Start an interrupt-driven receive
    ///
    /// Completion is reported through the RX-complete callback.
    pub fn receive_it(&self, handle: V::Handle, buffer: &'static mut [u8]) -> HalResult<()> {
        self.vendor.receive_it(handle, buffer)
    }

    pub fn register_tx_callback(
        &self,
        handle: V::Handle,
        callback: Option<UartCallback<V::Handle>>,
    ) -> HalResult<()> {
        self.register(handle, UartEvent::TxComplete, callback)
    }

    pub fn register_rx_callback(
        &self,
        handle: V::Handle,
        callback: Option<UartCallback<V::Handle>>,
    ) -> HalResult<()> {
        self.register(handle, UartEvent::RxComplete, callback)
    }

    pub fn register_error_callback(
        &self,
        handle: V::Handle,
        callback: Option<UartCallback<V::Handle>>,
    ) -> HalResult<()> {
        self.register(handle, UartEvent::Error, callback)
    }

    fn register(
        &self,
        handle: V::Handle,
        event: UartEvent,
        callback: Option<UartCallback<V::Handle>>,
    ) -> HalResult<()> {
        self.registry
            .set_callback(handle, event, callback)
            .inspect_err(|_| log::warn!("uart callback: {:?} for unknown handle ignored", event))
    }

    /// TX-complete entry point for the vendor's interrupt callback
    pub fn dispatch_tx_complete(&self, handle: V::Handle) {
        self.registry.dispatch_tx_complete(handle);
    }

    /// RX-complete entry point for the vendor's interrupt callback
    pub fn dispatch_rx_complete(&self, handle: V::Handle) {
        self.registry.dispatch_rx_complete(handle);
    }

    /// Error entry point for the vendor's interrupt callback
    pub fn dispatch_error(&self, handle: V::Handle) {
        self.registry.dispatch_error(handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults_to_8n1() {
        let config = UartConfig::builder(1u32, ()).build();

        assert_eq!(config.baud_rate, 115_200);
        assert_eq!(config.word_length, WordLength::Bits8);
        assert_eq!(config.stop_bits, StopBits::One);
        assert_eq!(config.parity, Parity::None);
    }

    #[test]
    fn builder_overrides() {
        let config = UartConfig::builder(1u32, ())
            .baud_rate(9600)
            .word_length(WordLength::Bits9)
            .stop_bits(StopBits::Two)
            .parity(Parity::Odd)
            .build();

        assert_eq!(config.baud_rate, 9600);
        assert_eq!(config.word_length, WordLength::Bits9);
        assert_eq!(config.stop_bits, StopBits::Two);
        assert_eq!(config.parity, Parity::Odd);
    }

    #[test]
    fn port_init_forces_fixed_fields() {
        let init = UartConfig::builder(1u32, ())
            .parity(Parity::Even)
            .build()
            .port_init();

        assert_eq!(init.parity, Parity::Even);
        assert_eq!(init.flow_control, FlowControl::None);
        assert_eq!(init.direction, Direction::TxRx);
        assert_eq!(init.oversampling, Oversampling::X16);
    }
}
