//! Vendor driver capability
//!
//! These traits are the only way the adaptation layers touch hardware. A
//! backend crate implements them on top of a chip vendor's low-level library;
//! the vendor side is trusted to program registers and raise interrupts.
//!
//! Methods take `&self`: the vendor library is global hardware state, and a
//! `static` driver value has to be reachable from both foreground code and
//! interrupt callbacks.

use crate::error::HalResult;
use crate::gpio::{PinMode, PinState, Pull};
use crate::interrupt::{ExtiLine, InterruptPriority};
use crate::uart::{Parity, StopBits, WordLength};

/// Output drive speed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Speed {
    Low,
    Medium,
    High,
    VeryHigh,
}

/// Fully resolved pin initialization handed to the vendor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PinInit {
    /// Single-bit mask of the pin being configured
    pub mask: u16,
    pub mode: PinMode,
    pub pull: Pull,
    pub speed: Speed,
}

/// UART hardware flow control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlowControl {
    None,
    RtsCts,
}

/// UART direction mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Tx,
    Rx,
    TxRx,
}

/// Receiver oversampling ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Oversampling {
    X8,
    X16,
}

/// Fully resolved port initialization handed to the vendor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PortInit {
    pub baud_rate: u32,
    pub word_length: WordLength,
    pub stop_bits: StopBits,
    pub parity: Parity,
    pub flow_control: FlowControl,
    pub direction: Direction,
    pub oversampling: Oversampling,
}

/// GPIO side of a vendor driver library
pub trait GpioVendor {
    /// Vendor port identifier (register block address, port letter, ...)
    type Port: Copy + Eq;

    /// Enable the clock domain of `port`; must be idempotent
    fn enable_clock(&self, port: Self::Port);

    /// Configure the pins selected by `init.mask`
    fn init(&self, port: Self::Port, init: &PinInit);

    /// Return the pins in `mask` to their reset configuration
    fn deinit(&self, port: Self::Port, mask: u16);

    /// Drive the pins in `mask` to `state`
    fn write(&self, port: Self::Port, mask: u16, state: PinState);

    /// Sample the input level of the pins in `mask`
    fn read(&self, port: Self::Port, mask: u16) -> PinState;

    /// Invert the output latch of the pins in `mask`
    fn toggle(&self, port: Self::Port, mask: u16);

    /// Set the priority of an external interrupt line and unmask it
    fn enable_irq(&self, line: ExtiLine, priority: InterruptPriority);
}

/// UART side of a vendor driver library
pub trait UartVendor {
    /// Opaque port handle, typically the address of a vendor control block
    type Handle: Copy + Eq + 'static;

    /// Hardware instance selector (USART1, USART2, ...)
    type Instance: Copy;

    /// Bind `instance` to `handle` and initialize it
    fn init(&self, handle: Self::Handle, instance: Self::Instance, init: &PortInit)
        -> HalResult<()>;

    /// Shut the port down
    fn deinit(&self, handle: Self::Handle) -> HalResult<()>;

    /// Blocking transmit, bounded by `timeout_ms`
    fn transmit(&self, handle: Self::Handle, data: &[u8], timeout_ms: u32) -> HalResult<()>;

    /// Blocking receive filling all of `buffer`, bounded by `timeout_ms`
    fn receive(&self, handle: Self::Handle, buffer: &mut [u8], timeout_ms: u32)
        -> HalResult<()>;

    /// Arm an interrupt-driven transmit of `data`
    fn transmit_it(&self, handle: Self::Handle, data: &'static [u8]) -> HalResult<()>;

    /// Arm an interrupt-driven receive into `buffer`
    fn receive_it(&self, handle: Self::Handle, buffer: &'static mut [u8]) -> HalResult<()>;
}

impl<T: GpioVendor + ?Sized> GpioVendor for &T {
    type Port = T::Port;

    fn enable_clock(&self, port: Self::Port) {
        (**self).enable_clock(port)
    }

    fn init(&self, port: Self::Port, init: &PinInit) {
        (**self).init(port, init)
    }

    fn deinit(&self, port: Self::Port, mask: u16) {
        (**self).deinit(port, mask)
    }

    fn write(&self, port: Self::Port, mask: u16, state: PinState) {
        (**self).write(port, mask, state)
    }

    fn read(&self, port: Self::Port, mask: u16) -> PinState {
        (**self).read(port, mask)
    }

    fn toggle(&self, port: Self::Port, mask: u16) {
        (**self).toggle(port, mask)
    }

    fn enable_irq(&self, line: ExtiLine, priority: InterruptPriority) {
        (**self).enable_irq(line, priority)
    }
}

impl<T: UartVendor + ?Sized> UartVendor for &T {
    type Handle = T::Handle;
    type Instance = T::Instance;

    fn init(
        &self,
        handle: Self::Handle,
        instance: Self::Instance,
        init: &PortInit,
    ) -> HalResult<()> {
        (**self).init(handle, instance, init)
    }

    fn deinit(&self, handle: Self::Handle) -> HalResult<()> {
        (**self).deinit(handle)
    }

    fn transmit(&self, handle: Self::Handle, data: &[u8], timeout_ms: u32) -> HalResult<()> {
        (**self).transmit(handle, data, timeout_ms)
    }

    fn receive(
        &self,
        handle: Self::Handle,
        buffer: &mut [u8],
        timeout_ms: u32,
    ) -> HalResult<()> {
        (**self).receive(handle, buffer, timeout_ms)
    }

    fn transmit_it(&self, handle: Self::Handle, data: &'static [u8]) -> HalResult<()> {
        (**self).transmit_it(handle, data)
    }

    fn receive_it(&self, handle: Self::Handle, buffer: &'static mut [u8]) -> HalResult<()> {
        (**self).receive_it(handle, buffer)
    }
}
