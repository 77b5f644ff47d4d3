//! In-memory vendor driver for the MCU HAL
//!
//! [`SimGpio`] and [`SimUart`] implement the vendor capability traits against
//! plain memory instead of registers. Writes land in latches that reads
//! return, polling transfers complete instantly, and interrupts are raised on
//! request so the dispatch paths of `mcu-hal` can be driven from host tests.
//!
//! ```ignore
//! static EXTI: PinCallbacks = PinCallbacks::new();
//! static SIM: SimGpio = SimGpio::new(&EXTI);
//!
//! let gpio = Gpio::new(&SIM, &EXTI);
//! gpio.init(&PinConfig::new(SimPort::C, 13, PinMode::InterruptFalling, Pull::None))?;
//! SIM.raise_edge(SimPort::C, 13);
//! ```

#![cfg_attr(not(test), no_std)]

pub mod gpio;
pub mod uart;

pub use gpio::{GpioCall, SimGpio, SimPort};
pub use uart::{SimHandle, SimInstance, SimUart};
