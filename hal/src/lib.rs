//! Vendor-agnostic GPIO and UART driver layer
//!
//! Application code configures pins and serial ports through [`gpio::Gpio`]
//! and [`uart::Uart`]; a backend crate plugs a chip vendor's library in by
//! implementing [`vendor::GpioVendor`] and [`vendor::UartVendor`].
//!
//! Vendor libraries report interrupts through one global function per event
//! type. Backends forward those into a [`PinCallbacks`] table (edge events,
//! identified by pin bitmask) and a [`UartRegistry`] (UART events, identified
//! by port handle), which call the application's callbacks.
//!
//! ## Example
//! ```ignore
//! static CALLBACKS: PinCallbacks = PinCallbacks::new();
//!
//! let gpio = Gpio::new(vendor, &CALLBACKS);
//! gpio.init(&PinConfig::new(port_c, 13, PinMode::InterruptFalling, Pull::None))?;
//! gpio.register_callback(13, Some(on_button))?;
//!
//! // in the vendor's edge interrupt hook
//! CALLBACKS.dispatch(pin_bitmask);
//! ```

#![cfg_attr(not(any(test, feature = "std")), no_std)]

pub mod callbacks;
pub mod error;
pub mod gpio;
pub mod interrupt;
pub mod registry;
pub mod uart;
pub mod vendor;

// Re-export commonly used types
pub use callbacks::{PinCallback, PinCallbacks};
pub use error::{HalError, HalResult};
pub use gpio::{Gpio, PinConfig, PinMode, PinState, Pull, MAX_PINS};
pub use interrupt::{ExtiLine, EXTI_PRIORITY};
pub use registry::{Retention, UartCallback, UartEvent, UartRegistry, MAX_UART_HANDLES};
pub use uart::{Parity, StopBits, Uart, UartConfig, WordLength};
pub use vendor::{GpioVendor, UartVendor};
