//! STM32F4 backend for the MCU HAL
//!
//! Implements the vendor capability traits on top of ST's STM32CubeF4 C HAL
//! and overrides the HAL's weak interrupt callbacks
//! (`HAL_GPIO_EXTI_Callback`, `HAL_UART_TxCpltCallback`,
//! `HAL_UART_RxCpltCallback`, `HAL_UART_ErrorCallback`) so they dispatch into
//! [`PIN_CALLBACKS`] and [`UART_HANDLES`].
//!
//! The application still owns the interrupt vectors: its `EXTIx` handlers
//! call `HAL_GPIO_EXTI_IRQHandler` and its `USARTx` handlers call
//! `HAL_UART_IRQHandler`, exactly as in a CubeMX project.
//!
//! ## Example
//! ```ignore
//! use mcu_hal::{PinConfig, PinMode, Pull};
//! use mcu_hal_stm32::{Port, GPIO};
//!
//! GPIO.init(&PinConfig::new(Port::A, 5, PinMode::OutputPushPull, Pull::None))?;
//! GPIO.toggle(Port::A, 5)?;
//! ```

#![no_std]

#[cfg(not(feature = "stm32f446"))]
compile_error!("select a chip feature, e.g. `stm32f446`");

pub mod ffi;
pub mod gpio;
mod rcc;
pub mod uart;

use mcu_hal::{Gpio, PinCallbacks, Uart, UartRegistry};

pub use gpio::{Port, Stm32Gpio};
pub use uart::{Instance, Stm32Uart, UartControl, UartHandle};

/// Edge callbacks fed by `HAL_GPIO_EXTI_Callback`
pub static PIN_CALLBACKS: PinCallbacks = PinCallbacks::new();

/// Port handles and callbacks fed by the `HAL_UART_*Callback` hooks
pub static UART_HANDLES: UartRegistry<UartHandle> = UartRegistry::new();

/// GPIO layer bound to the ST HAL
pub static GPIO: Gpio<Stm32Gpio> = Gpio::new(Stm32Gpio, &PIN_CALLBACKS);

/// UART layer bound to the ST HAL
pub static UART: Uart<Stm32Uart> = Uart::new(Stm32Uart, &UART_HANDLES);

#[no_mangle]
pub extern "C" fn HAL_GPIO_EXTI_Callback(pin: u16) {
    PIN_CALLBACKS.dispatch(pin);
}

#[no_mangle]
pub extern "C" fn HAL_UART_TxCpltCallback(huart: *mut ffi::UART_HandleTypeDef) {
    if let Some(handle) = UartHandle::from_ptr(huart) {
        UART_HANDLES.dispatch_tx_complete(handle);
    }
}

#[no_mangle]
pub extern "C" fn HAL_UART_RxCpltCallback(huart: *mut ffi::UART_HandleTypeDef) {
    if let Some(handle) = UartHandle::from_ptr(huart) {
        UART_HANDLES.dispatch_rx_complete(handle);
    }
}

#[no_mangle]
pub extern "C" fn HAL_UART_ErrorCallback(huart: *mut ffi::UART_HandleTypeDef) {
    if let Some(handle) = UartHandle::from_ptr(huart) {
        UART_HANDLES.dispatch_error(handle);
    }
}
