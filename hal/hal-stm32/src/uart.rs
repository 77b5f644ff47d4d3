//! STM32F4 UART driver on top of `HAL_UART_*`

use core::cell::UnsafeCell;
use core::ptr::NonNull;

use mcu_hal::error::{HalError, HalResult};
use mcu_hal::uart::{Parity, StopBits, WordLength};
use mcu_hal::vendor::{Direction, FlowControl, Oversampling, PortInit, UartVendor};

use crate::ffi;
use crate::rcc;

/// USART/UART peripheral of an STM32F446
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instance {
    Usart1,
    Usart2,
    Usart3,
    Uart4,
    Uart5,
    Usart6,
}

impl Instance {
    fn base(self) -> usize {
        match self {
            Self::Usart1 => 0x4001_1000,
            Self::Usart2 => 0x4000_4400,
            Self::Usart3 => 0x4000_4800,
            Self::Uart4 => 0x4000_4C00,
            Self::Uart5 => 0x4000_5000,
            Self::Usart6 => 0x4001_1400,
        }
    }

    fn enable_clock(self) {
        match self {
            Self::Usart1 => rcc::enable(rcc::APB2ENR, 1 << 4),
            Self::Usart2 => rcc::enable(rcc::APB1ENR, 1 << 17),
            Self::Usart3 => rcc::enable(rcc::APB1ENR, 1 << 18),
            Self::Uart4 => rcc::enable(rcc::APB1ENR, 1 << 19),
            Self::Uart5 => rcc::enable(rcc::APB1ENR, 1 << 20),
            Self::Usart6 => rcc::enable(rcc::APB2ENR, 1 << 5),
        }
    }
}

/// Storage for one `UART_HandleTypeDef`
///
/// Declare one `static` per port; the HAL keeps pointers into it across
/// interrupt-driven transfers.
pub struct UartControl(UnsafeCell<ffi::UART_HandleTypeDef>);

// SAFETY: the control block is only written by the ST HAL, which serializes
// access per port between thread mode and the port's interrupt.
unsafe impl Sync for UartControl {}

impl UartControl {
    pub const fn new() -> Self {
        Self(UnsafeCell::new(ffi::UART_HandleTypeDef::zeroed()))
    }

    /// Handle naming this control block
    pub fn handle(&'static self) -> UartHandle {
        // SAFETY: `UnsafeCell::get` never returns null
        UartHandle(unsafe { NonNull::new_unchecked(self.0.get()) })
    }
}

impl Default for UartControl {
    fn default() -> Self {
        Self::new()
    }
}

/// Port handle: the address of the port's `UART_HandleTypeDef`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UartHandle(NonNull<ffi::UART_HandleTypeDef>);

// SAFETY: the handle is an address used for identity and passed back to the
// HAL, which owns synchronization of the control block.
unsafe impl Send for UartHandle {}
unsafe impl Sync for UartHandle {}

impl UartHandle {
    /// Wrap the pointer the HAL hands to its completion callbacks
    pub fn from_ptr(ptr: *mut ffi::UART_HandleTypeDef) -> Option<Self> {
        NonNull::new(ptr).map(Self)
    }

    pub fn as_ptr(self) -> *mut ffi::UART_HandleTypeDef {
        self.0.as_ptr()
    }
}

/// UART side of the ST HAL
#[derive(Debug, Clone, Copy, Default)]
pub struct Stm32Uart;

impl UartVendor for Stm32Uart {
    type Handle = UartHandle;
    type Instance = Instance;

    fn init(&self, handle: UartHandle, instance: Instance, init: &PortInit) -> HalResult<()> {
        instance.enable_clock();

        let huart = handle.as_ptr();
        // SAFETY: `handle` points into a `'static` `UartControl`; the port is
        // not running yet so nothing else touches it.
        unsafe {
            (*huart).Instance = instance.base() as *mut _;
            (*huart).Init = init_record(init);
            check(ffi::HAL_UART_Init(huart))
        }
    }

    fn deinit(&self, handle: UartHandle) -> HalResult<()> {
        // SAFETY: `handle` points into a `'static` `UartControl`
        check(unsafe { ffi::HAL_UART_DeInit(handle.as_ptr()) })
    }

    fn transmit(&self, handle: UartHandle, data: &[u8], timeout_ms: u32) -> HalResult<()> {
        let size = transfer_size(data.len())?;
        // SAFETY: `data` outlives the blocking call and holds `size` bytes
        check(unsafe { ffi::HAL_UART_Transmit(handle.as_ptr(), data.as_ptr(), size, timeout_ms) })
    }

    fn receive(&self, handle: UartHandle, buffer: &mut [u8], timeout_ms: u32) -> HalResult<()> {
        let size = transfer_size(buffer.len())?;
        // SAFETY: `buffer` is exclusively borrowed for the blocking call and
        // holds `size` bytes
        check(unsafe {
            ffi::HAL_UART_Receive(handle.as_ptr(), buffer.as_mut_ptr(), size, timeout_ms)
        })
    }

    fn transmit_it(&self, handle: UartHandle, data: &'static [u8]) -> HalResult<()> {
        let size = transfer_size(data.len())?;
        // SAFETY: `data` is `'static`, so it outlives the transfer
        check(unsafe { ffi::HAL_UART_Transmit_IT(handle.as_ptr(), data.as_ptr(), size) })
    }

    fn receive_it(&self, handle: UartHandle, buffer: &'static mut [u8]) -> HalResult<()> {
        let size = transfer_size(buffer.len())?;
        // SAFETY: `buffer` is `'static` and handed over to the HAL for the
        // whole transfer
        check(unsafe { ffi::HAL_UART_Receive_IT(handle.as_ptr(), buffer.as_mut_ptr(), size) })
    }
}

fn init_record(init: &PortInit) -> ffi::UART_InitTypeDef {
    ffi::UART_InitTypeDef {
        BaudRate: init.baud_rate,
        WordLength: match init.word_length {
            WordLength::Bits8 => ffi::UART_WORDLENGTH_8B,
            WordLength::Bits9 => ffi::UART_WORDLENGTH_9B,
        },
        StopBits: match init.stop_bits {
            StopBits::One => ffi::UART_STOPBITS_1,
            StopBits::Two => ffi::UART_STOPBITS_2,
        },
        Parity: match init.parity {
            Parity::None => ffi::UART_PARITY_NONE,
            Parity::Even => ffi::UART_PARITY_EVEN,
            Parity::Odd => ffi::UART_PARITY_ODD,
        },
        Mode: match init.direction {
            Direction::Tx => ffi::UART_MODE_TX,
            Direction::Rx => ffi::UART_MODE_RX,
            Direction::TxRx => ffi::UART_MODE_TX_RX,
        },
        HwFlowCtl: match init.flow_control {
            FlowControl::None => ffi::UART_HWCONTROL_NONE,
            FlowControl::RtsCts => ffi::UART_HWCONTROL_RTS_CTS,
        },
        OverSampling: match init.oversampling {
            Oversampling::X16 => ffi::UART_OVERSAMPLING_16,
            Oversampling::X8 => ffi::UART_OVERSAMPLING_8,
        },
    }
}

/// The HAL counts transfers in `u16`
fn transfer_size(len: usize) -> HalResult<u16> {
    u16::try_from(len).map_err(|_| HalError::InvalidParameter)
}

fn check(status: ffi::HAL_StatusTypeDef) -> HalResult<()> {
    match status {
        ffi::HAL_OK => Ok(()),
        ffi::HAL_ERROR => Err(HalError::HardwareError),
        ffi::HAL_BUSY => Err(HalError::Busy),
        ffi::HAL_TIMEOUT => Err(HalError::Timeout),
        other => Err(HalError::VendorError(other)),
    }
}
