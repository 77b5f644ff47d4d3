//! Bindings to the STM32CubeF4 HAL
//!
//! Only the entry points and structure prefixes this backend touches are
//! declared. Values are taken from `stm32f4xx_hal_gpio.h`,
//! `stm32f4xx_hal_uart.h` and `stm32f446xx.h`.

#![allow(non_camel_case_types, non_snake_case, dead_code)]

use core::ffi::{c_int, c_void};

pub type HAL_StatusTypeDef = c_int;
pub const HAL_OK: HAL_StatusTypeDef = 0;
pub const HAL_ERROR: HAL_StatusTypeDef = 1;
pub const HAL_BUSY: HAL_StatusTypeDef = 2;
pub const HAL_TIMEOUT: HAL_StatusTypeDef = 3;

pub type IRQn_Type = c_int;
pub const EXTI0_IRQn: IRQn_Type = 6;
pub const EXTI1_IRQn: IRQn_Type = 7;
pub const EXTI2_IRQn: IRQn_Type = 8;
pub const EXTI3_IRQn: IRQn_Type = 9;
pub const EXTI4_IRQn: IRQn_Type = 10;
pub const EXTI9_5_IRQn: IRQn_Type = 23;
pub const USART2_IRQn: IRQn_Type = 38;
pub const EXTI15_10_IRQn: IRQn_Type = 40;

pub type GPIO_PinState = c_int;
pub const GPIO_PIN_RESET: GPIO_PinState = 0;
pub const GPIO_PIN_SET: GPIO_PinState = 1;

pub const GPIO_MODE_INPUT: u32 = 0x0000_0000;
pub const GPIO_MODE_OUTPUT_PP: u32 = 0x0000_0001;
pub const GPIO_MODE_OUTPUT_OD: u32 = 0x0000_0011;
pub const GPIO_MODE_AF_PP: u32 = 0x0000_0002;
pub const GPIO_MODE_ANALOG: u32 = 0x0000_0003;
pub const GPIO_MODE_IT_RISING: u32 = 0x1011_0000;
pub const GPIO_MODE_IT_FALLING: u32 = 0x1021_0000;
pub const GPIO_MODE_IT_RISING_FALLING: u32 = 0x1031_0000;

pub const GPIO_NOPULL: u32 = 0;
pub const GPIO_PULLUP: u32 = 1;
pub const GPIO_PULLDOWN: u32 = 2;

pub const GPIO_SPEED_FREQ_LOW: u32 = 0;
pub const GPIO_SPEED_FREQ_MEDIUM: u32 = 1;
pub const GPIO_SPEED_FREQ_HIGH: u32 = 2;
pub const GPIO_SPEED_FREQ_VERY_HIGH: u32 = 3;

pub const UART_WORDLENGTH_8B: u32 = 0x0000;
pub const UART_WORDLENGTH_9B: u32 = 0x1000;
pub const UART_STOPBITS_1: u32 = 0x0000;
pub const UART_STOPBITS_2: u32 = 0x2000;
pub const UART_PARITY_NONE: u32 = 0x0000;
pub const UART_PARITY_EVEN: u32 = 0x0400;
pub const UART_PARITY_ODD: u32 = 0x0600;
pub const UART_MODE_RX: u32 = 0x0004;
pub const UART_MODE_TX: u32 = 0x0008;
pub const UART_MODE_TX_RX: u32 = 0x000C;
pub const UART_HWCONTROL_NONE: u32 = 0x0000;
pub const UART_HWCONTROL_RTS_CTS: u32 = 0x0300;
pub const UART_OVERSAMPLING_16: u32 = 0x0000;
pub const UART_OVERSAMPLING_8: u32 = 0x8000;

/// Opaque GPIO register block
#[repr(C)]
pub struct GPIO_TypeDef {
    _private: [u8; 0],
}

#[repr(C)]
#[derive(Debug, Default, Clone, Copy)]
pub struct GPIO_InitTypeDef {
    pub Pin: u32,
    pub Mode: u32,
    pub Pull: u32,
    pub Speed: u32,
    pub Alternate: u32,
}

#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct UART_InitTypeDef {
    pub BaudRate: u32,
    pub WordLength: u32,
    pub StopBits: u32,
    pub Parity: u32,
    pub Mode: u32,
    pub HwFlowCtl: u32,
    pub OverSampling: u32,
}

/// Words reserved for the HAL-private tail of `UART_HandleTypeDef`
///
/// Covers the transfer bookkeeping, DMA links, lock and state words, and the
/// optional register-callback table.
pub const UART_HANDLE_PRIVATE_WORDS: usize = 40;

/// `UART_HandleTypeDef` with its HAL-private tail kept opaque
#[repr(C)]
pub struct UART_HandleTypeDef {
    pub Instance: *mut c_void,
    pub Init: UART_InitTypeDef,
    _private: [u32; UART_HANDLE_PRIVATE_WORDS],
}

impl UART_HandleTypeDef {
    pub const fn zeroed() -> Self {
        Self {
            Instance: core::ptr::null_mut(),
            Init: UART_InitTypeDef {
                BaudRate: 0,
                WordLength: 0,
                StopBits: 0,
                Parity: 0,
                Mode: 0,
                HwFlowCtl: 0,
                OverSampling: 0,
            },
            _private: [0; UART_HANDLE_PRIVATE_WORDS],
        }
    }
}

extern "C" {
    pub fn HAL_Init() -> HAL_StatusTypeDef;
    pub fn HAL_IncTick();

    pub fn HAL_GPIO_Init(port: *mut GPIO_TypeDef, init: *mut GPIO_InitTypeDef);
    pub fn HAL_GPIO_DeInit(port: *mut GPIO_TypeDef, pin: u32);
    pub fn HAL_GPIO_WritePin(port: *mut GPIO_TypeDef, pin: u16, state: GPIO_PinState);
    pub fn HAL_GPIO_ReadPin(port: *mut GPIO_TypeDef, pin: u16) -> GPIO_PinState;
    pub fn HAL_GPIO_TogglePin(port: *mut GPIO_TypeDef, pin: u16);
    pub fn HAL_GPIO_EXTI_IRQHandler(pin: u16);

    pub fn HAL_NVIC_SetPriority(irq: IRQn_Type, preempt: u32, sub: u32);
    pub fn HAL_NVIC_EnableIRQ(irq: IRQn_Type);

    pub fn HAL_UART_Init(huart: *mut UART_HandleTypeDef) -> HAL_StatusTypeDef;
    pub fn HAL_UART_DeInit(huart: *mut UART_HandleTypeDef) -> HAL_StatusTypeDef;
    pub fn HAL_UART_Transmit(
        huart: *mut UART_HandleTypeDef,
        data: *const u8,
        size: u16,
        timeout: u32,
    ) -> HAL_StatusTypeDef;
    pub fn HAL_UART_Receive(
        huart: *mut UART_HandleTypeDef,
        data: *mut u8,
        size: u16,
        timeout: u32,
    ) -> HAL_StatusTypeDef;
    pub fn HAL_UART_Transmit_IT(
        huart: *mut UART_HandleTypeDef,
        data: *const u8,
        size: u16,
    ) -> HAL_StatusTypeDef;
    pub fn HAL_UART_Receive_IT(
        huart: *mut UART_HandleTypeDef,
        data: *mut u8,
        size: u16,
    ) -> HAL_StatusTypeDef;
    pub fn HAL_UART_IRQHandler(huart: *mut UART_HandleTypeDef);
}
