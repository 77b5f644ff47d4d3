//! STM32F4 GPIO driver on top of `HAL_GPIO_*`

use mcu_hal::gpio::{PinMode, PinState, Pull};
use mcu_hal::interrupt::{ExtiLine, InterruptPriority};
use mcu_hal::vendor::{GpioVendor, PinInit, Speed};

use crate::ffi;
use crate::rcc;

const GPIOA_BASE: usize = 0x4002_0000;
const GPIO_STRIDE: usize = 0x400;

/// GPIO port of an STM32F446
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Port {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
}

impl Port {
    fn index(self) -> usize {
        self as usize
    }

    fn regs(self) -> *mut ffi::GPIO_TypeDef {
        (GPIOA_BASE + self.index() * GPIO_STRIDE) as *mut ffi::GPIO_TypeDef
    }
}

/// GPIO side of the ST HAL
#[derive(Debug, Clone, Copy, Default)]
pub struct Stm32Gpio;

impl Stm32Gpio {
    /// Route a pin to alternate function `af` (push-pull, very high speed)
    ///
    /// Used from `HAL_*_MspInit` hooks to hand pins to a peripheral.
    pub fn init_alternate(&self, port: Port, pin: u8, af: u8) {
        let Some(mask) = mcu_hal::gpio::pin_mask(pin) else {
            return;
        };
        self.enable_clock(port);
        let mut init = ffi::GPIO_InitTypeDef {
            Pin: mask as u32,
            Mode: ffi::GPIO_MODE_AF_PP,
            Pull: ffi::GPIO_NOPULL,
            Speed: ffi::GPIO_SPEED_FREQ_VERY_HIGH,
            Alternate: af as u32,
        };
        // SAFETY: `port.regs()` is a valid GPIO register block on this chip
        unsafe { ffi::HAL_GPIO_Init(port.regs(), &mut init) };
    }
}

impl GpioVendor for Stm32Gpio {
    type Port = Port;

    fn enable_clock(&self, port: Port) {
        rcc::enable(rcc::AHB1ENR, 1 << port.index());
    }

    fn init(&self, port: Port, init: &PinInit) {
        let mut hal_init = ffi::GPIO_InitTypeDef {
            Pin: init.mask as u32,
            Mode: mode_bits(init.mode),
            Pull: pull_bits(init.pull),
            Speed: speed_bits(init.speed),
            Alternate: 0,
        };
        // SAFETY: valid register block and a live init structure
        unsafe { ffi::HAL_GPIO_Init(port.regs(), &mut hal_init) };
    }

    fn deinit(&self, port: Port, mask: u16) {
        // SAFETY: valid register block; the HAL only touches the pins in `mask`
        unsafe { ffi::HAL_GPIO_DeInit(port.regs(), mask as u32) };
    }

    fn write(&self, port: Port, mask: u16, state: PinState) {
        let level = match state {
            PinState::Reset => ffi::GPIO_PIN_RESET,
            PinState::Set => ffi::GPIO_PIN_SET,
        };
        // SAFETY: valid register block; a BSRR write has no other side effect
        unsafe { ffi::HAL_GPIO_WritePin(port.regs(), mask, level) };
    }

    fn read(&self, port: Port, mask: u16) -> PinState {
        // SAFETY: valid register block; reading IDR has no side effect
        let level = unsafe { ffi::HAL_GPIO_ReadPin(port.regs(), mask) };
        PinState::from(level != ffi::GPIO_PIN_RESET)
    }

    fn toggle(&self, port: Port, mask: u16) {
        // SAFETY: valid register block; the HAL only touches the pins in `mask`
        unsafe { ffi::HAL_GPIO_TogglePin(port.regs(), mask) };
    }

    fn enable_irq(&self, line: ExtiLine, priority: InterruptPriority) {
        let irq = irq_number(line);
        // SAFETY: `irq` is one of the EXTI vectors of this chip
        unsafe {
            ffi::HAL_NVIC_SetPriority(irq, priority as u32, 0);
            ffi::HAL_NVIC_EnableIRQ(irq);
        }
    }
}

fn mode_bits(mode: PinMode) -> u32 {
    match mode {
        PinMode::Input => ffi::GPIO_MODE_INPUT,
        PinMode::OutputPushPull => ffi::GPIO_MODE_OUTPUT_PP,
        PinMode::OutputOpenDrain => ffi::GPIO_MODE_OUTPUT_OD,
        PinMode::Analog => ffi::GPIO_MODE_ANALOG,
        PinMode::InterruptRising => ffi::GPIO_MODE_IT_RISING,
        PinMode::InterruptFalling => ffi::GPIO_MODE_IT_FALLING,
        PinMode::InterruptRisingFalling => ffi::GPIO_MODE_IT_RISING_FALLING,
    }
}

fn pull_bits(pull: Pull) -> u32 {
    match pull {
        Pull::None => ffi::GPIO_NOPULL,
        Pull::Up => ffi::GPIO_PULLUP,
        Pull::Down => ffi::GPIO_PULLDOWN,
    }
}

fn speed_bits(speed: Speed) -> u32 {
    match speed {
        Speed::Low => ffi::GPIO_SPEED_FREQ_LOW,
        Speed::Medium => ffi::GPIO_SPEED_FREQ_MEDIUM,
        Speed::High => ffi::GPIO_SPEED_FREQ_HIGH,
        Speed::VeryHigh => ffi::GPIO_SPEED_FREQ_VERY_HIGH,
    }
}

fn irq_number(line: ExtiLine) -> ffi::IRQn_Type {
    match line {
        ExtiLine::Line0 => ffi::EXTI0_IRQn,
        ExtiLine::Line1 => ffi::EXTI1_IRQn,
        ExtiLine::Line2 => ffi::EXTI2_IRQn,
        ExtiLine::Line3 => ffi::EXTI3_IRQn,
        ExtiLine::Line4 => ffi::EXTI4_IRQn,
        ExtiLine::Lines9To5 => ffi::EXTI9_5_IRQn,
        ExtiLine::Lines15To10 => ffi::EXTI15_10_IRQn,
    }
}
