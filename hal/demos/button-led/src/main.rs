//! Button/LED and serial echo demo for a NUCLEO-F446RE
//!
//! - The user button (PC13) raises a falling-edge interrupt whose callback
//!   toggles the user LED (PA5).
//! - USART2 (the ST-LINK virtual COM port, 115200 8N1) receives one byte at a
//!   time by interrupt and echoes it back.
//!
//! Needs ST's C HAL linked in, see `mcu-hal-stm32`'s build script.

#![no_std]
#![no_main]

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicBool, Ordering};

use cortex_m_rt::{entry, exception};
use panic_halt as _;

use mcu_hal::uart::UartConfig;
use mcu_hal::{PinConfig, PinMode, Pull};
use mcu_hal_stm32::{ffi, Instance, Port, Stm32Gpio, UartControl, UartHandle, GPIO, UART};

const LED_PORT: Port = Port::A;
const LED_PIN: u8 = 5;

const BUTTON_PORT: Port = Port::C;
const BUTTON_PIN: u8 = 13;

/// Busy-wait after a press, in core cycles
const DEBOUNCE_CYCLES: u32 = 200_000;

const ECHO_TIMEOUT_MS: u32 = 10;

static HUART2: UartControl = UartControl::new();

struct RxByte(UnsafeCell<[u8; 1]>);

// SAFETY: written by the HAL while a receive is armed, read by `main` only
// after `RX_READY` reports the receive finished.
unsafe impl Sync for RxByte {}

static RX_BYTE: RxByte = RxByte(UnsafeCell::new([0]));
static RX_READY: AtomicBool = AtomicBool::new(false);
static RX_FAILED: AtomicBool = AtomicBool::new(false);

fn on_button(pin: u8) {
    if pin == BUTTON_PIN {
        let _ = GPIO.toggle(LED_PORT, LED_PIN);
        cortex_m::asm::delay(DEBOUNCE_CYCLES);
    }
}

fn on_rx_complete(_: UartHandle) {
    RX_READY.store(true, Ordering::Release);
}

fn on_uart_error(_: UartHandle) {
    RX_FAILED.store(true, Ordering::Release);
}

/// Arm a one-byte interrupt receive
///
/// Only called when no receive is pending.
fn arm_receive(handle: UartHandle) {
    // SAFETY: no receive is armed, so nothing else holds the byte
    let buffer: &'static mut [u8] = unsafe { &mut *RX_BYTE.0.get() };
    let _ = UART.receive_it(handle, buffer);
}

#[entry]
fn main() -> ! {
    // SAFETY: first call, before any other HAL use
    unsafe { ffi::HAL_Init() };

    let _ = GPIO.init(&PinConfig::new(LED_PORT, LED_PIN, PinMode::OutputPushPull, Pull::None));
    // The Nucleo board pulls the button up externally
    let _ = GPIO.init(&PinConfig::new(
        BUTTON_PORT,
        BUTTON_PIN,
        PinMode::InterruptFalling,
        Pull::None,
    ));
    let _ = GPIO.register_callback(BUTTON_PIN, Some(on_button));

    let console = HUART2.handle();
    if UART
        .init(&UartConfig::builder(console, Instance::Usart2).build())
        .is_ok()
    {
        let _ = UART.register_rx_callback(console, Some(on_rx_complete));
        let _ = UART.register_error_callback(console, Some(on_uart_error));
        arm_receive(console);
    }

    loop {
        if RX_READY.swap(false, Ordering::Acquire) {
            // SAFETY: the receive finished, the HAL no longer writes the byte
            let byte = unsafe { (*RX_BYTE.0.get())[0] };
            let _ = UART.transmit_polling(console, &[byte], ECHO_TIMEOUT_MS);
            arm_receive(console);
        }

        if RX_FAILED.swap(false, Ordering::Acquire) {
            arm_receive(console);
        }

        cortex_m::asm::wfi();
    }
}

#[exception]
fn SysTick() {
    unsafe { ffi::HAL_IncTick() };
}

#[no_mangle]
extern "C" fn EXTI15_10() {
    unsafe { ffi::HAL_GPIO_EXTI_IRQHandler(1 << BUTTON_PIN) };
}

#[no_mangle]
extern "C" fn USART2() {
    unsafe { ffi::HAL_UART_IRQHandler(HUART2.handle().as_ptr()) };
}

/// Pin muxing and interrupt enable for USART2, called from `HAL_UART_Init`
#[no_mangle]
extern "C" fn HAL_UART_MspInit(huart: *mut ffi::UART_HandleTypeDef) {
    if huart != HUART2.handle().as_ptr() {
        return;
    }

    // PA2 = TX, PA3 = RX, AF7
    Stm32Gpio.init_alternate(Port::A, 2, 7);
    Stm32Gpio.init_alternate(Port::A, 3, 7);

    unsafe {
        ffi::HAL_NVIC_SetPriority(ffi::USART2_IRQn, mcu_hal::EXTI_PRIORITY as u32, 0);
        ffi::HAL_NVIC_EnableIRQ(ffi::USART2_IRQn);
    }
}

extern "C" {
    fn DefaultHandler();
}

const VECTOR_COUNT: usize = 97;

/// Device interrupt vectors; only the ones this demo binds are populated
#[link_section = ".vector_table.interrupts"]
#[no_mangle]
static __INTERRUPTS: [unsafe extern "C" fn(); VECTOR_COUNT] = {
    let mut vectors = [DefaultHandler as unsafe extern "C" fn(); VECTOR_COUNT];
    vectors[ffi::USART2_IRQn as usize] = USART2;
    vectors[ffi::EXTI15_10_IRQn as usize] = EXTI15_10;
    vectors
};
