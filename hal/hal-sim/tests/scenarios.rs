//! End-to-end flows of the button/LED and serial echo firmware, run against
//! the in-memory driver

use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

use embedded_hal::digital::{InputPin, OutputPin, StatefulOutputPin};
use mcu_hal::uart::UartConfig;
use mcu_hal::{Gpio, PinCallbacks, PinConfig, PinMode, PinState, Pull, Uart, UartRegistry};
use mcu_hal_sim::{SimGpio, SimHandle, SimInstance, SimPort, SimUart};

const LED_PIN: u8 = 5;
const BUTTON_PIN: u8 = 13;

#[test]
fn button_edge_toggles_led() {
    static EXTI: PinCallbacks = PinCallbacks::new();
    static SIM: SimGpio = SimGpio::new(&EXTI);
    static GPIO: Gpio<&SimGpio> = Gpio::new(&SIM, &EXTI);

    fn on_button(_: u8) {
        let _ = GPIO.toggle(SimPort::A, LED_PIN);
    }

    GPIO.init(&PinConfig::new(SimPort::A, LED_PIN, PinMode::OutputPushPull, Pull::None))
        .unwrap();
    GPIO.init(&PinConfig::new(SimPort::C, BUTTON_PIN, PinMode::InterruptFalling, Pull::None))
        .unwrap();
    GPIO.register_callback(BUTTON_PIN, Some(on_button)).unwrap();

    let mut expected = PinState::Reset;
    assert_eq!(GPIO.read(SimPort::A, LED_PIN).unwrap(), expected);

    for _ in 0..4 {
        assert!(SIM.raise_edge(SimPort::C, BUTTON_PIN));
        expected = !expected;
        assert_eq!(GPIO.read(SimPort::A, LED_PIN).unwrap(), expected);
    }

    // A batched mask carrying the button does not match exactly
    SIM.raise_mask((1 << BUTTON_PIN) | (1 << 0));
    assert_eq!(GPIO.read(SimPort::A, LED_PIN).unwrap(), expected);
}

#[test]
fn interrupt_receive_reports_once() {
    static REGISTRY: UartRegistry<SimHandle> = UartRegistry::new();
    static SIM: SimUart = SimUart::new(&REGISTRY);
    static RX_HITS: AtomicUsize = AtomicUsize::new(0);
    static RX_HANDLE: AtomicU32 = AtomicU32::new(u32::MAX);
    static TX_HITS: AtomicUsize = AtomicUsize::new(0);

    fn on_rx(handle: SimHandle) {
        RX_HITS.fetch_add(1, Ordering::SeqCst);
        RX_HANDLE.store(handle.0 as u32, Ordering::SeqCst);
    }
    fn on_tx(_: SimHandle) {
        TX_HITS.fetch_add(1, Ordering::SeqCst);
    }

    let uart = Uart::new(&SIM, &REGISTRY);
    let handle = SimHandle(2);
    uart.init(&UartConfig::builder(handle, SimInstance::Usart2).build())
        .unwrap();
    uart.register_rx_callback(handle, Some(on_rx)).unwrap();
    uart.register_tx_callback(handle, Some(on_tx)).unwrap();

    let buffer: &'static mut [u8] = Box::leak(Box::new([0u8; 1]));
    uart.receive_it(handle, buffer).unwrap();
    assert_eq!(RX_HITS.load(Ordering::SeqCst), 0);

    let echoed = SIM.complete_rx(handle, b"x").unwrap();
    assert_eq!(RX_HITS.load(Ordering::SeqCst), 1);
    assert_eq!(RX_HANDLE.load(Ordering::SeqCst), 2);
    assert_eq!(echoed, b"x");

    // Nothing armed, nothing reported
    assert!(SIM.complete_rx(handle, b"y").is_none());
    assert_eq!(RX_HITS.load(Ordering::SeqCst), 1);

    uart.transmit_it(handle, echoed).unwrap();
    assert!(SIM.complete_tx(handle));
    assert_eq!(TX_HITS.load(Ordering::SeqCst), 1);
    assert_eq!(&SIM.sent(handle)[..], b"x");
}

#[test]
fn pin_view_speaks_embedded_hal() {
    static EXTI: PinCallbacks = PinCallbacks::new();
    static SIM: SimGpio = SimGpio::new(&EXTI);

    let gpio = Gpio::new(&SIM, &EXTI);
    gpio.init(&PinConfig::new(SimPort::B, 0, PinMode::OutputPushPull, Pull::None))
        .unwrap();

    let mut led = gpio.pin(SimPort::B, 0).unwrap();
    led.set_high().unwrap();
    assert!(led.is_set_high().unwrap());
    assert!(led.is_high().unwrap());

    led.toggle().unwrap();
    assert!(led.is_set_low().unwrap());

    assert!(gpio.pin(SimPort::B, 16).is_err());
}
