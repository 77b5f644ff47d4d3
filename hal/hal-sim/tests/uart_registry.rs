use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

use mcu_hal::uart::UartConfig;
use mcu_hal::vendor::{Direction, FlowControl, Oversampling};
use mcu_hal::{HalError, Parity, StopBits, Uart, UartRegistry, WordLength, MAX_UART_HANDLES};
use mcu_hal_sim::{SimHandle, SimInstance, SimUart};

fn config(handle: u8) -> UartConfig<SimHandle, SimInstance> {
    UartConfig::builder(SimHandle(handle), SimInstance::Usart2).build()
}

#[test]
fn rx_complete_reaches_its_handle_only() {
    static REGISTRY: UartRegistry<SimHandle> = UartRegistry::new();
    static SIM: SimUart = SimUart::new(&REGISTRY);
    static HITS: AtomicUsize = AtomicUsize::new(0);
    static LAST: AtomicU32 = AtomicU32::new(u32::MAX);

    fn on_rx(handle: SimHandle) {
        HITS.fetch_add(1, Ordering::SeqCst);
        LAST.store(handle.0 as u32, Ordering::SeqCst);
    }

    let uart = Uart::new(&SIM, &REGISTRY);
    uart.init(&config(1)).unwrap();
    uart.init(&config(2)).unwrap();
    uart.register_rx_callback(SimHandle(2), Some(on_rx)).unwrap();

    uart.dispatch_rx_complete(SimHandle(2));
    assert_eq!(HITS.load(Ordering::SeqCst), 1);
    assert_eq!(LAST.load(Ordering::SeqCst), 2);

    uart.dispatch_rx_complete(SimHandle(1));
    uart.dispatch_rx_complete(SimHandle(9));
    uart.dispatch_tx_complete(SimHandle(2));
    assert_eq!(HITS.load(Ordering::SeqCst), 1);
}

#[test]
fn registration_on_unknown_handle_fails() {
    static REGISTRY: UartRegistry<SimHandle> = UartRegistry::new();
    static SIM: SimUart = SimUart::new(&REGISTRY);

    fn noop(_: SimHandle) {}

    let uart = Uart::new(&SIM, &REGISTRY);
    assert_eq!(
        uart.register_tx_callback(SimHandle(3), Some(noop)),
        Err(HalError::NotRegistered)
    );
    assert_eq!(
        uart.register_error_callback(SimHandle(3), Some(noop)),
        Err(HalError::NotRegistered)
    );
    assert!(REGISTRY.is_empty());
}

#[test]
fn sixth_handle_is_refused_even_after_deinit() {
    static REGISTRY: UartRegistry<SimHandle> = UartRegistry::new();
    static SIM: SimUart = SimUart::new(&REGISTRY);

    let uart = Uart::new(&SIM, &REGISTRY);
    for handle in 0..MAX_UART_HANDLES as u8 {
        uart.init(&config(handle)).unwrap();
    }
    assert_eq!(uart.init(&config(5)), Err(HalError::RegistryFull));
    assert!(!SIM.is_open(SimHandle(5)));

    uart.deinit(SimHandle(0)).unwrap();
    assert!(!REGISTRY.contains(SimHandle(0)));
    assert_eq!(uart.init(&config(5)), Err(HalError::RegistryFull));

    // The retained slot still belongs to its own handle
    uart.init(&config(0)).unwrap();
    assert!(REGISTRY.contains(SimHandle(0)));
}

#[test]
fn reclaiming_registry_frees_the_slot() {
    static REGISTRY: UartRegistry<SimHandle> = UartRegistry::reclaiming();
    static SIM: SimUart = SimUart::new(&REGISTRY);

    let uart = Uart::new(&SIM, &REGISTRY);
    for handle in 0..MAX_UART_HANDLES as u8 {
        uart.init(&config(handle)).unwrap();
    }
    uart.deinit(SimHandle(3)).unwrap();

    uart.init(&config(5)).unwrap();
    assert!(REGISTRY.contains(SimHandle(5)));
    assert_eq!(REGISTRY.len(), MAX_UART_HANDLES);
}

#[test]
fn deinit_drops_callbacks() {
    static REGISTRY: UartRegistry<SimHandle> = UartRegistry::new();
    static SIM: SimUart = SimUart::new(&REGISTRY);
    static HITS: AtomicUsize = AtomicUsize::new(0);

    fn on_error(_: SimHandle) {
        HITS.fetch_add(1, Ordering::SeqCst);
    }

    let uart = Uart::new(&SIM, &REGISTRY);
    uart.init(&config(4)).unwrap();
    uart.register_error_callback(SimHandle(4), Some(on_error)).unwrap();

    SIM.raise_error(SimHandle(4));
    assert_eq!(HITS.load(Ordering::SeqCst), 1);

    uart.deinit(SimHandle(4)).unwrap();
    SIM.raise_error(SimHandle(4));
    assert_eq!(HITS.load(Ordering::SeqCst), 1);
    assert_eq!(
        uart.register_error_callback(SimHandle(4), Some(on_error)),
        Err(HalError::NotRegistered)
    );
}

#[test]
fn vendor_failure_registers_nothing() {
    static REGISTRY: UartRegistry<SimHandle> = UartRegistry::new();
    static SIM: SimUart = SimUart::new(&REGISTRY);

    let uart = Uart::new(&SIM, &REGISTRY);
    SIM.fail_next_init(HalError::HardwareError);

    assert_eq!(uart.init(&config(1)), Err(HalError::HardwareError));
    assert!(REGISTRY.is_empty());
    assert!(!SIM.is_open(SimHandle(1)));

    uart.init(&config(1)).unwrap();
    assert!(REGISTRY.contains(SimHandle(1)));
}

#[test]
fn zero_baud_is_rejected_before_the_vendor() {
    static REGISTRY: UartRegistry<SimHandle> = UartRegistry::new();
    static SIM: SimUart = SimUart::new(&REGISTRY);

    let uart = Uart::new(&SIM, &REGISTRY);
    let config = UartConfig::builder(SimHandle(1), SimInstance::Usart1)
        .baud_rate(0)
        .build();

    assert_eq!(uart.init(&config), Err(HalError::InvalidParameter));
    assert!(!SIM.is_open(SimHandle(1)));
    assert!(REGISTRY.is_empty());
}

#[test]
fn vendor_sees_fixed_fields() {
    static REGISTRY: UartRegistry<SimHandle> = UartRegistry::new();
    static SIM: SimUart = SimUart::new(&REGISTRY);

    let uart = Uart::new(&SIM, &REGISTRY);
    let config = UartConfig::builder(SimHandle(1), SimInstance::Uart4)
        .baud_rate(57_600)
        .word_length(WordLength::Bits9)
        .stop_bits(StopBits::Two)
        .parity(Parity::Even)
        .build();
    uart.init(&config).unwrap();

    let (instance, init) = SIM.port_init(SimHandle(1)).unwrap();
    assert_eq!(instance, SimInstance::Uart4);
    assert_eq!(init.baud_rate, 57_600);
    assert_eq!(init.word_length, WordLength::Bits9);
    assert_eq!(init.stop_bits, StopBits::Two);
    assert_eq!(init.parity, Parity::Even);
    assert_eq!(init.flow_control, FlowControl::None);
    assert_eq!(init.direction, Direction::TxRx);
    assert_eq!(init.oversampling, Oversampling::X16);
}

#[test]
fn polling_transfers_pass_through() {
    static REGISTRY: UartRegistry<SimHandle> = UartRegistry::new();
    static SIM: SimUart = SimUart::new(&REGISTRY);

    let uart = Uart::new(&SIM, &REGISTRY);
    uart.init(&config(1)).unwrap();

    uart.transmit_polling(SimHandle(1), b"ping", 100).unwrap();
    assert_eq!(&SIM.sent(SimHandle(1))[..], b"ping");

    SIM.feed(SimHandle(1), b"pong").unwrap();
    let mut buf = [0u8; 4];
    uart.receive_polling(SimHandle(1), &mut buf, 100).unwrap();
    assert_eq!(&buf, b"pong");

    assert_eq!(
        uart.receive_polling(SimHandle(1), &mut buf, 100),
        Err(HalError::Timeout)
    );
}

#[test]
fn live_handle_cannot_be_reinitialized() {
    static REGISTRY: UartRegistry<SimHandle> = UartRegistry::new();
    static SIM: SimUart = SimUart::new(&REGISTRY);
    static HITS: AtomicUsize = AtomicUsize::new(0);

    fn on_rx(_: SimHandle) {
        HITS.fetch_add(1, Ordering::SeqCst);
    }

    let uart = Uart::new(&SIM, &REGISTRY);
    for handle in 0..MAX_UART_HANDLES as u8 {
        uart.init(&config(handle)).unwrap();
    }
    uart.register_rx_callback(SimHandle(0), Some(on_rx)).unwrap();

    let faster = UartConfig::builder(SimHandle(0), SimInstance::Usart2)
        .baud_rate(9600)
        .build();

    // Busy even with every slot taken; the vendor keeps the first settings
    assert_eq!(uart.init(&faster), Err(HalError::Busy));
    assert_eq!(SIM.port_init(SimHandle(0)).unwrap().1.baud_rate, 115_200);
    assert_eq!(REGISTRY.len(), MAX_UART_HANDLES);

    uart.dispatch_rx_complete(SimHandle(0));
    assert_eq!(HITS.load(Ordering::SeqCst), 1);

    uart.deinit(SimHandle(0)).unwrap();
    uart.init(&faster).unwrap();
    assert_eq!(SIM.port_init(SimHandle(0)).unwrap().1.baud_rate, 9600);
}
