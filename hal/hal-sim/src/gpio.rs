//! Simulated GPIO ports

use core::cell::RefCell;
use critical_section::Mutex;
use heapless::Vec;

use mcu_hal::gpio::{PinState, MAX_PINS};
use mcu_hal::interrupt::{ExtiLine, InterruptPriority};
use mcu_hal::vendor::{GpioVendor, PinInit};
use mcu_hal::PinCallbacks;

/// Number of simulated ports (A through H)
pub const PORT_COUNT: usize = 8;

/// Number of driver calls kept in the call log
pub const CALL_LOG_DEPTH: usize = 64;

const LINE_COUNT: usize = 7;

/// Simulated port identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimPort {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
}

impl SimPort {
    fn index(self) -> usize {
        self as usize
    }
}

/// One call made into the simulated driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GpioCall {
    EnableClock(SimPort),
    Init(SimPort, PinInit),
    Deinit(SimPort, u16),
    Write(SimPort, u16, PinState),
    Read(SimPort, u16),
    Toggle(SimPort, u16),
    EnableIrq(ExtiLine, InterruptPriority),
}

struct GpioState {
    clocks: u8,
    levels: [u16; PORT_COUNT],
    configs: [[Option<PinInit>; MAX_PINS]; PORT_COUNT],
    lines: [Option<InterruptPriority>; LINE_COUNT],
    calls: Vec<GpioCall, CALL_LOG_DEPTH>,
}

impl GpioState {
    const fn new() -> Self {
        Self {
            clocks: 0,
            levels: [0; PORT_COUNT],
            configs: [[None; MAX_PINS]; PORT_COUNT],
            lines: [None; LINE_COUNT],
            calls: Vec::new(),
        }
    }

    fn record(&mut self, call: GpioCall) {
        // Oldest entries win once the log is full
        let _ = self.calls.push(call);
    }
}

/// Idealized GPIO driver
///
/// Every write lands in a per-port level latch that reads return unchanged,
/// and edge interrupts are raised on request through the EXTI entry point.
pub struct SimGpio {
    state: Mutex<RefCell<GpioState>>,
    exti: &'static PinCallbacks,
}

impl SimGpio {
    /// Create a driver whose edge entry point feeds `exti`
    pub const fn new(exti: &'static PinCallbacks) -> Self {
        Self {
            state: Mutex::new(RefCell::new(GpioState::new())),
            exti,
        }
    }

    /// Check if the clock domain of `port` was enabled
    pub fn clock_enabled(&self, port: SimPort) -> bool {
        critical_section::with(|cs| self.state.borrow_ref(cs).clocks & (1 << port.index()) != 0)
    }

    /// Configuration last applied to a pin
    pub fn pin_config(&self, port: SimPort, pin: u8) -> Option<PinInit> {
        critical_section::with(|cs| {
            self.state.borrow_ref(cs).configs[port.index()]
                .get(pin as usize)
                .copied()
                .flatten()
        })
    }

    /// Priority an interrupt line was enabled at
    pub fn irq_priority(&self, line: ExtiLine) -> Option<InterruptPriority> {
        critical_section::with(|cs| self.state.borrow_ref(cs).lines[line_index(line)])
    }

    /// Drive the level seen by reads of `pin`, as an external signal would
    pub fn set_level(&self, port: SimPort, pin: u8, state: PinState) {
        if pin as usize >= MAX_PINS {
            return;
        }
        critical_section::with(|cs| {
            latch(&mut self.state.borrow_ref_mut(cs).levels[port.index()], 1 << pin, state);
        });
    }

    /// Raise an edge on `pin` of `port`
    ///
    /// Dispatches only when the pin is configured for an interrupt mode and
    /// its line is enabled, as the hardware would. Returns whether the entry
    /// point was called.
    pub fn raise_edge(&self, port: SimPort, pin: u8) -> bool {
        let Some(line) = ExtiLine::for_pin(pin) else {
            return false;
        };

        let armed = critical_section::with(|cs| {
            let state = self.state.borrow_ref(cs);
            let interrupt_pin = state.configs[port.index()][pin as usize]
                .is_some_and(|init| init.mode.is_interrupt());
            interrupt_pin && state.lines[line_index(line)].is_some()
        });

        if armed {
            self.exti.dispatch(1 << pin);
        }
        armed
    }

    /// Call the edge entry point with an arbitrary bitmask
    pub fn raise_mask(&self, mask: u16) {
        self.exti.dispatch(mask);
    }

    /// Calls made so far, oldest first
    pub fn calls(&self) -> Vec<GpioCall, CALL_LOG_DEPTH> {
        critical_section::with(|cs| self.state.borrow_ref(cs).calls.clone())
    }

    pub fn clear_calls(&self) {
        critical_section::with(|cs| self.state.borrow_ref_mut(cs).calls.clear());
    }
}

impl GpioVendor for SimGpio {
    type Port = SimPort;

    fn enable_clock(&self, port: SimPort) {
        critical_section::with(|cs| {
            let mut state = self.state.borrow_ref_mut(cs);
            state.clocks |= 1 << port.index();
            state.record(GpioCall::EnableClock(port));
        });
    }

    fn init(&self, port: SimPort, init: &PinInit) {
        critical_section::with(|cs| {
            let mut state = self.state.borrow_ref_mut(cs);
            for pin in pins_in(init.mask) {
                state.configs[port.index()][pin] = Some(*init);
            }
            state.record(GpioCall::Init(port, *init));
        });
    }

    fn deinit(&self, port: SimPort, mask: u16) {
        critical_section::with(|cs| {
            let mut state = self.state.borrow_ref_mut(cs);
            for pin in pins_in(mask) {
                state.configs[port.index()][pin] = None;
            }
            state.levels[port.index()] &= !mask;
            state.record(GpioCall::Deinit(port, mask));
        });
    }

    fn write(&self, port: SimPort, mask: u16, level: PinState) {
        critical_section::with(|cs| {
            let mut state = self.state.borrow_ref_mut(cs);
            latch(&mut state.levels[port.index()], mask, level);
            state.record(GpioCall::Write(port, mask, level));
        });
    }

    fn read(&self, port: SimPort, mask: u16) -> PinState {
        critical_section::with(|cs| {
            let mut state = self.state.borrow_ref_mut(cs);
            state.record(GpioCall::Read(port, mask));
            PinState::from(state.levels[port.index()] & mask != 0)
        })
    }

    fn toggle(&self, port: SimPort, mask: u16) {
        critical_section::with(|cs| {
            let mut state = self.state.borrow_ref_mut(cs);
            state.levels[port.index()] ^= mask;
            state.record(GpioCall::Toggle(port, mask));
        });
    }

    fn enable_irq(&self, line: ExtiLine, priority: InterruptPriority) {
        critical_section::with(|cs| {
            let mut state = self.state.borrow_ref_mut(cs);
            state.lines[line_index(line)] = Some(priority);
            state.record(GpioCall::EnableIrq(line, priority));
        });
    }
}

fn latch(levels: &mut u16, mask: u16, state: PinState) {
    match state {
        PinState::Set => *levels |= mask,
        PinState::Reset => *levels &= !mask,
    }
}

fn pins_in(mask: u16) -> impl Iterator<Item = usize> {
    (0..MAX_PINS).filter(move |&pin| mask & (1u16 << pin) != 0)
}

fn line_index(line: ExtiLine) -> usize {
    match line {
        ExtiLine::Line0 => 0,
        ExtiLine::Line1 => 1,
        ExtiLine::Line2 => 2,
        ExtiLine::Line3 => 3,
        ExtiLine::Line4 => 4,
        ExtiLine::Lines9To5 => 5,
        ExtiLine::Lines15To10 => 6,
    }
}
