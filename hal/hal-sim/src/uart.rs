//! Simulated UART ports

use core::cell::RefCell;
use critical_section::Mutex;
use heapless::{Deque, Vec};

use mcu_hal::error::{HalError, HalResult};
use mcu_hal::registry::UartRegistry;
use mcu_hal::vendor::{PortInit, UartVendor};

/// Number of ports the simulated vendor library can hold open
pub const SIM_PORTS: usize = 8;

/// Bytes kept per port for transmitted and pending receive data
pub const SIM_FIFO_DEPTH: usize = 64;

/// Simulated port handle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SimHandle(pub u8);

/// Simulated hardware instance
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimInstance {
    Usart1,
    Usart2,
    Usart3,
    Uart4,
    Uart5,
}

struct Port {
    handle: SimHandle,
    instance: SimInstance,
    init: PortInit,
    sent: Vec<u8, SIM_FIFO_DEPTH>,
    incoming: Deque<u8, SIM_FIFO_DEPTH>,
    pending_tx: Option<&'static [u8]>,
    pending_rx: Option<&'static mut [u8]>,
}

impl Port {
    fn new(handle: SimHandle, instance: SimInstance, init: &PortInit) -> Self {
        Self {
            handle,
            instance,
            init: *init,
            sent: Vec::new(),
            incoming: Deque::new(),
            pending_tx: None,
            pending_rx: None,
        }
    }
}

struct UartState {
    ports: Vec<Port, SIM_PORTS>,
    fail_next_init: Option<HalError>,
}

impl UartState {
    fn port(&mut self, handle: SimHandle) -> HalResult<&mut Port> {
        self.ports
            .iter_mut()
            .find(|p| p.handle == handle)
            .ok_or(HalError::HardwareError)
    }
}

/// Idealized UART driver
///
/// Polling transfers complete instantly against in-memory FIFOs; interrupt
/// transfers stay armed until the test completes them, at which point the
/// matching registry entry point runs.
pub struct SimUart {
    state: Mutex<RefCell<UartState>>,
    registry: &'static UartRegistry<SimHandle>,
}

impl SimUart {
    /// Create a driver whose completion entry points feed `registry`
    pub const fn new(registry: &'static UartRegistry<SimHandle>) -> Self {
        Self {
            state: Mutex::new(RefCell::new(UartState {
                ports: Vec::new(),
                fail_next_init: None,
            })),
            registry,
        }
    }

    /// Make the next `init` call report `error`
    pub fn fail_next_init(&self, error: HalError) {
        critical_section::with(|cs| self.state.borrow_ref_mut(cs).fail_next_init = Some(error));
    }

    /// Check if the vendor side considers `handle` initialized
    pub fn is_open(&self, handle: SimHandle) -> bool {
        critical_section::with(|cs| self.state.borrow_ref_mut(cs).port(handle).is_ok())
    }

    /// Settings `handle` was last initialized with
    pub fn port_init(&self, handle: SimHandle) -> Option<(SimInstance, PortInit)> {
        critical_section::with(|cs| {
            self.state
                .borrow_ref_mut(cs)
                .port(handle)
                .ok()
                .map(|p| (p.instance, p.init))
        })
    }

    /// Bytes that have left `handle` so far
    pub fn sent(&self, handle: SimHandle) -> Vec<u8, SIM_FIFO_DEPTH> {
        critical_section::with(|cs| {
            self.state
                .borrow_ref_mut(cs)
                .port(handle)
                .map(|p| p.sent.clone())
                .unwrap_or_default()
        })
    }

    /// Queue bytes on the line for the next polling receive
    pub fn feed(&self, handle: SimHandle, data: &[u8]) -> HalResult<()> {
        critical_section::with(|cs| {
            let mut state = self.state.borrow_ref_mut(cs);
            let port = state.port(handle)?;
            for &byte in data {
                port.incoming.push_back(byte).map_err(|_| HalError::Busy)?;
            }
            Ok(())
        })
    }

    /// Finish the armed interrupt transmit and run the TX-complete entry point
    ///
    /// Bytes that no longer fit the transmit log fail the transfer as a
    /// whole, reported through the error entry point instead. Returns false
    /// when no transmit was armed.
    pub fn complete_tx(&self, handle: SimHandle) -> bool {
        let outcome = critical_section::with(|cs| {
            let mut state = self.state.borrow_ref_mut(cs);
            let port = state.port(handle).ok()?;
            let data = port.pending_tx.take()?;
            Some(port.sent.extend_from_slice(data).is_ok())
        });

        match outcome {
            Some(true) => self.registry.dispatch_tx_complete(handle),
            Some(false) => self.registry.dispatch_error(handle),
            None => return false,
        }
        true
    }

    /// Deliver `data` into the armed interrupt receive and run the
    /// RX-complete entry point
    ///
    /// Hands the filled buffer back to the caller, `None` when no receive was
    /// armed.
    pub fn complete_rx(&self, handle: SimHandle, data: &[u8]) -> Option<&'static mut [u8]> {
        let buffer = critical_section::with(|cs| {
            let mut state = self.state.borrow_ref_mut(cs);
            state.port(handle).ok()?.pending_rx.take()
        })?;

        let len = buffer.len().min(data.len());
        buffer[..len].copy_from_slice(&data[..len]);
        self.registry.dispatch_rx_complete(handle);
        Some(buffer)
    }

    /// Run the error entry point for `handle`
    pub fn raise_error(&self, handle: SimHandle) {
        self.registry.dispatch_error(handle);
    }
}

impl UartVendor for SimUart {
    type Handle = SimHandle;
    type Instance = SimInstance;

    fn init(&self, handle: SimHandle, instance: SimInstance, init: &PortInit) -> HalResult<()> {
        critical_section::with(|cs| {
            let mut state = self.state.borrow_ref_mut(cs);
            if let Some(error) = state.fail_next_init.take() {
                return Err(error);
            }

            let port = Port::new(handle, instance, init);
            match state.ports.iter_mut().find(|p| p.handle == handle) {
                Some(existing) => *existing = port,
                None => state.ports.push(port).map_err(|_| HalError::HardwareError)?,
            }
            Ok(())
        })
    }

    fn deinit(&self, handle: SimHandle) -> HalResult<()> {
        critical_section::with(|cs| {
            let mut state = self.state.borrow_ref_mut(cs);
            let idx = state
                .ports
                .iter()
                .position(|p| p.handle == handle)
                .ok_or(HalError::HardwareError)?;
            state.ports.swap_remove(idx);
            Ok(())
        })
    }

    fn transmit(&self, handle: SimHandle, data: &[u8], _timeout_ms: u32) -> HalResult<()> {
        critical_section::with(|cs| {
            let mut state = self.state.borrow_ref_mut(cs);
            let port = state.port(handle)?;
            port.sent
                .extend_from_slice(data)
                .map_err(|_| HalError::Timeout)
        })
    }

    fn receive(&self, handle: SimHandle, buffer: &mut [u8], _timeout_ms: u32) -> HalResult<()> {
        critical_section::with(|cs| {
            let mut state = self.state.borrow_ref_mut(cs);
            let port = state.port(handle)?;
            if port.incoming.len() < buffer.len() {
                // Nothing else will arrive while the caller blocks
                return Err(HalError::Timeout);
            }
            for slot in buffer.iter_mut() {
                *slot = port.incoming.pop_front().unwrap_or_default();
            }
            Ok(())
        })
    }

    fn transmit_it(&self, handle: SimHandle, data: &'static [u8]) -> HalResult<()> {
        critical_section::with(|cs| {
            let mut state = self.state.borrow_ref_mut(cs);
            let port = state.port(handle)?;
            if port.pending_tx.is_some() {
                return Err(HalError::Busy);
            }
            port.pending_tx = Some(data);
            Ok(())
        })
    }

    fn receive_it(&self, handle: SimHandle, buffer: &'static mut [u8]) -> HalResult<()> {
        critical_section::with(|cs| {
            let mut state = self.state.borrow_ref_mut(cs);
            let port = state.port(handle)?;
            if port.pending_rx.is_some() {
                return Err(HalError::Busy);
            }
            port.pending_rx = Some(buffer);
            Ok(())
        })
    }
}
