//! UART handle registry
//!
//! Vendor UART libraries call one global function per event type and name the
//! port by its handle. The registry maps each initialized handle to the
//! callbacks the application registered for it.

use core::cell::RefCell;
use critical_section::Mutex;
use heapless::Vec;

use crate::error::{HalError, HalResult};

/// Maximum number of UART handles that can be registered
pub const MAX_UART_HANDLES: usize = 5;

/// Application callback for a UART event, called with the port's handle
pub type UartCallback<H> = fn(H);

/// UART events routed through the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum UartEvent {
    TxComplete,
    RxComplete,
    Error,
}

/// What happens to a handle's slot when its port is deinitialized
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Retention {
    /// Keep the slot; the record goes dormant and still counts toward capacity.
    /// Only the same handle can bring it back.
    #[default]
    Retain,
    /// Free the slot for any handle
    Reclaim,
}

struct Record<H> {
    handle: H,
    live: bool,
    tx_complete: Option<UartCallback<H>>,
    rx_complete: Option<UartCallback<H>>,
    error: Option<UartCallback<H>>,
}

impl<H> Record<H> {
    fn new(handle: H) -> Self {
        Self {
            handle,
            live: true,
            tx_complete: None,
            rx_complete: None,
            error: None,
        }
    }

    fn slot(&mut self, event: UartEvent) -> &mut Option<UartCallback<H>> {
        match event {
            UartEvent::TxComplete => &mut self.tx_complete,
            UartEvent::RxComplete => &mut self.rx_complete,
            UartEvent::Error => &mut self.error,
        }
    }
}

/// Fixed-capacity, ordered registry of UART handles and their callbacks
pub struct UartRegistry<H> {
    records: Mutex<RefCell<Vec<Record<H>, MAX_UART_HANDLES>>>,
    retention: Retention,
}

impl<H: Copy + Eq> UartRegistry<H> {
    /// Create an empty registry that retains slots on deinitialization
    pub const fn new() -> Self {
        Self::with_retention(Retention::Retain)
    }

    /// Create an empty registry that frees slots on deinitialization
    pub const fn reclaiming() -> Self {
        Self::with_retention(Retention::Reclaim)
    }

    pub const fn with_retention(retention: Retention) -> Self {
        Self {
            records: Mutex::new(RefCell::new(Vec::new())),
            retention,
        }
    }

    /// Number of occupied slots, dormant ones included
    pub fn len(&self) -> usize {
        critical_section::with(|cs| self.records.borrow_ref(cs).len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.len() >= MAX_UART_HANDLES
    }

    /// Check if `handle` is registered and its port is live
    pub fn contains(&self, handle: H) -> bool {
        critical_section::with(|cs| {
            self.records
                .borrow_ref(cs)
                .iter()
                .any(|r| r.live && r.handle == handle)
        })
    }

    /// Check whether [`attach`](Self::attach) would succeed for `handle`
    pub fn has_slot_for(&self, handle: H) -> bool {
        critical_section::with(|cs| {
            let records = self.records.borrow_ref(cs);
            !records.is_full() || records.iter().any(|r| r.handle == handle)
        })
    }

    /// Record a freshly initialized port with every callback unset
    ///
    /// A handle that already owns a slot (live or dormant) gets that slot
    /// back, so handles stay unique.
    pub fn attach(&self, handle: H) -> HalResult<()> {
        critical_section::with(|cs| {
            let mut records = self.records.borrow_ref_mut(cs);
            if let Some(record) = records.iter_mut().find(|r| r.handle == handle) {
                *record = Record::new(handle);
                return Ok(());
            }
            records
                .push(Record::new(handle))
                .map_err(|_| HalError::RegistryFull)
        })
    }

    /// Forget the callbacks of a deinitialized port
    pub fn release(&self, handle: H) -> HalResult<()> {
        critical_section::with(|cs| {
            let mut records = self.records.borrow_ref_mut(cs);
            let idx = records
                .iter()
                .position(|r| r.live && r.handle == handle)
                .ok_or(HalError::NotRegistered)?;

            match self.retention {
                Retention::Retain => {
                    let record = &mut records[idx];
                    record.live = false;
                    record.tx_complete = None;
                    record.rx_complete = None;
                    record.error = None;
                }
                Retention::Reclaim => {
                    records.remove(idx);
                }
            }
            Ok(())
        })
    }

    /// Store (or clear with `None`) the callback for `event` on `handle`
    ///
    /// Leaves the registry untouched when `handle` is not live.
    pub fn set_callback(
        &self,
        handle: H,
        event: UartEvent,
        callback: Option<UartCallback<H>>,
    ) -> HalResult<()> {
        critical_section::with(|cs| {
            let mut records = self.records.borrow_ref_mut(cs);
            let record = records
                .iter_mut()
                .find(|r| r.live && r.handle == handle)
                .ok_or(HalError::NotRegistered)?;
            *record.slot(event) = callback;
            Ok(())
        })
    }

    /// Callback stored for `event` on a live `handle`
    pub fn callback(&self, handle: H, event: UartEvent) -> Option<UartCallback<H>> {
        critical_section::with(|cs| {
            let mut records = self.records.borrow_ref_mut(cs);
            records
                .iter_mut()
                .find(|r| r.live && r.handle == handle)
                .and_then(|r| *r.slot(event))
        })
    }

    /// Event entry point: run the callback `handle` registered for `event`
    pub fn dispatch(&self, handle: H, event: UartEvent) {
        if let Some(callback) = self.callback(handle, event) {
            callback(handle);
        }
    }

    pub fn dispatch_tx_complete(&self, handle: H) {
        self.dispatch(handle, UartEvent::TxComplete);
    }

    pub fn dispatch_rx_complete(&self, handle: H) {
        self.dispatch(handle, UartEvent::RxComplete);
    }

    pub fn dispatch_error(&self, handle: H) {
        self.dispatch(handle, UartEvent::Error);
    }
}

impl<H: Copy + Eq> Default for UartRegistry<H> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

    #[test]
    fn attach_until_full() {
        let registry = UartRegistry::<u32>::new();
        for handle in 0..MAX_UART_HANDLES as u32 {
            registry.attach(handle).unwrap();
        }
        assert!(registry.is_full());
        assert_eq!(registry.attach(99), Err(HalError::RegistryFull));
        assert!(registry.has_slot_for(3));
        assert!(!registry.has_slot_for(99));
    }

    #[test]
    fn attach_is_unique_per_handle() {
        let registry = UartRegistry::<u32>::new();
        registry.attach(7).unwrap();
        registry.attach(7).unwrap();
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn dispatch_routes_by_handle_and_event() {
        static REGISTRY: UartRegistry<u32> = UartRegistry::new();
        static TX: AtomicUsize = AtomicUsize::new(0);
        static RX_HANDLE: AtomicU32 = AtomicU32::new(0);

        fn on_tx(_: u32) {
            TX.fetch_add(1, Ordering::SeqCst);
        }
        fn on_rx(handle: u32) {
            RX_HANDLE.store(handle, Ordering::SeqCst);
        }

        REGISTRY.attach(1).unwrap();
        REGISTRY.attach(2).unwrap();
        REGISTRY.set_callback(1, UartEvent::TxComplete, Some(on_tx)).unwrap();
        REGISTRY.set_callback(2, UartEvent::RxComplete, Some(on_rx)).unwrap();

        REGISTRY.dispatch_rx_complete(2);
        REGISTRY.dispatch_rx_complete(1);
        REGISTRY.dispatch_error(1);
        REGISTRY.dispatch_tx_complete(3);

        assert_eq!(TX.load(Ordering::SeqCst), 0);
        assert_eq!(RX_HANDLE.load(Ordering::SeqCst), 2);

        REGISTRY.dispatch_tx_complete(1);
        assert_eq!(TX.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn unknown_handle_is_left_alone() {
        let registry = UartRegistry::<u32>::new();
        fn noop(_: u32) {}

        assert_eq!(
            registry.set_callback(4, UartEvent::Error, Some(noop)),
            Err(HalError::NotRegistered)
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn retained_slot_goes_dormant() {
        let registry = UartRegistry::<u32>::new();
        fn noop(_: u32) {}

        registry.attach(1).unwrap();
        registry.set_callback(1, UartEvent::RxComplete, Some(noop)).unwrap();
        registry.release(1).unwrap();

        assert!(!registry.contains(1));
        assert_eq!(registry.len(), 1);
        assert!(registry.callback(1, UartEvent::RxComplete).is_none());
        assert_eq!(registry.release(1), Err(HalError::NotRegistered));

        registry.attach(1).unwrap();
        assert!(registry.contains(1));
        assert!(registry.callback(1, UartEvent::RxComplete).is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn reclaimed_slot_is_reusable() {
        let registry = UartRegistry::<u32>::reclaiming();
        for handle in 0..MAX_UART_HANDLES as u32 {
            registry.attach(handle).unwrap();
        }
        registry.release(2).unwrap();

        assert_eq!(registry.len(), MAX_UART_HANDLES - 1);
        registry.attach(42).unwrap();
        assert!(registry.contains(42));
        assert!(!registry.contains(2));
    }
}
