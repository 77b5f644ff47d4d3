//! Pin edge callback table
//!
//! Vendor libraries report pin edges through a single global entry point that
//! only carries the bitmask of the pin that fired. [`PinCallbacks`] keeps one
//! callback slot per pin position so that entry point can be fanned out to
//! the application.

use core::cell::RefCell;
use critical_section::Mutex;

use crate::error::{HalError, HalResult};
use crate::gpio::MAX_PINS;

/// Application callback for a pin edge, called with the pin number
pub type PinCallback = fn(u8);

/// Fixed table of per-pin edge callbacks
///
/// Written from foreground context, read from interrupt context. Every access
/// runs inside a critical section; the callback itself is invoked after the
/// critical section is released.
pub struct PinCallbacks {
    slots: Mutex<RefCell<[Option<PinCallback>; MAX_PINS]>>,
}

impl PinCallbacks {
    /// Create a table with every slot empty
    pub const fn new() -> Self {
        Self {
            slots: Mutex::new(RefCell::new([None; MAX_PINS])),
        }
    }

    /// Store `callback` for `pin`, replacing any previous entry
    ///
    /// `None` clears the slot. Pins outside `0..MAX_PINS` leave the table
    /// untouched and report `InvalidParameter`.
    pub fn register(&self, pin: u8, callback: Option<PinCallback>) -> HalResult<()> {
        let idx = pin as usize;
        if idx >= MAX_PINS {
            return Err(HalError::InvalidParameter);
        }

        critical_section::with(|cs| {
            self.slots.borrow_ref_mut(cs)[idx] = callback;
        });
        Ok(())
    }

    /// Callback currently stored for `pin`
    pub fn get(&self, pin: u8) -> Option<PinCallback> {
        let idx = pin as usize;
        if idx >= MAX_PINS {
            return None;
        }
        critical_section::with(|cs| self.slots.borrow_ref(cs)[idx])
    }

    /// Check whether `pin` has a callback
    pub fn is_registered(&self, pin: u8) -> bool {
        self.get(pin).is_some()
    }

    /// Empty every slot
    pub fn clear(&self) {
        critical_section::with(|cs| {
            *self.slots.borrow_ref_mut(cs) = [None; MAX_PINS];
        });
    }

    /// Edge entry point: fire the callback of the pin whose mask is `mask`
    ///
    /// Only a mask with exactly one bit set can match; a mask carrying several
    /// pending pins fires nothing. Use [`dispatch_each`](Self::dispatch_each)
    /// for vendors that batch pins into one call.
    pub fn dispatch(&self, mask: u16) {
        let Some(pin) = (0..MAX_PINS as u8).find(|&pin| 1u16 << pin == mask) else {
            return;
        };

        if let Some(callback) = self.get(pin) {
            callback(pin);
        }
    }

    /// Edge entry point firing every registered pin set in `mask`, lowest first
    pub fn dispatch_each(&self, mask: u16) {
        for pin in 0..MAX_PINS as u8 {
            if mask & (1u16 << pin) == 0 {
                continue;
            }
            if let Some(callback) = self.get(pin) {
                callback(pin);
            }
        }
    }
}

impl Default for PinCallbacks {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

    #[test]
    fn register_and_dispatch() {
        static TABLE: PinCallbacks = PinCallbacks::new();
        static HITS: AtomicUsize = AtomicUsize::new(0);
        static LAST_PIN: AtomicU32 = AtomicU32::new(u32::MAX);

        fn on_edge(pin: u8) {
            HITS.fetch_add(1, Ordering::SeqCst);
            LAST_PIN.store(pin as u32, Ordering::SeqCst);
        }

        TABLE.register(7, Some(on_edge)).unwrap();
        TABLE.dispatch(1 << 7);

        assert_eq!(HITS.load(Ordering::SeqCst), 1);
        assert_eq!(LAST_PIN.load(Ordering::SeqCst), 7);
    }

    #[test]
    fn out_of_range_pin_is_rejected() {
        let table = PinCallbacks::new();
        fn noop(_: u8) {}

        assert_eq!(table.register(16, Some(noop)), Err(HalError::InvalidParameter));
        assert!(!table.is_registered(16));
        assert!((0..16).all(|pin| !table.is_registered(pin)));
    }

    #[test]
    fn overwrite_and_clear() {
        static TABLE: PinCallbacks = PinCallbacks::new();
        static FIRST: AtomicUsize = AtomicUsize::new(0);
        static SECOND: AtomicUsize = AtomicUsize::new(0);

        fn first(_: u8) {
            FIRST.fetch_add(1, Ordering::SeqCst);
        }
        fn second(_: u8) {
            SECOND.fetch_add(1, Ordering::SeqCst);
        }

        TABLE.register(2, Some(first)).unwrap();
        TABLE.register(2, Some(second)).unwrap();
        TABLE.dispatch(1 << 2);
        assert_eq!(FIRST.load(Ordering::SeqCst), 0);
        assert_eq!(SECOND.load(Ordering::SeqCst), 1);

        TABLE.register(2, None).unwrap();
        TABLE.dispatch(1 << 2);
        assert_eq!(SECOND.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn multi_bit_mask_fires_nothing() {
        static TABLE: PinCallbacks = PinCallbacks::new();
        static HITS: AtomicUsize = AtomicUsize::new(0);

        fn on_edge(_: u8) {
            HITS.fetch_add(1, Ordering::SeqCst);
        }

        TABLE.register(5, Some(on_edge)).unwrap();
        TABLE.register(6, Some(on_edge)).unwrap();
        TABLE.dispatch((1 << 5) | (1 << 6));
        TABLE.dispatch(0);

        assert_eq!(HITS.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn dispatch_each_decomposes_mask() {
        static TABLE: PinCallbacks = PinCallbacks::new();
        static SEEN: AtomicU32 = AtomicU32::new(0);

        fn on_edge(pin: u8) {
            SEEN.fetch_or(1 << pin, Ordering::SeqCst);
        }

        TABLE.register(10, Some(on_edge)).unwrap();
        TABLE.register(12, Some(on_edge)).unwrap();
        TABLE.dispatch_each((1 << 10) | (1 << 11) | (1 << 12));

        assert_eq!(SEEN.load(Ordering::SeqCst), (1 << 10) | (1 << 12));
    }

    #[test]
    fn callback_may_reregister_itself() {
        static TABLE: PinCallbacks = PinCallbacks::new();
        static HITS: AtomicUsize = AtomicUsize::new(0);

        fn one_shot(pin: u8) {
            HITS.fetch_add(1, Ordering::SeqCst);
            TABLE.register(pin, None).unwrap();
        }

        TABLE.register(0, Some(one_shot)).unwrap();
        TABLE.dispatch(1);
        TABLE.dispatch(1);

        assert_eq!(HITS.load(Ordering::SeqCst), 1);
    }
}
