//! External interrupt line abstraction
//!
//! Edge interrupts of the 16 pin positions are grouped onto seven interrupt
//! controller lines: pins 0-4 each own a line, pins 5-9 and pins 10-15 share
//! one line per group. Backends translate [`ExtiLine`] into their IRQ number.

use crate::gpio::MAX_PINS;

/// Interrupt priority (0 = highest on most platforms)
pub type InterruptPriority = u8;

/// Priority every pin interrupt line is enabled at
pub const EXTI_PRIORITY: InterruptPriority = 5;

/// Logical external interrupt line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ExtiLine {
    Line0,
    Line1,
    Line2,
    Line3,
    Line4,
    /// Shared by pins 5 through 9
    Lines9To5,
    /// Shared by pins 10 through 15
    Lines15To10,
}

impl ExtiLine {
    /// Resolve the line serving `pin`, `None` when the pin is out of range
    pub const fn for_pin(pin: u8) -> Option<Self> {
        if pin as usize >= MAX_PINS {
            return None;
        }
        Some(match pin {
            0 => Self::Line0,
            1 => Self::Line1,
            2 => Self::Line2,
            3 => Self::Line3,
            4 => Self::Line4,
            5..=9 => Self::Lines9To5,
            _ => Self::Lines15To10,
        })
    }

    /// True when more than one pin shares this line
    pub const fn is_shared(self) -> bool {
        matches!(self, Self::Lines9To5 | Self::Lines15To10)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedicated_lines() {
        assert_eq!(ExtiLine::for_pin(0), Some(ExtiLine::Line0));
        assert_eq!(ExtiLine::for_pin(4), Some(ExtiLine::Line4));
        assert!(!ExtiLine::Line3.is_shared());
    }

    #[test]
    fn shared_lines() {
        for pin in 5..10 {
            assert_eq!(ExtiLine::for_pin(pin), Some(ExtiLine::Lines9To5));
        }
        for pin in 10..16 {
            assert_eq!(ExtiLine::for_pin(pin), Some(ExtiLine::Lines15To10));
        }
        assert!(ExtiLine::Lines15To10.is_shared());
    }

    #[test]
    fn out_of_range_pin() {
        assert_eq!(ExtiLine::for_pin(16), None);
    }
}
