//! Peripheral clock gates
//!
//! ST's `__HAL_RCC_*_CLK_ENABLE` helpers are header macros with no linkable
//! symbol, so the enable bits are set here directly.

use core::ptr;

const RCC_BASE: usize = 0x4002_3800;

/// AHB1 peripheral clock enable register (GPIO ports)
pub const AHB1ENR: usize = RCC_BASE + 0x30;
/// APB1 peripheral clock enable register (USART2/3, UART4/5)
pub const APB1ENR: usize = RCC_BASE + 0x40;
/// APB2 peripheral clock enable register (USART1/6)
pub const APB2ENR: usize = RCC_BASE + 0x44;

/// Set `bits` in the clock enable register at `reg`
///
/// The register is read back afterwards so the clock is running before the
/// peripheral is touched.
pub fn enable(reg: usize, bits: u32) {
    let reg = reg as *mut u32;
    critical_section::with(|_| {
        // SAFETY: `reg` is one of the RCC enable registers above, which are
        // always mapped; the read-modify-write runs with interrupts masked.
        unsafe {
            let value = ptr::read_volatile(reg);
            ptr::write_volatile(reg, value | bits);
            let _ = ptr::read_volatile(reg);
        }
    });
}
