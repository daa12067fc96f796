//! Memory barriers for device register access.
//!
//! `rmb` follows a register load whose value the driver acts on; `wmb`
//! precedes a register store the device must observe after all earlier
//! accesses.
//!
//! Hardware barriers per target:
//! - aarch64:          `dsb ld` / `dsb st`
//! - arm, ARMv7+:      `dsb sy` / `dsb st` (BCM2836 and later in 32-bit mode)
//! - arm, ARMv6:       CP15 c7, c10, 4 data synchronization barrier (BCM2708)
//! - x86_64:           `lfence` / `sfence`
//!
//! Other targets only get the compiler fence.

use core::sync::atomic::{Ordering, fence};

/// Read barrier - prior loads complete before subsequent accesses.
#[inline]
pub fn rmb() {
    #[cfg(target_arch = "aarch64")]
    unsafe {
        core::arch::asm!("dsb ld", options(nostack, preserves_flags));
    }
    #[cfg(all(target_arch = "arm", target_feature = "v7"))]
    unsafe {
        core::arch::asm!("dsb sy", options(nostack, preserves_flags));
    }
    #[cfg(all(target_arch = "arm", not(target_feature = "v7")))]
    armv6_dsb();
    #[cfg(target_arch = "x86_64")]
    unsafe {
        core::arch::asm!("lfence", options(nostack, preserves_flags));
    }
    fence(Ordering::Acquire);
}

/// Write barrier - prior stores are visible before subsequent stores.
#[inline]
pub fn wmb() {
    fence(Ordering::Release);
    #[cfg(target_arch = "aarch64")]
    unsafe {
        core::arch::asm!("dsb st", options(nostack, preserves_flags));
    }
    #[cfg(all(target_arch = "arm", target_feature = "v7"))]
    unsafe {
        core::arch::asm!("dsb st", options(nostack, preserves_flags));
    }
    #[cfg(all(target_arch = "arm", not(target_feature = "v7")))]
    armv6_dsb();
    #[cfg(target_arch = "x86_64")]
    unsafe {
        core::arch::asm!("sfence", options(nostack, preserves_flags));
    }
}

/// ARMv6 has no `dsb` instruction; the barrier is a CP15 write of zero.
#[cfg(all(target_arch = "arm", not(target_feature = "v7")))]
#[inline(always)]
fn armv6_dsb() {
    unsafe {
        core::arch::asm!(
            "mcr p15, 0, {zero}, c7, c10, 4",
            zero = in(reg) 0u32,
            options(nostack, preserves_flags)
        );
    }
}
