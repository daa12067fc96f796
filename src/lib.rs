/*
 * gpiogate - Exclusive GPIO Character Device Core
 *
 * This crate drives two pins of a BCM283x style GPIO block through its
 * memory-mapped registers: one pin configured as an output, one as an input.
 * Callers observe and drive them with a one-byte protocol:
 *
 * - read  -> b'1' if the input pin is high, b'0' if it is low
 * - write -> b'1' drives the output pin through the clear register,
 *            anything else through the set register
 *
 * Only one session may be open at a time. Opening a session reconfigures
 * both pins.
 *
 * Layout:
 * - io:      Device trait, Errno, MMIO register cells and barriers
 * - memory:  physical regions and the register window
 * - drivers: the GPIO driver (layout, pin configuration, session gate, device)
 * - syscall: user pointer validation and read/write entry points
 * - module:  load/unload sequence over the host kernel's registration hooks
 * - config:  board presets and driver configuration
 * - utils:   logger and timing
 */

#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod drivers;
pub mod io;
pub mod memory;
pub mod module;
pub mod syscall;
pub mod utils;

#[cfg(test)]
mod tests;

pub use config::GpioConfig;
pub use drivers::gpio::{GpioDevice, GpioFile, Level, OpenFlags, PinId};
pub use io::{Device, Errno};
pub use memory::{MapError, PhysAddr, PhysicalRegion, RegionMapper, RegisterWindow};
pub use module::GpioModule;
