/*
 * Input/Output System
 *
 * Low-level register access and the device abstraction exposed to callers.
 *
 * - mmio:    volatile 32-bit register cells behind the Io trait
 * - barrier: read/write ordering barriers for device memory
 * - device:  Device trait, Errno and stat definitions
 */

pub mod barrier;
pub mod device;
pub mod mmio;

pub use barrier::{rmb, wmb};
pub use device::{Device, Errno, Stat, S_IFCHR, S_IFMT};
pub use mmio::{Io, Mmio, ReadOnly, WriteOnly};
