/*
 * GPIO Character Device Driver
 *
 * Drives one output pin and samples one input pin of a BCM283x GPIO block.
 *
 * - layout:  register offsets, pin numbers and field arithmetic
 * - config:  function select read-modify-write
 * - session: exclusive session gate
 * - device:  GpioDevice (open) and GpioFile (read/write/close)
 */

pub mod config;
pub mod device;
pub mod layout;
pub mod session;

pub use device::{GpioDevice, GpioFile, OpenFlags, OutputDrive};
pub use layout::{Function, Level, PinId, register_offset_for};
pub use session::{AcquireOptions, SessionGate, SessionGuard};
