/*
 * GPIO Pin Configuration
 *
 * Masked read-modify-write of a pin's function select field:
 *
 *   load GPFSELn -> rmb -> clear field -> wmb -> store (field | code)
 *
 * The barriers keep the device from seeing the store before the load it
 * depends on. Other fields of the register are written back unchanged.
 */

use crate::drivers::gpio::layout::{Function, PinId, register_offset_for};
use crate::io::{Io, rmb, wmb};
use crate::memory::{RegionMapper, RegisterWindow};

/// Select `function` for `pin`
pub fn set_function<M: RegionMapper>(window: &RegisterWindow<M>, pin: PinId, function: Function) {
    let slot = register_offset_for(pin);
    let mut fsel = window.function_select(pin);

    let value = fsel.read();
    rmb();

    let cleared = slot.clear(value);
    wmb();
    fsel.write(slot.with(cleared, function));

    log::trace!("{} -> {:?} (GPFSEL{} 0x{:08x})", pin, function, slot.register, value);
}

/// Configure `pin` as an output
pub fn configure_output<M: RegionMapper>(window: &RegisterWindow<M>, pin: PinId) {
    set_function(window, pin, Function::Output);
}

/// Configure `pin` as an input
pub fn configure_input<M: RegionMapper>(window: &RegisterWindow<M>, pin: PinId) {
    set_function(window, pin, Function::Input);
}
