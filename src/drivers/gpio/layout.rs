/*
 * GPIO Register Layout
 *
 * Word offsets and bit-field positions of the BCM283x GPIO block. All pin to
 * register arithmetic goes through this module.
 *
 * Function select registers hold ten 3-bit fields each:
 * ```
 * GPFSELn  bits [29:27] ... [5:3] [2:0]
 *          pin  10n+9   ... 10n+1 10n
 * ```
 * Set, clear and level registers hold one bit per pin (bank 0: pins 0-31).
 */

use core::fmt;

/// Function select 0 (pins 0-9)
pub const GPFSEL0: usize = 0;
/// Pin output set 0
pub const GPSET0: usize = 7;
/// Pin output clear 0
pub const GPCLR0: usize = 10;
/// Pin level 0
pub const GPLEV0: usize = 13;

/// Pins covered by one function select register
pub const PINS_PER_FSEL: u8 = 10;
/// Width of a function select field
pub const FSEL_WIDTH: u32 = 3;
/// Unshifted function select field mask
pub const FSEL_MASK: u32 = 0b111;
/// Highest pin addressable through bank 0
pub const MAX_PIN: u8 = 31;

/// GPIO pin number (0-31)
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PinId(u8);

impl PinId {
    /// Returns None for pins outside bank 0
    pub const fn new(number: u8) -> Option<Self> {
        if number <= MAX_PIN {
            Some(Self(number))
        } else {
            None
        }
    }

    pub const fn number(self) -> u8 {
        self.0
    }

    /// Bit of this pin in the set, clear and level registers
    pub const fn mask(self) -> u32 {
        1 << self.0
    }
}

impl fmt::Display for PinId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GPIO{}", self.0)
    }
}

/// Pin function select codes
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum Function {
    Input = 0b000,
    Output = 0b001,
}

impl Function {
    pub const fn bits(self) -> u32 {
        self as u32
    }
}

/// Location of a pin's function select field
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FunctionSelectSlot {
    /// Word offset of the GPFSELn register
    pub register: usize,
    /// Bit position of the field inside the register
    pub shift: u32,
}

impl FunctionSelectSlot {
    /// Mask covering the field
    pub const fn field_mask(&self) -> u32 {
        FSEL_MASK << self.shift
    }

    /// `value` with the field cleared
    pub const fn clear(&self, value: u32) -> u32 {
        value & !self.field_mask()
    }

    /// `value` with the field set to `function`, all other bits untouched
    pub const fn with(&self, value: u32, function: Function) -> u32 {
        self.clear(value) | (function.bits() << self.shift)
    }
}

/// Function select register index and bit position for `pin`
pub const fn register_offset_for(pin: PinId) -> FunctionSelectSlot {
    FunctionSelectSlot {
        register: GPFSEL0 + (pin.0 / PINS_PER_FSEL) as usize,
        shift: (pin.0 % PINS_PER_FSEL) as u32 * FSEL_WIDTH,
    }
}

/// Electrical level of a pin
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Low,
    High,
}

impl Level {
    /// Level of `pin` in a GPLEV0 snapshot
    pub const fn from_register(value: u32, pin: PinId) -> Self {
        if (value >> pin.0) & 0x1 == 0x1 {
            Level::High
        } else {
            Level::Low
        }
    }

    /// ASCII digit reported to readers
    pub const fn as_ascii(self) -> u8 {
        match self {
            Level::High => b'1',
            Level::Low => b'0',
        }
    }
}
