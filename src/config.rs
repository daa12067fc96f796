/*
 * Driver Configuration
 *
 * Board presets and the driver's compile-time configuration.
 *
 * Peripheral base addresses (physical, as seen by the ARM core):
 * - BCM2708 (Raspberry Pi 1, Zero): 0x2000_0000
 * - BCM2836/2837 (Pi 2, Pi 3):      0x3F00_0000
 * - BCM2711 (Pi 4, low peripheral): 0xFE00_0000
 * The GPIO block sits 0x20_0000 above the peripheral base on all of them.
 */

use log::LevelFilter;

use crate::drivers::gpio::layout::PinId;
use crate::drivers::gpio::session::DEFAULT_RETRY_INTERVAL_MS;
use crate::io::Errno;
use crate::memory::types::PhysicalRegion;

/// Offset of the GPIO block from the peripheral base
pub const GPIO_OFFSET: u64 = 0x20_0000;
/// Size of the mapped GPIO register window
pub const GPIO_WINDOW_LEN: usize = 4096;

/// Default device and class name
pub const DEVICE_NAME: &str = "gpiogate";

/// Driver configuration
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GpioConfig {
    /// Name used for the device number region, the class and the node
    pub device_name: &'static str,
    /// Physical GPIO register block
    pub region: PhysicalRegion,
    /// Pin driven through the set/clear registers
    pub output_pin: PinId,
    /// Pin sampled through the level register
    pub input_pin: PinId,
    /// Sleep between session acquisition attempts
    pub retry_interval_ms: u64,
    /// Level the host hands to `utils::logger::init` and `GateLogger`
    pub log_level: LevelFilter,
}

const fn pin(number: u8) -> PinId {
    match PinId::new(number) {
        Some(pin) => pin,
        None => panic!("pin outside bank 0"),
    }
}

impl GpioConfig {
    /// Raspberry Pi 1 / Zero
    pub const BCM2708: GpioConfig = GpioConfig::for_peripheral_base(0x2000_0000);
    /// Raspberry Pi 2 / 3
    pub const BCM2836: GpioConfig = GpioConfig::for_peripheral_base(0x3F00_0000);
    /// Raspberry Pi 4
    pub const BCM2711: GpioConfig = GpioConfig::for_peripheral_base(0xFE00_0000);

    /// Default pins (output 18, input 25) on a board with the given peripheral base
    pub const fn for_peripheral_base(peripheral_base: u64) -> Self {
        Self {
            device_name: DEVICE_NAME,
            region: PhysicalRegion::new(peripheral_base + GPIO_OFFSET, GPIO_WINDOW_LEN),
            output_pin: pin(18),
            input_pin: pin(25),
            retry_interval_ms: DEFAULT_RETRY_INTERVAL_MS,
            log_level: LevelFilter::Info,
        }
    }

    pub const fn with_pins(mut self, output_pin: PinId, input_pin: PinId) -> Self {
        self.output_pin = output_pin;
        self.input_pin = input_pin;
        self
    }

    pub const fn with_region(mut self, region: PhysicalRegion) -> Self {
        self.region = region;
        self
    }

    pub const fn with_retry_interval_ms(mut self, ms: u64) -> Self {
        self.retry_interval_ms = ms;
        self
    }

    pub const fn with_log_level(mut self, level: LevelFilter) -> Self {
        self.log_level = level;
        self
    }

    pub const fn with_device_name(mut self, name: &'static str) -> Self {
        self.device_name = name;
        self
    }

    /// Check the configuration before touching any hardware
    pub fn validate(&self) -> Result<(), Errno> {
        if self.output_pin == self.input_pin {
            log::error!("output and input pin are both {}", self.output_pin);
            return Err(Errno::EINVAL);
        }
        if self.region.is_empty() {
            log::error!("empty GPIO register region");
            return Err(Errno::EINVAL);
        }
        if self.region.checked_end().is_none() {
            log::error!("GPIO register region at 0x{:x} wraps the address space", self.region.base);
            return Err(Errno::EINVAL);
        }
        if self.device_name.is_empty() {
            log::error!("empty device name");
            return Err(Errno::EINVAL);
        }
        Ok(())
    }
}

impl Default for GpioConfig {
    fn default() -> Self {
        Self::BCM2708
    }
}
