/*
 * Driver Module Lifecycle
 *
 * Load and unload sequence of the GPIO driver. The host kernel supplies the
 * registration hooks:
 *
 * - DeviceNumberAllocator: reserves a major/minor range for the driver
 * - DeviceRegistrar:       attaches the character device and creates the
 *                          device node callers open
 * - RegionMapper:          reserves and maps the GPIO register block
 *
 * Load order:   numbers -> cdev -> node -> register window
 * Unload order: node -> cdev -> numbers -> register window
 *
 * A failure at any load step undoes the steps before it. Failing to map the
 * register window is fatal: the module does not load and no session can be
 * opened.
 */

use core::fmt;

use crate::config::GpioConfig;
use crate::drivers::gpio::GpioDevice;
use crate::io::Errno;
use crate::memory::{RegionMapper, RegisterWindow};

/// First minor number requested
pub const FIRST_MINOR: u32 = 0;
/// Number of minors requested
pub const MINOR_COUNT: u32 = 1;

/// Device number (major/minor pair)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DevNum {
    pub major: u32,
    pub minor: u32,
}

impl DevNum {
    const MINOR_BITS: u32 = 20;
    const MINOR_MASK: u32 = (1 << Self::MINOR_BITS) - 1;

    /// Largest major that fits the packed representation
    pub const MAJOR_MAX: u32 = u32::MAX >> Self::MINOR_BITS;
    /// Largest minor that fits the packed representation
    pub const MINOR_MAX: u32 = Self::MINOR_MASK;

    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }

    /// Whether both halves fit the packed representation
    pub const fn is_encodable(self) -> bool {
        self.major <= Self::MAJOR_MAX && self.minor <= Self::MINOR_MAX
    }

    /// Packed kernel representation (MKDEV)
    ///
    /// Bits that do not fit are dropped; check `is_encodable` first.
    pub const fn encode(self) -> u32 {
        ((self.major & Self::MAJOR_MAX) << Self::MINOR_BITS) | (self.minor & Self::MINOR_MASK)
    }

    pub const fn decode(dev: u32) -> Self {
        Self {
            major: dev >> Self::MINOR_BITS,
            minor: dev & Self::MINOR_MASK,
        }
    }
}

impl fmt::Display for DevNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.major, self.minor)
    }
}

/// Device number allocation hooks
pub trait DeviceNumberAllocator {
    /// Allocate `count` device numbers starting at `first_minor`
    fn alloc_region(&mut self, first_minor: u32, count: u32, name: &str) -> Result<DevNum, Errno>;

    /// Return device numbers obtained from `alloc_region`
    fn unregister_region(&mut self, first: DevNum, count: u32);
}

/// Character device and device node registration hooks
pub trait DeviceRegistrar {
    /// Make the driver reachable through `dev`
    fn add_cdev(&mut self, dev: DevNum, count: u32) -> Result<(), Errno>;

    fn del_cdev(&mut self, dev: DevNum);

    /// Create the device node `name` in `class`
    fn create_node(&mut self, class: &str, name: &str, dev: DevNum) -> Result<(), Errno>;

    fn destroy_node(&mut self, class: &str, dev: DevNum);
}

/// A loaded GPIO driver
pub struct GpioModule<M, A, R>
where
    M: RegionMapper,
    A: DeviceNumberAllocator,
    R: DeviceRegistrar,
{
    config: GpioConfig,
    devnum: DevNum,
    allocator: A,
    registrar: R,
    device: GpioDevice<M>,
}

impl<M, A, R> GpioModule<M, A, R>
where
    M: RegionMapper,
    A: DeviceNumberAllocator,
    R: DeviceRegistrar,
{
    /// Register the driver and map its registers
    pub fn load(config: GpioConfig, mapper: M, mut allocator: A, mut registrar: R) -> Result<Self, Errno> {
        config.validate()?;

        let devnum = register_driver(&config, &mut allocator, &mut registrar)?;
        log::info!("Hello world,");
        log::info!(
            "I'm {} with major {}, minor {}",
            config.device_name,
            devnum.major,
            devnum.minor
        );

        let window = match RegisterWindow::map(mapper, config.region) {
            Ok(window) => window,
            Err((err, _mapper)) => {
                log::error!("GPIO error: {}", err);
                unregister_driver(&config, devnum, &mut allocator, &mut registrar);
                return Err(err.into());
            }
        };

        let device = GpioDevice::new(window, &config);
        Ok(Self {
            config,
            devnum,
            allocator,
            registrar,
            device,
        })
    }

    /// Unregister the driver and unmap its registers
    pub fn unload(self) {
        let Self {
            config,
            devnum,
            mut allocator,
            mut registrar,
            device,
        } = self;

        log::info!(
            "{} with major {} and minor {} unloading",
            config.device_name,
            devnum.major,
            devnum.minor
        );
        unregister_driver(&config, devnum, &mut allocator, &mut registrar);
        device.into_window().unmap();
        log::info!("Goodbye");
    }

    pub fn device(&self) -> &GpioDevice<M> {
        &self.device
    }

    pub fn devnum(&self) -> DevNum {
        self.devnum
    }

    pub fn config(&self) -> &GpioConfig {
        &self.config
    }
}

fn register_driver<A, R>(config: &GpioConfig, allocator: &mut A, registrar: &mut R) -> Result<DevNum, Errno>
where
    A: DeviceNumberAllocator,
    R: DeviceRegistrar,
{
    let name = config.device_name;

    let devnum = allocator.alloc_region(FIRST_MINOR, MINOR_COUNT, name).map_err(|err| {
        log::error!("cannot allocate device numbers: {}", err);
        Errno::EIO
    })?;

    if !devnum.is_encodable() {
        log::error!("device number {} does not fit a packed device number", devnum);
        allocator.unregister_region(devnum, MINOR_COUNT);
        return Err(Errno::EIO);
    }

    if let Err(err) = registrar.add_cdev(devnum, MINOR_COUNT) {
        log::error!("cannot add character device {}: {}", devnum, err);
        allocator.unregister_region(devnum, MINOR_COUNT);
        return Err(Errno::EIO);
    }

    if let Err(err) = registrar.create_node(name, name, devnum) {
        log::error!("cannot create device node {}: {}", name, err);
        registrar.del_cdev(devnum);
        allocator.unregister_region(devnum, MINOR_COUNT);
        return Err(Errno::EIO);
    }

    Ok(devnum)
}

fn unregister_driver<A, R>(config: &GpioConfig, devnum: DevNum, allocator: &mut A, registrar: &mut R)
where
    A: DeviceNumberAllocator,
    R: DeviceRegistrar,
{
    registrar.destroy_node(config.device_name, devnum);
    registrar.del_cdev(devnum);
    allocator.unregister_region(devnum, MINOR_COUNT);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::{PhysicalRegion, PhysmapMapper};
    use crate::tests::support::{FakeMapper, FakeRegisters, Journal, RecordingAllocator, RecordingRegistrar};

    fn load(
        mapper: FakeMapper,
        journal: &Journal,
        fail_at: Option<&'static str>,
    ) -> Result<GpioModule<FakeMapper, RecordingAllocator, RecordingRegistrar>, Errno> {
        let config = GpioConfig::default().with_region(FakeRegisters::REGION);
        GpioModule::load(
            config,
            mapper,
            RecordingAllocator::new(journal, 240, fail_at),
            RecordingRegistrar::new(journal, fail_at),
        )
    }

    #[test]
    fn devnum_packing() {
        let dev = DevNum::new(240, 3);
        assert_eq!(dev.encode(), (240 << 20) | 3);
        assert_eq!(DevNum::decode(dev.encode()), dev);
        assert_eq!(format!("{}", dev), "240:3");
    }

    #[test]
    fn devnum_out_of_range_halves() {
        assert_eq!(DevNum::MAJOR_MAX, 4095);
        assert!(DevNum::new(4095, DevNum::MINOR_MAX).is_encodable());
        assert!(!DevNum::new(4096, 0).is_encodable());
        assert!(!DevNum::new(1, 1 << 20).is_encodable());
        // oversized major cannot bleed into the minor or wrap silently
        assert_eq!(DevNum::new(4096 + 7, 1).encode(), (7 << 20) | 1);
    }

    #[test]
    fn unencodable_major_aborts_load() {
        let regs = FakeRegisters::new();
        let journal = Journal::default();
        let err = GpioModule::load(
            GpioConfig::default().with_region(FakeRegisters::REGION),
            regs.mapper(),
            RecordingAllocator::new(&journal, 4096, None),
            RecordingRegistrar::new(&journal, None),
        )
        .err();
        assert_eq!(err, Some(Errno::EIO));
        assert_eq!(journal.entries(), ["alloc_region gpiogate", "unregister_region 4096:0"]);
        assert!(regs.journal().is_empty());
    }

    #[test]
    fn load_leaves_global_log_filter_alone() {
        log::set_max_level(log::LevelFilter::Trace);
        let regs = FakeRegisters::new();
        let journal = Journal::default();
        let config = GpioConfig::default()
            .with_region(FakeRegisters::REGION)
            .with_log_level(log::LevelFilter::Off);
        let module = GpioModule::load(
            config,
            regs.mapper(),
            RecordingAllocator::new(&journal, 240, None),
            RecordingRegistrar::new(&journal, None),
        )
        .unwrap();
        assert_ne!(log::max_level(), log::LevelFilter::Off);
        module.unload();
        assert_ne!(log::max_level(), log::LevelFilter::Off);
    }

    #[test]
    fn wrapping_region_is_rejected_before_reservation() {
        let journal = Journal::default();
        let mut mapper = PhysmapMapper::new(0, u64::MAX);
        mapper.reserve(PhysicalRegion::new(0x2020_0000, 4096)).unwrap();
        let config = GpioConfig::default().with_region(PhysicalRegion::new(u64::MAX - 0xfff, 0x2000));
        let err = GpioModule::load(
            config,
            mapper,
            RecordingAllocator::new(&journal, 240, None),
            RecordingRegistrar::new(&journal, None),
        )
        .err();
        assert_eq!(err, Some(Errno::EINVAL));
        assert!(journal.entries().is_empty());
    }

    #[test]
    fn load_registers_then_maps() {
        let regs = FakeRegisters::new();
        let journal = Journal::default();
        let module = load(regs.mapper(), &journal, None).unwrap();
        assert_eq!(module.devnum(), DevNum::new(240, 0));
        assert_eq!(
            journal.entries(),
            ["alloc_region gpiogate", "add_cdev 240:0", "create_node gpiogate/gpiogate 240:0"]
        );
        assert_eq!(regs.journal(), ["reserve", "map"]);
        assert!(!module.device().is_open());
    }

    #[test]
    fn unload_reverses_everything() {
        let regs = FakeRegisters::new();
        let journal = Journal::default();
        let module = load(regs.mapper(), &journal, None).unwrap();
        journal.clear();
        module.unload();
        assert_eq!(
            journal.entries(),
            ["destroy_node gpiogate 240:0", "del_cdev 240:0", "unregister_region 240:0"]
        );
        assert_eq!(regs.journal(), ["reserve", "map", "unmap", "release"]);
    }

    #[test]
    fn map_failure_aborts_load_and_unwinds() {
        let regs = FakeRegisters::new();
        let journal = Journal::default();
        let mapper = FakeMapper { fail_map: true, ..regs.mapper() };
        let err = load(mapper, &journal, None).err();
        assert_eq!(err, Some(Errno::EBUSY));
        assert_eq!(
            journal.entries(),
            [
                "alloc_region gpiogate",
                "add_cdev 240:0",
                "create_node gpiogate/gpiogate 240:0",
                "destroy_node gpiogate 240:0",
                "del_cdev 240:0",
                "unregister_region 240:0",
            ]
        );
        assert_eq!(regs.journal(), ["reserve", "map", "release"]);
    }

    #[test]
    fn allocation_failure_is_eio() {
        let regs = FakeRegisters::new();
        let journal = Journal::default();
        let err = load(regs.mapper(), &journal, Some("alloc_region")).err();
        assert_eq!(err, Some(Errno::EIO));
        assert!(regs.journal().is_empty());
    }

    #[test]
    fn cdev_failure_returns_numbers() {
        let regs = FakeRegisters::new();
        let journal = Journal::default();
        let err = load(regs.mapper(), &journal, Some("add_cdev")).err();
        assert_eq!(err, Some(Errno::EIO));
        assert_eq!(
            journal.entries(),
            ["alloc_region gpiogate", "add_cdev 240:0", "unregister_region 240:0"]
        );
    }

    #[test]
    fn node_failure_removes_cdev_and_numbers() {
        let regs = FakeRegisters::new();
        let journal = Journal::default();
        let err = load(regs.mapper(), &journal, Some("create_node")).err();
        assert_eq!(err, Some(Errno::EIO));
        assert_eq!(
            journal.entries(),
            [
                "alloc_region gpiogate",
                "add_cdev 240:0",
                "create_node gpiogate/gpiogate 240:0",
                "del_cdev 240:0",
                "unregister_region 240:0",
            ]
        );
        assert!(regs.journal().is_empty());
    }

    #[test]
    fn invalid_config_touches_nothing() {
        let regs = FakeRegisters::new();
        let journal = Journal::default();
        let config = GpioConfig::default().with_region(PhysicalRegion::new(0x2020_0000, 0));
        let err = GpioModule::load(
            config,
            regs.mapper(),
            RecordingAllocator::new(&journal, 240, None),
            RecordingRegistrar::new(&journal, None),
        )
        .err();
        assert_eq!(err, Some(Errno::EINVAL));
        assert!(journal.entries().is_empty());
    }
}
