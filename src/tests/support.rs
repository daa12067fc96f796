/*
 * Test Fixtures
 *
 * Host-side doubles for the hardware and the host kernel hooks:
 * - FakeRegisters / FakeMapper: heap-backed register block behind RegionMapper
 * - RecordingDelay: Delay that records requested sleeps
 * - Journal, RecordingAllocator, RecordingRegistrar: registration hooks that
 *   log every call and can be told to fail at a named step
 */

use std::ptr::NonNull;
use std::string::String;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use std::vec::Vec;

use crate::io::Errno;
use crate::memory::{MapError, PhysicalRegion, RegionMapper, RegisterWindow};
use crate::module::{DevNum, DeviceNumberAllocator, DeviceRegistrar};
use crate::utils::timer::Delay;

const WORDS: usize = 1024;

/// Register block shared between a fake mapper and the test
pub struct Shared {
    words: *mut u32,
    journal: Mutex<Vec<&'static str>>,
}

// SAFETY: the block is only touched through volatile accesses, and the
// driver serialises its own accesses with the session gate.
unsafe impl Send for Shared {}
unsafe impl Sync for Shared {}

impl Drop for Shared {
    fn drop(&mut self) {
        // SAFETY: words came from Box::into_raw in FakeRegisters::new.
        drop(unsafe { Box::from_raw(self.words as *mut [u32; WORDS]) });
    }
}

/// Heap-backed stand-in for the GPIO register block
pub struct FakeRegisters {
    shared: Arc<Shared>,
}

impl FakeRegisters {
    pub const REGION: PhysicalRegion = PhysicalRegion::new(0x2020_0000, WORDS * 4);

    pub fn new() -> Self {
        let words = Box::into_raw(Box::new([0u32; WORDS])) as *mut u32;
        Self {
            shared: Arc::new(Shared {
                words,
                journal: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn mapper(&self) -> FakeMapper {
        FakeMapper {
            shared: Arc::clone(&self.shared),
            fail_reserve: false,
            fail_map: false,
            reserved: None,
        }
    }

    /// A window over the fake block
    pub fn window(&self) -> RegisterWindow<FakeMapper> {
        match RegisterWindow::map(self.mapper(), Self::REGION) {
            Ok(window) => window,
            Err((err, _)) => panic!("fake window: {}", err),
        }
    }

    pub fn base(&self) -> *mut u32 {
        self.shared.words
    }

    pub fn read(&self, index: usize) -> u32 {
        assert!(index < WORDS);
        unsafe { self.shared.words.add(index).read_volatile() }
    }

    pub fn write(&self, index: usize, value: u32) {
        assert!(index < WORDS);
        unsafe { self.shared.words.add(index).write_volatile(value) }
    }

    /// Mapper calls so far, in order
    pub fn journal(&self) -> Vec<&'static str> {
        self.shared.journal.lock().unwrap().clone()
    }
}

/// RegionMapper over a FakeRegisters block
pub struct FakeMapper {
    pub shared: Arc<Shared>,
    pub fail_reserve: bool,
    pub fail_map: bool,
    pub reserved: Option<PhysicalRegion>,
}

impl FakeMapper {
    pub fn reserved(&self) -> Option<PhysicalRegion> {
        self.reserved
    }

    fn note(&self, call: &'static str) {
        self.shared.journal.lock().unwrap().push(call);
    }
}

impl RegionMapper for FakeMapper {
    fn reserve(&mut self, region: PhysicalRegion) -> Result<(), MapError> {
        self.note("reserve");
        if self.fail_reserve {
            return Err(MapError::RegionBusy);
        }
        self.reserved = Some(region);
        Ok(())
    }

    fn release(&mut self, _region: PhysicalRegion) {
        self.note("release");
        self.reserved = None;
    }

    fn map(&mut self, _region: PhysicalRegion) -> Option<NonNull<u32>> {
        self.note("map");
        if self.fail_map {
            return None;
        }
        NonNull::new(self.shared.words)
    }

    unsafe fn unmap(&mut self, _base: NonNull<u32>, _region: PhysicalRegion) {
        self.note("unmap");
    }
}

/// Delay that records what it was asked to sleep and sleeps briefly
pub struct RecordingDelay {
    requested: Mutex<Vec<u64>>,
}

impl RecordingDelay {
    pub fn new() -> Self {
        Self {
            requested: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.requested.lock().unwrap().len()
    }

    pub fn requested(&self) -> Vec<u64> {
        self.requested.lock().unwrap().clone()
    }
}

impl Delay for RecordingDelay {
    fn sleep_ms(&self, ms: u64) {
        self.requested.lock().unwrap().push(ms);
        thread::sleep(Duration::from_micros(200));
    }
}

/// Ordered record of registration hook calls
#[derive(Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn push(&self, entry: String) {
        self.0.lock().unwrap().push(entry);
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.0.lock().unwrap().clear();
    }
}

/// DeviceNumberAllocator handing out a fixed major
pub struct RecordingAllocator {
    journal: Journal,
    major: u32,
    fail_at: Option<&'static str>,
}

impl RecordingAllocator {
    pub fn new(journal: &Journal, major: u32, fail_at: Option<&'static str>) -> Self {
        Self {
            journal: journal.clone(),
            major,
            fail_at,
        }
    }
}

impl DeviceNumberAllocator for RecordingAllocator {
    fn alloc_region(&mut self, first_minor: u32, _count: u32, name: &str) -> Result<DevNum, Errno> {
        self.journal.push(format!("alloc_region {}", name));
        if self.fail_at == Some("alloc_region") {
            return Err(Errno::EBUSY);
        }
        Ok(DevNum::new(self.major, first_minor))
    }

    fn unregister_region(&mut self, first: DevNum, _count: u32) {
        self.journal.push(format!("unregister_region {}", first));
    }
}

/// DeviceRegistrar that records node and cdev calls
pub struct RecordingRegistrar {
    journal: Journal,
    fail_at: Option<&'static str>,
}

impl RecordingRegistrar {
    pub fn new(journal: &Journal, fail_at: Option<&'static str>) -> Self {
        Self {
            journal: journal.clone(),
            fail_at,
        }
    }
}

impl DeviceRegistrar for RecordingRegistrar {
    fn add_cdev(&mut self, dev: DevNum, _count: u32) -> Result<(), Errno> {
        self.journal.push(format!("add_cdev {}", dev));
        if self.fail_at == Some("add_cdev") {
            return Err(Errno::ENOMEM);
        }
        Ok(())
    }

    fn del_cdev(&mut self, dev: DevNum) {
        self.journal.push(format!("del_cdev {}", dev));
    }

    fn create_node(&mut self, class: &str, name: &str, dev: DevNum) -> Result<(), Errno> {
        self.journal.push(format!("create_node {}/{} {}", class, name, dev));
        if self.fail_at == Some("create_node") {
            return Err(Errno::ENODEV);
        }
        Ok(())
    }

    fn destroy_node(&mut self, class: &str, dev: DevNum) {
        self.journal.push(format!("destroy_node {} {}", class, dev));
    }
}
