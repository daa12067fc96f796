/*
 * Register Window
 *
 * A live mapping of the GPIO register block into addressable memory.
 *
 * The window owns the RegionMapper capability that produced it. Mapping
 * reserves the physical region first and maps it second; teardown runs in the
 * opposite order and happens exactly once, when the window is unmapped or
 * dropped. Register cells borrow the window, so none can outlive it.
 *
 * Register word offsets (from the window base):
 * - GPFSELn: n = pin / 10   function select, 3 bits per pin
 * - GPSET0:  7              write 1 to drive a pin high
 * - GPCLR0:  10             write 1 to drive a pin low
 * - GPLEV0:  13             current pin levels
 */

use core::fmt;
use core::ptr::NonNull;

use crate::drivers::gpio::layout::{GPCLR0, GPLEV0, GPSET0, PinId, register_offset_for};
use crate::io::{Errno, Mmio, ReadOnly, WriteOnly};
use crate::memory::types::PhysicalRegion;

/// Width of one register in bytes
pub const REGISTER_BYTES: usize = core::mem::size_of::<u32>();

/// Smallest region that still contains the level register
pub const WINDOW_MIN_LEN: usize = (GPLEV0 + 1) * REGISTER_BYTES;

/// Register window mapping failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapError {
    /// The physical region is already reserved by someone else
    RegionBusy,
    /// The region cannot hold the registers the driver uses
    RegionTooSmall,
    /// The mapping primitive could not map the region
    MapFailed,
}

impl fmt::Display for MapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MapError::RegionBusy => f.write_str("physical region already reserved"),
            MapError::RegionTooSmall => f.write_str("physical region too small for register layout"),
            MapError::MapFailed => f.write_str("could not map physical region"),
        }
    }
}

impl From<MapError> for Errno {
    fn from(err: MapError) -> Self {
        match err {
            MapError::RegionBusy | MapError::MapFailed => Errno::EBUSY,
            MapError::RegionTooSmall => Errno::EINVAL,
        }
    }
}

/// Hardware register access capability
///
/// Implemented by the host kernel on top of its physical memory management.
/// `reserve`/`release` bracket `map`/`unmap`.
pub trait RegionMapper {
    /// Claim exclusive use of a physical region
    fn reserve(&mut self, region: PhysicalRegion) -> Result<(), MapError>;

    /// Give up a region claimed with `reserve`
    fn release(&mut self, region: PhysicalRegion);

    /// Map a reserved region, returning the address of its first register
    ///
    /// Returns None if the mapping primitive cannot map the range.
    fn map(&mut self, region: PhysicalRegion) -> Option<NonNull<u32>>;

    /// Remove a mapping created by `map`
    ///
    /// # Safety
    ///
    /// `base` must come from `map(region)` on this mapper and must not be
    /// accessed afterwards.
    unsafe fn unmap(&mut self, base: NonNull<u32>, region: PhysicalRegion);
}

/// Live mapping of the GPIO register block
pub struct RegisterWindow<M: RegionMapper> {
    mapper: M,
    region: PhysicalRegion,
    base: NonNull<u32>,
}

// SAFETY: the window is a plain pointer into device memory plus the mapper.
// Register access through it is serialised by the GPIO session gate.
unsafe impl<M: RegionMapper + Send> Send for RegisterWindow<M> {}
unsafe impl<M: RegionMapper + Sync> Sync for RegisterWindow<M> {}

impl<M: RegionMapper> RegisterWindow<M> {
    /// Reserve and map `region`
    ///
    /// On failure any reservation taken here has been released again and
    /// the mapper is handed back to the caller.
    pub fn map(mut mapper: M, region: PhysicalRegion) -> Result<Self, (MapError, M)> {
        if region.len < WINDOW_MIN_LEN || region.base.as_u64() % REGISTER_BYTES as u64 != 0 {
            log::error!("register window {} cannot hold the GPIO registers", region);
            return Err((MapError::RegionTooSmall, mapper));
        }

        if let Err(err) = mapper.reserve(region) {
            log::error!("register window {}: {}", region, err);
            return Err((err, mapper));
        }

        let Some(base) = mapper.map(region) else {
            log::error!("register window {}: {}", region, MapError::MapFailed);
            mapper.release(region);
            return Err((MapError::MapFailed, mapper));
        };

        log::debug!("register window {} mapped at {:p}", region, base.as_ptr());
        Ok(Self { mapper, region, base })
    }

    /// Unmap the window and release its region
    pub fn unmap(self) {
        drop(self);
    }

    /// The physical region behind this window
    pub fn region(&self) -> PhysicalRegion {
        self.region
    }

    /// Number of 32-bit registers covered by the window
    pub fn words(&self) -> usize {
        self.region.len / REGISTER_BYTES
    }

    /// The mapper that owns this mapping
    pub fn mapper(&self) -> &M {
        &self.mapper
    }

    fn cell(&self, index: usize) -> Mmio<'_, u32> {
        debug_assert!(index < self.words());
        // SAFETY: index is a layout constant or a function-select index for
        // a pin below 32, all inside WINDOW_MIN_LEN, which map() enforced.
        unsafe { Mmio::new(NonNull::new_unchecked(self.base.as_ptr().add(index))) }
    }

    /// Function-select register covering `pin`
    pub fn function_select(&self, pin: PinId) -> Mmio<'_, u32> {
        self.cell(register_offset_for(pin).register)
    }

    /// Output set register
    pub fn set_register(&self) -> WriteOnly<Mmio<'_, u32>> {
        WriteOnly::new(self.cell(GPSET0))
    }

    /// Output clear register
    pub fn clear_register(&self) -> WriteOnly<Mmio<'_, u32>> {
        WriteOnly::new(self.cell(GPCLR0))
    }

    /// Pin level register
    pub fn level_register(&self) -> ReadOnly<Mmio<'_, u32>> {
        ReadOnly::new(self.cell(GPLEV0))
    }
}

impl<M: RegionMapper> Drop for RegisterWindow<M> {
    fn drop(&mut self) {
        // SAFETY: base came from map(region); every register cell borrows
        // the window and is therefore gone by now.
        unsafe { self.mapper.unmap(self.base, self.region) };
        self.mapper.release(self.region);
        log::debug!("register window {} unmapped", self.region);
    }
}
