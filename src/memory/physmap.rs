/*
 * Physical Memory Direct Map (Physmap) Mapper
 *
 * RegionMapper for kernels that map all physical memory, MMIO included, at a
 * fixed virtual offset. Mapping a region is a translation; unmapping is a
 * no-op. Reservations are tracked here so two drivers cannot claim the same
 * register block.
 *
 * LAYOUT:
 * ```
 * offset                  <- physical 0
 * offset + phys           <- physical `phys`
 * offset + max_phys       <- end of the direct map
 * ```
 */

use core::ptr::NonNull;

use heapless::Vec;

use crate::memory::types::PhysicalRegion;
use crate::memory::window::{MapError, RegionMapper};

/// Maximum number of regions that can be reserved at once
pub const MAX_RESERVATIONS: usize = 8;

/// Direct-map region mapper
pub struct PhysmapMapper {
    offset: u64,
    max_phys: u64,
    reserved: Vec<PhysicalRegion, MAX_RESERVATIONS>,
}

impl PhysmapMapper {
    /// Create a mapper for a direct map of `[0..max_phys)` at `offset`
    pub const fn new(offset: u64, max_phys: u64) -> Self {
        Self {
            offset,
            max_phys,
            reserved: Vec::new(),
        }
    }

    /// Virtual address of a physical address inside the direct map
    pub fn phys_to_virt(&self, phys: u64) -> Option<u64> {
        if phys >= self.max_phys {
            return None;
        }
        self.offset.checked_add(phys)
    }

    /// Currently reserved regions
    pub fn reserved(&self) -> &[PhysicalRegion] {
        &self.reserved
    }
}

impl RegionMapper for PhysmapMapper {
    fn reserve(&mut self, region: PhysicalRegion) -> Result<(), MapError> {
        if self.reserved.iter().any(|r| r.overlaps(&region)) {
            log::warn!("physmap: region {} overlaps an existing reservation", region);
            return Err(MapError::RegionBusy);
        }
        self.reserved.push(region).map_err(|_| {
            log::warn!("physmap: reservation table full");
            MapError::RegionBusy
        })
    }

    fn release(&mut self, region: PhysicalRegion) {
        self.reserved.retain(|r| *r != region);
    }

    fn map(&mut self, region: PhysicalRegion) -> Option<NonNull<u32>> {
        let end = region.checked_end()?;
        if region.is_empty() || end > self.max_phys {
            return None;
        }
        let virt = self.phys_to_virt(region.base.as_u64())?;
        let virt = usize::try_from(virt).ok()?;
        NonNull::new(virt as *mut u32)
    }

    unsafe fn unmap(&mut self, _base: NonNull<u32>, region: PhysicalRegion) {
        log::trace!("physmap: {} stays in the direct map", region);
    }
}
