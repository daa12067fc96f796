/*
 * Memory Types
 *
 * Physical addresses and physical regions used to describe hardware
 * register blocks.
 */

use core::fmt;

/// Physical address
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct PhysAddr(u64);

impl PhysAddr {
    pub const fn new(addr: u64) -> Self {
        Self(addr)
    }

    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::LowerHex for PhysAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

/// Physical region
///
/// A contiguous range of physical address space, `[base, base + len)`.
/// Identifies a hardware register block; fixed at configuration time.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct PhysicalRegion {
    pub base: PhysAddr,
    pub len: usize,
}

impl PhysicalRegion {
    pub const fn new(base: u64, len: usize) -> Self {
        Self {
            base: PhysAddr::new(base),
            len,
        }
    }

    /// Exclusive end address, saturating at the top of the address space
    pub const fn end(&self) -> u64 {
        self.base.as_u64().saturating_add(self.len as u64)
    }

    /// Exclusive end address, or None if the region wraps
    pub const fn checked_end(&self) -> Option<u64> {
        self.base.as_u64().checked_add(self.len as u64)
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Check whether the two regions share at least one byte
    pub fn overlaps(&self, other: &PhysicalRegion) -> bool {
        self.base.as_u64() < other.end() && other.base.as_u64() < self.end()
    }

    /// Check whether `addr` lies inside the region
    pub fn contains(&self, addr: PhysAddr) -> bool {
        addr.as_u64() >= self.base.as_u64() && addr.as_u64() < self.end()
    }
}

impl fmt::Display for PhysicalRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[0x{:x}..0x{:x})", self.base, self.end())
    }
}
