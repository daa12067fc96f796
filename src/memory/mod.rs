/*
 * Memory Management
 *
 * Physical region description and mapping of hardware register blocks:
 *  - types:   PhysAddr and PhysicalRegion
 *  - window:  RegisterWindow and the RegionMapper capability
 *  - physmap: RegionMapper over a direct physical map
 */

pub mod physmap;
pub mod types;
pub mod window;

pub use physmap::PhysmapMapper;
pub use types::{PhysAddr, PhysicalRegion};
pub use window::{MapError, REGISTER_BYTES, RegionMapper, RegisterWindow, WINDOW_MIN_LEN};
