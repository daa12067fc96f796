/*
 * Memory-Mapped I/O (MMIO) Registers
 *
 * Register cells inside a mapped register window. Every access is volatile so
 * the compiler neither elides nor merges loads and stores to device memory.
 * Ordering against the device itself is the caller's job (see barrier.rs).
 *
 * The Io trait is shared by every register kind; ReadOnly and WriteOnly
 * restrict a register to the direction the hardware supports.
 */

use core::marker::PhantomData;
use core::ptr::NonNull;

use volatile::VolatilePtr;

/// Register access shared by every register kind
pub trait Io {
    /// Register width
    type Value: Copy;

    fn read(&self) -> Self::Value;

    fn write(&mut self, value: Self::Value);
}

/// Wrapper for an I/O interface providing read-only access.
pub struct ReadOnly<I> {
    inner: I,
}

impl<I> ReadOnly<I> {
    /// Creates a new `ReadOnly` wrapper instance.
    pub const fn new(inner: I) -> ReadOnly<I> {
        ReadOnly { inner }
    }
}

impl<I: Io> ReadOnly<I> {
    /// Reads the value from the I/O interface.
    #[inline(always)]
    pub fn read(&self) -> I::Value {
        self.inner.read()
    }
}

/// Wrapper for an I/O interface providing write-only access.
///
/// Used for registers where a read returns nothing meaningful, such as the
/// GPIO set and clear registers.
pub struct WriteOnly<I> {
    inner: I,
}

impl<I> WriteOnly<I> {
    /// Creates a new `WriteOnly` wrapper instance.
    pub const fn new(inner: I) -> WriteOnly<I> {
        WriteOnly { inner }
    }
}

impl<I: Io> WriteOnly<I> {
    /// Writes the value to the I/O interface.
    #[inline(always)]
    pub fn write(&mut self, value: I::Value) {
        self.inner.write(value)
    }
}

/// Generic MMIO register cell
pub struct Mmio<'a, T> {
    ptr: NonNull<T>,
    window: PhantomData<&'a T>,
}

impl<'a, T> Mmio<'a, T> {
    /// Create a register cell at the given address.
    ///
    /// # Safety
    ///
    /// `ptr` must point to a mapped, suitably aligned register that stays
    /// mapped for `'a`.
    #[inline(always)]
    pub const unsafe fn new(ptr: NonNull<T>) -> Self {
        Mmio {
            ptr,
            window: PhantomData,
        }
    }

    /// Address of the register cell
    #[inline]
    pub fn as_ptr(&self) -> *mut T {
        self.ptr.as_ptr()
    }
}

/// Read/Write for doubleword MMIO
impl Io for Mmio<'_, u32> {
    type Value = u32;

    #[inline(always)]
    fn read(&self) -> u32 {
        // SAFETY: the constructor guarantees a live, aligned register.
        unsafe { VolatilePtr::new(self.ptr) }.read()
    }

    #[inline(always)]
    fn write(&mut self, value: u32) {
        // SAFETY: the constructor guarantees a live, aligned register.
        unsafe { VolatilePtr::new(self.ptr) }.write(value)
    }
}
