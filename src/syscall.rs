/*
 * Read/Write Entry Points
 *
 * Boundary between caller-supplied buffers and the Device trait. The host
 * kernel's read/write handlers pass raw user pointers here.
 *
 * Security considerations:
 * - All user pointers MUST be validated before dereferencing
 * - A bad destination on read still samples the device but transfers
 *   nothing (0 bytes)
 * - A bad source on write fails with EFAULT before the device is touched
 *
 * Return values follow the syscall convention: byte count, or a negative
 * errno.
 */

use crate::io::{Device, Errno};

/// First address above user space
#[cfg(target_arch = "x86_64")]
pub const USER_SPACE_END: usize = 0x0000_8000_0000_0000;
/// First address above user space (48-bit TTBR0 range)
#[cfg(target_arch = "aarch64")]
pub const USER_SPACE_END: usize = 0x0001_0000_0000_0000;
/// First address above user space
#[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
pub const USER_SPACE_END: usize = usize::MAX;

/// Validate a user pointer
///
/// Checks that a pointer from userspace is:
/// - Not NULL
/// - Within userspace address range
/// - Does not overflow when adding count
pub fn validate_user_ptr<T>(ptr: *const T, count: usize) -> Result<(), Errno> {
    let addr = ptr as usize;

    // Check for NULL pointer
    if addr == 0 {
        return Err(Errno::EFAULT);
    }

    let Some(len) = count.checked_mul(core::mem::size_of::<T>()) else {
        return Err(Errno::EFAULT);
    };
    let Some(end) = addr.checked_add(len) else {
        return Err(Errno::EFAULT);
    };

    // The whole range must stay below the kernel half
    if end > USER_SPACE_END {
        return Err(Errno::EFAULT);
    }

    Ok(())
}

/// read(2) on an open device
///
/// # Safety
///
/// If `buf` passes validation it must be valid for writes of `count` bytes.
pub unsafe fn sys_read(device: &dyn Device, buf: *mut u8, count: usize) -> isize {
    let dest: &mut [u8] = match validate_user_ptr(buf, count) {
        // SAFETY: validated above, validity is the caller's contract.
        Ok(()) => unsafe { core::slice::from_raw_parts_mut(buf, count) },
        Err(err) => {
            log::warn!("sys_read: bad destination {:p}: {}", buf, err);
            &mut []
        }
    };

    match device.read(dest) {
        Ok(n) => n as isize,
        Err(err) => err.as_isize(),
    }
}

/// write(2) on an open device
///
/// # Safety
///
/// If `buf` passes validation it must be valid for reads of `count` bytes.
pub unsafe fn sys_write(device: &dyn Device, buf: *const u8, count: usize) -> isize {
    if let Err(err) = validate_user_ptr(buf, count) {
        log::warn!("sys_write: bad source {:p}: {}", buf, err);
        return err.as_isize();
    }

    // SAFETY: validated above, validity is the caller's contract.
    let src = unsafe { core::slice::from_raw_parts(buf, count) };
    match device.write(src) {
        Ok(n) => n as isize,
        Err(err) => err.as_isize(),
    }
}
