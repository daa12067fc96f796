/*
 * Device Abstraction Layer
 *
 * Character device trait implemented by open GPIO sessions, plus the
 * POSIX errno subset and stat structure the driver reports through it.
 */

use core::fmt;

/// Character device interface
///
/// Implemented by open device files. Byte counts follow POSIX read/write
/// conventions; errors are reported as `Errno`.
pub trait Device: Send + Sync {
    /// Read up to buf.len() bytes into buf
    ///
    /// Returns the number of bytes read, or an error.
    fn read(&self, buf: &mut [u8]) -> Result<usize, Errno>;

    /// Write bytes from buf
    ///
    /// Returns the number of bytes the device reports as written.
    fn write(&self, buf: &[u8]) -> Result<usize, Errno>;

    /// Device control operation (ioctl)
    fn ioctl(&self, request: u32, arg: usize) -> Result<i32, Errno>;

    /// Get device metadata
    fn stat(&self) -> Stat;

    /// Seek to position (default: not seekable)
    fn seek(&self, _offset: i64, _whence: i32) -> Result<i64, Errno> {
        Err(Errno::ESPIPE)
    }
}

/// POSIX errno values
///
/// Subset of standard POSIX error codes for syscall compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum Errno {
    EPERM = 1,      // Operation not permitted
    ENOENT = 2,     // No such file or directory
    EINTR = 4,      // Interrupted system call
    EIO = 5,        // I/O error
    EBADF = 9,      // Bad file descriptor
    EAGAIN = 11,    // Try again
    ENOMEM = 12,    // Out of memory
    EACCES = 13,    // Permission denied
    EFAULT = 14,    // Bad address
    EBUSY = 16,     // Device or resource busy
    ENODEV = 19,    // No such device
    EINVAL = 22,    // Invalid argument
    ENOTTY = 25,    // Not a typewriter
    ESPIPE = 29,    // Illegal seek
    ETIMEDOUT = 110, // Connection timed out
}

impl Errno {
    /// Negative return value used by the syscall layer
    #[inline]
    pub const fn as_isize(self) -> isize {
        -(self as i32 as isize)
    }

    fn description(self) -> &'static str {
        match self {
            Errno::EPERM => "operation not permitted",
            Errno::ENOENT => "no such file or directory",
            Errno::EINTR => "interrupted",
            Errno::EIO => "i/o error",
            Errno::EBADF => "bad file descriptor",
            Errno::EAGAIN => "try again",
            Errno::ENOMEM => "out of memory",
            Errno::EACCES => "permission denied",
            Errno::EFAULT => "bad address",
            Errno::EBUSY => "device or resource busy",
            Errno::ENODEV => "no such device",
            Errno::EINVAL => "invalid argument",
            Errno::ENOTTY => "inappropriate ioctl for device",
            Errno::ESPIPE => "illegal seek",
            Errno::ETIMEDOUT => "timed out",
        }
    }
}

impl fmt::Display for Errno {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} ({})", self, self.description())
    }
}

/// Minimal stat structure
///
/// Subset of POSIX struct stat, focusing on st_mode for type checking.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stat {
    pub st_mode: u32,    // File type and mode
    pub st_size: u64,    // File size in bytes
    pub st_blksize: u64, // Block size for I/O
    pub st_blocks: u64,  // Number of 512B blocks allocated
}

// File type constants (POSIX)
pub const S_IFMT: u32 = 0o170000; // File type mask
pub const S_IFCHR: u32 = 0o020000; // Character device

/// Check if mode indicates a character device
#[allow(non_snake_case)]
#[inline]
pub fn S_ISCHR(mode: u32) -> bool {
    (mode & S_IFMT) == S_IFCHR
}
