/*
 * GPIO Device
 *
 * GpioDevice owns the register window and the session gate. Opening it
 * acquires the gate and configures the output pin as output and the input
 * pin as input; this happens on every open, even if an earlier session left
 * the pins configured the same way. The returned GpioFile is the session.
 *
 * Byte protocol of an open file:
 * - read:  one ASCII digit, b'1' when the input pin is high, b'0' when low.
 *          Reports 1 byte whatever length was requested, or 0 bytes when the
 *          destination cannot take a byte.
 * - write: only the first byte counts. b'1' writes the output pin's bit to
 *          the clear register, any other byte writes it to the set register
 *          (the output is active low). The full source length is reported
 *          as written.
 */

use bitflags::bitflags;

use crate::config::GpioConfig;
use crate::drivers::gpio::config::{configure_input, configure_output};
use crate::drivers::gpio::layout::{Level, PinId};
use crate::drivers::gpio::session::{AcquireOptions, SessionGate, SessionGuard};
use crate::io::{Device, Errno, S_IFCHR, Stat, rmb, wmb};
use crate::memory::{RegionMapper, RegisterWindow};
use crate::utils::timer::Delay;

bitflags! {
    /// Open mode flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct OpenFlags: u32 {
        const READ = 1;
        const WRITE = 1 << 1;
        // Fail with EAGAIN instead of waiting for the session
        const NONBLOCK = 1 << 2;
    }
}

impl OpenFlags {
    pub const RDWR: OpenFlags = OpenFlags::READ.union(OpenFlags::WRITE);
}

/// Register a write command is routed to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputDrive {
    /// GPSET0
    Set,
    /// GPCLR0
    Clear,
}

impl OutputDrive {
    /// Decode a command byte: b'1' clears, everything else sets
    pub const fn decode(command: u8) -> Self {
        if command == b'1' {
            OutputDrive::Clear
        } else {
            OutputDrive::Set
        }
    }
}

/// The GPIO character device
pub struct GpioDevice<M: RegionMapper> {
    window: RegisterWindow<M>,
    gate: SessionGate,
    output_pin: PinId,
    input_pin: PinId,
}

impl<M: RegionMapper> GpioDevice<M> {
    pub fn new(window: RegisterWindow<M>, config: &GpioConfig) -> Self {
        Self {
            window,
            gate: SessionGate::new(config.retry_interval_ms),
            output_pin: config.output_pin,
            input_pin: config.input_pin,
        }
    }

    /// Open a session
    ///
    /// Waits for the current holder to close unless `NONBLOCK` is given, in
    /// which case a held session fails with `EAGAIN`.
    pub fn open<D: Delay + ?Sized>(&self, flags: OpenFlags, delay: &D) -> Result<GpioFile<'_, M>, Errno> {
        let session = if flags.contains(OpenFlags::NONBLOCK) {
            self.gate.try_acquire().ok_or_else(|| {
                log::debug!("open: session busy");
                Errno::EAGAIN
            })?
        } else {
            self.gate.acquire(delay)
        };
        Ok(self.start_session(session, flags))
    }

    /// Open a session, giving up on timeout or cancellation
    pub fn open_with<D: Delay + ?Sized>(
        &self,
        flags: OpenFlags,
        delay: &D,
        options: &AcquireOptions<'_>,
    ) -> Result<GpioFile<'_, M>, Errno> {
        let session = self.gate.acquire_with(delay, options).inspect_err(|err| {
            log::warn!("open: gave up waiting for session: {}", err);
        })?;
        Ok(self.start_session(session, flags))
    }

    fn start_session<'a>(&'a self, session: SessionGuard<'a>, flags: OpenFlags) -> GpioFile<'a, M> {
        configure_output(&self.window, self.output_pin);
        configure_input(&self.window, self.input_pin);
        log::debug!(
            "session opened ({:?}): {} output, {} input",
            flags,
            self.output_pin,
            self.input_pin
        );
        GpioFile {
            device: self,
            session,
            flags,
        }
    }

    /// Whether a session is currently open
    pub fn is_open(&self) -> bool {
        self.gate.is_open()
    }

    pub fn output_pin(&self) -> PinId {
        self.output_pin
    }

    pub fn input_pin(&self) -> PinId {
        self.input_pin
    }

    pub fn window(&self) -> &RegisterWindow<M> {
        &self.window
    }

    /// Tear the device down, handing back its register window
    pub fn into_window(self) -> RegisterWindow<M> {
        self.window
    }
}

/// An open session on the GPIO device
pub struct GpioFile<'a, M: RegionMapper> {
    device: &'a GpioDevice<M>,
    session: SessionGuard<'a>,
    flags: OpenFlags,
}

impl<M: RegionMapper> GpioFile<'_, M> {
    /// Sample the input pin
    pub fn level(&self) -> Level {
        let value = self.device.window.level_register().read();
        rmb();
        Level::from_register(value, self.device.input_pin)
    }

    /// Write the output pin's bit to the set or clear register
    pub fn drive(&self, target: OutputDrive) {
        let mask = self.device.output_pin.mask();
        let mut register = match target {
            OutputDrive::Set => self.device.window.set_register(),
            OutputDrive::Clear => self.device.window.clear_register(),
        };
        wmb();
        register.write(mask);
        log::trace!("{} <- {:?}", self.device.output_pin, target);
    }

    pub fn flags(&self) -> OpenFlags {
        self.flags
    }

    /// Close the session
    pub fn close(self) {
        log::debug!("session closed");
        self.session.release();
    }
}

impl<M: RegionMapper + Send + Sync> Device for GpioFile<'_, M> {
    fn read(&self, buf: &mut [u8]) -> Result<usize, Errno> {
        if !self.flags.contains(OpenFlags::READ) {
            return Err(Errno::EBADF);
        }

        let level = self.level();
        match buf.first_mut() {
            Some(byte) => {
                *byte = level.as_ascii();
                Ok(1)
            }
            None => {
                log::warn!("read: destination cannot hold the level byte");
                Ok(0)
            }
        }
    }

    fn write(&self, buf: &[u8]) -> Result<usize, Errno> {
        if !self.flags.contains(OpenFlags::WRITE) {
            return Err(Errno::EBADF);
        }

        let Some(&command) = buf.first() else {
            log::warn!("write: no command byte to copy");
            return Err(Errno::EFAULT);
        };
        self.drive(OutputDrive::decode(command));

        // Only the first byte is interpreted, the whole request is reported.
        Ok(buf.len())
    }

    fn ioctl(&self, _request: u32, _arg: usize) -> Result<i32, Errno> {
        Err(Errno::ENOTTY)
    }

    fn stat(&self) -> Stat {
        Stat {
            st_mode: S_IFCHR | 0o666, // Character device, rw-rw-rw-
            st_size: 0,
            st_blksize: 0,
            st_blocks: 0,
        }
    }
}
