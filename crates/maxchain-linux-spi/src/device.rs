//! Linux spidev transport implementation
//!
//! This module provides the `LinuxSpi` struct that implements the
//! `ChainTransport` trait using Linux's spidev interface.

use crate::error::{LinuxSpiError, Result};

use maxchain_core::config::{BusConfig, MAX_CLOCK_SPEED_HZ};
use maxchain_core::error::{Error as CoreError, Result as CoreResult};
use maxchain_core::transport::ChainTransport;

use std::fs::{File, OpenOptions};
use std::os::unix::io::AsRawFd;

/// Path to kernel spidev buffer size parameter
const BUF_SIZE_SYSFS: &str = "/sys/module/spidev/parameters/bufsiz";

/// Bits per word, the controllers take plain bytes
const BITS_PER_WORD: u8 = 8;

/// Linux spidev ioctl constants
mod ioctl {
    use nix::ioctl_write_ptr;

    // SPI ioctl magic number
    const SPI_IOC_MAGIC: u8 = b'k';

    // SPI ioctl type numbers
    const SPI_IOC_TYPE_MODE: u8 = 1;
    const SPI_IOC_TYPE_BITS_PER_WORD: u8 = 3;
    const SPI_IOC_TYPE_MAX_SPEED_HZ: u8 = 4;

    // Generate ioctl functions
    ioctl_write_ptr!(spi_ioc_wr_mode, SPI_IOC_MAGIC, SPI_IOC_TYPE_MODE, u8);
    ioctl_write_ptr!(
        spi_ioc_wr_bits_per_word,
        SPI_IOC_MAGIC,
        SPI_IOC_TYPE_BITS_PER_WORD,
        u8
    );
    ioctl_write_ptr!(
        spi_ioc_wr_max_speed_hz,
        SPI_IOC_MAGIC,
        SPI_IOC_TYPE_MAX_SPEED_HZ,
        u32
    );

    /// Size of spi_ioc_transfer struct (for 64-bit systems)
    pub const SPI_IOC_TRANSFER_SIZE: usize = 32;

    /// Calculate ioctl number for SPI_IOC_MESSAGE(n)
    pub fn spi_ioc_message(n: u8) -> libc::c_ulong {
        let size = (n as usize) * SPI_IOC_TRANSFER_SIZE;
        // _IOW(SPI_IOC_MAGIC, 0, char[size])
        ((1u32 << 30) | ((size as u32) << 16) | ((SPI_IOC_MAGIC as u32) << 8)) as libc::c_ulong
    }
}

/// SPI transfer structure for ioctl
/// This must match the kernel's struct spi_ioc_transfer layout
#[repr(C)]
#[derive(Debug, Default, Clone)]
struct SpiIocTransfer {
    tx_buf: u64,          // __u64 tx_buf
    rx_buf: u64,          // __u64 rx_buf
    len: u32,             // __u32 len
    speed_hz: u32,        // __u32 speed_hz
    delay_usecs: u16,     // __u16 delay_usecs
    bits_per_word: u8,    // __u8 bits_per_word
    cs_change: u8,        // __u8 cs_change
    tx_nbits: u8,         // __u8 tx_nbits
    rx_nbits: u8,         // __u8 rx_nbits
    word_delay_usecs: u8, // __u8 word_delay_usecs
    _pad: u8,             // padding
}

/// Configuration for opening a Linux SPI device
#[derive(Debug, Clone, Default)]
pub struct LinuxSpiConfig {
    /// Device path (e.g., "/dev/spidev0.0")
    pub device: String,
    /// Clock override in Hz, replaces the chain's configured clock
    pub speed_hz: Option<u32>,
}

impl LinuxSpiConfig {
    /// Create a new configuration with the given device path
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            speed_hz: None,
        }
    }

    /// Chip select encoded in a `/dev/spidevX.Y` path, if any
    pub fn chip_select(&self) -> Option<u32> {
        let (_, cs) = self.device.rsplit_once('.')?;
        cs.parse().ok()
    }
}

/// Linux spidev transport
///
/// The device is opened eagerly. Mode, word size and clock are applied when
/// the chain is attached. Exclusive bus access is an advisory `flock` on the
/// device node, so cooperating processes sharing the chain serialize too.
pub struct LinuxSpi {
    /// File handle for spidev device
    file: File,
    /// Device path, for messages
    path: String,
    /// Chip select encoded in the path
    chip_select: Option<u32>,
    /// Clock override from the transport options
    speed_override_hz: Option<u32>,
    /// Maximum kernel buffer size
    max_kernel_buf_size: usize,
    /// Clock of the current attachment, `None` while detached
    speed_hz: Option<u32>,
    /// Whether this process holds the device lock
    locked: bool,
}

impl LinuxSpi {
    /// Open a Linux SPI device
    pub fn open(config: &LinuxSpiConfig) -> Result<Self> {
        if config.device.is_empty() {
            return Err(LinuxSpiError::NoDevice);
        }

        log::debug!("linux_spi: Opening device {}", config.device);

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&config.device)
            .map_err(|e| LinuxSpiError::OpenFailed {
                path: config.device.clone(),
                source: e,
            })?;

        let max_kernel_buf_size = get_max_kernel_buf_size();
        log::debug!(
            "linux_spi: Max kernel buffer size: {} bytes",
            max_kernel_buf_size
        );

        Ok(Self {
            file,
            path: config.device.clone(),
            chip_select: config.chip_select(),
            speed_override_hz: config.speed_hz,
            max_kernel_buf_size,
            speed_hz: None,
            locked: false,
        })
    }

    /// Open a device by path
    pub fn open_device(device: &str) -> Result<Self> {
        Self::open(&LinuxSpiConfig::new(device))
    }

    /// Clock of the current attachment
    pub fn speed_hz(&self) -> Option<u32> {
        self.speed_hz
    }

    /// Apply mode, word size and clock for the chain
    fn configure(&mut self, config: &BusConfig) -> Result<()> {
        let fd = self.file.as_raw_fd();

        if config.transaction_len > self.max_kernel_buf_size {
            return Err(LinuxSpiError::TransactionTooLong {
                len: config.transaction_len,
                max: self.max_kernel_buf_size,
            });
        }

        match self.chip_select {
            Some(cs) if cs != config.chip_select => log::warn!(
                "linux_spi: {} is chip select {}, chain configured for {}",
                self.path,
                cs,
                config.chip_select
            ),
            _ => {}
        }

        let mode = config.mode;
        unsafe {
            ioctl::spi_ioc_wr_mode(fd, &mode).map_err(|e| LinuxSpiError::SetModeFailed {
                mode,
                source: std::io::Error::from_raw_os_error(e as i32),
            })?;
        }

        let bits = BITS_PER_WORD;
        unsafe {
            ioctl::spi_ioc_wr_bits_per_word(fd, &bits).map_err(|e| {
                LinuxSpiError::SetBitsPerWordFailed {
                    bits,
                    source: std::io::Error::from_raw_os_error(e as i32),
                }
            })?;
        }

        let speed = match self.speed_override_hz {
            Some(hz) => {
                log::debug!(
                    "linux_spi: Using spispeed {} Hz instead of {} Hz",
                    hz,
                    config.clock_speed_hz
                );
                hz
            }
            None => config.clock_speed_hz,
        };
        unsafe {
            ioctl::spi_ioc_wr_max_speed_hz(fd, &speed).map_err(|e| {
                LinuxSpiError::SetSpeedFailed {
                    speed,
                    source: std::io::Error::from_raw_os_error(e as i32),
                }
            })?;
        }

        log::info!(
            "linux_spi: Attached {} (mode={}, speed={} kHz)",
            self.path,
            mode,
            speed / 1000
        );
        self.speed_hz = Some(speed);
        Ok(())
    }

    /// Take or drop the advisory lock on the device node
    fn flock(&mut self, operation: libc::c_int) -> Result<()> {
        let ret = unsafe { libc::flock(self.file.as_raw_fd(), operation) };
        if ret < 0 {
            return Err(LinuxSpiError::LockFailed(std::io::Error::last_os_error()));
        }
        Ok(())
    }

    /// Clock out one transaction with chip select held for its whole length
    ///
    /// Chip select is released at the end of the transfer, which latches the
    /// words into the chain.
    fn spi_write(&mut self, data: &[u8]) -> Result<()> {
        let speed_hz = self.speed_hz.ok_or(LinuxSpiError::NotAttached)?;

        if data.is_empty() {
            return Err(LinuxSpiError::InvalidParameter(
                "Transaction cannot be empty".into(),
            ));
        }
        if data.len() > self.max_kernel_buf_size {
            return Err(LinuxSpiError::TransactionTooLong {
                len: data.len(),
                max: self.max_kernel_buf_size,
            });
        }

        let transfer = SpiIocTransfer {
            tx_buf: data.as_ptr() as u64,
            len: data.len() as u32,
            speed_hz,
            bits_per_word: BITS_PER_WORD,
            ..Default::default()
        };

        let ioctl_num = ioctl::spi_ioc_message(1);
        let ret = unsafe {
            libc::ioctl(
                self.file.as_raw_fd(),
                ioctl_num,
                &transfer as *const SpiIocTransfer,
            )
        };

        if ret < 0 {
            return Err(LinuxSpiError::TransferFailed(
                std::io::Error::last_os_error(),
            ));
        }

        Ok(())
    }
}

impl ChainTransport for LinuxSpi {
    fn attach(&mut self, config: &BusConfig) -> CoreResult<()> {
        self.configure(config).map_err(|e| {
            log::warn!("linux_spi: {}", e);
            CoreError::AttachFailed
        })
    }

    fn acquire_bus(&mut self) -> CoreResult<()> {
        self.flock(libc::LOCK_EX).map_err(|e| {
            log::warn!("linux_spi: {}", e);
            CoreError::BusAcquireFailed
        })?;
        self.locked = true;
        Ok(())
    }

    fn release_bus(&mut self) {
        if !self.locked {
            return;
        }
        if let Err(e) = self.flock(libc::LOCK_UN) {
            log::warn!("linux_spi: Failed to release bus: {}", e);
        }
        self.locked = false;
    }

    fn transmit(&mut self, data: &[u8]) -> CoreResult<()> {
        self.spi_write(data).map_err(|e| {
            log::warn!("linux_spi: {}", e);
            CoreError::TransmitFailed
        })
    }

    fn detach(&mut self) -> CoreResult<()> {
        if self.speed_hz.take().is_none() {
            log::warn!("linux_spi: {}", LinuxSpiError::NotAttached);
            return Err(CoreError::DetachFailed);
        }
        log::debug!("linux_spi: Detached {}", self.path);
        Ok(())
    }
}

/// Read the maximum kernel buffer size from sysfs, or use page size as fallback
fn get_max_kernel_buf_size() -> usize {
    if let Ok(content) = std::fs::read_to_string(BUF_SIZE_SYSFS) {
        if let Ok(size) = content.trim().parse::<usize>() {
            if size > 0 {
                log::debug!("linux_spi: Using buffer size {} from sysfs", size);
                return size;
            }
        }
        log::warn!("linux_spi: Invalid buffer size in {}", BUF_SIZE_SYSFS);
    } else {
        log::debug!("linux_spi: Cannot read {}, using page size", BUF_SIZE_SYSFS);
    }

    let page_size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) } as usize;
    log::debug!("linux_spi: Using page size {} as buffer size", page_size);
    page_size
}

/// Parse transport options from a list of key-value pairs
pub fn parse_options(options: &[(&str, &str)]) -> std::result::Result<LinuxSpiConfig, String> {
    let mut config = LinuxSpiConfig::default();

    for (key, value) in options {
        match *key {
            "dev" => {
                config.device = value.to_string();
            }
            "spispeed" => {
                // Parse speed in kHz
                let speed_khz: u32 = value
                    .parse()
                    .map_err(|_| format!("Invalid spispeed value: {}", value))?;
                let speed_hz = speed_khz
                    .checked_mul(1000)
                    .filter(|hz| (1..=MAX_CLOCK_SPEED_HZ).contains(hz))
                    .ok_or_else(|| {
                        format!(
                            "Invalid spispeed: {} kHz (must be 1..={} kHz)",
                            value,
                            MAX_CLOCK_SPEED_HZ / 1000
                        )
                    })?;
                config.speed_hz = Some(speed_hz);
            }
            _ => {
                log::warn!("linux_spi: Unknown option: {}={}", key, value);
            }
        }
    }

    if config.device.is_empty() {
        return Err("No device specified. Use dev=/dev/spidevX.Y".to_string());
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_options() {
        let config = parse_options(&[("dev", "/dev/spidev1.2")]).unwrap();
        assert_eq!(config.device, "/dev/spidev1.2");
        assert_eq!(config.chip_select(), Some(2));
    }

    #[test]
    fn test_parse_options_requires_device() {
        assert!(parse_options(&[]).is_err());
        assert!(parse_options(&[("spispeed", "1000")]).is_err());
        assert!(parse_options(&[("mode", "0")]).is_err());
    }

    #[test]
    fn test_parse_options_spispeed() {
        let config = parse_options(&[("dev", "/dev/spidev0.0"), ("spispeed", "500")]).unwrap();
        assert_eq!(config.device, "/dev/spidev0.0");
        assert_eq!(config.speed_hz, Some(500_000));

        let config = parse_options(&[("dev", "/dev/spidev0.0")]).unwrap();
        assert_eq!(config.speed_hz, None);

        let fastest = parse_options(&[("dev", "/dev/spidev0.0"), ("spispeed", "10000")]).unwrap();
        assert_eq!(fastest.speed_hz, Some(MAX_CLOCK_SPEED_HZ));
    }

    #[test]
    fn test_parse_options_rejects_bad_spispeed() {
        for value in ["10001", "0", "fast", "4294968"] {
            assert!(
                parse_options(&[("dev", "/dev/spidev0.0"), ("spispeed", value)]).is_err(),
                "spispeed={} accepted",
                value
            );
        }
    }

    #[test]
    fn test_chip_select_from_path() {
        assert_eq!(LinuxSpiConfig::new("/dev/spidev0.0").chip_select(), Some(0));
        assert_eq!(LinuxSpiConfig::new("/dev/my-display").chip_select(), None);
    }

    #[test]
    fn test_transfer_struct_layout() {
        assert_eq!(
            std::mem::size_of::<SpiIocTransfer>(),
            ioctl::SPI_IOC_TRANSFER_SIZE
        );
    }

    #[test]
    fn test_open_missing_device() {
        let err = LinuxSpi::open_device("/nonexistent/spidev9.9").err().unwrap();
        assert!(matches!(err, LinuxSpiError::OpenFailed { .. }));
        assert!(matches!(
            LinuxSpi::open(&LinuxSpiConfig::default()),
            Err(LinuxSpiError::NoDevice)
        ));
    }
}
