//! Error types for maxchain-core
//!
//! This module provides a no_std compatible error type shared by the driver,
//! the command builders and every transport implementation.

use core::fmt;

/// Broad failure category of an [`Error`]
///
/// Callers that only care about *why* an operation failed, rather than the
/// exact variant, can match on this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A parameter was out of range or a required field was missing
    InvalidArgument,
    /// The driver is not in a state that allows the operation
    InvalidState,
    /// Memory for the command buffer could not be obtained
    ResourceExhausted,
    /// The underlying bus reported a failure
    Transport,
}

/// Core error type - no_std compatible, Copy for efficiency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    // Configuration errors
    /// Clock speed is zero or above the 10 MHz the controllers accept
    InvalidClockSpeed(u32),
    /// No chip-select line was configured
    MissingChipSelect,
    /// Chain length outside 1..=254
    InvalidChainLength(u8),
    /// Transaction queue size of zero
    InvalidQueueSize,

    // Argument errors
    /// Chain position outside 1..=chain_length (or 0 where broadcast is not allowed)
    InvalidChainId {
        /// Requested chain position
        chain_id: u8,
        /// Number of devices in the chain
        chain_length: u8,
    },
    /// Digit index outside 1..=8
    InvalidDigit(u8),
    /// Scan limit outside 1..=8 digits
    InvalidScanLimit(u8),
    /// Intensity level outside 0..=15
    InvalidIntensity(u8),
    /// Unknown operating mode value
    InvalidMode(u8),
    /// A run of digit codes would extend past the last digit of the chain
    DigitRunOverflow {
        /// Number of digit codes requested
        len: usize,
        /// Digit slots available from the starting position to the chain end
        available: usize,
    },
    /// A captured transaction had an odd number of bytes
    TruncatedCommand,

    // State errors
    /// The driver was already freed
    Detached,
    /// The shared driver lock was poisoned by a panicking holder
    LockPoisoned,

    // Resource errors
    /// The command buffer could not be allocated
    OutOfMemory,

    // Transport errors
    /// Registering the device on the bus failed
    AttachFailed,
    /// Removing the device from the bus failed
    DetachFailed,
    /// Exclusive bus access could not be obtained
    BusAcquireFailed,
    /// A transaction could not be transmitted
    TransmitFailed,
}

impl Error {
    /// Failure category of this error
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidClockSpeed(_)
            | Self::MissingChipSelect
            | Self::InvalidChainLength(_)
            | Self::InvalidQueueSize
            | Self::InvalidChainId { .. }
            | Self::InvalidDigit(_)
            | Self::InvalidScanLimit(_)
            | Self::InvalidIntensity(_)
            | Self::InvalidMode(_)
            | Self::DigitRunOverflow { .. }
            | Self::TruncatedCommand => ErrorKind::InvalidArgument,
            Self::Detached | Self::LockPoisoned => ErrorKind::InvalidState,
            Self::OutOfMemory => ErrorKind::ResourceExhausted,
            Self::AttachFailed
            | Self::DetachFailed
            | Self::BusAcquireFailed
            | Self::TransmitFailed => ErrorKind::Transport,
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidArgument => write!(f, "invalid argument"),
            Self::InvalidState => write!(f, "invalid state"),
            Self::ResourceExhausted => write!(f, "out of memory"),
            Self::Transport => write!(f, "transport failure"),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidClockSpeed(hz) => {
                write!(f, "invalid clock speed {} Hz (must be 1..=10000000)", hz)
            }
            Self::MissingChipSelect => write!(f, "no chip-select line configured"),
            Self::InvalidChainLength(len) => {
                write!(f, "invalid chain length {} (must be 1..=254)", len)
            }
            Self::InvalidQueueSize => write!(f, "transaction queue size must be non-zero"),
            Self::InvalidChainId {
                chain_id,
                chain_length,
            } => write!(
                f,
                "chain id {} out of range (chain has {} devices)",
                chain_id, chain_length
            ),
            Self::InvalidDigit(digit) => write!(f, "invalid digit {} (must be 1..=8)", digit),
            Self::InvalidScanLimit(digits) => {
                write!(f, "invalid scan limit {} (must be 1..=8 digits)", digits)
            }
            Self::InvalidIntensity(level) => {
                write!(f, "invalid intensity {} (must be 0..=15)", level)
            }
            Self::InvalidMode(mode) => write!(f, "invalid operating mode {}", mode),
            Self::DigitRunOverflow { len, available } => write!(
                f,
                "{} digit codes do not fit, only {} digits left in the chain",
                len, available
            ),
            Self::TruncatedCommand => write!(f, "trailing byte does not form a full command"),
            Self::Detached => write!(f, "driver was already freed"),
            Self::LockPoisoned => write!(f, "driver lock poisoned"),
            Self::OutOfMemory => write!(f, "out of memory for command buffer"),
            Self::AttachFailed => write!(f, "failed to attach device to bus"),
            Self::DetachFailed => write!(f, "failed to detach device from bus"),
            Self::BusAcquireFailed => write!(f, "failed to acquire bus"),
            Self::TransmitFailed => write!(f, "transmit failed"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result type alias using the core Error type
pub type Result<T> = core::result::Result<T, Error>;
