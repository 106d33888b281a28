//! Command addressing

use core::fmt;

use crate::error::{Error, Result};

/// Devices a command is meant for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    /// Every device in the chain
    All,
    /// One device, by 1-based chain position counted from the bus host
    Device(u8),
}

impl Target {
    /// Chain position reserved for broadcast
    pub const BROADCAST_ID: u8 = 0;

    /// Target for a chain id where 0 means broadcast
    pub const fn from_chain_id(chain_id: u8) -> Self {
        if chain_id == Self::BROADCAST_ID {
            Self::All
        } else {
            Self::Device(chain_id)
        }
    }

    /// Check the target exists in a chain of `chain_length` devices
    pub const fn validate(self, chain_length: u8) -> Result<()> {
        match self {
            Self::All => Ok(()),
            Self::Device(chain_id) if chain_id >= 1 && chain_id <= chain_length => Ok(()),
            Self::Device(chain_id) => Err(Error::InvalidChainId {
                chain_id,
                chain_length,
            }),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "all devices"),
            Self::Device(chain_id) => write!(f, "device {}", chain_id),
        }
    }
}

/// Transaction slot holding the command for `chain_id`
///
/// `chain_id` must already be validated against `chain_length`.
pub const fn slot_index(chain_length: u8, chain_id: u8) -> usize {
    (chain_length - chain_id) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_mapping() {
        assert_eq!(slot_index(3, 3), 0);
        assert_eq!(slot_index(3, 2), 1);
        assert_eq!(slot_index(3, 1), 2);
        assert_eq!(slot_index(1, 1), 0);
        assert_eq!(slot_index(254, 1), 253);
    }

    #[test]
    fn test_target_validation() {
        assert_eq!(Target::from_chain_id(0), Target::All);
        assert_eq!(Target::from_chain_id(2), Target::Device(2));
        assert_eq!(Target::All.validate(1), Ok(()));
        assert_eq!(Target::Device(4).validate(4), Ok(()));
        assert_eq!(
            Target::Device(5).validate(4),
            Err(Error::InvalidChainId {
                chain_id: 5,
                chain_length: 4
            })
        );
        assert!(Target::Device(0).validate(4).is_err());
    }
}
