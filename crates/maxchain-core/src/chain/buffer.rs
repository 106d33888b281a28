//! Reusable per-chain command buffer

#[cfg(feature = "alloc")]
use alloc::vec::Vec;

use zerocopy::IntoBytes;

use super::target::{slot_index, Target};
use crate::config::MAX_CHAIN_LENGTH;
use crate::error::{Error, Result};
use crate::wire::Command;

/// Chains up to this many devices keep their commands inline
pub const INLINE_COMMANDS: usize = 8;

#[derive(Debug, Clone)]
enum Storage {
    Inline(heapless::Vec<Command, INLINE_COMMANDS>),
    #[cfg(feature = "alloc")]
    Heap(Vec<Command>),
}

/// One transaction worth of commands, sized to the chain
///
/// The buffer is allocated once, when the driver is created, and reused for
/// every transaction. Short chains are stored inline, longer chains need the
/// `alloc` feature.
#[derive(Debug, Clone)]
pub struct CommandBuffer {
    storage: Storage,
}

impl CommandBuffer {
    /// Allocate a buffer of no-ops for a chain of `chain_length` devices
    pub fn new(chain_length: u8) -> Result<Self> {
        if chain_length == 0 || chain_length > MAX_CHAIN_LENGTH {
            return Err(Error::InvalidChainLength(chain_length));
        }
        let len = usize::from(chain_length);

        if len <= INLINE_COMMANDS {
            let mut commands = heapless::Vec::new();
            commands
                .resize(len, Command::NOOP)
                .map_err(|_| Error::OutOfMemory)?;
            return Ok(Self {
                storage: Storage::Inline(commands),
            });
        }

        #[cfg(feature = "alloc")]
        {
            let mut commands = Vec::new();
            commands
                .try_reserve_exact(len)
                .map_err(|_| Error::OutOfMemory)?;
            commands.resize(len, Command::NOOP);
            Ok(Self {
                storage: Storage::Heap(commands),
            })
        }

        #[cfg(not(feature = "alloc"))]
        {
            log::warn!(
                "chain of {} devices needs the alloc feature (inline limit is {})",
                chain_length,
                INLINE_COMMANDS
            );
            Err(Error::OutOfMemory)
        }
    }

    /// Number of devices the buffer covers
    pub fn chain_length(&self) -> u8 {
        // Bounded by MAX_CHAIN_LENGTH at construction
        self.commands().len() as u8
    }

    /// Whether the commands are stored inline
    pub fn is_inline(&self) -> bool {
        matches!(self.storage, Storage::Inline(_))
    }

    /// Commands in wire order (slot 0 is the last device in the chain)
    pub fn commands(&self) -> &[Command] {
        match &self.storage {
            Storage::Inline(commands) => commands.as_slice(),
            #[cfg(feature = "alloc")]
            Storage::Heap(commands) => commands.as_slice(),
        }
    }

    fn commands_mut(&mut self) -> &mut [Command] {
        match &mut self.storage {
            Storage::Inline(commands) => commands.as_mut_slice(),
            #[cfg(feature = "alloc")]
            Storage::Heap(commands) => commands.as_mut_slice(),
        }
    }

    /// Transaction bytes, ready to transmit
    pub fn as_bytes(&self) -> &[u8] {
        self.commands().as_bytes()
    }

    /// Reset every slot to a no-op
    pub fn clear(&mut self) {
        self.commands_mut().fill(Command::NOOP);
    }

    /// Build the transaction delivering `command` to `target`
    ///
    /// A broadcast fills every slot with `command`. A targeted command lands
    /// in the device's slot and every other slot becomes a no-op. On error
    /// the buffer is left untouched.
    pub fn load(&mut self, target: Target, command: Command) -> Result<()> {
        match target {
            Target::All => {
                self.commands_mut().fill(command);
                Ok(())
            }
            Target::Device(chain_id) => {
                let chain_length = self.chain_length();
                target.validate(chain_length)?;
                self.clear();
                self.commands_mut()[slot_index(chain_length, chain_id)] = command;
                Ok(())
            }
        }
    }

    /// Replace the command for one device, leaving the other slots as they are
    pub fn place(&mut self, chain_id: u8, command: Command) -> Result<()> {
        let chain_length = self.chain_length();
        Target::Device(chain_id).validate(chain_length)?;
        self.commands_mut()[slot_index(chain_length, chain_id)] = command;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::Register;

    #[test]
    fn test_targeted_digit() {
        let mut buffer = CommandBuffer::new(3).unwrap();
        buffer
            .load(Target::Device(2), Command::new(Register::Digit0, 0x08))
            .unwrap();
        assert_eq!(
            buffer.commands(),
            &[
                Command::NOOP,
                Command::from_bytes(0x01, 0x08),
                Command::NOOP
            ]
        );
        assert_eq!(buffer.as_bytes(), &[0x00, 0x00, 0x01, 0x08, 0x00, 0x00]);
    }

    #[test]
    fn test_broadcast_fills_every_slot() {
        let mut buffer = CommandBuffer::new(4).unwrap();
        buffer
            .load(Target::All, Command::new(Register::Intensity, 0x07))
            .unwrap();
        assert!(buffer
            .commands()
            .iter()
            .all(|c| *c == Command::from_bytes(0x0A, 0x07)));
    }

    #[test]
    fn test_targeted_clears_previous_transaction() {
        let mut buffer = CommandBuffer::new(4).unwrap();
        buffer
            .load(Target::All, Command::new(Register::Intensity, 0x07))
            .unwrap();
        buffer
            .load(Target::Device(4), Command::new(Register::ScanLimit, 0x03))
            .unwrap();
        assert_eq!(buffer.commands()[0], Command::from_bytes(0x0B, 0x03));
        assert!(buffer.commands()[1..].iter().all(Command::is_noop));
    }

    #[test]
    fn test_every_position_of_every_length() {
        #[cfg(feature = "alloc")]
        let longest = MAX_CHAIN_LENGTH;
        #[cfg(not(feature = "alloc"))]
        let longest = INLINE_COMMANDS as u8;

        let command = Command::new(Register::Digit4, 0x5A);
        for chain_length in 1..=longest {
            let mut buffer = CommandBuffer::new(chain_length).unwrap();
            assert_eq!(
                buffer.is_inline(),
                usize::from(chain_length) <= INLINE_COMMANDS
            );
            for chain_id in 1..=chain_length {
                buffer.load(Target::Device(chain_id), command).unwrap();
                let slot = usize::from(chain_length - chain_id);
                for (index, &word) in buffer.commands().iter().enumerate() {
                    if index == slot {
                        assert_eq!(word, command, "N={} k={}", chain_length, chain_id);
                    } else {
                        assert_eq!(word, Command::NOOP, "N={} k={}", chain_length, chain_id);
                    }
                }
            }
        }
    }

    #[test]
    fn test_single_device_chain() {
        let mut buffer = CommandBuffer::new(1).unwrap();
        buffer
            .load(Target::Device(1), Command::new(Register::Shutdown, 1))
            .unwrap();
        assert_eq!(buffer.as_bytes(), &[0x0C, 0x01]);
    }

    #[test]
    fn test_invalid_target_leaves_buffer() {
        let mut buffer = CommandBuffer::new(2).unwrap();
        buffer
            .load(Target::All, Command::new(Register::Intensity, 1))
            .unwrap();
        assert_eq!(
            buffer.load(Target::Device(3), Command::NOOP),
            Err(Error::InvalidChainId {
                chain_id: 3,
                chain_length: 2
            })
        );
        assert_eq!(buffer.as_bytes(), &[0x0A, 0x01, 0x0A, 0x01]);
    }

    #[test]
    fn test_place_keeps_other_slots() {
        let mut buffer = CommandBuffer::new(2).unwrap();
        buffer.place(1, Command::new(Register::Digit0, 1)).unwrap();
        buffer.place(2, Command::new(Register::Digit0, 2)).unwrap();
        assert_eq!(buffer.as_bytes(), &[0x01, 0x02, 0x01, 0x01]);
    }

    #[test]
    fn test_invalid_lengths() {
        assert_eq!(
            CommandBuffer::new(0).unwrap_err(),
            Error::InvalidChainLength(0)
        );
        assert_eq!(
            CommandBuffer::new(255).unwrap_err(),
            Error::InvalidChainLength(255)
        );
    }

    #[test]
    fn test_inline_storage() {
        assert!(CommandBuffer::new(8).unwrap().is_inline());
    }

    #[cfg(feature = "alloc")]
    #[test]
    fn test_heap_storage() {
        let mut buffer = CommandBuffer::new(254).unwrap();
        assert!(!buffer.is_inline());
        assert_eq!(buffer.chain_length(), 254);
        buffer
            .load(Target::Device(1), Command::new(Register::Digit7, 0x0F))
            .unwrap();
        assert_eq!(buffer.commands()[253], Command::from_bytes(0x08, 0x0F));
        assert_eq!(buffer.as_bytes().len(), 508);
    }

    #[cfg(not(feature = "alloc"))]
    #[test]
    fn test_long_chain_needs_alloc() {
        assert_eq!(CommandBuffer::new(9).unwrap_err(), Error::OutOfMemory);
    }
}
