//! Runs of consecutive digits across device boundaries

use crate::chain::Target;
use crate::error::{Error, Result};
use crate::wire::{Register, DIGITS_PER_DEVICE};

/// One digit register of one device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DigitPosition {
    /// 1-based chain position
    pub chain_id: u8,
    /// 1-based digit index
    pub digit: u8,
}

/// A validated run of digit positions
///
/// Positions are ordered device by device: digit 8 of one device is
/// followed by digit 1 of the next device up the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DigitRun {
    start: usize,
    len: usize,
}

impl DigitRun {
    /// Run of `len` digits starting at `digit` of `chain_id`
    ///
    /// The run must end on or before the last digit of the last device.
    pub fn new(chain_length: u8, chain_id: u8, digit: u8, len: usize) -> Result<Self> {
        Target::Device(chain_id).validate(chain_length)?;
        Register::digit(digit)?;

        let start = usize::from(chain_id - 1) * DIGITS_PER_DEVICE + usize::from(digit - 1);
        let available = usize::from(chain_length) * DIGITS_PER_DEVICE - start;
        if len > available {
            return Err(Error::DigitRunOverflow { len, available });
        }
        Ok(Self { start, len })
    }

    /// Number of positions in the run
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the run covers no digit at all
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Positions in run order
    pub fn positions(&self) -> impl Iterator<Item = DigitPosition> {
        (self.start..self.start + self.len).map(|index| DigitPosition {
            chain_id: (index / DIGITS_PER_DEVICE) as u8 + 1,
            digit: (index % DIGITS_PER_DEVICE) as u8 + 1,
        })
    }

    /// Digit indices touched by the run, ascending, each listed once
    pub fn digits(&self) -> impl Iterator<Item = u8> {
        let mask = self
            .positions()
            .fold(0u8, |mask, position| mask | 1 << (position.digit - 1));
        (1..=DIGITS_PER_DEVICE as u8).filter(move |digit| mask & (1 << (digit - 1)) != 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::vec::Vec;

    #[test]
    fn test_run_wraps_to_next_device() {
        let run = DigitRun::new(3, 1, 7, 4).unwrap();
        let positions: Vec<_> = run
            .positions()
            .map(|p| (p.chain_id, p.digit))
            .collect();
        assert_eq!(positions, [(1, 7), (1, 8), (2, 1), (2, 2)]);
        let digits: Vec<_> = run.digits().collect();
        assert_eq!(digits, [1, 2, 7, 8]);
    }

    #[test]
    fn test_run_must_fit_chain() {
        assert!(DigitRun::new(2, 2, 1, 8).is_ok());
        assert_eq!(
            DigitRun::new(2, 2, 2, 8),
            Err(Error::DigitRunOverflow {
                len: 8,
                available: 7
            })
        );
        assert_eq!(
            DigitRun::new(1, 1, 1, 9),
            Err(Error::DigitRunOverflow {
                len: 9,
                available: 8
            })
        );
    }

    #[test]
    fn test_run_start_validation() {
        assert_eq!(DigitRun::new(2, 1, 0, 1), Err(Error::InvalidDigit(0)));
        assert_eq!(DigitRun::new(2, 1, 9, 1), Err(Error::InvalidDigit(9)));
        assert_eq!(
            DigitRun::new(2, 3, 1, 1),
            Err(Error::InvalidChainId {
                chain_id: 3,
                chain_length: 2
            })
        );
        assert_eq!(
            DigitRun::new(2, 0, 1, 1),
            Err(Error::InvalidChainId {
                chain_id: 0,
                chain_length: 2
            })
        );
    }

    #[test]
    fn test_empty_run() {
        let run = DigitRun::new(1, 1, 8, 0).unwrap();
        assert!(run.is_empty());
        assert_eq!(run.digits().count(), 0);
    }

    #[test]
    fn test_long_run_touches_every_digit() {
        let run = DigitRun::new(4, 1, 3, 20).unwrap();
        assert_eq!(run.len(), 20);
        assert_eq!(run.digits().count(), 8);
    }
}
