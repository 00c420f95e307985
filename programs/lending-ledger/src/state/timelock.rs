use anchor_lang::prelude::*;

use crate::errors::LedgerError;

/// A parameter value waiting out its activation delay
///
/// The value can be taken once, and only while
/// `created_at + delay <= now <= created_at + delay + validity_window`.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimelockedChange<T> {
    pub value: T,
    pub created_at: u64,
    pub delay: u64,
    pub validity_window: u64,
}

impl<T: Space> Space for TimelockedChange<T> {
    const INIT_SPACE: usize = T::INIT_SPACE + 8 + 8 + 8;
}

impl<T> TimelockedChange<T> {
    pub fn new(value: T, created_at: u64, delay: u64, validity_window: u64) -> Self {
        Self {
            value,
            created_at,
            delay,
            validity_window,
        }
    }

    /// First timestamp at which the change may be applied
    pub fn unlock_time(&self) -> Result<u64> {
        self.created_at
            .checked_add(self.delay)
            .ok_or_else(|| LedgerError::MathOverflow.into())
    }

    /// Last timestamp at which the change may be applied
    pub fn expiry_time(&self) -> Result<u64> {
        self.unlock_time()?
            .checked_add(self.validity_window)
            .ok_or_else(|| LedgerError::MathOverflow.into())
    }

    pub fn ensure_ready(&self, now: u64) -> Result<()> {
        require_gte!(now, self.unlock_time()?, LedgerError::ChangeNotReady);
        require_gte!(self.expiry_time()?, now, LedgerError::ChangeExpired);
        Ok(())
    }

    /// Take the value out, consuming the change
    pub fn consume(self, now: u64) -> Result<T> {
        self.ensure_ready(now)?;
        Ok(self.value)
    }
}

/// Consume the change waiting in `slot`, leaving the slot empty
///
/// On failure the slot is left untouched.
pub fn take_ready<T>(slot: &mut Option<TimelockedChange<T>>, now: u64) -> Result<T> {
    slot.as_ref()
        .ok_or(LedgerError::NoPendingChange)?
        .ensure_ready(now)?;

    let change = slot.take().ok_or(LedgerError::NoPendingChange)?;
    change.consume(now)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending() -> Option<TimelockedChange<u64>> {
        Some(TimelockedChange::new(42, 1_000, 100, 50))
    }

    #[test]
    fn window_bounds() {
        let change = TimelockedChange::new(7u64, 1_000, 100, 50);
        assert_eq!(change.unlock_time().unwrap(), 1_100);
        assert_eq!(change.expiry_time().unwrap(), 1_150);

        assert_eq!(change.consume(1_099).unwrap_err(), LedgerError::ChangeNotReady.into());
        assert_eq!(change.consume(1_100).unwrap(), 7);
        assert_eq!(change.consume(1_150).unwrap(), 7);
        assert_eq!(change.consume(1_151).unwrap_err(), LedgerError::ChangeExpired.into());
    }

    #[test]
    fn take_ready_consumes_exactly_once() {
        let mut slot = pending();
        assert_eq!(take_ready(&mut slot, 1_120).unwrap(), 42);
        assert!(slot.is_none());
        assert_eq!(
            take_ready(&mut slot, 1_120).unwrap_err(),
            LedgerError::NoPendingChange.into()
        );
    }

    #[test]
    fn take_ready_keeps_change_when_early() {
        let mut slot = pending();
        assert_eq!(
            take_ready(&mut slot, 1_000).unwrap_err(),
            LedgerError::ChangeNotReady.into()
        );
        assert_eq!(slot, pending());
    }

    #[test]
    fn take_ready_keeps_change_when_expired() {
        let mut slot = pending();
        assert!(take_ready(&mut slot, 5_000).is_err());
        assert!(slot.is_some());
    }

    #[test]
    fn space_counts_value_and_timestamps() {
        assert_eq!(<TimelockedChange<u64> as Space>::INIT_SPACE, 32);
    }
}
