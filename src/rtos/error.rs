//! Scheduler error codes

use core::fmt;

/// Errors reported by the task lifecycle operations.
///
/// The discriminant is the code shown on the status port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum SchedulerError {
    /// Every slot in the task table is occupied
    TooManyTasks = 1,
    /// Delete of an empty or out-of-range slot
    CannotDelete = 2,
    /// Modify of an empty or out-of-range slot
    InvalidSlot = 3,
}

impl SchedulerError {
    #[inline]
    pub const fn code(self) -> u8 {
        self as u8
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            SchedulerError::TooManyTasks => "too many tasks",
            SchedulerError::CannotDelete => "cannot delete task",
            SchedulerError::InvalidSlot => "invalid task slot",
        }
    }
}

impl fmt::Display for SchedulerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ufmt::uDisplay for SchedulerError {
    fn fmt<W>(&self, f: &mut ufmt::Formatter<'_, W>) -> Result<(), W::Error>
    where
        W: ufmt::uWrite + ?Sized,
    {
        f.write_str(self.as_str())
    }
}
