//! Task descriptors and the callable shape stored in the task table

/// Work run by the dispatcher.
///
/// Implementors carry their own context; the scheduler only stores a
/// `&'static` reference and never owns or frees it.
pub trait Job: Sync {
    fn run(&self, ticks: u32);
}

impl<F> Job for F
where
    F: Fn(u32) + Sync,
{
    #[inline]
    fn run(&self, ticks: u32) {
        self(ticks)
    }
}

/// Plain function plus caller-owned context, called as `func(context, ticks)`.
pub struct WithContext<T: 'static> {
    func: fn(&'static T, u32),
    context: &'static T,
}

impl<T: Sync + 'static> WithContext<T> {
    pub const fn new(func: fn(&'static T, u32), context: &'static T) -> Self {
        Self { func, context }
    }

    pub fn context(&self) -> &'static T {
        self.context
    }
}

impl<T: Sync + 'static> Job for WithContext<T> {
    #[inline]
    fn run(&self, ticks: u32) {
        (self.func)(self.context, ticks)
    }
}

/// One slot of the task table.
///
/// A slot is occupied exactly when `job` is set. Empty slots hold
/// `Task::EMPTY`.
#[derive(Copy, Clone)]
pub struct Task {
    pub(crate) job: Option<&'static dyn Job>,
    pub(crate) delay: u32,
    pub(crate) period: u32,
    pub(crate) pending_runs: u8,
    // Registration stamp, never zero while occupied
    pub(crate) stamp: u16,
}

impl Task {
    pub const EMPTY: Task = Task {
        job: None,
        delay: 0,
        period: 0,
        pending_runs: 0,
        stamp: 0,
    };

    pub(crate) const fn new(job: &'static dyn Job, delay: u32, period: u32, stamp: u16) -> Self {
        Self {
            job: Some(job),
            delay,
            period,
            pending_runs: 0,
            stamp,
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.job.is_none()
    }

    /// Ticks left until the task is next due
    #[inline]
    pub fn delay(&self) -> u32 {
        self.delay
    }

    /// Re-arm interval; zero for one-shot tasks
    #[inline]
    pub fn period(&self) -> u32 {
        self.period
    }

    #[inline]
    pub fn is_one_shot(&self) -> bool {
        self.period == 0
    }

    /// Times the task came due without being dispatched yet
    #[inline]
    pub fn pending_runs(&self) -> u8 {
        self.pending_runs
    }

    /// One tick of the countdown. Returns true if the task came due.
    ///
    /// A task already sitting at zero delay stays due on every tick until
    /// dispatched.
    #[inline]
    pub(crate) fn advance(&mut self) -> bool {
        if self.job.is_none() {
            return false;
        }

        if self.delay > 0 {
            self.delay -= 1;
            if self.delay > 0 {
                return false;
            }
        }

        self.pending_runs = self.pending_runs.saturating_add(1);
        if self.period != 0 {
            self.delay = self.period;
        }
        true
    }

    /// Claims one pending run, returning the job to execute.
    #[inline]
    pub(crate) fn take_run(&mut self) -> Option<&'static dyn Job> {
        let job = self.job?;
        if self.pending_runs == 0 {
            return None;
        }
        self.pending_runs -= 1;
        Some(job)
    }
}

impl Default for Task {
    fn default() -> Self {
        Self::EMPTY
    }
}
