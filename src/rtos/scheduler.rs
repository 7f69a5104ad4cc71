//! Cooperative tick-driven task scheduler
//!
//! A fixed table of tasks, advanced by the tick interrupt and run to
//! completion, one after another, from the main loop. There is no
//! preemption between tasks and no priority other than slot order.

use crate::config::MAX_TASKS;
use crate::drivers::StatusDisplay;
use crate::hal::Idle;
use crate::{log_debug, log_error, log_warn};

use super::error::SchedulerError;
use super::status::{DefaultLatch, Report};
use super::task::{Job, Task};

/// Slot index handed out by `add_task`. Valid until the slot is deleted.
pub type TaskId = usize;

pub struct Scheduler<R: Report = DefaultLatch, const N: usize = MAX_TASKS> {
    tasks: [Task; N],
    status: R,
    next_stamp: u16,
}

impl<const N: usize> Scheduler<DefaultLatch, N> {
    pub const fn new() -> Self {
        Self::with_status(DefaultLatch::new())
    }
}

impl<const N: usize> Default for Scheduler<DefaultLatch, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Report, const N: usize> Scheduler<R, N> {
    pub const fn with_status(status: R) -> Self {
        Self {
            tasks: [Task::EMPTY; N],
            status,
            next_stamp: 1,
        }
    }

    /// Empty the task table and clear the error status.
    ///
    /// Every slot goes through the normal delete path, so deleting the
    /// already empty ones latches `CannotDelete`; that is expected and
    /// cleared at the end.
    pub fn init(&mut self) {
        for index in 0..N {
            let _ = self.delete_slot(index);
        }
        self.status.clear();
    }

    /// Register `job` to first run after `delay` ticks, then every
    /// `period` ticks. A zero period makes it a one-shot task.
    pub fn add_task(
        &mut self,
        job: &'static dyn Job,
        delay: u32,
        period: u32,
    ) -> Result<TaskId, SchedulerError> {
        let Some(index) = self.tasks.iter().position(Task::is_empty) else {
            log_warn!("task table full, {} slots in use", N);
            return Err(self.fail(SchedulerError::TooManyTasks));
        };

        let stamp = self.next_stamp();
        self.tasks[index] = Task::new(job, delay, period, stamp);
        log_debug!("task {} added, delay {} period {}", index, delay, period);
        Ok(index)
    }

    /// Remove the task in slot `index`. The job itself is left alone.
    pub fn delete_task(&mut self, index: TaskId) -> Result<(), SchedulerError> {
        self.delete_slot(index).map_err(|error| {
            log_warn!("cannot delete task {}", index);
            error
        })
    }

    /// Change the re-arm interval of a task.
    ///
    /// The current countdown is left untouched, so the new period only
    /// applies from the next time the task comes due.
    pub fn modify_task_period(&mut self, index: TaskId, period: u32) -> Result<(), SchedulerError> {
        if let Some(task) = self.tasks.get_mut(index).filter(|task| !task.is_empty()) {
            task.period = period;
            return Ok(());
        }

        log_warn!("cannot modify task {}", index);
        Err(self.fail(SchedulerError::InvalidSlot))
    }

    /// Advance every task by one tick. Runs in the timer interrupt: no
    /// task bodies, no logging.
    pub fn tick(&mut self) {
        for task in self.tasks.iter_mut() {
            task.advance();
        }
    }

    /// Run every due task once, in slot order. Returns how many ran.
    pub fn dispatch_tasks(&mut self, ticks: u32) -> usize {
        let mut ran = 0;
        for index in 0..N {
            if let Some((job, stamp)) = self.take_due(index) {
                job.run(ticks);
                self.retire(index, stamp);
                ran += 1;
            }
        }
        ran
    }

    /// Advance the status latch by one pass and push changes to `display`.
    pub fn report_status<D: StatusDisplay>(&mut self, display: &mut D) {
        if let Some(pattern) = self.status.update() {
            show_status(display, pattern);
        }
    }

    /// One main-loop iteration: run due tasks, report status, then idle
    /// until the next interrupt.
    pub fn dispatch<D, I>(&mut self, ticks: u32, display: &mut D, idle: &mut I)
    where
        D: StatusDisplay,
        I: Idle,
    {
        self.dispatch_tasks(ticks);
        self.report_status(display);
        nb::block!(idle.wait_for_interrupt()).ok();
    }

    pub fn task(&self, index: TaskId) -> Option<&Task> {
        self.tasks.get(index).filter(|task| !task.is_empty())
    }

    /// First occupied slot matching `predicate`
    pub fn find<F>(&self, mut predicate: F) -> Option<TaskId>
    where
        F: FnMut(&Task) -> bool,
    {
        self.tasks
            .iter()
            .position(|task| !task.is_empty() && predicate(task))
    }

    pub fn task_count(&self) -> usize {
        self.tasks.iter().filter(|task| !task.is_empty()).count()
    }

    pub fn is_full(&self) -> bool {
        self.tasks.iter().all(|task| !task.is_empty())
    }

    #[inline]
    pub const fn capacity(&self) -> usize {
        N
    }

    #[inline]
    pub fn status(&self) -> &R {
        &self.status
    }

    #[inline]
    pub fn last_error(&self) -> Option<SchedulerError> {
        self.status.current()
    }

    /// Claim one pending run of slot `index`.
    pub(crate) fn take_due(&mut self, index: TaskId) -> Option<(&'static dyn Job, u16)> {
        let task = self.tasks.get_mut(index)?;
        let job = task.take_run()?;
        Some((job, task.stamp))
    }

    /// Drop a one-shot task after its run, unless the slot was deleted or
    /// reused while the job was running.
    pub(crate) fn retire(&mut self, index: TaskId, stamp: u16) {
        if let Some(task) = self.tasks.get_mut(index) {
            if task.stamp == stamp && !task.is_empty() && task.is_one_shot() {
                *task = Task::EMPTY;
            }
        }
    }

    pub(crate) fn update_status(&mut self) -> Option<u8> {
        self.status.update()
    }

    fn delete_slot(&mut self, index: TaskId) -> Result<(), SchedulerError> {
        match self.tasks.get_mut(index) {
            Some(task) => {
                let was_empty = task.is_empty();
                *task = Task::EMPTY;
                if was_empty {
                    Err(self.fail(SchedulerError::CannotDelete))
                } else {
                    Ok(())
                }
            }
            None => Err(self.fail(SchedulerError::CannotDelete)),
        }
    }

    fn fail(&mut self, error: SchedulerError) -> SchedulerError {
        self.status.record(error);
        error
    }

    fn next_stamp(&mut self) -> u16 {
        let stamp = self.next_stamp;
        self.next_stamp = match stamp.wrapping_add(1) {
            0 => 1,
            next => next,
        };
        stamp
    }
}

pub(crate) fn show_status<D: StatusDisplay>(display: &mut D, pattern: u8) {
    log_debug!("status port <- {}", pattern);
    if display.show(pattern).is_err() {
        log_error!("status display write failed");
    }
}

/// Fluent task registration
///
/// ```ignore
/// TaskBuilder::new(&BLINK)
///     .delay(300)
///     .period(1000)
///     .add(&mut scheduler)?;
/// ```
pub struct TaskBuilder {
    job: &'static dyn Job,
    delay: u32,
    period: u32,
}

impl TaskBuilder {
    pub fn new(job: &'static dyn Job) -> Self {
        Self {
            job,
            delay: 0,
            period: 0,
        }
    }

    pub fn delay(mut self, delay: u32) -> Self {
        self.delay = delay;
        self
    }

    pub fn period(mut self, period: u32) -> Self {
        self.period = period;
        self
    }

    pub fn add<R: Report, const N: usize>(
        self,
        scheduler: &mut Scheduler<R, N>,
    ) -> Result<TaskId, SchedulerError> {
        scheduler.add_task(self.job, self.delay, self.period)
    }

    /// Register with the global scheduler
    pub fn spawn(self) -> Result<TaskId, SchedulerError> {
        crate::os::add_task(self.job, self.delay, self.period)
    }
}
