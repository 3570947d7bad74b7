//! Task model of the run-to-completion kernel
//!
//! A task is an object whose `run` method executes one step: the code
//! between two suspension points. The step ends by returning a [`Wait`]
//! naming the primitive the task suspends on.

use super::time::{Duration, Instant};

/// Static slot index of a task in the kernel task table
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskId(pub u8);

impl TaskId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum TaskPriority {
    Low = 0,
    Normal = 1,
    High = 2,
    Critical = 3,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TaskState {
    Ready,
    Running,
    Blocked,
    Suspended,
    Deleted,
}

/// Reason the kernel dispatched a task
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Wake {
    /// First step after spawning
    Start,
    /// Delay elapsed or the task yielded
    Scheduled,
    /// The awaited queue, mutex or notification became available
    Event,
    /// The wait timed out before the event occurred
    Timeout,
    /// Another task resumed this task out of suspension
    Resumed,
}

/// Condition a task waits for on a [`Waitable`]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Interest {
    Receive,
    Send,
    Lock,
}

/// A kernel object a task can block on
pub trait Waitable {
    fn poll_ready(&self, interest: Interest) -> bool;
}

/// Suspension point returned at the end of each task step
pub enum Wait<'a> {
    Yield,
    Delay(Duration),
    Event {
        source: &'a dyn Waitable,
        interest: Interest,
        timeout: Option<Duration>,
    },
    Notification {
        timeout: Option<Duration>,
    },
    /// The task deletes itself
    Exit,
}

impl<'a> Wait<'a> {
    #[inline]
    pub const fn millis(ms: u32) -> Self {
        Wait::Delay(Duration::from_millis(ms))
    }

    pub fn receive(source: &'a dyn Waitable) -> Self {
        Wait::Event { source, interest: Interest::Receive, timeout: None }
    }

    pub fn send(source: &'a dyn Waitable) -> Self {
        Wait::Event { source, interest: Interest::Send, timeout: None }
    }

    pub fn send_timeout(source: &'a dyn Waitable, ms: u32) -> Self {
        Wait::Event {
            source,
            interest: Interest::Send,
            timeout: Some(Duration::from_millis(ms)),
        }
    }

    pub fn lock(source: &'a dyn Waitable) -> Self {
        Wait::Event { source, interest: Interest::Lock, timeout: None }
    }

    pub const fn notification(timeout_ms: u32) -> Self {
        Wait::Notification { timeout: Some(Duration::from_millis(timeout_ms)) }
    }
}

pub trait Task<'a> {
    fn run(&mut self, cx: &mut Context<'_, 'a>) -> Wait<'a>;
}

#[derive(Copy, Clone)]
pub(crate) enum Blocker<'a> {
    None,
    Sleep,
    Event(&'a dyn Waitable, Interest),
    Notification,
}

pub(crate) struct TaskControl<'a> {
    pub name: &'static str,
    pub priority: TaskPriority,
    pub state: TaskState,
    pub wake: Wake,
    pub blocker: Blocker<'a>,
    pub deadline: Option<Instant>,
    pub notifications: u8,
}

impl<'a> TaskControl<'a> {
    pub fn new(name: &'static str, priority: TaskPriority) -> Self {
        Self {
            name,
            priority,
            state: TaskState::Ready,
            wake: Wake::Start,
            blocker: Blocker::None,
            deadline: None,
            notifications: 0,
        }
    }

    pub fn make_ready(&mut self, wake: Wake) {
        self.state = TaskState::Ready;
        self.wake = wake;
        self.blocker = Blocker::None;
        self.deadline = None;
    }

    pub fn block(&mut self, blocker: Blocker<'a>, deadline: Option<Instant>) {
        self.state = TaskState::Blocked;
        self.blocker = blocker;
        self.deadline = deadline;
    }
}

/// View of the kernel handed to a running task
pub struct Context<'k, 'a> {
    pub(crate) now: Instant,
    pub(crate) current: TaskId,
    pub(crate) wake: Wake,
    pub(crate) controls: &'k mut [Option<TaskControl<'a>>],
}

impl<'k, 'a> Context<'k, 'a> {
    #[inline]
    pub fn now(&self) -> Instant {
        self.now
    }

    #[inline]
    pub fn id(&self) -> TaskId {
        self.current
    }

    #[inline]
    pub fn wake(&self) -> Wake {
        self.wake
    }

    fn control(&mut self, id: TaskId) -> Option<&mut TaskControl<'a>> {
        self.controls
            .get_mut(id.index())
            .and_then(Option::as_mut)
            .filter(|control| control.state != TaskState::Deleted)
    }

    /// Increment the notification counter of `target`
    pub fn notify_give(&mut self, target: TaskId) -> bool {
        match self.control(target) {
            Some(control) => {
                control.notifications = control.notifications.saturating_add(1);
                true
            }
            None => false,
        }
    }

    /// Return the pending notification count of the running task and clear it
    pub fn take_notification(&mut self) -> u8 {
        let current = self.current;
        match self.control(current) {
            Some(control) => core::mem::take(&mut control.notifications),
            None => 0,
        }
    }

    pub fn suspend(&mut self, target: TaskId) -> bool {
        match self.control(target) {
            Some(control) => {
                control.state = TaskState::Suspended;
                control.blocker = Blocker::None;
                control.deadline = None;
                true
            }
            None => false,
        }
    }

    /// Make a suspended task ready; no effect on tasks that are not suspended
    pub fn resume(&mut self, target: TaskId) -> bool {
        match self.control(target) {
            Some(control) if control.state == TaskState::Suspended => {
                control.make_ready(Wake::Resumed);
                true
            }
            _ => false,
        }
    }
}
