//! Fixed-priority task dispatcher
//!
//! Every dispatch picks the highest-priority ready task; tasks of equal
//! priority take turns. A task runs one step at a time, so a higher
//! priority task waits at most for the step that is currently executing.

use super::task::{Blocker, Context, Task, TaskControl, TaskId, TaskPriority, TaskState, Wait, Wake};
use super::time::Instant;

/// Upper bound of steps executed by a single [`Kernel::poll`]
const POLL_STEP_LIMIT: usize = 1024;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SpawnError {
    InvalidId,
    SlotOccupied,
}

pub struct Kernel<'a, const N: usize> {
    tasks: [Option<&'a mut dyn Task<'a>>; N],
    controls: [Option<TaskControl<'a>>; N],
    last: usize,
    now: Instant,
}

impl<'a, const N: usize> Kernel<'a, N> {
    pub fn new() -> Self {
        Self {
            tasks: core::array::from_fn(|_| None),
            controls: core::array::from_fn(|_| None),
            last: N.saturating_sub(1),
            now: Instant::default(),
        }
    }

    pub fn spawn(
        &mut self,
        id: TaskId,
        name: &'static str,
        priority: TaskPriority,
        task: &'a mut dyn Task<'a>,
    ) -> Result<TaskId, SpawnError> {
        let index = id.index();
        if index >= N {
            return Err(SpawnError::InvalidId);
        }
        if self.tasks[index].is_some() {
            return Err(SpawnError::SlotOccupied);
        }

        self.tasks[index] = Some(task);
        self.controls[index] = Some(TaskControl::new(name, priority));
        log::debug!("spawned task {} ({})", name, index);
        Ok(id)
    }

    pub fn state(&self, id: TaskId) -> Option<TaskState> {
        self.controls.get(id.index())?.as_ref().map(|control| control.state)
    }

    pub fn pending_notifications(&self, id: TaskId) -> Option<u8> {
        self.controls.get(id.index())?.as_ref().map(|control| control.notifications)
    }

    #[inline]
    pub fn now(&self) -> Instant {
        self.now
    }

    /// Dispatch one task step at time `now`; returns false when no task is ready
    pub fn step(&mut self, now: Instant) -> bool {
        self.now = now;
        self.wake_blocked(now);

        let Some(index) = self.select() else {
            return false;
        };
        let Some(task) = self.tasks[index].as_mut() else {
            return false;
        };
        let wake = match self.controls[index].as_mut() {
            Some(control) => {
                control.state = TaskState::Running;
                control.wake
            }
            None => return false,
        };

        let mut cx = Context {
            now,
            current: TaskId(index as u8),
            wake,
            controls: &mut self.controls,
        };
        let wait = task.run(&mut cx);

        self.last = index;
        self.apply(index, wait, now);
        true
    }

    /// Run ready tasks until all of them are waiting; returns the number of steps
    pub fn poll(&mut self, now: Instant) -> usize {
        let mut steps = 0;
        while steps < POLL_STEP_LIMIT && self.step(now) {
            steps += 1;
        }
        steps
    }

    pub fn run<C, I>(&mut self, mut clock: C, mut idle: I) -> !
    where
        C: FnMut() -> Instant,
        I: FnMut(),
    {
        loop {
            if !self.step(clock()) {
                idle();
            }
        }
    }

    fn wake_blocked(&mut self, now: Instant) {
        for control in self.controls.iter_mut().flatten() {
            if control.state != TaskState::Blocked {
                continue;
            }

            let event = match control.blocker {
                Blocker::Event(source, interest) => source.poll_ready(interest),
                Blocker::Notification => control.notifications > 0,
                Blocker::Sleep | Blocker::None => false,
            };

            if event {
                control.make_ready(Wake::Event);
            } else if control.deadline.map_or(false, |deadline| now >= deadline) {
                let wake = match control.blocker {
                    Blocker::Sleep => Wake::Scheduled,
                    _ => Wake::Timeout,
                };
                control.make_ready(wake);
            }
        }
    }

    fn select(&self) -> Option<usize> {
        let mut best: Option<(usize, TaskPriority)> = None;

        // Start after the last dispatched slot so equal priorities rotate
        for offset in 1..=N {
            let index = (self.last + offset) % N;
            if let Some(control) = &self.controls[index] {
                let better = best.map_or(true, |(_, priority)| control.priority > priority);
                if control.state == TaskState::Ready && better {
                    best = Some((index, control.priority));
                }
            }
        }

        best.map(|(index, _)| index)
    }

    fn apply(&mut self, index: usize, wait: Wait<'a>, now: Instant) {
        let Some(control) = self.controls[index].as_mut() else {
            return;
        };
        if control.state == TaskState::Suspended {
            return;
        }

        match wait {
            Wait::Yield => control.make_ready(Wake::Scheduled),
            Wait::Delay(delay) if delay.is_zero() => control.make_ready(Wake::Scheduled),
            Wait::Delay(delay) => control.block(Blocker::Sleep, Some(now + delay)),
            Wait::Event { source, interest, timeout } => {
                control.block(Blocker::Event(source, interest), timeout.map(|t| now + t))
            }
            Wait::Notification { timeout } => {
                control.block(Blocker::Notification, timeout.map(|t| now + t))
            }
            Wait::Exit => {
                control.state = TaskState::Deleted;
                log::debug!("task {} exited", control.name);
                self.tasks[index] = None;
            }
        }
    }
}

impl<'a, const N: usize> Default for Kernel<'a, N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for registering a task in its kernel slot
pub struct TaskBuilder<'a> {
    id: TaskId,
    task: &'a mut dyn Task<'a>,
    name: &'static str,
    priority: TaskPriority,
}

impl<'a> TaskBuilder<'a> {
    pub fn new(id: TaskId, task: &'a mut dyn Task<'a>) -> Self {
        Self {
            id,
            task,
            name: "task",
            priority: TaskPriority::Low,
        }
    }

    pub fn name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    pub fn priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn spawn<const N: usize>(self, kernel: &mut Kernel<'a, N>) -> Result<TaskId, SpawnError> {
        kernel.spawn(self.id, self.name, self.priority, self.task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rtos::{Duration, Queue};
    use core::cell::RefCell;

    type Trace = RefCell<Vec<(&'static str, u32, Wake)>>;

    /// Records each step and then waits the configured number of ms
    struct Periodic<'t> {
        name: &'static str,
        period: u32,
        trace: &'t Trace,
    }

    impl<'a, 't: 'a> Task<'a> for Periodic<'t> {
        fn run(&mut self, cx: &mut Context<'_, 'a>) -> Wait<'a> {
            self.trace.borrow_mut().push((self.name, cx.now().as_millis(), cx.wake()));
            Wait::millis(self.period)
        }
    }

    fn names(trace: &Trace) -> Vec<&'static str> {
        trace.borrow().iter().map(|(name, _, _)| *name).collect()
    }

    #[test]
    fn higher_priority_runs_first() {
        let trace = Trace::default();
        let mut low = Periodic { name: "low", period: 10, trace: &trace };
        let mut high = Periodic { name: "high", period: 10, trace: &trace };
        let mut kernel: Kernel<'_, 4> = Kernel::new();
        TaskBuilder::new(TaskId(0), &mut low).name("low").spawn(&mut kernel).unwrap();
        TaskBuilder::new(TaskId(1), &mut high)
            .name("high")
            .priority(TaskPriority::Critical)
            .spawn(&mut kernel)
            .unwrap();

        assert_eq!(kernel.poll(Instant::from_millis(0)), 2);
        assert_eq!(names(&trace), ["high", "low"]);
    }

    #[test]
    fn equal_priorities_take_turns() {
        struct Spinner<'t> {
            name: &'static str,
            trace: &'t Trace,
        }

        impl<'a, 't: 'a> Task<'a> for Spinner<'t> {
            fn run(&mut self, cx: &mut Context<'_, 'a>) -> Wait<'a> {
                self.trace.borrow_mut().push((self.name, cx.now().as_millis(), cx.wake()));
                Wait::Yield
            }
        }

        let trace = Trace::default();
        let mut a = Spinner { name: "a", trace: &trace };
        let mut b = Spinner { name: "b", trace: &trace };
        let mut kernel: Kernel<'_, 2> = Kernel::new();
        kernel.spawn(TaskId(0), "a", TaskPriority::Low, &mut a).unwrap();
        kernel.spawn(TaskId(1), "b", TaskPriority::Low, &mut b).unwrap();

        for _ in 0..4 {
            assert!(kernel.step(Instant::from_millis(0)));
        }
        assert_eq!(names(&trace), ["a", "b", "a", "b"]);
    }

    #[test]
    fn delay_wakes_at_deadline() {
        let trace = Trace::default();
        let mut task = Periodic { name: "p", period: 75, trace: &trace };
        let mut kernel: Kernel<'_, 1> = Kernel::new();
        kernel.spawn(TaskId(0), "p", TaskPriority::Low, &mut task).unwrap();

        for ms in 0..=150 {
            kernel.poll(Instant::from_millis(ms));
        }

        let runs: Vec<_> = trace.borrow().iter().map(|(_, t, w)| (*t, *w)).collect();
        assert_eq!(runs, [(0, Wake::Start), (75, Wake::Scheduled), (150, Wake::Scheduled)]);
    }

    #[test]
    fn spawn_rejects_bad_slots() {
        let trace = Trace::default();
        let mut a = Periodic { name: "a", period: 1, trace: &trace };
        let mut b = Periodic { name: "b", period: 1, trace: &trace };
        let mut c = Periodic { name: "c", period: 1, trace: &trace };
        let mut kernel: Kernel<'_, 1> = Kernel::new();

        assert_eq!(kernel.spawn(TaskId(0), "a", TaskPriority::Low, &mut a), Ok(TaskId(0)));
        assert_eq!(
            kernel.spawn(TaskId(0), "b", TaskPriority::Low, &mut b),
            Err(SpawnError::SlotOccupied)
        );
        assert_eq!(
            kernel.spawn(TaskId(1), "c", TaskPriority::Low, &mut c),
            Err(SpawnError::InvalidId)
        );
    }

    /// Takes notifications with a timeout and records what it got
    struct Listener<'t> {
        armed: bool,
        seen: &'t RefCell<Vec<(u32, u8)>>,
    }

    impl<'a, 't: 'a> Task<'a> for Listener<'t> {
        fn run(&mut self, cx: &mut Context<'_, 'a>) -> Wait<'a> {
            if self.armed {
                let count = cx.take_notification();
                self.seen.borrow_mut().push((cx.now().as_millis(), count));
            }
            self.armed = true;
            Wait::notification(100)
        }
    }

    struct Notifier {
        target: TaskId,
        at: u32,
    }

    impl<'a> Task<'a> for Notifier {
        fn run(&mut self, cx: &mut Context<'_, 'a>) -> Wait<'a> {
            if cx.now().as_millis() >= self.at {
                cx.notify_give(self.target);
                return Wait::Exit;
            }
            Wait::millis(self.at - cx.now().as_millis())
        }
    }

    #[test]
    fn notification_take_times_out_or_receives() {
        let seen = RefCell::new(Vec::new());
        let mut listener = Listener { armed: false, seen: &seen };
        let mut notifier = Notifier { target: TaskId(0), at: 130 };
        let mut kernel: Kernel<'_, 2> = Kernel::new();
        kernel.spawn(TaskId(0), "listener", TaskPriority::Low, &mut listener).unwrap();
        kernel.spawn(TaskId(1), "notifier", TaskPriority::Low, &mut notifier).unwrap();

        for ms in 0..=250 {
            kernel.poll(Instant::from_millis(ms));
        }

        // Timeout at 100, notification at 130, timeout again 100 ms later
        assert_eq!(*seen.borrow(), [(100, 0), (130, 1), (230, 0)]);
        assert_eq!(kernel.state(TaskId(1)), Some(TaskState::Deleted));
    }

    struct Parker {
        target: TaskId,
    }

    impl<'a> Task<'a> for Parker {
        fn run(&mut self, cx: &mut Context<'_, 'a>) -> Wait<'a> {
            match cx.now().as_millis() {
                0 => {
                    assert!(cx.suspend(self.target));
                    Wait::millis(200)
                }
                _ => {
                    assert!(cx.resume(self.target));
                    // A second resume has nothing to do
                    assert!(!cx.resume(self.target));
                    Wait::Exit
                }
            }
        }
    }

    #[test]
    fn suspended_task_is_parked_until_resumed() {
        let trace = Trace::default();
        let mut worker = Periodic { name: "worker", period: 75, trace: &trace };
        let mut parker = Parker { target: TaskId(0) };
        let mut kernel: Kernel<'_, 2> = Kernel::new();
        kernel.spawn(TaskId(0), "worker", TaskPriority::Low, &mut worker).unwrap();
        kernel
            .spawn(TaskId(1), "parker", TaskPriority::Critical, &mut parker)
            .unwrap();

        for ms in 0..=260 {
            kernel.poll(Instant::from_millis(ms));
            if ms == 100 {
                assert_eq!(kernel.state(TaskId(0)), Some(TaskState::Suspended));
            }
        }

        let runs: Vec<_> = trace.borrow().iter().map(|(_, t, w)| (*t, *w)).collect();
        assert_eq!(runs, [(200, Wake::Resumed)]);
    }

    struct Producer<'q> {
        queue: &'q Queue<u8, 1>,
        next: u8,
    }

    impl<'a, 'q: 'a> Task<'a> for Producer<'q> {
        fn run(&mut self, _cx: &mut Context<'_, 'a>) -> Wait<'a> {
            if self.next == 3 {
                return Wait::Exit;
            }
            match self.queue.try_send(self.next) {
                Ok(()) => {
                    self.next += 1;
                    Wait::Yield
                }
                Err(_) => Wait::send(self.queue),
            }
        }
    }

    struct Consumer<'q> {
        queue: &'q Queue<u8, 1>,
        got: &'q RefCell<Vec<(u32, u8)>>,
    }

    impl<'a, 'q: 'a> Task<'a> for Consumer<'q> {
        fn run(&mut self, cx: &mut Context<'_, 'a>) -> Wait<'a> {
            if cx.wake() == Wake::Start {
                return Wait::millis(10);
            }
            match self.queue.try_receive() {
                Some(value) => {
                    self.got.borrow_mut().push((cx.now().as_millis(), value));
                    Wait::millis(10)
                }
                None => Wait::receive(self.queue),
            }
        }
    }

    #[test]
    fn full_queue_blocks_producer() {
        let queue: Queue<u8, 1> = Queue::new();
        let got = RefCell::new(Vec::new());
        let mut producer = Producer { queue: &queue, next: 0 };
        let mut consumer = Consumer { queue: &queue, got: &got };
        let mut kernel: Kernel<'_, 2> = Kernel::new();
        kernel.spawn(TaskId(0), "producer", TaskPriority::Low, &mut producer).unwrap();
        kernel.spawn(TaskId(1), "consumer", TaskPriority::Low, &mut consumer).unwrap();

        for ms in 0..=40 {
            kernel.poll(Instant::from_millis(ms));
        }

        assert_eq!(*got.borrow(), [(10, 0), (20, 1), (30, 2)]);
        assert_eq!(kernel.state(TaskId(0)), Some(TaskState::Deleted));
        assert_eq!(kernel.now(), Instant::from_millis(0) + Duration::from_millis(40));
    }
}
