// SPDX-FileCopyrightText: 2026 Chainvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use std::collections::VecDeque;
use std::sync::{Condvar, Mutex};

use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::command::Task;
use crate::lock;

/// FIFO of pending commands with a stop signal for the worker.
#[derive(Debug, Default)]
pub(crate) struct TaskQueue {
    tasks: Mutex<VecDeque<Task>>,
    ready: Condvar,
    stop: CancellationToken,
}

impl TaskQueue {
    /// Append a task. After [`TaskQueue::stop`] the task is dropped, which
    /// resolves its handle as discarded.
    pub(crate) fn push(&self, task: Task) {
        let mut tasks = lock(&self.tasks);
        if self.stop.is_cancelled() {
            debug!("keeper stopped, discarding command");
            return;
        }
        tasks.push_back(task);
        self.ready.notify_one();
    }

    /// Block until a task is available. `None` once the queue is stopped.
    pub(crate) fn next(&self) -> Option<Task> {
        let mut tasks = lock(&self.tasks);
        loop {
            if self.stop.is_cancelled() {
                return None;
            }
            if let Some(task) = tasks.pop_front() {
                return Some(task);
            }
            tasks = self
                .ready
                .wait(tasks)
                .unwrap_or_else(std::sync::PoisonError::into_inner);
        }
    }

    pub(crate) fn stop(&self) {
        let _tasks = lock(&self.tasks);
        self.stop.cancel();
        self.ready.notify_all();
    }

    /// Drop every task still waiting.
    pub(crate) fn clear(&self) -> usize {
        let mut tasks = lock(&self.tasks);
        let dropped = tasks.len();
        tasks.clear();
        dropped
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chainvault_core::Transition;
    use tokio::sync::oneshot;

    use super::*;
    use crate::command::{Command, CommandHandle, CommandStatus};

    fn task(command: Command) -> (Task, CommandHandle) {
        let (reply, receiver) = oneshot::channel();
        (Task { command, reply }, CommandHandle::pending(receiver))
    }

    #[test]
    fn tasks_come_out_in_order() {
        let queue = TaskQueue::default();
        let (first, _) = task(Command::Close);
        let (second, _) = task(Command::ResetSalts);
        queue.push(first);
        queue.push(second);

        assert!(matches!(queue.next().unwrap().command, Command::Close));
        assert!(matches!(queue.next().unwrap().command, Command::ResetSalts));
    }

    #[test]
    fn stopped_queue_discards() {
        let queue = TaskQueue::default();
        let (waiting, mut waiting_handle) = task(Command::Close);
        queue.push(waiting);
        queue.stop();

        let (late, mut late_handle) = task(Command::Close);
        queue.push(late);
        assert_eq!(late_handle.poll(), CommandStatus::Discarded);

        assert!(queue.next().is_none());
        assert_eq!(queue.clear(), 1);
        assert_eq!(waiting_handle.poll(), CommandStatus::Discarded);
    }

    #[test]
    fn stop_wakes_a_blocked_worker() {
        let queue = Arc::new(TaskQueue::default());
        let worker = {
            let queue = Arc::clone(&queue);
            std::thread::spawn(move || {
                let mut seen = 0;
                while let Some(task) = queue.next() {
                    task.reply.send(Transition::Success).unwrap();
                    seen += 1;
                }
                seen
            })
        };

        let (first, handle) = task(Command::Close);
        queue.push(first);
        assert_eq!(handle.wait(), Some(Transition::Success));

        queue.stop();
        assert_eq!(worker.join().unwrap(), 1);
    }
}
