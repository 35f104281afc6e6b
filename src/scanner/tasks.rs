//! Task generation and the shared work queue.

use crate::types::{HostTarget, ProbeTask};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

/// Build the full task set: hosts x users x passwords.
///
/// With either credential list empty, one liveness-only task per host is
/// generated instead. The set is fixed here, before any worker starts.
pub fn build_tasks(
    hosts: &[HostTarget],
    users: &[String],
    passwords: &[String],
) -> Vec<ProbeTask> {
    let mut tasks = Vec::new();

    for host in hosts {
        if users.is_empty() || passwords.is_empty() {
            tasks.push(ProbeTask::liveness(host.clone()));
        } else {
            for user in users {
                for password in passwords {
                    tasks.push(ProbeTask::with_credentials(host.clone(), user, password));
                }
            }
        }
    }

    tasks
}

/// The FIFO all workers pull from.
///
/// Seeded once and then closed: the sender is dropped immediately, so a
/// drained queue is itself the shutdown signal. `next` returning `None`
/// tells a worker to exit; no sentinel values are enqueued.
pub struct TaskQueue {
    receiver: Arc<Mutex<mpsc::UnboundedReceiver<ProbeTask>>>,
}

impl TaskQueue {
    /// Create a queue holding the complete task set.
    pub fn seed(tasks: Vec<ProbeTask>) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        for task in tasks {
            sender.send(task).expect("receiver held by the queue");
        }

        Self {
            receiver: Arc::new(Mutex::new(receiver)),
        }
    }

    /// Pull the next task; `None` once the queue is drained.
    pub async fn next(&self) -> Option<ProbeTask> {
        self.receiver.lock().await.recv().await
    }
}

impl Clone for TaskQueue {
    fn clone(&self) -> Self {
        Self {
            receiver: Arc::clone(&self.receiver),
        }
    }
}
