// Command Table - bounded slot registry

use super::collector::CollectorExit;
use super::constants::FIRST_COMMAND_ID;
use super::stop_signal::StopSender;
use crate::domain::{Command, CommandId};
use crate::error::{AppError, Result};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::JoinHandle;

/// Running collector bound to a command
pub struct CollectorHandle {
    pub stop: StopSender,
    pub task: JoinHandle<CollectorExit>,
}

#[derive(Default)]
struct CollectorSlot {
    handle: Option<CollectorHandle>,
    stopping: bool,
}

/// A command resident in a table slot, plus the handle to its collector
pub struct TrackedCommand {
    slot: usize,
    command: Arc<Command>,
    collector: Mutex<CollectorSlot>,
}

impl std::fmt::Debug for TrackedCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackedCommand")
            .field("slot", &self.slot)
            .field("id", &self.command.id())
            .finish_non_exhaustive()
    }
}

impl TrackedCommand {
    pub fn slot(&self) -> usize {
        self.slot
    }

    pub fn command(&self) -> &Arc<Command> {
        &self.command
    }

    pub fn id(&self) -> CommandId {
        self.command.id()
    }

    fn collector_slot(&self) -> MutexGuard<'_, CollectorSlot> {
        self.collector.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Bind the collector started by Launch.
    ///
    /// If a Stop already claimed this command, the collector is told to stop
    /// right away instead of being stored.
    pub fn attach_collector(&self, handle: CollectorHandle) {
        let mut slot = self.collector_slot();
        if slot.stopping {
            handle.stop.stop();
            return;
        }
        slot.handle = Some(handle);
    }

    /// Claim the command for termination. Only the first caller gets `Some`;
    /// the inner option is `None` if no collector was attached yet.
    pub fn begin_stop(&self) -> Option<Option<CollectorHandle>> {
        let mut slot = self.collector_slot();
        if slot.stopping {
            return None;
        }
        slot.stopping = true;
        Some(slot.handle.take())
    }
}

struct TableInner {
    slots: Vec<Option<Arc<TrackedCommand>>>,
    next_id: CommandId,
}

/// Bounded registry of at most `capacity` commands, keyed by id.
///
/// The lock covers slot metadata and id generation only; callers spawn,
/// read and kill after it has been dropped.
pub struct CommandTable {
    buffer_capacity: usize,
    inner: Mutex<TableInner>,
}

impl CommandTable {
    pub fn new(capacity: usize, buffer_capacity: usize) -> Self {
        Self {
            buffer_capacity,
            inner: Mutex::new(TableInner {
                slots: (0..capacity).map(|_| None).collect(),
                next_id: FIRST_COMMAND_ID,
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, TableInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Take a free slot and bind a new Active command to it.
    ///
    /// # Errors
    /// - AppError::ResourceExhausted if every slot is assigned (no id is consumed)
    pub fn allocate(&self, command_line: &str) -> Result<Arc<TrackedCommand>> {
        let mut inner = self.lock();
        let capacity = inner.slots.len();

        let slot = inner
            .slots
            .iter()
            .position(Option::is_none)
            .ok_or(AppError::ResourceExhausted { capacity })?;

        let id = inner.next_id;
        inner.next_id += 1;

        let tracked = Arc::new(TrackedCommand {
            slot,
            command: Arc::new(Command::new(id, command_line, self.buffer_capacity)),
            collector: Mutex::new(CollectorSlot::default()),
        });
        inner.slots[slot] = Some(tracked.clone());

        Ok(tracked)
    }

    /// Look up a resident command by id
    pub fn find(&self, id: CommandId) -> Option<Arc<TrackedCommand>> {
        self.lock()
            .slots
            .iter()
            .flatten()
            .find(|tracked| tracked.id() == id)
            .cloned()
    }

    /// Return the slot holding `id` to the free pool. False if it was not resident.
    pub fn release(&self, id: CommandId) -> bool {
        let mut inner = self.lock();
        let slot = inner
            .slots
            .iter_mut()
            .find(|slot| slot.as_ref().is_some_and(|tracked| tracked.id() == id));

        match slot {
            Some(slot) => {
                *slot = None;
                true
            }
            None => false,
        }
    }

    /// All resident commands, in slot order
    pub fn entries(&self) -> Vec<Arc<TrackedCommand>> {
        self.lock().slots.iter().flatten().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().slots.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.lock().slots.len()
    }

    /// Id the next successful allocation will receive
    pub fn next_id(&self) -> CommandId {
        self.lock().next_id
    }
}
