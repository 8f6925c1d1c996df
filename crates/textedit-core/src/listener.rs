//! Buffer change notifications.
//!
//! Listeners are held weakly: the buffer never owns them, and a listener that has been
//! dropped is pruned on the next notification.

use crate::coord::LineRange;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

/// Line-granularity change kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineChange {
    /// Existing lines changed in place.
    Updated,
    /// New lines were inserted (range in post-insert numbering).
    Added,
    /// Lines were removed (range in pre-delete numbering).
    Deleted,
    /// The whole buffer was replaced.
    Refresh,
}

/// Buffer-granularity change kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BufferChange {
    /// The encoding changed.
    Encoding,
    /// The file path changed.
    FileName,
    /// The modified flag toggled.
    Modified,
    /// The EOL format changed.
    FileFormat,
    /// The file-type plugin changed.
    FileType,
}

/// Observer of a [`TextBuffer`](crate::TextBuffer).
///
/// Notifications are synchronous and delivered on the thread that mutates the buffer.
/// Implementations use interior mutability; they must not mutate the buffer from a callback.
pub trait BufferListener {
    /// Called after lines changed.
    fn on_line_change(&self, change: LineChange, lines: LineRange);

    /// Called after buffer-level state changed.
    fn on_buffer_change(&self, change: BufferChange) {
        let _ = change;
    }
}

/// Handle returned by [`Listeners::attach`], used to detach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// A weak subscriber list.
#[derive(Default)]
pub struct Listeners {
    next_id: u64,
    entries: RefCell<Vec<(ListenerId, Weak<dyn BufferListener>)>>,
}

impl std::fmt::Debug for Listeners {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.entries.borrow().len())
            .finish()
    }
}

impl Listeners {
    /// Register a listener; only a weak reference is kept.
    pub fn attach<L: BufferListener + 'static>(&mut self, listener: &Rc<L>) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        let rc: Rc<dyn BufferListener> = listener.clone();
        self.entries.borrow_mut().push((id, Rc::downgrade(&rc)));
        id
    }

    /// Unregister a listener. Returns `false` if the id was unknown.
    pub fn detach(&mut self, id: ListenerId) -> bool {
        let mut entries = self.entries.borrow_mut();
        let before = entries.len();
        entries.retain(|(entry_id, _)| *entry_id != id);
        entries.len() != before
    }

    /// Number of live listeners.
    pub fn len(&self) -> usize {
        self.entries
            .borrow()
            .iter()
            .filter(|(_, weak)| weak.strong_count() > 0)
            .count()
    }

    /// Returns `true` if no live listener is attached.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn live(&self) -> Vec<Rc<dyn BufferListener>> {
        let mut entries = self.entries.borrow_mut();
        entries.retain(|(_, weak)| weak.strong_count() > 0);
        entries.iter().filter_map(|(_, weak)| weak.upgrade()).collect()
    }

    /// Deliver a line notification. Empty ranges are not delivered.
    pub fn notify_line(&self, change: LineChange, lines: LineRange) {
        if lines.is_empty() {
            return;
        }
        for listener in self.live() {
            listener.on_line_change(change, lines);
        }
    }

    /// Deliver a buffer notification.
    pub fn notify_buffer(&self, change: BufferChange) {
        for listener in self.live() {
            listener.on_buffer_change(change);
        }
    }
}

/// A recorded notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeEvent {
    /// A line notification.
    Line(LineChange, LineRange),
    /// A buffer notification.
    Buffer(BufferChange),
}

/// A listener that records every notification, for tests and change batching.
#[derive(Debug, Default)]
pub struct ChangeLog {
    events: RefCell<Vec<ChangeEvent>>,
}

impl ChangeLog {
    /// Create an empty, shareable log.
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Take the recorded events, leaving the log empty.
    pub fn take(&self) -> Vec<ChangeEvent> {
        std::mem::take(&mut *self.events.borrow_mut())
    }

    /// Recorded events so far.
    pub fn events(&self) -> Vec<ChangeEvent> {
        self.events.borrow().clone()
    }
}

impl BufferListener for ChangeLog {
    fn on_line_change(&self, change: LineChange, lines: LineRange) {
        self.events.borrow_mut().push(ChangeEvent::Line(change, lines));
    }

    fn on_buffer_change(&self, change: BufferChange) {
        self.events.borrow_mut().push(ChangeEvent::Buffer(change));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dropped_listener_is_pruned() {
        let mut listeners = Listeners::default();
        let kept = ChangeLog::new();
        let dropped = ChangeLog::new();
        listeners.attach(&kept);
        listeners.attach(&dropped);
        assert_eq!(listeners.len(), 2);

        drop(dropped);
        listeners.notify_line(LineChange::Updated, LineRange::single(1));
        assert_eq!(listeners.len(), 1);
        assert_eq!(
            kept.take(),
            vec![ChangeEvent::Line(LineChange::Updated, LineRange::single(1))]
        );
    }

    #[test]
    fn test_detach_and_empty_ranges() {
        let mut listeners = Listeners::default();
        let log = ChangeLog::new();
        let id = listeners.attach(&log);

        listeners.notify_line(LineChange::Added, LineRange::new(3, 2));
        assert!(log.events().is_empty());

        assert!(listeners.detach(id));
        assert!(!listeners.detach(id));
        listeners.notify_buffer(BufferChange::Modified);
        assert!(log.events().is_empty());
    }
}
