use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

use log::debug;

/// A pointer button went down somewhere in the window, in screen coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerDown {
    pub x: f32,
    pub y: f32,
}

/// Screen space rectangle used for hit testing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenRect {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl ScreenRect {
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }
}

type Inbox<E> = Rc<RefCell<VecDeque<E>>>;

struct DispatcherImpl<E> {
    next_id: u64,
    inboxes: Vec<(u64, Inbox<E>)>,
}

/// Fans events out to every registered [`Listener`].
///
/// Everything lives on the UI thread, so this is `Rc` based. Each listener gets its own queue
/// and consumes it at its own pace; a listener only sees events dispatched while it is alive.
pub struct Dispatcher<E> {
    inner: Rc<RefCell<DispatcherImpl<E>>>,
}

impl<E> Clone for Dispatcher<E> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<E> Default for Dispatcher<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Dispatcher<E> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(DispatcherImpl {
                next_id: 0,
                inboxes: Vec::new(),
            })),
        }
    }

    /// apply non-exclusive read access to the inner state
    fn read<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&DispatcherImpl<E>) -> T,
    {
        let inner = self.inner.borrow();
        f(&inner)
    }

    /// apply exclusive write access to the inner state
    fn write<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&mut DispatcherImpl<E>) -> T,
    {
        let mut inner = self.inner.borrow_mut();
        f(&mut inner)
    }

    /// Register a new listener, it stays registered until dropped
    pub fn listen(&self) -> Listener<E> {
        let inbox: Inbox<E> = Rc::new(RefCell::new(VecDeque::new()));
        let id = self.write(|inner| {
            let id = inner.next_id;
            inner.next_id += 1;
            inner.inboxes.push((id, inbox.clone()));
            id
        });
        debug!("listener {} registered", id);

        Listener {
            id,
            inbox,
            dispatcher: Rc::downgrade(&self.inner),
        }
    }

    pub fn listener_count(&self) -> usize {
        self.read(|inner| inner.inboxes.len())
    }
}

impl<E: Clone> Dispatcher<E> {
    pub fn dispatch(&self, event: E) {
        self.read(|inner| {
            for (_, inbox) in &inner.inboxes {
                inbox.borrow_mut().push_back(event.clone());
            }
        });
    }
}

/// Registration handle returned by [`Dispatcher::listen`]
pub struct Listener<E> {
    id: u64,
    inbox: Inbox<E>,
    dispatcher: Weak<RefCell<DispatcherImpl<E>>>,
}

impl<E> Listener<E> {
    pub fn pop_event(&self) -> Option<E> {
        self.inbox.borrow_mut().pop_front()
    }
}

impl<E> Drop for Listener<E> {
    fn drop(&mut self) {
        if let Some(dispatcher) = self.dispatcher.upgrade() {
            dispatcher
                .borrow_mut()
                .inboxes
                .retain(|(id, _)| *id != self.id);
            debug!("listener {} removed", self.id);
        }
    }
}
