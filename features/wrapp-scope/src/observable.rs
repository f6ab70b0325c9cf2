use std::{
    cell::RefCell,
    collections::HashMap,
    fmt::Debug,
    pin::Pin,
    rc::{Rc, Weak},
    task::{Context, Poll},
};

use futures::{Stream, StreamExt};
use futures_channel::mpsc;

use crate::{errors::NotifyError, types::DynError};

type Listener<T> = dyn Fn(&T) -> Result<(), DynError>;

struct Listeners<T> {
    next_id: u64,
    entries: HashMap<u64, Rc<Listener<T>>>,
}

/// A state value which notifies its listeners on every change
pub struct Observable<T> {
    state: RefCell<T>,
    listeners: Rc<RefCell<Listeners<T>>>,
}
impl<T: Debug + 'static> Debug for Observable<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observable")
            .field("state", &self.state.borrow())
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl<T: 'static> Observable<T> {
    pub fn new(initial: T) -> Self {
        Observable {
            state: RefCell::new(initial),
            listeners: Rc::new(RefCell::new(Listeners {
                next_id: 0,
                entries: HashMap::new(),
            })),
        }
    }

    /// Registers a listener for all future changes
    ///
    /// The listener stays registered until the returned [Subscription] is disposed or dropped.
    pub fn subscribe(&self, listener: impl Fn(&T) + 'static) -> Subscription {
        self.try_subscribe(move |state| {
            listener(state);
            Ok(())
        })
    }

    /// Registers a fallible listener
    ///
    /// An error returned by the listener aborts the notification and is returned by [Observable::update].
    pub fn try_subscribe(
        &self,
        listener: impl Fn(&T) -> Result<(), DynError> + 'static,
    ) -> Subscription {
        let id = {
            let mut listeners = self.listeners.borrow_mut();
            let id = listeners.next_id;
            listeners.next_id += 1;
            listeners.entries.insert(id, Rc::new(listener));
            id
        };
        tracing::debug!("Added listener {id} to {}", std::any::type_name::<Self>());

        let listeners: Weak<RefCell<Listeners<T>>> = Rc::downgrade(&self.listeners);
        Subscription::new(move || {
            // The observable may already be gone, then there is nothing to remove
            if let Some(listeners) = listeners.upgrade() {
                listeners.borrow_mut().entries.remove(&id);
                tracing::debug!("Disposed listener {id}");
            }
        })
    }

    /// Number of currently registered listeners
    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().entries.len()
    }
}

impl<T: Clone + 'static> Observable<T> {
    /// Returns a copy of the current state
    pub fn get(&self) -> T {
        self.state.borrow().clone()
    }

    /// Applies `change` to the state and notifies every listener registered at this point
    ///
    /// Returns the new state. Stops at the first failing listener, the state change is kept.
    /// `change` works on a copy, so it may read the observable itself.
    pub fn update(&self, change: impl FnOnce(&mut T)) -> Result<T, NotifyError> {
        let mut state = self.get();
        change(&mut state);
        *self.state.borrow_mut() = state.clone();

        let snapshot: Vec<Rc<Listener<T>>> =
            self.listeners.borrow().entries.values().cloned().collect();
        tracing::trace!("Notifying {} listeners", snapshot.len());

        for listener in snapshot {
            if let Err(source) = listener(&state) {
                tracing::debug!("Listener failed, aborting notification: {source}");
                return Err(NotifyError::ListenerFailed { source });
            }
        }

        Ok(state)
    }

    /// A stream of every state after subsequent updates
    ///
    /// The stream unsubscribes when dropped.
    pub fn changes(&self) -> Changes<T> {
        let (tx, rx) = mpsc::unbounded();
        let subscription = self.subscribe(move |state: &T| {
            // A closed receiver means the stream is being dropped
            let _ = tx.unbounded_send(state.clone());
        });

        Changes {
            rx,
            _subscription: subscription,
        }
    }
}

/// Cancels one listener registration
///
/// Disposing is idempotent. Dropping a subscription disposes it, use [Subscription::detach] to keep the listener.
#[must_use = "dropping a Subscription unsubscribes the listener"]
pub struct Subscription {
    dispose: RefCell<Option<Box<dyn FnOnce()>>>,
}
impl Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

impl Subscription {
    fn new(dispose: impl FnOnce() + 'static) -> Self {
        Subscription {
            dispose: RefCell::new(Some(Box::new(dispose))),
        }
    }

    /// Removes the listener, calling it again has no effect
    pub fn dispose(&self) {
        let dispose = self.dispose.borrow_mut().take();
        if let Some(dispose) = dispose {
            dispose();
        }
    }

    /// Returns false once disposed
    pub fn is_active(&self) -> bool {
        self.dispose.borrow().is_some()
    }

    /// Keeps the listener registered for the lifetime of the observable
    pub fn detach(self) {
        self.dispose.borrow_mut().take();
    }
}
impl Drop for Subscription {
    fn drop(&mut self) {
        self.dispose();
    }
}

/// Stream of state changes, see [Observable::changes]
pub struct Changes<T> {
    rx: mpsc::UnboundedReceiver<T>,
    _subscription: Subscription,
}
impl<T> Stream for Changes<T> {
    type Item = T;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_next_unpin(cx)
    }
}
