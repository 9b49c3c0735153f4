//! Observable state store.
//!
//! A [`Store`] owns one state value and a set of listeners. Every write
//! produces a new state (via [`Merge`]), swaps it in, and runs exactly one
//! notification pass over the listeners registered when the pass begins.
//!
//! Handles are cheap to clone and share the same state. The store is
//! single-threaded (`Rc<RefCell<..>>`); no borrow is held while patch
//! functions, selectors, or listeners run, so a listener may read the store
//! or write to it again. A nested write runs its own pass.

pub mod binding;
pub mod error;
pub mod merge;

use std::cell::{Cell, RefCell};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::{Rc, Weak};

use tracing::{debug, error, warn};

pub use binding::{Binding, Setter};
pub use error::{BoxError, MergeError, StoreError};
pub use merge::Merge;

const DEFAULT_LABEL: &str = "store";

/// A state-change callback. Identity is the allocation behind the handle:
/// clones of one `Listener` are the same listener, two `Listener::new` calls
/// over equal closures are not.
pub struct Listener<S> {
    callback: Rc<dyn Fn(&S)>,
}

impl<S> Listener<S> {
    pub fn new(callback: impl Fn(&S) + 'static) -> Self {
        Self {
            callback: Rc::new(callback),
        }
    }

    pub fn same(&self, other: &Listener<S>) -> bool {
        Rc::ptr_eq(&self.callback, &other.callback)
    }

    fn call(&self, state: &S) {
        (self.callback)(state)
    }
}

impl<S> Clone for Listener<S> {
    fn clone(&self) -> Self {
        Self {
            callback: Rc::clone(&self.callback),
        }
    }
}

impl<S> fmt::Debug for Listener<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Listener")
            .field(&Rc::as_ptr(&self.callback).cast::<()>())
            .finish()
    }
}

type RegistrationId = u64;

struct StoreInner<S> {
    label: String,
    state: Rc<S>,
    version: u64,
    next_registration: RegistrationId,
    listeners: Vec<(RegistrationId, Listener<S>)>,
}

/// Handle returned by [`Store::subscribe`]. Removes exactly the registration
/// it was created for; calling it again is a no-op.
#[must_use = "dropping an Unsubscribe keeps the listener registered"]
pub struct Unsubscribe {
    remove: Cell<Option<Box<dyn FnOnce()>>>,
}

impl Unsubscribe {
    pub fn unsubscribe(&self) {
        if let Some(remove) = self.remove.take() {
            remove();
        }
    }

    pub fn is_active(&self) -> bool {
        // Cell<Option<Box<..>>> has no peek; take and put back.
        let remove = self.remove.take();
        let active = remove.is_some();
        self.remove.set(remove);
        active
    }
}

impl fmt::Debug for Unsubscribe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Unsubscribe")
            .field("active", &self.is_active())
            .finish()
    }
}

pub struct Store<S> {
    inner: Rc<RefCell<StoreInner<S>>>,
}

impl<S> Clone for Store<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<S: fmt::Debug> fmt::Debug for Store<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("Store")
            .field("label", &inner.label)
            .field("state", &inner.state)
            .field("version", &inner.version)
            .field("listeners", &inner.listeners.len())
            .finish()
    }
}

/// Create an independent store holding `initial`.
pub fn create<S: Merge + 'static>(initial: S) -> Store<S> {
    Store::new(initial)
}

impl<S: Merge + 'static> Store<S> {
    pub fn new(initial: S) -> Self {
        Self::with_label(DEFAULT_LABEL, initial)
    }

    /// Like [`Store::new`], with `label` attached to this store's log events.
    pub fn with_label(label: impl Into<String>, initial: S) -> Self {
        Self {
            inner: Rc::new(RefCell::new(StoreInner {
                label: label.into(),
                state: Rc::new(initial),
                version: 0,
                next_registration: 0,
                listeners: Vec::new(),
            })),
        }
    }

    pub fn label(&self) -> String {
        self.inner.borrow().label.clone()
    }

    /// Current state snapshot.
    pub fn get(&self) -> Rc<S> {
        Rc::clone(&self.inner.borrow().state)
    }

    /// Project the current state through `selector`.
    pub fn select<R>(&self, selector: impl FnOnce(&S) -> R) -> R {
        let state = self.get();
        selector(&state)
    }

    pub fn try_select<R, E>(
        &self,
        selector: impl FnOnce(&S) -> Result<R, E>,
    ) -> Result<R, StoreError>
    where
        E: Into<BoxError>,
    {
        let state = self.get();
        selector(&state).map_err(|err| StoreError::Selector(err.into()))
    }

    /// Number of committed writes since creation.
    pub fn version(&self) -> u64 {
        self.inner.borrow().version
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.borrow().listeners.len()
    }

    /// Shallow-merge `patch` into the current state and notify listeners.
    ///
    /// On a rejected patch the state is left as it was and nobody is
    /// notified. A [`StoreError::Listener`] means the write itself landed.
    pub fn set(&self, patch: S::Patch) -> Result<(), StoreError> {
        let current = self.get();
        self.apply(&current, patch)
    }

    /// Compute a patch from the current state and merge it like [`Store::set`].
    pub fn update(&self, f: impl FnOnce(&S) -> S::Patch) -> Result<(), StoreError> {
        let current = self.get();
        let patch = f(&current);
        self.apply(&current, patch)
    }

    /// Fallible form of [`Store::update`]. An `Err` from `f` leaves the
    /// state unchanged.
    pub fn try_update<E>(
        &self,
        f: impl FnOnce(&S) -> Result<S::Patch, E>,
    ) -> Result<(), StoreError>
    where
        E: Into<BoxError>,
    {
        let current = self.get();
        let patch = f(&current)
            .map_err(|err| self.rejected(StoreError::InvalidPatch(err.into())))?;
        self.apply(&current, patch)
    }

    /// Register `listener`. Registering a listener that is already present
    /// does not add a second entry; the returned handle then refers to the
    /// existing registration.
    pub fn subscribe(&self, listener: Listener<S>) -> Unsubscribe {
        let id = {
            let mut inner = self.inner.borrow_mut();
            let existing = inner
                .listeners
                .iter()
                .find(|(_, l)| l.same(&listener))
                .map(|(id, _)| *id);
            match existing {
                Some(id) => {
                    debug!(store = %inner.label, registration = id, "listener already subscribed");
                    id
                }
                None => {
                    let id = inner.next_registration;
                    inner.next_registration += 1;
                    inner.listeners.push((id, listener));
                    debug!(
                        store = %inner.label,
                        registration = id,
                        listeners = inner.listeners.len(),
                        "subscribed"
                    );
                    id
                }
            }
        };

        let weak: Weak<RefCell<StoreInner<S>>> = Rc::downgrade(&self.inner);
        Unsubscribe {
            remove: Cell::new(Some(Box::new(move || {
                let Some(inner) = weak.upgrade() else {
                    return;
                };
                let mut inner = inner.borrow_mut();
                inner.listeners.retain(|(rid, _)| *rid != id);
                debug!(
                    store = %inner.label,
                    registration = id,
                    listeners = inner.listeners.len(),
                    "unsubscribed"
                );
            }))),
        }
    }

    /// Wrap a fresh closure in a new [`Listener`] and subscribe it.
    pub fn subscribe_fn(&self, callback: impl Fn(&S) + 'static) -> Unsubscribe {
        self.subscribe(Listener::new(callback))
    }

    fn apply(&self, current: &S, patch: S::Patch) -> Result<(), StoreError> {
        let next = current
            .merge(patch)
            .map_err(|err| self.rejected(err.into()))?;
        self.commit(next)
    }

    fn rejected(&self, err: StoreError) -> StoreError {
        warn!(store = %self.inner.borrow().label, error = %err, "patch rejected");
        err
    }

    fn commit(&self, next: S) -> Result<(), StoreError> {
        // Snapshot the listener set: registrations changed by a listener
        // during this pass only take effect on the next one.
        let (listeners, label) = {
            let mut inner = self.inner.borrow_mut();
            inner.state = Rc::new(next);
            inner.version += 1;
            debug!(
                store = %inner.label,
                version = inner.version,
                listeners = inner.listeners.len(),
                "state replaced"
            );
            let listeners: Vec<Listener<S>> =
                inner.listeners.iter().map(|(_, l)| l.clone()).collect();
            (listeners, inner.label.clone())
        };
        self.notify(&label, &listeners)
    }

    /// Run one notification pass. Each listener gets the live state, so a
    /// nested write made by an earlier listener is what later ones see.
    /// Each call is isolated: a panic in one does not stop the rest.
    fn notify(&self, label: &str, listeners: &[Listener<S>]) -> Result<(), StoreError> {
        let total = listeners.len();
        let mut failed = 0;
        for listener in listeners {
            let state = self.get();
            let _guard = IsolationGuard::enter();
            if panic::catch_unwind(AssertUnwindSafe(|| listener.call(&state))).is_err() {
                failed += 1;
                error!(store = %label, ?listener, "listener panicked");
            }
        }
        if failed > 0 {
            Err(StoreError::Listener { failed, total })
        } else {
            Ok(())
        }
    }
}

thread_local! {
    static ISOLATION_DEPTH: Cell<usize> = const { Cell::new(0) };
}

/// Whether the current thread is running a listener under the store's
/// panic isolation. A panic hook can check this to tell a panic the store
/// will catch from one that will unwind the program.
pub fn panic_is_isolated() -> bool {
    ISOLATION_DEPTH.with(|depth| depth.get() > 0)
}

struct IsolationGuard;

impl IsolationGuard {
    fn enter() -> Self {
        ISOLATION_DEPTH.with(|depth| depth.set(depth.get() + 1));
        IsolationGuard
    }
}

impl Drop for IsolationGuard {
    fn drop(&mut self) {
        ISOLATION_DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}
