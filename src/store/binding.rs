//! Refresh binding for UI code.
//!
//! A [`Binding`] is what a widget holds while it is mounted. It subscribes
//! once on creation, keeps the last selected slice, and raises a refresh
//! flag only when a write changes that slice. Dropping the binding is the
//! unmount: it unsubscribes exactly once.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use super::{BoxError, Listener, Merge, Store, StoreError, Unsubscribe};

type Selector<S, R> = Rc<dyn Fn(&S) -> R>;
type Equality<R> = Box<dyn Fn(&R, &R) -> bool>;

/// Write half handed to widgets alongside the selected value.
pub struct Setter<S> {
    store: Store<S>,
}

impl<S> Clone for Setter<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
        }
    }
}

impl<S: Merge + 'static> Setter<S> {
    pub fn set(&self, patch: S::Patch) -> Result<(), StoreError> {
        self.store.set(patch)
    }

    pub fn update(&self, f: impl FnOnce(&S) -> S::Patch) -> Result<(), StoreError> {
        self.store.update(f)
    }

    pub fn try_update<E>(
        &self,
        f: impl FnOnce(&S) -> Result<S::Patch, E>,
    ) -> Result<(), StoreError>
    where
        E: Into<BoxError>,
    {
        self.store.try_update(f)
    }
}

struct Slot<S, R> {
    selector: RefCell<Selector<S, R>>,
    equal: Equality<R>,
    current: RefCell<R>,
    pending: Cell<bool>,
    refreshes: Cell<u64>,
    on_refresh: RefCell<Option<Rc<dyn Fn(&R)>>>,
}

impl<S, R: Clone> Slot<S, R> {
    fn observe(&self, state: &S) {
        let selector = Rc::clone(&*self.selector.borrow());
        let next = selector(state);
        let unchanged = (self.equal)(&*self.current.borrow(), &next);
        // Always track the latest slice so the next write compares
        // against it rather than the value captured at mount.
        self.current.replace(next);
        if unchanged {
            return;
        }
        self.pending.set(true);
        self.refreshes.set(self.refreshes.get() + 1);
        let callback = self.on_refresh.borrow().clone();
        if let Some(callback) = callback {
            let value = self.current.borrow().clone();
            callback(&value);
        }
    }
}

pub struct Binding<S: 'static, R: 'static> {
    store: Store<S>,
    slot: Rc<Slot<S, R>>,
    unsubscribe: Unsubscribe,
}

impl<S: Merge + 'static, R: Clone + 'static> Binding<S, R> {
    pub(crate) fn new(
        store: &Store<S>,
        selector: impl Fn(&S) -> R + 'static,
        equal: impl Fn(&R, &R) -> bool + 'static,
    ) -> Self {
        let selector: Selector<S, R> = Rc::new(selector);
        let initial = store.select(|s| selector(s));
        let slot = Rc::new(Slot {
            selector: RefCell::new(selector),
            equal: Box::new(equal),
            current: RefCell::new(initial),
            pending: Cell::new(false),
            refreshes: Cell::new(0),
            on_refresh: RefCell::new(None),
        });
        let observer = Rc::clone(&slot);
        let unsubscribe = store.subscribe(Listener::new(move |state: &S| observer.observe(state)));
        Self {
            store: store.clone(),
            slot,
            unsubscribe,
        }
    }

    /// The selected slice as of the most recent write.
    pub fn value(&self) -> R {
        self.slot.current.borrow().clone()
    }

    pub fn setter(&self) -> Setter<S> {
        Setter {
            store: self.store.clone(),
        }
    }

    /// `(value, setter)` pair, the shape a render function consumes.
    pub fn split(&self) -> (R, Setter<S>) {
        (self.value(), self.setter())
    }

    /// Consume the pending refresh request, if any.
    pub fn take_refresh(&self) -> bool {
        self.slot.pending.replace(false)
    }

    pub fn needs_refresh(&self) -> bool {
        self.slot.pending.get()
    }

    pub fn refresh_count(&self) -> u64 {
        self.slot.refreshes.get()
    }

    /// Run `callback` with the new slice each time a refresh is raised.
    pub fn on_refresh(&self, callback: impl Fn(&R) + 'static) {
        self.slot.on_refresh.replace(Some(Rc::new(callback)));
    }

    /// Swap the selector without touching the subscription. The captured
    /// slice is recomputed from the current state; no refresh is raised.
    pub fn set_selector(&self, selector: impl Fn(&S) -> R + 'static) {
        let selector: Selector<S, R> = Rc::new(selector);
        let value = self.store.select(|s| selector(s));
        self.slot.selector.replace(selector);
        self.slot.current.replace(value);
    }

    pub fn is_mounted(&self) -> bool {
        self.unsubscribe.is_active()
    }
}

impl<S: 'static, R: 'static> Drop for Binding<S, R> {
    fn drop(&mut self) {
        self.unsubscribe.unsubscribe();
    }
}

impl<S: 'static, R: fmt::Debug + 'static> fmt::Debug for Binding<S, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("value", &self.slot.current.borrow())
            .field("pending", &self.slot.pending.get())
            .field("refreshes", &self.slot.refreshes.get())
            .finish()
    }
}

impl<S: Merge + 'static> Store<S> {
    /// Bind to the slice picked by `selector`. A refresh is raised when a
    /// write changes that slice (by `PartialEq`).
    pub fn use_store<R>(&self, selector: impl Fn(&S) -> R + 'static) -> Binding<S, R>
    where
        R: Clone + PartialEq + 'static,
    {
        Binding::new(self, selector, |a: &R, b: &R| a == b)
    }

    /// Bind with a caller-supplied equality instead of `PartialEq`.
    pub fn use_store_with<R>(
        &self,
        selector: impl Fn(&S) -> R + 'static,
        equal: impl Fn(&R, &R) -> bool + 'static,
    ) -> Binding<S, R>
    where
        R: Clone + 'static,
    {
        Binding::new(self, selector, equal)
    }

    /// Bind to the whole state. Every write raises a refresh.
    pub fn use_store_all(&self) -> Binding<S, S>
    where
        S: Clone,
    {
        Binding::new(self, |s: &S| s.clone(), |_: &S, _: &S| false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{create, MergeError};

    #[derive(Debug, Clone, PartialEq)]
    struct Demo {
        val: i64,
        name: String,
        tags: Vec<String>,
    }

    #[derive(Debug, Default)]
    struct DemoPatch {
        val: Option<i64>,
        name: Option<String>,
        tags: Option<Vec<String>>,
    }

    impl Merge for Demo {
        type Patch = DemoPatch;

        fn merge(&self, patch: DemoPatch) -> Result<Self, MergeError> {
            Ok(Self {
                val: patch.val.unwrap_or(self.val),
                name: patch.name.unwrap_or_else(|| self.name.clone()),
                tags: patch.tags.unwrap_or_else(|| self.tags.clone()),
            })
        }
    }

    fn store() -> Store<Demo> {
        create(Demo {
            val: 0,
            name: "a".into(),
            tags: vec![],
        })
    }

    fn val(v: i64) -> DemoPatch {
        DemoPatch {
            val: Some(v),
            ..Default::default()
        }
    }

    fn name(n: &str) -> DemoPatch {
        DemoPatch {
            name: Some(n.into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_captures_initial_slice() {
        let store = store();
        let binding = store.use_store(|s| s.name.clone());
        assert_eq!(binding.value(), "a");
        assert!(!binding.needs_refresh());
    }

    #[test]
    fn test_refresh_only_when_slice_changes() {
        let store = store();
        let binding = store.use_store(|s| s.name.clone());
        let calls = Rc::new(RefCell::new(Vec::new()));
        let calls_clone = Rc::clone(&calls);
        binding.on_refresh(move |name: &String| calls_clone.borrow_mut().push(name.clone()));

        store.set(val(99)).unwrap();
        assert!(!binding.take_refresh());
        assert!(calls.borrow().is_empty());

        store.set(name("b")).unwrap();
        assert!(binding.take_refresh());
        assert_eq!(*calls.borrow(), vec!["b".to_string()]);
        assert_eq!(binding.value(), "b");

        // Flag consumed
        assert!(!binding.take_refresh());
    }

    #[test]
    fn test_compares_against_latest_slice() {
        let store = store();
        let binding = store.use_store(|s| s.val);
        store.set(val(1)).unwrap();
        store.set(val(1)).unwrap();
        store.set(val(0)).unwrap();
        // 0 -> 1 and 1 -> 0 are changes; the repeated 1 is not.
        assert_eq!(binding.refresh_count(), 2);
    }

    #[test]
    fn test_whole_state_refreshes_on_every_write() {
        let store = store();
        let binding = store.use_store_all();
        store.set(DemoPatch::default()).unwrap();
        store.set(val(0)).unwrap();
        assert_eq!(binding.refresh_count(), 2);
        assert_eq!(binding.value().val, 0);
    }

    #[test]
    fn test_custom_equality() {
        let store = store();
        // Only react to the sign of val
        let binding = store.use_store_with(|s| s.val, |a: &i64, b: &i64| a.signum() == b.signum());
        store.set(val(5)).unwrap();
        store.set(val(7)).unwrap();
        store.set(val(-1)).unwrap();
        assert_eq!(binding.refresh_count(), 2);
    }

    #[test]
    fn test_structurally_equal_slice_is_not_a_change() {
        let store = store();
        let binding = store.use_store(|s| s.tags.clone());
        store
            .set(DemoPatch {
                tags: Some(vec![]),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(binding.refresh_count(), 0);
    }

    #[test]
    fn test_subscribes_once_and_unsubscribes_on_drop() {
        let store = store();
        let binding = store.use_store(|s| s.val);
        assert_eq!(store.subscriber_count(), 1);
        assert!(binding.is_mounted());

        binding.set_selector(|s| s.val * 10);
        binding.set_selector(|s| s.val * 100);
        assert_eq!(store.subscriber_count(), 1);

        drop(binding);
        assert_eq!(store.subscriber_count(), 0);
    }

    #[test]
    fn test_set_selector_recomputes_without_refresh() {
        let store = store();
        store.set(val(3)).unwrap();
        let binding = store.use_store(|s| s.val);
        binding.set_selector(|s| s.val * 10);
        assert_eq!(binding.value(), 30);
        assert!(!binding.needs_refresh());

        store.set(val(4)).unwrap();
        assert_eq!(binding.value(), 40);
        assert!(binding.needs_refresh());
    }

    #[test]
    fn test_setter_writes_through() {
        let store = store();
        let binding = store.use_store(|s| s.val);
        let (value, set) = binding.split();
        assert_eq!(value, 0);

        set.update(|s| val(s.val + 1)).unwrap();
        set.update(|s| val(s.val + 1)).unwrap();
        assert_eq!(binding.value(), 2);
        assert_eq!(store.get().val, 2);
    }

    #[test]
    fn test_independent_bindings() {
        let store = store();
        let counter = store.use_store(|s| s.val);
        let label = store.use_store(|s| s.name.clone());
        store.set(val(1)).unwrap();
        assert!(counter.take_refresh());
        assert!(!label.take_refresh());
        assert_eq!(store.subscriber_count(), 2);
    }

    #[test]
    fn test_refresh_callback_may_write() {
        let store = store();
        let binding = store.use_store(|s| s.val);
        let setter = binding.setter();
        binding.on_refresh(move |v: &i64| {
            if *v > 10 {
                setter.set(val(10)).unwrap();
            }
        });
        store.set(val(20)).unwrap();
        assert_eq!(binding.value(), 10);
        assert_eq!(store.get().val, 10);
    }

    #[test]
    fn test_later_binding_sees_clamped_value() {
        let store = store();
        let clamp = store.use_store(|s| s.val);
        let setter = clamp.setter();
        clamp.on_refresh(move |v: &i64| {
            if *v > 10 {
                setter.set(val(10)).unwrap();
            }
        });
        let view = store.use_store(|s| s.val);

        store.set(val(50)).unwrap();
        assert_eq!(store.get().val, 10);
        assert_eq!(clamp.value(), 10);
        assert_eq!(view.value(), 10);
    }
}
