//! A small observable state store.
//!
//! [`create`] a [`Store`], read it with `get`/`select`, write partial updates
//! with `set`/`update`, and react to writes with `subscribe` or a
//! selector-scoped [`Binding`] from `use_store`.

pub mod store;

pub use store::{
    create, panic_is_isolated, Binding, BoxError, Listener, Merge, MergeError, Setter, Store,
    StoreError, Unsubscribe,
};
