//! Demo application logic: UI-local state, event handling, and the actions
//! that turn input into store writes.

pub mod action;
pub mod event;
pub mod handler;
pub mod state;
