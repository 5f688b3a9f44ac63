//! Client-side reconciliation
//!
//! A client keeps one [`BoardView`] per open board. Local drags patch the
//! view optimistically; authoritative results (the mutation response or a
//! broadcast) overwrite it. Nothing here talks to the store: the types are
//! shared by any front end that mirrors the engine's ordering rules.

mod client_store;
mod drag;
mod view;

pub use client_store::ClientStore;
pub use drag::{BoardReconciler, DragItem, DropTarget, Outcome, Phase};
pub use view::{apply_change, BoardView};
