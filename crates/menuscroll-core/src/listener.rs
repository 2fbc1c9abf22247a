#![forbid(unsafe_code)]

//! Listener attachment with guaranteed cleanup.
//!
//! Every registration returns a [`ListenerGuard`]. The guard removes its
//! listener exactly once: either through [`ListenerGuard::remove`] or when it
//! is dropped. Holding guards instead of raw ids means a component that is
//! torn down (or simply dropped) cannot leave listeners behind.

use std::fmt;
use std::rc::Rc;

use tracing::trace;

use crate::container::{ListenerId, ListenerKind, ListenerOptions, ScrollContainer};

/// Cleanup handle for one container listener.
pub struct ListenerGuard {
    container: Rc<dyn ScrollContainer>,
    kind: ListenerKind,
    id: Option<ListenerId>,
}

impl fmt::Debug for ListenerGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerGuard")
            .field("kind", &self.kind)
            .field("id", &self.id)
            .finish()
    }
}

impl ListenerGuard {
    /// Register `kind` on `container` with the given options.
    #[must_use]
    pub fn attach(
        container: &Rc<dyn ScrollContainer>,
        kind: ListenerKind,
        options: ListenerOptions,
    ) -> Self {
        let id = container.add_listener(kind, options);
        trace!(event = kind.event_name(), id = id.0, passive = options.passive, "listener attached");
        Self {
            container: Rc::clone(container),
            kind,
            id: Some(id),
        }
    }

    /// Register a passive listener.
    #[must_use]
    pub fn attach_passive(container: &Rc<dyn ScrollContainer>, kind: ListenerKind) -> Self {
        Self::attach(container, kind, ListenerOptions::PASSIVE)
    }

    #[must_use]
    pub fn kind(&self) -> ListenerKind {
        self.kind
    }

    /// Whether the listener is still registered.
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.id.is_some()
    }

    /// Remove the listener now. Subsequent calls are no-ops.
    pub fn remove(&mut self) {
        if let Some(id) = self.id.take() {
            self.container.remove_listener(id);
            trace!(event = self.kind.event_name(), id = id.0, "listener removed");
        }
    }
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        self.remove();
    }
}
