//! In-memory form state store.
//!
//! The store owns every piece of live form state: current field values,
//! per-field touched/error metadata, and the per-field visible flag. The
//! field set is fixed at construction; fields are never destroyed during a
//! session, and touching an undeclared field is an error.
//!
//! The store is single-threaded and handle-based -- clones share the same
//! underlying state. This lets a [`Registration`] guard release its visible
//! assertion from `Drop` without borrowing the caller's handle.
//!
//! Registration is idempotent in both directions: registering an
//! already-registered field only reasserts visible = true, and
//! deregistering a field that was never registered is a no-op.
//! Deregistration always clears any stored error, so no stale message
//! survives a field's removal from the rendered tree.
//!
//! Event dispatch is synchronous: a mutation's subscribers run to
//! completion before the mutating call returns, so a registration update
//! triggered by a render is observable before the next validation pass
//! reads the store.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use intake_core::{FieldValues, ValidationResult};

use crate::error::StoreError;

// ──────────────────────────────────────────────
// Metadata and events
// ──────────────────────────────────────────────

/// Per-field display metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMeta {
    /// The field has been blurred at least once.
    pub touched: bool,
    /// Message from the most recent validation pass, if any.
    pub error: Option<String>,
    /// The field is currently registered (part of the rendered tree).
    /// Starts false; only registration asserts it.
    pub visible: bool,
}

/// A change notification dispatched to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    ValueChanged { field: String },
    TouchedChanged { field: String },
    VisibilityChanged { field: String, visible: bool },
    ErrorChanged { field: String },
}

/// Handle returned by [`FormStore::subscribe`], used to unsubscribe.
pub type SubscriberId = u64;

type Subscriber = Box<dyn FnMut(&StoreEvent)>;

// ──────────────────────────────────────────────
// Store
// ──────────────────────────────────────────────

struct Inner {
    values: BTreeMap<String, String>,
    meta: BTreeMap<String, FieldMeta>,
    subscribers: Vec<(SubscriberId, Subscriber)>,
    /// Ids unsubscribed while a dispatch had the list detached.
    dead_subscribers: Vec<SubscriberId>,
    dispatch_depth: u32,
    next_subscriber: SubscriberId,
}

/// Shared handle to the form's live state.
#[derive(Clone)]
pub struct FormStore {
    inner: Rc<RefCell<Inner>>,
}

impl FormStore {
    /// Create a store with the given declared fields.
    ///
    /// Every declared field starts with the empty string, untouched,
    /// unregistered, and error-free; `initial` entries override the value.
    /// Initial entries naming undeclared fields are ignored.
    pub fn new(fields: &[&str], initial: &[(&str, &str)]) -> FormStore {
        let mut values = BTreeMap::new();
        let mut meta = BTreeMap::new();
        for field in fields {
            values.insert(field.to_string(), String::new());
            meta.insert(field.to_string(), FieldMeta::default());
        }
        for (field, value) in initial {
            if let Some(slot) = values.get_mut(*field) {
                *slot = value.to_string();
            }
        }
        FormStore {
            inner: Rc::new(RefCell::new(Inner {
                values,
                meta,
                subscribers: Vec::new(),
                dead_subscribers: Vec::new(),
                dispatch_depth: 0,
                next_subscriber: 0,
            })),
        }
    }

    // ── Values ────────────────────────────────────────────────────────────

    /// Read a field's current value.
    pub fn value(&self, field: &str) -> Result<String, StoreError> {
        let inner = self.inner.borrow();
        inner
            .values
            .get(field)
            .cloned()
            .ok_or_else(|| StoreError::UnknownField {
                field: field.to_string(),
            })
    }

    /// Overwrite a field's current value.
    pub fn set_value(&self, field: &str, value: &str) -> Result<(), StoreError> {
        {
            let mut inner = self.inner.borrow_mut();
            let slot =
                inner
                    .values
                    .get_mut(field)
                    .ok_or_else(|| StoreError::UnknownField {
                        field: field.to_string(),
                    })?;
            if *slot == value {
                return Ok(());
            }
            *slot = value.to_string();
        }
        self.emit(&StoreEvent::ValueChanged {
            field: field.to_string(),
        });
        Ok(())
    }

    /// Snapshot the full value set for an engine call.
    pub fn values(&self) -> FieldValues {
        FieldValues(self.inner.borrow().values.clone())
    }

    // ── Touched / error metadata ──────────────────────────────────────────

    /// Mark a field as blurred.
    pub fn blur(&self, field: &str) -> Result<(), StoreError> {
        {
            let mut inner = self.inner.borrow_mut();
            let meta = inner
                .meta
                .get_mut(field)
                .ok_or_else(|| StoreError::UnknownField {
                    field: field.to_string(),
                })?;
            if meta.touched {
                return Ok(());
            }
            meta.touched = true;
        }
        self.emit(&StoreEvent::TouchedChanged {
            field: field.to_string(),
        });
        Ok(())
    }

    pub fn touched(&self, field: &str) -> Result<bool, StoreError> {
        self.meta(field).map(|m| m.touched)
    }

    pub fn error(&self, field: &str) -> Result<Option<String>, StoreError> {
        self.meta(field).map(|m| m.error)
    }

    /// Set or clear a field's error message.
    pub fn set_error(&self, field: &str, message: Option<&str>) -> Result<(), StoreError> {
        {
            let mut inner = self.inner.borrow_mut();
            let meta = inner
                .meta
                .get_mut(field)
                .ok_or_else(|| StoreError::UnknownField {
                    field: field.to_string(),
                })?;
            let next = message.map(str::to_string);
            if meta.error == next {
                return Ok(());
            }
            meta.error = next;
        }
        self.emit(&StoreEvent::ErrorChanged {
            field: field.to_string(),
        });
        Ok(())
    }

    /// Replace every declared field's error from a fresh validation result.
    ///
    /// Fields absent from the result have their error cleared; the previous
    /// result is never merged with the new one.
    pub fn apply_errors(&self, errors: &ValidationResult) {
        let fields: Vec<String> = self.inner.borrow().meta.keys().cloned().collect();
        for field in fields {
            let message = errors.error(&field).map(str::to_string);
            let changed = {
                let mut inner = self.inner.borrow_mut();
                // Declared just above from the same map, so the entry exists.
                match inner.meta.get_mut(&field) {
                    Some(meta) if meta.error != message => {
                        meta.error = message;
                        true
                    }
                    _ => false,
                }
            };
            if changed {
                self.emit(&StoreEvent::ErrorChanged {
                    field: field.clone(),
                });
            }
        }
    }

    /// Per-field metadata snapshot.
    pub fn meta(&self, field: &str) -> Result<FieldMeta, StoreError> {
        let inner = self.inner.borrow();
        inner
            .meta
            .get(field)
            .cloned()
            .ok_or_else(|| StoreError::UnknownField {
                field: field.to_string(),
            })
    }

    // ── Registration ──────────────────────────────────────────────────────

    pub fn visible(&self, field: &str) -> Result<bool, StoreError> {
        self.meta(field).map(|m| m.visible)
    }

    /// Assert visible = true for a field entering the rendered tree.
    ///
    /// Idempotent: registering an already-registered field is a no-op
    /// beyond reasserting the flag (no event fires twice).
    pub fn register(&self, field: &str) -> Result<(), StoreError> {
        let changed = {
            let mut inner = self.inner.borrow_mut();
            let meta = inner
                .meta
                .get_mut(field)
                .ok_or_else(|| StoreError::UnknownField {
                    field: field.to_string(),
                })?;
            if meta.visible {
                false
            } else {
                meta.visible = true;
                true
            }
        };
        if changed {
            self.emit(&StoreEvent::VisibilityChanged {
                field: field.to_string(),
                visible: true,
            });
        }
        Ok(())
    }

    /// Revert visible to false for a field leaving the rendered tree and
    /// clear any stored error for it.
    ///
    /// Deregistering a field that was never registered is a no-op.
    pub fn unregister(&self, field: &str) -> Result<(), StoreError> {
        let (visibility_changed, error_cleared) = {
            let mut inner = self.inner.borrow_mut();
            let meta = inner
                .meta
                .get_mut(field)
                .ok_or_else(|| StoreError::UnknownField {
                    field: field.to_string(),
                })?;
            let visibility_changed = meta.visible;
            meta.visible = false;
            let error_cleared = meta.error.take().is_some();
            (visibility_changed, error_cleared)
        };
        if visibility_changed {
            self.emit(&StoreEvent::VisibilityChanged {
                field: field.to_string(),
                visible: false,
            });
        }
        if error_cleared {
            self.emit(&StoreEvent::ErrorChanged {
                field: field.to_string(),
            });
        }
        Ok(())
    }

    /// Scoped visible assertion: registers now, deregisters when the guard
    /// is dropped -- on every exit path.
    pub fn registration(&self, field: &str) -> Result<Registration, StoreError> {
        self.register(field)?;
        Ok(Registration {
            store: self.clone(),
            field: field.to_string(),
            released: false,
        })
    }

    // ── Subscriptions ─────────────────────────────────────────────────────

    /// Subscribe to store events. The callback runs synchronously inside
    /// the mutating call.
    pub fn subscribe<F>(&self, callback: F) -> SubscriberId
    where
        F: FnMut(&StoreEvent) + 'static,
    {
        let mut inner = self.inner.borrow_mut();
        let id = inner.next_subscriber;
        inner.next_subscriber += 1;
        inner.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Remove a subscription. Unknown ids are ignored.
    pub fn unsubscribe(&self, id: SubscriberId) {
        let mut inner = self.inner.borrow_mut();
        inner.subscribers.retain(|(sid, _)| *sid != id);
        if inner.dispatch_depth > 0 {
            // The list is detached right now; remember the removal so the
            // dispatcher drops this callback when it reattaches the list.
            inner.dead_subscribers.push(id);
        }
    }

    /// Dispatch an event to all subscribers.
    ///
    /// The subscriber list is detached during the calls, so a callback may
    /// read the store, add subscriptions, or unsubscribe itself; additions
    /// and removals take effect after the current event.
    fn emit(&self, event: &StoreEvent) {
        let mut subscribers = {
            let mut inner = self.inner.borrow_mut();
            inner.dispatch_depth += 1;
            std::mem::take(&mut inner.subscribers)
        };
        for (_, callback) in subscribers.iter_mut() {
            callback(event);
        }
        let mut inner = self.inner.borrow_mut();
        inner.dispatch_depth -= 1;
        let added = std::mem::take(&mut inner.subscribers);
        subscribers.extend(added);
        if inner.dispatch_depth == 0 {
            let dead = std::mem::take(&mut inner.dead_subscribers);
            if !dead.is_empty() {
                subscribers.retain(|(sid, _)| !dead.contains(sid));
            }
        }
        inner.subscribers = subscribers;
    }
}

// ──────────────────────────────────────────────
// Registration guard
// ──────────────────────────────────────────────

/// Scoped visible assertion for one field.
///
/// Created by [`FormStore::registration`]; releases (deregisters) on drop.
/// Releasing twice is harmless -- deregistration is idempotent.
pub struct Registration {
    store: FormStore,
    field: String,
    released: bool,
}

impl Registration {
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Release early instead of waiting for drop.
    pub fn release(mut self) {
        self.released = true;
        // The field name was validated when the guard was created.
        let _ = self.store.unregister(&self.field);
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        if !self.released {
            self.released = true;
            let _ = self.store.unregister(&self.field);
        }
    }
}

// ──────────────────────────────────────────────
// Tests
// ──────────────────────────────────────────────
