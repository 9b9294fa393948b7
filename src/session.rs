//! Editor session: one open layout, its editor state, and save bookkeeping.
//!
//! DESIGN
//! ======
//! `EditorSession` exists only for a layout that loaded successfully. If the
//! initial load fails, [`EditorSession::open`] returns an error and no
//! session is created, so the caller goes back to the listing instead of
//! showing a half-initialized canvas.
//!
//! Saving is split in two so editing can continue while a request is out:
//! [`EditorSession::begin_save`] snapshots the element list and takes the
//! in-flight flag, [`PendingSave::run`] performs the request, and
//! [`EditorSession::finish_save`] records the outcome as a dismissible
//! notification. The flag is held by a [`SaveGuard`] inside the pending save
//! and released when it drops, whether the request succeeded, failed, or was
//! abandoned. A second `begin_save` while the flag is held is rejected.
//!
//! ERROR HANDLING
//! ==============
//! A failed save never touches the scene; the user can retry immediately.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use plot_canvas::doc::Element;
use plot_canvas::engine::EditorCore;

use crate::service::{BridgeError, LayoutService};

// =============================================================================
// ERRORS AND NOTIFICATIONS
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The layout could not be loaded; no editor state was created or changed.
    #[error("failed to load layout {id}: {source}")]
    Load {
        id: String,
        #[source]
        source: BridgeError,
    },

    /// A save for this session is already in flight.
    #[error("a save is already in progress")]
    SaveInFlight,

    /// The layout service rejected the save. The scene is unchanged.
    #[error("save failed: {0}")]
    Save(#[source] BridgeError),
}

/// User-facing outcome of the last save, shown until dismissed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Saved,
    SaveFailed(String),
}

// =============================================================================
// SAVE GUARD
// =============================================================================

/// Holds a session's in-flight flag; clears it on drop.
#[derive(Debug)]
pub struct SaveGuard {
    flag: Arc<AtomicBool>,
}

impl SaveGuard {
    /// Take the flag, or `None` if it is already held.
    fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
            .then(|| Self { flag: Arc::clone(flag) })
    }
}

impl Drop for SaveGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// A save that has been started but not yet sent.
pub struct PendingSave {
    service: Arc<dyn LayoutService>,
    layout_id: String,
    snapshot: Vec<Element>,
    _guard: SaveGuard,
}

impl PendingSave {
    /// The element list captured when the save began.
    #[must_use]
    pub fn snapshot(&self) -> &[Element] {
        &self.snapshot
    }

    /// Send the snapshot. The in-flight flag is released when this returns.
    ///
    /// # Errors
    ///
    /// Returns the [`BridgeError`] from the layout service.
    pub async fn run(self) -> Result<(), BridgeError> {
        self.service.save_layout(&self.layout_id, &self.snapshot).await
    }
}

// =============================================================================
// SESSION
// =============================================================================

pub struct EditorSession {
    service: Arc<dyn LayoutService>,
    layout_id: String,
    core: EditorCore,
    saving: Arc<AtomicBool>,
    notification: Option<Notification>,
}

impl EditorSession {
    /// Load `layout_id` and open an editor on it.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Load`] if the layout cannot be fetched.
    pub async fn open(service: Arc<dyn LayoutService>, layout_id: impl Into<String>) -> Result<Self, SessionError> {
        Self::open_with(service, layout_id, EditorCore::new()).await
    }

    /// Like [`EditorSession::open`], with a caller-supplied editor core.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Load`] if the layout cannot be fetched.
    pub async fn open_with(
        service: Arc<dyn LayoutService>,
        layout_id: impl Into<String>,
        mut core: EditorCore,
    ) -> Result<Self, SessionError> {
        let layout_id = layout_id.into();
        let elements = load(service.as_ref(), &layout_id).await?;
        core.load_elements(elements);
        Ok(Self { service, layout_id, core, saving: Arc::new(AtomicBool::new(false)), notification: None })
    }

    /// Reload the layout from the service, discarding unsaved edits.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Load`] on failure; the current scene is kept.
    pub async fn reload(&mut self) -> Result<(), SessionError> {
        let elements = load(self.service.as_ref(), &self.layout_id).await?;
        self.core.load_elements(elements);
        Ok(())
    }

    #[must_use]
    pub fn layout_id(&self) -> &str {
        &self.layout_id
    }

    #[must_use]
    pub fn core(&self) -> &EditorCore {
        &self.core
    }

    pub fn core_mut(&mut self) -> &mut EditorCore {
        &mut self.core
    }

    /// Whether a save is in flight. Hosts disable the save control while true.
    #[must_use]
    pub fn is_saving(&self) -> bool {
        self.saving.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn notification(&self) -> Option<&Notification> {
        self.notification.as_ref()
    }

    pub fn dismiss_notification(&mut self) {
        self.notification = None;
    }

    /// Snapshot the element list and mark a save as in flight.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::SaveInFlight`] if another save has not finished.
    pub fn begin_save(&self) -> Result<PendingSave, SessionError> {
        let Some(guard) = SaveGuard::acquire(&self.saving) else {
            tracing::debug!(layout_id = %self.layout_id, "save rejected; one already in flight");
            return Err(SessionError::SaveInFlight);
        };
        Ok(PendingSave {
            service: Arc::clone(&self.service),
            layout_id: self.layout_id.clone(),
            snapshot: self.core.elements().to_vec(),
            _guard: guard,
        })
    }

    /// Record the outcome of a save as the current notification.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Save`] if the save failed.
    pub fn finish_save(&mut self, result: Result<(), BridgeError>) -> Result<(), SessionError> {
        match result {
            Ok(()) => {
                self.notification = Some(Notification::Saved);
                Ok(())
            }
            Err(e) => {
                tracing::error!(layout_id = %self.layout_id, error = %e, "layout save failed");
                self.notification = Some(Notification::SaveFailed(e.to_string()));
                Err(SessionError::Save(e))
            }
        }
    }

    /// Save the current layout and wait for the outcome.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::SaveInFlight`] or [`SessionError::Save`].
    pub async fn save(&mut self) -> Result<(), SessionError> {
        let pending = self.begin_save()?;
        let result = pending.run().await;
        self.finish_save(result)
    }
}

async fn load(service: &dyn LayoutService, layout_id: &str) -> Result<Vec<Element>, SessionError> {
    service.load_layout(layout_id).await.map_err(|source| {
        tracing::error!(%layout_id, error = %source, "layout load failed");
        SessionError::Load { id: layout_id.to_owned(), source }
    })
}
