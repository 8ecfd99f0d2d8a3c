//! Edit session: the draft behind the create/edit form.
//!
//! A session is seeded empty (create) or from a stored record and its storage
//! index (edit). Saving consumes it; a failed save hands it back so the user
//! can fix the problem and retry. Dropping it discards the draft.

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::error::{Capability, JournalError, Result};
use crate::journal::Journal;
use crate::models::{Draft, GeoPoint, Record};
use crate::providers::{GeoLocator, ImageKind, ImageSource, Permission, PickOutcome, PowerSource};

#[derive(Debug, Clone, PartialEq)]
pub enum SessionMode {
    Create,
    /// `timestamp` and `battery_level` are re-read from storage at commit.
    Update { origin_index: usize, record_id: Uuid },
}

#[derive(Debug, Clone, PartialEq)]
pub struct EditSession {
    draft: Draft,
    mode: SessionMode,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    Created(Record),
    Updated(Record),
}

impl SaveOutcome {
    pub fn record(&self) -> &Record {
        match self {
            SaveOutcome::Created(r) | SaveOutcome::Updated(r) => r,
        }
    }
}

/// A save that did not commit. The session is returned untouched.
#[derive(Error, Debug)]
#[error("{error}")]
pub struct SaveFailure {
    pub session: Box<EditSession>,
    #[source]
    pub error: JournalError,
}

impl Default for EditSession {
    fn default() -> Self {
        Self::new()
    }
}

impl EditSession {
    pub fn new() -> Self {
        Self {
            draft: Draft::default(),
            mode: SessionMode::Create,
        }
    }

    /// Seed from the record stored at `storage_index`.
    pub fn edit(storage_index: usize, record: &Record) -> Self {
        Self {
            draft: Draft::from_record(record),
            mode: SessionMode::Update {
                origin_index: storage_index,
                record_id: record.id,
            },
        }
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn mode(&self) -> &SessionMode {
        &self.mode
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.mode, SessionMode::Update { .. })
    }

    pub fn set_thoughts(&mut self, thoughts: impl Into<String>) {
        self.draft.thoughts = thoughts.into();
    }

    /// Ask for location access, read the position and label it with a city.
    ///
    /// The city is best effort: a failed or empty reverse lookup leaves it blank.
    pub async fn capture_location(&mut self, locator: &dyn GeoLocator) -> Result<GeoPoint> {
        if locator.request_permission().await != Permission::Granted {
            return Err(JournalError::PermissionDenied(Capability::Location));
        }
        let point = locator.current_position().await?;

        let city = match locator.reverse_geocode(point).await {
            Ok(addresses) => addresses
                .first()
                .and_then(|a| a.label())
                .unwrap_or_default()
                .to_string(),
            Err(e) => {
                tracing::warn!("Reverse geocoding failed: {}", e);
                String::new()
            }
        };

        tracing::debug!(
            "Captured location {:.4}, {:.4} ({})",
            point.latitude,
            point.longitude,
            city
        );
        self.draft.location = Some(point);
        self.draft.city = city;
        Ok(point)
    }

    pub async fn pick_image(&mut self, images: &dyn ImageSource) -> Result<()> {
        self.attach_image(images, ImageKind::Gallery).await
    }

    pub async fn take_photo(&mut self, images: &dyn ImageSource) -> Result<()> {
        self.attach_image(images, ImageKind::Camera).await
    }

    async fn attach_image(&mut self, images: &dyn ImageSource, kind: ImageKind) -> Result<()> {
        if images.request_permission(kind).await != Permission::Granted {
            let capability = match kind {
                ImageKind::Gallery => Capability::Gallery,
                ImageKind::Camera => Capability::Camera,
            };
            return Err(JournalError::PermissionDenied(capability));
        }

        let outcome = match kind {
            ImageKind::Gallery => images.pick_from_gallery().await?,
            ImageKind::Camera => images.capture_from_camera().await?,
        };
        match outcome {
            PickOutcome::Picked(uri) => {
                self.draft.image = Some(uri);
                Ok(())
            }
            PickOutcome::Cancelled => Err(JournalError::OperationCancelled),
        }
    }

    /// Commit the draft. Create mode stamps `now` and reads `power`; update
    /// mode keeps the stored stamp and battery, so `power` may be `None`.
    pub async fn save(
        self,
        journal: &Journal,
        power: Option<&dyn PowerSource>,
        now: DateTime<Utc>,
    ) -> std::result::Result<SaveOutcome, SaveFailure> {
        let result = match &self.mode {
            SessionMode::Create => match power {
                Some(power) => match power.battery_level().await {
                    Ok(level) => journal
                        .create(&self.draft, now, level)
                        .await
                        .map(SaveOutcome::Created),
                    Err(e) => Err(e),
                },
                None => Err(JournalError::Device(
                    "no battery source for a new record".to_string(),
                )),
            },
            SessionMode::Update {
                origin_index,
                record_id,
            } => journal
                .update(*origin_index, *record_id, &self.draft)
                .await
                .map(SaveOutcome::Updated),
        };

        result.map_err(|error| SaveFailure {
            session: Box::new(self),
            error,
        })
    }

    /// Leave the form without saving.
    pub fn discard(self) {
        tracing::debug!("Discarded edit session (editing: {})", self.is_editing());
    }
}
