//! `FormSession` owns one in-progress application and gates navigation on
//! validation.

use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use super::model::{ApplicationData, Draft, FieldSet, Section, SectionPatch};
use super::rules::{self, FieldErrors};
use super::state::{FormStep, StepOutcome};
use super::summary::ApplicationSummary;
use crate::config::FormConfig;
use crate::error::{Result, StorageError};
use crate::store::DraftStore;

/// A single applicant's pass through the form.
///
/// All mutation goes through `&mut self`, so one caller owns the session and
/// draft writes can never interleave.
pub struct FormSession {
    id: Uuid,
    store: Arc<dyn DraftStore>,
    config: FormConfig,
    data: ApplicationData,
    errors: FieldErrors,
}

impl FormSession {
    /// Start a session, resuming the stored draft when one can be read.
    ///
    /// Never fails: a missing, unreadable, or malformed draft yields the
    /// default empty application.
    pub async fn initialize(store: Arc<dyn DraftStore>, config: FormConfig) -> Self {
        let id = Uuid::new_v4();
        let data = match load_draft(store.as_ref(), &config.draft_key).await {
            Ok(Some(draft)) => {
                info!(session = %id, step = %draft.current_step, "Restored application draft");
                ApplicationData::from_draft(draft)
            }
            Ok(None) => ApplicationData::default(),
            Err(e) => {
                warn!(session = %id, error = %e, "Discarding unreadable application draft");
                ApplicationData::default()
            }
        };

        Self {
            id,
            store,
            config,
            data,
            errors: FieldErrors::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &FormConfig {
        &self.config
    }

    /// Current application data.
    pub fn data(&self) -> &ApplicationData {
        &self.data
    }

    /// Errors currently shown to the applicant.
    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn current_step(&self) -> FormStep {
        self.data.current_step
    }

    pub fn validated_fields(&self) -> &FieldSet {
        &self.data.validated_fields
    }

    /// Merge a partial update into one section. Does not validate.
    pub fn update_field(&mut self, patch: impl Into<SectionPatch>) {
        let patch = patch.into();
        debug!(session = %self.id, section = %patch.section(), "Updating section");
        self.data.apply(patch);
    }

    /// Mark `field` as touched and refresh the visible errors.
    ///
    /// The new error map holds `field`'s own result plus the results of every
    /// other touched field on the current step, so a sibling's stale error
    /// does not survive a change to shared context.
    pub fn touch_and_validate_field(&mut self, section: Section, field: &str) {
        let limits = &self.config.limits;
        let step = self.data.current_step;

        let previously_touched: FieldSet = self
            .data
            .validated_fields
            .iter()
            .filter(|f| f.as_str() != field && step.owns_field(f))
            .cloned()
            .collect();
        self.data.validated_fields.insert(field.to_string());

        let field_only: FieldSet = std::iter::once(field.to_string()).collect();
        let field_errors = rules::validate_section(&self.data, section, &field_only, limits);

        let mut errors = rules::validate_step(&self.data, step, &previously_touched, limits);
        errors.extend(field_errors);

        debug!(
            session = %self.id,
            section = %section,
            field,
            error = errors.get(field).map(String::as_str),
            "Validated field"
        );
        self.errors = errors;
    }

    /// Validate `step` against the current data, restricted to `fields`.
    pub fn validate_step(&self, step: FormStep, fields: &FieldSet) -> FieldErrors {
        rules::validate_step(&self.data, step, fields, &self.config.limits)
    }

    /// Touch every field of the current step, store the step's errors, and
    /// report whether there were none.
    pub fn validate_current_step_all_fields(&mut self) -> bool {
        let step = self.data.current_step;
        let fields = rules::all_fields(step);
        self.data.validated_fields.extend(fields.iter().cloned());

        self.errors = self.validate_step(step, &fields);
        debug!(session = %self.id, step = %step, errors = self.errors.len(), "Validated step");
        self.errors.is_empty()
    }

    /// Move forward one step if the current step is valid.
    ///
    /// On the confirmation step a successful pass reports
    /// [`StepOutcome::ReadyToSubmit`] and the step stays put.
    pub fn advance_step(&mut self) -> StepOutcome {
        if !self.validate_current_step_all_fields() {
            info!(
                session = %self.id,
                step = %self.data.current_step,
                errors = self.errors.len(),
                "Step blocked by validation"
            );
            return StepOutcome::Blocked;
        }

        let from = self.data.current_step;
        match from.next() {
            Some(next) if from.can_transition_to(next) => {
                self.data.current_step = next;
                info!(session = %self.id, from = %from, to = %next, "Advanced step");
                StepOutcome::Advanced(next)
            }
            _ => StepOutcome::ReadyToSubmit,
        }
    }

    /// Move back one step. No-op on the first step; never validates.
    pub fn retreat_step(&mut self) -> FormStep {
        if let Some(previous) = self.data.current_step.previous() {
            debug!(
                session = %self.id,
                from = %self.data.current_step,
                to = %previous,
                "Retreated step"
            );
            self.data.current_step = previous;
        }
        self.data.current_step
    }

    /// Whether the form is on the confirmation step with nothing left to fix.
    pub fn can_submit(&self) -> bool {
        self.errors.is_empty() && self.data.current_step.is_last()
    }

    /// Persist everything except documents and the touched-field set.
    ///
    /// A failed write leaves the session untouched so saving can be retried.
    /// Takes `&mut self` so at most one draft write per session is in flight.
    pub async fn save_draft(&mut self) -> Result<()> {
        let json = serde_json::to_string(&self.data.to_draft())
            .map_err(|e| StorageError::Serialization(e.to_string()))?;
        self.store.set(&self.config.draft_key, &json).await?;
        info!(session = %self.id, step = %self.data.current_step, "Saved application draft");
        Ok(())
    }

    /// Delete the stored draft. Deleting a missing draft succeeds.
    pub async fn discard_draft(&mut self) -> Result<()> {
        let removed = self.store.remove(&self.config.draft_key).await?;
        info!(session = %self.id, removed, "Discarded application draft");
        Ok(())
    }

    /// Finalize the application from the confirmation step.
    ///
    /// Validates like [`advance_step`](Self::advance_step); on success marks
    /// the application complete and deletes its draft. Sending the data
    /// anywhere is the caller's job.
    pub async fn submit(&mut self) -> Result<StepOutcome> {
        if !self.data.current_step.is_last() {
            warn!(
                session = %self.id,
                step = %self.data.current_step,
                "Submit requested before review step"
            );
            return Ok(StepOutcome::Blocked);
        }
        if !self.advance_step().is_success() {
            return Ok(StepOutcome::Blocked);
        }

        self.discard_draft().await?;
        self.data.is_complete = true;
        info!(session = %self.id, "Application submitted");
        Ok(StepOutcome::Submitted)
    }

    /// Review digest of the current data.
    pub fn summary(&self) -> ApplicationSummary {
        ApplicationSummary::from_data(&self.data)
    }
}

async fn load_draft(
    store: &dyn DraftStore,
    key: &str,
) -> std::result::Result<Option<Draft>, StorageError> {
    let Some(raw) = store.get(key).await? else {
        return Ok(None);
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|e| StorageError::Serialization(e.to_string()))
}
