//! The HPI assistant form.
//!
//! Holds the field values, validates before submission, tracks the result area and saves
//! a draft a short while after the last edit. Time is passed in explicitly so the form
//! can be driven by any event loop.

use crate::api::ApiClient;
use crate::draft::{DraftStore, LocalStorage};
use crate::error::{FetchError, FetchResult, StorageResult};
use crate::render;
use api_shared::{HpiReq, HpiRes};
use medref_types::NonEmptyText;
use std::time::{Duration, Instant};

/// How long a missing required field stays highlighted.
pub const HIGHLIGHT_DURATION: Duration = Duration::from_secs(2);
/// Quiet period after the last edit before the draft is saved.
pub const SAVE_DEBOUNCE: Duration = Duration::from_millis(500);

pub const GENERATING_TEXT: &str = "Generating...";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HpiField {
    Gender,
    PastMedicalHistory,
    ChiefComplaint,
    OnsetTiming,
    AccompaniedBy,
    AdditionalSymptoms,
    OtherNotes,
    PertinentNegatives,
    CurrentMedications,
}

impl HpiField {
    pub const ALL: [HpiField; 9] = [
        HpiField::Gender,
        HpiField::PastMedicalHistory,
        HpiField::ChiefComplaint,
        HpiField::OnsetTiming,
        HpiField::AccompaniedBy,
        HpiField::AdditionalSymptoms,
        HpiField::OtherNotes,
        HpiField::PertinentNegatives,
        HpiField::CurrentMedications,
    ];

    /// Fields that must hold non-whitespace text before a request is sent.
    pub const REQUIRED: [HpiField; 2] = [HpiField::OtherNotes, HpiField::ChiefComplaint];

    /// Wire name of the field.
    pub fn key(self) -> &'static str {
        match self {
            HpiField::Gender => "gender",
            HpiField::PastMedicalHistory => "pastMedicalHistory",
            HpiField::ChiefComplaint => "chiefComplaint",
            HpiField::OnsetTiming => "onsetTiming",
            HpiField::AccompaniedBy => "accompaniedBy",
            HpiField::AdditionalSymptoms => "additionalSymptoms",
            HpiField::OtherNotes => "otherNotes",
            HpiField::PertinentNegatives => "pertinentNegatives",
            HpiField::CurrentMedications => "currentMedications",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.key() == key)
    }

    pub fn label(self) -> &'static str {
        match self {
            HpiField::Gender => "Gender",
            HpiField::PastMedicalHistory => "Past medical history",
            HpiField::ChiefComplaint => "Chief complaint",
            HpiField::OnsetTiming => "Onset / timing",
            HpiField::AccompaniedBy => "Accompanied by",
            HpiField::AdditionalSymptoms => "Additional symptoms",
            HpiField::OtherNotes => "Narrative / other notes",
            HpiField::PertinentNegatives => "Pertinent negatives",
            HpiField::CurrentMedications => "Current medications",
        }
    }

    pub fn value(self, req: &HpiReq) -> &str {
        match self {
            HpiField::Gender => &req.gender,
            HpiField::PastMedicalHistory => &req.past_medical_history,
            HpiField::ChiefComplaint => &req.chief_complaint,
            HpiField::OnsetTiming => &req.onset_timing,
            HpiField::AccompaniedBy => &req.accompanied_by,
            HpiField::AdditionalSymptoms => &req.additional_symptoms,
            HpiField::OtherNotes => &req.other_notes,
            HpiField::PertinentNegatives => &req.pertinent_negatives,
            HpiField::CurrentMedications => &req.current_medications,
        }
    }

    fn value_mut(self, req: &mut HpiReq) -> &mut String {
        match self {
            HpiField::Gender => &mut req.gender,
            HpiField::PastMedicalHistory => &mut req.past_medical_history,
            HpiField::ChiefComplaint => &mut req.chief_complaint,
            HpiField::OnsetTiming => &mut req.onset_timing,
            HpiField::AccompaniedBy => &mut req.accompanied_by,
            HpiField::AdditionalSymptoms => &mut req.additional_symptoms,
            HpiField::OtherNotes => &mut req.other_notes,
            HpiField::PertinentNegatives => &mut req.pertinent_negatives,
            HpiField::CurrentMedications => &mut req.current_medications,
        }
    }
}

/// Required fields of `req` that are blank.
pub fn missing_required(req: &HpiReq) -> Vec<HpiField> {
    HpiField::REQUIRED
        .into_iter()
        .filter(|f| NonEmptyText::optional(f.value(req)).is_none())
        .collect()
}

/// What the result area under the form shows.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ResultArea {
    #[default]
    Empty,
    Generating,
    /// The generated HPI as returned by the server.
    Generated(String),
    /// Literal error text.
    Failed(String),
}

impl ResultArea {
    pub fn html(&self) -> String {
        match self {
            ResultArea::Empty => String::new(),
            ResultArea::Generating => GENERATING_TEXT.to_string(),
            ResultArea::Generated(text) => render::multiline(text),
            ResultArea::Failed(text) => render::escape_html(text),
        }
    }
}

/// Error text shown for a failed generation request.
pub fn failure_text(err: &FetchError) -> String {
    match err {
        FetchError::Status {
            error: Some(message),
            ..
        } => message.clone(),
        FetchError::Status { status, .. } => format!("Error: {status}"),
        FetchError::Network(description) | FetchError::Decode(description) => {
            format!("Error: {description}")
        }
    }
}

/// Trailing-edge debounce: fires once `delay` has passed since the last touch.
#[derive(Clone, Copy, Debug)]
pub struct Debounce {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debounce {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    pub fn touch(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    /// Whether the deadline has passed. Firing resets the debounce.
    pub fn fire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}

pub struct HpiForm<S> {
    fields: HpiReq,
    result: ResultArea,
    submitting: bool,
    flagged: Vec<HpiField>,
    flagged_until: Option<Instant>,
    save: Debounce,
    drafts: DraftStore<S>,
}

impl<S: LocalStorage> HpiForm<S> {
    /// Opens the form, restoring the saved draft if there is one.
    pub fn open(drafts: DraftStore<S>) -> Self {
        let fields = match drafts.load() {
            Some(draft) => {
                tracing::debug!("restored HPI draft saved at {}", draft.saved_at);
                draft.fields
            }
            None => HpiReq::default(),
        };
        Self {
            fields,
            result: ResultArea::Empty,
            submitting: false,
            flagged: Vec::new(),
            flagged_until: None,
            save: Debounce::new(SAVE_DEBOUNCE),
            drafts,
        }
    }

    pub fn fields(&self) -> &HpiReq {
        &self.fields
    }

    pub fn result(&self) -> &ResultArea {
        &self.result
    }

    /// Whether a request is in flight; the submit control is disabled meanwhile.
    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn drafts(&self) -> &DraftStore<S> {
        &self.drafts
    }

    /// Records an edit and restarts the save debounce.
    pub fn set(&mut self, field: HpiField, value: impl Into<String>, now: Instant) {
        *field.value_mut(&mut self.fields) = value.into();
        self.save.touch(now);
    }

    /// Saves the draft if the debounce has elapsed. Returns whether a save happened.
    ///
    /// A failed save is retried after another quiet period.
    pub fn tick(&mut self, now: Instant) -> bool {
        if !self.save.fire(now) {
            return false;
        }
        if let Err(e) = self.drafts.save(&self.fields) {
            tracing::warn!("failed to save HPI draft: {}", e);
            self.save.touch(now);
            return false;
        }
        true
    }

    /// Empties every field and the result area and removes the saved draft.
    pub fn clear(&mut self) -> StorageResult<()> {
        self.fields = HpiReq::default();
        self.result = ResultArea::Empty;
        self.flagged.clear();
        self.flagged_until = None;
        self.save.cancel();
        self.drafts.clear()
    }

    pub fn is_highlighted(&self, field: HpiField, now: Instant) -> bool {
        self.flagged_until.is_some_and(|until| now < until) && self.flagged.contains(&field)
    }

    /// Validates and, when the form is complete, enters the submitting state.
    ///
    /// Returns the request to send, or `None` when a required field is blank (those
    /// fields are flagged and the result area is left alone) or a request is already
    /// in flight.
    pub fn begin_submit(&mut self, now: Instant) -> Option<HpiReq> {
        if self.submitting {
            return None;
        }
        let missing = missing_required(&self.fields);
        if !missing.is_empty() {
            tracing::debug!(
                "HPI form incomplete: {:?}",
                missing.iter().map(|f| f.key()).collect::<Vec<_>>()
            );
            self.flagged = missing;
            self.flagged_until = Some(now + HIGHLIGHT_DURATION);
            return None;
        }
        self.submitting = true;
        self.result = ResultArea::Generating;
        Some(self.fields.clone())
    }

    pub fn finish_submit(&mut self, outcome: FetchResult<HpiRes>) {
        self.submitting = false;
        self.result = match outcome {
            Ok(res) => ResultArea::Generated(res.generated_hpi),
            Err(e) => {
                tracing::error!("HPI generation request failed: {}", e);
                ResultArea::Failed(failure_text(&e))
            }
        };
    }

    /// Validates, posts the form and records the outcome. Returns whether a request was
    /// sent.
    pub async fn submit(&mut self, client: &ApiClient, now: Instant) -> bool {
        let Some(req) = self.begin_submit(now) else {
            return false;
        };
        let outcome = client.generate_hpi(&req).await;
        self.finish_submit(outcome);
        true
    }
}
