//! Form State Store
//!
//! `FormStore` owns the form tree and is the only way to mutate it. Every
//! edit goes through a [`FieldPath`] or an [`ArrayPath`]; structural edits
//! end in a single reconciliation step that rewrites companion count fields
//! from the array lengths and clamps cursors. After each mutation, watchers
//! whose field verdict changed are notified.

use crate::codec::{
    self, RegistrationEnvelope, RegistrationTransport, TemplateDocument, TemplateResponse,
    WorkloadRegistrationRequest,
};
use crate::error::{Result, TemplateError};
use crate::models::{GpuUtilization, PreloadedTemplate, Session, TrainingEvent, WorkloadTemplate};
use crate::observability::StructuredLogger;
use crate::path::{ArrayPath, FieldPath};
use crate::randomize;
use crate::sync::{self, SessionTabs, MAX_GPUS, MAX_SESSIONS, MAX_TRAINING_EVENTS};
use crate::validation::{self, ValidationReport, Validity};
use rand::Rng;
use std::fmt;
use tracing::{debug, warn};
use uuid::Uuid;

/// Value read from or written to a single field
///
/// Writes are coerced to the field's type: numeric text is accepted for
/// numeric fields, and whole numbers are accepted for integer fields.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Integer(i64),
    Number(f64),
    Bool(bool),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            FieldValue::Integer(v) => Some(*v),
            FieldValue::Number(v) if v.is_finite() && v.fract() == 0.0 => Some(*v as i64),
            FieldValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Integer(v) => Some(*v as f64),
            FieldValue::Number(v) => Some(*v),
            FieldValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Bool(v) => Some(*v),
            FieldValue::Text(s) => s.trim().parse().ok(),
            _ => None,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(s) => write!(f, "{}", s),
            FieldValue::Integer(v) => write!(f, "{}", v),
            FieldValue::Number(v) => write!(f, "{}", v),
            FieldValue::Bool(v) => write!(f, "{}", v),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Integer(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

pub type SubscriptionId = u64;

/// Called with the watched path and its new verdict
pub type WatchCallback = Box<dyn FnMut(&FieldPath, Validity) + Send>;

struct Subscription {
    id: SubscriptionId,
    path: FieldPath,
    /// `None` while the path does not resolve in the current tree
    last: Option<Validity>,
    callback: WatchCallback,
}

/// Owner of the workload template form
pub struct FormStore {
    template: WorkloadTemplate,
    tabs: SessionTabs,
    selected_template: Option<PreloadedTemplate>,
    subscriptions: Vec<Subscription>,
    next_subscription: SubscriptionId,
    logger: StructuredLogger,
}

impl Default for FormStore {
    fn default() -> Self {
        Self::new()
    }
}

impl FormStore {
    /// Create a store holding a default form
    pub fn new() -> Self {
        Self::with_template(WorkloadTemplate::default())
    }

    /// Create a store holding `template`, reconciled
    pub fn with_template(mut template: WorkloadTemplate) -> Self {
        reconcile_tree(&mut template);
        Self {
            tabs: SessionTabs::new(template.sessions.len()),
            template,
            selected_template: None,
            subscriptions: Vec::new(),
            next_subscription: 1,
            logger: StructuredLogger::default(),
        }
    }

    pub fn with_logger(mut self, logger: StructuredLogger) -> Self {
        self.logger = logger;
        self
    }

    pub fn template(&self) -> &WorkloadTemplate {
        &self.template
    }

    pub fn tabs(&self) -> &SessionTabs {
        &self.tabs
    }

    /// Index of the session whose tab is active
    pub fn active_session(&self) -> usize {
        self.tabs.active()
    }

    pub fn selected_template(&self) -> Option<&PreloadedTemplate> {
        self.selected_template.as_ref()
    }

    // ---- single fields ----

    /// Read one field
    pub fn get(&self, path: &FieldPath) -> Result<FieldValue> {
        let tree = &self.template;
        let session = |s| validation::session_at(tree, s);
        let training = |s, t| validation::training_at(tree, s, t).map(|(_, training)| training);

        let value = match *path {
            FieldPath::WorkloadTitle => FieldValue::Text(tree.workload_title.clone()),
            FieldPath::WorkloadSeed => FieldValue::Integer(tree.workload_seed),
            FieldPath::SessionsSamplePercentage => {
                FieldValue::Number(tree.sessions_sample_percentage)
            }
            FieldPath::TimescaleAdjustmentFactor => {
                FieldValue::Number(tree.timescale_adjustment_factor)
            }
            FieldPath::DebugLoggingEnabled => FieldValue::Bool(tree.debug_logging_enabled),
            FieldPath::SessionId(s) => FieldValue::Text(session(s)?.id.clone()),
            FieldPath::SessionStartTick(s) => FieldValue::Integer(session(s)?.start_tick),
            FieldPath::SessionStopTick(s) => FieldValue::Integer(session(s)?.stop_tick),
            FieldPath::NumTrainingEvents(s) => {
                FieldValue::Integer(session(s)?.num_training_events as i64)
            }
            FieldPath::SelectedTrainingEvent(s) => {
                FieldValue::Integer(session(s)?.selected_training_event as i64)
            }
            FieldPath::TrainingStartTick(s, t) => FieldValue::Integer(training(s, t)?.start_tick),
            FieldPath::TrainingDuration(s, t) => {
                FieldValue::Integer(training(s, t)?.duration_in_ticks)
            }
            FieldPath::TrainingCpus(s, t) => FieldValue::Number(training(s, t)?.cpus),
            FieldPath::TrainingMemory(s, t) => FieldValue::Number(training(s, t)?.memory),
            FieldPath::TrainingVram(s, t) => FieldValue::Number(training(s, t)?.vram),
            FieldPath::TrainingGpus(s, t) => FieldValue::Integer(training(s, t)?.declared_gpus()),
            FieldPath::GpuUtilization(s, t, g) => {
                let training = training(s, t)?;
                let gpu = training.gpu_utilizations.get(g).ok_or(TemplateError::IndexOutOfRange {
                    what: "GPU",
                    index: g,
                    len: training.gpu_utilizations.len(),
                })?;
                FieldValue::Number(gpu.utilization)
            }
        };

        Ok(value)
    }

    /// Write one field
    ///
    /// Count fields resize their arrays: `num_training_events` grows or
    /// shrinks the training list, and a training's `gpus` resizes its
    /// utilization list to the count clamped to `[0, 16]`. The declared GPU
    /// count itself is stored unclamped so it can be flagged by validation.
    pub fn set(&mut self, path: FieldPath, value: impl Into<FieldValue>) -> Result<()> {
        let value = value.into();
        self.apply(&path, &value)?;

        debug!(field = %path, value = %value, "Field updated");
        self.notify();
        Ok(())
    }

    fn apply(&mut self, path: &FieldPath, value: &FieldValue) -> Result<()> {
        let tree = &mut self.template;

        match *path {
            FieldPath::WorkloadTitle => tree.workload_title = text(path, value)?,
            FieldPath::WorkloadSeed => {
                tree.workload_seed = match value {
                    FieldValue::Text(s) if s.trim().is_empty() => 0,
                    _ => integer(path, value)?,
                }
            }
            FieldPath::SessionsSamplePercentage => {
                tree.sessions_sample_percentage = number(path, value)?
            }
            FieldPath::TimescaleAdjustmentFactor => {
                tree.timescale_adjustment_factor = number(path, value)?
            }
            FieldPath::DebugLoggingEnabled => tree.debug_logging_enabled = boolean(path, value)?,
            FieldPath::SessionId(s) => session_mut(tree, s)?.id = text(path, value)?,
            FieldPath::SessionStartTick(s) => session_mut(tree, s)?.start_tick = integer(path, value)?,
            FieldPath::SessionStopTick(s) => session_mut(tree, s)?.stop_tick = integer(path, value)?,
            FieldPath::NumTrainingEvents(s) => {
                let count = sync::clamp_training_count(integer(path, value)?);
                check_count("training event", count, MAX_TRAINING_EVENTS)?;
                let session = session_mut(tree, s)?;
                let delta = sync::resize(&mut session.trainings, count, TrainingEvent::default);
                session.num_training_events = session.trainings.len();
                session.selected_training_event =
                    sync::clamp_cursor(session.selected_training_event, session.trainings.len());
                debug!(session = s, delta, "Resized training events");
            }
            FieldPath::SelectedTrainingEvent(s) => {
                let index = usize::try_from(integer(path, value)?)
                    .map_err(|_| mismatch(path, "a non-negative integer"))?;
                select_training(session_mut(tree, s)?, index)?;
            }
            FieldPath::TrainingStartTick(s, t) => {
                training_mut(tree, s, t)?.start_tick = integer(path, value)?
            }
            FieldPath::TrainingDuration(s, t) => {
                training_mut(tree, s, t)?.duration_in_ticks = integer(path, value)?
            }
            FieldPath::TrainingCpus(s, t) => training_mut(tree, s, t)?.cpus = number(path, value)?,
            FieldPath::TrainingMemory(s, t) => {
                training_mut(tree, s, t)?.memory = number(path, value)?
            }
            FieldPath::TrainingVram(s, t) => training_mut(tree, s, t)?.vram = number(path, value)?,
            FieldPath::TrainingGpus(s, t) => {
                let declared = integer(path, value)?;
                let training = training_mut(tree, s, t)?;
                training.gpus = Some(declared);
                let delta = sync::resize(
                    &mut training.gpu_utilizations,
                    sync::clamp_gpu_count(declared),
                    GpuUtilization::default,
                );
                debug!(session = s, training = t, delta, "Resized GPU utilizations");
            }
            FieldPath::GpuUtilization(s, t, g) => {
                let utilization = number(path, value)?;
                let training = training_mut(tree, s, t)?;
                let len = training.gpu_utilizations.len();
                let gpu = training
                    .gpu_utilizations
                    .get_mut(g)
                    .ok_or(TemplateError::IndexOutOfRange { what: "GPU", index: g, len })?;
                gpu.utilization = utilization;
            }
        }

        Ok(())
    }

    // ---- watchers ----

    /// Watch a field's verdict
    ///
    /// The callback fires after any mutation that changes the verdict,
    /// including edits to other fields the rule depends on. It does not
    /// fire on registration.
    pub fn watch<F>(&mut self, path: FieldPath, callback: F) -> SubscriptionId
    where
        F: FnMut(&FieldPath, Validity) + Send + 'static,
    {
        let id = self.next_subscription;
        self.next_subscription += 1;

        self.subscriptions.push(Subscription {
            id,
            path,
            last: validation::validate_field(&self.template, &path).ok(),
            callback: Box::new(callback),
        });
        id
    }

    /// Stop watching; returns false for unknown IDs
    pub fn unwatch(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.id != id);
        self.subscriptions.len() != before
    }

    fn notify(&mut self) {
        let tree = &self.template;
        for sub in self.subscriptions.iter_mut() {
            let current = validation::validate_field(tree, &sub.path).ok();
            if current == sub.last {
                continue;
            }
            sub.last = current;
            if let Some(validity) = current {
                (sub.callback)(&sub.path, validity);
            }
        }
    }

    // ---- arrays ----

    pub fn array_len(&self, array: ArrayPath) -> Result<usize> {
        let tree = &self.template;
        Ok(match array {
            ArrayPath::Sessions => tree.sessions.len(),
            ArrayPath::Trainings(s) => validation::session_at(tree, s)?.trainings.len(),
            ArrayPath::GpuUtilizations(s, t) => {
                validation::training_at(tree, s, t)?.1.gpu_utilizations.len()
            }
        })
    }

    /// Grow or shrink an array to `len`, appending defaults or removing from the tail
    ///
    /// GPU utilization arrays are capped at 16 entries. Session and
    /// training-event lengths past their maximum are rejected. Returns the
    /// number of elements added (positive) or removed (negative).
    pub fn resize(&mut self, array: ArrayPath, len: usize) -> Result<isize> {
        let delta = match array {
            ArrayPath::Sessions => {
                check_count("session", len, MAX_SESSIONS)?;
                let delta = sync::resize(&mut self.template.sessions, len, Session::default);
                while self.tabs.len() < len {
                    self.tabs.push();
                }
                self.tabs.truncate(len);
                delta
            }
            ArrayPath::Trainings(s) => {
                check_count("training event", len, MAX_TRAINING_EVENTS)?;
                let session = session_mut(&mut self.template, s)?;
                sync::resize(&mut session.trainings, len, TrainingEvent::default)
            }
            ArrayPath::GpuUtilizations(s, t) => {
                let training = training_mut(&mut self.template, s, t)?;
                let delta = sync::resize(
                    &mut training.gpu_utilizations,
                    len.min(MAX_GPUS as usize),
                    GpuUtilization::default,
                );
                training.gpus = Some(training.gpu_utilizations.len() as i64);
                delta
            }
        };

        self.reconcile();
        debug!(array = %array, len, delta, "Resized array");
        self.notify();
        Ok(delta)
    }

    /// Append one default element; returns its index
    pub fn append(&mut self, array: ArrayPath) -> Result<usize> {
        let len = self.array_len(array)?;
        if matches!(array, ArrayPath::GpuUtilizations(..)) && len >= MAX_GPUS as usize {
            return Err(TemplateError::IndexOutOfRange {
                what: "GPU",
                index: len,
                len,
            });
        }

        self.resize(array, len + 1)?;
        Ok(len)
    }

    /// Remove the element at `index`
    ///
    /// Cursors past the new end are clamped to the last element. The only
    /// remaining session cannot be removed.
    pub fn remove(&mut self, array: ArrayPath, index: usize) -> Result<()> {
        match array {
            ArrayPath::Sessions => {
                check_index("session", index, self.template.sessions.len())?;
                if self.template.sessions.len() <= 1 {
                    return Err(TemplateError::LastSession);
                }
                self.template.sessions.remove(index);
                self.tabs.remove(index);
            }
            ArrayPath::Trainings(s) => {
                let session = session_mut(&mut self.template, s)?;
                check_index("training event", index, session.trainings.len())?;
                session.trainings.remove(index);
            }
            ArrayPath::GpuUtilizations(s, t) => {
                let training = training_mut(&mut self.template, s, t)?;
                check_index("GPU", index, training.gpu_utilizations.len())?;
                training.gpu_utilizations.remove(index);
                training.gpus = Some(training.gpu_utilizations.len() as i64);
            }
        }

        self.reconcile();
        debug!(array = %array, index, "Removed array element");
        self.notify();
        Ok(())
    }

    /// Open a new session tab with a default session; the new tab becomes active
    pub fn add_session(&mut self) -> Result<usize> {
        self.append(ArrayPath::Sessions)
    }

    /// Close a session tab
    pub fn remove_session(&mut self, index: usize) -> Result<()> {
        self.remove(ArrayPath::Sessions, index)
    }

    pub fn select_tab(&mut self, index: usize) -> Result<()> {
        if self.tabs.select(index) {
            Ok(())
        } else {
            Err(TemplateError::IndexOutOfRange {
                what: "session tab",
                index,
                len: self.tabs.len(),
            })
        }
    }

    pub fn select_training_event(&mut self, session: usize, index: usize) -> Result<()> {
        self.set(FieldPath::SelectedTrainingEvent(session), index as i64)
    }

    fn reconcile(&mut self) {
        reconcile_tree(&mut self.template);
        if self.tabs.len() != self.template.sessions.len() {
            self.tabs.rebuild(self.template.sessions.len());
        }
    }

    // ---- whole tree ----

    /// Assign random resources to one training event
    pub fn randomize_training(&mut self, session: usize, training: usize) -> Result<()> {
        self.randomize_training_with(session, training, &mut rand::thread_rng())
    }

    pub fn randomize_training_with<R: Rng + ?Sized>(
        &mut self,
        session: usize,
        training: usize,
        rng: &mut R,
    ) -> Result<()> {
        let event = training_mut(&mut self.template, session, training)?;
        randomize::randomize_training(event, rng);

        debug!(session, training, "Randomized training event resources");
        self.notify();
        Ok(())
    }

    /// Discard all edits and return to defaults
    pub fn reset(&mut self) {
        self.reset_with("requested");
    }

    /// Discard the form when the editor is closed
    pub fn close(&mut self) {
        self.reset_with("closed");
    }

    fn reset_with(&mut self, reason: &str) {
        self.template = WorkloadTemplate::default();
        self.tabs = SessionTabs::default();
        self.selected_template = None;
        self.logger.log_reset(reason);
        self.notify();
    }

    /// Replace the whole tree
    ///
    /// Count fields are rewritten from array lengths, tabs are renamed
    /// `Session 1..N`, and the active tab is clamped to the new length.
    pub fn replace(&mut self, mut template: WorkloadTemplate) {
        reconcile_tree(&mut template);
        self.tabs.rebuild(template.sessions.len());
        self.template = template;
        self.notify();
    }

    /// Import an uploaded JSON document
    ///
    /// Accepts a bare form, `{"template": ...}`, or
    /// `{"preloaded_template": ...}`. On any parse failure the store is left
    /// exactly as it was.
    pub fn apply_json(&mut self, text: &str) -> Result<()> {
        let document = match codec::parse_template_document(text) {
            Ok(document) => document,
            Err(e) => {
                self.logger.log_import_failed("json", &e.to_string());
                return Err(e);
            }
        };

        match document {
            TemplateDocument::Form(form)
            | TemplateDocument::Response(TemplateResponse::Template(form)) => {
                self.selected_template = None;
                self.replace(form);
                self.logger.log_imported(
                    "json",
                    self.template.sessions.len(),
                    self.template.num_training_events(),
                );
            }
            TemplateDocument::Response(TemplateResponse::PreloadedTemplate(descriptor)) => {
                let response = TemplateResponse::PreloadedTemplate(descriptor.clone());
                self.select_preloaded(descriptor, response);
            }
        }

        Ok(())
    }

    /// Record a catalog selection and apply the backend's response for it
    ///
    /// Inline templates replace the tree. Large templates leave the tree as
    /// it is; their sessions are never sent.
    pub fn select_preloaded(&mut self, descriptor: PreloadedTemplate, response: TemplateResponse) {
        match response {
            TemplateResponse::Template(form) => self.replace(form),
            TemplateResponse::PreloadedTemplate(resolved) => {
                debug!(
                    key = %resolved.key,
                    filepath = %resolved.filepath,
                    large = resolved.large,
                    "Selected server-resident template"
                );
            }
        }

        self.logger.log_imported(
            &format!("preloaded:{}", descriptor.key),
            self.template.sessions.len(),
            self.template.num_training_events(),
        );
        self.selected_template = Some(descriptor);
    }

    pub fn clear_selected_template(&mut self) {
        self.selected_template = None;
    }

    // ---- validation ----

    pub fn validity(&self, path: &FieldPath) -> Result<Validity> {
        validation::validate_field(&self.template, path)
    }

    pub fn validate(&self) -> ValidationReport {
        let report = validation::validate_template(&self.template);
        self.logger.log_validation(&report);
        report
    }

    /// Number of error verdicts that block submission
    ///
    /// Session fields are ignored when a large preloaded template is
    /// selected, since its sessions are not sent.
    fn blocking_errors(&self) -> usize {
        let skip_sessions = self.selected_template.as_ref().is_some_and(|t| t.large);

        FieldPath::all(&self.template)
            .iter()
            .filter(|path| !(skip_sessions && path.session_index().is_some()))
            .filter(|path| {
                validation::validate_field(&self.template, path)
                    .map(|v| v.is_error())
                    .unwrap_or(false)
            })
            .count()
    }

    // ---- submission ----

    /// Build the registration envelope for the current tree
    ///
    /// Derivation runs on a copy; the live tree is not modified.
    pub fn build_registration(&self, msg_id: Option<Uuid>) -> RegistrationEnvelope {
        let request =
            WorkloadRegistrationRequest::from_template(&self.template, self.selected_template.as_ref());
        RegistrationEnvelope::new(request, msg_id)
    }

    /// Raw form JSON for download
    pub fn export_json(&self) -> Result<String> {
        codec::export_form_json(&self.template)
    }

    /// Validate, derive, and hand the envelope to `transport`
    ///
    /// On success the form is reset and the message ID is returned. A
    /// validation failure or transport error leaves the form untouched.
    pub fn submit<T>(&mut self, transport: &mut T) -> Result<String>
    where
        T: RegistrationTransport + ?Sized,
    {
        self.submit_with_msg_id(transport, None)
    }

    /// Like [`FormStore::submit`], with a caller-chosen message ID
    pub fn submit_with_msg_id<T>(&mut self, transport: &mut T, msg_id: Option<Uuid>) -> Result<String>
    where
        T: RegistrationTransport + ?Sized,
    {
        let errors = self.blocking_errors();
        if errors > 0 {
            warn!(errors, "Refusing to submit template with invalid fields");
            return Err(TemplateError::ValidationFailed { errors });
        }

        let envelope = self.build_registration(msg_id);
        let payload = envelope.to_json()?;
        let request = &envelope.workload_registration_request;

        match transport.send(&request.name, &payload, &envelope.msg_id) {
            Ok(()) => {
                self.logger.log_registered(
                    &request.name,
                    &envelope.msg_id,
                    request.sessions.len(),
                    &request.template_file_path,
                );
                self.reset_with("submitted");
                Ok(envelope.msg_id)
            }
            Err(e) => {
                self.logger
                    .log_registration_failed(&request.name, &envelope.msg_id, &e.to_string());
                Err(e)
            }
        }
    }
}

/// Rewrite companion count fields from array lengths and clamp cursors
///
/// The array length always wins. A declared GPU count is kept as entered as
/// long as it clamps to the utilization array's length.
pub fn reconcile_tree(template: &mut WorkloadTemplate) {
    template.number_of_sessions = template.sessions.len();

    for session in template.sessions.iter_mut() {
        session.num_training_events = session.trainings.len();
        session.selected_training_event =
            sync::clamp_cursor(session.selected_training_event, session.trainings.len());

        for training in session.trainings.iter_mut() {
            let len = training.gpu_utilizations.len();
            if sync::clamp_gpu_count(training.declared_gpus()) != len {
                training.gpus = Some(len as i64);
            }
        }
    }
}

fn select_training(session: &mut Session, index: usize) -> Result<()> {
    let len = session.trainings.len();
    if index < len || (index == 0 && len == 0) {
        session.selected_training_event = index;
        Ok(())
    } else {
        Err(TemplateError::IndexOutOfRange {
            what: "training event",
            index,
            len,
        })
    }
}

fn session_mut(template: &mut WorkloadTemplate, s: usize) -> Result<&mut Session> {
    let len = template.sessions.len();
    template.sessions.get_mut(s).ok_or(TemplateError::IndexOutOfRange {
        what: "session",
        index: s,
        len,
    })
}

fn training_mut(template: &mut WorkloadTemplate, s: usize, t: usize) -> Result<&mut TrainingEvent> {
    let session = session_mut(template, s)?;
    let len = session.trainings.len();
    session.trainings.get_mut(t).ok_or(TemplateError::IndexOutOfRange {
        what: "training event",
        index: t,
        len,
    })
}

fn check_index(what: &'static str, index: usize, len: usize) -> Result<()> {
    if index < len {
        Ok(())
    } else {
        Err(TemplateError::IndexOutOfRange { what, index, len })
    }
}

fn check_count(what: &'static str, requested: usize, max: usize) -> Result<()> {
    if requested <= max {
        Ok(())
    } else {
        Err(TemplateError::CountOutOfRange {
            what,
            requested,
            max,
        })
    }
}

fn mismatch(path: &FieldPath, expected: &'static str) -> TemplateError {
    TemplateError::TypeMismatch {
        path: path.to_string(),
        expected,
    }
}

fn text(path: &FieldPath, value: &FieldValue) -> Result<String> {
    value
        .as_text()
        .map(str::to_string)
        .ok_or_else(|| mismatch(path, "text"))
}

fn integer(path: &FieldPath, value: &FieldValue) -> Result<i64> {
    value.as_integer().ok_or_else(|| mismatch(path, "an integer"))
}

/// Non-finite numbers are refused; they cannot be written back as JSON
fn number(path: &FieldPath, value: &FieldValue) -> Result<f64> {
    value
        .as_number()
        .filter(|v| v.is_finite())
        .ok_or_else(|| mismatch(path, "a finite number"))
}

fn boolean(path: &FieldPath, value: &FieldValue) -> Result<bool> {
    value.as_bool().ok_or_else(|| mismatch(path, "a boolean"))
}
