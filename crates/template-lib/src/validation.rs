//! Cross-field validation of the form tree
//!
//! Every editable field has a tri-state verdict computed from its own value
//! and, where the rule requires it, sibling or ancestor values. Verdicts are
//! recomputed on every read; nothing is cached.

use crate::error::{Result, TemplateError};
use crate::models::{
    Session, TrainingEvent, WorkloadTemplate, TIMESCALE_ADJUSTMENT_FACTOR_MAX, WORKLOAD_SEED_MAX,
};
use crate::path::FieldPath;
use serde::{Deserialize, Serialize};

/// Upper bound for CPU usage in millicpus
pub const MAX_CPUS: f64 = 128_000.0;

/// Upper bound for memory usage in megabytes
pub const MAX_MEMORY: f64 = 128_000.0;

/// VRAM allowance per GPU in gigabytes
pub const VRAM_PER_GPU_GB: f64 = 4.0;

/// GPU counts above this draw a warning
pub const GPU_WARNING_THRESHOLD: i64 = 8;

/// GPU counts above this are rejected
pub const GPU_ERROR_THRESHOLD: i64 = 16;

pub const MAX_ID_LENGTH: usize = 36;

/// Validation verdict of a single field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Validity {
    Success,
    Warning,
    Error,
}

impl Validity {
    fn from_bool(ok: bool) -> Self {
        if ok {
            Validity::Success
        } else {
            Validity::Error
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Validity::Error)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Validity::Success => "success",
            Validity::Warning => "warning",
            Validity::Error => "error",
        }
    }
}

pub fn session_id(id: &str) -> Validity {
    Validity::from_bool((1..=MAX_ID_LENGTH).contains(&id.chars().count()))
}

pub fn workload_title(title: &str) -> Validity {
    Validity::from_bool((1..=MAX_ID_LENGTH).contains(&title.chars().count()))
}

pub fn workload_seed(seed: i64) -> Validity {
    Validity::from_bool((0..=WORKLOAD_SEED_MAX).contains(&seed))
}

pub fn timescale_adjustment_factor(factor: f64) -> Validity {
    Validity::from_bool((0.0..=TIMESCALE_ADJUSTMENT_FACTOR_MAX).contains(&factor))
}

pub fn sessions_sample_percentage(percentage: f64) -> Validity {
    Validity::from_bool((0.0..=1.0).contains(&percentage))
}

/// `1 <= start_tick <= stop_tick`
pub fn session_start_tick(session: &Session) -> Validity {
    Validity::from_bool(session.start_tick >= 1 && session.start_tick <= session.stop_tick)
}

/// `stop_tick >= start_tick`
pub fn session_stop_tick(session: &Session) -> Validity {
    Validity::from_bool(session.stop_tick >= session.start_tick)
}

/// The cursor must index an existing training event, or be 0 when there are none
pub fn selected_training_event(session: &Session) -> Validity {
    let selected = session.selected_training_event;
    Validity::from_bool(
        selected < session.trainings.len() || (selected == 0 && session.trainings.is_empty()),
    )
}

/// `session.start_tick <= start_tick <= session.stop_tick - duration`
///
/// Bounds are computed in `i128` so extreme tick values cannot overflow.
pub fn training_start_tick(session: &Session, training: &TrainingEvent) -> Validity {
    let latest_start = i128::from(session.stop_tick) - i128::from(training.duration_in_ticks);
    let start = i128::from(training.start_tick);
    Validity::from_bool(start >= i128::from(session.start_tick) && start <= latest_start)
}

/// `1 <= duration <= session.stop_tick - start_tick + 1`
pub fn training_duration(session: &Session, training: &TrainingEvent) -> Validity {
    let longest = i128::from(session.stop_tick) - i128::from(training.start_tick) + 1;
    Validity::from_bool(
        training.duration_in_ticks >= 1 && i128::from(training.duration_in_ticks) <= longest,
    )
}

pub fn cpus(millicpus: f64) -> Validity {
    Validity::from_bool((0.0..=MAX_CPUS).contains(&millicpus))
}

pub fn memory(megabytes: f64) -> Validity {
    Validity::from_bool((0.0..=MAX_MEMORY).contains(&megabytes))
}

/// VRAM is bounded by 4 GB per declared GPU, with at least one GPU's worth allowed
pub fn vram(training: &TrainingEvent) -> Validity {
    let gpus = training.declared_gpus().max(1) as f64;
    Validity::from_bool((0.0..=gpus * VRAM_PER_GPU_GB).contains(&training.vram))
}

pub fn gpu_count(gpus: i64) -> Validity {
    if gpus < 0 {
        Validity::Error
    } else if gpus <= GPU_WARNING_THRESHOLD {
        Validity::Success
    } else if gpus <= GPU_ERROR_THRESHOLD {
        Validity::Warning
    } else {
        Validity::Error
    }
}

pub fn gpu_utilization(utilization: f64) -> Validity {
    Validity::from_bool((0.0..=100.0).contains(&utilization))
}

/// Validate one field against the current tree
///
/// Fails only when the path does not resolve to a field of `template`.
pub fn validate_field(template: &WorkloadTemplate, path: &FieldPath) -> Result<Validity> {
    let session = |s: usize| session_at(template, s);
    let training = |s: usize, t: usize| training_at(template, s, t);

    let validity = match *path {
        FieldPath::WorkloadTitle => workload_title(&template.workload_title),
        FieldPath::WorkloadSeed => workload_seed(template.workload_seed),
        FieldPath::SessionsSamplePercentage => {
            sessions_sample_percentage(template.sessions_sample_percentage)
        }
        FieldPath::TimescaleAdjustmentFactor => {
            timescale_adjustment_factor(template.timescale_adjustment_factor)
        }
        FieldPath::DebugLoggingEnabled => Validity::Success,
        FieldPath::SessionId(s) => session_id(&session(s)?.id),
        FieldPath::SessionStartTick(s) => session_start_tick(session(s)?),
        FieldPath::SessionStopTick(s) => session_stop_tick(session(s)?),
        FieldPath::NumTrainingEvents(s) => {
            let sess = session(s)?;
            Validity::from_bool(sess.num_training_events == sess.trainings.len())
        }
        FieldPath::SelectedTrainingEvent(s) => selected_training_event(session(s)?),
        FieldPath::TrainingStartTick(s, t) => {
            let (sess, train) = training(s, t)?;
            training_start_tick(sess, train)
        }
        FieldPath::TrainingDuration(s, t) => {
            let (sess, train) = training(s, t)?;
            training_duration(sess, train)
        }
        FieldPath::TrainingCpus(s, t) => cpus(training(s, t)?.1.cpus),
        FieldPath::TrainingMemory(s, t) => memory(training(s, t)?.1.memory),
        FieldPath::TrainingVram(s, t) => vram(training(s, t)?.1),
        FieldPath::TrainingGpus(s, t) => gpu_count(training(s, t)?.1.declared_gpus()),
        FieldPath::GpuUtilization(s, t, g) => {
            let (_, train) = training(s, t)?;
            let gpu = train.gpu_utilizations.get(g).ok_or(TemplateError::IndexOutOfRange {
                what: "GPU",
                index: g,
                len: train.gpu_utilizations.len(),
            })?;
            gpu_utilization(gpu.utilization)
        }
    };

    Ok(validity)
}

pub(crate) fn session_at(template: &WorkloadTemplate, s: usize) -> Result<&Session> {
    template.sessions.get(s).ok_or(TemplateError::IndexOutOfRange {
        what: "session",
        index: s,
        len: template.sessions.len(),
    })
}

pub(crate) fn training_at(
    template: &WorkloadTemplate,
    s: usize,
    t: usize,
) -> Result<(&Session, &TrainingEvent)> {
    let session = session_at(template, s)?;
    let training = session.trainings.get(t).ok_or(TemplateError::IndexOutOfRange {
        what: "training event",
        index: t,
        len: session.trainings.len(),
    })?;
    Ok((session, training))
}

/// Verdict for one field, as reported in a [`ValidationReport`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldVerdict {
    pub path: String,
    pub validity: Validity,
}

/// Verdicts for every addressable field of a tree
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub fields: Vec<FieldVerdict>,
}

impl ValidationReport {
    pub fn errors(&self) -> impl Iterator<Item = &FieldVerdict> {
        self.fields.iter().filter(|f| f.validity == Validity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &FieldVerdict> {
        self.fields.iter().filter(|f| f.validity == Validity::Warning)
    }

    /// Fields that are not plain success
    pub fn issues(&self) -> Vec<&FieldVerdict> {
        self.fields
            .iter()
            .filter(|f| f.validity != Validity::Success)
            .collect()
    }

    /// Warnings do not block submission
    pub fn is_submittable(&self) -> bool {
        self.errors().next().is_none()
    }

    pub fn validity_of(&self, path: &FieldPath) -> Option<Validity> {
        let key = path.to_string();
        self.fields.iter().find(|f| f.path == key).map(|f| f.validity)
    }
}

/// Validate every field of the tree
pub fn validate_template(template: &WorkloadTemplate) -> ValidationReport {
    let fields = FieldPath::all(template)
        .into_iter()
        .filter_map(|path| {
            validate_field(template, &path).ok().map(|validity| FieldVerdict {
                path: path.to_string(),
                validity,
            })
        })
        .collect();

    ValidationReport { fields }
}
