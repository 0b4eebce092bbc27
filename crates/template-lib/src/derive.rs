//! Submit-time derivation of session resource requests
//!
//! Walks each session's training events once, assigns sequential training
//! indices, and records the per-session maximum CPU, memory, GPU count, and
//! VRAM as the session's `max_resource_request`.

use crate::models::{PreloadedTemplate, ResourceRequest, Session, WorkloadTemplate};
use tracing::debug;

/// Running-maximum seed meaning "no training contributed"
pub const NO_TRAININGS_SENTINEL: f64 = -1.0;

/// Derive resource requests for one session in place
///
/// `num_training_events` is always rewritten from the array length before
/// deriving, so a stale count never survives a submit.
pub fn derive_session(session: &mut Session) {
    session.num_training_events = session.trainings.len();

    let mut max_millicpus = NO_TRAININGS_SENTINEL;
    let mut max_mem_mb = NO_TRAININGS_SENTINEL;
    let mut max_num_gpus: i64 = -1;
    let mut max_vram_gb = NO_TRAININGS_SENTINEL;

    for (index, training) in session.trainings.iter_mut().enumerate() {
        training.training_index = Some(index);

        max_millicpus = max_millicpus.max(training.cpus);
        max_mem_mb = max_mem_mb.max(training.memory);
        max_vram_gb = max_vram_gb.max(training.vram);
        max_num_gpus = max_num_gpus.max(training.gpu_utilizations.len() as i64);
    }

    session.max_resource_request = Some(ResourceRequest::new(
        max_millicpus,
        max_num_gpus,
        max_mem_mb,
        max_vram_gb,
    ));
    session.current_resource_request = Some(ResourceRequest::zeroed());
}

/// Produce the session list that goes into a registration request
///
/// Large preloaded templates are loaded server-side from their file path,
/// so no session data is sent and nothing is derived.
pub fn derive_sessions(
    template: &WorkloadTemplate,
    selected: Option<&PreloadedTemplate>,
) -> Vec<Session> {
    if selected.is_some_and(|t| t.large) {
        debug!("Large preloaded template selected, skipping derivation");
        return Vec::new();
    }

    let mut sessions = template.sessions.clone();
    for session in sessions.iter_mut() {
        derive_session(session);
    }

    debug!(
        num_sessions = sessions.len(),
        num_trainings = template.num_training_events(),
        "Derived session resource requests"
    );
    sessions
}
