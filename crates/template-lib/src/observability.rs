//! Structured logging for template engine events
//!
//! Every event carries a stable `event` key so log pipelines can filter on
//! it regardless of the message text.

use crate::validation::ValidationReport;
use tracing::{info, warn};

/// Structured logger for form and registration events
#[derive(Debug, Clone)]
pub struct StructuredLogger {
    component: String,
}

impl Default for StructuredLogger {
    fn default() -> Self {
        Self::new("workload-template")
    }
}

impl StructuredLogger {
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
        }
    }

    /// Log a registration handed to the transport
    pub fn log_registered(
        &self,
        workload_name: &str,
        msg_id: &str,
        num_sessions: usize,
        template_file_path: &str,
    ) {
        info!(
            event = "workload_registered",
            component = %self.component,
            workload_name = %workload_name,
            msg_id = %msg_id,
            num_sessions = num_sessions,
            template_file_path = %template_file_path,
            "Workload registration sent"
        );
    }

    /// Log a registration the transport refused
    pub fn log_registration_failed(&self, workload_name: &str, msg_id: &str, reason: &str) {
        warn!(
            event = "workload_registration_failed",
            component = %self.component,
            workload_name = %workload_name,
            msg_id = %msg_id,
            reason = %reason,
            "Workload registration failed"
        );
    }

    /// Log a form document that replaced the live tree
    pub fn log_imported(&self, source: &str, num_sessions: usize, num_trainings: usize) {
        info!(
            event = "template_imported",
            component = %self.component,
            source = %source,
            num_sessions = num_sessions,
            num_trainings = num_trainings,
            "Template imported"
        );
    }

    /// Log a rejected import; the live tree is left as it was
    pub fn log_import_failed(&self, source: &str, reason: &str) {
        warn!(
            event = "template_import_failed",
            component = %self.component,
            source = %source,
            reason = %reason,
            "Template import rejected"
        );
    }

    /// Log a reset to default values
    pub fn log_reset(&self, reason: &str) {
        info!(
            event = "form_reset",
            component = %self.component,
            reason = %reason,
            "Form reset to defaults"
        );
    }

    /// Log the outcome of a whole-tree validation pass
    pub fn log_validation(&self, report: &ValidationReport) {
        let errors = report.errors().count();
        let warnings = report.warnings().count();

        if errors > 0 {
            warn!(
                event = "validation_completed",
                component = %self.component,
                fields = report.fields.len(),
                errors = errors,
                warnings = warnings,
                "Template has invalid fields"
            );
        } else {
            info!(
                event = "validation_completed",
                component = %self.component,
                fields = report.fields.len(),
                errors = errors,
                warnings = warnings,
                "Template validated"
            );
        }
    }
}
