//! Wire formats of the registration flow
//!
//! Three documents cross the boundary:
//! - the `register_workload` envelope sent to the backend,
//! - the raw form tree used for download and upload,
//! - the backend's template response, which either inlines a form
//!   (`{"template": ...}`) or points at a server-resident one
//!   (`{"preloaded_template": ...}`).

use crate::derive;
use crate::error::{Result, TemplateError};
use crate::models::{PreloadedTemplate, RemoteStorageDefinition, Session, WorkloadTemplate};
use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use uuid::Uuid;

pub const REGISTER_WORKLOAD_OP: &str = "register_workload";
pub const TEMPLATE_REQUEST_TYPE: &str = "template";
pub const WORKLOAD_TEMPLATE_KEY: &str = "workload_template_key";

/// Indentation of exported form documents
const EXPORT_INDENT: &[u8] = b"    ";

/// Outbound seam for registration envelopes
///
/// Implementations deliver `payload` (the serialized envelope) to the
/// backend. An error means the workload was not registered.
pub trait RegistrationTransport {
    fn send(&mut self, workload_name: &str, payload: &str, msg_id: &str) -> Result<()>;
}

impl<F> RegistrationTransport for F
where
    F: FnMut(&str, &str, &str) -> Result<()>,
{
    fn send(&mut self, workload_name: &str, payload: &str, msg_id: &str) -> Result<()> {
        self(workload_name, payload, msg_id)
    }
}

/// Body of a `register_workload` message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkloadRegistrationRequest {
    pub adjust_gpu_reservations: bool,
    pub name: String,
    pub debug_logging: bool,
    pub sessions: Vec<Session>,
    pub template_file_path: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub key: String,
    pub seed: i64,
    pub timescale_adjustment_factor: f64,
    pub remote_storage_definition: RemoteStorageDefinition,
    pub sessions_sample_percentage: f64,
}

impl WorkloadRegistrationRequest {
    /// Build a request from the form tree, deriving session resource requests
    ///
    /// The tree itself is not modified.
    pub fn from_template(
        template: &WorkloadTemplate,
        selected: Option<&PreloadedTemplate>,
    ) -> Self {
        let template_file_path = selected.map(|t| t.filepath.clone()).unwrap_or_default();

        Self {
            adjust_gpu_reservations: false,
            name: template.workload_title.clone(),
            debug_logging: template.debug_logging_enabled,
            sessions: derive::derive_sessions(template, selected),
            template_file_path,
            kind: TEMPLATE_REQUEST_TYPE.to_string(),
            key: WORKLOAD_TEMPLATE_KEY.to_string(),
            seed: template.workload_seed,
            timescale_adjustment_factor: template.timescale_adjustment_factor,
            remote_storage_definition: template.remote_storage_definition.clone(),
            sessions_sample_percentage: template.sessions_sample_percentage,
        }
    }
}

/// The `register_workload` message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistrationEnvelope {
    pub op: String,
    pub msg_id: String,
    pub workload_registration_request: WorkloadRegistrationRequest,
}

impl RegistrationEnvelope {
    /// Wrap a request; a fresh v4 message ID is generated when none is given
    pub fn new(request: WorkloadRegistrationRequest, msg_id: Option<Uuid>) -> Self {
        Self {
            op: REGISTER_WORKLOAD_OP.to_string(),
            msg_id: msg_id.unwrap_or_else(Uuid::new_v4).to_string(),
            workload_registration_request: request,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        to_indented_json(self)
    }
}

/// Template document returned by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TemplateResponse {
    /// Small template whose form is sent inline
    Template(WorkloadTemplate),
    /// Large template the backend loads from its own file
    PreloadedTemplate(PreloadedTemplate),
}

/// Any document accepted by form import
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateDocument {
    Form(WorkloadTemplate),
    Response(TemplateResponse),
}

/// Serialize the raw form tree for download
///
/// No derivation is applied; derived requests present on the tree are
/// written as they are.
pub fn export_form_json(template: &WorkloadTemplate) -> Result<String> {
    to_indented_json(template)
}

/// Parse a bare form document
pub fn import_form_json(text: &str) -> Result<WorkloadTemplate> {
    Ok(serde_json::from_str(text)?)
}

/// Parse a form document or a wrapped template response
///
/// Objects with a top-level `template` or `preloaded_template` key are
/// treated as wrapped responses; anything else must be a bare form.
pub fn parse_template_document(text: &str) -> Result<TemplateDocument> {
    let value: serde_json::Value = serde_json::from_str(text)?;
    let object = value.as_object().ok_or_else(|| {
        TemplateError::InvalidDocument("expected a JSON object at the top level".to_string())
    })?;

    let wrapped = object.contains_key("template") || object.contains_key("preloaded_template");
    if wrapped {
        if object.len() != 1 {
            return Err(TemplateError::InvalidDocument(
                "wrapped template document must contain exactly one of \"template\" or \"preloaded_template\"".to_string(),
            ));
        }
        let response: TemplateResponse = serde_json::from_value(value)?;
        return Ok(TemplateDocument::Response(response));
    }

    let form: WorkloadTemplate = serde_json::from_value(value)?;
    Ok(TemplateDocument::Form(form))
}

fn to_indented_json<T: Serialize>(value: &T) -> Result<String> {
    let mut buf = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(EXPORT_INDENT));
    value.serialize(&mut serializer)?;
    String::from_utf8(buf).map_err(|e| TemplateError::InvalidDocument(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TrainingEvent;

    #[test]
    fn test_envelope_shape() {
        let template = WorkloadTemplate::default();
        let request = WorkloadRegistrationRequest::from_template(&template, None);
        let envelope = RegistrationEnvelope::new(request, None);
        let json: serde_json::Value = serde_json::from_str(&envelope.to_json().unwrap()).unwrap();

        assert_eq!(json["op"], "register_workload");
        assert!(Uuid::parse_str(json["msg_id"].as_str().unwrap()).is_ok());

        let body = &json["workload_registration_request"];
        assert_eq!(body["adjust_gpu_reservations"], false);
        assert_eq!(body["type"], "template");
        assert_eq!(body["key"], "workload_template_key");
        assert_eq!(body["template_file_path"], "");
        assert_eq!(body["name"], template.workload_title.as_str());
        assert_eq!(body["debug_logging"], true);
        assert_eq!(body["seed"], 0);
        assert_eq!(body["remote_storage_definition"]["name"], "AWS S3");
        assert_eq!(body["sessions"][0]["max_resource_request"]["gpu_type"], "ANY_GPU");
        assert_eq!(body["sessions"][0]["trainings"][0]["training_index"], 0);
    }

    #[test]
    fn test_caller_supplied_msg_id() {
        let id = Uuid::new_v4();
        let request = WorkloadRegistrationRequest::from_template(&WorkloadTemplate::default(), None);
        let envelope = RegistrationEnvelope::new(request, Some(id));
        assert_eq!(envelope.msg_id, id.to_string());
    }

    #[test]
    fn test_export_uses_four_space_indent() {
        let text = export_form_json(&WorkloadTemplate::default()).unwrap();
        assert!(text.starts_with("{\n    \"workloadTitle\""));
    }

    #[test]
    fn test_export_import_round_trip() {
        let mut template = WorkloadTemplate::default();
        template.workload_title = "round-trip".to_string();
        template.workload_seed = 1234;
        template.timescale_adjustment_factor = 0.5;
        template.sessions[0].trainings.push(TrainingEvent {
            cpus: 2500.0,
            ..TrainingEvent::default()
        });
        template.sessions[0].num_training_events = 2;

        let imported = import_form_json(&export_form_json(&template).unwrap()).unwrap();
        assert_eq!(imported, template);
    }

    #[test]
    fn test_parse_wrapped_documents() {
        let inline = r#"{"template": {"workloadTitle": "w", "sessions": []}}"#;
        match parse_template_document(inline).unwrap() {
            TemplateDocument::Response(TemplateResponse::Template(t)) => {
                assert_eq!(t.workload_title, "w")
            }
            other => panic!("unexpected document: {:?}", other),
        }

        let preloaded = r#"{"preloaded_template": {
            "display_name": "Big", "key": "big", "filepath": "/data/big.json",
            "num_sessions": 500, "num_training_events": 9000, "large": true}}"#;
        match parse_template_document(preloaded).unwrap() {
            TemplateDocument::Response(TemplateResponse::PreloadedTemplate(p)) => {
                assert!(p.large);
                assert_eq!(p.filepath, "/data/big.json");
            }
            other => panic!("unexpected document: {:?}", other),
        }

        let bare = r#"{"workloadTitle": "bare", "sessions": []}"#;
        assert!(matches!(
            parse_template_document(bare).unwrap(),
            TemplateDocument::Form(_)
        ));
    }

    #[test]
    fn test_parse_rejects_malformed_documents() {
        assert!(matches!(
            parse_template_document("{not json"),
            Err(TemplateError::InvalidJson(_))
        ));
        assert!(matches!(
            parse_template_document("[1, 2]"),
            Err(TemplateError::InvalidDocument(_))
        ));
        assert!(parse_template_document(r#"{"workloadTitle": "no sessions"}"#).is_err());
        assert!(matches!(
            parse_template_document(r#"{"template": {"sessions": []}, "extra": 1}"#),
            Err(TemplateError::InvalidDocument(_))
        ));
    }

    #[test]
    fn test_closure_transport() {
        let mut sent = Vec::new();
        let mut transport = |name: &str, payload: &str, _msg_id: &str| -> Result<()> {
            sent.push((name.to_string(), payload.len()));
            Ok(())
        };

        transport.send("w", "{}", "id").unwrap();
        assert_eq!(sent, vec![("w".to_string(), 2)]);
    }
}
