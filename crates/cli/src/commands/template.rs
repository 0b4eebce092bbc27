//! Template file commands: validate, summarize, register, randomize

use anyhow::{Context, Result};
use colored::Colorize;
use std::io::Write;
use std::path::{Path, PathBuf};
use tabled::Tabled;
use template_lib::{
    FormStore, RegistrationTransport, ResourceRequest, TemplateError, WorkloadTemplate,
};
use uuid::Uuid;

use crate::commands::catalog::TemplateSource;
use crate::output::{
    color_validity, format_cpu, format_gpus, format_memory, format_request, format_vram,
    print_error, print_info, print_success, print_table, print_warning, OutputFormat,
};

/// Load a form document (bare or wrapped) into a fresh store
pub fn load_store(path: &Path) -> Result<FormStore> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let mut store = FormStore::new();
    store
        .apply_json(&text)
        .with_context(|| format!("Failed to import {}", path.display()))?;
    Ok(store)
}

/// Write `contents` to `output`, or to stdout when no path is given
fn emit(contents: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => std::fs::write(path, contents)
            .with_context(|| format!("Failed to write {}", path.display())),
        None => {
            println!("{}", contents);
            Ok(())
        }
    }
}

/// Row for the validation table
#[derive(Tabled, serde::Serialize)]
struct VerdictRow {
    #[tabled(rename = "Field")]
    field: String,
    #[tabled(rename = "Verdict")]
    verdict: String,
}

/// Validate every field of a template file
pub fn validate(file: &Path, format: OutputFormat) -> Result<()> {
    let store = load_store(file)?;
    let report = store.validate();
    let errors = report.errors().count();

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Table => {
            let issues = report.issues();
            if issues.is_empty() {
                print_success(&format!("All {} fields valid", report.fields.len()));
            } else {
                let rows: Vec<VerdictRow> = issues
                    .iter()
                    .map(|v| VerdictRow {
                        field: v.path.clone(),
                        verdict: color_validity(v.validity),
                    })
                    .collect();
                print_table(&rows, format);

                let warnings = report.warnings().count();
                if errors == 0 {
                    print_warning(&format!("{} warning(s), template can be submitted", warnings));
                } else {
                    print_error(&format!("{} error(s), {} warning(s)", errors, warnings));
                }
            }
        }
    }

    if errors > 0 {
        anyhow::bail!("{} invalid field(s) in {}", errors, file.display());
    }
    Ok(())
}

/// Row for the session summary table
#[derive(Tabled, serde::Serialize)]
struct SessionRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Session")]
    id: String,
    #[tabled(rename = "Ticks")]
    ticks: String,
    #[tabled(rename = "Trainings")]
    trainings: usize,
    #[tabled(rename = "Max CPU")]
    cpus: String,
    #[tabled(rename = "Max Mem")]
    memory: String,
    #[tabled(rename = "Max GPUs")]
    gpus: String,
    #[tabled(rename = "Max VRAM")]
    vram: String,
}

/// Show the per-session resource requests a submit would derive
pub fn summary(file: &Path, format: OutputFormat) -> Result<()> {
    let store = load_store(file)?;
    let envelope = store.build_registration(None);
    let request = &envelope.workload_registration_request;

    if let OutputFormat::Json = format {
        println!("{}", serde_json::to_string_pretty(&request.sessions)?);
        return Ok(());
    }

    println!("{}", "Workload Summary".bold());
    println!("{}", "=".repeat(60));
    println!("Title:      {}", request.name.cyan());
    println!("Seed:       {}", request.seed);
    println!("Timescale:  {}", request.timescale_adjustment_factor);
    println!("Storage:    {}", request.remote_storage_definition.name);
    println!();

    if request.sessions.is_empty() && !request.template_file_path.is_empty() {
        print_info(&format!(
            "Sessions are loaded server-side from {}",
            request.template_file_path
        ));
        return Ok(());
    }

    let rows: Vec<SessionRow> = request
        .sessions
        .iter()
        .enumerate()
        .map(|(index, s)| {
            let max = s
                .max_resource_request
                .clone()
                .unwrap_or_else(|| ResourceRequest::new(-1.0, -1, -1.0, -1.0));
            SessionRow {
                index,
                id: s.id.clone(),
                ticks: format!("{}-{}", s.start_tick, s.stop_tick),
                trainings: s.trainings.len(),
                cpus: format_cpu(max.cpus),
                memory: format_memory(max.memory),
                gpus: format_gpus(max.gpus),
                vram: format_vram(max.vram),
            }
        })
        .collect();

    print_table(&rows, format);
    println!("\nTotal: {} sessions", rows.len());
    Ok(())
}

/// Transport that writes the envelope to a file or stdout
struct OutputTransport {
    output: Option<PathBuf>,
}

impl RegistrationTransport for OutputTransport {
    fn send(
        &mut self,
        workload_name: &str,
        payload: &str,
        msg_id: &str,
    ) -> template_lib::Result<()> {
        tracing::info!(workload_name, msg_id, bytes = payload.len(), "Writing registration");

        match &self.output {
            Some(path) => std::fs::write(path, payload)?,
            None => {
                let mut stdout = std::io::stdout().lock();
                writeln!(stdout, "{}", payload)?;
            }
        }
        Ok(())
    }
}

/// Build the registration envelope for a template and write it out
pub async fn register(
    file: Option<PathBuf>,
    template_key: Option<String>,
    source: Option<&TemplateSource>,
    msg_id: Option<Uuid>,
    output: Option<PathBuf>,
) -> Result<()> {
    let mut store = match &file {
        Some(path) => load_store(path)?,
        None => FormStore::new(),
    };

    match (template_key, source) {
        (Some(key), Some(source)) => {
            let descriptor = source.descriptor(&key).await?;
            let response = source.resolve(&key).await?;
            store.select_preloaded(descriptor, response);
        }
        (Some(_), None) => anyhow::bail!("No template source available"),
        (None, _) if file.is_none() => {
            anyhow::bail!("Either a template file or --template must be given")
        }
        (None, _) => {}
    }

    let mut transport = OutputTransport {
        output: output.clone(),
    };
    let msg_id = match store.submit_with_msg_id(&mut transport, msg_id) {
        Ok(msg_id) => msg_id,
        Err(TemplateError::ValidationFailed { errors }) => {
            anyhow::bail!(
                "Template has {} invalid field(s); run `wlt validate` for details",
                errors
            )
        }
        Err(e) => return Err(e).context("Failed to register workload"),
    };

    if let Some(path) = output {
        print_success(&format!(
            "Wrote registration {} to {}",
            msg_id,
            path.display()
        ));
    }
    Ok(())
}

/// Write a default template document
///
/// When `output` is a directory, the file is named `template-<millis>.json`.
pub fn defaults(output: Option<PathBuf>) -> Result<()> {
    let json = template_lib::codec::export_form_json(&WorkloadTemplate::default())?;

    let target = output.map(|path| {
        if path.is_dir() {
            path.join(format!(
                "template-{}.json",
                chrono::Utc::now().timestamp_millis()
            ))
        } else {
            path
        }
    });

    emit(&json, target.as_deref())?;
    if let Some(path) = target {
        print_success(&format!("Wrote default template to {}", path.display()));
    }
    Ok(())
}

/// Randomize one training event's resources and write the updated document
pub fn randomize(
    file: &Path,
    session: usize,
    training: usize,
    output: Option<PathBuf>,
) -> Result<()> {
    let mut store = load_store(file)?;
    store
        .randomize_training(session, training)
        .with_context(|| format!("Failed to randomize session {} training {}", session, training))?;

    let event = &store.template().sessions[session].trainings[training];
    let request = ResourceRequest::new(
        event.cpus,
        event.gpu_utilizations.len() as i64,
        event.memory,
        event.vram,
    );
    tracing::info!(
        session,
        training,
        request = %format_request(&request),
        "Randomized training event"
    );

    emit(&store.export_json()?, output.as_deref())
}
