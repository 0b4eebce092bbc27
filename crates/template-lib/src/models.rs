//! Core data models for workload templates
//!
//! The form tree mirrors the JSON document the registration form edits:
//! a workload holds sessions, each session holds training events, and each
//! training event holds one utilization entry per GPU.

use serde::{de, Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// GPU type attached to every derived resource request
pub const ANY_GPU: &str = "ANY_GPU";

pub const WORKLOAD_SEED_DEFAULT: i64 = 0;
pub const WORKLOAD_SEED_MAX: i64 = 2_147_483_647;
pub const TIMESCALE_ADJUSTMENT_FACTOR_DEFAULT: f64 = 0.01;
pub const TIMESCALE_ADJUSTMENT_FACTOR_MAX: f64 = 10.0;
pub const SESSIONS_SAMPLE_PERCENTAGE_DEFAULT: f64 = 1.0;

pub const SESSION_START_TICK_DEFAULT: i64 = 1;
pub const SESSION_STOP_TICK_DEFAULT: i64 = 6;
pub const TRAINING_START_TICK_DEFAULT: i64 = 2;
pub const TRAINING_DURATION_IN_TICKS_DEFAULT: i64 = 2;
/// Millicpus
pub const TRAINING_CPU_USAGE_DEFAULT: f64 = 100.0;
pub const TRAINING_MEMORY_USAGE_DEFAULT: f64 = 0.25;
/// Gigabytes
pub const TRAINING_VRAM_USAGE_DEFAULT: f64 = 0.125;
pub const TRAINING_GPU_UTILIZATION_DEFAULT: f64 = 50.0;
pub const NUM_GPUS_DEFAULT: i64 = 1;
pub const NUM_TRAINING_EVENTS_DEFAULT: usize = 1;

/// Root of the registration form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadTemplate {
    #[serde(default = "new_id")]
    pub workload_title: String,
    #[serde(default, deserialize_with = "deserialize_seed")]
    pub workload_seed: i64,
    #[serde(default = "default_sample_percentage")]
    pub sessions_sample_percentage: f64,
    #[serde(default = "default_timescale_factor")]
    pub timescale_adjustment_factor: f64,
    #[serde(default)]
    pub number_of_sessions: usize,
    #[serde(default = "default_true")]
    pub debug_logging_enabled: bool,
    #[serde(default)]
    pub remote_storage_definition: RemoteStorageDefinition,
    pub sessions: Vec<Session>,
}

impl Default for WorkloadTemplate {
    fn default() -> Self {
        Self {
            workload_title: new_id(),
            workload_seed: WORKLOAD_SEED_DEFAULT,
            sessions_sample_percentage: SESSIONS_SAMPLE_PERCENTAGE_DEFAULT,
            timescale_adjustment_factor: TIMESCALE_ADJUSTMENT_FACTOR_DEFAULT,
            number_of_sessions: 1,
            debug_logging_enabled: true,
            remote_storage_definition: RemoteStorageDefinition::default(),
            sessions: vec![Session::default()],
        }
    }
}

impl WorkloadTemplate {
    /// Total number of training events across all sessions
    pub fn num_training_events(&self) -> usize {
        self.sessions.iter().map(|s| s.trainings.len()).sum()
    }
}

/// A simulated unit of workload activity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default = "new_id")]
    pub id: String,
    pub start_tick: i64,
    pub stop_tick: i64,
    #[serde(default)]
    pub num_training_events: usize,
    #[serde(default)]
    pub selected_training_event: usize,
    #[serde(default)]
    pub trainings: Vec<TrainingEvent>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_resource_request: Option<ResourceRequest>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_resource_request: Option<ResourceRequest>,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            id: new_id(),
            start_tick: SESSION_START_TICK_DEFAULT,
            stop_tick: SESSION_STOP_TICK_DEFAULT,
            num_training_events: NUM_TRAINING_EVENTS_DEFAULT,
            selected_training_event: 0,
            trainings: vec![TrainingEvent::default()],
            max_resource_request: None,
            current_resource_request: None,
        }
    }
}

/// A bounded-duration resource-consuming activity within a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingEvent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub training_index: Option<usize>,
    pub start_tick: i64,
    pub duration_in_ticks: i64,
    /// Millicpus
    #[serde(default)]
    pub cpus: f64,
    /// Megabytes
    #[serde(default)]
    pub memory: f64,
    /// Gigabytes
    #[serde(default)]
    pub vram: f64,
    /// Declared GPU count as last edited; may hold an out-of-range value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gpus: Option<i64>,
    #[serde(default)]
    pub gpu_utilizations: Vec<GpuUtilization>,
}

impl Default for TrainingEvent {
    fn default() -> Self {
        Self {
            training_index: None,
            start_tick: TRAINING_START_TICK_DEFAULT,
            duration_in_ticks: TRAINING_DURATION_IN_TICKS_DEFAULT,
            cpus: TRAINING_CPU_USAGE_DEFAULT,
            memory: TRAINING_MEMORY_USAGE_DEFAULT,
            vram: TRAINING_VRAM_USAGE_DEFAULT,
            gpus: Some(NUM_GPUS_DEFAULT),
            gpu_utilizations: vec![GpuUtilization::default()],
        }
    }
}

impl TrainingEvent {
    /// GPU count as the user declared it, falling back to the array length
    pub fn declared_gpus(&self) -> i64 {
        self.gpus.unwrap_or(self.gpu_utilizations.len() as i64)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpuUtilization {
    pub utilization: f64,
}

impl Default for GpuUtilization {
    fn default() -> Self {
        Self {
            utilization: TRAINING_GPU_UTILIZATION_DEFAULT,
        }
    }
}

/// Aggregate resource demand of a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceRequest {
    pub cpus: f64,
    pub gpus: i64,
    pub memory: f64,
    pub vram: f64,
    pub gpu_type: String,
}

impl ResourceRequest {
    pub fn new(cpus: f64, gpus: i64, memory: f64, vram: f64) -> Self {
        Self {
            cpus,
            gpus,
            memory,
            vram,
            gpu_type: ANY_GPU.to_string(),
        }
    }

    pub fn zeroed() -> Self {
        Self::new(0.0, 0, 0.0, 0.0)
    }
}

/// Simulated remote storage the workload reads from and writes to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteStorageDefinition {
    pub name: String,
    /// Bytes per second
    pub download_rate: f64,
    /// Bytes per second
    pub upload_rate: f64,
    pub download_rate_variance_percentage: f64,
    pub upload_rate_variance_percentage: f64,
    pub read_failure_chance_percentage: f64,
    pub write_failure_chance_percentage: f64,
}

impl Default for RemoteStorageDefinition {
    fn default() -> Self {
        Self {
            name: "AWS S3".to_string(),
            download_rate: 200e6,
            upload_rate: 125e6,
            download_rate_variance_percentage: 5.0,
            upload_rate_variance_percentage: 5.0,
            read_failure_chance_percentage: 0.0,
            write_failure_chance_percentage: 0.0,
        }
    }
}

/// Server-resident template descriptor from the template catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreloadedTemplate {
    pub display_name: String,
    pub key: String,
    pub filepath: String,
    #[serde(default)]
    pub num_sessions: u64,
    #[serde(default)]
    pub num_training_events: u64,
    #[serde(default)]
    pub large: bool,
}

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

fn default_true() -> bool {
    true
}

fn default_sample_percentage() -> f64 {
    SESSIONS_SAMPLE_PERCENTAGE_DEFAULT
}

fn default_timescale_factor() -> f64 {
    TIMESCALE_ADJUSTMENT_FACTOR_DEFAULT
}

/// Seeds arrive as numbers or as the text typed into the form; "" means 0
fn deserialize_seed<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum SeedRepr {
        Int(i64),
        Float(f64),
        Text(String),
    }

    match SeedRepr::deserialize(deserializer)? {
        SeedRepr::Int(v) => Ok(v),
        SeedRepr::Float(v) => Ok(v.trunc() as i64),
        SeedRepr::Text(s) if s.trim().is_empty() => Ok(0),
        SeedRepr::Text(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|e| de::Error::custom(format!("invalid workload seed \"{}\": {}", s, e))),
    }
}
