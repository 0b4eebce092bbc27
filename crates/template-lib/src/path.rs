//! Addressing of form fields and arrays
//!
//! Paths use the dotted notation of the form document, e.g.
//! `sessions.0.trainings.1.gpu_utilizations.2.utilization`.

use crate::error::TemplateError;
use crate::models::WorkloadTemplate;
use std::fmt;
use std::str::FromStr;

/// A single editable field of the form tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldPath {
    WorkloadTitle,
    WorkloadSeed,
    SessionsSamplePercentage,
    TimescaleAdjustmentFactor,
    DebugLoggingEnabled,
    SessionId(usize),
    SessionStartTick(usize),
    SessionStopTick(usize),
    NumTrainingEvents(usize),
    SelectedTrainingEvent(usize),
    TrainingStartTick(usize, usize),
    TrainingDuration(usize, usize),
    TrainingCpus(usize, usize),
    TrainingMemory(usize, usize),
    TrainingVram(usize, usize),
    TrainingGpus(usize, usize),
    GpuUtilization(usize, usize, usize),
}

/// A dynamic-length array of the form tree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArrayPath {
    Sessions,
    Trainings(usize),
    GpuUtilizations(usize, usize),
}

impl FieldPath {
    /// Every field path addressable in the given tree, in document order
    pub fn all(template: &WorkloadTemplate) -> Vec<FieldPath> {
        let mut paths = vec![
            FieldPath::WorkloadTitle,
            FieldPath::WorkloadSeed,
            FieldPath::SessionsSamplePercentage,
            FieldPath::TimescaleAdjustmentFactor,
            FieldPath::DebugLoggingEnabled,
        ];

        for (s, session) in template.sessions.iter().enumerate() {
            paths.extend([
                FieldPath::SessionId(s),
                FieldPath::SessionStartTick(s),
                FieldPath::SessionStopTick(s),
                FieldPath::NumTrainingEvents(s),
                FieldPath::SelectedTrainingEvent(s),
            ]);
            for (t, training) in session.trainings.iter().enumerate() {
                paths.extend([
                    FieldPath::TrainingStartTick(s, t),
                    FieldPath::TrainingDuration(s, t),
                    FieldPath::TrainingCpus(s, t),
                    FieldPath::TrainingMemory(s, t),
                    FieldPath::TrainingVram(s, t),
                    FieldPath::TrainingGpus(s, t),
                ]);
                paths.extend(
                    (0..training.gpu_utilizations.len()).map(|g| FieldPath::GpuUtilization(s, t, g)),
                );
            }
        }

        paths
    }

    /// Index of the session this field belongs to, if any
    pub fn session_index(&self) -> Option<usize> {
        match *self {
            FieldPath::SessionId(s)
            | FieldPath::SessionStartTick(s)
            | FieldPath::SessionStopTick(s)
            | FieldPath::NumTrainingEvents(s)
            | FieldPath::SelectedTrainingEvent(s)
            | FieldPath::TrainingStartTick(s, _)
            | FieldPath::TrainingDuration(s, _)
            | FieldPath::TrainingCpus(s, _)
            | FieldPath::TrainingMemory(s, _)
            | FieldPath::TrainingVram(s, _)
            | FieldPath::TrainingGpus(s, _)
            | FieldPath::GpuUtilization(s, _, _) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            FieldPath::WorkloadTitle => write!(f, "workloadTitle"),
            FieldPath::WorkloadSeed => write!(f, "workloadSeed"),
            FieldPath::SessionsSamplePercentage => write!(f, "sessionsSamplePercentage"),
            FieldPath::TimescaleAdjustmentFactor => write!(f, "timescaleAdjustmentFactor"),
            FieldPath::DebugLoggingEnabled => write!(f, "debugLoggingEnabled"),
            FieldPath::SessionId(s) => write!(f, "sessions.{}.id", s),
            FieldPath::SessionStartTick(s) => write!(f, "sessions.{}.start_tick", s),
            FieldPath::SessionStopTick(s) => write!(f, "sessions.{}.stop_tick", s),
            FieldPath::NumTrainingEvents(s) => write!(f, "sessions.{}.num_training_events", s),
            FieldPath::SelectedTrainingEvent(s) => {
                write!(f, "sessions.{}.selected_training_event", s)
            }
            FieldPath::TrainingStartTick(s, t) => {
                write!(f, "sessions.{}.trainings.{}.start_tick", s, t)
            }
            FieldPath::TrainingDuration(s, t) => {
                write!(f, "sessions.{}.trainings.{}.duration_in_ticks", s, t)
            }
            FieldPath::TrainingCpus(s, t) => write!(f, "sessions.{}.trainings.{}.cpus", s, t),
            FieldPath::TrainingMemory(s, t) => write!(f, "sessions.{}.trainings.{}.memory", s, t),
            FieldPath::TrainingVram(s, t) => write!(f, "sessions.{}.trainings.{}.vram", s, t),
            FieldPath::TrainingGpus(s, t) => write!(f, "sessions.{}.trainings.{}.gpus", s, t),
            FieldPath::GpuUtilization(s, t, g) => write!(
                f,
                "sessions.{}.trainings.{}.gpu_utilizations.{}.utilization",
                s, t, g
            ),
        }
    }
}

impl FromStr for FieldPath {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TemplateError::InvalidPath(s.to_string());
        let parts: Vec<&str> = s.split('.').collect();
        let index = |i: usize| -> Result<usize, TemplateError> {
            parts.get(i).and_then(|p| p.parse().ok()).ok_or_else(invalid)
        };

        let path = match parts.as_slice() {
            ["workloadTitle"] => FieldPath::WorkloadTitle,
            ["workloadSeed"] => FieldPath::WorkloadSeed,
            ["sessionsSamplePercentage"] => FieldPath::SessionsSamplePercentage,
            ["timescaleAdjustmentFactor"] => FieldPath::TimescaleAdjustmentFactor,
            ["debugLoggingEnabled"] => FieldPath::DebugLoggingEnabled,
            ["sessions", _, field] => {
                let s = index(1)?;
                match *field {
                    "id" => FieldPath::SessionId(s),
                    "start_tick" => FieldPath::SessionStartTick(s),
                    "stop_tick" => FieldPath::SessionStopTick(s),
                    "num_training_events" => FieldPath::NumTrainingEvents(s),
                    "selected_training_event" => FieldPath::SelectedTrainingEvent(s),
                    _ => return Err(invalid()),
                }
            }
            ["sessions", _, "trainings", _, field] => {
                let (s, t) = (index(1)?, index(3)?);
                match *field {
                    "start_tick" => FieldPath::TrainingStartTick(s, t),
                    "duration_in_ticks" => FieldPath::TrainingDuration(s, t),
                    "cpus" => FieldPath::TrainingCpus(s, t),
                    "memory" => FieldPath::TrainingMemory(s, t),
                    "vram" => FieldPath::TrainingVram(s, t),
                    "gpus" => FieldPath::TrainingGpus(s, t),
                    _ => return Err(invalid()),
                }
            }
            ["sessions", _, "trainings", _, "gpu_utilizations", _, "utilization"] => {
                FieldPath::GpuUtilization(index(1)?, index(3)?, index(5)?)
            }
            _ => return Err(invalid()),
        };

        Ok(path)
    }
}

impl fmt::Display for ArrayPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            ArrayPath::Sessions => write!(f, "sessions"),
            ArrayPath::Trainings(s) => write!(f, "sessions.{}.trainings", s),
            ArrayPath::GpuUtilizations(s, t) => {
                write!(f, "sessions.{}.trainings.{}.gpu_utilizations", s, t)
            }
        }
    }
}

impl FromStr for ArrayPath {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || TemplateError::InvalidPath(s.to_string());
        let parts: Vec<&str> = s.split('.').collect();
        let index = |p: &str| -> Result<usize, TemplateError> { p.parse().map_err(|_| invalid()) };

        match parts.as_slice() {
            ["sessions"] => Ok(ArrayPath::Sessions),
            ["sessions", session, "trainings"] => Ok(ArrayPath::Trainings(index(*session)?)),
            ["sessions", session, "trainings", training, "gpu_utilizations"] => Ok(
                ArrayPath::GpuUtilizations(index(*session)?, index(*training)?),
            ),
            _ => Err(invalid()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nested_gpu_path() {
        let path: FieldPath = "sessions.2.trainings.1.gpu_utilizations.3.utilization"
            .parse()
            .unwrap();
        assert_eq!(path, FieldPath::GpuUtilization(2, 1, 3));
        assert_eq!(
            path.to_string(),
            "sessions.2.trainings.1.gpu_utilizations.3.utilization"
        );
    }

    #[test]
    fn test_display_matches_parse_for_every_field() {
        let template = WorkloadTemplate::default();
        for path in FieldPath::all(&template) {
            let reparsed: FieldPath = path.to_string().parse().unwrap();
            assert_eq!(reparsed, path);
        }
    }

    #[test]
    fn test_reject_malformed_paths() {
        for bad in [
            "",
            "sessions",
            "sessions.x.id",
            "sessions.0.nope",
            "sessions.0.trainings.0",
            "sessions.0.trainings.0.gpu_utilizations.0",
            "workloadtitle",
        ] {
            assert!(bad.parse::<FieldPath>().is_err(), "{} should not parse", bad);
        }
    }

    #[test]
    fn test_parse_array_paths() {
        assert_eq!("sessions".parse::<ArrayPath>().unwrap(), ArrayPath::Sessions);
        assert_eq!(
            "sessions.4.trainings".parse::<ArrayPath>().unwrap(),
            ArrayPath::Trainings(4)
        );
        assert_eq!(
            "sessions.0.trainings.2.gpu_utilizations"
                .parse::<ArrayPath>()
                .unwrap(),
            ArrayPath::GpuUtilizations(0, 2)
        );
        assert!("sessions.0".parse::<ArrayPath>().is_err());
    }

    #[test]
    fn test_all_paths_cover_nested_fields() {
        let template = WorkloadTemplate::default();
        let paths = FieldPath::all(&template);

        // 5 workload fields + 5 session fields + 6 training fields + 1 GPU
        assert_eq!(paths.len(), 17);
        assert!(paths.contains(&FieldPath::GpuUtilization(0, 0, 0)));
        assert_eq!(FieldPath::TrainingVram(0, 0).session_index(), Some(0));
        assert_eq!(FieldPath::WorkloadSeed.session_index(), None);
    }
}
