//! Random resource configuration for a training event

use crate::models::{GpuUtilization, TrainingEvent};
use crate::sync;
use rand::Rng;

pub const RANDOM_CPU_MAX: f64 = 100.0;
pub const RANDOM_MEMORY_MAX: f64 = 128.0;
pub const RANDOM_GPU_UTILIZATION_MAX: f64 = 100.0;
pub const RANDOM_GPUS_MIN: i64 = 1;
pub const RANDOM_GPUS_MAX: i64 = 8;

/// Round to three decimal places
pub fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

/// Assign random CPU, memory, GPU count, and per-GPU utilization values
///
/// The utilization array is resized to the new GPU count; surviving
/// entries are overwritten with fresh values.
pub fn randomize_training<R: Rng + ?Sized>(training: &mut TrainingEvent, rng: &mut R) {
    training.cpus = round3(rng.gen_range(0.0..RANDOM_CPU_MAX));
    training.memory = round3(rng.gen_range(0.0..RANDOM_MEMORY_MAX));

    let gpus = rng.gen_range(RANDOM_GPUS_MIN..=RANDOM_GPUS_MAX);
    training.gpus = Some(gpus);
    sync::resize(
        &mut training.gpu_utilizations,
        sync::clamp_gpu_count(gpus),
        GpuUtilization::default,
    );

    for gpu in training.gpu_utilizations.iter_mut() {
        gpu.utilization = round3(rng.gen_range(0.0..RANDOM_GPU_UTILIZATION_MAX));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_round3() {
        assert_eq!(round3(1.23456), 1.235);
        assert_eq!(round3(0.0004), 0.0);
        assert_eq!(round3(99.9999), 100.0);
    }

    #[test]
    fn test_randomized_values_in_range() {
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..200 {
            let mut training = TrainingEvent::default();
            randomize_training(&mut training, &mut rng);

            assert!((0.0..=RANDOM_CPU_MAX).contains(&training.cpus));
            assert!((0.0..=RANDOM_MEMORY_MAX).contains(&training.memory));

            let gpus = training.gpus.unwrap();
            assert!((RANDOM_GPUS_MIN..=RANDOM_GPUS_MAX).contains(&gpus));
            assert_eq!(training.gpu_utilizations.len() as i64, gpus);
            for gpu in &training.gpu_utilizations {
                assert!((0.0..=RANDOM_GPU_UTILIZATION_MAX).contains(&gpu.utilization));
                assert_eq!(round3(gpu.utilization), gpu.utilization);
            }
        }
    }

    #[test]
    fn test_randomize_leaves_ticks_alone() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut training = TrainingEvent {
            start_tick: 9,
            duration_in_ticks: 4,
            ..TrainingEvent::default()
        };

        randomize_training(&mut training, &mut rng);

        assert_eq!(training.start_tick, 9);
        assert_eq!(training.duration_in_ticks, 4);
    }
}
