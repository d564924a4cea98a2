//! Process-wide cache for the single live transcription pipeline.
//!
//! Model instances are expensive to construct and hold large weight
//! buffers, so at most one lives at a time. The cache pairs the instance
//! with the configuration key that produced it; a request under a different
//! key disposes the old instance before a new one is constructed.

use murmur_bridge::DecodeTask;
use murmur_bridge::model::{ModelPrecision, WhisperModel};

/// Configuration that identifies one pipeline instance.
///
/// Two requests share a cached instance only when every field matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineKey {
    pub task: DecodeTask,
    pub model: WhisperModel,
    pub precision: ModelPrecision,
    pub use_accelerator: bool,
}

/// Holder of the at-most-one live pipeline instance.
///
/// The running transcription call checks the instance out, taking exclusive
/// ownership for the duration of the run, and stores it back afterwards.
/// While checked out the cache is empty.
#[derive(Debug, Default)]
pub struct PipelineCache<P> {
    entry: Option<(PipelineKey, P)>,
}

impl<P> PipelineCache<P> {
    pub fn new() -> Self {
        Self { entry: None }
    }

    /// Removes and returns the cached instance if its key matches.
    ///
    /// An instance cached under a different key is dropped here, before the
    /// caller constructs its replacement, so that two instances never live
    /// at once.
    pub fn take_matching(&mut self, key: &PipelineKey) -> Option<P> {
        let (cached_key, instance) = self.entry.take()?;
        if cached_key == *key {
            return Some(instance);
        }

        log::info!(
            "Pipeline configuration changed from {cached_key:?} to {key:?}, disposing the cached instance."
        );
        drop(instance);
        None
    }

    /// Stores an instance back after a run.
    pub fn store(&mut self, key: PipelineKey, instance: P) {
        self.entry = Some((key, instance));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    type EventLog = Rc<RefCell<Vec<String>>>;

    struct Probe {
        name: &'static str,
        log: EventLog,
    }

    impl Drop for Probe {
        fn drop(&mut self) {
            self.log.borrow_mut().push(format!("dispose:{}", self.name));
        }
    }

    fn key(model: WhisperModel, precision: ModelPrecision) -> PipelineKey {
        PipelineKey {
            task: DecodeTask::Transcribe,
            model,
            precision,
            use_accelerator: false,
        }
    }

    fn construct(log: &EventLog, name: &'static str) -> Probe {
        log.borrow_mut().push(format!("construct:{name}"));
        Probe {
            name,
            log: log.clone(),
        }
    }

    #[test]
    fn identical_key_reuses_the_instance() {
        let log: EventLog = Rc::default();
        let mut cache = PipelineCache::new();
        let a = key(WhisperModel::Base, ModelPrecision::Full);

        assert!(cache.take_matching(&a).is_none());
        cache.store(a.clone(), construct(&log, "a"));

        let instance = cache.take_matching(&a).expect("cached instance expected");
        cache.store(a.clone(), instance);
        assert!(cache.take_matching(&a).is_some());

        assert_eq!(log.borrow().as_slice(), ["construct:a"]);
    }

    #[test]
    fn changed_key_disposes_before_the_new_instance_is_built() {
        let log: EventLog = Rc::default();
        let mut cache = PipelineCache::new();
        let a = key(WhisperModel::Base, ModelPrecision::Full);
        let b = key(WhisperModel::Small, ModelPrecision::Full);

        cache.store(a, construct(&log, "a"));
        assert!(cache.take_matching(&b).is_none());
        cache.store(b, construct(&log, "b"));

        assert_eq!(
            log.borrow().as_slice(),
            ["construct:a", "dispose:a", "construct:b"]
        );
    }

    #[test]
    fn changed_precision_also_invalidates() {
        let log: EventLog = Rc::default();
        let mut cache = PipelineCache::new();

        cache.store(
            key(WhisperModel::Base, ModelPrecision::Full),
            construct(&log, "full"),
        );
        assert!(
            cache
                .take_matching(&key(WhisperModel::Base, ModelPrecision::Quantized8))
                .is_none()
        );
        assert_eq!(log.borrow().last().unwrap(), "dispose:full");
    }

    #[test]
    fn checked_out_instance_leaves_the_cache_empty() {
        let log: EventLog = Rc::default();
        let mut cache = PipelineCache::new();
        let a = key(WhisperModel::Tiny, ModelPrecision::Quantized5);

        cache.store(a.clone(), construct(&log, "a"));
        let _held = cache.take_matching(&a).expect("cached instance expected");
        assert!(cache.take_matching(&a).is_none());
    }
}
