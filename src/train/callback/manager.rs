//! Callback manager for dispatching events to multiple callbacks

use super::traits::{CallbackAction, CallbackContext, TrainerCallback};

/// Manages multiple callbacks and dispatches events
///
/// Dispatch stops at the first callback that asks for anything other than
/// `Continue`.
#[derive(Default)]
pub struct CallbackManager {
    callbacks: Vec<Box<dyn TrainerCallback>>,
}

impl CallbackManager {
    /// Create new callback manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a callback
    pub fn add<C: TrainerCallback + 'static>(&mut self, callback: C) {
        self.callbacks.push(Box::new(callback));
    }

    /// Check if no callbacks are registered
    pub fn is_empty(&self) -> bool {
        self.callbacks.is_empty()
    }

    /// Get number of callbacks
    pub fn len(&self) -> usize {
        self.callbacks.len()
    }

    /// Names of registered callbacks
    pub fn names(&self) -> Vec<&'static str> {
        self.callbacks.iter().map(|cb| cb.name()).collect()
    }

    fn dispatch<F>(&mut self, mut event: F) -> CallbackAction
    where
        F: FnMut(&mut Box<dyn TrainerCallback>) -> CallbackAction,
    {
        for cb in &mut self.callbacks {
            match event(cb) {
                CallbackAction::Continue => {}
                other => return other,
            }
        }
        CallbackAction::Continue
    }

    /// Fire train begin event
    pub fn on_train_begin(&mut self, ctx: &CallbackContext) -> CallbackAction {
        self.dispatch(|cb| cb.on_train_begin(ctx))
    }

    /// Fire train end event
    pub fn on_train_end(&mut self, ctx: &CallbackContext) {
        for cb in &mut self.callbacks {
            cb.on_train_end(ctx);
        }
    }

    /// Fire phase begin event
    pub fn on_phase_begin(&mut self, ctx: &CallbackContext) -> CallbackAction {
        self.dispatch(|cb| cb.on_phase_begin(ctx))
    }

    /// Fire epoch begin event
    pub fn on_epoch_begin(&mut self, ctx: &CallbackContext) -> CallbackAction {
        self.dispatch(|cb| cb.on_epoch_begin(ctx))
    }

    /// Fire epoch end event
    pub fn on_epoch_end(&mut self, ctx: &CallbackContext) -> CallbackAction {
        self.dispatch(|cb| cb.on_epoch_end(ctx))
    }

    /// Fire step end event
    pub fn on_step_end(&mut self, ctx: &CallbackContext) -> CallbackAction {
        self.dispatch(|cb| cb.on_step_end(ctx))
    }

    /// Fire validation event
    pub fn on_validation(&mut self, ctx: &CallbackContext) -> CallbackAction {
        self.dispatch(|cb| cb.on_validation(ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::train::callback::ProgressCallback;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct StopOnEpochEnd;
    impl TrainerCallback for StopOnEpochEnd {
        fn on_epoch_end(&mut self, _: &CallbackContext) -> CallbackAction {
            CallbackAction::Stop
        }
        fn name(&self) -> &'static str {
            "StopOnEpochEnd"
        }
    }

    struct Counting {
        count: Arc<AtomicUsize>,
    }
    impl TrainerCallback for Counting {
        fn on_epoch_end(&mut self, _: &CallbackContext) -> CallbackAction {
            self.count.fetch_add(1, Ordering::SeqCst);
            CallbackAction::Continue
        }
        fn on_train_end(&mut self, _: &CallbackContext) {
            self.count.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_callback_manager_len_and_empty() {
        let mut manager = CallbackManager::new();
        assert!(manager.is_empty());

        manager.add(ProgressCallback::new(10));
        assert_eq!(manager.len(), 1);
        assert_eq!(manager.names(), vec!["ProgressCallback"]);
    }

    #[test]
    fn test_callback_manager_stop_short_circuits() {
        let count = Arc::new(AtomicUsize::new(0));
        let mut manager = CallbackManager::new();
        manager.add(StopOnEpochEnd);
        manager.add(Counting {
            count: count.clone(),
        });

        let ctx = CallbackContext::default();
        assert_eq!(manager.on_epoch_end(&ctx), CallbackAction::Stop);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_callback_manager_train_end_reaches_all() {
        let count = Arc::new(AtomicUsize::new(0));
        let mut manager = CallbackManager::new();
        for _ in 0..3 {
            manager.add(Counting {
                count: count.clone(),
            });
        }
        manager.on_train_end(&CallbackContext::default());
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_callback_manager_skip_epoch_propagates() {
        struct Skip;
        impl TrainerCallback for Skip {
            fn on_epoch_begin(&mut self, _: &CallbackContext) -> CallbackAction {
                CallbackAction::SkipEpoch
            }
        }

        let mut manager = CallbackManager::new();
        manager.add(Skip);
        assert_eq!(
            manager.on_epoch_begin(&CallbackContext::default()),
            CallbackAction::SkipEpoch
        );
        assert_eq!(
            manager.on_phase_begin(&CallbackContext::default()),
            CallbackAction::Continue
        );
    }
}
