//! Progress callback for logging training progress

use super::traits::{CallbackAction, CallbackContext, TrainerCallback};

/// Logs phase, epoch and periodic step progress through `tracing`
#[derive(Clone, Debug)]
pub struct ProgressCallback {
    /// Log every N steps
    log_interval: usize,
}

impl ProgressCallback {
    /// Create progress callback
    pub fn new(log_interval: usize) -> Self {
        Self { log_interval }
    }
}

impl Default for ProgressCallback {
    fn default() -> Self {
        Self { log_interval: 10 }
    }
}

/// End-of-epoch summary; epochs are numbered from 1
fn epoch_line(ctx: &CallbackContext) -> String {
    let epoch = ctx.epoch + 1;
    match ctx.eval_loss {
        Some(dev) => format!(
            "[Epoch {epoch}] Running loss = {:.4}  Dev loss = {dev:.4} ({:.1}s)",
            ctx.loss, ctx.elapsed_secs
        ),
        None => format!(
            "[Epoch {epoch}] Running loss = {:.4} ({:.1}s)",
            ctx.loss, ctx.elapsed_secs
        ),
    }
}

impl TrainerCallback for ProgressCallback {
    fn on_phase_begin(&mut self, ctx: &CallbackContext) -> CallbackAction {
        match ctx.competence {
            Some(c) => tracing::info!(
                "Curriculum {}/{} (competence {:.3})",
                ctx.phase + 1,
                ctx.num_phases,
                c
            ),
            None => tracing::info!("Curriculum {}/{}", ctx.phase + 1, ctx.num_phases),
        }
        CallbackAction::Continue
    }

    fn on_epoch_end(&mut self, ctx: &CallbackContext) -> CallbackAction {
        tracing::info!("{}", epoch_line(ctx));
        CallbackAction::Continue
    }

    fn on_step_end(&mut self, ctx: &CallbackContext) -> CallbackAction {
        if self.log_interval > 0 && ctx.step > 0 && ctx.step.is_multiple_of(self.log_interval) {
            tracing::debug!(
                "  Step {}/{}: loss: {:.4}",
                ctx.step,
                ctx.steps_per_epoch,
                ctx.loss
            );
        }
        CallbackAction::Continue
    }

    fn name(&self) -> &'static str {
        "ProgressCallback"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_callback_default() {
        let pc = ProgressCallback::default();
        assert_eq!(pc.log_interval, 10);
        assert_eq!(pc.name(), "ProgressCallback");
    }

    #[test]
    fn test_epoch_line_counts_from_one() {
        let ctx = CallbackContext {
            epoch: 0,
            loss: 0.5,
            eval_loss: Some(-0.25),
            ..Default::default()
        };
        let line = epoch_line(&ctx);
        assert!(line.starts_with("[Epoch 1] Running loss = 0.5000  Dev loss = -0.2500"));

        let ctx = CallbackContext {
            epoch: 4,
            ..Default::default()
        };
        assert!(epoch_line(&ctx).starts_with("[Epoch 5] Running loss"));
    }

    #[test]
    fn test_progress_callback_zero_interval() {
        let mut pc = ProgressCallback::new(0);
        let ctx = CallbackContext {
            step: 3,
            ..Default::default()
        };
        assert_eq!(pc.on_step_end(&ctx), CallbackAction::Continue);
    }
}
