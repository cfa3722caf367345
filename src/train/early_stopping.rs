//! Dev-loss patience tracking

/// What the trainer should do after a dev evaluation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PatienceDecision {
    /// Improvement (or grace epoch): checkpoint and keep going
    Save,
    /// No improvement yet: keep going
    Wait,
    /// Patience exhausted: end this inner loop
    Stop,
}

/// Tracks dev loss within one inner training loop
///
/// An epoch counts as improving when its dev loss is strictly below the best
/// so far. Epochs before `grace_epochs` always checkpoint and reset the
/// counter. With `patience` unset (or zero) training never stops early.
///
/// # Example
///
/// ```rust
/// use escalera::train::{EarlyStopping, PatienceDecision};
///
/// let mut es = EarlyStopping::new(Some(1), 0);
/// assert_eq!(es.observe(0, -0.3), PatienceDecision::Save);
/// assert_eq!(es.observe(1, -0.2), PatienceDecision::Stop);
/// ```
#[derive(Clone, Debug)]
pub struct EarlyStopping {
    patience: Option<usize>,
    grace_epochs: usize,
    best_loss: f32,
    epochs_without_improvement: usize,
}

impl EarlyStopping {
    /// Create a tracker
    pub fn new(patience: Option<usize>, grace_epochs: usize) -> Self {
        Self {
            patience: patience.filter(|p| *p > 0),
            grace_epochs,
            best_loss: f32::INFINITY,
            epochs_without_improvement: 0,
        }
    }

    /// Best dev loss so far
    pub fn best_loss(&self) -> Option<f32> {
        self.best_loss.is_finite().then_some(self.best_loss)
    }

    /// Epochs since the last checkpoint
    pub fn wait(&self) -> usize {
        self.epochs_without_improvement
    }

    /// Record the dev loss of `epoch` (0-indexed)
    pub fn observe(&mut self, epoch: usize, eval_loss: f32) -> PatienceDecision {
        let is_better = eval_loss < self.best_loss;
        if is_better {
            self.best_loss = eval_loss;
        }

        if is_better || epoch < self.grace_epochs {
            self.epochs_without_improvement = 0;
            return PatienceDecision::Save;
        }

        self.epochs_without_improvement += 1;
        match self.patience {
            Some(p) if self.epochs_without_improvement >= p => {
                tracing::info!("Max patience {p} hit. Early stopping at epoch {epoch}.");
                PatienceDecision::Stop
            }
            _ => PatienceDecision::Wait,
        }
    }
}
