// stepwise/src/compose/report.rs

//! Per-run record of which steps were performed.

/// Which steps of one run were invoked and completed without triggering
/// cancellation. A fresh report is created for every run, so nothing carries
/// over between runs of the same pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
  performed: Vec<bool>,
}

impl RunReport {
  pub fn new(len: usize) -> Self {
    Self {
      performed: vec![false; len],
    }
  }

  /// Marks the step at `index` performed. Out-of-range indices are ignored.
  pub fn mark_performed(&mut self, index: usize) {
    if let Some(slot) = self.performed.get_mut(index) {
      *slot = true;
    }
  }

  pub fn is_performed(&self, index: usize) -> bool {
    self.performed.get(index).copied().unwrap_or(false)
  }

  /// Number of steps covered by the report.
  pub fn len(&self) -> usize {
    self.performed.len()
  }

  pub fn is_empty(&self) -> bool {
    self.performed.is_empty()
  }

  pub fn performed_count(&self) -> usize {
    self.performed.iter().filter(|p| **p).count()
  }

  pub fn skipped_count(&self) -> usize {
    self.len() - self.performed_count()
  }

  pub fn performed_indices(&self) -> impl Iterator<Item = usize> + '_ {
    self.performed.iter().enumerate().filter(|(_, p)| **p).map(|(i, _)| i)
  }

  pub fn skipped_indices(&self) -> impl Iterator<Item = usize> + '_ {
    self.performed.iter().enumerate().filter(|(_, p)| !**p).map(|(i, _)| i)
  }
}
