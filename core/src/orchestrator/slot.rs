//! Per-source cache entry with generation stamping.

/// What happened when a completed fetch reached its slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Result stored as the source's current data
    Applied,
    /// Error recorded; previous data kept
    Failed,
    /// A later dispatch superseded this one; result dropped
    Stale,
}

/// Last good payload for one source, plus its in-flight state.
///
/// `generation` counts dispatches. Only the completion carrying the current
/// generation may write to the slot.
#[derive(Debug, Clone)]
pub struct SourceSlot<T> {
    data: Option<T>,
    loading: bool,
    error: Option<String>,
    generation: u64,
}

impl<T> Default for SourceSlot<T> {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl<T> SourceSlot<T> {
    /// Never dispatched
    pub const EMPTY: Self = Self {
        data: None,
        loading: false,
        error: None,
        generation: 0,
    };

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Start a dispatch and return its generation
    pub(crate) fn begin(&mut self) -> u64 {
        self.generation += 1;
        self.loading = true;
        self.generation
    }

    /// Apply a completed fetch if it is still the latest one
    pub(crate) fn finish(&mut self, generation: u64, result: Result<T, String>) -> Completion {
        if generation != self.generation {
            return Completion::Stale;
        }
        self.loading = false;
        match result {
            Ok(data) => {
                self.data = Some(data);
                self.error = None;
                Completion::Applied
            }
            Err(message) => {
                self.error = Some(message);
                Completion::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_older_generation_is_dropped() {
        let mut slot = SourceSlot::<u32>::default();
        let g1 = slot.begin();
        let g2 = slot.begin();

        assert_eq!(slot.finish(g2, Ok(2)), Completion::Applied);
        assert_eq!(slot.finish(g1, Ok(1)), Completion::Stale);
        assert_eq!(slot.data(), Some(&2));
        assert!(!slot.is_loading());
    }

    #[test]
    fn test_stale_completion_keeps_loading() {
        let mut slot = SourceSlot::<u32>::default();
        let g1 = slot.begin();
        slot.begin();

        assert_eq!(slot.finish(g1, Ok(1)), Completion::Stale);
        assert!(slot.is_loading());
        assert_eq!(slot.data(), None);
    }

    #[test]
    fn test_error_keeps_previous_data() {
        let mut slot = SourceSlot::<u32>::default();
        let g = slot.begin();
        slot.finish(g, Ok(7));

        let g = slot.begin();
        assert_eq!(slot.finish(g, Err("timeout".into())), Completion::Failed);
        assert_eq!(slot.data(), Some(&7));
        assert_eq!(slot.error(), Some("timeout"));

        let g = slot.begin();
        slot.finish(g, Ok(8));
        assert_eq!(slot.error(), None);
    }
}
