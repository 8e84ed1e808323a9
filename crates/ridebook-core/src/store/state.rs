use ridebook_api::{FilterSet, Page, Stats};

/// Coarse lifecycle position of a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Nothing requested yet.
    Idle,
    Loading,
    /// Last request succeeded.
    Ready,
    /// Last request failed; `data` may still hold the previous result.
    Failed,
}

/// Observable state of a [`ResourceStore`](super::ResourceStore).
#[derive(Debug, Clone, PartialEq)]
pub struct ResourceState<T> {
    /// Last successfully fetched page. Survives later failures.
    pub data: Option<Page<T>>,
    /// True while the most recently issued request is outstanding.
    pub loading: bool,
    pub error: Option<String>,
    /// Filters the most recent fetch was issued with.
    pub filters: FilterSet,
}

impl<T> Default for ResourceState<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: false,
            error: None,
            filters: FilterSet::new(),
        }
    }
}

impl<T> ResourceState<T> {
    pub fn items(&self) -> &[T] {
        self.data.as_ref().map_or(&[], |page| page.items.as_slice())
    }

    pub fn phase(&self) -> Phase {
        phase_of(self.loading, self.error.is_some(), self.data.is_some())
    }
}

/// Observable state of a [`StatsStore`](super::StatsStore).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatsState {
    pub data: Option<Stats>,
    pub loading: bool,
    pub error: Option<String>,
}

impl StatsState {
    pub fn phase(&self) -> Phase {
        phase_of(self.loading, self.error.is_some(), self.data.is_some())
    }
}

fn phase_of(loading: bool, failed: bool, has_data: bool) -> Phase {
    if loading {
        Phase::Loading
    } else if failed {
        Phase::Failed
    } else if has_data {
        Phase::Ready
    } else {
        Phase::Idle
    }
}
