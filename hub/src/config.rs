//! Hub configuration.

/// Default advisory limit of registrations per event name.
pub const DEFAULT_MAX_LISTENERS: usize = 10;

/// Default number of event names the table reserves room for.
pub const DEFAULT_CAPACITY: usize = 16;

/// Settings for an [`Emitter`](crate::Emitter) or [`Hub`](crate::Hub).
///
/// ```rust,ignore
/// let hub = Hub::<Chat>::with_config(
///     HubConfig::default()
///         .with_max_listeners(None)
///         .with_capacity(64),
/// );
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HubConfig {
    /// Registrations per event name above which a leak warning is logged.
    /// `None` disables the warning. Never limits registration.
    pub max_listeners: Option<usize>,

    /// Event names to reserve table room for.
    pub capacity: usize,
}

impl HubConfig {
    pub fn with_max_listeners(mut self, max_listeners: Option<usize>) -> Self {
        self.max_listeners = max_listeners;
        self
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            max_listeners: Some(DEFAULT_MAX_LISTENERS),
            capacity: DEFAULT_CAPACITY,
        }
    }
}
