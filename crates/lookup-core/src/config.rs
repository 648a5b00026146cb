/// `RemovalBatch` decides what delta listeners are told was removed by `View::remove_all`
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Clone, Copy, Default, PartialEq, Eq, Debug, Hash)]
pub enum RemovalBatch {
    /// Every value passed in, whether or not it was stored
    #[default]
    Requested,
    /// Only the values that were actually stored and removed
    Effective,
}

/// `LookupConfig` contains the notification policy of a `Registry`
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
#[derive(Clone, PartialEq, Eq, Debug, Hash)]
pub struct LookupConfig {
    pub removal_batch: RemovalBatch,
    /// Dispatch bulk calls that neither added nor removed anything.
    /// Snapshot listeners still receive the current contents, delta listeners receive nothing.
    pub notify_empty: bool,
}

impl LookupConfig {
    pub fn new(removal_batch: RemovalBatch, notify_empty: bool) -> Self {
        Self {
            removal_batch,
            notify_empty,
        }
    }

    fn default_notify_empty() -> bool {
        true
    }
}

impl Default for LookupConfig {
    /// Creates a `RemovalBatch::Requested` config that notifies on empty bulk calls
    fn default() -> Self {
        Self {
            removal_batch: RemovalBatch::default(),
            notify_empty: LookupConfig::default_notify_empty(),
        }
    }
}

impl From<RemovalBatch> for LookupConfig {
    fn from(removal_batch: RemovalBatch) -> Self {
        Self::new(removal_batch, LookupConfig::default_notify_empty())
    }
}

impl From<bool> for LookupConfig {
    fn from(notify_empty: bool) -> Self {
        Self::new(RemovalBatch::default(), notify_empty)
    }
}
