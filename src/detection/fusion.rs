use serde::{Deserialize, Serialize};

/// Per-record detector outputs and their fusion
///
/// A single positive detector is enough: `combined_flag` is the plain OR
/// of the two signals, with no weighting or voting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnomalyFlags {
    pub zscore_flag: bool,
    pub iqr_flag: bool,
    pub combined_flag: bool,
}

impl AnomalyFlags {
    pub fn fuse(zscore_flag: bool, iqr_flag: bool) -> Self {
        Self {
            zscore_flag,
            iqr_flag,
            combined_flag: zscore_flag || iqr_flag,
        }
    }
}
