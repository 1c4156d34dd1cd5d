//! Stage artifact frames.

use polars::prelude::DataFrame;

use geoedu_model::StageName;

/// The output of one join stage, kept so later consumers never re-derive it.
#[derive(Debug, Clone)]
pub struct StageFrame {
    pub stage: StageName,
    pub data: DataFrame,
}

impl StageFrame {
    pub fn new(stage: StageName, data: DataFrame) -> Self {
        Self { stage, data }
    }

    /// Returns the number of records in the frame.
    pub fn record_count(&self) -> usize {
        self.data.height()
    }

    /// File stem used when persisting the artifact.
    pub fn artifact_name(&self) -> &'static str {
        self.stage.artifact_stem()
    }
}
