use crate::domain::ports::Pipeline;
use crate::utils::error::Result;
use std::time::Instant;

/// 依序執行 extract → transform → load，並記錄各階段耗時
pub struct AuditEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> AuditEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    pub fn run(&self) -> Result<String> {
        let name = self.pipeline.name().to_string();
        let started = Instant::now();
        tracing::info!(pipeline = %name, "🚀 Starting pipeline");

        let stage = Instant::now();
        let raw_data = self.pipeline.extract()?;
        tracing::info!(
            pipeline = %name,
            duration_ms = stage.elapsed().as_millis() as u64,
            "📥 Extract finished"
        );

        let stage = Instant::now();
        let transformed = self.pipeline.transform(raw_data)?;
        tracing::info!(
            pipeline = %name,
            duration_ms = stage.elapsed().as_millis() as u64,
            "🔄 Transform finished"
        );

        let stage = Instant::now();
        let output = self.pipeline.load(transformed)?;
        tracing::info!(
            pipeline = %name,
            duration_ms = stage.elapsed().as_millis() as u64,
            output = %output,
            "💾 Load finished"
        );

        tracing::info!(
            pipeline = %name,
            duration_ms = started.elapsed().as_millis() as u64,
            "✅ Pipeline completed"
        );
        Ok(output)
    }
}
