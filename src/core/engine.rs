use crate::core::Pipeline;
use crate::utils::error::Result;

pub struct DirectoryEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> DirectoryEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self) -> Result<String> {
        tracing::info!("Starting directory build...");

        tracing::info!("Extracting records...");
        let dataset = self.pipeline.extract().await?;
        tracing::info!(
            "Extracted {} cities, {} hotels ({} rejected)",
            dataset.cities.len(),
            dataset.hotels.len(),
            dataset.rejected.len()
        );

        tracing::info!("Resolving hotel cities...");
        let report = self.pipeline.transform(dataset).await?;
        tracing::info!(
            "Rendered {} rows, {} unresolved reference(s)",
            report.rows.len(),
            report.summary.unresolved_references.len()
        );

        tracing::info!("Writing archive...");
        let output_path = self.pipeline.load(report).await?;
        tracing::info!("Output saved to: {}", output_path);

        Ok(output_path)
    }
}
