use crate::core::resolve::{CityIndex, Resolution};
use crate::core::source::{RecordSource, SourceLocation};
use crate::core::{ConfigProvider, Pipeline, Storage};
use crate::domain::model::{
    City, Dataset, DirectoryReport, Hotel, HotelRow, Rejection, ReportSummary,
};
use crate::utils::error::{DirectoryError, Result};
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

pub const REPORT_HEADER: [&str; 6] = [
    "hotel_id",
    "hotel_name",
    "zone",
    "label",
    "city_id",
    "city_name",
];

pub struct DirectoryPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    source: RecordSource,
}

impl<S: Storage, C: ConfigProvider> DirectoryPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        let mut source = RecordSource::new(config.request_timeout());
        if let Some(headers) = config.request_headers() {
            source = source.with_headers(headers.clone());
        }

        Self {
            storage,
            config,
            source,
        }
    }

    fn wants(&self, format: &str) -> bool {
        self.config.output_formats().iter().any(|f| f == format)
    }
}

fn to_rows(resolution: &Resolution) -> Vec<HotelRow> {
    resolution
        .hotels
        .iter()
        .map(|resolved| HotelRow {
            hotel_id: resolved.hotel.id,
            hotel_name: resolved.hotel.name.clone(),
            zone: resolved.hotel.zone.clone(),
            label: resolved.hotel.label.clone(),
            city_id: resolved.hotel.city,
            city_name: resolved
                .city
                .as_ref()
                .map(|c| c.name.clone())
                .unwrap_or_default(),
        })
        .collect()
}

/// Renders rows as a delimited table with a header line, even when empty.
pub fn render_table(rows: &[HotelRow], delimiter: u8) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .from_writer(Vec::new());

    writer.write_record(REPORT_HEADER)?;
    for row in rows {
        writer.serialize(row)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| DirectoryError::ProcessingError {
            message: format!("Failed to flush table: {}", e),
        })?;

    String::from_utf8(bytes).map_err(|e| DirectoryError::ProcessingError {
        message: format!("Table is not valid UTF-8: {}", e),
    })
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for DirectoryPipeline<S, C> {
    async fn extract(&self) -> Result<Dataset> {
        let cities_location = SourceLocation::parse(self.config.cities_source())?;
        let hotels_location = SourceLocation::parse(self.config.hotels_source())?;

        let (cities, hotels) = tokio::try_join!(
            self.source.load::<City>(&cities_location),
            self.source.load::<Hotel>(&hotels_location),
        )?;

        let mut rejected: Vec<Rejection> = cities.rejected;
        rejected.extend(hotels.rejected);

        if !rejected.is_empty() {
            tracing::warn!("{} record(s) did not match their shape", rejected.len());
        }

        Ok(Dataset {
            cities: cities.accepted,
            hotels: hotels.accepted,
            rejected,
        })
    }

    async fn transform(&self, data: Dataset) -> Result<DirectoryReport> {
        let index = CityIndex::new(&data.cities);
        let resolution = index.resolve_all(&data.hotels);

        if !resolution.unresolved.is_empty() {
            tracing::info!(
                "{} hotel(s) reference an unknown city",
                resolution.unresolved.len()
            );
        }

        let rows = to_rows(&resolution);
        let csv_output = render_table(&rows, b',')?;
        let tsv_output = render_table(&rows, b'\t')?;

        let summary = ReportSummary {
            cities: data.cities.len(),
            hotels: data.hotels.len(),
            rejected: data.rejected.len(),
            unresolved_references: resolution.unresolved,
            duplicate_city_ids: index.duplicate_ids(),
            generated_at: chrono::Utc::now(),
        };

        Ok(DirectoryReport {
            rows,
            csv_output,
            tsv_output,
            summary,
            rejected: data.rejected,
        })
    }

    async fn load(&self, report: DirectoryReport) -> Result<String> {
        let archive_name = self.config.archive_name();
        let output_path = format!("{}/{}", self.config.output_path(), archive_name);

        let zip_data = {
            let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));

            if self.wants("csv") {
                zip.start_file::<_, ()>("hotels.csv", FileOptions::default())?;
                zip.write_all(report.csv_output.as_bytes())?;
            }

            if self.wants("tsv") {
                zip.start_file::<_, ()>("hotels.tsv", FileOptions::default())?;
                zip.write_all(report.tsv_output.as_bytes())?;
            }

            if self.wants("json") {
                zip.start_file::<_, ()>("hotels.json", FileOptions::default())?;
                zip.write_all(serde_json::to_string_pretty(&report.rows)?.as_bytes())?;
            }

            zip.start_file::<_, ()>("summary.json", FileOptions::default())?;
            zip.write_all(serde_json::to_string_pretty(&report.summary)?.as_bytes())?;

            if !report.rejected.is_empty() {
                zip.start_file::<_, ()>("rejected.json", FileOptions::default())?;
                zip.write_all(serde_json::to_string_pretty(&report.rejected)?.as_bytes())?;
            }

            let cursor = zip.finish()?;
            cursor.into_inner()
        };

        tracing::debug!("Writing ZIP file ({} bytes) to storage", zip_data.len());
        self.storage.write_file(archive_name, &zip_data).await?;

        Ok(output_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Read;
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::sync::Mutex;

    #[derive(Clone)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn new() -> Self {
            Self {
                files: Arc::new(Mutex::new(HashMap::new())),
            }
        }

        async fn get_file(&self, path: &str) -> Option<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned()
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
            let files = self.files.lock().await;
            files.get(path).cloned().ok_or_else(|| {
                DirectoryError::IoError(std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    format!("File not found: {}", path),
                ))
            })
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            let mut files = self.files.lock().await;
            files.insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    struct MockConfig {
        output_formats: Vec<String>,
    }

    impl MockConfig {
        fn new(formats: &[&str]) -> Self {
            Self {
                output_formats: formats.iter().map(|f| f.to_string()).collect(),
            }
        }
    }

    impl ConfigProvider for MockConfig {
        fn cities_source(&self) -> &str {
            "cities.json"
        }

        fn hotels_source(&self) -> &str {
            "hotels.json"
        }

        fn output_path(&self) -> &str {
            "test_output"
        }

        fn output_formats(&self) -> &[String] {
            &self.output_formats
        }

        fn archive_name(&self) -> &str {
            "directory_output.zip"
        }

        fn request_timeout(&self) -> Duration {
            Duration::from_secs(5)
        }
    }

    fn sample_dataset() -> Dataset {
        Dataset {
            cities: vec![City {
                id: 1,
                name: "Paris".to_string(),
            }],
            hotels: vec![
                Hotel {
                    id: 10,
                    zone: "Centre".to_string(),
                    name: "Grand Hotel".to_string(),
                    city: 1,
                    label: "Luxury".to_string(),
                },
                Hotel {
                    id: 11,
                    zone: "Nowhere".to_string(),
                    name: "Ghost Inn".to_string(),
                    city: 999,
                    label: "Budget".to_string(),
                },
            ],
            rejected: vec![],
        }
    }

    #[tokio::test]
    async fn test_transform_joins_city_names() {
        let pipeline = DirectoryPipeline::new(MockStorage::new(), MockConfig::new(&["csv"]));

        let report = pipeline.transform(sample_dataset()).await.unwrap();

        assert_eq!(report.rows.len(), 2);
        assert_eq!(report.rows[0].city_name, "Paris");
        assert_eq!(report.rows[1].city_name, "");
        assert_eq!(report.summary.unresolved_references, vec![11]);

        let lines: Vec<&str> = report.csv_output.lines().collect();
        assert_eq!(lines[0], "hotel_id,hotel_name,zone,label,city_id,city_name");
        assert_eq!(lines[1], "10,Grand Hotel,Centre,Luxury,1,Paris");
        assert_eq!(lines[2], "11,Ghost Inn,Nowhere,Budget,999,");
        assert!(report.tsv_output.starts_with("hotel_id\thotel_name\t"));
    }

    #[tokio::test]
    async fn test_transform_empty_dataset() {
        let pipeline = DirectoryPipeline::new(MockStorage::new(), MockConfig::new(&["csv"]));

        let report = pipeline.transform(Dataset::default()).await.unwrap();

        assert!(report.rows.is_empty());
        assert_eq!(report.csv_output.trim_end(), REPORT_HEADER.join(","));
        assert_eq!(report.summary.hotels, 0);
    }

    #[tokio::test]
    async fn test_load_writes_selected_entries() {
        let storage = MockStorage::new();
        let pipeline = DirectoryPipeline::new(storage.clone(), MockConfig::new(&["tsv", "json"]));

        let mut dataset = sample_dataset();
        dataset.rejected.push(Rejection {
            entity: "City".to_string(),
            source: "cities.json".to_string(),
            index: 3,
            reasons: vec!["missing field 'name'".to_string()],
        });

        let report = pipeline.transform(dataset).await.unwrap();
        let output_path = pipeline.load(report).await.unwrap();
        assert_eq!(output_path, "test_output/directory_output.zip");

        let zip_data = storage.get_file("directory_output.zip").await.unwrap();
        let mut archive = zip::ZipArchive::new(std::io::Cursor::new(zip_data)).unwrap();
        let names: Vec<String> = archive.file_names().map(|n| n.to_string()).collect();

        assert!(names.contains(&"hotels.tsv".to_string()));
        assert!(names.contains(&"hotels.json".to_string()));
        assert!(names.contains(&"summary.json".to_string()));
        assert!(names.contains(&"rejected.json".to_string()));
        assert!(!names.contains(&"hotels.csv".to_string()));

        let mut summary = String::new();
        archive
            .by_name("summary.json")
            .unwrap()
            .read_to_string(&mut summary)
            .unwrap();
        let summary: ReportSummary = serde_json::from_str(&summary).unwrap();
        assert_eq!(summary.rejected, 1);
        assert_eq!(summary.cities, 1);
    }

    #[test]
    fn test_render_table_quotes_delimiters() {
        let rows = vec![HotelRow {
            hotel_id: 1,
            hotel_name: "Inn, The".to_string(),
            zone: "Centre".to_string(),
            label: "".to_string(),
            city_id: 2,
            city_name: "Lyon".to_string(),
        }];

        let csv = render_table(&rows, b',').unwrap();
        assert!(csv.contains("1,\"Inn, The\",Centre,,2,Lyon"));

        let tsv = render_table(&rows, b'\t').unwrap();
        assert!(tsv.contains("1\tInn, The\tCentre\t\t2\tLyon"));
    }
}
