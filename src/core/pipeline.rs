use crate::core::client::SparqlClient;
use crate::core::harvest::WikidataClient;
use crate::core::mapper;
use crate::core::retry::RetryPolicy;
use crate::core::{ConfigProvider, Pipeline, Storage};
use crate::domain::model::{HarvestOutput, PersonInfo};
use crate::utils::error::{Result, WikidataError};
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

/// Harvest pipeline: fetch profiles for the configured names (or IDs),
/// render them to CSV and JSON, write the outputs through [`Storage`].
pub struct PeoplePipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    client: WikidataClient,
}

impl<S: Storage, C: ConfigProvider> PeoplePipeline<S, C> {
    pub fn new(storage: S, config: C) -> Result<Self> {
        let retry = RetryPolicy {
            max_attempts: config.retries(),
            ..RetryPolicy::default()
        };
        Self::new_with_policy(storage, config, retry)
    }

    pub fn new_with_policy(storage: S, config: C, retry: RetryPolicy) -> Result<Self> {
        let sparql = SparqlClient::with_retry(config.endpoint(), retry)?;
        let client = WikidataClient::with_client(sparql).with_chunk_size(config.chunk_size());
        Ok(Self {
            storage,
            config,
            client,
        })
    }
}

#[async_trait::async_trait]
impl<S: Storage, C: ConfigProvider> Pipeline for PeoplePipeline<S, C> {
    async fn extract(&self) -> Result<Vec<PersonInfo>> {
        let names = self.config.names();
        tracing::debug!(
            targets = names.len(),
            by_ids = self.config.by_ids(),
            endpoint = self.config.endpoint(),
            "starting harvest"
        );

        if self.config.by_ids() {
            self.client.people_info_by_ids_backfill(names).await
        } else {
            self.client.people_info_backfill(names).await
        }
    }

    async fn transform(&self, records: Vec<PersonInfo>) -> Result<HarvestOutput> {
        let csv_output = render_csv(&records)?;
        let json_output = serde_json::to_string_pretty(&records)?;
        Ok(HarvestOutput {
            records,
            csv_output,
            json_output,
        })
    }

    async fn load(&self, output: HarvestOutput) -> Result<String> {
        self.storage
            .write_file("people.csv", output.csv_output.as_bytes())
            .await?;
        self.storage
            .write_file("people.json", output.json_output.as_bytes())
            .await?;

        if self.config.archive() {
            let zip_data = {
                let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
                zip.start_file::<_, ()>("people.csv", FileOptions::default())?;
                zip.write_all(output.csv_output.as_bytes())?;
                zip.start_file::<_, ()>("people.json", FileOptions::default())?;
                zip.write_all(output.json_output.as_bytes())?;
                let cursor = zip.finish()?;
                cursor.into_inner()
            };
            tracing::debug!(bytes = zip_data.len(), "writing harvest archive");
            self.storage.write_file("harvest.zip", &zip_data).await?;
            return Ok(format!("{}/harvest.zip", self.config.output_path()));
        }

        Ok(format!("{}/people.csv", self.config.output_path()))
    }
}

/// CSV rendering: multi-valued attributes join with commas inside one
/// cell, work-location year spans with semicolons (`place:min-max`).
fn render_csv(records: &[PersonInfo]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "name",
        "id",
        "birth_place",
        "birth_date",
        "death_date",
        "death_place",
        "gender",
        "citizenship",
        "occupations",
        "work_locations",
        "work_location_years",
        "influences",
        "exhibitions",
    ])?;

    for record in records {
        writer.write_record([
            record.name.as_deref().unwrap_or(""),
            record.id.as_deref().unwrap_or(""),
            record.birth_place.as_deref().unwrap_or(""),
            record.birth_date.as_deref().unwrap_or(""),
            record.death_date.as_deref().unwrap_or(""),
            record.death_place.as_deref().unwrap_or(""),
            record.gender.as_deref().unwrap_or(""),
            record.citizenship.as_deref().unwrap_or(""),
            &record.occupations.join(","),
            &mapper::places(record).join(","),
            &mapper::places_with_years(record, ",").join(";"),
            &record.influences.join(","),
            &record.exhibitions.join(","),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| WikidataError::ProcessingError {
            message: format!("CSV writer flush failed: {}", e),
        })?;
    String::from_utf8(bytes).map_err(|e| WikidataError::ProcessingError {
        message: format!("CSV output was not valid UTF-8: {}", e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::WorkLocation;

    #[test]
    fn csv_renders_joined_multi_values() {
        let mut person = PersonInfo::named("Vincent van Gogh");
        person.id = Some("Q5582".into());
        person.birth_place = Some("Zundert".into());
        person.occupations = vec!["painter".into(), "drawer".into()];
        person.influences = vec!["Anton Mauve".into(), "Jean-François Millet".into()];
        person.exhibitions = vec!["Van Gogh Museum".into()];
        person.work_locations = vec![
            WorkLocation {
                location: "Paris".into(),
                start_time: Some("1886-02-28T00:00:00Z".into()),
                end_time: Some("1888-02-20T00:00:00Z".into()),
                point_in_time: None,
            },
            WorkLocation {
                location: "Arles".into(),
                start_time: None,
                end_time: None,
                point_in_time: Some("1888-05-01T00:00:00Z".into()),
            },
        ];

        let csv = render_csv(&[person]).unwrap();
        let mut lines = csv.lines();
        assert!(lines.next().unwrap().starts_with("name,id,birth_place"));
        let row = lines.next().unwrap();
        assert!(row.contains("Vincent van Gogh"));
        assert!(row.contains("Q5582"));
        assert!(row.contains("\"painter,drawer\""));
        assert!(row.contains("\"Paris,Arles\""));
        assert!(row.contains("Paris:1886-1888;Arles:1888-1888"));
        assert!(row.contains("\"Anton Mauve,Jean-François Millet\""));
        assert!(row.contains("Van Gogh Museum"));
    }

    #[test]
    fn csv_handles_empty_records() {
        let csv = render_csv(&[]).unwrap();
        assert_eq!(csv.lines().count(), 1);
    }
}
