//! High-level Wikidata operations: per-person profile lookups, chunked
//! batch queries over many names or IDs, and the backfill flows that chase
//! down entries the fast batch pass missed.

use crate::core::client::SparqlClient;
use crate::core::mapper::{
    extract_qid, is_valid_qid, most_common_qid, person_info_first_wins, person_info_most_common,
    DEFAULT_CHUNK_SIZE,
};
use crate::core::query::{self, Language, PersonQuery};
use crate::domain::model::{Binding, IdHarvest, PersonInfo};
use crate::utils::error::Result;
use std::collections::HashSet;
use tracing::{debug, warn};

pub struct WikidataClient {
    sparql: SparqlClient,
    chunk_size: usize,
}

impl WikidataClient {
    /// Client against Wikidata's public endpoint.
    pub fn new() -> Result<Self> {
        Ok(Self::with_client(SparqlClient::wikidata()?))
    }

    pub fn with_client(sparql: SparqlClient) -> Self {
        Self {
            sparql,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn sparql(&self) -> &SparqlClient {
        &self.sparql
    }

    /// Profile for one name with the given attribute selection,
    /// first-non-null-wins folding. `Ok(None)` when nothing matched.
    pub async fn person_info(
        &self,
        person_name: &str,
        query: &PersonQuery,
    ) -> Result<Option<PersonInfo>> {
        let bindings = self.sparql.query(&query.build(person_name)).await?;
        if bindings.is_empty() {
            return Ok(None);
        }
        Ok(Some(person_info_first_wins(person_name, &bindings)))
    }

    /// Profile for one name restricted to human instances, with the
    /// person's ID resolved. Rows are folded by most common value since a
    /// label can match several entities. `Ok(None)` when nothing matched
    /// or no row carried a well-formed ID.
    pub async fn person_info_strict(&self, person_name: &str) -> Result<Option<PersonInfo>> {
        let bindings = self
            .sparql
            .query(&PersonQuery::strict().build(person_name))
            .await?;
        if bindings.is_empty() {
            return Ok(None);
        }
        let Some(id) = most_common_qid(&bindings) else {
            debug!(person = person_name, "no valid Wikidata ID among results");
            return Ok(None);
        };
        let mut info = person_info_most_common(Some(person_name), &bindings);
        info.id = Some(id);
        Ok(Some(info))
    }

    /// Like [`person_info_strict`](Self::person_info_strict) but keeps the
    /// record even when no valid ID was found (the `id` field stays
    /// `None`).
    pub async fn person_info_and_id(&self, person_name: &str) -> Result<Option<PersonInfo>> {
        let query = PersonQuery {
            strict_human: true,
            ..PersonQuery::all()
        };
        let bindings = self.sparql.query(&query.build(person_name)).await?;
        if bindings.is_empty() {
            return Ok(None);
        }
        let mut info = person_info_most_common(Some(person_name), &bindings);
        info.id = most_common_qid(&bindings);
        if info.id.is_none() {
            debug!(person = person_name, "results carried no well-formed ID");
        }
        Ok(Some(info))
    }

    /// Profile keyed on a Wikidata ID, including influences. Exhibition
    /// venues are left out; fetch them separately with
    /// [`exhibitions_by_id`](Self::exhibitions_by_id) to stay under the
    /// endpoint's query deadline for prolific artists.
    pub async fn person_info_by_id(&self, person_id: &str) -> Result<Option<PersonInfo>> {
        self.profile_by_id(person_id, false).await
    }

    /// Profile keyed on a Wikidata ID with exhibition venues included in
    /// the same query. May time out for people with large catalogues.
    pub async fn person_info_with_exhibitions_by_id(
        &self,
        person_id: &str,
    ) -> Result<Option<PersonInfo>> {
        self.profile_by_id(person_id, true).await
    }

    async fn profile_by_id(
        &self,
        person_id: &str,
        include_exhibitions: bool,
    ) -> Result<Option<PersonInfo>> {
        let bindings = self
            .sparql
            .query(&query::profile_by_id_query(person_id, include_exhibitions))
            .await?;
        if bindings.is_empty() {
            return Ok(None);
        }
        let mut info = person_info_most_common(None, &bindings);
        info.id = Some(person_id.to_string());
        Ok(Some(info))
    }

    /// Exhibition venue labels for a Wikidata ID.
    pub async fn exhibitions_by_id(&self, person_id: &str) -> Result<Vec<String>> {
        let bindings = self.sparql.query(&query::exhibitions_query(person_id)).await?;
        let mut venues: Vec<String> = Vec::new();
        for binding in &bindings {
            if let Some(venue) = binding.value("collectionLabel") {
                if !venues.iter().any(|v| v == venue) {
                    venues.push(venue.to_string());
                }
            }
        }
        Ok(venues)
    }

    /// Birth/death places and work-location history only.
    pub async fn person_locations(&self, person_name: &str) -> Result<Option<PersonInfo>> {
        let bindings = self
            .sparql
            .query(&query::person_locations_query(person_name))
            .await?;
        if bindings.is_empty() {
            return Ok(None);
        }
        Ok(Some(person_info_first_wins(person_name, &bindings)))
    }

    /// Resolve a name to its Wikidata ID. The first row bound to a real
    /// entity wins; the label service emits rows for gibberish matches
    /// too, so rows without a valid `Q...` ID or a label are skipped.
    pub async fn person_id(&self, person_name: &str, language: Language) -> Result<Option<String>> {
        let bindings = self
            .sparql
            .query(&query::id_lookup_query(person_name, language))
            .await?;
        Ok(first_resolved(&bindings).map(|(id, _)| id.to_string()))
    }

    /// Resolve a name (possibly an alias) to the label Wikidata uses.
    pub async fn person_label(
        &self,
        person_name: &str,
        language: Language,
    ) -> Result<Option<String>> {
        let bindings = self
            .sparql
            .query(&query::id_lookup_query(person_name, language))
            .await?;
        Ok(first_resolved(&bindings).map(|(_, label)| label.to_string()))
    }

    /// Full profiles for many names, one batch query per chunk of at most
    /// `chunk_size` names. Names the batch resolves nothing for are simply
    /// absent from the result; chunks that fail are logged and skipped.
    pub async fn people_info(&self, names: &[String]) -> Result<Vec<PersonInfo>> {
        let mut all = Vec::new();
        for chunk in names.chunks(self.chunk_size) {
            let bindings = match self.sparql.query(&query::people_by_labels_query(chunk)).await {
                Ok(bindings) => bindings,
                Err(e) => {
                    warn!(error = %e, chunk_len = chunk.len(), "batch profile query failed, skipping chunk");
                    continue;
                }
            };
            for name in chunk {
                let rows = rows_for_label(&bindings, name);
                if rows.is_empty() {
                    continue;
                }
                let mut info = person_info_most_common(Some(name), &rows);
                info.id = most_common_qid(&rows);
                all.push(info);
            }
        }
        Ok(all)
    }

    /// Raw per-chunk result rows, for callers that want to fold the
    /// responses themselves.
    pub async fn people_responses(&self, names: &[String]) -> Result<Vec<Vec<Binding>>> {
        let mut responses = Vec::new();
        for chunk in names.chunks(self.chunk_size) {
            responses.push(self.sparql.query(&query::people_by_labels_query(chunk)).await?);
        }
        Ok(responses)
    }

    /// Fast batch pass over all names, then a per-person strict query for
    /// every name the batch missed. The batch is quick but skips people
    /// lacking complete birth/death data; the slow path recovers them.
    pub async fn people_info_backfill(&self, names: &[String]) -> Result<Vec<PersonInfo>> {
        let mut collected = self.people_info(names).await?;
        let have: HashSet<&str> = collected
            .iter()
            .filter_map(|info| info.name.as_deref())
            .collect();
        let missing: Vec<&String> = names.iter().filter(|n| !have.contains(n.as_str())).collect();
        if !missing.is_empty() {
            debug!(missing = missing.len(), "backfilling names the batch pass missed");
        }

        for name in missing {
            match self.person_info_strict(name).await {
                Ok(Some(info)) => collected.push(info),
                Ok(None) => debug!(person = %name, "no data found during backfill"),
                Err(e) => warn!(person = %name, error = %e, "backfill query failed, skipping"),
            }
        }
        Ok(collected)
    }

    /// Wikidata IDs for many names, one lookup query per chunk. Returns
    /// every view of the result at once: winning ID, all candidates, and
    /// row counts per name (zero for unresolved names).
    pub async fn people_ids(&self, names: &[String]) -> Result<IdHarvest> {
        let mut harvest = IdHarvest::default();
        for chunk in names.chunks(self.chunk_size) {
            let bindings = match self.sparql.query(&query::people_ids_query(chunk)).await {
                Ok(bindings) => bindings,
                Err(e) => {
                    warn!(error = %e, chunk_len = chunk.len(), "batch ID query failed, skipping chunk");
                    continue;
                }
            };
            for name in chunk {
                let rows = rows_for_label(&bindings, name);
                harvest.counts.insert(name.clone(), rows.len());
                let candidates: Vec<String> = rows
                    .iter()
                    .filter_map(|row| row.value("person").and_then(extract_qid))
                    .filter(|id| is_valid_qid(id))
                    .map(str::to_string)
                    .collect();
                if candidates.is_empty() {
                    continue;
                }
                if let Some(winner) = most_common_qid(&rows) {
                    harvest.ids.insert(name.clone(), winner);
                }
                harvest.all_ids.insert(name.clone(), candidates);
            }
        }
        Ok(harvest)
    }

    /// Batch ID lookup, then per-name fallback queries for unresolved
    /// names: first the English lookup, then the any-language one (which
    /// requires an exact label match but covers people without an English
    /// sitelink).
    pub async fn people_ids_backfill(&self, names: &[String]) -> Result<IdHarvest> {
        let mut harvest = self.people_ids(names).await?;
        let missing: Vec<&String> = names
            .iter()
            .filter(|n| !harvest.ids.contains_key(n.as_str()))
            .collect();

        for name in missing {
            let resolved = match self.person_id(name, Language::AutoEnglish).await {
                Ok(Some(id)) => Some(id),
                Ok(None) => match self.person_id(name, Language::Any).await {
                    Ok(found) => found,
                    Err(e) => {
                        warn!(person = %name, error = %e, "any-language ID lookup failed");
                        None
                    }
                },
                Err(e) => {
                    warn!(person = %name, error = %e, "ID lookup failed");
                    None
                }
            };
            if let Some(id) = resolved {
                harvest.all_ids.entry(name.clone()).or_insert_with(|| vec![id.clone()]);
                harvest.ids.insert(name.clone(), id);
            }
        }
        Ok(harvest)
    }

    /// Full profiles for many Wikidata IDs, one batch query per chunk.
    pub async fn people_info_by_ids(&self, ids: &[String]) -> Result<Vec<PersonInfo>> {
        let mut all = Vec::new();
        for chunk in ids.chunks(self.chunk_size) {
            let bindings = match self.sparql.query(&query::people_by_ids_query(chunk)).await {
                Ok(bindings) => bindings,
                Err(e) => {
                    warn!(error = %e, chunk_len = chunk.len(), "batch by-ID query failed, skipping chunk");
                    continue;
                }
            };
            for id in chunk {
                let rows = rows_for_id(&bindings, id);
                if rows.is_empty() {
                    continue;
                }
                let mut info = person_info_most_common(None, &rows);
                info.id = Some(id.clone());
                all.push(info);
            }
        }
        Ok(all)
    }

    /// Batch by-ID pass, then single-ID profile queries for IDs the batch
    /// missed (no language fallback applies here).
    pub async fn people_info_by_ids_backfill(&self, ids: &[String]) -> Result<Vec<PersonInfo>> {
        let mut collected = self.people_info_by_ids(ids).await?;
        let have: HashSet<&str> = collected
            .iter()
            .filter_map(|info| info.id.as_deref())
            .collect();
        let missing: Vec<&String> = ids.iter().filter(|id| !have.contains(id.as_str())).collect();

        for id in missing {
            match self.person_info_by_id(id).await {
                Ok(Some(info)) => collected.push(info),
                Ok(None) => debug!(id = %id, "no data found during by-ID backfill"),
                Err(e) => warn!(id = %id, error = %e, "by-ID backfill query failed, skipping"),
            }
        }
        Ok(collected)
    }
}

/// Rows whose `personLabel` equals the queried name.
fn rows_for_label(bindings: &[Binding], name: &str) -> Vec<Binding> {
    bindings
        .iter()
        .filter(|b| b.value("personLabel") == Some(name))
        .cloned()
        .collect()
}

/// Rows whose `person` entity resolves to the queried ID.
fn rows_for_id(bindings: &[Binding], id: &str) -> Vec<Binding> {
    bindings
        .iter()
        .filter(|b| b.value("person").and_then(extract_qid) == Some(id))
        .cloned()
        .collect()
}

/// First row bound to a real entity with a label; the label service also
/// emits rows for spurious matches, which are filtered here.
fn first_resolved(bindings: &[Binding]) -> Option<(&str, &str)> {
    bindings.iter().find_map(|binding| {
        let id = binding.value("person").and_then(extract_qid)?;
        if !is_valid_qid(id) {
            return None;
        }
        let label = binding.value("personLabel")?;
        Some((id, label))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::SparqlValue;

    fn row(label: &str, qid: &str) -> Binding {
        let mut b = Binding::default();
        b.set("personLabel", SparqlValue::literal(label));
        b.set(
            "person",
            SparqlValue::uri(format!("http://www.wikidata.org/entity/{}", qid)),
        );
        b
    }

    #[test]
    fn rows_group_by_label_and_by_id() {
        let bindings = vec![
            row("Vincent van Gogh", "Q5582"),
            row("Pablo Picasso", "Q5593"),
            row("Vincent van Gogh", "Q5582"),
        ];
        assert_eq!(rows_for_label(&bindings, "Vincent van Gogh").len(), 2);
        assert_eq!(rows_for_label(&bindings, "Claude Monet").len(), 0);
        assert_eq!(rows_for_id(&bindings, "Q5593").len(), 1);
    }

    #[test]
    fn first_resolved_skips_rows_without_valid_entity() {
        let mut junk = Binding::default();
        junk.set("person", SparqlValue::uri("http://www.wikidata.org/entity/statement-xyz"));
        junk.set("personLabel", SparqlValue::literal("noise"));

        let mut unlabeled = row("", "Q42");
        unlabeled.vars.remove("personLabel");

        let bindings = vec![junk, unlabeled, row("Douglas Adams", "Q42")];
        assert_eq!(first_resolved(&bindings), Some(("Q42", "Douglas Adams")));
        assert_eq!(first_resolved(&[]), None);
    }

    #[test]
    fn chunking_preserves_order_and_totals() {
        let names: Vec<String> = (0..312).map(|i| format!("person-{i}")).collect();
        let chunks: Vec<&[String]> = names.chunks(DEFAULT_CHUNK_SIZE).collect();
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), 150);
        assert_eq!(chunks[1].len(), 150);
        assert_eq!(chunks[2].len(), 12);
        let total: usize = chunks.iter().map(|c| c.len()).sum();
        assert_eq!(total, names.len());
        assert_eq!(chunks[0][0], "person-0");
        assert_eq!(chunks[2][11], "person-311");
    }
}
