//! SPARQL query construction for the Wikidata endpoint.
//!
//! Variable names (`placeOfBirthLabel`, `dateOfBirth`, ...) are part of the
//! contract with the mapper, which keys result rows on them.

use std::fmt::Write as _;

pub const WIKIDATA_ENDPOINT: &str = "https://query.wikidata.org/sparql";

/// Label language preference passed to the wikibase label service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Language {
    /// English labels only; name literals are tagged `@en`.
    #[default]
    English,
    /// Requester's language with an English fallback.
    AutoEnglish,
    /// Any language; name literals are untagged, so aliases are not matched.
    Any,
}

impl Language {
    pub fn service_param(self) -> &'static str {
        match self {
            Language::English => "en",
            Language::AutoEnglish => "[AUTO_LANGUAGE],en",
            Language::Any => "[AUTO_LANGUAGE],*",
        }
    }

    fn name_literal(self, name: &str) -> String {
        match self {
            Language::Any => format!("\"{}\".", escape_literal(name)),
            _ => format!("\"{}\"@en.", escape_literal(name)),
        }
    }
}

/// Escape embedded quotes and backslashes so a name can sit inside a
/// SPARQL string literal.
pub fn escape_literal(name: &str) -> String {
    name.replace('\\', "\\\\").replace('"', "\\\"")
}

fn label_service(language: Language) -> String {
    format!(
        "SERVICE wikibase:label {{ bd:serviceParam wikibase:language \"{}\". }}\n",
        language.service_param()
    )
}

const WORK_LOCATION_CLAUSE: &str = "OPTIONAL {\n  ?person p:P937 ?workStmt.\n  ?workStmt ps:P937 ?workLocation.\n  OPTIONAL { ?workStmt pq:P580 ?startTime. }\n  OPTIONAL { ?workStmt pq:P582 ?endTime. }\n  OPTIONAL { ?workStmt pq:P585 ?pointInTime. }\n}\n";

/// Attribute selection for a per-person profile query.
#[derive(Debug, Clone)]
pub struct PersonQuery {
    pub birth_place: bool,
    pub birth_date: bool,
    pub death_date: bool,
    pub death_place: bool,
    pub gender: bool,
    pub citizenship: bool,
    pub occupation: bool,
    pub work_location: bool,
    /// Restrict matches to instances of human (`wdt:P31 wd:Q5`), filtering
    /// out statues, paintings and other things named after the person.
    pub strict_human: bool,
    pub language: Language,
}

impl Default for PersonQuery {
    fn default() -> Self {
        Self {
            birth_place: true,
            birth_date: true,
            death_date: true,
            death_place: true,
            gender: true,
            citizenship: true,
            occupation: true,
            work_location: true,
            strict_human: false,
            language: Language::English,
        }
    }
}

impl PersonQuery {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn strict() -> Self {
        Self {
            strict_human: true,
            language: Language::AutoEnglish,
            ..Self::default()
        }
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    /// Build the profile query for one person name.
    pub fn build(&self, person_name: &str) -> String {
        let mut select = String::from("SELECT ?person ?personLabel");
        let mut clauses = String::new();

        if self.birth_place {
            select.push_str(" ?placeOfBirthLabel");
            clauses.push_str("OPTIONAL { ?person wdt:P19 ?placeOfBirth. }\n");
        }
        if self.birth_date {
            select.push_str(" ?dateOfBirth");
            clauses.push_str("OPTIONAL { ?person wdt:P569 ?dateOfBirth. }\n");
        }
        if self.death_date {
            select.push_str(" ?dateOfDeath");
            clauses.push_str("OPTIONAL { ?person wdt:P570 ?dateOfDeath. }\n");
        }
        if self.death_place {
            select.push_str(" ?placeOfDeathLabel");
            clauses.push_str("OPTIONAL { ?person wdt:P20 ?placeOfDeath. }\n");
        }
        if self.gender {
            select.push_str(" ?genderLabel");
            clauses.push_str("OPTIONAL { ?person wdt:P21 ?gender. }\n");
        }
        if self.citizenship {
            select.push_str(" ?citizenshipLabel");
            clauses.push_str("OPTIONAL { ?person wdt:P27 ?citizenship. }\n");
        }
        if self.occupation {
            select.push_str(" ?occupationLabel");
            clauses.push_str("OPTIONAL { ?person wdt:P106 ?occupation. }\n");
        }
        if self.work_location {
            select.push_str(" ?workLocationLabel ?startTime ?endTime ?pointInTime");
            clauses.push_str(WORK_LOCATION_CLAUSE);
        }

        let mut query = select;
        query.push_str(" WHERE {\n");
        let _ = writeln!(query, "?person ?label {}", self.language.name_literal(person_name));
        if self.strict_human {
            query.push_str("?person wdt:P31 wd:Q5.\n");
        }
        query.push_str(&clauses);
        query.push_str(&label_service(self.language));
        query.push('}');
        query
    }
}

/// ID-only lookup for one name (`?person` + `?personLabel`, humans only).
pub fn id_lookup_query(person_name: &str, language: Language) -> String {
    format!(
        "SELECT ?person ?personLabel WHERE {{\n?person ?label {}\n?person wdt:P31 wd:Q5.\n{}}}",
        language.name_literal(person_name),
        label_service(language)
    )
}

/// Birth/death places plus work-location history for one name.
pub fn person_locations_query(person_name: &str) -> String {
    format!(
        "SELECT ?person ?personLabel ?placeOfBirthLabel ?placeOfDeathLabel ?workLocationLabel ?startTime ?endTime ?pointInTime WHERE {{\n?person ?label {}\n?person wdt:P19 ?placeOfBirth.\n?person wdt:P20 ?placeOfDeath.\n{}{}}}",
        Language::English.name_literal(person_name),
        WORK_LOCATION_CLAUSE,
        label_service(Language::English)
    )
}

fn values_labels(names: &[String]) -> String {
    names
        .iter()
        .map(|n| format!("\"{}\"", escape_literal(n)))
        .collect::<Vec<_>>()
        .join(" ")
}

fn values_ids(ids: &[String]) -> String {
    ids.iter()
        .map(|id| format!("wd:{}", id))
        .collect::<Vec<_>>()
        .join(" ")
}

const BATCH_SELECT: &str = "SELECT ?person ?personLabel ?placeOfBirthLabel ?dateOfBirth ?dateOfDeath ?placeOfDeathLabel ?workLocationLabel ?startTime ?endTime ?pointInTime ?genderLabel ?citizenshipLabel ?occupationLabel WHERE {\n";

// Core biography triples are required in the batch form; a person without
// them would only add noise rows that the backfill pass handles better.
const BATCH_BODY: &str = "?person wdt:P31 wd:Q5.\n?person wdt:P19 ?placeOfBirth.\n?person wdt:P569 ?dateOfBirth.\n?person wdt:P570 ?dateOfDeath.\n?person wdt:P20 ?placeOfDeath.\nOPTIONAL { ?person wdt:P21 ?gender. }\nOPTIONAL { ?person wdt:P27 ?citizenship. }\nOPTIONAL { ?person wdt:P106 ?occupation. }\n";

/// Full-profile batch query for up to one chunk of names.
pub fn people_by_labels_query(names: &[String]) -> String {
    format!(
        "{}VALUES ?personLabel {{ {} }}\n?person ?label ?personLabel.\n{}{}{}}}",
        BATCH_SELECT,
        values_labels(names),
        BATCH_BODY,
        WORK_LOCATION_CLAUSE,
        label_service(Language::English)
    )
}

/// Full-profile batch query for up to one chunk of Wikidata IDs.
pub fn people_by_ids_query(ids: &[String]) -> String {
    format!(
        "{}VALUES ?person {{ {} }}\n{}{}{}}}",
        BATCH_SELECT,
        values_ids(ids),
        BATCH_BODY,
        WORK_LOCATION_CLAUSE,
        label_service(Language::English)
    )
}

/// ID-only batch lookup for up to one chunk of names, any label language.
pub fn people_ids_query(names: &[String]) -> String {
    format!(
        "SELECT ?person ?personLabel WHERE {{\nVALUES ?personLabel {{ {} }}\n?person ?label ?personLabel.\n?person wdt:P31 wd:Q5.\n{}}}",
        values_labels(names),
        label_service(Language::Any)
    )
}

/// Profile query keyed on a Wikidata ID, including influences and,
/// optionally, exhibition venues. Exhibitions can push prolific artists
/// past the endpoint's one-minute timeout, so they default to off.
pub fn profile_by_id_query(person_id: &str, include_exhibitions: bool) -> String {
    let exhibitions_clause = if include_exhibitions {
        "OPTIONAL { ?person wdt:P6379 ?collection. }\n"
    } else {
        ""
    };
    format!(
        "SELECT ?person ?personLabel ?placeOfBirthLabel ?dateOfBirth ?dateOfDeath ?placeOfDeathLabel ?genderLabel ?citizenshipLabel ?occupationLabel ?workLocationLabel ?startTime ?endTime ?pointInTime ?collectionLabel ?influenceLabel WHERE {{\nBIND(wd:{id} AS ?person)\nOPTIONAL {{ ?person wdt:P19 ?placeOfBirth. }}\nOPTIONAL {{ ?person wdt:P569 ?dateOfBirth. }}\nOPTIONAL {{ ?person wdt:P570 ?dateOfDeath. }}\nOPTIONAL {{ ?person wdt:P20 ?placeOfDeath. }}\nOPTIONAL {{ ?person wdt:P21 ?gender. }}\nOPTIONAL {{ ?person wdt:P27 ?citizenship. }}\nOPTIONAL {{ ?person wdt:P106 ?occupation. }}\n{work}{exhibitions}OPTIONAL {{ ?person wdt:P737 ?influence. }}\nSERVICE wikibase:label {{ bd:serviceParam wikibase:language \"[AUTO_LANGUAGE],en\". ?person rdfs:label ?personLabel. ?placeOfBirth rdfs:label ?placeOfBirthLabel. ?placeOfDeath rdfs:label ?placeOfDeathLabel. ?gender rdfs:label ?genderLabel. ?citizenship rdfs:label ?citizenshipLabel. ?occupation rdfs:label ?occupationLabel. ?workLocation rdfs:label ?workLocationLabel. ?collection rdfs:label ?collectionLabel. ?influence rdfs:label ?influenceLabel. }}\n}}",
        id = person_id,
        work = WORK_LOCATION_CLAUSE,
        exhibitions = exhibitions_clause,
    )
}

/// Exhibition venues only, keyed on a Wikidata ID.
pub fn exhibitions_query(person_id: &str) -> String {
    format!(
        "SELECT ?person ?personLabel ?collectionLabel WHERE {{\nBIND(wd:{id} AS ?person)\nOPTIONAL {{ ?person wdt:P6379 ?collection. }}\nSERVICE wikibase:label {{ bd:serviceParam wikibase:language \"[AUTO_LANGUAGE],en\". ?person rdfs:label ?personLabel. ?collection rdfs:label ?collectionLabel. }}\n}}",
        id = person_id,
    )
}

/// Assemble a `SELECT ... WHERE { ... }` query from parts.
///
/// `where_clauses` pairs a variable name with the rest of its triple
/// pattern, e.g. `("painter", "wdt:P31 wd:Q5;")`. `values` injects a
/// `VALUES ?<var>Label { ... }` block binding many labels at once.
pub fn select_query(
    variables: &[&str],
    where_clauses: &[(&str, &str)],
    values: Option<(&str, &[String])>,
    language: Language,
) -> String {
    let select = variables
        .iter()
        .map(|name| format!("?{}", name))
        .collect::<Vec<_>>()
        .join(" ");

    let mut body = String::new();
    if let Some((var, labels)) = values {
        let _ = writeln!(body, "VALUES ?{}Label {{ {} }}", var, values_labels(labels));
        let _ = writeln!(body, "?{var} ?label ?{var}Label.", var = var);
    }
    for (variable, pattern) in where_clauses {
        let _ = writeln!(body, "?{} {}", variable, pattern);
    }

    format!(
        "SELECT {} WHERE {{\n{}{}}}",
        select,
        body,
        label_service(language)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_full_person_query() {
        let query = PersonQuery::all().build("Vincent van Gogh");
        assert!(query.starts_with("SELECT ?person ?personLabel"));
        assert!(query.contains("?person ?label \"Vincent van Gogh\"@en."));
        assert!(query.contains("?placeOfBirthLabel"));
        assert!(query.contains("OPTIONAL { ?person wdt:P569 ?dateOfBirth. }"));
        assert!(query.contains("p:P937"));
        assert!(query.contains("wikibase:language \"en\""));
        assert!(!query.contains("wdt:P31"));
    }

    #[test]
    fn strict_query_filters_humans() {
        let query = PersonQuery::strict().build("Rembrandt");
        assert!(query.contains("?person wdt:P31 wd:Q5."));
        assert!(query.contains("wikibase:language \"[AUTO_LANGUAGE],en\""));
    }

    #[test]
    fn disabled_attributes_drop_both_select_and_clause() {
        let query = PersonQuery {
            work_location: false,
            occupation: false,
            ..PersonQuery::all()
        }
        .build("Claude Monet");
        assert!(!query.contains("?workLocationLabel"));
        assert!(!query.contains("p:P937"));
        assert!(!query.contains("?occupationLabel"));
    }

    #[test]
    fn escapes_quotes_in_names() {
        let query = PersonQuery::all().build("John \"the Painter\" Doe");
        assert!(query.contains("\"John \\\"the Painter\\\" Doe\"@en."));
    }

    #[test]
    fn any_language_lookup_drops_the_tag() {
        let query = id_lookup_query("Jan Vermeer", Language::Any);
        assert!(query.contains("?person ?label \"Jan Vermeer\"."));
        assert!(!query.contains("\"Jan Vermeer\"@en"));
        assert!(query.contains("[AUTO_LANGUAGE],*"));
    }

    #[test]
    fn batch_query_binds_all_labels() {
        let names = vec!["Vincent van Gogh".to_string(), "Pablo Picasso".to_string()];
        let query = people_by_labels_query(&names);
        assert!(query.contains("VALUES ?personLabel { \"Vincent van Gogh\" \"Pablo Picasso\" }"));
        assert!(query.contains("?person wdt:P31 wd:Q5."));
    }

    #[test]
    fn batch_by_ids_binds_entities() {
        let ids = vec!["Q5582".to_string(), "Q5593".to_string()];
        let query = people_by_ids_query(&ids);
        assert!(query.contains("VALUES ?person { wd:Q5582 wd:Q5593 }"));
        assert!(query.contains("?person wdt:P31 wd:Q5."));
        // every selected variable comes from the batch body or the label
        // service; nothing else should be bound
        assert!(!query.contains("rdfs:label ?name"));
    }

    #[test]
    fn profile_by_id_controls_exhibitions() {
        assert!(!profile_by_id_query("Q5582", false).contains("wdt:P6379"));
        assert!(profile_by_id_query("Q5582", true).contains("wdt:P6379"));
        assert!(profile_by_id_query("Q5582", false).contains("BIND(wd:Q5582 AS ?person)"));
    }

    #[test]
    fn select_query_assembles_values_and_clauses() {
        let labels = vec!["Vincent van Gogh".to_string()];
        let query = select_query(
            &["person", "personLabel", "occupationLabel"],
            &[("person", "wdt:P31 wd:Q5;"), ("person", "wdt:P106 ?occupation.")],
            Some(("person", &labels)),
            Language::AutoEnglish,
        );
        assert!(query.starts_with("SELECT ?person ?personLabel ?occupationLabel WHERE {"));
        assert!(query.contains("VALUES ?personLabel { \"Vincent van Gogh\" }"));
        assert!(query.contains("?person ?label ?personLabel."));
        assert!(query.contains("?person wdt:P106 ?occupation."));
    }
}
