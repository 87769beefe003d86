//! Reshaping of SPARQL result rows into flat per-person records.
//!
//! Two folds exist side by side: a first-non-null-wins fold for single
//! targeted queries, and a most-common fold for lookups that may match
//! several entities sharing a label, where frequency across rows is the
//! best signal for which entity the caller meant.

use crate::domain::model::{Binding, PersonInfo, WorkLocation};
use regex::Regex;
use std::sync::OnceLock;

/// Wikidata's advertised sweet spot for VALUES batches; larger chunks tend
/// to hit the endpoint's timeout.
pub const DEFAULT_CHUNK_SIZE: usize = 150;

const SCALAR_VARS: [(&str, Field); 6] = [
    ("placeOfBirthLabel", Field::BirthPlace),
    ("dateOfBirth", Field::BirthDate),
    ("dateOfDeath", Field::DeathDate),
    ("placeOfDeathLabel", Field::DeathPlace),
    ("genderLabel", Field::Gender),
    ("citizenshipLabel", Field::Citizenship),
];

#[derive(Clone, Copy)]
enum Field {
    BirthPlace,
    BirthDate,
    DeathDate,
    DeathPlace,
    Gender,
    Citizenship,
}

fn slot<'a>(info: &'a mut PersonInfo, field: Field) -> &'a mut Option<String> {
    match field {
        Field::BirthPlace => &mut info.birth_place,
        Field::BirthDate => &mut info.birth_date,
        Field::DeathDate => &mut info.death_date,
        Field::DeathPlace => &mut info.death_place,
        Field::Gender => &mut info.gender,
        Field::Citizenship => &mut info.citizenship,
    }
}

/// Occurrence counts per distinct value of `var`, in first-seen order.
/// Rows where the variable is unbound count under `None`.
pub fn value_counts<'a>(bindings: &'a [Binding], var: &str) -> Vec<(Option<&'a str>, usize)> {
    let mut counts: Vec<(Option<&'a str>, usize)> = Vec::new();
    for binding in bindings {
        let value = binding.value(var);
        match counts.iter_mut().find(|(v, _)| *v == value) {
            Some((_, n)) => *n += 1,
            None => counts.push((value, 1)),
        }
    }
    counts
}

/// The most frequent value of `var` across all rows. Returns `None` when
/// there are no rows or when unbound rows outnumber every actual value
/// (ties go to whichever was seen first).
pub fn most_common<'a>(bindings: &'a [Binding], var: &str) -> Option<&'a str> {
    let counts = value_counts(bindings, var);
    let best = counts.iter().map(|(_, n)| *n).max()?;
    counts
        .into_iter()
        .find(|(_, n)| *n == best)
        .and_then(|(v, _)| v)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Baseline {
    /// Ratio against the most frequent value's count.
    Max,
    /// Ratio against the total number of rows.
    Total,
}

/// Acceptance cutoff for multi-valued attributes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Threshold {
    /// Keep values occurring at least this many times.
    Count(usize),
    /// Keep values whose count ratio against the baseline reaches `ratio`.
    Ratio { ratio: f64, baseline: Baseline },
    /// Keep values above a linear cutoff of the maximum count; accepts a
    /// 1-of-1 value while rejecting a 2-of-4 one at the default slope.
    Linear { rate: f64, shift: f64 },
}

impl Threshold {
    /// Default acceptance for occupation labels.
    pub fn linear_default() -> Self {
        Threshold::Linear {
            rate: 1.0 / 2.5,
            shift: 0.5,
        }
    }

    /// Gentler slope used for work locations, which repeat less often.
    pub fn linear_locations() -> Self {
        Threshold::Linear {
            rate: 1.0 / 4.0,
            shift: 0.49,
        }
    }
}

/// Linear cutoff `(high - low) * rate + low + shift`.
pub fn linear_threshold(high: f64, low: f64, rate: f64, shift: f64) -> f64 {
    (high - low) * rate + low + shift
}

/// Values of `var` whose occurrence count clears the threshold, in
/// first-seen order. Unbound rows never qualify.
pub fn above_threshold<'a>(bindings: &'a [Binding], var: &str, threshold: Threshold) -> Vec<&'a str> {
    let counts = value_counts(bindings, var);
    let max = counts.iter().map(|(_, n)| *n).max().unwrap_or(0) as f64;
    let total = bindings.len() as f64;

    let cutoff = match threshold {
        Threshold::Count(n) => n as f64,
        Threshold::Ratio { ratio, baseline } => {
            let high = match baseline {
                Baseline::Max => max,
                Baseline::Total => total,
            };
            ratio * high
        }
        Threshold::Linear { rate, shift } => linear_threshold(max, 0.0, rate, shift),
    };

    counts
        .into_iter()
        .filter_map(|(value, n)| value.filter(|_| n as f64 >= cutoff))
        .collect()
}

/// Last path segment of an entity URI, e.g. `.../entity/Q762` → `Q762`.
pub fn extract_qid(uri: &str) -> Option<&str> {
    uri.rsplit('/').next()
}

pub fn is_valid_qid(candidate: &str) -> bool {
    static QID: OnceLock<Regex> = OnceLock::new();
    QID.get_or_init(|| Regex::new(r"^Q\d+$").expect("QID pattern"))
        .is_match(candidate)
}

/// Most frequent well-formed Wikidata ID bound to `?person` across rows.
/// Malformed candidates (label-service artifacts, blank nodes) are dropped
/// before counting.
pub fn most_common_qid(bindings: &[Binding]) -> Option<String> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for binding in bindings {
        let Some(id) = binding.value("person").and_then(extract_qid) else {
            continue;
        };
        if !is_valid_qid(id) {
            continue;
        }
        match counts.iter_mut().find(|(v, _)| *v == id) {
            Some((_, n)) => *n += 1,
            None => counts.push((id, 1)),
        }
    }
    let best = counts.iter().map(|(_, n)| *n).max()?;
    counts
        .into_iter()
        .find(|(_, n)| *n == best)
        .map(|(id, _)| id.to_string())
}

fn work_location_from(binding: &Binding) -> Option<WorkLocation> {
    let location = binding.value("workLocationLabel")?;
    Some(WorkLocation {
        location: location.to_string(),
        start_time: binding.value("startTime").map(str::to_string),
        end_time: binding.value("endTime").map(str::to_string),
        point_in_time: binding.value("pointInTime").map(str::to_string),
    })
}

fn push_unique<T: PartialEq>(items: &mut Vec<T>, candidate: T) {
    if !items.contains(&candidate) {
        items.push(candidate);
    }
}

/// Fold rows into a record where each scalar takes the first non-null
/// value encountered and list attributes de-duplicate by membership.
pub fn person_info_first_wins(person_name: &str, bindings: &[Binding]) -> PersonInfo {
    let mut info = PersonInfo::named(person_name);

    for binding in bindings {
        for (var, field) in SCALAR_VARS {
            let target = slot(&mut info, field);
            if target.is_none() {
                *target = binding.value(var).map(str::to_string);
            }
        }

        if let Some(occupation) = binding.value("occupationLabel") {
            push_unique(&mut info.occupations, occupation.to_string());
        }
        if let Some(influence) = binding.value("influenceLabel") {
            push_unique(&mut info.influences, influence.to_string());
        }
        if let Some(collection) = binding.value("collectionLabel") {
            push_unique(&mut info.exhibitions, collection.to_string());
        }
        if let Some(location) = work_location_from(binding) {
            push_unique(&mut info.work_locations, location);
        }
    }

    info
}

/// Fold rows into a record where scalars take the most common value and
/// multi-valued attributes keep only values above the linear threshold.
pub fn person_info_most_common(person_name: Option<&str>, bindings: &[Binding]) -> PersonInfo {
    let mut info = PersonInfo::default();
    info.name = person_name
        .map(str::to_string)
        .or_else(|| most_common(bindings, "personLabel").map(str::to_string));

    for (var, field) in SCALAR_VARS {
        *slot(&mut info, field) = most_common(bindings, var).map(str::to_string);
    }

    info.occupations = above_threshold(bindings, "occupationLabel", Threshold::linear_default())
        .into_iter()
        .map(str::to_string)
        .collect();

    let acceptable_locations =
        above_threshold(bindings, "workLocationLabel", Threshold::linear_locations());
    for binding in bindings {
        let Some(location) = work_location_from(binding) else {
            continue;
        };
        if acceptable_locations.contains(&location.location.as_str()) {
            push_unique(&mut info.work_locations, location);
        }
    }

    for binding in bindings {
        if let Some(influence) = binding.value("influenceLabel") {
            push_unique(&mut info.influences, influence.to_string());
        }
        if let Some(collection) = binding.value("collectionLabel") {
            push_unique(&mut info.exhibitions, collection.to_string());
        }
    }

    info
}

/// The integer preceding the first hyphen of a date string, so both
/// `1853-03-30T00:00:00Z` and `-0500-01-01` yield a year.
pub fn find_year(date: &str) -> Option<i32> {
    static YEAR: OnceLock<Regex> = OnceLock::new();
    YEAR.get_or_init(|| Regex::new(r"(\d+)-").expect("year pattern"))
        .captures(date)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Years present in a work-location entry's time qualifiers.
pub fn years_of(location: &WorkLocation) -> Vec<i32> {
    [
        location.start_time.as_deref(),
        location.end_time.as_deref(),
        location.point_in_time.as_deref(),
    ]
    .into_iter()
    .flatten()
    .filter_map(find_year)
    .collect()
}

/// Distinct work-location names in first-seen order.
pub fn places(info: &PersonInfo) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for location in &info.work_locations {
        push_unique(&mut out, location.location.clone());
    }
    out
}

/// `place:min-max` span strings, one entry per place. A place appearing
/// with several dated statements gets its extra spans appended with
/// `span_separator` instead of a duplicate entry; undated statements are
/// skipped.
pub fn places_with_years(info: &PersonInfo, span_separator: &str) -> Vec<String> {
    let mut entries: Vec<(String, String)> = Vec::new();

    for location in &info.work_locations {
        let years = years_of(location);
        let (Some(min), Some(max)) = (years.iter().min(), years.iter().max()) else {
            continue;
        };
        let span = format!("{}-{}", min, max);
        match entries.iter_mut().find(|(place, _)| *place == location.location) {
            Some((_, spans)) => {
                spans.push_str(span_separator);
                spans.push_str(&span);
            }
            None => entries.push((location.location.clone(), span)),
        }
    }

    entries
        .into_iter()
        .map(|(place, spans)| format!("{}:{}", place, spans))
        .collect()
}
