//! Core type definitions for Agency Directory

use crate::error::ListingError;
use serde::{Deserialize, Deserializer, Serialize};

/// Number of records on every listing page
pub const PAGE_SIZE: usize = 10;

/// Highest page number a caller may request
pub const MAX_PAGE: u32 = 100;

/// An agency as stored in the document store
///
/// `name` is the sole sort key. `combined_slug` is the denormalized tag set
/// (services and locations) that listing filters match against. Everything
/// else is display data passed through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgencyRecord {
    /// Stable store identifier
    pub id: String,
    /// Display name, used for ordering
    pub name: String,
    /// Precomputed lowercase match terms
    #[serde(default, deserialize_with = "null_as_default")]
    pub combined_slug: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tagline: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub additional_locations: Vec<String>,
    /// Founding year; stores hold this as either text or a number
    #[serde(
        default,
        deserialize_with = "text_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub founded: Option<String>,
    /// Headcount or headcount band such as "10-49"
    #[serde(
        default,
        deserialize_with = "text_or_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub team_size: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub services: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub budget_range: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub client_size: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub project_duration: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub industries: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expertise: Option<Expertise>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_review: Option<GoogleReview>,
}

impl AgencyRecord {
    /// Creates a record with only the fields the core interprets
    pub fn new<I, N>(id: I, name: N, combined_slug: Vec<String>) -> Self
    where
        I: Into<String>,
        N: Into<String>,
    {
        Self {
            id: id.into(),
            name: name.into(),
            combined_slug,
            tagline: None,
            description: None,
            location: None,
            additional_locations: Vec::new(),
            founded: None,
            team_size: None,
            services: Vec::new(),
            budget_range: Vec::new(),
            client_size: Vec::new(),
            project_duration: Vec::new(),
            industries: Vec::new(),
            expertise: None,
            google_review: None,
        }
    }
}

/// Expertise lists shown on the detail page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Expertise {
    #[serde(default, deserialize_with = "null_as_default")]
    pub seo: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub marketing: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub development: Vec<String>,
}

/// Aggregated Google review data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoogleReview {
    #[serde(default, deserialize_with = "null_as_default")]
    pub rating: f64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub count: u64,
}

/// Treats an explicit `null` like an absent field
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn text_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum TextOrNumber {
        Text(String),
        Integer(i64),
        Float(f64),
    }

    Ok(
        Option::<TextOrNumber>::deserialize(deserializer)?.map(|value| match value {
            TextOrNumber::Text(text) => text,
            TextOrNumber::Integer(n) => n.to_string(),
            TextOrNumber::Float(n) => n.to_string(),
        }),
    )
}

/// A validated 1-indexed page number within `1..=MAX_PAGE`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PageNumber(u32);

impl PageNumber {
    /// The first page
    pub const FIRST: PageNumber = PageNumber(1);

    /// Creates a page number, enforcing the page bounds
    pub fn new(page: u32) -> std::result::Result<Self, ListingError> {
        if page < 1 {
            return Err(ListingError::InvalidPage);
        }
        if page > MAX_PAGE {
            return Err(ListingError::PageTooHigh);
        }
        Ok(Self(page))
    }

    /// Parses the raw `page` query parameter
    ///
    /// Absent or blank input means the first page. Integers too large to
    /// represent count as too high rather than invalid.
    ///
    /// # Examples
    ///
    /// ```
    /// use agency_core::types::PageNumber;
    /// use agency_core::ListingError;
    ///
    /// assert_eq!(PageNumber::parse(Some("3")).unwrap().get(), 3);
    /// assert_eq!(PageNumber::parse(None).unwrap().get(), 1);
    /// assert_eq!(PageNumber::parse(Some("0")), Err(ListingError::InvalidPage));
    /// assert_eq!(PageNumber::parse(Some("101")), Err(ListingError::PageTooHigh));
    /// ```
    pub fn parse(raw: Option<&str>) -> std::result::Result<Self, ListingError> {
        let raw = raw.map(str::trim).unwrap_or_default();
        if raw.is_empty() {
            return Ok(Self::FIRST);
        }

        match raw.parse::<i64>() {
            Ok(n) if n < 1 => Err(ListingError::InvalidPage),
            Ok(n) if n > i64::from(MAX_PAGE) => Err(ListingError::PageTooHigh),
            Ok(n) => Ok(Self(n as u32)),
            Err(_) => {
                let digits = raw.strip_prefix('+').unwrap_or(raw);
                if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) {
                    Err(ListingError::PageTooHigh)
                } else {
                    Err(ListingError::InvalidPage)
                }
            }
        }
    }

    /// Returns the page as an integer
    pub fn get(self) -> u32 {
        self.0
    }

    /// Number of records that precede this page at `page_size` per page
    pub fn records_before(self, page_size: usize) -> usize {
        (self.0 as usize - 1) * page_size
    }
}

impl std::fmt::Display for PageNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One assembled listing page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResult {
    /// Records on this page, ascending by name
    pub records: Vec<AgencyRecord>,
    pub current_page: u32,
    pub total_pages: u64,
    pub total_records: u64,
}

impl PageResult {
    /// Assembles a page, deriving `total_pages` from the record total
    pub fn assemble(records: Vec<AgencyRecord>, page: PageNumber, total_records: u64) -> Self {
        Self {
            records,
            current_page: page.get(),
            total_pages: total_records.div_ceil(PAGE_SIZE as u64),
            total_records,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_page_number_parse_valid() {
        assert_eq!(PageNumber::parse(Some("1")).unwrap().get(), 1);
        assert_eq!(PageNumber::parse(Some(" 42 ")).unwrap().get(), 42);
        assert_eq!(PageNumber::parse(Some("+7")).unwrap().get(), 7);
        assert_eq!(PageNumber::parse(Some("100")).unwrap().get(), 100);
    }

    #[test]
    fn test_page_number_parse_defaults_to_first() {
        assert_eq!(PageNumber::parse(None).unwrap(), PageNumber::FIRST);
        assert_eq!(PageNumber::parse(Some("")).unwrap(), PageNumber::FIRST);
        assert_eq!(PageNumber::parse(Some("   ")).unwrap(), PageNumber::FIRST);
    }

    #[test]
    fn test_page_number_parse_invalid() {
        for raw in ["0", "-1", "-0", "abc", "2.5", "3abc", "1e3", "--3", "+", "-99999999999999999999"] {
            assert_eq!(
                PageNumber::parse(Some(raw)),
                Err(ListingError::InvalidPage),
                "input {:?}",
                raw
            );
        }
    }

    #[test]
    fn test_page_number_parse_too_high() {
        for raw in ["101", "1000", "99999999999999999999", "+99999999999999999999"] {
            assert_eq!(
                PageNumber::parse(Some(raw)),
                Err(ListingError::PageTooHigh),
                "input {:?}",
                raw
            );
        }
    }

    #[test]
    fn test_page_number_records_before() {
        assert_eq!(PageNumber::FIRST.records_before(PAGE_SIZE), 0);
        assert_eq!(PageNumber::new(3).unwrap().records_before(PAGE_SIZE), 20);
        assert_eq!(PageNumber::new(100).unwrap().records_before(PAGE_SIZE), 990);
        assert_eq!(PageNumber::new(3).unwrap().records_before(4), 8);
    }

    #[test]
    fn test_page_result_total_pages() {
        let page = PageNumber::FIRST;
        assert_eq!(PageResult::assemble(vec![], page, 0).total_pages, 0);
        assert_eq!(PageResult::assemble(vec![], page, 1).total_pages, 1);
        assert_eq!(PageResult::assemble(vec![], page, 10).total_pages, 1);
        assert_eq!(PageResult::assemble(vec![], page, 11).total_pages, 2);
        assert_eq!(PageResult::assemble(vec![], page, 25).total_pages, 3);
    }

    #[test]
    fn test_agency_record_deserialize_minimal() {
        let record: AgencyRecord = serde_json::from_value(json!({
            "id": "a1",
            "name": "Acme"
        }))
        .unwrap();
        assert_eq!(record, AgencyRecord::new("a1", "Acme", vec![]));
    }

    #[test]
    fn test_agency_record_deserialize_full() {
        let record: AgencyRecord = serde_json::from_value(json!({
            "id": "a1",
            "name": "Acme",
            "combinedSlug": ["seo", "boston"],
            "tagline": "We rank",
            "location": "Boston",
            "additionalLocations": ["New York"],
            "founded": 2011,
            "teamSize": "10-49",
            "services": ["SEO"],
            "expertise": { "seo": ["Local SEO"] },
            "googleReview": { "rating": 4.8, "count": 120 }
        }))
        .unwrap();

        assert_eq!(record.combined_slug, vec!["seo", "boston"]);
        assert_eq!(record.founded.as_deref(), Some("2011"));
        assert_eq!(record.team_size.as_deref(), Some("10-49"));
        let expertise = record.expertise.unwrap();
        assert_eq!(expertise.seo, vec!["Local SEO"]);
        assert!(expertise.marketing.is_empty());
        assert_eq!(record.google_review.unwrap().count, 120);
    }

    #[test]
    fn test_agency_record_null_lists_read_as_empty() {
        let record: AgencyRecord = serde_json::from_value(json!({
            "id": "a1",
            "name": "Acme",
            "combinedSlug": null,
            "services": null,
            "additionalLocations": null,
            "budgetRange": null,
            "tagline": null,
            "expertise": { "seo": null, "marketing": ["Email"] },
            "googleReview": { "rating": 4.2, "count": null }
        }))
        .unwrap();

        assert!(record.combined_slug.is_empty());
        assert!(record.services.is_empty());
        assert!(record.additional_locations.is_empty());
        assert!(record.budget_range.is_empty());
        assert_eq!(record.tagline, None);
        let expertise = record.expertise.unwrap();
        assert!(expertise.seo.is_empty());
        assert_eq!(expertise.marketing, vec!["Email"]);
        assert_eq!(record.google_review.unwrap().count, 0);
    }

    #[test]
    fn test_agency_record_requires_name() {
        let result = serde_json::from_value::<AgencyRecord>(json!({ "id": "a1" }));
        assert!(result.is_err());
    }

    #[test]
    fn test_agency_record_serializes_camel_case_and_skips_absent() {
        let mut record = AgencyRecord::new("a1", "Acme", vec!["seo".to_string()]);
        record.team_size = Some("5".to_string());
        let value = serde_json::to_value(&record).unwrap();

        assert_eq!(value["combinedSlug"], json!(["seo"]));
        assert_eq!(value["teamSize"], json!("5"));
        assert!(value.get("tagline").is_none());
        assert!(value.get("googleReview").is_none());
    }
}
