use crate::attributes::{parse_attribute_spec, parse_first_rule};
use crate::error::{DataError, Result};
use serde::ser::SerializeStruct;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A plain record produced by unmarshalling one store row
pub type RawRecord = serde_json::Map<String, serde_json::Value>;

/// An identifier to look up in the store.
///
/// Only `value` is interpreted; any other fields supplied by the host are
/// carried through untouched and echoed back in the [`LookupResult`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub value: String,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Entity {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            extra: serde_json::Map::new(),
        }
    }
}

/// How the `date-millis` attribute parser reads epoch values
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MillisPolicy {
    /// Read the value as seconds, like `date-seconds` (historical behaviour)
    #[default]
    Seconds,
    /// Divide the value by 1000 before conversion
    Millis,
}

/// The part of [`LookupOptions`] that determines the store client
#[derive(Clone, Eq, PartialEq)]
pub struct ConnectionSettings {
    pub region: String,
    pub endpoint: Option<String>,
    pub access_key_id: String,
    pub secret_access_key: String,
}

impl fmt::Debug for ConnectionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionSettings")
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .finish()
    }
}

/// Options for a batch lookup
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LookupOptions {
    /// Either `"us-east-1"` or a select option `{"value": "us-east-1", ...}`
    #[serde(deserialize_with = "deserialize_region")]
    pub region: String,
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub access_key_id: String,
    #[serde(default)]
    pub secret_access_key: String,
    /// PartiQL statement with one positional `?` parameter
    pub query: String,
    /// Parameter template containing the `{{entity}}` token
    pub query_parameter: String,
    #[serde(default)]
    pub limit: Option<i32>,
    #[serde(default)]
    pub summary_attributes: String,
    #[serde(default)]
    pub detail_attributes: String,
    #[serde(default)]
    pub document_title_attribute: String,
    #[serde(default)]
    pub millis_parser: MillisPolicy,
}

impl LookupOptions {
    pub fn new(
        region: impl Into<String>,
        query: impl Into<String>,
        query_parameter: impl Into<String>,
    ) -> Self {
        Self {
            region: region.into(),
            endpoint: None,
            access_key_id: String::new(),
            secret_access_key: String::new(),
            query: query.into(),
            query_parameter: query_parameter.into(),
            limit: None,
            summary_attributes: String::new(),
            detail_attributes: String::new(),
            document_title_attribute: String::new(),
            millis_parser: MillisPolicy::default(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_credentials(
        mut self,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
    ) -> Self {
        self.access_key_id = access_key_id.into();
        self.secret_access_key = secret_access_key.into();
        self
    }

    pub fn with_limit(mut self, limit: i32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_summary_attributes(mut self, spec: impl Into<String>) -> Self {
        self.summary_attributes = spec.into();
        self
    }

    pub fn with_detail_attributes(mut self, spec: impl Into<String>) -> Self {
        self.detail_attributes = spec.into();
        self
    }

    pub fn with_document_title_attribute(mut self, spec: impl Into<String>) -> Self {
        self.document_title_attribute = spec.into();
        self
    }

    pub fn with_millis_parser(mut self, policy: MillisPolicy) -> Self {
        self.millis_parser = policy;
        self
    }

    /// Connection-relevant subset of these options. An empty endpoint means
    /// the store's default endpoint.
    pub fn connection_settings(&self) -> ConnectionSettings {
        ConnectionSettings {
            region: self.region.clone(),
            endpoint: self
                .endpoint
                .as_ref()
                .map(|e| e.trim())
                .filter(|e| !e.is_empty())
                .map(str::to_string),
            access_key_id: self.access_key_id.clone(),
            secret_access_key: self.secret_access_key.clone(),
        }
    }

    /// Check required fields and compile every attribute spec.
    ///
    /// A parameter template without the `{{entity}}` token is accepted and
    /// sent to the store literally.
    pub fn validate(&self) -> Result<()> {
        if self.region.trim().is_empty() {
            return Err(DataError::invalid_configuration("region is required"));
        }
        if self.query.trim().is_empty() {
            return Err(DataError::invalid_configuration("query is required"));
        }
        if self.query_parameter.trim().is_empty() {
            return Err(DataError::invalid_configuration(
                "queryParameter is required",
            ));
        }
        if let Some(limit) = self.limit {
            if limit < 1 {
                return Err(DataError::invalid_configuration(format!(
                    "limit must be at least 1, got {}",
                    limit
                )));
            }
        }

        parse_attribute_spec(&self.summary_attributes)?;
        parse_attribute_spec(&self.detail_attributes)?;
        parse_first_rule(&self.document_title_attribute)?;
        Ok(())
    }
}

impl fmt::Debug for LookupOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LookupOptions")
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("query", &self.query)
            .field("query_parameter", &self.query_parameter)
            .field("limit", &self.limit)
            .field("summary_attributes", &self.summary_attributes)
            .field("detail_attributes", &self.detail_attributes)
            .field("document_title_attribute", &self.document_title_attribute)
            .field("millis_parser", &self.millis_parser)
            .finish()
    }
}

fn deserialize_region<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RegionOption {
        Plain(String),
        Select { value: String },
    }

    Ok(match RegionOption::deserialize(deserializer)? {
        RegionOption::Plain(region) => region,
        RegionOption::Select { value } => value,
    })
}

/// One executable statement: the template, its single bound parameter and
/// the page limit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatementQuery {
    pub statement: String,
    pub parameters: Vec<String>,
    pub limit: Option<i32>,
}

/// A labelled value in a detail entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailAttribute {
    pub key: String,
    pub value: serde_json::Value,
}

/// Detail breakdown of a single record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailEntry {
    pub title: Option<String>,
    pub attributes: Vec<DetailAttribute>,
}

/// Detail portion of a lookup result
#[derive(Debug, Clone, PartialEq)]
pub enum DetailView {
    /// No detail attributes configured; records are shown as raw JSON
    Json(Vec<RawRecord>),
    /// One entry per record that had at least one configured attribute
    Structured(Vec<DetailEntry>),
}

impl DetailView {
    pub fn show_as_json(&self) -> bool {
        matches!(self, DetailView::Json(_))
    }
}

impl Serialize for DetailView {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("DetailView", 2)?;
        state.serialize_field("showAsJson", &self.show_as_json())?;
        match self {
            DetailView::Json(records) => state.serialize_field("results", records)?,
            DetailView::Structured(entries) => state.serialize_field("results", entries)?,
        }
        state.end()
    }
}

/// Projection of the records returned for one entity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LookupData {
    pub summary: Vec<String>,
    pub details: DetailView,
}

/// Result for one entity; `data` is `None` when the store returned no rows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LookupResult {
    pub entity: Entity,
    pub data: Option<LookupData>,
}
