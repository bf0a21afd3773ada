//! Summary tags and detail view built from the records of one entity.

use crate::attributes::{parse_attribute_spec, parse_first_rule, AttributeRule};
use crate::error::Result;
use crate::resolver::{display_value, resolve, resolve_truthy};
use crate::types::{
    DetailAttribute, DetailEntry, DetailView, LookupData, LookupOptions, MillisPolicy, RawRecord,
};

/// Attribute specs of a [`LookupOptions`], compiled once per lookup call.
///
/// Every method is a pure function of the compiled rules and its input
/// records.
#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    summary: Vec<AttributeRule>,
    /// `None` when no detail attributes are configured
    detail: Option<Vec<AttributeRule>>,
    title: Option<AttributeRule>,
    millis: MillisPolicy,
}

impl Projection {
    pub fn compile(options: &LookupOptions) -> Result<Self> {
        let summary = parse_attribute_spec(&options.summary_attributes)?;

        let detail = if options.detail_attributes.trim().is_empty() {
            None
        } else {
            Some(parse_attribute_spec(&options.detail_attributes)?)
        };

        let title = parse_first_rule(&options.document_title_attribute)?;

        Ok(Self {
            summary,
            detail,
            title,
            millis: options.millis_parser,
        })
    }

    /// Summary tags and details for a non-empty record set
    pub fn project(&self, records: Vec<RawRecord>) -> LookupData {
        LookupData {
            summary: self.summary_tags(&records),
            details: self.details(records),
        }
    }

    /// Title of a record from the first title rule
    pub fn document_title(&self, record: &RawRecord) -> Option<String> {
        let rule = self.title.as_ref()?;
        let value = resolve(record, rule, self.millis)?;
        Some(rule.render(&display_value(&value)))
    }

    pub fn details(&self, records: Vec<RawRecord>) -> DetailView {
        let Some(rules) = &self.detail else {
            return DetailView::Json(records);
        };

        let entries = records
            .iter()
            .filter_map(|record| {
                let attributes: Vec<DetailAttribute> = rules
                    .iter()
                    .filter_map(|rule| {
                        resolve_truthy(record, rule, self.millis).map(|value| DetailAttribute {
                            key: rule.label.clone(),
                            value,
                        })
                    })
                    .collect();

                if attributes.is_empty() {
                    None
                } else {
                    Some(DetailEntry {
                        title: self.document_title(record),
                        attributes,
                    })
                }
            })
            .collect();

        DetailView::Structured(entries)
    }

    /// Tags ordered rule-major, record-minor. Falls back to a result count
    /// when no rule produced a tag.
    pub fn summary_tags(&self, records: &[RawRecord]) -> Vec<String> {
        let mut tags = Vec::new();

        for rule in &self.summary {
            for record in records {
                if let Some(value) = resolve_truthy(record, rule, self.millis) {
                    tags.push(rule.render(&display_value(&value)));
                }
            }
        }

        if tags.is_empty() {
            tags.push(result_count_tag(records.len()));
        }

        tags
    }
}

fn result_count_tag(count: usize) -> String {
    format!("{} {}", count, if count == 1 { "result" } else { "results" })
}
