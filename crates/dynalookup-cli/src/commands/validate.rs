use crate::options::OptionsArgs;
use clap::Args;
use colored::Colorize;
use dynalookup_query::{parse_attribute_spec, parse_first_rule, AttributeRule, LookupOptions};
use serde::Serialize;

#[derive(Args)]
pub struct ValidateCommand {
    #[command(flatten)]
    pub options: OptionsArgs,

    /// Print the compiled attribute rules as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CompiledRules {
    summary_attributes: Vec<AttributeRule>,
    detail_attributes: Vec<AttributeRule>,
    document_title_attribute: Option<AttributeRule>,
}

impl CompiledRules {
    fn compile(options: &LookupOptions) -> anyhow::Result<Self> {
        Ok(Self {
            summary_attributes: parse_attribute_spec(&options.summary_attributes)?,
            detail_attributes: parse_attribute_spec(&options.detail_attributes)?,
            document_title_attribute: parse_first_rule(&options.document_title_attribute)?,
        })
    }
}

impl ValidateCommand {
    pub fn execute(self) -> anyhow::Result<()> {
        let options = self.options.load()?;
        let rules = CompiledRules::compile(&options)?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&rules)?);
            return Ok(());
        }

        println!("{}", "Options are valid".bright_green());
        println!("  region:    {}", options.region);
        println!("  statement: {}", options.query);
        print_rules("summary", &rules.summary_attributes);
        print_rules("detail", &rules.detail_attributes);
        print_rules("title", rules.document_title_attribute.as_slice());
        Ok(())
    }
}

fn print_rules(section: &str, rules: &[AttributeRule]) {
    if rules.is_empty() {
        println!("  {}: {}", section, "(none)".dimmed());
        return;
    }

    println!("  {}:", section);
    for rule in rules {
        match &rule.parser {
            Some(parser) => println!("    {} <- {} [{}]", rule.label, rule.path, parser),
            None => println!("    {} <- {}", rule.label, rule.path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compiled_rules_json_shape() {
        let options = LookupOptions::new("us-east-1", "SELECT 1", "{{entity}}")
            .with_summary_attributes("Name:name")
            .with_document_title_attribute("Created:date-iso:createdAt, a:b:c:d");

        let rules = CompiledRules::compile(&options).unwrap();
        let json = serde_json::to_value(&rules).unwrap();

        assert_eq!(json["summaryAttributes"][0]["label"], "Name");
        assert_eq!(json["detailAttributes"], serde_json::json!([]));
        assert_eq!(json["documentTitleAttribute"]["parser"], "date-iso");
        assert_eq!(json["documentTitleAttribute"]["path"], "createdAt");
    }
}
