use crate::options::OptionsArgs;
use anyhow::Context;
use clap::Args;
use dynalookup_dynamodb::DynamoDbConnector;
use dynalookup_query::{Entity, LookupExecutor};
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Args)]
pub struct LookupCommand {
    #[command(flatten)]
    pub options: OptionsArgs,

    /// Maximum concurrent statements, capped at 10
    #[arg(long, default_value_t = dynalookup_query::MAX_CONCURRENT_QUERIES)]
    pub concurrency: usize,

    /// Entity values to look up; read one per line from stdin when omitted
    pub entities: Vec<String>,
}

impl LookupCommand {
    pub fn execute(self) -> anyhow::Result<()> {
        let options = self.options.load()?;

        let entities = if self.entities.is_empty() {
            debug!("Reading entities from stdin");
            read_entities(io::stdin().lock()).context("Failed to read entities from stdin")?
        } else {
            self.entities.into_iter().map(Entity::new).collect()
        };

        info!(
            "Looking up {} entities in region {}",
            entities.len(),
            options.region
        );

        let executor = LookupExecutor::new(Arc::new(DynamoDbConnector::new()))
            .with_max_concurrency(self.concurrency);

        let rt = tokio::runtime::Runtime::new()?;
        let outcome = rt.block_on(executor.lookup(&entities, &options));

        let mut stdout = io::stdout().lock();
        match outcome {
            Ok(results) => {
                serde_json::to_writer_pretty(&mut stdout, &results)?;
                writeln!(stdout)?;
                Ok(())
            }
            Err(err) => {
                serde_json::to_writer_pretty(&mut stdout, &err)?;
                writeln!(stdout)?;
                Err(anyhow::Error::new(err).context("Lookup failed"))
            }
        }
    }
}

/// One entity per non-blank line, trimmed
fn read_entities<R: BufRead>(reader: R) -> io::Result<Vec<Entity>> {
    let mut entities = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let value = line.trim();
        if !value.is_empty() {
            entities.push(Entity::new(value));
        }
    }
    Ok(entities)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_entities_skips_blank_lines() {
        let input = "alice@example.com\n\n  bob  \r\n\t\n10.0.0.1";
        let entities = read_entities(input.as_bytes()).unwrap();
        let values: Vec<&str> = entities.iter().map(|e| e.value.as_str()).collect();
        assert_eq!(values, vec!["alice@example.com", "bob", "10.0.0.1"]);
    }

    #[test]
    fn test_read_entities_empty_input() {
        assert!(read_entities("".as_bytes()).unwrap().is_empty());
    }
}
