use anyhow::{Context, Result};
use comfy_table::Table;

use datacert_cli::pipeline::{RunOutcome, RunRequest, run_validation};
use datacert_engine::CancelToken;
use datacert_schema::load_schema;

use crate::cli::{EntitiesArgs, RunArgs};
use crate::summary::apply_table_style;

pub fn run_corpus(args: &RunArgs) -> Result<RunOutcome> {
    let request = RunRequest {
        schema: args.schema.clone(),
        config: args.config.clone(),
        data_dir: args.data_dir.clone(),
        output_dir: args.output_dir.clone(),
        identifier_index: args.identifier_index.clone(),
        exhaustive: args.exhaustive,
        workers: args.workers,
        sample_cap: args.sample_cap,
        chunk_size: args.chunk_size,
        dry_run: args.dry_run,
    };
    run_validation(&request, &CancelToken::new())
}

pub fn run_entities(args: &EntitiesArgs) -> Result<()> {
    let loaded = load_schema(&args.schema).context("load schema")?;
    let mut table = Table::new();
    table.set_header(vec!["Entity type", "Fields", "Identifier"]);
    apply_table_style(&mut table);
    for entity in loaded.model.entity_types() {
        let identifier = entity
            .identifier()
            .map(|field| field.name.clone())
            .unwrap_or_else(|| "-".to_string());
        table.add_row(vec![
            entity.name.clone(),
            entity.fields.len().to_string(),
            identifier,
        ]);
    }
    println!("{table}");
    Ok(())
}
