use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use hdm_core::{AppConfig, MappingResponse, MappingService};
use hdm_layouts::LayoutCatalog;
use hdm_llm::{HttpBackend, ModelInvoker};
use hdm_model::{DictionaryDocument, ModelSelector, SourceTables};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, info_span};

use crate::cli::{LayoutArgs, MapArgs, TestConnectionArgs};
use crate::summary::{layouts_table, models_table, preview_table, print_mapping};

const SPINNER_TEMPLATE: &str = "{spinner:.green} [{elapsed_precise}] {msg}";

fn load_catalog(config: &AppConfig) -> Result<LayoutCatalog> {
    let catalog = match &config.layouts.dir {
        Some(dir) => LayoutCatalog::load(dir),
        None => LayoutCatalog::load_default(),
    };
    catalog.context("load layouts")
}

pub fn run_layouts(config: &AppConfig) -> Result<()> {
    let catalog = load_catalog(config)?;
    println!("{}", layouts_table(&catalog.list_layouts()));
    Ok(())
}

pub fn run_layout(config: &AppConfig, args: &LayoutArgs) -> Result<()> {
    let catalog = load_catalog(config)?;
    let limit = if args.all { usize::MAX } else { args.limit };
    let preview = catalog.preview(&args.layout, limit)?;
    println!("{} ({} fields)", preview.name, preview.total_fields);
    println!("{}", preview_table(&preview));
    if preview.preview.len() < preview.total_fields {
        println!(
            "... {} more (use --all to show every field)",
            preview.total_fields - preview.preview.len()
        );
    }
    Ok(())
}

pub fn run_models(config: &AppConfig) -> Result<()> {
    let invoker_config = config.invoker_config();
    println!("{}", models_table(&invoker_config));
    let token = invoker_config.backend.credential();
    match token {
        Some(token) if !token.is_placeholder() => println!("Token: configured"),
        _ => println!(
            "Token: missing (set {} or backend.token)",
            invoker_config.backend.token_env
        ),
    }
    Ok(())
}

/// Returns false when at least one model failed.
pub fn run_test_connection(config: &AppConfig, args: &TestConnectionArgs) -> Result<bool> {
    let invoker =
        ModelInvoker::<HttpBackend>::from_config(config.invoker_config()).context("build client")?;
    let selectors = match &args.model {
        Some(model) => vec![ModelSelector::new(model.as_str())],
        None => invoker.selectors(),
    };

    let mut all_ok = true;
    for selector in &selectors {
        let spinner = spinner(format!("testing {selector}"));
        let outcome = invoker.test_connection(selector);
        spinner.finish_and_clear();
        match outcome {
            Ok(check) => println!(
                "{}: ok in {} ms ({})",
                check.model,
                check.elapsed.as_millis(),
                check.endpoint
            ),
            Err(error) => {
                all_ok = false;
                println!("{selector}: {}", error.user_message());
                println!("  {error}");
            }
        }
    }
    Ok(all_ok)
}

pub fn run_map(config: &AppConfig, args: &MapArgs) -> Result<()> {
    let span = info_span!("map", layout = %args.layout, model = %args.model);
    let _guard = span.enter();

    let service = MappingService::from_config(config)?;
    let document = DictionaryDocument::from_path(&args.dictionary)
        .with_context(|| format!("read dictionary {}", args.dictionary.display()))?;
    let tables = SourceTables::parse(&args.tables);
    if tables.is_empty() {
        bail!("--tables must name at least one source table");
    }
    let model = ModelSelector::new(args.model.as_str());

    if args.prompt_only {
        let prepared = service.prepare(&args.layout, document, &tables, &model)?;
        if prepared.report.truncated() {
            info!(
                omitted = prepared.report.entries_omitted(),
                "dictionary truncated to fit the prompt"
            );
        }
        match &args.output {
            Some(path) => write_output(path, prepared.prompt.as_str())?,
            None => println!("{}", prepared.prompt.as_str()),
        }
        return Ok(());
    }

    let spinner = spinner(format!("mapping onto {} with {model}", args.layout));
    let result = service.run(&args.layout, document, &tables, &model);
    spinner.finish_and_clear();
    let response = result?;

    let json = render_json(&response, args.envelope)?;
    if let Some(path) = &args.output {
        write_output(path, &json)?;
    }
    if args.json {
        println!("{json}");
    } else {
        print_mapping(&response);
        if let Some(path) = &args.output {
            println!("Wrote {}", path.display());
        }
    }
    Ok(())
}

/// Artifact JSON, or the full response when `envelope` is set.
pub fn render_json(response: &MappingResponse, envelope: bool) -> Result<String> {
    let json = if envelope {
        serde_json::to_string_pretty(response)
    } else {
        serde_json::to_string_pretty(&response.artifact)
    };
    json.context("serialize mapping")
}

fn write_output(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).with_context(|| format!("write {}", path.display()))
}

fn spinner(message: String) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    let style = ProgressStyle::default_spinner()
        .template(SPINNER_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    spinner.set_style(style);
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}
