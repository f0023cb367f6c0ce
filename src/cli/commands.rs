//! CLI command implementations
//!
//! Commands are thin: load inputs, hand them to the engine, print the
//! export. All reasoning happens in the library.

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::annotation::AnnotationRegistry;
use crate::dsl::{Compilation, RuleCompiler};
use crate::engine::{Engine, EngineConfig, RunConfig};
use crate::graph::Graph;
use crate::interpretation::{ExportProfile, Redaction};
use crate::observability::{log_event, Event, ObservationScope};
use crate::rules::{DescriptorTranslator, ForeignRuleDescriptor, NativeRule, Translator};

use super::args::{Command, RulesFormat};
use super::errors::{CliError, CliResult};
use super::io::{read_file, write_json, write_text};

/// Source system name recorded on translated rules
const FOREIGN_SOURCE: &str = "descriptor";

/// Configuration file structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub engine: EngineConfig,
    pub run: RunConfig,
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = read_file(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e.message())))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;
        log_event(
            Event::ConfigLoaded,
            &[("path", &path.display().to_string())],
        );
        Ok(config)
    }

    /// Loads `path` when given, otherwise the defaults
    pub fn load_or_default(path: Option<&Path>) -> CliResult<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    fn validate(&self) -> CliResult<()> {
        self.engine
            .validate()
            .map_err(|e| CliError::config_error(format!("{}: {}", e.code(), e)))?;
        self.run
            .validate()
            .map_err(|e| CliError::config_error(format!("{}: {}", e.code(), e)))?;
        Ok(())
    }
}

/// Loaded rules plus DSL diagnostics, if the file was DSL
#[derive(Debug, Clone, Default)]
pub struct LoadedRules {
    pub rules: Vec<NativeRule>,
    pub compilation: Option<Compilation>,
}

/// Reads a rules file in the requested format
pub fn load_rules(path: &Path, format: RulesFormat) -> CliResult<LoadedRules> {
    let content = read_file(path)?;
    let format = match format {
        RulesFormat::Auto if path.extension().is_some_and(|e| e == "json") => RulesFormat::Json,
        RulesFormat::Auto => RulesFormat::Dsl,
        other => other,
    };

    let loaded = match format {
        RulesFormat::Json => LoadedRules {
            rules: serde_json::from_str(&content)
                .map_err(|e| CliError::rules_error(format!("Invalid rule JSON: {}", e)))?,
            compilation: None,
        },
        RulesFormat::Foreign => {
            let foreign: Vec<ForeignRuleDescriptor> = serde_json::from_str(&content)
                .map_err(|e| CliError::rules_error(format!("Invalid descriptor JSON: {}", e)))?;
            LoadedRules {
                rules: DescriptorTranslator::new(FOREIGN_SOURCE).translate_all(&foreign)?,
                compilation: None,
            }
        }
        RulesFormat::Dsl | RulesFormat::Auto => {
            let compilation = RuleCompiler::new()?.compile(&content);
            LoadedRules {
                rules: compilation.rules.clone(),
                compilation: Some(compilation),
            }
        }
    };

    let skipped = loaded
        .compilation
        .as_ref()
        .map_or(0, |c| c.diagnostics.len());
    log_event(
        Event::RulesLoaded,
        &[
            ("path", &path.display().to_string()),
            ("rules", &loaded.rules.len().to_string()),
            ("diagnostics", &skipped.to_string()),
        ],
    );
    Ok(loaded)
}

/// Dispatch a parsed command
pub fn run_command(command: Command) -> CliResult<()> {
    match command {
        Command::Run {
            graph,
            rules,
            format,
            config,
            audit,
            block,
            stream,
            verbose,
        } => {
            let options = RunOptions {
                audit,
                block,
                stream,
                verbose,
            };
            run(&graph, &rules, format, config.as_deref(), &options)
        }
        Command::Check {
            rules,
            format,
            config,
        } => check(&rules, format, config.as_deref()),
    }
}

/// Output switches for `run`
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub audit: bool,
    pub block: Vec<String>,
    pub stream: bool,
    pub verbose: bool,
}

/// Produces the output document for `run` without printing it.
pub fn execute(
    graph_path: &Path,
    rules_path: &Path,
    format: RulesFormat,
    config_path: Option<&Path>,
    options: &RunOptions,
) -> CliResult<String> {
    let config = Config::load_or_default(config_path)?;
    let graph = Graph::load(graph_path)?;
    log_event(
        Event::GraphLoaded,
        &[
            ("nodes", &graph.node_count().to_string()),
            ("edges", &graph.edge_count().to_string()),
        ],
    );
    let loaded = load_rules(rules_path, format)?;

    let engine = Engine::new(config.engine, AnnotationRegistry::with_builtins())?;
    let run_config = RunConfig {
        verbose: options.verbose || config.run.verbose,
        ..config.run
    };
    let interp = engine.run_with(&graph, &loaded.rules, &run_config)?;

    let redaction = Redaction::new(options.block.iter().cloned());
    if options.stream {
        return Ok(interp.fact_stream_filtered(&redaction));
    }

    let profile = if options.audit {
        ExportProfile::Audit
    } else {
        ExportProfile::Default
    };
    let mut view = interp.export(profile, &redaction);
    if options.audit {
        view["metrics"] = serde_json::to_value(engine.metrics().snapshot())?;
    }
    Ok(format!("{}\n", view))
}

/// `lexrule run`
pub fn run(
    graph_path: &Path,
    rules_path: &Path,
    format: RulesFormat,
    config_path: Option<&Path>,
    options: &RunOptions,
) -> CliResult<()> {
    let scope = ObservationScope::new("COMMAND_RUN");
    match execute(graph_path, rules_path, format, config_path, options) {
        Ok(output) => {
            write_text(&output)?;
            scope.complete();
            Ok(())
        }
        Err(e) => {
            scope.fail(e.code_str());
            Err(e)
        }
    }
}

/// Validation summary for a rules file
pub fn check_summary(
    rules_path: &Path,
    format: RulesFormat,
    config_path: Option<&Path>,
) -> CliResult<Value> {
    let config = Config::load_or_default(config_path)?;
    let loaded = load_rules(rules_path, format)?;
    let engine = Engine::new(config.engine, AnnotationRegistry::with_builtins())?;

    let diagnostics: Vec<Value> = loaded
        .compilation
        .iter()
        .flat_map(|c| c.diagnostics.iter())
        .map(|d| {
            json!({
                "line": d.line,
                "fragment": d.fragment,
                "code": d.error.code(),
                "message": d.error.to_string(),
                "rule_kept": d.rule_kept,
            })
        })
        .collect();

    let (valid, error) = match engine.validate_rules(&loaded.rules) {
        Ok(()) => (true, Value::Null),
        Err(e) => (false, json!({"code": e.code(), "message": e.to_string()})),
    };
    let ids: Vec<&str> = loaded.rules.iter().map(|r| r.id.as_str()).collect();

    Ok(json!({
        "rules": ids,
        "diagnostics": diagnostics,
        "valid": valid,
        "error": error,
    }))
}

/// `lexrule check`
pub fn check(rules_path: &Path, format: RulesFormat, config_path: Option<&Path>) -> CliResult<()> {
    let summary = check_summary(rules_path, format, config_path)?;
    write_json(&summary)?;
    if summary["valid"] == Value::Bool(true) {
        Ok(())
    } else {
        Err(CliError::rules_error("rule validation failed"))
    }
}
