//! Command implementations. Each returns the JSON document to print.

use crate::config::CliConfig;
use clap::ValueEnum;
use color_eyre::eyre::{Result, WrapErr};
use rowgate_backend::Backend;
use rowgate_core::{CompileRequest, CompileResponse, PathResolver, Residual};
use serde_json::{json, Value};
use std::path::Path;

/// Layout of a residual file
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum InputFormat {
    /// Residual JSON: clauses of `{operator, operands}` expressions
    #[default]
    Native,
    /// Policy engine compile API response
    Opa,
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).wrap_err_with(|| format!("failed to read {}", path.display()))
}

/// Read a residual in the given format
pub fn load_residual(path: &Path, format: InputFormat) -> Result<Residual> {
    let text = read(path)?;
    let residual = match format {
        InputFormat::Native => Residual::from_json_str(&text)?,
        InputFormat::Opa => CompileResponse::residual_from_json_str(&text)?,
    };
    Ok(residual)
}

/// Compile a residual file for a backend
pub fn compile(
    config: &CliConfig,
    path: &Path,
    format: InputFormat,
    backend: Option<Backend>,
) -> Result<Value> {
    let residual = load_residual(path, format)?;
    let backend = backend.unwrap_or(config.backend);

    let result = match backend.compile_to_json(&residual) {
        Ok(result) => result,
        Err(err) => {
            tracing::error!(
                %backend,
                error = %err,
                residual = %residual,
                "residual compilation failed"
            );
            return Err(err.into());
        }
    };

    tracing::info!(
        %backend,
        clauses = residual.len(),
        defined = result.defined,
        filtered = result.predicate.is_some(),
        "compiled residual"
    );
    Ok(serde_json::to_value(result)?)
}

/// Build the compile API request body for an input document
pub fn request(config: &CliConfig, input: &Path) -> Result<Value> {
    let input: Value = serde_json::from_str(&read(input)?)
        .wrap_err_with(|| format!("input {} is not JSON", input.display()))?;
    let request = CompileRequest::new(&config.partial, input)?;
    Ok(serde_json::to_value(request)?)
}

/// Resolve a reference into its collection and field path
pub fn resolve(reference: &str) -> Result<Value> {
    let path = PathResolver::new().resolve(reference)?;
    Ok(json!({
        "collection": path.collection,
        "segments": path.segments,
    }))
}
