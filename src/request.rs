//! # Rollback Request
//!
//! The validated, read-only description of a single `down` invocation.
//! `RollbackParams` carries raw command-line input (every field optional, the
//! way clap hands it over) and `RollbackRequest::from_params` turns it into a
//! request or a configuration error. Validation is purely local: nothing here
//! touches the filesystem or the network.

use crate::compiler::CompilerSpec;
use crate::defaults::{ACCESS_TOKEN_ENV, DEFAULT_ENVIRONMENT_ID};
use crate::error::{Error, Result};

/// Raw, unvalidated rollback parameters.
#[derive(Debug, Clone, Default)]
pub struct RollbackParams {
    pub access_token: Option<String>,
    pub space_id: Option<String>,
    pub environment_id: Option<String>,
    pub content_type: Option<String>,
    pub compiler: Option<String>,
    pub dry_run: bool,
    pub file: Option<String>,
}

/// A validated rollback request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollbackRequest {
    pub access_token: String,
    pub space_id: String,
    pub environment_id: String,
    pub content_type: String,
    pub compiler: Option<CompilerSpec>,
    pub dry_run: bool,
    /// Migration to roll back to (inclusive). `None` reverts only the most
    /// recently applied migration.
    pub file: Option<String>,
}

impl RollbackRequest {
    /// Validate raw parameters.
    ///
    /// Required values that are missing or blank produce
    /// [`Error::MissingParameter`]. The environment defaults to `master` only
    /// when it was not given at all; an explicitly blank one is invalid. Identifiers become directory names in the
    /// state store, so path separators and `..` are rejected.
    pub fn from_params(params: RollbackParams) -> Result<Self> {
        let access_token = required(
            "access-token",
            params.access_token,
            Some(format!(
                "Pass --access-token or set the {} environment variable",
                ACCESS_TOKEN_ENV
            )),
        )?;
        let space_id = identifier("space-id", required("space-id", params.space_id, None)?)?;
        let environment_id = match params.environment_id {
            None => DEFAULT_ENVIRONMENT_ID.to_string(),
            Some(value) => identifier(
                "environment-id",
                non_blank(Some(value)).ok_or_else(|| Error::InvalidParameter {
                    name: "environment-id".to_string(),
                    message: "a value is required when the flag is given".to_string(),
                })?,
            )?,
        };
        let content_type = identifier(
            "content-type",
            required("content-type", params.content_type, None)?,
        )?;

        let compiler = non_blank(params.compiler)
            .map(|spec| CompilerSpec::parse(&spec))
            .transpose()?;

        Ok(Self {
            access_token,
            space_id,
            environment_id,
            content_type,
            compiler,
            dry_run: params.dry_run,
            file: non_blank(params.file),
        })
    }

    /// Content types to load. Always a single entry for now.
    pub fn content_types(&self) -> Vec<String> {
        vec![self.content_type.clone()]
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required(name: &str, value: Option<String>, hint: Option<String>) -> Result<String> {
    non_blank(value).ok_or_else(|| Error::MissingParameter {
        name: name.to_string(),
        hint,
    })
}

fn identifier(name: &str, value: String) -> Result<String> {
    if value.contains(['/', '\\']) || value == "." || value == ".." {
        return Err(Error::InvalidParameter {
            name: name.to_string(),
            message: format!("'{}' is not a valid identifier", value),
        });
    }
    Ok(value)
}
