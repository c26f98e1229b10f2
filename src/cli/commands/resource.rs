//! Resource lifecycle commands: create, read, update, delete, import

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use serde_json::{Map, Value};

use junos_provider::error::Error;
use junos_provider::junos::Session;
use junos_provider::resources::{Diagnostics, Resource, ResourceData};

use super::CommandContext;

/// Arguments for create and update
#[derive(Parser, Debug, Clone)]
pub struct WriteArgs {
    /// Resource type (e.g. junos_application)
    pub resource_type: String,

    /// Attribute value (key=value), repeatable
    #[arg(short = 'a', long = "attr", value_parser = parse_key_val)]
    pub attributes: Vec<(String, String)>,

    /// JSON object file with attribute values; `-a` entries take precedence
    #[arg(long)]
    pub attrs_file: Option<PathBuf>,

    /// Id of the existing object (update only, defaults to the name)
    #[arg(long)]
    pub id: Option<String>,
}

/// Arguments for read, delete and import
#[derive(Parser, Debug, Clone)]
pub struct IdArgs {
    /// Resource type (e.g. junos_application)
    pub resource_type: String,

    /// Object id (its name)
    pub id: String,
}

/// Parse a single key=value pair
fn parse_key_val(s: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid key=value: no `=` found in `{}`", s))?;
    if key.is_empty() {
        return Err(format!("invalid key=value: empty key in `{}`", s));
    }
    Ok((key.to_string(), value.to_string()))
}

impl WriteArgs {
    /// Merge the attributes file and `-a` entries
    fn attributes(&self) -> std::result::Result<Map<String, Value>, Error> {
        let mut attrs = match &self.attrs_file {
            Some(path) => {
                let text = std::fs::read_to_string(path)?;
                match serde_json::from_str::<Value>(&text)? {
                    Value::Object(map) => map,
                    _ => {
                        return Err(Error::Config(format!(
                            "{}: expected a JSON object",
                            path.display()
                        )))
                    }
                }
            }
            None => Map::new(),
        };
        for (key, value) in &self.attributes {
            attrs.insert(key.clone(), Value::String(value.clone()));
        }
        Ok(attrs)
    }

    /// Create an object
    pub async fn create(&self, ctx: &CommandContext) -> Result<i32> {
        let (resource, session, attrs) = match self.prepare(ctx) {
            Ok(parts) => parts,
            Err(e) => return Ok(ctx.fail(&e)),
        };
        let mut data = ResourceData::new(attrs);
        let diags = resource.create(&session, &mut data).await;
        finish(ctx, &diags, &data)
    }

    /// Update an existing object
    pub async fn update(&self, ctx: &CommandContext) -> Result<i32> {
        let (resource, session, attrs) = match self.prepare(ctx) {
            Ok(parts) => parts,
            Err(e) => return Ok(ctx.fail(&e)),
        };
        let mut data = ResourceData::new(attrs);
        let id = match &self.id {
            Some(id) => id.clone(),
            None => data.get_str("name").to_string(),
        };
        data.set_id(id);
        let diags = resource.update(&session, &mut data).await;
        finish(ctx, &diags, &data)
    }

    fn prepare(
        &self,
        ctx: &CommandContext,
    ) -> std::result::Result<(Arc<dyn Resource>, Session, Map<String, Value>), Error> {
        let attrs = self.attributes()?;
        let (resource, session) = ctx.target(&self.resource_type)?;
        Ok((resource, session, attrs))
    }
}

impl IdArgs {
    /// Read an object
    pub async fn read(&self, ctx: &CommandContext) -> Result<i32> {
        let (resource, session) = match ctx.target(&self.resource_type) {
            Ok(parts) => parts,
            Err(e) => return Ok(ctx.fail(&e)),
        };
        let mut data = ResourceData::from_id(self.id.as_str());
        let diags = resource.read(&session, &mut data).await;
        if !diags.has_error() && data.is_gone() {
            ctx.output
                .warning(&format!("{} {} not found", resource.description(), self.id));
        }
        finish(ctx, &diags, &data)
    }

    /// Delete an object
    pub async fn delete(&self, ctx: &CommandContext) -> Result<i32> {
        let (resource, session) = match ctx.target(&self.resource_type) {
            Ok(parts) => parts,
            Err(e) => return Ok(ctx.fail(&e)),
        };
        let mut data = ResourceData::from_id(self.id.as_str());
        let diags = resource.delete(&session, &mut data).await;
        finish(ctx, &diags, &data)
    }

    /// Import an existing object
    pub async fn import(&self, ctx: &CommandContext) -> Result<i32> {
        let (resource, session) = match ctx.target(&self.resource_type) {
            Ok(parts) => parts,
            Err(e) => return Ok(ctx.fail(&e)),
        };
        match resource.import(&session, &self.id).await {
            Ok(data) => {
                ctx.output.value(&data)?;
                Ok(0)
            }
            Err(e) => Ok(ctx.fail(&e)),
        }
    }
}

/// Print diagnostics then, on success, the resulting state
fn finish(
    ctx: &CommandContext,
    diags: &Diagnostics,
    data: &ResourceData,
) -> Result<i32> {
    ctx.output.diagnostics(diags);
    if diags.has_error() {
        return Ok(1);
    }
    ctx.output.value(data)?;
    Ok(0)
}
