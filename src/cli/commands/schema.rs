//! Schema command

use anyhow::Result;
use clap::Parser;

use super::CommandContext;

/// Arguments for the schema command
#[derive(Parser, Debug, Clone)]
pub struct SchemaArgs {
    /// Resource type (all types when omitted)
    pub resource_type: Option<String>,
}

impl SchemaArgs {
    /// Print the requested schemas
    pub fn execute(&self, ctx: &CommandContext) -> Result<i32> {
        match &self.resource_type {
            None => ctx.output.value(&ctx.registry.schemas())?,
            Some(name) => match ctx.resource(name) {
                Ok(resource) => ctx.output.value(&resource.schema())?,
                Err(e) => return Ok(ctx.fail(&e)),
            },
        }
        Ok(0)
    }
}
