//! `{resource.path}` expression resolution
//!
//! Supported paths:
//! - `connectionString`
//! - `value` (parameters)
//! - `inputs.<input>`
//! - `bindings.<binding>.(url|host|port|targetPort|scheme)`
//!
//! Resolved text may itself contain expressions (a database connection string
//! embeds its server's), so resolution recurses up to [`MAX_DEPTH`] levels.

use regex::{Captures, Regex};
use std::sync::LazyLock;

use crate::error::{CoreError, Result};
use crate::inputs::InputValues;
use crate::resource::{Resource, Resources};

/// Nesting limit, also what stops reference cycles
pub const MAX_DEPTH: usize = 10;

static EXPRESSION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{([A-Za-z0-9_\-]+(?:\.[A-Za-z0-9_\-]+)+)\}").expect("expression pattern is valid")
});

/// A resolved string and whether any secret input flowed into it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedValue {
    pub value: String,
    pub secret: bool,
}

/// Resolves expressions against the resources of one manifest
pub struct ExpressionResolver<'a> {
    resources: &'a Resources,
    inputs: &'a InputValues,
}

impl<'a> ExpressionResolver<'a> {
    pub fn new(resources: &'a Resources, inputs: &'a InputValues) -> Self {
        Self { resources, inputs }
    }

    /// Resolve every expression in `text`
    pub fn resolve(&self, text: &str) -> Result<ResolvedValue> {
        self.resolve_at(text, 0)
    }

    fn resolve_at(&self, text: &str, depth: usize) -> Result<ResolvedValue> {
        if depth > MAX_DEPTH {
            return Err(CoreError::expression(
                text,
                format!("nested more than {MAX_DEPTH} levels (reference cycle?)"),
            ));
        }

        let mut secret = false;
        let mut failure = None;

        let value = EXPRESSION.replace_all(text, |caps: &Captures<'_>| {
            if failure.is_some() {
                return String::new();
            }
            match self.lookup(&caps[1], depth + 1) {
                Ok(resolved) => {
                    secret |= resolved.secret;
                    resolved.value
                }
                Err(e) => {
                    failure = Some(e);
                    String::new()
                }
            }
        });

        match failure {
            Some(e) => Err(e),
            None => Ok(ResolvedValue {
                value: value.into_owned(),
                secret,
            }),
        }
    }

    fn lookup(&self, expression: &str, depth: usize) -> Result<ResolvedValue> {
        let parts: Vec<&str> = expression.split('.').collect();
        let (name, path) = parts
            .split_first()
            .ok_or_else(|| CoreError::expression(expression, "empty expression"))?;

        let resource = self
            .resources
            .get(*name)
            .ok_or_else(|| CoreError::expression(expression, format!("no resource named '{name}'")))?;

        match path {
            ["connectionString"] => {
                let template = resource.connection_string_template(name).ok_or_else(|| {
                    CoreError::expression(
                        expression,
                        format!("{} resources have no connection string", resource.resource_type()),
                    )
                })?;
                self.resolve_at(&template, depth)
            }
            ["value"] => match resource {
                Resource::Parameter(p) => self.resolve_at(&p.value, depth),
                _ => Err(CoreError::expression(expression, "only parameters have a value")),
            },
            ["inputs", input] => self
                .inputs
                .get(name, input)
                .map(|v| ResolvedValue {
                    value: v.value.clone(),
                    secret: v.secret,
                })
                .ok_or_else(|| CoreError::expression(expression, format!("no input named '{input}'"))),
            ["bindings", binding, property] => {
                let binding_def = resource
                    .bindings()
                    .and_then(|b| b.get(*binding))
                    .ok_or_else(|| {
                        CoreError::expression(expression, format!("no binding named '{binding}'"))
                    })?;

                let value = match *property {
                    "url" => format!(
                        "{}://{}:{}",
                        binding_def.scheme,
                        name,
                        binding_def.service_port()
                    ),
                    "host" => name.to_string(),
                    "port" => binding_def.service_port().to_string(),
                    "targetPort" => binding_def.target_port().to_string(),
                    "scheme" => binding_def.scheme.clone(),
                    other => {
                        return Err(CoreError::expression(
                            expression,
                            format!("unknown binding property '{other}'"),
                        ));
                    }
                };

                Ok(ResolvedValue {
                    value,
                    secret: false,
                })
            }
            _ => Err(CoreError::expression(expression, "unsupported expression path")),
        }
    }
}
