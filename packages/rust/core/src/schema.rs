//! JSON Schema application for `document.json`.
//!
//! Applying the schema means two things: missing properties that declare a
//! `default` are filled in, then the instance is validated with format
//! checking disabled. Validation reports every violation, not just the first.

use serde_json::Value;
use tracing::{debug, instrument};

use adpt_shared::{AdptError, Result};

use crate::fetch::Fetcher;

/// Upper bound on chained `$ref` hops (guards against reference cycles).
const MAX_REF_HOPS: usize = 32;

/// A compiled document schema.
pub struct DocumentSchema {
    root: Value,
    validator: jsonschema::Validator,
}

impl std::fmt::Debug for DocumentSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentSchema")
            .field("id", &self.root.get("$id"))
            .finish_non_exhaustive()
    }
}

impl DocumentSchema {
    /// Fetch and compile the schema published at `url`.
    #[instrument(skip(fetcher))]
    pub async fn fetch<F: Fetcher>(fetcher: &F, url: &str) -> Result<Self> {
        let text = fetcher.fetch(url).await?;
        let schema = Self::parse(&text)?;
        debug!("schema compiled");
        Ok(schema)
    }

    /// Compile a schema from its JSON text.
    pub fn parse(text: &str) -> Result<Self> {
        let root: Value = serde_json::from_str(text)
            .map_err(|e| AdptError::parse(format!("schema is not valid JSON: {e}")))?;
        Self::from_value(root)
    }

    /// Compile an already-parsed schema document.
    pub fn from_value(root: Value) -> Result<Self> {
        let validator = jsonschema::options()
            .should_validate_formats(false)
            .build(&root)
            .map_err(|e| AdptError::validation(format!("invalid schema document: {e}")))?;
        Ok(Self { root, validator })
    }

    /// Insert defaults into `instance`, then validate it.
    pub fn apply(&self, instance: &mut Value) -> Result<()> {
        self.insert_defaults(instance);
        self.validate(instance)
    }

    /// Validate `instance`, collecting every violation.
    pub fn validate(&self, instance: &Value) -> Result<()> {
        let violations: Vec<String> = self
            .validator
            .iter_errors(instance)
            .map(|error| {
                let path = error.instance_path.to_string();
                if path.is_empty() {
                    error.to_string()
                } else {
                    format!("{path}: {error}")
                }
            })
            .collect();

        if violations.is_empty() {
            Ok(())
        } else {
            debug!(count = violations.len(), "schema violations");
            Err(AdptError::InvalidConfiguration { violations })
        }
    }

    /// Fill missing object properties from the `default` keywords reachable
    /// through `properties`, `items`, `allOf` and local `$ref`s.
    pub fn insert_defaults(&self, instance: &mut Value) {
        insert_defaults(&self.root, &self.root, instance);
    }
}

fn insert_defaults(root: &Value, schema: &Value, instance: &mut Value) {
    let schema = resolve(root, schema);

    if let Some(Value::Array(branches)) = schema.get("allOf") {
        for branch in branches {
            insert_defaults(root, branch, instance);
        }
    }

    match instance {
        Value::Object(map) => {
            let Some(Value::Object(properties)) = schema.get("properties") else {
                return;
            };
            for (key, property) in properties {
                let property = resolve(root, property);
                if !map.contains_key(key) {
                    if let Some(default) = property.get("default") {
                        map.insert(key.clone(), default.clone());
                    }
                }
                if let Some(child) = map.get_mut(key) {
                    insert_defaults(root, property, child);
                }
            }
        }
        Value::Array(items) => {
            if let Some(item_schema) = schema.get("items").filter(|s| s.is_object()) {
                for item in items {
                    insert_defaults(root, item_schema, item);
                }
            }
        }
        _ => {}
    }
}

/// Follow local (`#/...`) references. Remote references are left as-is.
fn resolve<'a>(root: &'a Value, mut schema: &'a Value) -> &'a Value {
    for _ in 0..MAX_REF_HOPS {
        let Some(target) = schema
            .get("$ref")
            .and_then(Value::as_str)
            .and_then(|r| r.strip_prefix('#'))
            .and_then(|pointer| root.pointer(pointer))
        else {
            break;
        };
        schema = target;
    }
    schema
}
