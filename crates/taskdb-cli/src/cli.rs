use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use taskdb_core::TaskFields;

#[derive(Parser)]
#[command(name = "taskdb")]
#[command(about = "Manage the tasks collection", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// MongoDB connection string
    #[arg(long, env = "MONGODB_URI", hide_env_values = true)]
    pub mongodb_uri: Option<String>,

    /// Database name
    #[arg(long, env = "MONGODB_DATABASE")]
    pub database: Option<String>,

    /// Collection name
    #[arg(long, env = "MONGODB_COLLECTION")]
    pub collection: Option<String>,

    /// Emit logs as JSON
    #[arg(long)]
    pub log_json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List tasks, pending first
    List {
        /// Case-insensitive substring of the status
        #[arg(long)]
        status: Option<String>,

        /// Case-insensitive substring of the title
        #[arg(long)]
        title: Option<String>,
    },

    /// Show one task
    Get {
        /// Task ID
        id: String,
    },

    /// Create a task
    Create {
        #[command(flatten)]
        fields: FieldArgs,
    },

    /// Change fields of a task, leaving the rest untouched
    Update {
        /// Task ID
        id: String,

        #[command(flatten)]
        fields: FieldArgs,
    },

    /// Delete a task
    Delete {
        /// Task ID
        id: String,
    },

    /// Check the database answers
    Ping,
}

#[derive(Args, Debug, Default)]
pub struct FieldArgs {
    /// Task title
    #[arg(long)]
    pub title: Option<String>,

    /// Task status
    #[arg(long)]
    pub status: Option<String>,

    /// Extra field as key=value (value parsed as JSON, else taken as text)
    #[arg(long = "field", value_name = "KEY=VALUE")]
    pub fields: Vec<String>,

    /// JSON object of fields, applied before the other flags
    #[arg(long)]
    pub json: Option<String>,
}

impl FieldArgs {
    pub fn into_task_fields(self) -> Result<TaskFields> {
        let mut fields = match self.json {
            Some(raw) => {
                let value: Value = serde_json::from_str(&raw).context("--json is not valid JSON")?;
                TaskFields::from_json(value).context("--json must be a JSON object")?
            }
            None => TaskFields::new(),
        };

        for raw in &self.fields {
            let (key, value) = parse_field(raw)?;
            fields = fields.with_field(key, value);
        }

        if let Some(title) = self.title {
            fields = fields.with_title(title);
        }
        if let Some(status) = self.status {
            fields = fields.with_status(status);
        }

        Ok(fields)
    }
}

/// Split `key=value`; the value is JSON when it parses, otherwise plain text.
pub fn parse_field(raw: &str) -> Result<(String, Value)> {
    let (key, value) = raw
        .split_once('=')
        .with_context(|| format!("expected KEY=VALUE, got `{}`", raw))?;

    if key.is_empty() {
        bail!("empty field name in `{}`", raw);
    }

    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));

    Ok((key.to_string(), value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_field_json_and_text() {
        assert_eq!(parse_field("qty=2").unwrap(), ("qty".to_string(), json!(2)));
        assert_eq!(parse_field("done=true").unwrap(), ("done".to_string(), json!(true)));
        assert_eq!(
            parse_field("note=call mom").unwrap(),
            ("note".to_string(), json!("call mom"))
        );
        assert_eq!(parse_field("expr=a=b").unwrap(), ("expr".to_string(), json!("a=b")));
    }

    #[test]
    fn test_parse_field_rejects_malformed() {
        assert!(parse_field("novalue").is_err());
        assert!(parse_field("=1").is_err());
    }

    #[test]
    fn test_flags_override_json() {
        let args = FieldArgs {
            title: Some("From flag".to_string()),
            status: None,
            fields: vec!["tags=[\"a\"]".to_string()],
            json: Some(r#"{"title": "From json", "status": "pending"}"#.to_string()),
        };

        let fields = args.into_task_fields().unwrap();

        assert_eq!(fields.title.as_deref(), Some("From flag"));
        assert_eq!(fields.status.as_deref(), Some("pending"));
        assert_eq!(fields.extra["tags"], json!(["a"]));
    }

    #[test]
    fn test_json_must_be_object() {
        let args = FieldArgs {
            json: Some("[1, 2]".to_string()),
            ..Default::default()
        };

        assert!(args.into_task_fields().is_err());
    }

    #[test]
    fn test_cli_parses_update() {
        let cli = Cli::try_parse_from([
            "taskdb",
            "--mongodb-uri",
            "mongodb://localhost",
            "update",
            "65a1f0c2e4b0a1b2c3d4e5f6",
            "--status",
            "done",
            "--field",
            "qty=3",
        ])
        .unwrap();

        match cli.command {
            Commands::Update { id, fields } => {
                assert_eq!(id, "65a1f0c2e4b0a1b2c3d4e5f6");
                assert_eq!(fields.status.as_deref(), Some("done"));
                assert_eq!(fields.fields, vec!["qty=3".to_string()]);
            }
            _ => panic!("expected update"),
        }
    }
}
