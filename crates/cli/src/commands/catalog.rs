//! Preloaded template catalog commands

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tabled::Tabled;
use template_lib::{PreloadedTemplate, TemplateCatalog, TemplateResponse};

use crate::client::ApiClient;
use crate::output::{print_success, print_table, OutputFormat};

/// Where template descriptors and documents come from
pub enum TemplateSource {
    /// A catalog YAML on disk
    Local(TemplateCatalog),
    /// The backend's template endpoint
    Remote(ApiClient),
}

impl TemplateSource {
    /// Use the local catalog when one is configured, otherwise the backend
    pub fn new(catalog: Option<&Path>, api_url: &str, token: Option<String>) -> Result<Self> {
        match catalog {
            Some(path) => {
                let catalog = TemplateCatalog::from_yaml_file(path).with_context(|| {
                    format!("Failed to load template catalog {}", path.display())
                })?;
                Ok(Self::Local(catalog))
            }
            None => Ok(Self::Remote(ApiClient::new(api_url, token)?)),
        }
    }

    pub async fn list(&self) -> Result<Vec<PreloadedTemplate>> {
        match self {
            Self::Local(catalog) => Ok(catalog.list().to_vec()),
            Self::Remote(client) => client.list_templates().await,
        }
    }

    /// Look up the descriptor for `key`
    pub async fn descriptor(&self, key: &str) -> Result<PreloadedTemplate> {
        self.list()
            .await?
            .into_iter()
            .find(|t| t.key == key)
            .with_context(|| format!("Unknown workload template '{}'", key))
    }

    /// Fetch the template document for `key`
    pub async fn resolve(&self, key: &str) -> Result<TemplateResponse> {
        match self {
            Self::Local(catalog) => catalog
                .resolve(key)
                .with_context(|| format!("Failed to resolve template '{}'", key)),
            Self::Remote(client) => client.fetch_template(key).await,
        }
    }
}

/// Row for the template catalog table
#[derive(Tabled, serde::Serialize)]
struct TemplateRow {
    #[tabled(rename = "Key")]
    key: String,
    #[tabled(rename = "Name")]
    display_name: String,
    #[tabled(rename = "Sessions")]
    num_sessions: u64,
    #[tabled(rename = "Trainings")]
    num_training_events: u64,
    #[tabled(rename = "Large")]
    large: bool,
    #[tabled(rename = "File")]
    filepath: String,
}

impl From<PreloadedTemplate> for TemplateRow {
    fn from(t: PreloadedTemplate) -> Self {
        Self {
            key: t.key,
            display_name: t.display_name,
            num_sessions: t.num_sessions,
            num_training_events: t.num_training_events,
            large: t.large,
            filepath: t.filepath,
        }
    }
}

/// List the preloaded templates
pub async fn list_templates(source: &TemplateSource, format: OutputFormat) -> Result<()> {
    let rows: Vec<TemplateRow> = source.list().await?.into_iter().map(Into::into).collect();
    print_table(&rows, format);
    Ok(())
}

/// Fetch one template document and print or save it
pub async fn fetch_template(
    source: &TemplateSource,
    key: &str,
    output: Option<PathBuf>,
) -> Result<()> {
    let response = source.resolve(key).await?;
    let json = serde_json::to_string_pretty(&response)?;

    match output {
        Some(path) => {
            std::fs::write(&path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            print_success(&format!("Saved template '{}' to {}", key, path.display()));
        }
        None => println!("{}", json),
    }

    Ok(())
}
