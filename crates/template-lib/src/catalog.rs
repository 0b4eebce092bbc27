//! Preloaded workload template catalog
//!
//! The catalog is a YAML list of template descriptors. Small templates are
//! resolved by reading their JSON form document; large ones are returned as
//! descriptors so the backend can load them from `filepath` itself.

use crate::codec::{self, TemplateResponse};
use crate::error::{Result, TemplateError};
use crate::models::PreloadedTemplate;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct TemplateCatalog {
    templates: Vec<PreloadedTemplate>,
    /// Relative template file paths are resolved against this directory
    base_dir: Option<PathBuf>,
}

impl TemplateCatalog {
    pub fn new(templates: Vec<PreloadedTemplate>) -> Self {
        Self {
            templates,
            base_dir: None,
        }
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let templates: Vec<PreloadedTemplate> = serde_yaml::from_str(text)?;
        Ok(Self::new(templates))
    }

    /// Load a catalog file; relative template paths resolve against its directory
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let mut catalog = Self::from_yaml_str(&text)?;
        catalog.base_dir = path.parent().map(Path::to_path_buf);

        debug!(
            path = %path.display(),
            templates = catalog.templates.len(),
            "Loaded template catalog"
        );
        Ok(catalog)
    }

    pub fn list(&self) -> &[PreloadedTemplate] {
        &self.templates
    }

    pub fn get(&self, key: &str) -> Option<&PreloadedTemplate> {
        self.templates.iter().find(|t| t.key == key)
    }

    /// Resolve a key to the response the backend would send for it
    pub fn resolve(&self, key: &str) -> Result<TemplateResponse> {
        let descriptor = self
            .get(key)
            .ok_or_else(|| TemplateError::UnknownTemplate(key.to_string()))?;

        if descriptor.large {
            return Ok(TemplateResponse::PreloadedTemplate(descriptor.clone()));
        }

        let path = self.template_path(descriptor);
        let text = std::fs::read_to_string(&path)?;
        let form = codec::import_form_json(&text)?;

        debug!(
            key = %key,
            path = %path.display(),
            sessions = form.sessions.len(),
            "Resolved inline template"
        );
        Ok(TemplateResponse::Template(form))
    }

    fn template_path(&self, descriptor: &PreloadedTemplate) -> PathBuf {
        let path = Path::new(&descriptor.filepath);
        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::WorkloadTemplate;
    use std::fs;
    use tempfile::TempDir;

    const CATALOG: &str = r#"
- display_name: Small Demo
  key: small
  filepath: small.json
  num_sessions: 1
  num_training_events: 1
- display_name: Production Trace
  key: trace
  filepath: /srv/templates/trace.json
  num_sessions: 4000
  num_training_events: 120000
  large: true
"#;

    #[test]
    fn test_parse_catalog() {
        let catalog = TemplateCatalog::from_yaml_str(CATALOG).unwrap();

        assert_eq!(catalog.list().len(), 2);
        assert!(!catalog.get("small").unwrap().large);
        assert!(catalog.get("trace").unwrap().large);
        assert!(catalog.get("missing").is_none());
    }

    #[test]
    fn test_resolve_unknown_key() {
        let catalog = TemplateCatalog::from_yaml_str(CATALOG).unwrap();
        assert!(matches!(
            catalog.resolve("missing"),
            Err(TemplateError::UnknownTemplate(k)) if k == "missing"
        ));
    }

    #[test]
    fn test_resolve_large_returns_descriptor() {
        let catalog = TemplateCatalog::from_yaml_str(CATALOG).unwrap();
        match catalog.resolve("trace").unwrap() {
            TemplateResponse::PreloadedTemplate(t) => {
                assert_eq!(t.filepath, "/srv/templates/trace.json")
            }
            other => panic!("unexpected response: {:?}", other),
        }
    }

    #[test]
    fn test_resolve_small_reads_form_relative_to_catalog() {
        let dir = TempDir::new().unwrap();
        let mut form = WorkloadTemplate::default();
        form.workload_title = "small-demo".to_string();
        fs::write(
            dir.path().join("small.json"),
            codec::export_form_json(&form).unwrap(),
        )
        .unwrap();
        let catalog_path = dir.path().join("catalog.yaml");
        fs::write(&catalog_path, CATALOG).unwrap();

        let catalog = TemplateCatalog::from_yaml_file(&catalog_path).unwrap();
        match catalog.resolve("small").unwrap() {
            TemplateResponse::Template(t) => assert_eq!(t, form),
            other => panic!("unexpected response: {:?}", other),
        }
    }

    #[test]
    fn test_malformed_catalog() {
        assert!(matches!(
            TemplateCatalog::from_yaml_str("- key: [unterminated"),
            Err(TemplateError::Yaml(_))
        ));
    }
}
