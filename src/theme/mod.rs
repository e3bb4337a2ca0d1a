//! Theme engine
//!
//! Template rendering via Tera. A theme is a directory of `.html`
//! templates under the configured themes path; every template in the
//! active theme is loaded at startup with inheritance chains resolved
//! (base templates first).

use anyhow::{Context, Result};
use std::error::Error as StdError;
use std::fs;
use std::path::{Path, PathBuf};
use tera::{Context as TeraContext, Tera};

mod error;

pub use error::ThemeError;

/// Theme engine for rendering templates
pub struct ThemeEngine {
    tera: Tera,
    current_theme: String,
}

impl ThemeEngine {
    /// Load the named theme from the themes directory.
    pub fn new(themes_path: &Path, theme: &str) -> Result<Self> {
        let theme_path = themes_path.join(theme);
        if !theme_path.exists() {
            return Err(ThemeError::NotFound(theme.to_string()).into());
        }

        let mut templates: Vec<(String, String)> = Vec::new();
        collect_templates(&theme_path, &theme_path, &mut templates)?;

        // Base templates have to be registered before templates that
        // extend them.
        templates.sort_by(|a, b| {
            let a_is_base = a.0 == "base.html" || a.0.ends_with("/base.html");
            let b_is_base = b.0 == "base.html" || b.0.ends_with("/base.html");
            b_is_base.cmp(&a_is_base)
        });

        let mut tera = Tera::default();
        for (name, content) in templates {
            tera.add_raw_template(&name, &content).map_err(|e| {
                ThemeError::TemplateError(format!("Failed to add template {}: {}", name, e))
            })?;
        }
        tera.build_inheritance_chains().map_err(|e| {
            ThemeError::TemplateError(format!("Failed to build template inheritance: {}", e))
        })?;

        Ok(Self {
            tera,
            current_theme: theme.to_string(),
        })
    }

    /// Render a template with the given context.
    pub fn render(&self, template: &str, context: &TeraContext) -> Result<String> {
        self.tera.render(template, context).map_err(|e| {
            let mut error_msg = format!("Failed to render '{}': {}", template, e);
            let mut source = e.source();
            while let Some(s) = source {
                error_msg.push_str(&format!("\n  Caused by: {}", s));
                source = s.source();
            }
            ThemeError::TemplateError(error_msg).into()
        })
    }

    /// Render a template, falling back to a plain HTML error page when
    /// rendering fails. Handlers use this so a broken template degrades
    /// to a 500 body instead of a panic.
    pub fn render_with_fallback(&self, template: &str, context: &TeraContext) -> String {
        match self.render(template, context) {
            Ok(html) => html,
            Err(e) => {
                tracing::warn!("Failed to render template '{}': {}", template, e);
                simple_error_page(template, &e.to_string())
            }
        }
    }

    /// Get the active theme name
    pub fn current_theme(&self) -> &str {
        &self.current_theme
    }
}

/// Recursively collect `.html` templates with theme-relative names.
fn collect_templates(
    base_path: &Path,
    current_path: &Path,
    templates: &mut Vec<(String, String)>,
) -> Result<()> {
    for entry in fs::read_dir(current_path)
        .with_context(|| format!("Failed to read theme directory: {:?}", current_path))?
    {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            collect_templates(base_path, &path, templates)?;
        } else if path.extension().map_or(false, |ext| ext == "html") {
            let relative: PathBuf = path
                .strip_prefix(base_path)
                .map_err(|_| ThemeError::TemplateError("Failed to get relative path".to_string()))?
                .to_path_buf();
            let name = relative.to_string_lossy().replace('\\', "/");
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read template: {:?}", path))?;
            templates.push((name, content));
        }
    }
    Ok(())
}

/// Minimal HTML error page used when a template fails to render.
fn simple_error_page(template: &str, error: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="UTF-8"><title>Template Error</title></head>
<body>
    <h1>Template Error</h1>
    <p>Failed to render template: <code>{}</code></p>
    <pre>{}</pre>
</body>
</html>"#,
        template, error
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_theme(dir: &Path, files: &[(&str, &str)]) {
        for (name, content) in files {
            let path = dir.join(name);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }
    }

    #[test]
    fn renders_template_with_inheritance() {
        let temp = tempfile::tempdir().unwrap();
        let theme_dir = temp.path().join("plain");
        write_theme(
            &theme_dir,
            &[
                ("base.html", "<title>{% block title %}{% endblock %}</title>"),
                (
                    "index.html",
                    "{% extends \"base.html\" %}{% block title %}{{ page_title }}Blog{% endblock %}",
                ),
            ],
        );

        let engine = ThemeEngine::new(temp.path(), "plain").unwrap();
        let mut ctx = TeraContext::new();
        ctx.insert("page_title", "Home - ");
        let html = engine.render("index.html", &ctx).unwrap();
        assert_eq!(html, "<title>Home - Blog</title>");
    }

    #[test]
    fn shipped_default_theme_loads_and_renders() {
        let engine = ThemeEngine::new(Path::new("themes"), "default").unwrap();
        assert_eq!(engine.current_theme(), "default");

        let mut ctx = TeraContext::new();
        ctx.insert("page_title", "Home - ");
        ctx.insert(
            "page_obj",
            &serde_json::json!({
                "posts": [],
                "number": 1,
                "total_pages": 1,
                "has_next": false,
                "has_previous": false,
                "total": 0,
            }),
        );
        let html = engine.render("index.html", &ctx).unwrap();
        assert!(html.contains("<title>Home - Folha</title>"));
        assert!(html.contains("No posts found."));
    }

    #[test]
    fn missing_theme_is_an_error() {
        let temp = tempfile::tempdir().unwrap();
        assert!(ThemeEngine::new(temp.path(), "ghost").is_err());
    }

    #[test]
    fn fallback_degrades_to_error_page() {
        let temp = tempfile::tempdir().unwrap();
        let theme_dir = temp.path().join("plain");
        write_theme(&theme_dir, &[("index.html", "{{ missing | upper }}")]);

        let engine = ThemeEngine::new(temp.path(), "plain").unwrap();
        let html = engine.render_with_fallback("index.html", &TeraContext::new());
        assert!(html.contains("Template Error"));
    }
}
