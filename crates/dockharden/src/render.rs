//! Side-by-side display of the original and hardened Dockerfile.

use dockharden_common::{hash, Error, Result};
use dockharden_engine::Hardened;
use handlebars::Handlebars;
use serde::Serialize;

const TEXT_TEMPLATE_NAME: &str = "compare_text";
const HTML_TEMPLATE_NAME: &str = "compare_html";

// Triple braces: plain text output must not be HTML-escaped.
const TEXT_TEMPLATE: &str = r#"=== Original Dockerfile ({{original_digest}}) ===
{{{original}}}

=== Hardened Dockerfile ({{hardened_digest}}) ===
{{{hardened}}}

=== Changes ({{change_count}}) ===
{{#each changes}}
line {{line}}: {{description}}
{{/each}}
{{#unless changes}}
No changes were needed.
{{/unless}}
"#;

const HTML_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Hardened Dockerfile</title>
</head>
<body>
  <h1>Dockerfile hardening result</h1>
  <section>
    <h2>Original <small>{{original_digest}}</small></h2>
    <pre><code>{{original}}</code></pre>
  </section>
  <section>
    <h2>Hardened <small>{{hardened_digest}}</small></h2>
    <pre><code>{{hardened}}</code></pre>
  </section>
  <section>
    <h2>Changes ({{change_count}})</h2>
    <ul>
    {{#each changes}}
      <li>line {{line}}: {{description}}<pre><code>{{after}}</code></pre></li>
    {{/each}}
    </ul>
  </section>
</body>
</html>
"#;

/// One change as displayed.
#[derive(Debug, Serialize)]
pub struct ChangeView {
    pub line: usize,
    pub rule: String,
    pub description: String,
    pub after: String,
}

/// Template input.
#[derive(Debug, Serialize)]
pub struct ComparisonView {
    pub original: String,
    pub hardened: String,
    pub original_digest: String,
    pub hardened_digest: String,
    pub change_count: usize,
    pub changes: Vec<ChangeView>,
}

impl ComparisonView {
    pub fn new(original: &str, hardened: &Hardened) -> Self {
        let changes = hardened
            .report
            .changes
            .iter()
            .map(|change| ChangeView {
                line: change.line,
                rule: change.rule.to_string(),
                description: change.rule.description().to_string(),
                after: change.after.clone(),
            })
            .collect::<Vec<_>>();

        Self {
            original: original.to_string(),
            hardened: hardened.content.clone(),
            original_digest: hash::short_digest(original),
            hardened_digest: hash::short_digest(&hardened.content),
            change_count: changes.len(),
            changes,
        }
    }
}

pub struct Renderer {
    registry: Handlebars<'static>,
}

impl Renderer {
    pub fn new() -> Result<Self> {
        let mut registry = Handlebars::new();
        registry.set_strict_mode(true);
        registry
            .register_template_string(TEXT_TEMPLATE_NAME, TEXT_TEMPLATE)
            .map_err(|e| Error::Render(e.to_string()))?;
        registry
            .register_template_string(HTML_TEMPLATE_NAME, HTML_TEMPLATE)
            .map_err(|e| Error::Render(e.to_string()))?;
        Ok(Self { registry })
    }

    pub fn render_text(&self, view: &ComparisonView) -> Result<String> {
        self.render(TEXT_TEMPLATE_NAME, view)
    }

    pub fn render_html(&self, view: &ComparisonView) -> Result<String> {
        self.render(HTML_TEMPLATE_NAME, view)
    }

    fn render(&self, name: &str, view: &ComparisonView) -> Result<String> {
        self.registry
            .render(name, view)
            .map_err(|e| Error::Render(e.to_string()))
    }
}
