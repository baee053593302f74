//! Prompt template loading and rendering via `minijinja`.
//!
//! Every call site has a user template named after its stem
//! (`translate_action.j2`) and, for most sites, a system template
//! (`translate_action.system.j2`). Shared rules live under `rules/` and are
//! pulled in with `{% include %}`. The built-in set is compiled into the
//! binary; a templates directory may override any of them file by file, so
//! operators can tune prompts without recompiling.

use std::path::Path;

use gridworld_core::oracle::CallSite;
use minijinja::{AutoEscape, Environment};

use crate::error::LlmError;

/// Built-in templates, keyed by template name.
const BUILTIN_TEMPLATES: &[(&str, &str)] = &[
    ("rules/single_agent.j2", include_str!("../templates/rules/single_agent.j2")),
    ("rules/movement.j2", include_str!("../templates/rules/movement.j2")),
    ("rules/agent_cells.j2", include_str!("../templates/rules/agent_cells.j2")),
    ("rules/change_format.j2", include_str!("../templates/rules/change_format.j2")),
    ("agent_action.j2", include_str!("../templates/agent_action.j2")),
    ("agent_action.system.j2", include_str!("../templates/agent_action.system.j2")),
    ("translate_action.j2", include_str!("../templates/translate_action.j2")),
    ("environmental.j2", include_str!("../templates/environmental.j2")),
    ("adjudicate.j2", include_str!("../templates/adjudicate.j2")),
    ("adjudicate.system.j2", include_str!("../templates/adjudicate.system.j2")),
    ("resolve_agents.j2", include_str!("../templates/resolve_agents.j2")),
    ("resolve_agents.system.j2", include_str!("../templates/resolve_agents.system.j2")),
    ("summarize.j2", include_str!("../templates/summarize.j2")),
    ("story.j2", include_str!("../templates/story.j2")),
    ("story.system.j2", include_str!("../templates/story.system.j2")),
    ("scenario.j2", include_str!("../templates/scenario.j2")),
    ("scenario.system.j2", include_str!("../templates/scenario.system.j2")),
];

/// The complete rendered prompt ready to send to an LLM backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPrompt {
    /// System message, when the call site has one.
    pub system: Option<String>,
    /// User message.
    pub user: String,
}

/// Manages prompt template loading and rendering.
pub struct PromptEngine {
    env: Environment<'static>,
}

impl PromptEngine {
    /// Create an engine with only the built-in templates.
    pub fn builtin() -> Result<Self, LlmError> {
        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::None);
        for &(name, source) in BUILTIN_TEMPLATES {
            env.add_template(name, source)
                .map_err(|e| LlmError::Template(format!("failed to add {name}: {e}")))?;
        }
        Ok(Self { env })
    }

    /// Create an engine whose built-ins are overridden by any same-named
    /// file under `templates_dir`.
    ///
    /// Files the directory does not contain keep their built-in version.
    pub fn with_overrides(templates_dir: &Path) -> Result<Self, LlmError> {
        if !templates_dir.is_dir() {
            return Err(LlmError::Template(format!(
                "templates directory {} does not exist",
                templates_dir.display()
            )));
        }
        let mut engine = Self::builtin()?;
        for &(name, _) in BUILTIN_TEMPLATES {
            let path = templates_dir.join(name);
            if !path.is_file() {
                continue;
            }
            let source = std::fs::read_to_string(&path)
                .map_err(|e| LlmError::Template(format!("failed to read {}: {e}", path.display())))?;
            engine
                .env
                .add_template_owned(name, source)
                .map_err(|e| LlmError::Template(format!("failed to add {name}: {e}")))?;
            tracing::debug!(
                template = name,
                path = %path.display(),
                "prompt template overridden"
            );
        }
        Ok(engine)
    }

    /// Render the prompt for `site` from its request context.
    pub fn render(
        &self,
        site: CallSite,
        context: &serde_json::Value,
    ) -> Result<RenderedPrompt, LlmError> {
        let user_name = format!("{}.j2", site.as_str());
        let user = self
            .env
            .get_template(&user_name)
            .map_err(|e| LlmError::Template(format!("missing {user_name}: {e}")))?
            .render(context)
            .map_err(|e| LlmError::Render(format!("{user_name}: {e}")))?;

        let system_name = format!("{}.system.j2", site.as_str());
        let system = match self.env.get_template(&system_name) {
            Ok(template) => Some(
                template
                    .render(context)
                    .map_err(|e| LlmError::Render(format!("{system_name}: {e}")))?,
            ),
            Err(_) => None,
        };

        Ok(RenderedPrompt {
            system,
            user: user.trim().to_owned(),
        })
    }
}
