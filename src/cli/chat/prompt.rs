use rustyline::{Config, Editor, Result};

const DEFAULT_PROMPT: &str = "ask › ";

pub fn generate_prompt(custom_prompt: Option<&str>) -> String {
    custom_prompt.unwrap_or(DEFAULT_PROMPT).to_string()
}

/// Line editor for the interactive session. History is kept in memory only.
pub fn rl() -> Result<Editor<()>> {
    let config = Config::builder()
        .history_ignore_space(true)
        .history_ignore_dups(true)
        .build();
    Editor::with_config(config)
}
