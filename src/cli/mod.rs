use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[value(alias = "google", alias = "googleai")]
    Gemini,
    #[value(alias = "openai")]
    OpenAI,
    Anthropic,
    Ollama,
}

#[derive(Parser, Debug)]
#[command(name = "codecalc", version, about = "Generate Android code, project scaffolds and app prompts; compare and merge code")]
pub struct Args {
    /// Config file (default: ./codecalc.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(long, value_enum, global = true)]
    pub provider: Option<ProviderKind>,

    #[arg(long, global = true)]
    pub model: Option<String>,

    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,

    /// Attempts per model call; 1 means no retries
    #[arg(long, global = true)]
    pub max_attempts: Option<u32>,

    /// Write request and raw reply of every call under <root>/.codecalc/tx/
    #[arg(long, default_value_t = false, global = true)]
    pub save_artifacts: bool,

    #[arg(long, default_value_t = false, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate Java + XML for a feature, or a full project with --full-project
    Code(CodeArgs),
    /// Turn a rough idea or code snippet into a structured app prompt
    Prompt(PromptArgs),
    /// Show a character diff of two sources and optionally merge them
    Compare(CompareArgs),
}

#[derive(ClapArgs, Debug)]
pub struct CodeArgs {
    pub description: String,

    #[arg(long, default_value_t = false)]
    pub full_project: bool,

    /// Copy the generated code to the clipboard
    #[arg(long, default_value_t = false)]
    pub copy: bool,

    /// Fail when the project repeats a file name instead of warning
    #[arg(long, default_value_t = false)]
    pub strict: bool,
}

#[derive(ClapArgs, Debug)]
pub struct PromptArgs {
    pub input: String,

    #[arg(long, default_value_t = false)]
    pub copy: bool,
}

#[derive(ClapArgs, Debug)]
pub struct CompareArgs {
    /// Original source file ("-" reads stdin)
    pub original: String,

    /// Duplicate source file
    pub duplicate: String,

    /// Treat both positional arguments as pasted text instead of paths
    #[arg(long, default_value_t = false)]
    pub paste: bool,

    /// Accepted extensions / MIME types, e.g. ".java,.xml,text/plain"
    #[arg(long)]
    pub accept: Option<String>,

    /// Ask the model to merge the two versions after showing the diff
    #[arg(long, default_value_t = false)]
    pub merge: bool,

    #[arg(long, default_value_t = false)]
    pub copy: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_project_flag() {
        let a = Args::try_parse_from(["codecalc", "code", "simple calculator", "--full-project"]).unwrap();
        match a.command {
            Command::Code(c) => {
                assert!(c.full_project);
                assert_eq!(c.description, "simple calculator");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let a = Args::try_parse_from([
            "codecalc", "compare", "A.java", "B.java", "--merge", "--provider", "ollama", "--max-attempts", "3",
        ])
        .unwrap();
        assert_eq!(a.provider, Some(ProviderKind::Ollama));
        assert_eq!(a.max_attempts, Some(3));
        assert!(matches!(a.command, Command::Compare(CompareArgs { merge: true, .. })));
    }

    #[test]
    fn provider_aliases() {
        let a = Args::try_parse_from(["codecalc", "--provider", "google", "prompt", "todo app"]).unwrap();
        assert_eq!(a.provider, Some(ProviderKind::Gemini));
    }
}
