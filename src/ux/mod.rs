use colored::Colorize;
use humansize::{format_size, DECIMAL};
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

use crate::diff::{self, DiffStats};
use crate::ingest::Source;
use crate::session::Notice;
use crate::wire::{
    AppPromptOutput, DiffSegment, FullProjectOutput, GenerateCodeOutput, MergeCodeOutput,
};

pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn header(title: &str) {
    println!("\n{}", format!("━━━━━━━━━━━━ {title} ━━━━━━━━━━━━").bold());
}

fn code_block(title: &str, language: &str, code: &str) {
    println!("{} {}", title.bold(), format!("({language})").dimmed());
    println!("{}", "```".dimmed());
    println!("{}", code.trim_end());
    println!("{}", "```".dimmed());
}

pub fn show_code(out: &GenerateCodeOutput) {
    header("Generated Code");
    code_block("Java Code", "java", &out.java_code);
    println!();
    code_block("XML Layout Code", "xml", &out.xml_code);
}

pub fn show_project(out: &FullProjectOutput) {
    header(&format!("Project: {}", out.project_name));
    println!("{}", out.project_tree.trim_end());
    for s in &out.sections {
        println!("\n{}", s.file_name.green().bold());
        println!("{}", s.explanation.italic());
        code_block("Code", &s.language, &s.code);
    }
}

pub fn show_app_prompt(out: &AppPromptOutput) {
    header("App Prompt");
    let sections: [(&str, String); 6] = [
        ("App Blueprint", out.app_blueprint.clone()),
        ("Key Features", format!("- {}", out.key_features.join("\n- "))),
        ("Target User Persona", out.target_user_persona.clone()),
        ("Style Guidelines", out.style_guideline.clone()),
        ("Layout Description", out.layout_description.clone()),
        ("Full App Description", out.full_app_description.clone()),
    ];
    for (title, body) in sections {
        println!("\n{}", title.cyan().bold());
        println!("{}", body.trim_end());
    }
}

pub fn show_merge(out: &MergeCodeOutput) {
    header("Merged Code");
    println!("{}", out.explanation.italic());
    code_block("Result", "auto", &out.merged_code);
}

pub fn show_sources(original: &Source, duplicate: &Source) {
    println!(
        "{} {} ({})   {} {} ({})",
        "Original:".bold(),
        original.source_name,
        format_size(original.bytes, DECIMAL),
        "Duplicate:".bold(),
        duplicate.source_name,
        format_size(duplicate.bytes, DECIMAL),
    );
}

/// Inline rendering: added text green, removed text red and struck through.
pub fn render_diff(segments: &[DiffSegment]) -> String {
    segments
        .iter()
        .map(|s| {
            if s.added {
                s.value.green().to_string()
            } else if s.removed {
                s.value.red().strikethrough().to_string()
            } else {
                s.value.normal().to_string()
            }
        })
        .collect()
}

pub fn show_diff(segments: &[DiffSegment]) {
    header("Code Comparison");
    let DiffStats { unchanged, added, removed } = diff::stats(segments);
    println!(
        "  {}: {}   {}: {}   {}: {}",
        "Unchanged".bold(),
        unchanged,
        "Added".green().bold(),
        added,
        "Removed".red().bold(),
        removed
    );
    println!();
    if segments.iter().all(DiffSegment::is_unchanged) {
        println!("{}", "(no differences)".dimmed());
    }
    println!("{}", render_diff(segments));
}

pub fn error_banner(msg: &str) {
    eprintln!("{} {}", " Error ".on_red().white().bold(), msg);
}

pub fn print_notice(n: &Notice) {
    match n {
        Notice::Success(m) => eprintln!("{} {}", "✔".green(), m),
        Notice::Failure(m) => eprintln!("{} {}", "✖".red(), m),
        Notice::Copied(id) => eprintln!("{} copied {}", "📋".normal(), id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_keeps_every_character() {
        colored::control::set_override(false);
        let segs = vec![
            DiffSegment::unchanged("int x"),
            DiffSegment::removed("="),
            DiffSegment::added(" = "),
            DiffSegment::unchanged("1;"),
        ];
        assert_eq!(render_diff(&segs), "int x= = 1;");
    }
}
