use anyhow::Error;
use colored::*;

use crate::agents::AgentError;
use crate::gemini::GeminiError;

pub fn display_welcome() {
    println!("{}", "🤖 AI Financial Analyst Agents".bright_blue().bold());
    println!(
        "{}",
        "Give it a stock ticker (e.g., TATASTEEL.NS, RELIANCE.NS) and the crew will analyze it."
            .blue()
    );
    println!(
        "{}",
        "Make sure to set the GEMINI_API_KEY environment variable.\n".blue()
    );
}

pub fn display_run_start(ticker: &str) {
    println!(
        "{}",
        format!(
            "🚀 Analyzing {} — the crew is researching (this can take 30-40 seconds)...",
            ticker
        )
        .blue()
        .italic()
    );
}

pub fn display_result(result: &str) {
    println!("\n{}", "✅ Analysis Complete!".bright_green().bold());
    println!(
        "{}",
        "┌─────────────────────────────────────────────────────────────".green()
    );
    for line in result.lines() {
        println!("{} {}", "│".green(), line.white());
    }
    println!(
        "{}",
        "└─────────────────────────────────────────────────────────────".green()
    );
}

pub fn display_error(error: &Error) {
    if let Some(gemini_error) = error.downcast_ref::<GeminiError>() {
        display_gemini_error(gemini_error);
        return;
    }
    if let Some(AgentError::Llm(gemini_error)) = error.downcast_ref::<AgentError>() {
        display_gemini_error(gemini_error);
        return;
    }
    println!(
        "\n{} {}",
        "❌ An error occurred:".bright_red().bold(),
        error.to_string().red()
    );
}

fn display_gemini_error(error: &GeminiError) {
    println!("\n{}", error.user_message().bright_red().bold());
}
