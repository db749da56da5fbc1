//! `coursewise ask`: Interactive or single-message question mode.

use coursewise_agent::{CourseAssistant, Orchestrator, QueryAnswer};
use coursewise_config::AppConfig;
use coursewise_core::event::{DomainEvent, EventBus};
use coursewise_core::store::CourseStore;
use coursewise_tools::InMemoryCourseStore;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};

pub async fn run(
    message: Option<String>,
    corpus: Option<PathBuf>,
    rounds: Option<u32>,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    if let Some(rounds) = rounds {
        config.max_tool_rounds = rounds;
    }

    // Fail early with setup help when no API key is set
    if !config.has_api_key() {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    ANTHROPIC_API_KEY=sk-ant-...   (recommended)");
        eprintln!("    COURSEWISE_API_KEY=sk-ant-...  (generic)");
        eprintln!();
        eprintln!("  Or add it to your config file:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    let provider = coursewise_providers::build_from_config(&config)?;

    let store: Arc<dyn CourseStore> = match &corpus {
        Some(path) => Arc::new(InMemoryCourseStore::load(path, config.max_results).await?),
        None => {
            tracing::warn!("No corpus given (--corpus); course searches will find nothing");
            Arc::new(InMemoryCourseStore::new(config.max_results))
        }
    };
    let tools = Arc::new(coursewise_tools::default_registry(store));

    let bus = Arc::new(EventBus::default());
    spawn_progress_printer(&bus);

    let orchestrator = Orchestrator::new(provider, config.model.clone())
        .with_temperature(config.temperature)
        .with_max_tokens(config.max_tokens)
        .with_event_bus(bus);
    let assistant = CourseAssistant::new(orchestrator, tools, config.max_history)
        .with_max_tool_rounds(config.max_tool_rounds);

    if let Some(msg) = message {
        // Single message mode
        eprint!("  Thinking...");
        let answer = assistant.query(&msg, None).await;
        eprint!("\r              \r");
        let answer = answer?;
        println!("{}", render_answer(&answer));
        if verbose {
            eprintln!("{}", render_summary(&answer));
        }
        return Ok(());
    }

    // Interactive mode
    println!();
    println!("  Coursewise Interactive Mode");
    println!();
    println!("  Model:     {}", config.model);
    println!("  Rounds:    {}", config.max_tool_rounds);
    println!(
        "  Corpus:    {}",
        corpus
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none)".into())
    );
    println!();
    println!("  Type your question and press Enter.");
    println!("  Type 'exit' or Ctrl+C to quit.");
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut session_id: Option<String> = None;

    prompt()?;
    while let Some(line) = lines.next_line().await? {
        let question = line.trim();
        if question.is_empty() {
            prompt()?;
            continue;
        }
        if matches!(question, "exit" | "quit") {
            break;
        }

        match assistant.query(question, session_id.as_deref()).await {
            Ok(answer) => {
                println!();
                for line in render_answer(&answer).lines() {
                    println!("  Assistant > {line}");
                }
                println!();
                if verbose {
                    eprintln!("{}", render_summary(&answer));
                }
                session_id = Some(answer.session_id);
            }
            Err(e) => {
                eprintln!("  [Error] {e}");
                println!();
            }
        }
        prompt()?;
    }

    println!();
    println!("  Goodbye!");
    println!();
    Ok(())
}

fn prompt() -> std::io::Result<()> {
    use std::io::Write;
    print!("  You > ");
    std::io::stdout().flush()
}

/// Print one line per executed search while a question is being answered.
fn spawn_progress_printer(bus: &EventBus) {
    let mut rx = bus.subscribe();
    tokio::spawn(async move {
        while let Ok(event) = rx.recv().await {
            match event.as_ref() {
                DomainEvent::ToolExecuted {
                    round,
                    tool_name,
                    success,
                    duration_ms,
                    ..
                } => {
                    let status = if *success { "ok" } else { "failed" };
                    eprintln!("\r  [round {round}] {tool_name}: {status} ({duration_ms} ms)");
                }
                DomainEvent::SynthesisStarted { rounds, .. } => {
                    eprintln!("\r  [synthesizing after {rounds} rounds]");
                }
                _ => {}
            }
        }
    });
}

/// The answer followed by a `Sources:` list when there are any.
pub fn render_answer(answer: &QueryAnswer) -> String {
    let mut out = answer.answer.clone();
    if !answer.sources.is_empty() {
        out.push_str("\n\nSources:");
        for source in &answer.sources {
            out.push_str(&format!("\n  - {source}"));
        }
    }
    out
}

fn render_summary(answer: &QueryAnswer) -> String {
    let s = &answer.summary;
    format!(
        "  [{:?}] rounds={} calls={} ok={} failed={} time={:?}",
        answer.exit, s.total_rounds, s.total_calls, s.successful_calls, s.failed_calls, s.total_duration
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use coursewise_agent::{RunExit, TrackerSummary};
    use std::time::Duration;

    fn answer(sources: Vec<&str>) -> QueryAnswer {
        QueryAnswer {
            answer: "MCP is a protocol.".into(),
            sources: sources.into_iter().map(String::from).collect(),
            session_id: "session_1".into(),
            exit: RunExit::Synthesized,
            summary: TrackerSummary {
                total_rounds: 2,
                total_calls: 2,
                successful_calls: 1,
                failed_calls: 1,
                total_duration: Duration::from_millis(7),
                errors: vec!["Tool execution failed: boom".into()],
            },
        }
    }

    #[test]
    fn answer_without_sources_is_plain() {
        assert_eq!(render_answer(&answer(vec![])), "MCP is a protocol.");
    }

    #[test]
    fn sources_are_listed_after_answer() {
        let rendered = render_answer(&answer(vec!["Intro to MCP - Lesson 1", "Intro to MCP"]));
        assert_eq!(
            rendered,
            "MCP is a protocol.\n\nSources:\n  - Intro to MCP - Lesson 1\n  - Intro to MCP"
        );
    }

    #[test]
    fn summary_line_counts_calls() {
        let line = render_summary(&answer(vec![]));
        assert!(line.contains("Synthesized"));
        assert!(line.contains("calls=2"));
        assert!(line.contains("failed=1"));
    }
}
