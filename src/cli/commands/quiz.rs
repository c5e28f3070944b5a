//! Quiz command implementation.
//!
//! Generates questions on first run (at-most-once per document), then
//! runs the quiz interactively and records the result.

use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::generate::GenerationOutcome;
use crate::orchestrator::Orchestrator;
use crate::study::QuizQuestion;
use anyhow::Result;
use console::style;
use std::io::{self, BufRead, Write};

const OPTION_LABELS: [char; 4] = ['a', 'b', 'c', 'd'];

/// Run the quiz command.
pub async fn run_quiz(
    document: &str,
    regenerate: bool,
    user: Option<&str>,
    settings: Settings,
) -> Result<()> {
    let owner = settings.resolve_principal(user)?;
    let orchestrator = Orchestrator::new(settings.clone())?;
    let store = orchestrator.sqlite_store();

    if regenerate {
        let cleared = orchestrator.clear_quiz_questions(document)?;
        if cleared > 0 {
            Output::info(&format!("Cleared {} existing questions.", cleared));
        }
    }

    // Generate when no questions exist yet; existing records short-circuit
    if store.quiz_question_count(document)? == 0 {
        if let Err(e) = preflight::check(Operation::Generate, &settings) {
            Output::error(&format!("{}", e));
            Output::info("Run 'terp doctor' for detailed diagnostics.");
            return Err(e.into());
        }

        let spinner = Output::spinner("Generating quiz...");
        let outcome = orchestrator.generate_quiz(document, &owner).await;
        spinner.finish_and_clear();

        match outcome {
            Ok(GenerationOutcome::Generated(count)) => {
                Output::success(&format!("Generated {} questions.", count));
            }
            Ok(GenerationOutcome::SkippedExisting) => {}
            Err(e) => {
                Output::error(&format!("Quiz generation failed: {}", e));
                return Err(e.into());
            }
        }
    }

    let questions = store.quiz_questions_by_file_id(document)?;
    if questions.is_empty() {
        Output::warning("No quiz questions available.");
        return Ok(());
    }

    let score = take_quiz(document, &questions)?;

    let result = orchestrator.record_quiz_result(document, &owner, score, questions.len() as u32)?;

    println!();
    Output::success(&format!(
        "Score: {}/{} ({:.0}%)",
        result.score, result.total_questions, result.percentage
    ));
    Output::info("See your progress with 'terp stats'.");

    Ok(())
}

/// Run through the questions interactively, returning the score.
fn take_quiz(document: &str, questions: &[QuizQuestion]) -> Result<u32> {
    println!(
        "\n{}",
        style(format!("Quiz - {} ({} questions)", document, questions.len()))
            .bold()
            .cyan()
    );
    println!("{}\n", style("Answer with a, b, c, or d.").dim());

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut score = 0u32;

    for (i, question) in questions.iter().enumerate() {
        println!(
            "{} {}",
            style(format!("Q{}:", i + 1)).bold(),
            question.question
        );
        for (label, option) in OPTION_LABELS.iter().zip(question.options.iter()) {
            println!("  {}) {}", label, option);
        }

        let answer = loop {
            print!("{} ", style("Your answer:").green().bold());
            stdout.flush()?;

            let mut input = String::new();
            stdin.lock().read_line(&mut input)?;

            let input = input.trim().to_lowercase();
            let choice = input
                .chars()
                .next()
                .and_then(|c| OPTION_LABELS.iter().position(|&l| l == c));
            match choice {
                Some(index) => break index as u8,
                None => Output::warning("Please answer with a, b, c, or d."),
            }
        };

        if answer == question.correct_answer {
            score += 1;
            println!("{}", style("Correct!").green().bold());
        } else {
            let correct_label = OPTION_LABELS[question.correct_answer as usize];
            println!(
                "{} The answer was {}) {}",
                style("Not quite.").red().bold(),
                correct_label,
                question.options[question.correct_answer as usize]
            );
        }
        println!("  {}\n", style(&question.explanation).dim());
    }

    Ok(score)
}
