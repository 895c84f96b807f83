use std::path::PathBuf;

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::{
    models::{QuestionImage, Subject},
    presentation::{render_analysis, render_history, render_vocabulary},
    session::SubmitOutcome,
    AppState,
};

#[derive(Parser, Debug)]
#[command(name = "study-lens", version, about = "Diagnose exam mistakes and drill vocabulary")]
pub struct Cli {
    /// Keep history in memory only for this run.
    #[arg(long, global = true)]
    pub ephemeral: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Analyse a question from text, a photo, or both.
    Analyze {
        #[arg(long, default_value = "math")]
        subject: Subject,
        #[arg(long)]
        text: Option<String>,
        #[arg(long)]
        image: Option<PathBuf>,
        #[arg(long)]
        reveal_steps: bool,
        #[arg(long)]
        reveal_answer: bool,
    },
    /// Generate vocabulary flashcards for a topic.
    Vocab {
        topic: String,
        /// Show every definition.
        #[arg(long)]
        reveal: bool,
        /// Flip cards one at a time from the keyboard.
        #[arg(long)]
        interactive: bool,
    },
    /// Browse or edit saved analyses.
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum HistoryAction {
    List,
    Show {
        id: String,
        #[arg(long)]
        reveal_steps: bool,
        #[arg(long)]
        reveal_answer: bool,
    },
    Delete {
        id: String,
    },
    Clear {
        /// Required; clearing cannot be undone.
        #[arg(long)]
        yes: bool,
    },
}

pub async fn dispatch(state: &AppState, command: Command) -> Result<()> {
    match command {
        Command::Analyze {
            subject,
            text,
            image,
            reveal_steps,
            reveal_answer,
        } => {
            let image = image
                .as_deref()
                .map(QuestionImage::from_path)
                .transpose()?;
            analyze(state, subject, text.unwrap_or_default(), image, reveal_steps, reveal_answer)
                .await
        }
        Command::Vocab {
            topic,
            reveal,
            interactive,
        } => vocab(state, &topic, reveal, interactive).await,
        Command::History { action } => history(state, action).await,
    }
}

async fn analyze(
    state: &AppState,
    subject: Subject,
    text: String,
    image: Option<QuestionImage>,
    reveal_steps: bool,
    reveal_answer: bool,
) -> Result<()> {
    let session = &state.analysis;
    session.select_subject(subject).await;

    let record = match session.submit(&text, image).await {
        SubmitOutcome::Succeeded(record) => record,
        SubmitOutcome::Failed(message) => return Err(anyhow!(message)),
        SubmitOutcome::Rejected => {
            return Err(anyhow!("Nothing to analyse: pass --text, --image, or both"))
        }
        SubmitOutcome::Superseded => return Err(anyhow!("The analysis was superseded")),
    };

    if reveal_steps {
        session.toggle_steps().await;
    }
    if reveal_answer {
        session.toggle_answer().await;
    }
    let view = session.snapshot().await;
    print!("{}", render_analysis(&record.result, view.reveal));
    println!();
    println!("Saved to history as {}", record.id);
    Ok(())
}

async fn vocab(state: &AppState, topic: &str, reveal: bool, interactive: bool) -> Result<()> {
    let session = &state.vocabulary;
    let result = match session.submit(topic).await {
        SubmitOutcome::Succeeded(result) => result,
        SubmitOutcome::Failed(message) => return Err(anyhow!(message)),
        SubmitOutcome::Rejected => return Err(anyhow!("Topic must not be empty")),
        SubmitOutcome::Superseded => return Err(anyhow!("The request was superseded")),
    };

    let mut cards = if reveal {
        session.toggle_all().await
    } else {
        session.snapshot().await.reveal
    };
    print!("{}", render_vocabulary(&result, &cards));

    if !interactive {
        return Ok(());
    }

    println!();
    println!("Card number to flip, 'a' to flip all, 'q' to quit.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let input = line.trim();
        cards = match input {
            "q" | "quit" => break,
            "a" | "all" => session.toggle_all().await,
            other => match other.parse::<usize>() {
                Ok(number) if number >= 1 => session.toggle(number - 1).await,
                _ => {
                    println!("Unrecognised input '{other}'");
                    continue;
                }
            },
        };
        print!("{}", render_vocabulary(&result, &cards));
    }
    Ok(())
}

async fn history(state: &AppState, action: HistoryAction) -> Result<()> {
    match action {
        HistoryAction::List => {
            print!("{}", render_history(&state.history.records()));
        }
        HistoryAction::Show {
            id,
            reveal_steps,
            reveal_answer,
        } => {
            let record = state
                .analysis
                .load_record(&id)
                .await
                .ok_or_else(|| anyhow!("No saved analysis with id {id}"))?;
            if reveal_steps {
                state.analysis.toggle_steps().await;
            }
            if reveal_answer {
                state.analysis.toggle_answer().await;
            }
            let view = state.analysis.snapshot().await;

            println!(
                "{}  {}  {}",
                record.id,
                record.timestamp.format("%Y-%m-%d %H:%M"),
                record.subject.label()
            );
            if !record.question_text.trim().is_empty() {
                println!("Question: {}", record.question_text.trim());
            }
            if let Some(image) = &record.question_image {
                println!("Photo: {} ({} bytes)", image.mime_type(), image.decoded_len());
            }
            println!();
            print!("{}", render_analysis(&record.result, view.reveal));
        }
        HistoryAction::Delete { id } => {
            if state.history.remove(&id) {
                println!("Deleted {id}");
            } else {
                println!("No saved analysis with id {id}");
            }
        }
        HistoryAction::Clear { yes } => {
            if !yes {
                return Err(anyhow!("Refusing to clear history without --yes"));
            }
            let count = state.history.len();
            state.history.clear();
            println!("Cleared {count} saved analyses");
        }
    }
    Ok(())
}
