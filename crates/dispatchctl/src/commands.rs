//! Command implementations for dispatchctl.

use anyhow::{Context, Result};
use dispatch_common::{
    load_tickets, trainer, ClassificationReport, Comment, DispatchConfig, DispatchPredictor,
    Ticket,
};
use owo_colors::OwoColorize;
use std::path::PathBuf;

/// Train a model and persist the artifact.
pub fn train(
    data: Option<PathBuf>,
    model: Option<PathBuf>,
    seed: Option<u64>,
    trees: Option<usize>,
) -> Result<()> {
    let config = DispatchConfig::load();
    let data_path = data.unwrap_or(config.paths.data_file);
    let model_path = model.unwrap_or(config.paths.model_file);

    let mut params = config.training.to_train_params();
    if let Some(seed) = seed {
        params.forest.seed = seed;
    }
    if let Some(trees) = trees {
        params.forest.n_trees = trees;
    }

    println!("Loading tickets from {}...", data_path.display());
    let tickets = load_tickets(&data_path)?;
    println!("Loaded {} tickets", tickets.len());

    let outcome = trainer::train(&tickets, &params)?;

    println!("\nDispatch distribution:");
    for (label, count) in &outcome.class_counts {
        println!("  {:<12} {}", label, count);
    }
    println!(
        "\nTrained on {} tickets, evaluated on {}",
        outcome.train_size, outcome.test_size
    );
    println!("Accuracy: {:.2}%", outcome.report.accuracy * 100.0);
    println!("\n{}", outcome.report);

    outcome
        .artifact
        .save(&model_path)
        .with_context(|| format!("cannot persist model to {}", model_path.display()))?;
    println!("\nModel saved to {}", model_path.display().green());
    Ok(())
}

/// Replay historical tickets through a trained model, ticket by ticket.
pub fn evaluate(data: Option<PathBuf>, model: Option<PathBuf>) -> Result<()> {
    let config = DispatchConfig::load();
    let data_path = data.unwrap_or(config.paths.data_file);
    let model_path = model.unwrap_or(config.paths.model_file);

    let predictor = DispatchPredictor::load(&model_path)?;
    let tickets = load_tickets(&data_path)?;
    let batch = predictor.predict_batch(&tickets)?;

    let mut pairs: Vec<(&str, &str)> = Vec::new();
    for row in &batch {
        let number = row
            .number
            .map(|n| format!("#{}", n))
            .unwrap_or_else(|| "#?".to_string());
        let predicted = row.predicted.map(|t| t.as_str()).unwrap_or("<unknown>");

        match row.actual {
            Some(actual) => {
                let mark = if row.predicted == Some(actual) {
                    "✓".green().to_string()
                } else {
                    "✗".red().to_string()
                };
                println!(
                    "{} {:<50} predicted {:<10} actual {:<10} {}",
                    number,
                    truncate(&row.subject, 50),
                    predicted,
                    actual.as_str(),
                    mark
                );
                pairs.push((actual.as_str(), predicted));
            }
            None => {
                println!(
                    "{} {:<50} predicted {:<10} (no ground truth)",
                    number,
                    truncate(&row.subject, 50),
                    predicted
                );
            }
        }
    }

    if pairs.is_empty() {
        println!("\nNo tickets carried a recognizable assignee; accuracy not computed.");
        return Ok(());
    }

    let report = ClassificationReport::from_pairs(pairs.iter().copied());
    println!("\nOverall accuracy: {:.2}%", report.accuracy * 100.0);
    println!("\n{}", report);
    Ok(())
}

/// Predict a single ad-hoc ticket.
pub fn predict(
    subject: String,
    problem_type: Option<String>,
    comments: Vec<String>,
    model: Option<PathBuf>,
) -> Result<()> {
    let config = DispatchConfig::load();
    let model_path = model.unwrap_or(config.paths.model_file);

    let predictor = DispatchPredictor::load(&model_path)?;
    let ticket = Ticket {
        subject,
        problem_type,
        comments: comments
            .into_iter()
            .map(|body| Comment { body: Some(body) })
            .collect(),
        ..Ticket::default()
    };

    let prediction = predictor.predict(&ticket)?;
    match prediction.tech {
        Some(tech) => println!(
            "{} (confidence {:.2})",
            tech.as_str().bold(),
            prediction.confidence
        ),
        None => println!("no known tech (confidence {:.2})", prediction.confidence),
    }
    Ok(())
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_chars.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_keeps_short_strings() {
        assert_eq!(truncate("short", 50), "short");
    }

    #[test]
    fn truncate_cuts_long_strings() {
        let long = "x".repeat(80);
        let cut = truncate(&long, 50);
        assert_eq!(cut.chars().count(), 50);
        assert!(cut.ends_with('…'));
    }
}
