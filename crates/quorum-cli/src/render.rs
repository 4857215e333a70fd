//! Console rendering for analysis results

use comfy_table::{presets::UTF8_FULL, Table};
use quorum_stock::AnalysisOutcome;

const RULE: &str = "============================================================";

/// Print the run header
pub fn print_header(ticker: &str, question: &str) {
    println!("\n{RULE}");
    println!("QUORUM 4-AGENT ANALYSIS - {ticker}");
    println!("Question: {question}");
    println!("{RULE}");
}

/// Print every agent's output, a summary table, and the Director box
pub fn print_outcome(outcome: &AnalysisOutcome) {
    for report in &outcome.reports {
        println!("\n--- {} ---", report.agent_name);
        println!("{}", report.content);
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Agent", "Confidence", "Status"]);
    for report in &outcome.reports {
        table.add_row(vec![
            report.agent_name.clone(),
            format!("{}/10", report.confidence),
            if report.success { "ok" } else { "failed" }.to_string(),
        ]);
    }
    println!("\n{table}");

    if let Some(director) = outcome.report("Director") {
        print_director_box(&outcome.ticker, &director.content);
    }
}

/// Print the Director's final answer in a framed box
pub fn print_director_box(ticker: &str, content: &str) {
    println!("\n{RULE}");
    println!("DIRECTOR ANSWER - {ticker}");
    println!("{RULE}");
    println!("{content}");
    println!("{RULE}\n");
}

/// Print a provider availability table
pub fn print_source_table(rows: &[(&'static str, bool)]) {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Source", "Status"]);
    for (name, available) in rows {
        table.add_row(vec![
            (*name).to_string(),
            if *available { "available" } else { "unreachable" }.to_string(),
        ]);
    }
    println!("{table}");
}
