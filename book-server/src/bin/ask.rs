//! Ask the book agent questions from the command line.

use anyhow::bail;
use book_server::build_agent;
use clap::Parser;

const SAMPLE_QUESTIONS: [&str; 4] = [
    "What chapters are available in the book?",
    "Explain what Git is and why I should use it",
    "How do I create my first commit?",
    "What is branching in Git?",
];

#[derive(Parser, Debug)]
#[command(name = "ask", about = "Answer questions about the book without the HTTP server")]
struct Cli {
    /// Questions to ask, one turn each.
    questions: Vec<String>,

    /// Run the built-in sample questions.
    #[arg(long)]
    sample: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = book_server::init()?;
    let cli = Cli::parse();

    let mut questions = cli.questions;
    if cli.sample {
        questions.extend(SAMPLE_QUESTIONS.iter().map(|q| q.to_string()));
    }
    if questions.is_empty() {
        bail!("no questions given; pass one or more questions or --sample");
    }

    let agent = build_agent(&settings)?;
    for (i, question) in questions.iter().enumerate() {
        println!("{}", "=".repeat(80));
        println!("Question {}: {question}", i + 1);
        println!("{}", "=".repeat(80));

        match agent.chat(question).await {
            Ok(reply) => {
                println!("{}\n", reply.text);
                println!("[{:?}, {} tool call(s)]", reply.outcome, reply.tool_calls);
            }
            Err(e) => println!("Error processing message: {e}"),
        }
    }
    Ok(())
}
