/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

It exposes four top-level command modules:

- `chat`      — Interactive legal chat in the terminal
- `serve`     — HTTP chat page and JSON API
- `ingest`    — Build a new index from text files
- `complaint` — Contractual complaint form

The chat and serve handlers share one startup path: embedder, index,
retriever and provider are built once and wired into a chain.
*/

use crate::chain::ConversationalChain;
use crate::config::Config;
use crate::embeddings::create_embedder;
use crate::error::Result;
use crate::index::VectorIndex;
use crate::providers::create_provider;
use crate::retriever::Retriever;
use std::sync::Arc;

// Special commands parser for the chat loop
pub mod special_commands;

/// Builds the conversational chain described by `config`
///
/// Loads the index from `config.index.path`, seeding it with the
/// placeholder document on first run.
///
/// # Errors
///
/// Returns error if credentials are missing, the index cannot be loaded
/// or seeded, or a provider type is unknown
pub async fn build_chain(config: &Config) -> Result<ConversationalChain> {
    let embedder: Arc<dyn crate::embeddings::Embedder> = Arc::from(create_embedder(config)?);
    let index = VectorIndex::open_or_seed(
        &config.index.path,
        embedder.as_ref(),
        &config.index.seed_text,
    )
    .await?;
    let retriever = Retriever::new(Arc::new(index), embedder, config.index.top_k);
    let provider = create_provider(&config.provider)?;

    tracing::info!(
        "Chain ready: provider={}, model={}, index={} documents",
        config.provider.provider_type,
        provider.model_name(),
        retriever.index().len()
    );

    Ok(ConversationalChain::new_boxed(
        retriever,
        provider,
        &config.chat,
    ))
}

// Chat command handler
pub mod chat {
    //! Interactive chat mode handler.
    //!
    //! Builds the chain, then runs a readline-based loop that answers
    //! each question within one terminal session.

    use super::*;
    use crate::commands::complaint;
    use crate::commands::special_commands::{parse_special_command, print_help, SpecialCommand};
    use crate::session::{Role, Session};
    use colored::Colorize;
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;

    /// Start interactive chat mode
    ///
    /// # Errors
    ///
    /// Returns error if startup fails (missing credentials, bad index) or
    /// the terminal cannot be opened. Failed turns are printed and the
    /// loop continues.
    pub async fn run_chat(config: Config) -> Result<()> {
        tracing::info!("Starting interactive chat mode");

        let chain = build_chain(&config).await?;
        let mut session = Session::new(config.chat.memory_window);
        let mut rl = DefaultEditor::new()?;

        print_welcome_banner(&config, &chain);

        loop {
            match rl.readline(&format!("{} ", "lawaid>".green().bold())) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }

                    let command = match parse_special_command(trimmed) {
                        Ok(command) => command,
                        Err(e) => {
                            eprintln!("{}\n", e.to_string().red());
                            continue;
                        }
                    };

                    match command {
                        SpecialCommand::Reset => {
                            session.reset();
                            println!("{}\n", "Conversation cleared.".cyan());
                            continue;
                        }
                        SpecialCommand::History => {
                            print_history(&session);
                            continue;
                        }
                        SpecialCommand::Complaint => {
                            match complaint::fill_form(|label| Ok(rl.readline(label)?)) {
                                Ok(form) => complaint::print_result(&form),
                                Err(e) => eprintln!("{}\n", format!("Complaint cancelled: {}", e).yellow()),
                            }
                            continue;
                        }
                        SpecialCommand::ShowStatus => {
                            print_status_display(&config, &chain, &session);
                            continue;
                        }
                        SpecialCommand::Help => {
                            print_help();
                            continue;
                        }
                        SpecialCommand::Exit => break,
                        SpecialCommand::None => {}
                    }

                    rl.add_history_entry(trimmed)?;
                    println!("{}", "Thinking 💡...".dimmed());

                    match chain.answer(&mut session, trimmed).await {
                        Ok(outcome) => {
                            println!("\n{}\n", outcome.answer);
                            let sources: Vec<&str> = outcome
                                .sources
                                .iter()
                                .filter_map(|c| c.source.as_deref())
                                .collect();
                            if !sources.is_empty() {
                                println!("{}\n", format!("Sources: {}", sources.join(", ")).dimmed());
                            }
                        }
                        Err(e) => {
                            eprintln!("{}\n", format!("Error: {}", e).red());
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("CTRL-C");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    println!("CTRL-D");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {:?}", err);
                    break;
                }
            }
        }

        println!("Goodbye!");
        Ok(())
    }

    /// Display welcome banner at the start of interactive chat mode
    fn print_welcome_banner(config: &Config, chain: &ConversationalChain) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║              LawAID - Indian Penal Code Assistant            ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");
        println!(
            "Provider: {} | Index: {} documents",
            config.provider.provider_type.cyan(),
            chain.retriever().index().len()
        );
        println!("{}", chain.disclaimer().trim_end().yellow());
        println!("Type '/help' for available commands, 'exit' to quit\n");
    }

    /// Print every message of the session, oldest first
    fn print_history(session: &Session) {
        if session.messages().is_empty() {
            println!("{}\n", "No messages yet.".dimmed());
            return;
        }
        for message in session.messages() {
            let tag = match message.role {
                Role::User => "You".green().bold(),
                Role::Assistant => "LawAID".blue().bold(),
            };
            println!("{}: {}\n", tag, message.content);
        }
    }

    /// Display provider, index and memory status
    fn print_status_display(config: &Config, chain: &ConversationalChain, session: &Session) {
        let index = chain.retriever().index();
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                     LawAID Session Status                    ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");
        println!("Session:           {}", session.id());
        println!("Provider:          {}", config.provider.provider_type);
        println!("Embedding Model:   {}", index.embedding_model());
        println!(
            "Index:             {} documents ({} dims) at {}",
            index.len(),
            index.dimensions(),
            config.index.path.display()
        );
        println!("Top K:             {}", chain.retriever().top_k());
        println!(
            "Memory:            {}/{} exchanges",
            session.memory().len(),
            session.memory().window()
        );
        println!("Messages:          {}", session.messages().len());
        println!(
            "Sampling:          temperature={} max_tokens={}",
            chain.params().temperature,
            chain.params().max_tokens
        );
        println!();
    }
}

// HTTP server command handler
pub mod serve {
    //! Runs the HTTP chat page and JSON API.

    use super::*;
    use crate::server::{self, AppState};

    /// Build the chain and serve until Ctrl-C
    ///
    /// # Errors
    ///
    /// Returns error if startup fails or the address cannot be bound
    pub async fn run_serve(config: Config) -> Result<()> {
        let chain = build_chain(&config).await?;
        let state = AppState::new(chain, config.chat.memory_window);
        server::serve(&config, state).await
    }
}

// Ingestion command handler
pub mod ingest {
    //! Builds a fresh index from text files.

    use super::*;
    use crate::ingest::{self, ChunkOptions};
    use colored::Colorize;
    use std::path::PathBuf;

    /// Ingest `paths` into `output`, or the configured index path
    ///
    /// # Errors
    ///
    /// Returns error if chunk options are invalid, credentials are
    /// missing, or building and saving the index fails
    pub async fn run_ingest(
        config: Config,
        paths: Vec<PathBuf>,
        chunk_size: usize,
        chunk_overlap: usize,
        output: Option<PathBuf>,
    ) -> Result<()> {
        let opts = ChunkOptions::new(chunk_size, chunk_overlap)?;
        let index_dir = output.unwrap_or_else(|| config.index.path.clone());
        let embedder = create_embedder(&config)?;

        let report = ingest::ingest(&paths, &index_dir, opts, embedder.as_ref()).await?;

        println!(
            "{}",
            format!(
                "Indexed {} chunks from {} files ({} dimensions) into {}",
                report.chunks,
                report.files,
                report.dimensions,
                index_dir.display()
            )
            .green()
        );
        Ok(())
    }
}

// Complaint form handler
pub mod complaint {
    //! Contractual complaint form for the terminal.

    use super::*;
    use crate::intake::{Complaint, ContractType, SubmissionOutcome};
    use colored::Colorize;
    use rustyline::DefaultEditor;

    /// Run the complaint form once on its own
    ///
    /// # Errors
    ///
    /// Returns error if the terminal cannot be opened or input is aborted
    pub fn run_complaint() -> Result<()> {
        let mut rl = DefaultEditor::new()?;
        println!("\n{}\n", "Contractual Complaint Form".bold());
        let form = fill_form(|label| Ok(rl.readline(label)?))?;
        print_result(&form);
        Ok(())
    }

    /// Collects a complaint by asking one question per field
    ///
    /// `ask` shows a label and returns the user's answer. Blank answers
    /// leave the field empty; validation happens on submit.
    ///
    /// # Errors
    ///
    /// Returns the first error from `ask`
    pub fn fill_form<F>(mut ask: F) -> Result<Complaint>
    where
        F: FnMut(&str) -> Result<String>,
    {
        let name = ask("Full Name: ")?;
        let email = ask("Email Address: ")?;
        let phone = ask("Phone Number: ")?;

        let options: Vec<String> = ContractType::ALL
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{}) {}", i + 1, c))
            .collect();
        let contract_answer = ask(&format!("Type of Contract [{}]: ", options.join(", ")))?;
        let contract_type = parse_contract_choice(&contract_answer);

        let jurisdiction = ask("Jurisdiction (Applicable Law): ")?;
        let description = ask("Describe the Issue/Breach of Contract: ")?;
        let assistance = ask("Do you need legal assistance? [Yes/No]: ")?;
        let document = ask("Supporting document file (PDF, DOCX), blank for none: ")?;

        Ok(Complaint {
            name,
            email,
            phone,
            contract_type,
            jurisdiction,
            description,
            needs_legal_assistance: !assistance.trim().eq_ignore_ascii_case("no"),
            supporting_document: Some(document.trim().to_string()).filter(|d| !d.is_empty()),
        })
    }

    /// Accepts a 1-based option number or a contract type name
    pub fn parse_contract_choice(answer: &str) -> Option<ContractType> {
        let answer = answer.trim();
        if answer.is_empty() {
            return None;
        }
        if let Ok(n) = answer.parse::<usize>() {
            return n.checked_sub(1).and_then(|i| ContractType::ALL.get(i).copied());
        }
        answer.parse().ok()
    }

    /// Prints the submission outcome and the probability label
    pub fn print_result(form: &Complaint) {
        match form.submit() {
            SubmissionOutcome::Success(message) => println!("\n{}", message.green()),
            SubmissionOutcome::Warning(message) => println!("\n{}", message.yellow()),
        }
        println!("Estimated Probability: {}\n", form.probability().to_string().bold());
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::intake::Probability;
        use std::collections::VecDeque;

        fn scripted(answers: &[&str]) -> impl FnMut(&str) -> Result<String> {
            let mut answers: VecDeque<String> = answers.iter().map(|a| a.to_string()).collect();
            move |_label: &str| Ok(answers.pop_front().unwrap_or_default())
        }

        #[test]
        fn test_fill_form_complete() {
            let form = fill_form(scripted(&[
                "Meera",
                "meera@example.com",
                "",
                "2",
                "Tamil Nadu",
                "Landlord kept deposit; strong evidence in receipts",
                "no",
                "lease.pdf",
            ]))
            .unwrap();

            assert_eq!(form.contract_type, Some(ContractType::Lease));
            assert!(!form.needs_legal_assistance);
            assert_eq!(form.supporting_document.as_deref(), Some("lease.pdf"));
            assert!(form.submit().is_success());
            assert_eq!(form.probability(), Probability::High);
        }

        #[test]
        fn test_fill_form_blank_answers_warn() {
            let form = fill_form(scripted(&[])).unwrap();
            assert!(!form.submit().is_success());
            assert_eq!(form.probability(), Probability::Processing);
            assert!(form.needs_legal_assistance);
            assert_eq!(form.supporting_document, None);
        }

        #[test]
        fn test_fill_form_propagates_abort() {
            let result = fill_form(|_| Err(anyhow::anyhow!("interrupted")));
            assert!(result.is_err());
        }

        #[test]
        fn test_parse_contract_choice() {
            assert_eq!(parse_contract_choice("1"), Some(ContractType::Employment));
            assert_eq!(parse_contract_choice("5"), Some(ContractType::Other));
            assert_eq!(parse_contract_choice("0"), None);
            assert_eq!(parse_contract_choice("6"), None);
            assert_eq!(parse_contract_choice("NDA"), Some(ContractType::Nda));
            assert_eq!(parse_contract_choice(""), None);
        }
    }
}
