mod cli;
mod screens;

use anyhow::{bail, Context};
use clap::Parser;
use qbank::config::Config;
use qbank::migrate::MigrationOutcome;
use qbank::model::QuestionDraft;
use qbank::navigation::Route;
use qbank::store::FileStore;
use qbank::Repository;
use tracing_subscriber::EnvFilter;

use crate::cli::{BankCommand, Cli, Command, QuestionCommand};

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let mut config = Config::new(cli.data_dir, cli.strict_ids);
    let store = FileStore::open(&config.data_dir)
        .with_context(|| format!("cannot open data dir {}", config.data_dir.display()))?;
    let repo = Repository::open(store, config.id_policy);

    if let MigrationOutcome::Migrated(n) = repo.migration() {
        eprintln!("Moved {} questions from the old list into the default bank.", n);
    }

    match cli.command {
        Command::Banks => screens::open(&repo, Route::QuestionBank, &config)?,
        Command::Bank(BankCommand::Create { name, description }) => {
            let bank = repo.create_bank(&name, &description)?;
            println!("Created bank {} ({})", bank.name, bank.id);
        }
        Command::Bank(BankCommand::Rename {
            id,
            name,
            description,
        }) => {
            let bank = repo.update_bank(&id, &name, description.as_deref())?;
            println!("Renamed bank {} to {}", bank.id, bank.name);
        }
        Command::Bank(BankCommand::Delete { id }) => {
            repo.delete_bank(&id)?;
            println!("Deleted bank {}", id);
        }
        Command::Show { bank_id } => {
            let Some(bank) = repo.get_bank(&bank_id)? else {
                bail!("no bank with id {}", bank_id);
            };
            let route = Route::BankDetail {
                bank_id: bank.id,
                bank_name: bank.name,
            };
            screens::open(&repo, route, &config)?;
        }
        Command::Question(QuestionCommand::Add { bank_id, fields }) => {
            let draft = QuestionDraft {
                id: None,
                title: fields.title,
                kind: fields.kind,
                options: fields.options,
                answer: fields.answer,
                analysis: fields.analysis,
            };
            let route = Route::EditQuestion {
                bank_id,
                question_id: None,
            };
            screens::save_question(&repo, &route, draft)?;
        }
        Command::Question(QuestionCommand::Edit {
            bank_id,
            id,
            fields,
        }) => {
            let Some(existing) = repo.get_question(&bank_id, &id)? else {
                bail!("no question {} in bank {}", id, bank_id);
            };
            let mut draft = QuestionDraft::from(&existing);
            if let Some(title) = fields.title {
                draft.title = title;
            }
            if let Some(kind) = fields.kind {
                draft.kind = kind;
            }
            if !fields.options.is_empty() {
                draft.options = fields.options;
            }
            if let Some(answer) = fields.answer {
                draft.answer = answer;
            }
            if let Some(analysis) = fields.analysis {
                draft.analysis = analysis;
            }
            let route = Route::EditQuestion {
                bank_id,
                question_id: Some(id),
            };
            screens::save_question(&repo, &route, draft)?;
        }
        Command::Question(QuestionCommand::Show { bank_id, id }) => {
            let route = Route::EditQuestion {
                bank_id,
                question_id: Some(id),
            };
            screens::open(&repo, route, &config)?;
        }
        Command::Question(QuestionCommand::Delete { bank_id, id }) => {
            repo.delete_question(&bank_id, &id)?;
            println!("Deleted question {}", id);
        }
        Command::Quiz { bank_id, no_delay } => {
            let questions = repo.list_questions(&bank_id)?;
            if questions.is_empty() {
                bail!("bank {} has no questions yet, add some first", bank_id);
            }
            let bank_name = repo.get_bank(&bank_id)?.map(|b| b.name);
            if no_delay {
                config.advance_delay = std::time::Duration::ZERO;
            }
            screens::open(
                &repo,
                Route::Quiz {
                    questions,
                    bank_name,
                },
                &config,
            )?;
        }
        Command::Reset { yes } => {
            if !yes {
                bail!("reset removes every bank and question; pass --yes to confirm");
            }
            repo.reset()?;
            println!("All banks removed.");
        }
    }

    repo.close();
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
