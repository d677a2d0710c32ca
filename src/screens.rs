use std::io::{self, BufRead, Write};
use std::thread;
use std::time::Duration;

use anyhow::Context;
use qbank::answer::option_label;
use qbank::config::Config;
use qbank::model::{Question, QuestionBank, QuestionDraft};
use qbank::navigation::Route;
use qbank::session::{Outcome, Phase, QuizResult, QuizSession};
use qbank::store::KeyValueStore;
use qbank::Repository;

pub fn open<S: KeyValueStore>(
    repo: &Repository<S>,
    route: Route,
    config: &Config,
) -> anyhow::Result<()> {
    let title = route.title();
    match route {
        Route::QuestionBank => {
            let banks = repo.list_banks()?;
            println!("{}", title);
            if banks.is_empty() {
                println!("  (no banks)");
            }
            for bank in &banks {
                print_bank_line(bank);
            }
        }
        Route::BankDetail { bank_id, .. } => {
            let Some(bank) = repo.get_bank(&bank_id)? else {
                anyhow::bail!("no bank with id {}", bank_id);
            };
            print_bank_line(&bank);
            println!();
            if bank.questions.is_empty() {
                println!("  No questions yet.");
            }
            for (i, q) in bank.questions.iter().enumerate() {
                let answer = if q.answer.is_empty() {
                    "not set".to_string()
                } else {
                    q.answer.chars().take(20).collect()
                };
                println!("  Q{} [{}] {}  ({})", i + 1, q.kind, q.title, q.id);
                println!("      answer: {}", answer);
            }
        }
        Route::EditQuestion {
            bank_id,
            question_id,
        } => {
            println!("{}", title);
            if let Some(id) = question_id {
                match repo.get_question(&bank_id, &id)? {
                    Some(q) => print_question(&q),
                    None => println!("  question {} not found", id),
                }
            }
        }
        Route::Quiz { questions, .. } => {
            println!("{}", title);
            let stdin = io::stdin();
            run_quiz(QuizSession::new(questions), stdin.lock(), config.advance_delay)?;
        }
    }
    Ok(())
}

pub fn save_question<S: KeyValueStore>(
    repo: &Repository<S>,
    route: &Route,
    draft: QuestionDraft,
) -> anyhow::Result<()> {
    let Route::EditQuestion {
        bank_id,
        question_id,
    } = route
    else {
        anyhow::bail!("{} is not a question editor", route.title());
    };
    let draft = QuestionDraft {
        id: question_id.clone(),
        ..draft
    };
    let saved = repo.upsert_question(bank_id, draft)?;
    if question_id.is_some() {
        println!("Updated question {}", saved.id);
    } else {
        println!("Added question {}", saved.id);
    }
    print_question(&saved);
    Ok(())
}

/// Line-driven quiz: a letter picks and submits, `s` skips, `q` leaves.
pub fn run_quiz(
    mut session: QuizSession,
    mut input: impl BufRead,
    delay: Duration,
) -> anyhow::Result<()> {
    let total = session.questions().len();
    let mut line = String::new();

    loop {
        match session.phase() {
            Phase::Presenting(i) => {
                let question = &session.questions()[i];
                println!();
                println!("Question {} of {}   score: {}", i + 1, total, session.score());
                print_question_body(question);
                prompt("answer (letter), s to skip, q to quit")?;

                line.clear();
                if input.read_line(&mut line).context("cannot read input")? == 0 {
                    return Ok(());
                }
                match line.trim() {
                    "q" | "Q" => return Ok(()),
                    "s" | "S" | "" => session.skip()?,
                    choice => {
                        let Some(idx) = parse_choice(choice) else {
                            println!("Pick an option letter.");
                            continue;
                        };
                        if let Err(e) = session.select(idx) {
                            println!("{}", e);
                            continue;
                        }
                        session.submit()?;
                    }
                }
            }
            Phase::Submitted(i) => {
                let question = &session.questions()[i];
                match session.last_outcome() {
                    Some(Outcome::Correct) => println!("Correct!"),
                    Some(Outcome::Incorrect { correct }) => {
                        println!("Wrong, the answer is {}.", option_label(correct))
                    }
                    Some(Outcome::NoAnswerSet) | None => {
                        println!("This question has no correct answer set.")
                    }
                }
                if !question.analysis.is_empty() {
                    println!("Analysis: {}", question.analysis);
                }
                thread::sleep(delay);
                session.advance();
            }
            Phase::Finished => {
                if let Some(result) = session.result() {
                    print_result(&result);
                }
                prompt("r to restart, anything else to leave")?;
                line.clear();
                if input.read_line(&mut line).context("cannot read input")? == 0 {
                    return Ok(());
                }
                if line.trim().eq_ignore_ascii_case("r") {
                    session.restart();
                } else {
                    return Ok(());
                }
            }
        }
    }
}

fn parse_choice(s: &str) -> Option<usize> {
    let mut chars = s.chars();
    let c = chars.next()?;
    if chars.next().is_some() || !c.is_ascii_alphabetic() {
        return None;
    }
    Some(c.to_ascii_uppercase() as usize - 'A' as usize)
}

fn prompt(text: &str) -> io::Result<()> {
    print!("{}> ", text);
    io::stdout().flush()
}

fn print_bank_line(bank: &QuestionBank) {
    let badge = if bank.is_default { " [default]" } else { "" };
    println!(
        "  {}{}  {} questions  updated {}  ({})",
        bank.name,
        badge,
        bank.questions.len(),
        bank.updated_at.format("%Y-%m-%d"),
        bank.id
    );
    if bank.description.is_empty() {
        println!("      no description");
    } else {
        println!("      {}", bank.description);
    }
}

fn print_question(q: &Question) {
    println!("  [{}] {}", q.kind, q.id);
    print_question_body(q);
    println!("  answer: {}", if q.answer.is_empty() { "not set" } else { q.answer.as_str() });
    if !q.analysis.is_empty() {
        println!("  analysis: {}", q.analysis);
    }
}

fn print_question_body(q: &Question) {
    println!("  {}", q.title);
    for (i, option) in q.options.iter().enumerate() {
        println!("    {}. {}", option_label(i), option);
    }
}

fn print_result(result: &QuizResult) {
    println!();
    println!("Finished: {}", result.band);
    println!("  correct: {} / {}", result.correct, result.total);
    println!("  wrong:   {}", result.wrong());
    println!("  score:   {}%", result.percentage);
}
