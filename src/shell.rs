//! Read-eval-print loop: question in, generated request and report out.

use std::io::{self, BufRead, Write};

use log::info;

use crate::dispatch::Dispatcher;
use crate::llm::RequestSource;

const EXIT_WORDS: [&str; 3] = ["exit", "quit", "выход"];
const SEPARATOR: &str = "--------------------------------------------------";

enum Line<'a> {
    Blank,
    Exit,
    Question(&'a str),
}

impl<'a> From<&'a str> for Line<'a> {
    fn from(raw: &'a str) -> Self {
        let line = raw.trim();
        if line.is_empty() {
            Line::Blank
        } else if EXIT_WORDS.iter().any(|w| line.to_lowercase() == *w) {
            Line::Exit
        } else {
            Line::Question(line)
        }
    }
}

pub struct Shell<S> {
    dispatcher: Dispatcher,
    source: S,
}

impl<S: RequestSource> Shell<S> {
    pub fn new(dispatcher: Dispatcher, source: S) -> Self {
        Shell { dispatcher, source }
    }

    /// Answers one question and returns the generated request alongside the
    /// report text
    pub fn answer(&self, question: &str) -> (serde_json::Value, String) {
        let request = self.source.request_for(question);
        let report = self.dispatcher.execute_json(&request);
        (request, report)
    }

    fn print_answer<W: Write>(&self, question: &str, out: &mut W) -> io::Result<()> {
        let (request, report) = self.answer(question);
        let pretty = serde_json::to_string_pretty(&request).unwrap_or_else(|_| request.to_string());
        writeln!(out, "Generated request:\n{pretty}")?;
        writeln!(out, "\n{report}")?;
        writeln!(out, "{SEPARATOR}")
    }

    /// Answers a single question without the banner or prompt
    pub fn run_once<W: Write>(&self, question: &str, mut output: W) -> io::Result<()> {
        if self.dispatcher.table().is_empty() {
            writeln!(output, "Data not loaded, nothing to analyse.")?;
            return Ok(());
        }
        self.print_answer(question, &mut output)
    }

    pub fn run<R: BufRead, W: Write>(&self, mut input: R, mut output: W) -> io::Result<()> {
        let table = self.dispatcher.table();
        if table.is_empty() {
            writeln!(output, "Data not loaded, nothing to analyse.")?;
            return Ok(());
        }

        writeln!(output, "Freelancer earnings analyzer")?;
        writeln!(
            output,
            "{} records, {} columns loaded. Ask a question about the data.",
            table.row_count(),
            table.headers().len()
        )?;
        writeln!(output, "Type 'exit' or 'quit' to leave.\n")?;

        let mut buf = String::new();
        loop {
            write!(output, "> ")?;
            output.flush()?;

            buf.clear();
            if input.read_line(&mut buf)? == 0 {
                writeln!(output)?;
                break;
            }

            match Line::from(buf.as_str()) {
                Line::Blank => continue,
                Line::Exit => break,
                Line::Question(question) => {
                    info!("question: {question}");
                    self.print_answer(question, &mut output)?;
                }
            }
        }

        writeln!(output, "Bye.")
    }
}
