// debflow: Debian release workflow helper
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Blocking line-based prompts.
//!
//! ```text
//! Prompter (trait)
//!   confirm  "Question [Y/n] "                 -> bool
//!   input    "Prompt: " / "Prompt: [default] " -> Option<String>
//!   choose   "Options:\n(0) ..\nQuestion [0-N (d)] or 'a' to abort: "
//!                                              -> Option<usize>
//!
//! LinePrompter<R: BufRead, W: Write>   stdio() for the terminal
//! ```
//!
//! Invalid answers re-ask; end of input is an error so a closed stdin can
//! never spin forever.

use std::cell::RefCell;
use std::io::{self, BufRead, StdinLock, Stdout, Write};

/// Source of operator answers.
pub trait Prompter {
    /// Asks a yes/no question. `None` as default requires an explicit answer.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the answer cannot be read.
    fn confirm(&self, question: &str, default: Option<bool>) -> io::Result<bool>;

    /// Asks for free text. An empty answer yields `default` when `allow_empty`
    /// is set and re-asks otherwise.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the answer cannot be read.
    fn input(
        &self,
        prompt: &str,
        default: Option<&str>,
        allow_empty: bool,
    ) -> io::Result<Option<String>>;

    /// Offers a numbered menu. Returns `None` when the operator aborts.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the answer cannot be read or `default` is not
    /// a valid index.
    fn choose(&self, question: &str, options: &[String], default: usize)
    -> io::Result<Option<usize>>;
}

/// Prompter over any line reader and writer.
pub struct LinePrompter<R, W> {
    reader: RefCell<R>,
    writer: RefCell<W>,
}

impl LinePrompter<StdinLock<'static>, Stdout> {
    /// Prompter bound to the process terminal.
    #[must_use]
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> LinePrompter<R, W> {
    pub const fn new(reader: R, writer: W) -> Self {
        Self {
            reader: RefCell::new(reader),
            writer: RefCell::new(writer),
        }
    }

    /// Returns the writer, e.g. to inspect what was shown.
    pub fn into_writer(self) -> W {
        self.writer.into_inner()
    }

    fn write(&self, text: &str) -> io::Result<()> {
        let mut writer = self.writer.borrow_mut();
        writer.write_all(text.as_bytes())?;
        writer.flush()
    }

    fn read_answer(&self) -> io::Result<String> {
        let mut line = String::new();
        let read = self.reader.borrow_mut().read_line(&mut line)?;
        if read == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "no answer: input closed",
            ));
        }
        Ok(line.trim().to_string())
    }
}

impl<R: BufRead, W: Write> Prompter for LinePrompter<R, W> {
    fn confirm(&self, question: &str, default: Option<bool>) -> io::Result<bool> {
        let hint = match default {
            None => " [y/n] ",
            Some(true) => " [Y/n] ",
            Some(false) => " [y/N] ",
        };
        loop {
            self.write(&format!("{question}{hint}"))?;
            let answer = self.read_answer()?.to_lowercase();
            match (answer.as_str(), default) {
                ("", Some(value)) => return Ok(value),
                ("y" | "ye" | "yes", _) => return Ok(true),
                ("n" | "no", _) => return Ok(false),
                _ => self.write("Please respond with 'yes' or 'no' (or 'y' or 'n').\n")?,
            }
        }
    }

    fn input(
        &self,
        prompt: &str,
        default: Option<&str>,
        allow_empty: bool,
    ) -> io::Result<Option<String>> {
        let hint = match (allow_empty, default) {
            (true, None) => ": (empty to skip): ".to_string(),
            (true, Some(value)) => format!(": [{value}] "),
            (false, _) => ": ".to_string(),
        };
        loop {
            self.write(&format!("{prompt}{hint}"))?;
            let answer = self.read_answer()?;
            if !answer.is_empty() {
                return Ok(Some(answer));
            }
            if allow_empty {
                return Ok(default.map(str::to_string));
            }
            self.write("Please respond with a non-empty string.\n")?;
        }
    }

    fn choose(
        &self,
        question: &str,
        options: &[String],
        default: usize,
    ) -> io::Result<Option<usize>> {
        if default >= options.len() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid default option: {default}"),
            ));
        }
        let last = options.len() - 1;
        loop {
            let mut menu = String::from("\nOptions:");
            for (idx, option) in options.iter().enumerate() {
                menu.push_str(&format!("\n({idx}) {option}"));
            }
            menu.push_str(&format!(
                "\n{question} [0-{last} ({default})] or 'a' to abort: "
            ));
            self.write(&menu)?;

            let answer = self.read_answer()?.to_lowercase();
            if answer.is_empty() {
                return Ok(Some(default));
            }
            if answer == "a" {
                return Ok(None);
            }
            match answer.parse::<usize>() {
                Ok(idx) if idx <= last => return Ok(Some(idx)),
                _ => self.write(&format!(
                    "Please respond with an integer in the range [0-{last}]\n"
                ))?,
            }
        }
    }
}
