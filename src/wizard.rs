//! Interactive prompts that collect a honeypot record before mirroring.

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use regex::Regex;
use std::io::{BufRead, Write};

use crate::honeypot::HoneypotConfig;

/// Anchored, so the whole answer must be a CVE id. The sequence part takes four or more digits.
const CVE_PATTERN: &str = r"^CVE-\d{4}-\d{4,}$";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Mandatory,
    Cve,
    Pattern,
}

pub struct Wizard<R, W> {
    input: R,
    output: W,
    cve: Regex,
}

impl<R: BufRead, W: Write> Wizard<R, W> {
    pub fn new(input: R, output: W) -> Result<Self> {
        let cve = Regex::new(CVE_PATTERN).context("Failed to compile CVE pattern")?;
        Ok(Self { input, output, cve })
    }

    /// Walk through every honeypot field. `id` is left at 0 for the registry to assign.
    pub fn collect_honeypot(&mut self, today: NaiveDate) -> Result<HoneypotConfig> {
        writeln!(self.output, "Enter honeypot configuration details:")?;

        let name = self.prompt("Name (mandatory): ", Field::Mandatory)?;
        let cve = self.prompt("CVE (format CVE-YYYY-NNNNN, optional): ", Field::Cve)?;
        let application = self.prompt("Application (mandatory): ", Field::Mandatory)?;
        let port = self.prompt_port("Port (1-65535, mandatory): ")?;
        let template_html_file = self.prompt(
            "Template HTML file (output file name, mandatory): ",
            Field::Mandatory,
        )?;
        let detection_endpoint = self.prompt("Detection endpoint (mandatory): ", Field::Mandatory)?;
        let request_regex = self.prompt("Request regex (mandatory, valid regex): ", Field::Pattern)?;

        let date = today.format("%Y-%m-%d").to_string();
        Ok(HoneypotConfig {
            id: 0,
            name,
            cve,
            application,
            port,
            template_html_file,
            detection_endpoint,
            request_regex,
            date_created: date.clone(),
            date_updated: date,
        })
    }

    /// The page URL may be left empty; the caller decides what that means.
    pub fn prompt_url(&mut self) -> Result<String> {
        writeln!(self.output, "Enter the URL of the webpage to download:")?;
        self.output.flush()?;
        self.read_line()
    }

    fn prompt(&mut self, prompt: &str, field: Field) -> Result<String> {
        loop {
            write!(self.output, "{}", prompt)?;
            self.output.flush()?;
            let input = self.read_line()?;

            match self.check(&input, field) {
                Ok(()) => return Ok(input),
                Err(message) => writeln!(self.output, "{}", message)?,
            }
        }
    }

    fn prompt_port(&mut self, prompt: &str) -> Result<u16> {
        loop {
            let input = self.prompt(prompt, Field::Mandatory)?;
            match parse_port(&input) {
                Some(port) => return Ok(port),
                None => writeln!(
                    self.output,
                    "Invalid port. Please enter a number between 1 and 65535."
                )?,
            }
        }
    }

    fn check(&self, input: &str, field: Field) -> std::result::Result<(), &'static str> {
        match field {
            Field::Mandatory | Field::Pattern if input.is_empty() => {
                Err("This field is mandatory. Please enter a value.")
            }
            Field::Cve if !input.is_empty() && !self.cve.is_match(input) => {
                Err("Invalid CVE format. Please try again.")
            }
            Field::Pattern if Regex::new(input).is_err() => Err("Invalid regex. Please try again."),
            _ => Ok(()),
        }
    }

    fn read_line(&mut self) -> Result<String> {
        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .context("Failed to read input")?;
        if read == 0 {
            bail!("Input closed before the wizard finished");
        }
        Ok(line.trim().to_string())
    }
}

pub fn parse_port(input: &str) -> Option<u16> {
    input.trim().parse::<u16>().ok().filter(|port| *port != 0)
}
