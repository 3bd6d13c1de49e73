//! Interactive prompt loop
//!
//! Asks for a state, lists its national sites, then shows places near the
//! chosen site. Input and output are generic so the loop can be driven from
//! memory in tests.

use std::collections::BTreeMap;
use std::io::{self, BufRead, Write};
use thiserror::Error;

use crate::data::{places_in, Place};
use crate::lookup::{LookupError, SiteEntry, SiteLookup, SiteSource};

const RULE: &str = "----------------------------------";
const MENU_RULE: &str = "---------------------------------------";
const STATE_PROMPT: &str = "Enter a state name (e.g. Michigan, michigan) or \"exit\": ";
const SITE_PROMPT: &str = "Choose the number for detail search or \"exit\" or \"back\": ";

/// Errors that end a session
#[derive(Debug, Error)]
pub enum SessionError {
    /// Reading input or writing output failed
    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),

    /// The state index could not be loaded, so no state can be chosen
    #[error("could not load the list of states: {0}")]
    StateIndex(#[source] LookupError),
}

/// A parsed answer to the state prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateCommand {
    Exit,
    /// The state's listing URL
    State(String),
    Invalid,
}

/// A parsed answer to the site prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SiteCommand {
    Exit,
    Back,
    /// Zero-based index into the site list
    Select(usize),
    Invalid,
}

/// Parses a state prompt answer; `input` is expected already lowercased
pub fn parse_state_command(input: &str, index: &BTreeMap<String, String>) -> StateCommand {
    if input == "exit" {
        return StateCommand::Exit;
    }
    match index.get(input) {
        Some(url) => StateCommand::State(url.clone()),
        None => StateCommand::Invalid,
    }
}

/// Parses a site prompt answer against a list of `len` sites
///
/// Sites are numbered from 1 on screen.
pub fn parse_site_command(input: &str, len: usize) -> SiteCommand {
    match input {
        "exit" => SiteCommand::Exit,
        "back" => SiteCommand::Back,
        _ => match input.parse::<usize>() {
            Ok(n) if (1..=len).contains(&n) => SiteCommand::Select(n - 1),
            _ => SiteCommand::Invalid,
        },
    }
}

/// Writes the numbered site listing for a state
pub fn write_site_list<W: Write>(out: &mut W, state: &str, sites: &[SiteEntry]) -> io::Result<()> {
    writeln!(out, "{}", RULE)?;
    writeln!(out, "List of national sites in {}", state)?;
    writeln!(out, "{}", RULE)?;
    for (i, entry) in sites.iter().enumerate() {
        writeln!(out, "[{}] {}", i + 1, entry.site.info())?;
    }
    Ok(())
}

/// Returns the field, or `fallback` when it is absent or empty
fn or_fallback<'a>(field: &'a Option<String>, fallback: &'a str) -> &'a str {
    match field.as_deref() {
        Some(value) if !value.is_empty() => value,
        _ => fallback,
    }
}

/// Writes the places found near a site
pub fn write_places<W: Write>(out: &mut W, site_name: &str, places: &[Place]) -> io::Result<()> {
    writeln!(out, "{}", RULE)?;
    writeln!(out, "Places near {}", site_name)?;
    writeln!(out, "{}", RULE)?;
    for place in places {
        writeln!(
            out,
            "- {} ({}): {}, {}",
            or_fallback(&place.name, "no name"),
            or_fallback(&place.category, "no category"),
            or_fallback(&place.address, "no address"),
            or_fallback(&place.city, "no city"),
        )?;
    }
    Ok(())
}

/// What to do after leaving the site menu
enum AfterSites {
    Back,
    Exit,
}

/// An interactive browsing session
pub struct Session<S, R, W> {
    lookup: SiteLookup<S>,
    input: R,
    output: W,
}

impl<S, R, W> Session<S, R, W>
where
    S: SiteSource,
    R: BufRead,
    W: Write,
{
    /// Create a new Session reading commands from `input` and writing to `output`
    pub fn new(lookup: SiteLookup<S>, input: R, output: W) -> Self {
        Self {
            lookup,
            input,
            output,
        }
    }

    /// Consumes the session, returning its output sink
    pub fn into_output(self) -> W {
        self.output
    }

    /// Prompts and reads one trimmed line; `None` at end of input
    fn prompt(&mut self, text: &str) -> io::Result<Option<String>> {
        write!(self.output, "{}", text)?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn report_error(&mut self, error: &LookupError) -> io::Result<()> {
        tracing::warn!(%error, "lookup failed");
        writeln!(self.output, "[Error] {}", error)?;
        writeln!(self.output)
    }

    /// Runs the prompt loop until the user exits or input ends
    pub async fn run(&mut self) -> Result<(), SessionError> {
        let index = self
            .lookup
            .state_index()
            .await
            .map_err(SessionError::StateIndex)?
            .value;

        loop {
            let Some(answer) = self.prompt(STATE_PROMPT)? else {
                return Ok(());
            };
            let state = answer.to_lowercase();

            let state_url = match parse_state_command(&state, &index) {
                StateCommand::Exit => return Ok(()),
                StateCommand::Invalid => {
                    writeln!(self.output, "[Error] Enter proper state name")?;
                    writeln!(self.output)?;
                    continue;
                }
                StateCommand::State(url) => url,
            };

            let sites = match self.lookup.sites_for_state(&state_url).await {
                Ok(sites) => sites,
                Err(e) => {
                    self.report_error(&e)?;
                    continue;
                }
            };
            write_site_list(&mut self.output, &state, &sites)?;

            match self.site_menu(&sites).await? {
                AfterSites::Back => continue,
                AfterSites::Exit => return Ok(()),
            }
        }
    }

    /// Handles the site prompt for one state's listing
    async fn site_menu(&mut self, sites: &[SiteEntry]) -> Result<AfterSites, SessionError> {
        loop {
            writeln!(self.output)?;
            writeln!(self.output, "{}", MENU_RULE)?;
            let Some(answer) = self.prompt(SITE_PROMPT)? else {
                return Ok(AfterSites::Exit);
            };

            let entry = match parse_site_command(&answer, sites.len()) {
                SiteCommand::Exit => return Ok(AfterSites::Exit),
                SiteCommand::Back => return Ok(AfterSites::Back),
                SiteCommand::Invalid => {
                    writeln!(self.output, "[Error] Invalid input")?;
                    continue;
                }
                SiteCommand::Select(i) => &sites[i],
            };

            match self.lookup.nearby_places(&entry.url, &entry.site).await {
                Ok(response) => {
                    let places = places_in(&response.value);
                    write_places(&mut self.output, &entry.site.name, &places)?;
                }
                Err(e) => self.report_error(&e)?,
            }
        }
    }
}
