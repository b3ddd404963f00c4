//! Interactive city picker.
//!
//! This is intentionally kept separate from clap parsing:
//! - clap handles structured flags/subcommands
//! - the picker provides the "run `wx fetch` and choose a city" UX
//!
//! The picker lists the city index and accepts a number or an exact name.

use std::io::{self, BufRead, Write};

use crate::domain::CityIndex;
use crate::error::AppError;

/// What a line of picker input resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Choice {
    City(String),
    Cancel,
    Invalid(String),
}

/// Prompt on stdin/stdout for a city from the index.
pub fn prompt_for_city(cities: &CityIndex) -> Result<String, AppError> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    prompt_for_city_with(cities, stdin.lock(), stdout.lock())
}

/// Prompt loop over arbitrary reader/writer (testable).
///
/// Behavior:
/// - list the known cities with numbers
/// - accept either a number (from the list) or an exact city name
/// - `q` cancels
pub fn prompt_for_city_with(
    cities: &CityIndex,
    mut input: impl BufRead,
    mut output: impl Write,
) -> Result<String, AppError> {
    let names = cities.names();
    if names.is_empty() {
        return Err(AppError::new(2, "City index is empty."));
    }

    let io_err = |e: io::Error| AppError::new(2, format!("Failed to write prompt: {e}"));

    writeln!(output, "Known cities ({}):", names.len()).map_err(io_err)?;
    for (idx, name) in names.iter().enumerate() {
        writeln!(output, "{:>3}) {name}", idx + 1).map_err(io_err)?;
    }

    loop {
        write!(output, "Select a city by number (1-{}) or name (q to quit): ", names.len()).map_err(io_err)?;
        output.flush().map_err(io_err)?;

        let mut line = String::new();
        let bytes = input
            .read_line(&mut line)
            .map_err(|e| AppError::new(2, format!("Failed to read input: {e}")))?;

        if bytes == 0 {
            return Err(AppError::new(
                2,
                "No input received. Provide a city with `wx fetch --city <name>`.",
            ));
        }

        match resolve_choice(line.trim(), &names) {
            Choice::City(city) => return Ok(city),
            Choice::Cancel => return Err(AppError::new(2, "Canceled.")),
            Choice::Invalid(msg) => {
                writeln!(output, "{msg}").map_err(io_err)?;
            }
        }
    }
}

/// Interpret one trimmed line of picker input.
pub fn resolve_choice(input: &str, names: &[&str]) -> Choice {
    if input.eq_ignore_ascii_case("q") {
        return Choice::Cancel;
    }

    if let Ok(n) = input.parse::<usize>() {
        return match names.get(n.wrapping_sub(1)) {
            Some(name) if n >= 1 => Choice::City(name.to_string()),
            _ => Choice::Invalid(format!(
                "Invalid choice: {n}. Enter a number between 1 and {}.",
                names.len()
            )),
        };
    }

    if names.contains(&input) {
        return Choice::City(input.to_string());
    }

    Choice::Invalid(format!("Unknown city: '{input}'. Names must match exactly."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_numbers_names_and_cancel() {
        let names = ["上海", "北京"];
        assert_eq!(resolve_choice("2", &names), Choice::City("北京".to_string()));
        assert_eq!(resolve_choice("上海", &names), Choice::City("上海".to_string()));
        assert_eq!(resolve_choice("Q", &names), Choice::Cancel);
        assert!(matches!(resolve_choice("0", &names), Choice::Invalid(_)));
        assert!(matches!(resolve_choice("3", &names), Choice::Invalid(_)));
        assert!(matches!(resolve_choice("北京市", &names), Choice::Invalid(_)));
    }

    #[test]
    fn prompt_retries_until_valid() {
        let cities = CityIndex::from_pairs([("Alpha", "1"), ("Beta", "2")]);
        let input = io::Cursor::new("nope\n2\n");
        let mut output = Vec::new();
        let city = prompt_for_city_with(&cities, input, &mut output).unwrap();
        assert_eq!(city, "Beta");
        let text = String::from_utf8(output).unwrap();
        assert!(text.contains("  1) Alpha"));
        assert!(text.contains("Unknown city: 'nope'"));
    }

    #[test]
    fn prompt_fails_on_eof() {
        let cities = CityIndex::from_pairs([("Alpha", "1")]);
        let err = prompt_for_city_with(&cities, io::Cursor::new(""), Vec::new()).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
