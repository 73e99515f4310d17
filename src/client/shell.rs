use std::fmt::Display;
use std::io::{self, BufRead, Write};
use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::str::FromStr;

use super::{
    AGE_RANGE, BackendClient, HEIGHT_RANGE, PanelOutcome, WEIGHT_RANGE, parse_in_range,
};
use crate::models::{FitnessLevel, Gender, HealthProfile};

const GENDERS: [Gender; 3] = [Gender::Male, Gender::Female, Gender::Other];
const FITNESS_LEVELS: [FitnessLevel; 3] = [
    FitnessLevel::Beginner,
    FitnessLevel::Intermediate,
    FitnessLevel::Advanced,
];

/// Writes a panel outcome the way the terminal shows it.
pub fn render<W: Write>(outcome: &PanelOutcome, out: &mut W) -> io::Result<()> {
    match outcome {
        PanelOutcome::Success { heading, body } => {
            writeln!(out, "### {}", heading)?;
            writeln!(out, "{}", body)
        }
        PanelOutcome::Warning(message) => writeln!(out, "[warning] {}", message),
        PanelOutcome::BackendError(message) => writeln!(out, "[error] Backend error: {}", message),
        PanelOutcome::RequestFailed { status, body } => {
            writeln!(out, "[error] Request failed: {}", status)?;
            writeln!(out, "{}", body)
        }
        PanelOutcome::ConnectionError(message) => writeln!(out, "[error] {}", message),
        PanelOutcome::Failed(message) => writeln!(out, "[error] {}", message),
    }
}

/// Interactive front end with the three panels behind a menu.
///
/// Panels share nothing; a failing panel renders its banner and control
/// returns to the menu. End of input leaves the loop.
pub struct Shell<'a, R, W> {
    client: &'a BackendClient,
    input: R,
    output: W,
}

impl<'a, R: BufRead, W: Write> Shell<'a, R, W> {
    pub fn new(client: &'a BackendClient, input: R, output: W) -> Self {
        Self {
            client,
            input,
            output,
        }
    }

    pub fn run(&mut self) -> io::Result<()> {
        writeln!(self.output, "AI-Powered Health Management System")?;
        writeln!(self.output, "Backend: {}", self.client.base_url())?;

        loop {
            writeln!(self.output)?;
            writeln!(self.output, "[1] Health Profile  [2] Food Analysis  [3] Health Insights  [q] Quit")?;
            let Some(choice) = self.prompt("Choose a panel")? else {
                break;
            };

            let finished = match choice.trim() {
                "1" => self.profile_panel()?,
                "2" => self.food_panel()?,
                "3" => self.query_panel()?,
                "q" | "quit" | "exit" => break,
                other => {
                    writeln!(self.output, "Unknown choice `{}`", other)?;
                    false
                }
            };
            if finished {
                break;
            }
        }

        writeln!(self.output, "Goodbye.")?;
        Ok(())
    }

    /// Reads one line; `None` at end of input.
    fn prompt(&mut self, label: &str) -> io::Result<Option<String>> {
        write!(self.output, "{}: ", label)?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    fn prompt_in_range<T>(&mut self, label: &str, range: &RangeInclusive<T>) -> io::Result<Option<T>>
    where
        T: FromStr + PartialOrd + Display,
    {
        loop {
            let Some(raw) = self.prompt(label)? else {
                return Ok(None);
            };
            match parse_in_range(&raw, range) {
                Ok(value) => return Ok(Some(value)),
                Err(reason) => writeln!(self.output, "{} {}", label, reason)?,
            }
        }
    }

    fn prompt_choice<T: Copy + Display>(&mut self, label: &str, options: &[T]) -> io::Result<Option<T>> {
        let listing = options
            .iter()
            .enumerate()
            .map(|(i, option)| format!("{}={}", i + 1, option))
            .collect::<Vec<_>>()
            .join(", ");

        loop {
            let Some(raw) = self.prompt(&format!("{} ({})", label, listing))? else {
                return Ok(None);
            };
            let raw = raw.trim();
            let picked = raw
                .parse::<usize>()
                .ok()
                .and_then(|i| i.checked_sub(1))
                .and_then(|i| options.get(i))
                .or_else(|| {
                    options
                        .iter()
                        .find(|option| option.to_string().eq_ignore_ascii_case(raw))
                });
            match picked {
                Some(option) => return Ok(Some(*option)),
                None => writeln!(self.output, "Pick one of: {}", listing)?,
            }
        }
    }

    fn show(&mut self, outcome: &PanelOutcome) -> io::Result<()> {
        render(outcome, &mut self.output)
    }

    /// Each panel returns `true` when input ran out mid-way.
    fn profile_panel(&mut self) -> io::Result<bool> {
        writeln!(self.output, "-- Upload Your Health Profile --")?;
        let Some(age) = self.prompt_in_range("Age", &AGE_RANGE)? else {
            return Ok(true);
        };
        let Some(gender) = self.prompt_choice("Gender", &GENDERS)? else {
            return Ok(true);
        };
        let Some(height) = self.prompt_in_range("Height (cm)", &HEIGHT_RANGE)? else {
            return Ok(true);
        };
        let Some(weight) = self.prompt_in_range("Weight (kg)", &WEIGHT_RANGE)? else {
            return Ok(true);
        };
        let Some(goal) = self.prompt("Goal (e.g. Weight loss, Muscle gain)")? else {
            return Ok(true);
        };
        let Some(allergies) = self.prompt("Allergies (comma-separated)")? else {
            return Ok(true);
        };
        let Some(fitness_level) = self.prompt_choice("Fitness Level", &FITNESS_LEVELS)? else {
            return Ok(true);
        };

        let profile = HealthProfile {
            age,
            gender,
            height,
            weight,
            goal,
            allergies,
            fitness_level,
        };
        writeln!(self.output, "Generating personalized meal plan...")?;
        let outcome = self.client.generate_meal_plan(&profile);
        self.show(&outcome)?;
        Ok(false)
    }

    fn food_panel(&mut self) -> io::Result<bool> {
        writeln!(self.output, "-- Upload a Food Image for Nutrition Analysis --")?;
        let Some(path) = self.prompt("Image path (jpg, png, jpeg)")? else {
            return Ok(true);
        };
        let path = PathBuf::from(path.trim());

        writeln!(self.output, "Analyzing food...")?;
        let outcome = self.client.analyze_food(&path);
        self.show(&outcome)?;
        Ok(false)
    }

    fn query_panel(&mut self) -> io::Result<bool> {
        writeln!(self.output, "-- Ask Health or Nutrition Questions --")?;
        let Some(query) = self.prompt("Enter your question")? else {
            return Ok(true);
        };

        if !query.trim().is_empty() {
            writeln!(self.output, "Fetching scientific insights...")?;
        }
        let outcome = self.client.ask(&query);
        self.show(&outcome)?;
        Ok(false)
    }
}
