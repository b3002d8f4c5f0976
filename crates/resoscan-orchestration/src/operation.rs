//! Fully resolved operations and the command templates they are built from.
//!
//! A task first plans its operations, then executes them. Dry-run prints the
//! plan instead, so the naming scheme can be checked before anything runs.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use resoscan_core::errors::ConfigError;
use resoscan_core::observable::ColumnExpr;

const PLACEHOLDERS: [&str; 3] = ["{input}", "{output}", "{card}"];

/// A program and argument list with `{input}`, `{output}`, and `{card}`
/// placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CommandTemplate {
    program: String,
    args: Vec<String>,
}

impl CommandTemplate {
    /// Parse a whitespace-separated template.
    pub fn parse(template: &str) -> Result<Self, ConfigError> {
        let mut words = template.split_whitespace().map(str::to_string);
        let program = words
            .next()
            .ok_or_else(|| ConfigError::InvalidTemplate("empty command".into()))?;
        let args: Vec<String> = words.collect();
        for word in std::iter::once(&program).chain(&args) {
            check_placeholders(word)?;
        }
        Ok(Self { program, args })
    }

    /// A template from a constant known to parse.
    pub(crate) fn builtin(template: &str) -> Self {
        let mut words = template.split_whitespace().map(str::to_string);
        Self {
            program: words.next().unwrap_or_default(),
            args: words.collect(),
        }
    }

    #[must_use]
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Whether any word references `{card}`.
    #[must_use]
    pub fn uses_card(&self) -> bool {
        std::iter::once(&self.program)
            .chain(&self.args)
            .any(|w| w.contains("{card}"))
    }

    /// Substitute placeholders.
    ///
    /// Referencing `{card}` without a card bound is a configuration error.
    pub fn resolve(
        &self,
        input: &Path,
        output: &Path,
        card: Option<&Path>,
    ) -> Result<ResolvedCommand, ConfigError> {
        if card.is_none() && self.uses_card() {
            return Err(ConfigError::InvalidTemplate(format!(
                "{self}: {{card}} is not available for this stage"
            )));
        }
        let input = input.display().to_string();
        let output = output.display().to_string();
        let card = card.map(|c| c.display().to_string()).unwrap_or_default();
        let subst = |w: &String| {
            w.replace("{input}", &input)
                .replace("{output}", &output)
                .replace("{card}", &card)
        };
        Ok(ResolvedCommand {
            program: subst(&self.program),
            args: self.args.iter().map(subst).collect(),
            cwd: None,
        })
    }
}

fn check_placeholders(word: &str) -> Result<(), ConfigError> {
    let mut rest = word;
    while let Some(open) = rest.find('{') {
        let tail = &rest[open..];
        let Some(close) = tail.find('}') else {
            return Err(ConfigError::InvalidTemplate(format!("unterminated placeholder in '{word}'")));
        };
        let placeholder = &tail[..=close];
        if !PLACEHOLDERS.contains(&placeholder) {
            return Err(ConfigError::InvalidTemplate(format!(
                "unknown placeholder {placeholder} in '{word}'"
            )));
        }
        rest = &tail[close + 1..];
    }
    Ok(())
}

impl TryFrom<String> for CommandTemplate {
    type Error = ConfigError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::parse(&s)
    }
}

impl From<CommandTemplate> for String {
    fn from(t: CommandTemplate) -> Self {
        t.to_string()
    }
}

impl fmt::Display for CommandTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// A command ready to spawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCommand {
    pub program: String,
    pub args: Vec<String>,
    /// Working directory, if not the current one.
    pub cwd: Option<PathBuf>,
}

impl ResolvedCommand {
    #[must_use]
    pub fn in_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }
}

impl fmt::Display for ResolvedCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(dir) = &self.cwd {
            write!(f, "(cd {} && ", dir.display())?;
        }
        f.write_str(&self.program)?;
        for arg in &self.args {
            write!(f, " {arg}")?;
        }
        if self.cwd.is_some() {
            f.write_str(")")?;
        }
        Ok(())
    }
}

/// One side effect of a task.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Write a generation descriptor.
    WriteDescriptor { path: PathBuf, contents: String },
    /// Run an external program.
    Exec(ResolvedCommand),
    /// Extract the observable columns of a response file.
    Extract {
        source: PathBuf,
        columns: Vec<ColumnExpr>,
        output: PathBuf,
    },
    /// Reduce one column to a resolution record.
    Estimate {
        observable: String,
        column: String,
        record: PathBuf,
    },
    /// Assemble the curve archive of one observable.
    BuildCurves {
        config: String,
        observable: String,
        output: PathBuf,
    },
    /// Ratio two curve archives.
    Compare {
        left: PathBuf,
        right: PathBuf,
        output: PathBuf,
    },
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WriteDescriptor { path, .. } => write!(f, "write {}", path.display()),
            Self::Exec(cmd) => write!(f, "{cmd}"),
            Self::Extract {
                source,
                columns,
                output,
            } => {
                write!(f, "extract {} -> {}", source.display(), output.display())?;
                for c in columns {
                    write!(f, " [{c}]")?;
                }
                Ok(())
            }
            Self::Estimate {
                observable,
                column,
                record,
            } => write!(f, "estimate {observable} ({column}) -> {}", record.display()),
            Self::BuildCurves {
                config,
                observable,
                output,
            } => write!(f, "summarize {observable} [{config}] -> {}", output.display()),
            Self::Compare {
                left,
                right,
                output,
            } => write!(
                f,
                "compare {} / {} -> {}",
                right.display(),
                left.display(),
                output.display()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_resolve() {
        let t = CommandTemplate::parse("DelphesHepMC_EDM4HEP {card} delphes_output.tcl {output} {input}").unwrap();
        assert!(t.uses_card());
        let cmd = t
            .resolve(
                Path::new("gen/a.hepmc"),
                Path::new("resp/a.root"),
                Some(Path::new("cards/IDEA.tcl")),
            )
            .unwrap();
        assert_eq!(cmd.program, "DelphesHepMC_EDM4HEP");
        assert_eq!(
            cmd.args,
            ["cards/IDEA.tcl", "delphes_output.tcl", "resp/a.root", "gen/a.hepmc"]
        );
        assert_eq!(
            cmd.to_string(),
            "DelphesHepMC_EDM4HEP cards/IDEA.tcl delphes_output.tcl resp/a.root gen/a.hepmc"
        );
    }

    #[test]
    fn builtin_matches_parse() {
        for t in [
            crate::config::DEFAULT_GENERATOR,
            crate::config::DEFAULT_SIMULATOR,
            crate::config::DEFAULT_EXTRACTOR,
        ] {
            assert_eq!(CommandTemplate::builtin(t), CommandTemplate::parse(t).unwrap());
        }
    }

    #[test]
    fn placeholder_inside_word() {
        let t = CommandTemplate::parse("tool --in={input}").unwrap();
        let cmd = t.resolve(Path::new("x"), Path::new("y"), None).unwrap();
        assert_eq!(cmd.args, ["--in=x"]);
    }

    #[test]
    fn rejects_bad_templates() {
        assert!(CommandTemplate::parse("   ").is_err());
        assert!(CommandTemplate::parse("gun {inptu}").is_err());
        assert!(CommandTemplate::parse("gun {input").is_err());
    }

    #[test]
    fn card_required_when_referenced() {
        let t = CommandTemplate::parse("sim {card} {input}").unwrap();
        assert!(t.resolve(Path::new("a"), Path::new("b"), None).is_err());
    }

    #[test]
    fn serde_as_string() {
        let t: CommandTemplate = serde_json::from_str("\"gunHEPMC3 {input} {output}\"").unwrap();
        assert_eq!(t.program(), "gunHEPMC3");
        assert_eq!(serde_json::to_string(&t).unwrap(), "\"gunHEPMC3 {input} {output}\"");
        assert!(serde_json::from_str::<CommandTemplate>("\"gun {nope}\"").is_err());
    }

    #[test]
    fn working_directory_display() {
        let cmd = ResolvedCommand {
            program: "gunHEPMC3".into(),
            args: vec!["a.input".into()],
            cwd: None,
        }
        .in_dir("out/generated");
        assert_eq!(cmd.to_string(), "(cd out/generated && gunHEPMC3 a.input)");
    }
}
