//! Shell completion scripts.

use std::io::{self, Write};

use clap::Command;
use clap_complete::{generate, Shell};

/// Write the `shell` completion script for `cmd`, registered under the
/// command's binary name (or its name when none is set).
pub fn write_completion(mut cmd: Command, shell: Shell, out: &mut dyn Write) -> io::Result<()> {
    let bin = cmd
        .get_bin_name()
        .unwrap_or_else(|| cmd.get_name())
        .to_string();
    generate(shell, &mut cmd, bin, out);
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{Arg, ArgAction};

    fn command() -> Command {
        Command::new("resoscan").arg(
            Arg::new("compare-with")
                .long("compare-with")
                .action(ArgAction::Set),
        )
    }

    #[test]
    fn script_names_the_command_and_its_flags() {
        for shell in [Shell::Bash, Shell::Zsh, Shell::Fish] {
            let mut buf = Vec::new();
            write_completion(command(), shell, &mut buf).unwrap();
            let script = String::from_utf8(buf).unwrap();
            assert!(script.contains("resoscan"), "{shell}");
            assert!(script.contains("compare-with"), "{shell}");
        }
    }

    #[test]
    fn bin_name_takes_precedence() {
        let mut buf = Vec::new();
        write_completion(command().bin_name("rscan"), Shell::Bash, &mut buf).unwrap();
        let script = String::from_utf8(buf).unwrap();
        assert!(script.contains("rscan"));
    }
}
