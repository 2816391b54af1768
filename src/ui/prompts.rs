//! Yes/no confirmation

use std::io::{self, BufRead, Write};

/// Ask `prompt` on stdout and read the answer from stdin.
///
/// Anything but `y`/`yes` declines, including a read failure.
pub fn confirm_inline(prompt: &str, auto_yes: bool) -> bool {
    if auto_yes {
        return true;
    }

    print!("{} [y/N] ", prompt);
    if io::stdout().flush().is_err() {
        return false;
    }

    let mut input = String::new();
    if io::stdin().lock().read_line(&mut input).is_err() {
        return false;
    }
    is_yes(&input)
}

fn is_yes(answer: &str) -> bool {
    let answer = answer.trim();
    answer.eq_ignore_ascii_case("y") || answer.eq_ignore_ascii_case("yes")
}
