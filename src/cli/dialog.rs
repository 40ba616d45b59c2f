use std::io::{self, BufRead, Write};

use crate::ops::controller::Dialog;

/// `Dialog` over a line-based terminal: alerts go to `output` as
/// `alert: <message>`, confirmations read a y/N answer from `input`.
pub struct TerminalDialog<R, W> {
    input: R,
    output: W,
    assume_yes: bool,
    alerts: usize,
}

impl TerminalDialog<io::StdinLock<'static>, io::Stderr> {
    pub fn stdio(assume_yes: bool) -> Self {
        TerminalDialog::new(io::stdin().lock(), io::stderr(), assume_yes)
    }
}

impl<R: BufRead, W: Write> TerminalDialog<R, W> {
    pub fn new(input: R, output: W, assume_yes: bool) -> Self {
        TerminalDialog {
            input,
            output,
            assume_yes,
            alerts: 0,
        }
    }

    /// Number of alerts shown so far
    pub fn alerts_shown(&self) -> usize {
        self.alerts
    }

    pub fn into_output(self) -> W {
        self.output
    }
}

impl<R: BufRead, W: Write> Dialog for TerminalDialog<R, W> {
    fn show_alert(&mut self, message: &str) {
        self.alerts += 1;
        let _ = writeln!(self.output, "alert: {}", message);
    }

    fn ask_confirm(&mut self, message: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        let _ = write!(self.output, "{} [y/N] ", message);
        let _ = self.output.flush();

        let mut answer = String::new();
        match self.input.read_line(&mut answer) {
            // EOF counts as dismissing the prompt
            Ok(0) | Err(_) => {
                let _ = writeln!(self.output);
                false
            }
            Ok(_) => matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn dialog(input: &str, assume_yes: bool) -> TerminalDialog<Cursor<Vec<u8>>, Vec<u8>> {
        TerminalDialog::new(Cursor::new(input.as_bytes().to_vec()), Vec::new(), assume_yes)
    }

    #[test]
    fn alert_is_prefixed_and_counted() {
        let mut d = dialog("", false);
        d.show_alert("Please provide a valid task");
        assert_eq!(d.alerts_shown(), 1);
        assert_eq!(
            String::from_utf8(d.into_output()).unwrap(),
            "alert: Please provide a valid task\n"
        );
    }

    #[test]
    fn confirm_accepts_y_and_yes() {
        assert!(dialog("y\n", false).ask_confirm("Delete?"));
        assert!(dialog("YES\n", false).ask_confirm("Delete?"));
        assert!(dialog("  y  \n", false).ask_confirm("Delete?"));
    }

    #[test]
    fn confirm_defaults_to_no() {
        assert!(!dialog("\n", false).ask_confirm("Delete?"));
        assert!(!dialog("n\n", false).ask_confirm("Delete?"));
        assert!(!dialog("maybe\n", false).ask_confirm("Delete?"));
        assert!(!dialog("", false).ask_confirm("Delete?"));
    }

    #[test]
    fn confirm_prints_prompt() {
        let mut d = dialog("n\n", false);
        d.ask_confirm("Are you sure you want to delete this task?");
        assert_eq!(
            String::from_utf8(d.into_output()).unwrap(),
            "Are you sure you want to delete this task? [y/N] "
        );
    }

    #[test]
    fn assume_yes_skips_prompt() {
        let mut d = dialog("", true);
        assert!(d.ask_confirm("Delete?"));
        assert!(d.into_output().is_empty());
    }
}
