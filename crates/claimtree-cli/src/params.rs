//! # Withdrawal Run Parameters
//!
//! A withdrawal run needs an epoch label, a snapshot block, the window's
//! index, budget and block range, and a decision whether to write. The
//! pipeline asks a [`ParameterSource`] for them and does not care whether
//! they came from an operator at a terminal or from command-line flags.
//!
//! ## Prompt Sequence
//!
//! 1. `What is the epoch {YYYY}-{MM}? eg: 2022-11`
//! 2. `What is the block number?`
//! 3. `WindowIndex, budget (in wei), startBlock, and endBlock, separated by spaces:`
//! 4. `Do you want to write the merkleTree file? (y/n)`

use std::io::{BufRead, Write};

use claimtree_core::{Amount, ClaimError};

/// Everything a withdrawal run needs beyond the snapshot itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithdrawalParams {
    /// Label of the reporting period, e.g. `2022-11`.
    pub epoch: String,
    /// Block height of the balance snapshot.
    pub block_number: u64,
    pub window_index: u64,
    /// Withdrawal cap in base units.
    pub budget: Amount,
    pub start_block: u64,
    pub end_block: u64,
    /// `false` for a dry run: build and print only.
    pub write: bool,
}

/// Operator-supplied parameters were malformed.
#[derive(Debug, thiserror::Error)]
pub enum ParamsError {
    #[error("input ended before {0} was answered")]
    UnexpectedEof(&'static str),

    #[error("epoch {0:?} must be non-empty and contain no path separators")]
    InvalidEpoch(String),

    #[error("{field} must be a non-negative integer, got {value:?}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("Incorrect number of inputs: expected 4 (windowIndex budget startBlock endBlock), got {0}")]
    FieldCount(usize),

    #[error("invalid budget: {0}")]
    InvalidBudget(#[source] ClaimError),

    #[error("answer y/yes or n/no, got {0:?}")]
    InvalidConfirmation(String),

    #[error("startBlock {start} is after endBlock {end}")]
    InvertedRange { start: u64, end: u64 },

    #[error("failed to talk to the operator: {0}")]
    Io(#[from] std::io::Error),
}

/// Something that can produce the parameters for one withdrawal run.
pub trait ParameterSource {
    fn obtain(&mut self) -> Result<WithdrawalParams, ParamsError>;
}

/// Parameters fixed up front, e.g. from command-line flags.
#[derive(Debug, Clone)]
pub struct FixedParams(pub WithdrawalParams);

impl ParameterSource for FixedParams {
    fn obtain(&mut self) -> Result<WithdrawalParams, ParamsError> {
        let params = self.0.clone();
        check_epoch(&params.epoch)?;
        check_range(params.start_block, params.end_block)?;
        Ok(params)
    }
}

/// Sequential prompts over any reader/writer pair.
pub struct PromptSource<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> PromptSource<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    fn ask(&mut self, question: &str, what: &'static str) -> Result<String, ParamsError> {
        writeln!(self.output, "{question}")?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(ParamsError::UnexpectedEof(what));
        }
        Ok(line.trim().to_string())
    }
}

impl<R: BufRead, W: Write> ParameterSource for PromptSource<R, W> {
    fn obtain(&mut self) -> Result<WithdrawalParams, ParamsError> {
        let epoch = self.ask("What is the epoch {YYYY}-{MM}? eg: 2022-11", "epoch")?;
        check_epoch(&epoch)?;
        let block = self.ask("What is the block number?", "block number")?;
        let block_number = parse_u64("block number", &block)?;
        let window = self.ask(
            "WindowIndex, budget (in wei), startBlock, and endBlock, separated by spaces:",
            "window parameters",
        )?;
        let (window_index, budget, start_block, end_block) = parse_window_line(&window)?;
        let answer = self.ask("Do you want to write the merkleTree file? (y/n)", "confirmation")?;
        let write = parse_confirmation(&answer)?;
        Ok(WithdrawalParams {
            epoch,
            block_number,
            window_index,
            budget,
            start_block,
            end_block,
            write,
        })
    }
}

/// Split the window line into `(windowIndex, budget, startBlock, endBlock)`.
pub fn parse_window_line(line: &str) -> Result<(u64, Amount, u64, u64), ParamsError> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    let [window, budget, start, end] = fields.as_slice() else {
        return Err(ParamsError::FieldCount(fields.len()));
    };
    let window_index = parse_u64("windowIndex", window)?;
    let budget = Amount::parse(budget).map_err(ParamsError::InvalidBudget)?;
    let start_block = parse_u64("startBlock", start)?;
    let end_block = parse_u64("endBlock", end)?;
    check_range(start_block, end_block)?;
    Ok((window_index, budget, start_block, end_block))
}

/// `y`/`yes` writes, `n`/`no` is a dry run.
pub fn parse_confirmation(answer: &str) -> Result<bool, ParamsError> {
    match answer.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" => Ok(true),
        "n" | "no" => Ok(false),
        _ => Err(ParamsError::InvalidConfirmation(answer.to_string())),
    }
}

/// The epoch becomes a directory name under the reports root.
pub fn check_epoch(epoch: &str) -> Result<(), ParamsError> {
    let bad = epoch.is_empty()
        || epoch == "."
        || epoch == ".."
        || epoch.contains(|c: char| c == '/' || c == '\\')
        || epoch.chars().any(char::is_control);
    if bad {
        return Err(ParamsError::InvalidEpoch(epoch.to_string()));
    }
    Ok(())
}

fn check_range(start: u64, end: u64) -> Result<(), ParamsError> {
    if start > end {
        return Err(ParamsError::InvertedRange { start, end });
    }
    Ok(())
}

fn parse_u64(field: &'static str, raw: &str) -> Result<u64, ParamsError> {
    raw.trim().parse().map_err(|_| ParamsError::InvalidNumber {
        field,
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn prompt(input: &str) -> (Result<WithdrawalParams, ParamsError>, String) {
        let mut out = Vec::new();
        let result = PromptSource::new(Cursor::new(input.as_bytes()), &mut out).obtain();
        (result, String::from_utf8(out).unwrap())
    }

    #[test]
    fn prompts_in_order_and_parses_answers() {
        let (result, transcript) = prompt("2022-11\n16000000\n3 5000000000000000000 100 200\ny\n");
        let params = result.unwrap();
        assert_eq!(
            params,
            WithdrawalParams {
                epoch: "2022-11".into(),
                block_number: 16_000_000,
                window_index: 3,
                budget: Amount::parse("5000000000000000000").unwrap(),
                start_block: 100,
                end_block: 200,
                write: true,
            }
        );
        let epoch_at = transcript.find("epoch").unwrap();
        let block_at = transcript.find("block number").unwrap();
        let window_at = transcript.find("WindowIndex").unwrap();
        let confirm_at = transcript.find("(y/n)").unwrap();
        assert!(epoch_at < block_at && block_at < window_at && window_at < confirm_at);
    }

    #[test]
    fn negative_confirmation_is_dry_run() {
        let (result, _) = prompt("2022-11\n1\n0 10 1 2\nn\n");
        assert!(!result.unwrap().write);
    }

    #[test]
    fn wrong_field_count_is_rejected() {
        let (result, _) = prompt("2022-11\n1\n0 10 1\n");
        assert!(matches!(result, Err(ParamsError::FieldCount(3))));
        assert!(matches!(parse_window_line("0 1 2 3 4"), Err(ParamsError::FieldCount(5))));
    }

    #[test]
    fn extra_spaces_between_fields_are_fine() {
        let (window, budget, start, end) = parse_window_line("  1   20  3    4 ").unwrap();
        assert_eq!((window, budget, start, end), (1, Amount::from(20u64), 3, 4));
    }

    #[test]
    fn non_numeric_block_is_rejected() {
        let (result, _) = prompt("2022-11\nlatest\n");
        assert!(matches!(
            result,
            Err(ParamsError::InvalidNumber { field: "block number", .. })
        ));
    }

    #[test]
    fn negative_budget_is_rejected() {
        assert!(matches!(
            parse_window_line("0 -5 1 2"),
            Err(ParamsError::InvalidBudget(ClaimError::NegativeAmount(_)))
        ));
    }

    #[test]
    fn inverted_range_is_rejected() {
        assert!(matches!(
            parse_window_line("0 5 9 2"),
            Err(ParamsError::InvertedRange { start: 9, end: 2 })
        ));
    }

    #[test]
    fn ambiguous_confirmation_is_rejected() {
        assert!(parse_confirmation("Y").unwrap());
        assert!(!parse_confirmation("No").unwrap());
        assert!(matches!(
            parse_confirmation("maybe"),
            Err(ParamsError::InvalidConfirmation(_))
        ));
    }

    #[test]
    fn truncated_input_is_reported() {
        let (result, _) = prompt("2022-11\n");
        assert!(matches!(result, Err(ParamsError::UnexpectedEof("block number"))));
    }

    #[test]
    fn epoch_must_be_a_single_path_component() {
        for bad in ["", "..", "2022/11", "a\\b"] {
            assert!(check_epoch(bad).is_err(), "{bad:?}");
        }
        assert!(check_epoch("2022-11").is_ok());
    }

    #[test]
    fn fixed_params_are_checked() {
        let params = WithdrawalParams {
            epoch: "../etc".into(),
            block_number: 1,
            window_index: 0,
            budget: Amount::ZERO,
            start_block: 1,
            end_block: 1,
            write: false,
        };
        assert!(FixedParams(params).obtain().is_err());
    }
}
