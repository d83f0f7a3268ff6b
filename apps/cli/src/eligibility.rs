//! Eligibility list parsing.
//!
//! One address per line, optionally followed by a comma and its total
//! entitlement (decimal or `0x` hex). Lines without an amount take the
//! `--amount` default. Blank lines and `#` comments are skipped. An empty
//! list parses fine; building a tree from it is what fails.
//!
//! ```text
//! # round 2
//! 0x1111111111111111111111111111111111111111,2500000
//! 0x2222222222222222222222222222222222222222
//! ```

use std::fs;
use std::path::Path;

use anyhow::{anyhow, Context, Result};

use dropcraft_core::{parse_amount, Address, Amount};
use dropcraft_merkle::Leaf;

pub fn load(path: &Path, default_amount: Option<Amount>) -> Result<Vec<Leaf>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read eligibility list {}", path.display()))?;
    parse(&content, default_amount).with_context(|| format!("In {}", path.display()))
}

pub fn parse(content: &str, default_amount: Option<Amount>) -> Result<Vec<Leaf>> {
    let mut leaves = Vec::new();

    for (number, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let (address, amount) = match line.split_once(',') {
            Some((address, amount)) => (address.trim(), Some(amount.trim())),
            None => (line, None),
        };

        let address: Address = address
            .parse()
            .with_context(|| format!("line {}: bad address", number + 1))?;
        let entitlement = match amount {
            Some(amount) => parse_amount(amount)
                .with_context(|| format!("line {}: bad amount", number + 1))?,
            None => default_amount
                .ok_or_else(|| anyhow!("line {}: no amount and no --amount default", number + 1))?,
        };

        leaves.push(Leaf::new(address, entitlement));
    }

    Ok(leaves)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const A: &str = "0x1111111111111111111111111111111111111111";
    const B: &str = "0x2222222222222222222222222222222222222222";

    #[test]
    fn test_parse_explicit_amounts() {
        let content = format!("{},1000000\n{}, 0x10\n", A, B);
        let leaves = parse(&content, None).unwrap();

        assert_eq!(leaves.len(), 2);
        assert_eq!(leaves[0], Leaf::new(Address::new([0x11; 20]), 1_000_000));
        assert_eq!(leaves[1], Leaf::new(Address::new([0x22; 20]), 16));
    }

    #[test]
    fn test_parse_default_amount() {
        let content = format!("# wallets\n\n{}\n{},7\n", A, B);
        let leaves = parse(&content, Some(500)).unwrap();

        assert_eq!(leaves[0].entitlement, 500);
        assert_eq!(leaves[1].entitlement, 7);
    }

    #[test]
    fn test_missing_amount_without_default() {
        let err = parse(A, None).unwrap_err();
        assert!(err.to_string().contains("line 1"));
    }

    #[test]
    fn test_bad_address_reports_line() {
        let content = format!("{},1\n0x1234,1\n", A);
        let err = parse(&content, None).unwrap_err();
        assert!(err.to_string().contains("line 2"));
    }

    #[test]
    fn test_comment_only_list_is_empty() {
        assert!(parse("# nothing\n\n", Some(1)).unwrap().is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "{},1", A).unwrap();
        writeln!(file, "{},2", B).unwrap();

        let leaves = load(file.path(), None).unwrap();
        assert_eq!(leaves.len(), 2);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load(&dir.path().join("absent.csv"), None).is_err());
    }
}
