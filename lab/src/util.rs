use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::Path;

/// Session seed from the command line or a seed file: `0x`-prefixed hex or
/// plain decimal, with optional `_` digit separators (`0xA5C4_0001`).
pub fn parse_seed(seed: &str) -> Result<u32> {
    let raw = seed.trim();
    let cleaned: String = raw.chars().filter(|c| *c != '_').collect();
    let (digits, radix) = match cleaned
        .strip_prefix("0x")
        .or_else(|| cleaned.strip_prefix("0X"))
    {
        Some(hex) => (hex, 16),
        None => (cleaned.as_str(), 10),
    };
    if digits.is_empty() {
        return Err(anyhow!("session seed `{raw}` has no digits"));
    }
    u32::from_str_radix(digits, radix)
        .with_context(|| format!("session seed `{raw}` is not a base-{radix} u32"))
}

/// Fixed-width hex, the form seeds take in reports and sweep summaries.
pub fn seed_to_hex(seed: u32) -> String {
    format!("{seed:#010x}")
}

pub fn fingerprint_to_hex(fingerprint: u64) -> String {
    format!("{fingerprint:016x}")
}

pub fn parse_seed_list(input: &str) -> Result<Vec<u32>> {
    let seeds = input
        .split([',', '\n'])
        .map(str::trim)
        .filter(|token| !token.is_empty() && !token.starts_with('#'))
        .map(parse_seed)
        .collect::<Result<Vec<_>>>()?;
    if seeds.is_empty() {
        return Err(anyhow!("no seeds parsed from input"));
    }
    Ok(seeds)
}

pub fn parse_seed_file(path: &Path) -> Result<Vec<u32>> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("failed reading seed file {}", path.display()))?;
    parse_seed_list(&data).with_context(|| format!("seed file {}", path.display()))
}

/// `count` seeds starting at `start`, stepped with a 32-bit LCG so nearby
/// runs do not share a low-bit pattern.
pub fn seed_range(start: u32, count: u32) -> Vec<u32> {
    let mut seeds = Vec::with_capacity(count as usize);
    let mut cur = start;
    for _ in 0..count {
        seeds.push(cur);
        cur = cur.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
    }
    seeds
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeds_parse_as_hex_or_decimal() {
        assert_eq!(parse_seed("0xDEADBEEF").unwrap(), 0xDEAD_BEEF);
        assert_eq!(parse_seed(" 42 ").unwrap(), 42);
        assert!(parse_seed("0xZZ").is_err());
        assert!(parse_seed("").is_err());
        assert!(parse_seed("0x").is_err());
        assert_eq!(parse_seed("0xA5C4_0001").unwrap(), 0xA5C4_0001);
        assert_eq!(parse_seed("1_000").unwrap(), 1_000);
        assert_eq!(seed_to_hex(0xBEEF), "0x0000beef");
    }

    #[test]
    fn seed_lists_skip_blanks_and_comments() {
        let seeds = parse_seed_list("1, 0x10,\n# note\n\n7").unwrap();
        assert_eq!(seeds, vec![1, 16, 7]);
        assert!(parse_seed_list(" , ").is_err());
    }

    #[test]
    fn seed_range_is_stable() {
        let seeds = seed_range(1, 3);
        assert_eq!(seeds[0], 1);
        assert_eq!(seeds[1], 1_664_525 + 1_013_904_223);
        assert_eq!(seeds.len(), 3);
    }
}
