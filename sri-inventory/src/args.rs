//! Reader for `--key=value` command-line tokens.
//!
//! The binary parses its flags with clap, but build scripts that wrap this
//! tool frequently forward values with their quotes intact
//! (`--target="dist/app"`). Every flag token is passed through [`parse_flag`]
//! first so a single layer of surrounding quotes never reaches the parser.

use std::collections::BTreeMap;

/// Flag name (without the leading `--`) to its value, `None` when the flag
/// carried no `=value`.
pub type FlagMap = BTreeMap<String, Option<String>>;

/// Splits a single `--key=value` token.
///
/// Returns `None` for tokens that are not long flags (positional values,
/// short flags, and the bare `--` separator). An empty value is reported as
/// absent.
pub fn parse_flag(token: &str) -> Option<(String, Option<String>)> {
    let rest = token.strip_prefix("--")?;
    if rest.is_empty() {
        return None
    }
    match rest.split_once('=') {
        Some((key, value)) => {
            let value = unquote(value);
            let value = if value.is_empty() { None } else { Some(value.to_string()) };
            Some((key.to_string(), value))
        }
        None => Some((rest.to_string(), None)),
    }
}

/// Collects every long flag of an argument list into a [`FlagMap`].
///
/// Later occurrences of a flag overwrite earlier ones.
pub fn read_flags<I, S>(args: I) -> FlagMap
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    args.into_iter()
        .filter_map(|arg| parse_flag(arg.as_ref()))
        .collect()
}

/// Strips one leading and one trailing quote character (`'` or `"`).
///
/// The two ends are handled independently, so mismatched quotes are still
/// removed.
pub fn unquote(value: &str) -> &str {
    let value = value
        .strip_prefix('"')
        .or_else(|| value.strip_prefix('\''))
        .unwrap_or(value);
    value
        .strip_suffix('"')
        .or_else(|| value.strip_suffix('\''))
        .unwrap_or(value)
}

/// Rewrites long-flag tokens with their values unquoted; everything else is
/// passed through untouched.
pub fn normalize_args<I, S>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    args.into_iter()
        .map(|arg| {
            let arg = arg.as_ref();
            match parse_flag(arg) {
                Some((key, Some(value))) => format!("--{key}={value}"),
                Some((key, None)) => format!("--{key}"),
                None => arg.to_string(),
            }
        })
        .collect()
}
