//! Decode a `wa.me` order link.

use std::io::Write;

use matgar_core::ChatLink;

use super::CliError;

/// Print the recipient and decoded message of `url`.
///
/// # Errors
///
/// Returns an error if `url` is not a `wa.me` link with a `text` parameter.
pub fn run(url: &str) -> Result<(), CliError> {
    let (recipient, text) = ChatLink::parse(url)?;

    let mut out = std::io::stdout().lock();
    writeln!(out, "recipient: {recipient}")?;
    writeln!(out)?;
    writeln!(out, "{text}")?;
    Ok(())
}
