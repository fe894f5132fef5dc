//! Encoders for the two places untrusted strings reach a shell parser.
//!
//! [`shell_quote`] is for words spliced into a command line that a POSIX
//! shell will parse. [`escape_scp_remote_path`] is for the remote half of an
//! `scp` path argument, which skips the local shell and is parsed by the
//! remote one. The two are not interchangeable: single-quoting an scp path
//! leaves literal quote characters in the filename, and backslash escaping
//! is not a complete defence inside a locally parsed command line.

/// Characters escaped with a backslash in remote-copy paths.
const SCP_SPECIAL: &[char] = &[
    '\\', '"', '\'', '`', '$', '!', '#', '&', '*', '(', ')', '[', ']', '{', '}', ';', '<', '>',
    '?', '|', '~', ':',
];

/// Quote `s` as a single POSIX shell word.
///
/// The result is `s` wrapped in single quotes with each embedded `'`
/// replaced by `'\''`. A POSIX shell parses it back to exactly `s`,
/// whatever it contains.
///
/// ```
/// use shellgate_security::shell_quote;
///
/// assert_eq!(shell_quote("abc"), "'abc'");
/// assert_eq!(shell_quote("a'b"), "'a'\\''b'");
/// assert_eq!(shell_quote(""), "''");
/// ```
pub fn shell_quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for ch in s.chars() {
        if ch == '\'' {
            out.push_str("'\\''");
        } else {
            out.push(ch);
        }
    }
    out.push('\'');
    out
}

/// Backslash-escape shell-significant characters in a remote scp path.
///
/// Never adds surrounding quotes. A newline or carriage return cannot be
/// carried this way: the remote shell reads backslash-newline as a line
/// continuation, so callers must reject such paths before copying.
///
/// ```
/// use shellgate_security::escape_scp_remote_path;
///
/// assert_eq!(escape_scp_remote_path("/tmp/file.deb"), "/tmp/file.deb");
/// assert_eq!(escape_scp_remote_path("/tmp/my file.deb"), "/tmp/my\\ file.deb");
/// ```
pub fn escape_scp_remote_path(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        if ch.is_whitespace() || SCP_SPECIAL.contains(&ch) {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
