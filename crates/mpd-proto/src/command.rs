//! Command-line encoding (§6): `<name>[ <arg>]*\n`, with `"`-quoting and
//! `\\`/`\"` escaping for arguments containing whitespace.

/// Builds one command line, ready to write to the socket. Always
/// newline-terminated, per §3's Task invariant.
pub fn encode(name: &str, args: &[&str]) -> Vec<u8> {
    let mut out = String::with_capacity(name.len() + 16);
    out.push_str(name);
    for arg in args {
        out.push(' ');
        if needs_quoting(arg) {
            out.push('"');
            for ch in arg.chars() {
                if ch == '\\' || ch == '"' {
                    out.push('\\');
                }
                out.push(ch);
            }
            out.push('"');
        } else {
            out.push_str(arg);
        }
    }
    out.push('\n');
    out.into_bytes()
}

fn needs_quoting(arg: &str) -> bool {
    arg.is_empty() || arg.contains(|c: char| c.is_whitespace() || c == '"' || c == '\\')
}
