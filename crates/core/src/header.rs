//! Generated headers: rename macros for the symbol pipeline, byte arrays for
//! the string pipeline. Both are rebuilt from scratch on every run.

use crate::literal::StringTable;
use crate::names::NameMap;
use std::fmt::Write;

/// Renders the rename-macro header, one `#define original alias` per entry
/// in sorted order of the original name.
pub fn emit_macro_header(map: &NameMap, guard: &str) -> String {
    let mut out = String::new();
    out.push_str("// Auto-generated function and variable obfuscation macros\n");
    let _ = writeln!(out, "#ifndef {guard}");
    let _ = writeln!(out, "#define {guard}\n");
    out.push_str("// Function and variable name obfuscation macros\n");
    for (original, alias) in map.iter() {
        let _ = writeln!(out, "#define {original} {alias}");
    }
    let _ = writeln!(out, "\n#endif // {guard}");
    out
}

/// Renders the byte-array header: per entry the encoded array with a
/// provenance comment, then its `_LEN` and `_KEY` macros.
pub fn emit_string_header(table: &StringTable, guard: &str) -> String {
    let mut out = String::new();
    out.push_str("// Auto-generated obfuscated pointers\n");
    let _ = writeln!(out, "#ifndef {guard}");
    let _ = writeln!(out, "#define {guard}\n");
    for entry in table.entries() {
        let bytes = entry
            .cipher
            .iter()
            .map(|b| format!("0x{b:02X}"))
            .collect::<Vec<_>>()
            .join(", ");
        let _ = writeln!(
            out,
            "static const unsigned char {}[] = {{{}}}; // \"{}\"",
            entry.macro_name,
            bytes,
            line_comment_safe(&entry.original)
        );
        let _ = writeln!(out, "#define {} {}", entry.len_macro(), entry.cipher.len());
        let _ = writeln!(out, "#define {} 0x{:02X}", entry.key_macro(), entry.key);
    }
    let _ = writeln!(out, "\n#endif // {guard}");
    out
}

/// A trailing backslash would splice the next header line into the comment.
fn line_comment_safe(text: &str) -> String {
    if text.ends_with('\\') {
        format!("{text} ")
    } else {
        text.to_string()
    }
}
