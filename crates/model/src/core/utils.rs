use std::fmt::Write;

/// Escape CSV per PostgreSQL COPY CSV rules:
/// - field is wrapped in double quotes
/// - internal `"` becomes `""`
/// - delimiters, newlines, tabs are safe because quoting protects them
pub fn escape_csv_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');

    for ch in s.chars() {
        if ch == '"' {
            out.push('"'); // double the quote
        }
        out.push(ch);
    }

    out.push('"');
    out
}

pub fn encode_bytea(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(2 + 2 * bytes.len());
    out.push_str("\\x");
    for b in bytes {
        // Writing into a String cannot fail.
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

/// Quotes a Postgres identifier: `orders` -> `"orders"`.
pub fn quote_pg_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Quotes a MySQL identifier: `orders` -> `` `orders` ``.
pub fn quote_mysql_ident(ident: &str) -> String {
    format!("`{}`", ident.replace('`', "``"))
}

/// Quotes a Postgres string literal: `it's` -> `'it''s'`.
pub fn quote_pg_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
