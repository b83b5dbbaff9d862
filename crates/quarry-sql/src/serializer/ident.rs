use super::{Formatter, Params, ToSql};

/// An identifier, quoted for MySQL.
///
/// Dotted paths quote each segment separately. Embedded backticks are
/// escaped by doubling. A `*` segment passes through unquoted.
pub(super) struct Ident<'a>(pub(super) &'a str);

impl ToSql for Ident<'_> {
    fn to_sql<T: Params>(self, f: &mut Formatter<'_, T>) {
        let mut first = true;
        for part in self.0.split('.') {
            if !first {
                f.dst.push('.');
            }
            first = false;

            if part == "*" {
                f.dst.push('*');
                continue;
            }

            f.dst.push('`');
            for ch in part.chars() {
                if ch == '`' {
                    f.dst.push('`');
                }
                f.dst.push(ch);
            }
            f.dst.push('`');
        }
    }
}
