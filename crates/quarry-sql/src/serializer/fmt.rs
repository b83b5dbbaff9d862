use super::{Formatter, Params};

/// One SQL fragment, written straight into the output buffer.
///
/// Value fragments push their bindings as they render; rendering and binding
/// collection happen in the same left-to-right pass.
pub(super) trait ToSql {
    fn to_sql<T: Params>(self, f: &mut Formatter<'_, T>);
}

impl ToSql for &str {
    fn to_sql<T: Params>(self, f: &mut Formatter<'_, T>) {
        f.dst.push_str(self);
    }
}

macro_rules! fmt {
    ($f:expr, $( $fragment:expr )+) => {{
        let f = &mut *$f;
        $( $fragment.to_sql(f); )+
    }};
}
