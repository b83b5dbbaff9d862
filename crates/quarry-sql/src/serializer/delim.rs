use super::{Formatter, Params, ToSql};

/// Comma separated fragment list.
pub(super) struct Comma<L>(pub(super) L);

impl<L> ToSql for Comma<L>
where
    L: IntoIterator,
    L::Item: ToSql,
{
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let mut first = true;
        for item in self.0 {
            if !first {
                fmt!(f, ", ");
            }
            item.to_sql(f);
            first = false;
        }
    }
}
