mod value;
use value::{row_from_sql, Param};

use mysql_async::prelude::{Queryable, ToValue};
use mysql_async::{Conn, Pool};

use quarry_core::driver::Response;
use quarry_core::stmt::Value;
use quarry_core::{async_trait, err, Error, Result};

use url::Url;

#[derive(Debug)]
pub struct MySQL {
    pool: Pool,
}

impl MySQL {
    /// Validates `url` and prepares a connection pool.
    ///
    /// Connections report found rows rather than changed rows, so an UPDATE
    /// whose version clause matched nothing is distinguishable from one that
    /// wrote the same values back.
    pub fn new(url: impl Into<String>) -> Result<Self> {
        let url_str = url.into();
        let url = Url::parse(&url_str).map_err(Error::connection)?;

        if url.scheme() != "mysql" {
            return Err(err!(
                "connection url does not have a `mysql` scheme; url={url}"
            ));
        }
        if url.host_str().is_none() {
            return Err(err!("missing host in connection url; url={url}"));
        }
        if url.path().is_empty() {
            return Err(err!(
                "no database specified - missing path in connection url; url={url}"
            ));
        }

        let opts = mysql_async::Opts::from_url(url.as_ref()).map_err(Error::connection)?;
        let opts = mysql_async::OptsBuilder::from_opts(opts).client_found_rows(true);

        Ok(Self {
            pool: Pool::new(opts),
        })
    }

    /// Checks a connection out of the pool.
    pub async fn connection(&self) -> Result<Connection> {
        let conn = self.pool.get_conn().await.map_err(Error::connection)?;
        Ok(Connection::new(conn))
    }
}

impl From<Pool> for MySQL {
    fn from(pool: Pool) -> Self {
        Self { pool }
    }
}

#[derive(Debug)]
pub struct Connection {
    conn: Conn,
}

impl Connection {
    pub fn new(conn: Conn) -> Self {
        Self { conn }
    }

    async fn exec_control(&mut self, sql: &str) -> Result<()> {
        self.conn
            .query_drop(sql)
            .await
            .map_err(|err| classify(sql, &[], err))
    }
}

impl From<Conn> for Connection {
    fn from(conn: Conn) -> Self {
        Self::new(conn)
    }
}

#[async_trait]
impl quarry_core::driver::Connection for Connection {
    async fn execute(&mut self, sql: &str, bindings: &[Value]) -> Result<Response> {
        let args: Vec<mysql_async::Value> = bindings
            .iter()
            .map(|binding| Param(binding).to_value())
            .collect();

        let statement = self
            .conn
            .prep(sql)
            .await
            .map_err(|err| classify(sql, bindings, err))?;

        if returns_rows(sql) {
            let rows: Vec<mysql_async::Row> = self
                .conn
                .exec(&statement, mysql_async::Params::Positional(args))
                .await
                .map_err(|err| classify(sql, bindings, err))?;

            Ok(Response::values(rows.into_iter().map(row_from_sql).collect()))
        } else {
            let affected = self
                .conn
                .exec_iter(&statement, mysql_async::Params::Positional(args))
                .await
                .map_err(|err| classify(sql, bindings, err))?
                .affected_rows();

            Ok(Response::count(affected).with_last_insert_id(self.conn.last_insert_id()))
        }
    }

    async fn begin(&mut self) -> Result<()> {
        self.exec_control("START TRANSACTION").await
    }

    async fn commit(&mut self) -> Result<()> {
        self.exec_control("COMMIT").await
    }

    async fn rollback(&mut self) -> Result<()> {
        self.exec_control("ROLLBACK").await
    }
}

/// Every statement here comes out of the serializer, so the leading token
/// decides whether a result set is read back. Union queries open with a
/// parenthesized SELECT.
fn returns_rows(sql: &str) -> bool {
    let head = sql.trim_start();
    head.starts_with("SELECT") || head.starts_with('(')
}

/// Maps a server failure onto the engine's error classes.
///
/// Lock contention (1213, 1205) becomes the retryable deadlock class; key
/// violations (1062, 1586) become the duplicate key class. Transport
/// failures become connection errors, everything else keeps the statement
/// for diagnostics.
fn classify(sql: &str, bindings: &[Value], err: mysql_async::Error) -> Error {
    match err {
        mysql_async::Error::Server(server) => match server.code {
            1213 | 1205 => Error::deadlock(server.code, server.message),
            1062 | 1586 => Error::duplicate_key(server.message),
            _ => Error::execution(
                sql,
                bindings.to_vec(),
                mysql_async::Error::Server(server),
            ),
        },
        mysql_async::Error::Io(_) | mysql_async::Error::Driver(_) => Error::connection(err),
        _ => Error::execution(sql, bindings.to_vec(), err),
    }
}
