use diesel::pg::PgConnection;
use diesel::{Connection, ConnectionResult};

/// Open a dedicated connection whose `application_name` identifies the
/// caller in `pg_stat_activity`.
pub fn establish_connection(
    database_url: &str,
    application_name: &str,
) -> ConnectionResult<PgConnection> {
    PgConnection::establish(&with_application_name(database_url, application_name))
}

fn with_application_name(url: &str, application_name: &str) -> String {
    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}application_name={application_name}")
}
