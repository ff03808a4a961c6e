mod error;

pub use self::error::PoolError;

use core::num::NonZeroUsize;

use diesel::ConnectionError;
use diesel_async::{
    AsyncPgConnection,
    pooled_connection::{
        AsyncDieselConnectionManager, ManagerConfig,
        deadpool::{Object, Pool},
    },
};
use rustls::{ClientConfig, RootCertStore};
use rustls_native_certs::CertificateResult;
use tokio::task;
use tokio_postgres_rustls::MakeRustlsConnect;

/// The deadpool-managed pool of async PostgreSQL connections.
pub type DbPool = Pool<AsyncPgConnection>;

/// One checked-out connection; returns to the pool on drop.
pub type DbConn = Object<AsyncPgConnection>;

/// Opens a connection pool against the PostgreSQL database at `url`.
///
/// All connections negotiate TLS through rustls with the platform's native
/// root certificates, so `sslmode=require` URLs work without extra setup.
///
/// # Errors
///
/// If the native certificate store cannot be loaded, or the pool cannot be
/// built from `url` and `max_size`.
#[tracing::instrument(skip(url))]
pub async fn establish_pool<U>(url: U, max_size: NonZeroUsize) -> Result<DbPool, PoolError>
where
    String: From<U>,
{
    // Reading the certificate store touches the filesystem.
    let tls = task::spawn_blocking(native_tls_connector).await??;

    let mut manager_config = ManagerConfig::default();
    manager_config.custom_setup = Box::new(move |url: &str| {
        let tls = tls.clone();
        let url = url.to_string();

        Box::pin(async move { connect(&url, tls).await })
    });

    let manager =
        AsyncDieselConnectionManager::<AsyncPgConnection>::new_with_config(url, manager_config);

    Pool::builder(manager).max_size(max_size.get()).build().map_err(From::from)
}

async fn connect(url: &str, tls: MakeRustlsConnect) -> Result<AsyncPgConnection, ConnectionError> {
    let (client, conn) = tokio_postgres::connect(url, tls)
        .await
        .map_err(|e| ConnectionError::BadConnection(e.to_string()))?;

    // The connection object drives the wire protocol until the client drops.
    tokio::spawn(conn);

    AsyncPgConnection::try_from(client).await
}

fn native_tls_connector() -> Result<MakeRustlsConnect, rustls::Error> {
    let CertificateResult { certs, .. } = rustls_native_certs::load_native_certs();

    let mut roots = RootCertStore::empty();
    for cert in certs {
        roots.add(cert)?;
    }

    let config = ClientConfig::builder().with_root_certificates(roots).with_no_client_auth();

    Ok(MakeRustlsConnect::new(config))
}
