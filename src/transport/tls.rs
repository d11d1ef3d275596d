//! TLS upgrade for outbound connections.

use std::sync::Arc;

use tokio::net::TcpStream;
use tokio_rustls::TlsConnector;
use tokio_rustls::client::TlsStream;
use tokio_rustls::rustls::pki_types::ServerName;
use tokio_rustls::rustls::{ClientConfig, RootCertStore};
use tracing::{debug, warn};

use super::TransportError;

/// Upgrades a TCP stream to TLS, verifying against the system roots.
pub async fn upgrade_to_tls(
    tcp_stream: TcpStream,
    hostname: &str,
) -> Result<TlsStream<TcpStream>, TransportError> {
    let mut roots = RootCertStore::empty();
    let certs = rustls_native_certs::load_native_certs();
    for cert in certs.certs {
        if let Err(e) = roots.add(cert) {
            warn!(error = %e, "Failed to add root cert");
        }
    }
    for e in certs.errors {
        warn!(error = %e, "Error loading native certs");
    }

    let config = ClientConfig::builder()
        .with_root_certificates(roots)
        .with_no_client_auth();
    let connector = TlsConnector::from(Arc::new(config));
    let server_name = ServerName::try_from(hostname.to_string())
        .map_err(|_| TransportError::InvalidServerName(hostname.to_string()))?;

    let tls_stream = connector
        .connect(server_name, tcp_stream)
        .await
        .map_err(TransportError::Tls)?;
    debug!(host = %hostname, "TLS handshake complete");
    Ok(tls_stream)
}
