use rustls::{ClientConfig, RootCertStore, pki_types::CertificateDer};
use rustls_pemfile::certs;
use std::{
    fs::File,
    io::{self, BufReader},
    path::{Path, PathBuf},
};

// ----------------------------------------------------------------------
// ROOT STORE AND CONSTANTS
// ----------------------------------------------------------------------
/// Environment variable overriding the CA bundle location.
pub const CA_BUNDLE_ENV: &str = "SSL_CERT_FILE";

/// Well-known CA bundle locations, tried in order.
pub const CA_BUNDLE_PATHS: &[&str] = &[
    "/etc/ssl/certs/ca-certificates.crt",
    "/etc/pki/tls/certs/ca-bundle.crt",
    "/etc/ssl/ca-bundle.pem",
    "/etc/ssl/cert.pem",
    "/usr/local/etc/openssl/cert.pem",
];

/// Loads a certificate chain from a PEM file.
///
/// # Errors
///
/// Returns an `io::Error` if the file cannot be opened, the PEM content is
/// invalid or holds no certificate.
pub fn load_certs(path: &Path) -> io::Result<Vec<CertificateDer<'static>>> {
    let file = File::open(path).map_err(|e| {
        io::Error::new(e.kind(), format!("opening CA bundle {}: {e}", path.display()))
    })?;
    let mut reader = BufReader::new(file);

    let certs: Vec<CertificateDer<'static>> = certs(&mut reader)
        .collect::<Result<_, _>>()
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, format!("invalid certs: {e}")))?;

    if certs.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("no certificates found in {}", path.display()),
        ));
    }

    Ok(certs)
}

/// Locates the system CA bundle: `SSL_CERT_FILE` first, then the usual paths.
#[must_use]
pub fn find_ca_bundle() -> Option<PathBuf> {
    std::env::var_os(CA_BUNDLE_ENV)
        .map(PathBuf::from)
        .into_iter()
        .chain(CA_BUNDLE_PATHS.iter().map(PathBuf::from))
        .find(|p| p.is_file())
}

/// Builds a `RootCertStore` from a PEM bundle.
///
/// Certificates rustls cannot parse are skipped; an error is returned only
/// when none is usable.
///
/// # Errors
///
/// Returns an `io::Error` if the bundle cannot be read or yields no usable
/// certificate.
pub fn build_root_store(bundle: &Path) -> io::Result<RootCertStore> {
    let mut root_store = RootCertStore::empty();
    let (added, ignored) = root_store.add_parsable_certificates(load_certs(bundle)?);

    if added == 0 {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            format!("CA bundle {} has no usable certificate", bundle.display()),
        ));
    }
    if ignored > 0 {
        tracing::debug!(added, ignored, bundle = %bundle.display(), "skipped unparsable CA certificates");
    }

    Ok(root_store)
}

/// ClientConfig trusting the system CA bundle, handed to the HTTPS client.
///
/// # Errors
///
/// Returns an `io::Error` if no CA bundle can be found or loaded.
pub fn build_system_client_config() -> io::Result<ClientConfig> {
    let bundle = find_ca_bundle().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::NotFound,
            format!("no CA bundle found; set {CA_BUNDLE_ENV}"),
        )
    })?;
    let root_store = build_root_store(&bundle)?;

    let config = ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth();

    Ok(config)
}
