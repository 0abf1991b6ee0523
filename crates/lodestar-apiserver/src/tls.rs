use miette::{miette, Context, IntoDiagnostic};
use rcgen::{BasicConstraints, CertificateParams, ExtendedKeyUsagePurpose, IsCa, KeyPair};
use std::path::{Path, PathBuf};
use tracing::info;

const CA_FILE: &str = "ca.pem";
const CERT_FILE: &str = "extender.pem";
const KEY_FILE: &str = "extender-key.pem";

/// Transport security for the extender endpoint
#[derive(Debug, Clone, Default)]
pub enum TlsMode {
    /// Plain HTTP
    #[default]
    Disabled,
    /// Self-signed CA and serving certificate kept in `dir`, created on first start
    AutoGenerate {
        dir: PathBuf,
        san_entries: Vec<String>,
    },
    /// Operator-supplied PEM files
    Provided {
        cert_path: PathBuf,
        key_path: PathBuf,
    },
}

/// PEM material the listener is started with
#[derive(Debug, Clone)]
pub struct TlsMaterial {
    pub cert_pem: Vec<u8>,
    pub key_pem: Vec<u8>,
    /// Only known for generated material; hand it to the orchestrator as its trust root
    pub ca_pem: Option<Vec<u8>>,
}

/// Load or create the TLS material for `mode`. `Disabled` yields `None`.
pub fn resolve_tls(mode: &TlsMode) -> miette::Result<Option<TlsMaterial>> {
    let material = match mode {
        TlsMode::Disabled => return Ok(None),
        TlsMode::AutoGenerate { dir, san_entries } => {
            let paths = [dir.join(CA_FILE), dir.join(CERT_FILE), dir.join(KEY_FILE)];

            if paths.iter().all(|p| p.exists()) {
                info!("Reusing TLS material in {}", dir.display());
                TlsMaterial {
                    ca_pem: Some(read_pem(&paths[0], "CA certificate")?),
                    cert_pem: read_pem(&paths[1], "serving certificate")?,
                    key_pem: read_pem(&paths[2], "serving key")?,
                }
            } else {
                info!("Generating self-signed TLS material in {}", dir.display());
                generate_self_signed(dir, san_entries)?
            }
        }
        TlsMode::Provided {
            cert_path,
            key_path,
        } => TlsMaterial {
            cert_pem: read_pem(cert_path, "TLS certificate")?,
            key_pem: read_pem(key_path, "TLS key")?,
            ca_pem: None,
        },
    };

    validate(&material)?;
    Ok(Some(material))
}

/// Make the process-wide rustls crypto provider available before any TLS config is built
pub fn install_crypto_provider() {
    // Fails only when a provider is already installed
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();
}

fn read_pem(path: &Path, what: &str) -> miette::Result<Vec<u8>> {
    std::fs::read(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("failed to read {} at {}", what, path.display()))
}

/// Check that the certificate file holds at least one certificate and the key file a key
fn validate(material: &TlsMaterial) -> miette::Result<()> {
    let certs = rustls_pemfile::certs(&mut material.cert_pem.as_slice())
        .collect::<Result<Vec<_>, _>>()
        .into_diagnostic()
        .wrap_err("failed to parse TLS certificate PEM")?;
    if certs.is_empty() {
        return Err(miette!(
            help = "The certificate file must contain a PEM encoded CERTIFICATE block",
            "no certificate found in TLS certificate file"
        ));
    }

    rustls_pemfile::private_key(&mut material.key_pem.as_slice())
        .into_diagnostic()
        .wrap_err("failed to parse TLS key PEM")?
        .ok_or_else(|| {
            miette!(
                help = "The key file must contain a PKCS#8, PKCS#1 or SEC1 private key",
                "no private key found in TLS key file"
            )
        })?;

    Ok(())
}

fn generate_self_signed(dir: &Path, san_entries: &[String]) -> miette::Result<TlsMaterial> {
    std::fs::create_dir_all(dir)
        .into_diagnostic()
        .wrap_err_with(|| format!("failed to create TLS directory {}", dir.display()))?;

    let ca_key = KeyPair::generate()
        .into_diagnostic()
        .wrap_err("failed to generate CA key")?;
    let mut ca_params = CertificateParams::new(vec!["Lodestar Extender CA".to_string()])
        .into_diagnostic()
        .wrap_err("invalid CA certificate parameters")?;
    ca_params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
    let ca_cert = ca_params
        .self_signed(&ca_key)
        .into_diagnostic()
        .wrap_err("failed to self-sign CA certificate")?;

    let serving_key = KeyPair::generate()
        .into_diagnostic()
        .wrap_err("failed to generate serving key")?;
    let mut serving_params = CertificateParams::new(san_entries.to_vec())
        .into_diagnostic()
        .wrap_err("invalid serving certificate parameters")?;
    serving_params.extended_key_usages = vec![ExtendedKeyUsagePurpose::ServerAuth];
    let serving_cert = serving_params
        .signed_by(&serving_key, &ca_cert, &ca_key)
        .into_diagnostic()
        .wrap_err("failed to sign serving certificate")?;

    let material = TlsMaterial {
        cert_pem: serving_cert.pem().into_bytes(),
        key_pem: serving_key.serialize_pem().into_bytes(),
        ca_pem: Some(ca_cert.pem().into_bytes()),
    };

    let files: [(&str, &[u8]); 3] = [
        (CA_FILE, material.ca_pem.as_deref().unwrap_or_default()),
        (CERT_FILE, &material.cert_pem),
        (KEY_FILE, &material.key_pem),
    ];
    for (name, contents) in files {
        let path = dir.join(name);
        std::fs::write(&path, contents)
            .into_diagnostic()
            .wrap_err_with(|| format!("failed to write {}", path.display()))?;
    }

    info!(
        "Wrote {}, {} and {} to {}",
        CA_FILE,
        CERT_FILE,
        KEY_FILE,
        dir.display()
    );

    Ok(material)
}
