//! Certificate name extraction.

use anyhow::Result;
use x509_parser::certificate::X509Certificate;
use x509_parser::extensions::{GeneralName, ParsedExtension};
use x509_parser::oid_registry::OID_X509_COMMON_NAME;

use crate::domain::{strip_wildcard_label, NameSet};

/// The names a certificate carries, before any normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CertificateNames {
    /// First subject attribute with OID 2.5.4.3, if any
    pub common_name: Option<String>,
    /// DNS-type Subject Alternative Names, in certificate order
    pub dns_names: Vec<String>,
}

impl CertificateNames {
    /// Parses a DER-encoded certificate and collects its names.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a valid X.509 certificate.
    pub fn from_der(der: &[u8]) -> Result<Self> {
        let (_, cert) = x509_parser::parse_x509_certificate(der)?;
        Ok(Self::from_certificate(&cert))
    }

    /// Collects the names of an already parsed certificate.
    pub fn from_certificate(cert: &X509Certificate<'_>) -> Self {
        Self {
            common_name: extract_common_name(cert),
            dns_names: extract_certificate_sans(cert),
        }
    }

    /// Normalizes into the ordered, deduplicated set of harvested names.
    ///
    /// The stripped CN comes first and keeps its spelling. Every stripped
    /// SAN not already seen follows, lower-cased. Names that strip to nothing
    /// are dropped.
    pub fn to_name_set(&self) -> NameSet {
        let mut names = NameSet::new();

        if let Some(cn) = &self.common_name {
            names.insert_verbatim(&strip_wildcard_label(cn));
        }
        names.merge(self.dns_names.iter().map(|name| strip_wildcard_label(name)));

        names
    }
}

/// Extracts the harvested names from a DER-encoded certificate.
///
/// # Errors
///
/// Returns an error if the certificate cannot be parsed.
pub fn names_from_der(der: &[u8]) -> Result<NameSet> {
    Ok(CertificateNames::from_der(der)?.to_name_set())
}

/// Returns the first Common Name attribute of the subject.
fn extract_common_name(cert: &X509Certificate<'_>) -> Option<String> {
    cert.subject()
        .iter_attributes()
        .find(|attr| attr.attr_type() == &OID_X509_COMMON_NAME)
        .and_then(|attr| attr.as_str().ok())
        .map(str::to_string)
}

/// Extracts DNS names from the Subject Alternative Name extension.
///
/// IP addresses, e-mail addresses and other name types are ignored.
fn extract_certificate_sans(cert: &X509Certificate<'_>) -> Vec<String> {
    let mut sans = Vec::new();

    for ext in cert.extensions() {
        if let ParsedExtension::SubjectAlternativeName(ref san) = ext.parsed_extension() {
            for general_name in &san.general_names {
                if let GeneralName::DNSName(dns_name) = general_name {
                    sans.push(dns_name.to_string());
                }
            }
        }
    }

    sans
}
