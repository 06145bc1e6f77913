// Shared test helpers: synthetic certificates, local TLS servers and a mock DNS server.
//
// Every server binds to 127.0.0.1:0 and runs on a background task for the
// lifetime of the test runtime.

#![allow(dead_code)] // Each test file uses a different subset

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use hickory_proto::op::{Message, MessageType, OpCode, ResponseCode};
use hickory_proto::rr::rdata::A;
use hickory_proto::rr::{RData, Record, RecordType};
use hickory_proto::serialize::binary::BinEncodable;
use rcgen::{CertificateParams, DistinguishedName, DnType, KeyPair};
use rustls::crypto::ring;
use rustls::pki_types::{CertificateDer, PrivateKeyDer, PrivatePkcs8KeyDer};
use rustls::ServerConfig;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, UdpSocket};
use tokio_rustls::TlsAcceptor;

use cert_harvest::config::FetchSettings;
use cert_harvest::dns::{PoolResolver, ResolverPool};
use cert_harvest::error_handling::ProcessingStats;
use cert_harvest::CertificateFetcher;

/// A self-signed certificate and its private key.
pub struct TestCertificate {
    pub der: CertificateDer<'static>,
    pub key: PrivateKeyDer<'static>,
}

/// Generates a self-signed certificate with the given CN and DNS SANs.
pub fn make_certificate(common_name: Option<&str>, sans: &[&str]) -> TestCertificate {
    let mut params =
        CertificateParams::new(sans.iter().map(|s| s.to_string()).collect::<Vec<_>>())
            .expect("valid SANs");
    params.distinguished_name = DistinguishedName::new();
    if let Some(cn) = common_name {
        params.distinguished_name.push(DnType::CommonName, cn);
    }
    let key = KeyPair::generate().expect("key generation");
    let cert = params.self_signed(&key).expect("self-signed certificate");

    TestCertificate {
        der: cert.der().clone(),
        key: PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(key.serialize_der())),
    }
}

/// Starts a TLS server presenting `cert` to every client; returns its port.
pub async fn spawn_tls_server(cert: TestCertificate) -> u16 {
    let config = ServerConfig::builder_with_provider(Arc::new(ring::default_provider()))
        .with_safe_default_protocol_versions()
        .expect("protocol versions")
        .with_no_client_auth()
        .with_single_cert(vec![cert.der], cert.key)
        .expect("server certificate");
    let acceptor = TlsAcceptor::from(Arc::new(config));

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let port = listener.local_addr().expect("local addr").port();
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let acceptor = acceptor.clone();
            tokio::spawn(async move {
                // The client hangs up right after the handshake
                let _ = acceptor.accept(stream).await;
            });
        }
    });
    port
}

/// Starts a server that accepts TCP connections and never answers.
pub async fn spawn_stalling_server() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let port = listener.local_addr().expect("local addr").port();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((stream, _)) = listener.accept().await {
            held.push(stream);
        }
    });
    port
}

/// Starts a server that answers every connection with plain text and closes.
pub async fn spawn_plaintext_server() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let port = listener.local_addr().expect("local addr").port();
    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            let _ = stream
                .write_all(b"HTTP/1.1 400 Bad Request\r\nConnection: close\r\n\r\n")
                .await;
            let _ = stream.shutdown().await;
        }
    });
    port
}

/// Starts a UDP DNS server answering A queries for `host` with `ip`.
///
/// Every other name gets NXDOMAIN; other record types for `host` get an
/// empty answer.
pub async fn spawn_mock_dns(host: &'static str, ip: Ipv4Addr) -> SocketAddr {
    let socket = UdpSocket::bind("127.0.0.1:0").await.expect("bind");
    let addr = socket.local_addr().expect("local addr");
    tokio::spawn(async move {
        let mut buf = [0u8; 512];
        while let Ok((len, peer)) = socket.recv_from(&mut buf).await {
            let Ok(query) = Message::from_vec(&buf[..len]) else {
                continue;
            };

            let mut response = Message::new();
            response
                .set_id(query.id())
                .set_message_type(MessageType::Response)
                .set_op_code(OpCode::Query)
                .set_recursion_desired(query.recursion_desired())
                .set_recursion_available(true);
            response.add_queries(query.queries().to_vec());

            let mut known = false;
            for question in query.queries() {
                let name = question.name().to_ascii();
                if !name.trim_end_matches('.').eq_ignore_ascii_case(host) {
                    continue;
                }
                known = true;
                if question.query_type() == RecordType::A {
                    response.add_answer(Record::from_rdata(
                        question.name().clone(),
                        60,
                        RData::A(A(ip)),
                    ));
                }
            }
            response.set_response_code(if known {
                ResponseCode::NoError
            } else {
                ResponseCode::NXDomain
            });

            if let Ok(bytes) = response.to_bytes() {
                let _ = socket.send_to(&bytes, peer).await;
            }
        }
    });
    addr
}

/// Returns a local port with nothing listening on it.
pub fn unused_port() -> u16 {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind");
    listener.local_addr().expect("local addr").port()
}

/// Fetch settings with short deadlines for tests.
pub fn fast_settings() -> FetchSettings {
    FetchSettings {
        connect_timeout: Duration::from_millis(500),
        handshake_deadline: Duration::from_millis(500),
        dns_timeout: Duration::from_millis(300),
        enable_sni: true,
    }
}

/// Builds a fetcher whose resolver pool contains only `dns_server`.
pub fn fetcher_with_dns(dns_server: SocketAddr, settings: FetchSettings) -> CertificateFetcher {
    let pool = ResolverPool::new(vec![dns_server]).expect("non-empty pool");
    let resolver = PoolResolver::new(pool).with_query_timeout(settings.dns_timeout);
    CertificateFetcher::new(Arc::new(resolver), settings, Arc::new(ProcessingStats::new()))
        .expect("TLS client")
}

/// Builds a fetcher for IP-literal hosts; its resolver is never queried.
pub fn local_fetcher(settings: FetchSettings) -> CertificateFetcher {
    fetcher_with_dns("192.0.2.1:53".parse().expect("addr"), settings)
}
