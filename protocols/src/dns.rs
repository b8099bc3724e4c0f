use std::net::Ipv4Addr;

use anyhow::Context;
use dns_parser::{Builder, Packet, QueryClass, QueryType, RData, ResponseCode};
use thiserror::Error;

pub const DNS_PORT: u16 = 53;

/// Largest answer a plain (non-EDNS) UDP resolver will send us.
pub const MAX_UDP_PAYLOAD: usize = 512;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AnswerError {
    #[error("packet is a query, not a response")]
    NotAResponse,
    #[error("transaction id mismatch: expected {expected}, got {actual}")]
    IdMismatch { expected: u16, actual: u16 },
    #[error("server answered with {0}")]
    Rcode(String),
    #[error("response was truncated")]
    Truncated,
}

/// Builds a recursive `A`/`IN` query for `domain`.
pub fn create_a_packet(domain: &str, id: u16) -> anyhow::Result<Vec<u8>> {
    let name: &str = domain.trim_end_matches('.');
    anyhow::ensure!(!name.is_empty(), "cannot query an empty name");

    let mut builder: Builder = Builder::new_query(id, true);
    builder.add_question(name, false, QueryType::A, QueryClass::IN);

    // `build` only returns Err when the packet had to be truncated
    builder
        .build()
        .map_err(|_| anyhow::anyhow!("query for {name} does not fit in one packet"))
}

/// Extracts every IPv4 address from the answer section of a response to the
/// query with transaction id `id`. CNAME and other record types are skipped.
pub fn get_ipv4_answers(payload: &[u8], id: u16) -> anyhow::Result<Vec<Ipv4Addr>> {
    let packet: Packet = Packet::parse(payload).context("Failed to parse DNS packet")?;
    let header = &packet.header;

    if header.query {
        return Err(AnswerError::NotAResponse.into());
    }
    if header.id != id {
        return Err(AnswerError::IdMismatch {
            expected: id,
            actual: header.id,
        }
        .into());
    }
    if header.response_code != ResponseCode::NoError {
        return Err(AnswerError::Rcode(format!("{:?}", header.response_code)).into());
    }
    if header.truncated {
        return Err(AnswerError::Truncated.into());
    }

    let ips: Vec<Ipv4Addr> = packet
        .answers
        .iter()
        .filter_map(|record| match &record.data {
            RData::A(a) => Some(a.0),
            _ => None,
        })
        .collect();

    Ok(ips)
}
