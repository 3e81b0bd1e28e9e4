/// Splits a compressed payload into GELF chunks.
///
/// Payloads that fit in one datagram are returned untouched. Larger ones are
/// cut into `chunk_size - 12` byte slices, each prefixed with a chunk header
/// carrying a per-message random ID.

use bytes::{BufMut, Bytes, BytesMut};
use rand::TryRngCore;
use rand::rngs::OsRng;

use crate::error::{GelfError, Result};
use crate::protocol::{CHUNK_HEADER, ChunkHeader, MAX_CHUNKS, chunk_payload};

/// Number of datagrams needed to send `len` bytes with datagrams of at most
/// `chunk_size` bytes. Does not enforce the 255-chunk limit.
pub fn chunk_count(len: usize, chunk_size: usize) -> Result<usize> {
    if len <= chunk_size {
        return Ok(1);
    }
    if chunk_size <= CHUNK_HEADER {
        return Err(GelfError::Configuration(format!(
            "chunk size {chunk_size} leaves no room for data after the {CHUNK_HEADER}-byte header"
        )));
    }
    Ok(len.div_ceil(chunk_size - CHUNK_HEADER))
}

/// Draw a message ID from the operating system CSPRNG.
pub fn random_message_id() -> Result<[u8; 8]> {
    let mut id = [0u8; 8];
    OsRng
        .try_fill_bytes(&mut id)
        .map_err(|e| GelfError::RandomSource(e.to_string()))?;
    Ok(id)
}

/// Split `payload` into datagrams of at most `chunk_size` bytes.
pub fn split(payload: Bytes, chunk_size: usize) -> Result<Vec<Bytes>> {
    if payload.len() <= chunk_size {
        return Ok(vec![payload]);
    }
    // Size checks come first so an oversize message never consumes entropy.
    checked_chunk_count(payload.len(), chunk_size)?;
    let message_id = random_message_id()?;
    split_with_id(payload, chunk_size, message_id)
}

/// Same as [`split`] with a caller-chosen message ID.
pub fn split_with_id(payload: Bytes, chunk_size: usize, message_id: [u8; 8]) -> Result<Vec<Bytes>> {
    if payload.len() <= chunk_size {
        return Ok(vec![payload]);
    }
    let total = checked_chunk_count(payload.len(), chunk_size)?;
    let data_len = chunk_size - CHUNK_HEADER;

    let mut chunks = Vec::with_capacity(total);
    let mut header_buf = [0u8; CHUNK_HEADER];
    for (sequence, slice) in payload.chunks(data_len).enumerate() {
        ChunkHeader {
            message_id,
            sequence: sequence as u8,
            total: total as u8,
        }
        .write_to(&mut header_buf);

        let mut chunk = BytesMut::with_capacity(CHUNK_HEADER + slice.len());
        chunk.put_slice(&header_buf);
        chunk.put_slice(slice);
        chunks.push(chunk.freeze());
    }
    debug_assert_eq!(chunks.len(), total);
    Ok(chunks)
}

fn checked_chunk_count(len: usize, chunk_size: usize) -> Result<usize> {
    let chunks = chunk_count(len, chunk_size)?;
    if chunks > MAX_CHUNKS {
        return Err(GelfError::Oversize { chunks });
    }
    Ok(chunks)
}

/// Rebuild the payload from the datagrams of one message, in any order.
///
/// Returns None unless the datagrams are either a single unchunked payload or
/// a complete chunk set: same ID and count everywhere, every sequence index
/// exactly once.
pub fn reassemble<D: AsRef<[u8]>>(datagrams: &[D]) -> Option<Vec<u8>> {
    let first = datagrams.first()?.as_ref();
    let Some(expected) = ChunkHeader::parse(first) else {
        return (datagrams.len() == 1).then(|| first.to_vec());
    };
    if expected.total as usize != datagrams.len() {
        return None;
    }

    let mut slots: Vec<Option<&[u8]>> = vec![None; datagrams.len()];
    for datagram in datagrams {
        let datagram = datagram.as_ref();
        let header = ChunkHeader::parse(datagram)?;
        if header.message_id != expected.message_id || header.total != expected.total {
            return None;
        }
        let slot = slots.get_mut(header.sequence as usize)?;
        if slot.replace(chunk_payload(datagram)).is_some() {
            return None;
        }
    }

    let mut payload = Vec::new();
    for slot in slots {
        payload.extend_from_slice(slot?);
    }
    Some(payload)
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::protocol::{CHUNK_DATA, CHUNK_SIZE};

    fn pattern(len: usize) -> Bytes {
        (0..len).map(|i| (i % 251) as u8).collect::<Vec<_>>().into()
    }

    #[test]
    fn small_payload_is_sent_whole() {
        let payload = pattern(500);
        let chunks = split(payload.clone(), CHUNK_SIZE).unwrap();
        assert_eq!(chunks, vec![payload]);
    }

    #[test]
    fn payload_of_exactly_chunk_size_is_not_chunked() {
        let chunks = split(pattern(CHUNK_SIZE), CHUNK_SIZE).unwrap();
        assert_eq!(chunks.len(), 1);
        assert!(ChunkHeader::parse(&chunks[0]).is_none());
    }

    #[test]
    fn three_chunks_for_3000_bytes() {
        let payload = pattern(3000);
        let id = [9, 8, 7, 6, 5, 4, 3, 2];
        let chunks = split_with_id(payload.clone(), CHUNK_SIZE, id).unwrap();

        assert_eq!(chunks.len(), 3);
        let sizes: Vec<usize> = chunks.iter().map(|c| chunk_payload(c).len()).collect();
        assert_eq!(sizes, vec![1408, 1408, 184]);
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(&chunk[0..2], &[0x1e, 0x0f]);
            assert_eq!(&chunk[2..10], &id);
            assert_eq!(chunk[10] as usize, i);
            assert_eq!(chunk[11], 3);
        }
        assert_eq!(reassemble(&chunks).unwrap(), payload);
    }

    #[test]
    fn exact_multiple_has_no_empty_tail() {
        let chunks = split(pattern(CHUNK_DATA * 2), CHUNK_SIZE).unwrap();
        assert_eq!(chunks.len(), 2);
        assert!(chunks.iter().all(|c| chunk_payload(c).len() == CHUNK_DATA));
    }

    #[test]
    fn oversize_boundary() {
        let max = MAX_CHUNKS * CHUNK_DATA;
        assert_eq!(split(pattern(max), CHUNK_SIZE).unwrap().len(), MAX_CHUNKS);

        match split(pattern(max + 1), CHUNK_SIZE) {
            Err(GelfError::Oversize { chunks }) => assert_eq!(chunks, 256),
            other => panic!("expected oversize error, got {other:?}"),
        }
    }

    #[test]
    fn chunk_size_must_exceed_header() {
        let err = split(pattern(100), CHUNK_HEADER).unwrap_err();
        assert!(matches!(err, GelfError::Configuration(_)));
    }

    #[test]
    fn message_ids_are_random_per_call() {
        let a = split(pattern(4000), CHUNK_SIZE).unwrap();
        let b = split(pattern(4000), CHUNK_SIZE).unwrap();
        assert_ne!(a[0][2..10], b[0][2..10]);
    }

    #[test]
    fn reassemble_accepts_any_order() {
        let payload = pattern(5000);
        let mut chunks = split(payload.clone(), CHUNK_SIZE).unwrap();
        chunks.reverse();
        assert_eq!(reassemble(&chunks).unwrap(), payload);
    }

    #[test]
    fn reassemble_rejects_incomplete_or_mixed_sets() {
        let a = split(pattern(5000), CHUNK_SIZE).unwrap();
        let b = split(pattern(5000), CHUNK_SIZE).unwrap();

        assert!(reassemble(&a[..2]).is_none());
        let mixed = vec![a[0].clone(), b[1].clone(), a[2].clone(), a[3].clone()];
        assert!(reassemble(&mixed).is_none());
        let duplicated = vec![a[0].clone(), a[0].clone(), a[2].clone(), a[3].clone()];
        assert!(reassemble(&duplicated).is_none());
        assert!(reassemble::<Bytes>(&[]).is_none());
    }

    proptest! {
        #[test]
        fn split_preserves_payload(len in 0usize..40_000, chunk_size in 13usize..2_000) {
            let payload = pattern(len);
            let expected = if len <= chunk_size { 1 } else { len.div_ceil(chunk_size - CHUNK_HEADER) };

            let result = split(payload.clone(), chunk_size);
            if expected > MAX_CHUNKS {
                prop_assert!(len > MAX_CHUNKS * (chunk_size - CHUNK_HEADER));
                prop_assert!(
                    matches!(result, Err(GelfError::Oversize { .. })),
                    "expected oversize error"
                );
                return Ok(());
            }

            let chunks = result.unwrap();
            prop_assert_eq!(chunks.len(), expected);
            prop_assert!(chunks.iter().all(|c| c.len() <= chunk_size));
            prop_assert_eq!(reassemble(&chunks).unwrap(), payload.to_vec());

            if expected > 1 {
                let headers: Vec<ChunkHeader> =
                    chunks.iter().map(|c| ChunkHeader::parse(c).unwrap()).collect();
                let sequences: Vec<usize> = headers.iter().map(|h| h.sequence as usize).collect();
                prop_assert_eq!(sequences, (0..expected).collect::<Vec<_>>());
                prop_assert!(headers.iter().all(|h| h.message_id == headers[0].message_id));
                prop_assert!(headers.iter().all(|h| h.total as usize == expected));
            }
        }
    }
}
