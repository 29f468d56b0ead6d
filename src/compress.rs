//! Shared zlib compression helper for streams that honor
//! `PDFSettings::compression` (content streams, font files, CIDToGIDMaps).

use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;

pub fn maybe_deflate(bytes: Vec<u8>, compress: bool) -> Vec<u8> {
    if !compress {
        return bytes;
    }
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&bytes).expect("writing to an in-memory buffer cannot fail");
    encoder.finish().expect("writing to an in-memory buffer cannot fail")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passthrough_when_disabled() {
        assert_eq!(maybe_deflate(vec![1, 2, 3], false), vec![1, 2, 3]);
    }

    #[test]
    fn compresses_when_enabled() {
        let input = vec![b'a'; 1024];
        let output = maybe_deflate(input.clone(), true);
        assert_ne!(output, input);
        assert!(output.len() < input.len());
    }
}
