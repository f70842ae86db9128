//! Image encoding for inline submission to the vision model.

use std::io::{Read, Seek, SeekFrom};

use base64::Engine;

use crate::models::UploadedImage;

/// Content type used when neither the bytes nor the upload say otherwise.
pub const FALLBACK_MIME: &str = "image/jpeg";

/// Read all remaining bytes, then rewind so the resource can be read again.
pub fn read_all<R: Read + Seek>(reader: &mut R) -> std::io::Result<Vec<u8>> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    reader.seek(SeekFrom::Start(0))?;
    Ok(bytes)
}

/// Leading bytes inspected when sniffing the image type.
const SNIFF_LEN: u64 = 512;

/// Base64-encode a resource, leaving its cursor at the start.
pub fn encode<R: Read + Seek>(reader: &mut R) -> std::io::Result<String> {
    let bytes = read_all(reader)?;
    Ok(base64::engine::general_purpose::STANDARD.encode(&bytes))
}

/// Read up to `len` leading bytes, then rewind.
fn peek<R: Read + Seek>(reader: &mut R, len: u64) -> std::io::Result<Vec<u8>> {
    let mut head = Vec::new();
    (&mut *reader).take(len).read_to_end(&mut head)?;
    reader.seek(SeekFrom::Start(0))?;
    Ok(head)
}

/// Pick the MIME type to declare for an image.
///
/// Sniffed image types win over the declared type, which wins over the fallback.
pub fn image_mime(bytes: &[u8], declared: Option<&str>) -> String {
    if let Some(kind) = infer::get(bytes) {
        if kind.mime_type().starts_with("image/") {
            return kind.mime_type().to_string();
        }
    }
    match declared {
        Some(mime) if mime.starts_with("image/") => mime.to_string(),
        _ => FALLBACK_MIME.to_string(),
    }
}

/// Build a `data:` URL carrying the whole image.
pub fn data_url(image: &mut UploadedImage) -> std::io::Result<String> {
    let head = peek(image.reader_mut(), SNIFF_LEN)?;
    let mime = image_mime(&head, image.content_type());
    let payload = encode(image.reader_mut())?;
    Ok(format!("data:{};base64,{}", mime, payload))
}
