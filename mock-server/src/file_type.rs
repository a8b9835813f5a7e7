//! Guessing a content type from a file's leading bytes.
//!
//! Binary formats are recognized by magic number. Anything else is treated
//! as text unless its first 100 bytes hold control characters, and text is
//! classified by a few telltale substrings.

/// How many leading bytes the text heuristics look at.
const SNIFF_LEN: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    Png,
    Jpg,
    Gif,
    Pdf,
    Tiff,
    Zip,
    Html,
    Xml,
    Css,
    Js,
    Txt,
    Unknown,
}

const MAGIC: &[(FileType, &[u8])] = &[
    (FileType::Png, &[0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n']),
    (FileType::Jpg, &[0xff, 0xd8]),
    (FileType::Gif, b"GIF89a"),
    (FileType::Gif, b"GIF87a"),
    (FileType::Pdf, b"%PDF"),
    (FileType::Tiff, &[0x49, 0x49, 0x2a, 0x00]),
    (FileType::Tiff, &[0x4d, 0x4d, 0x00, 0x2a]),
    (FileType::Zip, b"PK"),
];

impl FileType {
    pub fn detect(bytes: &[u8]) -> Self {
        if let Some((file_type, _)) = MAGIC.iter().find(|(_, magic)| bytes.starts_with(magic)) {
            return *file_type;
        }

        let head = &bytes[..bytes.len().min(SNIFF_LEN)];
        if head
            .iter()
            .any(|&b| b < 0x20 && !matches!(b, b'\t' | b'\n' | b'\r'))
        {
            return FileType::Unknown;
        }

        let text = String::from_utf8_lossy(head).to_lowercase();
        if text.contains("<html") {
            FileType::Html
        } else if text.contains("<?xml ") {
            FileType::Xml
        } else if text.contains("use strict") {
            FileType::Js
        } else if ["body {", "html {", "html,body {", "html, body {"]
            .iter()
            .any(|marker| text.contains(marker))
        {
            FileType::Css
        } else {
            FileType::Txt
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            FileType::Png => "image/png",
            FileType::Jpg => "image/jpeg",
            FileType::Gif => "image/gif",
            FileType::Pdf => "application/pdf",
            FileType::Tiff => "image/tiff",
            FileType::Zip => "application/zip",
            FileType::Html => "text/html",
            FileType::Xml => "application/xml",
            FileType::Css => "text/css",
            FileType::Js => "text/javascript",
            FileType::Txt => "text/plain",
            FileType::Unknown => "application/octet-stream",
        }
    }

    /// A conventional file extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            FileType::Png => "png",
            FileType::Jpg => "jpg",
            FileType::Gif => "gif",
            FileType::Pdf => "pdf",
            FileType::Tiff => "tiff",
            FileType::Zip => "zip",
            FileType::Html => "html",
            FileType::Xml => "xml",
            FileType::Css => "css",
            FileType::Js => "js",
            FileType::Txt => "txt",
            FileType::Unknown => "bin",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn magic_numbers() {
        assert_eq!(FileType::detect(&[0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n', 0]), FileType::Png);
        assert_eq!(FileType::detect(&[0xff, 0xd8, 0xff, 0xe0]), FileType::Jpg);
        assert_eq!(FileType::detect(b"GIF87a...."), FileType::Gif);
        assert_eq!(FileType::detect(b"GIF89a...."), FileType::Gif);
        assert_eq!(FileType::detect(b"%PDF-1.7\n"), FileType::Pdf);
        assert_eq!(FileType::detect(&[0x4d, 0x4d, 0x00, 0x2a, 1]), FileType::Tiff);
        assert_eq!(FileType::detect(&[0x49, 0x49, 0x2a, 0x00, 1]), FileType::Tiff);
        assert_eq!(FileType::detect(b"PK\x03\x04"), FileType::Zip);
    }

    #[test]
    fn truncated_magic_is_not_a_match() {
        assert_eq!(FileType::detect(&[0x4d, 0x4d, 0x00]), FileType::Unknown);
        assert_eq!(FileType::detect(b"GIF8"), FileType::Txt);
    }

    #[test]
    fn control_bytes_mean_binary() {
        assert_eq!(FileType::detect(&[b'a', 0x01, b'b']), FileType::Unknown);
        assert_eq!(FileType::detect(b"tab\tand\r\nnewlines"), FileType::Txt);
    }

    #[test]
    fn text_flavors() {
        assert_eq!(FileType::detect(b"<!DOCTYPE html>\n<HTML><body></body></HTML>"), FileType::Html);
        assert_eq!(FileType::detect(b"<?xml version=\"1.0\"?><a/>"), FileType::Xml);
        assert_eq!(FileType::detect(b"'use strict';\nconsole.log(1);"), FileType::Js);
        assert_eq!(FileType::detect(b"html, body {\n  margin: 0;\n}"), FileType::Css);
        assert_eq!(FileType::detect(b"just some notes"), FileType::Txt);
        assert_eq!(FileType::detect(b""), FileType::Txt);
    }

    #[test]
    fn non_ascii_text_is_still_text() {
        assert_eq!(FileType::detect("naïve café".as_bytes()), FileType::Txt);
    }

    #[test]
    fn markers_past_the_sniff_window_are_ignored() {
        let mut text = "x".repeat(SNIFF_LEN);
        text.push_str("<html>");
        assert_eq!(FileType::detect(text.as_bytes()), FileType::Txt);
    }

    #[test]
    fn mime_and_extension() {
        assert_eq!(FileType::Html.mime_type(), "text/html");
        assert_eq!(FileType::Unknown.mime_type(), "application/octet-stream");
        assert_eq!(FileType::Jpg.extension(), "jpg");
    }
}
