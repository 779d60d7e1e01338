//! Byte-stream class tagging for RFC-822 messages with HTML payloads.
//!
//! For every input byte the tagger emits two bytes: a class tag
//! (`b'A' + class`) and the byte itself. Tagged streams feed the color-pair
//! mining mode, where substrings only match within one syntactic class.
//!
//! The recognizer is a nine-mode state machine driven by the current byte
//! plus up to sixteen bytes of trailing context, enough to spot the tokens
//! `<script`, `<style`, `<!-`, `<![CDATA`, `]]`, `--` and `</script`.

use std::io::{BufRead, Write};

/// Syntactic classes assigned to output bytes.
pub const CLASS_TEXT: u8 = 0;
pub const CLASS_HEADER: u8 = 1;
pub const CLASS_CDATA: u8 = 2;
pub const CLASS_COMMENT: u8 = 3;
pub const CLASS_SCRIPT: u8 = 4;
pub const CLASS_TAG: u8 = 5;
pub const CLASS_TAG_ATTRIBUTES: u8 = 6;
pub const CLASS_STYLE_TEXT: u8 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    AnticipatingHeader,
    Header,
    HeaderPayloadBoundary,
    Comment,
    Tag,
    TagAttributes,
    Script,
    Cdata,
    Text,
    DocumentBoundary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TagKind {
    Other,
    Script,
    Style,
}

/// Incremental tagger; feed bytes one at a time with [`StreamTagger::classify`].
pub struct StreamTagger {
    mode: Mode,
    tag: TagKind,
    context: [u8; 16],
    context_offset: usize,
}

impl Default for StreamTagger {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamTagger {
    pub fn new() -> Self {
        Self {
            mode: Mode::AnticipatingHeader,
            tag: TagKind::Other,
            context: [0; 16],
            context_offset: 0,
        }
    }

    /// Whether the most recent context bytes spell out `token`.
    fn has_context(&self, token: &[u8]) -> bool {
        token
            .iter()
            .rev()
            .enumerate()
            .all(|(i, &byte)| self.context[(self.context_offset + 15 - i) & 15] == byte)
    }

    /// Consume one byte and return the class assigned to it.
    ///
    /// A NUL byte marks a document boundary and resets the machine to
    /// header anticipation.
    pub fn classify(&mut self, ch: u8) -> u8 {
        let mut next_mode = None;

        if ch == 0 {
            self.mode = Mode::DocumentBoundary;
            next_mode = Some(Mode::AnticipatingHeader);
        } else {
            match self.mode {
                Mode::AnticipatingHeader => {
                    self.mode = if ch == b'\n' {
                        Mode::HeaderPayloadBoundary
                    } else {
                        Mode::Header
                    };
                }

                Mode::Header => {
                    if ch == b'\n' {
                        next_mode = Some(Mode::AnticipatingHeader);
                    }
                }

                Mode::HeaderPayloadBoundary => {
                    if ch == b'<' {
                        self.mode = Mode::Tag;
                        self.tag = TagKind::Other;
                    } else {
                        self.mode = Mode::Text;
                    }
                }

                Mode::Comment => {
                    if ch == b'>' && self.has_context(b"--") {
                        next_mode = Some(Mode::Text);
                    }
                }

                Mode::Script => {
                    if ch == b'>' && self.has_context(b"</script") {
                        next_mode = Some(Mode::Text);
                    }
                }

                Mode::Tag => {
                    if ch == b'>' || ch.is_ascii_whitespace() {
                        if self.has_context(b"<script") {
                            self.tag = TagKind::Script;
                        } else if self.has_context(b"<style") {
                            self.tag = TagKind::Style;
                        }
                    }

                    if ch == b'>' {
                        next_mode = Some(if self.tag == TagKind::Script {
                            Mode::Script
                        } else {
                            Mode::Text
                        });
                    } else if ch == b'[' && self.has_context(b"<![CDATA") {
                        next_mode = Some(Mode::Cdata);
                    } else if ch == b'-' && self.has_context(b"<!-") {
                        next_mode = Some(Mode::Comment);
                    } else if ch.is_ascii_whitespace() {
                        self.mode = Mode::TagAttributes;
                    }
                }

                Mode::TagAttributes => {
                    if ch == b'>' {
                        next_mode = Some(if self.tag == TagKind::Script {
                            Mode::Script
                        } else {
                            Mode::Text
                        });
                    }
                }

                Mode::Cdata => {
                    if ch == b'>' && self.has_context(b"]]") {
                        self.mode = Mode::Text;
                    }
                }

                Mode::Text => {
                    if ch == b'<' {
                        self.mode = Mode::Tag;
                        self.tag = TagKind::Other;
                    }
                }

                // Transient: replaced by `next_mode` before the next byte.
                Mode::DocumentBoundary => unreachable!("document boundary mode is transient"),
            }
        }

        let class = match self.mode {
            Mode::Header => CLASS_HEADER,
            Mode::Cdata => CLASS_CDATA,
            Mode::Comment => CLASS_COMMENT,
            Mode::Script => CLASS_SCRIPT,
            Mode::Tag => CLASS_TAG,
            Mode::TagAttributes => CLASS_TAG_ATTRIBUTES,
            Mode::Text => {
                if self.tag == TagKind::Style {
                    CLASS_STYLE_TEXT
                } else {
                    CLASS_TEXT
                }
            }
            _ => CLASS_TEXT,
        };

        self.context[self.context_offset & 15] = ch;
        self.context_offset = self.context_offset.wrapping_add(1);

        if let Some(mode) = next_mode {
            self.mode = mode;
        }

        class
    }
}

/// Tag an entire stream: for each input byte write the class tag byte
/// followed by the byte itself.
pub fn tag_stream<R: BufRead, W: Write>(mut reader: R, mut writer: W) -> std::io::Result<()> {
    let mut tagger = StreamTagger::new();

    loop {
        let chunk = reader.fill_buf()?;
        if chunk.is_empty() {
            break;
        }

        let consumed = chunk.len();
        for &byte in chunk {
            let class = tagger.classify(byte);
            writer.write_all(&[b'A' + class, byte])?;
        }
        reader.consume(consumed);
    }

    writer.flush()
}
