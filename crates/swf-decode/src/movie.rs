//! Whole-movie decoding: header followed by the top-level tag stream.

use tracing::debug;

use crate::bits::{BitCursor, BitPosition};
use crate::context::{DecodeContext, DecodeOptions};
use crate::error::{DecodeError, ParseError, Result, TagContext};
use crate::header::{decode_movie_header, peek_record_header, MovieHeader};
use crate::tags::{decode_tag, Tag, TagCode};

/// A decoded uncompressed movie.
#[derive(Debug, Clone, PartialEq)]
pub struct Movie {
    pub header: MovieHeader,
    /// Top-level tags in file order, including the closing `End` when present.
    pub tags: Vec<Tag>,
}

impl Movie {
    /// Decodes `data` with [`DecodeOptions::default`].
    pub fn parse(data: &[u8]) -> std::result::Result<Self, ParseError> {
        Self::parse_with_options(data, DecodeOptions::default())
    }

    pub fn parse_with_options(
        data: &[u8],
        options: DecodeOptions,
    ) -> std::result::Result<Self, ParseError> {
        let mut cursor = BitCursor::new(data);
        let header = decode_movie_header(&mut cursor).map_err(ParseError::header)?;
        cursor.align();

        let declared = header.file_length.value;
        if usize::try_from(declared).ok() != Some(data.len()) {
            debug!(
                declared,
                actual = data.len(),
                "movie file length disagrees with buffer length"
            );
        }

        let ctx = DecodeContext::new(header.version.value, options);
        let mut stream = TagStream::new(cursor, ctx);
        let mut tags = Vec::new();
        while let Some(item) = stream.next() {
            match item {
                Ok(tag) => tags.push(tag),
                Err(error) => {
                    return Err(ParseError {
                        error,
                        tag: stream.current(),
                        decoded: tags,
                    })
                }
            }
        }

        let trailing = stream.cursor().remaining_bytes();
        if trailing > 0 {
            debug!(trailing, "ignoring bytes after End tag");
        }
        Ok(Movie { header, tags })
    }

    pub fn has_end(&self) -> bool {
        self.tags.last().is_some_and(Tag::is_end)
    }

    /// Top-level tags with the given code, in file order.
    pub fn tags_with_code(&self, code: TagCode) -> impl Iterator<Item = &Tag> {
        self.tags.iter().filter(move |tag| tag.code() == code)
    }

    /// Number of `ShowFrame` tags at the top level.
    pub fn shown_frames(&self) -> usize {
        self.tags_with_code(TagCode::ShowFrame).count()
    }
}

/// Lazily decodes a top-level tag stream.
///
/// Yields tags up to and including `End`, or until the cursor runs out. After
/// the first error the stream yields nothing more; [`TagStream::current`]
/// then names the tag that failed.
pub struct TagStream<'a> {
    cursor: BitCursor<'a>,
    ctx: DecodeContext,
    current: Option<TagContext>,
    done: bool,
}

impl<'a> TagStream<'a> {
    pub fn new(cursor: BitCursor<'a>, ctx: DecodeContext) -> Self {
        Self {
            cursor,
            ctx,
            current: None,
            done: false,
        }
    }

    /// Position of the next undecoded byte.
    pub fn position(&self) -> BitPosition {
        self.cursor.position()
    }

    pub fn cursor(&self) -> BitCursor<'a> {
        self.cursor
    }

    /// The tag most recently started, if its header could be read.
    pub fn current(&self) -> Option<TagContext> {
        self.current
    }

    fn missing_end(&mut self) -> Option<Result<Tag>> {
        self.done = true;
        if self.ctx.options().require_end_tag {
            self.current = None;
            return Some(Err(DecodeError::OutOfBounds {
                position: self.cursor.position(),
                bits: 16,
                end: self.cursor.end(),
            }));
        }
        debug!(position = %self.cursor.position(), "tag stream ends without End tag");
        None
    }
}

impl Iterator for TagStream<'_> {
    type Item = Result<Tag>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if self.cursor.is_empty() {
            return self.missing_end();
        }

        self.current = peek_record_header(&self.cursor)
            .ok()
            .map(|header| TagContext {
                code: header.tag_code,
                position: header.position,
            });

        match decode_tag(&mut self.cursor, &mut self.ctx) {
            Ok(tag) => {
                if tag.is_end() {
                    self.done = true;
                }
                Some(Ok(tag))
            }
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}
