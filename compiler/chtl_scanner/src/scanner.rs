//! State-machine scanner that splits a CHTL source into typed fragments.
//!
//! One forward pass over a sentinel-terminated [`Cursor`]. The machine is
//! an explicit [`ScanState`]; every step consumes at least one byte or
//! changes state, and string and comment bodies are skipped with `memchr`.
//!
//! # Fragment boundaries
//!
//! A `style`/`script` block fragment runs from its opening `{` through the
//! matching `}` inclusive. The keyword (or `<script>` tag) that introduces
//! it stays in the preceding CHTL fragment. A tag body that does not open
//! with `{` runs raw up to, but not including, its closing tag.
//!
//! Script kind is decided once, when the block closes, by running the
//! [`ScriptFeatures`] probes over the whole block body.

use crate::cursor::Cursor;
use crate::fragment::{Fragment, FragmentKind};
use crate::keywords::{is_ident_continue, is_ident_start, KeywordRegistry};
use crate::js_regex::{regex_allowed, regex_len};
use crate::probe::ScriptFeatures;
use crate::{Construct, ScanError, ScannerConfig, SourceBuffer};

/// Per-kind fragment counts from the most recent scan.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ScanStats {
    pub chtl: usize,
    pub chtl_js: usize,
    pub css: usize,
    pub js: usize,
}

impl ScanStats {
    fn record(&mut self, kind: FragmentKind) {
        match kind {
            FragmentKind::Chtl => self.chtl += 1,
            FragmentKind::ChtlJs => self.chtl_js += 1,
            FragmentKind::Css => self.css += 1,
            FragmentKind::Js => self.js += 1,
        }
    }

    /// Count for a single kind.
    pub fn count(&self, kind: FragmentKind) -> usize {
        match kind {
            FragmentKind::Chtl => self.chtl,
            FragmentKind::ChtlJs => self.chtl_js,
            FragmentKind::Css => self.css,
            FragmentKind::Js => self.js,
        }
    }

    /// Total number of fragments.
    pub fn total(&self) -> usize {
        self.chtl + self.chtl_js + self.css + self.js
    }
}

/// The unified fragment scanner.
///
/// Owns the keyword registry consulted during script classification.
/// Keywords are registered before scanning; `scan` never changes them.
#[derive(Clone, Debug)]
pub struct UnifiedScanner {
    config: ScannerConfig,
    keywords: KeywordRegistry,
    stats: ScanStats,
}

impl Default for UnifiedScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl UnifiedScanner {
    /// Scanner with the default configuration and builtin keywords.
    pub fn new() -> Self {
        Self::with_config(ScannerConfig::default())
    }

    pub fn with_config(config: ScannerConfig) -> Self {
        let keywords = if config.builtin_keywords {
            KeywordRegistry::with_builtins()
        } else {
            KeywordRegistry::empty()
        };
        Self::with_registry(config, keywords)
    }

    /// Scanner using an existing keyword registry as-is.
    ///
    /// `config.builtin_keywords` is ignored; the registry is taken verbatim.
    pub fn with_registry(config: ScannerConfig, keywords: KeywordRegistry) -> Self {
        Self {
            config,
            keywords,
            stats: ScanStats::default(),
        }
    }

    /// Register a CHTL-JS trigger keyword. Idempotent.
    pub fn register_keyword(&mut self, word: &str) -> bool {
        self.keywords.register(word)
    }

    pub fn keywords(&self) -> &KeywordRegistry {
        &self.keywords
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    /// Fragment counts from the last successful scan.
    pub fn stats(&self) -> ScanStats {
        self.stats
    }

    /// Split `source` into fragments.
    ///
    /// On success the fragments tile `0..source.len()` exactly, in source
    /// order, with no empty fragments. `filename` is only used in errors.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::Unterminated`] when a block, tag body, string
    /// literal, or block comment is still open at end of input, and
    /// [`ScanError::SourceTooLarge`] for sources of 4 GiB or more.
    #[tracing::instrument(level = "debug", skip_all, fields(filename = filename, len = source.len()))]
    pub fn scan(&mut self, source: &str, filename: &str) -> Result<Vec<Fragment>, ScanError> {
        let Some(buffer) = SourceBuffer::new(source) else {
            return Err(ScanError::SourceTooLarge {
                len: source.len(),
                filename: filename.to_owned(),
            });
        };
        let run = ScanRun {
            cursor: buffer.cursor(),
            bytes: buffer.as_bytes(),
            config: &self.config,
            keywords: &self.keywords,
            filename,
            state: ScanState::TopLevel,
            flush_start: 0,
            open_blocks: Vec::new(),
            fragments: Vec::new(),
        };
        let fragments = run.run()?;
        debug_assert!(
            crate::validate_coverage(&fragments, buffer.len()).is_ok(),
            "scanner fragments must tile the source"
        );

        let mut stats = ScanStats::default();
        for fragment in &fragments {
            stats.record(fragment.kind());
        }
        self.stats = stats;
        tracing::debug!(
            fragments = stats.total(),
            chtl_js = stats.chtl_js,
            js = stats.js,
            css = stats.css,
            "scan complete"
        );
        Ok(fragments)
    }
}

// ─── Machine state ──────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Lang {
    Style,
    Script,
}

impl Lang {
    fn closing_tag(self) -> &'static [u8] {
        match self {
            Lang::Style => b"</style",
            Lang::Script => b"</script",
        }
    }
}

/// How an embedded block is delimited.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum BlockForm {
    /// `{ ... }`: ends at the matching `}`.
    Braced,
    /// Raw tag body: ends before `</script` or `</style`.
    Tag,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct Block {
    /// Offset of the `{`, or of the `<` of the opening tag.
    open: u32,
    /// Brace depth inside the block. A braced block starts at 1.
    depth: u32,
    form: BlockForm,
}

impl Block {
    fn unterminated(self, lang: Lang) -> Construct {
        match (lang, self.form) {
            (Lang::Style, BlockForm::Braced) => Construct::StyleBlock,
            (Lang::Style, BlockForm::Tag) => Construct::StyleTag,
            (Lang::Script, BlockForm::Braced) => Construct::ScriptBlock,
            (Lang::Script, BlockForm::Tag) => Construct::ScriptTag,
        }
    }
}

/// Where to go back to after a string or comment.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Context {
    TopLevel,
    Style(Block),
    LocalScript(Block),
    GlobalScript(Block),
}

impl Context {
    fn lang(self) -> Option<Lang> {
        match self {
            Context::TopLevel => None,
            Context::Style(_) => Some(Lang::Style),
            Context::LocalScript(_) | Context::GlobalScript(_) => Some(Lang::Script),
        }
    }

    fn with_block(self, block: Block) -> Self {
        match self {
            Context::TopLevel => Context::TopLevel,
            Context::Style(_) => Context::Style(block),
            Context::LocalScript(_) => Context::LocalScript(block),
            Context::GlobalScript(_) => Context::GlobalScript(block),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum CommentKind {
    Line,
    Block,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum ScanState {
    TopLevel,
    InStyleBlock(Block),
    InLocalScript(Block),
    InGlobalScript(Block),
    InStringLiteral {
        quote: u8,
        start: u32,
        resume: Context,
    },
    InComment {
        kind: CommentKind,
        start: u32,
        resume: Context,
    },
}

impl From<Context> for ScanState {
    fn from(context: Context) -> Self {
        match context {
            Context::TopLevel => ScanState::TopLevel,
            Context::Style(block) => ScanState::InStyleBlock(block),
            Context::LocalScript(block) => ScanState::InLocalScript(block),
            Context::GlobalScript(block) => ScanState::InGlobalScript(block),
        }
    }
}

// ─── Single scan ────────────────────────────────────────────────────────

struct ScanRun<'a, 'cfg> {
    cursor: Cursor<'a>,
    bytes: &'a [u8],
    config: &'cfg ScannerConfig,
    keywords: &'cfg KeywordRegistry,
    filename: &'cfg str,
    state: ScanState,
    /// Start of the fragment currently being accumulated.
    flush_start: u32,
    /// Offsets of open CHTL `{`, innermost last.
    open_blocks: Vec<u32>,
    fragments: Vec<Fragment>,
}

impl ScanRun<'_, '_> {
    fn run(mut self) -> Result<Vec<Fragment>, ScanError> {
        while !self.cursor.is_eof() {
            self.state = match self.state {
                ScanState::TopLevel => self.top_level(),
                ScanState::InStyleBlock(block) => self.block_step(Context::Style(block), block),
                ScanState::InLocalScript(block) => {
                    self.block_step(Context::LocalScript(block), block)
                }
                ScanState::InGlobalScript(block) => {
                    self.block_step(Context::GlobalScript(block), block)
                }
                ScanState::InStringLiteral {
                    quote,
                    start,
                    resume,
                } => self.string_body(quote, start, resume)?,
                ScanState::InComment {
                    kind,
                    start,
                    resume,
                } => self.comment_body(kind, start, resume)?,
            };
        }
        self.finish()
    }

    // ─── Top level ──────────────────────────────────────────────────────

    fn top_level(&mut self) -> ScanState {
        let pos = self.cursor.pos();
        match self.cursor.current() {
            b'"' => self.open_string(b'"', Context::TopLevel),
            // `'` inside a word is an apostrophe in unquoted text, not a quote.
            b'\'' if !is_ident_continue(self.prev_byte()) => {
                self.open_string(b'\'', Context::TopLevel)
            }
            b'/' if matches!(self.cursor.peek(), b'/' | b'*') => {
                self.open_comment(Context::TopLevel)
            }
            b'{' => {
                self.open_blocks.push(pos);
                self.cursor.advance();
                ScanState::TopLevel
            }
            b'}' => {
                // A stray `}` at depth 0 is plain text.
                self.open_blocks.pop();
                self.cursor.advance();
                ScanState::TopLevel
            }
            b'<' if self.config.html_tags => self.tag_open(),
            b if is_ident_start(b) => self.word(),
            _ => {
                self.cursor.advance_char();
                ScanState::TopLevel
            }
        }
    }

    fn prev_byte(&self) -> u8 {
        let pos = self.cursor.pos() as usize;
        pos.checked_sub(1)
            .and_then(|prev| self.bytes.get(prev))
            .copied()
            .unwrap_or(0)
    }

    /// Consume a word and enter a block if it is `style {` or `script {`.
    fn word(&mut self) -> ScanState {
        let start = self.cursor.pos();
        self.cursor
            .eat_while(|b| is_ident_continue(b) || b == b'-');
        let lang = match self.cursor.slice_from(start) {
            "style" => Lang::Style,
            "script" => Lang::Script,
            _ => return ScanState::TopLevel,
        };
        let mut probe = self.cursor;
        probe.eat_whitespace();
        if probe.current() != b'{' {
            return ScanState::TopLevel;
        }
        self.cursor = probe;
        let open = self.cursor.pos();
        self.enter_block(lang, BlockForm::Braced, open)
    }

    /// Handle `<`: enter a block for `<script ...>` or `<style ...>`.
    fn tag_open(&mut self) -> ScanState {
        let tag_start = self.cursor.pos();
        let (lang, name_len) = if self.cursor.starts_with(b"<script") {
            (Lang::Script, 7)
        } else if self.cursor.starts_with(b"<style") {
            (Lang::Style, 6)
        } else {
            self.cursor.advance();
            return ScanState::TopLevel;
        };

        let mut probe = self.cursor;
        probe.advance_n(name_len);
        let after_name = probe.current();
        if after_name != b'>' && !after_name.is_ascii_whitespace() {
            // `<scripts>`, `<style-x>` and friends are plain text.
            self.cursor.advance();
            return ScanState::TopLevel;
        }
        probe.eat_while(|b| b != b'>' && b != 0);
        if probe.current() != b'>' {
            self.cursor.advance();
            return ScanState::TopLevel;
        }
        probe.advance();

        let mut body = probe;
        body.eat_whitespace();
        if body.current() == b'{' {
            self.cursor = body;
            let open = self.cursor.pos();
            self.enter_block(lang, BlockForm::Braced, open)
        } else {
            self.cursor = probe;
            self.enter_block(lang, BlockForm::Tag, tag_start)
        }
    }

    /// Flush pending CHTL text and switch into an embedded block.
    ///
    /// The cursor sits on the `{` for braced blocks and on the first body
    /// byte for tag blocks.
    fn enter_block(&mut self, lang: Lang, form: BlockForm, open: u32) -> ScanState {
        let body_start = self.cursor.pos();
        self.flush(FragmentKind::Chtl, body_start);
        let depth = match form {
            BlockForm::Braced => {
                self.cursor.advance();
                1
            }
            BlockForm::Tag => 0,
        };
        let block = Block { open, depth, form };
        match lang {
            Lang::Style => ScanState::InStyleBlock(block),
            Lang::Script if self.open_blocks.is_empty() => ScanState::InGlobalScript(block),
            Lang::Script => ScanState::InLocalScript(block),
        }
    }

    // ─── Embedded blocks ────────────────────────────────────────────────

    fn block_step(&mut self, context: Context, mut block: Block) -> ScanState {
        let Some(lang) = context.lang() else {
            return ScanState::TopLevel;
        };
        let pos = self.cursor.pos();
        let byte = self.cursor.current();

        if block.form == BlockForm::Tag
            && byte == b'<'
            && self.cursor.starts_with(lang.closing_tag())
        {
            self.close_block(lang, pos);
            return ScanState::TopLevel;
        }

        match byte {
            b'"' | b'\'' => return self.open_string(byte, context),
            b'`' if lang == Lang::Script => return self.open_string(byte, context),
            b'/' if self.cursor.peek() == b'*'
                || (lang == Lang::Script && self.cursor.peek() == b'/') =>
            {
                return self.open_comment(context);
            }
            b'/' if lang == Lang::Script => match self.regex_at(pos) {
                Some(len) => self.cursor.advance_n(len),
                None => self.cursor.advance(),
            },
            b'{' => {
                block.depth += 1;
                self.cursor.advance();
            }
            b'}' => {
                self.cursor.advance();
                if block.form == BlockForm::Braced && block.depth == 1 {
                    let end = self.cursor.pos();
                    self.close_block(lang, end);
                    return ScanState::TopLevel;
                }
                block.depth = block.depth.saturating_sub(1);
            }
            _ => self.cursor.advance_char(),
        }
        context.with_block(block).into()
    }

    /// Length of a regex literal starting at `pos` in the current script
    /// body, if the `/` there opens one.
    fn regex_at(&self, pos: u32) -> Option<u32> {
        let before = self.bytes.get(self.flush_start as usize..pos as usize)?;
        if !regex_allowed(before) {
            return None;
        }
        let len = regex_len(self.bytes.get(pos as usize..)?)?;
        u32::try_from(len).ok()
    }

    fn close_block(&mut self, lang: Lang, end: u32) {
        let kind = match lang {
            Lang::Style => FragmentKind::Css,
            Lang::Script => {
                let body = self.cursor.slice(self.flush_start, end);
                let features = ScriptFeatures::detect(body, self.keywords, self.config);
                tracing::trace!(?features, start = self.flush_start, end, "classified script");
                if features.is_chtljs() {
                    FragmentKind::ChtlJs
                } else {
                    FragmentKind::Js
                }
            }
        };
        self.flush(kind, end);
    }

    // ─── Strings and comments ───────────────────────────────────────────

    fn open_string(&mut self, quote: u8, resume: Context) -> ScanState {
        let start = self.cursor.pos();
        self.cursor.advance();
        ScanState::InStringLiteral {
            quote,
            start,
            resume,
        }
    }

    /// Cursor is on `/` followed by `/` or `*`.
    fn open_comment(&mut self, resume: Context) -> ScanState {
        let start = self.cursor.pos();
        let kind = if self.cursor.peek() == b'/' {
            CommentKind::Line
        } else {
            CommentKind::Block
        };
        self.cursor.advance_n(2);
        ScanState::InComment {
            kind,
            start,
            resume,
        }
    }

    fn string_body(
        &mut self,
        quote: u8,
        start: u32,
        resume: Context,
    ) -> Result<ScanState, ScanError> {
        match self.cursor.skip_to_string_delim(quote) {
            0 => Err(self.unterminated(Construct::String, start)),
            b'\\' => {
                self.cursor.advance();
                if self.cursor.is_eof() {
                    return Err(self.unterminated(Construct::String, start));
                }
                self.cursor.advance_char();
                Ok(ScanState::InStringLiteral {
                    quote,
                    start,
                    resume,
                })
            }
            _ => {
                self.cursor.advance();
                Ok(resume.into())
            }
        }
    }

    fn comment_body(
        &mut self,
        kind: CommentKind,
        start: u32,
        resume: Context,
    ) -> Result<ScanState, ScanError> {
        match kind {
            CommentKind::Line => self.cursor.eat_until_newline_or_eof(),
            CommentKind::Block => {
                if !self.cursor.eat_past(b"*/") {
                    return Err(self.unterminated(Construct::BlockComment, start));
                }
            }
        }
        Ok(resume.into())
    }

    // ─── End of input ───────────────────────────────────────────────────

    fn finish(mut self) -> Result<Vec<Fragment>, ScanError> {
        match self.state {
            ScanState::TopLevel => {
                if let Some(&open) = self.open_blocks.first() {
                    return Err(self.unterminated(Construct::Block, open));
                }
                let end = self.cursor.source_len();
                self.flush(FragmentKind::Chtl, end);
                Ok(self.fragments)
            }
            ScanState::InStyleBlock(block) => {
                Err(self.unterminated(block.unterminated(Lang::Style), block.open))
            }
            ScanState::InLocalScript(block) | ScanState::InGlobalScript(block) => {
                Err(self.unterminated(block.unterminated(Lang::Script), block.open))
            }
            ScanState::InStringLiteral { start, .. } => {
                Err(self.unterminated(Construct::String, start))
            }
            ScanState::InComment {
                kind: CommentKind::Line,
                resume,
                ..
            } => {
                self.state = resume.into();
                self.finish()
            }
            ScanState::InComment {
                kind: CommentKind::Block,
                start,
                ..
            } => Err(self.unterminated(Construct::BlockComment, start)),
        }
    }

    // ─── Helpers ────────────────────────────────────────────────────────

    /// Emit `flush_start..end` as a fragment of `kind`. Empty spans are dropped.
    fn flush(&mut self, kind: FragmentKind, end: u32) {
        if end > self.flush_start {
            let content = self.cursor.slice(self.flush_start, end);
            tracing::trace!(%kind, start = self.flush_start, end, "fragment");
            self.fragments
                .push(Fragment::new(kind, content, self.flush_start));
        }
        self.flush_start = end;
    }

    fn unterminated(&self, construct: Construct, offset: u32) -> ScanError {
        tracing::debug!(%construct, offset, "scan failed");
        ScanError::Unterminated {
            construct,
            offset,
            filename: self.filename.to_owned(),
        }
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    reason = "test assertions use unwrap for clarity"
)]
