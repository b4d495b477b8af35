//! Grammar productions.
//!
//! ```text
//! document   := element* EOF
//! element    := meta | text
//! meta       := '<' TEXT argument* ('/' '>' | '>' element* '<' '/' TEXT '>')
//! argument   := TEXT '=' (string | TEXT | NUMERIC)
//! string     := '"' (text-token | '<' | '>')* '"'
//! text       := (TEXT | SPACE | LINE | NUMERIC | ESCAPE | '"' | '=' | '/')+
//! ```
//!
//! Whitespace is insignificant inside an opening tag, except between `<` and
//! the tag name.

use std::slice;

use brandish_core::Location;

use super::core::{Parser, cover};
use super::error::ParseError;
use super::node::{Block, Command, Node, Pair, Pairs, Root, Str, Text};
use crate::scanner::{Token, TokenKind, token_sets};

impl Parser {
    pub(super) fn parse_document(&mut self) -> Result<Root, ParseError> {
        let children = self.parse_elements(false)?;
        let eof = self.expect(TokenKind::Eof)?;
        Ok(Root::assumed(children, eof.location))
    }

    /// Elements up to end of input, or up to a closing `</` inside a block.
    fn parse_elements(&mut self, in_block: bool) -> Result<Vec<Node>, ParseError> {
        let mut children = Vec::new();
        loop {
            let kind = self.peek().kind;
            match kind {
                TokenKind::Eof => break,
                TokenKind::TagOpen if in_block && self.nth(1).is(TokenKind::Slash) => break,
                TokenKind::TagOpen => children.push(self.parse_meta()?),
                _ if token_sets::TEXT.contains(kind) => {
                    children.push(self.parse_text()?.into());
                }
                _ => return Err(self.unexpected(token_sets::ELEMENT_FIRST)),
            }
        }
        Ok(children)
    }

    fn parse_text(&mut self) -> Result<Text, ParseError> {
        let tokens = self.collect_while(token_sets::TEXT);
        Ok(Text::from_tokens(&tokens)?)
    }

    fn parse_meta(&mut self) -> Result<Node, ParseError> {
        let open = self.expect(TokenKind::TagOpen)?;
        self.enter_recursion()?;
        let node = self.parse_meta_after_open(open);
        self.exit_recursion();
        node
    }

    fn parse_meta_after_open(&mut self, open: Token) -> Result<Node, ParseError> {
        let name = self.expect(TokenKind::Text)?;
        let mut location = cover(&open.location, &name.location);
        let mut pairs = Pairs::new();

        loop {
            self.skip_trivia();
            let kind = self.peek().kind;
            match kind {
                TokenKind::Text => {
                    let pair = self.parse_argument()?;
                    location = cover(&location, pair.location());
                    pairs.insert(pair.key().to_owned(), pair.value().to_owned());
                }
                TokenKind::Slash => {
                    self.bump();
                    let close = self.expect(TokenKind::TagClose)?;
                    let location = cover(&location, &close.location);
                    return Ok(Command::new(name.value, pairs, location).into());
                }
                TokenKind::TagClose => {
                    let close = self.bump();
                    let location = cover(&location, &close.location);
                    return self.parse_block_after_open(name, pairs, location, close);
                }
                _ => return Err(self.unexpected(token_sets::TAG_TAIL)),
            }
        }
    }

    fn parse_block_after_open(
        &mut self,
        name: Token,
        pairs: Pairs,
        location: Location,
        open_close: Token,
    ) -> Result<Node, ParseError> {
        let children = self.parse_elements(true)?;
        let body = Root::assumed(children, open_close.location);

        self.expect(TokenKind::TagOpen)?;
        self.expect(TokenKind::Slash)?;
        let closing_name = self.expect(TokenKind::Text)?;
        if closing_name.value != name.value {
            return Err(ParseError::MismatchedTag {
                expected: name.value,
                found: closing_name.value,
                location: closing_name.location,
            });
        }
        self.skip_trivia();
        let end = self.expect(TokenKind::TagClose)?;

        let location = cover(&cover(&location, body.location()), &end.location);
        Ok(Block::new(name.value, body, pairs, location).into())
    }

    fn parse_argument(&mut self) -> Result<Pair, ParseError> {
        let key = self.expect(TokenKind::Text)?;
        self.skip_trivia();
        self.expect(TokenKind::Equal)?;
        self.skip_trivia();

        let kind = self.peek().kind;
        let value: Node = match kind {
            TokenKind::Quote => self.parse_string()?.into(),
            _ if token_sets::BARE_VALUE.contains(kind) => {
                let token = self.bump();
                Text::from_tokens(slice::from_ref(&token))?.into()
            }
            _ => return Err(self.unexpected(token_sets::ATTRIBUTE_VALUE)),
        };

        let location = cover(&key.location, value.location());
        Ok(Pair::new(key, value, location)?)
    }

    fn parse_string(&mut self) -> Result<Str, ParseError> {
        let open = self.expect(TokenKind::Quote)?;
        let tokens = self.collect_while(token_sets::STRING);
        let close = self.expect(TokenKind::Quote)?;
        Ok(Str::quoted(&open, &tokens, &close)?)
    }
}
