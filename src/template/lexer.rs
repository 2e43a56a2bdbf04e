//! Lexer for placeholder syntax using logos

use logos::Logos;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

#[derive(Logos, Debug, Clone, PartialEq)]
pub enum Token {
    // Placeholder delimiters (longer patterns win over single braces)
    #[token("{{")]
    Open,
    #[token("}}")]
    Close,

    // A lone brace is ordinary text outside a placeholder
    #[regex(r"[{}]")]
    Brace,

    #[regex(r"[^{}]+")]
    Text,
}

/// Lex input string into tokens with spans
pub fn lex(input: &str) -> impl Iterator<Item = (Token, Span)> + '_ {
    Token::lexer(input)
        .spanned()
        .filter_map(|(tok, span)| tok.ok().map(|t| (t, span)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text() {
        let tokens: Vec<_> = lex("cpu load").map(|(t, _)| t).collect();
        assert_eq!(tokens, vec![Token::Text]);
    }

    #[test]
    fn test_placeholder() {
        let tokens: Vec<_> = lex("{{env}} load").collect();
        assert_eq!(
            tokens,
            vec![
                (Token::Open, 0..2),
                (Token::Text, 2..5),
                (Token::Close, 5..7),
                (Token::Text, 7..12),
            ]
        );
    }

    #[test]
    fn test_single_braces() {
        let tokens: Vec<_> = lex("a{b}").map(|(t, _)| t).collect();
        assert_eq!(
            tokens,
            vec![Token::Text, Token::Brace, Token::Text, Token::Brace]
        );
    }

    #[test]
    fn test_triple_brace() {
        let tokens: Vec<_> = lex("{{{").map(|(t, _)| t).collect();
        assert_eq!(tokens, vec![Token::Open, Token::Brace]);
    }
}
