//! Turns engine-dialect shader text (GLSL 1.50 style, no `#version` line) into
//! something the current context can compile.
//!
//! For GLES 2 targets the 1.50 keywords are lowered to their GLSL 1.00 spellings.
//! The rewrite works on tokens, so comments, string literals, and identifiers
//! that merely contain a keyword (`in_Vertex`, `mytexture`) are left alone, and
//! `in`/`out` are only treated as storage qualifiers at global scope.

use crate::config::GlProfile;
use crate::errors::ShaderStage;

pub fn preamble(profile: GlProfile) -> &'static str {
    match profile {
        GlProfile::Desktop3 => "#version 150 core\n",
        GlProfile::Es2 => "#version 100\nprecision highp float;\n#define USE_OPENGL_ES_2\n",
    }
}

/// Preamble plus the (possibly lowered) source.
pub fn translate(source: &str, stage: ShaderStage, profile: GlProfile) -> String {
    let mut rval = String::with_capacity(source.len() + 64);
    rval.push_str(preamble(profile));
    match profile {
        GlProfile::Desktop3 => rval.push_str(source),
        GlProfile::Es2 => lower_to_glsl_100(source, stage, &mut rval),
    }
    rval
}

//

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum TokenKind {
    Ident,
    Number,
    Space,
    Comment,
    Literal,
    Punct,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct Token<'a> {
    kind: TokenKind,
    text: &'a str,
}

impl<'a> Token<'a> {
    fn is(&self, kind: TokenKind, text: &str) -> bool {
        self.kind == kind && self.text == text
    }

    fn is_trivia(&self) -> bool {
        matches!(self.kind, TokenKind::Space | TokenKind::Comment)
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Byte index of the first char at or after `from` that fails `keep`, or `src.len()`.
fn scan_while(src: &str, from: usize, keep: impl Fn(char) -> bool) -> usize {
    src[from..]
        .char_indices()
        .find(|(_, c)| !keep(*c))
        .map_or(src.len(), |(i, _)| from + i)
}

fn tokenize(src: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut pos = 0;
    while pos < src.len() {
        let rest = &src[pos..];
        let Some(c) = rest.chars().next() else {
            break;
        };

        let (end, kind) = if rest.starts_with("//") {
            let end = rest.find('\n').map_or(src.len(), |i| pos + i);
            (end, TokenKind::Comment)
        } else if rest.starts_with("/*") {
            let end = rest[2..].find("*/").map_or(src.len(), |i| pos + 2 + i + 2);
            (end, TokenKind::Comment)
        } else if c == '"' {
            let mut end = src.len();
            let mut escaped = false;
            for (i, ch) in rest.char_indices().skip(1) {
                if ch == '\n' {
                    end = pos + i;
                    break;
                }
                if ch == '"' && !escaped {
                    end = pos + i + 1;
                    break;
                }
                escaped = ch == '\\' && !escaped;
            }
            (end, TokenKind::Literal)
        } else if is_ident_start(c) {
            (scan_while(src, pos, is_ident_continue), TokenKind::Ident)
        } else if c.is_ascii_digit() {
            (
                scan_while(src, pos, |c| is_ident_continue(c) || c == '.'),
                TokenKind::Number,
            )
        } else if c.is_whitespace() {
            (scan_while(src, pos, char::is_whitespace), TokenKind::Space)
        } else {
            (pos + c.len_utf8(), TokenKind::Punct)
        };

        tokens.push(Token {
            kind,
            text: &src[pos..end],
        });
        pos = end;
    }
    tokens
}

/// Index of the next token at or after `from` that is not whitespace or a comment.
fn next_significant(tokens: &[Token], from: usize) -> Option<usize> {
    (from..tokens.len()).find(|&i| !tokens[i].is_trivia())
}

/// Matches `out vec4 out_FragColor ;` starting at `start`, returning the index of the `;`.
fn frag_color_declaration_end(tokens: &[Token], start: usize) -> Option<usize> {
    let expected = [
        (TokenKind::Ident, "out"),
        (TokenKind::Ident, "vec4"),
        (TokenKind::Ident, "out_FragColor"),
        (TokenKind::Punct, ";"),
    ];
    let mut at = start;
    for (n, (kind, text)) in expected.iter().enumerate() {
        if n > 0 {
            at = next_significant(tokens, at + 1)?;
        }
        if !tokens[at].is(*kind, text) {
            return None;
        }
    }
    Some(at)
}

fn lower_to_glsl_100(source: &str, stage: ShaderStage, out: &mut String) {
    let tokens = tokenize(source);
    let mut brace_depth = 0usize;
    let mut paren_depth = 0usize;

    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i];
        let global_scope = brace_depth == 0 && paren_depth == 0;

        let replacement = match (token.kind, token.text, stage) {
            (TokenKind::Punct, p, _) => {
                match p {
                    "{" => brace_depth += 1,
                    "}" => brace_depth = brace_depth.saturating_sub(1),
                    "(" => paren_depth += 1,
                    ")" => paren_depth = paren_depth.saturating_sub(1),
                    _ => {}
                }
                None
            }
            (TokenKind::Ident, "texture", _) => {
                let call = next_significant(&tokens, i + 1)
                    .map_or(false, |n| tokens[n].is(TokenKind::Punct, "("));
                call.then_some("texture2D")
            }
            (TokenKind::Ident, "out", ShaderStage::Fragment) if global_scope => {
                if let Some(end) = frag_color_declaration_end(&tokens, i) {
                    i = end + 1;
                    continue;
                }
                None
            }
            (TokenKind::Ident, "out_FragColor", ShaderStage::Fragment) => Some("gl_FragColor"),
            (TokenKind::Ident, "in", ShaderStage::Vertex) if global_scope => Some("attribute"),
            (TokenKind::Ident, "out", ShaderStage::Vertex) if global_scope => Some("varying"),
            (TokenKind::Ident, "in", ShaderStage::Fragment) if global_scope => Some("varying"),
            _ => None,
        };

        out.push_str(replacement.unwrap_or(token.text));
        i += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_desktop_only_gets_preamble() {
        let src = "in vec3 in_Vertex;\nvoid main() { gl_Position = vec4(in_Vertex, 1.0); }\n";
        let out = translate(src, ShaderStage::Vertex, GlProfile::Desktop3);
        assert_eq!(out, format!("#version 150 core\n{}", src));
    }

    #[test]
    fn test_es_vertex_qualifiers() {
        let src = "in vec3 in_Vertex;\nin vec2 in_TexCoord;\nout vec2 TexCoord;\n";
        let out = translate(src, ShaderStage::Vertex, GlProfile::Es2);
        assert_eq!(
            out,
            "#version 100\nprecision highp float;\n#define USE_OPENGL_ES_2\n\
             attribute vec3 in_Vertex;\nattribute vec2 in_TexCoord;\nvarying vec2 TexCoord;\n"
        );
    }

    #[test]
    fn test_es_fragment_output() {
        let src = "in vec2 TexCoord;\nuniform sampler2D Texture0;\nout vec4 out_FragColor;\n\
                   void main() { out_FragColor = texture( Texture0, TexCoord ); }\n";
        let out = translate(src, ShaderStage::Fragment, GlProfile::Es2);
        let body = out.strip_prefix(preamble(GlProfile::Es2)).unwrap();
        assert_eq!(
            body,
            "varying vec2 TexCoord;\nuniform sampler2D Texture0;\n\n\
             void main() { gl_FragColor = texture2D( Texture0, TexCoord ); }\n"
        );
    }

    #[test]
    fn test_comments_and_identifiers_untouched() {
        let src = "// in the beginning, out of texture(\n\
                   /* out vec4 out_FragColor; */\n\
                   float mytexture(in float x) { return x; }\n\
                   void main() { float texture = 1.0; }\n";
        let out = translate(src, ShaderStage::Vertex, GlProfile::Es2);
        let body = out.strip_prefix(preamble(GlProfile::Es2)).unwrap();
        assert_eq!(body, src);
    }

    #[test]
    fn test_texture_call_inside_macro() {
        let src = "#define SAMPLE(t, uv) texture(t, uv)\n";
        let out = translate(src, ShaderStage::Fragment, GlProfile::Es2);
        assert!(out.ends_with("#define SAMPLE(t, uv) texture2D(t, uv)\n"));
    }

    #[test]
    fn test_tokenize_round_trips() {
        let src = "a1 += 2.5e3; // x\n\"str\\\"ing\" /* c */ ÿ";
        let joined: String = tokenize(src).iter().map(|t| t.text).collect();
        assert_eq!(joined, src);
    }
}
