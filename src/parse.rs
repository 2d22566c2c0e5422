//! Lexer (spec.md §4.A) and expression parser (spec.md §4.B), combined into
//! one `winnow` grammar the way the teacher's `parse.rs` combines template
//! chunking and expression parsing: chunking alone can't decide where a
//! placeholder ends without also parsing its contents, since a `}}` inside a
//! quoted string literal must not close the placeholder.

use crate::{
    error::TemplateParseError,
    expr::{Binding, Expr, FilterCall, Identifier, Literal, PathStep},
};
use std::str::FromStr;
use winnow::{
    ModalParser, ModalResult, Parser,
    ascii::{dec_int, float, multispace0},
    combinator::{
        alt, cut_err, delimited, eof, fail, peek, preceded, repeat, repeat_till, rest,
        separated, separated_pair, terminated,
    },
    error::{ContextError, StrContext, StrContextValue},
    token::{any, one_of, take_till, take_until, take_while},
};

const PLACEHOLDER_OPEN: &str = "{{";
const PLACEHOLDER_CLOSE: &str = "}}";
const NULL: &str = "null";
const FALSE: &str = "false";
const TRUE: &str = "true";

/// A parsed template: an ordered sequence of literal text and placeholder
/// expressions (spec.md §4.A).
#[derive(Clone, Debug, PartialEq)]
pub struct Template {
    pub(crate) chunks: Vec<TemplateChunk>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum TemplateChunk {
    Literal(String),
    Placeholder {
        expr: Expr,
        /// The exact source text of the placeholder, including `{{`/`}}`.
        /// Used to re-emit an unresolved placeholder verbatim (spec.md
        /// §4.D's passthrough contract).
        source: String,
    },
}

impl FromStr for Template {
    type Err = TemplateParseError;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        let chunks = all_chunks.parse(source)?;
        Ok(Self { chunks })
    }
}

impl Template {
    pub fn chunks(&self) -> &[TemplateChunk] {
        &self.chunks
    }
}

fn all_chunks(input: &mut &str) -> ModalResult<Vec<TemplateChunk>> {
    repeat_till(
        0..,
        alt((placeholder_chunk, raw.map(TemplateChunk::Literal)))
            .context(ctx_label("template chunk")),
        eof,
    )
    .map(|(chunks, _)| chunks)
    .context(ctx_label("template"))
    .parse_next(input)
}

/// Parse raw text up to (but not including) the next placeholder opening, or
/// the rest of the input if there is none. Never produces an empty chunk.
fn raw(input: &mut &str) -> ModalResult<String> {
    alt((
        take_until(1.., PLACEHOLDER_OPEN).map(str::to_owned),
        rest.verify(|s: &str| !s.is_empty()).map(str::to_owned),
    ))
    .context(ctx_label("raw text"))
    .parse_next(input)
}

/// Parse one `{{ ... }}` placeholder, capturing both the parsed expression
/// and the exact source span for passthrough.
fn placeholder_chunk(input: &mut &str) -> ModalResult<TemplateChunk> {
    preceded(
        PLACEHOLDER_OPEN,
        // Any error inside a placeholder is fatal, including an unclosed one
        cut_err(terminated(ws(expression), PLACEHOLDER_CLOSE)),
    )
    .with_taken()
    .map(|(expr, source): (Expr, &str)| TemplateChunk::Placeholder {
        expr,
        source: source.to_owned(),
    })
    .context(ctx_label("placeholder"))
    .parse_next(input)
}

/// Parse the contents of a placeholder (or a nested expression argument):
/// `head ('|' filterCall)*`, left-associative.
fn expression(input: &mut &str) -> ModalResult<Expr> {
    let head = primary_expression.parse_next(input)?;
    let pipes: Vec<FilterCall> = repeat(0.., ws(pipe_call)).parse_next(input)?;
    Ok(pipes.into_iter().fold(head, |subject, call| Expr::Pipe {
        subject: Box::new(subject),
        call,
    }))
}

/// `head := literal | binding | objectLit | arrayLit | filterCall`
fn primary_expression(input: &mut &str) -> ModalResult<Expr> {
    ws(terminated(
        alt((
            literal.map(Expr::Literal),
            array.map(Expr::Array),
            object.map(Expr::Object),
            // Try a filter call before a bare binding: a call always parses
            // as a binding's head too, but not vice versa, so checking the
            // more specific grammar first avoids backtracking.
            filter_call.map(Expr::Call),
            binding.map(Expr::Binding),
            fail.context(ctx_expected("literal"))
                .context(ctx_expected("binding"))
                .context(ctx_expected("array"))
                .context(ctx_expected("object"))
                .context(ctx_expected("filter call")),
        )),
        boundary,
    ))
    .context(ctx_label("expression"))
    .parse_next(input)
}

fn literal(input: &mut &str) -> ModalResult<Literal> {
    alt((
        NULL.map(|_| Literal::Null),
        FALSE.map(|_| Literal::Boolean(false)),
        TRUE.map(|_| Literal::Boolean(true)),
        // Peek for a float marker before committing, otherwise dec_int would
        // eat the integer part and leave us unable to backtrack.
        preceded(
            peek((
                winnow::combinator::opt('-'),
                take_while(1.., |c: char| c.is_ascii_digit()),
                one_of(['.', 'e', 'E']),
            )),
            float.map(Literal::Float).context(ctx_label("float")),
        ),
        dec_int.map(Literal::Integer).context(ctx_label("int")),
        string_literal.map(Literal::String),
    ))
    .parse_next(input)
}

/// `'...'` or `"..."`. Supports `\\`, `\n`, `\t`, `\r`, and an escaped copy of
/// the delimiter so strings can contain their own quote character; spec.md
/// §4.B specifies no richer escaping than "what the host string type
/// natively requires".
fn string_literal(input: &mut &str) -> ModalResult<String> {
    alt((quoted('\''), quoted('"')))
        .context(ctx_label("string literal"))
        .parse_next(input)
}

fn quoted<'a>(quote: char) -> impl ModalParser<&'a str, String, ContextError> {
    move |input: &mut &'a str| {
        preceded(
            quote,
            cut_err(terminated(
                repeat(
                    0..,
                    alt((
                        preceded(
                            '\\',
                            alt((
                                '\\'.value('\\'),
                                'n'.value('\n'),
                                't'.value('\t'),
                                'r'.value('\r'),
                                quote.value(quote),
                            )),
                        ),
                        take_till(1.., move |c| c == quote || c == '\\')
                            .verify(|s: &str| !s.is_empty())
                            .try_map(|s: &str| {
                                s.chars().next().ok_or(()).map(|_| s)
                            }),
                    )),
                )
                .fold(String::new, |mut acc, piece: StringPiece| {
                    match piece {
                        StringPiece::Char(c) => acc.push(c),
                        StringPiece::Str(s) => acc.push_str(s),
                    }
                    acc
                }),
                cut_err(quote.context(StrContext::Expected(StrContextValue::CharLiteral(quote)))),
            )),
        )
        .parse_next(input)
    }
}

enum StringPiece<'a> {
    Char(char),
    Str(&'a str),
}

impl From<char> for StringPiece<'_> {
    fn from(c: char) -> Self {
        StringPiece::Char(c)
    }
}

impl<'a> From<&'a str> for StringPiece<'a> {
    fn from(s: &'a str) -> Self {
        StringPiece::Str(s)
    }
}

fn array(input: &mut &str) -> ModalResult<Vec<Expr>> {
    delimited_list('[', expression, ']')
        .context(ctx_label("array"))
        .parse_next(input)
}

fn object(input: &mut &str) -> ModalResult<Vec<(Identifier, Expr)>> {
    delimited_list('{', separated_pair(identifier, ws(':'), expression), '}')
        .context(ctx_label("object"))
        .parse_next(input)
}

/// `name(arg, arg, ...)`, used both as a `head` (no piped subject) and as the
/// right-hand side of a pipe.
fn filter_call(input: &mut &str) -> ModalResult<FilterCall> {
    (
        identifier.context(ctx_label("filter name")),
        delimited_list('(', expression, ')'),
    )
        .map(|(name, args)| FilterCall { name, args })
        .context(ctx_label("filter call"))
        .parse_next(input)
}

fn pipe_call(input: &mut &str) -> ModalResult<FilterCall> {
    preceded(
        ws('|'),
        cut_err(filter_call.context(ctx_expected("filter call"))),
    )
    .context(ctx_label("pipe"))
    .parse_next(input)
}

/// `ident ( '.' ident | '[' (string|number|binding) ']' )*`
fn binding(input: &mut &str) -> ModalResult<Binding> {
    (identifier, repeat(0.., path_step))
        .map(|(head, steps)| Binding { head, steps })
        .parse_next(input)
}

fn path_step(input: &mut &str) -> ModalResult<PathStep> {
    alt((
        preceded(
            '.',
            cut_err((identifier, winnow::combinator::opt(delimited_list('(', expression, ')')))),
        )
        .map(|(name, call_args)| match call_args {
            Some(args) => PathStep::MethodCall(name, args),
            None => PathStep::Field(name),
        }),
        delimited('[', cut_err(index_key), cut_err(']')).map(PathStep::Index),
    ))
    .parse_next(input)
}

/// The restricted grammar allowed inside `[...]`: a string, a number, or a
/// nested binding.
fn index_key(input: &mut &str) -> ModalResult<Box<Expr>> {
    ws(alt((
        string_literal.map(|s| Expr::Literal(Literal::String(s))),
        dec_int.map(|i| Expr::Literal(Literal::Integer(i))),
        binding.map(Expr::Binding),
    )))
    .map(Box::new)
    .context(ctx_label("index key"))
    .parse_next(input)
}

fn identifier(input: &mut &str) -> ModalResult<Identifier> {
    (
        take_while(1, is_ident_start),
        cut_err(take_while(0.., is_ident_continue)),
    )
        .take()
        .map(|id: &str| Identifier(id.to_owned()))
        .context(ctx_label("identifier"))
        .parse_next(input)
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// A comma-separated list with bounding delimiters, optional trailing comma,
/// and insignificant whitespace (including newlines) around each element.
fn delimited_list<'a, O, Acc, F>(
    open: char,
    parser: F,
    close: char,
) -> impl ModalParser<&'a str, Acc, ContextError>
where
    F: ModalParser<&'a str, O, ContextError>,
    Acc: winnow::stream::Accumulate<O>,
{
    preceded(
        open,
        cut_err(terminated(
            ws(terminated(
                separated(0.., parser, ws(',')),
                winnow::combinator::opt(ws(',')),
            )),
            close.context(StrContext::Expected(StrContextValue::CharLiteral(close))),
        )),
    )
}

fn ws<'a, O, F>(parser: F) -> impl ModalParser<&'a str, O, ContextError>
where
    F: ModalParser<&'a str, O, ContextError>,
{
    delimited(multispace0, parser, multispace0)
}

/// After parsing a literal/identifier, make sure we consumed the whole
/// token; prevents `1user` from parsing as the integer `1` with `user` left
/// dangling.
fn boundary(input: &mut &str) -> ModalResult<()> {
    match input.chars().next() {
        None => Ok(()),
        Some(c) if !is_ident_continue(c) => Ok(()),
        Some(_) => cut_err(fail)
            .context(ctx_expected("end of token"))
            .parse_next(input),
    }
}

fn ctx_label(label: &'static str) -> StrContext {
    StrContext::Label(label)
}

fn ctx_expected(expected: &'static str) -> StrContext {
    StrContext::Expected(StrContextValue::Description(expected))
}
